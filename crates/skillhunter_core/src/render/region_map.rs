//! Partner markers on the schematic city map.
//!
//! The map is a 200x200 viewport with a 4-column grid; only the first
//! `MAX_MARKERS` partners get a marker.

use crate::model::document::Partner;

pub const MAX_MARKERS: usize = 8;
pub const MARKER_RADIUS: f64 = 7.0;
const COLUMNS: usize = 4;
const CELL: f64 = 50.0;
const ORANGE: &str = "#f97316";
const BLUE: &str = "#2563eb";

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub title: String,
    pub cx: f64,
    pub cy: f64,
    pub color: &'static str,
}

/// Lays out markers for `partners` in list order.
pub fn region_markers(partners: &[Partner]) -> Vec<MapMarker> {
    partners
        .iter()
        .take(MAX_MARKERS)
        .enumerate()
        .map(|(index, partner)| MapMarker {
            title: partner.name.clone(),
            cx: (index % COLUMNS) as f64 * CELL + 25.0,
            cy: (index / COLUMNS) as f64 * CELL + 75.0,
            color: if index % 2 == 1 { BLUE } else { ORANGE },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::region_markers;
    use crate::model::document::Partner;

    fn partners(count: usize) -> Vec<Partner> {
        (0..count)
            .map(|i| Partner {
                name: format!("P{i}"),
                ..Partner::blank()
            })
            .collect()
    }

    #[test]
    fn markers_follow_grid_and_cap_at_eight() {
        let markers = region_markers(&partners(10));
        assert_eq!(markers.len(), 8);
        assert_eq!((markers[0].cx, markers[0].cy), (25.0, 75.0));
        assert_eq!((markers[3].cx, markers[3].cy), (175.0, 75.0));
        assert_eq!((markers[4].cx, markers[4].cy), (25.0, 125.0));
        assert_eq!(markers[0].color, "#f97316");
        assert_eq!(markers[1].color, "#2563eb");
        assert_eq!(markers[7].title, "P7");
    }
}
