//! Balance wheel geometry.
//!
//! Spoke 0 points straight up and spokes advance clockwise in screen
//! coordinates (y grows downward), so spoke `i` sits at
//! `-90° + i * 360° / n`.
//!
//! # Invariants
//! - Pure: inputs are never mutated, output depends only on inputs.
//! - Vertex distance from center is `value / max * radius`.
//! - Zero categories yield an empty chart.

use crate::model::balance::{BalanceCategory, BALANCE_MAX};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Center of the 300x300 wheel viewport.
pub const WHEEL_CENTER: Point = Point { x: 150.0, y: 150.0 };
/// Outer circle radius.
pub const WHEEL_RADIUS: f64 = 120.0;
/// Values at which concentric gridlines are drawn.
pub const GRID_STEPS: [u8; 5] = [2, 4, 6, 8, 10];
/// Distance between the outer circle and the label anchor.
pub const LABEL_OFFSET: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Horizontal text anchoring of a spoke label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gridline {
    pub value: u8,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spoke {
    pub key: String,
    /// Radians, screen coordinates.
    pub angle: f64,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpokeLabel {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
}

/// Renderable wheel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialChart {
    pub center: Point,
    pub radius: f64,
    /// Closed polygon; the last vertex connects back to the first.
    pub polygon: Vec<Point>,
    pub gridlines: Vec<Gridline>,
    pub spokes: Vec<Spoke>,
    pub labels: Vec<SpokeLabel>,
}

/// Angle of spoke `index` out of `count`.
pub fn spoke_angle(index: usize, count: usize) -> f64 {
    TAU * index as f64 / count as f64 - FRAC_PI_2
}

/// Projects `value` on the spoke at `angle`.
pub fn project(center: Point, radius: f64, max: f64, value: f64, angle: f64) -> Point {
    let r = value / max * radius;
    Point {
        x: center.x + r * angle.cos(),
        y: center.y + r * angle.sin(),
    }
}

/// Builds the wheel with the default viewport constants.
pub fn balance_wheel(categories: &[BalanceCategory]) -> RadialChart {
    radial_chart(categories, WHEEL_CENTER, WHEEL_RADIUS)
}

/// Builds the wheel for `categories` around `center` with outer `radius`.
pub fn radial_chart(categories: &[BalanceCategory], center: Point, radius: f64) -> RadialChart {
    let max = f64::from(BALANCE_MAX);
    let count = categories.len();

    let gridlines = GRID_STEPS
        .iter()
        .map(|step| Gridline {
            value: *step,
            radius: f64::from(*step) / max * radius,
        })
        .collect();

    let mut polygon = Vec::with_capacity(count);
    let mut spokes = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);
    for (index, category) in categories.iter().enumerate() {
        let angle = spoke_angle(index, count);
        polygon.push(project(center, radius, max, f64::from(category.value), angle));
        spokes.push(Spoke {
            key: category.key.clone(),
            angle,
            end: project(center, radius, max, max, angle),
        });
        labels.push(SpokeLabel {
            text: category.label.clone(),
            position: project(center, radius + LABEL_OFFSET, max, max, angle),
            anchor: if angle.cos() > 0.0 {
                TextAnchor::Start
            } else {
                TextAnchor::End
            },
        });
    }

    RadialChart {
        center,
        radius,
        polygon,
        gridlines,
        spokes,
        labels,
    }
}

impl RadialChart {
    /// SVG `points` attribute for the polygon: `x,y x,y ...`.
    pub fn polygon_points(&self) -> String {
        self.polygon
            .iter()
            .map(|point| format!("{},{}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders a standalone SVG document of the wheel.
    pub fn to_svg(&self) -> String {
        let (cx, cy) = (self.center.x, self.center.y);
        let mut lines = vec![
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 300" width="300" height="300">"#
                .to_string(),
            format!(
                r##"  <circle cx="{cx}" cy="{cy}" r="{}" fill="#eff6ff" stroke="#e2e8f0"/>"##,
                self.radius
            ),
        ];
        lines.extend(self.gridlines.iter().map(|gridline| {
            format!(
                r##"  <circle cx="{cx}" cy="{cy}" r="{}" fill="none" stroke="#e2e8f0"/>"##,
                gridline.radius
            )
        }));
        for (spoke, label) in self.spokes.iter().zip(&self.labels) {
            lines.push(format!(
                r##"  <line x1="{cx}" y1="{cy}" x2="{}" y2="{}" stroke="#e2e8f0"/>"##,
                spoke.end.x, spoke.end.y
            ));
            lines.push(format!(
                r#"  <text x="{}" y="{}" font-size="10" text-anchor="{}" dominant-baseline="middle">{}</text>"#,
                label.position.x,
                label.position.y,
                label.anchor.as_svg(),
                escape_xml(&label.text)
            ));
        }
        if !self.polygon.is_empty() {
            lines.push(format!(
                r##"  <polygon points="{}" fill="#f97316" fill-opacity="0.35" stroke="#f97316" stroke-width="2"/>"##,
                self.polygon_points()
            ));
        }
        lines.push("</svg>".to_string());

        let mut svg = lines.join("\n");
        svg.push('\n');
        svg
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
