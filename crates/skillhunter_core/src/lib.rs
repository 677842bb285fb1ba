//! Core domain logic for the SkillHunter student portfolio.
//! This crate is the single source of truth for document invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{StoreConfig, STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::balance::{
    clamp_balance_value, stored_categories, Balance, BalanceCategory, BALANCE_MAX,
};
pub use model::document::{default_document, EventLevel, EventRecord, Partner, Section};
pub use model::path::{get_path, set_path, DocPath, PathError, PathSegment};
pub use model::repair::repair_document;
pub use render::radial::{balance_wheel, RadialChart};
pub use render::region_map::{region_markers, MapMarker};
pub use repo::slot_repo::{
    MemorySlotRepository, RepoError, RepoResult, SlotRepository, SqliteSlotRepository,
};
pub use service::portfolio_service::{ExportArtifact, ImportError, PortfolioStore, StoreError};
pub use service::progress::{skill_progress, SkillProgress};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Reads the balance categories of `doc` for the wheel.
///
/// Each stored entry is read on its own, so the wheel always has as many
/// spokes as the stored list. The default wheel is used only when
/// `balance.categories` is not a list.
pub fn balance_categories(doc: &serde_json::Value) -> Vec<BalanceCategory> {
    doc.get(Section::Balance.as_key())
        .and_then(stored_categories)
        .unwrap_or_else(|| Balance::default().categories)
}

/// Reads the partner list of `doc`, skipping malformed entries.
pub fn partners(doc: &serde_json::Value) -> Vec<Partner> {
    doc.get(Section::Partners.as_key())
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Partner>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{balance_categories, core_version, default_document, partners};
    use serde_json::json;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn balance_categories_fall_back_to_default_wheel() {
        assert_eq!(balance_categories(&json!({})).len(), 8);
        assert_eq!(balance_categories(&default_document()).len(), 8);
    }

    #[test]
    fn balance_categories_keep_stored_spokes_with_null_values() {
        let doc = json!({ "balance": { "explainSeen": true, "categories": [
            { "key": "a", "label": "A", "value": 9 },
            { "key": "b", "label": "B", "value": 2 },
            { "key": "c", "label": "C", "value": null }
        ]}});
        let categories = balance_categories(&doc);
        let keys: Vec<&str> = categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(categories[2].value, 0);
        assert_eq!(categories[0].value, 9);
    }

    #[test]
    fn partners_skip_malformed_entries() {
        let doc = json!({ "partners": [
            { "name": "A", "blurb": "", "url": "" },
            42,
            { "name": "B", "blurb": "b", "url": "u" }
        ]});
        let names: Vec<String> = partners(&doc).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
