//! Balance wheel section model.
//!
//! # Responsibility
//! - Define the `balance` sub-tree shape and its hardcoded default.
//! - Own the clamping rule for category values.
//!
//! # Invariants
//! - Category order is the spoke order and never changes on value edits.
//! - `value` is always within `[0, BALANCE_MAX]`, including after deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upper bound of every balance category value.
pub const BALANCE_MAX: u8 = 10;
/// Value assigned to every category of the default wheel.
pub const DEFAULT_BALANCE_VALUE: u8 = 6;

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("study", "Учёба"),
    ("health", "Здоровье"),
    ("friends", "Друзья"),
    ("family", "Семья"),
    ("hobby", "Хобби"),
    ("creativity", "Творчество"),
    ("rest", "Отдых"),
    ("help", "Помощь другим"),
];

/// The `balance` section of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Whether the "how to use" hint was already dismissed.
    #[serde(default)]
    pub explain_seen: bool,
    /// Ordered spokes of the wheel.
    pub categories: Vec<BalanceCategory>,
}

/// One spoke of the wheel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCategory {
    pub key: String,
    pub label: String,
    #[serde(deserialize_with = "deserialize_clamped")]
    pub value: u8,
}

impl BalanceCategory {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value: u8) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: value.min(BALANCE_MAX),
        }
    }
}

impl BalanceCategory {
    /// Reads one stored category entry without failing.
    ///
    /// Missing `key` or `label` read as `""`; a missing or non-numeric
    /// `value` (older saves wrote `null` for an unparsable slider input)
    /// reads as `0`.
    pub fn from_stored(entry: &Value) -> Self {
        let text = |field: &str| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let value = entry
            .get("value")
            .and_then(Value::as_f64)
            .map_or(0, clamp_balance_value);
        Self {
            key: text("key"),
            label: text("label"),
            value,
        }
    }
}

/// Reads the wheel spokes of a stored `balance` section.
///
/// Returns `None` when `categories` is not a list; every list entry yields
/// one spoke, in order.
pub fn stored_categories(balance: &Value) -> Option<Vec<BalanceCategory>> {
    balance
        .get("categories")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(BalanceCategory::from_stored).collect())
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            explain_seen: false,
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(key, label)| BalanceCategory::new(*key, *label, DEFAULT_BALANCE_VALUE))
                .collect(),
        }
    }
}

/// Clamps a raw numeric input to `[0, BALANCE_MAX]`.
///
/// Fractions are rounded to the nearest integer first; `NaN` maps to `0`.
pub fn clamp_balance_value(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(BALANCE_MAX)) as u8
}

fn deserialize_clamped<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_balance_value(raw))
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_balance_value, stored_categories, Balance, BALANCE_MAX, DEFAULT_BALANCE_VALUE,
    };
    use serde_json::json;

    #[test]
    fn default_has_eight_categories_at_six() {
        let balance = Balance::default();
        assert_eq!(balance.categories.len(), 8);
        assert!(!balance.explain_seen);
        assert!(balance
            .categories
            .iter()
            .all(|category| category.value == DEFAULT_BALANCE_VALUE));
        assert_eq!(balance.categories[0].key, "study");
        assert_eq!(balance.categories[7].key, "help");
    }

    #[test]
    fn clamp_handles_out_of_range_and_nan() {
        assert_eq!(clamp_balance_value(-3.0), 0);
        assert_eq!(clamp_balance_value(15.0), BALANCE_MAX);
        assert_eq!(clamp_balance_value(7.4), 7);
        assert_eq!(clamp_balance_value(f64::NAN), 0);
    }

    #[test]
    fn stored_categories_read_each_entry_on_its_own() {
        let balance = json!({ "categories": [
            { "key": "a", "label": "A", "value": 9 },
            { "key": "b", "value": 2.6 },
            { "key": "c", "label": "C", "value": null },
            { "key": "d", "label": "D", "value": "7" },
            42
        ]});
        let categories = stored_categories(&balance).unwrap();
        let read: Vec<(&str, &str, u8)> = categories
            .iter()
            .map(|c| (c.key.as_str(), c.label.as_str(), c.value))
            .collect();
        assert_eq!(
            read,
            vec![("a", "A", 9), ("b", "", 3), ("c", "C", 0), ("d", "D", 0), ("", "", 0)]
        );
        assert_eq!(stored_categories(&json!({ "categories": "broken" })), None);
        assert_eq!(stored_categories(&json!(null)), None);
    }

    #[test]
    fn deserialization_clamps_values() {
        let balance: Balance = serde_json::from_value(serde_json::json!({
            "explainSeen": true,
            "categories": [
                { "key": "a", "label": "A", "value": 42 },
                { "key": "b", "label": "B", "value": -1 }
            ]
        }))
        .unwrap();
        assert_eq!(balance.categories[0].value, 10);
        assert_eq!(balance.categories[1].value, 0);
    }
}
