//! Load-time document repair.
//!
//! # Responsibility
//! - Restore the `balance` section for documents saved before it existed or
//!   whose `categories` field is not a list.
//!
//! # Invariants
//! - Repair only reacts to structural absence, never to content.
//! - `repair_document(repair_document(d)) == repair_document(d)`.
//! - Must run before any derived computation reads `balance.categories`.

use crate::model::document::{default_balance_value, default_document, Section};
use serde_json::Value;

/// Returns whether `doc` would be changed by [`repair_document`].
pub fn needs_repair(doc: &Value) -> bool {
    let Some(root) = doc.as_object() else {
        return true;
    };
    let categories_is_list = root
        .get(Section::Balance.as_key())
        .and_then(|balance| balance.get("categories"))
        .is_some_and(Value::is_array);
    !categories_is_list
}

/// Repairs a loaded document.
///
/// A non-object root cannot hold sections at all and is replaced by the
/// default document. Otherwise a missing or malformed `balance` sub-tree is
/// replaced wholesale by the default wheel and every other section is kept.
pub fn repair_document(doc: Value) -> Value {
    if !needs_repair(&doc) {
        return doc;
    }

    match doc {
        Value::Object(mut root) => {
            root.insert(Section::Balance.as_key().to_string(), default_balance_value());
            Value::Object(root)
        }
        _ => default_document(),
    }
}

#[cfg(test)]
mod tests {
    use super::{needs_repair, repair_document};
    use crate::model::document::default_balance_value;
    use serde_json::json;

    #[test]
    fn missing_balance_is_restored() {
        let repaired = repair_document(json!({ "cover": { "name": "Ann" } }));
        assert_eq!(repaired["balance"], default_balance_value());
        assert_eq!(repaired["cover"]["name"], "Ann");
    }

    #[test]
    fn non_list_categories_are_replaced() {
        for categories in [json!(null), json!("x"), json!({ "a": 1 }), json!(3)] {
            let doc = json!({ "balance": { "explainSeen": true, "categories": categories } });
            assert!(needs_repair(&doc));
            assert_eq!(repair_document(doc)["balance"], default_balance_value());
        }
    }

    #[test]
    fn custom_categories_are_untouched() {
        let doc = json!({ "balance": { "explainSeen": true, "categories": [] } });
        assert!(!needs_repair(&doc));
        assert_eq!(repair_document(doc.clone()), doc);
    }

    #[test]
    fn non_object_root_becomes_default_document() {
        let repaired = repair_document(json!([1, 2, 3]));
        assert!(repaired.is_object());
        assert!(!needs_repair(&repaired));
    }
}
