//! Skill checklist progress shown in the header bar.

use crate::model::document::{EventLevel, Section, DEFAULT_SKILLS};
use serde_json::Value;

/// Mastery summary over the skill checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillProgress {
    pub mastered: usize,
    pub total: usize,
    /// Rounded percentage of mastered skills.
    pub percent: u32,
    pub level: EventLevel,
}

/// Counts mastered skills in `doc.skills` against the fixed checklist size.
///
/// Entries that are not objects or lack a boolean `mastered` count as not
/// mastered.
pub fn skill_progress(doc: &Value) -> SkillProgress {
    let mastered = doc
        .get(Section::Skills.as_key())
        .and_then(Value::as_object)
        .map(|skills| {
            skills
                .values()
                .filter(|flags| flags.get("mastered").and_then(Value::as_bool) == Some(true))
                .count()
        })
        .unwrap_or(0);
    let total = DEFAULT_SKILLS.len();
    let percent = (mastered as f64 / total as f64 * 100.0).round() as u32;

    SkillProgress {
        mastered,
        total,
        percent,
        level: level_for_percent(percent),
    }
}

pub fn level_for_percent(percent: u32) -> EventLevel {
    if percent < 34 {
        EventLevel::Novice
    } else if percent < 67 {
        EventLevel::Explorer
    } else {
        EventLevel::Engineer
    }
}

#[cfg(test)]
mod tests {
    use super::{level_for_percent, skill_progress};
    use crate::model::document::{default_document, EventLevel};
    use serde_json::json;

    #[test]
    fn default_document_has_no_progress() {
        let progress = skill_progress(&default_document());
        assert_eq!(progress.mastered, 0);
        assert_eq!(progress.total, 6);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.level, EventLevel::Novice);
    }

    #[test]
    fn level_thresholds() {
        let doc = json!({ "skills": {
            "a": { "mastered": true }, "b": { "mastered": true },
            "c": { "mastered": false }, "d": "broken"
        }});
        let progress = skill_progress(&doc);
        assert_eq!(progress.mastered, 2);
        assert_eq!(progress.percent, 33);
        assert_eq!(progress.level, EventLevel::Novice);

        assert_eq!(level_for_percent(50), EventLevel::Explorer);
        assert_eq!(level_for_percent(67), EventLevel::Engineer);
    }
}
