//! Portfolio document sections and their defaults.
//!
//! # Responsibility
//! - Name the fixed top-level sections of the document.
//! - Provide typed records for every section and build the default document.
//!
//! # Invariants
//! - The stored document is a JSON object keyed by `Section::as_key()`.
//! - Wire field names are camelCase to stay compatible with exported files.
//! - `events` holds between `MIN_EVENTS` and `MAX_EVENTS` entries.
//!
//! # See also
//! - `model::balance` for the balance wheel section.

use crate::model::balance::Balance;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Maximum number of event pages.
pub const MAX_EVENTS: usize = 10;
/// Minimum number of event pages kept in the document.
pub const MIN_EVENTS: usize = 1;
/// Fixed row count of the professions table.
pub const PROFESSION_ROWS: usize = 5;

/// Skill checklist entries as `(key, label)` pairs, in display order.
pub const DEFAULT_SKILLS: &[(&str, &str)] = &[
    ("construction", "Конструирование"),
    ("3d", "3D-моделирование"),
    ("robotics", "Робототехника"),
    ("teamwork", "Командная работа"),
    ("problemsolving", "Решение задач"),
    ("research", "Исследования"),
];

const DEFAULT_PARTNERS: &[(&str, &str, &str)] = &[
    (
        "Севкабель",
        "Канатная и кабельная промышленность.",
        "https://sevcableport.ru/",
    ),
    (
        "Кировский завод",
        "Машиностроение, тяжёлая промышленность.",
        "https://kzgroup.ru/",
    ),
    ("ASCON", "CAD/PLM решения, КОМПАС-3D.", "https://ascon.ru/"),
    ("СПбПУ", "Политех, инженерное образование.", "https://spbstu.ru/"),
    ("ИТМО", "IT, фотоника, робототехника.", "https://itmo.ru/"),
    ("ГУАП", "Авиаприборостроение, электроника.", "https://guap.ru/"),
];

/// Top-level document sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Cover,
    Intro,
    Partners,
    Goals,
    Events,
    Skills,
    Reflection,
    Professions,
    Subjects,
    Passport,
    Balance,
}

impl Section {
    /// All sections in page order.
    pub const ALL: [Section; 11] = [
        Section::Cover,
        Section::Intro,
        Section::Partners,
        Section::Goals,
        Section::Events,
        Section::Skills,
        Section::Reflection,
        Section::Professions,
        Section::Subjects,
        Section::Passport,
        Section::Balance,
    ];

    /// Returns the document key of this section.
    pub fn as_key(self) -> &'static str {
        match self {
            Section::Cover => "cover",
            Section::Intro => "intro",
            Section::Partners => "partners",
            Section::Goals => "goals",
            Section::Events => "events",
            Section::Skills => "skills",
            Section::Reflection => "reflection",
            Section::Professions => "professions",
            Section::Subjects => "subjects",
            Section::Passport => "passport",
            Section::Balance => "balance",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.as_key() == key)
    }
}

/// Cover page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    pub name: String,
    pub class_school: String,
    pub year: String,
    /// Opaque image payload (data URL).
    pub photo: String,
    pub project_url: String,
    #[serde(rename = "showQR")]
    pub show_qr: bool,
}

impl Default for Cover {
    fn default() -> Self {
        Self {
            name: String::new(),
            class_school: String::new(),
            year: "2025/26".to_string(),
            photo: String::new(),
            project_url: String::new(),
            show_qr: true,
        }
    }
}

/// Self-introduction page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intro {
    pub interests: String,
    pub hands_on: String,
    pub liked_topics: String,
    pub strengths: String,
    pub to_boost: String,
    pub motto: String,
    pub avatar: String,
}

/// Regional partner shown in the partner index and on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partner {
    pub name: String,
    pub blurb: String,
    pub url: String,
}

impl Partner {
    pub fn blank() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    pub skill: String,
    pub profession: String,
    pub person: String,
    pub target: String,
    pub mentor_sign: String,
}

/// Self-assessed level of one event page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    #[default]
    #[serde(rename = "Новичок")]
    Novice,
    #[serde(rename = "Исследователь")]
    Explorer,
    #[serde(rename = "Инженер")]
    Engineer,
}

impl EventLevel {
    pub fn label(self) -> &'static str {
        match self {
            EventLevel::Novice => "Новичок",
            EventLevel::Explorer => "Исследователь",
            EventLevel::Engineer => "Инженер",
        }
    }
}

/// One repeatable event log page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub place: String,
    pub task: String,
    pub skills: BTreeMap<String, bool>,
    pub interesting: String,
    pub insight: String,
    pub badge: String,
    pub mentor_sign: String,
    pub level: EventLevel,
}

impl EventRecord {
    /// Creates an empty event page with every skill unchecked.
    pub fn blank() -> Self {
        Self {
            place: String::new(),
            task: String::new(),
            skills: DEFAULT_SKILLS
                .iter()
                .map(|(key, _)| ((*key).to_string(), false))
                .collect(),
            interesting: String::new(),
            insight: String::new(),
            badge: String::new(),
            mentor_sign: String::new(),
            level: EventLevel::default(),
        }
    }
}

/// Checklist state of one skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFlags {
    pub tried: bool,
    pub mastered: bool,
    pub want: bool,
}

/// Flag column of the skill checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillFlag {
    Tried,
    Mastered,
    Want,
}

impl SkillFlag {
    pub fn as_key(self) -> &'static str {
        match self {
            SkillFlag::Tried => "tried",
            SkillFlag::Mastered => "mastered",
            SkillFlag::Want => "want",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "tried" => Some(SkillFlag::Tried),
            "mastered" => Some(SkillFlag::Mastered),
            "want" => Some(SkillFlag::Want),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub favorite: String,
    pub most_interesting: String,
    pub unexpected: String,
    pub felt_engineer: String,
    pub next_try: String,
    /// Opaque image payload (data URL).
    pub collage: String,
}

/// One row of the professions table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profession {
    pub title: String,
    pub does: String,
    #[serde(rename = "where")]
    pub where_: String,
    pub knowledge: String,
    pub why: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subjects {
    pub track: String,
    pub clubs: String,
    pub next_year: String,
    pub teacher_sign: String,
    pub parent_sign: String,
}

/// Final summary page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passport {
    pub name: String,
    pub class: String,
    pub skills: String,
    pub interests: String,
    pub achievements: String,
    pub mentor_sign: String,
    pub date: String,
}

/// Builds the full default document.
pub fn default_document() -> Value {
    let partners: Vec<Partner> = DEFAULT_PARTNERS
        .iter()
        .map(|(name, blurb, url)| Partner {
            name: (*name).to_string(),
            blurb: (*blurb).to_string(),
            url: (*url).to_string(),
        })
        .collect();
    let skills: BTreeMap<String, SkillFlags> = DEFAULT_SKILLS
        .iter()
        .map(|(key, _)| ((*key).to_string(), SkillFlags::default()))
        .collect();
    let professions = vec![Profession::default(); PROFESSION_ROWS];

    let mut doc = Map::new();
    doc.insert(Section::Cover.as_key().into(), to_value(&Cover::default()));
    doc.insert(Section::Intro.as_key().into(), to_value(&Intro::default()));
    doc.insert(Section::Partners.as_key().into(), to_value(&partners));
    doc.insert(Section::Goals.as_key().into(), to_value(&Goals::default()));
    doc.insert(
        Section::Events.as_key().into(),
        to_value(&vec![EventRecord::blank()]),
    );
    doc.insert(Section::Skills.as_key().into(), to_value(&skills));
    doc.insert(
        Section::Reflection.as_key().into(),
        to_value(&Reflection::default()),
    );
    doc.insert(Section::Professions.as_key().into(), to_value(&professions));
    doc.insert(
        Section::Subjects.as_key().into(),
        to_value(&Subjects::default()),
    );
    doc.insert(
        Section::Passport.as_key().into(),
        to_value(&Passport::default()),
    );
    doc.insert(Section::Balance.as_key().into(), default_balance_value());
    Value::Object(doc)
}

/// Returns the default `balance` sub-tree as JSON.
pub fn default_balance_value() -> Value {
    to_value(&Balance::default())
}

/// Serializes a section record to JSON.
///
/// Every record here is made of strings, bools, maps with string keys and
/// sequences, so serialization cannot fail; `Null` is unreachable.
pub(crate) fn to_value<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}
