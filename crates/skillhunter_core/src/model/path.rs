//! Typed document paths and path-based get/set.
//!
//! # Responsibility
//! - Address any node of the document by a sequence of key/index segments.
//! - Provide read traversal and copy-on-write replacement by path.
//!
//! # Invariants
//! - `set` creates fresh containers for every missing or non-container node
//!   along the path, overwriting whatever scalar value was there.
//! - `set` never touches nodes outside the addressed branch and never creates
//!   siblings other than the appended list entry.
//! - A failed `set` leaves the document untouched.

use crate::model::document::Section;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One step of a document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Field of an object (section name, record field, map key).
    Key(String),
    /// Position inside an ordered list.
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Errors raised while building or applying a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Paths need at least one segment.
    Empty,
    /// A segment is neither a non-empty string nor a non-negative integer.
    InvalidSegment(String),
    /// A non-numeric key was applied to a list.
    KeyOnList(String),
    /// An index skips past the end of a list.
    IndexOutOfBounds { index: usize, len: usize },
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "document path cannot be empty"),
            Self::InvalidSegment(segment) => write!(f, "invalid path segment `{segment}`"),
            Self::KeyOnList(key) => write!(f, "key `{key}` cannot address a list entry"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} skips past the end of a list with {len} entries")
            }
        }
    }
}

impl Error for PathError {}

/// Ordered key path into the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    /// Starts a path at a top-level section.
    pub fn section(section: Section) -> Self {
        Self {
            segments: vec![PathSegment::Key(section.as_key().to_string())],
        }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { segments })
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// Parses `events.0.place` style paths. All-digit segments become indices.
    pub fn parse_dotted(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            if part.is_empty() {
                return Err(PathError::InvalidSegment(raw.to_string()));
            }
            if part.bytes().all(|byte| byte.is_ascii_digit()) {
                let index = part
                    .parse::<usize>()
                    .map_err(|_| PathError::InvalidSegment(part.to_string()))?;
                segments.push(PathSegment::Index(index));
            } else {
                segments.push(PathSegment::Key(part.to_string()));
            }
        }
        Self::from_segments(segments)
    }

    /// Builds a path from a JSON array such as `["events", 0, "place"]`.
    pub fn from_json(value: &Value) -> Result<Self, PathError> {
        let items = value
            .as_array()
            .ok_or_else(|| PathError::InvalidSegment(value.to_string()))?;

        let mut segments = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(key) if !key.is_empty() => {
                    segments.push(PathSegment::Key(key.clone()));
                }
                Value::Number(number) => {
                    let index = number
                        .as_u64()
                        .and_then(|raw| usize::try_from(raw).ok())
                        .ok_or_else(|| PathError::InvalidSegment(number.to_string()))?;
                    segments.push(PathSegment::Index(index));
                }
                other => return Err(PathError::InvalidSegment(other.to_string())),
            }
        }
        Self::from_segments(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the top-level section this path starts in, if it names one.
    pub fn root_section(&self) -> Option<Section> {
        match self.segments.first() {
            Some(PathSegment::Key(key)) => Section::from_key(key),
            _ => None,
        }
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Reads the node addressed by `path`. Returns `None` when any step is absent.
pub fn get_path<'a>(doc: &'a Value, path: &DocPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(doc, |node, segment| match (node, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key),
            (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
            (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
            (Value::Array(items), PathSegment::Key(key)) => items.get(list_index(key)?),
            _ => None,
        })
}

/// Returns a copy of `doc` with the node at `path` replaced by `value`.
///
/// Missing or scalar nodes along the path are replaced by a fresh object
/// (for a key step) or a fresh list (for an index step). An index step on
/// an object uses the decimal index as key, and a decimal key step on a
/// list acts as an index. An index equal to the list length appends.
///
/// # Errors
/// - `PathError::Empty` for an empty path.
/// - `PathError::KeyOnList` for a non-numeric key applied to a list.
/// - `PathError::IndexOutOfBounds` for an index past the list length.
///
/// On error `doc` is untouched and no partial copy escapes.
pub fn set_path(doc: &Value, path: &DocPath, value: Value) -> Result<Value, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let mut next = doc.clone();
    let mut node = &mut next;
    for segment in path.segments() {
        node = child_slot(node, segment)?;
    }
    *node = value;
    Ok(next)
}

fn child_slot<'a>(node: &'a mut Value, segment: &PathSegment) -> Result<&'a mut Value, PathError> {
    if !node.is_object() && !node.is_array() {
        *node = match segment {
            PathSegment::Key(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        };
    }

    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => {
            Ok(map.entry(key.clone()).or_insert(Value::Null))
        }
        (Value::Object(map), PathSegment::Index(index)) => {
            Ok(map.entry(index.to_string()).or_insert(Value::Null))
        }
        (Value::Array(items), PathSegment::Index(index)) => list_slot(items, *index),
        (Value::Array(items), PathSegment::Key(key)) => {
            let index = list_index(key).ok_or_else(|| PathError::KeyOnList(key.clone()))?;
            list_slot(items, index)
        }
        (_, segment) => Err(PathError::InvalidSegment(segment.to_string())),
    }
}

fn list_slot(items: &mut Vec<Value>, index: usize) -> Result<&mut Value, PathError> {
    let len = items.len();
    if index > len {
        return Err(PathError::IndexOutOfBounds { index, len });
    }
    if index == len {
        items.push(Value::Null);
    }
    Ok(&mut items[index])
}

fn list_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{get_path, set_path, DocPath, PathError, PathSegment};
    use crate::model::document::Section;
    use serde_json::json;

    #[test]
    fn parse_dotted_detects_indices() {
        let path = DocPath::parse_dotted("events.2.skills.3d").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("events".into()),
                PathSegment::Index(2),
                PathSegment::Key("skills".into()),
                PathSegment::Key("3d".into()),
            ]
        );
        assert_eq!(path.to_string(), "events.2.skills.3d");
        assert_eq!(path.root_section(), Some(Section::Events));
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(DocPath::parse_dotted("  "), Err(PathError::Empty));
        assert!(matches!(
            DocPath::parse_dotted("cover..name"),
            Err(PathError::InvalidSegment(_))
        ));
        assert_eq!(DocPath::from_json(&json!([])), Err(PathError::Empty));
        assert!(DocPath::from_json(&json!(["events", -1])).is_err());
        assert!(DocPath::from_json(&json!(["events", true])).is_err());
    }

    #[test]
    fn get_returns_none_for_missing_steps() {
        let doc = json!({ "cover": { "name": "Ann" } });
        let name = DocPath::section(Section::Cover).key("name");
        let missing = DocPath::section(Section::Cover).key("photo");
        let through_scalar = DocPath::section(Section::Cover).key("name").key("first");

        assert_eq!(get_path(&doc, &name), Some(&json!("Ann")));
        assert_eq!(get_path(&doc, &missing), None);
        assert_eq!(get_path(&doc, &through_scalar), None);
    }

    #[test]
    fn set_creates_missing_and_overwrites_scalar_intermediates() {
        let doc = json!({ "goals": "legacy", "cover": { "name": "Ann" } });
        let path = DocPath::section(Section::Goals).key("target");

        let next = set_path(&doc, &path, json!("robots")).unwrap();
        assert_eq!(next["goals"], json!({ "target": "robots" }));
        assert_eq!(next["cover"]["name"], "Ann");
        assert_eq!(doc["goals"], "legacy");
    }

    #[test]
    fn set_index_appends_and_rejects_gaps() {
        let doc = json!({ "partners": [{ "name": "A" }] });
        let append = DocPath::section(Section::Partners).index(1);
        let gap = DocPath::section(Section::Partners).index(3).key("name");

        let appended = set_path(&doc, &append, json!({ "name": "B" })).unwrap();
        assert_eq!(appended["partners"].as_array().map(Vec::len), Some(2));

        assert_eq!(
            set_path(&doc, &gap, json!("D")),
            Err(PathError::IndexOutOfBounds { index: 3, len: 1 })
        );
    }

    #[test]
    fn mixed_segment_kinds_follow_container_type() {
        let doc = json!({ "partners": [{ "name": "A" }], "skills": {} });

        let by_numeric_key = DocPath::parse_dotted("partners.0.name")
            .unwrap()
            .segments()
            .to_vec();
        assert_eq!(by_numeric_key[1], PathSegment::Index(0));
        let numeric_key = DocPath::from_segments(vec![
            PathSegment::Key("partners".into()),
            PathSegment::Key("0".into()),
            PathSegment::Key("name".into()),
        ])
        .unwrap();
        let next = set_path(&doc, &numeric_key, json!("Z")).unwrap();
        assert_eq!(next["partners"][0]["name"], "Z");
        assert_eq!(get_path(&next, &numeric_key), Some(&json!("Z")));

        let index_on_object = DocPath::section(Section::Skills).index(2);
        let next = set_path(&doc, &index_on_object, json!(true)).unwrap();
        assert_eq!(next["skills"]["2"], true);
        assert_eq!(get_path(&next, &index_on_object), Some(&json!(true)));

        let key_on_list = DocPath::section(Section::Partners).key("first");
        assert_eq!(
            set_path(&doc, &key_on_list, json!(1)),
            Err(PathError::KeyOnList("first".into()))
        );
    }

    #[test]
    fn single_segment_replaces_whole_section() {
        let doc = json!({ "skills": { "3d": { "tried": true } }, "intro": {} });
        let next = set_path(&doc, &DocPath::section(Section::Skills), json!({})).unwrap();
        assert_eq!(next["skills"], json!({}));
        assert_eq!(next["intro"], json!({}));
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(
            set_path(&json!({}), &DocPath::default(), json!(1)),
            Err(PathError::Empty)
        );
    }
}
