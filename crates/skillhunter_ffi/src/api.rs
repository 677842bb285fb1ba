//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose document store operations to Dart via FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the store, applies one operation and closes it, so
//!   the persisted slot is the only state shared between calls.
//! - Paths and values cross the boundary as JSON text.
//!
//! # See also
//! - `skillhunter_core::service::portfolio_service`

use skillhunter_core::db::open_db;
use skillhunter_core::render::qr::{cover_qr_url as cover_qr_url_inner, COVER_QR_SIZE};
use skillhunter_core::service::media::{encode_data_url, mime_for_path};
use skillhunter_core::{
    balance_categories, balance_wheel as balance_wheel_inner, core_version as core_version_inner,
    init_logging as init_logging_inner, partners, region_markers,
    skill_progress as skill_progress_inner, DocPath, PortfolioStore, SqliteSlotRepository,
    StoreConfig,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Document read envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResponse {
    /// Whether the read succeeded.
    pub ok: bool,
    /// Serialized node; `None` when the path is absent or the read failed.
    pub json: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Mutation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the document was changed.
    pub ok: bool,
    /// Position of an appended list entry.
    pub index: Option<u32>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Set when the change applied in memory but could not be written.
    pub persist_error: Option<String>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, persist_error: Option<&str>) -> Self {
        Self {
            ok: true,
            index: None,
            message: message.into(),
            persist_error: persist_error.map(str::to_owned),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            index: None,
            message: message.into(),
            persist_error: None,
        }
    }

    fn with_index(mut self, index: usize) -> Self {
        self.index = u32::try_from(index).ok();
        self
    }
}

/// Export file envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub content: String,
    pub message: String,
}

/// Header progress bar state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub mastered: u32,
    pub total: u32,
    pub percent: u32,
    /// Localized level label.
    pub level: String,
}

/// One spoke label of the balance wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// SVG `text-anchor` value.
    pub anchor: String,
}

/// Balance wheel geometry in the 300x300 viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelView {
    /// SVG `points` attribute of the filled polygon.
    pub polygon_points: String,
    pub gridline_radii: Vec<f64>,
    pub labels: Vec<WheelLabel>,
    /// Standalone SVG rendering.
    pub svg: String,
}

/// Partner marker in the 200x200 map viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarkerView {
    pub title: String,
    pub cx: f64,
    pub cy: f64,
    pub color: String,
}

/// Returns the full document as JSON.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn document_json() -> DocumentResponse {
    document_json_in(&resolve_db_path())
}

/// Reads the node at `path_json` (for example `["events", 0, "place"]`).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Absent paths return `ok=true` with `json=None`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn document_get(path_json: String) -> DocumentResponse {
    document_get_in(&resolve_db_path(), &path_json)
}

/// Writes `value_json` at `path_json` and persists the document.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn document_set(path_json: String, value_json: String) -> ActionResponse {
    document_set_in(&resolve_db_path(), &path_json, &value_json)
}

/// Replaces the document with an imported file.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Invalid JSON leaves the document untouched; `message` then carries
///   the alert text for the user.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn document_import(text: String) -> ActionResponse {
    document_import_in(&resolve_db_path(), &text)
}

/// Builds the dated export file of the document.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn document_export() -> ExportResponse {
    document_export_in(&resolve_db_path())
}

/// Appends a blank event page.
#[flutter_rust_bridge::frb(sync)]
pub fn events_add() -> ActionResponse {
    with_store_action(&resolve_db_path(), "events_add", |store| {
        store.add_event().map(|index| ("Event added.", Some(index)))
    })
}

/// Removes event page `index`.
#[flutter_rust_bridge::frb(sync)]
pub fn events_remove(index: u32) -> ActionResponse {
    with_store_action(&resolve_db_path(), "events_remove", |store| {
        store
            .remove_event(index as usize)
            .map(|()| ("Event removed.", None))
    })
}

/// Appends a blank partner.
#[flutter_rust_bridge::frb(sync)]
pub fn partners_add() -> ActionResponse {
    with_store_action(&resolve_db_path(), "partners_add", |store| {
        store.add_partner().map(|index| ("Partner added.", Some(index)))
    })
}

/// Removes partner `index`.
#[flutter_rust_bridge::frb(sync)]
pub fn partners_remove(index: u32) -> ActionResponse {
    with_store_action(&resolve_db_path(), "partners_remove", |store| {
        store
            .remove_partner(index as usize)
            .map(|()| ("Partner removed.", None))
    })
}

/// Sets balance category `index` from a slider value; out-of-range input is
/// clamped and the stored value is reported in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn balance_set_value(index: u32, raw: f64) -> ActionResponse {
    balance_set_value_in(&resolve_db_path(), index, raw)
}

/// Dismisses the balance wheel hint.
#[flutter_rust_bridge::frb(sync)]
pub fn balance_mark_explained() -> ActionResponse {
    with_store_action(&resolve_db_path(), "balance_mark_explained", |store| {
        store
            .mark_balance_explained()
            .map(|()| ("Hint dismissed.", None))
    })
}

/// Sets one skill checklist flag (`tried|mastered|want`).
#[flutter_rust_bridge::frb(sync)]
pub fn skills_set_flag(skill: String, flag: String, on: bool) -> ActionResponse {
    with_store_action(&resolve_db_path(), "skills_set_flag", |store| {
        store
            .set_skill_flag(skill.trim(), flag.trim(), on)
            .map(|()| ("Skill updated.", None))
    })
}

/// Returns mastery progress; defaults to zero progress when the store
/// cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn skill_progress() -> ProgressView {
    skill_progress_in(&resolve_db_path())
}

/// Returns balance wheel geometry for the current document.
#[flutter_rust_bridge::frb(sync)]
pub fn balance_wheel() -> WheelView {
    balance_wheel_in(&resolve_db_path())
}

/// Returns partner markers for the region map page.
#[flutter_rust_bridge::frb(sync)]
pub fn region_map() -> Vec<MapMarkerView> {
    region_map_in(&resolve_db_path())
}

/// Returns the cover QR image URL, `None` when hidden or without a link.
#[flutter_rust_bridge::frb(sync)]
pub fn cover_qr_url() -> Option<String> {
    read_document(&resolve_db_path())
        .ok()
        .and_then(|doc| cover_qr_url_inner(&doc, COVER_QR_SIZE))
}

/// Encodes uploaded image bytes as a data URL for photo fields.
///
/// The MIME type is guessed from `file_name`.
#[flutter_rust_bridge::frb(sync)]
pub fn encode_image(file_name: String, bytes: Vec<u8>) -> String {
    encode_data_url(mime_for_path(Path::new(&file_name)), &bytes)
}

fn resolve_db_path() -> PathBuf {
    STORE_CONFIG
        .get_or_init(StoreConfig::from_env)
        .db_path
        .clone()
}

fn storage_key() -> String {
    STORE_CONFIG
        .get_or_init(StoreConfig::from_env)
        .storage_key
        .clone()
}

fn with_store<T>(
    db_path: &Path,
    f: impl FnOnce(&mut PortfolioStore<SqliteSlotRepository<'_>>) -> T,
) -> Result<T, String> {
    let conn = open_db(db_path).map_err(|err| format!("store DB open failed: {err}"))?;
    let mut store = PortfolioStore::open(
        SqliteSlotRepository::new(&conn),
        storage_key(),
        skillhunter_core::default_document(),
    );
    Ok(f(&mut store))
}

fn with_store_action(
    db_path: &Path,
    op: &str,
    f: impl FnOnce(
        &mut PortfolioStore<SqliteSlotRepository<'_>>,
    ) -> Result<(&'static str, Option<usize>), skillhunter_core::StoreError>,
) -> ActionResponse {
    let outcome = with_store(db_path, |store| {
        f(store).map(|(message, index)| {
            let response = ActionResponse::success(message, store.last_persist_error());
            match index {
                Some(index) => response.with_index(index),
                None => response,
            }
        })
    });
    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => ActionResponse::failure(format!("{op} failed: {err}")),
        Err(err) => ActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn read_document(db_path: &Path) -> Result<Value, String> {
    with_store(db_path, |store| store.document().clone())
}

fn parse_path(path_json: &str) -> Result<DocPath, String> {
    let raw: Value =
        serde_json::from_str(path_json).map_err(|err| format!("path is not JSON: {err}"))?;
    DocPath::from_json(&raw).map_err(|err| err.to_string())
}

fn document_json_in(db_path: &Path) -> DocumentResponse {
    match read_document(db_path) {
        Ok(doc) => DocumentResponse {
            ok: true,
            json: Some(doc.to_string()),
            message: "Document loaded.".to_string(),
        },
        Err(err) => DocumentResponse {
            ok: false,
            json: None,
            message: format!("document_json failed: {err}"),
        },
    }
}

fn document_get_in(db_path: &Path, path_json: &str) -> DocumentResponse {
    let result = parse_path(path_json).and_then(|path| {
        with_store(db_path, |store| store.get(&path).map(Value::to_string))
    });
    match result {
        Ok(Some(json)) => DocumentResponse {
            ok: true,
            json: Some(json),
            message: "Found.".to_string(),
        },
        Ok(None) => DocumentResponse {
            ok: true,
            json: None,
            message: "Path is absent.".to_string(),
        },
        Err(err) => DocumentResponse {
            ok: false,
            json: None,
            message: format!("document_get failed: {err}"),
        },
    }
}

fn document_set_in(db_path: &Path, path_json: &str, value_json: &str) -> ActionResponse {
    let path = match parse_path(path_json) {
        Ok(path) => path,
        Err(err) => return ActionResponse::failure(format!("document_set failed: {err}")),
    };
    let value: Value = match serde_json::from_str(value_json) {
        Ok(value) => value,
        Err(err) => {
            return ActionResponse::failure(format!("document_set failed: value is not JSON: {err}"))
        }
    };
    with_store_action(db_path, "document_set", |store| {
        store.set(&path, value).map(|()| ("Saved.", None))
    })
}

fn document_import_in(db_path: &Path, text: &str) -> ActionResponse {
    let outcome = with_store(db_path, |store| {
        store
            .import_json(text)
            .map(|()| ActionResponse::success("Imported.", store.last_persist_error()))
    });
    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            log::warn!("event=ffi_import module=ffi status=error error={err}");
            ActionResponse::failure(err.user_message())
        }
        Err(err) => ActionResponse::failure(format!("document_import failed: {err}")),
    }
}

fn document_export_in(db_path: &Path) -> ExportResponse {
    match with_store(db_path, |store| store.export()) {
        Ok(Ok(artifact)) => ExportResponse {
            ok: true,
            file_name: artifact.file_name,
            content: artifact.content,
            message: "Exported.".to_string(),
        },
        Ok(Err(err)) => export_failure(err.to_string()),
        Err(err) => export_failure(err),
    }
}

fn export_failure(err: String) -> ExportResponse {
    ExportResponse {
        ok: false,
        file_name: String::new(),
        content: String::new(),
        message: format!("document_export failed: {err}"),
    }
}

fn balance_set_value_in(db_path: &Path, index: u32, raw: f64) -> ActionResponse {
    let outcome = with_store(db_path, |store| {
        store
            .set_balance_value(index as usize, raw)
            .map(|stored| ActionResponse::success(stored.to_string(), store.last_persist_error()))
    });
    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => ActionResponse::failure(format!("balance_set_value failed: {err}")),
        Err(err) => ActionResponse::failure(format!("balance_set_value failed: {err}")),
    }
}

fn skill_progress_in(db_path: &Path) -> ProgressView {
    let doc = read_document(db_path).unwrap_or_else(|err| {
        log::warn!("event=ffi_progress module=ffi status=fallback error={err}");
        skillhunter_core::default_document()
    });
    let progress = skill_progress_inner(&doc);
    ProgressView {
        mastered: u32::try_from(progress.mastered).unwrap_or(u32::MAX),
        total: u32::try_from(progress.total).unwrap_or(u32::MAX),
        percent: progress.percent,
        level: progress.level.label().to_string(),
    }
}

fn balance_wheel_in(db_path: &Path) -> WheelView {
    let doc = read_document(db_path).unwrap_or_else(|err| {
        log::warn!("event=ffi_wheel module=ffi status=fallback error={err}");
        skillhunter_core::default_document()
    });
    let chart = balance_wheel_inner(&balance_categories(&doc));
    WheelView {
        polygon_points: chart.polygon_points(),
        gridline_radii: chart.gridlines.iter().map(|line| line.radius).collect(),
        labels: chart
            .labels
            .iter()
            .map(|label| WheelLabel {
                text: label.text.clone(),
                x: label.position.x,
                y: label.position.y,
                anchor: label.anchor.as_svg().to_string(),
            })
            .collect(),
        svg: chart.to_svg(),
    }
}

fn region_map_in(db_path: &Path) -> Vec<MapMarkerView> {
    let doc = match read_document(db_path) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("event=ffi_region_map module=ffi status=error error={err}");
            return Vec::new();
        }
    };
    region_markers(&partners(&doc))
        .into_iter()
        .map(|marker| MapMarkerView {
            title: marker.title,
            cx: marker.cx,
            cy: marker.cy,
            color: marker.color.to_string(),
        })
        .collect()
}
