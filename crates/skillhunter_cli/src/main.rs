//! Command-line front end for the portfolio document store.
//!
//! # Responsibility
//! - Drive `skillhunter_core` operations against a SQLite-backed store.
//! - Print documents and derived views; write export and SVG files.
//!
//! # Invariants
//! - Paths are dotted (`events.0.place`); all-digit segments are indices.
//! - A failed command exits non-zero and leaves the stored document as it was.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde_json::Value;
use skillhunter_core::db::open_db;
use skillhunter_core::render::qr::{cover_qr_url, COVER_QR_SIZE};
use skillhunter_core::service::media::{encode_data_url, mime_for_path};
use skillhunter_core::{
    balance_categories, balance_wheel, default_document, init_logging, partners, region_markers,
    skill_progress, DocPath, PortfolioStore, SqliteSlotRepository, StoreConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "skillhunter")]
#[command(about = "Student engineering portfolio store", long_about = None)]
struct Cli {
    /// SQLite database file (defaults to SKILLHUNTER_DB_PATH or the temp dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory for rolling log files; logging stays off when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the document or the node at PATH
    Show {
        /// Dotted path such as `cover.name`
        path: Option<String>,
    },

    /// Write a JSON value at PATH; non-JSON input is stored as a string
    Set { path: String, value: String },

    /// Write the dated export file
    Export {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Replace the document with the contents of FILE
    Import { file: PathBuf },

    /// Add or remove event pages
    Event {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Add or remove partners
    Partner {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Set balance category INDEX to VALUE (clamped to 0..=10)
    Balance {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Toggle a skill checklist flag
    Skill {
        /// Skill key, for example `3d`
        key: String,
        /// tried|mastered|want
        flag: String,
        state: Toggle,
    },

    /// Print mastery progress
    Progress,

    /// Print the balance wheel polygon or write it as SVG
    Wheel {
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Print partner markers of the region map
    Map,

    /// Embed an image file at PATH as a data URL
    Image { path: String, file: PathBuf },

    /// Print the core version
    Version,
}

#[derive(Subcommand)]
enum ListAction {
    /// Append a blank entry
    Add,
    /// Remove the entry at INDEX
    Remove { index: usize },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

type Store<'conn> = PortfolioStore<SqliteSlotRepository<'conn>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = StoreConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }
    if let Some(dir) = &config.log_dir {
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            std::env::current_dir()
                .map_err(|err| format!("cannot resolve log dir: {err}"))?
                .join(dir)
        };
        init_logging(&config.log_level, &dir.to_string_lossy())?;
    }

    if let Commands::Version = cli.command {
        println!("skillhunter_core version={}", skillhunter_core::core_version());
        return Ok(());
    }

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let mut store = PortfolioStore::open(
        SqliteSlotRepository::new(&conn),
        config.storage_key.clone(),
        default_document(),
    );
    info!(
        "event=cli_command module=cli status=start db={}",
        config.db_path.display()
    );

    execute(&mut store, cli.command)?;
    match store.last_persist_error() {
        Some(err) => Err(format!("change kept in memory but not saved: {err}")),
        None => Ok(()),
    }
}

fn execute(store: &mut Store<'_>, command: Commands) -> Result<(), String> {
    match command {
        Commands::Show { path } => {
            let node = match path {
                Some(raw) => store.get(&parse_path(&raw)?).cloned().unwrap_or(Value::Null),
                None => store.document().clone(),
            };
            print_json(&node)
        }
        Commands::Set { path, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            store
                .set(&parse_path(&path)?, value)
                .map_err(|err| err.to_string())
        }
        Commands::Export { out } => {
            let artifact = store.export().map_err(|err| err.to_string())?;
            let target = out.join(&artifact.file_name);
            std::fs::write(&target, artifact.content)
                .map_err(|err| format!("cannot write `{}`: {err}", target.display()))?;
            println!("{}", target.display());
            Ok(())
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            store
                .import_json(&text)
                .map_err(|err| err.user_message().to_string())
        }
        Commands::Event { action } => match action {
            ListAction::Add => store.add_event().map(print_index),
            ListAction::Remove { index } => store.remove_event(index),
        }
        .map_err(|err| err.to_string()),
        Commands::Partner { action } => match action {
            ListAction::Add => store.add_partner().map(print_index),
            ListAction::Remove { index } => store.remove_partner(index),
        }
        .map_err(|err| err.to_string()),
        Commands::Balance { index, value } => {
            let stored = store
                .set_balance_value(index, value)
                .map_err(|err| err.to_string())?;
            println!("{stored}");
            Ok(())
        }
        Commands::Skill { key, flag, state } => store
            .set_skill_flag(&key, &flag, matches!(state, Toggle::On))
            .map_err(|err| err.to_string()),
        Commands::Progress => {
            let progress = skill_progress(store.document());
            println!(
                "{}/{} {}% {}",
                progress.mastered,
                progress.total,
                progress.percent,
                progress.level.label()
            );
            Ok(())
        }
        Commands::Wheel { svg } => {
            let chart = balance_wheel(&balance_categories(store.document()));
            match svg {
                Some(target) => std::fs::write(&target, chart.to_svg())
                    .map_err(|err| format!("cannot write `{}`: {err}", target.display())),
                None => {
                    println!("{}", chart.polygon_points());
                    Ok(())
                }
            }
        }
        Commands::Map => {
            for marker in region_markers(&partners(store.document())) {
                println!("{} {} {} {}", marker.cx, marker.cy, marker.color, marker.title);
            }
            if let Some(url) = cover_qr_url(store.document(), COVER_QR_SIZE) {
                println!("qr {url}");
            }
            Ok(())
        }
        Commands::Image { path, file } => {
            let bytes = std::fs::read(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let data_url = encode_data_url(mime_for_path(&file), &bytes);
            store
                .set(&parse_path(&path)?, Value::String(data_url))
                .map_err(|err| err.to_string())
        }
        Commands::Version => Ok(()),
    }
}

fn parse_path(raw: &str) -> Result<DocPath, String> {
    DocPath::parse_dotted(raw).map_err(|err| err.to_string())
}

fn print_json(value: &Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn print_index(index: usize) {
    println!("{index}");
}

#[cfg(test)]
mod tests {
    use super::{execute, Commands, ListAction, Store, Toggle};
    use clap::Parser;
    use skillhunter_core::db::open_db_in_memory;
    use skillhunter_core::{default_document, PortfolioStore, SqliteSlotRepository, STORAGE_KEY};

    fn with_store(f: impl FnOnce(&mut Store<'_>)) {
        let conn = open_db_in_memory().unwrap();
        let mut store =
            PortfolioStore::open(SqliteSlotRepository::new(&conn), STORAGE_KEY, default_document());
        f(&mut store);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        super::Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = super::Cli::try_parse_from(["skillhunter", "balance", "2", "-3", "--db", "x.db"])
            .unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("x.db")));
        assert!(matches!(cli.command, Commands::Balance { index: 2, value } if value == -3.0));
    }

    #[test]
    fn set_accepts_json_and_bare_strings() {
        with_store(|store| {
            execute(
                store,
                Commands::Set {
                    path: "cover.showQR".to_string(),
                    value: "false".to_string(),
                },
            )
            .unwrap();
            execute(
                store,
                Commands::Set {
                    path: "cover.name".to_string(),
                    value: "Маша".to_string(),
                },
            )
            .unwrap();
            assert_eq!(store.document()["cover"]["showQR"], false);
            assert_eq!(store.document()["cover"]["name"], "Маша");
        });
    }

    #[test]
    fn list_and_skill_commands_update_document() {
        with_store(|store| {
            execute(store, Commands::Event { action: ListAction::Add }).unwrap();
            assert_eq!(store.document()["events"].as_array().unwrap().len(), 2);
            assert!(execute(store, Commands::Partner { action: ListAction::Remove { index: 40 } })
                .is_err());

            execute(
                store,
                Commands::Skill {
                    key: "robotics".to_string(),
                    flag: "want".to_string(),
                    state: Toggle::On,
                },
            )
            .unwrap();
            assert_eq!(store.document()["skills"]["robotics"]["want"], true);
        });
    }

    #[test]
    fn import_failure_uses_user_message() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{").unwrap();

        with_store(|store| {
            let err = execute(store, Commands::Import { file }).unwrap_err();
            assert_eq!(err, "Неверный JSON");
        });
    }

    #[test]
    fn export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        with_store(|store| {
            execute(
                store,
                Commands::Export {
                    out: dir.path().to_path_buf(),
                },
            )
            .unwrap();
        });
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("skillhunter_") && names[0].ends_with(".json"));
    }

    #[test]
    fn image_is_embedded_as_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("me.png");
        std::fs::write(&file, b"hi").unwrap();
        with_store(|store| {
            execute(
                store,
                Commands::Image {
                    path: "cover.photo".to_string(),
                    file,
                },
            )
            .unwrap();
            assert_eq!(
                store.document()["cover"]["photo"],
                "data:image/png;base64,aGk="
            );
        });
    }
}
