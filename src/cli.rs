//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::console_notifier::ConsoleNotifier;
use crate::adapters::csv_content_adapter::CsvContentAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_file_adapter::{DEFAULT_STORAGE_KEY, JsonFileAdapter};
use crate::adapters::memory_storage_adapter::MemoryStorageAdapter;
use crate::domain::command_parser;
use crate::domain::config_validation::validate_config;
use crate::domain::error::TradeboardError;
use crate::domain::geometry::GridSpec;
use crate::domain::widget::{WidgetCatalog, WidgetId};
use crate::domain::workspace::{Workspace, WriteStatus};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::notification_port::NotificationPort;
use crate::ports::storage_port::LayoutStoragePort;

#[derive(Parser, Debug)]
#[command(name = "tradeboard", about = "Trading workspace dashboard layouts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the widget catalog
    Widgets,
    /// Print the cards of the active layout
    Show {
        #[arg(short, long)]
        config: PathBuf,
        /// Show this layout instead of the active one
        #[arg(long)]
        layout: Option<String>,
    },
    /// List saved layouts
    Layouts {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Apply a command script (stdin when no file is given)
    Run {
        #[arg(short, long)]
        config: PathBuf,
        script: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Outcome of a scripted session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSummary {
    pub applied: usize,
    pub rejected: usize,
    pub failed_writes: usize,
}

pub fn run(cli: Cli) -> ExitCode {
    logging::init();
    match cli.command {
        Command::Widgets => run_widgets(),
        Command::Show { config, layout } => run_show(&config, layout.as_deref()),
        Command::Layouts { config } => run_layouts(&config),
        Command::Run { config, script } => run_script_command(&config, script.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradeboardError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_grid_spec(config: &dyn ConfigPort) -> GridSpec {
    let defaults = GridSpec::default();
    let get = |key: &str, default: u32| config.get_int("grid", key, default as i64) as u32;
    GridSpec {
        columns: get("columns", defaults.columns),
        card_width: get("card_width", defaults.card_width),
        card_height: get("card_height", defaults.card_height),
        min_width: get("min_width", defaults.min_width),
        min_height: get("min_height", defaults.min_height),
    }
}

pub fn build_storage(config: &dyn ConfigPort) -> Result<Box<dyn LayoutStoragePort>, TradeboardError> {
    let backend = config
        .get_string("storage", "backend")
        .unwrap_or_else(|| "json".to_string())
        .trim()
        .to_lowercase();
    let key = config
        .get_string("storage", "key")
        .map(|k| k.trim().to_string())
        .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

    match backend.as_str() {
        "memory" => Ok(Box::new(MemoryStorageAdapter::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        "json" => {
            let path = config
                .get_string("storage", "path")
                .ok_or_else(|| TradeboardError::ConfigMissing {
                    section: "storage".into(),
                    key: "path".into(),
                })?;
            let pretty = config.get_bool("storage", "pretty", true);
            Ok(Box::new(
                JsonFileAdapter::new(path.trim(), &key).with_pretty(pretty),
            ))
        }
        other => Err(TradeboardError::ConfigInvalid {
            section: "storage".into(),
            key: "backend".into(),
            reason: format!("unsupported backend '{}'", other),
        }),
    }
}

pub fn build_catalog(config: &dyn ConfigPort) -> Result<WidgetCatalog, TradeboardError> {
    match config
        .get_string("content", "quotes")
        .filter(|p| !p.trim().is_empty())
    {
        Some(path) => {
            let content = CsvContentAdapter::from_file(path.trim())?;
            Ok(WidgetCatalog::new(Arc::new(content)))
        }
        None => Ok(WidgetCatalog::placeholder()),
    }
}

/// Validate the config and open a workspace on it.
pub fn open_workspace(
    config: &dyn ConfigPort,
    notifier: Box<dyn NotificationPort>,
) -> Result<Workspace, TradeboardError> {
    validate_config(config)?;
    let grid = build_grid_spec(config);
    let storage = build_storage(config)?;
    let catalog = build_catalog(config)?;
    Ok(Workspace::open(grid, catalog, storage, notifier))
}

/// Apply each line of `reader` to the workspace.
///
/// Rejected commands are counted and the session continues. A line that
/// does not parse stops the session.
pub fn run_script<R: BufRead>(
    workspace: &mut Workspace,
    reader: R,
) -> Result<ScriptSummary, TradeboardError> {
    let mut summary = ScriptSummary::default();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let action = match command_parser::parse(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("error: line {}:\n{}", number + 1, e.display_with_context(&line));
                return Err(e.into());
            }
        };
        match workspace.perform(action) {
            Ok(WriteStatus::Failed(_)) => {
                summary.applied += 1;
                summary.failed_writes += 1;
            }
            Ok(_) => summary.applied += 1,
            Err(_) => summary.rejected += 1,
        }
    }
    Ok(summary)
}

fn run_widgets() -> ExitCode {
    let catalog = WidgetCatalog::placeholder();
    for widget in catalog.iter() {
        println!("{:<14} {}", widget.key.key(), widget.label);
    }
    ExitCode::SUCCESS
}

fn run_show(config_path: &PathBuf, layout: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let mut workspace = match open_workspace(&config, Box::new(ConsoleNotifier::new(io::sink()))) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(name) = layout {
        if let Err(e) = workspace.switch_layout(name) {
            let err = TradeboardError::from(e);
            eprintln!("error: {err}");
            return (&err).into();
        }
    }

    print_dashboard(&workspace);
    ExitCode::SUCCESS
}

fn print_dashboard(workspace: &Workspace) {
    let dashboard = workspace.dashboard();
    println!("Layout: {}", workspace.active_layout());
    let cards = dashboard.cards();
    if cards.is_empty() {
        println!("(no cards)");
        return;
    }
    for card in cards {
        let g = card.geometry;
        let tabs: Vec<String> = card
            .widgets
            .iter()
            .map(|w| {
                let label = dashboard.catalog().label(*w);
                if *w == card.active {
                    format!("{}*", label)
                } else {
                    label.to_string()
                }
            })
            .collect();
        println!(
            "{}  x={} y={} w={} h={}  [{}]",
            g.card_id,
            g.x,
            g.y,
            g.w,
            g.h,
            tabs.join(" | ")
        );
        let content = dashboard.catalog().get(card.active).content.render();
        for line in content.lines() {
            println!("    {}", line);
        }
    }
}

fn run_layouts(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let workspace = match open_workspace(&config, Box::new(ConsoleNotifier::new(io::sink()))) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let book = workspace.layouts();
    for name in book.names() {
        let marker = if name == book.active_name() { "*" } else { " " };
        let cards = book.get(name).map(|s| s.card_count()).unwrap_or(0);
        println!("{} {} ({} cards)", marker, name, cards);
    }
    ExitCode::SUCCESS
}

fn run_script_command(config_path: &PathBuf, script: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let mut workspace = match open_workspace(&config, Box::new(ConsoleNotifier::stdout())) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = match script {
        Some(path) => match fs::File::open(path) {
            Ok(file) => run_script(&mut workspace, BufReader::new(file)),
            Err(e) => {
                eprintln!("error: failed to open {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        },
        None => run_script(&mut workspace, io::stdin().lock()),
    };

    match result {
        Ok(summary) => {
            eprintln!(
                "{} commands applied, {} rejected, {} failed writes",
                summary.applied, summary.rejected, summary.failed_writes
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if !matches!(e, TradeboardError::Command(_)) {
                eprintln!("error: {e}");
            }
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let grid = build_grid_spec(&config);
    eprintln!(
        "  grid: {} columns, new cards {}x{} (min {}x{})",
        grid.columns, grid.card_width, grid.card_height, grid.min_width, grid.min_height
    );
    if let Err(e) = build_catalog(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("  widgets: {}", WidgetId::ALL.len());
    eprintln!("Configuration is valid");
    ExitCode::SUCCESS
}
