mod config;
mod email;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use extractors::{ParseStatus, ScheduleParse, ShiftScheduleExtractor};
use shared_types::{Extractor, StoreRow};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::email::{load_email_from_eml, load_email_from_file, LoadedEmail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Parser, Debug)]
#[command(name = "shiftmail", version, about = "Parse a work-schedule email into shift rows")]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["eml_path", "body_file", "email_body"]),
))]
struct Cli {
    /// Path to a .eml file
    #[arg(long, value_name = "PATH", group = "input")]
    eml_path: Option<PathBuf>,

    /// Path to a file holding the plain-text or HTML body
    #[arg(long, value_name = "PATH", group = "input")]
    body_file: Option<PathBuf>,

    /// Raw email body text
    #[arg(long, group = "input")]
    email_body: Option<String>,

    /// Subject override
    #[arg(long)]
    subject: Option<String>,

    /// Year of the schedule's date window, instead of inferring it from the Date header
    #[arg(long)]
    year: Option<i32>,

    /// Keep only rows mentioning this name
    #[arg(long)]
    name: Option<String>,

    /// Keep every row regardless of name
    #[arg(long)]
    no_name_filter: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the body the parser walked to this file
    #[arg(long, value_name = "PATH")]
    dump_body: Option<PathBuf>,

    /// Config file instead of the per-user one
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file_path.as_deref());

    let (mut app_config, config_path) =
        AppConfig::load(cli.config.as_deref()).context("Failed to load shiftmail config")?;
    info!(config = ?config_path, "Loaded config");

    if let Some(name) = &cli.name {
        app_config.name = name.clone();
    }
    if cli.no_name_filter {
        app_config.filter_by_name = false;
    }

    let mut email = match (&cli.eml_path, &cli.body_file, &cli.email_body) {
        (Some(path), None, None) => load_email_from_eml(path)?,
        (None, Some(path), None) => load_email_from_file(path, cli.subject.clone())?,
        (None, None, Some(body)) => LoadedEmail::from_body(cli.subject.clone(), body.clone()),
        _ => unreachable!("clap enforces exactly one input"),
    };
    if let Some(subject) = &cli.subject {
        email.subject = subject.clone();
    }

    if let Some(path) = &cli.dump_body {
        std::fs::write(path, email.plain_body())
            .with_context(|| format!("Failed to write body to {:?}", path))?;
        info!(path = ?path, "Wrote email body");
    }

    let extractor = ShiftScheduleExtractor::new(app_config.schedule_config());
    let input = email.into_input(&app_config.timezone, app_config.name_filter(), cli.year);
    let parse = extractor
        .extract(&input)
        .with_context(|| format!("Failed to parse schedule from {}", input.email_id))?;

    match parse.status() {
        ParseStatus::NoRowsParsed => {
            warn!(
                window = %parse.window,
                stats = ?parse.stats,
                name = %app_config.name,
                filter_by_name = app_config.filter_by_name,
                "Schedule found but no rows parsed, nothing to do"
            );
        }
        ParseStatus::Rows(count) => {
            info!(count, window = %parse.window, "Extracted shift rows");
            let rows = extractor.store_rows(&parse);
            match cli.format {
                OutputFormat::Json => print_json(&parse, &rows)?,
                OutputFormat::Table => print_table(&rows),
            }
        }
    }

    Ok(())
}

/// Stderr logging filtered by `RUST_LOG`, plus a plain-text copy in `log_file_path` when set.
/// Log lines are flushed to the file until the returned guard is dropped.
fn init_tracing(log_file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let (file_layer, guard) = match log_file_path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path.file_name().unwrap_or(OsStr::new("shiftmail.log"));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init();

    guard
}

fn print_json(parse: &ScheduleParse, rows: &[StoreRow]) -> Result<()> {
    let output = serde_json::json!({
        "window": parse.window,
        "stats": parse.stats,
        "rows": rows,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_table(rows: &[StoreRow]) {
    let header = ["Date", "Time", "Location", "Title", "Notes"];
    let cells: Vec<[&str; 5]> = rows
        .iter()
        .map(|r| [r.date.as_str(), r.time.as_str(), r.location.as_str(), r.title.as_str(), r.notes.as_str()])
        .collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |row: &[&str; 5]| {
        row.iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(&header));
    for row in &cells {
        println!("{}", render(row));
    }
}
