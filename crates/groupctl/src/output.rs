//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use groupctl_core::{Notification, NotificationKind, NotificationSink, SizeCategory};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Size category label, tinted by bucket when color is on.
pub fn size_badge(category: SizeCategory, color: bool) -> String {
    let label = category.to_string();
    if !color {
        return label;
    }
    match category {
        SizeCategory::Empty => label.dimmed().to_string(),
        SizeCategory::Small => label.green().to_string(),
        SizeCategory::Medium => label.yellow().to_string(),
        SizeCategory::Large => label.magenta().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are a
/// key/value block rather than a table.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Notifications ────────────────────────────────────────────────────

/// Writes engine notifications to stderr.
///
/// Error notifications are skipped: the failing command returns the same
/// error, and miette reports it on exit.
pub struct StderrSink {
    quiet: bool,
    color: bool,
}

impl StderrSink {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self { quiet, color }
    }
}

impl NotificationSink for StderrSink {
    fn notify(&self, notification: Notification) {
        if self.quiet || notification.kind == NotificationKind::Error {
            return;
        }
        let marker = match (notification.kind, self.color) {
            (NotificationKind::Success, true) => "✓".green().to_string(),
            (NotificationKind::Warning, true) => "!".yellow().to_string(),
            (NotificationKind::Success, false) => "✓".into(),
            (NotificationKind::Warning, false) => "!".into(),
            _ => "·".into(),
        };
        let _ = writeln!(io::stderr().lock(), "{marker} {}", notification.message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: u32,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Name")]
        name: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: 1, name: "Linux servers" }, Item { id: 2, name: "Routers" }]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(
            OutputFormat::Plain,
            &items(),
            |i| Row { id: i.id, name: i.name },
            |i| i.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn table_has_headers_and_rows() {
        let out = render_list(
            OutputFormat::Table,
            &items(),
            |i| Row { id: i.id, name: i.name },
            |i| i.id.to_string(),
        )
        .unwrap();
        assert!(out.contains("ID"));
        assert!(out.contains("Linux servers"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_single(
            OutputFormat::JsonCompact,
            &items()[0],
            |_| String::new(),
            |_| String::new(),
        )
        .unwrap();
        assert_eq!(out, r#"{"id":1,"name":"Linux servers"}"#);
    }

    #[test]
    fn badge_is_plain_without_color() {
        assert_eq!(size_badge(SizeCategory::Medium, false), "medium");
        assert_ne!(size_badge(SizeCategory::Medium, true), "medium");
    }
}
