//! Terminal and file logging.
//!
//! Terminal events are rendered by [`SweeprFormatter`] as a colored
//! symbol plus the message. When a log file is configured, a second
//! layer appends plain `YYYY-MM-DD HH:MM:SS - message` lines and the
//! file is pruned to a 7-day retention window on startup.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use chrono::{Local, NaiveDateTime, TimeDelta};
use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

const SUCCESS_TARGET: &str = "sweepr::success";
const LOG_RETENTION_DAYS: i64 = 7;
const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SweeprFormatter;

impl<S, N> FormatEvent<S, N> for SweeprFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            if meta.target() == SUCCESS_TARGET {
                ("[✓]", |s| s.green().bold())
            } else {
                match *meta.level() {
                    Level::TRACE => ("[ ]", |s| s.dimmed()),
                    Level::DEBUG => ("[?]", |s| s.blue()),
                    Level::INFO => ("[+]", |s| s.green().bold()),
                    Level::WARN => ("[*]", |s| s.yellow().bold()),
                    Level::ERROR => ("[-]", |s| s.red().bold()),
                }
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Plain formatter for the sweep log file, one timestamped line per
/// event.
pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "{} - ", Local::now().format(LOG_TIMESTAMP_FORMAT))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Installs the global subscriber: symbol-formatted events on stderr,
/// plus the plain append-only file layer when `log_file` is set.
pub fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(SweeprFormatter)
        .with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            prune_old_entries(path)
                .with_context(|| format!("pruning log file '{}'", path.display()))?;

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file '{}'", path.display()))?;
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(FileFormatter)
                .with_ansi(false)
                .with_writer(Mutex::new(file));

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
        }
    }

    Ok(())
}

/// Drops log entries older than the retention window. Lines whose
/// leading timestamp does not parse are treated as malformed and
/// dropped with them.
fn prune_old_entries(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let contents = fs::read_to_string(path)?;
    let cutoff: NaiveDateTime =
        Local::now().naive_local() - TimeDelta::days(LOG_RETENTION_DAYS);

    let retained: Vec<&str> = contents
        .lines()
        .filter(|line| {
            line.split_once(" - ")
                .and_then(|(stamp, _)| {
                    NaiveDateTime::parse_from_str(stamp, LOG_TIMESTAMP_FORMAT).ok()
                })
                .is_some_and(|entry_time| entry_time >= cutoff)
        })
        .collect();

    let mut output: String = retained.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    fs::write(path, output)?;

    Ok(())
}
