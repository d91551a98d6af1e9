//! Line layouts for session layers.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::Path;
use tracing::{Event, Level, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Event layout applied by a session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFormat {
    /// `2020-06-15 13:49:44 - INFO [module]: message`
    Simple,
    /// The bare message.
    Raw,
}

impl SessionFormat {
    /// Prefix written before the message; empty for `Raw`.
    pub fn prefix(self, at: &DateTime<Local>, level: &Level, module: &str) -> String {
        match self {
            SessionFormat::Simple => format!(
                "{} - {} [{}]: ",
                at.format(DATE_FORMAT),
                level_name(level),
                module
            ),
            SessionFormat::Raw => String::new(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for SessionFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // Records bridged from the `log` crate carry their real location in
        // the normalized metadata.
        let normalized = event.normalized_metadata();
        let meta = normalized.as_ref().unwrap_or_else(|| event.metadata());
        let module = module_name(meta.file(), meta.module_path());
        write!(writer, "{}", self.prefix(&Local::now(), meta.level(), module))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn level_name(level: &Level) -> &'static str {
    if *level == Level::ERROR {
        "ERROR"
    } else if *level == Level::WARN {
        "WARNING"
    } else if *level == Level::INFO {
        "INFO"
    } else if *level == Level::DEBUG {
        "DEBUG"
    } else {
        "TRACE"
    }
}

/// Short module name for a source location: the file stem of `file`, else the
/// last segment of `module_path`.
pub fn module_name<'a>(file: Option<&'a str>, module_path: Option<&'a str>) -> &'a str {
    if let Some(stem) = file
        .and_then(|f| Path::new(f).file_stem())
        .and_then(|s| s.to_str())
    {
        return stem;
    }
    module_path
        .and_then(|m| m.rsplit("::").next())
        .unwrap_or("root")
}
