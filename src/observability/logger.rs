//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `level`, then fields sorted by key
//! - Synchronous, no buffering
//! - ERROR lines go to stderr, everything else to stdout

use std::fmt;
use std::io::{self, Write};

use super::events::Event;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    /// Normal operations
    Info = 1,
    /// Degraded or rejected requests
    Warn = 2,
    /// Data access failures
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Logs a typed event at its own level
    pub fn event(event: Event, fields: &[(&str, &str)]) {
        Self::log(event.level(), event.as_str(), fields);
    }

    /// Log an event name with the given level and fields
    pub fn log(level: LogLevel, event: &str, fields: &[(&str, &str)]) {
        if level >= LogLevel::Error {
            Self::write_line(level, event, fields, &mut io::stderr());
        } else {
            Self::write_line(level, event, fields, &mut io::stdout());
        }
    }

    /// Writes one JSON line to `writer`
    pub fn write_line<W: Write>(level: LogLevel, event: &str, fields: &[(&str, &str)], writer: &mut W) {
        let _ = writer.write_all(Self::format_line(level, event, fields).as_bytes());
        let _ = writer.flush();
    }

    fn format_line(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"level\":\"");
        output.push_str(level.as_str());
        output.push('"');

        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");
        output
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => output.push_str(&format!("\\u{:04x}", c as u32)),
                c => output.push(c),
            }
        }
    }
}

/// Capture one log line for testing
#[cfg(test)]
pub fn capture_log(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::write_line(level, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
