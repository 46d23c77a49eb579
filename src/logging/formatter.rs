//! Log formatting options for different output styles.
//!
//! Adapted from `lithair-core/src/logging/formatter.rs`; `Json` gained a `pretty` flag to back
//! the `log.pretty_json` field named in SPEC_FULL.md §6/§10.1, which has no teacher counterpart.

use crate::logging::destinations::LogEntry;

/// How logs should be formatted
#[derive(Clone, Debug, PartialEq)]
pub enum LogFormat {
    /// Structured JSON. `pretty` selects `serde_json::to_string_pretty` over the compact form.
    Json { pretty: bool },
    /// Human-readable format (development default).
    Human,
    /// Logfmt format (key=value pairs).
    Logfmt,
}

impl LogFormat {
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json { pretty } => format_json(entry, *pretty),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
        }
    }
}

fn format_json(entry: &LogEntry, pretty: bool) -> String {
    let mut json = serde_json::Map::new();

    json.insert("timestamp".to_string(), serde_json::Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".to_string(), serde_json::Value::String(format!("{:?}", entry.level).to_uppercase()));
    json.insert("message".to_string(), serde_json::Value::String(entry.message.clone()));
    json.insert("target".to_string(), serde_json::Value::String(entry.target.clone()));

    if let Some(location) = &entry.location {
        json.insert("file".to_string(), serde_json::Value::String(location.file.clone()));
        json.insert("line".to_string(), serde_json::Value::Number(serde_json::Number::from(location.line)));
    }

    for (key, value) in &entry.fields {
        json.insert(key.clone(), value.clone());
    }

    let value = serde_json::Value::Object(json);
    if pretty {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "failed to serialize log entry".to_string())
    } else {
        serde_json::to_string(&value).unwrap_or_else(|_| "failed to serialize log entry".to_string())
    }
}

fn format_human(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
    let level = format!("{:5}", format!("{:?}", entry.level).to_uppercase());

    let mut message = format!("{} {} [{}] {}", timestamp, level, entry.target, entry.message);

    for (key, value) in &entry.fields {
        let value_str = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => value.to_string(),
        };
        message.push_str(&format!(" {}={}", key, value_str));
    }

    if let Some(location) = &entry.location {
        message.push_str(&format!(" ({}:{})", location.file, location.line));
    }

    message
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = Vec::new();

    parts.push(format!("timestamp={}", entry.timestamp.to_rfc3339()));
    parts.push(format!("level={}", format!("{:?}", entry.level).to_uppercase()));
    parts.push(format!("target={}", entry.target));
    parts.push(format!("message=\"{}\"", entry.message.replace('"', "\\\"")));

    if let Some(location) = &entry.location {
        parts.push(format!("file=\"{}\"", location.file));
        parts.push(format!("line={}", location.line));
    }

    for (key, value) in &entry.fields {
        let value_str = match value {
            serde_json::Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => format!("\"{}\"", value.to_string().replace('"', "\\\"")),
        };
        parts.push(format!("{}={}", key, value_str));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{destinations::LogEntry, LogLevel};

    #[test]
    fn json_format() {
        let entry = LogEntry::new(LogLevel::Info, "Test message".to_string(), "test::module".to_string());
        let formatted = LogFormat::Json { pretty: false }.format_entry(&entry);
        let parsed: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(parsed["message"], "Test message");
        assert_eq!(parsed["level"], "INFO");
    }

    #[test]
    fn pretty_json_format_is_multiline() {
        let entry = LogEntry::new(LogLevel::Info, "Test message".to_string(), "test::module".to_string());
        let formatted = LogFormat::Json { pretty: true }.format_entry(&entry);
        assert!(formatted.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(parsed["message"], "Test message");
    }

    #[test]
    fn human_format() {
        let entry = LogEntry::new(LogLevel::Error, "Error occurred".to_string(), "app::handler".to_string())
            .with_field("user_id", serde_json::Value::Number(serde_json::Number::from(123)));
        let formatted = LogFormat::Human.format_entry(&entry);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("user_id=123"));
    }

    #[test]
    fn logfmt_format() {
        let entry = LogEntry::new(LogLevel::Warn, "Warning message".to_string(), "app::service".to_string());
        let formatted = LogFormat::Logfmt.format_entry(&entry);
        assert!(formatted.contains("level=WARN"));
        assert!(formatted.contains("message=\"Warning message\""));
    }
}
