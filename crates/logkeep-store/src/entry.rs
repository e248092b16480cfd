//! Log entries: the payloads the write pipeline appends

use chrono::{DateTime, Local};
use logkeep_core::{Category, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// What the writer knows when an entry is serialized
#[derive(Debug, Clone, Copy)]
pub struct WriteContext<'a> {
    /// File the entry is being appended to
    pub target: &'a Path,
    pub written_at: DateTime<Local>,
}

/// Capability for payloads defined outside this crate
pub trait EntrySerializer: Send + Sync + fmt::Debug {
    fn category(&self) -> Category;

    fn write_to(&self, ctx: &WriteContext<'_>, sink: &mut dyn Write) -> io::Result<()>;
}

/// One entry to be written exactly once
#[derive(Debug)]
pub enum LogEntry {
    Structured(JsonEntry),
    Raw(RawEntry),
    Custom(Box<dyn EntrySerializer>),
}

impl LogEntry {
    pub fn category(&self) -> Category {
        match self {
            LogEntry::Structured(_) => Category::Structured,
            LogEntry::Raw(_) => Category::Raw,
            LogEntry::Custom(custom) => custom.category(),
        }
    }

    pub fn write_to(&self, ctx: &WriteContext<'_>, sink: &mut dyn Write) -> io::Result<()> {
        match self {
            LogEntry::Structured(entry) => entry.write_to(sink),
            LogEntry::Raw(entry) => entry.write_to(sink),
            LogEntry::Custom(custom) => custom.write_to(ctx, sink),
        }
    }
}

impl From<JsonEntry> for LogEntry {
    fn from(entry: JsonEntry) -> Self {
        LogEntry::Structured(entry)
    }
}

impl From<RawEntry> for LogEntry {
    fn from(entry: RawEntry) -> Self {
        LogEntry::Raw(entry)
    }
}

impl From<Box<dyn EntrySerializer>> for LogEntry {
    fn from(custom: Box<dyn EntrySerializer>) -> Self {
        LogEntry::Custom(custom)
    }
}

/// A single JSON line in the structured stream, kept as the producer
/// serialized it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonEntry {
    message: String,
}

impl JsonEntry {
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        let map: serde_json::Map<String, serde_json::Value> = fields
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        Self {
            message: serde_json::Value::Object(map).to_string(),
        }
    }

    /// Serialize once, keeping the field order `value` serializes in
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            message: serde_json::to_string(value)?,
        })
    }

    /// The serialized line, without the trailing newline
    pub fn message(&self) -> &str {
        &self.message
    }

    fn write_to(&self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(self.message.as_bytes())?;
        sink.write_all(b"\n")
    }
}

/// Body of a raw dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    Empty,
    Text(String),
    Bytes(Vec<u8>),
    /// Contents of a file, read at write time
    File(PathBuf),
}

/// A free-form dump that gets a file of its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub label: String,
    pub event_time: DateTime<Local>,
    /// Process uptime when the event happened
    pub uptime: Duration,
    pub body: RawBody,
}

impl RawEntry {
    pub fn new(label: impl Into<String>, event_time: DateTime<Local>, uptime: Duration) -> Self {
        Self {
            label: label.into(),
            event_time,
            uptime,
            body: RawBody::Empty,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = RawBody::Text(text.into());
        self
    }

    pub fn with_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = RawBody::Bytes(bytes.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.body = RawBody::File(path.into());
        self
    }

    /// `label\n<iso time> <uptime ms>\n`
    pub fn header(&self) -> String {
        format!(
            "{}\n{} {}\n",
            self.label,
            self.event_time.format(ISO_FORMAT),
            self.uptime.as_millis()
        )
    }

    fn write_to(&self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(self.header().as_bytes())?;
        match &self.body {
            RawBody::Empty => Ok(()),
            RawBody::Text(text) => sink.write_all(text.as_bytes()),
            RawBody::Bytes(bytes) => sink.write_all(bytes),
            RawBody::File(path) => match File::open(path) {
                Ok(mut file) => io::copy(&mut file, sink).map(|_| ()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    write!(sink, "No content found at {}", path.display())
                }
                Err(e) => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn ctx(target: &Path) -> WriteContext<'_> {
        WriteContext {
            target,
            written_at: Local::now(),
        }
    }

    fn render(entry: &LogEntry) -> String {
        let mut out = Vec::new();
        entry.write_to(&ctx(Path::new("/tmp/x.log")), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_json_entry_is_one_line() {
        let mut fields = BTreeMap::new();
        fields.insert("event".to_string(), "start".to_string());
        fields.insert("user".to_string(), "a\nb".to_string());
        let entry = LogEntry::from(JsonEntry::from_fields(fields));

        assert_eq!(entry.category(), Category::Structured);
        assert_eq!(render(&entry), "{\"event\":\"start\",\"user\":\"a\\nb\"}\n");
    }

    #[test]
    fn test_json_entry_from_value() {
        #[derive(Serialize)]
        struct Event {
            name: &'static str,
            count: u32,
        }
        let entry = JsonEntry::from_value(&Event { name: "tick", count: 3 }).unwrap();
        assert_eq!(entry.message(), "{\"name\":\"tick\",\"count\":3}");
    }

    #[test]
    fn test_raw_entry_header_and_text() {
        let time = Local.with_ymd_and_hms(2014, 5, 1, 14, 15, 16).single().unwrap();
        let entry = RawEntry::new("crash", time, Duration::from_millis(1500)).with_text("boom");
        let text = render(&LogEntry::from(entry));

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("crash"));
        let stamp = lines.next().unwrap();
        assert!(stamp.starts_with("2014-05-01T14:15:16.000"));
        assert!(stamp.ends_with(" 1500"));
        assert_eq!(lines.next(), Some("boom"));
    }

    #[test]
    fn test_raw_entry_dumps_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dump.bin");
        std::fs::write(&source, "payload").unwrap();

        let entry = RawEntry::new("dump", Local::now(), Duration::ZERO).with_file(&source);
        assert!(render(&LogEntry::from(entry)).ends_with("\npayload"));
    }

    #[test]
    fn test_raw_entry_missing_file() {
        let entry = RawEntry::new("dump", Local::now(), Duration::ZERO)
            .with_file("/nonexistent/dump.bin");
        assert!(render(&LogEntry::from(entry)).ends_with("No content found at /nonexistent/dump.bin"));
    }

    #[derive(Debug)]
    struct Marker;

    impl EntrySerializer for Marker {
        fn category(&self) -> Category {
            Category::Raw
        }

        fn write_to(&self, ctx: &WriteContext<'_>, sink: &mut dyn Write) -> io::Result<()> {
            write!(sink, "marker for {}", ctx.target.display())
        }
    }

    #[test]
    fn test_custom_serializer() {
        let entry = LogEntry::from(Box::new(Marker) as Box<dyn EntrySerializer>);
        assert_eq!(entry.category(), Category::Raw);
        assert_eq!(render(&entry), "marker for /tmp/x.log");
    }
}
