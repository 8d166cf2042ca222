//! Export a store's snapshot log to various formats

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use reflux_core::{History, Snapshot};
use serde::Serialize;
use std::io::Write;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
    /// CSV format (actions only)
    Csv,
    /// Human-readable text format
    Text,
}

/// Exporter for a snapshot log
pub struct Exporter<'a, S> {
    history: &'a History<S>,
    exported_at: DateTime<Utc>,
}

impl<'a, S> Exporter<'a, S> {
    /// Create a new exporter, stamped with the current time
    pub fn new(history: &'a History<S>) -> Self {
        Self {
            history,
            exported_at: Utc::now(),
        }
    }

    /// Override the export timestamp
    pub fn with_timestamp(mut self, exported_at: DateTime<Utc>) -> Self {
        self.exported_at = exported_at;
        self
    }

    /// Export to CSV format (one row per snapshot, no state)
    pub fn to_csv(&self) -> Result<String> {
        let mut output = String::new();
        output.push_str("seq,tag,current,detail\n");

        let current = self.history.current().seq;
        for snapshot in self.history.snapshots() {
            let tag = snapshot.action_tag().unwrap_or_default();
            let detail = action_detail(snapshot).unwrap_or_default();

            // Generic type names contain commas
            output.push_str(&format!(
                "{},{},{},{}\n",
                snapshot.seq,
                csv_field(tag),
                snapshot.seq == current,
                csv_field(&detail)
            ));
        }

        Ok(output)
    }

    /// Export to human-readable text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        let stats = self.history.stats();

        output.push_str("=== History Export ===\n\n");
        output.push_str(&format!("Exported at: {}\n", self.exported_at.to_rfc3339()));
        output.push_str(&format!("Snapshots: {}\n", stats.snapshot_count));
        output.push_str(&format!(
            "Sequence range: {} - {}\n",
            stats.first_seq, stats.last_seq
        ));
        output.push_str(&format!("Current: {}\n", stats.current_seq));

        output.push_str("\n=== Actions ===\n\n");

        for snapshot in self.history.snapshots() {
            let marker = if snapshot.seq == stats.current_seq {
                ">"
            } else {
                " "
            };
            match action_detail(snapshot) {
                Some(detail) => output.push_str(&format!(
                    "{} #{} {}\n      {}\n",
                    marker,
                    snapshot.seq,
                    snapshot.action_tag().unwrap_or_default(),
                    detail
                )),
                None => output.push_str(&format!("{} #{} [INITIAL]\n", marker, snapshot.seq)),
            }
        }

        output
    }
}

impl<S: Serialize> Exporter<'_, S> {
    /// Export to a string in the specified format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Ron => self.to_ron(),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let content = self.export(format)?;
        writer.write_all(content.as_bytes())?;
        tracing::debug!(?format, bytes = content.len(), "history exported");
        Ok(())
    }

    /// Export to RON format
    pub fn to_ron(&self) -> Result<String> {
        let export = ExportData::new(self.history, self.exported_at, self.history.snapshots());
        ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Export to JSON format
    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String> {
        let export = ExportData::new(self.history, self.exported_at, self.history.snapshots());
        serde_json::to_string_pretty(&export).map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(not(feature = "serde_json"))]
    pub fn to_json(&self) -> Result<String> {
        Err(Error::ExportError(
            "JSON export requires the 'serde_json' feature".to_string(),
        ))
    }

    /// Export only snapshots with `start <= seq <= end`
    pub fn export_range(&self, start: u64, end: u64, format: ExportFormat) -> Result<String> {
        if start > end {
            return Err(Error::InvalidSeqRange(start, end));
        }
        let snapshots: Vec<_> = self
            .history
            .snapshots()
            .iter()
            .filter(|snapshot| (start..=end).contains(&snapshot.seq))
            .cloned()
            .collect();
        let export = ExportData::new(self.history, self.exported_at, &snapshots);

        match format {
            ExportFormat::Ron => {
                ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
                    .map_err(|e| Error::Serialization(e.to_string()))
            }
            #[cfg(feature = "serde_json")]
            ExportFormat::Json => serde_json::to_string_pretty(&export)
                .map_err(|e| Error::Serialization(e.to_string())),
            #[cfg(not(feature = "serde_json"))]
            ExportFormat::Json => Err(Error::ExportError(
                "JSON export requires the 'serde_json' feature".to_string(),
            )),
            _ => Err(Error::ExportError(
                "Range export only supports RON and JSON".to_string(),
            )),
        }
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn action_detail<S>(snapshot: &Snapshot<S>) -> Option<String> {
    snapshot.action.as_ref().map(|action| format!("{action:?}"))
}

/// Serialized form of a (possibly filtered) log
#[derive(Serialize)]
struct ExportData<'a, S> {
    version: u32,
    exported_at: String,
    current_seq: u64,
    entries: Vec<ExportEntry<'a, S>>,
}

#[derive(Serialize)]
struct ExportEntry<'a, S> {
    seq: u64,
    tag: Option<&'static str>,
    action: Option<String>,
    state: &'a S,
}

impl<'a, S> ExportData<'a, S> {
    fn new(
        history: &History<S>,
        exported_at: DateTime<Utc>,
        snapshots: &'a [Snapshot<S>],
    ) -> Self {
        Self {
            version: 1,
            exported_at: exported_at.to_rfc3339(),
            current_seq: history.current().seq,
            entries: snapshots
                .iter()
                .map(|snapshot| ExportEntry {
                    seq: snapshot.seq,
                    tag: snapshot.action_tag(),
                    action: action_detail(snapshot),
                    state: &*snapshot.state,
                })
                .collect(),
        }
    }
}
