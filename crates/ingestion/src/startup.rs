//! Startup payload loading.
//!
//! The login handshake and the `game/startup` request live outside this
//! crate; whatever performs them hands over a [`StartupPayload`]. The only
//! implementation shipped here reads a payload previously saved to disk.

use hoh_core::{Error, RawRecord, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Raw response of the startup endpoint.
#[derive(Debug, Clone, Default)]
pub struct StartupPayload {
    /// JSON rendering of the startup response.
    pub json_text: String,
    /// Protobuf rendering of the same response, when available.
    pub binary: Option<Vec<u8>>,
}

/// Anything that can produce a startup payload.
pub trait StartupSource {
    /// Fetch the payload.
    fn fetch(&self) -> Result<StartupPayload>;
}

/// Reads `startup.json` (and a sibling `startup.bin`, if present) from disk.
#[derive(Debug, Clone)]
pub struct FileStartupSource {
    json_path: PathBuf,
}

impl FileStartupSource {
    /// Create a source for the given JSON file.
    pub fn new(json_path: impl Into<PathBuf>) -> Self {
        Self {
            json_path: json_path.into(),
        }
    }

    /// Path of the JSON document.
    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    fn binary_path(&self) -> PathBuf {
        self.json_path.with_extension("bin")
    }
}

impl StartupSource for FileStartupSource {
    fn fetch(&self) -> Result<StartupPayload> {
        if !self.json_path.exists() {
            return Err(Error::data(format!(
                "startup document not found: {}",
                self.json_path.display()
            )));
        }
        let json_text = std::fs::read_to_string(&self.json_path)?;

        let bin_path = self.binary_path();
        let binary = if bin_path.is_file() {
            Some(std::fs::read(&bin_path)?)
        } else {
            None
        };

        tracing::debug!(
            path = %self.json_path.display(),
            bytes = json_text.len(),
            has_binary = binary.is_some(),
            "loaded startup payload"
        );

        Ok(StartupPayload { json_text, binary })
    }
}

/// Extract the ordered message list from a startup document.
///
/// `pointer` is a JSON pointer (e.g. `/rootContext/messages`). A document
/// without an array at that location is unusable and yields [`Error::Data`].
pub fn parse_messages(json_text: &str, pointer: &str) -> Result<Vec<RawRecord>> {
    let document: Value = serde_json::from_str(json_text)?;
    messages_from_document(document, pointer)
}

/// Same as [`parse_messages`] for an already-parsed document.
pub fn messages_from_document(mut document: Value, pointer: &str) -> Result<Vec<RawRecord>> {
    match document.pointer_mut(pointer).map(Value::take) {
        Some(Value::Array(messages)) => {
            let records: Vec<RawRecord> = messages.into_iter().map(RawRecord::from).collect();
            tracing::info!(count = records.len(), "extracted startup messages");
            Ok(records)
        }
        Some(other) => Err(Error::data(format!(
            "startup document value at {pointer} is not an array (found {})",
            value_kind(&other)
        ))),
        None => Err(Error::data(format!(
            "startup document missing message list at {pointer}"
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
