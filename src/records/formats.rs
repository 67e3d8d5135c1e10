use super::{decode_records, PersonRecord};
use crate::error::{RelnavError, Result};
use serde_json::Value as JsonValue;

/// Trait for partition file formats
pub trait RecordFormat: Send + Sync {
    /// Check if this format handles the given file extension
    fn can_parse(&self, extension: &str) -> bool;

    /// Decode file content into raw record entries
    fn parse(&self, content: &str, path: &str) -> Result<Vec<JsonValue>>;
}

/// JSON partitions: a top-level list, or an object with a `records` list
pub struct JsonFormat;

impl RecordFormat for JsonFormat {
    fn can_parse(&self, extension: &str) -> bool {
        extension == "json"
    }

    fn parse(&self, content: &str, path: &str) -> Result<Vec<JsonValue>> {
        let value: JsonValue = serde_json::from_str(content)?;
        record_entries(value, path)
    }
}

/// YAML partitions, same shapes as JSON
pub struct YamlFormat;

impl RecordFormat for YamlFormat {
    fn can_parse(&self, extension: &str) -> bool {
        matches!(extension, "yaml" | "yml")
    }

    fn parse(&self, content: &str, path: &str) -> Result<Vec<JsonValue>> {
        let value: JsonValue = serde_yaml_ng::from_str(content)?;
        record_entries(value, path)
    }
}

fn record_entries(value: JsonValue, path: &str) -> Result<Vec<JsonValue>> {
    match value {
        JsonValue::Array(items) => Ok(items),
        JsonValue::Object(mut map) => match map.remove("records") {
            Some(JsonValue::Array(items)) => Ok(items),
            _ => Err(RelnavError::Parse(format!(
                "{}: expected a list of records or a `records` list",
                path
            ))),
        },
        JsonValue::Null => Ok(Vec::new()),
        _ => Err(RelnavError::Parse(format!(
            "{}: expected a list of records",
            path
        ))),
    }
}

/// Format registry that selects a decoder by extension
pub struct FormatRegistry {
    formats: Vec<Box<dyn RecordFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a registry with the built-in JSON and YAML formats
    pub fn new() -> Self {
        let mut registry = Self {
            formats: Vec::new(),
        };

        registry.register(Box::new(JsonFormat));
        registry.register(Box::new(YamlFormat));

        registry
    }

    /// Register a format
    pub fn register(&mut self, format: Box<dyn RecordFormat>) {
        self.formats.push(format);
    }

    /// Find a format that can handle the given extension
    pub fn find_format(&self, extension: &str) -> Option<&dyn RecordFormat> {
        self.formats
            .iter()
            .find(|f| f.can_parse(extension))
            .map(|f| f.as_ref())
    }

    /// Whether any registered format handles the extension
    pub fn supports(&self, extension: &str) -> bool {
        self.find_format(extension).is_some()
    }

    /// Decode a partition into validated records
    pub fn parse(&self, content: &str, path: &str, extension: &str) -> Result<Vec<PersonRecord>> {
        let format = self.find_format(extension).ok_or_else(|| {
            RelnavError::Parse(format!("No record format for extension: {}", extension))
        })?;
        let entries = format.parse(content, path)?;
        Ok(decode_records(entries, path))
    }
}
