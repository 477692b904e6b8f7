use cartscout_common::{ProductRecord, StoreError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

/// The persisted `P<n>` → record mapping for one site, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteDocument {
    entries: Map<String, Value>,
}

impl SiteDocument {
    /// Read `path`, recovering to an empty document when it is absent,
    /// corrupt, or not a JSON object.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!(
                    target: "store.merge.recovered_corrupt",
                    path = %path.display(),
                    error = %err,
                    "site document is not UTF-8; starting from empty"
                );
                return Ok(Self::default());
            }
            Err(err) => return Err(StoreError::io(path, err)),
        };

        let entries = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(entries)) => entries,
            Ok(Value::Array(items)) => {
                warn!(
                    target: "store.merge.recovered_legacy",
                    path = %path.display(),
                    discarded = items.len(),
                    "site document is a list; discarding it"
                );
                Map::new()
            }
            Ok(other) => {
                warn!(
                    target: "store.merge.recovered_legacy",
                    path = %path.display(),
                    kind = json_kind(&other),
                    "site document is not an object; discarding it"
                );
                Map::new()
            }
            Err(err) => {
                warn!(
                    target: "store.merge.recovered_corrupt",
                    path = %path.display(),
                    error = %err,
                    "site document is not valid JSON; starting from empty"
                );
                Map::new()
            }
        };
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored record under `key`, if it has the record shape.
    pub fn record(&self, key: &str) -> Option<ProductRecord> {
        self.entries
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Largest `n` among `P<n>` keys, 0 for none.
    pub fn max_suffix(&self) -> u64 {
        self.entries
            .keys()
            .filter_map(|key| key.strip_prefix('P'))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }

    /// Append `record` under the next free key and return that key.
    pub fn push(&mut self, record: &ProductRecord) -> Result<String, StoreError> {
        let largest = self.max_suffix();
        let next = largest
            .checked_add(1)
            .ok_or(StoreError::KeySpaceExhausted { largest })?;
        let key = format!("P{next}");
        self.entries.insert(key.clone(), serde_json::to_value(record)?);
        Ok(key)
    }

    /// 4-space indented UTF-8 JSON.
    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.entries.serialize(&mut serializer)?;
        out.push(b'\n');
        Ok(out)
    }

    /// Replace `path` atomically: write a sibling temp file, then rename it.
    pub fn write_atomic(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = self.to_pretty_bytes()?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| StoreError::io(tmp.path(), err))?;
        tmp.persist(path)
            .map_err(|err| StoreError::io(path, err.error))?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str) -> ProductRecord {
        ProductRecord::new(name, "₹10", "https://x.test/a", "https://x.test/a.jpg")
    }

    #[test]
    fn keys_continue_from_max_suffix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("amazon.json");
        fs::write(&path, r#"{"P1": {"name": "a"}, "P7": {"name": "b"}, "note": 1}"#).unwrap();
        let mut doc = SiteDocument::read(&path).unwrap();
        assert_eq!(doc.max_suffix(), 7);
        assert_eq!(doc.push(&record("c")).unwrap(), "P8");
        assert_eq!(doc.push(&record("d")).unwrap(), "P9");
    }

    #[test]
    fn non_numeric_suffixes_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("amazon.json");
        fs::write(&path, r#"{"Pabc": {}, "P": {}, "Q9": {}}"#).unwrap();
        let doc = SiteDocument::read(&path).unwrap();
        assert_eq!(doc.max_suffix(), 0);
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn scalar_document_recovers_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("myntra.json");
        fs::write(&path, "\"hello\"").unwrap();
        assert!(SiteDocument::read(&path).unwrap().is_empty());
    }

    #[test]
    fn pretty_output_uses_four_spaces_and_literal_rupee() {
        let mut doc = SiteDocument::default();
        doc.push(&record("Mug")).unwrap();
        let text = String::from_utf8(doc.to_pretty_bytes().unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"P1\": {\n        \"name\": \"Mug\""));
        assert!(text.contains("\"price\": \"₹10\""));
        assert!(!text.contains("brand"));
    }

    #[test]
    fn push_refuses_to_wrap_past_the_largest_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("amazon.json");
        fs::write(&path, format!(r#"{{"P{}": {{"name": "last"}}}}"#, u64::MAX)).unwrap();
        let mut doc = SiteDocument::read(&path).unwrap();

        let err = doc.push(&record("one more")).unwrap_err();

        assert!(matches!(err, StoreError::KeySpaceExhausted { largest } if largest == u64::MAX));
        assert_eq!(doc.len(), 1);
    }
}
