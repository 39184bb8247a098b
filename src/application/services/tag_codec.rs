//! Import/export codec
//!
//! The wire format is a flat JSON object mapping tag name to raw message.
//! A single-tag export and a full export share the shape, so one parser
//! reads both.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::tag_store::TagStore;
use crate::application::errors::TagError;
use crate::domain::entities::tag::is_valid_name;

pub struct TagCodec {
    store: Arc<TagStore>,
}

impl TagCodec {
    pub fn new(store: Arc<TagStore>) -> Self {
        Self { store }
    }

    /// `{ name: message }` for one tag, pretty-printed.
    pub fn export_one(&self, name: &str) -> Result<String, TagError> {
        let tag = self
            .store
            .get(name)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        encode(BTreeMap::from([(tag.name, tag.message)]))
    }

    /// Every stored tag as `{ name: message, ... }`, pretty-printed.
    pub fn export_all(&self) -> Result<String, TagError> {
        let entries = self
            .store
            .list()
            .into_iter()
            .map(|tag| (tag.name, tag.message))
            .collect();
        encode(entries)
    }

    /// Parse `text` and merge it into the store. Nothing is written unless the
    /// whole document parses and no name is rejected by `is_reserved`.
    /// Returns the merged names, sorted.
    pub fn import_text(&self, text: &str, is_reserved: impl Fn(&str) -> bool) -> Result<Vec<String>, TagError> {
        let entries = parse(text)?;
        if let Some(name) = entries.keys().find(|name| is_reserved(name)) {
            return Err(TagError::Reserved(name.clone()));
        }

        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        let count = self.store.bulk_merge(entries)?;
        tracing::info!("Imported {} tag(s)", count);
        Ok(names)
    }
}

fn encode(entries: BTreeMap<String, String>) -> Result<String, TagError> {
    serde_json::to_string_pretty(&entries).map_err(|e| TagError::Parse(e.to_string()))
}

/// Parse an export document into `name -> message` pairs.
pub fn parse(text: &str) -> Result<HashMap<String, String>, TagError> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|e| TagError::Parse(e.to_string()))?;

    let serde_json::Value::Object(map) = value else {
        return Err(TagError::Parse("expected a JSON object of tag names to messages".to_string()));
    };

    let mut entries = HashMap::with_capacity(map.len());
    for (name, message) in map {
        let serde_json::Value::String(message) = message else {
            return Err(TagError::Parse(format!("message for '{}' is not a string", name)));
        };
        if !is_valid_name(&name) {
            return Err(TagError::Parse(format!("'{}' is not a valid tag name", name)));
        }
        entries.insert(name, message);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Tag;
    use crate::infrastructure::storage::MemorySettingsStore;

    fn codec_with(tags: &[(&str, &str)]) -> (Arc<TagStore>, TagCodec) {
        let store = Arc::new(TagStore::open(Arc::new(MemorySettingsStore::new())).unwrap());
        for (name, message) in tags {
            store.create(Tag::new(*name, *message)).unwrap();
        }
        let codec = TagCodec::new(store.clone());
        (store, codec)
    }

    #[test]
    fn test_export_one_keeps_raw_escape() {
        let (_, codec) = codec_with(&[("greet", "hi\\nthere")]);
        let exported = codec.export_one("greet").unwrap();
        assert_eq!(exported, "{\n  \"greet\": \"hi\\\\nthere\"\n}");
    }

    #[test]
    fn test_export_one_missing() {
        let (_, codec) = codec_with(&[]);
        assert!(matches!(codec.export_one("nope"), Err(TagError::NotFound(_))));
    }

    #[test]
    fn test_export_all_of_empty_store() {
        let (_, codec) = codec_with(&[]);
        assert_eq!(codec.export_all().unwrap(), "{}");
    }

    #[test]
    fn test_export_all_round_trips() {
        let (store, codec) = codec_with(&[("a", "one"), ("b", "two\\nlines")]);
        let before = store.list();
        let exported = codec.export_all().unwrap();
        let names = codec.import_text(&exported, |_| false).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_import_accepts_compact_and_padded_json() {
        let (store, codec) = codec_with(&[]);
        codec.import_text("  \n{\"x\":\"1\",\"y\":\"2\"}\n ", |_| false).unwrap();
        assert_eq!(store.get("x").unwrap().message, "1");
        assert_eq!(store.get("y").unwrap().message, "2");
    }

    #[test]
    fn test_import_malformed_changes_nothing() {
        let (store, codec) = codec_with(&[("keep", "me")]);
        for bad in ["not json", "[\"a\"]", "{\"a\": 1}", "{\"a\": \"ok\", \"b c\": \"bad name\"}"] {
            assert!(matches!(codec.import_text(bad, |_| false), Err(TagError::Parse(_))), "{bad}");
        }
        assert_eq!(store.names(), vec!["keep".to_string()]);
    }

    #[test]
    fn test_import_reserved_changes_nothing() {
        let (store, codec) = codec_with(&[]);
        let err = codec
            .import_text("{\"tags\": \"x\", \"ok\": \"y\"}", |name| name == "tags")
            .unwrap_err();
        assert!(matches!(err, TagError::Reserved(_)));
        assert!(store.is_empty());
    }
}
