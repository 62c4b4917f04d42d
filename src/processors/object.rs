//! JSON document processor that translates selected string fields

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::client::Translator;

/// Keys treated as human-readable text in addition to the caller's list
const TEXT_KEYS: &[&str] = &[
    "title",
    "name",
    "description",
    "text",
    "content",
    "message",
    "label",
    "placeholder",
    "tooltip",
    "error",
    "success",
    "warning",
    "question",
    "answer",
    "comment",
    "note",
    "summary",
    "details",
];

/// Outcome of translating one document
#[derive(Debug, Clone, Serialize)]
pub struct ObjectTranslation {
    pub value: Value,
    /// Strings selected for translation
    pub strings: usize,
    /// Strings left untouched because their translation failed
    pub failures: usize,
}

/// Translates string values inside arbitrary JSON
#[derive(Debug, Clone)]
pub struct ObjectTranslator {
    translator: Translator,
}

impl ObjectTranslator {
    pub fn new(translator: Translator) -> Self {
        Self { translator }
    }

    /// Translate the strings of `value` selected by `keys`.
    ///
    /// An empty `keys` selects every string. Otherwise a string is selected
    /// when the nearest enclosing object key is in `keys` or is a common text
    /// key (`title`, `description`, ...). Never fails: strings whose
    /// translation fails keep their original value.
    pub async fn translate_value(
        &self,
        value: &Value,
        source_lang: &str,
        target_lang: &str,
        keys: &[String],
    ) -> ObjectTranslation {
        let mut selected = Vec::new();
        collect(value, String::new(), None, keys, &mut selected);

        let (pointers, texts): (Vec<String>, Vec<String>) = selected.into_iter().unzip();
        debug!("Selected {} strings for translation", texts.len());

        let results = self
            .translator
            .translate_batch(&texts, source_lang, target_lang)
            .await;

        let mut translated = value.clone();
        let mut failures = 0;
        for (pointer, result) in pointers.iter().zip(results) {
            if !result.success {
                failures += 1;
                continue;
            }
            if let Some(slot) = translated.pointer_mut(pointer) {
                *slot = Value::String(result.translated);
            }
        }

        info!("Translated {} strings ({} failed)", texts.len() - failures, failures);

        ObjectTranslation {
            value: translated,
            strings: texts.len(),
            failures,
        }
    }
}

fn is_selected(key: Option<&str>, keys: &[String]) -> bool {
    if keys.is_empty() {
        return true;
    }

    match key {
        Some(key) => {
            keys.iter().any(|k| k == key)
                || TEXT_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
        }
        None => false,
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Walk `value`, recording (JSON pointer, text) for every selected string
fn collect(
    value: &Value,
    pointer: String,
    key: Option<&str>,
    keys: &[String],
    out: &mut Vec<(String, String)>,
) {
    match value {
        Value::String(text) if is_selected(key, keys) => out.push((pointer, text.clone())),
        Value::Object(map) => {
            for (k, v) in map {
                collect(v, format!("{}/{}", pointer, escape_pointer(k)), Some(k), keys, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                collect(v, format!("{}/{}", pointer, i), key, keys, out);
            }
        }
        _ => {}
    }
}
