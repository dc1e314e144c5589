//! Sparse fragment replacements, keyed by page and fragment index.
//!
//! Edit payloads arrive from outside the process, so parsing is lenient:
//! keys are trimmed and parsed as non-negative integers, and anything that
//! does not fit is logged and dropped instead of failing the whole set.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{EditSetError, EditWarning, EditWarningCode};

/// Page index → fragment index → replacement text.
///
/// An empty replacement erases the fragment without drawing anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct EditSet {
    pages: BTreeMap<usize, BTreeMap<usize, String>>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an edit set from a JSON value.
    ///
    /// Fails only when `value` is not an object. Malformed keys, non-object
    /// page entries, and non-string replacements are skipped. When two keys
    /// normalize to the same index, the later one wins.
    pub fn parse(value: &Value) -> Result<Self, EditSetError> {
        Self::parse_with_warnings(value).map(|(set, _)| set)
    }

    /// Like [`EditSet::parse`], also returning a
    /// [`EditWarningCode::MalformedKey`] warning for every dropped entry.
    pub fn parse_with_warnings(value: &Value) -> Result<(Self, Vec<EditWarning>), EditSetError> {
        let Value::Object(root) = value else {
            return Err(EditSetError::NotAnObject(json_kind(value)));
        };
        let mut set = EditSet::new();
        let mut warnings = Vec::new();
        for (page_key, page_value) in root {
            let Some(page) = parse_index(page_key) else {
                tracing::warn!(key = %page_key, "dropping edit page with malformed key");
                warnings.push(EditWarning::new(
                    EditWarningCode::MalformedKey,
                    format!("page key {page_key:?} is not a non-negative integer"),
                ));
                continue;
            };
            let Value::Object(entries) = page_value else {
                tracing::warn!(
                    page,
                    kind = json_kind(page_value),
                    "dropping edit page that is not an object"
                );
                warnings.push(EditWarning::on_page(
                    EditWarningCode::MalformedKey,
                    page,
                    format!("page entry is {}, not an object", json_kind(page_value)),
                ));
                continue;
            };
            let slot = set.pages.entry(page).or_default();
            for (frag_key, replacement) in entries {
                let Some(fragment) = parse_index(frag_key) else {
                    tracing::warn!(
                        page,
                        key = %frag_key,
                        "dropping edit with malformed fragment key"
                    );
                    warnings.push(EditWarning::on_page(
                        EditWarningCode::MalformedKey,
                        page,
                        format!("fragment key {frag_key:?} is not a non-negative integer"),
                    ));
                    continue;
                };
                let Value::String(text) = replacement else {
                    tracing::warn!(
                        page,
                        fragment,
                        "dropping edit whose replacement is not a string"
                    );
                    warnings.push(EditWarning::on_fragment(
                        EditWarningCode::MalformedKey,
                        page,
                        fragment,
                        format!("replacement is {}, not a string", json_kind(replacement)),
                    ));
                    continue;
                };
                slot.insert(fragment, text.clone());
            }
        }
        Ok((set, warnings))
    }

    /// Parse an edit set from JSON text.
    pub fn from_json(s: &str) -> Result<Self, EditSetError> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| EditSetError::InvalidJson(e.to_string()))?;
        Self::parse(&value)
    }

    /// Serialize with string keys, the wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Set the replacement for one fragment, returning the previous one.
    pub fn insert(
        &mut self,
        page: usize,
        fragment: usize,
        text: impl Into<String>,
    ) -> Option<String> {
        self.pages
            .entry(page)
            .or_default()
            .insert(fragment, text.into())
    }

    /// Replacements for one page, if it has an entry.
    pub fn page(&self, page: usize) -> Option<&BTreeMap<usize, String>> {
        self.pages.get(&page)
    }

    /// Iterate pages in ascending order.
    pub fn pages(&self) -> impl Iterator<Item = (usize, &BTreeMap<usize, String>)> {
        self.pages.iter().map(|(p, e)| (*p, e))
    }

    /// Number of pages with an entry (possibly empty).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of replacements.
    pub fn len(&self) -> usize {
        self.pages.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<Value> for EditSet {
    type Error = EditSetError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        EditSet::parse(&value)
    }
}

impl Serialize for EditSet {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.pages.len()))?;
        for (page, entries) in &self.pages {
            map.serialize_entry(&page.to_string(), &StringKeyed(entries))?;
        }
        map.end()
    }
}

struct StringKeyed<'a>(&'a BTreeMap<usize, String>);

impl Serialize for StringKeyed<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.len()))?;
        for (fragment, text) in self.0 {
            map.serialize_entry(&fragment.to_string(), text)?;
        }
        map.end()
    }
}

fn parse_index(key: &str) -> Option<usize> {
    key.trim().parse().ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
