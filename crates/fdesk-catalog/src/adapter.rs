#![forbid(unsafe_code)]

//! Option source adapter.
//!
//! Two ways in:
//!
//! - Typed records implement [`OptionSource`] and go through [`normalize`].
//! - Loose backend JSON goes through [`normalize_value`] with a [`FieldMap`]
//!   naming which keys hold the id, label and display fields.
//!
//! Both are pure and never fail: input that is not a list yields no options,
//! records without an id are skipped and a repeated id keeps its first
//! occurrence. Names need not be unique.

use crate::option::{OptionFields, SelectOption};
use ahash::AHashSet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A record type that knows how to present itself as an option.
pub trait OptionSource {
    type Extra: OptionFields;

    fn to_option(&self) -> SelectOption<Self::Extra>;
}

/// Normalize typed records, dropping repeated ids.
pub fn normalize<R: OptionSource>(records: &[R]) -> Vec<SelectOption<R::Extra>> {
    let mut seen = AHashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let option = record.to_option();
        if option.id.is_empty() || !seen.insert(option.id.clone()) {
            continue;
        }
        out.push(option);
    }
    out
}

/// Which JSON keys carry which option field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub id: String,
    pub name: String,
    pub code: String,
    pub email: String,
    pub kind: String,
    /// Further keys copied into [`FieldExtra::fields`].
    pub extra: Vec<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: "id".into(),
            name: "name".into(),
            code: "code".into(),
            email: "email".into(),
            kind: "type".into(),
            extra: Vec::new(),
        }
    }
}

impl FieldMap {
    #[must_use]
    pub fn id(mut self, key: impl Into<String>) -> Self {
        self.id = key.into();
        self
    }

    #[must_use]
    pub fn name(mut self, key: impl Into<String>) -> Self {
        self.name = key.into();
        self
    }

    #[must_use]
    pub fn code(mut self, key: impl Into<String>) -> Self {
        self.code = key.into();
        self
    }

    #[must_use]
    pub fn email(mut self, key: impl Into<String>) -> Self {
        self.email = key.into();
        self
    }

    #[must_use]
    pub fn kind(mut self, key: impl Into<String>) -> Self {
        self.kind = key.into();
        self
    }

    #[must_use]
    pub fn extra_field(mut self, key: impl Into<String>) -> Self {
        self.extra.push(key.into());
        self
    }
}

/// Extras for options built from loose JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldExtra {
    pub code: Option<String>,
    pub email: Option<String>,
    pub kind: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl OptionFields for FieldExtra {
    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Unwrap the backend's list envelopes.
///
/// `{"data": [...]}` and `{"data": {"data": [...]}}` yield the inner array;
/// anything else is returned unchanged.
pub fn records_in(value: &Value) -> &Value {
    let Some(data) = value.get("data") else {
        return value;
    };
    match data {
        Value::Array(_) => data,
        Value::Object(inner) => match inner.get("data") {
            Some(list @ Value::Array(_)) => list,
            _ => value,
        },
        _ => value,
    }
}

/// Normalize a loosely typed list of records.
///
/// Numeric ids are stringified. A record without a usable name is labelled by
/// its id.
pub fn normalize_value(value: &Value, map: &FieldMap) -> Vec<SelectOption<FieldExtra>> {
    let Some(records) = value.as_array() else {
        tracing::debug!(kind = value_kind(value), "option source is not a list");
        return Vec::new();
    };
    let mut seen = AHashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        let Some(object) = record.as_object() else {
            skipped += 1;
            continue;
        };
        let Some(id) = scalar(object, &map.id) else {
            skipped += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            skipped += 1;
            continue;
        }
        let name = scalar(object, &map.name).unwrap_or_else(|| id.clone());
        let fields = map
            .extra
            .iter()
            .filter_map(|key| scalar(object, key).map(|v| (key.clone(), v)))
            .collect();
        out.push(SelectOption::new(
            id,
            name,
            FieldExtra {
                code: scalar(object, &map.code),
                email: scalar(object, &map.email),
                kind: scalar(object, &map.kind),
                fields,
            },
        ));
    }
    if skipped > 0 {
        tracing::debug!(skipped, kept = out.len(), "option records skipped");
    }
    out
}

/// A string or number field as text; blank strings count as missing.
fn scalar(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
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
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn non_array_inputs_yield_nothing() {
        let map = FieldMap::default();
        for value in [json!(null), json!(3), json!("ports"), json!({"id": 1})] {
            assert!(normalize_value(&value, &map).is_empty());
        }
    }

    #[test]
    fn numeric_ids_become_strings() {
        let options = normalize_value(
            &json!([{"id": 1, "name": "Acme Air"}, {"id": 2, "name": "Best Sea"}]),
            &FieldMap::default(),
        );
        let ids: Vec<_> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn missing_id_skipped_and_duplicate_keeps_first() {
        let options = normalize_value(
            &json!([
                {"name": "Nameless"},
                {"id": "p1", "name": "First"},
                {"id": "p1", "name": "Second"},
                "garbage",
                {"id": "", "name": "Blank"}
            ]),
            &FieldMap::default(),
        );
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "First");
    }

    #[test]
    fn custom_map_reads_display_fields() {
        let map = FieldMap::default()
            .id("carrier_id")
            .name("carrier_name")
            .code("carrier_code")
            .kind("carrier_type")
            .extra_field("country");
        let options = normalize_value(
            &json!([{
                "carrier_id": 10,
                "carrier_name": "Maersk",
                "carrier_code": "MAEU",
                "carrier_type": "Shipping",
                "country": "DK"
            }]),
            &map,
        );
        let opt = &options[0];
        assert_eq!(opt.code(), Some("MAEU"));
        assert_eq!(opt.kind(), Some("Shipping"));
        assert_eq!(opt.field("country"), Some("DK"));
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let options = normalize_value(&json!([{"id": "airways"}]), &FieldMap::default());
        assert_eq!(options[0].name, "airways");
    }

    #[test]
    fn envelopes_unwrap() {
        let flat = json!({"data": [{"id": 1}]});
        let nested = json!({"data": {"data": [{"id": 2}], "total": 1}});
        let bare = json!([{"id": 3}]);
        let odd = json!({"data": {"items": []}});
        assert_eq!(records_in(&flat), &json!([{"id": 1}]));
        assert_eq!(records_in(&nested), &json!([{"id": 2}]));
        assert_eq!(records_in(&bare), &bare);
        assert_eq!(records_in(&odd), &odd);
    }
}
