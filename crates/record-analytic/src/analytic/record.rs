use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Value held by a record field or a model input.
///
/// `Absent` marks a field that was configured but had nothing to carry. It is kept apart from
/// `Present(Value::Null)` so a model that legitimately answers `null` is not confused with a model
/// that never produced the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Present(Value),
    Absent,
}

impl FieldValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Present(value) => Some(value),
            FieldValue::Absent => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Present(value)
    }
}

impl From<Option<Value>> for FieldValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::Present)
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Present(value) => value.serialize(serializer),
            FieldValue::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(FieldValue::Present)
    }
}

/// Ordered named-value message flowing through the analytic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(name, value)` pairs. A repeated name keeps its first position and
    /// takes the later value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect()
    }

    /// Sets `name`, overwriting in place when the field already exists and appending otherwise.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Model field name to prepared value, as handed to an evaluator.
pub type ModelInputMap = IndexMap<String, FieldValue>;

/// Model field name to raw result, in the order the evaluator returned them.
pub type ModelOutputMap = IndexMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_overwrites_in_place_and_appends_new_names() {
        let mut record = Record::from_pairs([("a", json!(1)), ("b", json!(2))]);
        record.insert("a", json!(9));
        record.insert("c", json!(5));

        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(record.get("a"), Some(&FieldValue::Present(json!(9))));
        assert_eq!(record.position("c"), Some(2));
    }

    #[test]
    fn absent_and_null_serialize_alike_but_compare_apart() {
        let record = Record::from_pairs([
            ("missing", FieldValue::Absent),
            ("null", FieldValue::Present(Value::Null)),
        ]);

        let rendered = serde_json::to_string(&record).expect("record serializes");
        assert_eq!(rendered, r#"{"missing":null,"null":null}"#);
        assert_ne!(record.get("missing"), record.get("null"));
    }

    #[test]
    fn deserialize_keeps_document_order() {
        let record: Record =
            serde_json::from_str(r#"{"z":1,"a":"x","m":null}"#).expect("record parses");

        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, ["z", "a", "m"]);
        assert_eq!(record.get("m"), Some(&FieldValue::Present(Value::Null)));
    }
}
