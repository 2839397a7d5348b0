use std::collections::HashMap;

use super::mapping::FieldMappingSpec;
use super::record::{FieldValue, ModelInputMap, Record};

/// Hook that turns a raw record value into the value a model expects for `field`.
pub trait ValuePreparer: Send + Sync {
    fn prepare(&self, field: &str, raw: &FieldValue) -> FieldValue;
}

impl<F> ValuePreparer for F
where
    F: Fn(&str, &FieldValue) -> FieldValue + Send + Sync,
{
    fn prepare(&self, field: &str, raw: &FieldValue) -> FieldValue {
        self(field, raw)
    }
}

/// Input side of an analytic with its lookup table compiled once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMapper {
    spec: FieldMappingSpec,
    // record field -> model field; `None` maps every field to itself
    model_fields: Option<HashMap<String, String>>,
}

impl InputMapper {
    pub fn new(spec: FieldMappingSpec) -> Self {
        let model_fields = spec.pairs().map(|pairs| {
            pairs
                .into_iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect()
        });

        Self { spec, model_fields }
    }

    pub fn spec(&self) -> &FieldMappingSpec {
        &self.spec
    }

    /// Builds the model input for `record`, walking the record in its own field order.
    ///
    /// Fields without a mapping are dropped and configured names missing from the record are
    /// skipped. When two record fields land on the same model field the later one wins.
    pub fn map<P>(&self, preparer: &P, record: &Record) -> ModelInputMap
    where
        P: ValuePreparer + ?Sized,
    {
        let mut input = ModelInputMap::with_capacity(record.len());

        for (field, raw) in record.iter() {
            let model_field = match &self.model_fields {
                None => field,
                Some(lookup) => match lookup.get(field) {
                    Some(target) => target.as_str(),
                    None => continue,
                },
            };

            let value = preparer.prepare(model_field, raw);
            input.insert(model_field.to_string(), value);
        }

        input
    }
}

/// One-shot form of [`InputMapper::map`].
pub fn map_input<P>(spec: &FieldMappingSpec, preparer: &P, record: &Record) -> ModelInputMap
where
    P: ValuePreparer + ?Sized,
{
    InputMapper::new(spec.clone()).map(preparer, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic::mapping::parse_mapping;
    use serde_json::json;

    fn passthrough(_field: &str, raw: &FieldValue) -> FieldValue {
        raw.clone()
    }

    fn record() -> Record {
        Record::from_pairs([
            ("a", json!(1)),
            ("b", json!(2)),
            ("c", json!(3)),
            ("d", json!(4)),
        ])
    }

    fn keys(input: &ModelInputMap) -> Vec<&str> {
        input.keys().map(String::as_str).collect()
    }

    #[test]
    fn identity_takes_every_field_in_record_order() {
        let input = map_input(&FieldMappingSpec::Identity, &passthrough, &record());
        assert_eq!(keys(&input), ["a", "b", "c", "d"]);
    }

    #[test]
    fn selection_drops_unlisted_fields_and_skips_missing_ones() {
        let spec = parse_mapping(Some("c,a,zz")).expect("selection parses");
        let input = map_input(&spec, &passthrough, &record());

        assert_eq!(keys(&input), ["a", "c"]);
        assert!(!input.contains_key("zz"));
    }

    #[test]
    fn rename_writes_target_names() {
        let spec = parse_mapping(Some("b:beta,d:delta,missing:nothing")).expect("rename parses");
        let input = map_input(&spec, &passthrough, &record());

        assert_eq!(keys(&input), ["beta", "delta"]);
        assert_eq!(input.get("beta"), Some(&FieldValue::Present(json!(2))));
    }

    #[test]
    fn configured_fields_are_independent_of_record_order() {
        let spec = parse_mapping(Some("a,c")).expect("selection parses");
        let shuffled = Record::from_pairs([
            ("d", json!(4)),
            ("c", json!(3)),
            ("b", json!(2)),
            ("a", json!(1)),
        ]);

        let mut forward: Vec<_> = map_input(&spec, &passthrough, &record())
            .into_iter()
            .collect();
        let mut backward: Vec<_> = map_input(&spec, &passthrough, &shuffled)
            .into_iter()
            .collect();
        forward.sort_by(|left, right| left.0.cmp(&right.0));
        backward.sort_by(|left, right| left.0.cmp(&right.0));

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn rename_collision_keeps_the_later_record_field() {
        let spec = parse_mapping(Some("a:x,c:x")).expect("rename parses");
        let input = map_input(&spec, &passthrough, &record());

        assert_eq!(input.len(), 1);
        assert_eq!(input.get("x"), Some(&FieldValue::Present(json!(3))));
    }

    #[test]
    fn repeated_source_uses_the_last_pair() {
        let spec = parse_mapping(Some("a:x,a:y")).expect("rename parses");
        let input = map_input(&spec, &passthrough, &record());

        assert_eq!(keys(&input), ["y"]);
    }

    #[test]
    fn preparer_sees_model_field_names() {
        let spec = parse_mapping(Some("a:alpha")).expect("rename parses");
        let tag = |field: &str, _raw: &FieldValue| FieldValue::Present(json!(field));

        let input = map_input(&spec, &tag, &record());
        assert_eq!(input.get("alpha"), Some(&FieldValue::Present(json!("alpha"))));
    }
}
