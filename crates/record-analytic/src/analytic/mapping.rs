use std::fmt;

/// How record fields correspond to model fields, for either direction of an analytic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldMappingSpec {
    /// Every field participates under its own name.
    #[default]
    Identity,
    /// Only the listed fields participate, under their own name.
    Selection(Vec<String>),
    /// Only the listed source fields participate, each written under its target name.
    Rename(Vec<(String, String)>),
}

/// Raised when a mapping string cannot be turned into a [`FieldMappingSpec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("field mapping '{raw}' mixes renamed (source:target) and plain field names")]
    MixedMapping { raw: String },
    #[error("field mapping entry '{token}' must have the form source:target")]
    MalformedPair { token: String },
}

impl FieldMappingSpec {
    /// Parses a comma separated mapping string.
    ///
    /// Blank input means [`FieldMappingSpec::Identity`]. A list where every entry is
    /// `source:target` becomes a rename, a list of bare names becomes a selection, and a list
    /// mixing both forms is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigurationError> {
        let Some(raw) = raw else {
            return Ok(Self::Identity);
        };

        let tokens: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(Self::Identity);
        }

        let renamed = tokens.iter().filter(|token| token.contains(':')).count();

        if renamed == 0 {
            return Ok(Self::Selection(
                tokens.into_iter().map(str::to_string).collect(),
            ));
        }

        if renamed != tokens.len() {
            return Err(ConfigurationError::MixedMapping {
                raw: raw.trim().to_string(),
            });
        }

        tokens
            .into_iter()
            .map(split_pair)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Rename)
    }

    /// Configured `(source, target)` pairs in order, or `None` for identity.
    pub fn pairs(&self) -> Option<Vec<(&str, &str)>> {
        match self {
            Self::Identity => None,
            Self::Selection(names) => Some(
                names
                    .iter()
                    .map(|name| (name.as_str(), name.as_str()))
                    .collect(),
            ),
            Self::Rename(pairs) => Some(
                pairs
                    .iter()
                    .map(|(source, target)| (source.as_str(), target.as_str()))
                    .collect(),
            ),
        }
    }
}

/// Shorthand for [`FieldMappingSpec::parse`].
pub fn parse_mapping(raw: Option<&str>) -> Result<FieldMappingSpec, ConfigurationError> {
    FieldMappingSpec::parse(raw)
}

fn split_pair(token: &str) -> Result<(String, String), ConfigurationError> {
    let malformed = || ConfigurationError::MalformedPair {
        token: token.to_string(),
    };

    let (source, target) = token.split_once(':').ok_or_else(malformed)?;
    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        return Err(malformed());
    }

    Ok((source.to_string(), target.to_string()))
}

impl fmt::Display for FieldMappingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("*"),
            Self::Selection(names) => f.write_str(&names.join(",")),
            Self::Rename(pairs) => {
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|(source, target)| format!("{source}:{target}"))
                    .collect();
                f.write_str(&rendered.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(source: &str, target: &str) -> (String, String) {
        (source.to_string(), target.to_string())
    }

    #[test]
    fn blank_input_is_identity() {
        assert_eq!(parse_mapping(None), Ok(FieldMappingSpec::Identity));
        assert_eq!(parse_mapping(Some("")), Ok(FieldMappingSpec::Identity));
        assert_eq!(parse_mapping(Some("   ")), Ok(FieldMappingSpec::Identity));
        assert_eq!(parse_mapping(Some(" , ,")), Ok(FieldMappingSpec::Identity));
    }

    #[test]
    fn bare_names_become_a_selection_in_order() {
        assert_eq!(
            parse_mapping(Some("a,b,c")),
            Ok(FieldMappingSpec::Selection(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
        assert_eq!(
            parse_mapping(Some(" c , ,a ")),
            Ok(FieldMappingSpec::Selection(vec![
                "c".to_string(),
                "a".to_string()
            ]))
        );
    }

    #[test]
    fn pairs_become_a_rename() {
        assert_eq!(
            parse_mapping(Some("a:x,b:y")),
            Ok(FieldMappingSpec::Rename(vec![pair("a", "x"), pair("b", "y")]))
        );
        assert_eq!(
            parse_mapping(Some("Sepal.Length : sepal_length")),
            Ok(FieldMappingSpec::Rename(vec![pair(
                "Sepal.Length",
                "sepal_length"
            )]))
        );
    }

    #[test]
    fn first_colon_splits_source_from_target() {
        assert_eq!(
            parse_mapping(Some("a:b:c")),
            Ok(FieldMappingSpec::Rename(vec![pair("a", "b:c")]))
        );
    }

    #[test]
    fn mixed_tokens_are_rejected() {
        let error = parse_mapping(Some("a:x, b")).expect_err("mixed list is invalid");
        assert_eq!(
            error,
            ConfigurationError::MixedMapping {
                raw: "a:x, b".to_string()
            }
        );
    }

    #[test]
    fn pair_with_empty_side_is_rejected() {
        for raw in ["a:", ":x", "a:x, :"] {
            match parse_mapping(Some(raw)) {
                Err(ConfigurationError::MalformedPair { .. }) => {}
                other => panic!("expected malformed pair for '{raw}', got {other:?}"),
            }
        }
    }

    #[test]
    fn pairs_view_covers_selection_and_rename() {
        let selection = FieldMappingSpec::Selection(vec!["a".to_string()]);
        assert_eq!(selection.pairs(), Some(vec![("a", "a")]));
        assert_eq!(FieldMappingSpec::Identity.pairs(), None);
        assert_eq!(
            parse_mapping(Some("a:x,b:y")).expect("parses").to_string(),
            "a:x,b:y"
        );
    }
}
