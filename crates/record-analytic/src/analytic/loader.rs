use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use super::document::ModelDocument;

/// Produces a model document from a location string.
pub trait DocumentLoader<M> {
    fn load(&self, location: &str) -> Result<ModelDocument<M>, DocumentLoadError>;
}

/// Turns the bytes behind a location into a model document.
pub trait DocumentParser<M> {
    fn parse(&self, reader: &mut dyn Read) -> Result<ModelDocument<M>, String>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    #[error("unsupported model location '{0}'")]
    UnsupportedLocation(String),
    #[error("failed to read model document at '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model document at '{location}': {message}")]
    Parse { location: String, message: String },
}

/// Loads documents from the local filesystem. Accepts plain paths as well as `file:` and
/// `file://` locations.
#[derive(Debug, Clone, Default)]
pub struct ResourceDocumentLoader<P> {
    parser: P,
}

impl<P> ResourceDocumentLoader<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<M, P> DocumentLoader<M> for ResourceDocumentLoader<P>
where
    P: DocumentParser<M>,
{
    fn load(&self, location: &str) -> Result<ModelDocument<M>, DocumentLoadError> {
        let path = resolve_location(location)?;
        debug!(location, path = %path.display(), "loading model document");

        let file = File::open(&path).map_err(|source| DocumentLoadError::Io {
            location: location.trim().to_string(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        self.parser
            .parse(&mut reader)
            .map_err(|message| DocumentLoadError::Parse {
                location: location.trim().to_string(),
                message,
            })
    }
}

pub(crate) fn resolve_location(location: &str) -> Result<PathBuf, DocumentLoadError> {
    let trimmed = location.trim();
    let unsupported = || DocumentLoadError::UnsupportedLocation(trimmed.to_string());

    if trimmed.is_empty() {
        return Err(unsupported());
    }

    let path = match trimmed.split_once(':') {
        Some(("file", rest)) => match rest.strip_prefix("//") {
            // `file://host/path`: only the local host is reachable
            Some(authority_and_path) => {
                let (authority, path) = authority_and_path
                    .find('/')
                    .map(|slash| authority_and_path.split_at(slash))
                    .unwrap_or((authority_and_path, ""));
                if !(authority.is_empty() || authority.eq_ignore_ascii_case("localhost")) {
                    return Err(unsupported());
                }
                path
            }
            None => rest,
        },
        // single letters are drive prefixes such as `C:\models`
        Some((scheme, _)) if scheme.len() > 1 && is_scheme(scheme) => return Err(unsupported()),
        _ => trimmed,
    };

    if path.is_empty() {
        return Err(unsupported());
    }

    Ok(Path::new(path).to_path_buf())
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Reads `{"models": [{"name": "...", ...}]}` documents with serde.
#[derive(Debug)]
pub struct JsonDocumentParser<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M> JsonDocumentParser<M> {
    pub fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<M> Default for JsonDocumentParser<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for JsonDocumentParser<M> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<M> DocumentParser<M> for JsonDocumentParser<M>
where
    M: DeserializeOwned,
{
    fn parse(&self, reader: &mut dyn Read) -> Result<ModelDocument<M>, String> {
        serde_json::from_reader(reader).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Centroids {
        clusters: usize,
    }

    #[test]
    fn resolves_plain_paths_and_file_uris() {
        assert_eq!(
            resolve_location(" models/a.json ").expect("plain path"),
            PathBuf::from("models/a.json")
        );
        assert_eq!(
            resolve_location("file:models/a.json").expect("file uri"),
            PathBuf::from("models/a.json")
        );
        assert_eq!(
            resolve_location("file:///srv/models/a.json").expect("file uri with authority"),
            PathBuf::from("/srv/models/a.json")
        );
        assert_eq!(
            resolve_location("file://localhost/srv/a.json").expect("localhost authority"),
            PathBuf::from("/srv/a.json")
        );
        assert_eq!(
            resolve_location("C:/models/a.json").expect("drive letter"),
            PathBuf::from("C:/models/a.json")
        );
    }

    #[test]
    fn rejects_remote_and_blank_locations() {
        for location in [
            "classpath:analytics/a.json",
            "https://host/a.json",
            "file://models.example.com/a.json",
            "file://localhost",
            "  ",
            "file:",
        ] {
            match resolve_location(location) {
                Err(DocumentLoadError::UnsupportedLocation(_)) => {}
                other => panic!("expected unsupported location for '{location}', got {other:?}"),
            }
        }
    }

    #[test]
    fn json_parser_reads_named_and_unnamed_models() {
        let raw = r#"{"models":[{"name":"KMeans_Model1","clusters":3},{"clusters":5}]}"#;
        let document: ModelDocument<Centroids> = JsonDocumentParser::new()
            .parse(&mut Cursor::new(raw))
            .expect("document parses");

        assert_eq!(document.len(), 2);
        assert_eq!(document.models()[0].name(), Some("KMeans_Model1"));
        assert_eq!(document.models()[1].name(), None);
        assert_eq!(document.models()[1].model, Centroids { clusters: 5 });
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let loader = ResourceDocumentLoader::new(JsonDocumentParser::<Centroids>::new());
        let result: Result<ModelDocument<Centroids>, _> = loader.load("./does-not-exist.json");
        let error = result.expect_err("expected io error");

        match error {
            DocumentLoadError::Io { location, .. } => assert_eq!(location, "./does-not-exist.json"),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
