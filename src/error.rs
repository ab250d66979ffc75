use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a `.ts` document into a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The XML itself is malformed.
    #[error("malformed xml at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// The document ended before a root element was seen.
    #[error("document has no root element")]
    MissingRoot,

    /// The root element is not `TS`.
    #[error("expected root element <TS>, found <{0}>")]
    UnexpectedRoot(String),

    /// Something other than whitespace follows the root element.
    #[error("unexpected content after </TS> at byte {0}")]
    TrailingContent(u64),

    /// The document ended inside an open element.
    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// A required child element is absent.
    #[error("<{element}> is missing its <{child}> element")]
    MissingChild {
        element: &'static str,
        child: &'static str,
    },

    /// An attribute carries a value the format does not allow.
    #[error("invalid {attribute}=\"{value}\" on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

/// Failure to load a catalog from disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode catalog bytes as {0}")]
    Encoding(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
