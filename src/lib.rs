//! Qt Linguist `.ts` catalogs: loading, fail-soft lookup with `%N`
//! substitution, serialization and quality checks.

pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use error::{CatalogError, ConfigError, ParseError};
pub use model::catalog::{Catalog, CatalogHeader, Context};
pub use model::entry::{LineRef, Location, TranslationEntry, TranslationStatus, UnfinishedPolicy};
pub use parsers::ts::parse;
pub use services::loader::{load_bytes, load_file, load_str};
