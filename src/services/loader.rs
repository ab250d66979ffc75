use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::model::catalog::Catalog;
use crate::model::entry::UnfinishedPolicy;
use crate::parsers::ts;
use crate::services::{encoding, placeholder};

pub fn load_file(path: &Path, policy: UnfinishedPolicy) -> Result<Catalog, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = load_bytes(&bytes, policy)?;
    info!(
        path = %path.display(),
        language = catalog.language().unwrap_or(""),
        entries = catalog.len(),
        "loaded catalog"
    );

    Ok(catalog)
}

pub fn load_bytes(bytes: &[u8], policy: UnfinishedPolicy) -> Result<Catalog, CatalogError> {
    let text = encoding::decode(bytes)?;
    load_str(&text, policy)
}

pub fn load_str(text: &str, policy: UnfinishedPolicy) -> Result<Catalog, CatalogError> {
    let catalog = ts::parse(text)?.with_unfinished_policy(policy);
    log_placeholder_mismatches(&catalog);
    Ok(catalog)
}

fn log_placeholder_mismatches(catalog: &Catalog) {
    for e in catalog.entries() {
        if !e.is_finished() || e.placeholder_count == 0 {
            continue;
        }
        if placeholder::markers(&e.source_text) != placeholder::markers(&e.translation) {
            debug!(
                context = %e.context,
                source = %e.source_text,
                "placeholder mismatch between source and translation"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_from_disk_with_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<TS language="fi"><context><name>ShutdownPlugin</name>
<message><source>shutdown</source><translation type="unfinished">sammutus</translation></message>
</context></TS>"#
        )
        .unwrap();

        let cat = load_file(file.path(), UnfinishedPolicy::UseDraft).unwrap();
        assert_eq!(cat.unfinished_policy(), UnfinishedPolicy::UseDraft);
        assert_eq!(cat.tr("ShutdownPlugin", "shutdown"), "sammutus");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.ts"), UnfinishedPolicy::SourceText).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn parse_errors_surface() {
        let err = load_str("<TS><context>", UnfinishedPolicy::SourceText).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
