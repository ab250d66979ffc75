use sha2::{Digest, Sha256};

use crate::model::catalog::Catalog;

/// SHA-256 over everything a lookup can observe, hex encoded. Locations
/// and editor comments do not contribute.
pub fn fingerprint(catalog: &Catalog) -> String {
    let mut hasher = Sha256::new();

    let header = catalog.header();
    field(&mut hasher, header.language.as_deref().unwrap_or(""));
    field(&mut hasher, header.source_language.as_deref().unwrap_or(""));

    for ctx in catalog.contexts() {
        field(&mut hasher, &ctx.name);
        for e in &ctx.entries {
            field(&mut hasher, &e.source_text);
            field(&mut hasher, e.comment.as_deref().unwrap_or(""));
            field(&mut hasher, e.status.type_attr().unwrap_or("finished"));
            match &e.numerus_forms {
                Some(forms) => {
                    hasher.update((forms.len() as u64).to_le_bytes());
                    for form in forms {
                        field(&mut hasher, form);
                    }
                }
                None => field(&mut hasher, &e.translation),
            }
        }
    }

    hex::encode(hasher.finalize())
}

// length prefix keeps ("ab", "c") and ("a", "bc") apart
fn field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ts;

    fn doc(translation: &str, line: u32) -> String {
        format!(
            r#"<TS language="fi"><context><name>SoundPlugin</name><message><location filename="soundplugin.cpp" line="{line}"/><source>Sound</source><translation>{translation}</translation></message></context></TS>"#
        )
    }

    #[test]
    fn stable_across_location_changes() {
        let a = ts::parse(&doc("Ääni", 44)).unwrap();
        let b = ts::parse(&doc("Ääni", 90)).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);
    }

    #[test]
    fn changes_with_translation() {
        let a = ts::parse(&doc("Ääni", 44)).unwrap();
        let b = ts::parse(&doc("Äänet", 44)).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn changes_with_later_numerus_form() {
        let plural = |second: &str| {
            format!(
                r#"<TS language="fi"><context><name>TrashPlugin</name><message numerus="yes"><source>%n file(s)</source><translation><numerusform>%n tiedosto</numerusform><numerusform>{second}</numerusform></translation></message></context></TS>"#
            )
        };
        let a = ts::parse(&plural("%n tiedostoa")).unwrap();
        let b = ts::parse(&plural("%n tiedostot")).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
