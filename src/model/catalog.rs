//! Loaded translation catalog and fail-soft lookup.
//!
//! A `Catalog` keeps contexts and their entries in document order and
//! never changes after construction, so it can be shared across threads
//! behind an `Arc` without locking.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use super::entry::{TranslationEntry, UnfinishedPolicy};
use crate::services::placeholder;

/// Attributes of the `<TS>` root element.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct CatalogHeader {
    pub version: Option<String>,
    pub language: Option<String>,
    pub source_language: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: String,
    pub entries: Vec<TranslationEntry>,
}

// context name -> source text -> (context index, entry index), in document order
type LookupIndex = HashMap<String, HashMap<String, Vec<(usize, usize)>>>;

#[derive(Debug, Clone)]
pub struct Catalog {
    header: CatalogHeader,
    contexts: Vec<Context>,
    policy: UnfinishedPolicy,
    index: LookupIndex,
    duplicates: Vec<(usize, usize)>,
}

impl Catalog {
    /// Builds the lookup index. Entry context names and placeholder counts
    /// are filled in from the surrounding context and source text.
    pub fn new(header: CatalogHeader, mut contexts: Vec<Context>) -> Self {
        for ctx in contexts.iter_mut() {
            for e in ctx.entries.iter_mut() {
                e.context.clone_from(&ctx.name);
                e.placeholder_count = placeholder::count(&e.source_text);
            }
        }

        let mut index: LookupIndex = HashMap::new();
        let mut duplicates = Vec::new();

        for (ci, ctx) in contexts.iter().enumerate() {
            for (ei, e) in ctx.entries.iter().enumerate() {
                if !e.is_live() {
                    continue;
                }

                let slots = index
                    .entry(ctx.name.clone())
                    .or_default()
                    .entry(e.source_text.clone())
                    .or_default();

                let comment = comment_key(e.comment.as_deref());
                let clash = slots.iter().any(|&(c, i)| {
                    comment_key(contexts[c].entries[i].comment.as_deref()) == comment
                });
                if clash {
                    warn!(
                        context = %ctx.name,
                        source = %e.source_text,
                        "duplicate message; first occurrence wins"
                    );
                    duplicates.push((ci, ei));
                }

                slots.push((ci, ei));
            }
        }

        Catalog {
            header,
            contexts,
            policy: UnfinishedPolicy::default(),
            index,
            duplicates,
        }
    }

    pub fn with_unfinished_policy(mut self, policy: UnfinishedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn unfinished_policy(&self) -> UnfinishedPolicy {
        self.policy
    }

    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    pub fn language(&self) -> Option<&str> {
        self.header.language.as_deref()
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// First context block with this name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// All entries in document order, obsolete ones included.
    pub fn entries(&self) -> impl Iterator<Item = &TranslationEntry> {
        self.contexts.iter().flat_map(|c| c.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.contexts.iter().map(|c| c.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entries shadowed by an earlier entry with the same key.
    pub fn duplicates(&self) -> impl Iterator<Item = &TranslationEntry> {
        self.duplicates
            .iter()
            .map(|&(c, i)| &self.contexts[c].entries[i])
    }

    /// Exact lookup on (context, source text, comment). A missing comment
    /// and an empty one are the same key.
    pub fn lookup(
        &self,
        context: &str,
        source_text: &str,
        comment: Option<&str>,
    ) -> Option<&TranslationEntry> {
        let wanted = comment_key(comment);
        self.index
            .get(context)?
            .get(source_text)?
            .iter()
            .map(|&(c, i)| &self.contexts[c].entries[i])
            .find(|e| comment_key(e.comment.as_deref()) == wanted)
    }

    /// Translated text without substitution, or `source_text` itself.
    pub fn tr<'a>(&'a self, context: &str, source_text: &'a str) -> &'a str {
        self.resolve(context, source_text, None)
            .unwrap_or(source_text)
    }

    /// Looks up `source_text` and substitutes `%1`, `%2`, ... with `args`.
    /// Never fails: a missing or unusable entry yields the source text.
    pub fn translate(&self, context: &str, source_text: &str, args: &[&str]) -> String {
        self.translate_with_comment(context, source_text, None, args)
    }

    /// Like [`Catalog::translate`], trying the disambiguated key first and
    /// the plain key second.
    pub fn translate_with_comment(
        &self,
        context: &str,
        source_text: &str,
        comment: Option<&str>,
        args: &[&str],
    ) -> String {
        let text = self
            .resolve(context, source_text, comment)
            .or_else(|| match comment {
                Some(c) if !c.is_empty() => self.resolve(context, source_text, None),
                _ => None,
            })
            .unwrap_or(source_text);

        placeholder::substitute(text, args)
    }

    fn resolve(&self, context: &str, source_text: &str, comment: Option<&str>) -> Option<&str> {
        self.lookup(context, source_text, comment)?
            .resolved(self.policy)
    }
}

fn comment_key(comment: Option<&str>) -> &str {
    comment.unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::TranslationStatus;

    fn msg(source: &str, translation: &str, status: TranslationStatus) -> TranslationEntry {
        TranslationEntry {
            context: String::new(),
            source_text: source.into(),
            translation: translation.into(),
            status,
            comment: None,
            extra_comment: None,
            translator_comment: None,
            locations: Vec::new(),
            numerus_forms: None,
            placeholder_count: 0,
        }
    }

    fn sample() -> Catalog {
        let mut open_menu = msg("Open", "Avaa valikko", TranslationStatus::Finished);
        open_menu.comment = Some("menu".into());

        Catalog::new(
            CatalogHeader {
                version: Some("2.1".into()),
                language: Some("fi".into()),
                source_language: None,
            },
            vec![
                Context {
                    name: "TrashWidget".into(),
                    entries: vec![
                        msg("Open", "Avaa", TranslationStatus::Finished),
                        open_menu,
                        msg("Empty", "Tyhjennä", TranslationStatus::Finished),
                        msg("Empty", "Tyhjä", TranslationStatus::Finished),
                    ],
                },
                Context {
                    name: "PowerPlugin".into(),
                    entries: vec![
                        msg("Capacity %1, fully charged", "", TranslationStatus::Unfinished),
                        msg("Capacity %1", "Varaus %1", TranslationStatus::Finished),
                        msg("Old", "Vanha", TranslationStatus::Obsolete),
                    ],
                },
            ],
        )
    }

    #[test]
    fn entries_inherit_context_and_placeholder_count() {
        let cat = sample();
        let e = cat.lookup("PowerPlugin", "Capacity %1", None).unwrap();
        assert_eq!(e.context, "PowerPlugin");
        assert_eq!(e.placeholder_count, 1);
        assert_eq!(cat.len(), 7);
    }

    #[test]
    fn missing_key_returns_source() {
        let cat = sample();
        assert_eq!(cat.translate("Nope", "Hello %1", &[]), "Hello %1");
        assert_eq!(cat.tr("TrashWidget", "Close"), "Close");
    }

    #[test]
    fn args_apply_to_fallback_text_too() {
        let cat = sample();
        assert_eq!(
            cat.translate("PowerPlugin", "Capacity %1, fully charged", &["90%"]),
            "Capacity 90%, fully charged"
        );
        assert_eq!(cat.translate("PowerPlugin", "Capacity %1", &["90%"]), "Varaus 90%");
    }

    #[test]
    fn obsolete_entries_are_not_indexed() {
        let cat = sample();
        assert!(cat.lookup("PowerPlugin", "Old", None).is_none());
        assert_eq!(cat.tr("PowerPlugin", "Old"), "Old");
    }

    #[test]
    fn comment_disambiguates_and_falls_back() {
        let cat = sample();
        assert_eq!(cat.translate_with_comment("TrashWidget", "Open", Some("menu"), &[]), "Avaa valikko");
        assert_eq!(cat.translate_with_comment("TrashWidget", "Open", None, &[]), "Avaa");
        assert_eq!(cat.translate_with_comment("TrashWidget", "Open", Some("toolbar"), &[]), "Avaa");
    }

    #[test]
    fn first_duplicate_wins() {
        let cat = sample();
        assert_eq!(cat.tr("TrashWidget", "Empty"), "Tyhjennä");
        let dups: Vec<_> = cat.duplicates().map(|e| e.translation.as_str()).collect();
        assert_eq!(dups, vec!["Tyhjä"]);
    }

    #[test]
    fn draft_policy() {
        let mut ctx = Context {
            name: "ShutdownPlugin".into(),
            entries: vec![msg("shutdown", "sammutus", TranslationStatus::Unfinished)],
        };
        ctx.entries[0].translator_comment = Some("check wording".into());
        let cat = Catalog::new(CatalogHeader::default(), vec![ctx]);

        assert_eq!(cat.tr("ShutdownPlugin", "shutdown"), "shutdown");
        let cat = cat.with_unfinished_policy(UnfinishedPolicy::UseDraft);
        assert_eq!(cat.tr("ShutdownPlugin", "shutdown"), "sammutus");
    }

    #[test]
    fn catalog_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
