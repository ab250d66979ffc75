use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::entry::{TranslationEntry, TranslationStatus, UnfinishedPolicy};
use crate::services::placeholder;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub context: String,
    pub source_text: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl QaIssue {
    fn new(e: &TranslationEntry, code: &str, severity: Severity, message: String) -> Self {
        QaIssue {
            context: e.context.clone(),
            source_text: e.source_text.clone(),
            code: code.to_string(),
            severity,
            message,
        }
    }
}

/// Data-quality findings. Nothing here stops a catalog from being used.
pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let unfinished_message = match catalog.unfinished_policy() {
        UnfinishedPolicy::SourceText => "Translation is not finished; lookups use the source text",
        UnfinishedPolicy::UseDraft => {
            "Translation is not finished; lookups use the draft, or the source text if it is empty"
        }
    };

    for e in catalog.entries() {
        match e.status {
            TranslationStatus::Obsolete | TranslationStatus::Vanished => continue,
            TranslationStatus::Unfinished => {
                issues.push(QaIssue::new(
                    e,
                    "UNFINISHED",
                    Severity::Warning,
                    unfinished_message.to_string(),
                ));
                continue;
            }
            TranslationStatus::Finished => {}
        }

        let translation_trim = e.translation.trim();

        if translation_trim.is_empty() {
            issues.push(QaIssue::new(
                e,
                "EMPTY_TRANSLATION",
                Severity::Warning,
                "Marked finished but the translation is empty".to_string(),
            ));
            continue;
        }

        // identical text is often legitimate (brand names), hence info only
        if translation_trim == e.source_text.trim() {
            issues.push(QaIssue::new(
                e,
                "SAME_AS_SOURCE",
                Severity::Info,
                "Translation is identical to the source text".to_string(),
            ));
        }

        check_placeholders(e, &mut issues);
    }

    for e in catalog.duplicates() {
        issues.push(QaIssue::new(
            e,
            "DUPLICATE_MESSAGE",
            Severity::Warning,
            "Same context, source and comment as an earlier message; this one is never used"
                .to_string(),
        ));
    }

    issues
}

fn check_placeholders(e: &TranslationEntry, issues: &mut Vec<QaIssue>) {
    let in_source = placeholder::markers(&e.source_text);
    let in_translation = placeholder::markers(&e.translation);

    let missing: Vec<String> = in_source
        .difference(&in_translation)
        .map(|n| format!("%{n}"))
        .collect();
    if !missing.is_empty() {
        issues.push(QaIssue::new(
            e,
            "PLACEHOLDER_MISSING",
            Severity::Warning,
            format!("Translation lacks {}", missing.join(", ")),
        ));
    }

    let extra: Vec<String> = in_translation
        .difference(&in_source)
        .map(|n| format!("%{n}"))
        .collect();
    if !extra.is_empty() {
        issues.push(QaIssue::new(
            e,
            "PLACEHOLDER_EXTRA",
            Severity::Warning,
            format!("Translation adds {} not present in the source", extra.join(", ")),
        ));
    }
}
