use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub context: String,

    pub source_text: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub status: TranslationStatus,

    /// Disambiguation comment; part of the lookup key.
    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub extra_comment: Option<String>,

    #[serde(default)]
    pub translator_comment: Option<String>,

    #[serde(default)]
    pub locations: Vec<Location>,

    /// Present only for `numerus="yes"` messages.
    #[serde(default)]
    pub numerus_forms: Option<Vec<String>>,

    /// Distinct `%N` markers in `source_text`.
    #[serde(default)]
    pub placeholder_count: usize,
}

impl TranslationEntry {
    pub fn is_finished(&self) -> bool {
        self.status == TranslationStatus::Finished
    }

    /// Obsolete and vanished messages are kept for editing tools only.
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            TranslationStatus::Finished | TranslationStatus::Unfinished
        )
    }

    /// The text a lookup should produce for this entry, if any.
    pub fn resolved(&self, policy: UnfinishedPolicy) -> Option<&str> {
        let usable = match self.status {
            TranslationStatus::Finished => true,
            TranslationStatus::Unfinished => policy == UnfinishedPolicy::UseDraft,
            TranslationStatus::Obsolete | TranslationStatus::Vanished => false,
        };

        if usable && !self.translation.is_empty() {
            Some(self.translation.as_str())
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    #[default]
    Finished,
    Unfinished,
    Obsolete,
    Vanished,
}

impl TranslationStatus {
    /// Value of the `type` attribute on `<translation>`, `None` for finished.
    pub fn type_attr(self) -> Option<&'static str> {
        match self {
            TranslationStatus::Finished => None,
            TranslationStatus::Unfinished => Some("unfinished"),
            TranslationStatus::Obsolete => Some("obsolete"),
            TranslationStatus::Vanished => Some("vanished"),
        }
    }

    pub fn from_type_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(TranslationStatus::Finished),
            Some("unfinished") => Some(TranslationStatus::Unfinished),
            Some("obsolete") => Some(TranslationStatus::Obsolete),
            Some("vanished") => Some(TranslationStatus::Vanished),
            Some(_) => None,
        }
    }
}

/// What a lookup does with an unfinished entry.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnfinishedPolicy {
    /// Ignore the draft and answer with the source text.
    #[default]
    SourceText,
    /// Use the draft translation when it is not empty.
    UseDraft,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub line: Option<LineRef>,
}

/// `line="42"` is absolute, `line="+3"` is relative to the previous location.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineRef {
    Absolute(u32),
    Relative(i32),
}

impl LineRef {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('+') || value.starts_with('-') {
            value.parse::<i32>().ok().map(LineRef::Relative)
        } else {
            value.parse::<u32>().ok().map(LineRef::Absolute)
        }
    }
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineRef::Absolute(n) => write!(f, "{n}"),
            LineRef::Relative(n) => write!(f, "{n:+}"),
        }
    }
}
