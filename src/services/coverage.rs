use serde::Serialize;

use crate::model::catalog::{Catalog, Context};
use crate::model::entry::TranslationStatus;

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct Counts {
    /// Live messages: finished plus unfinished.
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    /// Obsolete and vanished messages, not part of `total`.
    pub obsolete: usize,
    pub ratio: f64,
}

impl Counts {
    fn add(&mut self, status: TranslationStatus) {
        match status {
            TranslationStatus::Finished => self.finished += 1,
            TranslationStatus::Unfinished => self.unfinished += 1,
            TranslationStatus::Obsolete | TranslationStatus::Vanished => self.obsolete += 1,
        }
    }

    fn seal(mut self) -> Self {
        self.total = self.finished + self.unfinished;
        self.ratio = if self.total == 0 {
            1.0
        } else {
            self.finished as f64 / self.total as f64
        };
        self
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContextCoverage {
    pub name: String,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CoverageReport {
    pub language: Option<String>,
    #[serde(flatten)]
    pub counts: Counts,
    pub contexts: Vec<ContextCoverage>,
}

pub fn report(catalog: &Catalog) -> CoverageReport {
    let mut overall = Counts::default();
    let mut contexts = Vec::with_capacity(catalog.contexts().len());

    for ctx in catalog.contexts() {
        let counts = context_counts(ctx);
        overall.finished += counts.finished;
        overall.unfinished += counts.unfinished;
        overall.obsolete += counts.obsolete;
        contexts.push(ContextCoverage {
            name: ctx.name.clone(),
            counts,
        });
    }

    CoverageReport {
        language: catalog.language().map(str::to_string),
        counts: overall.seal(),
        contexts,
    }
}

fn context_counts(ctx: &Context) -> Counts {
    let mut counts = Counts::default();
    for e in &ctx.entries {
        counts.add(e.status);
    }
    counts.seal()
}
