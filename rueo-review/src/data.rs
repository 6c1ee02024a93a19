//! Core data structures of the review engine
//!
//! A translation run such as `отложительный (_или_ отделительный) падеж` is
//! read into a list of [`Component`]s, each holding the alternatives for one
//! stretch of the phrase:
//!
//! ```ignore
//! [
//!     Component { alternatives: ["отложительный", "отделительный"] },
//!     Component { alternatives: [" падеж"] },
//! ]
//! ```
//!
//! The cartesian product of the components gives the phrases of a
//! [`TranslationGroup`].

use crate::error::{ReviewError, ReviewResult};
use rueo_markup::StructuralIssue;
use serde::{Deserialize, Serialize};

/// Ordered, non-empty set of alternative spellings for one part of a phrase
///
/// Alternatives are kept unique in first-seen order. Whitespace is part of
/// an alternative: components are concatenated as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    alternatives: Vec<String>,
}

impl Component {
    /// Create a component, failing when no alternative is given
    pub fn new(alternatives: Vec<String>) -> ReviewResult<Self> {
        let mut unique: Vec<String> = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            if !unique.contains(&alternative) {
                unique.push(alternative);
            }
        }
        if unique.is_empty() {
            return Err(ReviewError::InvariantViolation(
                "component without alternatives".to_string(),
            ));
        }
        Ok(Component {
            alternatives: unique,
        })
    }

    pub fn single(text: impl Into<String>) -> Self {
        Component {
            alternatives: vec![text.into()],
        }
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_single(&self) -> bool {
        self.alternatives.len() == 1
    }

    /// The only alternative of a single-alternative component
    pub fn as_single(&self) -> Option<&str> {
        match self.alternatives.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Rewrite every alternative, keeping uniqueness
    pub fn map(&self, f: impl Fn(&str) -> String) -> Self {
        let mut mapped = Vec::with_capacity(self.alternatives.len());
        for alternative in &self.alternatives {
            let value = f(alternative);
            if !mapped.contains(&value) {
                mapped.push(value);
            }
        }
        Component {
            alternatives: mapped,
        }
    }

    /// Append alternatives that are not present yet
    pub fn extend(&mut self, more: impl IntoIterator<Item = String>) {
        for alternative in more {
            if !self.alternatives.contains(&alternative) {
                self.alternatives.push(alternative);
            }
        }
    }
}

/// Components of one phrase, concatenated in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phrase {
    pub components: Vec<Component>,
    /// Source text the phrase was built from, used when expansion gives up
    pub literal: String,
}

impl Phrase {
    pub fn new(components: Vec<Component>, literal: impl Into<String>) -> Self {
        Phrase {
            components,
            literal: literal.into(),
        }
    }

    /// Number of phrases the cartesian product would give, `None` on overflow
    pub fn variant_count(&self) -> Option<usize> {
        self.components
            .iter()
            .try_fold(1usize, |total, component| total.checked_mul(component.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Phrases between two `;` dividers; one set becomes one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseSet {
    pub phrases: Vec<Phrase>,
    /// Commentary notes met inside the set
    pub notes: Vec<String>,
}

impl PhraseSet {
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.notes.is_empty()
    }
}

/// One way of reading a group: as written, or fully expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub items: Vec<String>,
}

impl Candidate {
    pub fn new(id: &str, title: &str, items: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            items,
        }
    }
}

pub const LITERAL_CANDIDATE: &str = "literal";
pub const EXPANDED_CANDIDATE: &str = "expanded";

/// The reviewable unit: one semantic section of an article with its
/// literal and expanded readings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationGroup {
    pub id: String,
    /// Identity that survives a re-parse: `{section or "-"}#{ordinal}`
    pub stable_key: String,
    pub items: Vec<String>,
    pub base_items: Vec<String>,
    pub label: Option<String>,
    pub section: Option<String>,
    pub requires_review: bool,
    pub auto_generated: bool,
    /// Set for usage examples; holds the Esperanto side
    pub eo_source: Option<String>,
    pub candidates: Vec<Candidate>,
    pub notes: Vec<String>,
    pub selected_candidate: Option<String>,
    pub accepted: Option<bool>,
}

impl TranslationGroup {
    pub fn is_example(&self) -> bool {
        self.eo_source.is_some()
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| candidate.id == id)
    }
}

/// Groups, notes and structural issues of one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleReview {
    pub headword: String,
    pub groups: Vec<TranslationGroup>,
    pub notes: Vec<String>,
    pub issues: Vec<StructuralIssue>,
}

/// A decision an editor made on a group in an earlier review
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDecision {
    pub stable_key: String,
    pub accepted: Option<bool>,
    pub selected_candidate: Option<String>,
    /// Items typed in by hand; they win over any candidate
    pub manual_items: Option<Vec<String>>,
}

/// An Esperanto usage example and its Russian rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub eo: String,
    pub ru: String,
}
