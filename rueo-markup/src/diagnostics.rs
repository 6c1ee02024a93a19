//! Structural issues found while reading article markup.
//!
//! Malformed markup never stops a parse. The offending run is kept as plain
//! text and an issue is recorded so an editor can fix the source later.

use crate::ast::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnterminatedBracket,
    UnterminatedNote,
    UnterminatedReference,
    UnterminatedItalic,
    UnterminatedGrammar,
    StrayParenthesis,
    MissingHeadword,
    UnknownLabel,
    ExpansionLimit,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::UnterminatedBracket => "unterminated bracket",
            IssueKind::UnterminatedNote => "unterminated note",
            IssueKind::UnterminatedReference => "unterminated reference",
            IssueKind::UnterminatedItalic => "unterminated italic",
            IssueKind::UnterminatedGrammar => "unterminated grammar tag",
            IssueKind::StrayParenthesis => "stray parenthesis",
            IssueKind::MissingHeadword => "missing headword",
            IssueKind::UnknownLabel => "unknown label",
            IssueKind::ExpansionLimit => "expansion limit",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralIssue {
    pub kind: IssueKind,
    pub message: String,
    pub span: Option<Span>,
}

impl StructuralIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>, span: Option<Span>) -> Self {
        StructuralIssue {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn shifted(mut self, offset: usize) -> Self {
        self.span = self.span.map(|s| s.shifted(offset));
        self
    }
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{} at {}..{}: {}",
                self.kind, span.start, span.end, self.message
            ),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}
