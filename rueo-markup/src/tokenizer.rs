//! Rich-text tokenizer for dictionary article markup
//!
//! Turns one line (or any run) of article text into an ordered list of typed
//! [`Node`]s. The scan is character by character so that the meaning of a
//! period can be decided from its surroundings instead of by splitting on
//! punctuation.
//!
//! # Markup
//!
//! | Markup        | Node                                   |
//! |---------------|----------------------------------------|
//! | `[...]`       | `HeadwordMarker` (+ `*`, `*N`, `N.`)   |
//! | `N.` at start | `SenseNumber`                          |
//! | `(...)`       | `Note` (depth tracked)                 |
//! | `<...>`       | `Reference`                            |
//! | `_..._`       | `StylisticMarker`                      |
//! | `{...}`       | `Grammar`                              |
//! | `, ; : . ! ?` | `Divider`                              |
//!
//! # Algorithm Overview
//!
//! 1. Walk the characters, accumulating plain text into the current run
//! 2. On an opening delimiter, look for its partner; if found, close the text
//!    run and emit the bracketed node, otherwise keep the delimiter as text and
//!    record a [`StructuralIssue`]
//! 3. On punctuation, ask the abbreviation table whether a `.` ends a sentence
//! 4. Every emitted node keeps the exact source slice it covers, so joining the
//!    `raw` fields gives back the input
//!
//! # Example
//!
//! ```ignore
//! use rueo_markup::{MarkupConfig, Tokenizer};
//!
//! let config = MarkupConfig::default();
//! let tokenized = Tokenizer::new(&config).tokenize("д`елать что-л. неест`ественно");
//! assert_eq!(tokenized.nodes.len(), 1); // the period belongs to "что-л."
//! ```

use crate::ast::{DividerClass, Node, NodeKind, OfficialMark, ReferenceMode, Span};
use crate::config::MarkupConfig;
use crate::diagnostics::{IssueKind, StructuralIssue};

/// Nodes of a tokenized run together with the problems found in it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokenized {
    pub nodes: Vec<Node>,
    pub issues: Vec<StructuralIssue>,
}

pub struct Tokenizer<'a> {
    config: &'a MarkupConfig,
}

impl<'a> Tokenizer<'a> {
    pub fn new(config: &'a MarkupConfig) -> Self {
        Tokenizer { config }
    }

    pub fn tokenize(&self, raw: &str) -> Tokenized {
        self.tokenize_at(raw, 0)
    }

    /// Tokenize `raw`, reporting spans relative to a larger text in which
    /// `raw` starts at byte `offset`.
    pub fn tokenize_at(&self, raw: &str, offset: usize) -> Tokenized {
        let mut scanner = Scanner::new(raw, self.config);
        scanner.run();
        Tokenized {
            nodes: scanner
                .nodes
                .into_iter()
                .map(|node| node.shifted(offset))
                .collect(),
            issues: scanner
                .issues
                .into_iter()
                .map(|issue| issue.shifted(offset))
                .collect(),
        }
    }
}

struct Scanner<'s> {
    source: &'s str,
    config: &'s MarkupConfig,
    /// Byte offset of every character
    offsets: Vec<usize>,
    chars: Vec<char>,
    pos: usize,
    text_start: Option<usize>,
    text_content: String,
    reference_label: Option<String>,
    nodes: Vec<Node>,
    issues: Vec<StructuralIssue>,
}

impl<'s> Scanner<'s> {
    fn new(source: &'s str, config: &'s MarkupConfig) -> Self {
        let (offsets, chars): (Vec<usize>, Vec<char>) = source.char_indices().unzip();
        Scanner {
            source,
            config,
            offsets,
            chars,
            pos: 0,
            text_start: None,
            text_content: String::new(),
            reference_label: None,
            nodes: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.offsets
            .get(char_index)
            .copied()
            .unwrap_or(self.source.len())
    }

    fn span(&self, from: usize, to: usize) -> Span {
        Span::new(self.byte_at(from), self.byte_at(to))
    }

    fn slice(&self, from: usize, to: usize) -> &'s str {
        &self.source[self.byte_at(from)..self.byte_at(to)]
    }

    fn collect(&self, from: usize, to: usize) -> String {
        self.chars[from..to].iter().collect()
    }

    fn run(&mut self) {
        self.scan_sense_number();

        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            match c {
                '\\' if self.chars.get(self.pos + 1) == Some(&'_') => {
                    self.push_text_char(self.pos, '_');
                    self.pos += 2;
                }
                '_' => self.scan_italic(),
                '(' => self.scan_note(),
                ')' => {
                    self.issue(
                        IssueKind::StrayParenthesis,
                        "closing parenthesis without an opening one",
                        self.pos,
                        self.pos + 1,
                    );
                    self.push_text_char(self.pos, ')');
                    self.pos += 1;
                }
                '<' => self.scan_reference(),
                '{' => self.scan_grammar(),
                '[' => self.scan_headword(),
                ',' | ';' | ':' | '.' | '!' | '?' => self.scan_divider(c),
                _ => {
                    self.push_text_char(self.pos, c);
                    self.pos += 1;
                }
            }
        }

        self.flush_text(self.chars.len());
    }

    // ========== Text runs ==========

    fn push_text_char(&mut self, at: usize, c: char) {
        if self.text_start.is_none() {
            self.text_start = Some(at);
        }
        self.text_content.push(c);
    }

    fn push_text_range(&mut self, from: usize, to: usize) {
        for i in from..to {
            let c = self.chars[i];
            self.push_text_char(i, c);
        }
    }

    fn flush_text(&mut self, end: usize) {
        let Some(start) = self.text_start.take() else {
            return;
        };
        let content = std::mem::take(&mut self.text_content);
        let trimmed = content.trim();
        if trimmed.ends_with('=') {
            self.reference_label = Some("=".to_string());
        } else if !trimmed.is_empty() {
            self.reference_label = None;
        }
        let node = Node::new(
            NodeKind::Text { content },
            self.span(start, end),
            self.slice(start, end),
        );
        self.nodes.push(node);
    }

    fn emit(&mut self, kind: NodeKind, from: usize, to: usize) {
        self.flush_text(from);
        let node = Node::new(kind, self.span(from, to), self.slice(from, to));
        self.nodes.push(node);
    }

    fn issue(&mut self, kind: IssueKind, message: &str, from: usize, to: usize) {
        let span = self.span(from, to);
        tracing::debug!(%kind, start = span.start, "markup issue: {}", message);
        self.issues
            .push(StructuralIssue::new(kind, message, Some(span)));
    }

    fn find_from(&self, from: usize, target: char) -> Option<usize> {
        (from..self.chars.len()).find(|&i| self.chars[i] == target)
    }

    // ========== Delimited runs ==========

    fn scan_sense_number(&mut self) {
        let mut i = 0;
        while i < self.chars.len() && self.chars[i].is_whitespace() {
            i += 1;
        }
        let digits_start = i;
        while i < self.chars.len() && self.chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start || self.chars.get(i) != Some(&'.') {
            return;
        }
        let after = self.chars.get(i + 1);
        if after.is_some_and(|c| !c.is_whitespace()) {
            return;
        }
        let Ok(number) = self.collect(digits_start, i).parse::<u32>() else {
            return;
        };
        self.push_text_range(0, digits_start);
        self.emit(NodeKind::SenseNumber { number }, digits_start, i + 1);
        self.pos = i + 1;
    }

    fn scan_italic(&mut self) {
        let start = self.pos;
        let close = (start + 1..self.chars.len())
            .find(|&i| self.chars[i] == '_' && self.chars[i - 1] != '\\');
        match close {
            Some(end) => {
                let tag = self.collect(start + 1, end).replace("\\_", "_");
                let tag = tag.trim().to_string();
                if matches!(
                    ReferenceMode::from_label(&tag),
                    Some(ReferenceMode::See | ReferenceMode::Compare)
                ) {
                    self.flush_text(start);
                    self.reference_label = Some(tag.clone());
                }
                self.emit(NodeKind::StylisticMarker { tag }, start, end + 1);
                self.pos = end + 1;
            }
            None => {
                self.issue(
                    IssueKind::UnterminatedItalic,
                    "italic run is not closed",
                    start,
                    self.chars.len(),
                );
                self.push_text_char(start, '_');
                self.pos += 1;
            }
        }
    }

    fn scan_note(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;
        let mut close = None;
        for i in start..self.chars.len() {
            match self.chars[i] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        let Some(end) = close else {
            self.issue(
                IssueKind::UnterminatedNote,
                "parenthesis is not closed",
                start,
                self.chars.len(),
            );
            self.push_text_char(start, '(');
            self.pos += 1;
            return;
        };

        let body = self.collect(start + 1, end);
        if body.trim().chars().count() <= 1 {
            // "аб`ак(а)": a one-letter optional ending stays part of the word
            self.push_text_range(start, end + 1);
        } else {
            self.emit(NodeKind::Note { body }, start, end + 1);
        }
        self.pos = end + 1;
    }

    fn scan_reference(&mut self) {
        let start = self.pos;
        match self.find_from(start + 1, '>') {
            Some(end) => {
                let target = self.collect(start + 1, end).trim().to_string();
                let label = self.reference_label.clone();
                self.emit(NodeKind::Reference { target, label }, start, end + 1);
                self.pos = end + 1;
            }
            None => {
                self.issue(
                    IssueKind::UnterminatedReference,
                    "reference is not closed",
                    start,
                    self.chars.len(),
                );
                self.push_text_char(start, '<');
                self.pos += 1;
            }
        }
    }

    fn scan_grammar(&mut self) {
        let start = self.pos;
        match self.find_from(start + 1, '}') {
            Some(end) => {
                let tag = self.collect(start + 1, end).trim().to_string();
                self.emit(NodeKind::Grammar { tag }, start, end + 1);
                self.pos = end + 1;
            }
            None => {
                self.issue(
                    IssueKind::UnterminatedGrammar,
                    "grammar tag is not closed",
                    start,
                    self.chars.len(),
                );
                self.push_text_char(start, '{');
                self.pos += 1;
            }
        }
    }

    fn scan_headword(&mut self) {
        let start = self.pos;
        let Some(close) = self.find_from(start + 1, ']') else {
            self.issue(
                IssueKind::UnterminatedBracket,
                "headword bracket is not closed",
                start,
                self.chars.len(),
            );
            self.push_text_char(start, '[');
            self.pos += 1;
            return;
        };

        let lemma = self.collect(start + 1, close).trim().to_string();
        let mut end = close + 1;

        let mut official_mark = None;
        let mut i = self.skip_spaces(end);
        if self.chars.get(i) == Some(&'*') {
            i += 1;
            let digits_start = i;
            while i < self.chars.len() && self.chars[i].is_ascii_digit() {
                i += 1;
            }
            official_mark = match self.collect(digits_start, i).parse::<u32>() {
                Ok(n) => Some(OfficialMark::Aldono(n)),
                Err(_) => Some(OfficialMark::Fundamento),
            };
            end = i;
        }

        let mut sense_number = None;
        let i = self.skip_spaces(end);
        let digits_start = i;
        let mut j = i;
        while j < self.chars.len() && self.chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start
            && self.chars.get(j) == Some(&'.')
            && self.chars.get(j + 1).is_none_or(|c| c.is_whitespace())
        {
            sense_number = self.collect(digits_start, j).parse::<u32>().ok();
            if sense_number.is_some() {
                end = j + 1;
            }
        }

        self.emit(
            NodeKind::HeadwordMarker {
                lemma,
                official_mark,
                sense_number,
            },
            start,
            end,
        );
        self.pos = end;
    }

    fn skip_spaces(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.chars.len() && (self.chars[i] == ' ' || self.chars[i] == '\t') {
            i += 1;
        }
        i
    }

    fn scan_divider(&mut self, symbol: char) {
        let at = self.pos;
        if symbol == '.'
            && self
                .config
                .abbreviations
                .is_abbreviation_period(&self.chars, at)
        {
            self.push_text_char(at, '.');
            self.pos += 1;
            return;
        }

        let Some(class) = DividerClass::of(symbol) else {
            self.push_text_char(at, symbol);
            self.pos += 1;
            return;
        };
        self.emit(NodeKind::Divider { symbol, class }, at, at + 1);
        if matches!(class, DividerClass::Far | DividerClass::Sentence) {
            self.reference_label = None;
        }
        self.pos += 1;
    }
}
