//! Article structure: from tokenized lines to a tree of blocks.
//!
//! An article is a headword line followed by indented lines. Indentation
//! decides nesting, the first node of each line decides what the line is:
//!
//! - `[...]` opens a nested headword (a section of the article)
//! - `~...` or Esperanto text with `~` is an illustration (usage example)
//! - anything else is translation text, cut into blocks at `;` and `.`
//!
//! # Example
//!
//! ```ignore
//! let config = MarkupConfig::default();
//! let parsed = ArticleParser::new(&config).parse("[abak/o] *8 1. _архит._ аб`ак(а);\n\t2. счёты.");
//! assert_eq!(parsed.headword.lemma_forms(), vec!["abako"]);
//! assert_eq!(parsed.headword.children.len(), 2);
//! ```

use crate::ast::{
    Block, DividerClass, ExplanationBlock, Headword, IllustrationBlock, Node, NodeKind,
    ReferenceBlock, ReferenceMode, TranslationBlock, has_mixed_dividers, reconstruct,
};
use crate::config::MarkupConfig;
use crate::diagnostics::{IssueKind, StructuralIssue};
use crate::headword::{expand_tilde, parse_headword};
use crate::merger::merge_continuations;
use crate::preprocess::{is_date_line, preprocess};
use crate::text::{contains_latin, is_cyrillic, is_latin, normalize_key};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Italic runs longer than this are explanations, not labels
const MAX_LABEL_CHARS: usize = 6;

/// Italic words that join alternatives inside translation text
pub const ALTERNATION_WORDS: &[&str] = &["или", "или же", "либо"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedArticle {
    /// Preprocessed article text; node spans point into it
    pub source: String,
    pub headword: Headword,
    pub issues: Vec<StructuralIssue>,
}

pub fn is_alternation_word(tag: &str) -> bool {
    let key = tag.trim().trim_end_matches('.').to_lowercase();
    ALTERNATION_WORDS.contains(&key.as_str())
}

fn is_reference_label(tag: &str) -> bool {
    matches!(
        ReferenceMode::from_label(tag),
        Some(ReferenceMode::See | ReferenceMode::Compare)
    )
}

fn is_short_label(tag: &str) -> bool {
    let tag = tag.trim();
    !tag.is_empty() && tag.chars().count() <= MAX_LABEL_CHARS && !tag.contains(char::is_whitespace)
}

/// One physical line of the article and the lines indented below it
#[derive(Debug)]
struct Line<'t> {
    level: usize,
    numbered: bool,
    /// Byte offset of `text` in the preprocessed article
    offset: usize,
    text: &'t str,
    children: Vec<Line<'t>>,
}

/// Stems and lemmas that `~` refers to inside the current headword
#[derive(Debug, Clone, Default)]
struct TildeContext {
    lemmas: Vec<String>,
    bases: Vec<String>,
}

impl TildeContext {
    fn of(headword: &Headword) -> Self {
        TildeContext {
            lemmas: headword.lemma_forms(),
            bases: headword.bases.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct ParseState {
    issues: Vec<StructuralIssue>,
    reported_labels: HashSet<String>,
}

pub struct ArticleParser<'a> {
    config: &'a MarkupConfig,
    tokenizer: Tokenizer<'a>,
}

impl<'a> ArticleParser<'a> {
    pub fn new(config: &'a MarkupConfig) -> Self {
        ArticleParser {
            config,
            tokenizer: Tokenizer::new(config),
        }
    }

    /// Parse one article and fold its continuation lines.
    pub fn parse(&self, article: &str) -> ParsedArticle {
        let mut parsed = self.parse_unmerged(article);
        parsed.headword = merge_continuations(&parsed.headword);
        tracing::debug!(
            headword = parsed.headword.display_name(),
            blocks = parsed.headword.children.len(),
            issues = parsed.issues.len(),
            "parsed article"
        );
        parsed
    }

    /// Parse one article into the block tree exactly as laid out in the
    /// source, one translation block per `;`/`.` separated run.
    pub fn parse_unmerged(&self, article: &str) -> ParsedArticle {
        let source = preprocess(article);
        let mut state = ParseState::default();
        let lines = self.split_lines(&source);

        let Some(first) = lines.first() else {
            state.issues.push(StructuralIssue::new(
                IssueKind::MissingHeadword,
                "article is empty",
                None,
            ));
            return ParsedArticle {
                source: source.clone(),
                headword: Headword::default(),
                issues: state.issues,
            };
        };

        let tokenized = self.tokenizer.tokenize_at(first.text, first.offset);
        let opening = tokenized.nodes.iter().position(|node| !node.is_blank());
        let marker = opening.and_then(|index| match &tokenized.nodes[index].kind {
            NodeKind::HeadwordMarker {
                lemma,
                official_mark,
                sense_number,
            } => Some((index, lemma.clone(), *official_mark, *sense_number)),
            _ => None,
        });

        let (mut headword, body) = match marker {
            Some((index, lemma, official_mark, sense_number)) => {
                state.issues.extend(tokenized.issues);
                let mut headword = parse_headword(&lemma, official_mark, &[]);
                let context = TildeContext::of(&headword);
                let rest = tokenized.nodes[index + 1..].to_vec();
                headword.children = self.line_blocks(rest, sense_number, &context, &mut state);
                (headword, &lines[1..])
            }
            None => {
                state.issues.push(StructuralIssue::new(
                    IssueKind::MissingHeadword,
                    "first line does not start with a headword",
                    tokenized.nodes.first().map(|node| node.span),
                ));
                (Headword::default(), &lines[..])
            }
        };

        let context = TildeContext::of(&headword);
        let tree = build_line_tree(body);
        for line in &tree {
            self.process_line(line, &context, &mut state, &mut headword.children);
        }

        ParsedArticle {
            source: source.clone(),
            headword,
            issues: state.issues,
        }
    }

    /// Classify one token stream as if it were a single line of an article
    /// without a headword.
    pub fn classify(&self, nodes: Vec<Node>) -> Vec<Block> {
        let mut state = ParseState::default();
        self.line_blocks(nodes, None, &TildeContext::default(), &mut state)
    }

    fn split_lines<'t>(&self, source: &'t str) -> Vec<Line<'t>> {
        let mut lines = Vec::new();
        let mut offset = 0;
        for raw in source.split('\n') {
            let start = offset;
            offset += raw.len() + 1;

            let text = raw.trim_start();
            if text.is_empty() || is_date_line(text) {
                continue;
            }
            let indent = &raw[..raw.len() - text.len()];
            let tabs = indent.chars().filter(|c| *c == '\t').count();
            let spaces = indent.chars().filter(|c| *c == ' ').count();
            let numbered = starts_with_sense_number(text);
            lines.push(Line {
                level: tabs + spaces / self.config.indent_width,
                numbered,
                offset: start + indent.len(),
                text,
                children: Vec::new(),
            });
        }
        lines
    }

    fn process_line(
        &self,
        line: &Line<'_>,
        context: &TildeContext,
        state: &mut ParseState,
        out: &mut Vec<Block>,
    ) {
        let tokenized = self.tokenizer.tokenize_at(line.text, line.offset);
        state.issues.extend(tokenized.issues);
        let nodes = tokenized.nodes;

        let opening = nodes.iter().position(|node| !node.is_blank());
        if let Some(index) = opening
            && let NodeKind::HeadwordMarker {
                lemma,
                official_mark,
                sense_number,
            } = &nodes[index].kind
        {
            let mut headword = parse_headword(lemma, *official_mark, &context.bases);
            let nested = TildeContext::of(&headword);
            let sense_number = *sense_number;
            let rest = nodes[index + 1..].to_vec();
            headword.children = self.line_blocks(rest, sense_number, &nested, state);
            for child in &line.children {
                self.process_line(child, &nested, state, &mut headword.children);
            }
            out.push(Block::Headword(headword));
            return;
        }

        if is_illustration_line(line.text) {
            let mut illustration = self.illustration(line.text, line.offset, context, state);
            let mut siblings = Vec::new();
            for child in &line.children {
                if child.text.starts_with('~') || child.text.starts_with('[') {
                    self.process_line(child, context, state, &mut siblings);
                } else {
                    self.append_continuation(&mut illustration, child, state);
                }
            }
            out.push(Block::Illustration(illustration));
            out.extend(siblings);
            return;
        }

        out.extend(self.line_blocks(nodes, None, context, state));
        for child in &line.children {
            self.process_line(child, context, state, out);
        }
    }

    fn append_continuation(
        &self,
        illustration: &mut IllustrationBlock,
        line: &Line<'_>,
        state: &mut ParseState,
    ) {
        let tokenized = self.tokenizer.tokenize_at(line.text, line.offset);
        state.issues.extend(tokenized.issues);
        illustration.target_segments.extend(tokenized.nodes);
        illustration.requires_review = has_mixed_dividers(&illustration.target_segments);
        for child in &line.children {
            self.append_continuation(illustration, child, state);
        }
    }

    fn illustration(
        &self,
        text: &str,
        offset: usize,
        context: &TildeContext,
        state: &mut ParseState,
    ) -> IllustrationBlock {
        let mut split = russian_start(text);
        let mut source = text[..split].trim();
        if !contains_latin(source) {
            split = 0;
            source = "";
        }

        let tokenized = self.tokenizer.tokenize_at(&text[split..], offset + split);
        state.issues.extend(tokenized.issues);
        let source_expanded = if source.is_empty() {
            Vec::new()
        } else {
            expand_tilde(source, &context.lemmas, &context.bases)
        };

        IllustrationBlock {
            source_lemma: source.to_string(),
            source_expanded,
            requires_review: has_mixed_dividers(&tokenized.nodes),
            target_segments: tokenized.nodes,
        }
    }

    /// Cut the nodes of one line into blocks.
    ///
    /// # Arguments
    ///
    /// * `nodes` - line content after any headword marker
    /// * `sense_number` - sense number carried over from the headword marker
    fn line_blocks(
        &self,
        nodes: Vec<Node>,
        sense_number: Option<u32>,
        context: &TildeContext,
        state: &mut ParseState,
    ) -> Vec<Block> {
        let mixed = has_mixed_dividers(&nodes);
        let mut blocks = LineBlocks::new(sense_number);

        let mut index = 0;
        while index < nodes.len() {
            let node = nodes[index].clone();
            match &node.kind {
                NodeKind::SenseNumber { number } => {
                    blocks.close();
                    blocks.pending_sense = Some(*number);
                }
                NodeKind::StylisticMarker { tag } => {
                    if is_reference_label(tag) || is_alternation_word(tag) {
                        blocks.push(node);
                    } else if is_short_label(tag) {
                        self.check_label(tag, &node, state);
                        blocks.push(node);
                    } else {
                        blocks.close();
                        blocks.attach(Block::Explanation(ExplanationBlock {
                            content: vec![node],
                        }));
                    }
                }
                NodeKind::Divider {
                    class: DividerClass::Phrase,
                    ..
                } if is_esperanto_run(&nodes[index + 1..]) => {
                    blocks.push(node);
                    blocks.close();
                    let remainder = &nodes[index + 1..];
                    let offset = remainder.first().map(|n| n.span.start).unwrap_or_default();
                    let text = reconstruct(remainder);
                    let leading = text.len() - text.trim_start().len();
                    let illustration =
                        self.illustration(text.trim_start(), offset + leading, context, state);
                    blocks.attach(Block::Illustration(illustration));
                    break;
                }
                NodeKind::Divider {
                    class: DividerClass::Far | DividerClass::Sentence,
                    ..
                } => {
                    blocks.push(node);
                    blocks.close();
                }
                _ => blocks.push(node),
            }
            index += 1;
        }

        blocks.finish(mixed)
    }

    fn check_label(&self, tag: &str, node: &Node, state: &mut ParseState) {
        if self.config.labels.contains(tag) {
            return;
        }
        let key = normalize_key(tag);
        if key.is_empty() || !key.chars().any(char::is_alphabetic) {
            return;
        }
        if state.reported_labels.insert(key) {
            tracing::debug!(label = tag, "unknown label");
            state.issues.push(StructuralIssue::new(
                IssueKind::UnknownLabel,
                format!("unknown label '{}'", tag),
                Some(node.span),
            ));
        }
    }
}

/// Blocks of one line under construction
struct LineBlocks {
    blocks: Vec<Block>,
    content: Vec<Node>,
    pending_sense: Option<u32>,
    last_translation: Option<usize>,
}

impl LineBlocks {
    fn new(sense_number: Option<u32>) -> Self {
        LineBlocks {
            blocks: Vec::new(),
            content: Vec::new(),
            pending_sense: sense_number,
            last_translation: None,
        }
    }

    fn push(&mut self, node: Node) {
        self.content.push(node);
    }

    fn close(&mut self) {
        let content = std::mem::take(&mut self.content);
        if content.iter().all(Node::is_blank) {
            return;
        }

        if let Some(reference) = reference_run(&content) {
            match self.pending_sense.take() {
                Some(number) => {
                    let closing: Vec<Node> = content
                        .iter()
                        .rev()
                        .find(|node| !node.is_blank())
                        .filter(|node| node.is_divider(DividerClass::Sentence))
                        .cloned()
                        .into_iter()
                        .collect();
                    let mut translation = TranslationBlock::new(closing);
                    translation.sense_number = Some(number);
                    translation.children.push(Block::Reference(reference));
                    self.push_translation(translation);
                }
                None => self.attach(Block::Reference(reference)),
            }
            return;
        }

        let mut translation = TranslationBlock::new(content);
        translation.sense_number = self.pending_sense.take();
        self.push_translation(translation);
    }

    fn push_translation(&mut self, translation: TranslationBlock) {
        self.blocks.push(Block::Translation(translation));
        self.last_translation = Some(self.blocks.len() - 1);
    }

    /// Make `block` a child of the last translation on this line, or a
    /// block of its own when there is none
    fn attach(&mut self, block: Block) {
        if let Some(index) = self.last_translation
            && let Some(Block::Translation(translation)) = self.blocks.get_mut(index)
        {
            translation.children.push(block);
            return;
        }
        self.blocks.push(block);
    }

    fn finish(mut self, mixed: bool) -> Vec<Block> {
        self.close();
        if let Some(number) = self.pending_sense.take() {
            // Bare "2." line: the sense continues on the lines below
            let mut translation = TranslationBlock::new(Vec::new());
            translation.sense_number = Some(number);
            self.push_translation(translation);
        }
        for block in self.blocks.iter_mut() {
            if let Block::Translation(translation) = block {
                translation.requires_review |= mixed;
                translation.reference_only = translation.is_reference_only();
            }
        }
        self.blocks
    }
}

/// A run of nodes that is nothing but labelled cross-references
fn reference_run(content: &[Node]) -> Option<ReferenceBlock> {
    let mut label: Option<String> = None;
    let mut targets = Vec::new();
    for node in content.iter().filter(|node| !node.is_blank()) {
        match &node.kind {
            NodeKind::Reference {
                target,
                label: reference_label,
            } => {
                if label.is_none() {
                    label = reference_label.clone();
                }
                targets.push(target.clone());
            }
            NodeKind::StylisticMarker { tag } if is_reference_label(tag) => {
                if label.is_none() {
                    label = Some(tag.clone());
                }
            }
            NodeKind::Text { content } if content.trim() == "=" => {
                if label.is_none() {
                    label = Some("=".to_string());
                }
            }
            NodeKind::Divider { class, .. } if *class != DividerClass::Phrase => {}
            _ => return None,
        }
    }
    if targets.is_empty() {
        return None;
    }
    let mode = label
        .as_deref()
        .and_then(ReferenceMode::from_label)
        .unwrap_or(ReferenceMode::Link);
    Some(ReferenceBlock {
        mode,
        label,
        targets,
    })
}

fn build_line_tree<'t>(lines: &[Line<'t>]) -> Vec<Line<'t>> {
    fn attach<'t>(stack: &mut [Line<'t>], roots: &mut Vec<Line<'t>>, line: Line<'t>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(line),
            None => roots.push(line),
        }
    }

    let mut roots = Vec::new();
    let mut stack: Vec<Line<'t>> = Vec::new();
    for line in lines {
        while let Some(top) = stack.last() {
            if top.level < line.level && !(line.numbered && top.numbered) {
                break;
            }
            if let Some(done) = stack.pop() {
                attach(&mut stack, &mut roots, done);
            }
        }
        stack.push(Line {
            level: line.level,
            numbered: line.numbered,
            offset: line.offset,
            text: line.text,
            children: Vec::new(),
        });
    }
    while let Some(done) = stack.pop() {
        attach(&mut stack, &mut roots, done);
    }
    roots
}

fn starts_with_sense_number(text: &str) -> bool {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return false;
    }
    let mut rest = text[digits..].chars();
    rest.next() == Some('.') && rest.next().is_none_or(char::is_whitespace)
}

/// Lines that give an Esperanto example rather than a translation
fn is_illustration_line(text: &str) -> bool {
    if text.starts_with('~') {
        return true;
    }
    let chars: Vec<char> = text.chars().collect();
    if chars
        .windows(2)
        .any(|pair| pair[0] == '~' && is_latin(pair[1]))
    {
        return true;
    }
    let source = &text[..russian_start(text)];
    source.contains('~') && contains_latin(source)
}

/// Byte index where the Russian part of an illustration starts, including
/// any markup that opens it
fn russian_start(text: &str) -> usize {
    let Some(first) = text.char_indices().find(|(_, c)| is_cyrillic(*c)) else {
        return text.len();
    };
    let mut start = first.0;
    while let Some(previous) = text[..start].chars().next_back() {
        if matches!(previous, '(' | '_' | '«' | '"' | '`') {
            start -= previous.len_utf8();
        } else {
            break;
        }
    }
    start
}

fn is_esperanto_run(nodes: &[Node]) -> bool {
    let text = reconstruct(nodes);
    let first_letter = text
        .chars()
        .find(|c| c.is_alphabetic() || *c == '~');
    matches!(first_letter, Some(c) if c == '~' || is_latin(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(article: &str) -> ParsedArticle {
        let config = MarkupConfig::default();
        ArticleParser::new(&config).parse_unmerged(article)
    }

    fn translation(block: &Block) -> &TranslationBlock {
        match block {
            Block::Translation(t) => t,
            other => panic!("expected translation, got {}", other.kind_name()),
        }
    }

    fn plain(nodes: &[Node]) -> String {
        reconstruct(nodes)
    }

    // ========== Headword line ==========

    #[test]
    fn test_headword_line() {
        let parsed = parse("[abak/o] *8 счёты.");
        let head = &parsed.headword;
        assert_eq!(head.raw_form, "abak/o");
        assert_eq!(head.lemma_forms(), vec!["abako"]);
        assert_eq!(head.official_mark, Some(crate::ast::OfficialMark::Aldono(8)));
        assert_eq!(head.children.len(), 1);
        assert_eq!(plain(&translation(&head.children[0]).content), " счёты.");
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn test_missing_headword() {
        let parsed = parse("счёты; абак");
        assert_eq!(parsed.issues[0].kind, IssueKind::MissingHeadword);
        assert_eq!(parsed.headword.display_name(), "<без заголовка>");
        assert_eq!(parsed.headword.children.len(), 2);
    }

    #[test]
    fn test_empty_article() {
        let parsed = parse("\n\n");
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.headword.children.is_empty());
    }

    // ========== Senses and splitting ==========

    #[test]
    fn test_sense_numbers_attach_to_first_translation() {
        let parsed = parse("[abak/o] 1. _архит._ аб`ак(а);\n\t2. счёты; абак.");
        let children = &parsed.headword.children;
        assert_eq!(children.len(), 3);
        assert_eq!(translation(&children[0]).sense_number, Some(1));
        assert_eq!(translation(&children[1]).sense_number, Some(2));
        assert_eq!(translation(&children[2]).sense_number, None);
        assert_eq!(plain(&translation(&children[2]).content), " абак.");
    }

    #[test]
    fn test_numbered_lines_are_siblings() {
        let parsed = parse("[abak/o]\n\t1. счёты;\n\t\t~a kalkulo счёт на абаке;\n\t2. абак.");
        let children = &parsed.headword.children;
        assert_eq!(children.len(), 3);
        assert!(matches!(children[1], Block::Illustration(_)));
        assert_eq!(translation(&children[2]).sense_number, Some(2));
    }

    #[test]
    fn test_bare_sense_line() {
        let parsed = parse("[abak/o]\n\t2.\n\t\tсчёты.");
        let children = &parsed.headword.children;
        assert_eq!(translation(&children[0]).sense_number, Some(2));
        assert!(translation(&children[0]).content.is_empty());
        assert_eq!(plain(&translation(&children[1]).content), "счёты.");
    }

    #[test]
    fn test_mixed_dividers_flag_review() {
        let parsed = parse("[abak/o] счёты, абак; прибор.");
        for child in &parsed.headword.children {
            assert!(translation(child).requires_review);
        }
        let parsed = parse("[abak/o] счёты, абак;");
        assert!(!translation(&parsed.headword.children[0]).requires_review);
    }

    // ========== Italics and references ==========

    #[test]
    fn test_short_label_stays_in_content() {
        let parsed = parse("[abak/o] _архит._ аб`ак(а)");
        let content = &translation(&parsed.headword.children[0]).content;
        assert!(content.iter().any(
            |n| matches!(&n.kind, NodeKind::StylisticMarker { tag } if tag == "архит.")
        ));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn test_unknown_label_reported_once() {
        let parsed = parse("[abak/o] _жарг._ счёты;\n\t_жарг._ абак.");
        let unknown: Vec<_> = parsed
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::UnknownLabel)
            .collect();
        assert_eq!(unknown.len(), 1);
    }

    #[test]
    fn test_long_italic_becomes_explanation() {
        let parsed = parse("[abak/o] счёты _древний счётный прибор_");
        let first = translation(&parsed.headword.children[0]);
        assert!(matches!(first.children[0], Block::Explanation(_)));
    }

    #[test]
    fn test_reference_line_becomes_reference_block() {
        let parsed = parse("[abak/o]\n\t_см._ <sorobano>, <abako>.");
        match &parsed.headword.children[0] {
            Block::Reference(reference) => {
                assert_eq!(reference.mode, ReferenceMode::See);
                assert_eq!(reference.targets, vec!["sorobano", "abako"]);
            }
            other => panic!("expected reference, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_numbered_reference_is_reference_only() {
        let parsed = parse("[abak/o]\n\t3. _see_ <sorobano>.");
        let block = translation(&parsed.headword.children[0]);
        assert_eq!(block.sense_number, Some(3));
        assert!(block.reference_only);
    }

    #[test]
    fn test_same_line_reference_is_child() {
        let parsed = parse("[abak/o] счёты; _ср._ <sorobano>.");
        let first = translation(&parsed.headword.children[0]);
        assert!(matches!(first.children[0], Block::Reference(_)));
        assert!(!first.reference_only);
    }

    #[test]
    fn test_note_with_references_keeps_word() {
        let parsed = parse(
            "[abak/o]\n\t3. счёты (_прибор_ = <globkalkulilo>, <bidkalkulilo>);\n\tпример _see_ <sorobano>;",
        );
        let first = translation(&parsed.headword.children[0]);
        assert!(first
            .content
            .iter()
            .any(|n| n.text().is_some_and(|t| t.trim() == "счёты")));
        assert!(first
            .content
            .iter()
            .any(|n| matches!(n.kind, NodeKind::Note { .. })));
        assert!(!plain(&first.content).contains(", )"));
    }

    // ========== Illustrations ==========

    #[test]
    fn test_illustration_line() {
        let parsed = parse("[abak/o] счёты;\n\tjapana ~ японские счёты, соробан.");
        match &parsed.headword.children[1] {
            Block::Illustration(illustration) => {
                assert_eq!(illustration.source_lemma, "japana ~");
                assert_eq!(illustration.source_expanded, vec!["japana abako"]);
                assert_eq!(
                    plain(&illustration.target_segments),
                    "японские счёты, соробан."
                );
            }
            other => panic!("expected illustration, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_illustration_continuation() {
        let parsed = parse("[abak/o]\n\t~a kalkulo\n\t\tсчёт на абаке.");
        match &parsed.headword.children[0] {
            Block::Illustration(illustration) => {
                assert_eq!(illustration.source_expanded, vec!["abaka kalkulo"]);
                assert_eq!(plain(&illustration.target_segments), "счёт на абаке.");
            }
            other => panic!("expected illustration, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_colon_introduces_example() {
        let parsed = parse("[abak/o] счёты: ~a kalkulo счёт на абаке");
        let first = translation(&parsed.headword.children[0]);
        match &first.children[0] {
            Block::Illustration(illustration) => {
                assert_eq!(illustration.source_lemma, "~a kalkulo");
            }
            other => panic!("expected illustration, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_colon_before_russian_stays() {
        let parsed = parse("[abak/o] счёты: прибор");
        assert_eq!(parsed.headword.children.len(), 1);
        assert!(translation(&parsed.headword.children[0]).children.is_empty());
    }

    // ========== Nested headwords ==========

    #[test]
    fn test_nested_headword_section() {
        let parsed = parse("[abak/o] счёты.\n\t[~ist/o] абакист;\n\t\t~a vico ряд.");
        match &parsed.headword.children[1] {
            Block::Headword(nested) => {
                assert_eq!(nested.lemma_forms(), vec!["abakisto"]);
                assert_eq!(nested.children.len(), 2);
                match &nested.children[1] {
                    Block::Illustration(illustration) => {
                        assert_eq!(illustration.source_expanded, vec!["abakista vico"]);
                    }
                    other => panic!("expected illustration, got {}", other.kind_name()),
                }
            }
            other => panic!("expected headword, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_spans_point_into_source() {
        let parsed = parse("[abak/o] счёты;\n\tабак.");
        let second = translation(&parsed.headword.children[1]);
        for node in &second.content {
            assert_eq!(node.source(&parsed.source), node.raw);
        }
    }

    #[test]
    fn test_classify_single_stream() {
        let config = MarkupConfig::default();
        let nodes = Tokenizer::new(&config).tokenize("счёты; абак.").nodes;
        let blocks = ArticleParser::new(&config).classify(nodes);
        assert_eq!(blocks.len(), 2);
    }
}
