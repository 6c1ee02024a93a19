use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range into the text a node was tokenized from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn shifted(self, offset: usize) -> Self {
        Span::new(self.start + offset, self.end + offset)
    }
}

/// How strongly a punctuation mark separates the text around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividerClass {
    /// `,` separates synonyms inside one group
    Near,
    /// `;` separates groups
    Far,
    /// `.`, `!`, `?` end a translation block
    Sentence,
    /// `:` introduces an illustration or a gloss
    Phrase,
}

impl DividerClass {
    pub fn of(symbol: char) -> Option<Self> {
        match symbol {
            ',' => Some(DividerClass::Near),
            ';' => Some(DividerClass::Far),
            '.' | '!' | '?' => Some(DividerClass::Sentence),
            ':' => Some(DividerClass::Phrase),
            _ => None,
        }
    }
}

/// Official status of a headword (`*` and `*N` after the bracket)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficialMark {
    /// Root of the Fundamento (`*`)
    Fundamento,
    /// Root from the N-th Official Addition (`*N`)
    Aldono(u32),
}

impl fmt::Display for OfficialMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfficialMark::Fundamento => write!(f, "UV"),
            OfficialMark::Aldono(n) => write!(f, "OA{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Text {
        content: String,
    },
    Divider {
        symbol: char,
        class: DividerClass,
    },
    Note {
        body: String,
    },
    Reference {
        target: String,
        label: Option<String>,
    },
    StylisticMarker {
        tag: String,
    },
    HeadwordMarker {
        lemma: String,
        official_mark: Option<OfficialMark>,
        sense_number: Option<u32>,
    },
    SenseNumber {
        number: u32,
    },
    Grammar {
        tag: String,
    },
}

/// One token of article markup together with the source text it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub raw: String,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span, raw: impl Into<String>) -> Self {
        Node {
            kind,
            span,
            raw: raw.into(),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn divider_class(&self) -> Option<DividerClass> {
        match &self.kind {
            NodeKind::Divider { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn is_divider(&self, class: DividerClass) -> bool {
        self.divider_class() == Some(class)
    }

    /// Whitespace-only text runs carry no content
    pub fn is_blank(&self) -> bool {
        matches!(&self.kind, NodeKind::Text { content } if content.trim().is_empty())
    }

    pub fn shifted(mut self, offset: usize) -> Self {
        self.span = self.span.shifted(offset);
        self
    }

    /// Source text of this node in the string it was tokenized from
    pub fn source<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.start..self.span.end]
    }
}

/// Concatenate the raw source of the nodes in order
pub fn reconstruct(nodes: &[Node]) -> String {
    nodes.iter().map(|node| node.raw.as_str()).collect()
}

/// Last divider of a node list, ignoring trailing blank text
pub fn trailing_divider(nodes: &[Node]) -> Option<DividerClass> {
    nodes
        .iter()
        .rev()
        .find(|node| !node.is_blank())
        .and_then(Node::divider_class)
}

// ========== Blocks ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lemma {
    /// Lemma as written, with `|`, `/`, `~` and optional parts
    pub raw: String,
    /// Dictionary form with markup removed and `~` resolved
    pub lemma: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Headword {
    pub raw_form: String,
    pub lemmas: Vec<Lemma>,
    pub official_mark: Option<OfficialMark>,
    pub homonym: Option<String>,
    /// Stems substituted for `~` in examples and nested headwords
    pub bases: Vec<String>,
    pub children: Vec<Block>,
}

impl Headword {
    pub fn lemma_forms(&self) -> Vec<String> {
        self.lemmas.iter().map(|l| l.lemma.clone()).collect()
    }

    pub fn display_name(&self) -> &str {
        if self.raw_form.is_empty() {
            "<без заголовка>"
        } else {
            &self.raw_form
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranslationBlock {
    pub content: Vec<Node>,
    pub children: Vec<Block>,
    pub sense_number: Option<u32>,
    pub requires_review: bool,
    pub reference_only: bool,
}

impl TranslationBlock {
    pub fn new(content: Vec<Node>) -> Self {
        TranslationBlock {
            content,
            ..Default::default()
        }
    }

    pub fn ends_with_sentence(&self) -> bool {
        trailing_divider(&self.content) == Some(DividerClass::Sentence)
    }

    /// Content carries words or notes, not only markers and punctuation
    pub fn has_translation_text(&self) -> bool {
        self.content.iter().any(|node| match &node.kind {
            NodeKind::Text { content } => content.chars().any(char::is_alphabetic),
            NodeKind::Note { .. } => true,
            _ => false,
        })
    }

    /// No translation text of its own and only references or explanations
    /// below it
    pub fn is_reference_only(&self) -> bool {
        !self.has_translation_text()
            && !self.children.is_empty()
            && self
                .children
                .iter()
                .all(|child| matches!(child, Block::Reference(_) | Block::Explanation(_)))
    }
}

/// True when the nodes contain both `,` and `;` dividers, ignoring a
/// divider that closes the run
pub fn has_mixed_dividers(nodes: &[Node]) -> bool {
    let last = nodes.iter().rposition(|node| !node.is_blank());
    let mut near = false;
    let mut far = false;
    for (index, node) in nodes.iter().enumerate() {
        if Some(index) == last {
            break;
        }
        match node.divider_class() {
            Some(DividerClass::Near) => near = true,
            Some(DividerClass::Far) => far = true,
            _ => {}
        }
    }
    near && far
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IllustrationBlock {
    /// Esperanto part as written (may contain `~`)
    pub source_lemma: String,
    /// Esperanto part with `~` replaced, one entry per lemma/stem pair
    pub source_expanded: Vec<String>,
    /// Russian part
    pub target_segments: Vec<Node>,
    pub requires_review: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExplanationBlock {
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    See,
    Compare,
    Synonym,
    Link,
}

impl ReferenceMode {
    /// Reference mode for a label such as `см.`, `ср` or `=`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().trim_end_matches('.').to_lowercase().as_str() {
            "см" | "see" => Some(ReferenceMode::See),
            "ср" | "compare" => Some(ReferenceMode::Compare),
            "=" => Some(ReferenceMode::Synonym),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBlock {
    pub mode: ReferenceMode,
    pub label: Option<String>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Headword(Headword),
    Translation(TranslationBlock),
    Illustration(IllustrationBlock),
    Explanation(ExplanationBlock),
    Reference(ReferenceBlock),
}

impl Block {
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Headword(h) => &h.children,
            Block::Translation(t) => &t.children,
            _ => &[],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Headword(_) => "headword",
            Block::Translation(_) => "translation",
            Block::Illustration(_) => "illustration",
            Block::Explanation(_) => "explanation",
            Block::Reference(_) => "reference",
        }
    }
}
