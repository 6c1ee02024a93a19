//! Read-only lookup tables consulted while parsing.
//!
//! Both tables are built once, before any article is parsed, and then shared
//! by reference. Nothing in the pipeline mutates them.

use crate::text::normalize_key;
use regex::Regex;
use std::collections::HashMap;

/// Abbreviations whose final period must not be read as a sentence end
pub const DEFAULT_ABBREVIATION_PATTERNS: &[&str] = &[
    r"-л\.",
    r"-то\.",
    r"\bт\.е\.",
    r"\bт\.п\.",
    r"\bи т\.д\.",
    r"\bи т\.п\.",
    r"\bи др\.",
    r"\bср\.",
    r"\bсм\.",
];

/// Letters that form one-letter abbreviations (`т.`, `п.`, `д.` ...)
pub const DEFAULT_SINGLE_LETTERS: &str = "тпдср";

/// Field and register labels known out of the box, with their display form
pub const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("мед", "мед."),
    ("цер", "церк."),
    ("воен", "воен."),
    ("ист", "ист."),
    ("фин", "фин."),
    ("псих", "псих."),
    ("архит", "архит."),
    ("анат", "анат."),
    ("энт", "энт."),
    ("зоол", "зоол."),
    ("ихт", "ихт."),
    ("уст", "уст."),
    ("гп", "гп."),
    ("мат", "мат."),
    ("прям", "прям."),
    ("перен", "перен."),
    ("букв", "букв."),
    ("устар", "устар."),
    ("разг", "разг."),
    ("поэт", "поэт."),
];

/// Register labels that describe usage rather than a subject field
pub const STYLISTIC_LABELS: &[&str] = &["прям", "перен", "букв", "устар", "разг", "поэт"];

#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    patterns: Vec<String>,
    matcher: Regex,
    single_letters: Vec<char>,
}

impl AbbreviationTable {
    /// Build a table from regex fragments; fragments are matched case-insensitively
    pub fn new(patterns: Vec<String>, single_letters: &str) -> Result<Self, String> {
        let matcher = compile_patterns(&patterns)?;
        Ok(AbbreviationTable {
            patterns,
            matcher,
            single_letters: single_letters.chars().collect(),
        })
    }

    pub fn builtin() -> Self {
        let patterns: Vec<String> = DEFAULT_ABBREVIATION_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        let matcher = compile_patterns(&patterns).expect("built-in abbreviation patterns are valid");
        AbbreviationTable {
            patterns,
            matcher,
            single_letters: DEFAULT_SINGLE_LETTERS.chars().collect(),
        }
    }

    /// Add more patterns, keeping the existing ones
    pub fn extend(&mut self, patterns: impl IntoIterator<Item = String>) -> Result<(), String> {
        let mut all = self.patterns.clone();
        for pattern in patterns {
            if !all.contains(&pattern) {
                all.push(pattern);
            }
        }
        self.matcher = compile_patterns(&all)?;
        self.patterns = all;
        Ok(())
    }

    pub fn set_single_letters(&mut self, letters: &str) {
        self.single_letters = letters.chars().collect();
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Decide whether the period at `chars[position]` belongs to an abbreviation.
    ///
    /// # Arguments
    ///
    /// * `chars` - the text being scanned, as characters
    /// * `position` - index of the `.` in `chars`
    pub fn is_abbreviation_period(&self, chars: &[char], position: usize) -> bool {
        if position == 0 || position >= chars.len() {
            return false;
        }

        let start = position.saturating_sub(5);
        let end = (position + 3).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        if self.matcher.is_match(&window) {
            return true;
        }

        if position >= 2 && chars[position - 2] == '-' && chars[position - 1] == 'л' {
            return true;
        }
        if position >= 3
            && chars[position - 3] == '-'
            && chars[position - 2] == 'т'
            && chars[position - 1] == 'о'
        {
            return true;
        }

        let before = chars[position - 1];
        if self.single_letters.contains(&before)
            && (position == 1 || chars[position - 2].is_whitespace())
        {
            return true;
        }

        match chars.get(position + 1) {
            Some(next) => next.is_lowercase() && !next.is_whitespace(),
            None => false,
        }
    }

    /// True when the text ends in a period that belongs to an abbreviation
    pub fn ends_with_abbreviation(&self, text: &str) -> bool {
        let chars: Vec<char> = text.trim_end().chars().collect();
        match chars.last() {
            Some('.') => self.is_abbreviation_period(&chars, chars.len() - 1),
            _ => false,
        }
    }
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        AbbreviationTable::builtin()
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Regex, String> {
    if patterns.is_empty() {
        // Matches nothing
        return Regex::new(r"\b\B").map_err(|e| e.to_string());
    }
    let joined = format!("(?i)(?:{})", patterns.join("|"));
    Regex::new(&joined).map_err(|e| format!("Invalid abbreviation pattern: {}", e))
}

/// Canonical display forms of field and register labels
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    entries: HashMap<String, String>,
}

impl LabelRegistry {
    pub fn empty() -> Self {
        LabelRegistry {
            entries: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = LabelRegistry::empty();
        for (key, display) in BUILTIN_LABELS {
            registry.insert(key, display);
        }
        registry
    }

    pub fn insert(&mut self, label: &str, display: &str) -> &mut Self {
        let key = normalize_key(label);
        if !key.is_empty() {
            self.entries.insert(key, display.trim().to_string());
        }
        self
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(&normalize_key(label))
    }

    /// Display form of a label, or `None` for labels the registry does not know
    pub fn canonical(&self, label: &str) -> Option<&str> {
        self.entries.get(&normalize_key(label)).map(String::as_str)
    }

    /// Display form of a label, falling back to the label as written
    pub fn display(&self, label: &str) -> String {
        self.canonical(label)
            .map(str::to_string)
            .unwrap_or_else(|| label.trim().to_string())
    }

    pub fn is_stylistic(&self, label: &str) -> bool {
        STYLISTIC_LABELS.contains(&normalize_key(label).as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        LabelRegistry::builtin()
    }
}

/// Everything the parser and the review engine read but never change
#[derive(Debug, Clone)]
pub struct MarkupConfig {
    pub abbreviations: AbbreviationTable,
    pub labels: LabelRegistry,
    /// Spaces that make one indentation level when a line is not tab-indented
    pub indent_width: usize,
}

impl MarkupConfig {
    pub fn new(abbreviations: AbbreviationTable, labels: LabelRegistry) -> Self {
        MarkupConfig {
            abbreviations,
            labels,
            indent_width: 4,
        }
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        MarkupConfig::new(AbbreviationTable::builtin(), LabelRegistry::builtin())
    }
}
