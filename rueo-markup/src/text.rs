//! Small string helpers shared by the tokenizer, the classifier and the
//! review engine.
//!
//! Dictionary text mixes Cyrillic, Latin (with Esperanto diacritics) and a
//! handful of markup characters. The helpers here answer the questions the
//! pipeline keeps asking about a run of text: does it carry a stress mark,
//! which script is it in, how should whitespace be normalised.

use regex::Regex;
use std::sync::LazyLock;

/// Stress marks used in the Russian part of articles
pub const STRESS_MARKS: [char; 3] = ['`', '´', '\''];

static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Collapse runs of whitespace, glue `,` and `.` to the preceding word and
/// trim spaces, `;` and `,` from both ends.
///
/// ```ignore
/// assert_eq!(clean_spacing("  аб`ак ,  счёты ;"), "аб`ак, счёты");
/// ```
pub fn clean_spacing(value: &str) -> String {
    let collapsed = SPACES.replace_all(value, " ");
    let glued = collapsed.replace(" ,", ",").replace(" .", ".");
    glued
        .trim_matches(|c: char| c == ' ' || c == ';' || c == ',')
        .to_string()
}

/// Remove stress marks, keeping everything else
pub fn strip_stress(text: &str) -> String {
    text.chars().filter(|c| !STRESS_MARKS.contains(c)).collect()
}

pub fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

/// Latin letters including the Esperanto and other Latin-1/Extended-A forms
pub fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c)
}

pub fn contains_cyrillic(text: &str) -> bool {
    text.chars().any(is_cyrillic)
}

pub fn contains_latin(text: &str) -> bool {
    text.chars().any(is_latin)
}

pub fn has_letters(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Lowercase and drop stress marks, dots and whitespace. Used as the lookup
/// key for labels and shortenings.
pub fn normalize_key(text: &str) -> String {
    text.trim()
        .trim_matches('.')
        .chars()
        .filter(|c| !STRESS_MARKS.contains(c) && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Drop repeated strings, keeping the first occurrence of each
pub fn unique_in_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Check that every `(` has a matching `)` and no `)` appears unopened
pub fn parens_balanced(text: &str) -> bool {
    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Drop parenthesis characters that have no partner, keeping balanced pairs
pub fn balance_parens(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut keep = vec![true; chars.len()];
    let mut open: Vec<usize> = Vec::new();
    for (i, c) in chars.iter().enumerate() {
        match c {
            '(' => open.push(i),
            ')' => {
                if open.pop().is_none() {
                    keep[i] = false;
                }
            }
            _ => {}
        }
    }
    for i in open {
        keep[i] = false;
    }
    chars
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}

/// Byte index of the `)` matching the `(` at `start`, if any
pub fn find_matching_paren(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}
