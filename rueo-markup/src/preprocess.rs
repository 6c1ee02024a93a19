//! Normalisation of raw dictionary text before tokenizing.
//!
//! Dictionary sources are typed in the x-system (`cx` for `ĉ`), use `<<`/`>>`
//! for guillemets and `--` for a dash, and carry editor comments that are not
//! part of any article.

use regex::Regex;
use std::sync::LazyLock;

/// x-system digraphs and the Esperanto letters they stand for
pub const X_SYSTEM: &[(&str, &str)] = &[
    ("cx", "ĉ"),
    ("gx", "ĝ"),
    ("hx", "ĥ"),
    ("jx", "ĵ"),
    ("sx", "ŝ"),
    ("ux", "ŭ"),
    ("Cx", "Ĉ"),
    ("Gx", "Ĝ"),
    ("Hx", "Ĥ"),
    ("Jx", "Ĵ"),
    ("Sx", "Ŝ"),
    ("Ux", "Ŭ"),
];

static EDITOR_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)!!!.*$").expect("comment regex is valid"));
static HIDDEN_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").expect("hidden block regex is valid"));
static DATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date regex is valid"));

/// Replace x-system digraphs with Esperanto letters
pub fn normalize_x_system(text: &str) -> String {
    let mut result = text.to_string();
    for (digraph, letter) in X_SYSTEM {
        if result.contains(digraph) {
            result = result.replace(digraph, letter);
        }
    }
    result
}

/// Normalise one article or a whole dictionary file.
///
/// Line endings become `\n`, trailing whitespace is trimmed from every line,
/// editor comments and `{{...}}` blocks are removed. Leading indentation is
/// kept since it carries the article structure.
pub fn preprocess(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = normalize_x_system(&text);
    let text = text
        .replace("<<", "«")
        .replace(">>", "»")
        .replace("--", "—");
    let text = EDITOR_COMMENT.replace_all(&text, "");
    let text = HIDDEN_BLOCK.replace_all(&text, "");

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Editorial date stamps (`2021-03-04 ...`) are not article content
pub fn is_date_line(line: &str) -> bool {
    DATE_LINE.is_match(line.trim())
}

/// Split a dictionary file into articles at blank lines.
///
/// `$` metadata lines and blank lines before the first article are skipped.
///
/// # Returns
/// The article texts in file order, without the separating blank lines
pub fn split_articles(content: &str) -> Vec<String> {
    let mut articles = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_preamble = true;

    for line in content.lines() {
        let trimmed = line.trim();
        if in_preamble {
            if trimmed.is_empty() || trimmed.starts_with('$') {
                continue;
            }
            in_preamble = false;
        }

        if trimmed.is_empty() {
            if !current.is_empty() {
                articles.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end_matches('\r'));
        }
    }

    if !current.is_empty() {
        articles.push(current.join("\n"));
    }

    articles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_system() {
        assert_eq!(normalize_x_system("cxevalo"), "ĉevalo");
        assert_eq!(normalize_x_system("Sxipo auxto"), "Ŝipo aŭto");
    }

    #[test]
    fn test_preprocess_replacements() {
        let text = "[abak/o] <<счёты>> -- прибор  \r\nlinio !!! check later\r\n{{hidden}}end";
        assert_eq!(preprocess(text), "[abak/o] «счёты» — прибор\nlinio\nend");
    }

    #[test]
    fn test_preprocess_keeps_indentation() {
        assert_eq!(preprocess("[a]\n\t~o счёт"), "[a]\n\t~o счёт");
    }

    #[test]
    fn test_date_lines() {
        assert!(is_date_line("2021-03-04 правка"));
        assert!(!is_date_line("[abak/o] счёты"));
    }

    #[test]
    fn test_split_articles() {
        let content = "$version 3\n\n[abak/o] счёты\n\t~a\n\n\n[abat/o] аббат\n";
        let articles = split_articles(content);
        assert_eq!(articles, vec!["[abak/o] счёты\n\t~a", "[abat/o] аббат"]);
    }

    #[test]
    fn test_split_articles_empty() {
        assert!(split_articles("$meta\n\n").is_empty());
    }
}
