use crate::config::{LabelRegistry, MarkupConfig};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load parser configuration from a JSON file
///
/// The JSON file should have the following structure:
/// ```json
/// {
///     "@metadata": { ... },  // Ignored
///     "abbreviations": {
///         "patterns": ["\\bгг\\."],
///         "single_letters": "тпдср"
///     },
///     "labels": { "жарг": "жарг." },
///     "indent_width": 4
/// }
/// ```
///
/// Every section is optional; values extend the built-in tables.
///
/// # Arguments
/// * `path` - Path to the JSON file
///
/// # Errors
/// - File not found
/// - Invalid JSON
/// - Invalid abbreviation pattern
pub fn load_config_from_file(path: &Path) -> Result<MarkupConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file '{}': {}", path.display(), e))?;

    config_from_json(&content, &path.display().to_string())
}

/// Build a configuration from JSON text; `origin` names the source in errors
pub fn config_from_json(content: &str, origin: &str) -> Result<MarkupConfig, String> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| format!("Failed to parse JSON from '{}': {}", origin, e))?;

    let obj = json
        .as_object()
        .ok_or_else(|| format!("Invalid JSON in '{}': root must be an object", origin))?;

    let mut config = MarkupConfig::default();
    for (key, value) in obj {
        if key.starts_with('@') {
            continue;
        }

        match key.as_str() {
            "abbreviations" => {
                if let Some(patterns) = value.get("patterns").and_then(Value::as_array) {
                    let patterns: Vec<String> = patterns
                        .iter()
                        .filter_map(|p| p.as_str().map(str::to_string))
                        .collect();
                    config
                        .abbreviations
                        .extend(patterns)
                        .map_err(|e| format!("{} in '{}'", e, origin))?;
                }
                if let Some(letters) = value.get("single_letters").and_then(Value::as_str) {
                    config.abbreviations.set_single_letters(letters);
                }
            }
            "labels" => {
                let labels = value.as_object().ok_or_else(|| {
                    format!("Invalid JSON in '{}': 'labels' must be an object", origin)
                })?;
                for (label, display) in labels {
                    match display.as_str() {
                        Some(display) => {
                            config.labels.insert(label, display);
                        }
                        None => {
                            tracing::warn!(label = %label, "label display form is not a string, skipping")
                        }
                    }
                }
            }
            "indent_width" => {
                let width = value.as_u64().ok_or_else(|| {
                    format!(
                        "Invalid JSON in '{}': 'indent_width' must be a number",
                        origin
                    )
                })?;
                config = config.with_indent_width(width as usize);
            }
            other => {
                tracing::warn!(key = other, "unknown configuration key, skipping");
            }
        }
    }

    Ok(config)
}

/// Load a shortenings list into a label registry
///
/// Each non-comment line has the form `сокр. - расшифровка`. The shortening
/// becomes a known label whose display form is the shortening as written.
///
/// # Returns
/// The number of shortenings added
pub fn load_shortenings_from_file(path: &Path, labels: &mut LabelRegistry) -> Result<usize, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file '{}': {}", path.display(), e))?;

    let shortenings = parse_shortenings(&content);
    for (short, _) in &shortenings {
        labels.insert(short, short);
    }
    Ok(shortenings.len())
}

/// Parse `сокр. - расшифровка` lines, skipping blanks and `#` comments
pub fn parse_shortenings(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(" - "))
        .map(|(short, full)| (short.trim().to_string(), full.trim().to_string()))
        .filter(|(short, _)| !short.is_empty())
        .collect()
}
