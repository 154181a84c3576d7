/// Parsing of items files and of the answers typed during a battle.
use crate::bail;

/// What the user answered to a presented pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    First,
    Second,
    Quit,
    Invalid,
}

/// Parse one answer line. Accepts `1`/`2`, `l`/`r`, `left`/`right` and
/// `q`/`quit`, case-insensitive.
pub fn parse_choice(line: &str) -> Choice {
    match line.trim().to_ascii_lowercase().as_str() {
        "1" | "l" | "left" => Choice::First,
        "2" | "r" | "right" => Choice::Second,
        "q" | "quit" | "exit" => Choice::Quit,
        _ => Choice::Invalid,
    }
}

/// Parse a string as either a JSON array of strings or plain text (one item per line).
pub fn parse_items_from_str(content: &str) -> Vec<String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        let items: Vec<String> = serde_json::from_str(trimmed)
            .unwrap_or_else(|e| bail(format!("File looks like JSON but failed to parse: {e}")));
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        trimmed
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Find the first repeated item, if any.
pub fn first_duplicate(items: &[String]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    items.iter().find(|item| !seen.insert(item.as_str())).map(String::as_str)
}
