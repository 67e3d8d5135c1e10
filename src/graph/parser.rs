//! Relationship reference parsing (regex-based).

use regex::Regex;
use std::sync::OnceLock;

/// A free-text reference to a relative: a name plus optional lineage qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRef {
    pub name: String,
    pub lineage: Option<String>,
}

fn lineage_regex() -> &'static Regex {
    static LINEAGE: OnceLock<Regex> = OnceLock::new();
    // Matches: "<name> [<lineage>]" with the bracket group at the very end
    LINEAGE.get_or_init(|| {
        Regex::new(r"^(?P<name>.*?)\s*\[(?P<lineage>[^\[\]]*)\]$").expect("Invalid regex pattern")
    })
}

/// Parse `"Name"` or `"Name [Lineage]"`.
///
/// Returns `None` for empty or whitespace-only input. Never fails: text that
/// does not fit the bracket shape comes back whole as the name.
pub fn parse_relationship_ref(text: &str) -> Option<RelationshipRef> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(cap) = lineage_regex().captures(trimmed) {
        let name = cap.name("name").map(|m| m.as_str().trim()).unwrap_or("");
        let lineage = cap.name("lineage").map(|m| m.as_str().trim()).unwrap_or("");
        if !name.is_empty() {
            return Some(RelationshipRef {
                name: name.to_string(),
                lineage: (!lineage.is_empty()).then(|| lineage.to_string()),
            });
        }
    }

    Some(RelationshipRef {
        name: trimmed.to_string(),
        lineage: None,
    })
}
