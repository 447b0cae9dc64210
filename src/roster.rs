//! Rendering of the protection roster into the single channel message.

pub const ROSTER_HEADER: &str = "🛡️ **Current Raid Protection List** (for today) 🛡️";
pub const EMPTY_ROSTER: &str = "No players are protected today.";

/// One protected player as shown on the roster.
pub struct RosterEntry {
    pub character_name: String,
    pub display_name: String,
}

pub fn render(entries: &[RosterEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_ROSTER.to_string();
    }

    let mut lines = vec![ROSTER_HEADER.to_string(), String::new()];
    for entry in entries {
        lines.push(format!(
            "**{}** ({})",
            entry.character_name, entry.display_name
        ));
    }
    lines.join("\n")
}

/// Case-insensitive substring match of a player name against rendered
/// roster text.
pub fn contains_name(content: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    content.to_lowercase().contains(&name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(character: &str, display: &str) -> RosterEntry {
        RosterEntry {
            character_name: character.to_string(),
            display_name: display.to_string(),
        }
    }

    #[test]
    fn test_render_lists_protected_and_skips_others() {
        let rendered = render(&[entry("Alpha", "AlphaNick")]);
        assert!(rendered.contains("Alpha"));
        assert!(rendered.contains("AlphaNick"));
        assert!(rendered.starts_with(ROSTER_HEADER));
        assert!(!rendered.contains("Bravo"));
    }

    #[test]
    fn test_render_empty_roster_placeholder() {
        assert_eq!(render(&[]), EMPTY_ROSTER);
    }

    #[test]
    fn test_contains_name_is_case_insensitive() {
        let rendered = render(&[entry("Foo", "FooNick")]);
        assert!(contains_name(&rendered, "foo"));
        assert!(contains_name(&rendered, "FOO"));
        assert!(!contains_name(&rendered, "bar"));
    }

    #[test]
    fn test_contains_name_rejects_empty_needle() {
        assert!(!contains_name("anything", ""));
    }
}
