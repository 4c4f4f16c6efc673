//! Action-name helpers.
//!
//! Blocks are addressed by an upper-cased display name: either `"NAME"` for
//! an uncategorized block or `"CATEGORY.NAME"` when the block lives in a
//! category. Step actions are normalized through these helpers before any
//! registry lookup so matching is case-insensitive.

/// Normalizes an action string for lookup: trimmed and upper-cased.
pub fn normalize_action(action: &str) -> String {
    action.trim().to_ascii_uppercase()
}

/// Splits an action into `(category, name)` on the last dot.
///
/// An action without a dot is treated as an uncategorized block name.
pub fn split_action(action: &str) -> (Option<&str>, &str) {
    match action.rsplit_once('.') {
        Some((category, name)) => (Some(category), name),
        None => (None, action),
    }
}

/// Joins a category and block name back into a display name.
pub fn display_name(category: Option<&str>, name: &str) -> String {
    match category {
        Some(category) => format!("{category}.{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_action("  math.sum "), "MATH.SUM");
        assert_eq!(normalize_action("Echo"), "ECHO");
    }

    #[test]
    fn splits_on_last_dot() {
        assert_eq!(split_action("MATH.SUM"), (Some("MATH"), "SUM"));
        assert_eq!(split_action("ECHO"), (None, "ECHO"));
        assert_eq!(split_action("A.B.C"), (Some("A.B"), "C"));
    }

    #[test]
    fn display_name_round_trips() {
        let (category, name) = split_action("MATH.SUM");
        assert_eq!(display_name(category, name), "MATH.SUM");
        let (category, name) = split_action("ECHO");
        assert_eq!(display_name(category, name), "ECHO");
    }
}
