//! Entity naming and ordinal recovery.
//!
//! Every generated entity is addressed by a dense integer ordinal
//! that is never stored anywhere except in the entity's own name
//! (`prefix + index`, e.g. `realm-7`). These helpers build such names
//! and recover the ordinal back out of them.
//!
//! Recovery matters because store-native listing order is not the
//! index order: `role-10` sorts lexicographically before `role-2`.
//! Pools handed to the assignment allocator are therefore re-sorted
//! by the parsed ordinal, never by name.

/// Build the name of the entity at `index`.
pub fn indexed_name(prefix: &str, index: u64) -> String {
    format!("{prefix}{index}")
}

/// Recover the ordinal from a name generated with `prefix`.
///
/// Returns `None` when the name does not start with the prefix or the
/// remainder is not a plain decimal number, so this doubles as the
/// prefix filter for pool re-synchronization.
pub fn indexed_by_prefix(name: &str, prefix: &str) -> Option<u64> {
    let suffix = name.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Recover the trailing decimal suffix of a name, whatever its prefix.
///
/// Used for client roles, whose names are namespaced by their owning
/// client (`client-0-client-role-3`).
pub fn trailing_index(name: &str) -> Option<u64> {
    let digits_start = name
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|p| p + 1)
        .unwrap_or(0);
    let digits = &name[digits_start..];
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Keep only the entities whose name encodes an ordinal under
/// `prefix`, sorted ascending by that ordinal.
pub fn filter_sort_indexed<T>(items: Vec<T>, prefix: &str, name_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut keyed: Vec<(u64, T)> = items
        .into_iter()
        .filter_map(|item| indexed_by_prefix(name_of(&item), prefix).map(|idx| (idx, item)))
        .collect();
    keyed.sort_by_key(|(idx, _)| *idx);
    keyed.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_name_roundtrip() {
        assert_eq!(indexed_name("realm-", 7), "realm-7");
        assert_eq!(indexed_by_prefix("realm-7", "realm-"), Some(7));
        assert_eq!(indexed_by_prefix("realm-007", "realm-"), Some(7));
    }

    #[test]
    fn test_indexed_by_prefix_rejects_foreign_names() {
        assert_eq!(indexed_by_prefix("other-7", "realm-"), None);
        assert_eq!(indexed_by_prefix("realm-", "realm-"), None);
        assert_eq!(indexed_by_prefix("realm-7x", "realm-"), None);
        // A realm role must not match the client role filter.
        assert_eq!(indexed_by_prefix("role-3", "client-role-"), None);
    }

    #[test]
    fn test_trailing_index() {
        assert_eq!(trailing_index("client-0-client-role-3"), Some(3));
        assert_eq!(trailing_index("user-42"), Some(42));
        assert_eq!(trailing_index("no-digits"), None);
        assert_eq!(trailing_index("123"), Some(123));
    }

    #[test]
    fn test_numeric_sort_beats_lexicographic() {
        let names = vec![
            "role-10".to_string(),
            "role-2".to_string(),
            "role-0".to_string(),
            "stray".to_string(),
            "role-1".to_string(),
        ];
        let sorted = filter_sort_indexed(names, "role-", |n| n.as_str());
        assert_eq!(sorted, vec!["role-0", "role-1", "role-2", "role-10"]);
    }

    #[test]
    fn test_filter_sort_is_idempotent() {
        let names: Vec<String> = vec!["g-3", "g-11", "g-1", "g-2"]
            .into_iter()
            .map(String::from)
            .collect();
        let once = filter_sort_indexed(names, "g-", |n| n.as_str());
        let twice = filter_sort_indexed(once.clone(), "g-", |n| n.as_str());
        assert_eq!(once, twice);
    }
}
