//! Versioned index naming.
//!
//! A logical index `orders` at schema version 3 lives in the concrete index
//! `orders-v3`, and the alias `orders` points at it. Time-series indexes may
//! append a further `-` suffix (`orders-v3-2024.01`), which is ignored when
//! reading the version back.

/// Separator between the logical name and the version number
pub const VERSION_SEPARATOR: &str = "-v";

/// Build the concrete index name for `name` at `version`.
#[must_use]
pub fn versioned_name(name: &str, version: u32) -> String {
    format!("{}{}{}", name, VERSION_SEPARATOR, version)
}

/// Extract the schema version from a concrete index name belonging to `name`.
///
/// Returns `None` when `concrete` doesn't belong to `name` or carries no version.
#[must_use]
pub fn parse_version(name: &str, concrete: &str) -> Option<u32> {
    let rest = concrete.strip_prefix(name)?.strip_prefix(VERSION_SEPARATOR)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    if digits_end == 0 {
        return None;
    }
    // Anything after the version must be a suffix, not a longer name ("orders-v2x")
    if digits_end < rest.len() && !rest[digits_end..].starts_with('-') {
        return None;
    }

    rest[..digits_end].parse().ok()
}

/// Highest version among `concrete` names that belong to `name`.
pub fn highest_version<'a, I>(name: &str, concrete: I) -> Option<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    concrete
        .into_iter()
        .filter_map(|c| parse_version(name, c))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_name() {
        assert_eq!(versioned_name("orders", 1), "orders-v1");
        assert_eq!(versioned_name("orders", 12), "orders-v12");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("orders", "orders-v1"), Some(1));
        assert_eq!(parse_version("orders", "orders-v12"), Some(12));
        assert_eq!(parse_version("orders", "orders-v3-2024.01"), Some(3));
    }

    #[test]
    fn test_parse_version_rejects_foreign_names() {
        assert_eq!(parse_version("orders", "users-v1"), None);
        assert_eq!(parse_version("orders", "orders"), None);
        assert_eq!(parse_version("orders", "orders-v"), None);
        assert_eq!(parse_version("orders", "orders-vx"), None);
        assert_eq!(parse_version("orders", "orders-v2x"), None);
        // "order" is a prefix of "orders" but not its logical name
        assert_eq!(parse_version("order", "orders-v1"), None);
    }

    #[test]
    fn test_highest_version() {
        let names = ["orders-v1", "orders-v3", "orders-v2", "users-v9"];
        assert_eq!(highest_version("orders", names), Some(3));
        assert_eq!(highest_version("comments", names), None);
    }
}
