//! Property-based tests for versioned index naming.
//!
//! Migration detection reads versions back out of the concrete index names
//! behind an alias, so the naming helpers must round-trip and must never
//! attribute another index's name to the wrong logical index.
//!
//! Run with: `cargo test --test proptest_naming`

use proptest::prelude::*;

use search_coordinator::index::{highest_version, parse_version, versioned_name};

// =============================================================================
// Strategies
// =============================================================================

/// Logical index names: lowercase, no separators
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
}

/// Time-series style suffixes appended after the version
fn suffix_strategy() -> impl Strategy<Value = String> {
    "-[a-z0-9.]{1,10}"
}

// =============================================================================
// Round trips
// =============================================================================

proptest! {
    #[test]
    fn prop_versioned_name_round_trips(name in name_strategy(), version in any::<u32>()) {
        let concrete = versioned_name(&name, version);
        prop_assert_eq!(parse_version(&name, &concrete), Some(version));
    }

    #[test]
    fn prop_suffix_is_ignored(
        name in name_strategy(),
        version in any::<u32>(),
        suffix in suffix_strategy(),
    ) {
        let concrete = format!("{}{}", versioned_name(&name, version), suffix);
        prop_assert_eq!(parse_version(&name, &concrete), Some(version));
    }

    #[test]
    fn prop_trailing_letters_are_not_a_version(
        name in name_strategy(),
        version in any::<u32>(),
        junk in "[a-z]{1,5}",
    ) {
        let concrete = format!("{}{}", versioned_name(&name, version), junk);
        prop_assert_eq!(parse_version(&name, &concrete), None);
    }

    #[test]
    fn prop_other_names_never_match(
        name in name_strategy(),
        other in name_strategy(),
        version in any::<u32>(),
    ) {
        prop_assume!(name != other);
        prop_assert_eq!(parse_version(&name, &versioned_name(&other, version)), None);
    }
}

// =============================================================================
// Highest version
// =============================================================================

proptest! {
    #[test]
    fn prop_highest_version_is_max(
        name in name_strategy(),
        versions in prop::collection::vec(1u32..10_000, 0..8),
    ) {
        let concrete: Vec<String> = versions.iter().map(|v| versioned_name(&name, *v)).collect();
        let highest = highest_version(&name, concrete.iter().map(String::as_str));
        prop_assert_eq!(highest, versions.iter().copied().max());
    }

    #[test]
    fn prop_foreign_indexes_are_ignored(
        name in name_strategy(),
        version in 1u32..10_000,
        foreign in prop::collection::vec("[a-z]{1,10}-v[0-9]{1,4}", 0..5),
    ) {
        let own = versioned_name(&name, version);
        let mut concrete: Vec<&str> = foreign
            .iter()
            .map(String::as_str)
            .filter(|f| parse_version(&name, f).is_none())
            .collect();
        concrete.push(&own);

        prop_assert_eq!(highest_version(&name, concrete), Some(version));
    }

    /// Parsing arbitrary input never panics
    #[test]
    fn prop_parse_never_panics(name in ".*", concrete in ".*") {
        let _ = parse_version(&name, &concrete);
    }
}
