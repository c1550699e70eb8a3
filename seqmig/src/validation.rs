//! Whole-batch validation run before any migration executes.
//!
//! Rules are checked in a fixed order and the first violated rule aborts:
//! single namespace, name convention, consecutive numbering, then presence of
//! every already-executed number in the registered batch.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::MigrationError;
use crate::migration::{MigrationDescriptor, migration_number};

static VALID_MIGRATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Migration[1-9][0-9]*$").expect("migration name pattern is valid"));

/// A descriptor whose name passed validation, paired with its number.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedMigration {
    pub number: u32,
    pub descriptor: MigrationDescriptor,
}

/// Run every rule against the batch and return it sorted by number.
pub fn validate_batch(
    migrations: &[MigrationDescriptor],
    executed: &[u32],
) -> Result<Vec<ValidatedMigration>, MigrationError> {
    validate_single_namespace(migrations)?;
    let mut validated = validate_names(migrations)?;
    validated.sort_by_key(|m| m.number);

    let numbers: Vec<u32> = validated.iter().map(|m| m.number).collect();
    validate_consecutive(&numbers)?;
    validate_executed_present(executed, &numbers)?;

    Ok(validated)
}

pub fn validate_single_namespace(migrations: &[MigrationDescriptor]) -> Result<(), MigrationError> {
    let namespaces: BTreeSet<&str> = migrations.iter().map(|m| m.namespace).collect();
    if namespaces.len() > 1 {
        return Err(MigrationError::NamespaceConflict {
            namespaces: namespaces.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(())
}

/// Check the `MigrationN` convention, reporting every offender at once.
pub fn validate_names(migrations: &[MigrationDescriptor]) -> Result<Vec<ValidatedMigration>, MigrationError> {
    let mut validated = Vec::with_capacity(migrations.len());
    let mut invalid = Vec::new();

    for descriptor in migrations {
        let number = VALID_MIGRATION_NAME
            .is_match(descriptor.name)
            .then(|| migration_number(descriptor.name))
            .flatten();
        match number {
            Some(number) => validated.push(ValidatedMigration {
                number,
                descriptor: *descriptor,
            }),
            None => invalid.push(descriptor.name.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(MigrationError::InvalidNames { names: invalid });
    }
    Ok(validated)
}

/// The sorted numbers must equal `min..=max` exactly. Duplicates break the
/// `+1` step between neighbours and are rejected along with gaps.
pub fn validate_consecutive(numbers: &[u32]) -> Result<(), MigrationError> {
    let mut found = numbers.to_vec();
    found.sort_unstable();

    let (Some(&min), Some(&max)) = (found.first(), found.last()) else {
        return Ok(());
    };

    if found.windows(2).all(|pair| pair[0].checked_add(1) == Some(pair[1])) {
        return Ok(());
    }
    Err(MigrationError::NonConsecutive {
        found,
        expected: min..=max,
    })
}

/// Every number in the execution log must still be registered.
pub fn validate_executed_present(executed: &[u32], registered: &[u32]) -> Result<(), MigrationError> {
    let registered: HashSet<u32> = registered.iter().copied().collect();
    let missing: BTreeSet<u32> = executed
        .iter()
        .copied()
        .filter(|number| !registered.contains(number))
        .collect();

    if !missing.is_empty() {
        return Err(MigrationError::MissingExecuted {
            numbers: missing.into_iter().collect(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::content::MigrationContext;
    use crate::migration::Migration;

    struct Noop;

    #[async_trait]
    impl Migration for Noop {
        async fn execute(&self, _ctx: &mut MigrationContext<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn noop() -> Box<dyn Migration> {
        Box::new(Noop)
    }

    fn batch(namespace: &'static str, names: &[&'static str]) -> Vec<MigrationDescriptor> {
        names
            .iter()
            .map(|name| MigrationDescriptor::new(name, namespace, noop))
            .collect()
    }

    #[test]
    fn accepts_consecutive_single_namespace_batch() {
        let migrations = batch("app::migrations", &["Migration3", "Migration1", "Migration2"]);
        let validated = validate_batch(&migrations, &[1, 2]).unwrap();
        let numbers: Vec<u32> = validated.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(validated[0].descriptor.name, "Migration1");
    }

    #[test]
    fn accepts_range_not_starting_at_one() {
        let migrations = batch("app", &["Migration4", "Migration5"]);
        assert!(validate_batch(&migrations, &[]).is_ok());
    }

    #[test]
    fn empty_batch_with_empty_log_is_valid() {
        assert!(validate_batch(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn empty_batch_with_history_reports_missing() {
        let err = validate_batch(&[], &[1, 2]).unwrap_err();
        assert!(matches!(err, MigrationError::MissingExecuted { numbers } if numbers == vec![1, 2]));
    }

    #[test]
    fn two_namespaces_fail_before_anything_else() {
        let mut migrations = batch("app::a", &["Migration1", "Oops"]);
        migrations.extend(batch("app::b", &["Migration7"]));
        let err = validate_batch(&migrations, &[42]).unwrap_err();
        match err {
            MigrationError::NamespaceConflict { namespaces } => {
                assert_eq!(namespaces, vec!["app::a".to_string(), "app::b".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_all_invalid_names_together() {
        let migrations = batch(
            "app",
            &["Migration1", "Migration02", "AddUsers", "Migration", "DataMigration3"],
        );
        let err = validate_names(&migrations).unwrap_err();
        match err {
            MigrationError::InvalidNames { names } => {
                assert_eq!(names, vec!["Migration02", "AddUsers", "Migration", "DataMigration3"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn gap_reports_found_and_full_expected_range() {
        let migrations = batch("app", &["Migration1", "Migration3"]);
        let err = validate_batch(&migrations, &[]).unwrap_err();
        match err {
            MigrationError::NonConsecutive { found, expected } => {
                assert_eq!(found, vec![1, 3]);
                assert_eq!(expected, 1..=3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn expected_range_includes_the_largest_number() {
        assert!(validate_consecutive(&[7, 8, 9]).is_ok());
        assert!(validate_consecutive(&[1]).is_ok());
    }

    #[test]
    fn duplicate_numbers_are_rejected() {
        let err = validate_consecutive(&[1, 2, 2, 4]).unwrap_err();
        match err {
            MigrationError::NonConsecutive { found, expected } => {
                assert_eq!(found, vec![1, 2, 2, 4]);
                assert_eq!(expected, 1..=4);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(validate_consecutive(&[1, 2, 2]).is_err());
    }

    #[test]
    fn huge_gap_is_reported_without_expanding_the_range() {
        let err = validate_consecutive(&[1, 4_000_000_000]).unwrap_err();
        match &err {
            MigrationError::NonConsecutive { found, expected } => {
                assert_eq!(found, &vec![1, 4_000_000_000]);
                assert_eq!(expected, &(1..=4_000_000_000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().ends_with("Expected: 1..=4000000000"));
    }

    #[test]
    fn numbers_at_the_top_of_the_range() {
        assert!(validate_consecutive(&[u32::MAX - 1, u32::MAX]).is_ok());
        assert!(validate_consecutive(&[u32::MAX, u32::MAX]).is_err());
        assert!(validate_consecutive(&[1, u32::MAX]).is_err());

        let name = format!("Migration{}", u32::MAX);
        let migrations = vec![
            MigrationDescriptor::new("Migration1", "app", noop),
            MigrationDescriptor::new(Box::leak(name.into_boxed_str()), "app", noop),
        ];
        let err = validate_batch(&migrations, &[]).unwrap_err();
        assert!(matches!(err, MigrationError::NonConsecutive { ref expected, .. } if *expected.end() == u32::MAX));
    }

    #[test]
    fn executed_number_missing_from_batch_is_named() {
        let migrations = batch("app", &["Migration1", "Migration2", "Migration3", "Migration4"]);
        let err = validate_batch(&migrations, &[1, 2, 5]).unwrap_err();
        assert!(matches!(err, MigrationError::MissingExecuted { ref numbers } if numbers == &vec![5]));
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn name_check_runs_before_numbering_check() {
        let migrations = batch("app", &["Migration1", "Migration5", "Bad"]);
        let err = validate_batch(&migrations, &[]).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidNames { .. }));
    }
}
