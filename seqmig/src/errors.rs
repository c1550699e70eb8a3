use std::borrow::Cow;
use std::ops::RangeInclusive;

use thiserror::Error;

/// Top-level error type returned by the migration runner and its stores.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Registered migrations live in more than one namespace.
    #[error(
        "migrations found in multiple namespaces; all types implementing Migration must reside in the same namespace"
    )]
    NamespaceConflict { namespaces: Vec<String> },

    /// One or more migration names do not follow the `MigrationN` convention.
    #[error(
        "migration(s) with invalid name found: {}. Migrations should be named MigrationX where X is a number which doesn't start with 0",
        .names.join(", ")
    )]
    InvalidNames { names: Vec<String> },

    /// Migration numbers contain a gap or a duplicate.
    #[error(
        "all migrations must be numbered in a consecutive order. Found: {} Expected: {}",
        join_numbers(.found),
        describe_range(.expected)
    )]
    NonConsecutive {
        found: Vec<u32>,
        expected: RangeInclusive<u32>,
    },

    /// The execution log references migrations that are not registered in this build.
    #[error(
        "unable to find one or more executed migrations among the registered migrations. \
         This may be caused by someone else using the same store having created a migration; \
         try getting the latest source code. The migrations are: {}. \
         Although not advisable, you can also disable migrations in configuration",
        join_numbers(.numbers)
    )]
    MissingExecuted { numbers: Vec<u32> },

    /// A migration body returned an error. Earlier migrations stay recorded.
    #[error("migration {number} ({name}) failed: {source}")]
    ExecutionFailed {
        number: u32,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A log entry or document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl MigrationError {
    /// True for the errors raised by batch validation, before anything executes.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NamespaceConflict { .. }
                | Self::InvalidNames { .. }
                | Self::NonConsecutive { .. }
                | Self::MissingExecuted { .. }
        )
    }
}

/// Longest expected range spelled out number by number in messages.
const MAX_LISTED_RANGE: u32 = 32;

fn join_numbers(numbers: &[u32]) -> String {
    numbers.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

fn describe_range(range: &RangeInclusive<u32>) -> String {
    if range.end().saturating_sub(*range.start()) < MAX_LISTED_RANGE {
        range.clone().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
    } else {
        format!("{}..={}", range.start(), range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_consecutive_lists_both_sequences() {
        let err = MigrationError::NonConsecutive {
            found: vec![1, 3],
            expected: 1..=3,
        };
        let message = err.to_string();
        assert!(message.contains("Found: 1, 3"));
        assert!(message.contains("Expected: 1, 2, 3"));
    }

    #[test]
    fn wide_expected_range_is_summarised() {
        let err = MigrationError::NonConsecutive {
            found: vec![1, 4_000_000_000],
            expected: 1..=4_000_000_000,
        };
        assert_eq!(
            err.to_string(),
            "all migrations must be numbered in a consecutive order. Found: 1, 4000000000 Expected: 1..=4000000000"
        );
    }

    #[test]
    fn invalid_names_lists_every_offender() {
        let err = MigrationError::InvalidNames {
            names: vec!["Migration0".into(), "AddUsers".into()],
        };
        assert!(err.to_string().contains("Migration0, AddUsers"));
    }

    #[test]
    fn missing_executed_names_numbers() {
        let err = MigrationError::MissingExecuted { numbers: vec![5, 7] };
        assert!(err.to_string().contains("The migrations are: 5, 7."));
        assert!(err.is_validation());
    }

    #[test]
    fn execution_failure_is_not_a_validation_error() {
        let err = MigrationError::ExecutionFailed {
            number: 3,
            name: "Migration3".into(),
            source: anyhow::anyhow!("boom"),
        };
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "migration 3 (Migration3) failed: boom");
    }
}
