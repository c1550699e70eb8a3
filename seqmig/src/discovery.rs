//! Sources of migration descriptors.

use crate::migration::MigrationDescriptor;

/// Supplies the batch of migrations for a run.
pub trait MigrationProvider: Send + Sync {
    fn migrations(&self) -> Vec<MigrationDescriptor>;
}

/// Every migration registered through `#[derive(Migration)]` and linked into
/// the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisteredMigrations;

impl MigrationProvider for RegisteredMigrations {
    fn migrations(&self) -> Vec<MigrationDescriptor> {
        registered_migrations().copied().collect()
    }
}

/// Iterate over the link-time registry.
pub fn registered_migrations() -> impl Iterator<Item = &'static MigrationDescriptor> {
    inventory::iter::<MigrationDescriptor>()
}

/// An explicit list of descriptors.
#[derive(Debug, Clone, Default)]
pub struct StaticMigrations {
    descriptors: Vec<MigrationDescriptor>,
}

impl StaticMigrations {
    pub fn new(descriptors: impl IntoIterator<Item = MigrationDescriptor>) -> Self {
        Self {
            descriptors: descriptors.into_iter().collect(),
        }
    }

    pub fn with(mut self, descriptor: MigrationDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

impl MigrationProvider for StaticMigrations {
    fn migrations(&self) -> Vec<MigrationDescriptor> {
        self.descriptors.clone()
    }
}

impl MigrationProvider for Vec<MigrationDescriptor> {
    fn migrations(&self) -> Vec<MigrationDescriptor> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_migrations_iterator() {
        // The library itself registers nothing
        assert_eq!(RegisteredMigrations.migrations().len(), 0);
    }

    #[test]
    fn static_provider_keeps_insertion_order() {
        use crate::content::MigrationContext;
        use crate::migration::Migration;

        struct Noop;

        #[async_trait::async_trait]
        impl Migration for Noop {
            async fn execute(&self, _ctx: &mut MigrationContext<'_>) -> anyhow::Result<()> {
                Ok(())
            }
        }

        fn noop() -> Box<dyn Migration> {
            Box::new(Noop)
        }

        let provider = StaticMigrations::default()
            .with(MigrationDescriptor::new("Migration2", "app", noop))
            .with(MigrationDescriptor::new("Migration1", "app", noop));

        let names: Vec<&str> = provider.migrations().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Migration2", "Migration1"]);
    }
}
