//! The migration unit capability and its registration descriptor.
//!
//! A migration is a plain type named `MigrationN` that implements [`Migration`].
//! Registration happens either through `#[derive(Migration)]`, which submits a
//! [`MigrationDescriptor`] to the link-time inventory, or by listing
//! descriptors explicitly with [`MigrationDescriptor::of`].

use async_trait::async_trait;

use crate::content::MigrationContext;

/// Prefix every migration type name must start with.
pub const MIGRATION_NAME_PREFIX: &str = "Migration";

/// A single, numbered unit of change.
///
/// `execute` runs at most once per target store. Anything it mutates is
/// reached through the [`MigrationContext`]; the runner records the migration
/// as applied only after `execute` returns `Ok`.
#[async_trait]
pub trait Migration: Send + Sync {
    async fn execute(&self, ctx: &mut MigrationContext<'_>) -> anyhow::Result<()>;
}

/// Factory producing a fresh migration instance for a run.
pub type MigrationFactory = fn() -> Box<dyn Migration>;

/// Static description of a registered migration type.
#[derive(Debug, Clone, Copy)]
pub struct MigrationDescriptor {
    /// Type name, e.g. `Migration3`.
    pub name: &'static str,
    /// Module path the type is declared in.
    pub namespace: &'static str,
    factory: MigrationFactory,
}

inventory::collect!(MigrationDescriptor);

impl MigrationDescriptor {
    pub const fn new(name: &'static str, namespace: &'static str, factory: MigrationFactory) -> Self {
        Self {
            name,
            namespace,
            factory,
        }
    }

    /// Describe `T` using its Rust type path: the last segment becomes the
    /// name and the rest the namespace.
    pub fn of<T>() -> Self
    where
        T: Migration + Default + 'static,
    {
        let (namespace, name) = split_type_path(std::any::type_name::<T>());
        Self::new(name, namespace, instantiate_default::<T>)
    }

    /// Number embedded in the name, if the name follows the convention.
    pub fn number(&self) -> Option<u32> {
        migration_number(self.name)
    }

    /// Construct a fresh instance.
    pub fn instantiate(&self) -> Box<dyn Migration> {
        (self.factory)()
    }
}

/// Extract `N` from a `MigrationN` name.
///
/// Returns `None` when the prefix is missing, the digits are empty, start with
/// `0`, contain anything else, or overflow `u32`.
pub fn migration_number(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(MIGRATION_NAME_PREFIX)?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn instantiate_default<T>() -> Box<dyn Migration>
where
    T: Migration + Default + 'static,
{
    Box::new(T::default())
}

fn split_type_path(path: &'static str) -> (&'static str, &'static str) {
    match path.rsplit_once("::") {
        Some((namespace, name)) => (namespace, name),
        None => ("", path),
    }
}
