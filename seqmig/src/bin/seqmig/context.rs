use anyhow::{Context, Result};
use seqmig::SeqmigConfig;
use std::path::{Path, PathBuf};

/// Project context for seqmig operations
pub struct ProjectContext {
    /// Root directory of the project (where Cargo.toml is)
    pub project_root: PathBuf,
    /// Path to .seqmig directory
    pub seqmig_dir: PathBuf,
    /// Path to config file
    pub config_path: PathBuf,
    /// Loaded configuration (defaults when the file is absent)
    pub config: SeqmigConfig,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start)?;
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let seqmig_dir = project_root.join(".seqmig");
        let config_path = seqmig_dir.join("config.toml");

        let config = SeqmigConfig::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        Ok(Self {
            project_root,
            seqmig_dir,
            config_path,
            config,
        })
    }

    /// Find project root by looking for Cargo.toml
    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let cargo_toml = current.join("Cargo.toml");
            if cargo_toml.exists() {
                return Ok(current);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find Cargo.toml in {start:?} or any parent directory. \
                     Are you in a Rust project?"
                );
            }
        }
    }

    /// Check if seqmig is initialized in this project
    pub fn is_initialized(&self) -> bool {
        self.seqmig_dir.exists() && self.config_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        let nested = temp_dir.path().join("src").join("migrations");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = ProjectContext::find_from(&nested).unwrap();

        assert_eq!(ctx.project_root, temp_dir.path());
        assert!(!ctx.is_initialized());
        assert_eq!(ctx.config.migrations.store_name, "seqmig:executed");
    }

    #[test]
    fn test_loads_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let seqmig_dir = temp_dir.path().join(".seqmig");
        std::fs::create_dir_all(&seqmig_dir).unwrap();
        std::fs::write(
            seqmig_dir.join("config.toml"),
            "[migrations]\nstore_name = \"app:migrations\"\n",
        )
        .unwrap();

        let ctx = ProjectContext::from_root(temp_dir.path().to_path_buf()).unwrap();

        assert!(ctx.is_initialized());
        assert_eq!(ctx.config.migrations.store_name, "app:migrations");
    }
}
