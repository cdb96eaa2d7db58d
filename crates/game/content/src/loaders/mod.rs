//! Content loaders for reading game data from RON files.
//!
//! Each loader converts one data file into core descriptor types; the
//! [`ContentFactory`] assembles a whole data directory into a
//! [`crate::StaticCatalog`].

pub mod buffs;
pub mod factory;
pub mod skills;
pub mod tables;
pub mod templates;

pub use buffs::BuffLoader;
pub use factory::ContentFactory;
pub use skills::SkillLoader;
pub use tables::TablesLoader;
pub use templates::TemplateLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read file {}: {}", path.display(), e))
}
