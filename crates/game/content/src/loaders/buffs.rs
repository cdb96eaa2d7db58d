//! Buff catalog loader.

use std::path::Path;

use realm_core::BuffDescriptor;

use crate::loaders::{LoadResult, read_file};

/// Loads the buff catalog from a RON file.
///
/// RON format: `Vec<BuffDescriptor>`.
pub struct BuffLoader;

impl BuffLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<BuffDescriptor>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse buff catalog {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Vec<BuffDescriptor>, ron::error::SpannedError> {
        ron::from_str(content)
    }
}
