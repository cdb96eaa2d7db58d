//! Skill catalog loader.

use std::path::Path;

use realm_core::SkillDescriptor;

use crate::loaders::{LoadResult, read_file};

/// Loads the skill catalog from a RON file.
///
/// RON format: `Vec<SkillDescriptor>`. Duplicate names collapse to the last
/// entry when inserted into a catalog; the factory reports them instead.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SkillDescriptor>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse skill catalog {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Vec<SkillDescriptor>, ron::error::SpannedError> {
        ron::from_str(content)
    }
}
