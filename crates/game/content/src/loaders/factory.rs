//! Content factory assembling a data directory into a catalog.

use std::path::{Path, PathBuf};

use crate::StaticCatalog;
use crate::loaders::{BuffLoader, LoadResult, SkillLoader, TablesLoader, TemplateLoader};

/// Loads all game content from a single data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── tables.ron
/// ├── skills.ron
/// ├── buffs.ron
/// └── templates.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads every data file and assembles the catalog.
    ///
    /// Duplicate catalog names are rejected: two skills hashing to the same
    /// id would make persisted records ambiguous.
    pub fn load_catalog(&self) -> LoadResult<StaticCatalog> {
        let tables = TablesLoader::load(&self.data_dir.join("tables.ron"))?;
        let mut catalog = StaticCatalog::new(tables);

        for skill in SkillLoader::load(&self.data_dir.join("skills.ron"))? {
            let before = catalog.skill_count();
            let name = skill.name.clone();
            catalog.add_skill(skill);
            if catalog.skill_count() == before {
                anyhow::bail!("duplicate skill name '{name}' in skill catalog");
            }
        }
        for buff in BuffLoader::load(&self.data_dir.join("buffs.ron"))? {
            catalog.add_buff(buff);
        }
        for template in TemplateLoader::load(&self.data_dir.join("templates.ron"))? {
            catalog.add_template(template);
        }

        Ok(catalog)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_remembers_its_data_dir() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_directory_reports_the_path() {
        let factory = ContentFactory::new("/nonexistent/data");
        let err = factory.load_catalog().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data"));
    }
}
