//! Actor template loader.

use std::path::Path;

use realm_core::ActorTemplate;

use crate::loaders::{LoadResult, read_file};

/// Loads actor spawn templates from a RON file.
///
/// RON format: `Vec<ActorTemplate>`. Skill references are by catalog name and
/// are only resolved against the skill catalog when an actor is instantiated.
pub struct TemplateLoader;

impl TemplateLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ActorTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| {
            anyhow::anyhow!("failed to parse actor templates {}: {}", path.display(), e)
        })
    }

    pub fn parse(content: &str) -> Result<Vec<ActorTemplate>, ron::error::SpannedError> {
        ron::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::ActorKind;

    #[test]
    fn parses_a_hostile_template() {
        let templates = TemplateLoader::parse(
            r#"[
                (
                    name: "wolf",
                    kind: Hostile,
                    profile: (
                        max_health: (base: 40.0, per_level: 8.0),
                        max_mana: (base: 0.0, per_level: 0.0),
                        damage: (base: 4.0, per_level: 1.0),
                        defense: (base: 1.0, per_level: 0.5),
                        block_chance: (base: 0.0, per_level: 0.0),
                        crit_chance: (base: 5.0, per_level: 0.0),
                        speed: (base: 5.0, per_level: 0.0),
                    ),
                    skills: [("bite", 1)],
                ),
            ]"#,
        )
        .unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].kind, ActorKind::Hostile);
        assert_eq!(templates[0].skills, vec![("bite".to_string(), 1)]);
    }
}
