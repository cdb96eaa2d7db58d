//! Balance tables loader.

use std::path::Path;

use realm_core::BalanceTables;

use crate::loaders::{LoadResult, read_file};

/// Loads the balance tables from a RON file.
///
/// RON format: a single `BalanceTables` struct. Every field must be present;
/// a missing knob silently inheriting a default is exactly the kind of
/// configuration drift this loader exists to catch.
pub struct TablesLoader;

impl TablesLoader {
    pub fn load(path: &Path) -> LoadResult<BalanceTables> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| {
            anyhow::anyhow!("failed to parse balance tables {}: {}", path.display(), e)
        })
    }

    pub fn parse(content: &str) -> Result<BalanceTables, ron::error::SpannedError> {
        ron::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_tables() {
        let tables = TablesLoader::parse(
            r#"(
                damage_floor: 1,
                crit_multiplier: 2,
                kill_xp_base: 20,
                kill_gold_base: 5,
                reward_level_clamp: 20,
                reward_step: 0.1,
                group_bonus_per_member: 0.1,
                group_sharing_enabled: true,
                xp_base: 1.5,
                xp_multiplier: 100.0,
                max_level: 60,
                respawn_health_fraction: 0.5,
                respawn_delay_ms: 5000,
                recovery_interval_ms: 3000,
                recovery_percent: 5,
                disengage_after_ms: 8000,
            )"#,
        )
        .unwrap();

        assert_eq!(tables, BalanceTables::DEFAULT);
    }

    #[test]
    fn missing_field_is_an_error() {
        assert!(TablesLoader::parse("(damage_floor: 1)").is_err());
    }
}
