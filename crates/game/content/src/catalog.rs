//! In-memory catalog backing the core oracle traits.

use std::collections::HashMap;

use realm_core::{
    ActorId, ActorState, ActorTemplate, BalanceTables, BuffDescriptor, BuffId, CatalogError,
    CatalogOracle, SkillDescriptor, SkillId, SkillSlot, TablesOracle,
};

/// Immutable content loaded once at startup.
///
/// Descriptors are keyed by the stable hash of their catalog name, so state
/// records carry plain ids and resolve back here on every lookup. The catalog
/// is shared read-only across the runtime; it never changes after load.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    skills: HashMap<SkillId, SkillDescriptor>,
    buffs: HashMap<BuffId, BuffDescriptor>,
    templates: HashMap<String, ActorTemplate>,
    tables: BalanceTables,
}

impl StaticCatalog {
    pub fn new(tables: BalanceTables) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    pub fn with_skill(mut self, descriptor: SkillDescriptor) -> Self {
        self.add_skill(descriptor);
        self
    }

    pub fn with_buff(mut self, descriptor: BuffDescriptor) -> Self {
        self.add_buff(descriptor);
        self
    }

    pub fn with_template(mut self, template: ActorTemplate) -> Self {
        self.add_template(template);
        self
    }

    /// Inserts a skill descriptor, replacing any entry with the same name.
    pub fn add_skill(&mut self, descriptor: SkillDescriptor) {
        self.skills.insert(descriptor.id(), descriptor);
    }

    pub fn add_buff(&mut self, descriptor: BuffDescriptor) {
        self.buffs.insert(descriptor.id(), descriptor);
    }

    pub fn add_template(&mut self, template: ActorTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Builds a fresh [`ActorState`] from a named template.
    ///
    /// Every skill name the template lists must resolve to a loaded
    /// descriptor; a dangling name is a configuration error, not a skippable
    /// one, because the actor would silently lose abilities. The returned
    /// actor carries a placeholder id; the world assigns the real one on
    /// spawn.
    pub fn instantiate(&self, template_name: &str) -> Result<ActorState, CatalogError> {
        let template = self.template(template_name)?;
        let mut actor = ActorState::new(ActorId(0), template.kind, template.profile.clone());

        for (skill_name, level) in &template.skills {
            let id = SkillId::from_name(skill_name);
            self.skill(id)?;
            actor
                .skills
                .try_push(SkillSlot::new(id, *level))
                .map_err(|_| CatalogError::TemplateTooLarge(template.name.clone()))?;
        }

        Ok(actor)
    }
}

impl CatalogOracle for StaticCatalog {
    fn skill(&self, id: SkillId) -> Result<&SkillDescriptor, CatalogError> {
        self.skills.get(&id).ok_or(CatalogError::MissingSkill(id.0))
    }

    fn buff(&self, id: BuffId) -> Result<&BuffDescriptor, CatalogError> {
        self.buffs.get(&id).ok_or(CatalogError::MissingBuff(id.0))
    }

    fn template(&self, name: &str) -> Result<&ActorTemplate, CatalogError> {
        self.templates
            .get(name)
            .ok_or_else(|| CatalogError::MissingTemplate(name.to_string()))
    }
}

impl TablesOracle for StaticCatalog {
    fn balance(&self) -> BalanceTables {
        self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::{
        ActorKind, BaseProfile, ScalingCurve, SkillEffect, TargetPolicy, UpgradeRule,
    };

    fn strike() -> SkillDescriptor {
        SkillDescriptor {
            name: "strike".into(),
            effect: SkillEffect::Damage {
                amount: ScalingCurve::flat(5.0),
                stun_chance: 0,
                stun_duration_ms: 0,
            },
            target: TargetPolicy::Enemy,
            cast_time_ms: ScalingCurve::flat(500.0),
            cooldown_ms: ScalingCurve::flat(1_000.0),
            mana_cost: ScalingCurve::flat(0.0),
            range: ScalingCurve::flat(2.0),
            required_weapon: None,
            cancel_on_target_died: false,
            passive_bonuses: Vec::new(),
            upgrade: UpgradeRule::default(),
            max_level: 5,
        }
    }

    fn wolf_template(skills: Vec<(String, u32)>) -> ActorTemplate {
        ActorTemplate {
            name: "wolf".into(),
            kind: ActorKind::Hostile,
            profile: BaseProfile::default(),
            skills,
        }
    }

    #[test]
    fn instantiate_resolves_skill_names() {
        let catalog = StaticCatalog::new(BalanceTables::DEFAULT)
            .with_skill(strike())
            .with_template(wolf_template(vec![("strike".into(), 1)]));

        let actor = catalog.instantiate("wolf").unwrap();
        assert_eq!(actor.kind, ActorKind::Hostile);
        assert_eq!(actor.skills.len(), 1);
        assert_eq!(actor.skills[0].id, SkillId::from_name("strike"));
    }

    #[test]
    fn instantiate_rejects_dangling_skill_name() {
        let catalog = StaticCatalog::new(BalanceTables::DEFAULT)
            .with_template(wolf_template(vec![("deleted_skill".into(), 1)]));

        let err = catalog.instantiate("wolf").unwrap_err();
        assert!(matches!(err, CatalogError::MissingSkill(_)));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let catalog = StaticCatalog::default();
        assert_eq!(
            catalog.instantiate("nobody"),
            Err(CatalogError::MissingTemplate("nobody".into()))
        );
    }
}
