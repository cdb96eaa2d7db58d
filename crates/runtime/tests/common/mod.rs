//! Shared content fixture for runtime integration tests.

use realm_content::StaticCatalog;
use realm_core::{
    ActorKind, ActorTemplate, BalanceTables, BaseProfile, BuffDescriptor, ItemId, ScalingCurve,
    SkillDescriptor, SkillEffect, TargetPolicy, UpgradeRule,
};

fn skill(name: &str, effect: SkillEffect, target: TargetPolicy) -> SkillDescriptor {
    SkillDescriptor {
        name: name.to_string(),
        effect,
        target,
        cast_time_ms: ScalingCurve::flat(1_000.0),
        cooldown_ms: ScalingCurve::flat(2_000.0),
        mana_cost: ScalingCurve::flat(10.0),
        range: ScalingCurve::flat(20.0),
        required_weapon: None,
        cancel_on_target_died: false,
        passive_bonuses: Vec::new(),
        upgrade: UpgradeRule::default(),
        max_level: 5,
    }
}

pub fn catalog() -> StaticCatalog {
    let bolt = skill(
        "bolt",
        SkillEffect::Damage {
            amount: ScalingCurve::flat(15.0),
            stun_chance: 0,
            stun_duration_ms: 0,
        },
        TargetPolicy::Enemy,
    );

    let mut mend = skill(
        "mend",
        SkillEffect::Heal {
            amount: ScalingCurve::flat(30.0),
        },
        TargetPolicy::Ally,
    );
    mend.cast_time_ms = ScalingCurve::flat(2_000.0);
    mend.mana_cost = ScalingCurve::flat(20.0);
    mend.cancel_on_target_died = true;

    let mut smelt = skill(
        "smelt",
        SkillEffect::Craft {
            output: ItemId::from_name("iron_bar"),
            skill_xp: 25,
        },
        TargetPolicy::SelfOnly,
    );
    smelt.cast_time_ms = ScalingCurve::flat(1_500.0);
    smelt.mana_cost = ScalingCurve::flat(0.0);

    let hero = ActorTemplate {
        name: "hero".to_string(),
        kind: ActorKind::Player,
        profile: BaseProfile {
            max_health: ScalingCurve::flat(100.0),
            max_mana: ScalingCurve::flat(50.0),
            speed: ScalingCurve::flat(4.0),
            ..BaseProfile::default()
        },
        skills: vec![
            ("bolt".to_string(), 1),
            ("mend".to_string(), 1),
            ("smelt".to_string(), 1),
        ],
    };

    let wolf = ActorTemplate {
        name: "wolf".to_string(),
        kind: ActorKind::Hostile,
        profile: BaseProfile {
            max_health: ScalingCurve::flat(15.0),
            ..BaseProfile::default()
        },
        skills: Vec::new(),
    };

    StaticCatalog::new(BalanceTables::DEFAULT)
        .with_skill(bolt)
        .with_skill(mend)
        .with_skill(smelt)
        .with_buff(BuffDescriptor {
            name: "war_cry".to_string(),
            bonuses: Vec::new(),
        })
        .with_template(hero)
        .with_template(wolf)
}
