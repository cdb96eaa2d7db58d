//! Minimal end-to-end run: build a catalog, start the runtime, fire one
//! skill at a practice dummy and print the resulting events.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p realm-runtime --example bootstrap
//! ```

use std::sync::Arc;
use std::time::Duration;

use realm_content::StaticCatalog;
use realm_core::{
    ActorKind, ActorTemplate, BalanceTables, BaseProfile, Position, ScalingCurve, SkillDescriptor,
    SkillEffect, TargetPolicy, UpgradeRule,
};
use realm_runtime::{ClientCommand, Runtime, Topic};

fn catalog() -> StaticCatalog {
    let firebolt = SkillDescriptor {
        name: "firebolt".to_string(),
        effect: SkillEffect::Damage {
            amount: ScalingCurve::flat(35.0),
            stun_chance: 0,
            stun_duration_ms: 0,
        },
        target: TargetPolicy::Enemy,
        cast_time_ms: ScalingCurve::flat(800.0),
        cooldown_ms: ScalingCurve::flat(1_500.0),
        mana_cost: ScalingCurve::flat(8.0),
        range: ScalingCurve::flat(25.0),
        required_weapon: None,
        cancel_on_target_died: false,
        passive_bonuses: Vec::new(),
        upgrade: UpgradeRule::default(),
        max_level: 5,
    };

    let mage = ActorTemplate {
        name: "mage".to_string(),
        kind: ActorKind::Player,
        profile: BaseProfile {
            max_health: ScalingCurve::flat(80.0),
            max_mana: ScalingCurve::flat(60.0),
            speed: ScalingCurve::flat(4.0),
            ..BaseProfile::default()
        },
        skills: vec![("firebolt".to_string(), 1)],
    };

    let dummy = ActorTemplate {
        name: "dummy".to_string(),
        kind: ActorKind::Hostile,
        profile: BaseProfile {
            max_health: ScalingCurve::flat(30.0),
            ..BaseProfile::default()
        },
        skills: Vec::new(),
    };

    StaticCatalog::new(BalanceTables::DEFAULT)
        .with_skill(firebolt)
        .with_template(mage)
        .with_template(dummy)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let runtime = Runtime::builder()
        .catalog(Arc::new(catalog()))
        .seed(42)
        .build()?;
    let handle = runtime.handle();

    let mage = handle.spawn("mage", Position::ORIGIN).await?;
    let dummy = handle.spawn("dummy", Position::new(6.0, 0.0, 0.0)).await?;

    let mut combat = handle.subscribe(Topic::Combat);
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);

    handle
        .apply(
            mage,
            ClientCommand::UseSkill {
                slot: 0,
                target: Some(dummy),
            },
        )
        .await?;

    // Watch the cast resolve and the dummy keel over.
    let watch = async {
        loop {
            tokio::select! {
                Ok(event) = combat.recv() => println!("combat:    {event:?}"),
                Ok(event) = lifecycle.recv() => println!("lifecycle: {event:?}"),
            }
        }
    };
    let _ = tokio::time::timeout(Duration::from_secs(3), watch).await;

    let snapshot = handle.snapshot().await?;
    for actor in &snapshot.actors {
        println!(
            "{:?} {:?} hp {}/{} at {:?}",
            actor.id, actor.state, actor.health, actor.max_health, actor.position
        );
    }

    runtime.shutdown().await?;
    Ok(())
}
