//! Read-only catalog contracts: immutable descriptors keyed by stable ids.

use super::error::CatalogError;
use crate::skill::{SkillDescriptor, SkillId};
use crate::state::{ActorKind, BuffId};
use crate::stats::{BaseProfile, BonusCurve};

/// Immutable catalog data for one buff kind.
///
/// The stat contribution scales with the buff instance's level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffDescriptor {
    pub name: String,
    pub bonuses: Vec<BonusCurve>,
}

impl BuffDescriptor {
    pub fn id(&self) -> BuffId {
        BuffId::from_name(&self.name)
    }
}

/// Spawn template for an actor kind: everything an [`crate::state::ActorState`]
/// needs except id and position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorTemplate {
    pub name: String,
    pub kind: ActorKind,
    pub profile: BaseProfile,
    /// Skill names and starting levels (0 = present but unlearned).
    pub skills: Vec<(String, u32)>,
}

/// Read-only lookup from stable identifiers to immutable descriptors.
///
/// Lookup failure is a configuration error (removed content), reported rather
/// than silently defaulted; callers decide whether to abort or skip.
pub trait CatalogOracle: Send + Sync {
    fn skill(&self, id: SkillId) -> Result<&SkillDescriptor, CatalogError>;
    fn buff(&self, id: BuffId) -> Result<&BuffDescriptor, CatalogError>;
    fn template(&self, name: &str) -> Result<&ActorTemplate, CatalogError>;
}
