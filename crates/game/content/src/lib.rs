//! Data-driven content catalogs and loaders.
//!
//! This crate houses the immutable half of the simulation: skill and buff
//! descriptors, actor spawn templates and the balance tables, all loadable
//! from RON data files. Content is consumed through the oracle traits in
//! `realm-core` and never appears in game state.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::StaticCatalog;

#[cfg(feature = "loaders")]
pub use loaders::{BuffLoader, ContentFactory, SkillLoader, TablesLoader, TemplateLoader};
