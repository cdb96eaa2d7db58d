//! Traits describing read-only world data.
//!
//! Oracles expose the skill/buff catalog, balance tables and the
//! deterministic RNG. The [`Env`] aggregate bundles them so operations can
//! access everything they need without hard coupling to concrete
//! implementations.

mod catalog;
mod error;
mod rng;
mod tables;

pub use catalog::{ActorTemplate, BuffDescriptor, CatalogOracle};
pub use error::CatalogError;
pub use rng::{FixedRoll, PcgRng, RngOracle, compute_seed, roll};
pub use tables::{BalanceTables, TablesOracle};

/// Bundles the read-only oracles required by the cast protocol, combat
/// resolver and reward balancer.
#[derive(Clone, Copy)]
pub struct Env<'a, C, T, R>
where
    C: CatalogOracle + ?Sized,
    T: TablesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub catalog: &'a C,
    pub tables: &'a T,
    pub rng: &'a R,
}

pub type GameEnv<'a> =
    Env<'a, dyn CatalogOracle + 'a, dyn TablesOracle + 'a, dyn RngOracle + 'a>;

impl<'a, C, T, R> Env<'a, C, T, R>
where
    C: CatalogOracle + ?Sized,
    T: TablesOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(catalog: &'a C, tables: &'a T, rng: &'a R) -> Self {
        Self {
            catalog,
            tables,
            rng,
        }
    }
}

impl<'a, C, T, R> Env<'a, C, T, R>
where
    C: CatalogOracle + 'a,
    T: TablesOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based [`GameEnv`].
    pub fn as_game_env(&self) -> GameEnv<'a> {
        Env::new(
            self.catalog as &dyn CatalogOracle,
            self.tables as &dyn TablesOracle,
            self.rng as &dyn RngOracle,
        )
    }
}
