//! Deterministic round-state machine for a single human against scripted bots.
//!
//! One seed drives every random decision. Given the same catalog, config, and
//! human inputs, a game replays to a byte-identical event log.

pub mod actions;
pub mod catalog;
pub mod elimination;
pub mod error;
pub mod game;
pub mod rng;
pub mod roster;
pub mod scenario;
pub mod state;
pub mod suspicion;
pub mod voting;

pub use actions::{ActionAllocator, ActionLibrary, AllocatedAction, STUB_ACTION_ID};
pub use catalog::Catalog;
pub use elimination::EliminationResolver;
pub use error::{CatalogError, GameError};
pub use game::Game;
pub use rng::{GameRng, mulberry32_step, weighted_index};
pub use roster::{
    clamp_traitor_count, split_is_decided, RosterBuilder, MIN_ROSTER_SIZE, ROSTER_SIZE,
};
pub use scenario::{Judgement, ScenarioEngine};
pub use state::{GameState, Player, HISTORY_WINDOW};
pub use suspicion::SuspicionModel;
pub use voting::VotePlanner;
