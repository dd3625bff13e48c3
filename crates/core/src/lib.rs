//! Core game logic. Keep this crate free of IO and platform concerns.

pub mod ai;
pub mod cards;
pub mod choice;
pub mod config;
pub mod deck;
pub mod events;
pub mod immunity;
pub mod inventory;
pub mod player;
pub mod registry;
pub mod resolve;
pub mod rng;
pub mod run;
pub mod snapshot;
pub mod state;

pub use ai::*;
pub use cards::*;
pub use choice::*;
pub use config::*;
pub use deck::*;
pub use events::*;
pub use immunity::*;
pub use inventory::*;
pub use player::*;
pub use registry::*;
pub use resolve::*;
pub use rng::*;
pub use run::*;
pub use snapshot::*;
pub use state::*;
