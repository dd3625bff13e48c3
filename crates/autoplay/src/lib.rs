//! Headless all-computer games over the core engine, for balance checks.

mod config;
mod error;
mod simulator;
mod trace;

pub use config::*;
pub use error::*;
pub use simulator::*;
pub use trace::*;
