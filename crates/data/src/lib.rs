//! Data loading and validation for game rules.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
