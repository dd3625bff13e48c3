//! Room lobby: a small expiring record store plus the slot-selection flow
//! that decides who sits at the table before a game starts.

pub mod clock;
pub mod error;
pub mod record;
pub mod session;
pub mod store;

pub use clock::*;
pub use error::*;
pub use record::*;
pub use session::*;
pub use store::*;
