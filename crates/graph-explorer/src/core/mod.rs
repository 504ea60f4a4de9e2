//! Core graph model: entities, geometry, the store and the layout contract
//!
//! Everything a controller needs to keep a consistent graph and hand it to a
//! layout engine lives here; concrete engines live in [`crate::layout`].

mod error;
mod geometry;
mod layout;
mod listener;
pub mod logging;
mod store;
mod types;

pub use error::*;
pub use geometry::*;
pub use layout::*;
pub use listener::*;
pub use logging::*;
pub use store::*;
pub use types::*;
