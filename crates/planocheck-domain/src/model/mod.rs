//! Domain model types

pub mod audit;
pub mod store;

pub use audit::Audit;
pub use store::{NewStore, Store};
