// ABOUTME: Library root for dockhand - multi-engine container inventory.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod normalize;
pub mod translate;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use inventory::{ContainerFilter, Inventory};
