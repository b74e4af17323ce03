#![warn(clippy::all)]

#[macro_use]
extern crate strum;

pub mod abs_path;
pub mod console;
pub mod decide;
pub mod error;
mod macros;
pub mod model;
pub mod service;

pub use console::{Console, ConsoleConfig};
pub use error::SyncError;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
