#![warn(clippy::all)]

mod api;
mod client;
pub mod decode;
mod page;

use djsync_util::Console;

pub use client::DomjudgeClient;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
