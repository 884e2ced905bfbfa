//! build-herald library crate.
//!
//! Decides, for each unit of work in a build pipeline, whether a notification
//! fires, composes the human-readable status text, and delivers it to the
//! configured recipients over the messaging HTTP API.

pub mod build;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod notification;

pub use error::{Error, Result};
