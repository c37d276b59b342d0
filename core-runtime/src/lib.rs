//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the playback orchestration core:
//! - Logging and tracing setup
//! - Event broadcasting primitives
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the player crate depends on. It
//! establishes the logging conventions and the event broadcasting mechanism
//! used throughout the system; it knows nothing about playback itself.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
