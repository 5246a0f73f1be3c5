//! Board-agnostic core logic for the siogauge receiver
//!
//! This crate contains the parts of the firmware that do not depend on a
//! particular chip:
//!
//! - Serial link state machine (arm, complete, re-arm)
//! - The shared "latest byte" value and transfer statistics
//! - Link configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod link;

pub use config::{ConfigError, LinkConfig};
pub use link::{LinkError, LinkState, LinkStats, SerialLink, ValueSource};
