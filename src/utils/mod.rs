//! Common utilities shared across the core

pub mod time;

pub use time::{MockTimeProvider, SystemTimeProvider, TimeProvider};
