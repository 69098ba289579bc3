//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - Expiry sweeper: removes idle entries from an auto-expiry cache

mod sweeper;

pub use sweeper::{Sweepable, SweeperHandle};
