//! # TaskTrack Server Library
//!
//! Dependency wiring and startup utilities for the TaskTrack server.

pub mod di;
pub mod startup;
