//! Pickroute CLI library.
//!
//! This crate provides command-line interface utilities for the pick-tour
//! planner, including terminal styling and output formatting.

pub mod output;
pub mod terminal;
