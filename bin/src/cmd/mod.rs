//! CLI subcommand modules.
//!
//! This module contains the implementations for all cadiz CLI subcommands.

pub(crate) mod config;
pub(crate) mod factors;
pub(crate) mod rebalance;
pub(crate) mod score;
