//! Harvest - tax-loss harvesting planner
//!
//! This library reads a brokerage "unrealized gains/losses" export and
//! works out which positions to sell to harvest losses without turning the
//! realized result into a gain.

pub mod cli;
pub mod config;
pub mod error;
pub mod exporters;
pub mod importers;
pub mod planner;
pub mod utils;
