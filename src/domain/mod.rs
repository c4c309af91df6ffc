//! Core domain types and logic.

pub mod series;
pub mod selector;
pub mod engine;
pub mod algorithm;
pub mod portfolio;
pub mod backtest;
pub mod universe;
pub mod config_validation;
pub mod error;
