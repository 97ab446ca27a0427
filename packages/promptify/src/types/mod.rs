//! Data types for the prompt controller.

pub mod config;
pub mod item;
pub mod outcome;
pub mod progress;
