//! Gene target reports built from Pharos, Open Targets and AlphaFold DB.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod genes;
pub mod logging;
pub mod report;
