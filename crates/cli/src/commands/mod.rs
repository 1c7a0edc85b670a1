//! CLI command implementations

pub mod config;
pub mod doctor;
pub mod fixture;
pub mod label;
pub mod run;
