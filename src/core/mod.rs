//! Core translation engine module

pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod language;
pub mod models;
pub mod stats;
