// src/lib.rs
pub mod banner;
pub mod client;
pub mod config;
pub mod contract;
pub mod errors;
pub mod fixtures;
pub mod harness;
pub mod mock;
