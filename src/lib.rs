// lib.rs - Library exports for the API binary and integration tests

pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod models;
pub mod web;

pub use error::{CoreError, CoreResult};
