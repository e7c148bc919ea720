//! Infrastructure layer: storage backends and configuration.

pub mod config;
pub mod storage;

#[cfg(test)]
mod integration_tests;
