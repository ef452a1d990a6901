//! # landrail-common
//!
//! Shared error taxonomy, access-right types, policy configuration model,
//! and constants used across the landrail workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and knows nothing about the running kernel.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
