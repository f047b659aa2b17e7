//! Arbor Core - Domain contract and common types
//!
//! This crate provides the traits a sequential decision process must
//! implement to be searched by the arbor engine, along with the error
//! taxonomy the engine reports.
//!
//! # Types
//!
//! - [`Domain`] - Pure transition model (actions, transitions, terminal values)
//! - [`State`] - Observable terminal flag and acting agent of a state
//! - [`SearchError`] - Named failures surfaced to callers

mod domain;
mod error;

pub use domain::{Domain, State};
pub use error::{Result, SearchError};
