//! Integration tests for nebula-ruleset.
//!
//! Exercises the public API the way a consumer would: through the prelude,
//! across rule set boundaries.

mod composition;
mod concurrency;
mod error_config;
mod round_trip;
mod scenarios;
mod trail;
