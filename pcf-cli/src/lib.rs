//! Library half of the `pcf-wizard` binary, split out so the run logic and
//! config parsing are testable.

pub mod app;
pub mod config;
