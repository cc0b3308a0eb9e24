//! Service Module
//!
//! Business logic between the HTTP handlers and the store/executor/
//! scheduler. Each submodule owns one domain's operations and error type.

pub mod run;
pub mod schedule;
