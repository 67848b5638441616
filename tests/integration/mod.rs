//! Integration tests for worker_team
//!
//! The `pool` and `dispatcher` suites drive the public library API; the
//! `cli` suite runs the compiled binary with a tiny job unit so it finishes
//! quickly.

mod helpers;

mod cli;
mod dispatcher;
mod pool;
