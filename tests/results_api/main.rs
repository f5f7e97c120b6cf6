//! Results API test suite.
//!
//! Exercises the submission endpoints end to end through an in-process actix
//! service backed by the in-memory store.
//!
//! Run with: cargo test --test results_api

mod test_helpers;

mod test_add_result;
mod test_json_results;
mod test_reports;
