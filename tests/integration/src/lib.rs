//! Cross-crate scenario tests for the HikePal engine
//!
//! This test suite validates:
//! - The recording lifecycle from start to a stored track
//! - Annotation loading against unreachable and malformed sources
//! - SOS escalation with and without telemetry
//! - The persisted track layout handed to the library

pub mod test_utils;

#[cfg(test)]
mod annotation_tests;

#[cfg(test)]
mod recording_scenario_tests;

#[cfg(test)]
mod safety_tests;
