#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from spermai for tests
pub use spermai::{
    Aggregation, AppConfig, Error, Event, Outcome, PatientRecord, Session, SpermClass,
    ValidationWarning,
};
