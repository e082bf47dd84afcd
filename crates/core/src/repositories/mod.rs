//! Repository modules.
//!
//! Storage for ward data. Only patient records are stored; everything derived from them
//! (scores, tiers, dashboard counters) is recomputed on read.

pub mod patients;

pub use patients::{InMemoryPatientRepository, PatientRepository};
