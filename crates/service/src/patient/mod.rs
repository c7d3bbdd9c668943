//! Patient identity resolution.
//!
//! A search classifies the raw identifier, consults the local store for the
//! caller's hospital and, on a miss, falls back to the external registry. A
//! registry hit is written back to the local store on a best-effort basis so
//! the next search for the same identifier is served locally.

pub mod domain;
pub mod errors;
pub mod identifier;
pub mod registry;
pub mod repo;
pub mod repository;
pub mod service;

pub use identifier::{IdentifierKind, PatientIdentifier};
pub use service::PatientService;
