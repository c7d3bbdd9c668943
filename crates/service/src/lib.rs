//! Service layer for the hospital backend.
//! - Staff authentication and stateless session tokens (`auth`).
//! - Patient identity resolution with registry fallback and write-back caching (`patient`).
//! - Flows depend on repository/client traits; SeaORM and in-memory backends plug in behind them.

pub mod auth;
pub mod patient;
#[cfg(all(test, feature = "seaorm"))]
pub mod test_support;

/// Tenant boundary shared by staff and patient records.
pub type HospitalId = i32;
