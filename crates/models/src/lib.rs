//! SeaORM entities and persistence helpers for staff accounts and cached
//! patient identities.

pub mod errors;
pub mod db;
pub mod staff;
pub mod patient;

#[cfg(test)]
mod tests;
