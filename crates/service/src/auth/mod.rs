//! Staff authentication.
//!
//! Registration stores an argon2 hash per (hospital, username); login checks
//! it and hands out a bearer token from [`SessionManager`]. Persistence goes
//! through [`repository::StaffRepository`].

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;
pub mod session;

pub use service::AuthService;
pub use session::SessionManager;
