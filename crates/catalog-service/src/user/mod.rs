//! Profile management for the authenticated user.

pub mod service;

pub use service::UserService;
