//! Authentication primitives.
//!
//! Tokens are issued by the identity service; this crate only validates
//! them. [`jwt::generate_access_token`] exists for tooling and tests.

pub mod jwt;
