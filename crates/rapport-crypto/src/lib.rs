//! Rapport credential primitives.
//!
//! - `password`: Argon2id hashing and verification of account passwords.
//! - `token`: HS256 session tokens carrying the user id, valid for one day.

pub mod password;
pub mod token;

pub use token::{TokenError, TokenIssuer};
