// ABOUTME: Security primitives for LaundryLens
// ABOUTME: Encrypts OAuth provider tokens before they are written to the database

pub mod encryption;

pub use encryption::{EncryptionError, TokenCipher};
