//! pkcs7pad - PKCS#7 padding with constant-time validation.
//!
//! Implements the padding scheme of RFC 5652, section 6.3, for use around a
//! block cipher:
//! - [`pad`] before encryption, always appending 1 to `block_size` bytes
//! - [`unpad`] after decryption, rejecting malformed padding with a single
//!   [`BadPadding`] error and without content-dependent timing
//!
//! The `file` and `types` modules back the `pkcs7pad` command-line tool.

pub mod config;
pub mod file;
pub mod padding;
pub mod types;

pub use padding::{BadPadding, BlockSize, InvalidBlockSize, Pkcs7Padding, pad, pad_in_place, unpad, unpad_vec};
