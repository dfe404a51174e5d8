//! Global Configuration Constants
//!
//! Fixed parameters shared by the padding routines and the command-line
//! front end. None of these are secret: block sizes are agreed upon by both
//! sides of a cipher, and the scan cap only depends on the width of a byte.

/// Application name used in logs and the CLI banner.
pub const APP_NAME: &str = "pkcs7pad";

// === Block Size Bounds ===
// Every filler byte stores the filler count, so the block size has to fit
// in a single byte and can never be zero.

/// Smallest accepted block size.
pub const MIN_BLOCK_SIZE: usize = 1;

/// Largest accepted block size.
///
/// A padding byte holds values 0 to 255, and PKCS#7 may append a whole block
/// of filler, so 255 is the upper bound.
pub const MAX_BLOCK_SIZE: usize = 255;

/// Block size used when none is given on the command line.
///
/// 16 bytes matches the AES block, by far the most common caller.
pub const DEFAULT_BLOCK_SIZE: usize = 16;

// === Validation ===

/// Number of trailing bytes unpadding inspects at most.
///
/// The claimed padding length is a single byte, so looking further back than
/// 255 bytes cannot change the outcome. The cap is public and does not depend
/// on the buffer content.
pub const MAX_PADDING_SCAN: usize = 255;
