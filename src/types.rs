//! Common type definitions for pkcs7pad.
//!
//! - [`Operation`]: Distinguishes between padding and unpadding runs of the CLI

use std::fmt::{Display, Formatter, Result};

/// The transformation a CLI invocation applies to its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Append PKCS#7 padding.
    Pad,

    /// Validate and strip PKCS#7 padding.
    Unpad,
}

impl Operation {
    /// Array containing all operations for iteration.
    pub const ALL: &'static [Self] = &[Self::Pad, Self::Unpad];

    /// Returns a human-readable label for the operation.
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Unpad => "unpad",
        }
    }
}

impl Display for Operation {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}
