//! PKCS#7 padding as defined in RFC 5652, section 6.3.
//!
//! Padding appends `n` bytes of value `n`, where `n` is the distance to the
//! next multiple of the block size (a full block when the input is already
//! aligned). Unpadding reverses that and is meant to run on freshly
//! decrypted, attacker-influenced data, so the validation is done in
//! constant time with respect to the buffer content.
//!
//! # Security Properties
//!
//! - **Single error**: every malformation yields the same [`BadPadding`]
//! - **Fixed scan**: the validation loop always visits `min(255, len)` bytes
//! - **No content branches**: comparisons go through `subtle` and are folded
//!   into a [`Choice`] that is only inspected once, after the loop
//!
//! The total buffer length is treated as public.
//!
//! # Example
//!
//! ```
//! use pkcs7pad::padding::{pad, unpad};
//!
//! let padded = pad(b"YELLOW SUBMARINE", 20);
//! assert_eq!(padded, b"YELLOW SUBMARINE\x04\x04\x04\x04");
//! assert_eq!(unpad(&padded).unwrap(), b"YELLOW SUBMARINE");
//! ```

use std::fmt::{Display, Formatter};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};
use thiserror::Error;
use tracing::debug;

use crate::config::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MAX_PADDING_SCAN, MIN_BLOCK_SIZE};

/// The padding of a buffer is malformed.
///
/// Deliberately carries nothing about which check rejected the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("bad padding")]
pub struct BadPadding;

/// A block size outside the range a padding byte can express.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("inappropriate block size {0}: must be between {min} and {max}", min = MIN_BLOCK_SIZE, max = MAX_BLOCK_SIZE)]
pub struct InvalidBlockSize(pub usize);

/// A block size in `1..=255`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockSize(u8);

impl BlockSize {
    /// The AES block size.
    pub const AES: Self = Self(16);

    /// Creates a block size.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not in `1..=255`. Block sizes are fixed by the
    /// cipher in use, so an invalid one is a bug in the caller; use
    /// [`BlockSize::try_from`] for values coming from user configuration.
    #[track_caller]
    #[must_use]
    pub fn new(size: usize) -> Self {
        match Self::try_from(size) {
            Ok(block_size) => block_size,
            Err(e) => panic!("pkcs7pad: {e}"),
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Number of filler bytes needed after `len` bytes of data, in `1..=size`.
    #[inline]
    #[must_use]
    pub const fn padding_for(self, len: usize) -> u8 {
        // The remainder is strictly smaller than the block size, which fits in a u8.
        #[allow(clippy::cast_possible_truncation)]
        let rem = (len % self.get()) as u8;
        self.0 - rem
    }

    fn pad_in_place(self, buffer: &mut Vec<u8>) {
        let count = self.padding_for(buffer.len());
        buffer.resize(buffer.len() + usize::from(count), count);
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = InvalidBlockSize;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        match u8::try_from(size) {
            Ok(size) if usize::from(size) >= MIN_BLOCK_SIZE => Ok(Self(size)),
            _ => Err(InvalidBlockSize(size)),
        }
    }
}

impl From<BlockSize> for usize {
    fn from(block_size: BlockSize) -> Self {
        block_size.get()
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl Display for BlockSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Appends PKCS#7 padding to `buffer` so its length becomes a multiple of
/// `block_size`.
///
/// At least one byte is always appended. An input that is already aligned
/// gets a full block of filler.
///
/// # Panics
///
/// Panics if `block_size` is not in `1..=255`.
#[track_caller]
pub fn pad_in_place(buffer: &mut Vec<u8>, block_size: usize) {
    BlockSize::new(block_size).pad_in_place(buffer);
}

/// Returns a copy of `buffer` with PKCS#7 padding appended.
///
/// # Panics
///
/// Panics if `block_size` is not in `1..=255`.
#[track_caller]
#[must_use]
pub fn pad(buffer: &[u8], block_size: usize) -> Vec<u8> {
    let block_size = BlockSize::new(block_size);
    let mut padded = Vec::with_capacity(buffer.len() + usize::from(block_size.padding_for(buffer.len())));
    padded.extend_from_slice(buffer);
    block_size.pad_in_place(&mut padded);
    padded
}

/// Strips PKCS#7 padding, checking it in constant time.
///
/// On success the returned slice borrows from `buffer`; use [`unpad_vec`]
/// when an owned copy is needed.
///
/// Only the length of `buffer` influences control flow. The claimed padding
/// length and the padding bytes are compared with `subtle` primitives and
/// accumulated without early exit, so a rejected buffer takes as long as an
/// accepted one of the same length.
///
/// # Errors
///
/// Returns [`BadPadding`] if the buffer is empty, the last byte is zero or
/// larger than the buffer, or any of the trailing bytes it covers differs
/// from it.
pub fn unpad(buffer: &[u8]) -> Result<&[u8], BadPadding> {
    // An empty buffer is distinguishable by its public length anyway.
    let Some(&pad_value) = buffer.last() else {
        return Err(BadPadding);
    };

    let pad_len = u64::from(pad_value);
    let mut good = Choice::from(1u8);

    // Walk back over the last min(255, len) bytes. Positions past the claimed
    // padding belong to the plaintext: they are still read and compared, but
    // the selection makes them count as satisfied.
    for (i, &b) in (0u64..).zip(buffer.iter().rev().take(MAX_PADDING_SCAN)) {
        let out_of_range = !pad_len.ct_gt(&i);
        let equal = b.ct_eq(&pad_value);
        good &= Choice::from(u8::conditional_select(&equal.unwrap_u8(), &1, out_of_range));
    }

    good &= pad_len.ct_gt(&0);
    good &= !pad_len.ct_gt(&(buffer.len() as u64));

    if !bool::from(good) {
        return Err(BadPadding);
    }

    Ok(&buffer[..buffer.len() - usize::from(pad_value)])
}

/// Owned variant of [`unpad`].
///
/// # Errors
///
/// Returns [`BadPadding`] under the same conditions as [`unpad`].
pub fn unpad_vec(buffer: &[u8]) -> Result<Vec<u8>, BadPadding> {
    unpad(buffer).map(<[u8]>::to_vec)
}

/// PKCS#7 padder bound to the block size of a particular cipher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pkcs7Padding {
    block_size: BlockSize,
}

impl Pkcs7Padding {
    #[must_use]
    pub fn new(block_size: BlockSize) -> Self {
        debug!(block_size = block_size.get(), "pkcs7 padding configured");
        Self { block_size }
    }

    #[inline]
    #[must_use]
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    #[must_use]
    pub fn pad(&self, data: &[u8]) -> Vec<u8> {
        pad(data, self.block_size.get())
    }

    pub fn pad_in_place(&self, data: &mut Vec<u8>) {
        self.block_size.pad_in_place(data);
    }

    /// Strips padding exactly like [`unpad`].
    ///
    /// The length is not required to be a multiple of the block size, so
    /// this accepts the same buffers as the free function.
    ///
    /// # Errors
    ///
    /// Returns [`BadPadding`] on malformed padding.
    pub fn unpad<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], BadPadding> {
        unpad(data)
    }
}


#[cfg(test)]
mod property_tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    /// Straightforward, branching validation used as an oracle.
    fn reference_unpad(buffer: &[u8]) -> Option<&[u8]> {
        let &last = buffer.last()?;
        let count = usize::from(last);
        if count == 0 || count > buffer.len() {
            return None;
        }
        let (body, tail) = buffer.split_at(buffer.len() - count);
        tail.iter().all(|&b| b == last).then_some(body)
    }

    #[test]
    fn unpad_agrees_with_reference_for_every_short_buffer() {
        for len in 0..=300usize {
            for last in 0..=255u8 {
                let mut buffer = vec![last; len];
                assert_matches_reference(&buffer);

                if len >= 2 {
                    buffer[len - 2] = last.wrapping_add(1);
                    assert_matches_reference(&buffer);
                }
            }
        }
    }

    fn assert_matches_reference(buffer: &[u8]) {
        assert_eq!(unpad(buffer).ok(), reference_unpad(buffer), "len {} last {:?}", buffer.len(), buffer.last());
    }

    proptest! {
        #[test]
        fn pad_then_unpad_returns_input(data in vec(any::<u8>(), 0..600), size in 1usize..=255) {
            let padded = pad(&data, size);
            prop_assert_eq!(padded.len() % size, 0);
            prop_assert!(padded.len() > data.len());
            prop_assert!(padded.len() - data.len() <= size);
            prop_assert_eq!(unpad(&padded), Ok(data.as_slice()));
        }

        #[test]
        fn aligned_input_gets_full_block(blocks in 0usize..4, size in 1usize..=255) {
            let data = vec![0x5A; blocks * size];
            let padded = pad(&data, size);
            prop_assert_eq!(padded.len(), data.len() + size);
            prop_assert!(padded[data.len()..].iter().all(|&b| usize::from(b) == size));
        }

        #[test]
        fn unpad_agrees_with_reference_on_noise(buffer in vec(any::<u8>(), 0..400)) {
            prop_assert_eq!(unpad(&buffer).ok(), reference_unpad(&buffer));
        }

        #[test]
        fn unpad_agrees_with_reference_on_corrupted_padding(
            prefix in vec(any::<u8>(), 0..300),
            count in 1u8..=255,
            corrupt in any::<Option<(prop::sample::Index, u8)>>(),
        ) {
            let mut buffer = prefix;
            buffer.extend(std::iter::repeat_n(count, usize::from(count)));
            if let Some((index, value)) = corrupt {
                let at = index.index(buffer.len());
                buffer[at] = value;
            }
            prop_assert_eq!(unpad(&buffer).ok(), reference_unpad(&buffer));
        }
    }
}
