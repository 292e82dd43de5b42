//! # bytecrunch
//!
//! Optimal LZ77-style compression and canonical Huffman coding for small
//! binary blobs (tens of kilobytes, typical of retro-computing assets).
//!
//! * `bits` — LSB-first bitstream reader/writer with Elias-gamma and hybrid codes.
//! * `refs` — two-byte-key index over the source plus the back-reference enumeration.
//! * `lz` — the optimal parser and its bitstream serialiser/deserialiser.
//! * `huffman` — canonical Huffman tree builder, length limiter, codec.
//! * `lzhuff` — the combined LZ+Huffman mode, sharing one canonical alphabet
//!   between literals and a reference marker symbol.
//!
//! ## Buffer Example
//!
//! ```
//! use bytecrunch::lz;
//! let test_data = b"the cat sat on the mat singinginging";
//! let compressed = lz::compress(test_data).expect("compression failed");
//! let expanded = lz::expand(&compressed).expect("expansion failed");
//! assert_eq!(test_data.to_vec(), expanded);
//! ```

pub mod bits;
pub mod token;
pub mod refs;
pub mod lz;
pub mod huffman;
pub mod lzhuff;

pub type DYNERR = Box<dyn std::error::Error>;

/// Recoverable errors at the core boundary. Everything here can be handled by
/// the caller; programmer-error invariants (a reference with
/// `length_minus_one == 0`, say) use `debug_assert!`/`assert!` instead, since
/// they indicate a bug in this crate rather than bad input.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("input must be at least 2 bytes")]
    InputTooSmall,
    #[error("compressed input ended before the expected data")]
    Truncated,
    #[error("compressed input contains an out-of-range encoded value")]
    MalformedValue,
    #[error("round-trip verification of compressed output failed")]
    VerificationFailed,
}

/// Options controlling compression, following the call-site pattern: callers
/// pick a length limit for the standalone Huffman mode and can request an
/// immediate round-trip check.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// maximum canonical code length for standalone Huffman coding (0 = no limit)
    pub max_code_length: u8,
    /// decompress the just-compressed output and compare, erroring on mismatch
    pub verify: bool,
}

pub const STD_OPTIONS: Options = Options {
    max_code_length: 15,
    verify: false,
};
