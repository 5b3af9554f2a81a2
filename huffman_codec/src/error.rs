//! Errors reported by tree construction, encoding, decoding and bit unpacking.

use thiserror::Error;

/// Failure of an operation of this crate.
///
/// All operations are pure, so repeating a failed call with the same arguments fails again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The symbol at `position` of the input has no leaf in the tree used for encoding.
    #[error("symbol at position {position} is not present in the huffman tree")]
    UnknownSymbol { position: usize },

    /// The bit stream ended inside a codeword, `dangling_bits` after the last complete one.
    #[error("bit stream ends in the middle of a codeword ({dangling_bits} dangling bits)")]
    Truncated { dangling_bits: usize },

    /// The bit at `position` leads to a child that does not exist.
    #[error("bit {position} leads outside of the huffman tree")]
    StructuralViolation { position: usize },

    /// Only one distinct symbol was given; its code would be empty and could not be decoded.
    #[error("cannot build a huffman tree for a single distinct symbol")]
    DegenerateAlphabet,

    /// No symbol was given.
    #[error("cannot build a huffman tree without symbols")]
    EmptyAlphabet,

    /// Some codeword would be longer than [`crate::Code::MAX_LEN`] bits.
    #[error("codeword of {len} bits exceeds the limit of {max} bits")]
    CodeTooLong { len: usize, max: usize },

    /// Fewer bytes than needed to hold the requested number of bits.
    #[error("{bits} bits need {required} bytes, but only {available} were given")]
    NotEnoughBytes { bits: usize, required: usize, available: usize },
}

/// Result type of operations of this crate.
pub type Result<T> = std::result::Result<T, CodecError>;
