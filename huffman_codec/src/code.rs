//! Tools to deal with codewords.

use std::fmt;
use std::iter::FusedIterator;

use dyn_size_of::GetSize;

/// `Code` is a path from the root of the huffman tree to a leaf: `false` (`0`) for going to the left child,
/// `true` (`1`) for going to the right one.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct Code {
    /// Bits of the codeword. The lowest bit contains the first step.
    content: u128,
    /// Number of bits.
    len: u8
}

impl Code {
    /// Maximum length of the codeword, in bits.
    pub const MAX_LEN: usize = u128::BITS as usize;

    /// Returns the bits of `self`; bit `i` (counting from the least significant) is the `i`-th step.
    #[inline] pub fn content(&self) -> u128 { self.content }

    /// Returns the length of `self` in bits.
    #[inline] pub fn len(&self) -> usize { self.len as usize }

    /// Returns whether `self` consists of zero bits.
    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Appends the `bit` to the end of `self`. The length must be below [`Self::MAX_LEN`].
    #[inline] pub fn push(&mut self, bit: bool) {
        debug_assert!(self.len() < Self::MAX_LEN);
        self.content |= (bit as u128) << self.len;
        self.len += 1;
    }

    /// Returns `self` extended by the `bit`.
    #[inline] pub(crate) fn with(mut self, bit: bool) -> Self {
        self.push(bit);
        self
    }

    /// Gets `index`-th bit.
    #[inline] pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len()).then(|| self.content >> index & 1 == 1)
    }

    /// Returns whether `self` is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (self.len == 0 || (self.content ^ other.content) << (Self::MAX_LEN - self.len()) == 0)
    }

    /// Returns an iterator over the bits of `self`, the first step first.
    #[inline] pub fn iter(&self) -> CodeBits {
        CodeBits { code: *self, index: 0 }
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code(")?;
        for bit in self.iter() { f.write_str(if bit { "1" } else { "0" })?; }
        write!(f, ")")
    }
}

impl GetSize for Code {}

impl FromIterator<bool> for Code {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut result = Self::default();
        for bit in iter { result.push(bit); }
        result
    }
}

impl IntoIterator for Code {
    type Item = bool;
    type IntoIter = CodeBits;
    #[inline] fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// Iterator over the bits of [`Code`].
#[derive(Clone, Copy)]
pub struct CodeBits {
    code: Code,
    index: usize
}

impl Iterator for CodeBits {
    type Item = bool;

    #[inline] fn next(&mut self) -> Option<bool> {
        let result = self.code.get(self.index)?;
        self.index += 1;
        Some(result)
    }

    #[inline] fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for CodeBits {
    #[inline] fn len(&self) -> usize { self.code.len() - self.index }
}

impl FusedIterator for CodeBits {}
