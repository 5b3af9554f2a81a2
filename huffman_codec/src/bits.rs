//! Growable sequence of bits that knows its exact length.

use std::fmt;
use std::io;
use std::iter::FusedIterator;

use binout::{Serializer, VByte};
use bitm::{BitAccess, ceiling_div, n_lowest_bits};
use dyn_size_of::GetSize;

use crate::{Code, CodecError, Result};

/// Returns the number of bytes needed to hold `bits` bits, without overflowing for any `bits`.
#[inline] fn bytes_for(bits: usize) -> usize {
    bits / 8 + (bits % 8 != 0) as usize
}

/// Ordered, growable sequence of bits with exact length tracking.
///
/// The bits are stored 64 per word; bit `i` occupies position `i % 64` (counting from the least significant)
/// of the word `i / 64`. Bits past the length are always zeroed,
/// so the little-endian bytes of the words are exactly the packed form returned by [`Self::to_bytes`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    words: Vec<u64>,
    len: usize
}

impl BitBuffer {
    /// Constructs an empty buffer.
    #[inline] pub fn new() -> Self { Self::default() }

    /// Constructs an empty buffer that can hold `bits` bits without reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        Self { words: Vec::with_capacity(bits / 64 + (bits % 64 != 0) as usize), len: 0 }
    }

    /// Returns the number of bits.
    #[inline] pub fn len(&self) -> usize { self.len }

    /// Returns whether `self` contains no bits.
    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Appends the `bit` to the end of `self`.
    #[inline] pub fn push(&mut self, bit: bool) {
        if self.len % 64 == 0 { self.words.push(0); }
        if bit { self.words.set_bit(self.len); }
        self.len += 1;
    }

    /// Appends all bits of the `code`, the first bit of the code first.
    pub fn push_code(&mut self, code: &Code) {
        let new_len = self.len + code.len();
        self.words.resize(ceiling_div(new_len, 64), 0);
        let mut content = code.content();
        while self.len < new_len {
            let chunk = (new_len - self.len).min(32) as u8;
            self.words.set_bits(self.len, content as u64 & n_lowest_bits(chunk), chunk);
            content >>= chunk;
            self.len += chunk as usize;
        }
    }

    /// Returns the bit at `index` or `None` if `index` is out of bounds.
    #[inline] pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.words.get_bit(index))
    }

    /// Returns an iterator over the bits, in the order they were appended.
    pub fn iter(&self) -> Bits<'_> {
        Bits { buffer: self, index: 0 }
    }

    /// Returns `ceil(len/8)` bytes with bit `i` stored at the position `i % 8`
    /// (counting from the least significant) of the byte `i / 8`.
    /// The bits past the length in the last byte are zeroed.
    ///
    /// The length is not stored in the result and must be passed to [`Self::from_bytes`] separately.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result: Vec<u8> = self.words.iter().flat_map(|w| w.to_le_bytes()).collect();
        result.truncate(bytes_for(self.len));
        result
    }

    /// Reconstructs exactly `bit_count` bits from the first `ceil(bit_count/8)` of `bytes`,
    /// which are laid out as by [`Self::to_bytes`]. The remaining (padding) bits are ignored.
    pub fn from_bytes(bytes: &[u8], bit_count: usize) -> Result<Self> {
        let required = bytes_for(bit_count);
        if bytes.len() < required {
            return Err(CodecError::NotEnoughBytes { bits: bit_count, required, available: bytes.len() });
        }
        let mut words: Vec<u64> = bytes[..required].chunks(8).map(|chunk| {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            u64::from_le_bytes(word)
        }).collect();
        let used_in_last = (bit_count % 64) as u8;
        if used_in_last != 0 {
            if let Some(last) = words.last_mut() { *last &= n_lowest_bits(used_in_last); }
        }
        Ok(Self { words, len: bit_count })
    }

    /// Returns number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        VByte::size(self.len) + bytes_for(self.len)
    }

    /// Writes `self` to the `output`: the number of bits (as VByte) followed by the packed bits.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        VByte::write(output, self.len)?;
        output.write_all(&self.to_bytes())
    }

    /// Reads (written by `write`) buffer from the `input`.
    pub fn read(input: &mut dyn io::Read) -> io::Result<Self> {
        let len: usize = VByte::read(input)?;
        let required = bytes_for(len);
        let mut bytes = Vec::new();
        io::Read::read_to_end(&mut io::Read::take(&mut *input, required as u64), &mut bytes)?;
        if bytes.len() < required {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes of packed bits, got {}", required, bytes.len())));
        }
        Self::from_bytes(&bytes, len).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuffer[")?;
        for bit in self.iter() { f.write_str(if bit { "1" } else { "0" })?; }
        write!(f, "]")
    }
}

impl GetSize for BitBuffer {
    fn size_bytes_dyn(&self) -> usize { self.words.size_bytes_dyn() }
    fn size_bytes_content_dyn(&self) -> usize { self.words.size_bytes_content_dyn() }
    const USES_DYN_MEM: bool = true;
}

impl Extend<bool> for BitBuffer {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        for bit in iter { self.push(bit); }
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<'b> IntoIterator for &'b BitBuffer {
    type Item = bool;
    type IntoIter = Bits<'b>;
    #[inline] fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// Iterator over the bits of [`BitBuffer`].
#[derive(Clone)]
pub struct Bits<'b> {
    buffer: &'b BitBuffer,
    index: usize
}

impl Iterator for Bits<'_> {
    type Item = bool;

    #[inline] fn next(&mut self) -> Option<bool> {
        let result = self.buffer.get(self.index)?;
        self.index += 1;
        Some(result)
    }

    #[inline] fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Bits<'_> {
    #[inline] fn len(&self) -> usize { self.buffer.len - self.index }
}

impl FusedIterator for Bits<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(pattern: &str) -> BitBuffer {
        pattern.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn push_and_get() {
        let mut buffer = BitBuffer::new();
        assert!(buffer.is_empty());
        buffer.push(true);
        buffer.push(false);
        buffer.push(true);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(0), Some(true));
        assert_eq!(buffer.get(1), Some(false));
        assert_eq!(buffer.get(2), Some(true));
        assert_eq!(buffer.get(3), None);
        assert_eq!(buffer.iter().collect::<Vec<_>>(), [true, false, true]);
        assert_eq!(format!("{:?}", buffer), "BitBuffer[101]");
    }

    #[test]
    fn pack_lsb_first_with_zero_padding() {
        let buffer = bits("1011");
        assert_eq!(buffer.to_bytes(), [0b1101]);
        let buffer = bits("111111111");
        assert_eq!(buffer.to_bytes(), [0xFF, 0b1]);
        assert_eq!(BitBuffer::new().to_bytes(), Vec::<u8>::new());
    }

    #[test]
    fn unpack_ignores_padding() {
        let buffer = BitBuffer::from_bytes(&[0b1111_0101, 0xAA], 5).unwrap();
        assert_eq!(buffer, bits("10101"));
        assert_eq!(buffer.to_bytes(), [0b1_0101]);
        assert_eq!(BitBuffer::from_bytes(&[], 0).unwrap(), BitBuffer::new());
    }

    #[test]
    fn unpack_needs_enough_bytes() {
        assert_eq!(BitBuffer::from_bytes(&[0xFF], 9),
            Err(CodecError::NotEnoughBytes { bits: 9, required: 2, available: 1 }));
    }

    #[test]
    fn pack_unpack_across_words() {
        let buffer: BitBuffer = (0..150).map(|i| i % 3 == 0 || i % 7 == 0).collect();
        let bytes = buffer.to_bytes();
        assert_eq!(bytes.len(), 19);
        assert_eq!(BitBuffer::from_bytes(&bytes, 150).unwrap(), buffer);
    }

    #[test]
    fn push_code_across_word_boundary() {
        let mut buffer: BitBuffer = std::iter::repeat(true).take(60).collect();
        let mut code = Code::default();
        for i in 0..40 { code.push(i % 2 == 1); }
        buffer.push_code(&code);
        assert_eq!(buffer.len(), 100);
        let expected: BitBuffer = std::iter::repeat(true).take(60)
            .chain((0..40).map(|i| i % 2 == 1)).collect();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn unpack_huge_bit_count() {
        assert_eq!(BitBuffer::from_bytes(&[], usize::MAX),
            Err(CodecError::NotEnoughBytes { bits: usize::MAX, required: usize::MAX / 8 + 1, available: 0 }));
        assert_eq!(BitBuffer::from_bytes(&[0xFF; 3], usize::MAX - 7),
            Err(CodecError::NotEnoughBytes { bits: usize::MAX - 7, required: usize::MAX / 8, available: 3 }));
    }

    #[test]
    fn write_read() {
        for len in [0, 1, 8, 13, 64, 200] {
            let buffer: BitBuffer = (0..len).map(|i| i % 5 == 1).collect();
            let mut stored = Vec::new();
            buffer.write(&mut stored).unwrap();
            assert_eq!(stored.len(), buffer.write_bytes());
            assert_eq!(BitBuffer::read(&mut &stored[..]).unwrap(), buffer);
        }
    }

    #[test]
    fn read_truncated_stream() {
        let buffer = bits("110011001100110011");
        let mut stored = Vec::new();
        buffer.write(&mut stored).unwrap();
        stored.pop();
        assert_eq!(BitBuffer::read(&mut &stored[..]).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_corrupted_length() {
        let mut stored = Vec::new();
        VByte::write(&mut stored, usize::MAX).unwrap();
        stored.extend_from_slice(&[0xAB, 0xCD]);
        assert_eq!(BitBuffer::read(&mut &stored[..]).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
