//! Ready-made codecs for the two common alphabets: Unicode characters and bytes,
//! and functions to read and write their symbols.

use std::io;

use binout::{AsIs, Serializer};

use crate::{BitBuffer, Codec, FrequencyTable, HuffmanTree, Result};

/// Codec for texts, with Unicode scalar values as symbols.
pub type CharCodec = Codec<char>;
/// Codec for binary data, with bytes as symbols.
pub type ByteCodec = Codec<u8>;

/// Huffman tree over Unicode characters.
pub type CharTree = HuffmanTree<char>;
/// Huffman tree over bytes.
pub type ByteTree = HuffmanTree<u8>;

/// Numbers of occurrences of characters in a text.
pub type CharFrequencies = FrequencyTable<char>;
/// Numbers of occurrences of bytes in binary data.
pub type ByteFrequencies = FrequencyTable<u8>;

impl CharCodec {
    /// Constructs codec for the characters of the `text`, weighted by their numbers of occurrences.
    #[inline] pub fn from_text(text: &str) -> Result<Self> {
        Self::from_symbols(text.chars())
    }

    /// Encodes all characters of the `text`.
    #[inline] pub fn encode_text(&self, text: &str) -> Result<BitBuffer> {
        self.encode(text.chars())
    }

    /// Decodes the `bits` to a text.
    pub fn decode_text(&self, bits: &BitBuffer) -> Result<String> {
        self.decode(bits).map(String::from_iter)
    }
}

impl ByteCodec {
    /// Constructs codec for the bytes of the `data`, weighted by their numbers of occurrences.
    #[inline] pub fn from_data(data: &[u8]) -> Result<Self> {
        Self::from_symbols(data)
    }

    /// Encodes all bytes of the `data`.
    #[inline] pub fn encode_data(&self, data: &[u8]) -> Result<BitBuffer> {
        self.encode(data)
    }
}

/// Writes the `symbol` as 4 bytes (its code point in little-endian).
/// Can be passed to [`FrequencyTable::write`].
pub fn write_char(output: &mut dyn io::Write, symbol: &char) -> io::Result<()> {
    AsIs::write(output, *symbol as u32)
}

/// Reads a character written by [`write_char`].
/// Can be passed to [`FrequencyTable::read`].
///
/// Fails with [`io::ErrorKind::InvalidData`] if the code point read is not a Unicode scalar value.
pub fn read_char(input: &mut dyn io::Read) -> io::Result<char> {
    let code_point: u32 = AsIs::read(input)?;
    char::from_u32(code_point).ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData,
        format!("{code_point:#x} is not a valid unicode scalar value")))
}

/// Writes the `symbol` as a single byte.
pub fn write_byte(output: &mut dyn io::Write, symbol: &u8) -> io::Result<()> {
    output.write_all(std::slice::from_ref(symbol))
}

/// Reads a byte written by [`write_byte`].
pub fn read_byte(input: &mut dyn io::Read) -> io::Result<u8> {
    let mut byte = 0;
    input.read_exact(std::slice::from_mut(&mut byte))?;
    Ok(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecError;

    #[test]
    fn text() {
        let text = "zażółć gęślą jaźń";
        let codec = CharCodec::from_text(text).unwrap();
        let bits = codec.encode_text(text).unwrap();
        assert_eq!(codec.decode_text(&bits).unwrap(), text);
        assert_eq!(codec.encode_text("zx"), Err(CodecError::UnknownSymbol { position: 1 }));
    }

    #[test]
    fn text_of_one_character() {
        assert_eq!(CharCodec::from_text("aaaa").unwrap_err(), CodecError::DegenerateAlphabet);
        assert_eq!(CharCodec::from_text("").unwrap_err(), CodecError::EmptyAlphabet);
    }

    #[test]
    fn data() {
        let data: Vec<u8> = (0..=255u8).chain(0..16).chain(0..2).collect();
        let codec = ByteCodec::from_data(&data).unwrap();
        assert_eq!(codec.tree().leaf_count(), 256);
        let bits = codec.encode_data(&data).unwrap();
        assert_eq!(codec.decode(&bits).unwrap(), data);
    }

    #[test]
    fn chars_write_read() {
        let mut buff = Vec::new();
        for c in ['a', 'ż', '\u{10FFFF}'] { write_char(&mut buff, &c).unwrap(); }
        assert_eq!(buff.len(), 12);
        assert_eq!(&buff[..4], [0x61, 0, 0, 0]);
        let mut input = &buff[..];
        for c in ['a', 'ż', '\u{10FFFF}'] { assert_eq!(read_char(&mut input).unwrap(), c); }
        assert_eq!(read_char(&mut input).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn invalid_char() {
        let surrogate = 0xD800u32.to_le_bytes();
        assert_eq!(read_char(&mut &surrogate[..]).unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn byte_frequencies_write_read() {
        let frequencies = ByteFrequencies::with_counted_all(b"hello, world");
        let mut buff = Vec::new();
        frequencies.write(&mut buff, write_byte).unwrap();
        assert_eq!(buff.len(), frequencies.write_bytes(1));
        assert_eq!(ByteFrequencies::read(&mut &buff[..], read_byte).unwrap(), frequencies);
    }
}
