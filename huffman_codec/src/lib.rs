#![doc = include_str!("../README.md")]

mod error;
pub use error::{CodecError, Result};

mod bits;
pub use bits::{BitBuffer, Bits};

mod code;
pub use code::{Code, CodeBits};

mod frequencies;
pub use frequencies::FrequencyTable;

mod tree;
pub use tree::{HuffmanTree, Node, Leaves};

mod codec;
pub use codec::{Codec, Decoder, DecodingResult, encode, decode};

pub mod alphabet;
pub use alphabet::{CharCodec, ByteCodec, CharTree, ByteTree, CharFrequencies, ByteFrequencies};
