//! Encoding symbols to bits and decoding them back with a huffman tree.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::mem;

use dyn_size_of::GetSize;

use crate::{BitBuffer, Code, CodecError, FrequencyTable, HuffmanTree, Node, Result};

/// Result of bit decoding returned by `consume` method of [`Decoder`].
#[derive(PartialOrd, Ord, PartialEq, Eq, Debug, Clone, Hash)]
pub enum DecodingResult<T> {
    /// Completed value that has been successfully decoded.
    Value(T),
    /// The codeword is incomplete and the next bit is needed.
    Incomplete,
    /// The bit leads outside of the tree, i.e. the decoder stands at a leaf and has not been reset.
    Invalid
}

/// Decoder that decodes a symbol for given code, consuming one bit at a time.
///
/// Its whole state is the current position in the tree and the number of bits consumed since the last reset,
/// so any number of decoders can work on one tree at the same time.
pub struct Decoder<'huff, S> {
    tree: &'huff HuffmanTree<S>,
    /// Current position in the tree.
    node: &'huff Node<S>,
    /// Number of bits consumed since construction or last reset.
    consumed: usize
}

impl<S> Clone for Decoder<'_, S> {
    #[inline] fn clone(&self) -> Self { *self }
}

impl<S> Copy for Decoder<'_, S> {}

impl<'huff, S> Decoder<'huff, S> {
    /// Constructs decoder for given `tree`.
    pub fn new(tree: &'huff HuffmanTree<S>) -> Self {
        Self { tree, node: tree.root(), consumed: 0 }
    }

    /// Resets `self` to initial state and makes it ready to decode next symbol.
    #[inline] pub fn reset(&mut self) {
        self.node = self.tree.root();
        self.consumed = 0;
    }

    /// Returns the number of bits consumed since construction or last reset.
    #[inline(always)] pub fn consumed_bits(&self) -> usize { self.consumed }

    /// Consumes a `bit` of the codeword and returns:
    /// - a symbol if the given `bit` finishes the codeword;
    /// - [`DecodingResult::Incomplete`] if the codeword is incomplete and the next bit is needed;
    /// - or [`DecodingResult::Invalid`] if `self` already stands at a leaf (it has to be [reset](Self::reset) after each symbol).
    pub fn consume(&mut self, bit: bool) -> DecodingResult<&'huff S> {
        let Some(child) = self.tree.descend(self.node, bit) else {
            return DecodingResult::Invalid;
        };
        self.node = child;
        self.consumed += 1;
        match child.symbol() {
            Some(symbol) => DecodingResult::Value(symbol),
            None => DecodingResult::Incomplete
        }
    }

    /// Tries to decode and return a single symbol from the `bits` iterator, consuming as many bits as needed.
    /// If successful, it [resets](Self::reset) `self` to be ready to decode the next symbol.
    ///
    /// Returns [`DecodingResult::Incomplete`] if the iterator exhausted before the symbol was decoded
    /// ([`Self::consumed_bits`] enables checking if the iterator yielded any bit before exhausting).
    pub fn decode_next<I: Iterator<Item = bool>>(&mut self, bits: &mut I) -> DecodingResult<&'huff S> {
        loop {
            let Some(bit) = bits.next() else { return DecodingResult::Incomplete };
            match self.consume(bit) {
                DecodingResult::Value(symbol) => {
                    self.reset();
                    return DecodingResult::Value(symbol);
                },
                DecodingResult::Invalid => return DecodingResult::Invalid,
                DecodingResult::Incomplete => {},
            }
        }
    }
}

/// Huffman tree together with the codes of all its symbols, collected once.
///
/// Encoding a symbol costs one map lookup; decoding walks the tree bit by bit.
#[derive(Clone, Debug)]
pub struct Codec<S> {
    tree: HuffmanTree<S>,
    codes: HashMap<S, Code>
}

impl<S: Eq + Hash + Clone> Codec<S> {
    /// Constructs codec that uses the given `tree`.
    pub fn new(tree: HuffmanTree<S>) -> Self {
        let codes = tree.codes();
        Self { tree, codes }
    }

    /// Constructs codec for the given `frequencies`. See [`HuffmanTree::from_frequencies`].
    pub fn from_frequencies(frequencies: &FrequencyTable<S>) -> Result<Self> {
        HuffmanTree::from_frequencies(frequencies).map(Self::new)
    }

    /// Counts occurrences of all symbols exposed by `iter` and constructs codec for obtained frequencies.
    pub fn from_symbols<Iter>(iter: Iter) -> Result<Self>
        where Iter: IntoIterator, Iter::Item: Borrow<S>
    {
        HuffmanTree::from_symbols(iter).map(Self::new)
    }

    /// Returns the code of the `symbol` or `None` if the tree has no leaf for it.
    #[inline] pub fn code_of(&self, symbol: &S) -> Option<Code> {
        self.codes.get(symbol).copied()
    }

    /// Encodes all `symbols`, in order, to the returned buffer.
    ///
    /// Fails with [`CodecError::UnknownSymbol`] if any symbol has no code.
    pub fn encode<Iter>(&self, symbols: Iter) -> Result<BitBuffer>
        where Iter: IntoIterator, Iter::Item: Borrow<S>
    {
        encode_with(&self.codes, symbols)
    }

    /// Returns the number of bits the encoding of a sequence of symbols with given `frequencies` occupies,
    /// or `None` if some of its symbols have no code or the number does not fit in `usize`.
    pub fn encoded_len(&self, frequencies: &FrequencyTable<S>) -> Option<usize> {
        frequencies.iter().try_fold(0usize, |acc, (symbol, count)| {
            let bits = self.codes.get(symbol)?.len().checked_mul(usize::try_from(count).ok()?)?;
            acc.checked_add(bits)
        })
    }

    /// Decodes all `bits` to the sequence of symbols. See [`decode`].
    #[inline] pub fn decode(&self, bits: &BitBuffer) -> Result<Vec<S>> {
        decode(bits, &self.tree)
    }
}

impl<S> Codec<S> {
    /// Returns the tree used by `self`.
    #[inline] pub fn tree(&self) -> &HuffmanTree<S> { &self.tree }

    /// Returns decoder that allows for decoding symbols bit by bit.
    #[inline] pub fn decoder(&self) -> Decoder<'_, S> { Decoder::new(&self.tree) }
}

impl<S: GetSize> GetSize for Codec<S> {
    fn size_bytes_dyn(&self) -> usize {
        // the map is approximated, it has one control byte per bucket
        self.tree.size_bytes_dyn() + self.codes.capacity() * (mem::size_of::<(S, Code)>() + 1)
    }
    const USES_DYN_MEM: bool = true;
}

fn encode_with<S, Iter>(codes: &HashMap<S, Code>, symbols: Iter) -> Result<BitBuffer>
    where S: Eq + Hash, Iter: IntoIterator, Iter::Item: Borrow<S>
{
    let symbols = symbols.into_iter();
    // each code has at least one bit
    let mut result = BitBuffer::with_capacity(symbols.size_hint().0);
    for (position, symbol) in symbols.enumerate() {
        let code = codes.get(symbol.borrow()).ok_or(CodecError::UnknownSymbol { position })?;
        result.push_code(code);
    }
    Ok(result)
}

/// Encodes all `symbols`, in order, with the codes assigned by the `tree`.
///
/// The codes are collected with one traversal of the tree; to encode many sequences, use [`Codec`] instead.
/// Fails with [`CodecError::UnknownSymbol`] if any symbol has no leaf in the tree.
pub fn encode<S, Iter>(symbols: Iter, tree: &HuffmanTree<S>) -> Result<BitBuffer>
    where S: Eq + Hash + Clone, Iter: IntoIterator, Iter::Item: Borrow<S>
{
    encode_with(&tree.codes(), symbols)
}

/// Decodes all `bits` to the sequence of symbols, walking the `tree` from the root,
/// and returning to the root after each leaf.
///
/// Fails with [`CodecError::Truncated`] if the bits end inside a codeword
/// and with [`CodecError::StructuralViolation`] if some bit leads outside of the tree.
pub fn decode<S: Clone>(bits: &BitBuffer, tree: &HuffmanTree<S>) -> Result<Vec<S>> {
    let mut decoder = Decoder::new(tree);
    let mut result = Vec::with_capacity(bits.len() / tree.depth().max(1));
    for (position, bit) in bits.iter().enumerate() {
        match decoder.consume(bit) {
            DecodingResult::Value(symbol) => {
                result.push(symbol.clone());
                decoder.reset();
            },
            DecodingResult::Incomplete => {},
            DecodingResult::Invalid => return Err(CodecError::StructuralViolation { position })
        }
    }
    match decoder.consumed_bits() {
        0 => Ok(result),
        dangling_bits => Err(CodecError::Truncated { dangling_bits })
    }
}
