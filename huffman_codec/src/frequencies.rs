//! Tools to count frequencies of symbols.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::io;
use std::mem;

use binout::{Serializer, VByte};
use dyn_size_of::GetSize;
use fsum::FSum;

/// Numbers of occurrences of distinct symbols.
///
/// Symbols are kept in the order of their first occurrence,
/// which is the order the huffman tree construction uses to break ties.
/// There is no entry for a symbol that did not occur.
#[derive(Clone, Debug)]
pub struct FrequencyTable<S> {
    /// Symbols and their numbers of occurrences, in the order of the first occurrences.
    entries: Vec<(S, u64)>,
    /// Index of each symbol in `entries`.
    positions: HashMap<S, usize>
}

impl<S> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self { entries: Vec::new(), positions: HashMap::new() }
    }
}

impl<S: Eq + Hash + Clone> FrequencyTable<S> {
    /// Constructs an empty table.
    #[inline] pub fn new() -> Self { Self::default() }

    /// Constructs `Self` that counts occurrences of all symbols exposed by `iter`.
    pub fn with_counted_all<Iter>(iter: Iter) -> Self
        where Iter: IntoIterator, Iter::Item: Borrow<S>
    {
        let mut result = Self::new();
        result.count_all(iter);
        result
    }

    /// Constructs `Self` from pairs of symbols and their numbers of occurrences.
    /// Pairs with zero counts are skipped and counts of repeated symbols are summed up.
    pub fn with_counts<Iter: IntoIterator<Item = (S, u64)>>(iter: Iter) -> Self {
        let mut result = Self::new();
        for (symbol, count) in iter { result.add(symbol, count); }
        result
    }

    /// Adds one to the stored number of `symbol` occurrences.
    #[inline] pub fn count(&mut self, symbol: S) {
        self.add(symbol, 1)
    }

    /// Adds `count` to the stored number of `symbol` occurrences.
    pub fn add(&mut self, symbol: S, count: u64) {
        if count == 0 { return; }
        if let Some(&position) = self.positions.get(&symbol) {
            let stored = &mut self.entries[position].1;
            *stored = stored.saturating_add(count);
        } else {
            self.positions.insert(symbol.clone(), self.entries.len());
            self.entries.push((symbol, count));
        }
    }

    /// Calls `count` for all items exposed by `iter`.
    pub fn count_all<Iter>(&mut self, iter: Iter)
        where Iter: IntoIterator, Iter::Item: Borrow<S>
    {
        for symbol in iter { self.count(symbol.borrow().clone()); }
    }

    /// Returns the number of `symbol` occurrences or `None` if it has not occurred.
    #[inline] pub fn get(&self, symbol: &S) -> Option<u64> {
        self.positions.get(symbol).map(|&position| self.entries[position].1)
    }

    /// Reads (written by `write`) table from the `input`, using `read_symbol` to read each symbol.
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] if the input contains zero counts or repeated symbols.
    pub fn read<F>(input: &mut dyn io::Read, mut read_symbol: F) -> io::Result<Self>
        where F: FnMut(&mut dyn io::Read) -> io::Result<S>
    {
        let len: usize = VByte::read(input)?;
        let mut result = Self::new();
        for _ in 0..len {
            let symbol = read_symbol(input)?;
            let count: u64 = VByte::read(input)?;
            if count == 0 || result.positions.contains_key(&symbol) {
                return Err(io::Error::new(io::ErrorKind::InvalidData,
                    "frequency table contains zero count or repeated symbol"));
            }
            result.add(symbol, count);
        }
        Ok(result)
    }
}

impl<S> FrequencyTable<S> {
    /// Returns the number of distinct symbols.
    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    /// Returns whether no symbol has been counted.
    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Returns the total number of occurrences of all symbols.
    pub fn total(&self) -> u64 {
        self.entries.iter().fold(0u64, |acc, (_, count)| acc.saturating_add(*count))
    }

    /// Returns an iterator over symbols and their numbers of occurrences, in the order of the first occurrences.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&S, u64)> + '_ {
        self.entries.iter().map(|(symbol, count)| (symbol, *count))
    }

    /// Returns the Shannon entropy of the symbols counted so far, in bits per symbol.
    pub fn entropy(&self) -> f64 {
        if self.entries.is_empty() { return 0.0; }
        let sum = self.total() as f64;
        - FSum::with_all(self.entries.iter()
            .map(|(_, count)| { let p = *count as f64 / sum; p * p.log2() })).value()
    }

    /// Returns number of bytes which `write` will write,
    /// assuming that each call to `write_symbol` writes `bytes_per_symbol` bytes.
    pub fn write_bytes(&self, bytes_per_symbol: usize) -> usize {
        VByte::size(self.entries.len()) +
            self.entries.iter().map(|(_, count)| bytes_per_symbol + VByte::size(*count)).sum::<usize>()
    }

    /// Writes `self` to the given `output`, using `write_symbol` to write each symbol.
    /// Symbols are written in the order of their first occurrences, each followed by its count.
    pub fn write<F>(&self, output: &mut dyn io::Write, mut write_symbol: F) -> io::Result<()>
        where F: FnMut(&mut dyn io::Write, &S) -> io::Result<()>
    {
        VByte::write(output, self.entries.len())?;
        self.entries.iter().try_for_each(|(symbol, count)| {
            write_symbol(output, symbol)?;
            VByte::write(output, *count)
        })
    }
}

impl<S: Eq> PartialEq for FrequencyTable<S> {
    /// Tables are equal if they have the same symbols, counts and order.
    fn eq(&self, other: &Self) -> bool { self.entries == other.entries }
}

impl<S: Eq> Eq for FrequencyTable<S> {}

impl<S: GetSize> GetSize for FrequencyTable<S> {
    fn size_bytes_dyn(&self) -> usize {
        // approximated for the map, which has one control byte per bucket
        self.entries.size_bytes_dyn()
            + self.positions.capacity() * (mem::size_of::<(S, usize)>() + 1)
    }
    const USES_DYN_MEM: bool = true;
}

impl<S: Eq + Hash + Clone, B: Borrow<S>> FromIterator<B> for FrequencyTable<S> {
    fn from_iter<Iter: IntoIterator<Item = B>>(iter: Iter) -> Self {
        Self::with_counted_all(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn counts_in_order_of_first_occurrence() {
        let table = FrequencyTable::<char>::with_counted_all("mississippi".chars());
        assert_eq!(table.len(), 4);
        assert_eq!(table.total(), 11);
        assert_eq!(table.iter().collect::<Vec<_>>(), [(&'m', 1), (&'i', 4), (&'s', 4), (&'p', 2)]);
        assert_eq!(table.get(&'s'), Some(4));
        assert_eq!(table.get(&'x'), None);
    }

    #[test]
    fn counts_borrowed_bytes() {
        let data = [7u8, 3, 7, 7];
        let table: FrequencyTable<u8> = data.iter().collect();
        assert_eq!(table.iter().collect::<Vec<_>>(), [(&7, 3), (&3, 1)]);
    }

    #[test]
    fn explicit_counts() {
        let table = FrequencyTable::with_counts([('a', 5), ('b', 0), ('c', 2), ('a', 1)]);
        assert_eq!(table.iter().collect::<Vec<_>>(), [(&'a', 6), (&'c', 2)]);
        assert_eq!(table.get(&'b'), None);
    }

    #[test]
    fn empty() {
        let table = FrequencyTable::<u8>::with_counted_all(std::iter::empty::<u8>());
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert_eq!(table.entropy(), 0.0);
    }

    #[test]
    fn entropy() {
        let table = FrequencyTable::with_counts([('a', 1), ('b', 1), ('c', 1), ('d', 1)]);
        assert!((table.entropy() - 2.0).abs() < 1e-12);
        let table = FrequencyTable::with_counts([('a', 7)]);
        assert_eq!(table.entropy(), 0.0);
    }

    #[test]
    fn write_read() {
        let table = FrequencyTable::<u8>::with_counted_all(b"abracadabra".iter());
        let mut buff = Vec::new();
        table.write(&mut buff, |o, v| o.write_all(&[*v])).unwrap();
        assert_eq!(buff.len(), table.write_bytes(1));
        let read = FrequencyTable::<u8>::read(&mut &buff[..], |i| {
            let mut b = [0u8];
            i.read_exact(&mut b).map(|()| b[0])
        }).unwrap();
        assert_eq!(read, table);
    }

    #[test]
    fn read_rejects_repeated_symbol() {
        let mut buff = Vec::new();
        VByte::write(&mut buff, 2usize).unwrap();
        for _ in 0..2 {
            buff.push(b'x');
            VByte::write(&mut buff, 3u64).unwrap();
        }
        let err = FrequencyTable::<u8>::read(&mut &buff[..], |i| {
            let mut b = [0u8];
            i.read_exact(&mut b).map(|()| b[0])
        }).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
