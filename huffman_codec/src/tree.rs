//! Huffman tree built by greedy merging of the two lightest nodes.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;
use std::iter::FusedIterator;
use std::borrow::Borrow;
use std::mem;

use dyn_size_of::GetSize;

use crate::{Code, CodecError, FrequencyTable, Result};

/// Node of the huffman tree.
///
/// Every internal node owns exactly two children and weighs as much as both of them together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node<S> {
    /// Terminal node assigned to a symbol.
    Leaf { symbol: S, weight: u64 },
    /// Non-terminal node; `left` is reached by bit `0` and `right` by bit `1`.
    Internal { weight: u64, left: Box<Node<S>>, right: Box<Node<S>> }
}

impl<S> Node<S> {
    /// Returns the number of occurrences of all symbols in the subtree.
    #[inline] pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight
        }
    }

    /// Returns whether `self` has no children.
    #[inline] pub fn is_leaf(&self) -> bool { matches!(self, Node::Leaf { .. }) }

    /// Returns the symbol of the leaf or `None` for an internal node.
    #[inline] pub fn symbol(&self) -> Option<&S> {
        match self {
            Node::Leaf { symbol, .. } => Some(symbol),
            Node::Internal { .. } => None
        }
    }

    /// Returns the left and the right child, or `None` for a leaf.
    #[inline] pub fn children(&self) -> Option<(&Node<S>, &Node<S>)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some((left, right))
        }
    }

    /// Returns the child in the direction of the `bit` (`false` is left, `true` is right),
    /// or `None` if `self` is a leaf and has no children.
    #[inline] pub fn descend(&self, bit: bool) -> Option<&Node<S>> {
        self.children().map(|(left, right)| if bit { right } else { left })
    }

    fn merge(left: Self, right: Self) -> Self {
        Node::Internal {
            weight: left.weight().saturating_add(right.weight()),
            left: Box::new(left),
            right: Box::new(right)
        }
    }
}

/// Node waiting in the queue for merging.
/// The queue pops the lightest node first and, among equally heavy, the one with the smallest sequence number.
struct Pending<S> {
    weight: u64,
    /// Position of the leaf in the frequency table, or, for internal nodes,
    /// the number of the table entries plus the number of internal nodes created before.
    sequence: usize,
    /// Height of the subtree.
    height: usize,
    node: Node<S>
}

impl<S> PartialEq for Pending<S> {
    fn eq(&self, other: &Self) -> bool { self.sequence == other.sequence }
}

impl<S> Eq for Pending<S> {}

impl<S> PartialOrd for Pending<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl<S> Ord for Pending<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed, as BinaryHeap is a max-heap
        (other.weight, other.sequence).cmp(&(self.weight, self.sequence))
    }
}

/// Binary huffman tree of at least two leaves, together with the frequencies it has been built for.
#[derive(Clone, Debug)]
pub struct HuffmanTree<S> {
    root: Node<S>,
    frequencies: FrequencyTable<S>,
    /// Length of the longest codeword.
    depth: usize
}

impl<S: Eq + Hash + Clone> HuffmanTree<S> {
    /// Constructs the tree for the given `frequencies`.
    ///
    /// Starting from one leaf per symbol, the two lightest nodes are repeatedly merged into a new internal node,
    /// the first taken becoming its left child.
    /// Among nodes of equal weight, leaves are taken in the order of the table and before
    /// all internal nodes, which are taken in the order of their creation.
    /// The algorithm runs in *O(k log k)* time, where *k* is the number of distinct symbols.
    ///
    /// Fails with [`CodecError::EmptyAlphabet`] for an empty table and with [`CodecError::DegenerateAlphabet`]
    /// for a table of one symbol, whose code would be empty.
    /// Fails with [`CodecError::CodeTooLong`] if some codeword would exceed [`Code::MAX_LEN`] bits.
    pub fn from_frequencies(frequencies: &FrequencyTable<S>) -> Result<Self> {
        match frequencies.len() {
            0 => return Err(CodecError::EmptyAlphabet),
            1 => return Err(CodecError::DegenerateAlphabet),
            _ => {}
        }
        let mut queue: BinaryHeap<Pending<S>> = frequencies.iter().enumerate()
            .map(|(sequence, (symbol, weight))| Pending {
                weight, sequence, height: 0, node: Node::Leaf { symbol: symbol.clone(), weight }
            }).collect();
        let mut sequence = queue.len();
        loop {
            let first = queue.pop().ok_or(CodecError::EmptyAlphabet)?;
            let Some(second) = queue.pop() else {
                log::debug!("built huffman tree: {} symbols, total weight {}, longest code {} bits",
                    frequencies.len(), first.weight, first.height);
                return Ok(Self { root: first.node, frequencies: frequencies.clone(), depth: first.height });
            };
            let height = first.height.max(second.height) + 1;
            if height > Code::MAX_LEN {
                return Err(CodecError::CodeTooLong { len: height, max: Code::MAX_LEN });
            }
            let node = Node::merge(first.node, second.node);
            queue.push(Pending { weight: node.weight(), sequence, height, node });
            sequence += 1;
        }
    }

    /// Counts occurrences of all symbols exposed by `iter` and constructs the tree for obtained frequencies.
    pub fn from_symbols<Iter>(iter: Iter) -> Result<Self>
        where Iter: IntoIterator, Iter::Item: Borrow<S>
    {
        Self::from_frequencies(&FrequencyTable::with_counted_all(iter))
    }

    /// Returns the code of the `symbol` or `None` if the tree has no leaf for it.
    ///
    /// The tree is searched depth-first, left child first.
    pub fn code_of(&self, symbol: &S) -> Option<Code> {
        self.leaves().find_map(|(s, code)| (s == symbol).then_some(code))
    }

    /// Returns a map from symbols to their codes, built with one traversal of the tree.
    pub fn codes(&self) -> HashMap<S, Code> {
        let mut result = HashMap::with_capacity(self.frequencies.len());
        for (symbol, code) in self.leaves() { result.insert(symbol.clone(), code); }
        log::trace!("collected {} codes", result.len());
        result
    }
}

impl<S> HuffmanTree<S> {
    /// Returns the root of the tree.
    #[inline] pub fn root(&self) -> &Node<S> { &self.root }

    /// Returns the frequencies the tree has been built for (they allow rebuilding the same tree).
    #[inline] pub fn frequencies(&self) -> &FrequencyTable<S> { &self.frequencies }

    /// Returns the number of leaves, equal to the number of distinct symbols.
    #[inline] pub fn leaf_count(&self) -> usize { self.frequencies.len() }

    /// Returns the total weight, equal to the weight of the root.
    #[inline] pub fn weight(&self) -> u64 { self.root.weight() }

    /// Returns the length of the longest codeword.
    #[inline] pub fn depth(&self) -> usize { self.depth }

    /// Returns the child of `node` in the direction of `bit`, or `None` if `node` is a leaf.
    #[inline] pub fn descend<'t>(&self, node: &'t Node<S>, bit: bool) -> Option<&'t Node<S>> {
        node.descend(bit)
    }

    /// Returns an iterator over leaf symbols and their codes, from the leftmost leaf to the rightmost.
    pub fn leaves(&self) -> Leaves<'_, S> {
        Leaves { stack: vec![(&self.root, Code::default())] }
    }
}

impl<S: GetSize> GetSize for HuffmanTree<S> {
    fn size_bytes_dyn(&self) -> usize {
        // all nodes except the root are boxed
        let boxed_nodes = 2 * self.leaf_count() - 2;
        boxed_nodes * mem::size_of::<Node<S>>() + self.frequencies.size_bytes_dyn()
            + if S::USES_DYN_MEM { self.leaves().map(|(s, _)| s.size_bytes_dyn()).sum() } else { 0 }
    }
    const USES_DYN_MEM: bool = true;
}

/// Iterator over the leaves of [`HuffmanTree`] and their codes, from left to right.
pub struct Leaves<'t, S> {
    stack: Vec<(&'t Node<S>, Code)>
}

impl<'t, S> Iterator for Leaves<'t, S> {
    type Item = (&'t S, Code);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, code)) = self.stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => return Some((symbol, code)),
                Node::Internal { left, right, .. } => {
                    self.stack.push((right, code.with(true)));
                    self.stack.push((left, code.with(false)));
                }
            }
        }
        None
    }
}

impl<S> FusedIterator for Leaves<'_, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    fn code(pattern: &str) -> Code {
        pattern.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn tree_3sym() {
        //   /  \
        //  c   /\
        //      b a
        let tree = HuffmanTree::from_frequencies(&FrequencyTable::with_counts([('a', 100), ('b', 50), ('c', 10)])).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.weight(), 160);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.codes(), hashmap!(
            'c' => code("00"),
            'b' => code("01"),
            'a' => code("1")
        ));
        assert_eq!(tree.leaves().map(|(s, _)| *s).collect::<String>(), "cba");
    }

    #[test]
    fn tie_break_prefers_insertion_order_then_creation_order() {
        // x and y are merged first; then w (leaf) is taken before the equally heavy internal node xy
        //   /  \
        //  z   / \
        //     w  /\
        //        x y
        let tree = HuffmanTree::from_frequencies(&FrequencyTable::with_counts([('x', 1), ('y', 1), ('w', 2), ('z', 3)])).unwrap();
        assert_eq!(tree.codes(), hashmap!(
            'z' => code("0"),
            'w' => code("10"),
            'x' => code("110"),
            'y' => code("111")
        ));
        let swapped = HuffmanTree::from_frequencies(&FrequencyTable::with_counts([('y', 1), ('x', 1), ('w', 2), ('z', 3)])).unwrap();
        assert_eq!(swapped.code_of(&'y'), Some(code("110")));
        assert_eq!(swapped.code_of(&'x'), Some(code("111")));
    }

    #[test]
    fn classic_frequencies() {
        let tree = HuffmanTree::from_frequencies(&FrequencyTable::with_counts(
            [('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)])).unwrap();
        let codes = tree.codes();
        assert_eq!(codes, hashmap!(
            'f' => code("0"),
            'c' => code("100"),
            'd' => code("101"),
            'a' => code("1100"),
            'b' => code("1101"),
            'e' => code("111")
        ));
        let weighted_len: u64 = tree.frequencies().iter().map(|(s, w)| w * codes[s].len() as u64).sum();
        assert_eq!(weighted_len, 224);
    }

    #[test]
    fn two_symbols() {
        let tree = HuffmanTree::<u8>::from_symbols([0x41u8, 0x41, 0x42]).unwrap();
        assert_eq!(tree.code_of(&0x42), Some(code("0")));
        assert_eq!(tree.code_of(&0x41), Some(code("1")));
        assert_eq!(tree.code_of(&0x43), None);
        let (left, right) = tree.root().children().unwrap();
        assert_eq!(left.symbol(), Some(&0x42));
        assert_eq!(right.symbol(), Some(&0x41));
    }

    #[test]
    fn descend() {
        let tree = HuffmanTree::<char>::from_symbols("aab".chars()).unwrap();
        let root = tree.root();
        assert!(!root.is_leaf());
        let right = tree.descend(root, true).unwrap();
        assert!(right.is_leaf());
        assert_eq!(right.symbol(), Some(&'a'));
        assert_eq!(tree.descend(right, false), None);
        assert_eq!(tree.descend(right, true), None);
    }

    #[test]
    fn degenerate_and_empty() {
        assert_eq!(HuffmanTree::<char>::from_symbols("aaaa".chars()).unwrap_err(), CodecError::DegenerateAlphabet);
        assert_eq!(HuffmanTree::<char>::from_symbols("".chars()).unwrap_err(), CodecError::EmptyAlphabet);
    }

    #[test]
    fn deep_and_saturated_trees() {
        // powers of two make every merge include the previous internal node
        let deep = FrequencyTable::with_counts((0..64u32).map(|i| (i, 1u64 << i)));
        let tree = HuffmanTree::from_frequencies(&deep).unwrap();
        assert_eq!(tree.depth(), 63);
        assert_eq!(tree.weight(), u64::MAX);
        assert_eq!(tree.code_of(&0), Some((0..63).map(|_| false).collect()));
        // equal weights are merged in the order of arrival, which gives a balanced tree
        let saturated = FrequencyTable::with_counts((0..200u32).map(|i| (i, u64::MAX)));
        assert_eq!(HuffmanTree::from_frequencies(&saturated).unwrap().depth(), 8);
    }
}
