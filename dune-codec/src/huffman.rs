//! Canonical Huffman coding for DuneArc.
//!
//! Only `(symbol, length)` pairs are stored. Sorted by length then symbol,
//! they regenerate the exact bit patterns: the first code is all zeros, each
//! following code is the previous one plus one, shifted left whenever the
//! length grows.
//!
//! Trees and decode tries live in flat arenas addressed by integer handles
//! and are walked with explicit stacks.

use dune_core::bitstream::{MsbBitReader, MsbBitWriter};
use dune_core::error::{DuneError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Maximum code length accepted in a table.
pub const MAX_CODE_LEN: u8 = 64;

/// One entry of a canonical code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeEntry {
    /// Coded byte value.
    pub symbol: u8,
    /// Code length in bits.
    pub length: u8,
}

impl CodeEntry {
    /// Create a table entry.
    pub fn new(symbol: u8, length: u8) -> Self {
        Self { symbol, length }
    }
}

/// A symbol's canonical bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalCode {
    /// Coded byte value.
    pub symbol: u8,
    /// Code bits, right-aligned.
    pub code: u64,
    /// Code length in bits.
    pub length: u8,
}

/// Canonical code table: entries in (length, symbol) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

impl CodeTable {
    /// Build a table from arbitrary (symbol, length) pairs, sorting them
    /// into canonical order.
    pub fn from_lengths(mut entries: Vec<CodeEntry>) -> Self {
        entries.sort_by_key(|e| (e.length, e.symbol));
        Self { entries }
    }

    /// Wrap entries exactly as stored; they are validated when codes are derived.
    pub fn from_stored(entries: Vec<CodeEntry>) -> Self {
        Self { entries }
    }

    /// Table entries in stored order.
    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    /// Number of coded symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table codes no symbols.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Code lengths in ascending order.
    pub fn lengths(&self) -> Vec<u8> {
        let mut lengths: Vec<u8> = self.entries.iter().map(|e| e.length).collect();
        lengths.sort_unstable();
        lengths
    }

    /// Derive the canonical bit pattern of every entry.
    ///
    /// Fails on a zero or over-long length, entries out of canonical order,
    /// duplicate symbols, or lengths that cannot form a prefix code.
    pub fn canonical_codes(&self) -> Result<Vec<CanonicalCode>> {
        let mut codes = Vec::with_capacity(self.entries.len());
        let mut seen = [false; 256];
        let mut code = 0u128;
        let mut prev: Option<CodeEntry> = None;

        for &entry in &self.entries {
            if entry.length == 0 || entry.length > MAX_CODE_LEN {
                return Err(DuneError::InvalidCodeLength {
                    symbol: entry.symbol,
                    length: entry.length,
                });
            }
            if std::mem::replace(&mut seen[entry.symbol as usize], true) {
                return Err(DuneError::invalid_table(format!(
                    "duplicate symbol {}",
                    entry.symbol
                )));
            }

            let prev_len = match prev {
                Some(p) => {
                    if (p.length, p.symbol) > (entry.length, entry.symbol) {
                        return Err(DuneError::invalid_table(
                            "entries not sorted by (length, symbol)",
                        ));
                    }
                    code += 1;
                    p.length
                }
                None => 0,
            };

            // code <= 2^prev_len here, so the shifted value stays within 2^64
            code <<= entry.length - prev_len;
            if code >= 1u128 << entry.length {
                return Err(DuneError::invalid_table(format!(
                    "over-subscribed at symbol {} (length {})",
                    entry.symbol, entry.length
                )));
            }

            codes.push(CanonicalCode {
                symbol: entry.symbol,
                code: code as u64,
                length: entry.length,
            });
            prev = Some(entry);
        }

        Ok(codes)
    }
}

/// Node of the frequency tree.
#[derive(Debug, Clone, Copy)]
enum TreeNode {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// Huffman tree in arena form.
#[derive(Debug)]
struct HuffmanTree {
    nodes: Vec<TreeNode>,
    root: usize,
}

impl HuffmanTree {
    /// Build a tree from symbol frequencies; `None` when every frequency is zero.
    ///
    /// The two lowest-frequency nodes are merged first, the first taken
    /// becoming the left child. Equal frequencies are resolved by arena
    /// handle: leaves are allocated first in ascending symbol order, and
    /// merged nodes are allocated as they are created.
    fn build(freqs: &[u64; 256]) -> Option<Self> {
        let mut nodes = Vec::with_capacity(511);
        let mut heap = BinaryHeap::new();

        for (symbol, &freq) in freqs.iter().enumerate() {
            if freq > 0 {
                heap.push(Reverse((freq, nodes.len())));
                nodes.push(TreeNode::Leaf(symbol as u8));
            }
        }

        while heap.len() > 1 {
            let (Some(Reverse((f1, left))), Some(Reverse((f2, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            heap.push(Reverse((f1 + f2, nodes.len())));
            nodes.push(TreeNode::Internal { left, right });
        }

        let Reverse((_, root)) = heap.pop()?;
        Some(Self { nodes, root })
    }

    /// Depth of every leaf, found by a depth-first walk ("0" left, "1" right).
    ///
    /// Only depths survive canonicalization. A lone leaf has depth zero and
    /// is given length 1.
    fn code_lengths(&self) -> Result<Vec<CodeEntry>> {
        let mut entries = Vec::with_capacity(256);
        let mut stack = vec![(self.root, 0usize)];

        while let Some((handle, depth)) = stack.pop() {
            match self.nodes[handle] {
                TreeNode::Leaf(symbol) => {
                    let length = depth.max(1);
                    if length > MAX_CODE_LEN as usize {
                        return Err(DuneError::InvalidCodeLength {
                            symbol,
                            length: length.min(u8::MAX as usize) as u8,
                        });
                    }
                    entries.push(CodeEntry::new(symbol, length as u8));
                }
                TreeNode::Internal { left, right } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        Ok(entries)
    }
}

/// Compute code lengths for `data` and canonicalize them.
pub fn build_table(data: &[u8]) -> Result<CodeTable> {
    let mut freqs = [0u64; 256];
    for &byte in data {
        freqs[byte as usize] += 1;
    }

    match HuffmanTree::build(&freqs) {
        Some(tree) => Ok(CodeTable::from_lengths(tree.code_lengths()?)),
        None => Ok(CodeTable::default()),
    }
}

/// Encode `data`, returning the packed bits and the canonical table.
pub fn encode(data: &[u8]) -> Result<(Vec<u8>, CodeTable)> {
    let table = build_table(data)?;

    let mut lookup = [(0u64, 0u8); 256];
    for code in table.canonical_codes()? {
        lookup[code.symbol as usize] = (code.code, code.length);
    }

    let mut writer = MsbBitWriter::with_capacity(data.len() / 2 + 1);
    for &byte in data {
        let (code, length) = lookup[byte as usize];
        writer.write_bits(code, length);
    }

    Ok((writer.finish(), table))
}

/// Arena handle of the trie root.
const ROOT: usize = 0;

/// Marker for a missing child; the root is never a child.
const NO_CHILD: usize = 0;

/// Binary decoding trie rebuilt from a code table.
#[derive(Debug)]
struct DecodeTrie {
    children: Vec<[usize; 2]>,
    symbols: Vec<Option<u8>>,
}

impl DecodeTrie {
    fn build(table: &CodeTable) -> Result<Self> {
        let mut trie = Self {
            children: vec![[NO_CHILD; 2]],
            symbols: vec![None],
        };

        for code in table.canonical_codes()? {
            let mut node = ROOT;
            for shift in (0..code.length).rev() {
                if trie.symbols[node].is_some() {
                    return Err(DuneError::invalid_table("code is not prefix-free"));
                }
                let bit = ((code.code >> shift) & 1) as usize;
                if trie.children[node][bit] == NO_CHILD {
                    trie.children[node][bit] = trie.children.len();
                    trie.children.push([NO_CHILD; 2]);
                    trie.symbols.push(None);
                }
                node = trie.children[node][bit];
            }
            if trie.symbols[node].is_some() || trie.children[node] != [NO_CHILD; 2] {
                return Err(DuneError::invalid_table("code is not prefix-free"));
            }
            trie.symbols[node] = Some(code.symbol);
        }

        Ok(trie)
    }
}

/// Decode exactly `symbol_count` symbols from `packed`.
///
/// Bits after the last symbol (byte padding) are ignored.
pub fn decode(packed: &[u8], table: &CodeTable, symbol_count: usize) -> Result<Vec<u8>> {
    let trie = DecodeTrie::build(table)?;
    if symbol_count == 0 {
        return Ok(Vec::new());
    }

    let mut reader = MsbBitReader::new(packed);
    // Every symbol costs at least one bit
    let mut output = Vec::with_capacity(symbol_count.min(packed.len().saturating_mul(8)));
    let mut node = ROOT;

    while output.len() < symbol_count {
        let Some(bit) = reader.next_bit() else {
            return Err(DuneError::count_mismatch(symbol_count, output.len()));
        };

        let next = trie.children[node][bit as usize];
        if next == NO_CHILD {
            return Err(DuneError::invalid_huffman(reader.bit_position() - 1));
        }

        match trie.symbols[next] {
            Some(symbol) => {
                output.push(symbol);
                node = ROOT;
            }
            None => node = next,
        }
    }

    Ok(output)
}
