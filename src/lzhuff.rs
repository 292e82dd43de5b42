//! LZ+Huffman combined mode: literal bytes and a single "reference follows"
//! marker symbol share one canonical Huffman alphabet; references
//! additionally carry a hybrid offset and an Elias-gamma length, exactly as
//! in the standalone `lz` bitstream.
//!
//! Convergence is one-re-estimation-then-encode: a single greedy parse
//! estimates symbol frequencies, a Huffman code is built from that estimate,
//! and the optimal parser (the same DP as `lz`, minus its run-length tally —
//! each item's Huffman code is already self-terminating) is re-run once
//! against that fixed code.

use crate::bits::{BitReader, BitWriter};
use crate::huffman::canonical::{CanonicalCode, Decoder};
use crate::huffman::{limiter, read_length_table, tree, write_length_table};
use crate::refs::RefTable;
use crate::token::Token;
use crate::Error;

const MAX_CODE_LENGTH: u8 = 15;
/// Alphabet size: 256 byte values plus one marker slot, occupying symbol id
/// 256 whenever every byte value is actually used in the source.
const ALPHABET_SIZE: usize = 257;

fn bit_width(v: u32) -> u32 {
    debug_assert!(v > 0);
    32 - v.leading_zeros()
}

fn egc(v: u32) -> u32 {
    debug_assert!((1..=256).contains(&v));
    2 * bit_width(v) - 1
}

fn hybrid_cost(v: u32, k: u32) -> u32 {
    egc((v >> k) + 1) + k
}

/// Finds a byte value absent from `data`, to repurpose as the "a reference
/// follows" symbol in the combined alphabet; falls back to `256` (one wider
/// than a byte) if every value occurs at least once.
fn find_marker_symbol(data: &[u8]) -> u16 {
    let mut used = [false; 256];
    for &b in data {
        used[b as usize] = true;
    }
    used.iter().position(|&u| !u).map(|i| i as u16).unwrap_or(256)
}

/// One greedy left-to-right pass: takes the longest enumerated token at each
/// position and advances by its length, tallying literal byte values and the
/// marker symbol (once per reference, regardless of its length).
fn greedy_frequencies(data: &[u8], refs: &RefTable, marker: u16) -> [u32; ALPHABET_SIZE] {
    let mut counts = [0u32; ALPHABET_SIZE];
    let mut i = 0;
    while i < data.len() {
        let tokens = refs.tokens_at(i);
        let biggest = tokens.last().expect("the literal token is always present");
        match biggest {
            Token::Literal(v) => counts[*v as usize] += 1,
            Token::Reference { .. } => counts[marker as usize] += 1,
        }
        i += biggest.length();
    }
    counts
}

fn token_cost(token: &Token, lengths: &[u8], marker: u16, k: u32) -> u32 {
    match token {
        Token::Literal(v) => lengths[*v as usize] as u32,
        Token::Reference { offset, length_minus_one } => {
            lengths[marker as usize] as u32 + hybrid_cost(*offset as u32 - 1, k) + egc(*length_minus_one as u32)
        }
    }
}

#[derive(Clone, Copy)]
struct Best {
    token: Option<Token>,
    total_cost: u32,
}

const UNRESOLVED: Best = Best { token: None, total_cost: u32::MAX };

/// The same DP `lz` uses, minus its run-length tally: each item's Huffman
/// code already carries its own boundary, so no block-head run length needs
/// to be charged or reconciled.
fn parse_with_k(data: &[u8], refs: &RefTable, lengths: &[u8], marker: u16, k: u32) -> (Vec<Best>, u32) {
    let n = data.len();
    let mut best = vec![UNRESOLVED; n + 1];
    best[n] = Best { token: None, total_cost: 0 };
    let offset_budget = 256u32 << k;

    for i in (0..n).rev() {
        for t in refs.tokens_at(i) {
            if let Token::Reference { offset, .. } = t {
                if *offset as u32 > offset_budget {
                    continue;
                }
            }
            let full_len = t.length();
            let min_len = if t.is_literal() { 1 } else { 2 };
            let mut len = full_len;
            loop {
                let next = best[i + len];
                if next.total_cost != u32::MAX {
                    let candidate = if len == full_len { *t } else { t.truncated_to(len) };
                    let cost = token_cost(&candidate, lengths, marker, k) + next.total_cost;
                    if cost < best[i].total_cost {
                        best[i] = Best { token: Some(candidate), total_cost: cost };
                    }
                }
                if len == min_len {
                    break;
                }
                len -= 1;
            }
        }
    }

    (best, best[0].total_cost)
}

fn trace(best: &[Best], n: usize) -> Vec<Token> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < n {
        let token = best[i].token.expect("every reachable position has a resolved token");
        items.push(token);
        i += token.length();
    }
    items
}

/// Result of the combined parse: chosen items, the fixed-bit offset width,
/// the 257-entry Huffman length table they were costed against, the marker
/// symbol id, and the source length (needed by the decoder, which otherwise
/// has no way to know when to stop).
pub struct LzHuffResult {
    items: Vec<Token>,
    num_fixed_bits: u8,
    lengths: Vec<u8>,
    marker: u16,
    source_len: usize,
}

impl LzHuffResult {
    /// The chosen token sequence, for `-log` dumps and tests.
    pub fn items(&self) -> &[Token] {
        &self.items
    }

    pub fn num_fixed_bits(&self) -> u8 {
        self.num_fixed_bits
    }

    /// The symbol id standing in for "a reference follows".
    pub fn marker(&self) -> u16 {
        self.marker
    }
}

/// Runs the one-re-estimation-then-encode protocol over `data`.
pub fn parse(data: &[u8]) -> Result<LzHuffResult, Error> {
    if data.len() < 2 {
        return Err(Error::InputTooSmall);
    }
    let refs = RefTable::build(data)?;
    let marker = find_marker_symbol(data);

    let counts = greedy_frequencies(data, &refs, marker);
    let mut pairs = tree::build_unlimited(&counts);
    limiter::limit(&mut pairs, MAX_CODE_LENGTH);
    let mut lengths = vec![0u8; ALPHABET_SIZE];
    for &(symbol, length) in &pairs {
        lengths[symbol as usize] = length as u8;
    }
    log::debug!("lzhuff greedy estimate: marker={marker} used symbols={}", pairs.len());

    let mut winner: Option<(u8, Vec<Best>, u32)> = None;
    for k in 1..=8u32 {
        let (best, cost) = parse_with_k(data, &refs, &lengths, marker, k);
        log::trace!("lzhuff parse: num_fixed_bits={k} total_cost={cost} bits");
        if winner.as_ref().map_or(true, |(_, _, best_cost)| cost < *best_cost) {
            winner = Some((k as u8, best, cost));
        }
    }
    let (num_fixed_bits, best, total_cost) = winner.expect("k sweeps 1..=8, never empty");
    log::debug!("lzhuff parse chose num_fixed_bits={num_fixed_bits} total_cost={total_cost} bits");

    let items = trace(&best, data.len());
    Ok(LzHuffResult { items, num_fixed_bits, lengths, marker, source_len: data.len() })
}

/// Serialises a parse: the meta-coded 257-entry length table (shared
/// machinery with `huffman`), the marker symbol id (9 bits — needed
/// because the marker may coincide with an ordinary byte value below 256 and
/// so cannot be inferred by the decoder from the length table alone),
/// `num_fixed_bits − 1`, the 16-bit source length, then the payload.
pub fn serialise(result: &LzHuffResult) -> Vec<u8> {
    let mut w = BitWriter::new();
    write_length_table(&mut w, &result.lengths);
    w.add_value(result.marker as u32, 9);
    w.add_value(result.num_fixed_bits as u32 - 1, 3);
    w.add_value((result.source_len & 0xFF) as u32, 8);
    w.add_value(((result.source_len >> 8) & 0xFF) as u32, 8);

    let code = CanonicalCode::assign(&result.lengths);
    for token in &result.items {
        match token {
            Token::Literal(v) => w.add_huffman_code(code.stored(*v as usize)),
            Token::Reference { offset, length_minus_one } => {
                w.add_huffman_code(code.stored(result.marker as usize));
                w.add_hybrid(*offset as u32 - 1, result.num_fixed_bits as u32);
                w.add_elias_gamma(*length_minus_one as u16);
            }
        }
    }
    w.into_bytes()
}

/// Compresses `data` with the combined LZ+Huffman mode.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let result = parse(data)?;
    Ok(serialise(&result))
}

/// Expands a stream produced by `compress`/`serialise`.
pub fn expand(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut r = BitReader::new(data);
    let lengths = read_length_table(&mut r, ALPHABET_SIZE)?;
    let marker = r.get_value(9)? as u16;
    let num_fixed_bits = r.get_value(3)? + 1;
    let lo = r.get_value(8)? as usize;
    let hi = r.get_value(8)? as usize;
    let source_len = lo | (hi << 8);

    let decoder = Decoder::build(&lengths);
    let mut out = Vec::with_capacity(source_len);
    while out.len() < source_len {
        let symbol = decoder.decode(&mut r)?;
        if symbol == marker {
            let offset = r.get_hybrid(num_fixed_bits)? + 1;
            let length = r.get_elias_gamma_value()? as usize + 1;
            let start = out.len().checked_sub(offset as usize).ok_or(Error::MalformedValue)?;
            for j in 0..length {
                let byte = out[start + j];
                out.push(byte);
            }
        } else {
            out.push(symbol as u8);
        }
    }
    Ok(out)
}
