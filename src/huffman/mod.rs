//! Standalone canonical Huffman coding: `compress`/`expand` round-trip a byte
//! slice through the tree builder (`tree`), the length limiter (`limiter`) and
//! the canonical code/decoder (`canonical`), wrapped in a self-contained
//! bitstream.
//!
//! The length table itself is transmitted meta-Huffman-coded: the 16 possible
//! code lengths (0..15) get their own length-limited canonical code, capped
//! at `META_MAX_LEN` bits so each meta-length fits the format's fixed 3-bit
//! field, and that meta-code then encodes the real 256-entry table.

pub mod canonical;
pub mod limiter;
pub mod tree;

use crate::bits::{BitReader, BitWriter};
use crate::Error;
use canonical::{CanonicalCode, Decoder};

/// Bound on the meta-code used to transmit the length table itself: its
/// lengths are stored in fixed 3-bit fields, so none may exceed 7.
const META_MAX_LEN: u8 = 7;

/// Bound enforced on the payload alphabet's own code lengths. The decoder's
/// `num_codes_of_length`/`base` tables are fixed at 16 entries, so this is
/// the format's real ceiling regardless of what a caller requests;
/// `max_code_length == 0` ("no limit") degenerates to this bound rather than
/// truly unlimited, since an unlimited code over a 256-symbol alphabet could
/// in principle exceed it.
const FORMAT_MAX_LEN: u8 = 15;

/// Compresses `data` with a length-limited (to 15 bits) canonical Huffman
/// code over byte values.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    compress_with_limit(data, FORMAT_MAX_LEN)
}

/// As `compress`, but with an explicit code-length bound (`0` behaves like
/// the format ceiling of 15; see `FORMAT_MAX_LEN`).
pub fn compress_with_limit(data: &[u8], max_code_length: u8) -> Result<Vec<u8>, Error> {
    if data.len() < 2 {
        return Err(Error::InputTooSmall);
    }
    let limit = if max_code_length == 0 { FORMAT_MAX_LEN } else { max_code_length.min(FORMAT_MAX_LEN) };

    let mut freq = [0u32; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    let mut pairs = tree::build_unlimited(&freq);
    limiter::limit(&mut pairs, limit);

    let mut lengths = vec![0u8; 256];
    for &(symbol, length) in &pairs {
        lengths[symbol as usize] = length as u8;
    }

    log::debug!("huffman compress: {} used symbols, max length {}", pairs.len(), limit);

    let code = CanonicalCode::assign(&lengths);
    let mut w = BitWriter::new();
    write_length_table(&mut w, &lengths);
    w.add_value((data.len() & 0xFF) as u32, 8);
    w.add_value(((data.len() >> 8) & 0xFF) as u32, 8);
    for &b in data {
        w.add_huffman_code(code.stored(b as usize));
    }
    Ok(w.into_bytes())
}

/// Expands a stream produced by `compress`/`compress_with_limit`.
pub fn expand(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut r = BitReader::new(data);
    let lengths = read_length_table(&mut r, 256)?;
    let decoder = Decoder::build(&lengths);

    let lo = r.get_value(8)? as usize;
    let hi = r.get_value(8)? as usize;
    let source_len = lo | (hi << 8);

    let mut out = Vec::with_capacity(source_len);
    for _ in 0..source_len {
        out.push(decoder.decode(&mut r)? as u8);
    }
    Ok(out)
}

/// Writes `lengths` (one entry per payload symbol, 0 meaning unused) as a
/// meta-Huffman-coded table: 16 fixed 3-bit fields giving the meta-code's own
/// lengths, then one meta-code per payload symbol.
pub(crate) fn write_length_table(w: &mut BitWriter, lengths: &[u8]) {
    let mut meta_freq = [0u32; 16];
    for &length in lengths {
        meta_freq[length as usize] += 1;
    }
    let mut meta_pairs = tree::build_unlimited(&meta_freq);
    limiter::limit(&mut meta_pairs, META_MAX_LEN);

    let mut meta_lengths = [0u8; 16];
    for &(symbol, length) in &meta_pairs {
        meta_lengths[symbol as usize] = length as u8;
    }
    for &length in &meta_lengths {
        w.add_value(length as u32, 3);
    }

    let meta_code = CanonicalCode::assign(&meta_lengths);
    for &length in lengths {
        w.add_huffman_code(meta_code.stored(length as usize));
    }
}

/// Reads a table written by `write_length_table`, for an alphabet of
/// `alphabet_size` symbols.
pub(crate) fn read_length_table(r: &mut BitReader, alphabet_size: usize) -> Result<Vec<u8>, Error> {
    let mut meta_lengths = vec![0u8; 16];
    for entry in meta_lengths.iter_mut() {
        *entry = r.get_value(3)? as u8;
    }
    let meta_decoder = Decoder::build(&meta_lengths);

    let mut lengths = vec![0u8; alphabet_size];
    for entry in lengths.iter_mut() {
        let length = meta_decoder.decode(r)?;
        if length > FORMAT_MAX_LEN as u16 {
            return Err(Error::MalformedValue);
        }
        *entry = length as u8;
    }
    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_then_expand_is_the_identity() {
        let data = b"the cat sat on the mat singinginging";
        let compressed = compress(data).unwrap();
        let expanded = expand(&compressed).unwrap();
        assert_eq!(expanded, data.to_vec());
    }

    #[test]
    fn every_byte_value_round_trips() {
        let data: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
        let compressed = compress(&data).unwrap();
        assert_eq!(expand(&compressed).unwrap(), data);
    }

    #[test]
    fn single_repeated_byte_round_trips() {
        let data = vec![b'z'; 64];
        let compressed = compress(&data).unwrap();
        assert_eq!(expand(&compressed).unwrap(), data);
    }

    #[test]
    fn length_limited_compression_respects_the_bound() {
        let data = b"the cat sat on the mat singinginging".repeat(3);
        let compressed = compress_with_limit(&data, 4).unwrap();
        let expanded = expand(&compressed).unwrap();
        assert_eq!(expanded, data);
    }

    #[test]
    fn too_small_input_is_rejected() {
        assert_eq!(compress(&[]).unwrap_err(), Error::InputTooSmall);
        assert_eq!(compress(&[7]).unwrap_err(), Error::InputTooSmall);
    }

    #[test]
    fn truncated_stream_errors_instead_of_panicking() {
        let data = b"the cat sat on the mat singinginging";
        let mut compressed = compress(data).unwrap();
        compressed.truncate(compressed.len() / 3);
        assert!(expand(&compressed).is_err());
    }
}
