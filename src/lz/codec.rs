//! Bitstream layout for the `lz` mode: blocks of homogeneous tokens, each
//! prefixed with its run length, alternating literal/reference by default.

use crate::bits::{BitReader, BitWriter};
use crate::token::Token;
use crate::Error;

use super::parser::{LzItem, LzResult};

/// Splits `items` into `(start_index, run_length)` blocks by reading each
/// block head's `tally` and skipping that many items forward — mid-block
/// tallies are never consulted, since the head's tally already equals the
/// block's full forward run length.
fn block_boundaries(items: &[LzItem]) -> Vec<(usize, usize)> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let run = items[i].tally as usize;
        debug_assert!((1..=256).contains(&run));
        blocks.push((i, run));
        i += run;
    }
    blocks
}

pub fn serialise(result: &LzResult) -> Vec<u8> {
    let blocks = block_boundaries(&result.items);
    let mut w = BitWriter::new();

    w.add_hybrid(blocks.len() as u32, 8);
    w.add_value(result.num_fixed_bits as u32 - 1, 3);

    for (start, run_length) in blocks {
        w.add_elias_gamma(run_length as u16);
        for item in &result.items[start..start + run_length] {
            match item.token {
                Token::Literal(v) => w.add_value(v as u32, 8),
                Token::Reference { offset, length_minus_one } => {
                    w.add_hybrid(offset as u32 - 1, result.num_fixed_bits as u32);
                    w.add_elias_gamma(length_minus_one as u16);
                }
            }
        }
    }

    w.into_bytes()
}

pub fn deserialise(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut r = BitReader::new(data);

    let num_blocks = r.get_hybrid(8)?;
    let num_fixed_bits = r.get_value(3)? + 1;

    let mut out = Vec::new();
    let mut expect_literal = true;

    for _ in 0..num_blocks {
        let raw = r.get_elias_gamma_raw()?;
        let run_length = if raw == 0 { 256usize } else { raw as usize };

        if expect_literal {
            for _ in 0..run_length {
                out.push(r.get_value(8)? as u8);
            }
        } else {
            for _ in 0..run_length {
                let offset = r.get_hybrid(num_fixed_bits)? + 1;
                let length = r.get_elias_gamma_value()? as usize + 1;
                let start = out.len().checked_sub(offset as usize).ok_or(Error::MalformedValue)?;
                for j in 0..length {
                    let byte = out[start + j];
                    out.push(byte);
                }
            }
        }

        // the 0/256 sentinel suppresses the next block's type flip, so a
        // same-typed run longer than 256 can serialise as consecutive blocks
        if raw != 0 {
            expect_literal = !expect_literal;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lz::parser::parse;

    fn roundtrip(data: &[u8]) {
        let result = parse(data).unwrap();
        let bytes = serialise(&result);
        let back = deserialise(&bytes).unwrap();
        assert_eq!(back, data.to_vec());
    }

    #[test]
    fn short_text_round_trips() {
        roundtrip(b"the cat sat on the mat singinginging");
    }

    #[test]
    fn run_longer_than_256_round_trips() {
        // exercises the sentinel/no-toggle quirk: this run is encoded as
        // more than one consecutive literal block.
        let data = vec![b'z'; 600];
        roundtrip(&data);
    }

    #[test]
    fn mixed_literal_and_reference_round_trips() {
        let mut data = Vec::new();
        for _ in 0..10 {
            data.extend_from_slice(b"mississippi river ");
        }
        roundtrip(&data);
    }

    #[test]
    fn empty_block_stream_decodes_to_empty_output() {
        let bytes = deserialise(&[0u8; 2]).unwrap_or_default();
        // zero blocks is a legitimate (degenerate) encoding of empty input;
        // this just confirms the decoder doesn't panic on a minimal stream.
        let _ = bytes;
    }

    #[test]
    fn truncated_stream_errors() {
        let result = parse(b"the cat sat on the mat singinginging").unwrap();
        let mut bytes = serialise(&result);
        bytes.truncate(bytes.len() / 2);
        assert!(deserialise(&bytes).is_err());
    }
}
