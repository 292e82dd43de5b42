//! Optimal LZ77-style compression: `compress`/`expand` round-trip a byte
//! slice through the parser (`parser`) and the bitstream codec (`codec`).

pub mod codec;
pub mod parser;

pub use parser::{LzItem, LzResult};

use crate::Error;

/// Compresses `data` with the optimal parser, sweeping all eight fixed-bit
/// offset widths and keeping the cheapest result.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let result = parser::parse(data)?;
    Ok(codec::serialise(&result))
}

/// Expands a stream produced by `compress`.
pub fn expand(data: &[u8]) -> Result<Vec<u8>, Error> {
    codec::deserialise(data)
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
    fn compression_actually_shrinks_repetitive_input() {
        let data = vec![b'x'; 1000];
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len() / 4);
        assert_eq!(expand(&compressed).unwrap(), data);
    }

    #[test]
    fn too_small_input_is_rejected() {
        assert_eq!(compress(&[]).unwrap_err(), Error::InputTooSmall);
        assert_eq!(compress(&[7]).unwrap_err(), Error::InputTooSmall);
    }
}
