//! Two-byte-key sequence index and the back-reference enumeration built on it.

use crate::token::Token;
use crate::Error;

/// Maps every 16-bit byte-pair value appearing in the source to the ordered
/// list of positions where that pair begins. Purely scratch state: consumed
/// immediately by `RefTable::build` and then dropped — ordinary `Vec`
/// ownership gives the same "bulk free, no per-object finalisation" property
/// a bump-allocated arena would.
struct SequenceIndex {
    buckets: Vec<Vec<u32>>,
}

impl SequenceIndex {
    fn build(data: &[u8]) -> Self {
        let mut buckets = vec![Vec::new(); 1 << 16];
        for i in 0..data.len().saturating_sub(1) {
            let key = data[i] as usize | ((data[i + 1] as usize) << 8);
            buckets[key].push(i as u32);
        }
        Self { buckets }
    }

    fn occurrences(&self, key: usize) -> &[u32] {
        &self.buckets[key]
    }
}

/// `position → ordered list of Token`: one literal followed by references in
/// strictly increasing length (shorter-but-farther references are dominated
/// and omitted; the optimal parser synthesises shorter prefixes itself).
pub struct RefTable {
    /// `ranges[i]` indexes into `tokens` for position `i`.
    ranges: Vec<(u32, u32)>,
    tokens: Vec<Token>,
}

impl RefTable {
    pub fn build(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 2 {
            return Err(Error::InputTooSmall);
        }
        let index = SequenceIndex::build(data);

        let mut ranges = Vec::with_capacity(data.len());
        let mut tokens = Vec::with_capacity(data.len() * 2);

        for i in 0..data.len() {
            let start = tokens.len() as u32;
            tokens.push(Token::Literal(data[i]));

            if i < data.len() - 1 {
                let key = data[i] as usize | ((data[i + 1] as usize) << 8);
                let occurrences = index.occurrences(key);
                let here = occurrences
                    .iter()
                    .position(|&p| p as usize == i)
                    .expect("current position must be indexed under its own key");

                let max_len = std::cmp::min(data.len() - i, 256);
                let mut best_len = 1usize;

                for &earlier in occurrences[..here].iter().rev() {
                    let j = earlier as usize;
                    let mut len = 1usize;
                    while len < max_len && data[i + len] == data[j + len] {
                        len += 1;
                        if len > best_len {
                            tokens.push(Token::reference((i - j) as u16, len));
                            best_len = len;
                        }
                    }
                }
            }

            let end = tokens.len() as u32;
            ranges.push((start, end));
        }

        log::debug!("built reference table over {} bytes, {} candidate tokens", data.len(), tokens.len());
        Ok(Self { ranges, tokens })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn tokens_at(&self, position: usize) -> &[Token] {
        let (start, end) = self.ranges[position];
        &self.tokens[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs_for(s: &str) -> RefTable {
        RefTable::build(s.as_bytes()).expect("build failed")
    }

    #[test]
    fn repeating_triplet_enumerates_every_dominating_length() {
        // "abcabcabc": at position 3 the whole remaining "abcabc" matches the
        // run starting at 0, so every length from 2 up to the 6-byte maximum
        // is a strictly longer (and therefore non-dominated) reference.
        let refs = refs_for("abcabcabc");

        let at3: Vec<_> = refs.tokens_at(3).iter().filter(|t| !t.is_literal()).collect();
        assert_eq!(
            at3,
            vec![
                &Token::reference(3, 2),
                &Token::reference(3, 3),
                &Token::reference(3, 4),
                &Token::reference(3, 5),
                &Token::reference(3, 6),
            ]
        );

        // at position 6 only 3 bytes remain, and the nearer match (offset 3)
        // already reaches that length, so the farther match (offset 6) is
        // dominated at every length it could offer and contributes nothing.
        let at6: Vec<_> = refs.tokens_at(6).iter().filter(|t| !t.is_literal()).collect();
        assert_eq!(at6, vec![&Token::reference(3, 2), &Token::reference(3, 3)]);
    }

    #[test]
    fn every_reference_is_a_genuine_match() {
        let data = b"abracadabra abracadabra banana banana".to_vec();
        let refs = RefTable::build(&data).unwrap();
        for i in 0..data.len() {
            for t in refs.tokens_at(i) {
                if let Token::Reference { offset, length_minus_one } = t {
                    let off = *offset as usize;
                    let len = *length_minus_one as usize + 1;
                    assert!(off <= i);
                    assert!(i + len <= data.len());
                    assert_eq!(&data[i..i + len], &data[i - off..i - off + len]);
                }
            }
        }
    }

    #[test]
    fn references_strictly_increase_in_length() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec();
        let refs = RefTable::build(&data).unwrap();
        for i in 0..data.len() {
            let tokens = refs.tokens_at(i);
            assert!(tokens[0].is_literal());
            let mut prev_len = 1;
            for t in &tokens[1..] {
                assert!(t.length() > prev_len);
                prev_len = t.length();
            }
        }
    }

    #[test]
    fn too_small_input_is_rejected() {
        assert_eq!(RefTable::build(&[]).unwrap_err(), Error::InputTooSmall);
        assert_eq!(RefTable::build(&[1]).unwrap_err(), Error::InputTooSmall);
    }
}
