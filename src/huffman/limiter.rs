//! Kraft-inequality length limiting: clamp to `L`, then lengthen
//! front-to-back to restore the inequality, then shorten back-to-front to
//! saturate whatever slack remains.

/// Limits `pairs`' lengths (as produced by `tree::build_unlimited`) to `l`
/// bits, in place. A no-op when `l == 0` (no limit) or fewer than two
/// symbols are present (nothing to balance).
pub fn limit(pairs: &mut [(u16, u16)], l: u8) {
    if l == 0 || pairs.len() < 2 {
        return;
    }
    // the clamp/lengthen/shorten passes are order-sensitive — they operate
    // on the leaf-ordered-by-length view, not the ascending-frequency order
    // `tree::build_unlimited` returns.
    pairs.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let l = l as u32;
    let max_k: u64 = 1u64 << l;

    for p in pairs.iter_mut() {
        if p.1 as u32 > l {
            p.1 = l as u16;
        }
    }
    let mut k: u64 = pairs.iter().map(|&(_, len)| 1u64 << (l - len as u32)).sum();

    if k >= max_k {
        for p in pairs.iter_mut() {
            while (p.1 as u32) < l && k >= max_k {
                k -= 1u64 << (l - p.1 as u32);
                p.1 += 1;
                k += 1u64 << (l - p.1 as u32);
            }
            if k < max_k {
                break;
            }
        }
    }

    for p in pairs.iter_mut().rev() {
        while p.1 > 1 {
            let old = 1u64 << (l - p.1 as u32);
            let new_len = p.1 as u32 - 1;
            let new = 1u64 << (l - new_len);
            let candidate = k - old + new;
            if candidate < max_k {
                k = candidate;
                p.1 -= 1;
            } else {
                break;
            }
        }
    }

    debug_assert!(k <= max_k);
    debug_assert!(pairs.iter().all(|&(_, len)| len as u32 <= l));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::tree::build_unlimited;

    fn freq_from(pairs: &[(u8, u32)]) -> Vec<u32> {
        let mut freq = vec![0u32; 256];
        for &(symbol, f) in pairs {
            freq[symbol as usize] = f;
        }
        freq
    }

    #[test]
    fn pinned_frequency_table_limited_to_four_bits() {
        let freq = freq_from(&[
            (b' ', 5),
            (b't', 5),
            (b'a', 3),
            (b'e', 2),
            (b'h', 2),
            (b'c', 1),
            (b'm', 1),
            (b'n', 1),
            (b'o', 1),
            (b's', 1),
        ]);
        let mut pairs = build_unlimited(&freq);
        limit(&mut pairs, 4);
        pairs.sort_by_key(|&(s, _)| s);
        let lengths: std::collections::HashMap<u8, u16> =
            pairs.iter().map(|&(s, l)| (s as u8, l)).collect();

        assert_eq!(lengths[&b't'], 2);
        assert_eq!(lengths[&b' '], 3);
        assert_eq!(lengths[&b'a'], 3);
        for &sym in &[b'e', b'h', b'n', b'o', b's', b'c', b'm'] {
            assert_eq!(lengths[&sym], 4);
        }
    }

    #[test]
    fn kraft_inequality_holds_after_limiting() {
        let freq = freq_from(&(0u8..=200).map(|b| (b, 1u32)).collect::<Vec<_>>());
        let mut pairs = build_unlimited(&freq);
        limit(&mut pairs, 8);
        let k: u64 = pairs.iter().map(|&(_, len)| 1u64 << (8 - len as u32)).sum();
        assert!(k <= 1u64 << 8);
        assert!(pairs.iter().all(|&(_, len)| len <= 8));
    }
}
