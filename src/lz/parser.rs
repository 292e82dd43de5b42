//! The optimal LZ77-style parser: an exact dynamic program over a
//! pre-enumerated reference table, swept across all eight fixed-bit offset
//! widths.

use crate::refs::RefTable;
use crate::token::Token;
use crate::Error;

fn bit_width(v: u32) -> u32 {
    debug_assert!(v > 0);
    32 - v.leading_zeros()
}

/// Elias-gamma bit cost of `v ∈ [1, 256]`.
fn egc(v: u32) -> u32 {
    debug_assert!((1..=256).contains(&v));
    2 * bit_width(v) - 1
}

/// Hybrid-code bit cost: Elias-gamma of the high bits plus `k` raw low bits.
fn hybrid_cost(v: u32, k: u32) -> u32 {
    egc((v >> k) + 1) + k
}

/// Cost of a block's run-length prefix; the end-of-stream sentinel (tally 0)
/// costs nothing.
fn tally_cost(tally: u16) -> u32 {
    if tally == 0 {
        0
    } else {
        egc(tally as u32)
    }
}

fn token_cost(token: &Token, k: u32) -> u32 {
    match token {
        Token::Literal(_) => 8,
        Token::Reference { offset, length_minus_one } => {
            hybrid_cost(*offset as u32 - 1, k) + egc(*length_minus_one as u32)
        }
    }
}

/// One item of the chosen parse: the token at this position, and the
/// forward run-length of same-typed tokens starting here (meaningful only
/// at block heads — see `super::codec`).
#[derive(Clone, Copy, Debug)]
pub struct LzItem {
    pub token: Token,
    pub tally: u16,
}

pub struct LzResult {
    pub items: Vec<LzItem>,
    pub num_fixed_bits: u8,
}

#[derive(Clone, Copy)]
struct Best {
    token: Option<Token>,
    tally: u16,
    total_cost: u32,
}

const UNRESOLVED: Best = Best { token: None, tally: 0, total_cost: u32::MAX };

fn parse_with_k(data: &[u8], refs: &RefTable, k: u32) -> (Vec<Best>, u32) {
    let n = data.len();
    let mut best = vec![UNRESOLVED; n + 1];
    best[n] = Best { token: None, tally: 0, total_cost: 0 };
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
                    let next_same_type = next.token.map_or(false, |nt| candidate.same_type(&nt));
                    let new_tally = if next_same_type { (next.tally % 256) + 1 } else { 1 };
                    let cost = token_cost(&candidate, k) + tally_cost(new_tally) + next.total_cost
                        - tally_cost(next.tally);
                    if cost < best[i].total_cost {
                        best[i] = Best { token: Some(candidate), tally: new_tally, total_cost: cost };
                    }
                }
                if len == min_len {
                    break;
                }
                len -= 1;
            }
        }
    }

    let total_cost = best[0].total_cost;
    (best, total_cost)
}

fn trace(best: &[Best], n: usize) -> Vec<LzItem> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < n {
        let cell = best[i];
        let token = cell.token.expect("every reachable position has a resolved token");
        let len = token.length();
        items.push(LzItem { token, tally: cell.tally });
        i += len;
    }
    items
}

/// Runs the optimal parse over `data`, sweeping `num_fixed_bits ∈ 1..=8` and
/// keeping the cheapest encoding overall.
pub fn parse(data: &[u8]) -> Result<LzResult, Error> {
    let refs = RefTable::build(data)?;

    let mut winner: Option<(u8, Vec<Best>, u32)> = None;
    for k in 1..=8u32 {
        let (best, cost) = parse_with_k(data, &refs, k);
        log::trace!("lz parse: num_fixed_bits={k} total_cost={cost} bits");
        if winner.as_ref().map_or(true, |(_, _, best_cost)| cost < *best_cost) {
            winner = Some((k as u8, best, cost));
        }
    }
    let (num_fixed_bits, best, total_cost) = winner.expect("k sweeps 1..=8, never empty");
    log::debug!("lz parse chose num_fixed_bits={num_fixed_bits} total_cost={total_cost} bits");

    let items = trace(&best, data.len());
    Ok(LzResult { items, num_fixed_bits })
}
