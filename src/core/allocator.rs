//! Note breakdown for a requested amount
//!
//! Turns an amount into the banknotes to dispense, given how many notes of each
//! denomination the reservoir currently holds.
//!
//! # Algorithm
//!
//! Denominations are visited largest first. Each step greedily takes as many
//! notes as fit, then backtracks by taking one fewer whenever the remainder
//! cannot be completed by the smaller denominations. Branches are explored
//! greedy-first and the search keeps the breakdown with the fewest notes.
//!
//! Two prunings keep the search bounded:
//! - a branch is abandoned once it cannot beat the best breakdown found so far
//! - `(depth, remainder)` pairs proven unreachable are memoized, since
//!   reachability from a state does not depend on how it was reached
//!
//! The allocator never mutates the reservoir. Reserving the notes is a separate
//! step taken by the caller.

use crate::types::{AtmError, Denomination};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// Compute the notes to dispense for `amount`
///
/// # Arguments
///
/// * `snapshot` - Available notes per denomination
/// * `amount` - Requested amount in minor units
///
/// # Returns
///
/// The notes in descending order, summing exactly to `amount`. Zero yields an
/// empty breakdown.
///
/// # Errors
///
/// - `InvalidAmount` if `amount` is negative
/// - `NoExactChange` if no combination of the available notes sums to `amount`
pub fn allocate(
    snapshot: &BTreeMap<Denomination, u32>,
    amount: Decimal,
) -> Result<Vec<Denomination>, AtmError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AtmError::invalid_amount(amount));
    }
    if amount.is_zero() {
        return Ok(Vec::new());
    }
    if !amount.fract().is_zero() {
        return Err(AtmError::no_exact_change(amount));
    }
    let target = amount
        .to_u64()
        .ok_or_else(|| AtmError::no_exact_change(amount))?;

    let stock: Vec<(Denomination, u32)> = snapshot
        .iter()
        .rev()
        .filter(|(_, count)| **count > 0)
        .map(|(denomination, count)| (*denomination, *count))
        .collect();

    // Every sum of notes is a multiple of the denominations' common divisor.
    // With the standard notes that divisor is the smallest denomination.
    let divisor = stock
        .iter()
        .map(|(denomination, _)| u64::from(denomination.value()))
        .reduce(gcd)
        .ok_or_else(|| AtmError::no_exact_change(amount))?;
    if target % divisor != 0 {
        return Err(AtmError::no_exact_change(amount));
    }

    let mut search = Search::new(&stock);
    search.explore(0, target, 0);

    let taken = search
        .best
        .ok_or_else(|| AtmError::no_exact_change(amount))?
        .1;

    Ok(stock
        .iter()
        .zip(taken)
        .flat_map(|((denomination, _), count)| {
            std::iter::repeat(*denomination).take(count as usize)
        })
        .collect())
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Depth-first search state over denominations sorted descending
struct Search<'a> {
    stock: &'a [(Denomination, u32)],
    /// Total value available from each depth onward
    reachable_value: Vec<u64>,
    dead_ends: HashSet<(usize, u64)>,
    taken: Vec<u32>,
    /// Fewest notes found so far, with the per-denomination counts
    best: Option<(u64, Vec<u32>)>,
}

impl<'a> Search<'a> {
    fn new(stock: &'a [(Denomination, u32)]) -> Self {
        let mut reachable_value = vec![0u64; stock.len() + 1];
        for (index, (denomination, count)) in stock.iter().enumerate().rev() {
            reachable_value[index] = reachable_value[index + 1]
                .saturating_add(u64::from(denomination.value()) * u64::from(*count));
        }

        Self {
            stock,
            reachable_value,
            dead_ends: HashSet::new(),
            taken: vec![0; stock.len()],
            best: None,
        }
    }

    /// Returns false only when `remaining` is proven unreachable from `depth`
    fn explore(&mut self, depth: usize, remaining: u64, notes_used: u64) -> bool {
        if remaining == 0 {
            let better = self
                .best
                .as_ref()
                .map_or(true, |(best_notes, _)| notes_used < *best_notes);
            if better {
                self.best = Some((notes_used, self.taken.clone()));
            }
            return true;
        }
        if depth == self.stock.len() || remaining > self.reachable_value[depth] {
            return false;
        }
        if self.dead_ends.contains(&(depth, remaining)) {
            return false;
        }

        let (denomination, available) = self.stock[depth];
        let value = u64::from(denomination.value());

        // Smaller notes only add to the count, so this is a lower bound
        if let Some((best_notes, _)) = &self.best {
            if notes_used + remaining.div_ceil(value) >= *best_notes {
                return true;
            }
        }

        let max_take = u64::from(available).min(remaining / value);
        let mut reachable = false;
        for take in (0..=max_take).rev() {
            self.taken[depth] = take as u32;
            reachable |= self.explore(depth + 1, remaining - take * value, notes_used + take);
        }
        self.taken[depth] = 0;

        if !reachable {
            self.dead_ends.insert((depth, remaining));
        }
        reachable
    }
}
