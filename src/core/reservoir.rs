//! The machine's banknote reservoir
//!
//! Holds the number of notes available per denomination. A single mutex guards
//! the whole map, so a reservation or restock touching several denominations
//! is applied all at once and never observed half-done.

use crate::types::{count_notes, AtmError, Denomination};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Banknote reservoir shared by one or more machines
#[derive(Debug, Default)]
pub struct CashReservoir {
    notes: Mutex<BTreeMap<Denomination, u32>>,
}

impl CashReservoir {
    /// Empty reservoir accepting no denominations
    pub fn new() -> Self {
        Self::default()
    }

    /// Reservoir loaded with the given counts
    ///
    /// Every listed denomination is accepted by the machine, even when its
    /// count is zero.
    pub fn with_notes<I>(notes: I) -> Self
    where
        I: IntoIterator<Item = (Denomination, u32)>,
    {
        Self {
            notes: Mutex::new(notes.into_iter().collect()),
        }
    }

    /// Empty reservoir accepting the standard denominations
    pub fn standard() -> Self {
        Self::with_notes(Denomination::STANDARD.iter().map(|d| (*d, 0)))
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Denomination, u32>> {
        // Mutations validate before touching the map, so a poisoned map is
        // still consistent
        self.notes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Notes available for a denomination; zero when unknown
    pub fn available_count(&self, denomination: Denomination) -> u32 {
        self.lock().get(&denomination).copied().unwrap_or(0)
    }

    /// Whether the machine handles this denomination
    pub fn accepts(&self, denomination: Denomination) -> bool {
        self.lock().contains_key(&denomination)
    }

    /// Consistent copy of all counts
    pub fn snapshot(&self) -> BTreeMap<Denomination, u32> {
        self.lock().clone()
    }

    /// Total face value held
    pub fn total_value(&self) -> Decimal {
        self.lock()
            .iter()
            .map(|(denomination, count)| denomination.amount() * Decimal::from(*count))
            .sum()
    }

    /// Take the given notes out of the reservoir
    ///
    /// All-or-nothing: if any denomination is short, nothing is removed.
    ///
    /// # Errors
    ///
    /// `InsufficientStock` naming the first denomination that ran short.
    pub fn reserve(&self, notes: &[Denomination]) -> Result<(), AtmError> {
        let wanted = count_notes(notes);
        let mut stock = self.lock();

        for (denomination, requested) in &wanted {
            let available = stock.get(denomination).copied().unwrap_or(0);
            if available < *requested {
                return Err(AtmError::insufficient_stock(
                    *denomination,
                    available,
                    *requested,
                ));
            }
        }

        for (denomination, requested) in wanted {
            if let Some(count) = stock.get_mut(&denomination) {
                *count -= requested;
            }
        }
        Ok(())
    }

    /// Put notes into the reservoir
    ///
    /// Used for operator refills, customer deposits, and returning notes after
    /// a failed withdrawal. All-or-nothing like `reserve`.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if a count would exceed `u32::MAX`.
    pub fn restock(&self, notes: &[Denomination]) -> Result<(), AtmError> {
        self.restock_counts(&count_notes(notes))
    }

    /// Put notes into the reservoir, given as a count per denomination
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if a count would exceed `u32::MAX`; nothing is added.
    pub fn restock_counts(&self, added: &BTreeMap<Denomination, u32>) -> Result<(), AtmError> {
        let mut stock = self.lock();

        let mut updated = Vec::with_capacity(added.len());
        for (&denomination, &count) in added {
            let current = stock.get(&denomination).copied().unwrap_or(0);
            let total = current
                .checked_add(count)
                .ok_or_else(|| AtmError::arithmetic_overflow("restock"))?;
            updated.push((denomination, total));
        }

        stock.extend(updated);
        Ok(())
    }

    /// Restock `count` notes of a single denomination
    pub fn restock_count(&self, denomination: Denomination, count: u32) -> Result<(), AtmError> {
        let mut stock = self.lock();
        let current = stock.entry(denomination).or_insert(0);
        *current = current
            .checked_add(count)
            .ok_or_else(|| AtmError::arithmetic_overflow("restock"))?;
        Ok(())
    }
}
