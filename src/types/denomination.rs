//! Banknote types for the cash machine
//!
//! This module defines the face value of a banknote and the bundle of notes a
//! customer hands over at deposit time.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use super::error::AtmError;

/// Face value of a banknote in minor currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Denomination(u32);

impl Denomination {
    /// Notes handled by a standard machine, largest first
    pub const STANDARD: [Denomination; 4] = [
        Denomination(5000),
        Denomination(1000),
        Denomination(500),
        Denomination(100),
    ];

    /// Create a denomination from its face value
    ///
    /// # Panics
    ///
    /// Panics if `value` is zero. Use [`Denomination::try_new`] for untrusted input.
    pub const fn new(value: u32) -> Self {
        assert!(value > 0, "denomination must be positive");
        Denomination(value)
    }

    /// Create a denomination, rejecting a zero face value
    pub fn try_new(value: u32) -> Result<Self, AtmError> {
        if value == 0 {
            return Err(AtmError::unsupported_denomination(value));
        }
        Ok(Denomination(value))
    }

    /// Face value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Face value as a decimal amount
    pub fn amount(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notes inserted by a customer
///
/// Held as a count per denomination, the same shape the reservoir stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteBundle {
    counts: BTreeMap<Denomination, u32>,
}

impl NoteBundle {
    /// Bundle from individual notes
    pub fn new(notes: Vec<Denomination>) -> Self {
        Self {
            counts: count_notes(&notes),
        }
    }

    /// Bundle from per-denomination counts aligned with [`Denomination::STANDARD`]
    ///
    /// `[1, 1, 1, 1]` is one note each of 5000, 1000, 500 and 100. Counts beyond
    /// the standard set are rejected.
    pub fn from_counts(counts: &[u32]) -> Result<Self, AtmError> {
        if counts.len() > Denomination::STANDARD.len() {
            return Err(AtmError::invalid_amount(format!("{:?}", counts)));
        }
        let mut bundle = Self::default();
        for (denomination, &count) in Denomination::STANDARD.iter().zip(counts) {
            bundle.add(*denomination, count)?;
        }
        Ok(bundle)
    }

    /// Add `count` notes of one denomination
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the denomination's count would exceed `u32::MAX`.
    pub fn add(&mut self, denomination: Denomination, count: u32) -> Result<(), AtmError> {
        if count == 0 {
            return Ok(());
        }
        let slot = self.counts.entry(denomination).or_insert(0);
        *slot = slot
            .checked_add(count)
            .ok_or_else(|| AtmError::arithmetic_overflow("note bundle"))?;
        Ok(())
    }

    /// Count of notes per denomination; zero counts are never stored
    pub fn counts(&self) -> &BTreeMap<Denomination, u32> {
        &self.counts
    }

    /// Denominations present in the bundle, smallest first
    pub fn denominations(&self) -> impl Iterator<Item = Denomination> + '_ {
        self.counts.keys().copied()
    }

    /// Total number of notes
    pub fn note_count(&self) -> u64 {
        self.counts.values().map(|&count| u64::from(count)).sum()
    }

    /// Whether the bundle contains no notes
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total face value of the bundle
    pub fn total(&self) -> Decimal {
        self.counts
            .iter()
            .map(|(denomination, &count)| denomination.amount() * Decimal::from(count))
            .sum()
    }
}

/// Collapse a list of notes into per-denomination counts
pub fn count_notes(notes: &[Denomination]) -> BTreeMap<Denomination, u32> {
    let mut counts = BTreeMap::new();
    for note in notes {
        *counts.entry(*note).or_insert(0) += 1;
    }
    counts
}
