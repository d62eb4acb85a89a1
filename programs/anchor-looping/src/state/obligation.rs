//! Obligation status flags
//!
//! Decoding a klend obligation on-chain is expensive, so the caller reads the
//! refreshed obligation off-chain and passes a 2-bit summary. The flag only
//! selects which klend refresh variant is attempted. It never feeds into an
//! amount or a destination, so a stale flag makes klend reject the refresh
//! instead of moving funds anywhere unexpected.

use anchor_lang::prelude::*;

use crate::constants::{FLAG_HAS_BORROWS, FLAG_HAS_COLLATERAL, FLAG_MASK};
use crate::errors::LoopingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObligationStatus(u8);

/// Collateral-side sub-call selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollateralPath {
    /// No deposit yet: the obligation is refreshed without any deposit reserve
    First,
    /// The collateral reserve is already a deposit and must be refreshed with it
    Existing,
}

/// Borrow-side sub-call selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorrowPath {
    /// No borrow yet: the borrow reserve is not part of the obligation refresh
    First,
    /// The borrow reserve is refreshed and listed in the obligation refresh
    Existing,
}

impl ObligationStatus {
    pub const NONE: Self = Self(0);
    pub const HAS_COLLATERAL: Self = Self(FLAG_HAS_COLLATERAL);
    pub const HAS_BORROWS: Self = Self(FLAG_HAS_BORROWS);
    pub const BOTH: Self = Self(FLAG_HAS_COLLATERAL | FLAG_HAS_BORROWS);

    /// Classify from the refreshed obligation values, as the client does
    pub fn from_values(deposited_value: u128, borrowed_value: u128) -> Self {
        let mut bits = 0;
        if deposited_value > 0 {
            bits |= FLAG_HAS_COLLATERAL;
        }
        if borrowed_value > 0 {
            bits |= FLAG_HAS_BORROWS;
        }
        Self(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn has_collateral(&self) -> bool {
        self.0 & FLAG_HAS_COLLATERAL != 0
    }

    pub fn has_borrows(&self) -> bool {
        self.0 & FLAG_HAS_BORROWS != 0
    }

    pub fn collateral_path(&self) -> CollateralPath {
        if self.has_collateral() {
            CollateralPath::Existing
        } else {
            CollateralPath::First
        }
    }

    pub fn borrow_path(&self) -> BorrowPath {
        if self.has_borrows() {
            BorrowPath::Existing
        } else {
            BorrowPath::First
        }
    }

    /// Status after a successful deposit
    pub fn with_collateral(self) -> Self {
        Self(self.0 | FLAG_HAS_COLLATERAL)
    }

    /// Status after a successful borrow
    pub fn with_borrows(self) -> Self {
        Self(self.0 | FLAG_HAS_BORROWS)
    }

    /// Reserves to pass to klend `refresh_obligation`, deposits first then
    /// borrows, matching the obligation's own ordering.
    pub fn refresh_reserves<T: Clone>(&self, collateral: &T, borrow: Option<&T>) -> Result<Vec<T>> {
        let mut reserves = Vec::with_capacity(2);
        if let CollateralPath::Existing = self.collateral_path() {
            reserves.push(collateral.clone());
        }
        if let BorrowPath::Existing = self.borrow_path() {
            let borrow = borrow.ok_or(LoopingError::MissingBorrowReserve)?;
            reserves.push(borrow.clone());
        }
        Ok(reserves)
    }
}

impl TryFrom<u8> for ObligationStatus {
    type Error = anchor_lang::error::Error;

    fn try_from(bits: u8) -> Result<Self> {
        require!(bits & !FLAG_MASK == 0, LoopingError::InvalidObligationState);
        Ok(Self(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_flags_accepted() {
        for bits in 0..=3u8 {
            assert_eq!(ObligationStatus::try_from(bits).unwrap().bits(), bits);
        }
    }

    #[test]
    fn test_out_of_range_flags_rejected() {
        // 255 is what the client reports for a missing obligation
        for bits in [4u8, 5, 8, 0x80, 255] {
            assert!(ObligationStatus::try_from(bits).is_err(), "flag {bits} accepted");
        }
    }

    #[test]
    fn test_path_selection() {
        assert_eq!(ObligationStatus::NONE.collateral_path(), CollateralPath::First);
        assert_eq!(ObligationStatus::NONE.borrow_path(), BorrowPath::First);
        assert_eq!(ObligationStatus::HAS_COLLATERAL.collateral_path(), CollateralPath::Existing);
        assert_eq!(ObligationStatus::HAS_COLLATERAL.borrow_path(), BorrowPath::First);
        assert_eq!(ObligationStatus::HAS_BORROWS.collateral_path(), CollateralPath::First);
        assert_eq!(ObligationStatus::BOTH.borrow_path(), BorrowPath::Existing);
    }

    #[test]
    fn test_refresh_reserves_ordering() {
        let collateral = Pubkey::new_unique();
        let borrow = Pubkey::new_unique();

        assert!(ObligationStatus::NONE.refresh_reserves(&collateral, Some(&borrow)).unwrap().is_empty());
        assert_eq!(
            ObligationStatus::HAS_COLLATERAL.refresh_reserves(&collateral, None).unwrap(),
            vec![collateral]
        );
        assert_eq!(
            ObligationStatus::BOTH.refresh_reserves(&collateral, Some(&borrow)).unwrap(),
            vec![collateral, borrow]
        );
    }

    #[test]
    fn test_borrows_without_reserve_rejected() {
        let collateral = Pubkey::new_unique();
        assert!(ObligationStatus::HAS_BORROWS.refresh_reserves(&collateral, None).is_err());
    }

    #[test]
    fn test_from_values_and_transitions() {
        assert_eq!(ObligationStatus::from_values(0, 0), ObligationStatus::NONE);
        assert_eq!(ObligationStatus::from_values(10, 0), ObligationStatus::HAS_COLLATERAL);
        assert_eq!(ObligationStatus::from_values(10, 3), ObligationStatus::BOTH);
        assert_eq!(ObligationStatus::NONE.with_collateral().with_borrows(), ObligationStatus::BOTH);
    }
}
