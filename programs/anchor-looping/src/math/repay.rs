//! Repayment sizing for an interest-accruing borrow
//!
//! Debt keeps accruing between the moment it is observed and the moment the
//! repay executes, so the amount is padded by a multiplicative buffer and
//! rounded UP to whole units. Under-repaying leaves dust debt on the
//! obligation; the lending market caps an over-sized repay at the real debt.

use anchor_lang::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::{DEFAULT_REPAY_BUFFER, REPAY_BUFFER_SCALE};
use crate::errors::LoopingError;

/// Buffer applied on top of the observed debt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepayPolicy {
    buffer: Decimal,
}

impl RepayPolicy {
    pub fn new(buffer: Decimal) -> Result<Self> {
        require!(buffer >= Decimal::ONE, LoopingError::InvalidRepayBuffer);
        Ok(Self { buffer })
    }

    pub fn buffer(&self) -> Decimal {
        self.buffer
    }
}

impl Default for RepayPolicy {
    fn default() -> Self {
        Self {
            buffer: Decimal::new(DEFAULT_REPAY_BUFFER, REPAY_BUFFER_SCALE),
        }
    }
}

/// Output of [`compute_repay_amount`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepayQuote {
    /// Amount in the asset's smallest unit, rounded up
    pub units: u64,
    /// Same amount expressed in whole tokens (`units / mint_factor`)
    pub ui_amount: Decimal,
}

/// Size a repay for `outstanding_debt`, expressed in the asset's smallest unit
/// with interest included (klend reports it as a fractional lamport amount).
///
/// `mint_factor` is `10^decimals` of the borrowed mint.
pub fn compute_repay_amount(
    outstanding_debt: Decimal,
    mint_factor: u64,
    policy: &RepayPolicy,
) -> Result<RepayQuote> {
    require!(mint_factor > 0, LoopingError::DivisionByZero);
    require!(!outstanding_debt.is_sign_negative(), LoopingError::MathUnderflow);

    let buffered = outstanding_debt
        .checked_mul(policy.buffer)
        .ok_or(LoopingError::MathOverflow)?;
    let units = buffered
        .ceil()
        .to_u64()
        .ok_or(LoopingError::AmountOverflow)?;

    let ui_amount = Decimal::from(units)
        .checked_div(Decimal::from(mint_factor))
        .ok_or(LoopingError::DivisionByZero)?;

    Ok(RepayQuote { units, ui_amount })
}
