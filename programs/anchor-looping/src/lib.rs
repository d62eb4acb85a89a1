//! Leveraged looping vault on Kamino Lend
//!
//! A single program-owned position on a klend lending market, levered up by
//! borrowing, swapping the borrowed asset into collateral through Jupiter and
//! redepositing, all inside one instruction.
//!
//! ## Features
//! - One custody authority (PDA) owns every vault and the obligation
//! - Caller-supplied obligation status selects klend refresh paths only
//! - Swap payloads are bound to the executing instruction and authenticated
//!   field by field before the authority signs them
//! - Slippage-checked swap output is what gets redeposited or repaid
//! - Buffered, ceiling-rounded repayment sizing for off-chain callers
//!
//! ## Errors
//! A rejected swap payload surfaces as `SwapAuthenticationFailed`: one of the
//! `Swap*` variants of [`errors::LoopingError`] with a custom code in
//! `LoopingError::SWAP_AUTHENTICATION_FAILED` (6010-6029). The variant names
//! the check that failed. A swap that authenticates but delivers less than its
//! slippage-adjusted minimum is `SwapOutputBelowMinimum` (6030) instead.

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod state;
pub mod interfaces;
pub mod instructions;

use instructions::*;

declare_id!("HZ4pzn7pTpkVRpxpszbvBxxQSS11Pu3oYt2PyWW6iFKU");

#[program]
pub mod anchor_looping {
    use super::*;

    /// Register the protocol authority with the lending market
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::initialize(ctx)
    }

    pub fn deposit(ctx: Context<Deposit>, obligation_status: u8, amount: u64) -> Result<()> {
        instructions::deposit::deposit(ctx, obligation_status, amount)
    }

    /// Borrow `amount`, swap it into collateral with `swap_data`, redeposit
    pub fn looping<'info>(
        ctx: Context<'_, '_, '_, 'info, Looping<'info>>,
        obligation_status: u8,
        swap_data: Vec<u8>,
        amount: u64,
    ) -> Result<()> {
        instructions::looping::looping(ctx, obligation_status, swap_data, amount)
    }

    /// Withdraw `swap_input_amount` of collateral, swap it exact-out into
    /// `repay_amount` of the borrowed asset, repay
    pub fn repay<'info>(
        ctx: Context<'_, '_, '_, 'info, Repay<'info>>,
        swap_data: Vec<u8>,
        swap_input_amount: u64,
        repay_amount: u64,
    ) -> Result<()> {
        instructions::repay::repay(ctx, swap_data, swap_input_amount, repay_amount)
    }
}
