//! Jupiter aggregator stand-in for LiteSVM tests
//!
//! Deployed at the Jupiter program id and speaks the shared-accounts route
//! instructions. A route pulls the declared input from the user's source
//! account into the pool's source account, then pays the destination from the
//! pool's destination account. The route plan carries the amount the pool
//! delivers as a little-endian `u64`, which lets a test make the swap under- or
//! over-deliver. Without one the pool delivers exactly the quoted or requested
//! amount.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, Mint, TransferChecked};

declare_id!("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4");

/// Seed of the PDA that owns the pool token accounts
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool";

// Shared accounts layout
const TOKEN_PROGRAM: usize = 0;
const POOL_AUTHORITY: usize = 1;
const USER_AUTHORITY: usize = 2;
const SOURCE: usize = 3;
const POOL_SOURCE: usize = 4;
const POOL_DESTINATION: usize = 5;
const DESTINATION: usize = 6;
const SOURCE_MINT: usize = 7;
const DESTINATION_MINT: usize = 8;

#[program]
pub mod mock_jupiter {
    use super::*;

    pub fn shared_accounts_route<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        _id: u8,
        route_plan: Vec<u8>,
        in_amount: u64,
        quoted_out_amount: u64,
        _slippage_bps: u16,
        _platform_fee_bps: u8,
    ) -> Result<()> {
        let delivered = delivered_amount(&route_plan, quoted_out_amount)?;
        settle(ctx.remaining_accounts, in_amount, delivered)
    }

    pub fn shared_accounts_exact_out_route<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        _id: u8,
        route_plan: Vec<u8>,
        out_amount: u64,
        quoted_in_amount: u64,
        _slippage_bps: u16,
        _platform_fee_bps: u8,
    ) -> Result<()> {
        let delivered = delivered_amount(&route_plan, out_amount)?;
        settle(ctx.remaining_accounts, quoted_in_amount, delivered)
    }
}

/// Accounts arrive in Jupiter's positional layout
#[derive(Accounts)]
pub struct Passthrough {}

#[error_code]
pub enum MockJupiterError {
    #[msg("Instruction is missing a route account")]
    MissingAccount,
    #[msg("Route plan must be empty or one little-endian u64")]
    InvalidRoutePlan,
}

fn delivered_amount(route_plan: &[u8], default: u64) -> Result<u64> {
    match route_plan.len() {
        0 => Ok(default),
        8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(route_plan);
            Ok(u64::from_le_bytes(bytes))
        }
        _ => err!(MockJupiterError::InvalidRoutePlan),
    }
}

fn settle<'info>(accounts: &[AccountInfo<'info>], debit: u64, credit: u64) -> Result<()> {
    let at = move |index: usize| accounts.get(index).ok_or(MockJupiterError::MissingAccount);
    let token_program = at(TOKEN_PROGRAM)?;

    move_tokens(token_program, at(SOURCE)?, at(SOURCE_MINT)?, at(POOL_SOURCE)?, at(USER_AUTHORITY)?, debit, &[])?;

    let (_, bump) = Pubkey::find_program_address(&[POOL_AUTHORITY_SEED], &crate::ID);
    let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, &[bump]];
    move_tokens(
        token_program,
        at(POOL_DESTINATION)?,
        at(DESTINATION_MINT)?,
        at(DESTINATION)?,
        at(POOL_AUTHORITY)?,
        credit,
        &[seeds],
    )?;

    msg!("jupiter: swap {} for {}", debit, credit);
    Ok(())
}

fn move_tokens<'info>(
    token_program: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let decimals = Mint::try_deserialize(&mut &mint.try_borrow_data()?[..])?.decimals;
    transfer_checked(
        CpiContext::new_with_signer(
            token_program.clone(),
            TransferChecked {
                from: from.clone(),
                mint: mint.clone(),
                to: to.clone(),
                authority: authority.clone(),
            },
            signer_seeds,
        ),
        amount,
        decimals,
    )
}
