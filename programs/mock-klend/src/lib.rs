//! Kamino Lend stand-in for LiteSVM tests
//!
//! Deployed at the klend program id. Instruction names match klend's so the
//! discriminators line up, and every account is read positionally from the
//! klend layout. Each instruction logs one `klend: ...` line so tests can read
//! back the CPI sequence. Deposits, borrows, withdrawals and repayments move
//! tokens 1:1 between the caller's token account and a reserve token account
//! owned by the lending market authority PDA.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{create_account, CreateAccount};
use anchor_spl::token_interface::{transfer_checked, Mint, TransferChecked};

declare_id!("KLend2g3cP87fffoy8q1mQqGKjrxjC8boSyAYavgmjD");

const USER_METADATA_SEED: &[u8] = b"user_meta";
const LENDING_MARKET_AUTHORITY_SEED: &[u8] = b"lma";

/// Data length of the accounts this program creates
const STATE_SPACE: usize = 8;

#[program]
pub mod mock_klend {
    use super::*;

    pub fn refresh_reserve<'info>(ctx: Context<'_, '_, '_, 'info, Passthrough>) -> Result<()> {
        let reserve = account(ctx.remaining_accounts, 0)?;
        msg!("klend: refresh_reserve {}", reserve.key);
        Ok(())
    }

    /// Trailing accounts are the reserves the obligation holds
    pub fn refresh_obligation<'info>(ctx: Context<'_, '_, '_, 'info, Passthrough>) -> Result<()> {
        let reserves = ctx.remaining_accounts.len().saturating_sub(2);
        msg!("klend: refresh_obligation {}", reserves);
        Ok(())
    }

    pub fn init_user_metadata<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        _user_lookup_table: Pubkey,
    ) -> Result<()> {
        let a = ctx.remaining_accounts;
        let owner = account(a, 0)?;
        create_state(account(a, 1)?, account(a, 2)?, account(a, 5)?, &[USER_METADATA_SEED, owner.key.as_ref()])?;
        msg!("klend: init_user_metadata");
        Ok(())
    }

    pub fn init_obligation<'info>(ctx: Context<'_, '_, '_, 'info, Passthrough>, tag: u8, id: u8) -> Result<()> {
        let a = ctx.remaining_accounts;
        let (tag, id) = ([tag], [id]);
        let seeds: &[&[u8]] = &[
            &tag,
            &id,
            account(a, 0)?.key.as_ref(),
            account(a, 3)?.key.as_ref(),
            account(a, 4)?.key.as_ref(),
            account(a, 5)?.key.as_ref(),
        ];
        create_state(account(a, 1)?, account(a, 2)?, account(a, 8)?, seeds)?;
        msg!("klend: init_obligation");
        Ok(())
    }

    pub fn init_obligation_farms_for_reserve<'info>(
        _ctx: Context<'_, '_, '_, 'info, Passthrough>,
        mode: u8,
    ) -> Result<()> {
        msg!("klend: init_obligation_farms_for_reserve {}", mode);
        Ok(())
    }

    pub fn deposit_reserve_liquidity_and_obligation_collateral_v2<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        liquidity_amount: u64,
    ) -> Result<()> {
        let a = ctx.remaining_accounts;
        // user source liquidity -> reserve liquidity supply, signed by the owner
        move_tokens(account(a, 12)?, account(a, 9)?, account(a, 5)?, account(a, 6)?, account(a, 0)?, liquidity_amount, &[])?;
        msg!("klend: deposit {}", liquidity_amount);
        Ok(())
    }

    pub fn borrow_obligation_liquidity_v2<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        liquidity_amount: u64,
    ) -> Result<()> {
        let a = ctx.remaining_accounts;
        let market = account(a, 2)?.key;
        let (_, bump) = Pubkey::find_program_address(&[LENDING_MARKET_AUTHORITY_SEED, market.as_ref()], &crate::ID);
        let seeds: &[&[u8]] = &[LENDING_MARKET_AUTHORITY_SEED, market.as_ref(), &[bump]];

        // reserve source liquidity -> user destination, signed by the market authority
        move_tokens(account(a, 10)?, account(a, 6)?, account(a, 5)?, account(a, 8)?, account(a, 3)?, liquidity_amount, &[seeds])?;
        msg!("klend: borrow {}", liquidity_amount);
        Ok(())
    }

    pub fn withdraw_obligation_collateral_and_redeem_reserve_collateral_v2<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        collateral_amount: u64,
    ) -> Result<()> {
        let a = ctx.remaining_accounts;
        let market = account(a, 2)?.key;
        let (_, bump) = Pubkey::find_program_address(&[LENDING_MARKET_AUTHORITY_SEED, market.as_ref()], &crate::ID);
        let seeds: &[&[u8]] = &[LENDING_MARKET_AUTHORITY_SEED, market.as_ref(), &[bump]];

        // reserve liquidity supply -> user destination, signed by the market authority
        move_tokens(account(a, 12)?, account(a, 8)?, account(a, 5)?, account(a, 9)?, account(a, 3)?, collateral_amount, &[seeds])?;
        msg!("klend: withdraw {}", collateral_amount);
        Ok(())
    }

    pub fn repay_obligation_liquidity_v2<'info>(
        ctx: Context<'_, '_, '_, 'info, Passthrough>,
        liquidity_amount: u64,
    ) -> Result<()> {
        let a = ctx.remaining_accounts;
        // user source liquidity -> reserve destination, signed by the owner
        move_tokens(account(a, 7)?, account(a, 6)?, account(a, 4)?, account(a, 5)?, account(a, 0)?, liquidity_amount, &[])?;
        msg!("klend: repay {}", liquidity_amount);
        Ok(())
    }
}

/// Accounts arrive in klend's positional layout
#[derive(Accounts)]
pub struct Passthrough {}

#[error_code]
pub enum MockKlendError {
    #[msg("Instruction is missing a klend account")]
    MissingAccount,
}

fn account<'a, 'info>(accounts: &'a [AccountInfo<'info>], index: usize) -> Result<&'a AccountInfo<'info>> {
    accounts.get(index).ok_or_else(|| MockKlendError::MissingAccount.into())
}

/// Create a program-owned PDA at `seeds`, funded by `payer`
fn create_state<'info>(
    payer: &AccountInfo<'info>,
    state: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    seeds: &[&[u8]],
) -> Result<()> {
    let (_, bump) = Pubkey::find_program_address(seeds, &crate::ID);
    let bump = [bump];
    let mut signer = seeds.to_vec();
    signer.push(&bump);

    create_account(
        CpiContext::new_with_signer(
            system_program.clone(),
            CreateAccount { from: payer.clone(), to: state.clone() },
            &[signer.as_slice()],
        ),
        Rent::get()?.minimum_balance(STATE_SPACE),
        STATE_SPACE as u64,
        &crate::ID,
    )
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
