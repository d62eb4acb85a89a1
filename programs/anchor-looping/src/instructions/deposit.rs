//! Collateral deposit
//!
//! CEI Pattern: Checks → Effects → Interactions

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

use crate::constants::*;
use crate::errors::LoopingError;
use crate::events::CollateralDeposited;
use crate::instructions::utils::PositionRefresh;
use crate::interfaces::{DepositCollateralV2, ObligationAccounts, ObligationFarm};
use crate::state::{AuthoritySigner, ObligationStatus};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub protocol_authority: SystemAccount<'info>,

    pub reserve_liquidity_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = reserve_liquidity_mint,
        token::authority = payer,
        token::token_program = token_program,
    )]
    pub payer_source_liquidity: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = reserve_liquidity_mint,
        associated_token::authority = protocol_authority,
        associated_token::token_program = token_program,
    )]
    pub collateral_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Address checked
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instruction_sysvar: UncheckedAccount<'info>,

    /// CHECK: klend obligation of the protocol authority
    #[account(
        mut,
        seeds = [
            &[OBLIGATION_TAG],
            &[OBLIGATION_ID],
            protocol_authority.key().as_ref(),
            lending_market.key().as_ref(),
            Pubkey::default().as_ref(),
            Pubkey::default().as_ref(),
        ],
        bump,
        seeds::program = KAMINO_PROGRAM_ID,
    )]
    pub obligation: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    pub lending_market: UncheckedAccount<'info>,

    /// CHECK: PDA of klend
    #[account(
        seeds = [LENDING_MARKET_AUTHORITY_SEED, lending_market.key().as_ref()],
        bump,
        seeds::program = KAMINO_PROGRAM_ID,
    )]
    pub lending_market_authority: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub reserve_collateral: UncheckedAccount<'info>,

    /// CHECK: Required when the obligation already has borrows
    #[account(mut)]
    pub reserve_borrow: Option<UncheckedAccount<'info>>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub reserve_liquidity_supply: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub reserve_collateral_mint: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub reserve_destination_deposit_collateral: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    pub scope_oracle: UncheckedAccount<'info>,

    /// CHECK: Farm user state of the obligation
    #[account(
        mut,
        seeds = [OBLIGATION_FARM_SEED, reserve_farm_state.key().as_ref(), obligation.key().as_ref()],
        bump,
        seeds::program = FARMS_PROGRAM_ID,
    )]
    pub obligation_farm_state: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub reserve_farm_state: UncheckedAccount<'info>,

    /// CHECK: Address checked
    #[account(address = KAMINO_PROGRAM_ID)]
    pub klend_program: UncheckedAccount<'info>,

    /// CHECK: Address checked
    #[account(address = FARMS_PROGRAM_ID)]
    pub farms_program: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

impl<'info> Deposit<'info> {
    fn position_refresh(&self) -> PositionRefresh<'info> {
        PositionRefresh {
            lending_market: self.lending_market.to_account_info(),
            obligation: self.obligation.to_account_info(),
            scope_oracle: self.scope_oracle.to_account_info(),
            klend_program: self.klend_program.to_account_info(),
        }
    }

    fn obligation_accounts(&self) -> ObligationAccounts<'info> {
        ObligationAccounts {
            owner: self.protocol_authority.to_account_info(),
            obligation: self.obligation.to_account_info(),
            lending_market: self.lending_market.to_account_info(),
            lending_market_authority: self.lending_market_authority.to_account_info(),
            token_program: self.token_program.to_account_info(),
            instruction_sysvar: self.instruction_sysvar.to_account_info(),
            farms_program: self.farms_program.to_account_info(),
            klend_program: self.klend_program.to_account_info(),
        }
    }
}

pub fn deposit(ctx: Context<Deposit>, obligation_status: u8, amount: u64) -> Result<()> {
    let accounts = &ctx.accounts;

    // ===== CHECKS =====
    let status = ObligationStatus::try_from(obligation_status)?;
    require!(amount > 0, LoopingError::ZeroAmount);
    require!(
        !status.has_borrows() || accounts.reserve_borrow.is_some(),
        LoopingError::MissingBorrowReserve
    );

    let signer = AuthoritySigner::new(ctx.bumps.protocol_authority);

    // ===== INTERACTIONS =====
    transfer_checked(
        CpiContext::new(
            accounts.token_program.to_account_info(),
            TransferChecked {
                from: accounts.payer_source_liquidity.to_account_info(),
                to: accounts.collateral_vault.to_account_info(),
                authority: accounts.payer.to_account_info(),
                mint: accounts.reserve_liquidity_mint.to_account_info(),
            },
        ),
        amount,
        accounts.reserve_liquidity_mint.decimals,
    )?;

    let collateral_reserve = accounts.reserve_collateral.to_account_info();
    let borrow_reserve = accounts
        .reserve_borrow
        .as_ref()
        .filter(|_| status.has_borrows())
        .map(|reserve| reserve.to_account_info());
    accounts
        .position_refresh()
        .refresh(status, &collateral_reserve, borrow_reserve.as_ref())?;

    msg!("Deposit path: collateral {:?}, borrow {:?}", status.collateral_path(), status.borrow_path());

    DepositCollateralV2 {
        common: accounts.obligation_accounts(),
        reserve: collateral_reserve,
        reserve_liquidity_mint: accounts.reserve_liquidity_mint.to_account_info(),
        reserve_liquidity_supply: accounts.reserve_liquidity_supply.to_account_info(),
        reserve_collateral_mint: accounts.reserve_collateral_mint.to_account_info(),
        reserve_destination_deposit_collateral: accounts.reserve_destination_deposit_collateral.to_account_info(),
        user_source_liquidity: accounts.collateral_vault.to_account_info(),
        farm: Some(ObligationFarm {
            obligation_farm_state: accounts.obligation_farm_state.to_account_info(),
            reserve_farm_state: accounts.reserve_farm_state.to_account_info(),
        }),
    }
    .deposit(amount, &signer)?;

    emit!(CollateralDeposited {
        obligation: accounts.obligation.key(),
        reserve: accounts.reserve_collateral.key(),
        depositor: accounts.payer.key(),
        amount,
        obligation_status: status.bits(),
    });

    Ok(())
}
