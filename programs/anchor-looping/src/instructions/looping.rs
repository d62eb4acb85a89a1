//! One leverage loop: borrow, swap into collateral, redeposit
//!
//! The swap payload is authenticated in full before the first CPI, so a
//! rejected payload leaves every balance untouched.
//!
//! CEI Pattern: Checks → Effects → Interactions

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::constants::*;
use crate::errors::LoopingError;
use crate::events::{LoopExecuted, SwapAuthenticated};
use crate::instructions::utils::{vault_gain, PositionRefresh};
use crate::interfaces::{
    authenticate, bind_to_transaction, AmountCheck, BorrowLiquidityV2, DepositCollateralV2,
    ObligationAccounts, ObligationFarm, SwapAccounts, SwapClaim, SwapCpi, SwapExpectation,
};
use crate::state::{AuthoritySigner, ObligationStatus};

#[derive(Accounts)]
pub struct Looping<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub protocol_authority: SystemAccount<'info>,

    /// Borrowed asset
    pub input_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = input_mint,
        associated_token::authority = protocol_authority,
        associated_token::token_program = token_program,
    )]
    pub input_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Collateral asset
    pub output_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = output_mint,
        associated_token::authority = protocol_authority,
        associated_token::token_program = token_program,
    )]
    pub output_vault: Box<InterfaceAccount<'info, TokenAccount>>,

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
    #[account(mut)]
    pub reserve_borrow: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub borrow_reserve_source_liquidity: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    #[account(mut)]
    pub borrow_reserve_liquidity_fee_receiver: UncheckedAccount<'info>,

    /// CHECK: Validated by klend
    pub scope_oracle: UncheckedAccount<'info>,

    /// CHECK: Farm user state of the obligation in the collateral reserve
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

    /// CHECK: Checked by swap authentication
    pub event_authority: UncheckedAccount<'info>,

    /// CHECK: Checked by swap authentication
    pub swap_program: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

impl<'info> Looping<'info> {
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

    fn swap_accounts(&self) -> SwapAccounts<'info> {
        SwapAccounts {
            token_program: self.token_program.to_account_info(),
            transfer_authority: self.protocol_authority.to_account_info(),
            input_vault: self.input_vault.to_account_info(),
            output_vault: self.output_vault.to_account_info(),
            input_mint: self.input_mint.to_account_info(),
            output_mint: self.output_mint.to_account_info(),
            event_authority: self.event_authority.to_account_info(),
            swap_program: self.swap_program.to_account_info(),
        }
    }
}

pub fn looping<'info>(
    ctx: Context<'_, '_, '_, 'info, Looping<'info>>,
    obligation_status: u8,
    swap_data: Vec<u8>,
    amount: u64,
) -> Result<()> {
    // ===== CHECKS =====
    let status = ObligationStatus::try_from(obligation_status)?;
    require!(amount > 0, LoopingError::ZeroAmount);

    bind_to_transaction(
        &ctx.accounts.instruction_sysvar,
        ctx.program_id,
        LOOPING_SWAP_DATA_OFFSET,
        &swap_data,
    )?;

    let kind = SwapClaim::parse(&swap_data)?.kind;
    let swap = SwapCpi::build(kind, &ctx.accounts.swap_accounts(), ctx.remaining_accounts, &swap_data)?;
    let claim = authenticate(
        &swap_data,
        &swap.instruction,
        &SwapExpectation::jupiter(
            ctx.accounts.protocol_authority.key(),
            ctx.accounts.input_vault.key(),
            ctx.accounts.output_vault.key(),
            AmountCheck::ExactIn { debit: amount },
        ),
    )?;
    let min_output = claim.min_output()?;

    emit!(SwapAuthenticated {
        swap_program: swap.instruction.program_id,
        input_vault: ctx.accounts.input_vault.key(),
        output_vault: ctx.accounts.output_vault.key(),
        amount: claim.amount,
        quoted_amount: claim.quoted_amount,
        slippage_bps: claim.slippage_bps,
    });

    let signer = AuthoritySigner::new(ctx.bumps.protocol_authority);
    let refresh = ctx.accounts.position_refresh();
    let collateral_reserve = ctx.accounts.reserve_collateral.to_account_info();
    let borrow_reserve = ctx.accounts.reserve_borrow.to_account_info();

    // ===== INTERACTIONS =====
    refresh.refresh(status, &collateral_reserve, Some(&borrow_reserve))?;

    msg!("Loop path: borrow {:?}", status.borrow_path());

    BorrowLiquidityV2 {
        common: ctx.accounts.obligation_accounts(),
        borrow_reserve: borrow_reserve.clone(),
        borrow_reserve_liquidity_mint: ctx.accounts.input_mint.to_account_info(),
        reserve_source_liquidity: ctx.accounts.borrow_reserve_source_liquidity.to_account_info(),
        borrow_reserve_liquidity_fee_receiver: ctx.accounts.borrow_reserve_liquidity_fee_receiver.to_account_info(),
        user_destination_liquidity: ctx.accounts.input_vault.to_account_info(),
        farm: None,
    }
    .borrow(amount, &signer)?;

    ctx.accounts.output_vault.reload()?;
    let before = ctx.accounts.output_vault.amount;
    swap.invoke(&signer)?;
    ctx.accounts.output_vault.reload()?;
    let produced = vault_gain(before, ctx.accounts.output_vault.amount)?;
    require!(produced >= min_output, LoopingError::SwapOutputBelowMinimum);

    let status = status.with_collateral().with_borrows();
    refresh.refresh(status, &collateral_reserve, Some(&borrow_reserve))?;

    DepositCollateralV2 {
        common: ctx.accounts.obligation_accounts(),
        reserve: collateral_reserve,
        reserve_liquidity_mint: ctx.accounts.output_mint.to_account_info(),
        reserve_liquidity_supply: ctx.accounts.reserve_liquidity_supply.to_account_info(),
        reserve_collateral_mint: ctx.accounts.reserve_collateral_mint.to_account_info(),
        reserve_destination_deposit_collateral: ctx.accounts.reserve_destination_deposit_collateral.to_account_info(),
        user_source_liquidity: ctx.accounts.output_vault.to_account_info(),
        farm: Some(ObligationFarm {
            obligation_farm_state: ctx.accounts.obligation_farm_state.to_account_info(),
            reserve_farm_state: ctx.accounts.reserve_farm_state.to_account_info(),
        }),
    }
    .deposit(produced, &signer)?;

    emit!(LoopExecuted {
        obligation: ctx.accounts.obligation.key(),
        borrow_reserve: ctx.accounts.reserve_borrow.key(),
        collateral_reserve: ctx.accounts.reserve_collateral.key(),
        borrowed: amount,
        deposited: produced,
        obligation_status: status.bits(),
    });

    Ok(())
}
