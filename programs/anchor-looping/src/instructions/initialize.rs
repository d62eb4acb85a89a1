//! Registration of the protocol authority with the lending market
//!
//! Creates the klend user metadata, the obligation and the obligation's farm
//! state for the collateral reserve. Runs once per lending market.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LoopingError;
use crate::events::VaultInitialized;
use crate::interfaces::{InitObligation, InitObligationFarmsForReserve, InitUserMetadata, ObligationFarm};
use crate::instructions::utils::is_registered;
use crate::state::AuthoritySigner;

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub protocol_authority: SystemAccount<'info>,

    /// CHECK: klend user metadata of the protocol authority, created here
    #[account(
        mut,
        seeds = [USER_METADATA_SEED, protocol_authority.key().as_ref()],
        bump,
        seeds::program = KAMINO_PROGRAM_ID,
    )]
    pub user_metadata: UncheckedAccount<'info>,

    /// CHECK: klend obligation of the protocol authority, created here
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

    /// CHECK: Collateral reserve, validated by klend
    #[account(mut)]
    pub reserve: UncheckedAccount<'info>,

    /// CHECK: Farm of the collateral reserve, validated by klend
    #[account(mut)]
    pub reserve_farm_state: UncheckedAccount<'info>,

    /// CHECK: Farm user state of the obligation, created here
    #[account(
        mut,
        seeds = [OBLIGATION_FARM_SEED, reserve_farm_state.key().as_ref(), obligation.key().as_ref()],
        bump,
        seeds::program = FARMS_PROGRAM_ID,
    )]
    pub obligation_farm_state: UncheckedAccount<'info>,

    /// CHECK: Address checked
    #[account(address = KAMINO_PROGRAM_ID)]
    pub klend_program: UncheckedAccount<'info>,

    /// CHECK: Address checked
    #[account(address = FARMS_PROGRAM_ID)]
    pub farms_program: UncheckedAccount<'info>,

    pub rent: Sysvar<'info, Rent>,

    pub system_program: Program<'info, System>,
}

pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let accounts = &ctx.accounts;

    // ===== CHECKS =====
    require!(
        !is_registered(&accounts.user_metadata) && !is_registered(&accounts.obligation),
        LoopingError::AlreadyInitialized
    );

    let signer = AuthoritySigner::new(ctx.bumps.protocol_authority);
    let klend_program = accounts.klend_program.to_account_info();

    // ===== INTERACTIONS =====
    InitUserMetadata {
        owner: accounts.protocol_authority.to_account_info(),
        fee_payer: accounts.payer.to_account_info(),
        user_metadata: accounts.user_metadata.to_account_info(),
        rent: accounts.rent.to_account_info(),
        system_program: accounts.system_program.to_account_info(),
        klend_program: klend_program.clone(),
    }
    .init(&signer)?;

    InitObligation {
        owner: accounts.protocol_authority.to_account_info(),
        fee_payer: accounts.payer.to_account_info(),
        obligation: accounts.obligation.to_account_info(),
        lending_market: accounts.lending_market.to_account_info(),
        owner_user_metadata: accounts.user_metadata.to_account_info(),
        rent: accounts.rent.to_account_info(),
        system_program: accounts.system_program.to_account_info(),
        klend_program: klend_program.clone(),
    }
    .init(&signer)?;

    InitObligationFarmsForReserve {
        payer: accounts.payer.to_account_info(),
        owner: accounts.protocol_authority.to_account_info(),
        obligation: accounts.obligation.to_account_info(),
        lending_market_authority: accounts.lending_market_authority.to_account_info(),
        reserve: accounts.reserve.to_account_info(),
        farm: ObligationFarm {
            obligation_farm_state: accounts.obligation_farm_state.to_account_info(),
            reserve_farm_state: accounts.reserve_farm_state.to_account_info(),
        },
        lending_market: accounts.lending_market.to_account_info(),
        farms_program: accounts.farms_program.to_account_info(),
        rent: accounts.rent.to_account_info(),
        system_program: accounts.system_program.to_account_info(),
        klend_program,
    }
    .init()?;

    emit!(VaultInitialized {
        protocol_authority: accounts.protocol_authority.key(),
        lending_market: accounts.lending_market.key(),
        obligation: accounts.obligation.key(),
        user_metadata: accounts.user_metadata.key(),
    });

    Ok(())
}
