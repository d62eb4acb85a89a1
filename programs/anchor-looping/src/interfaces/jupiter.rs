//! Jupiter v6 route payloads
//!
//! The route plan itself is opaque to the vault. Only the fixed tail shared by
//! every route instruction is decoded:
//!
//! ```text
//! discriminator (8) | ... route plan ... | amount u64 | quoted_amount u64 | slippage_bps u16 | platform_fee_bps u8
//! ```
//!
//! For exact-in routes `amount` is the input and `quoted_amount` the quoted
//! output; exact-out routes swap the two.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, program::invoke_signed};

use crate::constants::{
    BPS, EXACT_OUT_ROUTE_DISCRIMINATOR, SHARED_ACCOUNTS_EXACT_OUT_ROUTE_DISCRIMINATOR,
    SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR,
};
use crate::errors::LoopingError;
use crate::math::{checked_add, mul_div_down, mul_div_up};
use crate::state::AuthoritySigner;

/// amount (8) + quoted_amount (8) + slippage_bps (2) + platform_fee_bps (1)
pub const ROUTE_TAIL_LEN: usize = 8 + 8 + 2 + 1;

/// Discriminator plus at least an empty route plan vec
pub const MIN_ROUTE_DATA_LEN: usize = 8 + 4 + ROUTE_TAIL_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapMode {
    ExactIn,
    ExactOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    SharedAccountsRoute,
    SharedAccountsExactOutRoute,
    ExactOutRoute,
}

/// Fixed account slots of a route instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteLayout {
    pub transfer_authority: usize,
    pub source_token_account: usize,
    pub destination_token_account: usize,
    pub event_authority: usize,
    /// Leading route accounts (program authority, program source and
    /// destination) that shared-accounts routes place in fixed slots
    pub shared_accounts: usize,
}

const SHARED_ACCOUNTS_LAYOUT: RouteLayout = RouteLayout {
    transfer_authority: 2,
    source_token_account: 3,
    destination_token_account: 6,
    event_authority: 11,
    shared_accounts: 3,
};

const EXACT_OUT_LAYOUT: RouteLayout = RouteLayout {
    transfer_authority: 1,
    source_token_account: 2,
    destination_token_account: 3,
    event_authority: 9,
    shared_accounts: 0,
};

impl RouteKind {
    pub fn from_data(data: &[u8]) -> Option<Self> {
        let discriminator: [u8; 8] = data.get(..8)?.try_into().ok()?;
        match discriminator {
            SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR => Some(Self::SharedAccountsRoute),
            SHARED_ACCOUNTS_EXACT_OUT_ROUTE_DISCRIMINATOR => Some(Self::SharedAccountsExactOutRoute),
            EXACT_OUT_ROUTE_DISCRIMINATOR => Some(Self::ExactOutRoute),
            _ => None,
        }
    }

    pub fn mode(&self) -> SwapMode {
        match self {
            Self::SharedAccountsRoute => SwapMode::ExactIn,
            Self::SharedAccountsExactOutRoute | Self::ExactOutRoute => SwapMode::ExactOut,
        }
    }

    pub fn layout(&self) -> RouteLayout {
        match self {
            Self::SharedAccountsRoute | Self::SharedAccountsExactOutRoute => SHARED_ACCOUNTS_LAYOUT,
            Self::ExactOutRoute => EXACT_OUT_LAYOUT,
        }
    }
}

/// Decoded claim carried by a caller-supplied route payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapClaim {
    pub kind: RouteKind,
    pub amount: u64,
    pub quoted_amount: u64,
    pub slippage_bps: u16,
    pub platform_fee_bps: u8,
}

impl SwapClaim {
    pub fn parse(data: &[u8]) -> Result<Self> {
        require!(data.len() >= MIN_ROUTE_DATA_LEN, LoopingError::SwapPayloadMalformed);
        let kind = RouteKind::from_data(data).ok_or(LoopingError::SwapPayloadMalformed)?;

        let tail = data.len() - ROUTE_TAIL_LEN;
        Ok(Self {
            kind,
            amount: u64::from_le_bytes(read_array(data, tail)?),
            quoted_amount: u64::from_le_bytes(read_array(data, tail + 8)?),
            slippage_bps: u16::from_le_bytes(read_array(data, tail + 16)?),
            platform_fee_bps: data[data.len() - 1],
        })
    }

    /// Most the swap may pull from the source vault
    pub fn max_input(&self) -> Result<u64> {
        match self.kind.mode() {
            SwapMode::ExactIn => Ok(self.amount),
            SwapMode::ExactOut => mul_div_up(self.quoted_amount, checked_add(BPS, self.slippage_bps as u64)?, BPS),
        }
    }

    /// Least the swap may deliver to the destination vault
    pub fn min_output(&self) -> Result<u64> {
        match self.kind.mode() {
            SwapMode::ExactIn => {
                let keep = BPS.checked_sub(self.slippage_bps as u64).ok_or(LoopingError::SwapSlippageTooHigh)?;
                mul_div_down(self.quoted_amount, keep, BPS)
            }
            SwapMode::ExactOut => Ok(self.amount),
        }
    }
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| LoopingError::SwapPayloadMalformed.into())
}

/// Accounts the vault places in the fixed slots of a route instruction
pub struct SwapAccounts<'info> {
    pub token_program: AccountInfo<'info>,
    pub transfer_authority: AccountInfo<'info>,
    pub input_vault: AccountInfo<'info>,
    pub output_vault: AccountInfo<'info>,
    pub input_mint: AccountInfo<'info>,
    pub output_mint: AccountInfo<'info>,
    pub event_authority: AccountInfo<'info>,
    pub swap_program: AccountInfo<'info>,
}

/// A fully built route instruction, ready to be authenticated and invoked
pub struct SwapCpi<'info> {
    pub instruction: Instruction,
    pub account_infos: Vec<AccountInfo<'info>>,
}

impl<'info> SwapCpi<'info> {
    /// Build the route instruction for `data`, appending `route_accounts`
    /// (the caller's remaining accounts) after the fixed slots.
    pub fn build(
        kind: RouteKind,
        accounts: &SwapAccounts<'info>,
        route_accounts: &[AccountInfo<'info>],
        data: &[u8],
    ) -> Result<Self> {
        let program = accounts.swap_program.key();
        let layout = kind.layout();
        require!(
            route_accounts.len() >= layout.shared_accounts,
            LoopingError::SwapMissingRouteAccounts
        );

        let mut metas = match kind {
            RouteKind::SharedAccountsRoute | RouteKind::SharedAccountsExactOutRoute => vec![
                AccountMeta::new_readonly(accounts.token_program.key(), false),      // token program
                AccountMeta::new_readonly(route_accounts[0].key(), false),           // program authority
                AccountMeta::new_readonly(accounts.transfer_authority.key(), true),  // user transfer authority
                AccountMeta::new(accounts.input_vault.key(), false),                 // source token account
                AccountMeta::new(route_accounts[1].key(), false),                    // program source token account
                AccountMeta::new(route_accounts[2].key(), false),                    // program destination token account
                AccountMeta::new(accounts.output_vault.key(), false),                // destination token account
                AccountMeta::new_readonly(accounts.input_mint.key(), false),         // source mint
                AccountMeta::new_readonly(accounts.output_mint.key(), false),        // destination mint
                AccountMeta::new_readonly(program, false),                           // [optional] platform fee account
                AccountMeta::new_readonly(program, false),                           // [optional] token 2022 program
                AccountMeta::new_readonly(accounts.event_authority.key(), false),    // event authority
                AccountMeta::new_readonly(program, false),                           // program
            ],
            RouteKind::ExactOutRoute => vec![
                AccountMeta::new_readonly(accounts.token_program.key(), false),      // token program
                AccountMeta::new_readonly(accounts.transfer_authority.key(), true),  // user transfer authority
                AccountMeta::new(accounts.input_vault.key(), false),                 // user source token account
                AccountMeta::new(accounts.output_vault.key(), false),                // user destination token account
                AccountMeta::new_readonly(program, false),                           // [optional] destination token account
                AccountMeta::new_readonly(accounts.input_mint.key(), false),         // source mint
                AccountMeta::new_readonly(accounts.output_mint.key(), false),        // destination mint
                AccountMeta::new_readonly(program, false),                           // [optional] platform fee account
                AccountMeta::new_readonly(program, false),                           // [optional] token 2022 program
                AccountMeta::new_readonly(accounts.event_authority.key(), false),    // event authority
                AccountMeta::new_readonly(program, false),                           // program
            ],
        };
        metas.extend(route_accounts.iter().skip(layout.shared_accounts).map(|acc| AccountMeta {
            pubkey: acc.key(),
            is_signer: false,
            is_writable: acc.is_writable,
        }));

        let mut account_infos = vec![
            accounts.token_program.clone(),
            accounts.transfer_authority.clone(),
            accounts.input_vault.clone(),
            accounts.output_vault.clone(),
            accounts.input_mint.clone(),
            accounts.output_mint.clone(),
            accounts.event_authority.clone(),
            accounts.swap_program.clone(),
        ];
        account_infos.extend(route_accounts.iter().cloned());

        Ok(Self {
            instruction: Instruction {
                program_id: program,
                accounts: metas,
                data: data.to_vec(),
            },
            account_infos,
        })
    }

    pub fn invoke(&self, signer: &AuthoritySigner) -> Result<()> {
        invoke_signed(&self.instruction, &self.account_infos, &[&signer.seeds()])?;
        Ok(())
    }
}
