//! Protocol authority and the klend/farms accounts keyed against it
//!
//! The protocol authority is a PDA with no private key. It owns every vault
//! token account and is the owner of the klend obligation, so all custody
//! CPIs are signed with its seeds and nothing else. It is re-derived on every
//! call and never stored.

use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;

use crate::constants::{
    AUTHORITY_SEED, FARMS_PROGRAM_ID, KAMINO_PROGRAM_ID, LENDING_MARKET_AUTHORITY_SEED,
    OBLIGATION_FARM_SEED, OBLIGATION_ID, OBLIGATION_TAG, USER_METADATA_SEED,
};

/// Signing capability of the protocol authority
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthoritySigner {
    bump: [u8; 1],
}

impl AuthoritySigner {
    pub fn new(bump: u8) -> Self {
        Self { bump: [bump] }
    }

    pub fn bump(&self) -> u8 {
        self.bump[0]
    }

    /// Seeds for `invoke_signed` / `CpiContext::new_with_signer`
    pub fn seeds(&self) -> [&[u8]; 2] {
        [AUTHORITY_SEED, &self.bump]
    }
}

/// Derive the protocol authority PDA
pub fn derive_protocol_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[AUTHORITY_SEED], program_id)
}

/// Derive the klend user metadata PDA of `owner`
pub fn derive_user_metadata(owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[USER_METADATA_SEED, owner.as_ref()], &KAMINO_PROGRAM_ID)
}

/// Derive the vanilla klend obligation of `owner` in `lending_market`
pub fn derive_obligation(owner: &Pubkey, lending_market: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            &[OBLIGATION_TAG],
            &[OBLIGATION_ID],
            owner.as_ref(),
            lending_market.as_ref(),
            Pubkey::default().as_ref(),
            Pubkey::default().as_ref(),
        ],
        &KAMINO_PROGRAM_ID,
    )
}

/// Derive the klend lending market authority PDA
pub fn derive_lending_market_authority(lending_market: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[LENDING_MARKET_AUTHORITY_SEED, lending_market.as_ref()],
        &KAMINO_PROGRAM_ID,
    )
}

/// Derive the farms user state of `obligation` in `reserve_farm_state`
pub fn derive_obligation_farm_state(reserve_farm_state: &Pubkey, obligation: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[OBLIGATION_FARM_SEED, reserve_farm_state.as_ref(), obligation.as_ref()],
        &FARMS_PROGRAM_ID,
    )
}

/// Vault of the protocol authority for `mint`: its associated token account
pub fn derive_vault(authority: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(authority, mint, token_program)
}
