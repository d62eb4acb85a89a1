//! Kamino Lend CPI builders
//!
//! klend ships no CPI crate for Anchor 0.31, so every instruction is built by
//! hand from its discriminator and account order. Optional accounts are passed
//! as the klend program id, which klend reads as "absent".

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::Instruction,
    program::{invoke, invoke_signed},
};

use crate::constants::*;
use crate::state::AuthoritySigner;

/// A klend instruction with a fixed account order
pub trait KlendInstruction<'info> {
    const DISCRIMINATOR: [u8; 8];

    fn klend_program(&self) -> &AccountInfo<'info>;

    fn account_metas(&self) -> Vec<AccountMeta>;

    fn account_infos(&self) -> Vec<AccountInfo<'info>>;

    fn instruction(&self, args: &[u8]) -> Instruction {
        Instruction {
            program_id: self.klend_program().key(),
            accounts: self.account_metas(),
            data: [Self::DISCRIMINATOR.as_ref(), args].concat(),
        }
    }

    /// Invoke, signing with the protocol authority when `signer` is given
    fn invoke(&self, args: &[u8], signer: Option<&AuthoritySigner>) -> Result<()> {
        let ix = self.instruction(args);
        let mut infos = self.account_infos();
        infos.push(self.klend_program().clone());

        match signer {
            Some(signer) => invoke_signed(&ix, &infos, &[&signer.seeds()])?,
            None => invoke(&ix, &infos)?,
        }
        Ok(())
    }
}

fn placeholder(klend_program: &AccountInfo) -> AccountMeta {
    AccountMeta::new_readonly(klend_program.key(), false)
}

/// Farm accounts of an obligation in one reserve
#[derive(Clone)]
pub struct ObligationFarm<'info> {
    pub obligation_farm_state: AccountInfo<'info>,
    pub reserve_farm_state: AccountInfo<'info>,
}

impl<'info> ObligationFarm<'info> {
    fn metas(farm: Option<&Self>, klend_program: &AccountInfo) -> [AccountMeta; 2] {
        match farm {
            Some(farm) => [
                AccountMeta::new(farm.obligation_farm_state.key(), false),
                AccountMeta::new(farm.reserve_farm_state.key(), false),
            ],
            None => [placeholder(klend_program), placeholder(klend_program)],
        }
    }

    fn infos(farm: Option<&Self>) -> Vec<AccountInfo<'info>> {
        farm.map(|farm| vec![farm.obligation_farm_state.clone(), farm.reserve_farm_state.clone()])
            .unwrap_or_default()
    }
}

// ============================================================================
// Refresh
// ============================================================================

pub struct RefreshReserve<'info> {
    pub reserve: AccountInfo<'info>,
    pub lending_market: AccountInfo<'info>,
    pub scope_oracle: AccountInfo<'info>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> KlendInstruction<'info> for RefreshReserve<'info> {
    const DISCRIMINATOR: [u8; 8] = REFRESH_RESERVE_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.reserve.key(), false),
            AccountMeta::new_readonly(self.lending_market.key(), false),
            placeholder(&self.klend_program), // pyth
            placeholder(&self.klend_program), // switchboard price
            placeholder(&self.klend_program), // switchboard twap
            AccountMeta::new_readonly(self.scope_oracle.key(), false),
        ]
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![self.reserve.clone(), self.lending_market.clone(), self.scope_oracle.clone()]
    }
}

impl<'info> RefreshReserve<'info> {
    pub fn refresh(&self) -> Result<()> {
        self.invoke(&[], None)
    }
}

/// `refresh_obligation` takes the obligation's reserves as trailing accounts,
/// deposits first then borrows.
pub struct RefreshObligation<'info> {
    pub lending_market: AccountInfo<'info>,
    pub obligation: AccountInfo<'info>,
    pub reserves: Vec<AccountInfo<'info>>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> KlendInstruction<'info> for RefreshObligation<'info> {
    const DISCRIMINATOR: [u8; 8] = REFRESH_OBLIGATION_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        let mut metas = vec![
            AccountMeta::new_readonly(self.lending_market.key(), false),
            AccountMeta::new(self.obligation.key(), false),
        ];
        metas.extend(self.reserves.iter().map(|reserve| AccountMeta::new_readonly(reserve.key(), false)));
        metas
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = vec![self.lending_market.clone(), self.obligation.clone()];
        infos.extend(self.reserves.iter().cloned());
        infos
    }
}

impl<'info> RefreshObligation<'info> {
    pub fn refresh(&self) -> Result<()> {
        self.invoke(&[], None)
    }
}

// ============================================================================
// Registration
// ============================================================================

pub struct InitUserMetadata<'info> {
    pub owner: AccountInfo<'info>,
    pub fee_payer: AccountInfo<'info>,
    pub user_metadata: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> KlendInstruction<'info> for InitUserMetadata<'info> {
    const DISCRIMINATOR: [u8; 8] = INIT_USER_METADATA_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.owner.key(), true),
            AccountMeta::new(self.fee_payer.key(), true),
            AccountMeta::new(self.user_metadata.key(), false),
            placeholder(&self.klend_program), // referrer user metadata
            AccountMeta::new_readonly(self.rent.key(), false),
            AccountMeta::new_readonly(self.system_program.key(), false),
        ]
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.fee_payer.clone(),
            self.user_metadata.clone(),
            self.rent.clone(),
            self.system_program.clone(),
        ]
    }
}

impl<'info> InitUserMetadata<'info> {
    /// Register with no address lookup table
    pub fn init(&self, signer: &AuthoritySigner) -> Result<()> {
        self.invoke(Pubkey::default().as_ref(), Some(signer))
    }
}

pub struct InitObligation<'info> {
    pub owner: AccountInfo<'info>,
    pub fee_payer: AccountInfo<'info>,
    pub obligation: AccountInfo<'info>,
    pub lending_market: AccountInfo<'info>,
    pub owner_user_metadata: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> KlendInstruction<'info> for InitObligation<'info> {
    const DISCRIMINATOR: [u8; 8] = INIT_OBLIGATION_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.owner.key(), true),
            AccountMeta::new(self.fee_payer.key(), true),
            AccountMeta::new(self.obligation.key(), false),
            AccountMeta::new_readonly(self.lending_market.key(), false),
            // Vanilla obligations use the default pubkey for both seed accounts
            AccountMeta::new_readonly(self.system_program.key(), false),
            AccountMeta::new_readonly(self.system_program.key(), false),
            AccountMeta::new_readonly(self.owner_user_metadata.key(), false),
            AccountMeta::new_readonly(self.rent.key(), false),
            AccountMeta::new_readonly(self.system_program.key(), false),
        ]
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.fee_payer.clone(),
            self.obligation.clone(),
            self.lending_market.clone(),
            self.owner_user_metadata.clone(),
            self.rent.clone(),
            self.system_program.clone(),
        ]
    }
}

impl<'info> InitObligation<'info> {
    pub fn init(&self, signer: &AuthoritySigner) -> Result<()> {
        self.invoke(&[OBLIGATION_TAG, OBLIGATION_ID], Some(signer))
    }
}

pub struct InitObligationFarmsForReserve<'info> {
    pub payer: AccountInfo<'info>,
    pub owner: AccountInfo<'info>,
    pub obligation: AccountInfo<'info>,
    pub lending_market_authority: AccountInfo<'info>,
    pub reserve: AccountInfo<'info>,
    pub farm: ObligationFarm<'info>,
    pub lending_market: AccountInfo<'info>,
    pub farms_program: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> KlendInstruction<'info> for InitObligationFarmsForReserve<'info> {
    const DISCRIMINATOR: [u8; 8] = INIT_OBLIGATION_FARMS_FOR_RESERVE_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.payer.key(), true),
            AccountMeta::new_readonly(self.owner.key(), false),
            AccountMeta::new(self.obligation.key(), false),
            AccountMeta::new_readonly(self.lending_market_authority.key(), false),
            AccountMeta::new(self.reserve.key(), false),
            AccountMeta::new(self.farm.reserve_farm_state.key(), false),
            AccountMeta::new(self.farm.obligation_farm_state.key(), false),
            AccountMeta::new_readonly(self.lending_market.key(), false),
            AccountMeta::new_readonly(self.farms_program.key(), false),
            AccountMeta::new_readonly(self.rent.key(), false),
            AccountMeta::new_readonly(self.system_program.key(), false),
        ]
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = vec![
            self.payer.clone(),
            self.owner.clone(),
            self.obligation.clone(),
            self.lending_market_authority.clone(),
            self.reserve.clone(),
            self.lending_market.clone(),
            self.farms_program.clone(),
            self.rent.clone(),
            self.system_program.clone(),
        ];
        infos.extend(ObligationFarm::infos(Some(&self.farm)));
        infos
    }
}

impl<'info> InitObligationFarmsForReserve<'info> {
    /// Collateral farm mode
    pub fn init(&self) -> Result<()> {
        self.invoke(&[0], None)
    }
}

// ============================================================================
// Position Changes
// ============================================================================

/// Accounts shared by every position-changing instruction
#[derive(Clone)]
pub struct ObligationAccounts<'info> {
    pub owner: AccountInfo<'info>,
    pub obligation: AccountInfo<'info>,
    pub lending_market: AccountInfo<'info>,
    pub lending_market_authority: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub instruction_sysvar: AccountInfo<'info>,
    pub farms_program: AccountInfo<'info>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> ObligationAccounts<'info> {
    fn infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.obligation.clone(),
            self.lending_market.clone(),
            self.lending_market_authority.clone(),
            self.token_program.clone(),
            self.instruction_sysvar.clone(),
            self.farms_program.clone(),
        ]
    }
}

/// `deposit_reserve_liquidity_and_obligation_collateral_v2`
pub struct DepositCollateralV2<'info> {
    pub common: ObligationAccounts<'info>,
    pub reserve: AccountInfo<'info>,
    pub reserve_liquidity_mint: AccountInfo<'info>,
    pub reserve_liquidity_supply: AccountInfo<'info>,
    pub reserve_collateral_mint: AccountInfo<'info>,
    pub reserve_destination_deposit_collateral: AccountInfo<'info>,
    pub user_source_liquidity: AccountInfo<'info>,
    pub farm: Option<ObligationFarm<'info>>,
}

impl<'info> KlendInstruction<'info> for DepositCollateralV2<'info> {
    const DISCRIMINATOR: [u8; 8] = DEPOSIT_RESERVE_LIQUIDITY_AND_OBLIGATION_COLLATERAL_V2_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.common.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        let c = &self.common;
        let mut metas = vec![
            AccountMeta::new(c.owner.key(), true),
            AccountMeta::new(c.obligation.key(), false),
            AccountMeta::new_readonly(c.lending_market.key(), false),
            AccountMeta::new_readonly(c.lending_market_authority.key(), false),
            AccountMeta::new(self.reserve.key(), false),
            AccountMeta::new_readonly(self.reserve_liquidity_mint.key(), false),
            AccountMeta::new(self.reserve_liquidity_supply.key(), false),
            AccountMeta::new(self.reserve_collateral_mint.key(), false),
            AccountMeta::new(self.reserve_destination_deposit_collateral.key(), false),
            AccountMeta::new(self.user_source_liquidity.key(), false),
            placeholder(&c.klend_program), // user destination collateral
            AccountMeta::new_readonly(c.token_program.key(), false), // collateral token program
            AccountMeta::new_readonly(c.token_program.key(), false), // liquidity token program
            AccountMeta::new_readonly(c.instruction_sysvar.key(), false),
        ];
        metas.extend(ObligationFarm::metas(self.farm.as_ref(), &c.klend_program));
        metas.push(AccountMeta::new_readonly(c.farms_program.key(), false));
        metas
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = self.common.infos();
        infos.extend([
            self.reserve.clone(),
            self.reserve_liquidity_mint.clone(),
            self.reserve_liquidity_supply.clone(),
            self.reserve_collateral_mint.clone(),
            self.reserve_destination_deposit_collateral.clone(),
            self.user_source_liquidity.clone(),
        ]);
        infos.extend(ObligationFarm::infos(self.farm.as_ref()));
        infos
    }
}

impl<'info> DepositCollateralV2<'info> {
    pub fn deposit(&self, liquidity_amount: u64, signer: &AuthoritySigner) -> Result<()> {
        self.invoke(&liquidity_amount.to_le_bytes(), Some(signer))
    }
}

/// `borrow_obligation_liquidity_v2`
pub struct BorrowLiquidityV2<'info> {
    pub common: ObligationAccounts<'info>,
    pub borrow_reserve: AccountInfo<'info>,
    pub borrow_reserve_liquidity_mint: AccountInfo<'info>,
    pub reserve_source_liquidity: AccountInfo<'info>,
    pub borrow_reserve_liquidity_fee_receiver: AccountInfo<'info>,
    pub user_destination_liquidity: AccountInfo<'info>,
    pub farm: Option<ObligationFarm<'info>>,
}

impl<'info> KlendInstruction<'info> for BorrowLiquidityV2<'info> {
    const DISCRIMINATOR: [u8; 8] = BORROW_OBLIGATION_LIQUIDITY_V2_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.common.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        let c = &self.common;
        let mut metas = vec![
            AccountMeta::new(c.owner.key(), true),
            AccountMeta::new(c.obligation.key(), false),
            AccountMeta::new_readonly(c.lending_market.key(), false),
            AccountMeta::new_readonly(c.lending_market_authority.key(), false),
            AccountMeta::new(self.borrow_reserve.key(), false),
            AccountMeta::new_readonly(self.borrow_reserve_liquidity_mint.key(), false),
            AccountMeta::new(self.reserve_source_liquidity.key(), false),
            AccountMeta::new(self.borrow_reserve_liquidity_fee_receiver.key(), false),
            AccountMeta::new(self.user_destination_liquidity.key(), false),
            placeholder(&c.klend_program), // referrer token state
            AccountMeta::new_readonly(c.token_program.key(), false),
            AccountMeta::new_readonly(c.instruction_sysvar.key(), false),
        ];
        metas.extend(ObligationFarm::metas(self.farm.as_ref(), &c.klend_program));
        metas.push(AccountMeta::new_readonly(c.farms_program.key(), false));
        metas
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = self.common.infos();
        infos.extend([
            self.borrow_reserve.clone(),
            self.borrow_reserve_liquidity_mint.clone(),
            self.reserve_source_liquidity.clone(),
            self.borrow_reserve_liquidity_fee_receiver.clone(),
            self.user_destination_liquidity.clone(),
        ]);
        infos.extend(ObligationFarm::infos(self.farm.as_ref()));
        infos
    }
}

impl<'info> BorrowLiquidityV2<'info> {
    pub fn borrow(&self, liquidity_amount: u64, signer: &AuthoritySigner) -> Result<()> {
        self.invoke(&liquidity_amount.to_le_bytes(), Some(signer))
    }
}

/// `withdraw_obligation_collateral_and_redeem_reserve_collateral_v2`
pub struct WithdrawCollateralV2<'info> {
    pub common: ObligationAccounts<'info>,
    pub withdraw_reserve: AccountInfo<'info>,
    pub reserve_liquidity_mint: AccountInfo<'info>,
    pub reserve_source_collateral: AccountInfo<'info>,
    pub reserve_collateral_mint: AccountInfo<'info>,
    pub reserve_liquidity_supply: AccountInfo<'info>,
    pub user_destination_liquidity: AccountInfo<'info>,
    pub farm: Option<ObligationFarm<'info>>,
}

impl<'info> KlendInstruction<'info> for WithdrawCollateralV2<'info> {
    const DISCRIMINATOR: [u8; 8] = WITHDRAW_OBLIGATION_COLLATERAL_AND_REDEEM_RESERVE_COLLATERAL_V2_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.common.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        let c = &self.common;
        let mut metas = vec![
            AccountMeta::new(c.owner.key(), true),
            AccountMeta::new(c.obligation.key(), false),
            AccountMeta::new_readonly(c.lending_market.key(), false),
            AccountMeta::new_readonly(c.lending_market_authority.key(), false),
            AccountMeta::new(self.withdraw_reserve.key(), false),
            AccountMeta::new_readonly(self.reserve_liquidity_mint.key(), false),
            AccountMeta::new(self.reserve_source_collateral.key(), false),
            AccountMeta::new(self.reserve_collateral_mint.key(), false),
            AccountMeta::new(self.reserve_liquidity_supply.key(), false),
            AccountMeta::new(self.user_destination_liquidity.key(), false),
            placeholder(&c.klend_program), // user destination collateral
            AccountMeta::new_readonly(c.token_program.key(), false), // collateral token program
            AccountMeta::new_readonly(c.token_program.key(), false), // liquidity token program
            AccountMeta::new_readonly(c.instruction_sysvar.key(), false),
        ];
        metas.extend(ObligationFarm::metas(self.farm.as_ref(), &c.klend_program));
        metas.push(AccountMeta::new_readonly(c.farms_program.key(), false));
        metas
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = self.common.infos();
        infos.extend([
            self.withdraw_reserve.clone(),
            self.reserve_liquidity_mint.clone(),
            self.reserve_source_collateral.clone(),
            self.reserve_collateral_mint.clone(),
            self.reserve_liquidity_supply.clone(),
            self.user_destination_liquidity.clone(),
        ]);
        infos.extend(ObligationFarm::infos(self.farm.as_ref()));
        infos
    }
}

impl<'info> WithdrawCollateralV2<'info> {
    pub fn withdraw(&self, collateral_amount: u64, signer: &AuthoritySigner) -> Result<()> {
        self.invoke(&collateral_amount.to_le_bytes(), Some(signer))
    }
}

/// `repay_obligation_liquidity_v2`
pub struct RepayLiquidityV2<'info> {
    pub common: ObligationAccounts<'info>,
    pub repay_reserve: AccountInfo<'info>,
    pub reserve_liquidity_mint: AccountInfo<'info>,
    pub reserve_destination_liquidity: AccountInfo<'info>,
    pub user_source_liquidity: AccountInfo<'info>,
    pub farm: Option<ObligationFarm<'info>>,
}

impl<'info> KlendInstruction<'info> for RepayLiquidityV2<'info> {
    const DISCRIMINATOR: [u8; 8] = REPAY_OBLIGATION_LIQUIDITY_V2_DISCRIMINATOR;

    fn klend_program(&self) -> &AccountInfo<'info> {
        &self.common.klend_program
    }

    fn account_metas(&self) -> Vec<AccountMeta> {
        let c = &self.common;
        let mut metas = vec![
            AccountMeta::new(c.owner.key(), true),
            AccountMeta::new(c.obligation.key(), false),
            AccountMeta::new_readonly(c.lending_market.key(), false),
            AccountMeta::new(self.repay_reserve.key(), false),
            AccountMeta::new_readonly(self.reserve_liquidity_mint.key(), false),
            AccountMeta::new(self.reserve_destination_liquidity.key(), false),
            AccountMeta::new(self.user_source_liquidity.key(), false),
            AccountMeta::new_readonly(c.token_program.key(), false),
            AccountMeta::new_readonly(c.instruction_sysvar.key(), false),
        ];
        metas.extend(ObligationFarm::metas(self.farm.as_ref(), &c.klend_program));
        metas.push(AccountMeta::new_readonly(c.lending_market_authority.key(), false));
        metas.push(AccountMeta::new_readonly(c.farms_program.key(), false));
        metas
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = self.common.infos();
        infos.extend([
            self.repay_reserve.clone(),
            self.reserve_liquidity_mint.clone(),
            self.reserve_destination_liquidity.clone(),
            self.user_source_liquidity.clone(),
        ]);
        infos.extend(ObligationFarm::infos(self.farm.as_ref()));
        infos
    }
}

impl<'info> RepayLiquidityV2<'info> {
    pub fn repay(&self, liquidity_amount: u64, signer: &AuthoritySigner) -> Result<()> {
        self.invoke(&liquidity_amount.to_le_bytes(), Some(signer))
    }
}
