//! Helpers shared by the position-changing instructions

use anchor_lang::prelude::*;

use crate::constants::KAMINO_PROGRAM_ID;
use crate::interfaces::{RefreshObligation, RefreshReserve};
use crate::math::checked_sub;
use crate::state::ObligationStatus;

/// klend accounts needed to bring the position up to date before it changes
pub struct PositionRefresh<'info> {
    pub lending_market: AccountInfo<'info>,
    pub obligation: AccountInfo<'info>,
    pub scope_oracle: AccountInfo<'info>,
    pub klend_program: AccountInfo<'info>,
}

impl<'info> PositionRefresh<'info> {
    /// Refresh every supplied reserve, then the obligation with the reserves
    /// `status` says it holds.
    pub fn refresh(
        &self,
        status: ObligationStatus,
        collateral_reserve: &AccountInfo<'info>,
        borrow_reserve: Option<&AccountInfo<'info>>,
    ) -> Result<()> {
        let obligation_reserves = status.refresh_reserves(collateral_reserve, borrow_reserve)?;

        for reserve in std::iter::once(collateral_reserve).chain(borrow_reserve) {
            RefreshReserve {
                reserve: reserve.clone(),
                lending_market: self.lending_market.clone(),
                scope_oracle: self.scope_oracle.clone(),
                klend_program: self.klend_program.clone(),
            }
            .refresh()?;
        }

        RefreshObligation {
            lending_market: self.lending_market.clone(),
            obligation: self.obligation.clone(),
            reserves: obligation_reserves,
            klend_program: self.klend_program.clone(),
        }
        .refresh()
    }
}

/// Whether klend already holds state at `account`
pub fn is_registered(account: &AccountInfo) -> bool {
    !account.data_is_empty() || account.owner == &KAMINO_PROGRAM_ID
}

/// Tokens a vault gained across a CPI
pub fn vault_gain(before: u64, after: u64) -> Result<u64> {
    checked_sub(after, before)
}
