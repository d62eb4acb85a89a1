use anchor_lang::prelude::*;

// === Position Events ===

#[event]
pub struct VaultInitialized {
    pub protocol_authority: Pubkey,
    pub lending_market: Pubkey,
    pub obligation: Pubkey,
    pub user_metadata: Pubkey,
}

#[event]
pub struct CollateralDeposited {
    pub obligation: Pubkey,
    pub reserve: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub obligation_status: u8,
}

#[event]
pub struct LoopExecuted {
    pub obligation: Pubkey,
    pub borrow_reserve: Pubkey,
    pub collateral_reserve: Pubkey,
    pub borrowed: u64,
    pub deposited: u64,
    pub obligation_status: u8,
}

#[event]
pub struct DebtRepaid {
    pub obligation: Pubkey,
    pub borrow_reserve: Pubkey,
    pub collateral_reserve: Pubkey,
    pub collateral_withdrawn: u64,
    pub swapped_out: u64,
    pub repaid: u64,
}

// === Swap Events ===

#[event]
pub struct SwapAuthenticated {
    pub swap_program: Pubkey,
    pub input_vault: Pubkey,
    pub output_vault: Pubkey,
    pub amount: u64,
    pub quoted_amount: u64,
    pub slippage_bps: u16,
}
