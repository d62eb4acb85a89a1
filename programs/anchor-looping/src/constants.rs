//! Program constants: seeds, external program ids and wire discriminators

use anchor_lang::prelude::*;
use anchor_lang::solana_program::pubkey;

// === Seeds ===

/// Seed of the protocol authority PDA that owns every vault and the obligation
pub const AUTHORITY_SEED: &[u8] = b"auth";

/// klend user metadata PDA seed
pub const USER_METADATA_SEED: &[u8] = b"user_meta";

/// klend lending market authority PDA seed
pub const LENDING_MARKET_AUTHORITY_SEED: &[u8] = b"lma";

/// Farms program obligation farm state PDA seed
pub const OBLIGATION_FARM_SEED: &[u8] = b"user";

/// Obligation tag (0 = vanilla obligation)
pub const OBLIGATION_TAG: u8 = 0;

/// Obligation id, one obligation per authority and market
pub const OBLIGATION_ID: u8 = 0;

/// Jupiter event authority PDA seed
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

// === External Programs ===

pub const KAMINO_PROGRAM_ID: Pubkey = pubkey!("KLend2g3cP87fffoy8q1mQqGKjrxjC8boSyAYavgmjD");
pub const FARMS_PROGRAM_ID: Pubkey = pubkey!("FarmsPZpWu9i7Kky8tPN37rs2TpmMrAZrC7S7vJa91Hr");
pub const JUPITER_PROGRAM_ID: Pubkey = pubkey!("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4");

/// Jupiter's event authority PDA, `[EVENT_AUTHORITY_SEED]` under `JUPITER_PROGRAM_ID` (bump 255)
pub const JUPITER_EVENT_AUTHORITY: Pubkey = pubkey!("D8cy77BBepLMngZx6ZukaTff5hCt1HrWyKk3Hnd9oitf");

// === Obligation Status Flags ===

/// The obligation holds at least one deposit
pub const FLAG_HAS_COLLATERAL: u8 = 1 << 0;

/// The obligation holds at least one borrow
pub const FLAG_HAS_BORROWS: u8 = 1 << 1;

/// Every defined flag bit
pub const FLAG_MASK: u8 = FLAG_HAS_COLLATERAL | FLAG_HAS_BORROWS;

// === klend Discriminators ===

pub const INIT_USER_METADATA_DISCRIMINATOR: [u8; 8] = [117, 169, 176, 69, 197, 23, 15, 162];
pub const INIT_OBLIGATION_DISCRIMINATOR: [u8; 8] = [251, 10, 231, 76, 27, 11, 159, 96];
pub const INIT_OBLIGATION_FARMS_FOR_RESERVE_DISCRIMINATOR: [u8; 8] = [136, 63, 15, 186, 211, 152, 168, 164];
pub const REFRESH_RESERVE_DISCRIMINATOR: [u8; 8] = [2, 218, 138, 235, 79, 201, 25, 102];
pub const REFRESH_OBLIGATION_DISCRIMINATOR: [u8; 8] = [33, 132, 147, 228, 151, 192, 72, 89];
pub const DEPOSIT_RESERVE_LIQUIDITY_AND_OBLIGATION_COLLATERAL_V2_DISCRIMINATOR: [u8; 8] = [216, 224, 191, 27, 204, 151, 102, 175];
pub const BORROW_OBLIGATION_LIQUIDITY_V2_DISCRIMINATOR: [u8; 8] = [161, 128, 143, 245, 171, 199, 194, 6];
pub const WITHDRAW_OBLIGATION_COLLATERAL_AND_REDEEM_RESERVE_COLLATERAL_V2_DISCRIMINATOR: [u8; 8] = [235, 52, 119, 152, 149, 197, 20, 7];
pub const REPAY_OBLIGATION_LIQUIDITY_V2_DISCRIMINATOR: [u8; 8] = [116, 174, 213, 76, 180, 53, 210, 144];

// === Jupiter Discriminators ===

pub const SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR: [u8; 8] = [193, 32, 155, 51, 65, 214, 156, 129];
pub const SHARED_ACCOUNTS_EXACT_OUT_ROUTE_DISCRIMINATOR: [u8; 8] = [176, 209, 105, 168, 154, 125, 69, 62];
pub const EXACT_OUT_ROUTE_DISCRIMINATOR: [u8; 8] = [208, 51, 239, 151, 123, 43, 237, 92];

// === Swap Limits ===

/// Basis points denominator
pub const BPS: u64 = 10_000;

/// Maximum slippage a swap payload may declare (0.5%)
pub const MAX_SWAP_SLIPPAGE_BPS: u16 = 50;

// === Repayment ===

/// Default repay buffer numerator, scaled by `REPAY_BUFFER_SCALE` (1.0001)
pub const DEFAULT_REPAY_BUFFER: i64 = 10_001;

/// Decimal scale of `DEFAULT_REPAY_BUFFER`
pub const REPAY_BUFFER_SCALE: u32 = 4;

// === Instruction Argument Offsets ===

/// Offset of the swap payload inside `looping` instruction data:
/// discriminator (8) + obligation status (1) + vec length prefix (4)
pub const LOOPING_SWAP_DATA_OFFSET: usize = 8 + 1 + 4;

/// Offset of the swap payload inside `repay` instruction data:
/// discriminator (8) + vec length prefix (4)
pub const REPAY_SWAP_DATA_OFFSET: usize = 8 + 4;
