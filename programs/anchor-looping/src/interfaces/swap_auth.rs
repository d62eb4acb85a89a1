//! Swap authentication
//!
//! Route payloads are opaque and caller-supplied, so before the protocol
//! authority signs one the program checks two things:
//!
//! 1. The payload is the one carried in the current top-level instruction of
//!    this program (`bind_to_transaction`), read back through the instructions
//!    sysvar.
//! 2. The route instruction actually being invoked targets the swap program,
//!    carries exactly those bytes, moves funds between the expected vaults
//!    with the authority as the only signer, and claims the amount the
//!    operation expects (`authenticate`).
//!
//! Any mismatch is a `Swap*` error from `LoopingError` and aborts before a
//! single token moves.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::Instruction,
    sysvar::instructions::{load_current_index_checked, load_instruction_at_checked},
};

use crate::constants::{JUPITER_EVENT_AUTHORITY, JUPITER_PROGRAM_ID, MAX_SWAP_SLIPPAGE_BPS};
use crate::errors::LoopingError;
use crate::interfaces::jupiter::{SwapClaim, SwapMode};

/// Amount the operation expects the swap to claim
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountCheck {
    /// Exact-in swap spending precisely `debit` from the input vault
    ExactIn { debit: u64 },
    /// Exact-out swap delivering precisely `output`, spending at most `max_debit`
    ExactOut { output: u64, max_debit: u64 },
}

impl AmountCheck {
    fn mode(&self) -> SwapMode {
        match self {
            Self::ExactIn { .. } => SwapMode::ExactIn,
            Self::ExactOut { .. } => SwapMode::ExactOut,
        }
    }
}

/// What the current operation expects the swap to look like
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapExpectation {
    pub swap_program: Pubkey,
    pub event_authority: Pubkey,
    pub transfer_authority: Pubkey,
    pub input_vault: Pubkey,
    pub output_vault: Pubkey,
    pub amount: AmountCheck,
}

impl SwapExpectation {
    /// Expectation against the production Jupiter deployment
    pub fn jupiter(transfer_authority: Pubkey, input_vault: Pubkey, output_vault: Pubkey, amount: AmountCheck) -> Self {
        Self {
            swap_program: JUPITER_PROGRAM_ID,
            event_authority: JUPITER_EVENT_AUTHORITY,
            transfer_authority,
            input_vault,
            output_vault,
            amount,
        }
    }
}

/// Require that `payload` is the swap payload argument of the top-level
/// instruction currently executing, and that instruction belongs to `program_id`.
pub fn bind_to_transaction(
    instructions_sysvar: &AccountInfo,
    program_id: &Pubkey,
    payload_offset: usize,
    payload: &[u8],
) -> Result<()> {
    let current = load_current_index_checked(instructions_sysvar)? as usize;
    let top_level = load_instruction_at_checked(current, instructions_sysvar)?;

    require_keys_eq!(top_level.program_id, *program_id, LoopingError::SwapNotTopLevel);
    verify_embedded_payload(&top_level.data, payload_offset, payload)
}

/// Require that `data` carries `payload` as a borsh `Vec<u8>` whose bytes
/// start at `offset`.
pub fn verify_embedded_payload(data: &[u8], offset: usize, payload: &[u8]) -> Result<()> {
    let prefix_start = offset.checked_sub(4).ok_or(LoopingError::SwapPayloadNotInTransaction)?;
    let payload_end = offset
        .checked_add(payload.len())
        .ok_or(LoopingError::SwapPayloadNotInTransaction)?;
    let declared_len = u32::try_from(payload.len()).map_err(|_| LoopingError::SwapPayloadNotInTransaction)?;

    let prefix = data.get(prefix_start..offset);
    let embedded = data.get(offset..payload_end);
    require!(
        prefix == Some(&declared_len.to_le_bytes()[..]) && embedded == Some(payload),
        LoopingError::SwapPayloadNotInTransaction
    );
    Ok(())
}

/// Check the route instruction about to be invoked against `payload` and
/// `expected`. Returns the decoded claim once every check passes.
pub fn authenticate(payload: &[u8], located: &Instruction, expected: &SwapExpectation) -> Result<SwapClaim> {
    let claim = SwapClaim::parse(payload)?;
    require!(claim.kind.mode() == expected.amount.mode(), LoopingError::SwapRouteNotAllowed);
    let layout = claim.kind.layout();

    let meta = |index: usize| meta_at(located, index);

    // Target program
    require_keys_eq!(located.program_id, expected.swap_program, LoopingError::SwapProgramMismatch);
    require_keys_eq!(
        meta(layout.event_authority)?.pubkey,
        expected.event_authority,
        LoopingError::SwapEventAuthorityMismatch
    );

    // Bytes
    require!(located.data.as_slice() == payload, LoopingError::SwapDataMismatch);

    // Custody
    let authority = meta(layout.transfer_authority)?;
    require!(
        authority.pubkey == expected.transfer_authority && authority.is_signer,
        LoopingError::SwapAuthorityMismatch
    );
    let extra_signer = located
        .accounts
        .iter()
        .enumerate()
        .any(|(index, acc)| acc.is_signer && index != layout.transfer_authority);
    require!(!extra_signer, LoopingError::SwapUnexpectedSigner);
    require_keys_eq!(
        meta(layout.source_token_account)?.pubkey,
        expected.input_vault,
        LoopingError::SwapInputVaultMismatch
    );
    require_keys_eq!(
        meta(layout.destination_token_account)?.pubkey,
        expected.output_vault,
        LoopingError::SwapOutputVaultMismatch
    );

    // Amounts
    match expected.amount {
        AmountCheck::ExactIn { debit } => {
            require_eq!(claim.amount, debit, LoopingError::SwapAmountMismatch);
        }
        AmountCheck::ExactOut { output, max_debit } => {
            require_eq!(claim.amount, output, LoopingError::SwapAmountMismatch);
            require!(claim.max_input()? <= max_debit, LoopingError::SwapAmountMismatch);
        }
    }
    require!(claim.slippage_bps <= MAX_SWAP_SLIPPAGE_BPS, LoopingError::SwapSlippageTooHigh);
    require!(claim.platform_fee_bps == 0, LoopingError::SwapPlatformFeeNotAllowed);

    Ok(claim)
}

fn meta_at(ix: &Instruction, index: usize) -> Result<&AccountMeta> {
    ix.accounts
        .get(index)
        .ok_or_else(|| LoopingError::SwapMissingRouteAccounts.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EXACT_OUT_ROUTE_DISCRIMINATOR, SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR};

    struct Fixture {
        authority: Pubkey,
        input_vault: Pubkey,
        output_vault: Pubkey,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                authority: Pubkey::new_unique(),
                input_vault: Pubkey::new_unique(),
                output_vault: Pubkey::new_unique(),
            }
        }

        fn expect_in(&self, debit: u64) -> SwapExpectation {
            SwapExpectation::jupiter(self.authority, self.input_vault, self.output_vault, AmountCheck::ExactIn { debit })
        }

        fn expect_out(&self, output: u64, max_debit: u64) -> SwapExpectation {
            SwapExpectation::jupiter(
                self.authority,
                self.input_vault,
                self.output_vault,
                AmountCheck::ExactOut { output, max_debit },
            )
        }

        /// shared_accounts_route instruction as `SwapCpi::build` lays it out
        fn shared_route(&self, data: &[u8]) -> Instruction {
            let mut accounts = vec![
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(self.authority, true),
                AccountMeta::new(self.input_vault, false),
                AccountMeta::new(Pubkey::new_unique(), false),
                AccountMeta::new(Pubkey::new_unique(), false),
                AccountMeta::new(self.output_vault, false),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
                AccountMeta::new_readonly(JUPITER_EVENT_AUTHORITY, false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
            ];
            accounts.push(AccountMeta::new(Pubkey::new_unique(), false));
            Instruction { program_id: JUPITER_PROGRAM_ID, accounts, data: data.to_vec() }
        }

        fn exact_out_route(&self, data: &[u8]) -> Instruction {
            let accounts = vec![
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(self.authority, true),
                AccountMeta::new(self.input_vault, false),
                AccountMeta::new(self.output_vault, false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
                AccountMeta::new_readonly(JUPITER_EVENT_AUTHORITY, false),
                AccountMeta::new_readonly(JUPITER_PROGRAM_ID, false),
            ];
            Instruction { program_id: JUPITER_PROGRAM_ID, accounts, data: data.to_vec() }
        }
    }

    fn route_data(discriminator: [u8; 8], amount: u64, quoted: u64, slippage: u16, fee: u8) -> Vec<u8> {
        let mut data = discriminator.to_vec();
        data.extend_from_slice(&[3u8; 20]);
        data.extend_from_slice(&amount.to_le_bytes());
        data.extend_from_slice(&quoted.to_le_bytes());
        data.extend_from_slice(&slippage.to_le_bytes());
        data.push(fee);
        data
    }

    /// Custom error code carried by a rejected route
    fn error_of(result: Result<SwapClaim>) -> u32 {
        match result {
            Err(anchor_lang::error::Error::AnchorError(e)) => e.error_code_number,
            other => panic!("expected anchor error, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_in_route_verified() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 1_000_000, 990_000, 50, 0);
        let claim = authenticate(&data, &f.shared_route(&data), &f.expect_in(1_000_000)).unwrap();
        assert_eq!(claim.amount, 1_000_000);
    }

    #[test]
    fn test_exact_out_route_verified() {
        let f = Fixture::new();
        let data = route_data(EXACT_OUT_ROUTE_DISCRIMINATOR, 5_000, 100_000, 50, 0);
        // ceil(100_000 * 1.005) = 100_500
        let claim = authenticate(&data, &f.exact_out_route(&data), &f.expect_out(5_000, 100_500)).unwrap();
        assert_eq!(claim.quoted_amount, 100_000);
    }

    #[test]
    fn test_program_mismatch() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);
        let mut ix = f.shared_route(&data);
        ix.program_id = Pubkey::new_unique();
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapProgramMismatch.code());
    }

    #[test]
    fn test_event_authority_mismatch() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);
        let mut ix = f.shared_route(&data);
        ix.accounts[11].pubkey = Pubkey::new_unique();
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapEventAuthorityMismatch.code());
    }

    #[test]
    fn test_single_byte_data_mutation() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);
        let mut ix = f.shared_route(&data);
        ix.data[12] ^= 1;
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapDataMismatch.code());
    }

    #[test]
    fn test_vault_mismatches() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);

        let mut ix = f.shared_route(&data);
        ix.accounts[3].pubkey = Pubkey::new_unique();
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapInputVaultMismatch.code());

        let mut ix = f.shared_route(&data);
        ix.accounts[6].pubkey = Pubkey::new_unique();
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapOutputVaultMismatch.code());
    }

    #[test]
    fn test_authority_and_signers() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);

        let mut ix = f.shared_route(&data);
        ix.accounts[2].pubkey = Pubkey::new_unique();
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapAuthorityMismatch.code());

        let mut ix = f.shared_route(&data);
        ix.accounts[13].is_signer = true;
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapUnexpectedSigner.code());
    }

    #[test]
    fn test_amount_mismatch() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);
        assert_eq!(
            error_of(authenticate(&data, &f.shared_route(&data), &f.expect_in(11))),
            LoopingError::SwapAmountMismatch.code()
        );

        let data = route_data(EXACT_OUT_ROUTE_DISCRIMINATOR, 5_000, 100_000, 50, 0);
        // Worst-case input 100_500 exceeds what the operation withdrew
        assert_eq!(
            error_of(authenticate(&data, &f.exact_out_route(&data), &f.expect_out(5_000, 100_499))),
            LoopingError::SwapAmountMismatch.code()
        );
    }

    #[test]
    fn test_route_direction_enforced() {
        let f = Fixture::new();
        let data = route_data(EXACT_OUT_ROUTE_DISCRIMINATOR, 10, 10, 0, 0);
        assert_eq!(
            error_of(authenticate(&data, &f.exact_out_route(&data), &f.expect_in(10))),
            LoopingError::SwapRouteNotAllowed.code()
        );
    }

    #[test]
    fn test_slippage_and_fee_limits() {
        let f = Fixture::new();
        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, MAX_SWAP_SLIPPAGE_BPS + 1, 0);
        assert_eq!(error_of(authenticate(&data, &f.shared_route(&data), &f.expect_in(10))), LoopingError::SwapSlippageTooHigh.code());

        let data = route_data(SHARED_ACCOUNTS_ROUTE_DISCRIMINATOR, 10, 10, 0, 1);
        assert_eq!(
            error_of(authenticate(&data, &f.shared_route(&data), &f.expect_in(10))),
            LoopingError::SwapPlatformFeeNotAllowed.code()
        );
    }

    #[test]
    fn test_malformed_payload() {
        let f = Fixture::new();
        let data = vec![1u8, 2, 3];
        let ix = f.shared_route(&data);
        assert_eq!(error_of(authenticate(&data, &ix, &f.expect_in(10))), LoopingError::SwapPayloadMalformed.code());
    }

    #[test]
    fn test_verify_embedded_payload() {
        let payload = vec![9u8, 8, 7, 6];
        let mut data = vec![0u8; 8];
        data.push(3); // obligation status
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&payload);

        assert!(verify_embedded_payload(&data, 13, &payload).is_ok());
        assert!(verify_embedded_payload(&data, 12, &payload).is_err());
        assert!(verify_embedded_payload(&data, 13, &payload[..3]).is_err());
        assert!(verify_embedded_payload(&data, 13, &[9, 8, 7, 5]).is_err());
        assert!(verify_embedded_payload(&data, 2, &payload).is_err());
    }
}
