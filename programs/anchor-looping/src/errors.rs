use anchor_lang::prelude::*;

// Discriminants are offsets: Anchor adds `ERROR_CODE_OFFSET` (6000) to each.
//
// `SwapAuthenticationFailed` is not a single variant but the family of
// `Swap*` variants in 6010-6029, see `LoopingError::SWAP_AUTHENTICATION_FAILED`.
// Each one names the check that rejected the route and every message starts
// with "Swap authentication failed". Clients that only care about the family
// test the code against that range.
#[error_code]
pub enum LoopingError {
    // === Precondition Errors (6000-6009) ===
    #[msg("Protocol authority is already registered with the lending market")]
    AlreadyInitialized = 0,

    #[msg("Obligation status flag is outside the defined 2-bit range")]
    InvalidObligationState = 1,

    #[msg("Amount must be greater than zero")]
    ZeroAmount = 2,

    #[msg("Obligation has borrows but no borrow reserve was supplied")]
    MissingBorrowReserve = 3,

    // === Swap Authentication Errors (6010-6029): SwapAuthenticationFailed ===
    #[msg("Swap authentication failed: payload is malformed")]
    SwapPayloadMalformed = 10,

    #[msg("Swap authentication failed: route kind not allowed here")]
    SwapRouteNotAllowed = 11,

    #[msg("Swap authentication failed: route accounts missing")]
    SwapMissingRouteAccounts = 12,

    #[msg("Swap authentication failed: target program mismatch")]
    SwapProgramMismatch = 13,

    #[msg("Swap authentication failed: event authority mismatch")]
    SwapEventAuthorityMismatch = 14,

    #[msg("Swap authentication failed: instruction data mismatch")]
    SwapDataMismatch = 15,

    #[msg("Swap authentication failed: transfer authority mismatch")]
    SwapAuthorityMismatch = 16,

    #[msg("Swap authentication failed: unexpected signer")]
    SwapUnexpectedSigner = 17,

    #[msg("Swap authentication failed: input vault mismatch")]
    SwapInputVaultMismatch = 18,

    #[msg("Swap authentication failed: output vault mismatch")]
    SwapOutputVaultMismatch = 19,

    #[msg("Swap authentication failed: amount mismatch")]
    SwapAmountMismatch = 20,

    #[msg("Swap authentication failed: slippage exceeds maximum")]
    SwapSlippageTooHigh = 21,

    #[msg("Swap authentication failed: platform fee not allowed")]
    SwapPlatformFeeNotAllowed = 22,

    #[msg("Swap authentication failed: instruction is not top level")]
    SwapNotTopLevel = 23,

    #[msg("Swap authentication failed: payload not found in transaction")]
    SwapPayloadNotInTransaction = 24,

    // === Swap Execution Errors (6030-6039) ===
    #[msg("Swap produced less than the slippage-adjusted minimum")]
    SwapOutputBelowMinimum = 30,

    // === Math Errors (6040-6049) ===
    #[msg("Math overflow")]
    MathOverflow = 40,

    #[msg("Math underflow")]
    MathUnderflow = 41,

    #[msg("Division by zero")]
    DivisionByZero = 42,

    #[msg("Amount exceeds u64 maximum")]
    AmountOverflow = 43,

    #[msg("Repay buffer must be at least 1")]
    InvalidRepayBuffer = 44,
}

impl LoopingError {
    /// Error codes of the `SwapAuthenticationFailed` family
    pub const SWAP_AUTHENTICATION_FAILED: std::ops::Range<u32> = 6010..6030;

    /// Custom program error code as returned to the caller
    pub fn code(self) -> u32 {
        anchor_lang::error::ERROR_CODE_OFFSET + self as u32
    }

    /// Whether this error is one of the `SwapAuthenticationFailed` subtypes
    pub fn is_swap_authentication_failure(self) -> bool {
        Self::is_swap_authentication_code(self.code())
    }

    /// Same check on a raw custom error code, as a client sees it
    pub fn is_swap_authentication_code(code: u32) -> bool {
        Self::SWAP_AUTHENTICATION_FAILED.contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_land_in_documented_ranges() {
        assert_eq!(LoopingError::AlreadyInitialized.code(), 6000);
        assert_eq!(LoopingError::SwapPayloadMalformed.code(), 6010);
        assert_eq!(LoopingError::SwapPayloadNotInTransaction.code(), 6024);
        assert_eq!(LoopingError::SwapOutputBelowMinimum.code(), 6030);
        assert_eq!(LoopingError::InvalidRepayBuffer.code(), 6044);
    }

    #[test]
    fn test_swap_authentication_classification() {
        assert!(LoopingError::SwapProgramMismatch.is_swap_authentication_failure());
        assert!(LoopingError::SwapNotTopLevel.is_swap_authentication_failure());
        assert!(!LoopingError::SwapOutputBelowMinimum.is_swap_authentication_failure());
        assert!(!LoopingError::InvalidObligationState.is_swap_authentication_failure());
    }

    #[test]
    fn test_swap_authentication_failed_family() {
        let family = [
            LoopingError::SwapPayloadMalformed,
            LoopingError::SwapRouteNotAllowed,
            LoopingError::SwapMissingRouteAccounts,
            LoopingError::SwapProgramMismatch,
            LoopingError::SwapEventAuthorityMismatch,
            LoopingError::SwapDataMismatch,
            LoopingError::SwapAuthorityMismatch,
            LoopingError::SwapUnexpectedSigner,
            LoopingError::SwapInputVaultMismatch,
            LoopingError::SwapOutputVaultMismatch,
            LoopingError::SwapAmountMismatch,
            LoopingError::SwapSlippageTooHigh,
            LoopingError::SwapPlatformFeeNotAllowed,
            LoopingError::SwapNotTopLevel,
            LoopingError::SwapPayloadNotInTransaction,
        ];
        for err in family {
            assert!(LoopingError::SWAP_AUTHENTICATION_FAILED.contains(&err.code()), "{err:?}");
            assert!(err.to_string().starts_with("Swap authentication failed"), "{err:?}");
        }

        for err in [
            LoopingError::AlreadyInitialized,
            LoopingError::MissingBorrowReserve,
            LoopingError::SwapOutputBelowMinimum,
            LoopingError::MathOverflow,
        ] {
            assert!(!LoopingError::is_swap_authentication_code(err.code()), "{err:?}");
            assert!(!err.to_string().starts_with("Swap authentication failed"), "{err:?}");
        }
    }
}
