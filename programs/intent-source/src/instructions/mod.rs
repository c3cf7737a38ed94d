use anchor_lang::prelude::*;

pub mod fund;
pub mod is_intent_funded;
pub mod permit;
pub mod publish;
pub mod refund;
pub mod withdraw;

pub use fund::*;
pub use is_intent_funded::*;
pub use publish::*;
pub use refund::*;
pub use withdraw::*;

#[error_code(offset = 6000)]
pub enum IntentSourceError {
    IntentAlreadyExists,
    InsufficientNativeReward,
    InsufficientFunds,
    NativeRewardTransferFailed,
    UnauthorizedWithdrawal,
    RewardsAlreadyWithdrawn,
    ArrayLengthMismatch,
    InsufficientNativeBalance,
    InsufficientTokenBalance,
    RefundTokenCannotBeRewardToken,
    IntentNotExpired,
    #[msg("Intent is proven and funded, it can only be withdrawn")]
    IntentNotClaimed,
    InvalidVault,
    InvalidFunder,
    InvalidClaimState,
    InvalidProof,
    InvalidClaimant,
    InvalidCreator,
    InvalidRecipientToken,
    InvalidPermitCall,
    InvalidWithdrawAccounts,
}
