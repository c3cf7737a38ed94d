use anchor_lang::prelude::*;

pub mod fulfill;
pub mod fulfill_batched;
pub mod fulfill_message_bridge;
pub mod fulfill_storage;
pub mod init;
pub mod send_batch;

pub use fulfill::*;
pub use fulfill_batched::*;
pub use fulfill_message_bridge::*;
pub use fulfill_storage::*;
pub use init::*;
pub use send_batch::*;

#[error_code(offset = 6100)]
pub enum InboxError {
    UnauthorizedSolveAttempt,
    InvalidInbox,
    WrongChain,
    InvalidHash,
    IntentAlreadyFulfilled,
    ZeroClaimant,
    CallToMailbox,
    CallToProver,
    CallToEOA,
    IntentCallFailed,
    InsufficientBatcherReward,
    IntentNotFulfilled,
    WrongSourceChain,
    InvalidProver,
    InvalidConfig,
    InvalidExecutor,
    InvalidDispatcher,
    InvalidFulfillMarker,
    InvalidBatchEntry,
    InvalidCallTarget,
    InvalidCallAccounts,
    CallValueToProgram,
    TooManyWhitelistedSolvers,
}
