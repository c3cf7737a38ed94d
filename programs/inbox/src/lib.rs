//! # Inbox
//!
//! Destination-chain half of the protocol. Solvers fulfill intents here by
//! supplying the route's tokens and native value; the inbox executes the
//! route's calls through its executor PDA and records who fulfilled each
//! intent hash in a `FulfillMarker`.
//!
//! ## Instructions
//! - `fulfill_storage`: fulfills and leaves proving to a verifier reading
//!   the marker
//! - `fulfill_message_bridge`: fulfills and asks a prover to send the proof
//!   to the source chain in the same transaction
//! - `fulfill_message_bridge_batched`: fulfills and queues the intent with a
//!   reward for the batcher
//! - `send_batch`: proves queued intents in one message and pays the batcher
//!
//! ## Security
//! - Every intent hash is fulfilled at most once
//! - Route calls may not target provers or the mailbox, and may only send
//!   value to accounts that are not programs
//! - A failing call reverts the whole fulfillment

use anchor_lang::prelude::*;

declare_id!("EHm97SAjJxxTbeX8Rc24RHdqqqqqX4uk7zSrXtsPwQ4b");

pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod inbox {
    use super::*;

    /// Creates the inbox config with this chain's id and fulfillment policy.
    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    /// Fulfills an intent without requesting a proof.
    ///
    /// # Arguments
    /// * `ctx` - Solver, executor and marker; token triples, call accounts
    ///   follow as remaining accounts
    /// * `args` - Route, reward hash, claimant and the expected intent hash
    ///
    /// # Security
    /// - The recomputed intent hash must equal `expected_hash`
    /// - The solver must be whitelisted when a whitelist is set
    pub fn fulfill_storage<'info>(
        ctx: Context<'_, '_, '_, 'info, Fulfill<'info>>,
        args: FulfillArgs,
    ) -> Result<()> {
        instructions::fulfill_storage(ctx, args)
    }

    /// Fulfills an intent and has `prove.local_prover` send the proof.
    ///
    /// The prover's own accounts follow the call accounts.
    pub fn fulfill_message_bridge<'info>(
        ctx: Context<'_, '_, '_, 'info, FulfillMessageBridge<'info>>,
        args: FulfillArgs,
        prove: ProveParams,
    ) -> Result<()> {
        instructions::fulfill_message_bridge(ctx, args, prove)
    }

    /// Fulfills an intent and queues it for a later `send_batch`, moving
    /// `batch.reward` lamports from the solver into the batch entry.
    pub fn fulfill_message_bridge_batched<'info>(
        ctx: Context<'_, '_, '_, 'info, FulfillMessageBridgeBatched<'info>>,
        args: FulfillArgs,
        batch: BatchParams,
    ) -> Result<()> {
        instructions::fulfill_message_bridge_batched(ctx, args, batch)
    }

    /// Proves a set of fulfilled intents in one prover message.
    ///
    /// # Security
    /// - Every intent must have been fulfilled for `args.source`
    /// - Only entries queued for the same prover pair are paid out
    pub fn send_batch<'info>(
        ctx: Context<'_, '_, '_, 'info, SendBatch<'info>>,
        args: SendBatchArgs,
    ) -> Result<()> {
        instructions::send_batch(ctx, args)
    }
}
