use anchor_lang::prelude::AccountMeta;
use anchor_lang::{AccountSerialize, Space, ToAccountMetas};
use derive_more::{Deref, DerefMut};
use eco_std::prover::Proof;
use eco_std::types::{Intent, Route};
use eco_std::Bytes32;
use inbox::instructions::{BatchParams, FulfillArgs, ProveParams, SendBatchArgs};
use inbox::state::{dispatcher_pda, executor_pda, BatchEntry, Config, FulfillMarker};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use solana_sdk::signer::Signer;

use crate::common::{destination_route, instruction, Context, TransactionResult};

#[derive(Deref, DerefMut)]
pub struct Inbox<'a>(&'a mut Context);

impl Context {
    pub fn inbox(&mut self) -> Inbox {
        Inbox(self)
    }

    /// Accounts the hyper prover needs to dispatch the next mailbox message,
    /// paid by the solver.
    pub fn hyper_prove_accounts(&self) -> Vec<AccountMeta> {
        let nonce = self
            .account::<mock_mailbox::Outbox>(&mock_mailbox::Outbox::pda().0)
            .unwrap()
            .nonce;

        hyper_prover::accounts::Prove {
            inbox_dispatcher: dispatcher_pda().0,
            config: hyper_prover::state::Config::pda().0,
            dispatcher: hyper_prover::state::dispatcher_pda().0,
            payer: self.solver.pubkey(),
            outbox: mock_mailbox::Outbox::pda().0,
            dispatched_message: mock_mailbox::DispatchedMessage::pda(nonce).0,
            mailbox_program: mock_mailbox::ID,
            system_program: anchor_lang::system_program::ID,
        }
        .to_account_metas(None)
        .into_iter()
        .skip(1)
        .collect()
    }

    pub fn meta_prove_accounts(&self) -> Vec<AccountMeta> {
        let nonce = self
            .account::<mock_router::RouterState>(&mock_router::RouterState::pda().0)
            .unwrap()
            .nonce;

        meta_prover::accounts::Prove {
            inbox_dispatcher: dispatcher_pda().0,
            config: meta_prover::state::Config::pda().0,
            dispatcher: meta_prover::state::dispatcher_pda().0,
            payer: self.solver.pubkey(),
            router_state: mock_router::RouterState::pda().0,
            dispatched_message: mock_router::DispatchedMessage::pda(nonce).0,
            router_program: mock_router::ID,
            system_program: anchor_lang::system_program::ID,
        }
        .to_account_metas(None)
        .into_iter()
        .skip(1)
        .collect()
    }

    /// Overwrites the inbox config in place, as a re-initialization would.
    pub fn set_inbox_config(&mut self, config: Config) {
        let mut data = Vec::with_capacity(8 + Config::INIT_SPACE);
        config.try_serialize(&mut data).unwrap();
        data.resize(8 + Config::INIT_SPACE, 0);

        let account = solana_sdk::account::Account {
            lamports: self.get_sysvar::<Rent>().minimum_balance(data.len()),
            data,
            owner: inbox::ID,
            executable: false,
            rent_epoch: 0,
        };

        self.set_account(Config::pda().0, account).unwrap();
    }

    /// Local prover accounts followed by a proof PDA per intent hash.
    pub fn local_prove_accounts(&self, intent_hashes: &[Bytes32]) -> Vec<AccountMeta> {
        local_prover::accounts::Prove {
            inbox_dispatcher: dispatcher_pda().0,
            inbox_config: Config::pda().0,
            payer: self.solver.pubkey(),
            system_program: anchor_lang::system_program::ID,
        }
        .to_account_metas(None)
        .into_iter()
        .skip(1)
        .chain(intent_hashes.iter().map(|intent_hash| {
            AccountMeta::new(Proof::pda(intent_hash, &local_prover::ID).0, false)
        }))
        .collect()
    }
}

/// Proof sent by `prover` to the same program on the source chain.
pub fn prove_params(prover: Pubkey, fee: u64) -> ProveParams {
    ProveParams {
        local_prover: prover,
        source_chain_prover: prover.into(),
        data: vec![],
        fee,
    }
}

impl Inbox<'_> {
    /// Mints the route's tokens to the solver.
    pub fn fund_solver(&mut self, route: &Route) {
        let solver = self.solver.pubkey();

        self.airdrop_tokens(&solver, &route.tokens);
    }

    fn fulfill_accounts(&self, intent_hash: &Bytes32) -> inbox::accounts::Fulfill {
        inbox::accounts::Fulfill {
            payer: self.payer.pubkey(),
            solver: self.solver.pubkey(),
            config: Config::pda().0,
            executor: executor_pda().0,
            fulfill_marker: FulfillMarker::pda(intent_hash).0,
            token_program: anchor_spl::token::ID,
            token_2022_program: anchor_spl::token_2022::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            system_program: anchor_lang::system_program::ID,
        }
    }

    /// Arguments and the token and call accounts of fulfilling `intent`.
    pub fn fulfill_parts(
        &self,
        intent: &Intent,
        claimant: &Pubkey,
    ) -> (FulfillArgs, Vec<AccountMeta>) {
        let (route, call_accounts) = destination_route(&intent.route);
        let mints = route.token_amounts().unwrap().into_keys();
        let accounts = self
            .token_transfer_accounts(mints, &self.solver.pubkey(), &executor_pda().0)
            .into_iter()
            .chain(call_accounts)
            .collect();

        let args = FulfillArgs {
            route,
            reward_hash: intent.reward.hash(),
            claimant: *claimant,
            expected_hash: intent.hash(),
        };

        (args, accounts)
    }

    pub fn fulfill_storage_instruction(&self, intent: &Intent, claimant: &Pubkey) -> Instruction {
        let (args, accounts) = self.fulfill_parts(intent, claimant);

        self.fulfill_storage_instruction_with(args, accounts)
    }

    /// Fulfill instruction for hand-built `args`, with the marker of
    /// `args.expected_hash`.
    pub fn fulfill_storage_instruction_with(
        &self,
        args: FulfillArgs,
        accounts: Vec<AccountMeta>,
    ) -> Instruction {
        let fulfill_accounts = self.fulfill_accounts(&args.expected_hash);

        instruction(
            inbox::ID,
            inbox::instruction::FulfillStorage { args },
            fulfill_accounts,
            accounts,
        )
    }

    pub fn fulfill_storage(&mut self, intent: &Intent, claimant: &Pubkey) -> TransactionResult {
        let (args, accounts) = self.fulfill_parts(intent, claimant);

        self.fulfill_storage_with(args, accounts)
    }

    pub fn fulfill_storage_with(
        &mut self,
        args: FulfillArgs,
        accounts: Vec<AccountMeta>,
    ) -> TransactionResult {
        let instruction = self.fulfill_storage_instruction_with(args, accounts);
        let solver = self.solver.insecure_clone();

        self.send(&[instruction], &[&solver])
    }

    pub fn fulfill_message_bridge(
        &mut self,
        intent: &Intent,
        claimant: &Pubkey,
        prove: ProveParams,
        prover_accounts: Vec<AccountMeta>,
    ) -> TransactionResult {
        let (args, accounts) = self.fulfill_parts(intent, claimant);
        let instruction = instruction(
            inbox::ID,
            inbox::instruction::FulfillMessageBridge {
                args,
                prove: prove.clone(),
            },
            inbox::accounts::FulfillMessageBridge {
                fulfill: self.fulfill_accounts(&intent.hash()),
                prover: prove.local_prover,
                dispatcher: dispatcher_pda().0,
            },
            accounts.into_iter().chain(prover_accounts).collect::<Vec<_>>(),
        );
        let solver = self.solver.insecure_clone();

        self.send(&[instruction], &[&solver])
    }

    pub fn fulfill_batched(
        &mut self,
        intent: &Intent,
        claimant: &Pubkey,
        batch: BatchParams,
    ) -> TransactionResult {
        let (args, accounts) = self.fulfill_parts(intent, claimant);
        let intent_hash = intent.hash();
        let instruction = instruction(
            inbox::ID,
            inbox::instruction::FulfillMessageBridgeBatched { args, batch },
            inbox::accounts::FulfillMessageBridgeBatched {
                fulfill: self.fulfill_accounts(&intent_hash),
                batch_entry: BatchEntry::pda(&intent_hash).0,
            },
            accounts,
        );
        let solver = self.solver.insecure_clone();

        self.send(&[instruction], &[&solver])
    }

    /// Sends a batch as the solver, with a `(marker, entry)` pair per hash.
    pub fn send_batch(
        &mut self,
        args: SendBatchArgs,
        prover_accounts: Vec<AccountMeta>,
    ) -> TransactionResult {
        let batch_accounts = args.intent_hashes.iter().flat_map(|intent_hash| {
            [
                AccountMeta::new_readonly(FulfillMarker::pda(intent_hash).0, false),
                AccountMeta::new(BatchEntry::pda(intent_hash).0, false),
            ]
        });
        let instruction = instruction(
            inbox::ID,
            inbox::instruction::SendBatch { args: args.clone() },
            inbox::accounts::SendBatch {
                batcher: self.solver.pubkey(),
                prover: args.local_prover,
                dispatcher: dispatcher_pda().0,
            },
            batch_accounts.chain(prover_accounts).collect::<Vec<_>>(),
        );
        let solver = self.solver.insecure_clone();

        self.send(&[instruction], &[&solver])
    }
}
