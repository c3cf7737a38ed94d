use std::iter;
use std::ops::Deref;

use anchor_lang::prelude::AccountMeta;
use anchor_lang::{AnchorDeserialize, AnchorSerialize, Discriminator, Event};
use anchor_lang::{InstructionData, ToAccountMetas};
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::associated_token::spl_associated_token_account;
use anchor_spl::token::{self, spl_token};
use anchor_spl::token_2022::{self, spl_token_2022};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use derive_more::{Deref, DerefMut};
use eco_std::prover::Proof;
use eco_std::types::{Call, Calldata, CalldataWithAccounts, Intent, Reward, Route, TokenAmount};
use hyper_prover::state::ProofAccount;
use litesvm::types::{FailedTransactionMetadata, TransactionMetadata};
use litesvm::LiteSVM;
use rand::random;
use solana_sdk::clock::Clock;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::{Instruction, InstructionError};
use solana_sdk::message::Message;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::{Transaction, TransactionError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod inbox_context;
pub mod intent_source_context;
pub mod relayer;

pub const SOURCE_CHAIN: u64 = 10;
pub const DESTINATION_CHAIN: u64 = 8453;
pub const MAILBOX_FEE: u64 = 50_000;
pub const ROUTER_FEE: u64 = 70_000;
pub const MIN_BATCHER_REWARD: u64 = 10_000_000;

const COMPUTE_UNIT_LIMIT: u32 = 1_400_000;
const INTENT_SOURCE_BIN: &[u8] = include_bytes!("../../../target/deploy/intent_source.so");
const INBOX_BIN: &[u8] = include_bytes!("../../../target/deploy/inbox.so");
const HYPER_PROVER_BIN: &[u8] = include_bytes!("../../../target/deploy/hyper_prover.so");
const META_PROVER_BIN: &[u8] = include_bytes!("../../../target/deploy/meta_prover.so");
const LOCAL_PROVER_BIN: &[u8] = include_bytes!("../../../target/deploy/local_prover.so");
const MOCK_MAILBOX_BIN: &[u8] = include_bytes!("../../../target/deploy/mock_mailbox.so");
const MOCK_ROUTER_BIN: &[u8] = include_bytes!("../../../target/deploy/mock_router.so");
const TEST_TARGET_BIN: &[u8] = include_bytes!("../../../target/deploy/test_target.so");

pub type TransactionResult = Result<TransactionMetadata, Box<FailedTransactionMetadata>>;

/// One chain: every program deployed and initialized for `chain_id`.
#[derive(Deref, DerefMut)]
pub struct Context {
    #[deref]
    #[deref_mut]
    svm: LiteSVM,
    mint_authority: Keypair,
    pub chain_id: u64,
    pub token_program: Pubkey,
    pub payer: Keypair,
    pub creator: Keypair,
    pub funder: Keypair,
    pub solver: Keypair,
    pub claimant: Keypair,
}

pub fn inbox_init_args(chain_id: u64) -> inbox::instructions::InitArgs {
    inbox::instructions::InitArgs {
        chain_id,
        mailbox: Some(mock_mailbox::ID),
        solver_whitelist: vec![],
        min_batcher_reward: MIN_BATCHER_REWARD,
    }
}

impl Context {
    pub fn new(chain_id: u64) -> Self {
        Self::with_inbox(inbox_init_args(chain_id))
    }

    pub fn new_with_token_2022(chain_id: u64) -> Self {
        Self {
            token_program: token_2022::ID,
            ..Self::new(chain_id)
        }
    }

    pub fn with_inbox(args: inbox::instructions::InitArgs) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut svm = LiteSVM::new();
        svm.add_program(intent_source::ID, INTENT_SOURCE_BIN);
        svm.add_program(inbox::ID, INBOX_BIN);
        svm.add_program(hyper_prover::ID, HYPER_PROVER_BIN);
        svm.add_program(meta_prover::ID, META_PROVER_BIN);
        svm.add_program(local_prover::ID, LOCAL_PROVER_BIN);
        svm.add_program(mock_mailbox::ID, MOCK_MAILBOX_BIN);
        svm.add_program(mock_router::ID, MOCK_ROUTER_BIN);
        svm.add_program(test_target::ID, TEST_TARGET_BIN);

        let mint_authority = Keypair::new();
        let payer = Keypair::new();
        let creator = Keypair::new();
        let funder = Keypair::new();
        let solver = Keypair::new();
        let claimant = Keypair::new();

        svm.airdrop(&mint_authority.pubkey(), sol_amount(100.0))
            .unwrap();
        svm.airdrop(&payer.pubkey(), sol_amount(10.0)).unwrap();
        svm.airdrop(&creator.pubkey(), sol_amount(1.0)).unwrap();
        svm.airdrop(&funder.pubkey(), sol_amount(10.0)).unwrap();
        svm.airdrop(&solver.pubkey(), sol_amount(10.0)).unwrap();
        svm.airdrop(&hyper_prover::state::pda_payer_pda().0, sol_amount(1.0))
            .unwrap();
        svm.airdrop(&meta_prover::state::pda_payer_pda().0, sol_amount(1.0))
            .unwrap();

        let mut ctx = Self {
            svm,
            mint_authority,
            chain_id: args.chain_id,
            token_program: token::ID,
            payer,
            creator,
            funder,
            solver,
            claimant,
        };
        ctx.init_programs(args);

        ctx
    }

    fn init_programs(&mut self, inbox_args: inbox::instructions::InitArgs) {
        let payer = self.payer.pubkey();
        let system_program = anchor_lang::system_program::ID;
        let domain = u32::try_from(self.chain_id).unwrap();

        let instructions = [
            instruction(
                inbox::ID,
                inbox::instruction::Init { args: inbox_args },
                inbox::accounts::Init {
                    config: inbox::state::Config::pda().0,
                    payer,
                    system_program,
                },
                [],
            ),
            instruction(
                hyper_prover::ID,
                hyper_prover::instruction::Init {
                    args: hyper_prover::instructions::InitArgs {
                        mailbox: mock_mailbox::ID,
                        whitelisted_senders: vec![],
                    },
                },
                hyper_prover::accounts::Init {
                    config: hyper_prover::state::Config::pda().0,
                    payer,
                    system_program,
                },
                [],
            ),
            instruction(
                meta_prover::ID,
                meta_prover::instruction::Init {
                    args: meta_prover::instructions::InitArgs {
                        router: mock_router::ID,
                        whitelisted_senders: vec![],
                    },
                },
                meta_prover::accounts::Init {
                    config: meta_prover::state::Config::pda().0,
                    payer,
                    system_program,
                },
                [],
            ),
            instruction(
                mock_mailbox::ID,
                mock_mailbox::instruction::Init {
                    local_domain: domain,
                    fee: MAILBOX_FEE,
                },
                mock_mailbox::accounts::Init {
                    outbox: mock_mailbox::Outbox::pda().0,
                    payer,
                    system_program,
                },
                [],
            ),
            instruction(
                mock_router::ID,
                mock_router::instruction::Init {
                    local_domain: domain,
                    fee: ROUTER_FEE,
                },
                mock_router::accounts::Init {
                    router_state: mock_router::RouterState::pda().0,
                    payer,
                    system_program,
                },
                [],
            ),
            instruction(
                test_target::ID,
                test_target::instruction::Init {},
                test_target::accounts::Init {
                    counter: test_target::Counter::pda().0,
                    payer,
                    system_program,
                },
                [],
            ),
        ];

        self.send(&instructions, &[]).unwrap();
    }

    pub fn now(&self) -> u64 {
        self.svm.get_sysvar::<Clock>().unix_timestamp as u64
    }

    /// Intent with two reward tokens, two route tokens and one counter call.
    /// All four mints are created on this chain.
    pub fn rand_intent(&mut self, source: u64, destination: u64) -> Intent {
        let reward_tokens = self.rand_token_amounts(2);
        let route_tokens = self.rand_token_amounts(2);

        Intent::new(
            Route {
                salt: random::<[u8; 32]>().into(),
                source,
                destination,
                inbox: inbox::ID,
                tokens: route_tokens,
                calls: vec![increment_call()],
            },
            Reward {
                creator: self.creator.pubkey(),
                prover: hyper_prover::ID,
                deadline: self.now() + 3600,
                native_value: sol_amount(0.01),
                tokens: reward_tokens,
            },
        )
    }

    pub fn rand_token_amounts(&mut self, count: u64) -> Vec<TokenAmount> {
        (0..count)
            .map(|i| {
                let mint = Pubkey::new_unique();
                self.set_mint_account(&mint);

                TokenAmount::new(mint, (i + 1) * 1_000_000)
            })
            .collect()
    }

    pub fn set_mint_account(&mut self, mint: &Pubkey) {
        let mint_account = if self.token_program == token::ID {
            let mut mint_data = [0u8; spl_token::state::Mint::LEN];
            spl_token::state::Mint::pack(
                spl_token::state::Mint {
                    decimals: 6,
                    is_initialized: true,
                    mint_authority: Some(self.mint_authority.pubkey()).into(),
                    supply: 0,
                    freeze_authority: None.into(),
                },
                &mut mint_data,
            )
            .unwrap();

            solana_sdk::account::Account {
                lamports: self
                    .get_sysvar::<Rent>()
                    .minimum_balance(spl_token::state::Mint::LEN),
                data: mint_data.to_vec(),
                owner: self.token_program,
                executable: false,
                rent_epoch: 0,
            }
        } else {
            let mut mint_data = [0u8; spl_token_2022::state::Mint::LEN];
            spl_token_2022::state::Mint::pack(
                spl_token_2022::state::Mint {
                    decimals: 6,
                    is_initialized: true,
                    mint_authority: Some(self.mint_authority.pubkey()).into(),
                    supply: 0,
                    freeze_authority: None.into(),
                },
                &mut mint_data,
            )
            .unwrap();

            solana_sdk::account::Account {
                lamports: self
                    .get_sysvar::<Rent>()
                    .minimum_balance(spl_token_2022::state::Mint::LEN),
                data: mint_data.to_vec(),
                owner: self.token_program,
                executable: false,
                rent_epoch: 0,
            }
        };

        self.set_account(*mint, mint_account).unwrap();
    }

    /// Mints `amount` into the ATA of `recipient`, creating the ATA first.
    pub fn airdrop_token_ata(&mut self, mint: &Pubkey, recipient: &Pubkey, amount: u64) {
        let recipient_token = self.ata(recipient, mint);

        let mut instructions = if self.get_account(&recipient_token).is_none() {
            vec![spl_associated_token_account::instruction::create_associated_token_account(
                &self.mint_authority.pubkey(),
                recipient,
                mint,
                &self.token_program,
            )]
        } else {
            vec![]
        };

        match self.token_program {
            token::ID => instructions.push(
                spl_token::instruction::mint_to(
                    &self.token_program,
                    mint,
                    &recipient_token,
                    &self.mint_authority.pubkey(),
                    &[],
                    amount,
                )
                .unwrap(),
            ),
            token_2022::ID => instructions.push(
                spl_token_2022::instruction::mint_to(
                    &self.token_program,
                    mint,
                    &recipient_token,
                    &self.mint_authority.pubkey(),
                    &[],
                    amount,
                )
                .unwrap(),
            ),
            _ => panic!("unsupported token program"),
        }

        let transaction = Transaction::new(
            &[&self.mint_authority],
            Message::new(&instructions, Some(&self.mint_authority.pubkey())),
            self.latest_blockhash(),
        );

        self.send_transaction(transaction).unwrap();
    }

    pub fn airdrop_tokens(&mut self, owner: &Pubkey, tokens: &[TokenAmount]) {
        tokens
            .iter()
            .for_each(|token| self.airdrop_token_ata(&token.token, owner, token.amount));
    }

    /// Creates empty ATAs of `owner` for `mints`.
    pub fn create_atas(&mut self, owner: &Pubkey, mints: impl IntoIterator<Item = Pubkey>) {
        mints
            .into_iter()
            .for_each(|mint| self.airdrop_token_ata(&mint, owner, 0));
    }

    pub fn ata(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(owner, mint, &self.token_program)
    }

    /// `(from ATA, to ATA, mint)` metas for each mint.
    pub fn token_transfer_accounts(
        &self,
        mints: impl IntoIterator<Item = Pubkey>,
        from: &Pubkey,
        to: &Pubkey,
    ) -> Vec<AccountMeta> {
        mints
            .into_iter()
            .flat_map(|mint| {
                [
                    AccountMeta::new(self.ata(from, &mint), false),
                    AccountMeta::new(self.ata(to, &mint), false),
                    AccountMeta::new_readonly(mint, false),
                ]
            })
            .collect()
    }

    pub fn balance(&self, pubkey: &Pubkey) -> u64 {
        self.svm.get_balance(pubkey).unwrap_or_default()
    }

    pub fn token_balance(&self, pubkey: &Pubkey) -> u64 {
        self.get_account(pubkey)
            .and_then(|account| match self.token_program {
                token::ID => spl_token::state::Account::unpack(&account.data)
                    .ok()
                    .map(|account| account.amount),
                token_2022::ID => spl_token_2022::extension::StateWithExtensions::<
                    spl_token_2022::state::Account,
                >::unpack(&account.data)
                .ok()
                .map(|state| state.base.amount),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn token_balance_ata(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.token_balance(&self.ata(owner, mint))
    }

    pub fn account<T: anchor_lang::AccountDeserialize>(&self, pubkey: &Pubkey) -> Option<T> {
        self.svm
            .get_account(pubkey)
            .and_then(|account| T::try_deserialize(&mut account.data.as_slice()).ok())
    }

    /// Writes a proof account as `prover` would after receiving a proof.
    pub fn set_proof(&mut self, prover: &Pubkey, intent: &Intent, proof: Proof) {
        let mut data = Vec::new();
        data.extend_from_slice(ProofAccount::DISCRIMINATOR);
        proof.serialize(&mut data).unwrap();

        let account = solana_sdk::account::Account {
            lamports: self.get_sysvar::<Rent>().minimum_balance(data.len()),
            data,
            owner: *prover,
            executable: false,
            rent_epoch: 0,
        };

        self.set_account(Proof::pda(&intent.hash(), prover).0, account)
            .unwrap();
    }

    pub fn warp_to_timestamp(&mut self, unix_timestamp: i64) {
        let mut clock = self.get_sysvar::<Clock>();
        clock.unix_timestamp = unix_timestamp;

        self.set_sysvar(&clock);
    }

    /// Sends `instructions` paid by `payer`, which always signs, alongside
    /// `signers`.
    pub fn send(
        &mut self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> TransactionResult {
        let instructions: Vec<_> =
            iter::once(ComputeBudgetInstruction::set_compute_unit_limit(COMPUTE_UNIT_LIMIT))
                .chain(instructions.iter().cloned())
                .collect();
        let signers: Vec<_> = iter::once(&self.payer).chain(signers.iter().copied()).collect();

        let transaction = Transaction::new(
            &signers,
            Message::new(&instructions, Some(&self.payer.pubkey())),
            self.svm.latest_blockhash(),
        );

        self.send_transaction(transaction)
    }

    fn send_transaction(&mut self, transaction: Transaction) -> TransactionResult {
        let result = self.svm.send_transaction(transaction);
        match &result {
            Ok(meta) => debug!(chain = self.chain_id, logs = ?meta.logs, "transaction succeeded"),
            Err(failed) => debug!(
                chain = self.chain_id,
                err = ?failed.err,
                logs = ?failed.meta.logs,
                "transaction failed"
            ),
        }
        self.expire_blockhash();
        let slot = self.svm.get_sysvar::<Clock>().slot;
        self.svm.warp_to_slot(slot + 1);

        result.map_err(Box::new)
    }
}

/// Builds an Anchor instruction: the accounts struct first, then `remaining`.
pub fn instruction(
    program_id: Pubkey,
    data: impl InstructionData,
    accounts: impl ToAccountMetas,
    remaining: impl IntoIterator<Item = AccountMeta>,
) -> Instruction {
    Instruction {
        program_id,
        accounts: accounts
            .to_account_metas(None)
            .into_iter()
            .chain(remaining)
            .collect(),
        data: data.data(),
    }
}

/// Route call in the form the source chain commits to: the call data
/// together with the metas of the accounts it runs against.
pub fn route_call(target: Pubkey, data: Vec<u8>, value: u64, accounts: Vec<AccountMeta>) -> Call {
    let calldata = Calldata::new(data, accounts.len() as u8);
    let calldata = CalldataWithAccounts::new(calldata, accounts).unwrap();

    Call::new(target, calldata.try_to_vec().unwrap(), value)
}

/// Bumps the test target's counter, signed by the inbox executor.
pub fn increment_call() -> Call {
    route_call(
        test_target::ID,
        test_target::instruction::Increment {}.data(),
        0,
        vec![
            AccountMeta::new(test_target::Counter::pda().0, false),
            AccountMeta::new(inbox::state::executor_pda().0, false),
            AccountMeta::new_readonly(test_target::ID, false),
        ],
    )
}

pub fn revert_call() -> Call {
    route_call(
        test_target::ID,
        test_target::instruction::Revert {}.data(),
        0,
        vec![AccountMeta::new_readonly(test_target::ID, false)],
    )
}

/// Sends `value` lamports from the executor to a plain account.
pub fn transfer_call(recipient: Pubkey, value: u64) -> Call {
    route_call(
        recipient,
        vec![],
        value,
        vec![AccountMeta::new(recipient, false)],
    )
}

/// Splits a committed route into the route a solver submits, whose call
/// data is plain `Calldata`, and the call accounts in order.
pub fn destination_route(route: &Route) -> (Route, Vec<AccountMeta>) {
    let mut route = route.clone();
    let mut accounts = Vec::new();

    for call in route.calls.iter_mut() {
        let CalldataWithAccounts {
            calldata,
            accounts: metas,
        } = CalldataWithAccounts::try_from_slice(&call.data).unwrap();

        accounts.extend(metas.into_iter().map(|meta| AccountMeta {
            pubkey: meta.pubkey,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        }));
        call.data = calldata.try_to_vec().unwrap();
    }

    (route, accounts)
}

pub fn sol_amount(amount: f64) -> u64 {
    (amount * 1_000_000_000.0) as u64
}

pub fn contains_event<E>(expected: E) -> impl Fn(TransactionMetadata) -> bool
where
    E: Event,
{
    let expected = STANDARD.encode(expected.data());

    move |actual: TransactionMetadata| {
        actual
            .logs
            .iter()
            .any(|log| log.contains(format!("Program data: {}", expected).as_str()))
    }
}

pub fn is_error<T, Err>(expected: Err) -> impl Fn(T) -> bool
where
    T: Deref<Target = FailedTransactionMetadata>,
    Err: Into<u32>,
{
    let expected = expected.into();

    move |actual: T| match actual.err {
        TransactionError::InstructionError(_, InstructionError::Custom(error_code)) => {
            error_code == expected
        }
        _ => false,
    }
}

/// Matches failures the runtime raises rather than a program error code.
pub fn is_instruction_error<T>(expected: InstructionError) -> impl Fn(T) -> bool
where
    T: Deref<Target = FailedTransactionMetadata>,
{
    move |actual: T| match &actual.err {
        TransactionError::InstructionError(_, error) => *error == expected,
        _ => false,
    }
}
