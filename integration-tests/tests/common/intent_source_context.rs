use anchor_lang::prelude::AccountMeta;
use anchor_lang::{AnchorDeserialize, AnchorSerialize};
use derive_more::{Deref, DerefMut};
use eco_std::prover::Proof;
use eco_std::types::{Call, Calldata, Intent};
use intent_source::instructions::{BatchWithdrawArgs, FundArgs, RefundArgs, WithdrawArgs};
use intent_source::state::{intent_funder_address, intent_vault_address, ClaimState};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;

use crate::common::{instruction, Context, TransactionResult};

#[derive(Deref, DerefMut)]
pub struct IntentSource<'a>(&'a mut Context);

impl Context {
    pub fn intent_source(&mut self) -> IntentSource {
        IntentSource(self)
    }
}

/// Permit call running `data` against `accounts`, which the caller passes
/// ahead of the fund accounts.
pub fn permit_call(target: Pubkey, data: Vec<u8>, value: u64, accounts: &[AccountMeta]) -> Call {
    let calldata = Calldata::new(data, accounts.len() as u8);

    Call::new(target, calldata.try_to_vec().unwrap(), value)
}

fn reward_mints(intent: &Intent) -> Vec<Pubkey> {
    intent.reward.token_amounts().unwrap().into_keys().collect()
}

impl IntentSource<'_> {
    pub fn publish(&mut self, intent: &Intent) -> TransactionResult {
        let instruction = instruction(
            intent_source::ID,
            intent_source::instruction::Publish {
                intent: intent.clone(),
            },
            intent_source::accounts::Publish {
                payer: self.payer.pubkey(),
                claim_state: ClaimState::pda(&intent.hash()).0,
                system_program: anchor_lang::system_program::ID,
            },
            [],
        );

        self.send(&[instruction], &[])
    }

    /// Publishes `intent` and funds it from `funder`'s ATAs.
    pub fn publish_and_fund(&mut self, intent: &Intent) -> TransactionResult {
        let funder = self.funder.insecure_clone();
        let vault = intent_vault_address(intent);
        let instruction = instruction(
            intent_source::ID,
            intent_source::instruction::PublishAndFund {
                intent: intent.clone(),
            },
            intent_source::accounts::PublishAndFund {
                claim_state: ClaimState::pda(&intent.hash()).0,
                fund: self.fund_accounts(&funder.pubkey(), vault),
            },
            self.token_transfer_accounts(reward_mints(intent), &funder.pubkey(), &vault),
        );

        self.send(&[instruction], &[&funder])
    }

    pub fn fund(&mut self, intent: &Intent, allow_partial: bool) -> TransactionResult {
        let funder = self.funder.insecure_clone();
        let instruction =
            self.fund_instruction(intent, &funder.pubkey(), vec![], vec![], None, allow_partial);

        self.send(&[instruction], &[&funder])
    }

    /// Fund instruction with `permit_calls`, whose accounts go first, and an
    /// optional token to recover from the intent's funder PDA.
    pub fn fund_instruction(
        &self,
        intent: &Intent,
        funder: &Pubkey,
        permit_calls: Vec<Call>,
        permit_accounts: Vec<AccountMeta>,
        recover_token: Option<Pubkey>,
        allow_partial: bool,
    ) -> Instruction {
        let hashes = intent.hashes();
        let vault = intent_vault_address(intent);
        let recover_accounts = recover_token.iter().flat_map(|mint| {
            let intent_funder = intent_funder_address(intent);

            [
                AccountMeta::new_readonly(intent_funder, false),
                AccountMeta::new(self.ata(&intent_funder, mint), false),
                AccountMeta::new(self.ata(funder, mint), false),
                AccountMeta::new_readonly(*mint, false),
            ]
        });

        instruction(
            intent_source::ID,
            intent_source::instruction::Fund {
                args: FundArgs {
                    route_hash: hashes.route_hash,
                    reward: intent.reward.clone(),
                    permit_calls,
                    recover_token,
                    allow_partial,
                },
            },
            self.fund_accounts(funder, vault),
            permit_accounts
                .into_iter()
                .chain(self.token_transfer_accounts(reward_mints(intent), funder, &vault))
                .chain(recover_accounts)
                .collect::<Vec<_>>(),
        )
    }

    fn fund_accounts(&self, funder: &Pubkey, vault: Pubkey) -> intent_source::accounts::Fund {
        intent_source::accounts::Fund {
            payer: self.payer.pubkey(),
            funder: *funder,
            vault,
            token_program: anchor_spl::token::ID,
            token_2022_program: anchor_spl::token_2022::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            system_program: anchor_lang::system_program::ID,
        }
    }

    pub fn is_intent_funded(&mut self, intent: &Intent) -> bool {
        let vault = intent_vault_address(intent);
        let vault_accounts: Vec<_> = reward_mints(intent)
            .into_iter()
            .flat_map(|mint| {
                [
                    AccountMeta::new_readonly(self.ata(&vault, &mint), false),
                    AccountMeta::new_readonly(mint, false),
                ]
            })
            .collect();
        let instruction = instruction(
            intent_source::ID,
            intent_source::instruction::IsIntentFunded {
                intent: intent.clone(),
            },
            intent_source::accounts::IsIntentFunded { vault },
            vault_accounts,
        );

        let result = self.send(&[instruction], &[]).unwrap();
        bool::try_from_slice(&result.return_data.data).unwrap()
    }

    /// Withdraws to `claimant`, whose reward token ATAs must exist.
    pub fn withdraw(&mut self, intent: &Intent, claimant: &Pubkey) -> TransactionResult {
        let hashes = intent.hashes();
        let vault = intent_vault_address(intent);
        let instruction = instruction(
            intent_source::ID,
            intent_source::instruction::Withdraw {
                args: WithdrawArgs::new(hashes.route_hash, intent.reward.clone()),
            },
            intent_source::accounts::Withdraw {
                payer: self.payer.pubkey(),
                claimant: *claimant,
                vault,
                proof: Proof::pda(&hashes.intent_hash, &intent.reward.prover).0,
                claim_state: ClaimState::pda(&hashes.intent_hash).0,
                token_program: anchor_spl::token::ID,
                token_2022_program: anchor_spl::token_2022::ID,
                system_program: anchor_lang::system_program::ID,
            },
            self.token_transfer_accounts(reward_mints(intent), &vault, claimant),
        );

        self.send(&[instruction], &[])
    }

    pub fn batch_withdraw(&mut self, intents: &[Intent], claimant: &Pubkey) -> TransactionResult {
        let intent_accounts: Vec<_> = intents
            .iter()
            .flat_map(|intent| {
                let intent_hash = intent.hash();
                let vault = intent_vault_address(intent);

                [
                    AccountMeta::new(*claimant, false),
                    AccountMeta::new(vault, false),
                    AccountMeta::new_readonly(
                        Proof::pda(&intent_hash, &intent.reward.prover).0,
                        false,
                    ),
                    AccountMeta::new(ClaimState::pda(&intent_hash).0, false),
                ]
                .into_iter()
                .chain(self.token_transfer_accounts(reward_mints(intent), &vault, claimant))
            })
            .collect();
        let instruction = instruction(
            intent_source::ID,
            intent_source::instruction::BatchWithdraw {
                args: BatchWithdrawArgs::new(
                    intents.iter().map(|intent| intent.route.hash()).collect(),
                    intents.iter().map(|intent| intent.reward.clone()).collect(),
                ),
            },
            intent_source::accounts::BatchWithdraw {
                payer: self.payer.pubkey(),
                token_program: anchor_spl::token::ID,
                token_2022_program: anchor_spl::token_2022::ID,
                system_program: anchor_lang::system_program::ID,
            },
            intent_accounts,
        );

        self.send(&[instruction], &[])
    }

    /// Refunds to the creator, whose token ATAs must exist for every mint
    /// the vault still holds.
    pub fn refund(&mut self, intent: &Intent, token: Option<Pubkey>) -> TransactionResult {
        let hashes = intent.hashes();
        let vault = intent_vault_address(intent);
        let creator = intent.reward.creator;
        let mints = reward_mints(intent).into_iter().chain(token);
        let instruction = instruction(
            intent_source::ID,
            intent_source::instruction::Refund {
                args: RefundArgs::new(hashes.route_hash, intent.reward.clone(), token),
            },
            intent_source::accounts::Refund {
                payer: self.payer.pubkey(),
                creator,
                vault,
                proof: Proof::pda(&hashes.intent_hash, &intent.reward.prover).0,
                claim_state: ClaimState::pda(&hashes.intent_hash).0,
                token_program: anchor_spl::token::ID,
                token_2022_program: anchor_spl::token_2022::ID,
                system_program: anchor_lang::system_program::ID,
            },
            self.token_transfer_accounts(mints, &vault, &creator),
        );

        self.send(&[instruction], &[])
    }
}
