use anchor_lang::prelude::*;
use derive_new::new;
use ethabi::{ParamType, Token};
use itertools::Itertools;

use crate::account::AccountExt;
use crate::{Bytes32, EcoError};

pub const PROOF_SEED: &[u8] = b"proof";
pub const PROVE_DISCRIMINATOR: [u8; 8] = [52, 246, 26, 161, 211, 170, 86, 215];
pub const PROOF_TYPE_DISCRIMINATOR: [u8; 8] = [173, 214, 59, 163, 148, 23, 179, 48];

/// Proof a prover records for one intent. Stored at [`Proof::pda`] under
/// the prover's program id and never overwritten.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default, Debug, new)]
#[derive(PartialEq, Eq)]
pub struct Proof {
    pub destination: u64,
    pub claimant: Pubkey,
}

impl Proof {
    pub fn pda(intent_hash: &Bytes32, prover: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[PROOF_SEED, intent_hash.as_ref()], prover)
    }

    /// Reads a proof account written by `prover`. Accounts owned by anyone
    /// else, or not yet created, hold no proof.
    pub fn try_from_account_info(
        account: &AccountInfo<'_>,
        prover: &Pubkey,
    ) -> Result<Option<Self>> {
        if account.owner != prover {
            return Ok(None);
        }

        account
            .try_borrow_data()?
            .get(8..)
            .map(Self::try_from_slice)
            .transpose()
            .map_err(Into::into)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofType {
    Storage,
    Hyperlane,
    Metalayer,
    Local,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct IntentHashClaimant {
    pub intent_hash: Bytes32,
    pub claimant: Bytes32,
}

/// Arguments of the `prove` instruction every prover exposes to the inbox.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct ProveArgs {
    pub sender: Pubkey,
    pub source: u64,
    pub intent_hashes_claimants: Vec<IntentHashClaimant>,
    pub source_chain_prover: Bytes32,
    pub data: Vec<u8>,
    /// Most the sender pays the bridge for delivery.
    pub fee: u64,
}

impl ProveArgs {
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        Ok(PROVE_DISCRIMINATOR
            .into_iter()
            .chain(self.try_to_vec()?)
            .collect())
    }
}

/// Cross-chain message body: ABI `(bytes32[] intentHashes, bytes32[] claimants)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, new)]
pub struct ProofData {
    pub intent_hashes_claimants: Vec<IntentHashClaimant>,
}

impl ProofData {
    pub fn to_bytes(&self) -> Vec<u8> {
        let (intent_hashes, claimants): (Vec<_>, Vec<_>) = self
            .intent_hashes_claimants
            .iter()
            .map(|entry| {
                (
                    Token::FixedBytes(entry.intent_hash.to_vec()),
                    Token::FixedBytes(entry.claimant.to_vec()),
                )
            })
            .unzip();

        ethabi::encode(&[Token::Array(intent_hashes), Token::Array(claimants)])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes32_array = ParamType::Array(Box::new(ParamType::FixedBytes(32)));
        let mut tokens = ethabi::decode(&[bytes32_array.clone(), bytes32_array], bytes)
            .map_err(|_| EcoError::InvalidProofData)?
            .into_iter()
            .map(bytes32_array_from_token);

        let (Some(Some(intent_hashes)), Some(Some(claimants)), None) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(EcoError::InvalidProofData.into());
        };
        require!(
            intent_hashes.len() == claimants.len(),
            EcoError::ArrayLengthMismatch
        );

        Ok(Self::new(
            intent_hashes
                .into_iter()
                .zip_eq(claimants)
                .map(|(intent_hash, claimant)| IntentHashClaimant::new(intent_hash, claimant))
                .collect(),
        ))
    }
}

fn bytes32_array_from_token(token: Token) -> Option<Vec<Bytes32>> {
    token
        .into_array()?
        .into_iter()
        .map(|token| {
            token
                .into_fixed_bytes()
                .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
                .map(Bytes32::from)
        })
        .collect()
}

#[event]
#[derive(new)]
pub struct IntentProven {
    intent_hash: Bytes32,
    claimant: Pubkey,
    destination: u64,
}

#[event]
#[derive(new)]
pub struct IntentAlreadyProven {
    intent_hash: Bytes32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofRecord {
    Proven,
    AlreadyProven,
    ZeroClaimant,
}

/// Writes proofs on behalf of a prover program. Each proof account is a PDA
/// of the prover, paid for by `payer` (itself a PDA when `payer_seeds` is
/// non-empty).
pub struct ProofRecorder<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub payer_seeds: &'a [&'a [u8]],
    pub system_program: &'a Program<'info, System>,
    pub destination: u64,
}

impl<'info> ProofRecorder<'_, 'info> {
    /// Records every pair in order. Proofs that already exist and zero
    /// claimants are skipped without failing the batch.
    pub fn record_all<T>(
        &self,
        proof_accounts: &[AccountInfo<'info>],
        entries: &[IntentHashClaimant],
    ) -> Result<Vec<ProofRecord>>
    where
        T: AccountExt + From<Proof>,
    {
        require!(
            proof_accounts.len() == entries.len(),
            EcoError::ArrayLengthMismatch
        );

        proof_accounts
            .iter()
            .zip_eq(entries)
            .map(|(account, entry)| self.record::<T>(account, entry))
            .collect()
    }

    pub fn record<T>(
        &self,
        account: &AccountInfo<'info>,
        entry: &IntentHashClaimant,
    ) -> Result<ProofRecord>
    where
        T: AccountExt + From<Proof>,
    {
        let (address, bump) = Proof::pda(&entry.intent_hash, &T::owner());
        require_keys_eq!(address, account.key(), EcoError::InvalidProofAccount);

        if !account.data_is_empty() {
            emit!(IntentAlreadyProven::new(entry.intent_hash));
            return Ok(ProofRecord::AlreadyProven);
        }

        if entry.claimant.is_zero() {
            msg!("Skipping zero claimant for {}", entry.intent_hash);
            return Ok(ProofRecord::ZeroClaimant);
        }

        let claimant = Pubkey::from(entry.claimant);
        let proof_seeds: &[&[u8]] = &[PROOF_SEED, entry.intent_hash.as_ref(), &[bump]];
        let signer_seeds = match self.payer_seeds.is_empty() {
            true => vec![proof_seeds],
            false => vec![self.payer_seeds, proof_seeds],
        };

        T::from(Proof::new(self.destination, claimant)).init(
            account,
            self.payer,
            self.system_program,
            &signer_seeds,
        )?;
        emit!(IntentProven::new(entry.intent_hash, claimant, self.destination));

        Ok(ProofRecord::Proven)
    }
}
