use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::{associated_token, token, token_2022};
use eco_std::account::AccountExt;
use eco_std::token::{FundTokenContext, VecTokenTransferAccounts};
use eco_std::token::TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
use eco_std::types::{self, Calldata, CalldataWithAccounts, Route};
use eco_std::{is_prover, Bytes32, EcoError};

use crate::events::Fulfillment;
use crate::instructions::InboxError;
use crate::state::{executor_pda, Config, FulfillMarker, EXECUTOR_SEED, FULFILL_MARKER_SEED};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct FulfillArgs {
    /// Route with each call's data holding a borsh [`Calldata`].
    pub route: Route,
    pub reward_hash: Bytes32,
    pub claimant: Pubkey,
    pub expected_hash: Bytes32,
}

/// Accounts shared by every fulfill flavour.
///
/// Remaining accounts: one `(solver ATA, executor ATA, mint)` triple per
/// distinct route token, then the accounts of each call in order, then
/// whatever the chosen prover needs.
#[derive(Accounts)]
pub struct Fulfill<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut)]
    pub solver: Signer<'info>,
    #[account(address = Config::pda().0 @ InboxError::InvalidConfig)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(mut, address = executor_pda().0 @ InboxError::InvalidExecutor)]
    pub executor: UncheckedAccount<'info>,
    /// CHECK: address is validated in `mark_fulfilled`
    #[account(mut)]
    pub fulfill_marker: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Outcome of the fulfill steps every flavour shares.
pub struct Fulfilled<'c, 'info> {
    pub intent_hash: Bytes32,
    pub source: u64,
    pub claimant: Pubkey,
    /// Accounts left after the token triples and call accounts.
    pub remaining_accounts: &'c [AccountInfo<'info>],
}

struct RouteCall<'c, 'info> {
    target: Pubkey,
    data: Vec<u8>,
    value: u64,
    accounts: &'c [AccountInfo<'info>],
}

pub fn fulfill<'c, 'info>(
    accounts: &Fulfill<'info>,
    remaining_accounts: &'c [AccountInfo<'info>],
    args: FulfillArgs,
) -> Result<Fulfilled<'c, 'info>> {
    let FulfillArgs {
        route,
        reward_hash,
        claimant,
        expected_hash,
    } = args;
    let config = &accounts.config;

    require!(
        config.is_solver_allowed(accounts.solver.key),
        InboxError::UnauthorizedSolveAttempt
    );
    require_keys_eq!(route.inbox, crate::ID, InboxError::InvalidInbox);
    require_eq!(route.destination, config.chain_id, InboxError::WrongChain);

    let token_amounts = route.token_amounts()?;
    let (token_accounts, remaining_accounts) =
        token_transfer_accounts(remaining_accounts, token_amounts.len())?;
    let (route, calls, remaining_accounts) = resolve_route_calls(route, remaining_accounts)?;

    let intent_hash = types::intent_hash(&route.hash(), &reward_hash);
    require!(intent_hash == expected_hash, InboxError::InvalidHash);
    require!(claimant != Pubkey::default(), InboxError::ZeroClaimant);

    mark_fulfilled(accounts, &intent_hash, &claimant, route.source)?;
    emit!(Fulfillment::new(intent_hash, route.source, claimant));

    fund_executor(accounts, &route, &token_accounts)?;
    calls
        .iter()
        .try_for_each(|call| execute_route_call(accounts, call))?;

    Ok(Fulfilled {
        intent_hash,
        source: route.source,
        claimant,
        remaining_accounts,
    })
}

fn token_transfer_accounts<'c, 'info>(
    remaining_accounts: &'c [AccountInfo<'info>],
    token_count: usize,
) -> Result<(VecTokenTransferAccounts<'info>, &'c [AccountInfo<'info>])> {
    let split_index = token_count * TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
    require_gte!(
        remaining_accounts.len(),
        split_index,
        EcoError::InvalidTokenTransferAccounts
    );
    let (token_accounts, remaining_accounts) = remaining_accounts.split_at(split_index);

    Ok((token_accounts.try_into()?, remaining_accounts))
}

/// Pairs each call with its accounts and rewrites the route into the form
/// the source chain hashed, where call data also commits to the accounts.
fn resolve_route_calls<'c, 'info>(
    mut route: Route,
    mut remaining_accounts: &'c [AccountInfo<'info>],
) -> Result<(Route, Vec<RouteCall<'c, 'info>>, &'c [AccountInfo<'info>])> {
    let mut calls = Vec::with_capacity(route.calls.len());

    for call in route.calls.iter_mut() {
        let calldata =
            Calldata::try_from_slice(&call.data).map_err(|_| EcoError::InvalidCalldata)?;
        let account_count = calldata.account_count as usize;
        require_gte!(
            remaining_accounts.len(),
            account_count,
            InboxError::InvalidCallAccounts
        );
        let (call_accounts, rest) = remaining_accounts.split_at(account_count);
        remaining_accounts = rest;

        calls.push(RouteCall {
            target: call.target,
            data: calldata.data.clone(),
            value: call.value,
            accounts: call_accounts,
        });
        call.data = CalldataWithAccounts::new(calldata, call_accounts.iter().collect())?
            .try_to_vec()?;
    }

    Ok((route, calls, remaining_accounts))
}

fn mark_fulfilled(
    accounts: &Fulfill,
    intent_hash: &Bytes32,
    claimant: &Pubkey,
    source: u64,
) -> Result<()> {
    let (fulfill_marker, bump) = FulfillMarker::pda(intent_hash);
    require_keys_eq!(
        accounts.fulfill_marker.key(),
        fulfill_marker,
        InboxError::InvalidFulfillMarker
    );
    let signer_seeds: &[&[u8]] = &[FULFILL_MARKER_SEED, intent_hash.as_ref(), &[bump]];

    FulfillMarker::new(*claimant, source, Clock::get()?.slot)
        .init(
            &accounts.fulfill_marker,
            &accounts.payer,
            &accounts.system_program,
            &[signer_seeds],
        )
        .map_err(|_| InboxError::IntentAlreadyFulfilled.into())
}

/// Moves the route's tokens and the calls' native value from the solver to
/// the executor.
fn fund_executor<'info>(
    accounts: &Fulfill<'info>,
    route: &Route,
    token_accounts: &VecTokenTransferAccounts<'info>,
) -> Result<()> {
    let route_token_amounts = route.token_amounts()?;
    token_accounts.require_mints(&route_token_amounts)?;

    let funded_tokens = FundTokenContext {
        payer: &accounts.payer,
        funder: &accounts.solver,
        fundee: accounts.executor.to_account_info(),
        token_program: &accounts.token_program,
        token_2022_program: &accounts.token_2022_program,
        associated_token_program: &accounts.associated_token_program,
        system_program: &accounts.system_program,
    }
    .fund_tokens(token_accounts, &route_token_amounts)?;
    require!(
        funded_tokens.iter().eq(route_token_amounts.keys()),
        EcoError::InvalidMint
    );

    match route.call_value()? {
        0 => Ok(()),
        value => anchor_lang::system_program::transfer(
            CpiContext::new(
                accounts.system_program.to_account_info(),
                anchor_lang::system_program::Transfer {
                    from: accounts.solver.to_account_info(),
                    to: accounts.executor.to_account_info(),
                },
            ),
            value,
        ),
    }
}

fn execute_route_call<'info>(accounts: &Fulfill<'info>, call: &RouteCall<'_, 'info>) -> Result<()> {
    require!(
        !accounts.config.is_mailbox(&call.target),
        InboxError::CallToMailbox
    );
    require!(!is_prover(&call.target), InboxError::CallToProver);

    let target = call
        .accounts
        .iter()
        .find(|account| account.key == &call.target)
        .ok_or(InboxError::InvalidCallTarget)?;
    let (_, bump) = executor_pda();
    let signer_seeds: &[&[u8]] = &[EXECUTOR_SEED, &[bump]];

    msg!(
        "Route call to {} with data 0x{} and value {}",
        call.target,
        hex::encode(&call.data),
        call.value
    );

    if !target.executable {
        require!(call.data.is_empty(), InboxError::CallToEOA);

        return match call.value {
            0 => Ok(()),
            value => invoke_signed(
                &system_instruction::transfer(accounts.executor.key, &call.target, value),
                &[
                    accounts.executor.to_account_info(),
                    target.to_account_info(),
                    accounts.system_program.to_account_info(),
                ],
                &[signer_seeds],
            )
            .map_err(Into::into),
        };
    }
    require_eq!(call.value, 0, InboxError::CallValueToProgram);

    let instruction = Instruction::new_with_bytes(
        call.target,
        &call.data,
        call.accounts
            .iter()
            .map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: account.is_signer || account.key == accounts.executor.key,
                is_writable: account.is_writable,
            })
            .collect(),
    );

    invoke_signed(&instruction, call.accounts, &[signer_seeds])
        .map_err(|_| InboxError::IntentCallFailed.into())
}
