//! Deposit into a choice.

use soroban_sdk::{log, symbol_short, token, Address, Env};

use crate::accumulator::ChoiceAggregate;
use crate::cycle;
use crate::error::ArenaError;
use crate::fees;
use crate::position::{self, Position};
use crate::storage;
use crate::types::PositionSnapshot;

/// Pull `amount` from `participant` into `(topic_id, choice_id)`.
///
/// The external fee goes to the arena, topic and choice treasuries. The
/// contributor fee is shared among the choice's existing shareholders, or
/// returned to the depositor when nobody holds shares yet. The rest is added
/// to the participant's position.
///
/// The caller must have authorised `participant`.
pub fn vote(
    env: &Env,
    participant: &Address,
    topic_id: u32,
    choice_id: u32,
    amount: i128,
) -> Result<PositionSnapshot, ArenaError> {
    let config = storage::config(env)?;
    let topic = storage::topic(env, topic_id)?;
    let choice = storage::choice(env, topic_id, choice_id)?;

    if amount < config.min_vote_amount {
        return Err(ArenaError::BelowMinimum);
    }

    let now = cycle::topic_cycle(&topic, env.ledger().timestamp())?;
    let split = fees::split(
        amount,
        config.arena_fee_bps,
        topic.topic_fee_bps,
        choice.fee_bps,
        topic.contributor_fee_bps,
    )?;

    let token_client = token::Client::new(env, &config.token);
    let arena = env.current_contract_address();
    if token_client.balance(participant) < amount {
        return Err(ArenaError::InsufficientBalance);
    }
    if token_client.allowance(participant, &arena) < amount {
        return Err(ArenaError::InsufficientAllowance);
    }
    token_client.transfer_from(&arena, participant, &arena, &amount);

    let mut aggregate = storage::aggregate(env, topic_id, choice_id)
        .unwrap_or_else(|| ChoiceAggregate::new(env, now));
    aggregate.roll_to(env, now);
    storage::close_epoch(env, topic_id, choice_id, &mut aggregate)?;

    let mut position = match storage::position(env, topic_id, choice_id, participant) {
        Some(position) => position,
        None => {
            aggregate.voters = aggregate.voters.checked_add(1).ok_or(ArenaError::Overflow)?;
            Position::new(env, &aggregate)
        }
    };
    let closed = |epoch: u32| storage::closed_index(env, topic_id, choice_id, epoch);
    position::catch_up(env, &mut position, &mut aggregate, &closed)?;

    storage::credit(env, &config.treasury, split.arena)?;
    storage::credit(env, &topic.treasury, split.topic)?;

    let net = if aggregate.has_shares(env) {
        aggregate.distribute(env, split.contributor);
        storage::close_epoch(env, topic_id, choice_id, &mut aggregate)?;
        // Own share of the fee, from shares held before this deposit
        position::catch_up(env, &mut position, &mut aggregate, &closed)?;
        split.net
    } else {
        // Nobody to pay: the contributor slice stays with the depositor
        split
            .net
            .checked_add(split.contributor)
            .ok_or(ArenaError::Overflow)?
    };
    position::deposit(env, &mut position, &mut aggregate, net)?;

    let dust = aggregate.take_dust(env)?;
    let choice_credit = split.choice.checked_add(dust).ok_or(ArenaError::Overflow)?;
    storage::credit(env, &choice.treasury, choice_credit)?;

    storage::set_aggregate(env, topic_id, choice_id, &aggregate);
    storage::set_position(env, topic_id, choice_id, participant, &position);

    env.events().publish(
        (symbol_short!("vote"), topic_id, choice_id, participant.clone()),
        (amount, net, split.contributor),
    );
    log!(
        env,
        "vote: cycle {}, amount {}, net {}, position {}/{}",
        now,
        amount,
        net,
        position.tokens,
        position.shares
    );

    Ok(position.snapshot())
}
