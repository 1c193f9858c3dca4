//! Full exit from a choice.

use soroban_sdk::{log, symbol_short, Address, Env};

use crate::cycle;
use crate::error::ArenaError;
use crate::position;
use crate::storage;

/// Close the participant's position on `(topic_id, choice_id)`, crediting
/// its tokens, pending rewards included, to the participant's claimable
/// balance. Returns the credited amount.
///
/// The caller must have authorised `participant`.
pub fn withdraw(
    env: &Env,
    participant: &Address,
    topic_id: u32,
    choice_id: u32,
) -> Result<i128, ArenaError> {
    let topic = storage::topic(env, topic_id)?;
    let choice = storage::choice(env, topic_id, choice_id)?;

    let mut position = storage::position(env, topic_id, choice_id, participant)
        .ok_or(ArenaError::NoPosition)?;
    let mut aggregate =
        storage::aggregate(env, topic_id, choice_id).ok_or(ArenaError::StorageCorrupted)?;

    let now = cycle::topic_cycle(&topic, env.ledger().timestamp())?;
    aggregate.roll_to(env, now);
    storage::close_epoch(env, topic_id, choice_id, &mut aggregate)?;
    let closed = |epoch: u32| storage::closed_index(env, topic_id, choice_id, epoch);
    position::catch_up(env, &mut position, &mut aggregate, &closed)?;

    aggregate.release(env, &position.units)?;
    aggregate.voters = aggregate
        .voters
        .checked_sub(1)
        .ok_or(ArenaError::StorageCorrupted)?;
    aggregate.sweep_if_empty(env);
    let dust = aggregate.take_dust(env)?;

    storage::credit(env, participant, position.tokens)?;
    storage::credit(env, &choice.treasury, dust)?;

    storage::remove_position(env, topic_id, choice_id, participant);
    storage::set_aggregate(env, topic_id, choice_id, &aggregate);

    env.events().publish(
        (symbol_short!("withdraw"), topic_id, choice_id, participant.clone()),
        (position.tokens, position.shares),
    );
    log!(
        env,
        "withdraw: cycle {}, tokens {}, shares {}, dust {}",
        now,
        position.tokens,
        position.shares,
        dust
    );

    Ok(position.tokens)
}
