use soroban_sdk::{contracttype, Address, Env};

use crate::accumulator::{ChoiceAggregate, RewardIndex};
use crate::error::ArenaError;
use crate::position::Position;
use crate::types::{ArenaConfig, Choice, Topic};

/// Storage keys for the contract.
/// Arena-wide entries live in instance storage, per-topic and per-participant
/// records in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// ArenaConfig
    Config,
    /// Storage layout version
    Version,
    /// Number of topics created; also the next topic id
    TopicCount,
    /// Set while a vote or withdraw is executing
    Entered,
    /// Topic(topic_id)
    Topic(u32),
    /// Choice(topic_id, choice_id)
    Choice(u32, u32),
    /// ChoiceAggregate for (topic_id, choice_id)
    Aggregate(u32, u32),
    /// Position(topic_id, choice_id, participant)
    Position(u32, u32, Address),
    /// Claimable credit of an address
    Claimable(Address),
    /// Reward index an aggregate held when epoch `(topic_id, choice_id, epoch)` closed
    ClosedIndex(u32, u32, u32),
}

/// Fixed-point scale of `acc_reward_per_share` and the reward index.
pub const SCALE: i128 = 1_000_000_000_000_000_000; // 10^18

/// Fixed-point scale of token and share amounts held by aggregates and positions.
pub const PRECISION: i128 = 1_000_000_000_000_000_000; // 10^18

/// An epoch closes once a reward index entry passes `SCALE * INDEX_LIMIT`.
pub const INDEX_LIMIT: i128 = 10_000;

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Layout written by this build. Deployments without a marker read as 0.
pub const CURRENT_VERSION: u32 = 1;

pub fn config(env: &Env) -> Result<ArenaConfig, ArenaError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ArenaError::StorageCorrupted)
}

pub fn set_config(env: &Env, config: &ArenaConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn version(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::Version).unwrap_or(0)
}

pub fn set_version(env: &Env, version: u32) {
    env.storage().instance().set(&DataKey::Version, &version);
}

pub fn topic_count(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::TopicCount).unwrap_or(0)
}

pub fn set_topic_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::TopicCount, &count);
}

pub fn topic(env: &Env, topic_id: u32) -> Result<Topic, ArenaError> {
    env.storage()
        .persistent()
        .get(&DataKey::Topic(topic_id))
        .ok_or(ArenaError::InvalidReference)
}

pub fn set_topic(env: &Env, topic: &Topic) {
    env.storage()
        .persistent()
        .set(&DataKey::Topic(topic.id), topic);
}

pub fn choice(env: &Env, topic_id: u32, choice_id: u32) -> Result<Choice, ArenaError> {
    env.storage()
        .persistent()
        .get(&DataKey::Choice(topic_id, choice_id))
        .ok_or(ArenaError::InvalidReference)
}

pub fn set_choice(env: &Env, choice: &Choice) {
    env.storage()
        .persistent()
        .set(&DataKey::Choice(choice.topic_id, choice.id), choice);
}

pub fn aggregate(env: &Env, topic_id: u32, choice_id: u32) -> Option<ChoiceAggregate> {
    env.storage()
        .persistent()
        .get(&DataKey::Aggregate(topic_id, choice_id))
}

pub fn set_aggregate(env: &Env, topic_id: u32, choice_id: u32, aggregate: &ChoiceAggregate) {
    env.storage()
        .persistent()
        .set(&DataKey::Aggregate(topic_id, choice_id), aggregate);
}

pub fn closed_index(
    env: &Env,
    topic_id: u32,
    choice_id: u32,
    epoch: u32,
) -> Result<RewardIndex, ArenaError> {
    env.storage()
        .persistent()
        .get(&DataKey::ClosedIndex(topic_id, choice_id, epoch))
        .ok_or(ArenaError::StorageCorrupted)
}

/// Rebase `aggregate` if its index has grown too large, keeping the index it
/// closed with so positions from that epoch can still be converted.
pub fn close_epoch(
    env: &Env,
    topic_id: u32,
    choice_id: u32,
    aggregate: &mut ChoiceAggregate,
) -> Result<(), ArenaError> {
    if let Some((epoch, index)) = aggregate.rebase(env)? {
        env.storage()
            .persistent()
            .set(&DataKey::ClosedIndex(topic_id, choice_id, epoch), &index);
    }
    Ok(())
}

pub fn position(env: &Env, topic_id: u32, choice_id: u32, participant: &Address) -> Option<Position> {
    env.storage()
        .persistent()
        .get(&DataKey::Position(topic_id, choice_id, participant.clone()))
}

pub fn set_position(
    env: &Env,
    topic_id: u32,
    choice_id: u32,
    participant: &Address,
    position: &Position,
) {
    env.storage().persistent().set(
        &DataKey::Position(topic_id, choice_id, participant.clone()),
        position,
    );
}

pub fn remove_position(env: &Env, topic_id: u32, choice_id: u32, participant: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Position(topic_id, choice_id, participant.clone()));
}

pub fn claimable(env: &Env, address: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Claimable(address.clone()))
        .unwrap_or(0)
}

/// Add `amount` to the claimable credit of `address`. Zero amounts are not written.
pub fn credit(env: &Env, address: &Address, amount: i128) -> Result<(), ArenaError> {
    if amount <= 0 {
        return Ok(());
    }
    let balance = claimable(env, address)
        .checked_add(amount)
        .ok_or(ArenaError::Overflow)?;
    env.storage()
        .persistent()
        .set(&DataKey::Claimable(address.clone()), &balance);
    Ok(())
}

/// Mark a ledger mutation as in progress. Fails if one already is.
pub fn enter(env: &Env) -> Result<(), ArenaError> {
    if env.storage().instance().has(&DataKey::Entered) {
        return Err(ArenaError::Reentrant);
    }
    env.storage().instance().set(&DataKey::Entered, &true);
    Ok(())
}

pub fn exit(env: &Env) {
    env.storage().instance().remove(&DataKey::Entered);
}
