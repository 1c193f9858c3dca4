//! Topic and choice creation.

use soroban_sdk::{symbol_short, Address, Env};

use crate::error::ArenaError;
use crate::fees;
use crate::storage;
use crate::types::{Choice, ChoiceParams, Topic, TopicParams};

/// Register a new topic and return its id.
///
/// The arena fee, topic fee and contributor fee must fit in 100% on their
/// own, leaving room for choice fees.
pub fn create_topic(env: &Env, creator: &Address, params: &TopicParams) -> Result<u32, ArenaError> {
    let config = storage::config(env)?;

    if params.cycle_duration == 0 {
        return Err(ArenaError::InvalidConfig);
    }
    fees::validate_bps(&[
        config.arena_fee_bps,
        params.topic_fee_bps,
        params.contributor_fee_bps,
    ])?;

    let id = storage::topic_count(env);
    let topic = Topic {
        id,
        creator: creator.clone(),
        treasury: params.treasury.clone(),
        topic_fee_bps: params.topic_fee_bps,
        contributor_fee_bps: params.contributor_fee_bps,
        cycle_duration: params.cycle_duration,
        start_time: params.start_time,
        metadata: params.metadata.clone(),
        choice_count: 0,
    };
    storage::set_topic(env, &topic);
    storage::set_topic_count(env, id.checked_add(1).ok_or(ArenaError::Overflow)?);

    env.events()
        .publish((symbol_short!("topic"), id), creator.clone());
    Ok(id)
}

/// Register a new choice under `topic_id` and return its id within the topic.
pub fn create_choice(
    env: &Env,
    creator: &Address,
    topic_id: u32,
    params: &ChoiceParams,
) -> Result<u32, ArenaError> {
    let config = storage::config(env)?;
    let mut topic = storage::topic(env, topic_id)?;

    fees::validate_bps(&[
        config.arena_fee_bps,
        topic.topic_fee_bps,
        topic.contributor_fee_bps,
        params.fee_bps,
    ])?;

    let id = topic.choice_count;
    let choice = Choice {
        id,
        topic_id,
        treasury: params.treasury.clone(),
        fee_bps: params.fee_bps,
        description: params.description.clone(),
        metadata: params.metadata.clone(),
    };
    topic.choice_count = id.checked_add(1).ok_or(ArenaError::Overflow)?;
    storage::set_choice(env, &choice);
    storage::set_topic(env, &topic);

    env.events()
        .publish((symbol_short!("choice"), topic_id, id), creator.clone());
    Ok(id)
}
