//! A participant's stake in one choice, and its lazy settlement against the
//! choice aggregate.

use soroban_sdk::{contracttype, Env, I256};

use crate::accumulator::{ChoiceAggregate, Holding, RewardIndex};
use crate::error::ArenaError;
use crate::storage::PRECISION;
use crate::types::PositionSnapshot;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Whole tokens at the last settlement
    pub tokens: i128,
    /// Whole shares at the last settlement
    pub shares: i128,
    /// `acc_reward_per_share` of the aggregate at the last settlement
    pub reward_debt: I256,
    /// Units under the index of `epoch`, worth at least `tokens`/`shares`
    pub units: Holding,
    pub epoch: u32,
    /// Cycle of the last settlement
    pub last_cycle: u64,
}

impl Position {
    /// Empty position, already settled against `aggregate`.
    pub fn new(env: &Env, aggregate: &ChoiceAggregate) -> Self {
        Position {
            tokens: 0,
            shares: 0,
            reward_debt: aggregate.acc_reward_per_share.clone(),
            units: Holding::zero(env),
            epoch: aggregate.epoch,
            last_cycle: aggregate.last_cycle,
        }
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            tokens: self.tokens,
            shares: self.shares,
        }
    }
}

fn is_settled(position: &Position, aggregate: &ChoiceAggregate) -> bool {
    position.epoch == aggregate.epoch
        && position.last_cycle == aggregate.last_cycle
        && position.reward_debt == aggregate.acc_reward_per_share
}

/// Units of `position` restated under the aggregate's current epoch.
fn current_units<F>(
    env: &Env,
    position: &Position,
    aggregate: &ChoiceAggregate,
    closed: &F,
) -> Result<Holding, ArenaError>
where
    F: Fn(u32) -> Result<RewardIndex, ArenaError>,
{
    let mut units = position.units.clone();
    for epoch in position.epoch..aggregate.epoch {
        units = closed(epoch)?.value(env, &units);
    }
    Ok(units)
}

/// Settle `position` up to the aggregate's current cycle.
///
/// Fractions of a token the position earned but cannot hold become dust of
/// the aggregate. `closed` returns the index a past epoch ended with.
/// `aggregate` must already be rolled to the cycle being settled to.
pub fn catch_up<F>(
    env: &Env,
    position: &mut Position,
    aggregate: &mut ChoiceAggregate,
    closed: &F,
) -> Result<(), ArenaError>
where
    F: Fn(u32) -> Result<RewardIndex, ArenaError>,
{
    if is_settled(position, aggregate) {
        return Ok(());
    }

    // The aggregate restated its own units when each epoch closed
    position.units = current_units(env, position, aggregate, closed)?;

    let balance = aggregate.index.value(env, &position.units);
    let (tokens, shares) = balance.to_whole(env)?;
    let kept = I256::from_i128(env, tokens).mul(&I256::from_i128(env, PRECISION));
    aggregate.add_dust(&balance.tokens.sub(&kept));
    anchor(env, position, aggregate, tokens, shares)?;

    position.reward_debt = aggregate.acc_reward_per_share.clone();
    position.epoch = aggregate.epoch;
    position.last_cycle = aggregate.last_cycle;
    Ok(())
}

/// Add `amount` whole tokens to a settled position.
pub fn deposit(
    env: &Env,
    position: &mut Position,
    aggregate: &mut ChoiceAggregate,
    amount: i128,
) -> Result<(), ArenaError> {
    let tokens = position
        .tokens
        .checked_add(amount)
        .ok_or(ArenaError::Overflow)?;
    anchor(env, position, aggregate, tokens, position.shares)
}

/// Restate `position` as exactly `tokens`/`shares`, moving the difference in
/// units through the aggregate.
fn anchor(
    env: &Env,
    position: &mut Position,
    aggregate: &mut ChoiceAggregate,
    tokens: i128,
    shares: i128,
) -> Result<(), ArenaError> {
    let units = aggregate
        .index
        .units_for(env, &Holding::from_whole(env, tokens, shares))?;
    aggregate.units = aggregate.units.sub(&position.units).add(&units);
    position.units = units;
    position.tokens = tokens;
    position.shares = shares;
    Ok(())
}

/// What `position` would hold at `aggregate`'s cycle, without persisting.
pub fn projected<F>(
    env: &Env,
    position: &Position,
    aggregate: &ChoiceAggregate,
    closed: &F,
) -> Result<PositionSnapshot, ArenaError>
where
    F: Fn(u32) -> Result<RewardIndex, ArenaError>,
{
    if is_settled(position, aggregate) {
        return Ok(position.snapshot());
    }
    let units = current_units(env, position, aggregate, closed)?;
    let (tokens, shares) = aggregate.index.value(env, &units).to_whole(env)?;
    Ok(PositionSnapshot { tokens, shares })
}
