//! Per-choice aggregate and the reward accumulator behind contributor fees.
//!
//! Every vote on a choice that already has shareholders pays a contributor
//! fee to all of them, in proportion to their shares. Nobody is iterated:
//! the fee only moves two global values,
//!
//! - `acc_reward_per_share`: the classic reward-per-share accumulator.
//! - `index`: a cumulative [`RewardIndex`]. Realised rewards become tokens,
//!   and tokens earn shares in every later cycle, so a holder's balance is a
//!   linear function of what it held when it was last settled. The index
//!   records that function for the whole choice.
//!
//! Holders are stored as [`Holding`] units: the balance they would have had
//! at the start of the epoch. Their balance now is `index.value(units)`. The
//! aggregate keeps the sum of all holders' units, so the choice totals are
//! the same linear function of that sum: what the holders own, up to the
//! rounding of each holder's fixed-point balance. Holders settle lazily the
//! next time they are touched (see `position::catch_up`).
//!
//! Index entries grow with every cycle and distribution. Once one passes
//! `SCALE * INDEX_LIMIT` the aggregate closes the epoch: units are restated
//! as the balances they stand for and the index restarts from identity.

use soroban_sdk::{contracttype, Env, I256};

use crate::error::ArenaError;
use crate::storage::{INDEX_LIMIT, PRECISION, SCALE};
use crate::types::PositionSnapshot;

fn wide(env: &Env, value: i128) -> I256 {
    I256::from_i128(env, value)
}

/// `num / den` rounded towards negative infinity. `den` must be positive.
fn div_floor(env: &Env, num: &I256, den: &I256) -> I256 {
    let quotient = num.div(den);
    if quotient.mul(den) > *num {
        quotient.sub(&wide(env, 1))
    } else {
        quotient
    }
}

/// `num / den` rounded down when `sign` is not negative and up otherwise, so
/// the result times `sign` never exceeds `num * sign / den`.
fn div_against(env: &Env, num: &I256, den: &I256, sign: &I256) -> I256 {
    if *sign < wide(env, 0) {
        wide(env, 0).sub(&div_floor(env, &wide(env, 0).sub(num), den))
    } else {
        div_floor(env, num, den)
    }
}

/// `num * scale / den` rounded up, without forming `num * scale`.
fn mul_div_ceil(env: &Env, num: &I256, scale: &I256, den: &I256) -> I256 {
    let quotient = div_floor(env, num, den);
    let remainder = num.sub(&quotient.mul(den));
    let fraction = remainder
        .mul(scale)
        .add(den)
        .sub(&wide(env, 1))
        .div(den);
    quotient.mul(scale).add(&fraction)
}

/// Tokens and shares in fixed point, scaled by [`PRECISION`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Holding {
    pub tokens: I256,
    pub shares: I256,
}

impl Holding {
    pub fn zero(env: &Env) -> Self {
        Holding {
            tokens: wide(env, 0),
            shares: wide(env, 0),
        }
    }

    pub fn from_whole(env: &Env, tokens: i128, shares: i128) -> Self {
        let precision = wide(env, PRECISION);
        Holding {
            tokens: wide(env, tokens).mul(&precision),
            shares: wide(env, shares).mul(&precision),
        }
    }

    /// Whole tokens and shares, fractions dropped.
    pub fn to_whole(&self, env: &Env) -> Result<(i128, i128), ArenaError> {
        let precision = wide(env, PRECISION);
        let tokens = div_floor(env, &self.tokens, &precision);
        let shares = div_floor(env, &self.shares, &precision);
        Ok((
            tokens.to_i128().ok_or(ArenaError::Overflow)?,
            shares.to_i128().ok_or(ArenaError::Overflow)?,
        ))
    }

    pub fn add(&self, other: &Holding) -> Holding {
        Holding {
            tokens: self.tokens.add(&other.tokens),
            shares: self.shares.add(&other.shares),
        }
    }

    pub fn sub(&self, other: &Holding) -> Holding {
        Holding {
            tokens: self.tokens.sub(&other.tokens),
            shares: self.shares.sub(&other.shares),
        }
    }
}

/// Cumulative 2x2 transfer from a holding at the start of the epoch to the
/// same holding now, scaled by [`SCALE`].
///
/// ```text
/// tokens_now = tokens_per_token * tokens_0 + tokens_per_share * shares_0
/// shares_now = shares_per_token * tokens_0 + shares_per_share * shares_0
/// ```
///
/// A rollover of `k` cycles adds `k` shares per token held; a distribution at
/// `rate` adds `rate` tokens per share held. Entries only grow.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardIndex {
    pub tokens_per_token: I256,
    pub tokens_per_share: I256,
    pub shares_per_token: I256,
    pub shares_per_share: I256,
}

impl RewardIndex {
    pub fn identity(env: &Env) -> Self {
        RewardIndex {
            tokens_per_token: wide(env, SCALE),
            tokens_per_share: wide(env, 0),
            shares_per_token: wide(env, 0),
            shares_per_share: wide(env, SCALE),
        }
    }

    /// Apply `cycles` idle cycles.
    pub fn roll(&mut self, env: &Env, cycles: u64) {
        if cycles == 0 {
            return;
        }
        let k = wide(env, i128::from(cycles));
        self.shares_per_token = self.shares_per_token.add(&self.tokens_per_token.mul(&k));
        self.shares_per_share = self.shares_per_share.add(&self.tokens_per_share.mul(&k));
    }

    /// Apply a distribution of `rate` tokens per share, scaled by `SCALE`.
    ///
    /// Each entry is rounded so that `units` gain no more than the exact
    /// distribution would give them.
    pub fn credit(&mut self, env: &Env, rate: &I256, units: &Holding) {
        let scale = wide(env, SCALE);
        let per_token = div_against(
            env,
            &rate.mul(&self.shares_per_token),
            &scale,
            &units.tokens,
        );
        let per_share = div_against(
            env,
            &rate.mul(&self.shares_per_share),
            &scale,
            &units.shares,
        );
        self.tokens_per_token = self.tokens_per_token.add(&per_token);
        self.tokens_per_share = self.tokens_per_share.add(&per_share);
    }

    /// Balance now of a holding that was `units` at the start of the epoch.
    /// Rounds down.
    pub fn value(&self, env: &Env, units: &Holding) -> Holding {
        let scale = wide(env, SCALE);
        let tokens = self
            .tokens_per_token
            .mul(&units.tokens)
            .add(&self.tokens_per_share.mul(&units.shares));
        let shares = self
            .shares_per_token
            .mul(&units.tokens)
            .add(&self.shares_per_share.mul(&units.shares));
        Holding {
            tokens: div_floor(env, &tokens, &scale),
            shares: div_floor(env, &shares, &scale),
        }
    }

    /// Units whose [`value`](Self::value) covers `balance`, rounded up.
    pub fn units_for(&self, env: &Env, balance: &Holding) -> Result<Holding, ArenaError> {
        let det = self
            .tokens_per_token
            .mul(&self.shares_per_share)
            .sub(&self.tokens_per_share.mul(&self.shares_per_token));
        if det <= wide(env, 0) {
            return Err(ArenaError::StorageCorrupted);
        }
        let scale = wide(env, SCALE);
        let tokens = self
            .shares_per_share
            .mul(&balance.tokens)
            .sub(&self.tokens_per_share.mul(&balance.shares));
        let shares = self
            .tokens_per_token
            .mul(&balance.shares)
            .sub(&self.shares_per_token.mul(&balance.tokens));
        Ok(Holding {
            tokens: mul_div_ceil(env, &tokens, &scale, &det),
            shares: mul_div_ceil(env, &shares, &scale, &det),
        })
    }

    /// Whether any entry has passed `SCALE * INDEX_LIMIT`.
    pub fn exceeds_limit(&self, env: &Env) -> bool {
        let limit = wide(env, SCALE * INDEX_LIMIT);
        self.tokens_per_token > limit
            || self.tokens_per_share > limit
            || self.shares_per_token > limit
            || self.shares_per_share > limit
    }
}

/// Running state of one (topic, choice).
///
/// # Invariants
/// - the choice totals are `index.value(units)`, and `units` is the sum of
///   every live position's units, so the totals are what the positions hold
/// - `acc_reward_per_share` never decreases
/// - `dust` holds fixed-point tokens no position owns; whole tokens of it
///   are paid to the choice treasury
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceAggregate {
    pub units: Holding,
    pub acc_reward_per_share: I256,
    pub index: RewardIndex,
    /// Number of closed index epochs
    pub epoch: u32,
    pub dust: I256,
    pub last_cycle: u64,
    /// Live positions on this choice
    pub voters: u32,
}

impl ChoiceAggregate {
    pub fn new(env: &Env, cycle: u64) -> Self {
        ChoiceAggregate {
            units: Holding::zero(env),
            acc_reward_per_share: wide(env, 0),
            index: RewardIndex::identity(env),
            epoch: 0,
            dust: wide(env, 0),
            last_cycle: cycle,
            voters: 0,
        }
    }

    /// Fixed-point totals of the choice.
    pub fn totals(&self, env: &Env) -> Holding {
        self.index.value(env, &self.units)
    }

    /// Whether anyone holds at least one whole share.
    pub fn has_shares(&self, env: &Env) -> bool {
        self.totals(env).shares >= wide(env, PRECISION)
    }

    /// Roll the choice forward to `cycle`. Earlier cycles are a no-op.
    pub fn roll_to(&mut self, env: &Env, cycle: u64) {
        if cycle <= self.last_cycle {
            return;
        }
        self.index.roll(env, cycle - self.last_cycle);
        self.last_cycle = cycle;
    }

    /// Copy of the aggregate rolled to `cycle`, for read-only queries.
    pub fn projected(&self, env: &Env, cycle: u64) -> Self {
        let mut aggregate = self.clone();
        aggregate.roll_to(env, cycle);
        aggregate
    }

    /// Share `fee` among current shareholders. Returns the per-share rate.
    ///
    /// Holders receive what the index can express; the rest of the fee, or
    /// all of it when nobody holds a whole share, becomes dust.
    pub fn distribute(&mut self, env: &Env, fee: i128) -> I256 {
        let zero = wide(env, 0);
        if fee <= 0 {
            return zero;
        }
        let fee = wide(env, fee).mul(&wide(env, PRECISION));
        let before = self.totals(env);
        if before.shares < wide(env, PRECISION) {
            self.dust = self.dust.add(&fee);
            return zero;
        }

        let rate = fee.mul(&wide(env, SCALE)).div(&before.shares);
        if rate > zero {
            self.acc_reward_per_share = self.acc_reward_per_share.add(&rate);
            self.index.credit(env, &rate, &self.units);
        }
        let paid = self.totals(env).tokens.sub(&before.tokens);
        self.dust = self.dust.add(&fee.sub(&paid));
        rate
    }

    /// Start a new epoch once the index has grown past its limit. Units are
    /// restated as the balances they stand for and the index restarts from
    /// identity. Returns the closed epoch and the index it ended with.
    pub fn rebase(&mut self, env: &Env) -> Result<Option<(u32, RewardIndex)>, ArenaError> {
        if !self.index.exceeds_limit(env) {
            return Ok(None);
        }
        let closed = self.epoch;
        let index = self.index.clone();
        self.units = index.value(env, &self.units);
        self.index = RewardIndex::identity(env);
        self.epoch = closed.checked_add(1).ok_or(ArenaError::Overflow)?;
        Ok(Some((closed, index)))
    }

    /// Move a fixed-point token remainder into dust.
    pub fn add_dust(&mut self, tokens: &I256) {
        self.dust = self.dust.add(tokens);
    }

    /// Whole tokens of dust, removed from the aggregate. The fraction stays.
    pub fn take_dust(&mut self, env: &Env) -> Result<i128, ArenaError> {
        let precision = wide(env, PRECISION);
        if self.dust < precision {
            return Ok(0);
        }
        let whole = self.dust.div(&precision);
        self.dust = self.dust.sub(&whole.mul(&precision));
        whole.to_i128().ok_or(ArenaError::Overflow)
    }

    /// Remove a leaving position's units.
    pub fn release(&mut self, env: &Env, units: &Holding) -> Result<(), ArenaError> {
        let remaining = self.units.sub(units);
        let totals = self.index.value(env, &remaining);
        let zero = wide(env, 0);
        if totals.tokens < zero || totals.shares < zero {
            return Err(ArenaError::StorageCorrupted);
        }
        self.units = remaining;
        Ok(())
    }

    /// Once no position is left, move any leftover tokens into dust and
    /// clear the units.
    pub fn sweep_if_empty(&mut self, env: &Env) {
        if self.voters > 0 {
            return;
        }
        let leftover = self.totals(env).tokens;
        if leftover > wide(env, 0) {
            self.add_dust(&leftover);
        }
        self.units = Holding::zero(env);
    }

    pub fn snapshot(&self, env: &Env) -> Result<PositionSnapshot, ArenaError> {
        let (tokens, shares) = self.totals(env).to_whole(env)?;
        Ok(PositionSnapshot { tokens, shares })
    }
}
