#![no_std]

mod accumulator;
mod cycle;
mod error;
mod fees;
mod position;
mod registry;
mod storage;
mod types;
mod vote;
mod withdraw;

use error::ArenaError;
use soroban_sdk::{contract, contractimpl, panic_with_error, symbol_short, Address, Env};
use storage::CURRENT_VERSION;
pub use types::{ArenaConfig, Choice, ChoiceParams, PositionSnapshot, Topic, TopicParams};

/// Voting Arena Contract
///
/// Participants stake the arena token on choices grouped under topics.
/// Stakes accrue time-weighted shares once per topic cycle, and a contributor
/// slice of every new stake is paid out to the choice's existing shareholders
/// in proportion to their shares.
///
/// Key features:
/// - Every operation is constant time, whatever the number of participants
/// - Fees are routed to arena, topic and choice treasuries as claimable credit
/// - Withdrawal closes the whole position, pending rewards included
#[contract]
pub struct Arena;

#[contractimpl]
impl Arena {
    /// Constructor: runs once at deployment.
    ///
    /// # Arguments
    /// * `admin` - Address allowed to run storage migrations
    /// * `token` - Token every vote is denominated in
    /// * `treasury` - Receives the arena fee
    /// * `arena_fee_bps` - Arena fee on every vote, in basis points
    /// * `min_vote_amount` - Smallest accepted vote
    pub fn __constructor(
        env: Env,
        admin: Address,
        token: Address,
        treasury: Address,
        arena_fee_bps: u32,
        min_vote_amount: i128,
    ) {
        let config = ArenaConfig {
            admin,
            token,
            treasury,
            arena_fee_bps,
            min_vote_amount,
        };
        if let Err(err) = Self::initialize(&env, &config) {
            panic_with_error!(&env, err);
        }
    }

    /// Create a topic. Anyone may create one; the creator must authorise.
    ///
    /// # Returns
    /// Id of the new topic
    pub fn create_topic(env: Env, creator: Address, params: TopicParams) -> Result<u32, ArenaError> {
        creator.require_auth();
        registry::create_topic(&env, &creator, &params)
    }

    /// Add a choice to a topic.
    ///
    /// # Returns
    /// Id of the new choice within the topic
    pub fn create_choice(
        env: Env,
        creator: Address,
        topic_id: u32,
        params: ChoiceParams,
    ) -> Result<u32, ArenaError> {
        creator.require_auth();
        registry::create_choice(&env, &creator, topic_id, &params)
    }

    /// Stake `amount` of the arena token on a choice.
    ///
    /// The participant must have approved the arena for at least `amount`.
    ///
    /// # Returns
    /// The participant's position after the deposit
    pub fn vote(
        env: Env,
        participant: Address,
        topic_id: u32,
        choice_id: u32,
        amount: i128,
    ) -> Result<PositionSnapshot, ArenaError> {
        storage::enter(&env)?;
        participant.require_auth();

        let snapshot = vote::vote(&env, &participant, topic_id, choice_id, amount)?;

        storage::exit(&env);
        Ok(snapshot)
    }

    /// Close the participant's position on a choice.
    ///
    /// # Returns
    /// Tokens credited to the participant's claimable balance
    pub fn withdraw(
        env: Env,
        participant: Address,
        topic_id: u32,
        choice_id: u32,
    ) -> Result<i128, ArenaError> {
        storage::enter(&env)?;
        participant.require_auth();

        let amount = withdraw::withdraw(&env, &participant, topic_id, choice_id)?;

        storage::exit(&env);
        Ok(amount)
    }

    /// Participant's position on a choice at the current cycle, pending
    /// rewards included. Returns zeros when there is no position.
    pub fn aggregated_position(
        env: Env,
        topic_id: u32,
        choice_id: u32,
        participant: Address,
    ) -> Result<PositionSnapshot, ArenaError> {
        let topic = storage::topic(&env, topic_id)?;
        storage::choice(&env, topic_id, choice_id)?;

        let Some(aggregate) = storage::aggregate(&env, topic_id, choice_id) else {
            return Ok(Self::empty_snapshot());
        };
        let Some(position) = storage::position(&env, topic_id, choice_id, &participant) else {
            return Ok(Self::empty_snapshot());
        };

        let now = cycle::topic_cycle(&topic, env.ledger().timestamp())?;
        let aggregate = aggregate.projected(&env, now);
        let closed = |epoch: u32| storage::closed_index(&env, topic_id, choice_id, epoch);
        position::projected(&env, &position, &aggregate, &closed)
    }

    /// Totals of a choice at the current cycle.
    pub fn choice_summary(
        env: Env,
        topic_id: u32,
        choice_id: u32,
    ) -> Result<PositionSnapshot, ArenaError> {
        let topic = storage::topic(&env, topic_id)?;
        storage::choice(&env, topic_id, choice_id)?;

        let Some(aggregate) = storage::aggregate(&env, topic_id, choice_id) else {
            return Ok(Self::empty_snapshot());
        };

        let now = cycle::topic_cycle(&topic, env.ledger().timestamp())?;
        aggregate.projected(&env, now).snapshot(&env)
    }

    pub fn arena_info(env: Env) -> Result<ArenaConfig, ArenaError> {
        storage::config(&env)
    }

    pub fn topic_info(env: Env, topic_id: u32) -> Result<Topic, ArenaError> {
        storage::topic(&env, topic_id)
    }

    pub fn choice_info(env: Env, topic_id: u32, choice_id: u32) -> Result<Choice, ArenaError> {
        storage::choice(&env, topic_id, choice_id)
    }

    pub fn topic_count(env: Env) -> u32 {
        storage::topic_count(&env)
    }

    /// Cycle index of the topic at the current ledger time.
    pub fn current_cycle(env: Env, topic_id: u32) -> Result<u64, ArenaError> {
        let topic = storage::topic(&env, topic_id)?;
        cycle::topic_cycle(&topic, env.ledger().timestamp())
    }

    /// Credit accumulated by an address from fees, withdrawals and dust.
    pub fn claimable_balance(env: Env, address: Address) -> i128 {
        storage::claimable(&env, &address)
    }

    /// Storage layout version of this deployment.
    pub fn version(env: Env) -> u32 {
        storage::version(&env)
    }

    /// Bring an older storage layout up to the current version (admin only).
    ///
    /// # Returns
    /// The version now in storage
    pub fn migrate(env: Env, admin: Address) -> Result<u32, ArenaError> {
        let config = storage::config(&env)?;
        if admin != config.admin {
            return Err(ArenaError::Unauthorized);
        }
        admin.require_auth();

        let from = storage::version(&env);
        if from >= CURRENT_VERSION {
            return Err(ArenaError::AlreadyMigrated);
        }
        storage::set_version(&env, CURRENT_VERSION);

        env.events()
            .publish((symbol_short!("migrate"),), (from, CURRENT_VERSION));
        Ok(CURRENT_VERSION)
    }

    // --- Internal helpers ---

    fn initialize(env: &Env, config: &ArenaConfig) -> Result<(), ArenaError> {
        if config.min_vote_amount <= 0 {
            return Err(ArenaError::InvalidConfig);
        }
        fees::validate_bps(&[config.arena_fee_bps])?;

        storage::set_config(env, config);
        storage::set_topic_count(env, 0);
        storage::set_version(env, CURRENT_VERSION);
        Ok(())
    }

    fn empty_snapshot() -> PositionSnapshot {
        PositionSnapshot {
            tokens: 0,
            shares: 0,
        }
    }
}
