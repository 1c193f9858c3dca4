use soroban_sdk::{contracttype, Address, String};

/// Arena-wide configuration, written once by the constructor.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArenaConfig {
    /// Can run storage migrations
    pub admin: Address,
    /// Token contract every vote is denominated in
    pub token: Address,
    /// Receives the arena fee
    pub treasury: Address,
    pub arena_fee_bps: u32,
    /// Smallest accepted vote, in token base units
    pub min_vote_amount: i128,
}

/// Caller-supplied parameters for a new topic.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicParams {
    pub treasury: Address,
    pub topic_fee_bps: u32,
    /// Slice of each vote paid out to existing shareholders of the choice
    pub contributor_fee_bps: u32,
    /// Cycle length in seconds
    pub cycle_duration: u64,
    /// Unix timestamp of cycle 0
    pub start_time: u64,
    pub metadata: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Topic {
    pub id: u32,
    pub creator: Address,
    pub treasury: Address,
    pub topic_fee_bps: u32,
    pub contributor_fee_bps: u32,
    pub cycle_duration: u64,
    pub start_time: u64,
    pub metadata: String,
    /// Number of choices created under this topic; also the next choice id
    pub choice_count: u32,
}

/// Caller-supplied parameters for a new choice.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceParams {
    pub treasury: Address,
    pub fee_bps: u32,
    pub description: String,
    pub metadata: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Choice {
    pub id: u32,
    pub topic_id: u32,
    pub treasury: Address,
    pub fee_bps: u32,
    pub description: String,
    pub metadata: String,
}

/// Tokens and shares of a position or a whole choice at the current cycle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionSnapshot {
    pub tokens: i128,
    pub shares: i128,
}
