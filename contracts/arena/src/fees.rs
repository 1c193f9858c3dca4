//! Basis-point fee arithmetic for a single vote.
//!
//! A vote of `amount` is cut into:
//! - the external fee: arena + topic + choice basis points, paid to treasuries
//! - the contributor fee: paid to the choice's existing shareholders
//! - the net amount credited to the voter's position
//!
//! The external fee is computed on the combined basis points; the topic and
//! choice treasuries get their own truncated share and the arena treasury
//! takes whatever is left, so the three parts always sum to the external fee.

use crate::error::ArenaError;
use crate::storage::BPS_DENOMINATOR;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeeSplit {
    pub arena: i128,
    pub topic: i128,
    pub choice: i128,
    pub contributor: i128,
    pub net: i128,
}

impl FeeSplit {
    pub fn external(&self) -> i128 {
        self.arena + self.topic + self.choice
    }
}

/// Check that a set of fee basis points fits in 100%.
pub fn validate_bps(parts: &[u32]) -> Result<(), ArenaError> {
    let total = parts
        .iter()
        .try_fold(0u32, |acc, bps| acc.checked_add(*bps))
        .ok_or(ArenaError::InvalidConfig)?;
    if i128::from(total) > BPS_DENOMINATOR {
        return Err(ArenaError::InvalidConfig);
    }
    Ok(())
}

fn portion(amount: i128, bps: u32) -> Result<i128, ArenaError> {
    amount
        .checked_mul(i128::from(bps))
        .ok_or(ArenaError::Overflow)?
        .checked_div(BPS_DENOMINATOR)
        .ok_or(ArenaError::Overflow)
}

pub fn split(
    amount: i128,
    arena_bps: u32,
    topic_bps: u32,
    choice_bps: u32,
    contributor_bps: u32,
) -> Result<FeeSplit, ArenaError> {
    validate_bps(&[arena_bps, topic_bps, choice_bps, contributor_bps])?;

    // bps sum was validated above, cannot overflow u32
    let external = portion(amount, arena_bps + topic_bps + choice_bps)?;
    let topic = portion(amount, topic_bps)?;
    let choice = portion(amount, choice_bps)?;
    let arena = external - topic - choice;
    let contributor = portion(amount, contributor_bps)?;
    let net = amount
        .checked_sub(external)
        .and_then(|v| v.checked_sub(contributor))
        .ok_or(ArenaError::Overflow)?;

    Ok(FeeSplit {
        arena,
        topic,
        choice,
        contributor,
        net,
    })
}
