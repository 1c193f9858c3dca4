//! Maps ledger time to a topic's cycle index.

use crate::error::ArenaError;
use crate::types::Topic;

/// Cycle index of `now` for a clock that starts at `start_time` and ticks
/// every `cycle_duration` seconds.
pub fn current_cycle(start_time: u64, cycle_duration: u64, now: u64) -> Result<u64, ArenaError> {
    if cycle_duration == 0 {
        return Err(ArenaError::InvalidConfig);
    }
    if now < start_time {
        return Err(ArenaError::NotStarted);
    }
    Ok((now - start_time) / cycle_duration)
}

pub fn topic_cycle(topic: &Topic, now: u64) -> Result<u64, ArenaError> {
    current_cycle(topic.start_time, topic.cycle_duration, now)
}
