use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Decides when per-track gesture state is forgotten.
///
/// Track ids come from the detector and are never reused for a different
/// face, so `Never` keeps every track for the life of the detector. The
/// other policies bound memory on long streams with many short-lived ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    #[default]
    Never,
    /// Forget tracks not seen for more than this many frames.
    IdleFrames(u64),
    /// Keep at most this many tracks, forgetting the least recently seen.
    Capacity(usize),
}

impl EvictionPolicy {
    /// Returns the track ids to drop, given each track's last-seen frame.
    pub fn select_evictions(&self, last_seen: &HashMap<u32, u64>, current_frame: u64) -> Vec<u32> {
        match *self {
            EvictionPolicy::Never => Vec::new(),
            EvictionPolicy::IdleFrames(max_idle) => {
                let mut ids: Vec<u32> = last_seen
                    .iter()
                    .filter(|&(_, &seen)| current_frame.saturating_sub(seen) > max_idle)
                    .map(|(&id, _)| id)
                    .collect();
                ids.sort_unstable();
                ids
            }
            EvictionPolicy::Capacity(capacity) => {
                if last_seen.len() <= capacity {
                    return Vec::new();
                }
                let mut by_age: Vec<(u64, u32)> =
                    last_seen.iter().map(|(&id, &seen)| (seen, id)).collect();
                by_age.sort_unstable();
                by_age
                    .into_iter()
                    .take(last_seen.len() - capacity)
                    .map(|(_, id)| id)
                    .collect()
            }
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Never => write!(f, "never"),
            EvictionPolicy::IdleFrames(n) => write!(f, "idle:{n}"),
            EvictionPolicy::Capacity(n) => write!(f, "capacity:{n}"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    /// Parses `never`, `idle:<frames>` or `capacity:<tracks>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || format!("Eviction must be never, idle:<frames> or capacity:<tracks>, got '{s}'");
        match s.split_once(':') {
            None if s == "never" => Ok(EvictionPolicy::Never),
            Some(("idle", n)) => n
                .parse()
                .map(EvictionPolicy::IdleFrames)
                .map_err(|_| invalid()),
            Some(("capacity", n)) => n
                .parse()
                .map(EvictionPolicy::Capacity)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}
