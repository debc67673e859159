//! Scoring module - points for clears and the level curve
//!
//! Two clear paths exist and they score their base differently:
//! - Immediate clears pay `RUN_POINTS` per run found on the first pass.
//! - Committed (staged) clears pay `RUN_POINTS` per cell that was staged first.
//!
//! Both pay `CHAIN_BONUS` for every chain pass that actually ran.

use crate::types::{CHAIN_BONUS, POINTS_PER_LEVEL, RUN_POINTS};

/// Score for a clear resolved in one go after a lock.
pub fn immediate_clear_score(runs: u32, chains: u32) -> u32 {
    runs.saturating_mul(RUN_POINTS)
        .saturating_add(chain_bonus(chains))
}

/// Score for a clear that was staged and then committed by the caller.
pub fn committed_clear_score(staged_cells: u32, chains: u32) -> u32 {
    staged_cells
        .saturating_mul(RUN_POINTS)
        .saturating_add(chain_bonus(chains))
}

pub fn chain_bonus(chains: u32) -> u32 {
    chains.saturating_mul(CHAIN_BONUS)
}

/// Level management
/// Level starts at 1 and increases every `POINTS_PER_LEVEL` points
pub fn calculate_level(score: u32) -> u32 {
    (score / POINTS_PER_LEVEL + 1).max(1)
}
