//! Settlement progression - tiers derived from the placed object count
//!
//! Everything here is a pure function of `total_blocks`, so recomputing
//! after every placement is idempotent and order-independent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object count above which the settlement becomes a Colony
const COLONY_THRESHOLD: u64 = 3;
/// Object count above which the settlement becomes a Settlement
const SETTLEMENT_THRESHOLD: u64 = 7;
/// Object count above which the settlement becomes a Citadel
const CITADEL_THRESHOLD: u64 = 12;

/// Objects per complexity level
const BLOCKS_PER_COMPLEXITY: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SettlementTier {
    Outpost,
    Colony,
    Settlement,
    Citadel,
}

impl SettlementTier {
    /// Tier for a total object count
    ///
    /// | count | tier       |
    /// |-------|------------|
    /// | 0-3   | Outpost    |
    /// | 4-7   | Colony     |
    /// | 8-12  | Settlement |
    /// | 13+   | Citadel    |
    pub fn for_count(total_blocks: u64) -> Self {
        if total_blocks > CITADEL_THRESHOLD {
            SettlementTier::Citadel
        } else if total_blocks > SETTLEMENT_THRESHOLD {
            SettlementTier::Settlement
        } else if total_blocks > COLONY_THRESHOLD {
            SettlementTier::Colony
        } else {
            SettlementTier::Outpost
        }
    }

    /// Goal the architect pursues at this tier
    pub fn goal(&self) -> &'static str {
        match self {
            SettlementTier::Outpost => {
                "Establish a basic outpost: shelter the crew and bring power online"
            }
            SettlementTier::Colony => {
                "Grow into a self-sustaining colony: secure water and food production"
            }
            SettlementTier::Settlement => {
                "Fortify the settlement: raise walls and install life support"
            }
            SettlementTier::Citadel => {
                "Complete the citadel: raise data spires and refine the layout"
            }
        }
    }
}

impl fmt::Display for SettlementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettlementTier::Outpost => "Outpost",
            SettlementTier::Colony => "Colony",
            SettlementTier::Settlement => "Settlement",
            SettlementTier::Citadel => "Citadel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressionStats {
    pub total_blocks: u64,
    pub tier: SettlementTier,
    pub complexity_level: u32,
}

impl ProgressionStats {
    pub fn from_count(total_blocks: u64) -> Self {
        Self {
            total_blocks,
            tier: SettlementTier::for_count(total_blocks),
            complexity_level: 1 + (total_blocks / BLOCKS_PER_COMPLEXITY) as u32,
        }
    }
}

impl Default for ProgressionStats {
    fn default() -> Self {
        Self::from_count(0)
    }
}
