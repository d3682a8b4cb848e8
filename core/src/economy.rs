//! Kill-driven economy: kills, money and the level derived from kills.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dollars paid for a kill before the level multiplier applies.
pub const BASE_KILL_REWARD: u32 = 100;

const LEVEL_THRESHOLDS: [(u32, u8); 4] = [(50, 5), (30, 4), (15, 3), (5, 2)];
const MULTIPLIER_PERCENT: [u32; 5] = [100, 120, 150, 200, 300];
const TOP_MULTIPLIER_PERCENT: u32 = 300;

/// Player level, always within `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u8);

impl Level {
    /// Level every run starts at.
    pub const FIRST: Level = Level(1);

    /// Derives the level reached after the provided number of kills.
    #[must_use]
    pub fn for_kills(kills: u32) -> Self {
        LEVEL_THRESHOLDS
            .iter()
            .find(|(threshold, _)| kills >= *threshold)
            .map_or(Self::FIRST, |(_, level)| Self(*level))
    }

    /// Numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Reward multiplier expressed in percent (`120` means ×1.2).
    ///
    /// Levels beyond the table keep the top multiplier.
    #[must_use]
    pub fn multiplier_percent(self) -> u32 {
        let index = usize::from(self.0.saturating_sub(1));
        MULTIPLIER_PERCENT
            .get(index)
            .copied()
            .unwrap_or(TOP_MULTIPLIER_PERCENT)
    }

    /// Dollars credited for a kill made at this level.
    #[must_use]
    pub fn reward(self) -> u32 {
        BASE_KILL_REWARD * self.multiplier_percent() / 100
    }
}

/// Outcome of crediting a single kill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KillReward {
    /// Dollars credited for the kill.
    pub reward: u32,
    /// Level the kill was rewarded at.
    pub level: Level,
    /// Whether the kill crossed a level threshold.
    pub leveled_up: bool,
}

/// Reasons a purchase may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("price of ${price} exceeds the ${available} available")]
pub struct InsufficientFunds {
    /// Price that was requested.
    pub price: u32,
    /// Money available at the time of the request.
    pub available: u32,
}

/// Money, kills and level owned by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    money: u32,
    kills: u32,
    level: Level,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Creates an empty ledger at level one.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            money: 0,
            kills: 0,
            level: Level::FIRST,
        }
    }

    /// Dollars available for purchases.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Enemies killed so far.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Credits a kill. The level is recomputed before the reward so a kill
    /// that crosses a threshold is paid at the new multiplier.
    pub fn record_kill(&mut self) -> KillReward {
        self.kills = self.kills.saturating_add(1);
        let level = Level::for_kills(self.kills);
        let leveled_up = level > self.level;
        self.level = self.level.max(level);

        let reward = self.level.reward();
        self.money = self.money.saturating_add(reward);
        KillReward {
            reward,
            level: self.level,
            leveled_up,
        }
    }

    /// Deducts the price when affordable; leaves the ledger untouched otherwise.
    pub fn spend(&mut self, price: u32) -> Result<(), InsufficientFunds> {
        if self.money < price {
            return Err(InsufficientFunds {
                price,
                available: self.money,
            });
        }
        self.money -= price;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds_match_kill_counts() {
        assert_eq!(Level::for_kills(0).get(), 1);
        assert_eq!(Level::for_kills(4).get(), 1);
        assert_eq!(Level::for_kills(5).get(), 2);
        assert_eq!(Level::for_kills(14).get(), 2);
        assert_eq!(Level::for_kills(15).get(), 3);
        assert_eq!(Level::for_kills(30).get(), 4);
        assert_eq!(Level::for_kills(50).get(), 5);
        assert_eq!(Level::for_kills(500).get(), 5);
    }

    #[test]
    fn level_is_monotonic_in_kills() {
        let mut previous = Level::for_kills(0);
        for kills in 1..120 {
            let level = Level::for_kills(kills);
            assert!(level >= previous, "level dropped at {kills} kills");
            assert!(level.reward() >= previous.reward());
            previous = level;
        }
    }

    #[test]
    fn rewards_follow_multiplier_table() {
        let rewards: Vec<u32> = (1..=5).map(|level| Level(level).reward()).collect();
        assert_eq!(rewards, vec![100, 120, 150, 200, 300]);
        assert_eq!(Level(9).reward(), 300);
    }

    #[test]
    fn threshold_kill_is_paid_at_new_level() {
        let mut ledger = Ledger::new();
        for _ in 0..4 {
            let _ = ledger.record_kill();
        }
        assert_eq!(ledger.money(), 400);

        let reward = ledger.record_kill();

        assert!(reward.leveled_up);
        assert_eq!(reward.level.get(), 2);
        assert_eq!(reward.reward, 120);
        assert_eq!(ledger.money(), 520);
        assert_eq!(ledger.kills(), 5);
    }

    #[test]
    fn unaffordable_purchase_leaves_money_untouched() {
        let mut ledger = Ledger::new();
        for _ in 0..3 {
            let _ = ledger.record_kill();
        }

        let refused = ledger.spend(500);

        assert_eq!(
            refused,
            Err(InsufficientFunds {
                price: 500,
                available: 300
            })
        );
        assert_eq!(
            refused.map_err(|error| error.to_string()),
            Err("price of $500 exceeds the $300 available".to_owned())
        );
        assert_eq!(ledger.money(), 300);
        assert_eq!(ledger.spend(300), Ok(()));
        assert_eq!(ledger.money(), 0);
    }
}
