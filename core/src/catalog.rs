//! Immutable weapon catalog shared by the loadout, the shop and adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical identifiers of every weapon sold in the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponId {
    /// Starting pair of revolvers fired alternately from each hand.
    Revolver,
    /// Lever-action rifle trading fire rate for precision.
    Winchester,
    /// Double-barrel shotgun firing a cone of pellets.
    SawedOff,
    /// Crank-driven machine gun with a deep magazine.
    Gatling,
    /// Fast repeating pistol.
    Volcanic,
    /// Single-round pistol that kills anything it hits.
    Golden,
}

impl WeaponId {
    /// Every weapon in shop order.
    pub const ALL: [WeaponId; 6] = [
        WeaponId::Revolver,
        WeaponId::Winchester,
        WeaponId::SawedOff,
        WeaponId::Gatling,
        WeaponId::Volcanic,
        WeaponId::Golden,
    ];

    /// Weapon every run starts with.
    pub const STARTING: WeaponId = WeaponId::Revolver;

    /// Catalog entry describing the weapon.
    #[must_use]
    pub fn definition(self) -> &'static WeaponDefinition {
        match self {
            Self::Revolver => &REVOLVER,
            Self::Winchester => &WINCHESTER,
            Self::SawedOff => &SAWED_OFF,
            Self::Gatling => &GATLING,
            Self::Volcanic => &VOLCANIC,
            Self::Golden => &GOLDEN,
        }
    }

    /// Minimum spacing between shots actually enforced by the loadout.
    ///
    /// The revolver alternates hands, so its catalog interval is halved.
    #[must_use]
    pub fn effective_interval(self) -> Duration {
        let interval = self.definition().fire_interval_ms;
        match self {
            Self::Revolver => Duration::from_millis(u64::from(interval) / 2),
            _ => Duration::from_millis(u64::from(interval)),
        }
    }
}

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponDefinition {
    /// Identifier of the weapon.
    pub id: WeaponId,
    /// Name shown in the shop.
    pub display_name: &'static str,
    /// Purchase price in dollars.
    pub price: u32,
    /// Damage applied by each pellet that connects.
    pub damage: u32,
    /// Catalog interval between shots in milliseconds.
    pub fire_interval_ms: u32,
    /// Full cone angle in radians.
    pub spread: f32,
    /// Independent rays traced per shot.
    pub pellets: u32,
    /// Rounds held by a full magazine.
    pub magazine: u32,
}

impl WeaponDefinition {
    /// Camera kick applied per shot, proportional to damage.
    #[must_use]
    pub fn recoil_kick(&self) -> f32 {
        self.damage as f32 / 100.0 * RECOIL_PER_HUNDRED_DAMAGE
    }
}

const RECOIL_PER_HUNDRED_DAMAGE: f32 = 0.05;

const REVOLVER: WeaponDefinition = WeaponDefinition {
    id: WeaponId::Revolver,
    display_name: "Twin Colts",
    price: 0,
    damage: 100,
    fire_interval_ms: 600,
    spread: 0.01,
    pellets: 1,
    magazine: 12,
};

const WINCHESTER: WeaponDefinition = WeaponDefinition {
    id: WeaponId::Winchester,
    display_name: "Winchester",
    price: 500,
    damage: 200,
    fire_interval_ms: 900,
    spread: 0.001,
    pellets: 1,
    magazine: 8,
};

const SAWED_OFF: WeaponDefinition = WeaponDefinition {
    id: WeaponId::SawedOff,
    display_name: "Sawed-off Shotgun",
    price: 1_200,
    damage: 50,
    fire_interval_ms: 1_500,
    spread: 0.15,
    pellets: 8,
    magazine: 2,
};

const GATLING: WeaponDefinition = WeaponDefinition {
    id: WeaponId::Gatling,
    display_name: "Gatling Gun",
    price: 3_000,
    damage: 40,
    fire_interval_ms: 100,
    spread: 0.05,
    pellets: 1,
    magazine: 100,
};

const VOLCANIC: WeaponDefinition = WeaponDefinition {
    id: WeaponId::Volcanic,
    display_name: "Volcanic Pistol",
    price: 800,
    damage: 120,
    fire_interval_ms: 300,
    spread: 0.05,
    pellets: 1,
    magazine: 10,
};

const GOLDEN: WeaponDefinition = WeaponDefinition {
    id: WeaponId::Golden,
    display_name: "Golden Pistol",
    price: 10_000,
    damage: 9_999,
    fire_interval_ms: 400,
    spread: 0.0,
    pellets: 1,
    magazine: 1,
};
