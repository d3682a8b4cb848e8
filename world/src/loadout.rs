//! Player weapon state machine: ammo, reload deadline, fire-rate gating,
//! dry-fire escalation and the shop.

use std::{collections::BTreeSet, time::Duration};

use sundown_core::{BlockReason, FireOutcome, Ledger, LoadoutSnapshot, SwitchOutcome, WeaponId};

/// Time a reload takes to complete.
pub(crate) const RELOAD_DURATION: Duration = Duration::from_millis(2_000);

/// Consecutive dry fires that destroy the weapon.
pub(crate) const DRY_FIRE_LIMIT: u8 = 3;

#[derive(Clone, Debug)]
pub(crate) struct WeaponLoadout {
    current: WeaponId,
    ammo: u32,
    reload_deadline: Option<Duration>,
    owned: BTreeSet<WeaponId>,
    dry_fires: u8,
    last_shot: Option<Duration>,
}

impl WeaponLoadout {
    /// Loadout every run starts with: the starting weapon, fully loaded.
    pub(crate) fn new() -> Self {
        let mut owned = BTreeSet::new();
        let _ = owned.insert(WeaponId::STARTING);
        Self {
            current: WeaponId::STARTING,
            ammo: WeaponId::STARTING.definition().magazine,
            reload_deadline: None,
            owned,
            dry_fires: 0,
            last_shot: None,
        }
    }

    pub(crate) fn current(&self) -> WeaponId {
        self.current
    }

    pub(crate) fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Pulls the trigger at the provided simulated time.
    ///
    /// Rate limiting is checked before the magazine, so a dry fire inside the
    /// fire interval reports `RateLimited`. Dry fires never record a shot time.
    pub(crate) fn fire(&mut self, now: Duration) -> FireOutcome {
        if self.reload_deadline.is_some() {
            return FireOutcome::Blocked(BlockReason::Reloading);
        }

        if let Some(last_shot) = self.last_shot {
            if now.saturating_sub(last_shot) < self.current.effective_interval() {
                return FireOutcome::Blocked(BlockReason::RateLimited);
            }
        }

        if self.ammo == 0 {
            self.dry_fires = self.dry_fires.saturating_add(1);
            return FireOutcome::DryFire {
                consecutive: self.dry_fires,
            };
        }

        let definition = self.current.definition();
        self.ammo -= 1;
        self.last_shot = Some(now);
        FireOutcome::Fired {
            pellets: definition.pellets,
            damage: definition.damage,
        }
    }

    /// Starts a reload, returning its completion time.
    ///
    /// Returns `None` while a reload is already running or the magazine is full.
    pub(crate) fn reload(&mut self, now: Duration) -> Option<Duration> {
        if self.reload_deadline.is_some() || self.ammo >= self.current.definition().magazine {
            return None;
        }
        let deadline = now.saturating_add(RELOAD_DURATION);
        self.reload_deadline = Some(deadline);
        Some(deadline)
    }

    /// Finishes a reload whose deadline has passed.
    pub(crate) fn complete_reload(&mut self, now: Duration) -> bool {
        match self.reload_deadline {
            Some(deadline) if deadline <= now => {
                self.reload_deadline = None;
                self.ammo = self.current.definition().magazine;
                self.dry_fires = 0;
                true
            }
            _ => false,
        }
    }

    /// Equips an owned weapon, or buys and equips one the ledger can afford.
    pub(crate) fn switch_weapon(&mut self, weapon: WeaponId, ledger: &mut Ledger) -> SwitchOutcome {
        if self.owned.contains(&weapon) {
            self.equip(weapon);
            return SwitchOutcome::Equipped;
        }

        let price = weapon.definition().price;
        match ledger.spend(price) {
            Ok(()) => {
                let _ = self.owned.insert(weapon);
                self.equip(weapon);
                SwitchOutcome::Purchased { price }
            }
            Err(refused) => SwitchOutcome::InsufficientFunds {
                price: refused.price,
                available: refused.available,
            },
        }
    }

    fn equip(&mut self, weapon: WeaponId) {
        self.current = weapon;
        self.ammo = weapon.definition().magazine;
        self.reload_deadline = None;
        self.dry_fires = 0;
    }

    pub(crate) fn snapshot(&self) -> LoadoutSnapshot {
        LoadoutSnapshot {
            weapon: self.current,
            ammo: self.ammo,
            reload_completes_at: self.reload_deadline,
            owned: self.owned.iter().copied().collect(),
            consecutive_dry_fires: self.dry_fires,
        }
    }
}
