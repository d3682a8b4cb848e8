//! Enemy records owned by the world.

use std::time::Duration;

use sundown_core::{BodyHandle, EnemyId, EnemyKind, EnemyState, Health, Vec3};

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) state: EnemyState,
    pub(crate) body: Option<BodyHandle>,
    pub(crate) health: Health,
    pub(crate) last_attack: Option<Duration>,
    pub(crate) patrol_target: Option<Vec3>,
    pub(crate) flee_until: Option<Duration>,
    pub(crate) facing: Option<Vec3>,
    /// Position recorded when the body left the physics world.
    pub(crate) resting_position: Vec3,
}

impl Enemy {
    pub(crate) fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }
}

/// Ordered enemy records with deferred removal of the dead.
#[derive(Clone, Debug, Default)]
pub(crate) struct Roster {
    enemies: Vec<Enemy>,
    next_id: u32,
}

impl Roster {
    pub(crate) fn spawn(&mut self, kind: EnemyKind, body: BodyHandle, position: Vec3) -> EnemyId {
        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.enemies.push(Enemy {
            id,
            kind,
            state: EnemyState::Patrol,
            body: Some(body),
            health: Health::full(kind.max_health()),
            last_attack: None,
            patrol_target: None,
            flee_until: None,
            facing: None,
            resting_position: position,
        });
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.index(id).map(|index| &self.enemies[index])
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.index(id).map(move |index| &mut self.enemies[index])
    }

    /// Living enemy by identifier; dead records are invisible to commands.
    pub(crate) fn alive_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.get_mut(id).filter(|enemy| enemy.is_alive())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Removes dead records, returning their identifiers in roster order.
    pub(crate) fn compact(&mut self) -> Vec<EnemyId> {
        let removed: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| !enemy.is_alive())
            .map(|enemy| enemy.id)
            .collect();
        self.enemies.retain(Enemy::is_alive);
        removed
    }

    /// Drops every record, returning the bodies that must leave physics.
    pub(crate) fn clear(&mut self) -> Vec<BodyHandle> {
        self.enemies
            .drain(..)
            .filter_map(|enemy| enemy.body)
            .collect()
    }

    fn index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.binary_search_by_key(&id, |enemy| enemy.id).ok()
    }
}
