//! Damage application, death handling, kill rewards and shot resolution.

use log::{debug, info};
use sundown_core::{
    ActorRef, DamageOutcome, DialogueCue, EnemyId, EnemyState, Event, GameOverCause, Health,
    HitObject, PhysicsWorld, RayHitTest, Vec3, WEAPON_RANGE,
};

use crate::{roster::Enemy, Player, World};

const HEAL_ON_HIT: u32 = 1;
const HEAL_ON_KILL: u32 = 5;

/// Capability shared by every actor that can lose health.
pub(crate) trait Damageable {
    fn health_mut(&mut self) -> &mut Health;

    fn is_alive(&self) -> bool;

    fn strike(&mut self, amount: u32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        self.health_mut().take(amount)
    }
}

impl Damageable for Player {
    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }
}

impl Damageable for Enemy {
    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    fn is_alive(&self) -> bool {
        Enemy::is_alive(self)
    }
}

/// Applies damage to an actor, running death handling exactly once.
///
/// Terminal game states, unknown actors and the dead absorb the hit.
pub(crate) fn apply_damage(
    world: &mut World,
    target: ActorRef,
    amount: u32,
    out_events: &mut Vec<Event>,
) -> DamageOutcome {
    if world.state.is_terminal() {
        return DamageOutcome::Ignored;
    }

    let outcome = match target {
        ActorRef::Player => world.player.strike(amount),
        ActorRef::Enemy(enemy) => world
            .roster
            .get_mut(enemy)
            .map_or(DamageOutcome::Ignored, |enemy| enemy.strike(amount)),
    };

    match outcome {
        DamageOutcome::Survived { remaining } => {
            out_events.push(Event::DamageApplied {
                target,
                amount,
                remaining,
            });
        }
        DamageOutcome::Died => {
            out_events.push(Event::DamageApplied {
                target,
                amount,
                remaining: 0,
            });
            match target {
                ActorRef::Player => world.end_game(GameOverCause::PlayerKilled, out_events),
                ActorRef::Enemy(enemy) => kill_enemy(world, enemy, out_events),
            }
        }
        DamageOutcome::Ignored => {}
    }

    outcome
}

fn kill_enemy(world: &mut World, id: EnemyId, out_events: &mut Vec<Event>) {
    let Some(enemy) = world.roster.get_mut(id) else {
        return;
    };
    let from = enemy.state;
    enemy.state = EnemyState::Dead;
    enemy.flee_until = None;
    if let Some(body) = enemy.body.take() {
        if let Some(position) = world.physics.position(body) {
            enemy.resting_position = position;
        }
        let _ = world.physics.remove_body(body);
        let _ = world.bodies.remove(&body);
    }

    out_events.push(Event::EnemyStateChanged {
        enemy: id,
        from,
        to: EnemyState::Dead,
    });
    out_events.push(Event::EnemyKilled { enemy: id });
    out_events.push(Event::DialogueRaised {
        cue: DialogueCue::Death,
        speaker: id,
    });

    let reward = world.player.ledger.record_kill();
    debug!(
        "enemy {} killed, rewarded ${} at level {}",
        id.get(),
        reward.reward,
        reward.level.get()
    );
    out_events.push(Event::KillRewarded {
        reward: reward.reward,
        kills: world.player.ledger.kills(),
        money: world.player.ledger.money(),
    });
    if reward.leveled_up {
        info!("player reached level {}", reward.level.get());
        out_events.push(Event::LevelUp {
            level: reward.level,
            multiplier_percent: reward.level.multiplier_percent(),
        });
    }
}

/// Restores player health, emitting an event when anything was restored.
pub(crate) fn heal_player(world: &mut World, amount: u32, out_events: &mut Vec<Event>) {
    if world.state.is_terminal() {
        return;
    }
    let restored = world.player.health.heal(amount);
    if restored > 0 {
        out_events.push(Event::PlayerHealed {
            amount: restored,
            health: world.player.health.current(),
        });
    }
}

/// Traces every pellet of a shot and applies its damage.
///
/// Each pellet stops at the first opaque object; the shooter's own body is
/// skipped. The player is healed once per shot that connected.
pub(crate) fn resolve_shot(
    world: &mut World,
    origin: Vec3,
    aim: Vec3,
    pellets: u32,
    damage: u32,
    spread: f32,
    out_events: &mut Vec<Event>,
) {
    let Some(aim) = aim.try_normalize() else {
        return;
    };
    let (right, up) = aim_basis(aim);

    let mut connected = false;
    let mut killed = false;
    for _ in 0..pellets {
        let yaw = (world.random.unit() - 0.5) * spread;
        let pitch = (world.random.unit() - 0.5) * spread;
        let direction = (aim + right * yaw.tan() + up * pitch.tan()).normalize();

        let hits = world.physics.cast(origin, direction, WEAPON_RANGE);
        let mut impact = None;
        for hit in hits {
            let actor = match hit.object {
                HitObject::Static => None,
                HitObject::Body(body) => world.bodies.get(&body).copied(),
            };
            match actor {
                Some(ActorRef::Player) => continue,
                Some(ActorRef::Enemy(enemy)) => {
                    impact = Some((hit.point, Some(enemy)));
                    match apply_damage(world, ActorRef::Enemy(enemy), damage, out_events) {
                        DamageOutcome::Survived { .. } => connected = true,
                        DamageOutcome::Died => {
                            connected = true;
                            killed = true;
                        }
                        DamageOutcome::Ignored => {}
                    }
                }
                None => impact = Some((hit.point, None)),
            }
            break;
        }

        if let Some((point, struck)) = impact {
            out_events.push(Event::PelletImpact { point, struck });
        }
    }

    if killed {
        heal_player(world, HEAL_ON_KILL, out_events);
    } else if connected {
        heal_player(world, HEAL_ON_HIT, out_events);
    }
}

fn aim_basis(aim: Vec3) -> (Vec3, Vec3) {
    let right = aim.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(aim);
    (right, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aim_basis_is_orthonormal() {
        for aim in [Vec3::Z, Vec3::NEG_X, Vec3::new(1.0, 0.3, -2.0).normalize(), Vec3::Y] {
            let (right, up) = aim_basis(aim);
            assert!(right.dot(aim).abs() < 1e-5);
            assert!(up.dot(aim).abs() < 1e-5);
            assert!(right.dot(up).abs() < 1e-5);
            assert!((right.length() - 1.0).abs() < 1e-5);
        }
    }
}
