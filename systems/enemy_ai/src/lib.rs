#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behavior system choosing patrol, chase, attack and flee actions.

use std::time::Duration;

use log::debug;
use sundown_core::{
    ActorRef, Command, DialogueCue, EnemySnapshot, EnemyState, EnemyView, Event, GameState,
    LineOfSight, PlayerSnapshot, RandomSource, SeededRandom, Vec3,
};

const SIGHT_RANGE: f32 = 40.0;
const ATTACK_RANGE: f32 = 15.0;
const ATTACK_COOLDOWN: Duration = Duration::from_millis(1_500);
const PATROL_ARRIVAL: f32 = 3.0;
const PATROL_RANGE: f32 = 20.0;
const FLEE_SPEED_FACTOR: f32 = 1.5;

const IDLE_CHATTER_CHANCE: f32 = 0.002;
const COMBAT_CHATTER_CHANCE: f32 = 0.2;
const HIT_CHANCE: f32 = 0.7;

/// Configuration parameters required to construct the enemy AI system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that drives every living enemy once per tick.
#[derive(Debug)]
pub struct EnemyAi {
    random: Box<dyn RandomSource>,
}

impl EnemyAi {
    /// Creates a new enemy AI system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_random(SeededRandom::new(config.rng_seed))
    }

    /// Creates a new enemy AI system drawing rolls from the provided source.
    #[must_use]
    pub fn with_random(random: impl RandomSource + 'static) -> Self {
        Self {
            random: Box::new(random),
        }
    }

    /// Consumes events and immutable views to emit enemy commands.
    ///
    /// Enemies act once per batch containing a `TimeAdvanced` event, using the
    /// latest simulated time in the batch.
    pub fn handle(
        &mut self,
        events: &[Event],
        game_state: GameState,
        enemies: &EnemyView,
        player: &PlayerSnapshot,
        sight: &dyn LineOfSight,
        out: &mut Vec<Command>,
    ) {
        if !game_state.is_live() {
            return;
        }
        let Some(now) = latest_time(events) else {
            return;
        };

        for enemy in enemies.alive() {
            self.drive(enemy, now, player, sight, out);
        }
    }

    fn drive(
        &mut self,
        enemy: &EnemySnapshot,
        now: Duration,
        player: &PlayerSnapshot,
        sight: &dyn LineOfSight,
        out: &mut Vec<Command>,
    ) {
        if self.random.chance(IDLE_CHATTER_CHANCE) {
            out.push(Command::RaiseDialogue {
                cue: DialogueCue::Idle,
                speaker: enemy.id,
            });
        }

        let speed = enemy.kind.speed();
        if is_fleeing(enemy, now) {
            out.push(Command::DriveEnemy {
                enemy: enemy.id,
                state: EnemyState::Fleeing,
                velocity: heading(enemy.position, player.position) * -speed * FLEE_SPEED_FACTOR,
                facing: None,
                patrol_target: None,
            });
            return;
        }

        let distance = enemy.position.distance(player.position);
        let visible = distance < SIGHT_RANGE
            && sight.has_line_of_sight(ActorRef::Enemy(enemy.id), enemy.position, player.position);

        if !visible {
            self.patrol(enemy, speed, out);
        } else if distance > ATTACK_RANGE {
            out.push(Command::DriveEnemy {
                enemy: enemy.id,
                state: EnemyState::Chase,
                velocity: heading(enemy.position, player.position) * speed,
                facing: Some(player.position),
                patrol_target: None,
            });
        } else {
            out.push(Command::DriveEnemy {
                enemy: enemy.id,
                state: EnemyState::Attack,
                velocity: Vec3::ZERO,
                facing: Some(player.position),
                patrol_target: None,
            });
            if cooled_down(enemy.last_attack, now) {
                self.attack(enemy, out);
            }
        }
    }

    fn attack(&mut self, enemy: &EnemySnapshot, out: &mut Vec<Command>) {
        if self.random.chance(COMBAT_CHATTER_CHANCE) {
            out.push(Command::RaiseDialogue {
                cue: DialogueCue::Combat,
                speaker: enemy.id,
            });
        }
        let hit = self.random.chance(HIT_CHANCE);
        debug!("enemy {} fires (hit: {hit})", enemy.id.get());
        out.push(Command::EnemyAttack {
            enemy: enemy.id,
            hit,
        });
    }

    fn patrol(&mut self, enemy: &EnemySnapshot, speed: f32, out: &mut Vec<Command>) {
        let position = enemy.position;
        let (target, picked) = match enemy.patrol_target {
            Some(target) if horizontal_distance(position, target) >= PATROL_ARRIVAL => {
                (target, false)
            }
            _ => {
                let x = (self.random.unit() - 0.5) * PATROL_RANGE;
                let z = (self.random.unit() - 0.5) * PATROL_RANGE;
                (Vec3::new(position.x + x, position.y, position.z + z), true)
            }
        };

        out.push(Command::DriveEnemy {
            enemy: enemy.id,
            state: EnemyState::Patrol,
            velocity: heading(position, target) * speed,
            facing: Some(target),
            patrol_target: picked.then_some(target),
        });
    }
}

fn latest_time(events: &[Event]) -> Option<Duration> {
    events.iter().rev().find_map(|event| match event {
        Event::TimeAdvanced { now, .. } => Some(*now),
        _ => None,
    })
}

fn is_fleeing(enemy: &EnemySnapshot, now: Duration) -> bool {
    enemy.state == EnemyState::Fleeing && enemy.flee_until.is_some_and(|until| now < until)
}

fn cooled_down(last_attack: Option<Duration>, now: Duration) -> bool {
    last_attack.map_or(true, |last| now.saturating_sub(last) >= ATTACK_COOLDOWN)
}

/// Unit horizontal direction from `from` toward `to`.
fn heading(from: Vec3, to: Vec3) -> Vec3 {
    let offset = to - from;
    Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero()
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    (a.x - b.x).hypot(a.z - b.z)
}
