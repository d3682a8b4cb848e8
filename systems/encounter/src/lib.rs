#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter director sizing the initial wave and trickling reinforcements.

use log::{debug, info, warn};
use sundown_core::{
    random::shuffle, Command, Difficulty, EnemyKind, Event, GameState, RandomSource, SeededRandom,
    Vec3,
};

const REINFORCEMENT_CHANCE: f32 = 0.005;
const FALLBACK_WAVE_SIZE: usize = 5;
const FALLBACK_SPREAD: f32 = 100.0;

/// Configuration parameters required to construct the encounter director.
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

/// Pure system deciding where and when enemies enter the town.
#[derive(Debug)]
pub struct Encounter {
    random: Box<dyn RandomSource>,
}

impl Encounter {
    /// Creates a new encounter director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_random(SeededRandom::new(config.rng_seed))
    }

    /// Creates a new encounter director drawing rolls from the provided source.
    #[must_use]
    pub fn with_random(random: impl RandomSource + 'static) -> Self {
        Self {
            random: Box::new(random),
        }
    }

    /// Consumes events to emit spawn commands.
    ///
    /// A `GameStarted` event produces the initial wave. Every `TimeAdvanced`
    /// event while playing rolls for one reinforcement, provided the living
    /// population, including spawns requested in this batch, stays below the
    /// difficulty's reinforcement cap.
    pub fn handle(
        &mut self,
        events: &[Event],
        game_state: GameState,
        difficulty: Difficulty,
        spawn_points: &[Vec3],
        active_enemies: usize,
        out: &mut Vec<Command>,
    ) {
        let mut population = active_enemies;
        for event in events {
            match event {
                Event::GameStarted { difficulty } => {
                    let before = out.len();
                    self.initial_wave(*difficulty, spawn_points, out);
                    population += out.len() - before;
                }
                Event::TimeAdvanced { .. } if game_state == GameState::Playing => {
                    if self.reinforce(difficulty, spawn_points, population, out) {
                        population += 1;
                    }
                }
                _ => {}
            }
        }
    }

    /// Emits the opening wave for a run.
    ///
    /// Spawn points are shuffled and the first `min(available, cap)` are used.
    /// Without spawn points a small wave is scattered around the origin. On
    /// Normal and Hard the last enemy of the wave is the boss.
    pub fn initial_wave(
        &mut self,
        difficulty: Difficulty,
        spawn_points: &[Vec3],
        out: &mut Vec<Command>,
    ) {
        let positions = if spawn_points.is_empty() {
            warn!("no spawn points available, scattering {FALLBACK_WAVE_SIZE} enemies at random");
            (0..FALLBACK_WAVE_SIZE)
                .map(|_| {
                    let x = (self.random.unit() - 0.5) * FALLBACK_SPREAD;
                    let z = (self.random.unit() - 0.5) * FALLBACK_SPREAD;
                    Vec3::new(x, 0.0, z)
                })
                .collect()
        } else {
            let mut shuffled = spawn_points.to_vec();
            shuffle(&mut shuffled, &mut *self.random);
            shuffled.truncate(difficulty.initial_cap());
            shuffled
        };

        let boss_index = match difficulty {
            Difficulty::Easy => None,
            Difficulty::Normal | Difficulty::Hard => positions.len().checked_sub(1),
        };
        info!(
            "initial wave of {} enemies on {difficulty:?}",
            positions.len()
        );

        for (index, position) in positions.into_iter().enumerate() {
            let kind = if Some(index) == boss_index {
                EnemyKind::Boss
            } else {
                EnemyKind::Regular
            };
            out.push(Command::SpawnEnemy { position, kind });
        }
    }

    fn reinforce(
        &mut self,
        difficulty: Difficulty,
        spawn_points: &[Vec3],
        population: usize,
        out: &mut Vec<Command>,
    ) -> bool {
        if !self.random.chance(REINFORCEMENT_CHANCE) {
            return false;
        }
        if population >= difficulty.reinforcement_cap() || spawn_points.is_empty() {
            return false;
        }
        let position = spawn_points[self.random.index(spawn_points.len())];
        debug!("reinforcement arriving at {position}");
        out.push(Command::SpawnEnemy {
            position,
            kind: EnemyKind::Regular,
        });
        true
    }
}
