#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy chatter: decides which dialogue cues are voiced and lets deaths
//! scare the survivors into running.

use log::debug;
use sundown_core::{
    Command, DialogueCue, EnemyId, EnemyView, Event, RandomSource, SeededRandom,
};

const TALK_CHANCE: f32 = 0.3;
const SCARE_CHANCE: f32 = 0.5;

/// Configuration parameters required to construct the chatter system.
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

/// Tone of a voiced line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mood {
    /// Small talk and announcements.
    Idle,
    /// Taunts while shooting.
    Combat,
    /// Panic after a comrade dies.
    Scared,
}

impl Mood {
    fn for_cue(cue: DialogueCue) -> Self {
        match cue {
            DialogueCue::Combat => Self::Combat,
            DialogueCue::Death => Self::Scared,
            DialogueCue::Idle | DialogueCue::BossSpawn => Self::Idle,
        }
    }
}

/// A line the dialogue presenter should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatterLine {
    /// Enemy the cue was raised for.
    pub speaker: EnemyId,
    /// Cue that produced the line.
    pub cue: DialogueCue,
    /// Tone of the line.
    pub mood: Mood,
}

/// Pure system reacting to raised dialogue cues.
#[derive(Debug)]
pub struct Chatter {
    random: Box<dyn RandomSource>,
}

impl Chatter {
    /// Creates a new chatter system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_random(SeededRandom::new(config.rng_seed))
    }

    /// Creates a new chatter system drawing rolls from the provided source.
    #[must_use]
    pub fn with_random(random: impl RandomSource + 'static) -> Self {
        Self {
            random: Box::new(random),
        }
    }

    /// Consumes dialogue events, emitting voiced lines and flee commands.
    ///
    /// Death cues are always voiced and, half of the time, send one random
    /// surviving enemy running. Other cues are voiced 30% of the time.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        lines: &mut Vec<ChatterLine>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::DialogueRaised { cue, speaker } = event else {
                continue;
            };
            let cue = *cue;

            if cue != DialogueCue::Death && !self.random.chance(TALK_CHANCE) {
                continue;
            }
            lines.push(ChatterLine {
                speaker: *speaker,
                cue,
                mood: Mood::for_cue(cue),
            });

            if cue == DialogueCue::Death {
                self.scare_survivor(enemies, out);
            }
        }
    }

    fn scare_survivor(&mut self, enemies: &EnemyView, out: &mut Vec<Command>) {
        let survivors: Vec<EnemyId> = enemies.alive().map(|enemy| enemy.id).collect();
        if survivors.is_empty() || !self.random.chance(SCARE_CHANCE) {
            return;
        }
        let coward = survivors[self.random.index(survivors.len())];
        debug!("enemy {} panics and runs", coward.get());
        out.push(Command::Flee { enemy: coward });
    }
}
