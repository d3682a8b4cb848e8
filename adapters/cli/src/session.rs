//! Headless session wiring the world to its systems and an autopilot.

use std::{fmt, time::Duration};

use log::{debug, info, warn};
use sundown_core::{
    ActorRef, Command, Difficulty, EnemySnapshot, Event, GameState, Layout, LineOfSight,
    PlayerSnapshot, SeededRandom, Vec3, WeaponId, EYE_OFFSET, WEAPON_RANGE,
};
use sundown_system_chatter::{self as chatter, Chatter, ChatterLine, Mood};
use sundown_system_encounter::{self as encounter, Encounter};
use sundown_system_enemy_ai::{self as enemy_ai, EnemyAi};
use sundown_system_perception::Perception;
use sundown_world::{self as world, query, World};

const PLAYER_SPEED: f32 = 6.0;
const MAX_REACTION_ROUNDS: usize = 8;

const IDLE_LINES: [&str; 3] = [
    "Quiet out here. Too quiet.",
    "Anybody seen the sheriff?",
    "Keep your eyes on the street.",
];
const COMBAT_LINES: [&str; 3] = [
    "Fill your hand!",
    "This town ain't big enough!",
    "Draw, lawman!",
];
const SCARED_LINES: [&str; 3] = [
    "They got Jed!",
    "I ain't dying for this!",
    "Run for the hills!",
];

/// Owns the world and every system reacting to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    enemy_ai: EnemyAi,
    encounter: Encounter,
    chatter: Chatter,
    ticks: u32,
    lines_spoken: u32,
}

impl Session {
    /// Creates a session over `layout`, deriving every random stream from `seed`.
    pub(crate) fn new(layout: Layout, seed: u64) -> Self {
        Self {
            world: World::with_layout(layout).with_random(SeededRandom::new(seed)),
            enemy_ai: EnemyAi::new(enemy_ai::Config::new(seed.wrapping_add(1))),
            encounter: Encounter::new(encounter::Config::new(seed.wrapping_add(2))),
            chatter: Chatter::new(chatter::Config::new(seed.wrapping_add(3))),
            ticks: 0,
            lines_spoken: 0,
        }
    }

    /// Selects `difficulty` from the menu and starts the run.
    pub(crate) fn start(&mut self, difficulty: Difficulty) {
        let mut commands = Vec::new();
        let mut current = query::difficulty(&self.world);
        while current != difficulty {
            commands.push(Command::CycleDifficulty);
            current = current.next();
        }
        commands.push(Command::StartGame);
        self.dispatch(commands);
    }

    /// Runs up to `ticks` steps of `dt`, stopping early once the run ends.
    pub(crate) fn run(&mut self, ticks: u32, dt: Duration) -> Summary {
        for _ in 0..ticks {
            if query::game_state(&self.world).is_terminal() {
                break;
            }
            self.step(dt);
        }
        self.summary()
    }

    /// Lets the autopilot act, then advances the clock by `dt`.
    pub(crate) fn step(&mut self, dt: Duration) {
        let mut commands = pilot(&self.world);
        commands.push(Command::Tick { dt });
        self.dispatch(commands);
        self.ticks += 1;
    }

    /// Current summary of the run.
    pub(crate) fn summary(&self) -> Summary {
        let player = query::player(&self.world);
        Summary {
            state: query::game_state(&self.world),
            difficulty: query::difficulty(&self.world),
            ticks: self.ticks,
            elapsed: query::clock(&self.world),
            kills: player.ledger.kills(),
            money: player.ledger.money(),
            level: player.ledger.level().get(),
            weapon: player.loadout.weapon,
            health: player.health.current(),
            enemies_left: query::active_enemy_count(&self.world),
            lines_spoken: self.lines_spoken,
        }
    }

    fn dispatch(&mut self, mut pending: Vec<Command>) {
        for _ in 0..MAX_REACTION_ROUNDS {
            if pending.is_empty() {
                return;
            }
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            log_events(&events);
            pending = self.react(&events);
        }
        if !pending.is_empty() {
            warn!(
                "dropping {} commands after {MAX_REACTION_ROUNDS} reaction rounds",
                pending.len()
            );
        }
    }

    fn react(&mut self, events: &[Event]) -> Vec<Command> {
        let mut commands = Vec::new();
        let game_state = query::game_state(&self.world);
        let enemies = query::enemy_view(&self.world);
        let player = query::player(&self.world);
        let sight = Perception::new(query::scene(&self.world));

        self.enemy_ai
            .handle(events, game_state, &enemies, &player, &sight, &mut commands);
        self.encounter.handle(
            events,
            game_state,
            query::difficulty(&self.world),
            &query::layout(&self.world).spawn_points,
            query::active_enemy_count(&self.world),
            &mut commands,
        );

        let mut lines = Vec::new();
        self.chatter.handle(events, &enemies, &mut lines, &mut commands);
        for line in lines {
            self.lines_spoken += 1;
            info!("outlaw {}: {}", line.speaker.get(), voice(&line));
        }
        commands
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::GameStateChanged { state } => info!("game state is now {state:?}"),
            Event::EnemyKilled { enemy } => info!("outlaw {} is down", enemy.get()),
            Event::KillRewarded { reward, money, .. } => {
                debug!("bounty of ${reward} paid, purse at ${money}");
            }
            Event::WeaponEquipped { weapon, .. } => info!("now carrying {weapon:?}"),
            Event::DryFire { consecutive } => warn!("click ({consecutive})"),
            _ => {}
        }
    }
}

/// Line spoken for a voiced cue.
fn voice(line: &ChatterLine) -> &'static str {
    let lines = match line.mood {
        Mood::Idle => &IDLE_LINES,
        Mood::Combat => &COMBAT_LINES,
        Mood::Scared => &SCARED_LINES,
    };
    lines[line.speaker.get() as usize % lines.len()]
}

/// Decides the player's commands for the next tick.
///
/// Upgrades are bought as soon as they are affordable, an empty magazine is
/// reloaded, the nearest visible enemy in range is shot and otherwise the
/// player walks toward the goal.
fn pilot(world: &World) -> Vec<Command> {
    if query::game_state(world) != GameState::Playing {
        return Vec::new();
    }
    let player = query::player(world);

    if let Some(weapon) = next_upgrade(&player) {
        return vec![
            Command::OpenShop,
            Command::SwitchWeapon { weapon },
            Command::CloseShop,
        ];
    }
    if player.loadout.is_reloading() {
        return Vec::new();
    }
    if player.loadout.ammo == 0 {
        return vec![Command::Reload];
    }

    let eye = player.position + Vec3::Y * EYE_OFFSET;
    let enemies = query::enemy_view(world);
    let sight = Perception::new(query::scene(world));
    if let Some(target) = nearest_visible(&player, enemies.alive(), &sight) {
        let direction = (target.position - eye).normalize_or_zero();
        if direction != Vec3::ZERO {
            return vec![
                Command::SteerPlayer {
                    velocity: Vec3::ZERO,
                },
                Command::FireWeapon {
                    origin: eye,
                    direction,
                },
            ];
        }
    }

    let velocity = query::layout(world)
        .goal
        .map(|goal| {
            let offset = goal - player.position;
            Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero() * PLAYER_SPEED
        })
        .unwrap_or(Vec3::ZERO);
    vec![Command::SteerPlayer { velocity }]
}

/// Cheapest unowned weapon pricier than the current one that the purse covers.
fn next_upgrade(player: &PlayerSnapshot) -> Option<WeaponId> {
    let current = player.loadout.weapon.definition().price;
    WeaponId::ALL
        .into_iter()
        .filter(|weapon| !player.loadout.owned.contains(weapon))
        .map(WeaponId::definition)
        .filter(|definition| {
            definition.price > current && definition.price <= player.ledger.money()
        })
        .min_by_key(|definition| definition.price)
        .map(|definition| definition.id)
}

fn nearest_visible<'a>(
    player: &PlayerSnapshot,
    enemies: impl Iterator<Item = &'a EnemySnapshot>,
    sight: &dyn LineOfSight,
) -> Option<&'a EnemySnapshot> {
    enemies
        .filter(|enemy| enemy.position.distance(player.position) <= WEAPON_RANGE)
        .filter(|enemy| sight.has_line_of_sight(ActorRef::Player, player.position, enemy.position))
        .min_by(|a, b| {
            a.position
                .distance(player.position)
                .total_cmp(&b.position.distance(player.position))
        })
}

/// End-of-run report printed by the binary.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) state: GameState,
    pub(crate) difficulty: Difficulty,
    pub(crate) ticks: u32,
    pub(crate) elapsed: Duration,
    pub(crate) kills: u32,
    pub(crate) money: u32,
    pub(crate) level: u8,
    pub(crate) weapon: WeaponId,
    pub(crate) health: u32,
    pub(crate) enemies_left: usize,
    pub(crate) lines_spoken: u32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.state {
            GameState::Won => "reached the goal".to_owned(),
            GameState::GameOver(cause) => format!("game over ({cause:?})"),
            state => format!("still {state:?}"),
        };
        writeln!(f, "Outcome:      {outcome}")?;
        writeln!(f, "Difficulty:   {:?}", self.difficulty)?;
        writeln!(
            f,
            "Ticks:        {} ({:.1}s simulated)",
            self.ticks,
            self.elapsed.as_secs_f32()
        )?;
        writeln!(f, "Kills:        {} (level {})", self.kills, self.level)?;
        writeln!(f, "Purse:        ${}", self.money)?;
        writeln!(f, "Weapon:       {}", self.weapon.definition().display_name)?;
        writeln!(f, "Health:       {}", self.health)?;
        writeln!(f, "Outlaws left: {}", self.enemies_left)?;
        write!(f, "Lines spoken: {}", self.lines_spoken)
    }
}
