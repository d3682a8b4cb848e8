#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Sundown.

mod combat;
mod loadout;
mod physics;
mod roster;

use std::{collections::BTreeMap, time::Duration};

use log::{debug, info};
use sundown_core::{
    ActorRef, BodyDesc, BodyHandle, Command, DialogueCue, Difficulty, EnemyId, EnemyKind,
    EnemyState, Event, FireOutcome, GameOverCause, GameState, Health, Layout, Ledger, PhysicsWorld,
    RandomSource, SeededRandom, SwitchOutcome, Vec3, WeaponId, MAX_TICK, PLAYER_MAX_HEALTH,
};

pub use physics::KinematicWorld;

use loadout::{WeaponLoadout, DRY_FIRE_LIMIT};
use roster::Roster;

const SPREAD_SEED: u64 = 0x5d0f_7a1c_93e2_4b68;

const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.0, 0.5);
const ENEMY_ATTACK_DAMAGE: u32 = 10;
const FLEE_DURATION: Duration = Duration::from_millis(4_000);
const GOAL_RADIUS: f32 = 3.5;

#[derive(Debug)]
pub(crate) struct Player {
    body: BodyHandle,
    health: Health,
    loadout: WeaponLoadout,
    ledger: Ledger,
}

/// Represents the authoritative Sundown world state.
#[derive(Debug)]
pub struct World {
    state: GameState,
    difficulty: Difficulty,
    layout: Layout,
    clock: Duration,
    physics: KinematicWorld,
    bodies: BTreeMap<BodyHandle, ActorRef>,
    player: Player,
    roster: Roster,
    random: Box<dyn RandomSource>,
}

impl World {
    /// Creates a world in the menu, laid out as the built-in town.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(Layout::default())
    }

    /// Creates a world in the menu using the provided town layout.
    #[must_use]
    pub fn with_layout(layout: Layout) -> Self {
        let mut physics = KinematicWorld::new(layout.walls.clone());
        let body = physics.add_body(BodyDesc {
            position: body_center(layout.player_start),
            half_extents: BODY_HALF_EXTENTS,
        });
        let mut bodies = BTreeMap::new();
        let _ = bodies.insert(body, ActorRef::Player);

        Self {
            state: GameState::Menu,
            difficulty: Difficulty::default(),
            layout,
            clock: Duration::ZERO,
            physics,
            bodies,
            player: Player {
                body,
                health: Health::full(PLAYER_MAX_HEALTH),
                loadout: WeaponLoadout::new(),
                ledger: Ledger::new(),
            },
            roster: Roster::default(),
            random: Box::new(SeededRandom::new(SPREAD_SEED)),
        }
    }

    /// Replaces the random stream that drives pellet spread.
    #[must_use]
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    fn set_state(&mut self, state: GameState, out_events: &mut Vec<Event>) {
        if self.state == state {
            return;
        }
        self.state = state;
        out_events.push(Event::GameStateChanged { state });
    }

    pub(crate) fn end_game(&mut self, cause: GameOverCause, out_events: &mut Vec<Event>) {
        if self.state.is_terminal() {
            return;
        }
        info!("game over: {cause:?}");
        self.physics.set_velocity(self.player.body, Vec3::ZERO);
        self.set_state(GameState::GameOver(cause), out_events);
    }

    fn start_run(&mut self, out_events: &mut Vec<Event>) {
        for body in self.roster.clear() {
            let _ = self.physics.remove_body(body);
            let _ = self.bodies.remove(&body);
        }

        let start = body_center(self.layout.player_start);
        self.physics.set_position(self.player.body, start);
        self.physics.set_velocity(self.player.body, Vec3::ZERO);
        self.player.health = Health::full(PLAYER_MAX_HEALTH);
        self.player.loadout = WeaponLoadout::new();
        self.player.ledger = Ledger::new();

        info!("starting run on {:?}", self.difficulty);
        self.set_state(GameState::Playing, out_events);
        out_events.push(Event::GameStarted {
            difficulty: self.difficulty,
        });
    }

    fn spawn_enemy(&mut self, position: Vec3, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let center = body_center(position);
        let body = self.physics.add_body(BodyDesc {
            position: center,
            half_extents: BODY_HALF_EXTENTS,
        });
        let enemy = self.roster.spawn(kind, body, center);
        let _ = self.bodies.insert(body, ActorRef::Enemy(enemy));
        debug!("spawned {kind:?} enemy {} at {center}", enemy.get());

        out_events.push(Event::EnemySpawned {
            enemy,
            kind,
            position: center,
        });
        if kind == EnemyKind::Boss {
            out_events.push(Event::DialogueRaised {
                cue: DialogueCue::BossSpawn,
                speaker: enemy,
            });
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt = dt.min(MAX_TICK);
        self.clock = self.clock.saturating_add(dt);
        self.physics.step(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            now: self.clock,
        });

        if self.player.loadout.complete_reload(self.clock) {
            out_events.push(Event::ReloadCompleted {
                weapon: self.player.loadout.current(),
                ammo: self.player.loadout.ammo(),
            });
        }

        for enemy in self.roster.compact() {
            out_events.push(Event::EnemyRemoved { enemy });
        }

        if self.state == GameState::Playing && self.player_reached_goal() {
            info!("goal reached after {:?}", self.clock);
            self.set_state(GameState::Won, out_events);
        }
    }

    fn player_reached_goal(&self) -> bool {
        let Some(goal) = self.layout.goal else {
            return false;
        };
        let Some(position) = self.physics.position(self.player.body) else {
            return false;
        };
        let offset = position - goal;
        offset.x.hypot(offset.z) < GOAL_RADIUS
    }

    fn fire_weapon(&mut self, origin: Vec3, direction: Vec3, out_events: &mut Vec<Event>) {
        let weapon = self.player.loadout.current();
        match self.player.loadout.fire(self.clock) {
            FireOutcome::Blocked(reason) => out_events.push(Event::FireBlocked { reason }),
            FireOutcome::DryFire { consecutive } => {
                debug!("dry fire {consecutive}");
                out_events.push(Event::DryFire { consecutive });
                if consecutive >= DRY_FIRE_LIMIT {
                    self.end_game(GameOverCause::WeaponFailure, out_events);
                }
            }
            FireOutcome::Fired { pellets, damage } => {
                let definition = weapon.definition();
                out_events.push(Event::WeaponFired {
                    weapon,
                    pellets,
                    ammo: self.player.loadout.ammo(),
                });
                out_events.push(Event::RecoilApplied {
                    kick: definition.recoil_kick(),
                });
                combat::resolve_shot(
                    self,
                    origin,
                    direction,
                    pellets,
                    damage,
                    definition.spread,
                    out_events,
                );
            }
        }
    }

    fn drive_enemy(
        &mut self,
        id: EnemyId,
        state: EnemyState,
        velocity: Vec3,
        facing: Option<Vec3>,
        patrol_target: Option<Vec3>,
        out_events: &mut Vec<Event>,
    ) {
        if state == EnemyState::Dead {
            return;
        }
        let Some(enemy) = self.roster.alive_mut(id) else {
            return;
        };

        let from = enemy.state;
        enemy.state = state;
        enemy.facing = facing;
        if patrol_target.is_some() {
            enemy.patrol_target = patrol_target;
        }
        if state != EnemyState::Fleeing {
            enemy.flee_until = None;
        }
        if let Some(body) = enemy.body {
            self.physics
                .set_velocity(body, Vec3::new(velocity.x, 0.0, velocity.z));
        }

        if from != state {
            out_events.push(Event::EnemyStateChanged {
                enemy: id,
                from,
                to: state,
            });
        }
    }

    fn enemy_attack(&mut self, id: EnemyId, hit: bool, out_events: &mut Vec<Event>) {
        let now = self.clock;
        let Some(enemy) = self.roster.alive_mut(id) else {
            return;
        };
        if enemy.state == EnemyState::Fleeing {
            return;
        }
        enemy.last_attack = Some(now);
        out_events.push(Event::EnemyFired { enemy: id, hit });

        if hit {
            let _ = combat::apply_damage(self, ActorRef::Player, ENEMY_ATTACK_DAMAGE, out_events);
        }
    }

    fn scare_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let until = self.clock.saturating_add(FLEE_DURATION);
        let Some(enemy) = self.roster.alive_mut(id) else {
            return;
        };
        let from = enemy.state;
        enemy.state = EnemyState::Fleeing;
        enemy.flee_until = Some(until);

        if from != EnemyState::Fleeing {
            out_events.push(Event::EnemyStateChanged {
                enemy: id,
                from,
                to: EnemyState::Fleeing,
            });
        }
        out_events.push(Event::EnemyFleeing { enemy: id, until });
    }

    fn switch_weapon(&mut self, weapon: WeaponId, out_events: &mut Vec<Event>) {
        let outcome = self
            .player
            .loadout
            .switch_weapon(weapon, &mut self.player.ledger);
        match outcome {
            SwitchOutcome::Equipped | SwitchOutcome::Purchased { .. } => {
                if let SwitchOutcome::Purchased { price } = outcome {
                    info!("bought {weapon:?} for ${price}");
                }
                out_events.push(Event::WeaponEquipped { weapon, outcome });
            }
            SwitchOutcome::InsufficientFunds { .. } => {
                out_events.push(Event::PurchaseRejected { weapon, outcome });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn body_center(ground: Vec3) -> Vec3 {
    Vec3::new(ground.x, ground.y + BODY_HALF_EXTENTS.y, ground.z)
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the run is won or lost every command is a no-op.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.state.is_terminal() {
        return;
    }

    let state = world.state;
    match command {
        Command::Tick { dt } => {
            if state.is_live() {
                world.advance(dt, out_events);
            }
        }
        Command::CycleDifficulty => {
            if state == GameState::Menu {
                world.difficulty = world.difficulty.next();
                out_events.push(Event::DifficultyChanged {
                    difficulty: world.difficulty,
                });
            }
        }
        Command::StartGame => {
            if state == GameState::Menu {
                world.start_run(out_events);
            }
        }
        Command::OpenShop => {
            if state == GameState::Playing {
                world.physics.set_velocity(world.player.body, Vec3::ZERO);
                world.set_state(GameState::Shop, out_events);
            }
        }
        Command::CloseShop => {
            if state == GameState::Shop {
                world.set_state(GameState::Playing, out_events);
            }
        }
        Command::SteerPlayer { velocity } => {
            if state == GameState::Playing {
                world
                    .physics
                    .set_velocity(world.player.body, Vec3::new(velocity.x, 0.0, velocity.z));
            }
        }
        Command::FireWeapon { origin, direction } => {
            if state == GameState::Playing {
                world.fire_weapon(origin, direction, out_events);
            }
        }
        Command::Reload => {
            if state == GameState::Playing {
                if let Some(completes_at) = world.player.loadout.reload(world.clock) {
                    out_events.push(Event::ReloadStarted { completes_at });
                }
            }
        }
        Command::SwitchWeapon { weapon } => {
            if state.is_live() {
                world.switch_weapon(weapon, out_events);
            }
        }
        Command::SpawnEnemy { position, kind } => {
            if state.is_live() {
                world.spawn_enemy(position, kind, out_events);
            }
        }
        Command::DriveEnemy {
            enemy,
            state: behavior,
            velocity,
            facing,
            patrol_target,
        } => {
            if state.is_live() {
                world.drive_enemy(enemy, behavior, velocity, facing, patrol_target, out_events);
            }
        }
        Command::EnemyAttack { enemy, hit } => {
            if state.is_live() {
                world.enemy_attack(enemy, hit, out_events);
            }
        }
        Command::Flee { enemy } => {
            if state.is_live() {
                world.scare_enemy(enemy, out_events);
            }
        }
        Command::RaiseDialogue { cue, speaker } => {
            if state.is_live() && world.roster.get(speaker).is_some() {
                out_events.push(Event::DialogueRaised { cue, speaker });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{collections::BTreeMap, time::Duration};

    use sundown_core::{
        ActorDirectory, ActorRef, BodyHandle, Difficulty, EnemySnapshot, EnemyView, GameState,
        Layout, PhysicsWorld, PlayerSnapshot, RayHit, RayHitTest, Vec3,
    };

    use super::{KinematicWorld, World};

    /// Current top-level state of the run.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.state
    }

    /// Difficulty selected in the menu or used by the current run.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Simulated time elapsed while live.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Town layout the world was built from.
    #[must_use]
    pub fn layout(world: &World) -> &Layout {
        &world.layout
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        world.roster.alive_count()
    }

    /// Captures a read-only view of the enemy roster.
    ///
    /// Dead enemies stay visible until the next tick compacts them away.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .roster
            .iter()
            .map(|enemy| {
                let body = enemy.body;
                EnemySnapshot {
                    id: enemy.id,
                    kind: enemy.kind,
                    state: enemy.state,
                    position: body
                        .and_then(|body| world.physics.position(body))
                        .unwrap_or(enemy.resting_position),
                    velocity: body
                        .and_then(|body| world.physics.velocity(body))
                        .unwrap_or(Vec3::ZERO),
                    health: enemy.health,
                    last_attack: enemy.last_attack,
                    patrol_target: enemy.patrol_target,
                    flee_until: enemy.flee_until,
                    facing: enemy.facing,
                }
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures the player's body, health, weapon and economy state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world
                .physics
                .position(world.player.body)
                .unwrap_or(Vec3::ZERO),
            health: world.player.health,
            loadout: world.player.loadout.snapshot(),
            ledger: world.player.ledger,
        }
    }

    /// Exposes the physics scene together with the body-to-actor mapping.
    #[must_use]
    pub fn scene(world: &World) -> Scene<'_> {
        Scene {
            physics: &world.physics,
            bodies: &world.bodies,
        }
    }

    /// Read-only physics scene used for perception queries.
    #[derive(Clone, Copy, Debug)]
    pub struct Scene<'a> {
        physics: &'a KinematicWorld,
        bodies: &'a BTreeMap<BodyHandle, ActorRef>,
    }

    impl Scene<'_> {
        /// Number of bodies currently simulated.
        #[must_use]
        pub fn body_count(&self) -> usize {
            self.physics.body_count()
        }
    }

    impl RayHitTest for Scene<'_> {
        fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayHit> {
            self.physics.cast(origin, direction, max_distance)
        }
    }

    impl ActorDirectory for Scene<'_> {
        fn actor_for(&self, body: BodyHandle) -> Option<ActorRef> {
            self.bodies.get(&body).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundown_core::ScriptedRandom;

    fn playing_world(layout: Layout) -> (World, Vec<Event>) {
        let mut world = World::with_layout(layout).with_random(ScriptedRandom::constant(0.5));
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        (world, events)
    }

    fn open_field() -> Layout {
        Layout {
            player_start: Vec3::ZERO,
            goal: None,
            spawn_points: Vec::new(),
            walls: Vec::new(),
        }
    }

    #[test]
    fn new_world_waits_in_menu() {
        let world = World::new();

        assert_eq!(query::game_state(&world), GameState::Menu);
        assert_eq!(query::difficulty(&world), Difficulty::Normal);
        assert_eq!(query::active_enemy_count(&world), 0);
    }

    #[test]
    fn difficulty_only_cycles_in_menu() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::CycleDifficulty, &mut events);
        assert_eq!(query::difficulty(&world), Difficulty::Hard);

        apply(&mut world, Command::StartGame, &mut events);
        apply(&mut world, Command::CycleDifficulty, &mut events);
        assert_eq!(query::difficulty(&world), Difficulty::Hard);
    }

    #[test]
    fn start_game_enters_playing() {
        let (world, events) = playing_world(open_field());

        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(
            events,
            vec![
                Event::GameStateChanged {
                    state: GameState::Playing
                },
                Event::GameStarted {
                    difficulty: Difficulty::Normal
                },
            ]
        );
    }

    #[test]
    fn tick_clamps_large_steps() {
        let (mut world, _) = playing_world(open_field());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        );

        assert_eq!(query::clock(&world), MAX_TICK);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: MAX_TICK,
                now: MAX_TICK
            }]
        );
    }

    #[test]
    fn ticks_in_menu_do_not_advance_clock() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: MAX_TICK }, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::clock(&world), Duration::ZERO);
    }

    #[test]
    fn shop_blocks_fire_but_allows_switching() {
        let (mut world, _) = playing_world(open_field());
        let mut events = Vec::new();

        apply(&mut world, Command::OpenShop, &mut events);
        apply(
            &mut world,
            Command::FireWeapon {
                origin: Vec3::ZERO,
                direction: Vec3::Z,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SwitchWeapon {
                weapon: WeaponId::Revolver,
            },
            &mut events,
        );

        assert_eq!(query::player(&world).loadout.ammo, 12);
        assert_eq!(
            events,
            vec![
                Event::GameStateChanged {
                    state: GameState::Shop
                },
                Event::WeaponEquipped {
                    weapon: WeaponId::Revolver,
                    outcome: SwitchOutcome::Equipped
                },
            ]
        );
    }

    #[test]
    fn reaching_the_goal_wins() {
        let mut layout = open_field();
        layout.goal = Some(Vec3::new(0.0, 0.0, 5.0));
        let (mut world, _) = playing_world(layout);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SteerPlayer {
                velocity: Vec3::new(0.0, 0.0, 10.0),
            },
            &mut events,
        );
        for _ in 0..3 {
            apply(&mut world, Command::Tick { dt: MAX_TICK }, &mut events);
        }

        assert_eq!(query::game_state(&world), GameState::Won);
        assert!(events.contains(&Event::GameStateChanged {
            state: GameState::Won
        }));
    }

    #[test]
    fn boss_spawn_raises_dialogue() {
        let (mut world, _) = playing_world(open_field());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec3::new(10.0, 0.0, 0.0),
                kind: EnemyKind::Boss,
            },
            &mut events,
        );

        let enemy = EnemyId::new(0);
        assert_eq!(
            events,
            vec![
                Event::EnemySpawned {
                    enemy,
                    kind: EnemyKind::Boss,
                    position: Vec3::new(10.0, 1.0, 0.0),
                },
                Event::DialogueRaised {
                    cue: DialogueCue::BossSpawn,
                    speaker: enemy,
                },
            ]
        );
        let view = query::enemy_view(&world);
        assert_eq!(view.get(enemy).map(|e| e.health.max()), Some(1_000));
    }

    #[test]
    fn flee_sets_deadline_and_blocks_attacks() {
        let (mut world, _) = playing_world(open_field());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec3::new(5.0, 0.0, 0.0),
                kind: EnemyKind::Regular,
            },
            &mut events,
        );
        let enemy = EnemyId::new(0);
        events.clear();

        apply(&mut world, Command::Flee { enemy }, &mut events);
        apply(&mut world, Command::EnemyAttack { enemy, hit: true }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::EnemyStateChanged {
                    enemy,
                    from: EnemyState::Patrol,
                    to: EnemyState::Fleeing,
                },
                Event::EnemyFleeing {
                    enemy,
                    until: FLEE_DURATION,
                },
            ]
        );
        assert_eq!(query::player(&world).health.current(), PLAYER_MAX_HEALTH);
    }
}
