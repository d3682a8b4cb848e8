#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sundown engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.
//!
//! The collaborator boundary (physics, ray queries, line of sight and
//! randomness) is expressed as traits so the world and the systems never
//! depend on a concrete engine.

mod catalog;
mod economy;
pub mod random;

use std::time::Duration;

pub use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use catalog::{WeaponDefinition, WeaponId};
pub use economy::{InsufficientFunds, KillReward, Ledger, Level, BASE_KILL_REWARD};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};

/// Maximum simulated time a single tick may advance.
pub const MAX_TICK: Duration = Duration::from_millis(100);

/// Health the player starts every run with.
pub const PLAYER_MAX_HEALTH: u32 = 100;

/// Maximum distance a player shot travels.
pub const WEAPON_RANGE: f32 = 200.0;

/// Height above a body's center from which actors look and are looked at.
pub const EYE_OFFSET: f32 = 0.6;

/// Top-level state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Main menu; difficulty can be changed.
    Menu,
    /// Active play.
    Playing,
    /// Shop overlay; the simulation keeps running but the player cannot shoot.
    Shop,
    /// The player reached the goal.
    Won,
    /// The run ended in defeat.
    GameOver(GameOverCause),
}

impl GameState {
    /// Reports whether the state can never be left again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::GameOver(_))
    }

    /// Reports whether enemies and the clock-driven systems are active.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Playing | Self::Shop)
    }
}

/// Reason a run ended in defeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCause {
    /// Player health reached zero.
    PlayerKilled,
    /// Three consecutive dry fires blew up the weapon.
    WeaponFailure,
}

/// Difficulty selected in the menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Small initial wave and reinforcement cap.
    Easy,
    /// Default tuning.
    #[default]
    Normal,
    /// Large waves.
    Hard,
}

impl Difficulty {
    /// Upper bound on the enemies spawned by the initial wave.
    #[must_use]
    pub const fn initial_cap(self) -> usize {
        match self {
            Self::Easy => 10,
            Self::Normal => 30,
            Self::Hard => 60,
        }
    }

    /// Population below which reinforcements may trickle in.
    #[must_use]
    pub const fn reinforcement_cap(self) -> usize {
        match self {
            Self::Easy => 3,
            Self::Normal => 5,
            Self::Hard => 10,
        }
    }

    /// Next difficulty in menu order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Easy => Self::Normal,
            Self::Normal => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Handle of a rigid body owned by the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(u32);

impl BodyHandle {
    /// Creates a handle from its numeric slot.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric slot of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to any damageable, positioned actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorRef {
    /// The single player.
    Player,
    /// A member of the enemy roster.
    Enemy(EnemyId),
}

impl ActorRef {
    /// Side the actor fights for.
    #[must_use]
    pub const fn faction(self) -> Faction {
        match self {
            Self::Player => Faction::Lawman,
            Self::Enemy(_) => Faction::Outlaw,
        }
    }
}

/// Sides of the fight. Actors never block sight lines of their own side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Faction {
    /// The player.
    Lawman,
    /// Every enemy.
    Outlaw,
}

/// Enemy variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Regular gunman.
    Regular,
    /// Gang leader with more health and a slower gait.
    Boss,
}

impl EnemyKind {
    /// Health the enemy spawns with.
    #[must_use]
    pub const fn max_health(self) -> u32 {
        match self {
            Self::Regular => 300,
            Self::Boss => 1_000,
        }
    }

    /// Horizontal movement speed in world units per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Regular => 5.0,
            Self::Boss => 4.5,
        }
    }
}

/// Behavior states of the enemy state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Wandering between random nearby points.
    Patrol,
    /// Closing in on a visible player.
    Chase,
    /// Standing still and shooting at the player.
    Attack,
    /// Running away after a scare.
    Fleeing,
    /// Killed; awaiting removal from the roster.
    Dead,
}

/// Current and maximum health of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Creates full health with the provided maximum.
    #[must_use]
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether health reached zero.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Subtracts damage, clamping at zero.
    ///
    /// Reports [`DamageOutcome::Died`] only on the transition to zero, so a
    /// depleted pool absorbs further damage as [`DamageOutcome::Ignored`].
    pub fn take(&mut self, amount: u32) -> DamageOutcome {
        if self.is_depleted() {
            return DamageOutcome::Ignored;
        }
        self.current = self.current.saturating_sub(amount);
        if self.current == 0 {
            DamageOutcome::Died
        } else {
            DamageOutcome::Survived {
                remaining: self.current,
            }
        }
    }

    /// Restores health up to the maximum, returning the amount restored.
    ///
    /// A depleted pool cannot be healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_depleted() {
            return 0;
        }
        let restored = amount.min(self.max - self.current);
        self.current += restored;
        restored
    }
}

/// Result of a damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageOutcome {
    /// The actor is still alive.
    Survived {
        /// Health left after the hit.
        remaining: u32,
    },
    /// The hit killed the actor.
    Died,
    /// The actor was already dead, missing, or the run is over.
    Ignored,
}

/// Dialogue cues raised by the simulation for the dialogue collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueCue {
    /// Ambient chatter while idle.
    Idle,
    /// Taunt while shooting.
    Combat,
    /// Scream of a dying enemy.
    Death,
    /// Announcement of the gang leader.
    BossSpawn,
}

/// Reasons a trigger pull was refused without touching the magazine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// A reload is in progress.
    Reloading,
    /// The previous shot is too recent.
    RateLimited,
}

/// Result of a trigger pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireOutcome {
    /// A round was spent.
    Fired {
        /// Independent rays to trace.
        pellets: u32,
        /// Damage applied by each ray that connects.
        damage: u32,
    },
    /// The trigger pull was refused.
    Blocked(BlockReason),
    /// The magazine is empty.
    DryFire {
        /// Consecutive dry fires including this one.
        consecutive: u8,
    },
}

/// Result of a weapon switch or purchase request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwitchOutcome {
    /// An owned weapon was equipped.
    Equipped,
    /// The weapon was bought and equipped.
    Purchased {
        /// Dollars deducted.
        price: u32,
    },
    /// The player cannot afford the weapon; nothing changed.
    InsufficientFunds {
        /// Price of the weapon.
        price: u32,
        /// Money available.
        available: u32,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Selects the next difficulty while in the menu.
    CycleDifficulty,
    /// Leaves the menu and starts a run at the selected difficulty.
    StartGame,
    /// Opens the shop overlay.
    OpenShop,
    /// Closes the shop overlay.
    CloseShop,
    /// Sets the player's horizontal velocity.
    SteerPlayer {
        /// Desired velocity in world units per second.
        velocity: Vec3,
    },
    /// Pulls the trigger of the equipped weapon.
    FireWeapon {
        /// World-space origin of the shot.
        origin: Vec3,
        /// Aim direction before spread is applied.
        direction: Vec3,
    },
    /// Starts reloading the equipped weapon.
    Reload,
    /// Equips, or buys and equips, a weapon.
    SwitchWeapon {
        /// Weapon requested.
        weapon: WeaponId,
    },
    /// Adds an enemy to the roster and the physics world.
    SpawnEnemy {
        /// Ground position of the new enemy.
        position: Vec3,
        /// Variant to spawn.
        kind: EnemyKind,
    },
    /// Applies one tick of enemy behavior.
    DriveEnemy {
        /// Enemy being driven.
        enemy: EnemyId,
        /// State chosen for this tick.
        state: EnemyState,
        /// Horizontal velocity to apply.
        velocity: Vec3,
        /// Point the enemy should face, if any.
        facing: Option<Vec3>,
        /// Patrol waypoint to remember, if one was picked.
        patrol_target: Option<Vec3>,
    },
    /// Resolves an enemy shot at the player.
    EnemyAttack {
        /// Shooting enemy.
        enemy: EnemyId,
        /// Whether the hit roll succeeded.
        hit: bool,
    },
    /// Scares an enemy into running away.
    Flee {
        /// Enemy told to flee.
        enemy: EnemyId,
    },
    /// Raises a dialogue cue on behalf of an enemy.
    RaiseDialogue {
        /// Cue raised.
        cue: DialogueCue,
        /// Enemy speaking.
        speaker: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulated time after the tick.
        now: Duration,
    },
    /// Announces that the run entered a new top-level state.
    GameStateChanged {
        /// State that became active.
        state: GameState,
    },
    /// Confirms that the menu difficulty changed.
    DifficultyChanged {
        /// Difficulty now selected.
        difficulty: Difficulty,
    },
    /// Announces that a run started.
    GameStarted {
        /// Difficulty of the run.
        difficulty: Difficulty,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Variant spawned.
        kind: EnemyKind,
        /// Position of the body center.
        position: Vec3,
    },
    /// Reports an enemy behavior transition.
    EnemyStateChanged {
        /// Enemy that changed state.
        enemy: EnemyId,
        /// Previous state.
        from: EnemyState,
        /// New state.
        to: EnemyState,
    },
    /// Reports an enemy shot at the player.
    EnemyFired {
        /// Shooting enemy.
        enemy: EnemyId,
        /// Whether the shot connected.
        hit: bool,
    },
    /// Reports health lost by an actor.
    DamageApplied {
        /// Actor that was hit.
        target: ActorRef,
        /// Damage requested.
        amount: u32,
        /// Health left afterwards.
        remaining: u32,
    },
    /// Reports that an enemy died and left the physics world.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
    },
    /// Reports that a dead enemy left the roster.
    EnemyRemoved {
        /// Enemy that was compacted away.
        enemy: EnemyId,
    },
    /// Reports money credited for a kill.
    KillRewarded {
        /// Dollars credited.
        reward: u32,
        /// Kill count after the kill.
        kills: u32,
        /// Money after the kill.
        money: u32,
    },
    /// Reports that the player reached a new level.
    LevelUp {
        /// Level reached.
        level: Level,
        /// New reward multiplier in percent.
        multiplier_percent: u32,
    },
    /// Reports health restored to the player.
    PlayerHealed {
        /// Health restored.
        amount: u32,
        /// Health afterwards.
        health: u32,
    },
    /// Confirms that a round was spent.
    WeaponFired {
        /// Weapon fired.
        weapon: WeaponId,
        /// Rays traced.
        pellets: u32,
        /// Rounds left in the magazine.
        ammo: u32,
    },
    /// Reports where a pellet stopped.
    PelletImpact {
        /// Impact point.
        point: Vec3,
        /// Enemy struck, if any.
        struck: Option<EnemyId>,
    },
    /// Reports a camera kick caused by a shot.
    RecoilApplied {
        /// Pitch kick in radians.
        kick: f32,
    },
    /// Reports that a trigger pull was refused.
    FireBlocked {
        /// Reason for the refusal.
        reason: BlockReason,
    },
    /// Reports a trigger pull on an empty magazine.
    DryFire {
        /// Consecutive dry fires including this one.
        consecutive: u8,
    },
    /// Confirms that a reload began.
    ReloadStarted {
        /// Simulated time at which the reload completes.
        completes_at: Duration,
    },
    /// Confirms that a reload finished.
    ReloadCompleted {
        /// Weapon reloaded.
        weapon: WeaponId,
        /// Rounds in the magazine.
        ammo: u32,
    },
    /// Confirms a weapon switch or purchase.
    WeaponEquipped {
        /// Weapon now equipped.
        weapon: WeaponId,
        /// Result of the request.
        outcome: SwitchOutcome,
    },
    /// Reports a refused purchase.
    PurchaseRejected {
        /// Weapon requested.
        weapon: WeaponId,
        /// Result of the request.
        outcome: SwitchOutcome,
    },
    /// Dialogue cue for the dialogue collaborator.
    DialogueRaised {
        /// Cue raised.
        cue: DialogueCue,
        /// Enemy speaking.
        speaker: EnemyId,
    },
    /// Reports that an enemy started fleeing.
    EnemyFleeing {
        /// Enemy fleeing.
        enemy: EnemyId,
        /// Simulated time at which the enemy recovers.
        until: Duration,
    },
}

/// Axis-aligned box used for walls and body extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its corners, reordering components as needed.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from its center and half extents.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Reports whether the point lies inside the box.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// Reports whether the two boxes overlap.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }

    /// Distance along the ray to the first intersection, using the slab method.
    ///
    /// `direction` must be normalized. Origins inside the box report zero.
    #[must_use]
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inverse = direction.recip();
        let t1 = (self.min - origin) * inverse;
        let t2 = (self.max - origin) * inverse;
        let near = t1.min(t2).max_element();
        let far = t1.max(t2).min_element();

        if far < 0.0 || near > far {
            None
        } else {
            Some(near.max(0.0))
        }
    }
}

/// Static town description consumed from the level generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Ground position the player starts a run at.
    pub player_start: Vec3,
    /// Position of the golden badge that wins the run.
    #[serde(default)]
    pub goal: Option<Vec3>,
    /// Ground positions enemies may spawn at.
    #[serde(default)]
    pub spawn_points: Vec<Vec3>,
    /// Opaque static colliders.
    #[serde(default)]
    pub walls: Vec<Aabb>,
}

impl Default for Layout {
    fn default() -> Self {
        let walls = vec![
            Aabb::new(Vec3::new(-60.0, 0.0, -61.0), Vec3::new(60.0, 4.0, -60.0)),
            Aabb::new(Vec3::new(-60.0, 0.0, 60.0), Vec3::new(60.0, 4.0, 61.0)),
            Aabb::new(Vec3::new(-61.0, 0.0, -60.0), Vec3::new(-60.0, 4.0, 60.0)),
            Aabb::new(Vec3::new(60.0, 0.0, -60.0), Vec3::new(61.0, 4.0, 60.0)),
            Aabb::new(Vec3::new(-20.0, 0.0, -25.0), Vec3::new(-8.0, 5.0, -15.0)),
            Aabb::new(Vec3::new(8.0, 0.0, -25.0), Vec3::new(20.0, 5.0, -15.0)),
            Aabb::new(Vec3::new(-20.0, 0.0, 15.0), Vec3::new(-8.0, 5.0, 25.0)),
            Aabb::new(Vec3::new(8.0, 0.0, 15.0), Vec3::new(20.0, 5.0, 25.0)),
        ];
        let spawn_points = vec![
            Vec3::new(-45.0, 0.0, -45.0),
            Vec3::new(45.0, 0.0, -45.0),
            Vec3::new(-45.0, 0.0, 45.0),
            Vec3::new(45.0, 0.0, 45.0),
            Vec3::new(0.0, 0.0, -40.0),
            Vec3::new(-30.0, 0.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::new(-5.0, 0.0, 50.0),
            Vec3::new(5.0, 0.0, 50.0),
        ];
        Self {
            player_start: Vec3::new(0.0, 0.0, -50.0),
            goal: Some(Vec3::new(0.0, 0.0, 50.0)),
            spawn_points,
            walls,
        }
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Current behavior state.
    pub state: EnemyState,
    /// Body center position.
    pub position: Vec3,
    /// Body velocity.
    pub velocity: Vec3,
    /// Health pool.
    pub health: Health,
    /// Simulated time of the last shot at the player.
    pub last_attack: Option<Duration>,
    /// Remembered patrol waypoint.
    pub patrol_target: Option<Vec3>,
    /// Simulated time at which fleeing ends.
    pub flee_until: Option<Duration>,
    /// Point the enemy is turned toward, if any.
    pub facing: Option<Vec3>,
}

impl EnemySnapshot {
    /// Reports whether the enemy is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }
}

/// Read-only snapshot describing all enemies within the town.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over living enemies only.
    pub fn alive(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.is_alive())
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable view of the player's weapon state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadoutSnapshot {
    /// Equipped weapon.
    pub weapon: WeaponId,
    /// Rounds in the magazine.
    pub ammo: u32,
    /// Completion time of the reload in progress, if any.
    pub reload_completes_at: Option<Duration>,
    /// Weapons owned, in catalog order.
    pub owned: Vec<WeaponId>,
    /// Consecutive dry fires since the last reload or switch.
    pub consecutive_dry_fires: u8,
}

impl LoadoutSnapshot {
    /// Reports whether a reload is in progress.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reload_completes_at.is_some()
    }
}

/// Immutable view of the player used by systems and adapters.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Body center position.
    pub position: Vec3,
    /// Health pool.
    pub health: Health,
    /// Weapon state.
    pub loadout: LoadoutSnapshot,
    /// Economy state.
    pub ledger: Ledger,
}

/// Description of a body handed to the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    /// Initial center position.
    pub position: Vec3,
    /// Half extents of the body's box.
    pub half_extents: Vec3,
}

/// Rigid-body simulator treated as a black box.
pub trait PhysicsWorld {
    /// Inserts a body and returns its handle.
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;
    /// Removes a body, reporting whether it existed.
    fn remove_body(&mut self, body: BodyHandle) -> bool;
    /// Integrates every body over the provided timestep.
    fn step(&mut self, dt: Duration);
    /// Center position of a body.
    fn position(&self, body: BodyHandle) -> Option<Vec3>;
    /// Velocity of a body.
    fn velocity(&self, body: BodyHandle) -> Option<Vec3>;
    /// Overwrites the velocity of a body.
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    /// Overwrites the position of a body.
    fn set_position(&mut self, body: BodyHandle, position: Vec3);
}

/// Object struck by a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitObject {
    /// Opaque static geometry.
    Static,
    /// A dynamic body.
    Body(BodyHandle),
}

/// Single intersection reported by a ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Object struck.
    pub object: HitObject,
    /// World-space intersection point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// Ray query against the static world and every body.
pub trait RayHitTest {
    /// Casts a ray and returns every hit within `max_distance`, nearest first.
    ///
    /// `direction` must be normalized.
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayHit>;
}

/// Resolves body handles to the actors that own them.
pub trait ActorDirectory {
    /// Actor owning the body, if any.
    fn actor_for(&self, body: BodyHandle) -> Option<ActorRef>;
}

/// Line-of-sight query consumed by the enemy controller.
pub trait LineOfSight {
    /// Reports whether `observer`, standing at `from`, can see the point `to`.
    fn has_line_of_sight(&self, observer: ActorRef, from: Vec3, to: Vec3) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero_and_dies_once() {
        let mut health = Health::full(300);
        assert_eq!(health.take(100), DamageOutcome::Survived { remaining: 200 });
        assert_eq!(health.take(9_999), DamageOutcome::Died);
        assert_eq!(health.current(), 0);
        assert_eq!(health.take(10), DamageOutcome::Ignored);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn healing_never_exceeds_maximum() {
        let mut health = Health::full(PLAYER_MAX_HEALTH);
        let _ = health.take(3);
        assert_eq!(health.heal(5), 3);
        assert_eq!(health.current(), PLAYER_MAX_HEALTH);
        assert_eq!(health.heal(5), 0);
    }

    #[test]
    fn depleted_health_cannot_be_healed() {
        let mut health = Health::full(10);
        let _ = health.take(10);
        assert_eq!(health.heal(5), 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn difficulty_caps_match_tuning() {
        assert_eq!(Difficulty::Easy.initial_cap(), 10);
        assert_eq!(Difficulty::Normal.initial_cap(), 30);
        assert_eq!(Difficulty::Hard.initial_cap(), 60);
        assert_eq!(Difficulty::Easy.reinforcement_cap(), 3);
        assert_eq!(Difficulty::Normal.reinforcement_cap(), 5);
        assert_eq!(Difficulty::Hard.reinforcement_cap(), 10);
    }

    #[test]
    fn difficulty_cycles_through_all_variants() {
        let start = Difficulty::Easy;
        assert_eq!(start.next(), Difficulty::Normal);
        assert_eq!(start.next().next(), Difficulty::Hard);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn terminal_states_are_not_live() {
        for state in [
            GameState::Won,
            GameState::GameOver(GameOverCause::PlayerKilled),
            GameState::GameOver(GameOverCause::WeaponFailure),
        ] {
            assert!(state.is_terminal());
            assert!(!state.is_live());
        }
        assert!(GameState::Shop.is_live());
        assert!(!GameState::Menu.is_live());
    }

    #[test]
    fn ray_hits_box_in_front_and_misses_box_behind() {
        let wall = Aabb::new(Vec3::new(-1.0, 0.0, 4.0), Vec3::new(1.0, 2.0, 5.0));
        let origin = Vec3::new(0.0, 1.0, 0.0);

        let ahead = wall.ray_distance(origin, Vec3::Z);
        let behind = wall.ray_distance(origin, Vec3::NEG_Z);

        assert!(ahead.is_some_and(|distance| (distance - 4.0).abs() < 1e-5));
        assert!(behind.is_none());
    }

    #[test]
    fn boxes_overlap_only_when_intervals_overlap() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE);
        let c = Aabb::from_center(Vec3::new(3.0, 0.0, 0.0), Vec3::ONE);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
