#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! All geometry is expressed in grid units where one tile spans `1.0`. A
//! tile's simulation position is its coordinate; pixels only appear at the
//! render boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod catalog;
mod config;
mod map;
mod waves;

pub use catalog::{
    MobCategory, MobStats, ProjectileEffect, Ruleset, Tier, TowerBlueprint, TowerKind,
    TowerStats, UnknownTowerKind,
};
pub use config::{ConfigError, GameConfig};
pub use glam::Vec2;
pub use map::{MapError, MapPoint, MapSpec, MapTiles};
pub use waves::{
    endless_mob_stats, endless_wave, standard_wave, stress_wave, wave_definition, Wave,
    WaveEntry, STANDARD_WAVE_COUNT, STRESS_WAVE_COUNT,
};

/// Distance in tiles at which a projectile is considered to have struck its target.
pub const HIT_THRESHOLD: f32 = 0.5;

/// Lifecycle state of a running game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The simulation advances on every tick.
    #[default]
    Playing,
    /// Ticks are ignored until the game resumes.
    Paused,
    /// Every wave was cleared. Terminal.
    Won,
    /// The base ran out of lives. Terminal.
    Lost,
}

impl GameStatus {
    /// Reports whether the status can never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Multiplier applied to every tick delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSpeed {
    /// Real-time simulation.
    #[default]
    Normal,
    /// Every tick covers twice the supplied delta.
    Double,
}

impl GameSpeed {
    /// Integer factor applied to tick deltas.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
        }
    }

    /// Returns the other speed setting.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Normal,
        }
    }
}

/// Rule a tower uses to choose among the mobs inside its range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetingStrategy {
    /// Earliest spawned mob, which is the one furthest along its route.
    #[default]
    First,
    /// Most recently spawned mob.
    Last,
    /// Mob closest to the tower.
    Nearest,
    /// Mob with the highest maximum hit points.
    Strongest,
    /// Mob with the lowest current hit points.
    Weakest,
}

impl TargetingStrategy {
    /// Every strategy in declaration order.
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Last,
        Self::Nearest,
        Self::Strongest,
        Self::Weakest,
    ];

    /// Lowercase label used by configuration files and the command line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Nearest => "nearest",
            Self::Strongest => "strongest",
            Self::Weakest => "weakest",
        }
    }
}

/// Error returned when parsing an unknown targeting strategy label.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown targeting strategy `{0}`")]
pub struct UnknownStrategy(pub String);

impl std::str::FromStr for TargetingStrategy {
    type Err = UnknownStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownStrategy(value.to_owned()))
    }
}

/// Cardinal directions of travel along a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit vector pointing in this direction, in grid units.
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(0.0, -1.0),
            Self::East => Vec2::new(1.0, 0.0),
            Self::South => Vec2::new(0.0, 1.0),
            Self::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// Direction leading from one tile to an orthogonally adjacent tile.
    #[must_use]
    pub fn between(from: TileCoord, to: TileCoord) -> Option<Self> {
        if from.manhattan_distance(to) != 1 {
            return None;
        }

        if to.x() > from.x() {
            Some(Self::East)
        } else if to.x() < from.x() {
            Some(Self::West)
        } else if to.y() > from.y() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Unique identifier assigned to a mob. Allocated sequentially, so ordering
/// by id is ordering by spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MobId(u32);

impl MobId {
    /// Creates a new mob identifier with the provided numeric value.
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

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a route across the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(u32);

impl RouteId {
    /// Creates a new route identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the route identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based wave number. Wave zero means no wave has started yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(u32);

impl WaveId {
    /// Creates a new wave identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the wave number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier of the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two tiles.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Position of the tile in continuous grid units.
    #[must_use]
    pub fn position(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Ordered walk of adjacent tiles from a spawn point to the base.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    id: RouteId,
    name: String,
    spawn: TileCoord,
    base: TileCoord,
    points: Vec<TileCoord>,
}

impl Route {
    /// Creates a route from its ordered points. Returns `None` when no points are supplied.
    #[must_use]
    pub fn new(id: RouteId, name: impl Into<String>, points: Vec<TileCoord>) -> Option<Self> {
        let spawn = *points.first()?;
        let base = *points.last()?;
        Some(Self {
            id,
            name: name.into(),
            spawn,
            base,
            points,
        })
    }

    /// Identifier of the route.
    #[must_use]
    pub const fn id(&self) -> RouteId {
        self.id
    }

    /// Human readable route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tile where mobs enter the route.
    #[must_use]
    pub const fn spawn_point(&self) -> TileCoord {
        self.spawn
    }

    /// Tile where mobs reach the base.
    #[must_use]
    pub const fn base_point(&self) -> TileCoord {
        self.base
    }

    /// Ordered tiles composing the route.
    #[must_use]
    pub fn points(&self) -> &[TileCoord] {
        &self.points
    }

    /// Progress value at which a mob reaches the base.
    #[must_use]
    pub fn final_progress(&self) -> f32 {
        self.points.len().saturating_sub(1) as f32
    }

    /// Reports whether the provided progress has reached the base.
    #[must_use]
    pub fn is_complete(&self, progress: f32) -> bool {
        progress >= self.final_progress()
    }

    /// Interpolates the continuous position for the provided progress.
    ///
    /// Progress is clamped to the route, so values past the end resolve to
    /// the base point.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec2 {
        let clamped = progress.clamp(0.0, self.final_progress());
        let index = clamped.floor() as usize;
        let fraction = clamped - index as f32;
        let from = self.points.get(index).copied().unwrap_or(self.base);
        let to = self.points.get(index + 1).copied().unwrap_or(self.base);
        from.position().lerp(to.position(), fraction)
    }
}

/// Slow parameters carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Factor applied to the mob's speed while active.
    pub multiplier: f32,
    /// Time the slow lasts once applied.
    pub duration: Duration,
}

impl SlowEffect {
    /// Creates a slow with the provided multiplier and duration.
    #[must_use]
    pub const fn new(multiplier: f32, duration: Duration) -> Self {
        Self {
            multiplier,
            duration,
        }
    }
}

/// Slow currently affecting a mob.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSlow {
    /// Factor applied to the mob's speed.
    pub multiplier: f32,
    /// Time left before the slow wears off.
    pub remaining: Duration,
}

impl ActiveSlow {
    /// Combines an incoming slow with the one already active.
    ///
    /// A strictly lower multiplier replaces the current one; the remaining
    /// time always becomes the longer of the two.
    #[must_use]
    pub fn stack(current: Option<ActiveSlow>, incoming: SlowEffect) -> ActiveSlow {
        match current {
            None => ActiveSlow {
                multiplier: incoming.multiplier,
                remaining: incoming.duration,
            },
            Some(active) => ActiveSlow {
                multiplier: if incoming.multiplier < active.multiplier {
                    incoming.multiplier
                } else {
                    active.multiplier
                },
                remaining: active.remaining.max(incoming.duration),
            },
        }
    }

    /// Consumes `dt` of the remaining time, returning `None` once expired.
    #[must_use]
    pub fn decay(self, dt: Duration) -> Option<ActiveSlow> {
        let remaining = self.remaining.saturating_sub(dt);
        if remaining.is_zero() {
            None
        } else {
            Some(ActiveSlow {
                multiplier: self.multiplier,
                remaining,
            })
        }
    }
}

/// Damage dealt by a direct hit after armor.
#[must_use]
pub fn effective_damage(damage: u32, armor: u32) -> u32 {
    damage.saturating_sub(armor).max(1)
}

/// Damage dealt to mobs caught in a splash after armor.
#[must_use]
pub fn splash_damage(damage: u32, armor: u32) -> u32 {
    (damage / 2).saturating_sub(armor).max(1)
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested tile lies outside the grid.
    #[error("tile is outside the grid")]
    OutOfBounds,
    /// The requested tile is a path or blocked tile.
    #[error("tile is not buildable")]
    NotBuildable,
    /// Another tower already stands on the tile.
    #[error("tile already holds a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Cost of the requested tower.
        required: u32,
        /// Money held at the time of the request.
        available: u32,
    },
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower is already at its highest tier.
    #[error("tower is already at its highest tier")]
    MaxTier,
    /// The player cannot afford the next tier.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Cost of the next tier.
        required: u32,
        /// Money held at the time of the request.
        available: u32,
    },
}

/// Reasons a request to start the next wave may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveStartError {
    /// A wave is still running.
    #[error("a wave is already in progress")]
    WaveInProgress,
    /// Every wave of the fixed table has been played.
    #[error("no waves remain")]
    NoWavesRemaining,
}

/// Reasons a targeting change may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum TargetingError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Unscaled duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts the next wave ahead of its countdown.
    StartNextWave,
    /// Creates a mob belonging to a wave entry.
    SpawnMob {
        /// Wave the mob belongs to.
        wave: WaveId,
        /// Index of the wave entry that produced the mob.
        entry: usize,
        /// Category of the mob.
        category: MobCategory,
        /// Route the mob will travel.
        route: RouteId,
    },
    /// Marks the running wave as finished.
    CompleteWave {
        /// Wave that finished.
        wave: WaveId,
    },
    /// Writes the outcome of a movement step back to a mob.
    AdvanceMob {
        /// Mob that moved.
        mob: MobId,
        /// New progress along the route.
        progress: f32,
        /// Interpolated position after the move.
        position: Vec2,
        /// Slow left on the mob after decay.
        slow: Option<ActiveSlow>,
    },
    /// Relocates a projectile in flight.
    MoveProjectile {
        /// Projectile that moved.
        projectile: ProjectileId,
        /// Position after the move.
        position: Vec2,
    },
    /// Removes a projectile that hit or lost its target.
    RemoveProjectile {
        /// Projectile to remove.
        projectile: ProjectileId,
    },
    /// Subtracts hit points from a mob. Armor has already been applied.
    DamageMob {
        /// Mob receiving damage.
        mob: MobId,
        /// Hit points removed.
        amount: u32,
    },
    /// Applies a slow to a mob following the stacking rule.
    ApplySlow {
        /// Mob being slowed.
        mob: MobId,
        /// Incoming slow.
        effect: SlowEffect,
    },
    /// Launches a projectile from a tower toward a mob.
    FireProjectile {
        /// Tower firing.
        tower: TowerId,
        /// Mob targeted.
        target: MobId,
    },
    /// Pays bounties, removes mobs that reached the base and evaluates
    /// terminal conditions.
    ResolveCasualties,
    /// Buys and places a tower.
    PlaceTower {
        /// Blueprint describing the tower.
        blueprint: TowerBlueprint,
        /// Tile that will hold the tower.
        tile: TileCoord,
    },
    /// Buys the next tier of a tower.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Changes how a tower picks targets.
    SetTargeting {
        /// Tower to reconfigure.
        tower: TowerId,
        /// New strategy.
        strategy: TargetingStrategy,
    },
    /// Freezes the simulation.
    Pause,
    /// Unfreezes the simulation.
    Resume,
    /// Switches between normal and double speed.
    ToggleSpeed,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Scaled duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation time after the tick.
        sim_time: Duration,
    },
    /// A wave began.
    WaveStarted {
        /// Wave that began.
        wave: WaveId,
        /// Early-start bonus paid, zero when started by the countdown.
        bonus: u32,
    },
    /// A request to start the next wave was refused.
    WaveStartRejected {
        /// Reason for the refusal.
        reason: WaveStartError,
    },
    /// A wave had every mob spawned and none left alive.
    WaveCompleted {
        /// Wave that completed.
        wave: WaveId,
    },
    /// The countdown toward the next wave began.
    CountdownStarted {
        /// Wave that will start when the countdown expires.
        wave: WaveId,
        /// Countdown length.
        duration: Duration,
    },
    /// A mob entered the grid.
    MobSpawned {
        /// Identifier allocated to the mob.
        mob: MobId,
        /// Wave the mob belongs to.
        wave: WaveId,
        /// Category of the mob.
        category: MobCategory,
        /// Route the mob travels.
        route: RouteId,
    },
    /// A mob took damage.
    MobDamaged {
        /// Mob that was hit.
        mob: MobId,
        /// Hit points removed.
        amount: u32,
        /// Hit points left.
        remaining: u32,
    },
    /// A mob's slow changed.
    MobSlowed {
        /// Mob affected.
        mob: MobId,
        /// Slow after stacking.
        slow: ActiveSlow,
    },
    /// A mob died and paid its bounty.
    MobKilled {
        /// Mob that died.
        mob: MobId,
        /// Money awarded.
        bounty: u32,
    },
    /// A mob reached the base and cost a life.
    MobLeaked {
        /// Mob that reached the base.
        mob: MobId,
        /// Lives left afterwards.
        lives: u32,
    },
    /// A tower launched a projectile.
    ProjectileFired {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Mob targeted.
        target: MobId,
    },
    /// A projectile left the simulation.
    ProjectileRemoved {
        /// Projectile that was removed.
        projectile: ProjectileId,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Kind of tower placed.
        kind: TowerKind,
        /// Tile holding the tower.
        tile: TileCoord,
        /// Money spent.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Tile requested.
        tile: TileCoord,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// Confirms that a tower moved to its next tier.
    TowerUpgraded {
        /// Tower upgraded.
        tower: TowerId,
        /// Tier after the upgrade.
        tier: Tier,
        /// Money spent.
        cost: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower requested.
        tower: TowerId,
        /// Reason for the rejection.
        reason: UpgradeError,
    },
    /// Confirms a targeting strategy change.
    TargetingChanged {
        /// Tower reconfigured.
        tower: TowerId,
        /// Strategy now active.
        strategy: TargetingStrategy,
    },
    /// Reports that a targeting change was rejected.
    TargetingRejected {
        /// Tower requested.
        tower: TowerId,
        /// Reason for the rejection.
        reason: TargetingError,
    },
    /// The game status changed.
    StatusChanged {
        /// Status now active.
        status: GameStatus,
    },
    /// The speed multiplier changed.
    SpeedChanged {
        /// Speed now active.
        speed: GameSpeed,
    },
}

/// Immutable representation of a single mob's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct MobSnapshot {
    /// Unique identifier assigned to the mob.
    pub id: MobId,
    /// Wave the mob belongs to.
    pub wave: WaveId,
    /// Category of the mob.
    pub category: MobCategory,
    /// Route the mob travels.
    pub route: RouteId,
    /// Continuous position in grid units.
    pub position: Vec2,
    /// Current hit points.
    pub hp: u32,
    /// Hit points at spawn.
    pub max_hp: u32,
    /// Route points travelled per second before slows.
    pub base_speed: f32,
    /// Flat damage reduction.
    pub armor: u32,
    /// Money paid when killed.
    pub bounty: u32,
    /// Continuous index into the route's points.
    pub progress: f32,
    /// Slow currently applied, if any.
    pub slow: Option<ActiveSlow>,
}

impl MobSnapshot {
    /// Reports whether the mob still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Read-only snapshot describing every mob, ordered by spawn sequence.
#[derive(Clone, Debug, Default)]
pub struct MobView {
    snapshots: Vec<MobSnapshot>,
}

impl MobView {
    /// Creates a new mob view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MobSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mob snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &MobSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a mob by identifier.
    #[must_use]
    pub fn get(&self, id: MobId) -> Option<&MobSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of mobs captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no mobs were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MobSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Current tier.
    pub tier: Tier,
    /// Tile holding the tower.
    pub tile: TileCoord,
    /// Combat statistics of the current tier.
    pub stats: TowerStats,
    /// Simulation time of the last shot.
    pub last_fired_at: Duration,
    /// Strategy used to pick targets.
    pub strategy: TargetingStrategy,
}

impl TowerSnapshot {
    /// Position of the tower in grid units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.tile.position()
    }

    /// Reports whether the cooldown has elapsed at `sim_time`.
    #[must_use]
    pub fn ready_at(&self, sim_time: Duration) -> bool {
        sim_time.saturating_sub(self.last_fired_at) >= self.stats.cooldown()
    }
}

/// Read-only snapshot describing all towers placed on the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Mob the projectile homes in on.
    pub target: MobId,
    /// Position in grid units.
    pub position: Vec2,
    /// Tiles travelled per second.
    pub speed: f32,
    /// Damage before armor.
    pub damage: u32,
    /// Radius of splash damage around the impact point, in tiles.
    pub splash_radius: Option<f32>,
    /// Effects applied to the target on impact.
    pub effects: Vec<ProjectileEffect>,
}

/// Read-only snapshot describing every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Snapshot of the wave currently running.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveWave {
    /// Definition of the running wave.
    pub definition: Wave,
    /// Time elapsed since the wave started.
    pub elapsed: Duration,
    /// Mobs spawned so far for each entry, indexed like `definition.entries`.
    pub spawned: Vec<u32>,
    /// Mobs tagged with this wave that are still on the grid.
    pub alive: usize,
}

/// Target selected for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that will fire.
    pub tower: TowerId,
    /// Mob chosen by the tower's strategy.
    pub mob: MobId,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        effective_damage, splash_damage, ActiveSlow, Direction, GameSpeed, PlacementError,
        Route, RouteId, SlowEffect, TargetingStrategy, TileCoord, TowerId, Vec2,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientFunds {
            required: 40,
            available: 12,
        });
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direct_damage_subtracts_armor_with_floor_of_one() {
        assert_eq!(effective_damage(50, 10), 40);
        assert_eq!(effective_damage(25, 30), 1);
        assert_eq!(effective_damage(100, 5), 95);
        assert_eq!(effective_damage(0, 0), 1);
    }

    #[test]
    fn splash_damage_halves_before_armor() {
        assert_eq!(splash_damage(40, 0), 20);
        assert_eq!(splash_damage(41, 2), 18);
        assert_eq!(splash_damage(3, 5), 1);
    }

    #[test]
    fn weaker_slow_keeps_multiplier_but_extends_duration() {
        let current = ActiveSlow {
            multiplier: 0.5,
            remaining: Duration::from_secs(2),
        };
        let stacked = ActiveSlow::stack(
            Some(current),
            SlowEffect::new(0.7, Duration::from_secs(4)),
        );
        assert_eq!(stacked.multiplier, 0.5);
        assert_eq!(stacked.remaining, Duration::from_secs(4));
    }

    #[test]
    fn stronger_slow_replaces_multiplier() {
        let current = ActiveSlow {
            multiplier: 0.7,
            remaining: Duration::from_secs(1),
        };
        let stacked = ActiveSlow::stack(
            Some(current),
            SlowEffect::new(0.4, Duration::from_secs(3)),
        );
        assert_eq!(stacked.multiplier, 0.4);
        assert_eq!(stacked.remaining, Duration::from_secs(3));
    }

    #[test]
    fn slow_expires_after_duration() {
        let slow = ActiveSlow {
            multiplier: 0.6,
            remaining: Duration::from_millis(100),
        };
        let left = slow.decay(Duration::from_millis(40)).expect("still active");
        assert_eq!(left.remaining, Duration::from_millis(60));
        assert!(left.decay(Duration::from_millis(60)).is_none());
    }

    #[test]
    fn route_interpolates_between_points() {
        let route = Route::new(
            RouteId::new(0),
            "L",
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(1, 1),
            ],
        )
        .expect("route");

        assert_eq!(route.position_at(0.5), Vec2::new(0.5, 0.0));
        assert_eq!(route.position_at(1.25), Vec2::new(1.0, 0.25));
        assert_eq!(route.position_at(7.0), Vec2::new(1.0, 1.0));
        assert_eq!(route.position_at(-1.0), Vec2::new(0.0, 0.0));
        assert!(route.is_complete(2.0));
        assert!(!route.is_complete(1.99));
    }

    #[test]
    fn empty_route_is_rejected() {
        assert!(Route::new(RouteId::new(0), "empty", Vec::new()).is_none());
    }

    #[test]
    fn direction_between_adjacent_tiles() {
        let origin = TileCoord::new(2, 2);
        assert_eq!(
            Direction::between(origin, TileCoord::new(3, 2)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::between(origin, TileCoord::new(2, 1)),
            Some(Direction::North)
        );
        assert_eq!(Direction::between(origin, TileCoord::new(4, 2)), None);
    }

    #[test]
    fn strategies_parse_from_labels() {
        for strategy in TargetingStrategy::ALL {
            assert_eq!(strategy.label().parse::<TargetingStrategy>(), Ok(strategy));
        }
        assert!("random".parse::<TargetingStrategy>().is_err());
        assert_eq!(TargetingStrategy::default(), TargetingStrategy::First);
    }

    #[test]
    fn speed_toggles_between_factors() {
        assert_eq!(GameSpeed::Normal.factor(), 1);
        assert_eq!(GameSpeed::Normal.toggled(), GameSpeed::Double);
        assert_eq!(GameSpeed::Double.toggled().factor(), 1);
    }
}
