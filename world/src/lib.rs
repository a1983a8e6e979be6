#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tower defence engine.
//!
//! The [`World`] is the game state: grid, mobs, towers, projectiles, economy,
//! wave progress and lifecycle status. It is mutated exclusively through
//! [`apply`], and read through the functions in [`query`].

use std::{collections::BTreeMap, time::Duration};

use tower_defence_core::{
    endless_mob_stats, wave_definition, ActiveSlow, Command, Event, GameConfig, GameSpeed,
    GameStatus, MapSpec, MobCategory, MobId, PlacementError, ProjectileEffect, ProjectileId,
    RouteId, TargetingError, TileCoord, TowerBlueprint, TowerId, UpgradeError, Vec2, WaveId,
    WaveStartError,
};

mod grid;
mod navigation;
mod towers;

pub use grid::{grid_to_world, world_to_grid, Grid, Tile, TileKind};

use towers::TowerRegistry;

#[derive(Clone, Debug)]
struct Mob {
    id: MobId,
    wave: WaveId,
    category: MobCategory,
    route: RouteId,
    position: Vec2,
    hp: u32,
    max_hp: u32,
    base_speed: f32,
    armor: u32,
    bounty: u32,
    progress: f32,
    slow: Option<ActiveSlow>,
}

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    tower: TowerId,
    target: MobId,
    position: Vec2,
    speed: f32,
    damage: u32,
    splash_radius: Option<f32>,
    effects: Vec<ProjectileEffect>,
}

/// Spawn bookkeeping key. Entries are tracked individually so that two
/// entries of the same category in one wave never share a counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SpawnKey {
    wave: WaveId,
    entry: usize,
}

/// Represents the authoritative tower defence world state.
#[derive(Clone, Debug)]
pub struct World {
    config: GameConfig,
    grid: Grid,
    endless: bool,
    sim_time: Duration,
    money: u32,
    lives: u32,
    current_wave: WaveId,
    wave_in_progress: bool,
    wave_started_at: Option<Duration>,
    wave_countdown: Option<Duration>,
    status: GameStatus,
    speed: GameSpeed,
    spawned: BTreeMap<SpawnKey, u32>,
    mobs: BTreeMap<MobId, Mob>,
    towers: TowerRegistry,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_mob_id: MobId,
    next_projectile_id: ProjectileId,
}

impl World {
    /// Creates a world on the provided grid using the configured economy.
    #[must_use]
    pub fn new(config: GameConfig, grid: Grid, endless: bool) -> Self {
        Self {
            money: config.starting_money,
            lives: config.starting_lives,
            config,
            grid,
            endless,
            sim_time: Duration::ZERO,
            current_wave: WaveId::new(0),
            wave_in_progress: false,
            wave_started_at: None,
            wave_countdown: None,
            status: GameStatus::Playing,
            speed: GameSpeed::Normal,
            spawned: BTreeMap::new(),
            mobs: BTreeMap::new(),
            towers: TowerRegistry::new(),
            projectiles: BTreeMap::new(),
            next_mob_id: MobId::new(0),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    /// Creates a world on the default grid sized by the configuration.
    #[must_use]
    pub fn with_default_grid(config: GameConfig, endless: bool) -> Self {
        let grid = Grid::generate(config.grid_width, config.grid_height);
        Self::new(config, grid, endless)
    }

    /// Creates a world on a grid imported from a map description.
    #[must_use]
    pub fn from_map(config: GameConfig, map: &MapSpec, endless: bool) -> Self {
        Self::new(config, Grid::import(map), endless)
    }

    fn has_next_wave(&self) -> bool {
        self.endless || self.current_wave.get() < self.config.ruleset().wave_count()
    }

    fn begin_next_wave(&mut self, bonus: u32, out_events: &mut Vec<Event>) {
        self.current_wave = self.current_wave.next();
        self.wave_in_progress = true;
        self.wave_started_at = Some(self.sim_time);
        self.money = self.money.saturating_add(bonus);
        let mobs = wave_definition(self.current_wave, self.endless, self.config.ruleset())
            .map_or(0, |wave| wave.total_mobs());
        tracing::info!(wave = self.current_wave.get(), mobs, bonus, "wave started");
        out_events.push(Event::WaveStarted {
            wave: self.current_wave,
            bonus,
        });
    }

    fn run_countdown(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.wave_in_progress {
            return;
        }
        let Some(remaining) = self.wave_countdown else {
            return;
        };

        let remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.wave_countdown = None;
            if self.has_next_wave() {
                self.begin_next_wave(0, out_events);
            }
        } else {
            self.wave_countdown = Some(remaining);
        }
    }

    fn start_next_wave(&mut self, out_events: &mut Vec<Event>) {
        let rejection = if self.wave_in_progress {
            Some(WaveStartError::WaveInProgress)
        } else if !self.has_next_wave() {
            Some(WaveStartError::NoWavesRemaining)
        } else {
            None
        };
        if let Some(reason) = rejection {
            tracing::debug!(%reason, "wave start rejected");
            out_events.push(Event::WaveStartRejected { reason });
            return;
        }

        let bonus = self
            .wave_countdown
            .take()
            .filter(|remaining| !remaining.is_zero())
            .map_or(0, |remaining| self.config.early_start_bonus(remaining));
        self.begin_next_wave(bonus, out_events);
    }

    fn complete_wave(&mut self, wave: WaveId, out_events: &mut Vec<Event>) {
        if !self.wave_in_progress || wave != self.current_wave {
            return;
        }

        self.wave_in_progress = false;
        self.wave_started_at = None;
        self.spawned.retain(|key, _| key.wave != wave);
        tracing::info!(wave = wave.get(), "wave completed");
        out_events.push(Event::WaveCompleted { wave });

        if self.has_next_wave() {
            let duration = self.config.wave_countdown();
            self.wave_countdown = Some(duration);
            out_events.push(Event::CountdownStarted {
                wave: wave.next(),
                duration,
            });
        }
    }

    fn spawn_mob(
        &mut self,
        wave: WaveId,
        entry: usize,
        category: MobCategory,
        route: RouteId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(spawn) = self.grid.route(route).map(|route| route.spawn_point()) else {
            tracing::warn!(route = route.get(), "spawn requested on unknown route");
            return;
        };

        let stats = if self.endless {
            endless_mob_stats(category, wave)
        } else {
            self.config.ruleset().mob_stats(category)
        };
        let id = self.next_mob_id;
        self.next_mob_id = MobId::new(id.get().saturating_add(1));

        let _ = self.mobs.insert(
            id,
            Mob {
                id,
                wave,
                category,
                route,
                position: spawn.position(),
                hp: stats.max_hp,
                max_hp: stats.max_hp,
                base_speed: stats.speed,
                armor: stats.armor,
                bounty: stats.bounty,
                progress: 0.0,
                slow: None,
            },
        );
        *self.spawned.entry(SpawnKey { wave, entry }).or_insert(0) += 1;
        out_events.push(Event::MobSpawned {
            mob: id,
            wave,
            category,
            route,
        });
    }

    fn fire_projectile(&mut self, tower: TowerId, target: MobId, out_events: &mut Vec<Event>) {
        if !self.mobs.contains_key(&target) {
            return;
        }
        let sim_time = self.sim_time;
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        state.last_fired_at = sim_time;

        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let _ = self.projectiles.insert(
            id,
            Projectile {
                id,
                tower,
                target,
                position: state.tile.position(),
                speed: state.stats.projectile_speed,
                damage: state.stats.damage,
                splash_radius: state.stats.splash_radius,
                effects: state.stats.effects.clone(),
            },
        );
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower,
            target,
        });
    }

    fn place_tower(
        &mut self,
        blueprint: TowerBlueprint,
        tile: TileCoord,
        out_events: &mut Vec<Event>,
    ) {
        let cost = blueprint.stats.cost;
        let rejection = if self.grid.tile(tile).is_none() {
            Some(PlacementError::OutOfBounds)
        } else if !self.grid.can_build_at(tile) {
            Some(PlacementError::NotBuildable)
        } else if self.towers.occupies(tile) {
            Some(PlacementError::Occupied)
        } else if self.money < cost {
            Some(PlacementError::InsufficientFunds {
                required: cost,
                available: self.money,
            })
        } else {
            None
        };

        if let Some(reason) = rejection {
            tracing::debug!(kind = blueprint.kind.label(), x = tile.x(), y = tile.y(), %reason, "placement rejected");
            out_events.push(Event::TowerPlacementRejected {
                kind: blueprint.kind,
                tile,
                reason,
            });
            return;
        }

        self.money -= cost;
        let kind = blueprint.kind;
        let tower = self
            .towers
            .insert(kind, blueprint.tier, tile, blueprint.stats);
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            tile,
            cost,
        });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let money = self.money;
        let outcome = match self.towers.get_mut(tower) {
            None => Err(UpgradeError::MissingTower),
            Some(state) => match state.tier.next() {
                None => Err(UpgradeError::MaxTier),
                Some(tier) => {
                    let next = TowerBlueprint::lookup(state.kind, tier);
                    if money < next.stats.cost {
                        Err(UpgradeError::InsufficientFunds {
                            required: next.stats.cost,
                            available: money,
                        })
                    } else {
                        state.tier = tier;
                        let cost = next.stats.cost;
                        state.stats = next.stats;
                        Ok((tier, cost))
                    }
                }
            },
        };

        match outcome {
            Ok((tier, cost)) => {
                self.money -= cost;
                out_events.push(Event::TowerUpgraded { tower, tier, cost });
            }
            Err(reason) => {
                tracing::debug!(tower = tower.get(), %reason, "upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        }
    }

    fn set_status(&mut self, status: GameStatus, out_events: &mut Vec<Event>) {
        if self.status == status {
            return;
        }
        self.status = status;
        if status.is_terminal() {
            tracing::info!(?status, wave = self.current_wave.get(), "game over");
        }
        out_events.push(Event::StatusChanged { status });
    }

    fn resolve_casualties(&mut self, out_events: &mut Vec<Event>) {
        if self.status.is_terminal() {
            return;
        }

        let mut killed = Vec::new();
        let mut leaked = Vec::new();
        for mob in self.mobs.values() {
            if mob.hp == 0 {
                killed.push(mob.id);
            } else if let Some(route) = self.grid.route(mob.route) {
                if route.is_complete(mob.progress) {
                    leaked.push(mob.id);
                }
            }
        }

        for id in killed {
            if let Some(mob) = self.mobs.remove(&id) {
                self.money = self.money.saturating_add(mob.bounty);
                out_events.push(Event::MobKilled {
                    mob: id,
                    bounty: mob.bounty,
                });
            }
        }
        for id in leaked {
            if self.mobs.remove(&id).is_some() {
                self.lives = self.lives.saturating_sub(1);
                out_events.push(Event::MobLeaked {
                    mob: id,
                    lives: self.lives,
                });
            }
        }

        if self.lives == 0 {
            self.set_status(GameStatus::Lost, out_events);
        } else if !self.endless
            && !self.wave_in_progress
            && self.current_wave.get() >= self.config.ruleset().wave_count()
            && self.mobs.is_empty()
        {
            self.set_status(GameStatus::Won, out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.status != GameStatus::Playing {
                return;
            }
            let dt = dt.saturating_mul(world.speed.factor());
            world.sim_time = world.sim_time.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                sim_time: world.sim_time,
            });
            world.run_countdown(dt, out_events);
        }
        Command::StartNextWave => world.start_next_wave(out_events),
        Command::SpawnMob {
            wave,
            entry,
            category,
            route,
        } => world.spawn_mob(wave, entry, category, route, out_events),
        Command::CompleteWave { wave } => world.complete_wave(wave, out_events),
        Command::AdvanceMob {
            mob,
            progress,
            position,
            slow,
        } => {
            if let Some(state) = world.mobs.get_mut(&mob) {
                state.progress = state.progress.max(progress);
                state.position = position;
                state.slow = slow;
            }
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(state) = world.projectiles.get_mut(&projectile) {
                state.position = position;
            }
        }
        Command::RemoveProjectile { projectile } => {
            if world.projectiles.remove(&projectile).is_some() {
                out_events.push(Event::ProjectileRemoved { projectile });
            }
        }
        Command::DamageMob { mob, amount } => {
            if let Some(state) = world.mobs.get_mut(&mob) {
                state.hp = state.hp.saturating_sub(amount);
                out_events.push(Event::MobDamaged {
                    mob,
                    amount,
                    remaining: state.hp,
                });
            }
        }
        Command::ApplySlow { mob, effect } => {
            if let Some(state) = world.mobs.get_mut(&mob) {
                let slow = ActiveSlow::stack(state.slow, effect);
                state.slow = Some(slow);
                out_events.push(Event::MobSlowed { mob, slow });
            }
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::ResolveCasualties => world.resolve_casualties(out_events),
        Command::PlaceTower { blueprint, tile } => world.place_tower(blueprint, tile, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SetTargeting { tower, strategy } => match world.towers.get_mut(tower) {
            Some(state) => {
                state.strategy = strategy;
                out_events.push(Event::TargetingChanged { tower, strategy });
            }
            None => out_events.push(Event::TargetingRejected {
                tower,
                reason: TargetingError::MissingTower,
            }),
        },
        Command::Pause => {
            if world.status == GameStatus::Playing {
                world.set_status(GameStatus::Paused, out_events);
            }
        }
        Command::Resume => {
            if world.status == GameStatus::Paused {
                world.set_status(GameStatus::Playing, out_events);
            }
        }
        Command::ToggleSpeed => {
            world.speed = world.speed.toggled();
            out_events.push(Event::SpeedChanged { speed: world.speed });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Grid, World};
    use tower_defence_core::{
        wave_definition, ActiveWave, GameConfig, GameSpeed, GameStatus, MobCategory, MobSnapshot,
        MobView, ProjectileSnapshot, ProjectileView, Route, RouteId, TowerBlueprint, TowerId,
        TowerKind, TowerSnapshot, TowerView, WaveId,
    };

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Provides read-only access to the world's grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Routes mobs may follow.
    #[must_use]
    pub fn routes(world: &World) -> &[Route] {
        world.grid.routes()
    }

    /// Identifiers of every route, in order.
    #[must_use]
    pub fn route_ids(world: &World) -> Vec<RouteId> {
        world.grid.routes().iter().map(Route::id).collect()
    }

    /// Total simulated time.
    #[must_use]
    pub fn sim_time(world: &World) -> Duration {
        world.sim_time
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Active speed multiplier.
    #[must_use]
    pub fn speed(world: &World) -> GameSpeed {
        world.speed
    }

    /// Money available.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Most recently started wave; zero before the first wave.
    #[must_use]
    pub fn current_wave(world: &World) -> WaveId {
        world.current_wave
    }

    /// Reports whether a wave is running.
    #[must_use]
    pub fn wave_in_progress(world: &World) -> bool {
        world.wave_in_progress
    }

    /// Time left before the next wave starts on its own.
    #[must_use]
    pub fn wave_countdown(world: &World) -> Option<Duration> {
        world.wave_countdown
    }

    /// Blueprint the game sells for a tower kind.
    #[must_use]
    pub fn blueprint(world: &World, kind: TowerKind) -> TowerBlueprint {
        world.config.ruleset().tower(kind)
    }

    /// Reports whether waves are generated endlessly.
    #[must_use]
    pub fn is_endless(world: &World) -> bool {
        world.endless
    }

    /// Number of waves in the game, `None` in endless mode.
    #[must_use]
    pub fn total_waves(world: &World) -> Option<u32> {
        (!world.endless).then_some(world.config.ruleset().wave_count())
    }

    /// Mobs of a category spawned so far in a wave. Cleared once the wave completes.
    #[must_use]
    pub fn spawned_count(world: &World, wave: WaveId, category: MobCategory) -> u32 {
        let Some(definition) = wave_definition(wave, world.endless, world.config.ruleset()) else {
            return 0;
        };
        world
            .spawned
            .iter()
            .filter(|(key, _)| key.wave == wave)
            .filter(|(key, _)| {
                definition
                    .entries
                    .get(key.entry)
                    .map_or(false, |entry| entry.category == category)
            })
            .map(|(_, count)| *count)
            .sum()
    }

    /// Snapshot of the running wave, if any.
    #[must_use]
    pub fn active_wave(world: &World) -> Option<ActiveWave> {
        if !world.wave_in_progress {
            return None;
        }
        let wave = world.current_wave;
        let definition = wave_definition(wave, world.endless, world.config.ruleset())?;
        let started_at = world.wave_started_at.unwrap_or(world.sim_time);
        let spawned = (0..definition.entries.len())
            .map(|entry| {
                world
                    .spawned
                    .get(&super::SpawnKey { wave, entry })
                    .copied()
                    .unwrap_or(0)
            })
            .collect();
        let alive = world.mobs.values().filter(|mob| mob.wave == wave).count();

        Some(ActiveWave {
            definition,
            elapsed: world.sim_time.saturating_sub(started_at),
            spawned,
            alive,
        })
    }

    /// Captures a read-only view of the mobs on the grid.
    #[must_use]
    pub fn mob_view(world: &World) -> MobView {
        MobView::from_snapshots(
            world
                .mobs
                .values()
                .map(|mob| MobSnapshot {
                    id: mob.id,
                    wave: mob.wave,
                    category: mob.category,
                    route: mob.route,
                    position: mob.position,
                    hp: mob.hp,
                    max_hp: mob.max_hp,
                    base_speed: mob.base_speed,
                    armor: mob.armor,
                    bounty: mob.bounty,
                    progress: mob.progress,
                    slow: mob.slow,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the towers on the grid.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Looks up a single tower.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(tower).map(|state| state.snapshot())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .values()
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    tower: projectile.tower,
                    target: projectile.target,
                    position: projectile.position,
                    speed: projectile.speed,
                    damage: projectile.damage,
                    splash_radius: projectile.splash_radius,
                    effects: projectile.effects.clone(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::with_default_grid(GameConfig::default(), false)
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn tick_scales_with_speed_and_stops_when_paused() {
        let mut world = world();
        let _ = run(&mut world, Command::ToggleSpeed);
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
        );
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(200),
                sim_time: Duration::from_millis(200),
            }]
        );

        let _ = run(&mut world, Command::Pause);
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
        );
        assert!(events.is_empty());
        assert_eq!(query::sim_time(&world), Duration::from_millis(200));
    }

    #[test]
    fn pause_and_resume_only_move_between_playing_and_paused() {
        let mut world = world();
        let events = run(&mut world, Command::Resume);
        assert!(events.is_empty());
        let _ = run(&mut world, Command::Pause);
        assert_eq!(query::status(&world), GameStatus::Paused);
        let _ = run(&mut world, Command::Pause);
        assert_eq!(query::status(&world), GameStatus::Paused);
        let _ = run(&mut world, Command::Resume);
        assert_eq!(query::status(&world), GameStatus::Playing);
    }

    #[test]
    fn spawned_mobs_start_at_route_spawn_point() {
        let mut world = world();
        let _ = run(&mut world, Command::StartNextWave);
        let route = query::routes(&world)[2].clone();
        let events = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Normal,
                route: route.id(),
            },
        );
        assert!(matches!(events.as_slice(), [Event::MobSpawned { .. }]));
        let view = query::mob_view(&world);
        let mob = view.iter().next().expect("mob spawned");
        assert_eq!(mob.position, route.spawn_point().position());
        assert_eq!(mob.hp, 50);
        assert_eq!(
            query::spawned_count(&world, WaveId::new(1), MobCategory::Normal),
            1
        );
    }

    #[test]
    fn unknown_route_spawns_nothing() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Normal,
                route: RouteId::new(99),
            },
        );
        assert!(events.is_empty());
        assert!(query::mob_view(&world).is_empty());
    }

    #[test]
    fn endless_mobs_receive_scaled_stats() {
        let mut world = World::with_default_grid(GameConfig::default(), true);
        let _ = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(12),
                entry: 0,
                category: MobCategory::Normal,
                route: RouteId::new(0),
            },
        );
        let view = query::mob_view(&world);
        let mob = view.iter().next().expect("mob spawned");
        assert_eq!(mob.max_hp, 66);
    }

    #[test]
    fn slows_stack_through_apply() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Normal,
                route: RouteId::new(0),
            },
        );
        let mob = MobId::new(0);
        let _ = run(
            &mut world,
            Command::ApplySlow {
                mob,
                effect: tower_defence_core::SlowEffect::new(0.5, Duration::from_secs(2)),
            },
        );
        let events = run(
            &mut world,
            Command::ApplySlow {
                mob,
                effect: tower_defence_core::SlowEffect::new(0.7, Duration::from_secs(4)),
            },
        );
        assert_eq!(
            events,
            vec![Event::MobSlowed {
                mob,
                slow: ActiveSlow {
                    multiplier: 0.5,
                    remaining: Duration::from_secs(4),
                },
            }]
        );
    }

    #[test]
    fn firing_requires_a_live_target_and_records_the_shot() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::PlaceTower {
                blueprint: TowerBlueprint::base(tower_defence_core::TowerKind::Cannon),
                tile: TileCoord::new(1, 2),
            },
        );
        let tower = TowerId::new(0);
        let events = run(
            &mut world,
            Command::FireProjectile {
                tower,
                target: MobId::new(0),
            },
        );
        assert!(events.is_empty());

        let _ = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Tank,
                route: RouteId::new(0),
            },
        );
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
        );
        let _ = run(
            &mut world,
            Command::FireProjectile {
                tower,
                target: MobId::new(0),
            },
        );

        let projectiles = query::projectile_view(&world).into_vec();
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].position, Vec2::new(1.0, 2.0));
        assert_eq!(projectiles[0].splash_radius, Some(1.5));
        assert_eq!(
            query::tower(&world, tower).map(|tower| tower.last_fired_at),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn damage_saturates_at_zero_and_kills_pay_bounty() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Fast,
                route: RouteId::new(0),
            },
        );
        let events = run(
            &mut world,
            Command::DamageMob {
                mob: MobId::new(0),
                amount: 500,
            },
        );
        assert_eq!(
            events,
            vec![Event::MobDamaged {
                mob: MobId::new(0),
                amount: 500,
                remaining: 0,
            }]
        );

        let events = run(&mut world, Command::ResolveCasualties);
        assert_eq!(
            events,
            vec![Event::MobKilled {
                mob: MobId::new(0),
                bounty: 15,
            }]
        );
        assert_eq!(query::money(&world), 115);
    }

    #[test]
    fn progress_never_moves_backwards() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Normal,
                route: RouteId::new(0),
            },
        );
        for progress in [2.0, 1.0] {
            let _ = run(
                &mut world,
                Command::AdvanceMob {
                    mob: MobId::new(0),
                    progress,
                    position: Vec2::new(progress, 3.0),
                    slow: None,
                },
            );
        }
        let view = query::mob_view(&world);
        assert_eq!(view.iter().next().map(|mob| mob.progress), Some(2.0));
    }

    #[test]
    fn completing_the_wrong_wave_is_ignored() {
        let mut world = world();
        let _ = run(&mut world, Command::StartNextWave);
        let events = run(
            &mut world,
            Command::CompleteWave {
                wave: WaveId::new(3),
            },
        );
        assert!(events.is_empty());
        assert!(query::wave_in_progress(&world));
    }
}
