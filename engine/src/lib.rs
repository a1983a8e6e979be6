#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation context that wires the world and its systems into one tick.
//!
//! A [`Simulation`] owns the authoritative [`World`] and every pure system.
//! Each call to [`Simulation::advance_tick`] runs the phases in a fixed order:
//! clock and countdown, wave scheduling, movement, projectile resolution,
//! targeting and firing, then casualty reconciliation. Player actions are
//! exposed as typed methods that report rejections as `Err` values.

use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use tower_defence_core::{
    Command, Event, GameConfig, MapSpec, PlacementError, TargetingError, TargetingStrategy,
    Tier, TileCoord, TowerBlueprint, TowerId, TowerTarget, UpgradeError, WaveId,
    WaveStartError,
};
use tower_defence_system_movement::Movement;
use tower_defence_system_tower_combat::TowerCombat;
use tower_defence_system_tower_targeting::TowerTargeting;
use tower_defence_system_wave_scheduler::{RouteSelector, UniformRoutes, WaveScheduler};
use tower_defence_world::{self as world, query, World};

mod clock;

pub use clock::FrameClock;

/// Where the grid of a game comes from; kept so a restart rebuilds the same map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridSource {
    /// The generated three-route layout.
    Default,
    /// A grid imported from a map description.
    Map(MapSpec),
}

/// Running game: world state plus the systems that advance it.
#[derive(Debug)]
pub struct Simulation<S = UniformRoutes<ChaCha8Rng>> {
    world: World,
    source: GridSource,
    initial_selector: S,
    scheduler: WaveScheduler<S>,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Starts a game on the default grid with routes chosen from the configured seed.
    #[must_use]
    pub fn create_default_game(config: GameConfig, endless: bool) -> Self {
        let selector = UniformRoutes::seeded(config.route_seed);
        Self::new(config, GridSource::Default, endless, selector)
    }

    /// Starts a game on a grid imported from `map`.
    #[must_use]
    pub fn create_game_from_map(config: GameConfig, map: &MapSpec, endless: bool) -> Self {
        let selector = UniformRoutes::seeded(config.route_seed);
        Self::new(config, GridSource::Map(map.clone()), endless, selector)
    }
}

impl<S: RouteSelector + Clone> Simulation<S> {
    /// Starts a game that assigns spawn routes with `selector`.
    #[must_use]
    pub fn new(config: GameConfig, source: GridSource, endless: bool, selector: S) -> Self {
        let world = build_world(config, &source, endless);
        Self {
            world,
            source,
            scheduler: WaveScheduler::new(selector.clone()),
            initial_selector: selector,
            movement: Movement,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Read-only access to the world for rendering and inspection.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events produced by the most recent tick or action.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Discards the current game and rebuilds it from the same configuration,
    /// grid source and route selector.
    pub fn restart(&mut self) {
        let config = query::config(&self.world).clone();
        let endless = query::is_endless(&self.world);
        self.world = build_world(config, &self.source, endless);
        self.scheduler = WaveScheduler::new(self.initial_selector.clone());
        self.targets.clear();
        self.commands.clear();
        self.events.clear();
        tracing::info!(endless, "game restarted");
    }

    /// Advances the game by one fixed step of `dt` and returns the events it produced.
    ///
    /// Nothing happens while the game is paused or finished.
    pub fn advance_tick(&mut self, dt: Duration) -> &[Event] {
        self.tick(dt);
        &self.events
    }

    /// Runs as many fixed ticks as `clock` releases for a frame of `frame_delta`.
    ///
    /// Returns the number of ticks executed.
    pub fn run_frame(&mut self, clock: &mut FrameClock, frame_delta: Duration) -> u32 {
        let ticks = clock.advance(frame_delta);
        for _ in 0..ticks {
            self.tick(clock.step());
        }
        ticks
    }

    fn tick(&mut self, dt: Duration) {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let Some(scaled) = self.events.iter().find_map(|event| match event {
            Event::TimeAdvanced { dt, .. } => Some(*dt),
            _ => None,
        }) else {
            return;
        };
        let clock_events = self.events.clone();
        tracing::trace!(
            sim_time = ?query::sim_time(&self.world),
            dt = ?scaled,
            "tick"
        );

        let active = query::active_wave(&self.world);
        let routes = query::route_ids(&self.world);
        self.scheduler
            .handle(active.as_ref(), &routes, &mut self.commands);
        self.flush();

        self.movement.handle(
            &clock_events,
            &query::mob_view(&self.world),
            query::routes(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.combat.resolve_projectiles(
            scaled,
            &query::projectile_view(&self.world),
            &query::mob_view(&self.world),
            &mut self.commands,
        );
        self.flush();

        let towers = query::tower_view(&self.world);
        self.targeting
            .handle(&towers, &query::mob_view(&self.world), &mut self.targets);
        self.combat.fire(
            query::sim_time(&self.world),
            &towers,
            &self.targets,
            &mut self.commands,
        );
        self.flush();

        world::apply(&mut self.world, Command::ResolveCasualties, &mut self.events);
    }

    /// Starts the next wave, collecting the early-start bonus when a countdown runs.
    pub fn start_next_wave(&mut self) -> Result<WaveId, WaveStartError> {
        self.act(Command::StartNextWave);
        answer(
            &self.events,
            |event| match event {
                Event::WaveStarted { wave, .. } => Some(Ok(*wave)),
                Event::WaveStartRejected { reason } => Some(Err(*reason)),
                _ => None,
            },
            WaveStartError::WaveInProgress,
        )
    }

    /// Places a tower built from `blueprint` on `tile`.
    pub fn place_tower(
        &mut self,
        blueprint: TowerBlueprint,
        tile: TileCoord,
    ) -> Result<TowerId, PlacementError> {
        self.act(Command::PlaceTower { blueprint, tile });
        answer(
            &self.events,
            |event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
            PlacementError::OutOfBounds,
        )
    }

    /// Upgrades a tower to its next tier.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<Tier, UpgradeError> {
        self.act(Command::UpgradeTower { tower });
        answer(
            &self.events,
            |event| match event {
                Event::TowerUpgraded { tier, .. } => Some(Ok(*tier)),
                Event::TowerUpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
            UpgradeError::MissingTower,
        )
    }

    /// Changes how a tower picks its targets.
    pub fn set_tower_targeting(
        &mut self,
        tower: TowerId,
        strategy: TargetingStrategy,
    ) -> Result<(), TargetingError> {
        self.act(Command::SetTargeting { tower, strategy });
        answer(
            &self.events,
            |event| match event {
                Event::TargetingChanged { .. } => Some(Ok(())),
                Event::TargetingRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
            TargetingError::MissingTower,
        )
    }

    /// Freezes the game; ticks do nothing until [`Simulation::resume`].
    pub fn pause(&mut self) {
        self.act(Command::Pause);
    }

    /// Continues a paused game.
    pub fn resume(&mut self) {
        self.act(Command::Resume);
    }

    /// Switches between normal and double speed.
    pub fn toggle_speed(&mut self) {
        self.act(Command::ToggleSpeed);
    }

    fn act(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}

fn build_world(config: GameConfig, source: &GridSource, endless: bool) -> World {
    match source {
        GridSource::Default => World::with_default_grid(config, endless),
        GridSource::Map(map) => World::from_map(config, map, endless),
    }
}

/// Reads the outcome of an action from its events. The world answers every
/// action with exactly one success or rejection event; `unanswered` is only
/// returned if that ever fails to hold.
fn answer<T, E, F>(events: &[Event], pick: F, unanswered: E) -> Result<T, E>
where
    F: Fn(&Event) -> Option<Result<T, E>>,
{
    events.iter().find_map(pick).unwrap_or(Err(unanswered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{GameStatus, TowerKind};
    use tower_defence_system_wave_scheduler::FixedRoute;

    fn game() -> Simulation<FixedRoute> {
        Simulation::new(GameConfig::default(), GridSource::Default, false, FixedRoute(0))
    }

    #[test]
    fn actions_report_rejections_as_errors() {
        let mut game = game();
        assert_eq!(
            game.place_tower(TowerBlueprint::base(TowerKind::Arrow), TileCoord::new(0, 3)),
            Err(PlacementError::NotBuildable)
        );
        assert_eq!(
            game.upgrade_tower(TowerId::new(9)),
            Err(UpgradeError::MissingTower)
        );
        assert_eq!(
            game.set_tower_targeting(TowerId::new(9), TargetingStrategy::Last),
            Err(TargetingError::MissingTower)
        );
        assert_eq!(game.start_next_wave(), Ok(WaveId::new(1)));
        assert_eq!(game.start_next_wave(), Err(WaveStartError::WaveInProgress));
    }

    #[test]
    fn paused_games_do_not_advance() {
        let mut game = game();
        game.pause();
        assert!(game.advance_tick(Duration::from_millis(33)).is_empty());
        assert_eq!(query::sim_time(game.world()), Duration::ZERO);
        game.resume();
        assert_eq!(query::status(game.world()), GameStatus::Playing);
        assert!(!game.advance_tick(Duration::from_millis(33)).is_empty());
    }

    #[test]
    fn restart_rebuilds_a_fresh_world() {
        let mut game = game();
        let _ = game.place_tower(TowerBlueprint::base(TowerKind::Arrow), TileCoord::new(1, 2));
        let _ = game.start_next_wave();
        let _ = game.advance_tick(Duration::from_secs(1));
        game.restart();

        assert_eq!(query::money(game.world()), 100);
        assert_eq!(query::current_wave(game.world()), WaveId::new(0));
        assert!(query::mob_view(game.world()).is_empty());
        assert!(query::tower_view(game.world()).iter().next().is_none());
        assert!(game.events().is_empty());
    }

    #[test]
    fn run_frame_executes_the_released_ticks() {
        let mut game = game();
        let mut clock = FrameClock::from_config(query::config(game.world()));
        assert_eq!(game.run_frame(&mut clock, Duration::from_millis(100)), 3);
        assert_eq!(query::sim_time(game.world()), clock.step() * 3);
        assert_eq!(
            game.events().first(),
            Some(&Event::TimeAdvanced {
                dt: clock.step(),
                sim_time: clock.step() * 3,
            })
        );
    }
}
