#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives headless tower defence games.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tower_defence_core::{GameConfig, GameStatus, MapSpec};
use tower_defence_engine::{FrameClock, Simulation};
use tower_defence_world::{query, Grid};
use tracing_subscriber::EnvFilter;

mod placement;

use placement::TowerPlacement;

const FRAME: Duration = Duration::from_nanos(16_666_667);

#[derive(Parser, Debug)]
#[command(name = "tower-defence")]
#[command(about = "Headless tower defence simulation")]
struct Cli {
    /// TOML file with game configuration overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON map to play on instead of the default grid
    #[arg(long, global = true)]
    map: Option<PathBuf>,

    /// Generate waves forever instead of stopping after the tenth
    #[arg(long, global = true)]
    endless: bool,

    /// Seed for spawn route selection
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Play the stress tables: rapid-fire towers against dense waves
    #[arg(long, global = true)]
    stress: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Play a scripted game and print a summary
    Run {
        /// Tower to place before the first wave, as KIND@X,Y[:STRATEGY]
        #[arg(long = "tower")]
        towers: Vec<TowerPlacement>,

        /// Simulated seconds to play before giving up
        #[arg(long, default_value = "600")]
        max_seconds: f32,

        /// Start every wave as soon as the previous one ends
        #[arg(long)]
        auto_start: bool,
    },
    /// Print the grid as a JSON map
    ExportMap,
    /// Check a JSON map against the import contract
    ValidateMap {
        /// Map file to validate
        file: PathBuf,
    },
}

/// Entry point for the tower defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Action::Run {
            ref towers,
            max_seconds,
            auto_start,
        } => run(&cli, towers, max_seconds, auto_start),
        Action::ExportMap => export_map(&cli),
        Action::ValidateMap { ref file } => {
            let map = load_map(file)?;
            map.validate()
                .with_context(|| format!("{} is not a valid map", file.display()))?;
            println!(
                "{}: {}x{} map with {} path tiles",
                file.display(),
                map.width,
                map.height,
                map.tiles.path.len()
            );
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.route_seed = seed;
    }
    if cli.stress {
        config.stress_test = true;
    }
    config.validate().context("invalid game configuration")?;
    Ok(config)
}

fn load_map(path: &Path) -> Result<MapSpec> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read map {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse map {}", path.display()))
}

fn build_game(cli: &Cli) -> Result<Simulation> {
    let config = load_config(cli)?;
    Ok(match &cli.map {
        Some(path) => {
            let map = load_map(path)?;
            if let Err(problem) = map.validate() {
                tracing::warn!(%problem, "map failed validation, importing anyway");
            }
            Simulation::create_game_from_map(config, &map, cli.endless)
        }
        None => Simulation::create_default_game(config, cli.endless),
    })
}

fn run(cli: &Cli, towers: &[TowerPlacement], max_seconds: f32, auto_start: bool) -> Result<()> {
    let budget = match Duration::try_from_secs_f32(max_seconds) {
        Ok(budget) if !budget.is_zero() => budget,
        _ => bail!("--max-seconds must be positive, got {max_seconds}"),
    };

    let mut game = build_game(cli)?;

    for placement in towers {
        let blueprint = query::blueprint(game.world(), placement.kind);
        let tower = game
            .place_tower(blueprint, placement.tile)
            .with_context(|| {
                format!(
                    "cannot place {} at ({}, {})",
                    placement.kind.label(),
                    placement.tile.x(),
                    placement.tile.y()
                )
            })?;
        if let Some(strategy) = placement.strategy {
            game.set_tower_targeting(tower, strategy)
                .context("cannot change targeting")?;
        }
    }

    let _ = game.start_next_wave().context("cannot start the first wave")?;

    let mut clock = FrameClock::from_config(query::config(game.world()));
    let mut elapsed = Duration::ZERO;
    while elapsed < budget && !query::status(game.world()).is_terminal() {
        let _ = game.run_frame(&mut clock, FRAME);
        elapsed += FRAME;

        if auto_start && query::wave_countdown(game.world()).is_some() {
            if let Err(reason) = game.start_next_wave() {
                tracing::debug!(%reason, "auto start skipped");
            }
        }
    }

    print_summary(&game);
    Ok(())
}

fn print_summary(game: &Simulation) {
    let world = game.world();
    let status = match query::status(world) {
        GameStatus::Playing => "playing",
        GameStatus::Paused => "paused",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    };
    let waves = query::total_waves(world).map_or_else(|| "endless".to_owned(), |n| n.to_string());

    println!("status: {status}");
    println!("wave: {} of {waves}", query::current_wave(world).get());
    println!("simulated: {:.1}s", query::sim_time(world).as_secs_f32());
    println!("money: {}", query::money(world));
    println!("lives: {}", query::lives(world));
    for tower in query::tower_view(world).iter() {
        println!(
            "tower {}: {} tier {} at ({}, {}) targeting {}",
            tower.id.get(),
            tower.kind.label(),
            tower.tier.level(),
            tower.tile.x(),
            tower.tile.y(),
            tower.strategy.label()
        );
    }
}

fn export_map(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let grid = match &cli.map {
        Some(path) => Grid::import(&load_map(path)?),
        None => Grid::generate(config.grid_width, config.grid_height),
    };
    let json = serde_json::to_string_pretty(&grid.to_map_spec())
        .context("failed to serialise map")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{Ruleset, TowerKind};

    #[test]
    fn stress_flag_switches_the_ruleset() {
        let cli = Cli::try_parse_from(["tower-defence", "run", "--stress"]).expect("valid args");
        let config = load_config(&cli).expect("default config");
        assert_eq!(config.ruleset(), Ruleset::Stress);

        let game = build_game(&cli).expect("game");
        assert_eq!(query::total_waves(game.world()), Some(5));
        assert_eq!(
            query::blueprint(game.world(), TowerKind::Frost).name,
            "Rapid Frost Tower"
        );
    }

    #[test]
    fn games_default_to_the_standard_ruleset() {
        let cli = Cli::try_parse_from(["tower-defence", "--seed", "7", "export-map"])
            .expect("valid args");
        let config = load_config(&cli).expect("default config");
        assert_eq!(config.ruleset(), Ruleset::Standard);
        assert_eq!(config.route_seed, 7);
    }
}
