use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use tower_defence_core::{
    Command, GameConfig, MobCategory, MobId, RouteId, TargetingStrategy, TileCoord,
    TowerBlueprint, TowerId, TowerKind, TowerTarget, Vec2, WaveId,
};
use tower_defence_system_tower_targeting::TowerTargeting;
use tower_defence_world::{self as world, query, World};

fn apply_all(world: &mut World, commands: Vec<Command>) {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

fn scripted_world(strategy: TargetingStrategy) -> World {
    let mut world = World::with_default_grid(GameConfig::default(), false);
    let spawn = |category| Command::SpawnMob {
        wave: WaveId::new(1),
        entry: 0,
        category,
        route: RouteId::new(0),
    };
    apply_all(
        &mut world,
        vec![
            Command::PlaceTower {
                blueprint: TowerBlueprint::base(TowerKind::Arrow),
                tile: TileCoord::new(2, 2),
            },
            spawn(MobCategory::Normal),
            spawn(MobCategory::Tank),
            spawn(MobCategory::Fast),
            Command::SetTargeting {
                tower: TowerId::new(0),
                strategy,
            },
        ],
    );

    // Spread the mobs along the north route: x = 0, 2, 4.
    for (mob, progress) in [(0, 4.0_f32), (1, 2.0), (2, 0.0)] {
        apply_all(
            &mut world,
            vec![Command::AdvanceMob {
                mob: MobId::new(mob),
                progress,
                position: Vec2::new(progress, 3.0),
                slow: None,
            }],
        );
    }
    apply_all(
        &mut world,
        vec![Command::DamageMob {
            mob: MobId::new(1),
            amount: 190,
        }],
    );
    world
}

fn targets(world: &World) -> Vec<TowerTarget> {
    let mut targeting = TowerTargeting::new();
    let mut out = Vec::new();
    targeting.handle(&query::tower_view(world), &query::mob_view(world), &mut out);
    out
}

#[test]
fn each_strategy_picks_its_documented_mob() {
    let expected = [
        (TargetingStrategy::First, 0),
        (TargetingStrategy::Last, 2),
        (TargetingStrategy::Nearest, 1),
        (TargetingStrategy::Strongest, 1),
        (TargetingStrategy::Weakest, 1),
    ];
    for (strategy, mob) in expected {
        let world = scripted_world(strategy);
        assert_eq!(
            targets(&world),
            vec![TowerTarget {
                tower: TowerId::new(0),
                mob: MobId::new(mob),
            }],
            "strategy {strategy:?}"
        );
    }
}

#[test]
fn weakest_picks_the_lowest_current_hp_at_equal_range() {
    for hp in [[50, 150, 100], [150, 50, 100], [150, 100, 50]] {
        let mut world = World::with_default_grid(GameConfig::default(), false);
        apply_all(
            &mut world,
            vec![
                Command::PlaceTower {
                    blueprint: TowerBlueprint::base(TowerKind::Arrow),
                    tile: TileCoord::new(2, 2),
                },
                Command::SetTargeting {
                    tower: TowerId::new(0),
                    strategy: TargetingStrategy::Weakest,
                },
            ],
        );
        for (mob, hp) in hp.into_iter().enumerate() {
            let mob = MobId::new(mob as u32);
            apply_all(
                &mut world,
                vec![
                    Command::SpawnMob {
                        wave: WaveId::new(1),
                        entry: 0,
                        category: MobCategory::Tank,
                        route: RouteId::new(0),
                    },
                    Command::AdvanceMob {
                        mob,
                        progress: 2.0,
                        position: Vec2::new(2.0, 3.0),
                        slow: None,
                    },
                    Command::DamageMob {
                        mob,
                        amount: 200 - hp,
                    },
                ],
            );
        }

        let weakest = hp.iter().position(|&hp| hp == 50).expect("50 hp mob");
        assert_eq!(
            targets(&world),
            vec![TowerTarget {
                tower: TowerId::new(0),
                mob: MobId::new(weakest as u32),
            }],
            "hp {hp:?}"
        );
    }
}

#[test]
fn towers_without_mobs_in_range_are_skipped() {
    let mut world = World::with_default_grid(GameConfig::default(), false);
    apply_all(
        &mut world,
        vec![
            Command::PlaceTower {
                blueprint: TowerBlueprint::base(TowerKind::Frost),
                tile: TileCoord::new(10, 12),
            },
            Command::SpawnMob {
                wave: WaveId::new(1),
                entry: 0,
                category: MobCategory::Normal,
                route: RouteId::new(0),
            },
        ],
    );
    assert!(targets(&world).is_empty());
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let fingerprint = |strategy| {
        let mut world = scripted_world(strategy);
        apply_all(
            &mut world,
            vec![Command::Tick {
                dt: Duration::from_millis(100),
            }],
        );
        let mut hasher = DefaultHasher::new();
        for target in targets(&world) {
            (target.tower, target.mob).hash(&mut hasher);
        }
        hasher.finish()
    };

    for strategy in TargetingStrategy::ALL {
        assert_eq!(fingerprint(strategy), fingerprint(strategy));
    }
}
