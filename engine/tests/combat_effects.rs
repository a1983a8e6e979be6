use std::time::Duration;

use tower_defence_core::{
    Event, GameConfig, MobId, MobSnapshot, TileCoord, TowerBlueprint, TowerKind, WaveId,
};
use tower_defence_engine::{GridSource, Simulation};
use tower_defence_system_wave_scheduler::FixedRoute;
use tower_defence_world::query;

const TICK: Duration = Duration::from_nanos(33_333_333);
const LEADER: MobId = MobId::new(0);

fn game_with(config: GameConfig, kind: TowerKind) -> Simulation<FixedRoute> {
    let mut game = Simulation::new(config, GridSource::Default, false, FixedRoute(0));
    assert!(game
        .place_tower(TowerBlueprint::base(kind), TileCoord::new(1, 2))
        .is_ok());
    assert_eq!(game.start_next_wave(), Ok(WaveId::new(1)));
    game
}

fn leader(game: &Simulation<FixedRoute>) -> MobSnapshot {
    query::mob_view(game.world())
        .get(LEADER)
        .cloned()
        .expect("leading mob is alive")
}

fn assert_moved(before: &MobSnapshot, after: &MobSnapshot, multiplier: f32) {
    let expected = before.base_speed * multiplier * TICK.as_secs_f32();
    let moved = after.progress - before.progress;
    assert!(
        (moved - expected).abs() < 1e-4,
        "moved {moved}, expected {expected} at multiplier {multiplier}"
    );
}

#[test]
fn frost_slows_its_target_until_the_slow_wears_off() {
    // Stress mobs survive long enough to outlive the slow.
    let config = GameConfig {
        stress_test: true,
        ..GameConfig::default()
    };
    let mut game = game_with(config, TowerKind::Frost);

    let mut slowed = None;
    for _ in 0..300 {
        let _ = game.advance_tick(TICK);
        if query::mob_view(game.world())
            .get(LEADER)
            .and_then(|mob| mob.slow)
            .is_some()
        {
            slowed = Some(leader(&game));
            break;
        }
    }
    let before = slowed.expect("frost never hit the leading mob");
    let slow = before.slow.expect("slow recorded");
    assert!((slow.multiplier - 0.6).abs() < f32::EPSILON);
    assert!(slow.remaining > TICK);

    let _ = game.advance_tick(TICK);
    let after = leader(&game);
    assert_moved(&before, &after, slow.multiplier);

    let mut recovered = None;
    for _ in 0..900 {
        let _ = game.advance_tick(TICK);
        let mob = leader(&game);
        if mob.slow.is_none() {
            recovered = Some(mob);
            break;
        }
    }
    let before = recovered.expect("slow never wore off");
    let _ = game.advance_tick(TICK);
    assert_moved(&before, &leader(&game), 1.0);
}

#[test]
fn cannon_hits_splash_the_next_mob_in_line() {
    let mut game = game_with(GameConfig::default(), TowerKind::Cannon);

    let mut damage = Vec::new();
    for _ in 0..150 {
        damage = game
            .advance_tick(TICK)
            .iter()
            .filter_map(|event| match event {
                Event::MobDamaged {
                    mob,
                    amount,
                    remaining,
                } => Some((*mob, *amount, *remaining)),
                _ => None,
            })
            .collect();
        if !damage.is_empty() {
            break;
        }
    }

    // 40 on the target, half of it on the mob one tile behind.
    assert_eq!(damage, vec![(LEADER, 40, 10), (MobId::new(1), 20, 30)]);
    let follower = query::mob_view(game.world())
        .get(MobId::new(1))
        .cloned()
        .expect("follower survives the splash");
    assert_eq!(follower.hp, 30);
    assert_eq!(leader(&game).hp, 10);
}
