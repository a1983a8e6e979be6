use std::time::Duration;

use tower_defence_core::{GameConfig, MobId, TargetingStrategy, Vec2, WaveId};
use tower_defence_engine::{GridSource, Simulation};
use tower_defence_system_tower_targeting::{select_target, Candidate};
use tower_defence_system_wave_scheduler::FixedRoute;
use tower_defence_world::query;

const TICK: Duration = Duration::from_nanos(33_333_333);

#[test]
fn first_prefers_the_mob_furthest_along_a_shared_route() {
    let mut game =
        Simulation::new(GameConfig::default(), GridSource::Default, false, FixedRoute(0));
    assert_eq!(game.start_next_wave(), Ok(WaveId::new(1)));
    // Wave one releases a mob every second; 2.5 s lets three onto the route.
    for _ in 0..75 {
        let _ = game.advance_tick(TICK);
    }

    let mobs = query::mob_view(game.world()).into_vec();
    assert_eq!(mobs.len(), 3);
    for pair in mobs.windows(2) {
        assert!(pair[0].progress > pair[1].progress, "{pair:?}");
    }

    let candidates: Vec<Candidate> = mobs.iter().map(Candidate::from).collect();
    let origin = Vec2::new(1.0, 2.0);
    assert_eq!(
        select_target(TargetingStrategy::First, 5.0, origin, &candidates),
        Some(MobId::new(0))
    );
    assert_eq!(
        select_target(TargetingStrategy::Last, 5.0, origin, &candidates),
        Some(MobId::new(2))
    );

    // Out of reach of the tower the leader is skipped.
    let near_spawn = Vec2::new(0.0, 2.0);
    let reach = mobs[1].position.distance(near_spawn) + 0.01;
    assert_eq!(
        select_target(TargetingStrategy::First, reach, near_spawn, &candidates),
        Some(MobId::new(1))
    );
}
