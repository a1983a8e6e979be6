#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fires towers and resolves projectiles in flight.

use std::time::Duration;

use tower_defence_core::{
    effective_damage, splash_damage, Command, MobSnapshot, MobView, ProjectileEffect,
    ProjectileSnapshot, ProjectileView, TowerId, TowerSnapshot, TowerTarget, TowerView, Vec2,
    HIT_THRESHOLD,
};

/// Tower combat system that queues firing and impact commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for targeted towers whose
    /// cooldown has elapsed at `sim_time`.
    pub fn fire(
        &mut self,
        sim_time: Duration,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        let towers = towers.iter().collect::<Vec<_>>();
        if towers.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            if let Some(snapshot) = find_tower(&towers, target.tower) {
                if snapshot.ready_at(sim_time) {
                    self.scratch.push(Command::FireProjectile {
                        tower: target.tower,
                        target: target.mob,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Moves every projectile toward its target over `dt` and emits the
    /// commands that resolve hits.
    ///
    /// Projectiles whose target is gone are removed. A projectile never
    /// overshoots: when it could travel past the target it stops on it.
    pub fn resolve_projectiles(
        &self,
        dt: Duration,
        projectiles: &ProjectileView,
        mobs: &MobView,
        out: &mut Vec<Command>,
    ) {
        for projectile in projectiles.iter() {
            let Some(target) = mobs.get(projectile.target) else {
                out.push(Command::RemoveProjectile {
                    projectile: projectile.id,
                });
                continue;
            };

            let position = step_toward(
                projectile.position,
                target.position,
                projectile.speed * dt.as_secs_f32(),
            );
            if position.distance(target.position) <= HIT_THRESHOLD {
                resolve_hit(projectile, target, mobs, out);
                out.push(Command::RemoveProjectile {
                    projectile: projectile.id,
                });
            } else {
                out.push(Command::MoveProjectile {
                    projectile: projectile.id,
                    position,
                });
            }
        }
    }
}

fn find_tower<'a>(towers: &[&'a TowerSnapshot], tower: TowerId) -> Option<&'a TowerSnapshot> {
    towers
        .binary_search_by_key(&tower, |snapshot| snapshot.id)
        .ok()
        .map(|index| towers[index])
}

fn step_toward(from: Vec2, to: Vec2, travel: f32) -> Vec2 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= travel || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * travel
    }
}

fn resolve_hit(
    projectile: &ProjectileSnapshot,
    target: &MobSnapshot,
    mobs: &MobView,
    out: &mut Vec<Command>,
) {
    out.push(Command::DamageMob {
        mob: target.id,
        amount: effective_damage(projectile.damage, target.armor),
    });

    for effect in &projectile.effects {
        match effect {
            ProjectileEffect::Slow(slow) => out.push(Command::ApplySlow {
                mob: target.id,
                effect: *slow,
            }),
        }
    }

    let Some(radius) = projectile.splash_radius else {
        return;
    };
    let impact = target.position;
    for mob in mobs.iter() {
        if mob.id == target.id || !mob.is_alive() || mob.position.distance(impact) > radius {
            continue;
        }
        out.push(Command::DamageMob {
            mob: mob.id,
            amount: splash_damage(projectile.damage, mob.armor),
        });
    }
}
