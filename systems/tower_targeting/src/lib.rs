#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use tower_defence_core::{
    MobId, MobSnapshot, MobView, TargetingStrategy, TowerTarget, TowerView, Vec2,
};

/// Mob eligible for selection by a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Mob identifier; lower ids spawned earlier.
    pub id: MobId,
    /// Current world position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points at spawn.
    pub max_hp: u32,
}

impl From<&MobSnapshot> for Candidate {
    fn from(mob: &MobSnapshot) -> Self {
        Self {
            id: mob.id,
            position: mob.position,
            hp: mob.hp,
            max_hp: mob.max_hp,
        }
    }
}

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    mob_workspace: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers without a mob in range receive no entry.
    pub fn handle(&mut self, towers: &TowerView, mobs: &MobView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || mobs.is_empty() {
            return;
        }

        self.mob_workspace.clear();
        self.mob_workspace.reserve(mobs.len());
        self.mob_workspace
            .extend(mobs.iter().filter(|mob| mob.is_alive()).map(Candidate::from));
        self.mob_workspace.sort_by_key(|candidate| candidate.id);

        for tower in towers.iter() {
            if let Some(mob) = select_target(
                tower.strategy,
                tower.stats.range,
                tower.position(),
                &self.mob_workspace,
            ) {
                out.push(TowerTarget {
                    tower: tower.id,
                    mob,
                });
            }
        }
    }
}

/// Chooses a target among `candidates` for a tower at `origin`.
///
/// Candidates are expected in spawn order. Only mobs with hit points left and
/// within `range` (inclusive) are considered. Ties resolve to the candidate
/// encountered first.
#[must_use]
pub fn select_target(
    strategy: TargetingStrategy,
    range: f32,
    origin: Vec2,
    candidates: &[Candidate],
) -> Option<MobId> {
    let mut in_range = candidates
        .iter()
        .filter(|candidate| candidate.hp > 0 && candidate.position.distance(origin) <= range);

    let chosen = match strategy {
        TargetingStrategy::First => in_range.min_by_key(|candidate| candidate.id),
        TargetingStrategy::Last => in_range.max_by_key(|candidate| candidate.id),
        TargetingStrategy::Nearest => in_range.fold(None, |best: Option<&Candidate>, candidate| {
            match best {
                Some(current)
                    if current.position.distance(origin) <= candidate.position.distance(origin) =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            }
        }),
        TargetingStrategy::Strongest => in_range.fold(None, |best: Option<&Candidate>, candidate| {
            match best {
                Some(current) if current.max_hp >= candidate.max_hp => Some(current),
                _ => Some(candidate),
            }
        }),
        TargetingStrategy::Weakest => in_range.fold(None, |best: Option<&Candidate>, candidate| {
            match best {
                Some(current) if current.hp <= candidate.hp => Some(current),
                _ => Some(candidate),
            }
        }),
    };

    chosen.map(|candidate| candidate.id)
}
