//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use tower_defence_core::{
    TargetingStrategy, Tier, TileCoord, TowerId, TowerKind, TowerSnapshot, TowerStats,
};

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) tier: Tier,
    pub(crate) tile: TileCoord,
    pub(crate) stats: TowerStats,
    pub(crate) last_fired_at: Duration,
    pub(crate) strategy: TargetingStrategy,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            tier: self.tier,
            tile: self.tile,
            stats: self.stats.clone(),
            last_fired_at: self.last_fired_at,
            strategy: self.strategy,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns the identifier allocated to it.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        tier: Tier,
        tile: TileCoord,
        stats: TowerStats,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                tier,
                tile,
                stats,
                last_fired_at: Duration::ZERO,
                strategy: TargetingStrategy::default(),
            },
        );
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Reports whether a tower already stands on the tile.
    pub(crate) fn occupies(&self, tile: TileCoord) -> bool {
        self.entries.values().any(|tower| tower.tile == tile)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }
}
