//! Static catalog of mob categories and tower blueprints.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SlowEffect;

/// Kinds of mobs that travel the routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MobCategory {
    /// Baseline mob.
    Normal,
    /// Fragile but quick.
    Fast,
    /// Slow, armored and durable.
    Tank,
    /// Moderately quick with extra hit points.
    Flying,
}

impl MobCategory {
    /// Statistics of the category before any endless scaling.
    #[must_use]
    pub const fn base_stats(self) -> MobStats {
        match self {
            Self::Normal => MobStats::new(50, 1.0, 0, 10),
            Self::Fast => MobStats::new(30, 2.0, 0, 15),
            Self::Tank => MobStats::new(200, 0.5, 2, 25),
            Self::Flying => MobStats::new(80, 1.5, 0, 20),
        }
    }

    /// Statistics used by stress games. Flying mobs have no stress variant
    /// and keep their base statistics.
    #[must_use]
    pub const fn stress_stats(self) -> MobStats {
        match self {
            Self::Normal => MobStats::new(300, 0.8, 0, 10),
            Self::Fast => MobStats::new(200, 1.5, 0, 15),
            Self::Tank => MobStats::new(800, 0.3, 1, 25),
            Self::Flying => self.base_stats(),
        }
    }
}

/// Data tables a game draws its mobs, tower blueprints and waves from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ruleset {
    /// Regular campaign tables.
    #[default]
    Standard,
    /// Cheap rapid-fire towers against dense waves of durable mobs.
    Stress,
}

impl Ruleset {
    /// Statistics of a freshly spawned mob outside endless scaling.
    #[must_use]
    pub const fn mob_stats(self, category: MobCategory) -> MobStats {
        match self {
            Self::Standard => category.base_stats(),
            Self::Stress => category.stress_stats(),
        }
    }

    /// Blueprint offered for purchase for a tower kind.
    #[must_use]
    pub fn tower(self, kind: TowerKind) -> TowerBlueprint {
        match self {
            Self::Standard => TowerBlueprint::base(kind),
            Self::Stress => TowerBlueprint::stress(kind),
        }
    }
}

/// Hit points, speed, armor and bounty of a mob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobStats {
    /// Hit points at spawn.
    pub max_hp: u32,
    /// Route points travelled per second.
    pub speed: f32,
    /// Flat reduction applied to every hit.
    pub armor: u32,
    /// Money paid when the mob dies.
    pub bounty: u32,
}

impl MobStats {
    /// Creates a new set of mob statistics.
    #[must_use]
    pub const fn new(max_hp: u32, speed: f32, armor: u32, bounty: u32) -> Self {
        Self {
            max_hp,
            speed,
            armor,
            bounty,
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Fast single-target tower.
    Arrow,
    /// Slow tower dealing splash damage.
    Cannon,
    /// Weak tower that slows its targets.
    Frost,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [Self; 3] = [Self::Arrow, Self::Cannon, Self::Frost];

    /// Lowercase label used by configuration files and the command line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Cannon => "cannon",
            Self::Frost => "frost",
        }
    }
}

/// Error returned when parsing an unknown tower kind label.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tower kind `{0}`")]
pub struct UnknownTowerKind(pub String);

impl std::str::FromStr for TowerKind {
    type Err = UnknownTowerKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownTowerKind(value.to_owned()))
    }
}

/// Upgrade level of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Level purchased on placement.
    One,
    /// First upgrade.
    Two,
    /// Final upgrade.
    Three,
}

impl Tier {
    /// Numeric level in `1..=3`.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Tier following this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }
}

/// On-hit effect carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProjectileEffect {
    /// Reduces the target's speed for a while.
    Slow(SlowEffect),
}

/// Combat statistics for a tower tier.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerStats {
    /// Purchase price of this tier.
    pub cost: u32,
    /// Targeting radius in tiles.
    pub range: f32,
    /// Damage per projectile before armor.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Projectile speed in tiles per second.
    pub projectile_speed: f32,
    /// Splash radius in tiles for area damage towers.
    pub splash_radius: Option<f32>,
    /// Effects applied on hit.
    pub effects: Vec<ProjectileEffect>,
}

impl TowerStats {
    /// Minimum time between two shots.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        if self.fire_rate <= 0.0 {
            return Duration::MAX;
        }
        Duration::try_from_secs_f32(self.fire_rate.recip()).unwrap_or(Duration::MAX)
    }
}

/// Fully described tower offered for purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerBlueprint {
    /// Kind of tower.
    pub kind: TowerKind,
    /// Tier described by the blueprint.
    pub tier: Tier,
    /// Display name of the tier.
    pub name: &'static str,
    /// One-line description of the tier.
    pub description: &'static str,
    /// Combat statistics of the tier.
    pub stats: TowerStats,
}

// Projectile speeds in the catalog are authored in pixels per second for
// 32 pixel tiles.
const AUTHORED_TILE_PIXELS: f32 = 32.0;

struct Row {
    name: &'static str,
    description: &'static str,
    cost: u32,
    range: f32,
    damage: u32,
    fire_rate: f32,
    pixel_speed: f32,
}

impl Row {
    fn assemble(self, kind: TowerKind, tier: Tier) -> TowerBlueprint {
        let splash_radius = match (kind, tier) {
            (TowerKind::Cannon, Tier::One) => Some(1.5),
            (TowerKind::Cannon, Tier::Two) => Some(2.0),
            (TowerKind::Cannon, Tier::Three) => Some(2.5),
            _ => None,
        };

        let slow = match (kind, tier) {
            (TowerKind::Frost, Tier::One) => Some(SlowEffect::new(0.6, Duration::from_secs(3))),
            (TowerKind::Frost, Tier::Two) => Some(SlowEffect::new(0.4, Duration::from_secs(4))),
            (TowerKind::Frost, Tier::Three) => {
                Some(SlowEffect::new(0.25, Duration::from_secs(5)))
            }
            _ => None,
        };

        TowerBlueprint {
            kind,
            tier,
            name: self.name,
            description: self.description,
            stats: TowerStats {
                cost: self.cost,
                range: self.range,
                damage: self.damage,
                fire_rate: self.fire_rate,
                projectile_speed: self.pixel_speed / AUTHORED_TILE_PIXELS,
                splash_radius,
                effects: slow.into_iter().map(ProjectileEffect::Slow).collect(),
            },
        }
    }
}

impl TowerBlueprint {
    /// Returns the catalog blueprint for a kind and tier.
    #[must_use]
    pub fn lookup(kind: TowerKind, tier: Tier) -> Self {
        let row = match (kind, tier) {
            (TowerKind::Arrow, Tier::One) => Row {
                name: "Arrow Tower",
                description: "Fast single-target tower",
                cost: 20,
                range: 3.0,
                damage: 15,
                fire_rate: 2.0,
                pixel_speed: 300.0,
            },
            (TowerKind::Arrow, Tier::Two) => Row {
                name: "Ranger Tower",
                description: "Improved arrow tower with better range and damage",
                cost: 40,
                range: 4.0,
                damage: 25,
                fire_rate: 2.5,
                pixel_speed: 350.0,
            },
            (TowerKind::Arrow, Tier::Three) => Row {
                name: "Sniper Tower",
                description: "Elite arrow tower with exceptional range and damage",
                cost: 80,
                range: 6.0,
                damage: 50,
                fire_rate: 3.0,
                pixel_speed: 400.0,
            },
            (TowerKind::Cannon, Tier::One) => Row {
                name: "Cannon",
                description: "Slow but powerful splash damage tower",
                cost: 40,
                range: 2.5,
                damage: 40,
                fire_rate: 0.8,
                pixel_speed: 150.0,
            },
            (TowerKind::Cannon, Tier::Two) => Row {
                name: "Heavy Cannon",
                description: "Improved cannon with larger splash radius",
                cost: 80,
                range: 3.0,
                damage: 70,
                fire_rate: 1.0,
                pixel_speed: 180.0,
            },
            (TowerKind::Cannon, Tier::Three) => Row {
                name: "Artillery",
                description: "Devastating area-of-effect cannon",
                cost: 160,
                range: 4.0,
                damage: 120,
                fire_rate: 1.2,
                pixel_speed: 200.0,
            },
            (TowerKind::Frost, Tier::One) => Row {
                name: "Frost Tower",
                description: "Slows enemies with icy projectiles",
                cost: 30,
                range: 2.5,
                damage: 10,
                fire_rate: 1.5,
                pixel_speed: 250.0,
            },
            (TowerKind::Frost, Tier::Two) => Row {
                name: "Ice Tower",
                description: "Enhanced frost tower with stronger slow effect",
                cost: 60,
                range: 3.0,
                damage: 20,
                fire_rate: 1.8,
                pixel_speed: 280.0,
            },
            (TowerKind::Frost, Tier::Three) => Row {
                name: "Blizzard Tower",
                description: "Ultimate frost tower that nearly freezes enemies",
                cost: 120,
                range: 4.0,
                damage: 35,
                fire_rate: 2.0,
                pixel_speed: 320.0,
            },
        };
        row.assemble(kind, tier)
    }

    /// Returns the rapid-fire tier one blueprint used by stress games.
    ///
    /// Stress towers upgrade into the regular tier two blueprints.
    #[must_use]
    pub fn stress(kind: TowerKind) -> Self {
        let row = match kind {
            TowerKind::Arrow => Row {
                name: "Rapid Arrow Tower",
                description: "Ultra-fast firing arrow tower for stress testing",
                cost: 10,
                range: 4.0,
                damage: 20,
                fire_rate: 8.0,
                pixel_speed: 200.0,
            },
            TowerKind::Cannon => Row {
                name: "Rapid Cannon",
                description: "Fast-firing cannon for stress testing",
                cost: 20,
                range: 3.0,
                damage: 50,
                fire_rate: 4.0,
                pixel_speed: 100.0,
            },
            TowerKind::Frost => Row {
                name: "Rapid Frost Tower",
                description: "Fast-firing frost tower for stress testing",
                cost: 15,
                range: 3.0,
                damage: 15,
                fire_rate: 6.0,
                pixel_speed: 150.0,
            },
        };
        row.assemble(kind, Tier::One)
    }

    /// Returns the tier one blueprint for a kind.
    #[must_use]
    pub fn base(kind: TowerKind) -> Self {
        Self::lookup(kind, Tier::One)
    }

    /// Blueprint of the tier that follows this one, if any.
    #[must_use]
    pub fn upgrade(&self) -> Option<Self> {
        self.tier.next().map(|tier| Self::lookup(self.kind, tier))
    }
}
