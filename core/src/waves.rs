//! Fixed wave tables and endless-mode generation.

use std::time::Duration;

use crate::{
    MobCategory::{self, Fast, Flying, Normal, Tank},
    MobStats, Ruleset, WaveId,
};

/// Number of waves in the fixed table.
pub const STANDARD_WAVE_COUNT: u32 = 10;

/// Number of waves in the stress table.
pub const STRESS_WAVE_COUNT: u32 = 5;

const COUNT_SCALE: f64 = 1.12;
const SPACING_SCALE: f64 = 0.95;
const MIN_SPACING: Duration = Duration::from_millis(100);
const BOSS_INTERVAL: u32 = 10;
const ELITE_INTERVAL: u32 = 5;
const ELITE_MIN_WAVE: u32 = 15;

const HP_SCALE: f64 = 1.15;
const BOUNTY_SCALE: f64 = 1.1;
const SPEED_STEP: f32 = 0.05;
const SPEED_CAP: f32 = 2.0;
const ARMOR_MIN_WAVE: u32 = 15;
const ARMOR_CAP: u32 = 10;

/// Batch of identical mobs released at a fixed spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveEntry {
    /// Time after the wave start at which the first mob appears.
    pub start_delay: Duration,
    /// Category of every mob in the batch.
    pub category: MobCategory,
    /// Number of mobs in the batch.
    pub count: u32,
    /// Time between consecutive mobs.
    pub spacing: Duration,
}

impl WaveEntry {
    /// Creates a new wave entry.
    #[must_use]
    pub const fn new(
        start_delay: Duration,
        category: MobCategory,
        count: u32,
        spacing: Duration,
    ) -> Self {
        Self {
            start_delay,
            category,
            count,
            spacing,
        }
    }
}

/// Wave definition made of one or more entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    /// Wave number.
    pub id: WaveId,
    /// Batches released during the wave.
    pub entries: Vec<WaveEntry>,
}

impl Wave {
    /// Total number of mobs the wave releases.
    #[must_use]
    pub fn total_mobs(&self) -> u32 {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

const fn entry(delay_ms: u64, category: MobCategory, count: u32, spacing_ms: u64) -> WaveEntry {
    WaveEntry::new(
        Duration::from_millis(delay_ms),
        category,
        count,
        Duration::from_millis(spacing_ms),
    )
}

const WAVE_TABLE: [&[WaveEntry]; STANDARD_WAVE_COUNT as usize] = [
    &[entry(0, Normal, 5, 1000)],
    &[entry(0, Normal, 8, 800)],
    &[entry(0, Normal, 6, 800), entry(3000, Fast, 3, 500)],
    &[entry(0, Normal, 10, 700), entry(2000, Tank, 1, 1000)],
    &[entry(0, Fast, 8, 600), entry(1000, Normal, 5, 800)],
    &[
        entry(0, Normal, 12, 600),
        entry(2000, Tank, 2, 1500),
        entry(4000, Flying, 3, 800),
    ],
    &[
        entry(0, Fast, 10, 500),
        entry(1000, Tank, 3, 1000),
        entry(3000, Flying, 4, 700),
    ],
    &[
        entry(0, Normal, 15, 500),
        entry(1000, Fast, 8, 400),
        entry(3000, Tank, 4, 1000),
    ],
    &[
        entry(0, Flying, 8, 600),
        entry(2000, Tank, 5, 800),
        entry(4000, Fast, 12, 300),
    ],
    &[
        entry(0, Normal, 20, 400),
        entry(1000, Fast, 15, 300),
        entry(3000, Tank, 8, 700),
        entry(5000, Flying, 10, 500),
    ],
];

const STRESS_WAVE_TABLE: [&[WaveEntry]; STRESS_WAVE_COUNT as usize] = [
    &[entry(0, Normal, 30, 300)],
    &[entry(0, Normal, 25, 200), entry(2000, Fast, 20, 200)],
    &[
        entry(0, Normal, 40, 150),
        entry(1000, Fast, 30, 150),
        entry(3000, Tank, 10, 500),
    ],
    &[
        entry(0, Normal, 50, 100),
        entry(1000, Fast, 40, 100),
        entry(2000, Tank, 15, 300),
    ],
    &[
        entry(0, Normal, 60, 80),
        entry(500, Fast, 50, 80),
        entry(1000, Tank, 20, 200),
    ],
];

fn table_wave(table: &[&[WaveEntry]], id: WaveId) -> Option<Wave> {
    let index = usize::try_from(id.get().checked_sub(1)?).ok()?;
    table.get(index).map(|entries| Wave {
        id,
        entries: entries.to_vec(),
    })
}

/// Returns a wave from the fixed table, or `None` outside `1..=10`.
#[must_use]
pub fn standard_wave(id: WaveId) -> Option<Wave> {
    table_wave(&WAVE_TABLE, id)
}

/// Returns a wave from the stress table, or `None` outside `1..=5`.
#[must_use]
pub fn stress_wave(id: WaveId) -> Option<Wave> {
    table_wave(&STRESS_WAVE_TABLE, id)
}

impl Ruleset {
    /// Number of waves a non-endless game plays.
    #[must_use]
    pub const fn wave_count(self) -> u32 {
        match self {
            Self::Standard => STANDARD_WAVE_COUNT,
            Self::Stress => STRESS_WAVE_COUNT,
        }
    }
}

/// Generates an endless-mode wave.
///
/// The matching fixed wave (or the last one past the table) serves as the
/// template. Counts grow and spacing tightens exponentially with the distance
/// from the end of the table, so early endless waves are lighter than their
/// fixed counterparts. Every tenth wave adds a tank boss batch and every fifth
/// wave past the fifteenth adds a flying elite batch.
#[must_use]
pub fn endless_wave(id: WaveId) -> Wave {
    let number = id.get();
    let template_index = number.clamp(1, STANDARD_WAVE_COUNT) as usize - 1;
    let template = WAVE_TABLE[template_index];
    let exponent = f64::from(number) - f64::from(STANDARD_WAVE_COUNT);
    let count_scale = COUNT_SCALE.powf(exponent);
    let spacing_scale = SPACING_SCALE.powf(exponent);

    let mut entries: Vec<WaveEntry> = template
        .iter()
        .map(|entry| WaveEntry {
            count: (f64::from(entry.count) * count_scale).floor() as u32,
            spacing: scale_duration(entry.spacing, spacing_scale).max(MIN_SPACING),
            ..*entry
        })
        .collect();

    if number > 0 && number % BOSS_INTERVAL == 0 {
        entries.push(entry(2000, Tank, 10, 1000));
    } else if number > ELITE_MIN_WAVE && number % ELITE_INTERVAL == 0 {
        entries.push(entry(1000, Flying, (number / 10).max(2), 700));
    }

    Wave { id, entries }
}

fn scale_duration(duration: Duration, factor: f64) -> Duration {
    let nanos = (duration.as_nanos() as f64 * factor).round();
    Duration::from_nanos(nanos as u64)
}

/// Resolves the definition of a wave for the active mode.
///
/// Endless generation always scales the standard table, whatever the ruleset.
#[must_use]
pub fn wave_definition(id: WaveId, endless: bool, ruleset: Ruleset) -> Option<Wave> {
    match (endless, ruleset) {
        (true, _) => Some(endless_wave(id)),
        (false, Ruleset::Standard) => standard_wave(id),
        (false, Ruleset::Stress) => stress_wave(id),
    }
}

/// Statistics of a mob spawned during an endless-mode wave.
///
/// Derived from the category's base statistics every time, so scaling never
/// compounds. Waves up to the end of the fixed table use base statistics.
#[must_use]
pub fn endless_mob_stats(category: MobCategory, wave: WaveId) -> MobStats {
    let base = category.base_stats();
    let number = wave.get();
    if number <= STANDARD_WAVE_COUNT {
        return base;
    }

    let steps = number - STANDARD_WAVE_COUNT;
    let armor_bonus = if number >= ARMOR_MIN_WAVE {
        (steps / 3).min(ARMOR_CAP)
    } else {
        0
    };

    MobStats {
        max_hp: (f64::from(base.max_hp) * HP_SCALE.powi(steps as i32)).floor() as u32,
        speed: base.speed * (1.0 + SPEED_STEP * steps as f32).min(SPEED_CAP),
        armor: base.armor + armor_bonus,
        bounty: (f64::from(base.bounty) * BOUNTY_SCALE.powi(steps as i32)).floor() as u32,
    }
}
