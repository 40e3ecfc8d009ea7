/// Simulation configuration constants and tunable parameters.
///
/// Formulas and behavior tables are fixed design content and live as associated
/// constants; only presentation cadence, buffer sizes, and a few simulation
/// conveniences are runtime-tunable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Ticks between UI snapshots in real-time mode.
    pub realtime_snapshot_interval: u64,
    /// Ticks between UI snapshots in batch mode.
    pub batch_snapshot_interval: u64,
    /// Ticks between cooperative yields to the host scheduler in batch mode.
    pub batch_yield_interval: u64,
    /// Floating combat numbers kept between flushes (oldest dropped).
    pub floating_capacity: usize,
    /// Combat log lines kept between flushes (oldest dropped).
    pub log_capacity: usize,
    /// Damage-log entries retained for death attribution.
    pub damage_log_capacity: usize,
    /// Pending external commands kept per command kind.
    pub mailbox_capacity: usize,
    pub mailbox_overflow: OverflowPolicy,
    /// Revive dead members at the start of each tick (batch simulation only).
    pub auto_resurrect: bool,
    /// Travel ticks used when a pull does not declare its own.
    pub default_travel_ticks: u64,
    /// Ticks the recovery sub-loop may run before reporting a timeout.
    pub recovery_budget_ticks: u64,
    pub boss_priority: PriorityPolicyKind,
}

/// What happens when a command mailbox is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// Refuse the new command and report it to the sender.
    #[default]
    RejectNewest,
    /// Discard the oldest queued command of the same kind.
    DropOldest,
}

/// Selects the shipped boss ability ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PriorityPolicyKind {
    #[default]
    Signature,
    Declared,
}

impl CombatConfig {
    // ===== party =====
    pub const MAX_PARTY_SIZE: usize = 5;

    // ===== time =====
    pub const TICK_MILLIS: u64 = 100;
    pub const TICK_SECONDS: f64 = 0.1;

    // ===== mitigation =====
    pub const ARMOR_CONSTANT: f64 = 5.0;
    pub const ARMOR_REDUCTION_CAP: f64 = 0.90;
    pub const BASE_BLOCK_REDUCTION: f64 = 50.0;
    pub const BASE_SUPPRESSION_REDUCTION: f64 = 50.0;
    pub const BLOCK_REDUCTION_CAP: f64 = 90.0;
    pub const SUPPRESSION_REDUCTION_CAP: f64 = 90.0;
    pub const RESISTANCE_MIN: f64 = -100.0;
    pub const RESISTANCE_CAP: f64 = 75.0;
    pub const DAMAGE_REDUCTION_CAP: f64 = 75.0;
    pub const MIN_DAMAGE_THRESHOLD: f64 = 1.0;
    pub const MIN_HIT_CHANCE: f64 = 0.05;

    // ===== regeneration =====
    pub const ES_BASE_RECHARGE_DELAY_SECS: f64 = 2.0;
    pub const ES_DEFAULT_RECHARGE_RATE: f64 = 33.0;
    pub const LOW_LEVEL_THRESHOLD: u32 = 10;
    pub const LOW_LEVEL_MANA_MULTIPLIER: f64 = 11.0;
    pub const AUTO_RESURRECT_HEALTH: f64 = 0.60;
    pub const AUTO_RESURRECT_MANA: f64 = 0.30;

    // ===== external commands =====
    pub const RESURRECT_HEALTH: f64 = 0.50;
    pub const RESURRECT_MANA: f64 = 0.50;
    pub const BLOODLUST_TICKS: u64 = 400;
    pub const SATED_TICKS: u64 = 6_000;
    pub const BLOODLUST_DAMAGE_PCT: f64 = 30.0;
    pub const BLOODLUST_HASTE_PCT: f64 = 30.0;

    // ===== enemy behavior =====
    pub const ENEMY_GCD_TICKS: u64 = 10;
    pub const GATE_AOE_COOLDOWN_FACTOR: f64 = 0.75;
    pub const ARCHER_TANK_WEIGHT: f64 = 0.60;
    pub const CASTER_TANK_WEIGHT: f64 = 0.70;
    pub const AOE_DAMAGE_FACTOR: f64 = 0.70;
    pub const TANKBUSTER_MULTIPLIER: f64 = 3.0;
    pub const LEGACY_PULSE_TICKS: u64 = 100;
    pub const LEGACY_PULSE_FACTOR: f64 = 0.60;
    pub const LEGACY_BUSTER_CAST_TICKS: u64 = 30;
    pub const LEGACY_BUSTER_COOLDOWN_TICKS: u64 = 150;
    pub const LEGACY_MELEE_TICKS: u64 = 15;
    pub const HEAVY_SHAKE: f64 = 1.0;
    pub const LIGHT_SHAKE: f64 = 0.4;

    // ===== recovery =====
    pub const RECOVERY_HEAL_CAST_TICKS: u64 = 15;
    pub const RECOVERY_HEAL_FRACTION: f64 = 0.35;
    pub const RECOVERY_CRIT_MULTIPLIER: f64 = 1.5;
    pub const MASS_RESURRECTION_TICKS: u64 = 100;
    pub const MASS_RESURRECTION_HEALTH: f64 = 0.50;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_REALTIME_SNAPSHOT_INTERVAL: u64 = 2;
    pub const DEFAULT_BATCH_SNAPSHOT_INTERVAL: u64 = 50;
    pub const DEFAULT_BATCH_YIELD_INTERVAL: u64 = 100;
    pub const DEFAULT_FLOATING_CAPACITY: usize = 64;
    pub const DEFAULT_LOG_CAPACITY: usize = 100;
    pub const DEFAULT_DAMAGE_LOG_CAPACITY: usize = 256;
    pub const DEFAULT_MAILBOX_CAPACITY: usize = 2;
    pub const DEFAULT_TRAVEL_TICKS: u64 = 30;
    pub const DEFAULT_RECOVERY_BUDGET_TICKS: u64 = 600;

    pub fn new() -> Self {
        Self {
            realtime_snapshot_interval: Self::DEFAULT_REALTIME_SNAPSHOT_INTERVAL,
            batch_snapshot_interval: Self::DEFAULT_BATCH_SNAPSHOT_INTERVAL,
            batch_yield_interval: Self::DEFAULT_BATCH_YIELD_INTERVAL,
            floating_capacity: Self::DEFAULT_FLOATING_CAPACITY,
            log_capacity: Self::DEFAULT_LOG_CAPACITY,
            damage_log_capacity: Self::DEFAULT_DAMAGE_LOG_CAPACITY,
            mailbox_capacity: Self::DEFAULT_MAILBOX_CAPACITY,
            mailbox_overflow: OverflowPolicy::default(),
            auto_resurrect: false,
            default_travel_ticks: Self::DEFAULT_TRAVEL_TICKS,
            recovery_budget_ticks: Self::DEFAULT_RECOVERY_BUDGET_TICKS,
            boss_priority: PriorityPolicyKind::default(),
        }
    }

    /// Converts seconds of simulated time to whole ticks (rounded).
    pub fn secs_to_ticks(secs: f64) -> u64 {
        let ticks = secs / Self::TICK_SECONDS;
        if ticks.is_finite() && ticks > 0.0 {
            ticks.round() as u64
        } else {
            0
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
