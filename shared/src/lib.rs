use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the seven fixed daily teaching slots, in chronological order.
///
/// The ordering matters: administrative break imputation looks at adjacency
/// between slots (see the wage calculator), so `WorkBlock` derives `Ord`
/// following the slot sequence A through G.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkBlock {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl WorkBlock {
    /// All slots in chronological order.
    pub const ALL: [WorkBlock; 7] = [
        WorkBlock::A,
        WorkBlock::B,
        WorkBlock::C,
        WorkBlock::D,
        WorkBlock::E,
        WorkBlock::F,
        WorkBlock::G,
    ];

    /// Zero-based position of the slot within the daily sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        match self {
            WorkBlock::A => 'A',
            WorkBlock::B => 'B',
            WorkBlock::C => 'C',
            WorkBlock::D => 'D',
            WorkBlock::E => 'E',
            WorkBlock::F => 'F',
            WorkBlock::G => 'G',
        }
    }

    pub fn from_char(c: char) -> Option<WorkBlock> {
        match c.to_ascii_uppercase() {
            'A' => Some(WorkBlock::A),
            'B' => Some(WorkBlock::B),
            'C' => Some(WorkBlock::C),
            'D' => Some(WorkBlock::D),
            'E' => Some(WorkBlock::E),
            'F' => Some(WorkBlock::F),
            'G' => Some(WorkBlock::G),
            _ => None,
        }
    }

    /// Encode a set of slots as a compact string for CSV storage, e.g. "ADE".
    /// The result is sorted and deduplicated.
    pub fn encode_set(blocks: &[WorkBlock]) -> String {
        let mut sorted: Vec<WorkBlock> = blocks.to_vec();
        sorted.sort();
        sorted.dedup();
        sorted.iter().map(|b| b.as_char()).collect()
    }

    /// Parse a compact slot-set string. Unknown characters are ignored so a
    /// hand-edited data file degrades gracefully instead of failing the load.
    pub fn parse_set(s: &str) -> Vec<WorkBlock> {
        let mut blocks: Vec<WorkBlock> = s.chars().filter_map(WorkBlock::from_char).collect();
        blocks.sort();
        blocks.dedup();
        blocks
    }
}

impl fmt::Display for WorkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The enumerated teaching sites. Hiraoka is the primary site; the wage
/// policy pays a site differential when home and work sites straddle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Campus {
    Hiraoka,
    ShinSapporo,
    Tsukisamu,
    Maruyama,
    Hokudaimae,
}

impl Campus {
    pub const ALL: [Campus; 5] = [
        Campus::Hiraoka,
        Campus::ShinSapporo,
        Campus::Tsukisamu,
        Campus::Maruyama,
        Campus::Hokudaimae,
    ];

    /// Stable string form used for CSV storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Campus::Hiraoka => "hiraoka",
            Campus::ShinSapporo => "shin-sapporo",
            Campus::Tsukisamu => "tsukisamu",
            Campus::Maruyama => "maruyama",
            Campus::Hokudaimae => "hokudaimae",
        }
    }

    /// Parse from the stable string form used in CSV storage.
    pub fn from_str_value(s: &str) -> Result<Campus, String> {
        match s.to_lowercase().as_str() {
            "hiraoka" => Ok(Campus::Hiraoka),
            "shin-sapporo" => Ok(Campus::ShinSapporo),
            "tsukisamu" => Ok(Campus::Tsukisamu),
            "maruyama" => Ok(Campus::Maruyama),
            "hokudaimae" => Ok(Campus::Hokudaimae),
            _ => Err(format!("Unknown campus: {}", s)),
        }
    }

    /// Location class of the site, which drives the flat daily allowance.
    pub fn location(self) -> Location {
        if self == Campus::Hiraoka {
            Location::Hiraoka
        } else {
            Location::Other
        }
    }
}

impl fmt::Display for Campus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Site class for the flat daily allowance (800 yen at the primary site,
/// 400 yen elsewhere). Derived from `Campus` and kept consistent with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    Hiraoka,
    Other,
}

/// One calendar day's recorded work.
///
/// The date is the natural key; `id` is a secondary identity assigned once
/// at creation and kept for storage purposes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub id: String,
    pub date: NaiveDate,
    /// Teaching slots taught this day. Sorted, no duplicates.
    pub selected_blocks: Vec<WorkBlock>,
    /// Manually entered administrative minutes on top of block-derived time.
    pub support_minutes: u32,
    /// Manually entered flat bonus in yen.
    pub allowance_amount: i64,
    /// Derived from `campus`; see `Campus::location`.
    pub location: Location,
    pub campus: Campus,
    pub has_transport: bool,
    /// Per-day transport override. `None` falls back to the per-campus rate,
    /// then the global default from settings.
    pub transport_cost: Option<i64>,
    /// Slots taught in the leader role. Subset of `selected_blocks`.
    #[serde(default)]
    pub leader_blocks: Vec<WorkBlock>,
    /// Slots taught in the sub-leader role. Subset of `selected_blocks`,
    /// disjoint from `leader_blocks` (leader takes precedence).
    #[serde(default)]
    pub sub_leader_blocks: Vec<WorkBlock>,
}

impl WorkEntry {
    /// Create an empty entry for a date. Transport defaults to on, matching
    /// the behaviour of the entry form.
    pub fn new(date: NaiveDate, campus: Campus) -> Self {
        Self {
            id: Self::generate_id(),
            date,
            selected_blocks: Vec::new(),
            support_minutes: 0,
            allowance_amount: 0,
            location: campus.location(),
            campus,
            has_transport: true,
            transport_cost: None,
            leader_blocks: Vec::new(),
            sub_leader_blocks: Vec::new(),
        }
    }

    /// Generate an entry ID: "entry::<uuid>".
    pub fn generate_id() -> String {
        format!("entry::{}", uuid::Uuid::new_v4())
    }

    /// An entry with no blocks, no support minutes, no allowance and no
    /// transport is considered non-existent and must be pruned from the
    /// store rather than kept as a zero-value record.
    pub fn is_empty(&self) -> bool {
        self.selected_blocks.is_empty()
            && self.support_minutes == 0
            && self.allowance_amount == 0
            && !self.has_transport
    }

    pub fn class_count(&self) -> u32 {
        self.selected_blocks.len() as u32
    }
}

/// Cosmetic profile state. Has no effect on payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub avatar_id: String,
    #[serde(default)]
    pub theme_color: Option<String>,
    #[serde(default)]
    pub active_title: Option<String>,
    /// Titles ever unlocked. Grows monotonically; never shrinks, even if a
    /// later recomputation implies a lower level.
    #[serde(default)]
    pub unlocked_titles: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Guest tutor".to_string(),
            avatar_id: "default".to_string(),
            theme_color: None,
            active_title: Some("rookie".to_string()),
            unlocked_titles: vec!["rookie".to_string()],
        }
    }
}

/// Process-wide configuration. Created with defaults on first run, replaced
/// wholesale on each save, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Teaching rate in yen per hour. A slot bills 90 minutes, so per-block
    /// pay is 1.5 times this figure.
    pub teaching_hourly_rate: i64,
    /// Administrative rate in yen per hour.
    pub hourly_rate: i64,
    /// Global default transport reimbursement in yen per day.
    pub transport_cost: i64,
    /// Per-campus transport overrides. Always total: every campus has an
    /// entry after `normalize`.
    #[serde(default)]
    pub campus_transport_rates: BTreeMap<Campus, i64>,
    /// The user's home site.
    pub default_campus: Campus,
    /// Day of month that ends a pay period (1..=28).
    pub closing_day: u32,
    /// Months between period end and nominal payment.
    pub payment_month_lag: u32,
    /// Annual income ceiling for the dependent-limit progress indicator.
    pub annual_limit: i64,
    #[serde(default)]
    pub profile: UserProfile,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            teaching_hourly_rate: 1380,
            hourly_rate: 1075,
            transport_cost: 500,
            campus_transport_rates: Self::default_campus_rates(),
            default_campus: Campus::Hiraoka,
            closing_day: 15,
            payment_month_lag: 0,
            annual_limit: 1_030_000,
            profile: UserProfile::default(),
        }
    }
}

impl UserSettings {
    /// Default per-campus transport rates.
    pub fn default_campus_rates() -> BTreeMap<Campus, i64> {
        let mut rates = BTreeMap::new();
        rates.insert(Campus::Hiraoka, 1620);
        rates.insert(Campus::ShinSapporo, 1140);
        rates.insert(Campus::Tsukisamu, 500);
        rates.insert(Campus::Maruyama, 500);
        rates.insert(Campus::Hokudaimae, 500);
        rates
    }

    /// Back-fill anything a partially written settings file may be missing
    /// and clamp values the period arithmetic depends on. Called by the
    /// settings repository on every load and save.
    pub fn normalize(&mut self) {
        let defaults = Self::default_campus_rates();
        for campus in Campus::ALL {
            self.campus_transport_rates
                .entry(campus)
                .or_insert_with(|| defaults[&campus]);
        }
        self.closing_day = self.closing_day.clamp(1, 28);
        if self.annual_limit <= 0 {
            self.annual_limit = 1_030_000;
        }
    }

    /// Transport rate for a campus, falling back to the global default when
    /// the map is missing an entry (it should not be after `normalize`).
    pub fn transport_rate_for(&self, campus: Campus) -> i64 {
        self.campus_transport_rates
            .get(&campus)
            .copied()
            .unwrap_or(self.transport_cost)
    }
}

/// Partial update applied to a day's entry by the upsert operation. `None`
/// fields keep the existing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkEntryUpdate {
    pub selected_blocks: Option<Vec<WorkBlock>>,
    pub support_minutes: Option<u32>,
    pub allowance_amount: Option<i64>,
    pub campus: Option<Campus>,
    pub has_transport: Option<bool>,
    /// `Some(None)` clears the per-day override; `None` leaves it alone.
    pub transport_cost: Option<Option<i64>>,
    pub leader_blocks: Option<Vec<WorkBlock>>,
    pub sub_leader_blocks: Option<Vec<WorkBlock>>,
}

/// Badge tier, ordered bronze to platinum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl BadgeTier {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeTier::Bronze => "bronze",
            BadgeTier::Silver => "silver",
            BadgeTier::Gold => "gold",
            BadgeTier::Platinum => "platinum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeKind {
    Streak,
    Earnings,
    Event,
}

impl BadgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeKind::Streak => "streak",
            BadgeKind::Earnings => "earnings",
            BadgeKind::Event => "event",
        }
    }
}

/// A derived achievement. Never persisted; recomputed on every query, with
/// deterministic ids so repeated computations are directly comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    /// Deterministic identity: "<kind>-<tier>-<index>" within a result list,
    /// or a fixed id for event badges.
    pub id: String,
    pub kind: BadgeKind,
    pub tier: BadgeTier,
    /// Translation key for the display label. String lookup is a
    /// presentation concern.
    pub label_key: String,
    pub description_key: String,
    pub icon: String,
}

/// Lifetime badge counts for profile display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTotals {
    pub streak: u32,
    pub earnings: u32,
    pub events: u32,
}

/// Derived level and experience state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub level: u32,
    pub xp: u64,
    /// Cumulative XP required to reach the next level.
    pub next_level_xp: u64,
    /// Progress toward the next level, 0..=100.
    pub progress: u32,
    pub total_earnings: i64,
    pub total_classes: u32,
    pub total_work_days: u32,
}

/// An inclusive pay-period date range aligned to the closing day:
/// `start.day == closing_day + 1` (rolled into the next month when that day
/// does not exist) and `end.day == closing_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Display label for the period, named after its end month,
    /// e.g. "August 2026 payroll".
    pub fn label(&self) -> String {
        format!("{} payroll", self.end.format("%B %Y"))
    }
}

/// Aggregate figures for one pay period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub range: PeriodRange,
    pub total_pay: i64,
    pub class_count: u32,
    /// Support minutes shown in the summary: manual minutes plus the 5-minute
    /// intra-block break per slot. Inter-block breaks are a pay detail and
    /// are not displayed.
    pub support_minutes: u32,
    pub work_day_count: u32,
    pub payment_date: NaiveDate,
}

/// Calendar-year income measured by payment date, tracked against the
/// annual ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualIncomeReport {
    pub year: i32,
    pub total_income: i64,
    pub limit: i64,
    /// Yen left under the ceiling, floored at zero.
    pub remaining: i64,
    /// Percentage of the ceiling consumed, capped at 100.
    pub progress_percent: u32,
}
