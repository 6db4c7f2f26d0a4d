use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type TeacherId = u32;
pub type GroupId = u32;
pub type SubjectId = u32;
pub type RoomId = u32;

/// Fallback used when the settings leave `periods_per_day` unset.
pub const DEFAULT_PERIODS_PER_DAY: u32 = 6;

/// Default working week (Monday..Friday).
pub const DEFAULT_DAYS: u32 = 5;

/// One schedulable unit of time within the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TimeSlot {
    pub day: u32,
    pub period: u32,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} period {}", self.day, self.period)
    }
}

/// A teacher; every subject must reference exactly one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

/// A physical room. Capacity is carried for future constraints but not
/// consulted by the assignment pass.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

/// A cohort of students taught together.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub size: u32,
}

/// A subject together with its assigned teacher, if any.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub teacher_id: Option<TeacherId>,
}

/// Weekly teaching demand: this group takes this subject for this many hours.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandEntry {
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub hours_per_week: u32,
}

/// Week shape settings. `periods_per_day` falls back to
/// [`DEFAULT_PERIODS_PER_DAY`] when unset, `days` to [`DEFAULT_DAYS`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSettings {
    pub days: Option<u32>,
    pub periods_per_day: Option<u32>,
}

impl TimetableSettings {
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_DAYS)
    }

    pub fn periods_per_day(&self) -> u32 {
        self.periods_per_day.unwrap_or(DEFAULT_PERIODS_PER_DAY)
    }
}

/// The complete input for one generation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    #[serde(default)]
    pub settings: TimetableSettings,
    pub teachers: Vec<Teacher>,
    pub groups: Vec<Group>,
    pub subjects: Vec<Subject>,
    pub rooms: Vec<Room>,
    pub demands: Vec<DemandEntry>,
    /// Optional PRNG seed for reproducible runs.
    pub seed: Option<u64>,
}

/// One committed, conflict-free assignment in the final timetable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub slot: TimeSlot,
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub room_id: RoomId,
}

/// The final output of a generation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub placements: Vec<Placement>,
    pub scheduled_count: usize,
    pub message: String,
}
