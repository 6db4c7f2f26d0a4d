use crate::data::{
    DemandEntry, Group, GroupId, Placement, Room, RoomId, Subject, SubjectId, TeacherId, TimeSlot,
    TimetableInput, TimetableOutput,
};
use crate::store::PlacementStore;
use itertools::iproduct;
use log::{info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use thiserror::Error;

/// Everything that can stop a generation run before or after the greedy pass.
///
/// Precondition failures are raised before any placement is attempted and
/// before the store is touched, so they never need cleanup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("invalid timetable configuration: {0}")]
    Configuration(String),
    #[error("subject '{subject}' has no teacher assigned (group {group})")]
    MissingTeacher { subject: String, group: String },
    #[error("no timeslots available")]
    NoSlots,
    #[error("no rooms found, please add at least one room")]
    NoRooms,
    #[error("no group-subject mappings found, add subjects and groups first")]
    NoLessons,
    #[error(
        "could not generate a timetable, try adding more rooms or teachers, or reducing weekly hours"
    )]
    ZeroPlacements,
    #[error("failed to replace stored timetable: {0}")]
    Storage(String),
}

/// One atomic hour of teaching demand, expanded from a weekly-hours count.
/// Instances from the same demand entry are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson {
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
}

/// Builds the full (day, period) slot pool for the configured week shape.
///
/// Pure, so repeated calls with the same configuration yield the same pool
/// and can never introduce duplicates.
pub fn build_slot_pool(days: u32, periods_per_day: u32) -> Result<Vec<TimeSlot>, GenerateError> {
    if days == 0 {
        return Err(GenerateError::Configuration(
            "week must have at least one day".to_string(),
        ));
    }
    if periods_per_day == 0 {
        return Err(GenerateError::Configuration(
            "periods per day must be at least 1".to_string(),
        ));
    }
    Ok(iproduct!(0..days, 1..=periods_per_day)
        .map(|(day, period)| TimeSlot { day, period })
        .collect())
}

/// Expands group-subject demand into one [`Lesson`] per weekly hour.
///
/// A subject with no teacher aborts the whole expansion; nothing partial is
/// ever returned.
pub fn expand_demands(
    demands: &[DemandEntry],
    groups: &[Group],
    subjects: &[Subject],
) -> Result<Vec<Lesson>, GenerateError> {
    let group_map: HashMap<GroupId, &Group> = groups.iter().map(|g| (g.id, g)).collect();
    let subject_map: HashMap<SubjectId, &Subject> = subjects.iter().map(|s| (s.id, s)).collect();

    let mut lessons = Vec::new();
    for demand in demands {
        let group = group_map.get(&demand.group_id).ok_or_else(|| {
            GenerateError::Configuration(format!("demand references unknown group {}", demand.group_id))
        })?;
        let subject = subject_map.get(&demand.subject_id).ok_or_else(|| {
            GenerateError::Configuration(format!(
                "demand references unknown subject {}",
                demand.subject_id
            ))
        })?;
        let teacher_id = subject.teacher_id.ok_or_else(|| GenerateError::MissingTeacher {
            subject: subject.name.clone(),
            group: group.name.clone(),
        })?;
        for _ in 0..demand.hours_per_week {
            lessons.push(Lesson {
                group_id: group.id,
                subject_id: subject.id,
                teacher_id,
            });
        }
    }

    if lessons.is_empty() {
        return Err(GenerateError::NoLessons);
    }
    Ok(lessons)
}

/// Per-slot bookkeeping of which groups, teachers and rooms are already
/// committed. Owned by exactly one run and threaded through it by `&mut`,
/// which keeps the check-then-commit pair free of interleaving.
pub struct ConflictTracker {
    slot_groups: HashMap<TimeSlot, HashSet<GroupId>>,
    slot_teachers: HashMap<TimeSlot, HashSet<TeacherId>>,
    slot_rooms: HashMap<TimeSlot, HashSet<RoomId>>,
}

impl ConflictTracker {
    pub fn new(slots: &[TimeSlot]) -> Self {
        Self {
            slot_groups: slots.iter().map(|&s| (s, HashSet::new())).collect(),
            slot_teachers: slots.iter().map(|&s| (s, HashSet::new())).collect(),
            slot_rooms: slots.iter().map(|&s| (s, HashSet::new())).collect(),
        }
    }

    /// True iff none of group, teacher and room are already booked in `slot`.
    pub fn can_place(
        &self,
        slot: TimeSlot,
        group: GroupId,
        teacher: TeacherId,
        room: RoomId,
    ) -> bool {
        !self.slot_groups.get(&slot).is_some_and(|s| s.contains(&group))
            && !self.slot_teachers.get(&slot).is_some_and(|s| s.contains(&teacher))
            && !self.slot_rooms.get(&slot).is_some_and(|s| s.contains(&room))
    }

    /// Books all three identifiers into `slot`. Must follow a successful
    /// [`ConflictTracker::can_place`] with the same arguments.
    pub fn commit(&mut self, slot: TimeSlot, group: GroupId, teacher: TeacherId, room: RoomId) {
        self.slot_groups.entry(slot).or_default().insert(group);
        self.slot_teachers.entry(slot).or_default().insert(teacher);
        self.slot_rooms.entry(slot).or_default().insert(room);
    }
}

/// The greedy first-fit pass.
///
/// Shuffles the lesson order once, then re-shuffles slots per lesson and
/// rooms per slot so repeated runs spread unavoidable drops across different
/// lessons instead of always starving the same ones. A lesson for which no
/// conflict-free (slot, room) pair exists is dropped without error; the
/// output is guaranteed conflict-free but not complete.
pub fn assign<R: Rng>(
    lessons: &[Lesson],
    slots: &[TimeSlot],
    rooms: &[Room],
    rng: &mut R,
) -> Result<Vec<Placement>, GenerateError> {
    if slots.is_empty() {
        return Err(GenerateError::NoSlots);
    }
    if rooms.is_empty() {
        return Err(GenerateError::NoRooms);
    }
    if lessons.is_empty() {
        return Err(GenerateError::NoLessons);
    }

    let mut lessons: Vec<Lesson> = lessons.to_vec();
    let mut slots: Vec<TimeSlot> = slots.to_vec();
    let mut room_ids: Vec<RoomId> = rooms.iter().map(|r| r.id).collect();
    lessons.shuffle(rng);

    let mut tracker = ConflictTracker::new(&slots);
    let mut placements = Vec::with_capacity(lessons.len());

    for lesson in &lessons {
        slots.shuffle(rng);
        'slot_search: for &slot in &slots {
            room_ids.shuffle(rng);
            for &room_id in &room_ids {
                if tracker.can_place(slot, lesson.group_id, lesson.teacher_id, room_id) {
                    placements.push(Placement {
                        slot,
                        group_id: lesson.group_id,
                        subject_id: lesson.subject_id,
                        teacher_id: lesson.teacher_id,
                        room_id,
                    });
                    tracker.commit(slot, lesson.group_id, lesson.teacher_id, room_id);
                    break 'slot_search;
                }
            }
        }
    }

    trace!(
        "Greedy pass placed {} of {} lessons across {} slots and {} rooms.",
        placements.len(),
        lessons.len(),
        slots.len(),
        room_ids.len()
    );
    Ok(placements)
}

/// Runs one full generation: slot pool, demand expansion, greedy pass and
/// the atomic replacement of the stored solution.
///
/// Any error leaves the store exactly as it was; only a run with at least
/// one placement ever reaches [`PlacementStore::replace`].
pub fn run(
    input: &TimetableInput,
    store: &mut PlacementStore,
) -> Result<TimetableOutput, GenerateError> {
    let start_time = Instant::now();
    let days = input.settings.days();
    let periods_per_day = input.settings.periods_per_day();

    let slots = build_slot_pool(days, periods_per_day)?;
    let lessons = expand_demands(&input.demands, &input.groups, &input.subjects)?;

    info!(
        "Generating timetable for {} lessons over {} slots ({} days x {} periods) and {} rooms...",
        lessons.len(),
        slots.len(),
        days,
        periods_per_day,
        input.rooms.len()
    );

    let mut rng = match input.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let placements = assign(&lessons, &slots, &input.rooms, &mut rng)?;

    if placements.is_empty() {
        return Err(GenerateError::ZeroPlacements);
    }

    store.replace(placements.clone())?;

    let scheduled_count = placements.len();
    info!(
        "Timetable generated with {} scheduled periods in {:.2?}.",
        scheduled_count,
        start_time.elapsed()
    );
    Ok(TimetableOutput {
        placements,
        scheduled_count,
        message: format!(
            "Timetable generated successfully with {} scheduled periods ({} per day).",
            scheduled_count, periods_per_day
        ),
    })
}
