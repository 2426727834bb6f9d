use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// Type aliases for clarity
pub type CourseId = String;
pub type FacultyId = String;
pub type StudentId = String;
pub type RoomId = String;
pub type SlotId = String;
pub type ConflictId = u32;
pub type UnscheduledId = u32;

/// Teaching day of the fixed weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// Every scheduling day, Monday first.
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown day '{s}'"))
    }
}

/// A course whose weekly sessions need placing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub sessions_per_week: u32,
    pub faculty_id: FacultyId,
    /// Enrolled students. Authoritative over `Student::courses`.
    #[serde(default)]
    pub students: BTreeSet<StudentId>,
}

/// A teaching staff member.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    /// Informational only; `Course::faculty_id` decides who teaches what.
    #[serde(default)]
    pub courses: Vec<CourseId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    #[serde(default)]
    pub courses: Vec<CourseId>,
}

/// Represents a physical room with a given capacity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Class,
    Break,
}

/// A period of the teaching day. Only `Class` slots can hold assignments.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub start: String,
    pub end: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: SlotKind,
}

impl TimeSlot {
    pub fn new(id: &str, start: &str, end: &str, label: &str, kind: SlotKind) -> Self {
        Self {
            id: id.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            label: label.to_string(),
            kind,
        }
    }

    pub fn is_class(&self) -> bool {
        self.kind == SlotKind::Class
    }

    /// Start time as minutes since midnight, `None` if not `HH:MM`.
    pub fn start_minutes(&self) -> Option<u32> {
        parse_time_to_minutes(&self.start)
    }
}

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let (hours, minutes) = time_str.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// The class slots of `time_slots`, ordered by start time.
///
/// Unparseable start times sort last; equal starts keep their input order.
pub fn class_slots(time_slots: &[TimeSlot]) -> Vec<&TimeSlot> {
    let mut slots: Vec<&TimeSlot> = time_slots.iter().filter(|s| s.is_class()).collect();
    slots.sort_by_key(|s| s.start_minutes().unwrap_or(u32::MAX));
    slots
}

/// The university's standard day: eight class periods around four breaks.
pub fn default_time_slots() -> Vec<TimeSlot> {
    use SlotKind::{Break, Class};
    vec![
        TimeSlot::new("1", "08:50", "09:40", "Period 1 (8:50-9:40 AM)", Class),
        TimeSlot::new("2", "09:40", "10:30", "Period 2 (9:40-10:30 AM)", Class),
        TimeSlot::new("break1", "10:30", "10:45", "Small Break", Break),
        TimeSlot::new("3", "10:45", "11:35", "Period 3 (10:45-11:35 AM)", Class),
        TimeSlot::new("4", "11:35", "11:50", "Period 4 (11:35-11:50 AM)", Class),
        TimeSlot::new("lunch1", "11:50", "12:35", "Lunch Break A", Break),
        TimeSlot::new("lunch2", "12:35", "13:20", "Lunch Break B", Break),
        TimeSlot::new("5", "13:20", "14:10", "Period 5 (1:20-2:10 PM)", Class),
        TimeSlot::new("6", "14:10", "14:30", "Period 6 (2:10-2:30 PM)", Class),
        TimeSlot::new("break2", "14:30", "14:45", "Small Break", Break),
        TimeSlot::new("7", "14:45", "15:35", "Period 7 (2:45-3:35 PM)", Class),
        TimeSlot::new("8", "15:35", "16:15", "Period 8 (3:35-4:15 PM)", Class),
    ]
}

/// Represents a single, scheduled course session in a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub course_id: CourseId,
    pub room_id: RoomId,
}

impl Assignment {
    pub fn new(course_id: &str, room_id: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            room_id: room_id.to_string(),
        }
    }
}

/// The weekly grid: day -> class slot id -> assignments in that cell.
///
/// Empty cells are never stored, so serialization only shows occupied slots.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Timetable {
    days: BTreeMap<Day, BTreeMap<SlotId, Vec<Assignment>>>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignments(&self, day: Day, slot_id: &str) -> &[Assignment] {
        self.days
            .get(&day)
            .and_then(|slots| slots.get(slot_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_free(&self, day: Day, slot_id: &str) -> bool {
        self.assignments(day, slot_id).is_empty()
    }

    /// Adds an assignment to the cell, next to any existing occupants.
    pub fn place(&mut self, day: Day, slot_id: &str, assignment: Assignment) {
        self.days
            .entry(day)
            .or_default()
            .entry(slot_id.to_string())
            .or_default()
            .push(assignment);
    }

    /// Removes the first assignment of `course_id` from the cell.
    pub fn remove(&mut self, day: Day, slot_id: &str, course_id: &str) -> Option<Assignment> {
        let slots = self.days.get_mut(&day)?;
        let cell = slots.get_mut(slot_id)?;
        let index = cell.iter().position(|a| a.course_id == course_id)?;
        let removed = cell.remove(index);
        if cell.is_empty() {
            slots.remove(slot_id);
        }
        if slots.is_empty() {
            self.days.remove(&day);
        }
        Some(removed)
    }

    /// All occupied cells as `(day, slot id, assignment)`, day order then slot id.
    pub fn iter(&self) -> impl Iterator<Item = (Day, &str, &Assignment)> + '_ {
        self.days.iter().flat_map(|(day, slots)| {
            slots.iter().flat_map(move |(slot_id, cell)| {
                cell.iter().map(move |a| (*day, slot_id.as_str(), a))
            })
        })
    }

    /// A copy of the grid holding only the assignments `keep` accepts.
    pub fn filtered<F>(&self, mut keep: F) -> Timetable
    where
        F: FnMut(&Assignment) -> bool,
    {
        let mut out = Timetable::new();
        for (day, slot_id, assignment) in self.iter() {
            if keep(assignment) {
                out.place(day, slot_id, assignment.clone());
            }
        }
        out
    }

    /// Empties `slot_id` on every day, returning what it held in day order.
    pub fn clear_slot(&mut self, slot_id: &str) -> Vec<(Day, Assignment)> {
        let mut cleared = Vec::new();
        for (day, slots) in self.days.iter_mut() {
            if let Some(cell) = slots.remove(slot_id) {
                cleared.extend(cell.into_iter().map(|a| (*day, a)));
            }
        }
        self.days.retain(|_, slots| !slots.is_empty());
        cleared
    }

    pub fn len(&self) -> usize {
        self.days.values().flat_map(|s| s.values()).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of sessions of `course_id` on the grid.
    pub fn sessions_for(&self, course_id: &str) -> usize {
        self.iter().filter(|(_, _, a)| a.course_id == course_id).count()
    }
}

/// Which kind of clash a conflict records, with the entity at fault.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictKind {
    FacultyConflict {
        faculty: String,
    },
    RoomConflict {
        room: String,
    },
    StudentConflict {
        student: String,
    },
    CapacityConflict {
        course: String,
        room: String,
        #[serde(rename = "studentCount")]
        student_count: usize,
        capacity: u32,
    },
}

impl ConflictKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ConflictKind::FacultyConflict { .. } => "faculty_conflict",
            ConflictKind::RoomConflict { .. } => "room_conflict",
            ConflictKind::StudentConflict { .. } => "student_conflict",
            ConflictKind::CapacityConflict { .. } => "capacity_conflict",
        }
    }
}

/// A clash found in the grid. Derived state: rebuilt on every detection pass.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub id: ConflictId,
    #[serde(flatten)]
    pub kind: ConflictKind,
    pub title: String,
    pub description: String,
    pub day: Day,
    pub time_slot: String,
    pub courses: Vec<String>,
    pub suggestions: Vec<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} {})",
            self.kind.tag(),
            self.description,
            self.day,
            self.time_slot
        )
    }
}

/// One session of a course the solver could not place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledItem {
    pub id: UnscheduledId,
    pub course_id: CourseId,
    pub course_name: String,
    pub faculty_id: FacultyId,
    /// Display name of the faculty member, or the raw id when unknown.
    pub faculty_name: String,
    pub reason: String,
}

/// Knobs for the scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingPreferences {
    /// Carried for compatibility; breaks are never schedulable.
    pub allow_overlapping_breaks: bool,
    /// Prefer rooms whose capacity covers the roster.
    pub strict_capacity_check: bool,
}

impl Default for SchedulingPreferences {
    fn default() -> Self {
        Self {
            allow_overlapping_breaks: false,
            strict_capacity_check: true,
        }
    }
}

/// Placed-versus-requested counts for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseReport {
    pub course_id: CourseId,
    pub requested: u32,
    pub scheduled: u32,
}

/// Totals of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub total_sessions: u32,
    pub scheduled_sessions: u32,
    /// Rounded percentage of placed sessions; 100 when nothing was requested.
    pub efficiency: u32,
    pub courses: Vec<CourseReport>,
}

/// The complete input for a stateless solve request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub courses: Vec<Course>,
    #[serde(default)]
    pub faculty: Vec<Faculty>,
    #[serde(default)]
    pub students: Vec<Student>,
    pub rooms: Vec<Room>,
    #[serde(default = "default_time_slots")]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub preferences: SchedulingPreferences,
    /// Fixes the room picks for reproducible output.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// The final output of a solve request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub timetable: Timetable,
    pub unscheduled: Vec<UnscheduledItem>,
    pub conflicts: Vec<Conflict>,
    pub summary: GenerationSummary,
}
