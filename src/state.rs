//! The scheduling workspace: entity lists, the grid and its derived state.
//!
//! `SchedulingState` owns everything the solver and the conflict pass read.
//! Conflicts and unscheduled sessions are snapshots of the current grid and
//! are rebuilt wholesale; every grid mutation re-runs detection.

use crate::conflicts;
use crate::data::{
    Assignment, Conflict, ConflictId, ConflictKind, Course, Day, Faculty, GenerationSummary,
    Room, SchedulingInput, SchedulingPreferences, Student, TimeSlot, Timetable, UnscheduledId,
    UnscheduledItem, class_slots, default_time_slots,
};
use crate::error::{Result, SchedulerError};
use crate::solver;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SLOT_REMOVED_REASON: &str = "Time slot no longer available";

/// Whether an upsert added a new entity or replaced one with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Upsert {
    Created,
    Updated,
}

/// Whose timetable to cut out of the master grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleView {
    Faculty,
    Student,
    Room,
}

impl fmt::Display for ScheduleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScheduleView::Faculty => "faculty",
            ScheduleView::Student => "student",
            ScheduleView::Room => "room",
        })
    }
}

impl FromStr for ScheduleView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "faculty" => Ok(ScheduleView::Faculty),
            "student" => Ok(ScheduleView::Student),
            "room" => Ok(ScheduleView::Room),
            other => Err(format!("unknown view '{other}'")),
        }
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub courses: usize,
    pub faculty: usize,
    pub students: usize,
    pub rooms: usize,
    pub conflicts: usize,
    pub unscheduled: usize,
    /// Rounded share of requested sessions not left unscheduled; 0 with no sessions.
    pub scheduled_percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    pub courses: Vec<Course>,
    pub faculty: Vec<Faculty>,
    pub students: Vec<Student>,
    pub rooms: Vec<Room>,
    pub time_slots: Vec<TimeSlot>,
    pub preferences: SchedulingPreferences,
    pub timetable: Timetable,
    pub conflicts: Vec<Conflict>,
    pub unscheduled: Vec<UnscheduledItem>,
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self::new()
    }
}

// replace-by-id or append
fn upsert_by_id<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) -> Upsert {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(index) => {
            items[index] = item;
            Upsert::Updated
        }
        None => {
            items.push(item);
            Upsert::Created
        }
    }
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    entity: &'static str,
    target: &str,
    id: impl Fn(&T) -> &str,
) -> Result<T> {
    let index = items
        .iter()
        .position(|item| id(item) == target)
        .ok_or_else(|| SchedulerError::not_found(entity, target))?;
    Ok(items.remove(index))
}

fn faculty_display_name(faculty: &[Faculty], id: &str) -> String {
    faculty
        .iter()
        .find(|f| f.id == id)
        .map_or_else(|| id.to_string(), |f| f.name.clone())
}

fn require(entity: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SchedulerError::invalid(entity, format!("{field} is required")));
    }
    Ok(())
}

impl SchedulingState {
    /// An empty workspace with the default day layout.
    pub fn new() -> Self {
        Self {
            courses: Vec::new(),
            faculty: Vec::new(),
            students: Vec::new(),
            rooms: Vec::new(),
            time_slots: default_time_slots(),
            preferences: SchedulingPreferences::default(),
            timetable: Timetable::new(),
            conflicts: Vec::new(),
            unscheduled: Vec::new(),
        }
    }

    /// Builds a workspace from a solve request, validating each entity like the upserts do.
    ///
    /// Time slots go in first so courses are checked against the week they
    /// will be placed into.
    pub fn from_input(input: SchedulingInput) -> Result<Self> {
        let mut state = Self {
            time_slots: Vec::new(),
            preferences: input.preferences,
            ..Self::new()
        };
        for slot in input.time_slots {
            state.upsert_time_slot(slot)?;
        }
        for faculty in input.faculty {
            state.upsert_faculty(faculty)?;
        }
        for student in input.students {
            state.upsert_student(student)?;
        }
        for room in input.rooms {
            state.upsert_room(room)?;
        }
        for course in input.courses {
            state.upsert_course(course)?;
        }
        Ok(state)
    }

    /// One session per class cell of the week.
    pub fn max_sessions_per_week(&self) -> u32 {
        let cells = Day::ALL.len() * class_slots(&self.time_slots).len();
        u32::try_from(cells).unwrap_or(u32::MAX)
    }

    pub fn upsert_course(&mut self, course: Course) -> Result<Upsert> {
        require("course", "Course ID", &course.id)?;
        require("course", "Course Name", &course.name)?;
        require("course", "Faculty", &course.faculty_id)?;
        let max = self.max_sessions_per_week();
        if course.sessions_per_week == 0 || course.sessions_per_week > max {
            return Err(SchedulerError::invalid(
                "course",
                format!("sessions per week must be between 1 and {max}"),
            ));
        }
        Ok(upsert_by_id(&mut self.courses, course, |c| c.id.as_str()))
    }

    pub fn upsert_faculty(&mut self, faculty: Faculty) -> Result<Upsert> {
        require("faculty", "Faculty ID", &faculty.id)?;
        require("faculty", "Faculty Name", &faculty.name)?;
        Ok(upsert_by_id(&mut self.faculty, faculty, |f| f.id.as_str()))
    }

    pub fn upsert_student(&mut self, student: Student) -> Result<Upsert> {
        require("student", "Student ID", &student.id)?;
        require("student", "Student Name", &student.name)?;
        Ok(upsert_by_id(&mut self.students, student, |s| s.id.as_str()))
    }

    pub fn upsert_room(&mut self, room: Room) -> Result<Upsert> {
        require("room", "Room ID", &room.id)?;
        require("room", "Room Name", &room.name)?;
        if room.capacity == 0 {
            return Err(SchedulerError::invalid("room", "capacity must be at least 1"));
        }
        Ok(upsert_by_id(&mut self.rooms, room, |r| r.id.as_str()))
    }

    pub fn upsert_time_slot(&mut self, slot: TimeSlot) -> Result<Upsert> {
        require("time slot", "Time Slot ID", &slot.id)?;
        require("time slot", "Label", &slot.label)?;
        let id = slot.id.clone();
        let is_class = slot.is_class();
        let result = upsert_by_id(&mut self.time_slots, slot, |s| s.id.as_str());
        if !is_class {
            self.vacate_slot(&id);
        }
        Ok(result)
    }

    pub fn delete_course(&mut self, id: &str) -> Result<Course> {
        remove_by_id(&mut self.courses, "course", id, |c| c.id.as_str())
    }

    pub fn delete_faculty(&mut self, id: &str) -> Result<Faculty> {
        remove_by_id(&mut self.faculty, "faculty", id, |f| f.id.as_str())
    }

    pub fn delete_student(&mut self, id: &str) -> Result<Student> {
        remove_by_id(&mut self.students, "student", id, |s| s.id.as_str())
    }

    pub fn delete_room(&mut self, id: &str) -> Result<Room> {
        remove_by_id(&mut self.rooms, "room", id, |r| r.id.as_str())
    }

    pub fn delete_time_slot(&mut self, id: &str) -> Result<TimeSlot> {
        let removed = remove_by_id(&mut self.time_slots, "time slot", id, |s| s.id.as_str())?;
        self.vacate_slot(id);
        Ok(removed)
    }

    /// Moves every session held in `slot_id` to the unscheduled list and rescans.
    ///
    /// Sessions of courses that no longer exist are dropped.
    fn vacate_slot(&mut self, slot_id: &str) {
        let evicted = self.timetable.clear_slot(slot_id);
        if evicted.is_empty() {
            return;
        }
        info!(
            "Time slot {slot_id} no longer takes classes, unscheduling {} sessions",
            evicted.len()
        );

        let mut next_id: UnscheduledId = self.unscheduled.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let mut items = Vec::with_capacity(evicted.len());
        for (day, assignment) in evicted {
            let Some(course) = self.course(&assignment.course_id) else {
                debug!("Dropping orphaned {} on {day} {slot_id}", assignment.course_id);
                continue;
            };
            items.push(UnscheduledItem {
                id: next_id,
                course_id: course.id.clone(),
                course_name: course.name.clone(),
                faculty_id: course.faculty_id.clone(),
                faculty_name: faculty_display_name(&self.faculty, &course.faculty_id),
                reason: SLOT_REMOVED_REASON.to_string(),
            });
            next_id += 1;
        }
        self.unscheduled.extend(items);
        self.scan_conflicts();
    }

    pub fn set_preferences(&mut self, preferences: SchedulingPreferences) {
        self.preferences = preferences;
    }

    /// Checks there is something to schedule, in the order courses, faculty, rooms.
    pub fn validate_for_generation(&self) -> Result<()> {
        if self.courses.is_empty() {
            return Err(SchedulerError::NoCourses);
        }
        if self.faculty.is_empty() {
            return Err(SchedulerError::NoFaculty);
        }
        if self.rooms.is_empty() {
            return Err(SchedulerError::NoRooms);
        }
        Ok(())
    }

    /// Rebuilds the grid from scratch, then the unscheduled and conflict lists.
    pub fn generate_timetable<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<GenerationSummary> {
        self.validate_for_generation()?;

        let slots = class_slots(&self.time_slots);
        let generated = solver::generate(
            &self.courses,
            &self.rooms,
            &Day::ALL,
            &slots,
            &self.preferences,
            rng,
        );

        self.timetable = generated.timetable;
        self.unscheduled = generated.unscheduled;
        for item in &mut self.unscheduled {
            item.faculty_name = faculty_display_name(&self.faculty, &item.faculty_id);
        }
        self.scan_conflicts();
        Ok(generated.summary)
    }

    /// Regenerates after the user asks to retry unscheduled sessions.
    pub fn retry_scheduling<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<GenerationSummary> {
        info!("Retrying scheduling ({} unscheduled)", self.unscheduled.len());
        self.generate_timetable(rng)
    }

    /// Replaces the conflict list with a fresh detection pass.
    pub fn scan_conflicts(&mut self) -> &[Conflict] {
        self.conflicts = conflicts::detect(
            &self.timetable,
            &self.courses,
            &self.faculty,
            &self.students,
            &self.rooms,
            &self.time_slots,
        );
        &self.conflicts
    }

    /// Placeholder resolution: counts room conflicts and rescans. The grid is untouched.
    pub fn auto_resolve_conflicts(&mut self) -> usize {
        let resolved = self
            .conflicts
            .iter()
            .filter(|c| matches!(c.kind, ConflictKind::RoomConflict { .. }))
            .count();
        self.scan_conflicts();
        info!("Auto-resolved {resolved} conflicts");
        resolved
    }

    pub fn resolve_conflict(&mut self, id: ConflictId) -> Result<Conflict> {
        let conflict = self.take_conflict(id)?;
        debug!("Resolved conflict {id}: {conflict}");
        Ok(conflict)
    }

    pub fn ignore_conflict(&mut self, id: ConflictId) -> Result<Conflict> {
        let conflict = self.take_conflict(id)?;
        debug!("Ignored conflict {id}: {conflict}");
        Ok(conflict)
    }

    fn take_conflict(&mut self, id: ConflictId) -> Result<Conflict> {
        let index = self
            .conflicts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SchedulerError::not_found("conflict", id.to_string()))?;
        Ok(self.conflicts.remove(index))
    }

    /// Drops one session from the unscheduled list.
    pub fn dismiss_unscheduled(&mut self, id: UnscheduledId) -> Result<UnscheduledItem> {
        let index = self
            .unscheduled
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| SchedulerError::not_found("unscheduled session", id.to_string()))?;
        Ok(self.unscheduled.remove(index))
    }

    /// Deletes one assignment from a cell and rescans.
    pub fn remove_assignment(&mut self, day: Day, slot_id: &str, course_id: &str) -> Result<Assignment> {
        let removed = self
            .timetable
            .remove(day, slot_id, course_id)
            .ok_or_else(|| {
                SchedulerError::not_found("assignment", format!("{course_id} on {day} {slot_id}"))
            })?;
        self.scan_conflicts();
        Ok(removed)
    }

    /// Manually adds an assignment, sharing the cell with any occupants, and rescans.
    pub fn place_assignment(&mut self, day: Day, slot_id: &str, assignment: Assignment) -> Result<()> {
        if !self.time_slots.iter().any(|s| s.id == slot_id && s.is_class()) {
            return Err(SchedulerError::NotAClassSlot(slot_id.to_string()));
        }
        if !self.courses.iter().any(|c| c.id == assignment.course_id) {
            return Err(SchedulerError::not_found("course", assignment.course_id));
        }
        self.timetable.place(day, slot_id, assignment);
        self.scan_conflicts();
        Ok(())
    }

    /// The part of the grid that concerns one faculty member, student or room.
    pub fn individual_schedule(&self, view: ScheduleView, entity_id: &str) -> Timetable {
        match view {
            ScheduleView::Faculty => self.timetable.filtered(|a| {
                self.course(&a.course_id)
                    .is_some_and(|c| c.faculty_id == entity_id)
            }),
            ScheduleView::Student => self.timetable.filtered(|a| {
                self.course(&a.course_id)
                    .is_some_and(|c| c.students.contains(entity_id))
            }),
            ScheduleView::Room => self.timetable.filtered(|a| a.room_id == entity_id),
        }
    }

    /// Display name of the entity behind a view, if it exists.
    pub fn entity_name(&self, view: ScheduleView, entity_id: &str) -> Option<&str> {
        match view {
            ScheduleView::Faculty => self.faculty_member(entity_id).map(|f| f.name.as_str()),
            ScheduleView::Student => self
                .students
                .iter()
                .find(|s| s.id == entity_id)
                .map(|s| s.name.as_str()),
            ScheduleView::Room => self.room(entity_id).map(|r| r.name.as_str()),
        }
    }

    pub fn dashboard(&self) -> DashboardStats {
        let total: usize = self.courses.iter().map(|c| c.sessions_per_week as usize).sum();
        let scheduled = total.saturating_sub(self.unscheduled.len());
        let scheduled_percentage = if total > 0 {
            (scheduled as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };
        DashboardStats {
            courses: self.courses.len(),
            faculty: self.faculty.len(),
            students: self.students.len(),
            rooms: self.rooms.len(),
            conflicts: self.conflicts.len(),
            unscheduled: self.unscheduled.len(),
            scheduled_percentage,
        }
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn faculty_member(&self, id: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.id == id)
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SlotKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn course(id: &str, sessions: u32, faculty: &str, roster: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            name: format!("Course {id}"),
            sessions_per_week: sessions,
            faculty_id: faculty.to_string(),
            students: roster.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn seeded_state() -> SchedulingState {
        let mut state = SchedulingState::new();
        state
            .upsert_faculty(Faculty {
                id: "F1".into(),
                name: "Dr. X".into(),
                department: Some("Math".into()),
                courses: vec![],
            })
            .unwrap();
        state
            .upsert_student(Student {
                id: "S1".into(),
                name: "Sam".into(),
                courses: vec!["C1".into()],
            })
            .unwrap();
        state
            .upsert_room(Room {
                id: "R1".into(),
                name: "Hall".into(),
                capacity: 30,
            })
            .unwrap();
        state.upsert_course(course("C1", 2, "F1", &["S1"])).unwrap();
        state
    }

    #[test]
    fn upsert_replaces_matching_id() {
        let mut state = seeded_state();
        let updated = state.upsert_course(course("C1", 3, "F1", &[])).unwrap();
        assert_eq!(updated, Upsert::Updated);
        assert_eq!(state.courses.len(), 1);
        assert_eq!(state.courses[0].sessions_per_week, 3);

        let created = state.upsert_course(course("C2", 1, "F1", &[])).unwrap();
        assert_eq!(created, Upsert::Created);
        assert_eq!(state.courses.len(), 2);
    }

    #[test]
    fn upsert_validates_required_fields() {
        let mut state = SchedulingState::new();
        let err = state.upsert_course(course("C1", 1, "", &[])).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidEntity { entity: "course", .. }));
        assert!(state.upsert_course(course("C1", 0, "F1", &[])).is_err());
        assert!(
            state
                .upsert_room(Room {
                    id: "R1".into(),
                    name: " ".into(),
                    capacity: 10
                })
                .is_err()
        );
        assert!(state.courses.is_empty() && state.rooms.is_empty());
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let mut state = seeded_state();
        assert!(matches!(
            state.delete_room("R9"),
            Err(SchedulerError::NotFound { entity: "room", .. })
        ));
        assert_eq!(state.delete_room("R1").unwrap().name, "Hall");
        assert!(state.rooms.is_empty());
    }

    #[test]
    fn generation_requires_courses_faculty_and_rooms() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = SchedulingState::new();
        assert!(matches!(
            state.generate_timetable(&mut rng),
            Err(SchedulerError::NoCourses)
        ));

        state.upsert_course(course("C1", 1, "F1", &[])).unwrap();
        assert!(matches!(
            state.validate_for_generation(),
            Err(SchedulerError::NoFaculty)
        ));

        let mut state = seeded_state();
        state.delete_room("R1").unwrap();
        assert!(matches!(
            state.validate_for_generation(),
            Err(SchedulerError::NoRooms)
        ));
    }

    #[test]
    fn generate_replaces_previous_grid_and_detects() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = seeded_state();
        state
            .place_assignment(Day::Saturday, "8", Assignment::new("C1", "R1"))
            .unwrap();

        let summary = state.generate_timetable(&mut rng).unwrap();
        assert_eq!(summary.scheduled_sessions, 2);
        assert_eq!(state.timetable.len(), 2);
        assert!(state.timetable.is_free(Day::Saturday, "8"));
        assert!(state.unscheduled.is_empty());
        assert!(state.conflicts.is_empty());
        assert_eq!(state.dashboard().scheduled_percentage, 100);
    }

    #[test]
    fn manual_double_booking_is_detected_and_removable() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = seeded_state();
        state.upsert_course(course("C2", 1, "F1", &["S1"])).unwrap();
        state.generate_timetable(&mut rng).unwrap();
        assert!(state.conflicts.is_empty());

        state
            .place_assignment(Day::Monday, "1", Assignment::new("C2", "R1"))
            .unwrap();
        let tags: Vec<&str> = state.conflicts.iter().map(|c| c.kind.tag()).collect();
        assert_eq!(tags, ["faculty_conflict", "room_conflict", "student_conflict"]);

        let auto = state.auto_resolve_conflicts();
        assert_eq!(auto, 1);
        assert_eq!(state.conflicts.len(), 3);

        state.remove_assignment(Day::Monday, "1", "C2").unwrap();
        assert!(state.conflicts.is_empty());
        assert!(state.remove_assignment(Day::Monday, "1", "C2").is_err());
    }

    #[test]
    fn placing_into_a_break_is_rejected() {
        let mut state = seeded_state();
        let err = state
            .place_assignment(Day::Monday, "lunch1", Assignment::new("C1", "R1"))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::NotAClassSlot(slot) if slot == "lunch1"));
        assert!(state.timetable.is_empty());
    }

    #[test]
    fn conflicts_are_resolved_by_id_not_position() {
        let mut state = seeded_state();
        state.upsert_course(course("C2", 1, "F1", &["S1"])).unwrap();
        state
            .place_assignment(Day::Monday, "1", Assignment::new("C1", "R1"))
            .unwrap();
        state
            .place_assignment(Day::Monday, "1", Assignment::new("C2", "R1"))
            .unwrap();
        assert_eq!(state.conflicts.len(), 3);

        let ignored = state.ignore_conflict(2).unwrap();
        assert_eq!(ignored.kind.tag(), "room_conflict");
        let resolved = state.resolve_conflict(3).unwrap();
        assert_eq!(resolved.kind.tag(), "student_conflict");
        assert!(state.resolve_conflict(2).is_err());
        assert_eq!(state.conflicts.len(), 1);
        assert_eq!(state.conflicts[0].id, 1);
    }

    #[test]
    fn unscheduled_sessions_can_be_dismissed_and_retried() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = seeded_state();
        state.time_slots = vec![TimeSlot::new("only", "09:00", "10:00", "Only", SlotKind::Class)];
        state.upsert_course(course("C2", 6, "F1", &[])).unwrap();

        state.generate_timetable(&mut rng).unwrap();
        assert_eq!(state.timetable.len(), 6);
        assert_eq!(state.unscheduled.len(), 2);
        assert_eq!(state.dashboard().scheduled_percentage, 75);

        let first = state.unscheduled[0].id;
        state.dismiss_unscheduled(first).unwrap();
        assert_eq!(state.unscheduled.len(), 1);
        assert!(state.dismiss_unscheduled(first).is_err());

        state.retry_scheduling(&mut rng).unwrap();
        assert_eq!(state.unscheduled.len(), 2);
    }

    #[test]
    fn turning_an_occupied_slot_into_a_break_unschedules_its_sessions() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = seeded_state();
        state.upsert_course(course("C1", 1, "F1", &["S1", "S2"])).unwrap();
        state
            .upsert_room(Room {
                id: "R1".into(),
                name: "Hall".into(),
                capacity: 1,
            })
            .unwrap();
        state.generate_timetable(&mut rng).unwrap();
        assert_eq!(state.timetable.assignments(Day::Monday, "1").len(), 1);
        assert_eq!(state.conflicts.len(), 1);

        let slot = TimeSlot::new("1", "08:50", "09:40", "Period 1", SlotKind::Break);
        assert_eq!(state.upsert_time_slot(slot).unwrap(), Upsert::Updated);

        assert!(state.timetable.is_empty());
        assert!(state.conflicts.is_empty());
        assert_eq!(state.unscheduled.len(), 1);
        let item = &state.unscheduled[0];
        assert_eq!(item.course_id, "C1");
        assert_eq!(item.faculty_name, "Dr. X");
        assert_eq!(item.reason, SLOT_REMOVED_REASON);
        assert_eq!(state.dashboard().scheduled_percentage, 0);
    }

    #[test]
    fn deleting_an_occupied_slot_unschedules_its_sessions() {
        let mut state = seeded_state();
        state
            .place_assignment(Day::Monday, "3", Assignment::new("C1", "R1"))
            .unwrap();
        state
            .place_assignment(Day::Thursday, "3", Assignment::new("C1", "R1"))
            .unwrap();
        state
            .place_assignment(Day::Thursday, "4", Assignment::new("C1", "R1"))
            .unwrap();

        assert_eq!(state.delete_time_slot("3").unwrap().id, "3");
        assert_eq!(state.timetable.len(), 1);
        let ids: Vec<UnscheduledId> = state.unscheduled.iter().map(|u| u.id).collect();
        assert_eq!(ids, [1, 2]);

        state.delete_time_slot("4").unwrap();
        assert!(state.timetable.is_empty());
        assert_eq!(state.unscheduled.last().map(|u| u.id), Some(3));

        let kept = state.upsert_time_slot(TimeSlot::new("5", "13:00", "13:50", "P5", SlotKind::Class));
        assert_eq!(kept.unwrap(), Upsert::Updated);
        assert_eq!(state.unscheduled.len(), 3);
    }

    #[test]
    fn sessions_per_week_are_capped_by_the_week() {
        let mut state = SchedulingState::new();
        assert_eq!(state.max_sessions_per_week(), 48);
        assert!(state.upsert_course(course("C1", 48, "F1", &[])).is_ok());
        let err = state.upsert_course(course("C2", 49, "F1", &[])).unwrap_err();
        assert!(err.to_string().contains("between 1 and 48"));

        state.time_slots.clear();
        assert_eq!(state.max_sessions_per_week(), 0);
        assert!(state.upsert_course(course("C3", 1, "F1", &[])).is_err());
    }

    #[test]
    fn solve_input_is_validated_like_upserts() {
        let input = |courses: Vec<Course>, capacity: u32| SchedulingInput {
            courses,
            faculty: vec![],
            students: vec![],
            rooms: vec![Room {
                id: "R1".into(),
                name: "Hall".into(),
                capacity,
            }],
            time_slots: vec![TimeSlot::new("p1", "09:00", "10:00", "P1", SlotKind::Class)],
            preferences: SchedulingPreferences::default(),
            seed: None,
        };

        let state = SchedulingState::from_input(input(vec![course("C1", 6, "F1", &[])], 10)).unwrap();
        assert_eq!(state.time_slots.len(), 1);
        assert_eq!(state.courses.len(), 1);

        for bad in [
            input(vec![course("", 1, "F1", &[])], 10),
            input(vec![course("C1", 0, "F1", &[])], 10),
            input(vec![course("C1", 7, "F1", &[])], 10),
            input(vec![course("C1", 1, " ", &[])], 10),
            input(vec![course("C1", 1, "F1", &[])], 0),
        ] {
            assert!(matches!(
                SchedulingState::from_input(bad),
                Err(SchedulerError::InvalidEntity { .. })
            ));
        }
    }

    #[test]
    fn unscheduled_items_name_their_faculty() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = seeded_state();
        state.time_slots = vec![TimeSlot::new("only", "09:00", "10:00", "Only", SlotKind::Class)];
        state.courses.clear();
        state.upsert_course(course("C1", 6, "F1", &[])).unwrap();
        state.upsert_course(course("C2", 1, "F9", &[])).unwrap();

        state.generate_timetable(&mut rng).unwrap();
        assert_eq!(state.unscheduled.len(), 1);
        assert_eq!(state.unscheduled[0].faculty_id, "F9");
        assert_eq!(state.unscheduled[0].faculty_name, "F9");

        state.upsert_course(course("C1", 1, "F1", &[])).unwrap();
        state.upsert_course(course("C2", 6, "F1", &[])).unwrap();
        state.generate_timetable(&mut rng).unwrap();
        assert_eq!(state.unscheduled[0].faculty_name, "Dr. X");
    }

    #[test]
    fn individual_schedules_filter_the_grid() {
        let mut state = seeded_state();
        state.upsert_course(course("C2", 1, "F2", &[])).unwrap();
        state
            .upsert_room(Room {
                id: "R2".into(),
                name: "Lab".into(),
                capacity: 10,
            })
            .unwrap();
        state
            .place_assignment(Day::Monday, "1", Assignment::new("C1", "R1"))
            .unwrap();
        state
            .place_assignment(Day::Tuesday, "2", Assignment::new("C2", "R2"))
            .unwrap();

        assert_eq!(state.individual_schedule(ScheduleView::Faculty, "F1").len(), 1);
        assert_eq!(state.individual_schedule(ScheduleView::Student, "S1").len(), 1);
        let lab = state.individual_schedule(ScheduleView::Room, "R2");
        assert_eq!(lab.assignments(Day::Tuesday, "2")[0].course_id, "C2");
        assert!(state.individual_schedule(ScheduleView::Faculty, "nobody").is_empty());
        assert_eq!(state.entity_name(ScheduleView::Room, "R2"), Some("Lab"));
    }

    #[test]
    fn dashboard_is_zero_without_sessions() {
        let stats = SchedulingState::new().dashboard();
        assert_eq!(stats.scheduled_percentage, 0);
        assert_eq!(stats.courses, 0);
    }

    #[test]
    fn view_parses_from_path_segment() {
        assert_eq!("Faculty".parse::<ScheduleView>(), Ok(ScheduleView::Faculty));
        assert!("lecturer".parse::<ScheduleView>().is_err());
    }
}
