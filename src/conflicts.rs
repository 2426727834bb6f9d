//! Conflict detection over a generated grid.
//!
//! Four independent passes (faculty, room, student, capacity) scan every
//! class cell, days first then slots by start time. Within a cell,
//! assignments are grouped by the shared resource and any group of two or
//! more is a clash. Capacity is checked per assignment.

use crate::data::{
    Assignment, Conflict, ConflictId, ConflictKind, Course, Day, Faculty, Room, Student,
    TimeSlot, Timetable, class_slots,
};
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashMap;

const FACULTY_SUGGESTIONS: [&str; 3] = [
    "Reschedule one of the conflicting courses",
    "Assign a different faculty member",
    "Split the courses into different time slots",
];
const ROOM_SUGGESTIONS: [&str; 3] = [
    "Assign different rooms to conflicting courses",
    "Reschedule one course to a different time",
    "Check if courses can be combined",
];
const STUDENT_SUGGESTIONS: [&str; 3] = [
    "Reschedule one of the conflicting courses",
    "Remove student from one course",
    "Create separate sections for the course",
];
const CAPACITY_SUGGESTIONS: [&str; 3] = [
    "Assign a larger room",
    "Split the course into multiple sections",
    "Reduce the number of enrolled students",
];

/// Everything a detection pass looks things up in.
struct Lookup<'a> {
    courses: HashMap<&'a str, &'a Course>,
    faculty: HashMap<&'a str, &'a Faculty>,
    students: HashMap<&'a str, &'a Student>,
    rooms: HashMap<&'a str, &'a Room>,
}

impl Lookup<'_> {
    fn course_name<'s>(&'s self, assignment: &'s Assignment) -> &'s str {
        self.courses
            .get(assignment.course_id.as_str())
            .map_or(assignment.course_id.as_str(), |c| c.name.as_str())
    }

    fn faculty_name<'s>(&'s self, id: &'s str) -> &'s str {
        self.faculty.get(id).map_or(id, |f| f.name.as_str())
    }

    fn student_name<'s>(&'s self, id: &'s str) -> &'s str {
        self.students.get(id).map_or(id, |s| s.name.as_str())
    }

    fn room_name<'s>(&'s self, id: &'s str) -> &'s str {
        self.rooms.get(id).map_or(id, |r| r.name.as_str())
    }
}

/// Collects conflicts in pass order and numbers them.
struct Collector {
    conflicts: Vec<Conflict>,
    next_id: ConflictId,
}

impl Collector {
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: ConflictKind,
        title: &str,
        description: String,
        day: Day,
        slot: &TimeSlot,
        courses: Vec<String>,
        suggestions: &[&str],
    ) {
        self.conflicts.push(Conflict {
            id: self.next_id,
            kind,
            title: title.to_string(),
            description,
            day,
            time_slot: slot.label.clone(),
            courses,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        });
        self.next_id += 1;
    }
}

/// Scans the grid for faculty, room, student and capacity conflicts.
///
/// Pure: the result is a fresh list, identical for an unchanged grid.
/// Dangling course, faculty, student or room ids fall back to the raw id
/// for display; a capacity check needs both course and room to exist.
pub fn detect(
    timetable: &Timetable,
    courses: &[Course],
    faculty: &[Faculty],
    students: &[Student],
    rooms: &[Room],
    time_slots: &[TimeSlot],
) -> Vec<Conflict> {
    let lookup = Lookup {
        courses: courses.iter().map(|c| (c.id.as_str(), c)).collect(),
        faculty: faculty.iter().map(|f| (f.id.as_str(), f)).collect(),
        students: students.iter().map(|s| (s.id.as_str(), s)).collect(),
        rooms: rooms.iter().map(|r| (r.id.as_str(), r)).collect(),
    };
    let slots = class_slots(time_slots);
    let mut out = Collector {
        conflicts: Vec::new(),
        next_id: 1,
    };

    let passes: [fn(&Lookup, Day, &TimeSlot, &[Assignment], &mut Collector); 4] = [
        faculty_conflicts,
        room_conflicts,
        student_conflicts,
        capacity_conflicts,
    ];
    for pass in passes {
        for day in Day::ALL {
            for slot in &slots {
                let cell = timetable.assignments(day, &slot.id);
                if !cell.is_empty() {
                    pass(&lookup, day, slot, cell, &mut out);
                }
            }
        }
    }

    info!("Detected {} conflicts", out.conflicts.len());
    out.conflicts
}

fn faculty_conflicts(
    lookup: &Lookup,
    day: Day,
    slot: &TimeSlot,
    cell: &[Assignment],
    out: &mut Collector,
) {
    let by_faculty = cell
        .iter()
        .filter_map(|a| lookup.courses.get(a.course_id.as_str()))
        .filter(|c| !c.faculty_id.is_empty())
        .map(|c| (c.faculty_id.as_str(), c.name.clone()))
        .into_group_map();

    for (faculty_id, names) in by_faculty.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        if names.len() < 2 {
            continue;
        }
        let name = lookup.faculty_name(faculty_id);
        debug!("Faculty {} double booked on {} {}", faculty_id, day, slot.id);
        out.push(
            ConflictKind::FacultyConflict {
                faculty: name.to_string(),
            },
            "Faculty Double Booking",
            format!("{name} is scheduled for multiple courses at the same time"),
            day,
            slot,
            names,
            &FACULTY_SUGGESTIONS,
        );
    }
}

fn room_conflicts(
    lookup: &Lookup,
    day: Day,
    slot: &TimeSlot,
    cell: &[Assignment],
    out: &mut Collector,
) {
    let by_room = cell
        .iter()
        .filter(|a| !a.room_id.is_empty())
        .map(|a| (a.room_id.as_str(), lookup.course_name(a).to_string()))
        .into_group_map();

    for (room_id, names) in by_room.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        if names.len() < 2 {
            continue;
        }
        let name = lookup.room_name(room_id);
        debug!("Room {} double booked on {} {}", room_id, day, slot.id);
        out.push(
            ConflictKind::RoomConflict {
                room: name.to_string(),
            },
            "Room Double Booking",
            format!("{name} is booked for multiple courses simultaneously"),
            day,
            slot,
            names,
            &ROOM_SUGGESTIONS,
        );
    }
}

fn student_conflicts(
    lookup: &Lookup,
    day: Day,
    slot: &TimeSlot,
    cell: &[Assignment],
    out: &mut Collector,
) {
    let by_student = cell
        .iter()
        .filter_map(|a| lookup.courses.get(a.course_id.as_str()))
        .flat_map(|c| c.students.iter().map(move |s| (s.as_str(), c.name.clone())))
        .into_group_map();

    for (student_id, names) in by_student.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        if names.len() < 2 {
            continue;
        }
        let name = lookup.student_name(student_id);
        out.push(
            ConflictKind::StudentConflict {
                student: name.to_string(),
            },
            "Student Schedule Conflict",
            format!("{name} has overlapping courses"),
            day,
            slot,
            names,
            &STUDENT_SUGGESTIONS,
        );
    }
}

fn capacity_conflicts(
    lookup: &Lookup,
    day: Day,
    slot: &TimeSlot,
    cell: &[Assignment],
    out: &mut Collector,
) {
    for assignment in cell {
        let (Some(course), Some(room)) = (
            lookup.courses.get(assignment.course_id.as_str()),
            lookup.rooms.get(assignment.room_id.as_str()),
        ) else {
            continue;
        };
        let student_count = course.students.len();
        if student_count <= room.capacity as usize {
            continue;
        }
        out.push(
            ConflictKind::CapacityConflict {
                course: course.name.clone(),
                room: room.name.clone(),
                student_count,
                capacity: room.capacity,
            },
            "Room Capacity Exceeded",
            format!(
                "{} has {} students but {} capacity is {}",
                course.name, student_count, room.name, room.capacity
            ),
            day,
            slot,
            vec![course.name.clone()],
            &CAPACITY_SUGGESTIONS,
        );
    }
}
