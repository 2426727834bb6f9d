use crate::data::{
    Assignment, Course, CourseReport, Day, GenerationSummary, Room, SchedulingPreferences,
    TimeSlot, Timetable, UnscheduledId, UnscheduledItem,
};
use log::{debug, info, trace, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Instant;

pub const NO_SLOT_REASON: &str = "No suitable slot found";

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct Generated {
    pub timetable: Timetable,
    pub unscheduled: Vec<UnscheduledItem>,
    pub summary: GenerationSummary,
}

/// Places every course's weekly sessions on a fresh grid.
///
/// Courses are handled one at a time in input order, each session claiming the
/// first free `(day, slot)` cell with days outermost and `class_slots` in the
/// given order. The room is drawn uniformly from the course's suitable rooms
/// using `rng`, so two runs may differ unless the caller seeds it. Only cell
/// exclusivity is enforced here; faculty, room, student and capacity clashes
/// are left for the conflict pass.
pub fn generate<R: Rng + ?Sized>(
    courses: &[Course],
    rooms: &[Room],
    days: &[Day],
    class_slots: &[&TimeSlot],
    preferences: &SchedulingPreferences,
    rng: &mut R,
) -> Generated {
    let start_time = Instant::now();
    info!(
        "Generating timetable for {} courses, {} rooms, {} days x {} class slots...",
        courses.len(),
        rooms.len(),
        days.len(),
        class_slots.len()
    );

    let mut timetable = Timetable::new();
    let mut unscheduled = Vec::new();
    let mut reports = Vec::with_capacity(courses.len());
    let mut next_id: UnscheduledId = 1;

    for course in courses {
        let suitable = suitable_rooms(course, rooms, preferences);
        trace!(
            "Course {} has {} suitable rooms for {} students",
            course.id,
            suitable.len(),
            course.students.len()
        );

        let mut scheduled = 0;
        for _ in 0..course.sessions_per_week {
            if place_session(course, &suitable, days, class_slots, &mut timetable, rng) {
                scheduled += 1;
            } else {
                unscheduled.push(UnscheduledItem {
                    id: next_id,
                    course_id: course.id.clone(),
                    course_name: course.name.clone(),
                    faculty_id: course.faculty_id.clone(),
                    faculty_name: course.faculty_id.clone(),
                    reason: NO_SLOT_REASON.to_string(),
                });
                next_id += 1;
            }
        }

        if scheduled < course.sessions_per_week {
            debug!(
                "Course {} placed {}/{} sessions",
                course.id, scheduled, course.sessions_per_week
            );
        }
        reports.push(CourseReport {
            course_id: course.id.clone(),
            requested: course.sessions_per_week,
            scheduled,
        });
    }

    let summary = summarize(reports);
    info!(
        "Scheduled {}/{} sessions ({}%) in {:.2?}",
        summary.scheduled_sessions,
        summary.total_sessions,
        summary.efficiency,
        start_time.elapsed()
    );

    Generated {
        timetable,
        unscheduled,
        summary,
    }
}

/// Rooms big enough for the roster, or every room when none is.
///
/// Capacity is advisory: it narrows the choice but never blocks a course.
pub fn suitable_rooms<'a>(
    course: &Course,
    rooms: &'a [Room],
    preferences: &SchedulingPreferences,
) -> Vec<&'a Room> {
    let student_count = course.students.len();
    let suitable: Vec<&Room> = rooms
        .iter()
        .filter(|room| {
            !preferences.strict_capacity_check || room.capacity as usize >= student_count
        })
        .collect();

    if suitable.is_empty() {
        rooms.iter().collect()
    } else {
        suitable
    }
}

// claims the first free cell; false when the grid is full or there is no room to pick
fn place_session<R: Rng + ?Sized>(
    course: &Course,
    suitable: &[&Room],
    days: &[Day],
    class_slots: &[&TimeSlot],
    timetable: &mut Timetable,
    rng: &mut R,
) -> bool {
    for &day in days {
        for slot in class_slots {
            if !timetable.is_free(day, &slot.id) {
                continue;
            }
            let Some(room) = suitable.choose(rng) else {
                warn!("No rooms available for course {}", course.id);
                return false;
            };
            trace!("{} -> {} {} in {}", course.id, day, slot.id, room.id);
            timetable.place(day, &slot.id, Assignment::new(&course.id, &room.id));
            return true;
        }
    }
    false
}

fn summarize(courses: Vec<CourseReport>) -> GenerationSummary {
    let total_sessions = courses.iter().fold(0u32, |n, c| n.saturating_add(c.requested));
    let scheduled_sessions = courses.iter().fold(0u32, |n, c| n.saturating_add(c.scheduled));
    let efficiency = if total_sessions > 0 {
        (f64::from(scheduled_sessions) / f64::from(total_sessions) * 100.0).round() as u32
    } else {
        100
    };
    GenerationSummary {
        total_sessions,
        scheduled_sessions,
        efficiency,
        courses,
    }
}
