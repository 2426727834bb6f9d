use crate::data::{
    Conflict, Course, CourseId, Day, Faculty, Room, Student, TimeSlot, Timetable,
    UnscheduledItem, class_slots,
};
use crate::error::{Result, SchedulerError};
use crate::state::{ScheduleView, SchedulingState};
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Everything in the workspace, for a full JSON download.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle<'a> {
    pub courses: &'a [Course],
    pub faculty: &'a [Faculty],
    pub students: &'a [Student],
    pub rooms: &'a [Room],
    pub timetable: &'a Timetable,
    pub time_slots: &'a [TimeSlot],
    pub conflicts: &'a [Conflict],
    pub unscheduled: &'a [UnscheduledItem],
    pub export_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub total_conflicts: usize,
    pub conflicts: &'a [Conflict],
}

pub fn export_all(state: &SchedulingState, now: DateTime<Utc>) -> ExportBundle<'_> {
    ExportBundle {
        courses: &state.courses,
        faculty: &state.faculty,
        students: &state.students,
        rooms: &state.rooms,
        timetable: &state.timetable,
        time_slots: &state.time_slots,
        conflicts: &state.conflicts,
        unscheduled: &state.unscheduled,
        export_date: now,
    }
}

pub fn conflict_report(conflicts: &[Conflict], now: DateTime<Utc>) -> ConflictReport<'_> {
    ConflictReport {
        generated_at: now,
        total_conflicts: conflicts.len(),
        conflicts,
    }
}

/// The extra column each bulk export carries next to name and id.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EntityDetails<'a> {
    Faculty { department: &'a str },
    Student { courses: &'a [CourseId] },
    Room { capacity: u32 },
}

#[derive(Debug, Serialize)]
pub struct EntitySchedule<'a> {
    pub name: &'a str,
    pub id: &'a str,
    #[serde(flatten)]
    pub details: EntityDetails<'a>,
    /// The entity's timetable in the per-entity CSV layout.
    pub schedule: String,
}

/// Every faculty member's, student's or room's timetable in one document.
#[derive(Debug)]
pub struct ScheduleExport<'a> {
    pub view: ScheduleView,
    pub export_date: DateTime<Utc>,
    pub data: Vec<EntitySchedule<'a>>,
}

impl Serialize for ScheduleExport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (export_type, total_key) = match self.view {
            ScheduleView::Faculty => ("All Faculty Timetables", "totalFaculty"),
            ScheduleView::Student => ("All Student Timetables", "totalStudents"),
            ScheduleView::Room => ("All Room Timetables", "totalRooms"),
        };
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("exportType", export_type)?;
        map.serialize_entry("exportDate", &self.export_date)?;
        map.serialize_entry(total_key, &self.data.len())?;
        map.serialize_entry("data", &self.data)?;
        map.end()
    }
}

/// Renders the timetable of every entity behind `view`.
///
/// Fails when there is nobody of that kind to export.
pub fn export_all_schedules(
    state: &SchedulingState,
    view: ScheduleView,
    now: DateTime<Utc>,
) -> Result<ScheduleExport<'_>> {
    let entities: Vec<(&str, &str, EntityDetails<'_>)> = match view {
        ScheduleView::Faculty => state
            .faculty
            .iter()
            .map(|f| {
                let department = f.department.as_deref().unwrap_or("N/A");
                (f.id.as_str(), f.name.as_str(), EntityDetails::Faculty { department })
            })
            .collect(),
        ScheduleView::Student => state
            .students
            .iter()
            .map(|s| {
                let courses = s.courses.as_slice();
                (s.id.as_str(), s.name.as_str(), EntityDetails::Student { courses })
            })
            .collect(),
        ScheduleView::Room => state
            .rooms
            .iter()
            .map(|r| {
                let capacity = r.capacity;
                (r.id.as_str(), r.name.as_str(), EntityDetails::Room { capacity })
            })
            .collect(),
    };
    if entities.is_empty() {
        return Err(SchedulerError::NothingToExport(match view {
            ScheduleView::Faculty => "faculty members",
            ScheduleView::Student => "students",
            ScheduleView::Room => "rooms",
        }));
    }

    let data = entities
        .into_iter()
        .map(|(id, name, details)| -> Result<EntitySchedule<'_>> {
            let schedule = state.individual_schedule(view, id);
            Ok(EntitySchedule {
                name,
                id,
                details,
                schedule: schedule_to_csv(state, view, &schedule)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScheduleExport {
        view,
        export_date: now,
        data,
    })
}

/// Download name of a bulk export, e.g. `all-room-timetables-2026-10-19.json`.
pub fn bulk_file_name(view: ScheduleView, date: NaiveDate) -> String {
    format!("all-{view}-timetables-{}.json", date.format("%Y-%m-%d"))
}

/// Download name, e.g. `faculty-F1-timetable-2026-10-19.csv`.
pub fn csv_file_name(view: ScheduleView, entity_id: &str, date: NaiveDate) -> String {
    format!("{view}-{entity_id}-timetable-{}.csv", date.format("%Y-%m-%d"))
}

/// Flattens a schedule into rows of class slots against day columns.
///
/// Each cell reads from the point of view of `view`; several sessions in one
/// cell are joined with `"; "`.
pub fn schedule_to_csv(
    state: &SchedulingState,
    view: ScheduleView,
    schedule: &Timetable,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Time"];
    header.extend(Day::ALL.iter().map(|d| d.name()));
    writer.write_record(&header)?;

    for slot in class_slots(&state.time_slots) {
        let mut row = vec![slot.label.clone()];
        for day in Day::ALL {
            let cell = schedule
                .assignments(day, &slot.id)
                .iter()
                .filter_map(|a| {
                    let course = state.course(&a.course_id)?;
                    let room = state.room(&a.room_id).map_or("TBA", |r| r.name.as_str());
                    Some(cell_text(state, view, course, room))
                })
                .collect::<Vec<_>>()
                .join("; ");
            row.push(cell);
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn cell_text(state: &SchedulingState, view: ScheduleView, course: &Course, room: &str) -> String {
    let faculty = state
        .faculty_member(&course.faculty_id)
        .map_or(course.faculty_id.as_str(), |f| f.name.as_str());
    match view {
        ScheduleView::Faculty => format!("{} (Room: {room})", course.name),
        ScheduleView::Student => format!("{} - {faculty} (Room: {room})", course.name),
        ScheduleView::Room => format!(
            "{} - {faculty} ({} students)",
            course.name,
            course.students.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Assignment, SlotKind};
    use chrono::TimeZone;

    fn state() -> SchedulingState {
        let mut state = SchedulingState::new();
        state.time_slots = vec![
            TimeSlot::new("2", "10:00", "11:00", "Second", SlotKind::Class),
            TimeSlot::new("b", "09:50", "10:00", "Break", SlotKind::Break),
            TimeSlot::new("1", "09:00", "09:50", "First", SlotKind::Class),
        ];
        state.faculty.push(Faculty {
            id: "F1".into(),
            name: "Dr. X".into(),
            department: None,
            courses: vec![],
        });
        state.rooms.push(Room {
            id: "R1".into(),
            name: "Hall".into(),
            capacity: 30,
        });
        state.courses.push(Course {
            id: "C1".into(),
            name: "Algebra".into(),
            sessions_per_week: 2,
            faculty_id: "F1".into(),
            students: ["S1".to_string(), "S2".to_string()].into_iter().collect(),
        });
        state.timetable.place(Day::Monday, "1", Assignment::new("C1", "R1"));
        state.timetable.place(Day::Friday, "2", Assignment::new("C1", "gone"));
        state
    }

    #[test]
    fn faculty_csv_has_slot_rows_and_day_columns() {
        let state = state();
        let schedule = state.individual_schedule(ScheduleView::Faculty, "F1");
        let csv = schedule_to_csv(&state, ScheduleView::Faculty, &schedule).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "Time,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday",
                "First,Algebra (Room: Hall),,,,,",
                "Second,,,,,Algebra (Room: TBA),",
            ]
        );
    }

    #[test]
    fn student_and_room_cells_name_the_faculty() {
        let state = state();
        let csv = schedule_to_csv(&state, ScheduleView::Student, &state.timetable).unwrap();
        assert!(csv.contains("Algebra - Dr. X (Room: Hall)"));

        let csv = schedule_to_csv(&state, ScheduleView::Room, &state.timetable).unwrap();
        assert!(csv.contains("Algebra - Dr. X (2 students)"));
    }

    #[test]
    fn shared_cells_are_joined() {
        let mut state = state();
        state.timetable.place(Day::Monday, "1", Assignment::new("C1", "R1"));
        let csv = schedule_to_csv(&state, ScheduleView::Faculty, &state.timetable).unwrap();
        assert!(csv.contains("Algebra (Room: Hall); Algebra (Room: Hall)"));
    }

    #[test]
    fn bulk_faculty_export_lists_each_member_with_csv() {
        let mut state = state();
        state.faculty.push(Faculty {
            id: "F2".into(),
            name: "Dr. Y".into(),
            department: Some("Physics".into()),
            courses: vec![],
        });
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();

        let export = serde_json::to_value(
            export_all_schedules(&state, ScheduleView::Faculty, now).unwrap(),
        )
        .unwrap();
        assert_eq!(export["exportType"], "All Faculty Timetables");
        assert_eq!(export["exportDate"], "2026-10-19T08:00:00Z");
        assert_eq!(export["totalFaculty"], 2);

        let data = export["data"].as_array().unwrap();
        assert_eq!(data[0]["id"], "F1");
        assert_eq!(data[0]["name"], "Dr. X");
        assert_eq!(data[0]["department"], "N/A");
        let csv = data[0]["schedule"].as_str().unwrap();
        assert!(csv.contains("First,Algebra (Room: Hall),,,,,"));

        assert_eq!(data[1]["department"], "Physics");
        assert!(!data[1]["schedule"].as_str().unwrap().contains("Algebra"));
    }

    #[test]
    fn bulk_student_and_room_exports_carry_their_details() {
        let mut state = state();
        state.students.push(Student {
            id: "S1".into(),
            name: "Sam".into(),
            courses: vec!["C1".into()],
        });
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();

        let students = serde_json::to_value(
            export_all_schedules(&state, ScheduleView::Student, now).unwrap(),
        )
        .unwrap();
        assert_eq!(students["exportType"], "All Student Timetables");
        assert_eq!(students["totalStudents"], 1);
        assert_eq!(students["data"][0]["courses"][0], "C1");
        assert!(
            students["data"][0]["schedule"]
                .as_str()
                .unwrap()
                .contains("Algebra - Dr. X (Room: Hall)")
        );

        let rooms = serde_json::to_value(
            export_all_schedules(&state, ScheduleView::Room, now).unwrap(),
        )
        .unwrap();
        assert_eq!(rooms["totalRooms"], 1);
        assert_eq!(rooms["data"][0]["capacity"], 30);
        assert!(
            rooms["data"][0]["schedule"]
                .as_str()
                .unwrap()
                .contains("Algebra - Dr. X (2 students)")
        );
        assert_eq!(
            bulk_file_name(ScheduleView::Room, now.date_naive()),
            "all-room-timetables-2026-10-19.json"
        );
    }

    #[test]
    fn bulk_export_of_nobody_fails() {
        let state = SchedulingState::new();
        let err = export_all_schedules(&state, ScheduleView::Student, Utc::now()).unwrap_err();
        assert!(matches!(err, SchedulerError::NothingToExport("students")));
        assert_eq!(err.to_string(), "No students available to export");
    }

    #[test]
    fn reports_carry_timestamps_and_counts() {
        let state = state();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();

        let report = serde_json::to_value(conflict_report(&state.conflicts, now)).unwrap();
        assert_eq!(report["totalConflicts"], 0);
        assert_eq!(report["generatedAt"], "2026-10-19T08:00:00Z");

        let bundle = serde_json::to_value(export_all(&state, now)).unwrap();
        assert_eq!(bundle["timetable"]["Monday"]["1"][0]["courseId"], "C1");
        assert_eq!(bundle["timeSlots"].as_array().unwrap().len(), 3);
        assert!(bundle["exportDate"].is_string());

        assert_eq!(
            csv_file_name(ScheduleView::Room, "R1", now.date_naive()),
            "room-R1-timetable-2026-10-19.csv"
        );
    }
}
