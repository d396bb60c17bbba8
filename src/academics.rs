use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::PortalError,
    models::{Course, GradedCourse, NewLeaveRequest, NewReevaluationRequest, SemesterRecord},
};

/// Letter grades and their points, best first.
pub const GRADE_SCALE: [(&str, u8); 9] = [
    ("A+", 10),
    ("A", 9),
    ("A-", 8),
    ("B+", 7),
    ("B", 6),
    ("B-", 5),
    ("C", 4),
    ("P", 3),
    ("F", 0),
];

/// Grade for courses that are still running. Never counted.
pub const IN_PROGRESS: &str = "IP";

pub const EXAM_TYPES: [&str; 5] = ["Mid Semester", "End Semester", "Quiz 1", "Quiz 2", "Lab Exam"];

/// Minimum attendance percentage before a student is warned.
pub const ATTENDANCE_THRESHOLD: f64 = 75.0;

pub const MIN_LEAVE_REASON: usize = 10;
pub const MIN_REEVALUATION_REASON: usize = 20;

/// Points for a letter grade. `None` for `IP` and anything unrecognized.
pub fn grade_points(grade: &str) -> Option<u8> {
    GRADE_SCALE
        .iter()
        .find(|(letter, _)| *letter == grade)
        .map(|(_, points)| *points)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Credits and credit-weighted points of the courses that carry a grade.
fn weighted<'a>(courses: impl IntoIterator<Item = &'a GradedCourse>) -> (u32, u32) {
    courses
        .into_iter()
        .filter_map(|course| grade_points(&course.grade).map(|points| (course.credits as u32, points as u32)))
        .fold((0, 0), |(credits, total), (c, p)| (credits + c, total + c * p))
}

fn average((credits, points): (u32, u32)) -> f64 {
    if credits == 0 {
        0.0
    } else {
        round2(points as f64 / credits as f64)
    }
}

/// Credit-weighted grade average of one semester, rounded to two decimals.
pub fn sgpa(courses: &[GradedCourse]) -> f64 {
    average(weighted(courses))
}

/// Credit-weighted grade average across every graded course.
pub fn cgpa(semesters: &[SemesterRecord]) -> f64 {
    average(weighted(semesters.iter().flat_map(|s| s.courses.iter())))
}

/// Expected CGPA after the running semester, capped at 10.
pub fn projected_cgpa(cgpa: f64) -> f64 {
    round2((cgpa + 0.2).min(10.0))
}

/// Letter standing shown next to the CGPA.
pub fn standing(cgpa: f64) -> &'static str {
    match cgpa {
        c if c >= 9.0 => "A+",
        c if c >= 8.0 => "A",
        c if c >= 7.0 => "B+",
        c if c >= 6.0 => "B",
        _ => "C",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GradeScaleEntry {
    pub grade: String,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SemesterSummary {
    pub semester: u8,
    pub sgpa: f64,
    /// Credits of graded courses only.
    pub credits: u32,
    pub in_progress: bool,
    pub courses: Vec<GradedCourse>,
}

/// CgpaSummary
///
/// Output schema for `GET /cgpa` and the CGPA calculator view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CgpaSummary {
    pub cgpa: f64,
    pub projected_cgpa: f64,
    pub standing: String,
    pub credits_earned: u32,
    pub courses_completed: u32,
    pub semesters: Vec<SemesterSummary>,
    pub grade_scale: Vec<GradeScaleEntry>,
}

pub fn summarize(records: &[SemesterRecord]) -> CgpaSummary {
    let cgpa = cgpa(records);
    let semesters = records
        .iter()
        .map(|record| {
            let (credits, _) = weighted(&record.courses);
            SemesterSummary {
                semester: record.semester,
                sgpa: sgpa(&record.courses),
                credits,
                in_progress: record.courses.iter().any(|c| c.grade == IN_PROGRESS),
                courses: record.courses.clone(),
            }
        })
        .collect::<Vec<_>>();

    CgpaSummary {
        cgpa,
        projected_cgpa: projected_cgpa(cgpa),
        standing: standing(cgpa).to_string(),
        credits_earned: semesters.iter().map(|s| s.credits).sum(),
        courses_completed: records
            .iter()
            .flat_map(|r| r.courses.iter())
            .filter(|c| grade_points(&c.grade).is_some())
            .count() as u32,
        semesters,
        grade_scale: GRADE_SCALE
            .iter()
            .map(|(grade, points)| GradeScaleEntry {
                grade: grade.to_string(),
                points: *points,
            })
            .collect(),
    }
}

// --- Leave Requests ---

/// Inclusive number of days between two dates.
pub fn leave_duration(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days() + 1
}

/// validate_leave
///
/// Checks a leave draft against `today` and returns its duration in days.
pub fn validate_leave(draft: &NewLeaveRequest, today: NaiveDate) -> Result<i64, PortalError> {
    if draft.from_date < today {
        return Err(PortalError::Validation(
            "leave cannot start in the past".to_string(),
        ));
    }
    if draft.to_date < draft.from_date {
        return Err(PortalError::Validation(
            "leave must end on or after its start date".to_string(),
        ));
    }
    if draft.reason.trim().chars().count() < MIN_LEAVE_REASON {
        return Err(PortalError::Validation(format!(
            "reason must be at least {MIN_LEAVE_REASON} characters"
        )));
    }
    Ok(leave_duration(draft.from_date, draft.to_date))
}

// --- Re-evaluation Requests ---

/// validate_reevaluation
///
/// Returns the course the request refers to, which must be one of `courses`.
pub fn validate_reevaluation<'a>(
    draft: &NewReevaluationRequest,
    courses: &'a [Course],
) -> Result<&'a Course, PortalError> {
    let course = courses
        .iter()
        .find(|course| course.id == draft.course_id)
        .ok_or_else(|| PortalError::Validation(format!("{} is not one of your courses", draft.course_id)))?;

    if !EXAM_TYPES.contains(&draft.exam_type.as_str()) {
        return Err(PortalError::Validation(format!(
            "unknown exam type: {}",
            draft.exam_type
        )));
    }
    if draft.reason.trim().chars().count() < MIN_REEVALUATION_REASON {
        return Err(PortalError::Validation(format!(
            "reason must be at least {MIN_REEVALUATION_REASON} characters"
        )));
    }
    Ok(course)
}

/// Sequential ids such as `LEV003`, numbered after the existing count.
pub fn next_id(prefix: &str, existing: usize) -> String {
    format!("{prefix}{:03}", existing + 1)
}

pub fn below_threshold(attendance: f64) -> bool {
    attendance < ATTENDANCE_THRESHOLD
}
