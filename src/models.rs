//! Normalized domain records produced by the response parsers.
//!
//! Everything here is a request-scoped value type: built fresh from one
//! upstream payload, serialized to the UI, never stored. Field names are
//! the stable contract the frontend codes against, independent of the
//! Spanish wire names Educamos uses (see [`crate::educamos::models`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An enrollment context: the class a student belongs to for one school year.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentClass {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub education_level_school_id: String,
    pub education_stage_id: i64,
}

/// A grading term/window (trimester, semester) within a class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPeriod {
    pub id: String,
    pub name: String,
    pub class_id: String,
    pub school_level_id: String,
    pub evaluation_type_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub is_selected: bool,
    pub is_active: bool,
}

/// One subject's headline grade within an evaluation period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEvaluation {
    pub subject_id: String,
    pub subject_name: String,
    pub short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    pub max_grade: f64,
    pub is_passed: bool,
    pub grade_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A single gradable sub-item (assignment, exam) under a subject.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGrade {
    pub id: String,
    pub name: String,
    pub short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    pub is_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A subject plus its sub-grades and their computed mean.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDetail {
    pub id: String,
    pub name: String,
    pub short_name: String,
    /// Arithmetic mean of the defined sub-grades; `None` when none are graded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_grade: Option<f64>,
    pub is_passed: bool,
    pub grades: Vec<SubGrade>,
}

/// One timetable slot within a school week.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: String,
    pub subject_name: String,
    pub subject_short_name: String,
    pub class_name: String,
    pub class_short_name: String,
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u8,
    /// `HH:MM`.
    pub start_time: String,
    pub end_time: String,
    pub start_date: String,
    pub end_date: String,
    pub is_break: bool,
    pub has_exam: bool,
    pub has_tasks: bool,
    pub has_incidences: bool,
    pub session_id: String,
}

/// A school week's worth of [`ScheduleEvent`]s, sorted by (day, start time).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSchedule {
    pub week_start: String,
    pub week_end: String,
    pub events: Vec<ScheduleEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Submitted,
}

/// A homework/assignment row from the task grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub subject: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub due_date: String,
    pub status: TaskStatus,
    pub is_unread: bool,
}

/// Free-text task fields, best-effort parsed from the detail popup HTML.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub title: String,
    pub description: String,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// An attendance/behavior incident row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub date: String,
    pub time: String,
    pub subject_name: String,
    pub class_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub subject_comment: String,
    pub day_comment: String,
    pub justification: String,
    pub full_date: NaiveDate,
}

/// A school circular (downloadable notice) row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Circular {
    pub id: String,
    pub circular_id: String,
    pub date: String,
    pub subject: String,
    pub is_bold: bool,
    pub full_date: NaiveDate,
}

/// A bulletin-board announcement row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub date: String,
    pub category: String,
    pub is_new: bool,
}

/// Full announcement body plus optional attachment link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementDetail {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
}

/// A home-screen unread counter, mapped to a known category name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub kind: i64,
    pub count: i64,
    pub name: String,
    pub show: bool,
}

/// A recent grade/notification mark from the header bell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadMark {
    pub id: String,
    pub date: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
}

/// School/session metadata scraped from the context bootstrap script.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    pub cdn_url: String,
    pub school_name: String,
    pub logo: String,
    pub variant: String,
    pub role_base: String,
    pub role_school_id: String,
    pub calendar_id: String,
    pub culture: String,
    pub person_id: String,
    pub person_language_id: String,
}

/// Display name and avatar, scraped from the profile dropdown.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub avatar: String,
}

/// A classmate birthday entry (today / tomorrow / upcoming).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Birthday {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// A task attached to one timetable session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTask {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub seen: bool,
}
