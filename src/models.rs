use chrono::{DateTime, Utc};
use serde::Serialize;

/// A student account. The password hash never leaves `db.rs`, so the
/// domain struct simply doesn't carry it.
#[derive(Serialize, Debug, Clone)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub schoolname: String,
    pub classofstudy: String,
    pub score: i64,
    pub xp: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbStudent {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub schoolname: Option<String>,
    pub classofstudy: Option<String>,
    pub score: Option<i64>,
    pub xp: Option<i64>,
}

impl From<DbStudent> for Student {
    fn from(student: DbStudent) -> Self {
        Self {
            id: student.id.unwrap_or_default(),
            name: student.name.unwrap_or_default(),
            age: student.age.unwrap_or_default(),
            schoolname: student.schoolname.unwrap_or_default(),
            classofstudy: student.classofstudy.unwrap_or_default(),
            score: student.score.unwrap_or_default(),
            xp: student.xp.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub schoolname: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeacher {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub schoolname: Option<String>,
}

impl From<DbTeacher> for Teacher {
    fn from(teacher: DbTeacher) -> Self {
        Self {
            id: teacher.id.unwrap_or_default(),
            name: teacher.name.unwrap_or_default(),
            email: teacher.email.unwrap_or_default(),
            schoolname: teacher.schoolname.unwrap_or_default(),
        }
    }
}

/// An uploaded assignment's metadata. `teacher_name` is free text, not a
/// reference to a teachers row.
#[derive(Serialize, Debug, Clone)]
pub struct Assignment {
    pub id: i64,
    pub subject: String,
    pub filename: String,
    pub teacher_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAssignment {
    pub id: Option<i64>,
    pub subject: Option<String>,
    pub filename: Option<String>,
    pub teacher_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<DbAssignment> for Assignment {
    fn from(assignment: DbAssignment) -> Self {
        Self {
            id: assignment.id.unwrap_or_default(),
            subject: assignment.subject.unwrap_or_default(),
            filename: assignment.filename.unwrap_or_default(),
            teacher_name: assignment.teacher_name.unwrap_or_default(),
            timestamp: assignment.timestamp.unwrap_or_else(Utc::now),
        }
    }
}
