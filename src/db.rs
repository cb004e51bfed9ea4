use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{Assignment, DbAssignment, DbStudent, DbTeacher, Student, Teacher};

// Password column is deliberately excluded; hashes only ever surface in
// the authenticate_* functions.
const STUDENT_COLUMNS: &str = "id, name, age, schoolname, classofstudy, score, xp";
const TEACHER_COLUMNS: &str = "id, name, email, schoolname";

#[derive(sqlx::FromRow)]
struct CredentialRow {
    password: Option<String>,
}

#[instrument(skip(pool))]
pub async fn find_student_by_name(
    pool: &Pool<Sqlite>,
    name: &str,
) -> Result<Option<Student>, AppError> {
    info!("Looking up student by name");
    let row = sqlx::query_as::<_, DbStudent>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE name = ?"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Student::from))
}

#[instrument(skip(pool))]
pub async fn get_student_by_name(pool: &Pool<Sqlite>, name: &str) -> Result<Student, AppError> {
    match find_student_by_name(pool, name).await? {
        Some(student) => Ok(student),
        _ => Err(AppError::NotFound("User not found".to_string())),
    }
}

#[instrument(skip_all, fields(name))]
pub async fn create_student(
    pool: &Pool<Sqlite>,
    name: &str,
    age: i64,
    schoolname: &str,
    classofstudy: &str,
    password: &str,
) -> Result<Student, AppError> {
    info!("Creating new student");

    if find_student_by_name(pool, name).await?.is_some() {
        return Err(AppError::Validation("Username already exists".to_string()));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    sqlx::query(
        "INSERT INTO students (name, age, schoolname, classofstudy, password)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(age)
    .bind(schoolname)
    .bind(classofstudy)
    .bind(&hashed_password)
    .execute(pool)
    .await?;

    get_student_by_name(pool, name).await
}

#[instrument(skip_all, fields(name))]
pub async fn authenticate_student(
    pool: &Pool<Sqlite>,
    name: &str,
    password: &str,
) -> Result<Option<Student>, AppError> {
    info!("Authenticating student");
    let row = sqlx::query_as::<_, CredentialRow>("SELECT password FROM students WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    let valid = match row.and_then(|r| r.password) {
        Some(hash) => bcrypt::verify(password, &hash).unwrap_or(false),
        _ => false,
    };

    if valid {
        Ok(Some(get_student_by_name(pool, name).await?))
    } else {
        Ok(None)
    }
}

#[instrument(skip(pool))]
pub async fn update_student_age(
    pool: &Pool<Sqlite>,
    student_id: i64,
    age: i64,
) -> Result<(), AppError> {
    info!("Updating student age");
    sqlx::query("UPDATE students SET age = ? WHERE id = ?")
        .bind(age)
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn update_student_school(
    pool: &Pool<Sqlite>,
    student_id: i64,
    schoolname: &str,
) -> Result<(), AppError> {
    info!("Updating student school");
    sqlx::query("UPDATE students SET schoolname = ? WHERE id = ?")
        .bind(schoolname)
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn update_student_class(
    pool: &Pool<Sqlite>,
    student_id: i64,
    classofstudy: &str,
) -> Result<(), AppError> {
    info!("Updating student class of study");
    sqlx::query("UPDATE students SET classofstudy = ? WHERE id = ?")
        .bind(classofstudy)
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip_all, fields(student_id))]
pub async fn update_student_password(
    pool: &Pool<Sqlite>,
    student_id: i64,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating student password");
    let hashed_password = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;

    sqlx::query("UPDATE students SET password = ? WHERE id = ?")
        .bind(hashed_password)
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Adds a signed delta to the student's score. No floor or ceiling.
#[instrument(skip(pool))]
pub async fn add_to_student_score(
    pool: &Pool<Sqlite>,
    student_id: i64,
    delta: i64,
) -> Result<(), AppError> {
    info!("Updating student score");
    sqlx::query("UPDATE students SET score = score + ? WHERE id = ?")
        .bind(delta)
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_leaderboard(pool: &Pool<Sqlite>) -> Result<Vec<Student>, AppError> {
    info!("Fetching leaderboard");
    let rows = sqlx::query_as::<_, DbStudent>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students ORDER BY score DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Student::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_students_by_school(
    pool: &Pool<Sqlite>,
    schoolname: &str,
) -> Result<Vec<Student>, AppError> {
    info!("Fetching students by school");
    let rows = sqlx::query_as::<_, DbStudent>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE schoolname = ?"
    ))
    .bind(schoolname)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Student::from).collect())
}

#[instrument(skip(pool))]
pub async fn find_teacher_by_email(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<Teacher>, AppError> {
    info!("Looking up teacher by email");
    let row = sqlx::query_as::<_, DbTeacher>(&format!(
        "SELECT {TEACHER_COLUMNS} FROM teachers WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Teacher::from))
}

#[instrument(skip(pool))]
pub async fn get_teacher_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Teacher, AppError> {
    match find_teacher_by_email(pool, email).await? {
        Some(teacher) => Ok(teacher),
        _ => Err(AppError::NotFound("Teacher not found".to_string())),
    }
}

#[instrument(skip_all, fields(email))]
pub async fn create_teacher(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    schoolname: &str,
    password: &str,
) -> Result<Teacher, AppError> {
    info!("Creating new teacher");

    if find_teacher_by_email(pool, email).await?.is_some() {
        return Err(AppError::Validation("Email already exists".to_string()));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    sqlx::query(
        "INSERT INTO teachers (name, email, schoolname, password)
         VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(schoolname)
    .bind(&hashed_password)
    .execute(pool)
    .await?;

    get_teacher_by_email(pool, email).await
}

#[instrument(skip_all, fields(email))]
pub async fn authenticate_teacher(
    pool: &Pool<Sqlite>,
    email: &str,
    password: &str,
) -> Result<Option<Teacher>, AppError> {
    info!("Authenticating teacher");
    let row = sqlx::query_as::<_, CredentialRow>("SELECT password FROM teachers WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    let valid = match row.and_then(|r| r.password) {
        Some(hash) => bcrypt::verify(password, &hash).unwrap_or(false),
        _ => false,
    };

    if valid {
        Ok(Some(get_teacher_by_email(pool, email).await?))
    } else {
        Ok(None)
    }
}

#[instrument(skip(pool))]
pub async fn create_assignment(
    pool: &Pool<Sqlite>,
    subject: &str,
    filename: &str,
    teacher_name: &str,
) -> Result<Assignment, AppError> {
    info!("Recording assignment upload");
    let now: DateTime<Utc> = Utc::now();

    let res = sqlx::query(
        "INSERT INTO assignments (subject, filename, teacher_name, timestamp)
         VALUES (?, ?, ?, ?)",
    )
    .bind(subject)
    .bind(filename)
    .bind(teacher_name)
    .bind(now)
    .execute(pool)
    .await?;

    let id = res.last_insert_rowid();

    let row = sqlx::query_as::<_, DbAssignment>("SELECT * FROM assignments WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(Assignment::from(row))
}

#[instrument(skip(pool))]
pub async fn get_assignments_newest_first(
    pool: &Pool<Sqlite>,
) -> Result<Vec<Assignment>, AppError> {
    info!("Fetching assignments");
    let rows =
        sqlx::query_as::<_, DbAssignment>("SELECT * FROM assignments ORDER BY timestamp DESC")
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(Assignment::from).collect())
}
