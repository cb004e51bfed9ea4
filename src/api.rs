use rocket::Request;
use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::db::{
    add_to_student_score, authenticate_student, authenticate_teacher, create_assignment,
    create_student, create_teacher, get_assignments_newest_first, get_leaderboard,
    get_student_by_name, get_students_by_school, get_teacher_by_email, update_student_age,
    update_student_class, update_student_password, update_student_school,
};
use crate::error::{AppError, ErrorBody};
use crate::models::{Assignment, Student, Teacher};
use crate::storage::{UploadDir, store_upload};

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentData {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub schoolname: String,
    pub classofstudy: String,
    pub score: i64,
    pub xp: i64,
}

impl From<Student> for StudentData {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            age: student.age,
            schoolname: student.schoolname,
            classofstudy: student.classofstudy,
            score: student.score,
            xp: student.xp,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TeacherData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub schoolname: String,
}

impl From<Teacher> for TeacherData {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            email: teacher.email,
            schoolname: teacher.schoolname,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AssignmentData {
    pub id: i64,
    pub subject: String,
    pub teacher_name: String,
    pub date: String,
    pub url: String,
}

impl From<Assignment> for AssignmentData {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            subject: assignment.subject,
            teacher_name: assignment.teacher_name,
            date: assignment.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            url: format!("/uploads/{}", assignment.filename),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct StudentResponse {
    pub message: String,
    pub student: StudentData,
}

#[derive(Serialize, Deserialize)]
pub struct TeacherResponse {
    pub message: String,
    pub teacher: TeacherData,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct DashboardResponse {
    pub teacher: TeacherData,
    pub total_students: usize,
    pub students: Vec<StudentData>,
}

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub assignment: AssignmentData,
}

#[get("/")]
pub fn home() -> &'static str {
    "AlgoPlay Backend Running"
}

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    name: String,
    #[validate(range(min = 1, max = 150, message = "must be a plausible age"))]
    age: i64,
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    schoolname: String,
    #[validate(length(min = 1, max = 30, message = "must be 1-30 characters"))]
    classofstudy: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    password: String,
}

#[post("/Signup", data = "<signup>")]
pub async fn api_signup(
    signup: Json<SignupRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<StudentResponse>>, AppError> {
    signup.validate()?;

    let student = create_student(
        db,
        &signup.name,
        signup.age,
        &signup.schoolname,
        &signup.classofstudy,
        &signup.password,
    )
    .await?;

    Ok(Custom(
        Status::Created,
        Json(StudentResponse {
            message: "Signup successful".to_string(),
            student: student.into(),
        }),
    ))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    /// The student's name doubles as the login identifier.
    identifier: String,
    password: String,
}

#[post("/Login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<StudentResponse>, AppError> {
    match authenticate_student(db, &login.identifier, &login.password).await? {
        Some(student) => Ok(Json(StudentResponse {
            message: "Login successful".to_string(),
            student: student.into(),
        })),
        _ => Err(AppError::Authentication(
            "Invalid student credentials".to_string(),
        )),
    }
}

#[derive(Deserialize, Validate)]
pub struct TeacherSignupRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    name: String,
    #[validate(email(message = "must be a valid email address"))]
    email: String,
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    schoolname: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    password: String,
}

#[post("/TeacherSignup", data = "<signup>")]
pub async fn api_teacher_signup(
    signup: Json<TeacherSignupRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<MessageResponse>>, AppError> {
    signup.validate()?;

    create_teacher(
        db,
        &signup.name,
        &signup.email,
        &signup.schoolname,
        &signup.password,
    )
    .await?;

    Ok(Custom(
        Status::Created,
        Json(MessageResponse {
            message: "Signup successful".to_string(),
        }),
    ))
}

#[derive(Deserialize, Validate)]
pub struct TeacherLoginRequest {
    email: String,
    password: String,
}

#[post("/TeacherLogin", data = "<login>")]
pub async fn api_teacher_login(
    login: Json<TeacherLoginRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<TeacherResponse>, AppError> {
    match authenticate_teacher(db, &login.email, &login.password).await? {
        Some(teacher) => Ok(Json(TeacherResponse {
            message: "Login successful".to_string(),
            teacher: teacher.into(),
        })),
        _ => Err(AppError::Authentication(
            "Invalid teacher credentials".to_string(),
        )),
    }
}

#[get("/teacher/dashboard?<email>")]
pub async fn api_teacher_dashboard(
    email: Option<String>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<DashboardResponse>, AppError> {
    let email =
        email.ok_or_else(|| AppError::Validation("Teacher email required".to_string()))?;

    let teacher = get_teacher_by_email(db, &email).await?;
    let students = get_students_by_school(db, &teacher.schoolname).await?;
    let total_students = students.len();

    Ok(Json(DashboardResponse {
        teacher: teacher.into(),
        total_students,
        students: students.into_iter().map(StudentData::from).collect(),
    }))
}

#[derive(FromForm)]
pub struct AssignWorkForm<'f> {
    subject: String,
    teacher_name: Option<String>,
    assignment_file: Option<TempFile<'f>>,
}

#[post("/assign_work", data = "<form>")]
pub async fn api_assign_work(
    form: Form<AssignWorkForm<'_>>,
    db: &State<Pool<Sqlite>>,
    uploads: &State<UploadDir>,
) -> Result<Custom<Json<UploadResponse>>, AppError> {
    let mut form = form.into_inner();

    let teacher_name = form
        .teacher_name
        .take()
        .unwrap_or_else(|| "Unknown".to_string());

    let file = form
        .assignment_file
        .as_mut()
        .ok_or_else(|| AppError::Validation("No file".to_string()))?;

    // File lands on disk before the metadata row; a crash in between
    // leaves an orphaned file.
    let stored_filename = store_upload(file, uploads).await?;
    let assignment = create_assignment(db, &form.subject, &stored_filename, &teacher_name).await?;

    Ok(Custom(
        Status::Created,
        Json(UploadResponse {
            message: "Uploaded".to_string(),
            assignment: assignment.into(),
        }),
    ))
}

#[get("/assignments")]
pub async fn api_get_assignments(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<AssignmentData>>, AppError> {
    let assignments = get_assignments_newest_first(db).await?;

    Ok(Json(
        assignments.into_iter().map(AssignmentData::from).collect(),
    ))
}

#[get("/leaderboard")]
pub async fn api_leaderboard(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<StudentData>>, AppError> {
    let students = get_leaderboard(db).await?;

    Ok(Json(students.into_iter().map(StudentData::from).collect()))
}

#[derive(Deserialize, Validate)]
pub struct ScoreUpdateRequest {
    name: String,
    /// Signed delta added to the stored score; absent means no change.
    #[serde(default)]
    score: i64,
}

#[post("/scoreupdate", data = "<update>")]
pub async fn api_update_score(
    update: Json<ScoreUpdateRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = get_student_by_name(db, &update.name).await?;

    add_to_student_score(db, student.id, update.score).await?;

    let student = get_student_by_name(db, &update.name).await?;

    Ok(Json(StudentResponse {
        message: "Score updated".to_string(),
        student: student.into(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    name: String,
    #[validate(range(min = 1, max = 150, message = "must be a plausible age"))]
    age: Option<i64>,
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    schoolname: Option<String>,
    #[validate(length(min = 1, max = 30, message = "must be 1-30 characters"))]
    classofstudy: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    password: Option<String>,
}

#[post("/profilesupdate", data = "<update>")]
pub async fn api_update_profile(
    update: Json<ProfileUpdateRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<StudentResponse>, AppError> {
    update.validate()?;

    let student = get_student_by_name(db, &update.name).await?;

    if let Some(age) = update.age {
        update_student_age(db, student.id, age).await?;
    }

    if let Some(schoolname) = &update.schoolname {
        update_student_school(db, student.id, schoolname).await?;
    }

    if let Some(classofstudy) = &update.classofstudy {
        update_student_class(db, student.id, classofstudy).await?;
    }

    if let Some(password) = &update.password {
        update_student_password(db, student.id, password).await?;
    }

    let student = get_student_by_name(db, &update.name).await?;

    Ok(Json(StudentResponse {
        message: "Profile updated".to_string(),
        student: student.into(),
    }))
}

// Body-parse failures from the Json guard surface as 400s with the same
// plain JSON error shape the handlers use.

#[catch(400)]
pub fn bad_request(_req: &Request) -> Custom<Json<ErrorBody>> {
    Custom(
        Status::BadRequest,
        Json(ErrorBody {
            error: "Missing fields".to_string(),
        }),
    )
}

#[catch(422)]
pub fn unprocessable_entity(_req: &Request) -> Custom<Json<ErrorBody>> {
    Custom(
        Status::BadRequest,
        Json(ErrorBody {
            error: "Missing fields".to_string(),
        }),
    )
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Custom<Json<ErrorBody>> {
    Custom(
        Status::NotFound,
        Json(ErrorBody {
            error: "Not found".to_string(),
        }),
    )
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Custom<Json<ErrorBody>> {
    Custom(
        Status::InternalServerError,
        Json(ErrorBody {
            error: "Internal server error".to_string(),
        }),
    )
}
