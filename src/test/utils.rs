pub mod test_utils {
    use std::collections::HashMap;
    use std::sync::Once;

    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use uuid::Uuid;

    use crate::db::{create_student, create_teacher};
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::storage::UploadDir;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    pub struct TestStudent {
        pub name: String,
        pub age: i64,
        pub schoolname: String,
        pub classofstudy: String,
        pub score: i64,
    }

    pub struct TestTeacher {
        pub name: String,
        pub email: String,
        pub schoolname: String,
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        students: Vec<TestStudent>,
        teachers: Vec<TestTeacher>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn student(self, name: &str, schoolname: &str) -> Self {
            self.student_with_score(name, schoolname, 0)
        }

        pub fn student_with_score(mut self, name: &str, schoolname: &str, score: i64) -> Self {
            self.students.push(TestStudent {
                name: name.to_string(),
                age: 15,
                schoolname: schoolname.to_string(),
                classofstudy: "10A".to_string(),
                score,
            });
            self
        }

        pub fn teacher(mut self, name: &str, email: &str, schoolname: &str) -> Self {
            self.teachers.push(TestTeacher {
                name: name.to_string(),
                email: email.to_string(),
                schoolname: schoolname.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });

            // Single connection so every handle sees the same in-memory
            // database.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut student_id_map: HashMap<String, i64> = HashMap::new();

            for s in &self.students {
                let student = create_student(
                    &pool,
                    &s.name,
                    s.age,
                    &s.schoolname,
                    &s.classofstudy,
                    STANDARD_PASSWORD,
                )
                .await?;

                if s.score != 0 {
                    sqlx::query("UPDATE students SET score = ? WHERE id = ?")
                        .bind(s.score)
                        .bind(student.id)
                        .execute(&pool)
                        .await?;
                }

                student_id_map.insert(s.name.clone(), student.id);
            }

            for t in &self.teachers {
                create_teacher(&pool, &t.name, &t.email, &t.schoolname, STANDARD_PASSWORD)
                    .await?;
            }

            Ok(TestDb {
                pool,
                student_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub student_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn student_id(&self, name: &str) -> Option<i64> {
            self.student_id_map.get(name).copied()
        }
    }

    pub fn temp_upload_dir() -> UploadDir {
        let path = std::env::temp_dir().join(format!("algoplay-test-{}", Uuid::new_v4().simple()));
        UploadDir::new(path).expect("Failed to create temp upload dir")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = init_rocket(test_db.pool.clone(), temp_upload_dir()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("valid rocket instance");

        (client, test_db)
    }

    const BOUNDARY: &str = "X-ALGOPLAY-BOUNDARY";

    /// Builds a raw multipart/form-data body for the assign_work endpoint.
    pub fn multipart_upload(
        subject: &str,
        teacher_name: Option<&str>,
        file: Option<(&str, &[u8])>,
    ) -> (ContentType, Vec<u8>) {
        let mut body: Vec<u8> = Vec::new();

        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"subject\"\r\n\r\n{subject}\r\n"
            )
            .as_bytes(),
        );

        if let Some(teacher_name) = teacher_name {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"teacher_name\"\r\n\r\n{teacher_name}\r\n"
                )
                .as_bytes(),
            );
        }

        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"assignment_file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let content_type =
            ContentType::parse_flexible(&format!("multipart/form-data; boundary={BOUNDARY}"))
                .expect("valid multipart content type");

        (content_type, body)
    }
}
