#[macro_use]
extern crate rocket;

mod api;
mod db;
mod error;
mod models;
mod storage;
mod telemetry;
#[cfg(test)]
mod test;

use api::{
    api_assign_work, api_get_assignments, api_leaderboard, api_login, api_signup,
    api_teacher_dashboard, api_teacher_login, api_teacher_signup, api_update_profile,
    api_update_score, bad_request, home, internal_error, not_found, unprocessable_entity,
};
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use storage::UploadDir;
use telemetry::{TelemetryFairing, init_tracing};
use tracing::{error, info};

#[launch]
async fn rocket() -> _ {
    dotenvy::dotenv().ok();
    init_tracing();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();

    let pool = SqlitePool::connect(&database_url)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    let upload_dir = UploadDir::from_env().expect("Failed to create upload directory");

    init_rocket(pool, upload_dir).await
}

pub async fn init_rocket(pool: SqlitePool, upload_dir: UploadDir) -> Rocket<Build> {
    info!("Starting AlgoPlay backend");

    rocket::build()
        .manage(pool)
        .mount(
            "/",
            routes![
                home,
                api_signup,
                api_login,
                api_teacher_signup,
                api_teacher_login,
                api_teacher_dashboard,
                api_assign_work,
                api_get_assignments,
                api_leaderboard,
                api_update_score,
                api_update_profile,
            ],
        )
        .mount("/uploads", FileServer::from(upload_dir.path().to_owned()))
        .register(
            "/",
            catchers![bad_request, unprocessable_entity, not_found, internal_error],
        )
        .manage(upload_dir)
        .attach(TelemetryFairing)
}
