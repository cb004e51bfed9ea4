mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::json;

    use crate::api::{StudentData, StudentResponse};
    use crate::test::utils::test_utils::{TestDbBuilder, setup_test_client};

    #[rocket::async_test]
    async fn test_score_update_adds_delta() {
        let test_db = TestDbBuilder::new()
            .student_with_score("alice", "Hillview", 10)
            .build()
            .await
            .unwrap();
        let (client, test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/scoreupdate")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "alice",
                    "score": 5
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let updated: StudentResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(updated.message, "Score updated");
        assert_eq!(updated.student.score, 15);

        let stored = crate::db::get_student_by_name(&test_db.pool, "alice")
            .await
            .unwrap();
        assert_eq!(stored.score, 15);
    }

    #[rocket::async_test]
    async fn test_score_update_negative_delta_has_no_floor() {
        let test_db = TestDbBuilder::new()
            .student_with_score("alice", "Hillview", 3)
            .build()
            .await
            .unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/scoreupdate")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "alice",
                    "score": -10
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let updated: StudentResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(updated.student.score, -7);
    }

    #[rocket::async_test]
    async fn test_score_update_defaults_to_zero_delta() {
        let test_db = TestDbBuilder::new()
            .student_with_score("alice", "Hillview", 10)
            .build()
            .await
            .unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/scoreupdate")
            .header(ContentType::JSON)
            .body(json!({ "name": "alice" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let updated: StudentResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(updated.student.score, 10);
    }

    #[rocket::async_test]
    async fn test_score_update_unknown_student() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/scoreupdate")
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "ghost",
                    "score": 5
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_leaderboard_sorted_by_score_descending() {
        let test_db = TestDbBuilder::new()
            .student_with_score("alice", "Hillview", 5)
            .student_with_score("bob", "Hillview", 20)
            .student_with_score("carol", "Lakeside", 10)
            .build()
            .await
            .unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client.get("/leaderboard").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let leaderboard: Vec<StudentData> = serde_json::from_str(&body).unwrap();

        let scores: Vec<i64> = leaderboard.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![20, 10, 5]);
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
