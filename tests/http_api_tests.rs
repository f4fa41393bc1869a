#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use habit_streaks::{Habit, HabitReport, Tier, Tracker, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(Tracker::new());
    http_api::router(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn habit_lifecycle_via_http_api() {
    let app = new_router();

    // Create habit
    let response = app
        .clone()
        .oneshot(post_json(
            "/habits",
            json!({
                "task": "Run",
                "schedule": { "kind": "interval", "rule": 2 },
                "created": "2013-05-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Habit = read_json(response).await;
    assert_eq!(created.id, 1);

    // Log activities
    for day in ["2013-05-06", "2013-05-08", "2013-05-10", "2013-05-15", "2013-05-17"] {
        let response = app
            .clone()
            .oneshot(post_json("/habits/1/activities", json!({ "date": day })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Same day twice conflicts
    let response = app
        .clone()
        .oneshot(post_json("/habits/1/activities", json!({ "date": "2013-05-17" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Streak report for an explicit reference date
    let response = app
        .clone()
        .oneshot(get("/habits/1/streaks?today=2013-05-18"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: HabitReport = read_json(response).await;
    assert_eq!(report.streaks.len(), 2);
    assert_eq!(report.total_times, 5);
    assert_eq!(report.next_required_day, "2013-05-19".parse().unwrap());

    // Rating
    let response = app
        .clone()
        .oneshot(get("/habits/1/rating?today=2013-05-18"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rating: Value = read_json(response).await;
    assert_eq!(rating["tier"], json!(Tier::Bronze.as_str()));

    // Delete the habit
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/habits/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get("/habits/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Value = read_json(response).await;
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn invalid_schedule_is_rejected() {
    let app = new_router();
    let response = app
        .oneshot(post_json(
            "/habits",
            json!({
                "task": "Swim",
                "schedule": { "kind": "days_of_week", "rule": "0000000" }
            }),
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn ratings_cover_every_habit() {
    let app = new_router();
    for (task, rule) in [("Floss", "1111111"), ("Call home", "0000001")] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/habits",
                json!({ "task": task, "schedule": { "kind": "days_of_week", "rule": rule } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/ratings?today=2013-05-18"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ratings: Value = read_json(response).await;
    let ratings = ratings.as_array().unwrap();
    assert_eq!(ratings.len(), 2);
    assert_eq!(ratings[1]["task"], "Call home");
    assert_eq!(ratings[1]["habit_id"], 2);
}

#[tokio::test]
async fn health_reports_ok() {
    let response = new_router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn mutations_are_written_to_the_store() {
    use habit_streaks::{HabitStore, SqliteHabitStore};
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    let file = NamedTempFile::new().unwrap();
    let store = Arc::new(SqliteHabitStore::new(file.path()).unwrap());
    let app = http_api::router(http_api::AppState::with_store(Tracker::new(), store.clone()));

    for request in [
        post_json(
            "/habits",
            json!({ "task": "Run", "schedule": { "kind": "interval", "rule": 2 }, "created": "2013-05-01" }),
        ),
        post_json(
            "/habits",
            json!({ "task": "Read", "schedule": { "kind": "days_of_week", "rule": "1111111" } }),
        ),
        post_json("/habits/1/activities", json!({ "date": "2013-05-06", "status": "half" })),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/habits/2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // a fresh store on the same file sees what the server wrote
    let reopened = SqliteHabitStore::new(file.path()).unwrap();
    let reloaded = reopened.load_tracker().unwrap().expect("tracker saved");
    assert_eq!(reloaded.len(), 1);
    let run = reloaded.habit(1).unwrap();
    assert_eq!(run.task, "Run");
    assert_eq!(run.activities().len(), 1);
    assert_eq!(run.activities()[0].date, "2013-05-06".parse().unwrap());

    // a rejected duplicate leaves the stored history unchanged
    let response = app
        .clone()
        .oneshot(post_json("/habits/1/activities", json!({ "date": "2013-05-06" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let reloaded = store.load_tracker().unwrap().unwrap();
    assert_eq!(reloaded.habit(1).unwrap().activities().len(), 1);
}
