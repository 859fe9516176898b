pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/job", post(handlers::handle_set_job))
        .route(
            "/api/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/candidates", get(handlers::handle_list_candidates))
        .route("/api/screen", post(handlers::handle_screen))
        .route("/api/export", get(handlers::handle_export))
        .route("/api/lexicon", post(handlers::handle_extend_lexicon))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::models::candidate::CandidateDraft;
    use crate::screening::lexicon::SkillLexicon;
    use crate::screening::ranking::ScoringWeights;
    use crate::screening::similarity::{SimilarityBackend, SimilarityScorer};
    use crate::screening::ScreeningEngine;

    /// Stalls every comparison so a screening run outlives a short timeout.
    struct StallingScorer;

    impl SimilarityScorer for StallingScorer {
        fn score(&self, _a: &str, _b: &str) -> f64 {
            std::thread::sleep(Duration::from_millis(400));
            0.0
        }

        fn backend(&self) -> SimilarityBackend {
            SimilarityBackend::TfIdf
        }
    }

    const BOUNDARY: &str = "screener-test-boundary";

    fn test_state() -> AppState {
        let config = Config::default();
        let engine = ScreeningEngine::from_config(&config).unwrap();
        AppState::new(config, engine)
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(state, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn job_form(description: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{description}\r\n--{BOUNDARY}--\r\n"
        );
        Request::post("/api/job")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn upload(files: &[(&str, &str)], name: Option<&str>) -> Request<Body> {
        let mut body = String::new();
        if let Some(name) = name {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
            ));
        }
        for (filename, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send_json(&test_state(), empty("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener");
    }

    #[tokio::test]
    async fn test_screen_without_job_is_bad_request() {
        let (status, body) = send_json(&test_state(), empty("POST", "/api/screen")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_JOB");
    }

    #[tokio::test]
    async fn test_blank_job_rejected() {
        let (status, body) =
            send_json(&test_state(), post_json("/api/job", json!({"description": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_screen_with_no_candidates_returns_empty_results() {
        let state = test_state();
        let (status, body) = send_json(
            &state,
            post_json(
                "/api/job",
                json!({"description": "Looking for a Python developer with AWS experience"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["job"]["id"], 1);
        assert_eq!(body["job"]["skills"], json!(["Python", "AWS"]));

        let (status, body) = send_json(&state, empty("POST", "/api/screen")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([]));
        assert!(body["run_id"].is_string());
    }

    #[tokio::test]
    async fn test_upload_screen_and_export_flow() {
        let state = test_state();
        send_json(
            &state,
            post_json(
                "/api/job",
                json!({"description": "Python developer with AWS and Docker experience"}),
            ),
        )
        .await;

        let (status, body) = send_json(
            &state,
            upload(
                &[
                    ("strong.txt", "Ada Lovelace\nada@example.com\nPython developer, AWS, Docker"),
                    ("weak.txt", "Pastry chef, sourdough and tarts"),
                ],
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["candidates"][0]["name"], "Ada Lovelace");
        assert_eq!(body["candidates"][0]["email"], "ada@example.com");
        assert_eq!(body["candidates"][1]["name"], "weak.txt");
        assert_eq!(body["failures"], json!([]));

        let (status, body) = send_json(&state, empty("POST", "/api/screen")).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["filename"], "strong.txt");
        assert_eq!(results[0]["scores"]["skill_overlap"], 1.0);
        assert_eq!(results[1]["scores"]["total"], 0.0);

        let (_, body) = send_json(&state, empty("GET", "/api/candidates")).await;
        assert!(body["candidates"][0]["scores"]["total"].as_f64().unwrap() > 0.4);

        let response = build_router(state.clone())
            .oneshot(empty("GET", "/api/export"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=screening_results.csv"
        );
        let csv = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(csv.to_vec()).unwrap();
        assert!(csv.starts_with("id,name,email,filename,similarity,skill_overlap,total,skills"));
        assert!(csv.contains("Python; AWS; Docker"));
    }

    #[tokio::test]
    async fn test_upload_reports_per_file_failures() {
        let state = test_state();
        let (status, body) = send_json(
            &state,
            upload(&[("cv.txt", "rust"), ("cv.docx", "not a zip archive")], Some("Sam")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["candidates"][0]["name"], "Sam");
        assert_eq!(body["failures"][0]["filename"], "cv.docx");
        assert_eq!(body["failures"][0]["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_upload_without_files_is_bad_request() {
        let (status, _) = send(&test_state(), upload(&[], Some("Sam"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_without_candidates_is_bad_request() {
        let (status, _) = send(&test_state(), empty("GET", "/api/export")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lexicon_extension_applies_to_new_jobs() {
        let state = test_state();
        let (status, body) = send_json(
            &state,
            post_json(
                "/api/lexicon",
                json!({"skills": [{"canonical": "Elixir", "aliases": ["elixir", "phoenix framework"]}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills_added"], 1);

        let (_, body) = send_json(
            &state,
            post_json("/api/job", json!({"description": "Elixir engineer, Phoenix Framework"})),
        )
        .await;
        assert_eq!(body["job"]["skills"], json!(["Elixir"]));
    }

    #[tokio::test]
    async fn test_invalid_lexicon_entry_rejected() {
        let (status, body) = send_json(
            &test_state(),
            post_json("/api/lexicon", json!({"skills": [{"canonical": "--"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_LEXICON");
    }

    #[tokio::test]
    async fn test_job_accepts_multipart_form() {
        let state = test_state();
        let (status, body) =
            send_json(&state, job_form("Python developer with AWS")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["job"]["skills"], json!(["Python", "AWS"]));

        let (status, body) = send_json(&state, job_form(" ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(state.session.read().await.job().map(|j| j.id), Some(1));
    }

    #[tokio::test]
    async fn test_job_accepts_urlencoded_form() {
        let request = Request::post("/api/job")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("description=Docker+and+Kubernetes%2C+some+Python"))
            .unwrap();
        let (status, body) = send_json(&test_state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["job"]["skills"], json!(["Docker", "Kubernetes", "Python"]));
    }

    #[tokio::test]
    async fn test_job_form_without_description_rejected() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nEngineer\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::post("/api/job")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send_json(&test_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_slow_screening_times_out() {
        let config = Config {
            screen_timeout: Duration::from_millis(20),
            ..Config::default()
        };
        let engine = ScreeningEngine::new(
            SkillLexicon::builtin().unwrap(),
            Arc::new(StallingScorer),
            ScoringWeights::default(),
            Duration::from_secs(5),
        );
        let state = AppState::new(config, engine);
        {
            let mut session = state.session.write().await;
            session.set_job(&state.engine, "Python developer").unwrap();
            session.admit(vec![CandidateDraft {
                name: None,
                email: None,
                filename: "slow.txt".to_string(),
                text: "python".to_string(),
                skills: vec!["Python".to_string()],
            }]);
        }

        let (status, body) = send_json(&state, empty("POST", "/api/screen")).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "SCREENING_TIMEOUT");
        assert_eq!(body["error"]["message"], "Screening did not finish within 20 ms");
        assert!(state.session.read().await.scores_for(1).is_none());
    }
}
