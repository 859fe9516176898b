use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::UploadedFile;
use crate::models::candidate::{Candidate, ScoreSet, ScreeningResult};
use crate::models::job::JobPosting;
use crate::screening::export::{render_csv, EXPORT_FILENAME};
use crate::screening::lexicon::SkillEntry;
use crate::screening::UploadFailure;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct JobRequest {
    pub description: String,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub ok: bool,
    pub job: JobPosting,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub count: usize,
    pub candidates: Vec<Candidate>,
    pub failures: Vec<UploadFailure>,
}

/// A pool member with the scores from the last run, if any.
#[derive(Serialize)]
pub struct CandidateView {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub scores: Option<ScoreSet>,
}

#[derive(Serialize)]
pub struct CandidateListResponse {
    pub ok: bool,
    pub candidates: Vec<CandidateView>,
}

#[derive(Serialize)]
pub struct ScreenResponse {
    pub ok: bool,
    pub run_id: Uuid,
    pub job: JobPosting,
    pub results: Vec<ScreeningResult>,
}

#[derive(Deserialize)]
pub struct LexiconRequest {
    pub skills: Vec<SkillEntry>,
}

#[derive(Serialize)]
pub struct LexiconResponse {
    pub ok: bool,
    pub skills: usize,
    pub aliases: usize,
    pub skills_added: usize,
    pub aliases_added: usize,
    pub conflicts: usize,
}

/// POST /api/job
///
/// Accepts `description` as JSON, a urlencoded form, or a multipart form field.
pub async fn handle_set_job(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<JobResponse>, AppError> {
    let description = read_job_description(request).await?;
    let job = state
        .session
        .write()
        .await
        .set_job(&state.engine, &description)?;
    Ok(Json(JobResponse {
        ok: true,
        job: JobPosting::clone(&job),
    }))
}

async fn read_job_description(request: Request) -> Result<String, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
        {
            if field.name() == Some("description") {
                return field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable description: {e}")));
            }
        }
        Err(AppError::Validation("Missing description field".to_string()))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(req) = Form::<JobRequest>::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(req.description)
    } else {
        let Json(req) = Json::<JobRequest>::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(req.description)
    }
}

/// POST /api/upload
///
/// Multipart fields: `files` (repeated), optional `name` and `email` applied
/// to every file in the batch.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    let mut name = None;
    let mut email = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" | "email" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable {field_name}: {e}")))?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                if field_name == "name" {
                    name = value;
                } else {
                    email = value;
                }
            }
            "files" | "file" => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable {filename}: {e}")))?;
                let mut file = UploadedFile::new(filename, data);
                if let Some(content_type) = content_type {
                    file = file.with_content_type(content_type);
                }
                files.push(file);
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::Validation("No files provided".to_string()));
    }

    let batch = state.engine.prepare_batch(files, name, email).await;
    let admitted = state.session.write().await.admit(batch.drafts);

    Ok(Json(UploadResponse {
        ok: true,
        count: admitted.len(),
        candidates: admitted.iter().map(|c| Candidate::clone(c)).collect(),
        failures: batch.failures,
    }))
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let session = state.session.read().await;
    let candidates = session
        .candidates()
        .iter()
        .map(|c| CandidateView {
            candidate: Candidate::clone(c),
            scores: session.scores_for(c.id),
        })
        .collect();
    Ok(Json(CandidateListResponse {
        ok: true,
        candidates,
    }))
}

/// POST /api/screen
pub async fn handle_screen(
    State(state): State<AppState>,
) -> Result<Json<ScreenResponse>, AppError> {
    let snapshot = state.session.read().await.snapshot();

    let timeout = state.config.screen_timeout;
    let run = tokio::time::timeout(timeout, state.engine.screen(snapshot))
        .await
        .map_err(|_| AppError::ScreeningTimeout(timeout.as_millis()))??;

    state.session.write().await.record_run(&run);

    Ok(Json(ScreenResponse {
        ok: true,
        run_id: run.run_id,
        job: JobPosting::clone(&run.job),
        results: run.results,
    }))
}

/// GET /api/export
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.read().await;
    if session.candidates().is_empty() {
        return Err(AppError::Validation("No candidates to export".to_string()));
    }
    let body = render_csv(&session).map_err(anyhow::Error::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={EXPORT_FILENAME}"),
            ),
        ],
        body,
    ))
}

/// POST /api/lexicon
pub async fn handle_extend_lexicon(
    State(state): State<AppState>,
    Json(req): Json<LexiconRequest>,
) -> Result<Json<LexiconResponse>, AppError> {
    let summary = state.engine.extend_lexicon(req.skills)?;
    let lexicon = state.engine.lexicon();
    Ok(Json(LexiconResponse {
        ok: true,
        skills: lexicon.len(),
        aliases: lexicon.alias_count(),
        skills_added: summary.skills_added,
        aliases_added: summary.aliases_added,
        conflicts: summary.conflicts,
    }))
}
