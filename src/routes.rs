use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::DigestConfig;
use crate::digest::Digest;
use crate::mailer::Mailer;
use crate::model::{Bucket, Buckets, NewsItem};
use crate::pipeline::Pipeline;
use crate::quiz::{Quiz, QUIZ_PER_BUCKET};
use crate::search::search;
use crate::session::SessionStore;

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: SessionStore,
    pub digest: DigestConfig,
    pub mailer: Option<Mailer>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/fetch", post(fetch))
        .route("/search", get(search_news))
        .route("/quiz", get(quiz_page).post(quiz_submit))
        .route("/digest", get(digest_download).post(digest_write))
        .route("/email", post(email))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Template structs
pub struct BucketView {
    pub label: &'static str,
    pub items: Vec<NewsItem>,
}

pub struct CountView {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub has_news: bool,
    pub fetched_at: String,
    pub warnings: Vec<String>,
    pub counts: Vec<CountView>,
    pub sections: Vec<BucketView>,
}

pub struct SearchHit {
    pub bucket: &'static str,
    pub item: NewsItem,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub query: String,
    pub results: Vec<SearchHit>,
}

pub struct QuestionView {
    pub number: usize,
    pub id: String,
    pub prompt: String,
    pub headline: String,
    pub options: Vec<&'static str>,
}

#[derive(Template)]
#[template(path = "quiz.html")]
pub struct QuizTemplate {
    pub questions: Vec<QuestionView>,
}

pub struct OutcomeView {
    pub number: usize,
    pub chosen: String,
    pub answer: &'static str,
    pub correct: bool,
}

#[derive(Template)]
#[template(path = "quiz_result.html")]
pub struct QuizResultTemplate {
    pub score: usize,
    pub total: usize,
    pub outcomes: Vec<OutcomeView>,
}

#[derive(Template)]
#[template(path = "message.html")]
pub struct MessageTemplate {
    pub title: String,
    pub message: String,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

fn message(title: &str, message: &str) -> HtmlTemplate<MessageTemplate> {
    HtmlTemplate(MessageTemplate {
        title: title.to_string(),
        message: message.to_string(),
    })
}

fn no_news() -> HtmlTemplate<MessageTemplate> {
    message("No news yet", "Fetch the news first.")
}

fn todays_digest(buckets: &Buckets, config: &DigestConfig) -> Digest {
    Digest::build(buckets, Local::now().date_naive(), config.items_per_section)
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.store.session().read().await;

    let template = match session.snapshot() {
        Some(snapshot) => IndexTemplate {
            has_news: true,
            fetched_at: snapshot
                .fetched_at
                .with_timezone(&Local)
                .format("%d-%m-%Y %H:%M")
                .to_string(),
            warnings: snapshot.warnings.iter().map(|w| w.to_string()).collect(),
            counts: snapshot
                .buckets
                .counts()
                .into_iter()
                .map(|(bucket, count)| CountView {
                    label: bucket.label(),
                    count,
                })
                .collect(),
            sections: Bucket::ALL
                .iter()
                .map(|bucket| BucketView {
                    label: bucket.label(),
                    items: snapshot.buckets.get(*bucket).to_vec(),
                })
                .collect(),
        },
        None => IndexTemplate {
            has_news: false,
            fetched_at: String::new(),
            warnings: Vec::new(),
            counts: Vec::new(),
            sections: Vec::new(),
        },
    };

    HtmlTemplate(template)
}

pub async fn fetch(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    // Run detached so a client that disconnects mid-fetch does not cancel it
    let task_state = state.clone();
    let ran = tokio::spawn(async move { task_state.store.refresh(&task_state.pipeline).await })
        .await?;

    if ran {
        Ok(Redirect::to("/").into_response())
    } else {
        Ok(message(
            "Fetch in progress",
            "A fetch is already in progress. Reload the page shortly.",
        )
        .into_response())
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let session = state.store.session().read().await;
    let Some(snapshot) = session.snapshot() else {
        return no_news().into_response();
    };

    let results = search(&snapshot.buckets, &query.q)
        .into_iter()
        .map(|(bucket, item)| SearchHit {
            bucket: bucket.label(),
            item: item.clone(),
        })
        .collect();

    HtmlTemplate(SearchTemplate {
        query: query.q,
        results,
    })
    .into_response()
}

pub async fn quiz_page(State(state): State<Arc<AppState>>) -> Response {
    let mut session = state.store.session().write().await;
    let Some(snapshot) = session.snapshot() else {
        return no_news().into_response();
    };

    let quiz = match session.quiz() {
        Some(quiz) => quiz.clone(),
        None => Quiz::generate(&snapshot.buckets, QUIZ_PER_BUCKET),
    };
    session.set_quiz(quiz.clone());

    if quiz.is_empty() {
        return message("Quiz", "None of the current headlines can be turned into a question.")
            .into_response();
    }

    let questions = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| QuestionView {
            number: i + 1,
            id: q.id.clone(),
            prompt: q.prompt(),
            headline: q.headline.clone(),
            options: q.options.clone(),
        })
        .collect();

    HtmlTemplate(QuizTemplate { questions }).into_response()
}

pub async fn quiz_submit(
    State(state): State<Arc<AppState>>,
    Form(answers): Form<HashMap<String, String>>,
) -> Response {
    let session = state.store.session().read().await;
    let Some(quiz) = session.quiz() else {
        return message("Quiz", "Open the quiz before submitting answers.").into_response();
    };

    let result = quiz.grade(&answers);
    let outcomes = result
        .outcomes
        .into_iter()
        .map(|o| OutcomeView {
            number: o.number,
            chosen: o.chosen.unwrap_or_else(|| "-".to_string()),
            answer: o.answer,
            correct: o.correct,
        })
        .collect();

    HtmlTemplate(QuizResultTemplate {
        score: result.score,
        total: result.total,
        outcomes,
    })
    .into_response()
}

pub async fn digest_write(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let session = state.store.session().read().await;
    let Some(snapshot) = session.snapshot() else {
        return Ok(no_news().into_response());
    };

    let path = todays_digest(&snapshot.buckets, &state.digest).write_to(&state.digest.output_dir)?;
    Ok(message("Digest created", &format!("Digest written to {}", path.display())).into_response())
}

pub async fn digest_download(State(state): State<Arc<AppState>>) -> Response {
    let session = state.store.session().read().await;
    let Some(snapshot) = session.snapshot() else {
        return no_news().into_response();
    };

    let digest = todays_digest(&snapshot.buckets, &state.digest);
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", digest.file_name()),
            ),
        ],
        digest.render(),
    )
        .into_response()
}

pub async fn email(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let Some(mailer) = &state.mailer else {
        return Ok(message("Email", "Email is not configured.").into_response());
    };

    let path = {
        let session = state.store.session().read().await;
        let Some(snapshot) = session.snapshot() else {
            return Ok(no_news().into_response());
        };
        todays_digest(&snapshot.buckets, &state.digest).write_to(&state.digest.output_dir)?
    };

    mailer.send_digest(&path).await?;
    Ok(message("Email sent", "The digest was emailed.").into_response())
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
