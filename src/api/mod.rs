use axum::{
    Router,
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::net::TcpListener;

use crate::core::Calculator;
use crate::error::{Error, Result};
use crate::games::crossword::{CheckReport, SessionView};
use crate::games::{
    CheckOutcome, Completion, Crossword, Difficulty, GameStats, PuzzleLibrary, StatsBook,
    StatsStore,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Oldest sessions are dropped past this many.
const MAX_SESSIONS: usize = 1024;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculatorInfo {
    slug: &'static str,
    title: &'static str,
    path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DifficultyPayload {
    difficulty: Option<String>,
}

impl DifficultyPayload {
    fn difficulty(&self) -> Result<Difficulty> {
        match self.difficulty.as_deref().map(str::trim) {
            None | Some("") => Ok(Difficulty::Easy),
            Some(name) => name.parse(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CellPayload {
    row: usize,
    col: usize,
    /// Blank or missing clears the cell. Only the first character counts.
    letter: Option<String>,
    elapsed_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CheckPayload {
    elapsed_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: u64,
    pub session: SessionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CheckReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<GameStats>,
}

struct Session {
    game: Crossword,
    started: Instant,
}

impl Session {
    fn new(game: Crossword) -> Self {
        Self {
            game,
            started: Instant::now(),
        }
    }

    fn elapsed(&self, reported: Option<u64>) -> u64 {
        reported.unwrap_or_else(|| self.started.elapsed().as_secs())
    }
}

#[derive(Default)]
struct Sessions {
    next_id: u64,
    games: BTreeMap<u64, Session>,
}

impl Sessions {
    fn insert(&mut self, session: Session) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.games.insert(id, session);
        while self.games.len() > MAX_SESSIONS {
            if let Some((evicted, _)) = self.games.pop_first() {
                tracing::debug!(session = evicted, "evicted idle crossword session");
            }
        }
        id
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Session> {
        self.games.get_mut(&id).ok_or(Error::SessionNotFound(id))
    }
}

/// Everything the handlers share: the puzzle set, live sessions and stats.
pub struct AppState {
    library: PuzzleLibrary,
    sessions: Mutex<Sessions>,
    stats: Mutex<StatsBook>,
}

impl AppState {
    pub fn new(library: PuzzleLibrary, store: Box<dyn StatsStore>) -> Self {
        Self {
            library,
            sessions: Mutex::new(Sessions::default()),
            stats: Mutex::new(StatsBook::open(store)),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stats_book(&self) -> MutexGuard<'_, StatsBook> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_session(&self, difficulty: Difficulty) -> SessionResponse {
        let game = Crossword::new(self.library.get(difficulty));
        let session = game.view();
        let id = self.sessions().insert(Session::new(game));
        tracing::info!(session = id, %difficulty, "crossword session started");
        SessionResponse {
            id,
            session,
            report: None,
            completion: None,
            stats: None,
        }
    }

    pub fn session(&self, id: u64) -> Result<SessionResponse> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(id)?;
        Ok(SessionResponse {
            id,
            session: session.game.view(),
            report: None,
            completion: None,
            stats: None,
        })
    }

    pub fn write_cell(
        &self,
        id: u64,
        row: usize,
        col: usize,
        letter: Option<char>,
        elapsed_seconds: Option<u64>,
    ) -> Result<SessionResponse> {
        let (session, completion, elapsed) = {
            let mut sessions = self.sessions();
            let session = sessions.get_mut(id)?;
            let completion = match letter {
                Some(letter) => session.game.set_cell(row, col, letter)?,
                None => {
                    session.game.clear_cell(row, col)?;
                    None
                }
            };
            (session.game.view(), completion, session.elapsed(elapsed_seconds))
        };
        let stats = completion.map(|done| self.record(id, &done, elapsed));
        Ok(SessionResponse {
            id,
            session,
            report: None,
            completion,
            stats,
        })
    }

    pub fn check(&self, id: u64, elapsed_seconds: Option<u64>) -> Result<SessionResponse> {
        let (session, outcome, elapsed) = {
            let mut sessions = self.sessions();
            let session = sessions.get_mut(id)?;
            let outcome = session.game.check();
            (session.game.view(), outcome, session.elapsed(elapsed_seconds))
        };
        let (report, completion) = match outcome {
            CheckOutcome::Checked(report) => (Some(report), None),
            CheckOutcome::Solved(done) => (None, Some(done)),
            CheckOutcome::AlreadySolved => (None, None),
        };
        let stats = completion.map(|done| self.record(id, &done, elapsed));
        Ok(SessionResponse {
            id,
            session,
            report,
            completion,
            stats,
        })
    }

    pub fn new_puzzle(&self, id: u64, difficulty: Difficulty) -> Result<SessionResponse> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(id)?;
        session.game.new_puzzle(&self.library, difficulty);
        session.started = Instant::now();
        tracing::info!(session = id, %difficulty, "crossword puzzle replaced");
        Ok(SessionResponse {
            id,
            session: session.game.view(),
            report: None,
            completion: None,
            stats: None,
        })
    }

    pub fn stats(&self) -> GameStats {
        self.stats_book().stats().clone()
    }

    fn record(&self, id: u64, completion: &Completion, elapsed: u64) -> GameStats {
        let mut book = self.stats_book();
        if let Err(e) = book.record(completion, elapsed) {
            tracing::error!(session = id, error = %e, "failed to save crossword stats");
        }
        book.stats().clone()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/calculators", get(calculators_handler))
        .route(
            "/api/calculate/:calculator",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/crossword/sessions", post(create_session_handler))
        .route("/api/crossword/sessions/:id", get(session_handler))
        .route("/api/crossword/sessions/:id/cell", put(cell_handler))
        .route("/api/crossword/sessions/:id/check", post(check_handler))
        .route("/api/crossword/sessions/:id/new", post(new_puzzle_handler))
        .route("/api/crossword/stats", get(stats_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, store: Box<dyn StatsStore>) -> std::io::Result<()> {
    let library = PuzzleLibrary::builtin()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let app = router(Arc::new(AppState::new(library, store)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("calcdesk HTTP API listening on http://{addr}");
    tracing::info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculators_handler() -> Response {
    json_response(StatusCode::OK, calculator_list())
}

async fn calculate_get_handler(
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    respond(calculate(&name, payload_from_query(query)))
}

async fn calculate_post_handler(Path(name): Path<String>, body: Bytes) -> Response {
    respond(body_value(&body).and_then(|payload| calculate(&name, payload)))
}

async fn create_session_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let created = parse_body::<DifficultyPayload>(&body, "session")
        .and_then(|payload| payload.difficulty())
        .map(|difficulty| state.create_session(difficulty));
    match created {
        Ok(created) => json_response(StatusCode::CREATED, created),
        Err(e) => error_from(&e),
    }
}

async fn session_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    respond(state.session(id))
}

async fn cell_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Response {
    respond(parse_body::<CellPayload>(&body, "cell").and_then(|payload| {
        let letter = payload
            .letter
            .as_deref()
            .and_then(|s| s.trim().chars().next());
        state.write_cell(id, payload.row, payload.col, letter, payload.elapsed_seconds)
    }))
}

async fn check_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Response {
    respond(
        parse_body::<CheckPayload>(&body, "check")
            .and_then(|payload| state.check(id, payload.elapsed_seconds)),
    )
}

async fn new_puzzle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Response {
    respond(
        parse_body::<DifficultyPayload>(&body, "new puzzle")
            .and_then(|payload| payload.difficulty())
            .and_then(|difficulty| state.new_puzzle(id, difficulty)),
    )
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(StatusCode::OK, state.stats())
}

fn calculator_list() -> Vec<CalculatorInfo> {
    Calculator::ALL
        .into_iter()
        .map(|c| CalculatorInfo {
            slug: c.slug(),
            title: c.title(),
            path: format!("/api/calculate/{}", c.slug()),
        })
        .collect()
}

fn calculate(name: &str, payload: Value) -> Result<Value> {
    let calculator: Calculator = name.parse()?;
    tracing::debug!(%calculator, "evaluating");
    calculator.evaluate_json(payload)
}

/// Query strings carry everything as text; numeric coercion happens when the
/// input record is deserialized.
fn payload_from_query(query: HashMap<String, String>) -> Value {
    Value::Object(
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<_, _>>(),
    )
}

/// An empty body is an empty object, so every field takes its default.
fn body_value(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| Error::invalid_payload("request", e))
}

fn parse_body<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T> {
    serde_json::from_value(body_value(body)?).map_err(|e| Error::invalid_payload(context, e))
}

fn status_for(error: &Error) -> StatusCode {
    if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_from(error: &Error) -> Response {
    let status = status_for(error);
    if status.is_server_error() {
        tracing::error!(error = %error, "request failed");
    } else {
        tracing::debug!(error = %error, "request rejected");
    }
    error_response(status, &error.to_string())
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => error_from(&e),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{MemoryStore, Status};
    use serde_json::json;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn state_with(store: MemoryStore) -> AppState {
        AppState::new(PuzzleLibrary::builtin().expect("builtin"), Box::new(store))
    }

    fn solve(state: &AppState, id: u64) -> SessionResponse {
        let words = state
            .library
            .get(Difficulty::Easy)
            .words()
            .to_vec();
        let mut last = None;
        for word in &words {
            for ((row, col), letter) in word.cells().zip(word.answer.chars()) {
                let response = state
                    .write_cell(id, row, col, Some(letter), Some(75))
                    .expect("open cell");
                if response.completion.is_some() {
                    return response;
                }
                last = Some(response);
            }
        }
        last.expect("at least one cell")
    }

    #[test]
    fn query_values_become_strings_and_are_coerced() {
        let mut query = HashMap::new();
        query.insert("amount".to_string(), "1,000".to_string());
        query.insert("rate".to_string(), "10".to_string());
        let value = calculate("sales-tax", payload_from_query(query)).expect("valid");
        assert_approx(value["taxAmount"].as_f64().expect("number"), 100.0);
        assert_approx(value["total"].as_f64().expect("number"), 1_100.0);
    }

    #[test]
    fn empty_body_means_defaults() {
        assert_eq!(body_value(b"").expect("empty"), json!({}));
        assert_eq!(body_value(b"  \n").expect("blank"), json!({}));
        let value = calculate("dti", body_value(b"").expect("empty")).expect("defaults");
        assert_approx(value["ratio"].as_f64().expect("number"), 38.0);
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let err = body_value(b"{not json").expect_err("malformed");
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_statuses_follow_error_kind() {
        assert_eq!(
            status_for(&Error::UnknownCalculator("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::SessionNotFound(9)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&Error::invalid_puzzle("p", "broken")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn calculator_list_covers_every_calculator() {
        let list = calculator_list();
        assert_eq!(list.len(), Calculator::ALL.len());
        assert!(list.iter().any(|c| c.path == "/api/calculate/mortgage-points"));
    }

    #[test]
    fn error_response_carries_json_message_and_no_store() {
        let response = error_response(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }

    #[test]
    fn difficulty_payload_defaults_to_easy() {
        let payload: DifficultyPayload = parse_body(b"", "session").expect("empty");
        assert_eq!(payload.difficulty().ok(), Some(Difficulty::Easy));

        let payload: DifficultyPayload =
            parse_body(br#"{"difficulty": "Expert"}"#, "session").expect("valid");
        assert_eq!(payload.difficulty().ok(), Some(Difficulty::Expert));

        let payload: DifficultyPayload =
            parse_body(br#"{"difficulty": "insane"}"#, "session").expect("valid json");
        let err = payload.difficulty().expect_err("unknown");
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn session_ids_are_distinct_and_unknown_ids_404() {
        let state = state_with(MemoryStore::default());
        let a = state.create_session(Difficulty::Easy);
        let b = state.create_session(Difficulty::Hard);
        assert_ne!(a.id, b.id);
        assert_eq!(b.session.difficulty, Difficulty::Hard);

        let err = state.session(999).expect_err("unknown");
        assert_eq!(status_for(&err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn solving_through_cells_records_stats_once() {
        let store = MemoryStore::default();
        let state = state_with(store.clone());
        let id = state.create_session(Difficulty::Easy).id;

        let solved = solve(&state, id);
        assert_eq!(solved.session.status, Status::Solved);
        let stats = solved.stats.expect("stats on completion");
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.best_time, Some(75));
        assert_eq!(store.snapshot().completed, 1);

        let again = state.check(id, Some(10)).expect("check");
        assert!(again.completion.is_none());
        assert_eq!(state.stats().completed, 1);

        let err = state
            .write_cell(id, 0, 0, Some('Z'), None)
            .expect_err("solved grid is frozen");
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn check_reports_progress_without_recording() {
        let state = state_with(MemoryStore::default());
        let id = state.create_session(Difficulty::Easy).id;
        state
            .write_cell(id, 0, 0, Some('c'), None)
            .expect("open cell");
        state
            .write_cell(id, 0, 1, Some('Q'), None)
            .expect("open cell");

        let checked = state.check(id, None).expect("check");
        let report = checked.report.expect("partial report");
        assert_eq!(report.filled, 2);
        assert_eq!(report.correct, 1);
        assert!(checked.completion.is_none());
        assert_eq!(state.stats().completed, 0);

        let cleared = state.write_cell(id, 0, 1, None, None).expect("clear");
        assert_eq!(cleared.session.grid[0], "C...");
        assert_eq!(cleared.session.status, Status::Unsolved);
    }

    #[test]
    fn block_cells_are_bad_requests() {
        let state = state_with(MemoryStore::default());
        let id = state.create_session(Difficulty::Easy).id;
        let err = state
            .write_cell(id, 1, 1, Some('A'), None)
            .expect_err("block");
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn new_puzzle_replaces_the_grid() {
        let state = state_with(MemoryStore::default());
        let id = state.create_session(Difficulty::Easy).id;
        solve(&state, id);

        let fresh = state.new_puzzle(id, Difficulty::Medium).expect("known session");
        assert_eq!(fresh.session.difficulty, Difficulty::Medium);
        assert_eq!(fresh.session.status, Status::Unsolved);
        assert!(fresh.session.grid.iter().all(|row| !row.chars().any(|c| c.is_ascii_alphabetic())));
    }

    #[test]
    fn session_response_omits_empty_fields() {
        let state = state_with(MemoryStore::default());
        let created = state.create_session(Difficulty::Easy);
        let json = serde_json::to_value(&created).expect("serializes");
        assert!(json.get("report").is_none());
        assert!(json.get("completion").is_none());
        assert_eq!(json["session"]["rows"], json!(4));
    }
}
