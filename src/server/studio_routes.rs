//! Studio API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::state::{GuardedStudio, ServerState};
use crate::studio::{
    ErrorKind, GeoLocation, Language, MarketAnalysisMode, MusicIdea, MusicIdeaDetails,
    NotationEngine, ProviderCategory, SavedProject, StudioError, TutorEvent,
};

/// A classified studio failure rendered as `{kind, message}`.
struct ApiError(StudioError);

impl From<StudioError> for ApiError {
    fn from(error: StudioError) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind {
            ErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::NetworkError | ErrorKind::ParseError => StatusCode::BAD_GATEWAY,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Deserialize, Default)]
struct LanguageParams {
    pub language: Option<Language>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisBody {
    pub idea: String,
    #[serde(default)]
    pub idea_details: MusicIdeaDetails,
    pub language: Option<Language>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProducersParams {
    pub max_results: Option<usize>,
    pub language: Option<Language>,
}

#[derive(Deserialize)]
struct SongIdeaBody {
    pub description: String,
    pub language: Option<Language>,
}

#[derive(Deserialize)]
struct SheetMusicBody {
    pub description: String,
    #[serde(default)]
    pub engine: NotationEngine,
    pub language: Option<Language>,
}

#[derive(Deserialize)]
struct MarketTrendsBody {
    pub query: String,
    #[serde(default)]
    pub mode: MarketAnalysisMode,
    pub language: Option<Language>,
}

#[derive(Deserialize)]
struct ProvidersBody {
    pub query: String,
    #[serde(default)]
    pub category: ProviderCategory,
    pub location: Option<GeoLocation>,
    pub language: Option<Language>,
}

#[derive(Deserialize)]
struct SearchBody {
    pub query: String,
    pub language: Option<Language>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SnapshotBody {
    pub name: Option<String>,
}

#[derive(Serialize)]
struct BriefResponse {
    html: String,
}

#[derive(Serialize)]
struct SheetMusicResponse {
    abc: String,
}

#[derive(Serialize)]
struct SpeechResponse {
    audio: String,
}

#[derive(Serialize)]
struct QuotaResponse {
    exhausted: bool,
}

async fn get_state(State(studio): State<GuardedStudio>) -> impl IntoResponse {
    Json(studio.snapshot())
}

async fn post_analysis(
    State(studio): State<GuardedStudio>,
    Json(body): Json<AnalysisBody>,
) -> impl IntoResponse {
    let idea = MusicIdea {
        idea: body.idea,
        idea_details: body.idea_details,
    };
    studio.analyze(idea, body.language).await.map(Json).map_err(ApiError::from)
}

async fn get_analysis(State(studio): State<GuardedStudio>) -> impl IntoResponse {
    Json(studio.analysis_state())
}

async fn post_element_details(
    State(studio): State<GuardedStudio>,
    Path(name): Path<String>,
    Query(params): Query<LanguageParams>,
) -> Response {
    match studio.element_details(&name, params.language).await {
        Ok(Some(element)) => Json(element).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

async fn post_element_further_reading(
    State(studio): State<GuardedStudio>,
    Path(name): Path<String>,
    Query(params): Query<LanguageParams>,
) -> Response {
    match studio.element_further_reading(&name, params.language).await {
        Ok(Some(element)) => Json(element).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

async fn post_brief(
    State(studio): State<GuardedStudio>,
    Query(params): Query<LanguageParams>,
) -> ApiResult<impl Serialize> {
    let html = studio.production_brief(params.language).await?;
    Ok(Json(BriefResponse { html }))
}

async fn post_costs(
    State(studio): State<GuardedStudio>,
    Query(params): Query<LanguageParams>,
) -> impl IntoResponse {
    studio
        .production_costs(params.language)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn post_producers(
    State(studio): State<GuardedStudio>,
    Query(params): Query<ProducersParams>,
) -> impl IntoResponse {
    studio
        .find_producers(params.max_results, params.language)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn post_song_idea(
    State(studio): State<GuardedStudio>,
    Json(body): Json<SongIdeaBody>,
) -> impl IntoResponse {
    studio
        .song_idea(&body.description, body.language)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn post_sheet_music(
    State(studio): State<GuardedStudio>,
    Json(body): Json<SheetMusicBody>,
) -> ApiResult<impl Serialize> {
    let abc = studio
        .sheet_music(&body.description, body.engine, body.language)
        .await?;
    Ok(Json(SheetMusicResponse { abc }))
}

async fn post_market_trends(
    State(studio): State<GuardedStudio>,
    Json(body): Json<MarketTrendsBody>,
) -> impl IntoResponse {
    studio
        .market_trends(&body.query, body.mode, body.language)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn post_market_speech(State(studio): State<GuardedStudio>) -> ApiResult<impl Serialize> {
    let audio = studio.market_speech().await?;
    Ok(Json(SpeechResponse { audio }))
}

async fn post_providers(
    State(studio): State<GuardedStudio>,
    Json(body): Json<ProvidersBody>,
) -> impl IntoResponse {
    studio
        .find_providers(&body.query, body.category, body.location, body.language)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn post_search(
    State(studio): State<GuardedStudio>,
    Json(body): Json<SearchBody>,
) -> impl IntoResponse {
    studio
        .search(&body.query, body.language)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn get_quota(State(studio): State<GuardedStudio>) -> impl IntoResponse {
    Json(QuotaResponse {
        exhausted: studio.quota_exhausted(),
    })
}

async fn delete_quota(State(studio): State<GuardedStudio>) -> impl IntoResponse {
    studio.dismiss_quota();
    Json(QuotaResponse { exhausted: false })
}

async fn post_tutor_setup(
    State(studio): State<GuardedStudio>,
    Query(params): Query<LanguageParams>,
) -> impl IntoResponse {
    studio
        .tutor_setup(params.language)
        .map(Json)
        .map_err(ApiError::from)
}

async fn get_tutor(State(studio): State<GuardedStudio>) -> impl IntoResponse {
    Json(studio.tutor_session())
}

async fn post_tutor_event(
    State(studio): State<GuardedStudio>,
    Json(event): Json<TutorEvent>,
) -> impl IntoResponse {
    Json(studio.tutor_event(event))
}

async fn post_project_snapshot(
    State(studio): State<GuardedStudio>,
    Json(body): Json<SnapshotBody>,
) -> impl IntoResponse {
    studio
        .snapshot_project(body.name)
        .map(Json)
        .map_err(ApiError::from)
}

async fn post_project_restore(
    State(studio): State<GuardedStudio>,
    Query(params): Query<LanguageParams>,
    Json(project): Json<SavedProject>,
) -> impl IntoResponse {
    Json(studio.restore_project(project, params.language))
}

pub fn make_studio_routes(state: ServerState) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/analysis", post(post_analysis).get(get_analysis))
        .route(
            "/analysis/elements/{name}/details",
            post(post_element_details),
        )
        .route(
            "/analysis/elements/{name}/further-reading",
            post(post_element_further_reading),
        )
        .route("/analysis/brief", post(post_brief))
        .route("/analysis/costs", post(post_costs))
        .route("/analysis/producers", post(post_producers))
        .route("/song-idea", post(post_song_idea))
        .route("/sheet-music", post(post_sheet_music))
        .route("/market-trends", post(post_market_trends))
        .route("/market-trends/speech", post(post_market_speech))
        .route("/providers", post(post_providers))
        .route("/search", post(post_search))
        .route("/quota", get(get_quota).delete(delete_quota))
        .route("/tutor", get(get_tutor))
        .route("/tutor/setup", post(post_tutor_setup))
        .route("/tutor/events", post(post_tutor_event))
        .route("/projects/snapshot", post(post_project_snapshot))
        .route("/projects/restore", post(post_project_restore))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::QUOTA_EXCEEDED_MESSAGE;

    fn status_of(kind: ErrorKind) -> StatusCode {
        ApiError(StudioError::new(kind, "x")).into_response().status()
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(status_of(ErrorKind::QuotaExceeded), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status_of(ErrorKind::NetworkError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(ErrorKind::ParseError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(ErrorKind::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ErrorKind::UnknownError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError(StudioError::quota_exceeded()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "QUOTA_EXCEEDED");
        assert_eq!(body["message"], QUOTA_EXCEEDED_MESSAGE);
    }
}
