//! Feature orchestration.
//!
//! Every feature follows the same pipeline: quota gate, input validation,
//! loading flag, prompt, model call, interpretation, then the result or the
//! classified error is stored in the feature's slot.

use anyhow::{anyhow, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::board::AnalysisBoard;
use super::errors::{classify, StudioError};
use super::interpret::{
    append_source_links, clean_abc, collect_sources, parse_json, Expected, InterpretError,
};
use super::market::{narration_text, parse_market_analysis};
use super::models::{
    ComprehensiveMusicResult, CostAnalysisResult, GeneratedSongElement, GeoLocation, Language,
    MarketAnalysisMode, MarketTrendsResult, MusicIdea, NotationEngine, ProducerProfile,
    ProviderCategory, ProviderSearchResult, ProviderType, QueryType, SavedProject,
    SearchQueryClassification, SearchResultItem, SongIdeaResult, TargetPage,
};
use super::quota::QuotaGate;
use super::search_index::default_search_index;
use super::state::{FeatureSlot, FeatureState};
use super::tutor::{live_setup, MessageEffects, TutorEvent, TutorSession, DEFAULT_LIVE_MODEL};
use super::{prompts, schemas};
use crate::ai::{GenerationRequest, GenerationResponse, GenerativeModel};
use crate::metrics::{record_ai_request, set_quota_exhausted};

pub const DEFAULT_PRODUCER_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct StudioSettings {
    pub default_language: Language,
    pub live_model: String,
    pub search_index: String,
    pub producer_count: usize,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            live_model: DEFAULT_LIVE_MODEL.to_string(),
            search_index: default_search_index(),
            producer_count: DEFAULT_PRODUCER_COUNT,
        }
    }
}

/// What an element request found before any model call.
enum ElementRequest {
    /// Already answered or in flight; served as is.
    Settled(GeneratedSongElement),
    /// Loading flag set; the model call should go ahead.
    Start(Language),
}

/// Outcome of the site search: either local providers or site pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "results", rename_all = "lowercase")]
pub enum SearchOutcome {
    Providers(Vec<ProviderSearchResult>),
    Pages(Vec<SearchResultItem>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub quota_exhausted: bool,
    pub analysis: FeatureState<AnalysisBoard>,
    pub brief: FeatureState<String>,
    pub costs: FeatureState<CostAnalysisResult>,
    pub producers: FeatureState<Vec<ProducerProfile>>,
    pub song_idea: FeatureState<SongIdeaResult>,
    pub sheet_music: FeatureState<String>,
    pub market: FeatureState<MarketTrendsResult>,
    pub speech: FeatureState<String>,
    pub providers: FeatureState<Vec<ProviderSearchResult>>,
    pub search: FeatureState<SearchOutcome>,
    pub tutor: TutorSession,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorUpdate {
    pub session: TutorSession,
    pub effects: MessageEffects,
}

/// The studio: one model, one quota gate and the state of every feature.
pub struct Studio {
    model: Arc<dyn GenerativeModel>,
    quota: QuotaGate,
    settings: StudioSettings,
    analysis: FeatureSlot<AnalysisBoard>,
    brief: FeatureSlot<String>,
    costs: FeatureSlot<CostAnalysisResult>,
    producers: FeatureSlot<Vec<ProducerProfile>>,
    song_idea: FeatureSlot<SongIdeaResult>,
    sheet_music: FeatureSlot<String>,
    market: FeatureSlot<MarketTrendsResult>,
    speech: FeatureSlot<String>,
    providers: FeatureSlot<Vec<ProviderSearchResult>>,
    search: FeatureSlot<SearchOutcome>,
    tutor: Mutex<TutorSession>,
}

fn require_text(response: GenerationResponse) -> Result<String, InterpretError> {
    match response.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(InterpretError::Empty),
    }
}

fn require_input(value: &str, message: &str) -> Result<(), StudioError> {
    if value.trim().is_empty() {
        Err(StudioError::bad_request(message))
    } else {
        Ok(())
    }
}

impl Studio {
    pub fn new(model: Arc<dyn GenerativeModel>, quota: QuotaGate, settings: StudioSettings) -> Self {
        Self {
            model,
            quota,
            settings,
            analysis: FeatureSlot::new(),
            brief: FeatureSlot::new(),
            costs: FeatureSlot::new(),
            producers: FeatureSlot::new(),
            song_idea: FeatureSlot::new(),
            sheet_music: FeatureSlot::new(),
            market: FeatureSlot::new(),
            speech: FeatureSlot::new(),
            providers: FeatureSlot::new(),
            search: FeatureSlot::new(),
            tutor: Mutex::new(TutorSession::default()),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn model_id(&self) -> &str {
        self.model.model()
    }

    fn language(&self, requested: Option<Language>) -> Language {
        requested.unwrap_or(self.settings.default_language)
    }

    fn lock_tutor(&self) -> MutexGuard<'_, TutorSession> {
        self.tutor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flag_quota(&self) {
        self.quota.mark_exhausted();
        set_quota_exhausted(true);
    }

    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<GenerationResponse> {
        debug!("Sending {:?} request", request.format);
        Ok(self.model.generate(&request).await?)
    }

    /// Await a feature call and classify its failure.
    async fn call<T>(
        &self,
        feature: &'static str,
        work: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, StudioError> {
        let started = Instant::now();
        match work.await {
            Ok(value) => {
                record_ai_request(feature, "ok", started.elapsed());
                Ok(value)
            }
            Err(error) => {
                let error = classify(error);
                record_ai_request(feature, error.kind.as_str(), started.elapsed());
                warn!(
                    feature = feature,
                    kind = error.kind.as_str(),
                    "Feature failed: {}",
                    error.original.as_deref().unwrap_or(&error.message)
                );
                if error.is_quota() {
                    self.flag_quota();
                }
                Err(error)
            }
        }
    }

    /// Run a feature call against `slot`, which goes through loading and ends
    /// with either the result or the error message.
    async fn run<T: Clone>(
        &self,
        feature: &'static str,
        slot: &FeatureSlot<T>,
        work: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, StudioError> {
        slot.begin();
        match self.call(feature, work).await {
            Ok(value) => {
                slot.succeed(value.clone());
                Ok(value)
            }
            Err(error) => {
                slot.fail(error.message.clone());
                Err(error)
            }
        }
    }

    fn current_analysis(&self) -> Result<AnalysisBoard, StudioError> {
        self.analysis
            .result()
            .ok_or_else(|| StudioError::bad_request("Analyze a music idea first."))
    }

    // -----------------------------------------------------------------------
    // Music analysis
    // -----------------------------------------------------------------------

    /// Full creative analysis of an idea. Clears the brief and cost analysis
    /// of any previous analysis.
    pub async fn analyze(
        &self,
        idea: MusicIdea,
        language: Option<Language>,
    ) -> Result<AnalysisBoard, StudioError> {
        self.quota.ensure_available()?;
        require_input(&idea.idea, "Please describe your musical idea.")?;
        let language = self.language(language);

        self.costs.reset();
        self.brief.reset();
        let board = self
            .run("comprehensive analysis", &self.analysis, async {
                let prompt = prompts::comprehensive_analysis(&idea, language);
                let response = self.generate(GenerationRequest::json(prompt)).await?;
                let result: ComprehensiveMusicResult = parse_json(
                    response.text.as_deref(),
                    "comprehensive analysis",
                    Expected::ObjectWithKey("songConcept"),
                )?;
                Ok::<_, anyhow::Error>(AnalysisBoard::new(idea.clone(), language, result))
            })
            .await?;

        info!(
            "Analysis ready with {} suggested elements",
            board.elements().len()
        );
        Ok(board)
    }

    pub fn analysis_state(&self) -> FeatureState<AnalysisBoard> {
        self.analysis.snapshot()
    }

    /// Deeper explanation of one suggested element.
    ///
    /// `Ok(None)` when no element of the current analysis carries `name`.
    /// An element that already has details, or is loading them, is returned
    /// without another model call.
    pub async fn element_details(
        &self,
        name: &str,
        language: Option<Language>,
    ) -> Result<Option<GeneratedSongElement>, StudioError> {
        self.quota.ensure_available()?;
        let request = self.analysis.update_result(|board| {
            let current = board.element(name)?;
            if current.details.is_some() || current.is_loading_details {
                return Some(ElementRequest::Settled(current.clone()));
            }
            let language = board.language;
            board
                .update_element(name, |e| {
                    e.is_loading_details = true;
                    e.details_error = None;
                })
                .map(|_| ElementRequest::Start(language))
        });
        let language = match request.flatten() {
            Some(ElementRequest::Start(analysis_language)) => language.unwrap_or(analysis_language),
            Some(ElementRequest::Settled(element)) => return Ok(Some(element)),
            None => return Ok(None),
        };

        let outcome = self
            .call("deeper analysis", async {
                let prompt = prompts::element_details(name, language);
                let response = self.generate(GenerationRequest::text(prompt)).await?;
                Ok::<_, anyhow::Error>(require_text(response)?)
            })
            .await;

        let updated = self
            .analysis
            .update_result(|board| {
                board.update_element(name, |e| {
                    e.is_loading_details = false;
                    match &outcome {
                        Ok(details) => {
                            e.details = Some(details.clone());
                            e.details_error = None;
                        }
                        Err(error) => e.details_error = Some(error.message.clone()),
                    }
                })
            })
            .flatten();

        outcome.map(|_| updated)
    }

    /// Academic summary of one suggested element, grounded with web search.
    pub async fn element_further_reading(
        &self,
        name: &str,
        language: Option<Language>,
    ) -> Result<Option<GeneratedSongElement>, StudioError> {
        self.quota.ensure_available()?;
        let request = self.analysis.update_result(|board| {
            let current = board.element(name)?;
            if current.further_reading.is_some() || current.is_loading_further_reading {
                return Some(ElementRequest::Settled(current.clone()));
            }
            let language = board.language;
            board
                .update_element(name, |e| {
                    e.is_loading_further_reading = true;
                    e.further_reading_error = None;
                })
                .map(|_| ElementRequest::Start(language))
        });
        let language = match request.flatten() {
            Some(ElementRequest::Start(analysis_language)) => language.unwrap_or(analysis_language),
            Some(ElementRequest::Settled(element)) => return Ok(Some(element)),
            None => return Ok(None),
        };

        let outcome = self
            .call("further reading", async {
                let prompt = prompts::element_further_reading(name, language);
                let response = self.generate(GenerationRequest::web_search(prompt)).await?;
                let grounding = response.grounding.clone();
                let text = require_text(response)?;
                Ok::<_, anyhow::Error>(append_source_links(&text, &grounding))
            })
            .await;

        let updated = self
            .analysis
            .update_result(|board| {
                board.update_element(name, |e| {
                    e.is_loading_further_reading = false;
                    match &outcome {
                        Ok(reading) => {
                            e.further_reading = Some(reading.clone());
                            e.further_reading_error = None;
                        }
                        Err(error) => e.further_reading_error = Some(error.message.clone()),
                    }
                })
            })
            .flatten();

        outcome.map(|_| updated)
    }

    /// HTML production brief for the current analysis.
    pub async fn production_brief(&self, language: Option<Language>) -> Result<String, StudioError> {
        self.quota.ensure_available()?;
        let board = self.current_analysis()?;
        let language = language.unwrap_or(board.language);

        self.run("production brief", &self.brief, async {
            let prompt = prompts::production_brief(&board.result, &board.idea, language)
                .context("Failed to serialize the analysis")?;
            let response = self.generate(GenerationRequest::text(prompt)).await?;
            Ok::<_, anyhow::Error>(require_text(response)?)
        })
        .await
    }

    pub async fn production_costs(
        &self,
        language: Option<Language>,
    ) -> Result<CostAnalysisResult, StudioError> {
        self.quota.ensure_available()?;
        let board = self.current_analysis()?;
        let language = language.unwrap_or(board.language);

        self.run("cost analysis", &self.costs, async {
            let prompt = prompts::production_costs(&board.result, &board.idea, language)
                .context("Failed to serialize the analysis")?;
            let response = self.generate(GenerationRequest::json(prompt)).await?;
            let costs: CostAnalysisResult = parse_json(
                response.text.as_deref(),
                "cost analysis",
                Expected::ObjectWithArray("productionCosts"),
            )?;
            Ok::<_, anyhow::Error>(costs)
        })
        .await
    }

    /// Hypothetical producers matching the current analysis.
    pub async fn find_producers(
        &self,
        max_results: Option<usize>,
        language: Option<Language>,
    ) -> Result<Vec<ProducerProfile>, StudioError> {
        self.quota.ensure_available()?;
        let board = self.current_analysis()?;
        let language = language.unwrap_or(board.language);
        let max_results = max_results
            .filter(|n| *n > 0)
            .unwrap_or(self.settings.producer_count);

        self.run("producers", &self.producers, async {
            let prompt =
                prompts::producers(&board.element_names(), &board.idea, max_results, language);
            let response = self
                .generate(GenerationRequest::json_with_schema(prompt, schemas::producers()))
                .await?;
            let mut producers: Vec<ProducerProfile> =
                parse_json(response.text.as_deref(), "producers", Expected::Array)?;
            for producer in producers.iter_mut() {
                producer.id = uuid::Uuid::new_v4().to_string();
            }
            Ok::<_, anyhow::Error>(producers)
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Standalone generators
    // -----------------------------------------------------------------------

    pub async fn song_idea(
        &self,
        description: &str,
        language: Option<Language>,
    ) -> Result<SongIdeaResult, StudioError> {
        self.quota.ensure_available()?;
        require_input(description, "Please describe the song you have in mind.")?;
        let language = self.language(language);

        self.run("song idea", &self.song_idea, async {
            let prompt = prompts::song_idea(description, language);
            let response = self.generate(GenerationRequest::json(prompt)).await?;
            let idea: SongIdeaResult = parse_json(
                response.text.as_deref(),
                "song idea",
                Expected::ObjectWithKey("keyCharacteristics"),
            )?;
            Ok::<_, anyhow::Error>(idea)
        })
        .await
    }

    /// ABC notation for a described melody, without code fences.
    pub async fn sheet_music(
        &self,
        description: &str,
        engine: NotationEngine,
        language: Option<Language>,
    ) -> Result<String, StudioError> {
        self.quota.ensure_available()?;
        require_input(description, "Please describe the melody you want to notate.")?;
        let language = self.language(language);

        self.run("sheet music", &self.sheet_music, async {
            let prompt = prompts::sheet_music_abc(description, language, engine);
            let response = self.generate(GenerationRequest::text(prompt)).await?;
            let abc = clean_abc(&require_text(response)?);
            if abc.is_empty() {
                return Err(InterpretError::Empty.into());
            }
            Ok::<_, anyhow::Error>(abc)
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Market trends
    // -----------------------------------------------------------------------

    pub async fn market_trends(
        &self,
        query: &str,
        mode: MarketAnalysisMode,
        language: Option<Language>,
    ) -> Result<MarketTrendsResult, StudioError> {
        self.quota.ensure_available()?;
        require_input(query, "Please enter a topic to analyze.")?;
        let language = self.language(language);

        self.speech.reset();
        self.run("market trends", &self.market, async {
            let prompt = prompts::market_analysis(query, language, mode);
            let response = self.generate(GenerationRequest::web_search(prompt)).await?;
            let sources = collect_sources(&response.grounding);
            let text = require_text(response)?;
            Ok::<_, anyhow::Error>(parse_market_analysis(&text, sources, mode))
        })
        .await
    }

    /// Spoken narration of the current market report, as base64 audio.
    pub async fn market_speech(&self) -> Result<String, StudioError> {
        self.quota.ensure_available()?;
        let report = self
            .market
            .result()
            .ok_or_else(|| StudioError::bad_request("Run a market analysis first."))?;
        let narration = narration_text(&report);
        require_input(&narration, "The market report has nothing to narrate.")?;

        self.run("market speech", &self.speech, async {
            let response = self.generate(GenerationRequest::speech(narration.clone())).await?;
            let audio = response
                .audio
                .filter(|audio| !audio.is_empty())
                .ok_or_else(|| anyhow!("No audio data received from API."))?;
            STANDARD
                .decode(&audio)
                .context("Speech audio is not valid base64")?;
            Ok::<_, anyhow::Error>(audio)
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Providers and search
    // -----------------------------------------------------------------------

    async fn request_providers(
        &self,
        query: &str,
        category: ProviderCategory,
        location: Option<GeoLocation>,
        language: Language,
    ) -> anyhow::Result<Vec<ProviderSearchResult>> {
        let prompt = prompts::local_providers(query, category, location, language);
        let response = self
            .generate(GenerationRequest::json_with_schema(
                prompt,
                schemas::local_providers(),
            ))
            .await?;
        let mut providers: Vec<ProviderSearchResult> =
            parse_json(response.text.as_deref(), "provider search", Expected::Array)?;
        for provider in providers.iter_mut() {
            if provider.id.trim().is_empty() {
                provider.id = uuid::Uuid::new_v4().to_string();
            }
            if provider.provider_type != ProviderType::Studio {
                provider.specialty = None;
            }
            provider.specialty = provider.specialty.take().filter(|s| !s.trim().is_empty());
        }
        Ok(providers)
    }

    /// Fictional local stores or studios matching `query`.
    pub async fn find_providers(
        &self,
        query: &str,
        category: ProviderCategory,
        location: Option<GeoLocation>,
        language: Option<Language>,
    ) -> Result<Vec<ProviderSearchResult>, StudioError> {
        self.quota.ensure_available()?;
        require_input(query, "Please enter what you are looking for.")?;
        if category == ProviderCategory::Unspecified {
            return Err(StudioError::bad_request(
                "Choose whether to search for stores or studios.",
            ));
        }
        let language = self.language(language);

        self.run(
            "provider search",
            &self.providers,
            self.request_providers(query, category, location, language),
        )
        .await
    }

    async fn route_search(&self, query: &str, language: Language) -> anyhow::Result<SearchOutcome> {
        let response = self
            .generate(GenerationRequest::json_with_schema(
                prompts::classify_query(query),
                schemas::query_classification(),
            ))
            .await?;
        let classification: SearchQueryClassification = parse_json(
            response.text.as_deref(),
            "search classification",
            Expected::ObjectWithKey("type"),
        )?;
        debug!("Search query classified as {:?}", classification);

        match (classification.query_type, classification.provider_type) {
            (QueryType::ProviderSearch, category) if category != ProviderCategory::Unspecified => {
                let provider_query = if classification.search_query.trim().is_empty() {
                    query
                } else {
                    classification.search_query.as_str()
                };
                let providers = self
                    .request_providers(provider_query, category, None, language)
                    .await?;
                Ok(SearchOutcome::Providers(providers))
            }
            _ => {
                let prompt = prompts::semantic_search(query, &self.settings.search_index, language);
                let response = self
                    .generate(GenerationRequest::json_with_schema(
                        prompt,
                        schemas::semantic_search(),
                    ))
                    .await?;
                let mut pages: Vec<SearchResultItem> =
                    parse_json(response.text.as_deref(), "semantic search", Expected::Array)?;
                pages.retain(|page| page.target_page != TargetPage::Unknown);
                Ok(SearchOutcome::Pages(pages))
            }
        }
    }

    /// Site search. Provider queries are routed to the provider finder,
    /// everything else to the semantic search over the content index.
    pub async fn search(
        &self,
        query: &str,
        language: Option<Language>,
    ) -> Result<SearchOutcome, StudioError> {
        self.quota.ensure_available()?;
        require_input(query, "Please enter a search query.")?;
        let language = self.language(language);

        self.run(
            "site search",
            &self.search,
            self.route_search(query, language),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Live tutor
    // -----------------------------------------------------------------------

    /// Start a tutor session and return the setup message for the live API.
    pub fn tutor_setup(&self, language: Option<Language>) -> Result<serde_json::Value, StudioError> {
        self.quota.ensure_available()?;
        let language = self.language(language);
        self.lock_tutor().start();
        info!("Live tutor session starting");
        Ok(live_setup(&self.settings.live_model, language))
    }

    pub fn tutor_event(&self, event: TutorEvent) -> TutorUpdate {
        let mut session = self.lock_tutor();
        let mut effects = MessageEffects::default();
        match event {
            TutorEvent::Open => session.on_open(),
            TutorEvent::Message { message } => effects = session.on_message(&message),
            TutorEvent::Error { message } => {
                let error = session.on_error(message.as_deref());
                warn!(kind = error.kind.as_str(), "Live tutor error: {}", error.message);
                if error.is_quota() {
                    self.flag_quota();
                }
            }
            TutorEvent::Close => session.on_close(),
            TutorEvent::Stop => session.stop(),
        }
        TutorUpdate {
            session: session.clone(),
            effects,
        }
    }

    pub fn tutor_session(&self) -> TutorSession {
        self.lock_tutor().clone()
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn snapshot_project(&self, name: Option<String>) -> Result<SavedProject, StudioError> {
        let board = self
            .analysis
            .result()
            .ok_or_else(|| StudioError::bad_request("There is no analysis to save."))?;
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                format!("Project {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
            });

        Ok(SavedProject {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            timestamp: chrono::Utc::now().timestamp_millis(),
            idea: board.idea,
            idea_details: board.idea_details,
            comprehensive_result: board.result,
        })
    }

    /// Make a saved project the current analysis.
    pub fn restore_project(
        &self,
        project: SavedProject,
        language: Option<Language>,
    ) -> AnalysisBoard {
        let board = AnalysisBoard::new(
            MusicIdea {
                idea: project.idea,
                idea_details: project.idea_details,
            },
            self.language(language),
            project.comprehensive_result,
        );
        self.costs.reset();
        self.brief.reset();
        self.analysis.succeed(board.clone());
        info!("Restored project {} ({})", project.name, project.id);
        board
    }

    // -----------------------------------------------------------------------
    // Quota and state
    // -----------------------------------------------------------------------

    pub fn quota_exhausted(&self) -> bool {
        self.quota.is_exhausted()
    }

    pub fn dismiss_quota(&self) {
        self.quota.dismiss();
        set_quota_exhausted(false);
        info!("Quota warning dismissed");
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot {
            quota_exhausted: self.quota.is_exhausted(),
            analysis: self.analysis.snapshot(),
            brief: self.brief.snapshot(),
            costs: self.costs.snapshot(),
            producers: self.producers.snapshot(),
            song_idea: self.song_idea.snapshot(),
            sheet_music: self.sheet_music.snapshot(),
            market: self.market.snapshot(),
            speech: self.speech.snapshot(),
            providers: self.providers.snapshot(),
            search: self.search.snapshot(),
            tutor: self.tutor_session(),
        }
    }
}
