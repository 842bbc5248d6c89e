//! Domain types exchanged with the model and with studio clients.
//!
//! Every type serializes to the camelCase JSON shape the prompts ask the
//! model for, so the same structs are used to decode model output and to
//! answer HTTP clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ai::Source;

/// Target language for user facing text in model output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fa,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fa => "fa",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fa" => Ok(Language::Fa),
            "ar" => Ok(Language::Ar),
            other => Err(format!("Unsupported language '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Music analysis
// ---------------------------------------------------------------------------

/// Optional structured details attached to a music idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MusicIdeaDetails {
    pub reference_artists: String,
    pub specific_instruments: String,
    pub target_length: String,
    pub daw: String,
    pub existing_ideas: String,
}

/// A free text idea plus its details, as submitted for analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicIdea {
    pub idea: String,
    #[serde(default)]
    pub idea_details: MusicIdeaDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

/// A suggested musical concept, later enriched with details on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSongElement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub relevance: Relevance,
    #[serde(default)]
    pub suggested_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub is_loading_details: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub further_reading: Option<String>,
    #[serde(default)]
    pub is_loading_further_reading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub further_reading_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SongConcept {
    pub key: String,
    pub tempo: String,
    pub mood: Vec<String>,
    pub suggested_instruments: Vec<String>,
    pub instruments_to_avoid: Vec<String>,
    pub production_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongSection {
    pub part: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongStructure {
    pub name: String,
    pub description: String,
    pub sections: Vec<SongSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionTip {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductionConsultation {
    pub disclaimer: String,
    pub recommended_producers: Vec<String>,
    pub suggested_song_elements: Vec<GeneratedSongElement>,
    pub song_structure: SongStructure,
    pub arrangement_advice: String,
    pub production_tips: Vec<ProductionTip>,
    pub songwriting_questions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenreSuggestion {
    pub style_name: String,
    pub description: String,
    pub key_elements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MelodyIdea {
    pub idea_name: String,
    pub description: String,
    pub elements: Vec<String>,
    pub instructions: String,
}

/// The full creative analysis of a music idea.
///
/// `songConcept` is mandatory; the other sections default to empty when the
/// model leaves them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveMusicResult {
    pub song_concept: SongConcept,
    #[serde(default)]
    pub production_consultation: ProductionConsultation,
    #[serde(default)]
    pub genre_suggestion: GenreSuggestion,
    #[serde(default)]
    pub melody_idea: MelodyIdea,
}

// ---------------------------------------------------------------------------
// Song idea, costs, producers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCharacteristics {
    pub key: String,
    pub tempo: String,
    pub mood: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongIdeaResult {
    pub key_characteristics: KeyCharacteristics,
    #[serde(default)]
    pub recommended_instruments: Vec<String>,
    #[serde(default)]
    pub instruments_to_avoid: Vec<String>,
    #[serde(default)]
    pub production_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    #[serde(default)]
    pub name: String,
    pub estimated_cost: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysisResult {
    pub production_costs: Vec<CostItem>,
}

/// A hypothetical producer matched to the current analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerProfile {
    /// Assigned locally once the profile is received.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub bio: String,
    /// 0 to 100.
    #[serde(default, deserialize_with = "score_0_to_100")]
    pub relevance_score: u32,
}

/// Accepts fractional or out of range scores and numeric strings, rounding
/// and clamping them into 0..=100. Anything else scores 0.
fn score_0_to_100<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    Ok(score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Search and providers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    GeneralSearch,
    ProviderSearch,
}

/// Which kind of local provider a search is after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    Stores,
    Studios,
    #[default]
    #[serde(rename = "none")]
    Unspecified,
}

impl ProviderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::Stores => "stores",
            ProviderCategory::Studios => "studios",
            ProviderCategory::Unspecified => "none",
        }
    }

    /// The singular provider type produced for this category.
    pub fn provider_type(&self) -> Option<ProviderType> {
        match self {
            ProviderCategory::Stores => Some(ProviderType::Store),
            ProviderCategory::Studios => Some(ProviderType::Studio),
            ProviderCategory::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryClassification {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    #[serde(default)]
    pub provider_type: ProviderCategory,
    #[serde(default)]
    pub search_query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPage {
    Home,
    MusicGeneration,
    InstrumentFinder,
    AiTutor,
    MusicTrends,
    OurProducers,
    Collaboration,
    MyProjects,
    /// Any page name the studio does not route to.
    #[serde(other)]
    Unknown,
}

impl TargetPage {
    pub const ALL: [TargetPage; 8] = [
        TargetPage::Home,
        TargetPage::MusicGeneration,
        TargetPage::InstrumentFinder,
        TargetPage::AiTutor,
        TargetPage::MusicTrends,
        TargetPage::OurProducers,
        TargetPage::Collaboration,
        TargetPage::MyProjects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPage::Home => "home",
            TargetPage::MusicGeneration => "music_generation",
            TargetPage::InstrumentFinder => "instrument_finder",
            TargetPage::AiTutor => "ai_tutor",
            TargetPage::MusicTrends => "music_trends",
            TargetPage::OurProducers => "our_producers",
            TargetPage::Collaboration => "collaboration",
            TargetPage::MyProjects => "my_projects",
            TargetPage::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_page: TargetPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Store,
    Studio,
    #[serde(other)]
    Unknown,
}

/// A fictional local store or studio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

/// Approximate user position used to flavor provider results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

// ---------------------------------------------------------------------------
// Sheet music
// ---------------------------------------------------------------------------

/// Notation engine whose style the generated ABC should imitate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotationEngine {
    #[default]
    Music21,
    Lilypond,
    Abjad,
}

impl NotationEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotationEngine::Music21 => "music21",
            NotationEngine::Lilypond => "lilypond",
            NotationEngine::Abjad => "abjad",
        }
    }
}

// ---------------------------------------------------------------------------
// Market trends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketAnalysisMode {
    #[default]
    #[serde(rename = "quick")]
    Quick,
    #[serde(rename = "in-depth")]
    InDepth,
    #[serde(rename = "swot")]
    Swot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergingTrend {
    pub name: String,
    pub description: String,
}

/// Mode specific part of a market report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarketReport {
    #[serde(rename = "quick")]
    Quick { summary: String },
    #[serde(rename = "in-depth", rename_all = "camelCase")]
    InDepth {
        key_insights: Vec<String>,
        detailed_summary: String,
        emerging_trends: Vec<EmergingTrend>,
        opportunities: Vec<String>,
        risks: Vec<String>,
    },
    #[serde(rename = "swot")]
    Swot {
        strengths: Vec<String>,
        weaknesses: Vec<String>,
        opportunities: Vec<String>,
        threats: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrendsResult {
    #[serde(flatten)]
    pub report: MarketReport,
    pub sources: Vec<Source>,
    pub suggested_queries: Vec<String>,
}

// ---------------------------------------------------------------------------
// Saved projects
// ---------------------------------------------------------------------------

/// A snapshot of an analysis session that can be restored later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub idea: String,
    #[serde(default)]
    pub idea_details: MusicIdeaDetails,
    pub comprehensive_result: ComprehensiveMusicResult,
}
