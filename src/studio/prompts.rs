//! Prompt builders.
//!
//! Pure functions turning a feature's input into the instruction sent to the
//! model. User supplied values are embedded verbatim. Every prompt states the
//! response language, and JSON prompts spell out the expected shape field by
//! field.

use super::models::{
    ComprehensiveMusicResult, GeoLocation, Language, MarketAnalysisMode, MusicIdea,
    MusicIdeaDetails, NotationEngine, ProviderCategory,
};

/// Rendered in place of an empty optional detail.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Only an empty value falls back; whitespace is passed through as typed.
fn or_not_specified(value: &str) -> &str {
    if value.is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

pub fn comprehensive_analysis(idea: &MusicIdea, language: Language) -> String {
    let MusicIdeaDetails {
        reference_artists,
        specific_instruments,
        target_length,
        daw,
        existing_ideas,
    } = &idea.idea_details;

    format!(
        r#"You are a helpful AI assistant for a music production studio called AURA. Analyze the following user-described musical idea and provide a comprehensive, multi-faceted creative analysis.

User's primary idea: "{idea}"

Additional details provided:
- Reference artists: {reference_artists}
- Specific instruments: {specific_instruments}
- Target song length: {target_length}
- DAW/Software: {daw}
- Existing melodies/lyrics: {existing_ideas}

Your response MUST be a single, valid JSON object. The language for all user-facing text content within the JSON MUST be {language}.

The JSON object must have the following structure and content:
{{
  "songConcept": {{
    "key": "e.g., C Minor, G# Major",
    "tempo": "A descriptive tempo and BPM, e.g., 'Slow and melancholic (75 BPM)'",
    "mood": ["List of 3-4 mood descriptors as strings, e.g., 'Nostalgic', 'Hopeful'"],
    "suggestedInstruments": ["List of 3-5 recommended instruments as strings."],
    "instrumentsToAvoid": ["List of 2-4 instruments to avoid as strings."],
    "productionSuggestions": ["List of 3 actionable production suggestions as strings, e.g., 'Use heavy sidechain compression on pads'"]
  }},
  "productionConsultation": {{
    "disclaimer": "A standard disclaimer that this is creative advice and experimentation is encouraged.",
    "recommendedProducers": ["List of 1-3 relevant producer archetypes, e.g., 'A modern hip-hop producer', 'An orchestral composer'"],
    "suggestedSongElements": [
      {{ "name": "Most relevant musical concept", "description": "Brief description of the concept, e.g., 'Modal Interchange'.", "relevance": "High", "suggestedStep": "A simple, clear next step for the user." }},
      {{ "name": "Another possible concept", "description": "Brief description, e.g., 'Polyrhythms'", "relevance": "Medium", "suggestedStep": "A simple, clear next step." }}
    ],
    "songStructure": {{
      "name": "A common name for the structure, e.g., 'Verse-Chorus Structure'",
      "description": "A brief explanation of why this structure fits the user's idea.",
      "sections": [
        {{"part": "Intro", "description": "A brief description of the intro's purpose and elements."}},
        {{"part": "Verse 1", "description": "A brief description of the first verse."}},
        {{"part": "Chorus", "description": "A brief description of the chorus."}},
        {{"part": "Verse 2", "description": "A brief description of the second verse."}},
        {{"part": "Chorus", "description": "Description of the second chorus."}},
        {{"part": "Bridge", "description": "Description of the bridge's purpose."}},
        {{"part": "Outro", "description": "Description of how to end the song."}}
      ]
    }},
    "productionTips": [
      {{ "icon": "emoji related to the tip", "title": "Tip Title", "description": "Brief description of a potential production technique." }}
    ],
    "songwritingQuestions": ["List of 3-4 important creative questions the user could ask themselves."]
  }},
  "genreSuggestion": {{
    "styleName": "A catchy name for a suitable musical genre/subgenre (e.g., 'Atmospheric Synthwave', 'Minimalist Trap').",
    "description": "A short paragraph describing the genre and why it's suitable.",
    "keyElements": ["List of 3-4 key elements of this genre (e.g., 'Gated reverb on drums', 'Plucky basslines')."]
  }},
  "melodyIdea": {{
    "ideaName": "A name for a simple, relevant musical idea.",
    "description": "A brief sentence about the benefits of this idea for the user's concept.",
    "elements": ["Describe the idea in parts, e.g., 'A simple 4-note piano motif', 'A repeating rhythmic pattern'."],
    "instructions": "A single string containing numbered, step-by-step instructions for creating this idea in a DAW."
  }}
}}
"#,
        idea = idea.idea,
        reference_artists = or_not_specified(reference_artists),
        specific_instruments = or_not_specified(specific_instruments),
        target_length = or_not_specified(target_length),
        daw = or_not_specified(daw),
        existing_ideas = or_not_specified(existing_ideas),
        language = language,
    )
}

pub fn song_idea(description: &str, language: Language) -> String {
    format!(
        r#"You are an AI assistant for a music studio. Your task is to generate a musical concept based on the user's description.
The user's description is: "{description}"

Generate a single, valid JSON object that describes a musical concept. The language for all user-facing text content within the JSON MUST be {language}.

The JSON object must have the following structure:
{{
  "keyCharacteristics": {{
    "key": "A suitable musical key (e.g., 'A Minor', 'F# Major')",
    "tempo": "A descriptive tempo and BPM (e.g., 'Moderato, ~110 BPM')",
    "mood": ["An array of 3-4 mood descriptor strings (e.g., 'Reflective', 'Melancholic', 'Hopeful')"]
  }},
  "recommendedInstruments": ["An array of 3-5 recommended instrument strings (e.g., 'Acoustic Piano', 'String Section', 'Subtle Synth Pad')"],
  "instrumentsToAvoid": ["An array of 2-3 instruments to avoid for this mood (e.g., 'Heavy Electric Guitar', 'Aggressive Drums')"],
  "productionSuggestions": ["An array of 3-4 actionable production tip strings (e.g., 'Use a soft reverb with a long decay time', 'Consider using parallel compression on the piano')."]
}}
"#
    )
}

pub fn producers(elements: &str, idea: &str, max_results: usize, language: Language) -> String {
    format!(
        r#"You are an AI assistant for a modern music studio. Your goal is to find relevant music producers based on a user's preliminary AI-driven song analysis.
The user's potential song elements are: {elements}
The user's primary idea is: {idea}

Generate a list of {max_results} hypothetical music producers who would be a good fit to work on this track.
For each producer, create a plausible name, primary genre (specialty), city, and a short, professional bio.
Also provide a relevance score as a number between 0 and 100.
The response for user-facing fields (name, specialty, city, bio) must be in {language}.
"#
    )
}

pub fn market_analysis(query: &str, language: Language, mode: MarketAnalysisMode) -> String {
    let mut prompt = format!(
        "Analyze the music market for \"{query}\". The response must be a markdown-formatted text in {language}."
    );
    prompt.push_str(match mode {
        MarketAnalysisMode::InDepth => {
            " Provide an in-depth analysis including a detailed summary, key insights, emerging trends, opportunities, and risks."
        }
        MarketAnalysisMode::Swot => {
            " Provide a SWOT analysis (Strengths, Weaknesses, Opportunities, Threats)."
        }
        MarketAnalysisMode::Quick => " Provide a quick, concise summary.",
    });
    prompt.push_str(
        " Use Google Search to get up-to-date information. Also suggest some related queries or topics for further exploration at the end.",
    );
    prompt
}

/// The classification prompt is language neutral; its output only drives
/// internal routing.
pub fn classify_query(query: &str) -> String {
    format!(
        r#"You are a search query classifier for a music studio website. Your job is to determine the user's intent.
The user's query is: "{query}"

Analyze the query.
- If the query is asking to find a local business (e.g., "find guitar shops in London", "recording studios near me", "where can I buy a drum kit"), classify it as a 'provider_search'.
- If the query is about anything else (e.g., "how to make a melody", "who are your producers", "music trends"), classify it as a 'general_search'.

If it is a 'provider_search', determine if the user is looking for 'stores' or 'studios'.
- 'stores': User is looking for instruments, gear, music shops.
- 'studios': User is looking for recording, mixing, mastering services.

Return a single JSON object with the following structure:
- "type": "general_search" or "provider_search"
- "providerType": "stores", "studios", or "none" (use "none" for general_search)
- "searchQuery": The original user query.

The response language is not important as this is for internal logic.
"#
    )
}

pub fn semantic_search(query: &str, search_index: &str, language: Language) -> String {
    format!(
        r#"You are an intelligent search engine for the AURA Music Studio website.
Search the following content index to find items relevant to the user's query.
The user's query is: "{query}"

The content index is:
---
{search_index}
---

Return a JSON array of up to 5 relevant results.
Each result object must have a "title", a "description", and a "targetPage".
- The "title" should be the name of the service, producer, or page.
- The "description" should be a brief, helpful explanation of why this result is relevant to the user's query.
- The "targetPage" must be one of the following exact string values: 'home', 'music_generation', 'instrument_finder', 'ai_tutor', 'music_trends', 'our_producers', 'collaboration', 'my_projects'.

The response language for the title and description fields must be {language}.
If there are no relevant results, return an empty array.
"#
    )
}

pub fn local_providers(
    query: &str,
    category: ProviderCategory,
    location: Option<GeoLocation>,
    language: Language,
) -> String {
    let location_info = match location {
        Some(GeoLocation { lat, lon }) => format!(
            "The user is at approximately latitude {lat} and longitude {lon}. When generating results, invent a plausible distance in kilometers (e.g., \"approx. 2.5 km\")."
        ),
        None => "The user has not provided their location. The 'distance' field should be 'N/A'."
            .to_string(),
    };
    let search_type = category.as_str();
    let provider_type = match category {
        ProviderCategory::Stores => "store",
        _ => "studio",
    };

    format!(
        r#"You are an AI assistant for the "AURA" music studio brand.
Your task is to generate a list of 5 hypothetical {search_type} that match the user's search query.
The user's query is: "{query}".
{location_info}

Generate plausible, fictional results.
For each result, provide:
- A unique 'id' (e.g., a UUID).
- 'type': must be '{provider_type}'.
- 'name': a plausible name.
- 'description': a short bio for a studio, or a description for a store.
- 'address': a fictional but realistic address.
- 'phone': a realistic phone number.
- 'website': a URL using the example.com domain.
- 'whatsapp': a realistic phone number (can be the same as 'phone').
- 'distance': as instructed above.
- 'services': provide a list of 3-5 relevant services (e.g., 'Guitar Repair', 'Vocal Recording').
- 'specialty': IF the type is 'studio', provide a specialty (e.g., 'Mixing & Mastering', 'Vocal Production'). Otherwise, this can be an empty string.

The response language for all user-facing text (name, description, etc.) MUST be {language}.
The output must be a valid JSON array matching the provided schema.
"#
    )
}

pub fn production_costs(
    analysis: &ComprehensiveMusicResult,
    idea: &str,
    language: Language,
) -> serde_json::Result<String> {
    let analysis = serde_json::to_string(analysis)?;
    Ok(format!(
        "Provide an estimated production cost analysis in {language} for a song based on this idea: \"{idea}\" and this AI analysis: {analysis}. Assume costs are in USD. The response must be a JSON object with one key \"productionCosts\", which is an array of objects. Each object should have \"name\", \"estimatedCost\" (as a number), and \"unit\" (e.g., 'per hour', 'flat fee'). Include items like studio time, mixing, mastering, and session musicians if relevant."
    ))
}

fn composer_line(language: Language) -> &'static str {
    match language {
        Language::En => "Generated by AURA AI",
        Language::Fa => "تولید شده توسط هوش مصنوعی AURA",
        Language::Ar => "تم إنشاؤه بواسطة AURA AI",
    }
}

fn engine_instruction(engine: NotationEngine) -> &'static str {
    match engine {
        NotationEngine::Lilypond => "The generated music should be elegant and clean, suitable for high-quality engraving, reflecting the style of LilyPond.",
        NotationEngine::Abjad => "The generated music can be more complex, algorithmic, or contemporary in style, reflecting the capabilities of Abjad.",
        NotationEngine::Music21 => "The generated music should be well-balanced and versatile, suitable for general-purpose analysis and performance, reflecting the style of Music21.",
    }
}

pub fn sheet_music_abc(description: &str, language: Language, engine: NotationEngine) -> String {
    let composer = composer_line(language);
    let engine_name = engine.as_str();
    let instruction = engine_instruction(engine);

    format!(
        r#"You are an expert music theory AI assistant. Your task is to generate musical notation in ABC format based on a user's description.
The response language for the title (T: field) should be "{language}".

User description: "{description}"
Selected Generation Engine Style: {engine_name}. {instruction}

ABC Notation Requirements:
1.  Start with a reference number (X: 1).
2.  Include a title based on the user's prompt (T: Title).
3.  Include a composer (C: {composer}).
4.  Include a meter (M: e.g., 4/4).
5.  Include a default note length (L: e.g., 1/4).
6.  Include a key (K: e.g., C).
7.  The melody should be simple and accurately represent the user's description and the selected engine's style. For "Twinkle Twinkle Little Star", the notes are "C C G G A A G-".

Example for "Twinkle Twinkle Little Star" in C Major:
X: 1
T: Twinkle Twinkle Little Star
C: AURA AI
M: 4/4
L: 1/4
K: C
C C G G | A A G- | F F E E | D D C- |
G G F F | E E D- | G G F F | E E D- |
C C G G | A A G- | F F E E | D D C- |

Your response MUST contain ONLY the raw ABC notation code. Do NOT include any other text, explanations, or markdown backticks.
"#
    )
}

pub fn element_details(element_name: &str, language: Language) -> String {
    format!(
        "Provide a more detailed, easy-to-understand explanation for the musical concept \"{element_name}\" for a musician. Include its purpose, common usage, and examples. Format the response as a simple markdown string. The language must be {language}."
    )
}

pub fn element_further_reading(element_name: &str, language: Language) -> String {
    format!(
        "Provide a concise, academic-style summary for the music theory concept \"{element_name}\", mentioning its historical context and theoretical underpinnings. Use Google Search to find sources. Format as markdown, including a list of source links at the end. The language must be {language}."
    )
}

pub fn production_brief(
    analysis: &ComprehensiveMusicResult,
    idea: &str,
    language: Language,
) -> serde_json::Result<String> {
    let analysis = serde_json::to_string(analysis)?;
    Ok(format!(
        r#"Based on this AI music analysis, create a concise production brief for a producer.
Format it as clean HTML with simple tags like <h3>, <p>, and <ul>. Do not include <html> or <body> tags. The language must be {language}.
Analysis Data: {analysis}
User Idea: {idea}
"#
    ))
}

pub fn tutor_system_instruction(language: Language) -> String {
    format!(
        "You are AURA, an AI Music Tutor. Provide helpful and concise information about music theory, production, and history. When asked about current trends or specific facts, use Google Search to provide up-to-date information. Your responses will be spoken, so keep them conversational. Language: {language}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::models::SongConcept;

    fn sad_piano() -> MusicIdea {
        MusicIdea {
            idea: "a sad piano song".to_string(),
            idea_details: MusicIdeaDetails::default(),
        }
    }

    #[test]
    fn test_empty_details_render_placeholder_once_per_field() {
        let prompt = comprehensive_analysis(&sad_piano(), Language::En);

        for label in [
            "- Reference artists: ",
            "- Specific instruments: ",
            "- Target song length: ",
            "- DAW/Software: ",
            "- Existing melodies/lyrics: ",
        ] {
            let line = format!("{}{}\n", label, NOT_SPECIFIED);
            assert_eq!(prompt.matches(&line).count(), 1, "{}", label);
        }
        assert_eq!(prompt.matches(NOT_SPECIFIED).count(), 5);
        assert!(prompt.contains("User's primary idea: \"a sad piano song\""));
        assert!(prompt.contains("MUST be en."));
    }

    #[test]
    fn test_provided_details_are_embedded_verbatim() {
        let mut idea = sad_piano();
        idea.idea_details.daw = "Ableton \"Live\" 12".to_string();
        idea.idea_details.reference_artists = "   ".to_string();

        let prompt = comprehensive_analysis(&idea, Language::Fa);
        assert!(prompt.contains("- DAW/Software: Ableton \"Live\" 12\n"));
        assert!(prompt.contains("- Reference artists:    \n"));
        assert_eq!(prompt.matches(NOT_SPECIFIED).count(), 3);
        assert!(prompt.contains("MUST be fa."));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        assert_eq!(
            comprehensive_analysis(&sad_piano(), Language::Ar),
            comprehensive_analysis(&sad_piano(), Language::Ar)
        );
        assert_eq!(song_idea("x", Language::En), song_idea("x", Language::En));
    }

    #[test]
    fn test_market_prompt_per_mode() {
        let quick = market_analysis("lofi", Language::En, MarketAnalysisMode::Quick);
        assert!(quick.starts_with("Analyze the music market for \"lofi\"."));
        assert!(quick.contains("quick, concise summary"));
        assert!(quick.contains("Use Google Search"));
        assert!(quick.ends_with("for further exploration at the end."));

        let swot = market_analysis("lofi", Language::En, MarketAnalysisMode::Swot);
        assert!(swot.contains("SWOT analysis"));

        let deep = market_analysis("lofi", Language::En, MarketAnalysisMode::InDepth);
        assert!(deep.contains("emerging trends, opportunities, and risks"));
    }

    #[test]
    fn test_local_providers_location_handling() {
        let without = local_providers("drums", ProviderCategory::Stores, None, Language::En);
        assert!(without.contains("'distance' field should be 'N/A'"));
        assert!(without.contains("5 hypothetical stores"));
        assert!(without.contains("'type': must be 'store'."));

        let with = local_providers(
            "mixing",
            ProviderCategory::Studios,
            Some(GeoLocation { lat: 35.7, lon: 51.4 }),
            Language::En,
        );
        assert!(with.contains("latitude 35.7 and longitude 51.4"));
        assert!(with.contains("'type': must be 'studio'."));
    }

    #[test]
    fn test_sheet_music_composer_line_and_engine() {
        let prompt = sheet_music_abc("a waltz", Language::Fa, NotationEngine::Lilypond);
        assert!(prompt.contains("C: تولید شده توسط هوش مصنوعی AURA"));
        assert!(prompt.contains("Selected Generation Engine Style: lilypond."));
        assert!(prompt.contains("style of LilyPond"));

        let prompt = sheet_music_abc("a waltz", Language::En, NotationEngine::Music21);
        assert!(prompt.contains("(C: Generated by AURA AI)"));
    }

    #[test]
    fn test_analysis_is_embedded_as_json() {
        let analysis = ComprehensiveMusicResult {
            song_concept: SongConcept {
                key: "D Minor".to_string(),
                ..Default::default()
            },
            production_consultation: Default::default(),
            genre_suggestion: Default::default(),
            melody_idea: Default::default(),
        };
        let costs = production_costs(&analysis, "idea", Language::En).unwrap();
        assert!(costs.contains("\"songConcept\":{\"key\":\"D Minor\""));
        assert!(costs.contains("\"productionCosts\""));

        let brief = production_brief(&analysis, "idea", Language::En).unwrap();
        assert!(brief.contains("Analysis Data: {\"songConcept\""));
        assert!(brief.contains("User Idea: idea"));
    }

    #[test]
    fn test_element_prompts() {
        assert!(element_details("Modal Interchange", Language::En)
            .contains("musical concept \"Modal Interchange\""));
        assert!(element_further_reading("Modal Interchange", Language::Ar)
            .ends_with("The language must be ar."));
        assert!(tutor_system_instruction(Language::Fa).ends_with("Language: fa"));
    }
}
