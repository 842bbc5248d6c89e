//! Canned model replies used by the end-to-end tests

use super::constants::*;
use serde_json::json;

/// A complete comprehensive analysis reply with two song elements
pub fn analysis_reply() -> String {
    json!({
        "songConcept": {
            "key": "C Minor",
            "tempo": "Adagio, ~70 BPM",
            "mood": ["Melancholic", "Intimate"],
            "suggestedInstruments": ["Felt Piano", "Cello"],
            "instrumentsToAvoid": ["Distorted Guitar"],
            "productionSuggestions": ["Close-miked piano with room reverb"]
        },
        "productionConsultation": {
            "disclaimer": "Suggestions are AI generated.",
            "recommendedProducers": ["Ava Nazari"],
            "suggestedSongElements": [
                {
                    "name": ELEMENT_MODAL_INTERCHANGE,
                    "description": "Borrow chords from the parallel major.",
                    "relevance": "High",
                    "suggestedStep": "Try a bVI in the chorus."
                },
                {
                    "name": ELEMENT_OSTINATO,
                    "description": "A repeating left hand figure.",
                    "relevance": "Medium",
                    "suggestedStep": "Loop a four note pattern."
                }
            ],
            "songStructure": {
                "name": "Verse-Chorus",
                "description": "Classic ballad form.",
                "sections": [{ "part": "Verse", "description": "Sparse piano." }]
            },
            "arrangementAdvice": "Add the cello in the second verse.",
            "productionTips": [{ "icon": "mic", "title": "Room", "description": "Capture the room." }],
            "songwritingQuestions": ["What is the song really about?"]
        },
        "genreSuggestion": {
            "styleName": "Neo-classical",
            "description": "Minimal piano pieces.",
            "keyElements": ["Sustain pedal"]
        },
        "melodyIdea": {
            "ideaName": "Falling Sighs",
            "description": "Descending seconds.",
            "elements": ["Appoggiaturas"],
            "instructions": "Resolve every phrase downward."
        }
    })
    .to_string()
}

/// An in-depth market report in markdown
pub fn in_depth_market_reply() -> &'static str {
    "## Key Insights\n\
- Streaming drives discovery\n\
- Playlists favor short tracks\n\
\n\
## Detailed Summary\n\
Lo-fi keeps a steady audience.\n\
\n\
## Emerging Trends\n\
- **Ambient crossovers:** Lo-fi blends with ambient.\n\
\n\
## Opportunities\n\
- Sync licensing\n\
\n\
## Risks\n\
- Market saturation\n\
\n\
## Suggested Queries\n\
- Lo-fi playlist growth\n\
- Ambient crossover artists"
}
