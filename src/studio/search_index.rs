//! Content index searched by the semantic site search.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use super::models::TargetPage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEntry {
    title: &'static str,
    description: &'static str,
    target_page: &'static str,
}

#[derive(Debug, Serialize)]
struct ProducerEntry {
    name: &'static str,
    specialty: &'static str,
    bio: &'static str,
    credits: &'static str,
}

#[derive(Debug, Serialize)]
struct PageEntry {
    name: &'static str,
    target: &'static str,
    description: &'static str,
}

const SERVICES: &[ServiceEntry] = &[
    ServiceEntry { title: "Song Idea Generator", description: "Describe a mood or theme and get a complete musical concept with instruments and production tips.", target_page: "music_generation" },
    ServiceEntry { title: "Comprehensive Analysis", description: "Get a deep analysis of your musical idea, including theory, arrangement, and cost estimates.", target_page: "music_generation" },
    ServiceEntry { title: "Sheet Music Generator", description: "Describe a melody and get it transcribed into sheet music using our AI notation tool.", target_page: "music_generation" },
    ServiceEntry { title: "Lyric Assistant", description: "Overcome writer's block with an AI partner that helps you write compelling lyrics.", target_page: "music_generation" },
    ServiceEntry { title: "Chord Progressions", description: "Generate harmonically rich chord progressions in any key or genre.", target_page: "music_generation" },
    ServiceEntry { title: "Drum Pattern Maker", description: "Create intricate drum beats and rhythms for any style, from hip-hop to rock.", target_page: "music_generation" },
    ServiceEntry { title: "AI Mastering", description: "Get an instant audio master to make your tracks sound loud, clear, and ready for release.", target_page: "music_generation" },
    ServiceEntry { title: "Remix Tool", description: "Upload a track and get AI-generated remix ideas and stems to work with.", target_page: "music_generation" },
    ServiceEntry { title: "Album Art Generator", description: "Create stunning, AI-generated cover art for your singles and albums.", target_page: "music_generation" },
    ServiceEntry { title: "Collaboration Finder", description: "Connect with other artists and producers based on your genre and style.", target_page: "collaboration" },
];

const PRODUCERS: &[ProducerEntry] = &[
    ProducerEntry { name: "Anousheh", specialty: "Synthwave, Electronic", bio: "Specializes in analog synth sound design and atmospheric production, with over 15 years of experience.", credits: "Starlight Drive (Album)" },
    ProducerEntry { name: "Ben Carter", specialty: "Hip-Hop, Trap", bio: "Expert in modern drum programming and sample-based production, focusing on radio-ready hits.", credits: "City Lights (Single)" },
    ProducerEntry { name: "Ava Nazari", specialty: "Orchestral, Film Score", bio: "Focuses on large-scale orchestral arrangements and emotional scoring for film and games.", credits: "The Last Kingdom (Score)" },
];

fn page_description(page: TargetPage) -> Option<(&'static str, &'static str)> {
    match page {
        TargetPage::Home | TargetPage::Unknown => None,
        TargetPage::MusicGeneration => Some(("AI Music Analysis", "Describe your musical idea, and our AI will provide a deep creative analysis, including theory, arrangement, cost estimates, and more.")),
        TargetPage::InstrumentFinder => Some(("Instrument Finder", "Locate the nearest instrument shop or recording studio for your needs.")),
        TargetPage::AiTutor => Some(("AI Music Tutor", "Ask me anything about music theory, production, or songwriting. I'm here to help you on your creative journey.")),
        TargetPage::MusicTrends => Some(("Music Trends", "Enter a topic to get the latest market insights, genre trends, and analyses powered by Google Search.")),
        TargetPage::OurProducers => Some(("Our Producers", "Our studio is proud to have a team of highly qualified and experienced producers dedicated to sonic excellence.")),
        TargetPage::Collaboration => Some(("Collaboration", "We are seeking talented artists and collaborators to join our creative ecosystem. Our mission is to democratize access to professional production tools and label opportunities through technology.")),
        TargetPage::MyProjects => Some(("My Projects", "Review, restore, or delete your past AI-generated music sessions.")),
    }
}

/// The built-in index describing the studio's services, producers and pages.
pub fn default_search_index() -> String {
    let pages: Vec<PageEntry> = TargetPage::ALL
        .iter()
        .filter_map(|page| {
            page_description(*page).map(|(name, description)| PageEntry {
                name,
                target: page.as_str(),
                description,
            })
        })
        .collect();

    // Serializing plain string structs cannot fail.
    let services = serde_json::to_string(SERVICES).unwrap_or_default();
    let producers = serde_json::to_string(PRODUCERS).unwrap_or_default();
    let pages = serde_json::to_string(&pages).unwrap_or_default();

    format!(
        "Services available at AURA Music Studio: {}.\nProducers at AURA: {}.\nWebsite Pages: {}.",
        services, producers, pages
    )
}

/// Read a custom index from a text file.
pub fn load_search_index(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read search index: {:?}", path))?;
    let content = content.trim();
    if content.is_empty() {
        anyhow::bail!("Search index file is empty: {:?}", path);
    }
    Ok(content.to_string())
}
