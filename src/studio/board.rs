//! The current analysis and its name keyed element index.

use serde::Serialize;
use std::collections::HashMap;

use super::models::{
    ComprehensiveMusicResult, GeneratedSongElement, Language, MusicIdea, MusicIdeaDetails,
};

/// A completed analysis together with the idea it was produced from.
///
/// Suggested song elements are addressed by exact name through an index
/// built once per analysis. Several elements may share a name; updates then
/// apply to all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBoard {
    pub idea: String,
    pub idea_details: MusicIdeaDetails,
    pub language: Language,
    pub result: ComprehensiveMusicResult,
    #[serde(skip)]
    positions: HashMap<String, Vec<usize>>,
}

impl AnalysisBoard {
    pub fn new(idea: MusicIdea, language: Language, result: ComprehensiveMusicResult) -> Self {
        let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, element) in result
            .production_consultation
            .suggested_song_elements
            .iter()
            .enumerate()
        {
            positions
                .entry(element.name.clone())
                .or_default()
                .push(index);
        }

        Self {
            idea: idea.idea,
            idea_details: idea.idea_details,
            language,
            result,
            positions,
        }
    }

    pub fn elements(&self) -> &[GeneratedSongElement] {
        &self.result.production_consultation.suggested_song_elements
    }

    pub fn element(&self, name: &str) -> Option<&GeneratedSongElement> {
        let index = *self.positions.get(name)?.first()?;
        self.elements().get(index)
    }

    /// Apply `update` to every element named `name`.
    ///
    /// Returns the first updated element, or `None` when no element carries
    /// that name. Other elements are never touched.
    pub fn update_element(
        &mut self,
        name: &str,
        mut update: impl FnMut(&mut GeneratedSongElement),
    ) -> Option<GeneratedSongElement> {
        let positions = self.positions.get(name)?;
        let elements = &mut self.result.production_consultation.suggested_song_elements;
        for &index in positions {
            if let Some(element) = elements.get_mut(index) {
                update(element);
            }
        }
        positions.first().and_then(|&i| elements.get(i)).cloned()
    }

    /// Names of the suggested elements joined for prompts.
    pub fn element_names(&self) -> String {
        self.elements()
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::models::{ProductionConsultation, Relevance, SongConcept};

    fn element(name: &str) -> GeneratedSongElement {
        GeneratedSongElement {
            name: name.to_string(),
            description: format!("About {}", name),
            relevance: Relevance::Medium,
            suggested_step: "Try it".to_string(),
            details: None,
            is_loading_details: false,
            details_error: None,
            further_reading: None,
            is_loading_further_reading: false,
            further_reading_error: None,
        }
    }

    fn board(names: &[&str]) -> AnalysisBoard {
        let result = ComprehensiveMusicResult {
            song_concept: SongConcept::default(),
            production_consultation: ProductionConsultation {
                suggested_song_elements: names.iter().map(|n| element(n)).collect(),
                ..Default::default()
            },
            genre_suggestion: Default::default(),
            melody_idea: Default::default(),
        };
        AnalysisBoard::new(
            MusicIdea {
                idea: "a sad piano song".to_string(),
                idea_details: Default::default(),
            },
            Language::En,
            result,
        )
    }

    #[test]
    fn test_update_targets_only_named_element() {
        let mut board = board(&["Modal Interchange", "Polyrhythms", "Ostinato"]);
        let before = board.elements().to_vec();

        board.update_element("Polyrhythms", |e| e.is_loading_details = true);
        let updated = board
            .update_element("Polyrhythms", |e| {
                e.details = Some("Two rhythms at once.".to_string());
                e.is_loading_details = false;
            })
            .unwrap();

        let after = board.elements();
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert!(!after[1].is_loading_details);
        assert_eq!(after[1].details.as_deref(), Some("Two rhythms at once."));
        assert_eq!(updated, after[1]);
    }

    #[test]
    fn test_failed_update_records_error() {
        let mut board = board(&["A", "B", "C"]);
        board.update_element("B", |e| {
            e.details_error = Some("A network error occurred.".to_string());
            e.is_loading_details = false;
        });
        let b = board.element("B").unwrap();
        assert!(b.details.is_none());
        assert!(b.details_error.is_some());
        assert!(board.element("A").unwrap().details_error.is_none());
    }

    #[test]
    fn test_unknown_name_is_a_no_op() {
        let mut board = board(&["A", "B"]);
        let before = board.clone();
        assert!(board.update_element("Z", |e| e.details = Some("x".into())).is_none());
        assert_eq!(board, before);
        assert!(board.element("a").is_none());
    }

    #[test]
    fn test_duplicate_names_are_all_updated() {
        let mut board = board(&["Hook", "Bridge", "Hook"]);
        board.update_element("Hook", |e| e.further_reading = Some("r".into()));
        assert!(board.elements()[0].further_reading.is_some());
        assert!(board.elements()[1].further_reading.is_none());
        assert!(board.elements()[2].further_reading.is_some());
    }

    #[test]
    fn test_element_names() {
        assert_eq!(board(&["A", "B"]).element_names(), "A, B");
        assert_eq!(board(&[]).element_names(), "");
    }
}
