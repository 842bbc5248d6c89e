//! Market report extraction from free form markdown.
//!
//! Parsing is lenient: a missing section yields an empty string or list and
//! never an error.

use lazy_static::lazy_static;
use regex::Regex;

use super::models::{EmergingTrend, MarketAnalysisMode, MarketReport, MarketTrendsResult};
use crate::ai::Source;

lazy_static! {
    static ref BULLET: Regex = Regex::new(r"^[-*]\s*").unwrap();
    static ref TREND_ENTRY: Regex = Regex::new(r"\*\*(.*?):\*\*\s*(.*)").unwrap();
    static ref QUERIES_HEADING: Regex =
        Regex::new(r"(?i)(?:##|###) (?:Suggested Queries|Related Topics)").unwrap();
    static ref QUERIES_BOUNDARY: Regex =
        Regex::new(r"(?i)\n(?:##|###) (?:Suggested Queries|Related Topics)").unwrap();
    static ref SUMMARY_HEADING: Regex = Regex::new(r"(?i)^##\s*Summary\s*\n").unwrap();
}

/// Content of the `## Header` / `### Header` section, up to the next
/// heading or the end of the text, trimmed.
pub fn section_content(text: &str, header: &str) -> String {
    let pattern = format!(r"(?i)(?:##|###) {}\n", regex::escape(header));
    let Ok(heading) = Regex::new(&pattern) else {
        return String::new();
    };
    let Some(found) = heading.find(text) else {
        return String::new();
    };

    let rest = &text[found.end()..];
    let end = rest.find("\n##").unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

fn strip_bullets(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| BULLET.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Lines of a section with their `-`/`*` markers removed.
pub fn bulleted_list(text: &str, header: &str) -> Vec<String> {
    strip_bullets(&section_content(text, header))
}

/// Every line after the suggested queries (or related topics) heading.
pub fn suggested_queries(text: &str) -> Vec<String> {
    // The rest of the heading line is part of the heading.
    let body = QUERIES_HEADING
        .find(text)
        .and_then(|found| text[found.end()..].find('\n').map(|i| found.end() + i + 1));
    match body {
        Some(start) => strip_bullets(&text[start..]),
        None => Vec::new(),
    }
}

/// `**Name:** description` entries of the emerging trends section.
pub fn emerging_trends(text: &str) -> Vec<EmergingTrend> {
    section_content(text, "Emerging Trends")
        .lines()
        .filter_map(|line| {
            let captures = TREND_ENTRY.captures(line)?;
            Some(EmergingTrend {
                name: captures.get(1)?.as_str().trim().to_string(),
                description: captures.get(2)?.as_str().trim().to_string(),
            })
        })
        .collect()
}

/// Text before the suggested queries heading, without a leading
/// `## Summary` heading.
pub fn quick_summary(text: &str) -> String {
    let end = QUERIES_BOUNDARY
        .find(text)
        .map(|found| found.start())
        .unwrap_or(text.len());
    let summary = text[..end].trim();
    SUMMARY_HEADING.replace(summary, "").into_owned()
}

pub fn parse_market_analysis(
    text: &str,
    sources: Vec<Source>,
    mode: MarketAnalysisMode,
) -> MarketTrendsResult {
    let report = match mode {
        MarketAnalysisMode::InDepth => MarketReport::InDepth {
            key_insights: bulleted_list(text, "Key Insights"),
            detailed_summary: section_content(text, "Detailed Summary"),
            emerging_trends: emerging_trends(text),
            opportunities: bulleted_list(text, "Opportunities"),
            risks: bulleted_list(text, "Risks"),
        },
        MarketAnalysisMode::Swot => MarketReport::Swot {
            strengths: bulleted_list(text, "Strengths"),
            weaknesses: bulleted_list(text, "Weaknesses"),
            opportunities: bulleted_list(text, "Opportunities"),
            threats: bulleted_list(text, "Threats"),
        },
        MarketAnalysisMode::Quick => MarketReport::Quick {
            summary: quick_summary(text),
        },
    };

    MarketTrendsResult {
        report,
        sources,
        suggested_queries: suggested_queries(text),
    }
}

fn labelled_list(label: &str, items: &[String]) -> String {
    format!("**{}**\n{}", label, items.join("\n- "))
}

/// Plain narration of a report, fed to the speech model.
pub fn narration_text(result: &MarketTrendsResult) -> String {
    match &result.report {
        MarketReport::Quick { summary } => summary.clone(),
        MarketReport::InDepth {
            key_insights,
            detailed_summary,
            emerging_trends,
            opportunities,
            risks,
        } => {
            let trends = emerging_trends
                .iter()
                .map(|t| format!("{}: {}", t.name, t.description))
                .collect::<Vec<_>>()
                .join("\n");
            [
                labelled_list("Key Insights", key_insights),
                format!("**Detailed Summary**\n{}", detailed_summary),
                format!("**Emerging Trends**\n{}", trends),
                labelled_list("Opportunities", opportunities),
                labelled_list("Risks", risks),
            ]
            .join("\n\n")
        }
        MarketReport::Swot {
            strengths,
            weaknesses,
            opportunities,
            threats,
        } => [
            labelled_list("Strengths", strengths),
            labelled_list("Weaknesses", weaknesses),
            labelled_list("Opportunities", opportunities),
            labelled_list("Threats", threats),
        ]
        .join("\n\n"),
    }
}
