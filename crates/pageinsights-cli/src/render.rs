//! Plain-text rendering of session data for the terminal.

use pageinsights_core::{Metric, Page, Profile};
use pageinsights_graph::MetricValue;

pub(crate) fn profile(profile: &Profile) -> String {
    let mut out = profile.name.clone();
    if !profile.picture_url.is_empty() {
        out.push_str(&format!("\n  picture: {}", profile.picture_url));
    }
    if !profile.profile_link.is_empty() {
        out.push_str(&format!("\n  profile: {}", profile.profile_link));
    }
    out
}

pub(crate) fn page_list(pages: &[Page]) -> String {
    if pages.is_empty() {
        return "no administered pages\n".to_string();
    }
    let width = pages.iter().map(|p| p.id.len()).max().unwrap_or(0);
    pages
        .iter()
        .map(|p| format!("{:<width$}  {}\n", p.id, p.name))
        .collect()
}

/// One block per tile: title, value (or `N/A`), description.
pub(crate) fn tiles(tiles: &[(Metric, MetricValue)]) -> String {
    tiles
        .iter()
        .map(|(metric, value)| {
            format!(
                "{:<18} {value}\n  {}\n",
                metric.title(),
                metric.description()
            )
        })
        .collect()
}
