//! Ordered selector heuristics for title and thumbnail

use super::VideoInfo;
use scraper::{ElementRef, Html, Selector};

/// Shown when every title strategy comes up empty
pub const TITLE_FALLBACK: &str = "Unknown Title";

const TITLE_MAX_CHARS: usize = 100;

/// Title sources in priority order; the first element whose value is
/// non-empty after trimming wins
const TITLE_SELECTORS: &[&str] = &[
    "title",
    "h1",
    "[data-title]",
    ".video-title",
    ".title",
    "meta[property=\"og:title\"]",
    "meta[name=\"title\"]",
];

/// Thumbnail sources in priority order; an element with an empty
/// poster/src does not stop the search
const THUMBNAIL_SELECTORS: &[&str] = &[
    "meta[property=\"og:image\"]",
    "meta[name=\"twitter:image\"]",
    "video",
    ".video-thumbnail img",
    ".thumbnail img",
];

/// Run the full heuristic pipeline over a page
pub fn extract_video_info(html: &str, page_url: &str) -> VideoInfo {
    let document = Html::parse_document(html);

    let title = extract_title(&document)
        .map(|raw| normalize_title(&raw))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| TITLE_FALLBACK.to_string());

    let thumbnail = extract_thumbnail(&document);

    tracing::debug!("Extracted '{}' from {}", title, page_url);
    VideoInfo::new(page_url.to_string(), title, thumbnail)
}

fn extract_title(document: &Html) -> Option<String> {
    for raw_selector in TITLE_SELECTORS {
        let selector = Selector::parse(raw_selector).expect("title selector");
        if let Some(element) = document.select(&selector).next() {
            let candidate = element_title_value(&element);
            let trimmed = candidate.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Meta tags carry their value in `content`; everything else contributes
/// its text content
fn element_title_value(element: &ElementRef<'_>) -> String {
    if element.value().name() == "meta" {
        element.value().attr("content").unwrap_or("").to_string()
    } else {
        element.text().collect::<String>()
    }
}

fn extract_thumbnail(document: &Html) -> String {
    for raw_selector in THUMBNAIL_SELECTORS {
        let selector = Selector::parse(raw_selector).expect("thumbnail selector");
        if let Some(element) = document.select(&selector).next() {
            let candidate = match element.value().name() {
                "meta" => element.value().attr("content").unwrap_or(""),
                "video" => element.value().attr("poster").unwrap_or(""),
                _ => element.value().attr("src").unwrap_or(""),
            };
            if !candidate.is_empty() {
                return candidate.to_string();
            }
        }
    }
    String::new()
}

/// Clean a raw title: a single leading/trailing dash separator is dropped,
/// whitespace runs collapse to one space, and anything past 100 characters
/// is cut with an ellipsis marker
pub fn normalize_title(raw: &str) -> String {
    let stripped = raw.trim();
    let stripped = stripped
        .strip_prefix('-')
        .map(str::trim_start)
        .unwrap_or(stripped);
    let stripped = stripped
        .strip_suffix('-')
        .map(str::trim_end)
        .unwrap_or(stripped);

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > TITLE_MAX_CHARS {
        let cut: String = collapsed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}
