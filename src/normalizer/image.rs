//! Cover image and feed icon heuristics.

use std::sync::LazyLock;

use feed_rs::model::Entry;
use html_escape::decode_html_entities;
use regex::Regex;
use url::Url;

/// Host (and optional path prefix) of the favicon service.
pub const DEFAULT_FAVICON_PROVIDER: &str = "www.google.com/s2";

const IMG_SRC_PATTERN: &str = r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#;

static IMG_SRC: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(IMG_SRC_PATTERN));

/// Pick a cover image for an entry: explicit item image, then banner image,
/// then the first `<img>` in the entry's HTML body.
pub fn cover_image(entry: &Entry, html: Option<&str>) -> Option<String> {
    item_image(entry)
        .or_else(|| banner_image(entry))
        .or_else(|| html.and_then(first_img_src))
}

/// Media thumbnails, then image-typed media content (RSS enclosures land here).
fn item_image(entry: &Entry) -> Option<String> {
    let thumbnail = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.trim())
        .find(|uri| !uri.is_empty());

    if let Some(uri) = thumbnail {
        return Some(uri.to_string());
    }

    entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .filter(|c| {
            c.content_type
                .as_ref()
                .is_some_and(|t| t.ty() == "image")
        })
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
}

/// Image-typed enclosure links (Atom `rel="enclosure"`).
fn banner_image(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .filter(|l| l.rel.as_deref() == Some("enclosure"))
        .filter(|l| {
            l.media_type
                .as_deref()
                .is_some_and(|t| t.starts_with("image/"))
        })
        .map(|l| l.href.trim())
        .find(|href| !href.is_empty())
        .map(String::from)
}

/// First `src` of an `<img>` tag, case-insensitive, either quote style.
pub fn first_img_src(html: &str) -> Option<String> {
    let pattern = match IMG_SRC.as_ref() {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::error!("Invalid <img> pattern: {}", e);
            return None;
        }
    };

    pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_html_entities(m.as_str().trim()).to_string())
        .filter(|src| !src.is_empty())
}

/// Favicon service URL for the host of `feed_url`.
pub fn favicon_url(provider: &str, feed_url: &str) -> Option<String> {
    let host = Url::parse(feed_url).ok()?.host_str()?.to_string();
    if host.is_empty() {
        return None;
    }
    Some(format!(
        "https://{}/favicons?domain={}&size=128",
        provider.trim_end_matches('/'),
        host
    ))
}
