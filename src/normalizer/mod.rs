pub mod image;

use chrono::Utc;
use feed_rs::model::{Content, Entry, Link, Text};
use feed_rs::parser::{self, ParseErrorKind, ParseFeedError};
use html_escape::decode_html_entities;

use crate::app::{ReadOneError, Result};
use crate::domain::{Article, ParsedArticle, ParsedFeed};

pub use image::DEFAULT_FAVICON_PROVIDER;

pub const UNTITLED_ARTICLE: &str = "Untitled";
pub const UNKNOWN_FEED: &str = "Unknown Feed";

#[derive(Clone)]
pub struct Normalizer {
    favicon_provider: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_favicon_provider(DEFAULT_FAVICON_PROVIDER)
    }

    pub fn with_favicon_provider(provider: impl Into<String>) -> Self {
        Self {
            favicon_provider: provider.into(),
        }
    }

    /// Parse `body` (RSS, Atom or JSON Feed) into a [`ParsedFeed`].
    ///
    /// `source_url` is the feed's own URL, used for the icon fallback. When
    /// the body was fetched through a proxy this is still the original URL.
    pub fn normalize(&self, source_url: &str, body: &[u8]) -> Result<ParsedFeed> {
        let feed = parser::Builder::new()
            .id_generator(fallback_guid)
            .build()
            .parse(body)
            .map_err(classify_parse_error)?;

        let title = feed
            .title
            .as_ref()
            .map(|t| clean_text(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_FEED.to_string());

        let description = feed
            .description
            .as_ref()
            .map(|d| clean_text(&d.content))
            .filter(|d| !d.is_empty())
            .or_else(|| feed.links.first().map(|l| l.href.clone()))
            .unwrap_or_default();

        let image_url = feed
            .icon
            .as_ref()
            .or(feed.logo.as_ref())
            .map(|i| i.uri.trim().to_string())
            .filter(|uri| !uri.is_empty())
            .or_else(|| image::favicon_url(&self.favicon_provider, source_url));

        let articles = feed.entries.iter().map(normalize_entry).collect();

        Ok(ParsedFeed {
            title,
            description,
            image_url,
            articles,
        })
    }
}

fn normalize_entry(entry: &Entry) -> ParsedArticle {
    let title = entry_title(entry.title.as_ref());
    let link = item_link(&entry.links);

    let summary = entry
        .summary
        .as_ref()
        .map(|s| s.content.trim().to_string())
        .unwrap_or_default();

    let content = entry_content(entry, &summary);
    let image_url = image::cover_image(entry, html_body(entry));

    let published_at = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let guid = match entry.id.trim() {
        "" => Article::synthesize_guid(link.as_deref(), &title),
        id => id.to_string(),
    };

    ParsedArticle {
        title,
        link,
        description: summary,
        author: entry
            .authors
            .first()
            .map(|a| a.name.trim().to_string())
            .unwrap_or_default(),
        content,
        published_at,
        guid,
        image_url,
    }
}

/// The item's own page, falling back to any other non-enclosure link
/// (JSON Feed `external_url`, Atom `related`).
fn item_link(links: &[Link]) -> Option<String> {
    let usable = |l: &&Link| !l.href.trim().is_empty();

    links
        .iter()
        .filter(usable)
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| {
            links
                .iter()
                .filter(usable)
                .find(|l| !matches!(l.rel.as_deref(), Some("enclosure") | Some("self")))
        })
        .map(|l| l.href.trim().to_string())
}

/// HTML content, then plain-text content, then the summary.
fn entry_content(entry: &Entry, summary: &str) -> String {
    html_body(entry)
        .or_else(|| content_body(entry))
        .unwrap_or(summary)
        .to_string()
}

fn content_body(entry: &Entry) -> Option<&str> {
    entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .map(str::trim)
        .filter(|b| !b.is_empty())
}

/// The content body when it is HTML or XHTML. Only this is scanned for `<img>`.
fn html_body(entry: &Entry) -> Option<&str> {
    entry
        .content
        .as_ref()
        .filter(|c| is_html(c))
        .and_then(|_| content_body(entry))
}

fn is_html(content: &Content) -> bool {
    let subtype = content.content_type.subty();
    subtype == "html" || subtype == "xhtml"
}

fn entry_title(title: Option<&Text>) -> String {
    title
        .map(|t| clean_text(&t.content))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED_ARTICLE.to_string())
}

/// Id assigned to entries that carry none. Hashes the same link and title
/// the entry is normalized to, so it is stable across fetches.
fn fallback_guid(links: &[Link], title: &Option<Text>, _base_uri: Option<&str>) -> String {
    Article::synthesize_guid(item_link(links).as_deref(), &entry_title(title.as_ref()))
}

fn clean_text(s: &str) -> String {
    decode_html_entities(s.trim()).to_string()
}

fn classify_parse_error(e: ParseFeedError) -> ReadOneError {
    match e {
        ParseFeedError::ParseError(ParseErrorKind::NoFeedRoot)
        | ParseFeedError::JsonUnsupportedVersion(_) => ReadOneError::UnsupportedFeed,
        other => ReadOneError::Parse(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_URL: &str = "https://example.com/feed";

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com/</link>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
      <content:encoded><![CDATA[<p>Full body</p><img class="hero" src="https://x/y.png">]]></content:encoded>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <guid>item-2</guid>
      <description>This is item 2</description>
      <enclosure url="https://example.com/cover.jpg" length="1000" type="image/jpeg"/>
    </item>
    <item>
      <description>No title and no link</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <subtitle>An Atom test feed</subtitle>
  <icon>https://example.com/icon.png</icon>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <summary>This is Atom entry 1</summary>
  </entry>
</feed>"#;

    fn normalize(body: &str) -> Result<ParsedFeed> {
        Normalizer::new().normalize(FEED_URL, body.as_bytes())
    }

    #[test]
    fn test_parse_rss() {
        let feed = normalize(RSS_SAMPLE).unwrap();

        assert_eq!(feed.title, "Test Feed");
        assert_eq!(feed.description, "A test feed");
        assert_eq!(feed.articles.len(), 3);
        assert_eq!(feed.articles[0].title, "Test Item 1");
        assert_eq!(feed.articles[0].guid, "item-1");
        assert_eq!(
            feed.articles[0].link,
            Some("https://example.com/item1".into())
        );
        assert_eq!(feed.articles[0].description, "This is item 1");
    }

    #[test]
    fn test_parse_atom() {
        let feed = normalize(ATOM_SAMPLE).unwrap();

        assert_eq!(feed.title, "Atom Test Feed");
        assert_eq!(feed.description, "An Atom test feed");
        assert_eq!(feed.image_url, Some("https://example.com/icon.png".into()));
        assert_eq!(feed.articles.len(), 1);
        assert_eq!(feed.articles[0].guid, "atom-entry-1");
        assert_eq!(
            feed.articles[0].link,
            Some("https://example.com/atom1".into())
        );
        // No published date, so updated is used.
        assert_eq!(
            feed.articles[0].published_at.to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_content_prefers_html_over_summary() {
        let feed = normalize(RSS_SAMPLE).unwrap();
        let item = &feed.articles[0];
        assert!(item.content.starts_with("<p>Full body</p>"));
        assert_ne!(item.content, item.description);
    }

    #[test]
    fn test_content_falls_back_to_summary() {
        let feed = normalize(RSS_SAMPLE).unwrap();
        assert_eq!(feed.articles[1].content, "This is item 2");
    }

    #[test]
    fn test_cover_image_from_html_content() {
        let feed = normalize(RSS_SAMPLE).unwrap();
        assert_eq!(feed.articles[0].image_url, Some("https://x/y.png".into()));
    }

    #[test]
    fn test_cover_image_from_image_enclosure() {
        let feed = normalize(RSS_SAMPLE).unwrap();
        assert_eq!(
            feed.articles[1].image_url,
            Some("https://example.com/cover.jpg".into())
        );
    }

    #[test]
    fn test_missing_title_and_link() {
        let feed = normalize(RSS_SAMPLE).unwrap();
        let item = &feed.articles[2];
        assert_eq!(item.title, UNTITLED_ARTICLE);
        assert_eq!(item.link, None);
        assert_eq!(item.image_url, None);
        assert_eq!(item.guid, Article::synthesize_guid(None, UNTITLED_ARTICLE));
    }

    #[test]
    fn test_missing_guid_hashes_link_and_title() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>No ids</title>
<item><title>Release notes</title><link>https://example.com/notes</link></item>
</channel></rss>"#;
        let feed = normalize(rss).unwrap();
        assert_eq!(
            feed.articles[0].guid,
            Article::synthesize_guid(Some("https://example.com/notes"), "Release notes")
        );
    }

    #[test]
    fn test_plain_text_content_beats_summary() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Plain</title>
  <entry>
    <title>Text entry</title>
    <link href="https://example.com/text"/>
    <id>text-1</id>
    <summary>Short</summary>
    <content type="text">Plain body &lt;img src="https://example.com/not-html.png"&gt;</content>
  </entry>
</feed>"#;
        let item = &normalize(atom).unwrap().articles[0];
        assert!(item.content.starts_with("Plain body"));
        assert_eq!(item.description, "Short");
        // Text content is not scanned for images.
        assert_eq!(item.image_url, None);
    }

    #[test]
    fn test_img_in_summary_is_not_a_cover() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Summary only</title>
<item><title>One</title><link>https://example.com/1</link><guid>1</guid>
<description><![CDATA[<img src="https://example.com/s.png"> teaser]]></description></item>
</channel></rss>"#;
        let item = &normalize(rss).unwrap().articles[0];
        assert!(item.content.contains("teaser"));
        assert_eq!(item.image_url, None);
    }

    #[test]
    fn test_thumbnail_wins_over_enclosure_and_img() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/"
     xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel><title>Media</title>
<item><title>Pictured</title><link>https://example.com/p</link><guid>p</guid>
<media:thumbnail url="https://example.com/thumb.jpg"/>
<enclosure url="https://example.com/enclosure.jpg" length="10" type="image/jpeg"/>
<content:encoded><![CDATA[<img src="https://example.com/inline.png">]]></content:encoded>
</item></channel></rss>"#;
        let item = &normalize(rss).unwrap().articles[0];
        assert_eq!(item.image_url, Some("https://example.com/thumb.jpg".into()));
    }

    #[test]
    fn test_atom_enclosure_link_is_banner() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Banners</title>
  <entry>
    <title>With banner</title>
    <link rel="enclosure" type="image/png" href="https://example.com/banner.png"/>
    <link href="https://example.com/post"/>
    <id>banner-1</id>
    <content type="html">&lt;img src="https://example.com/inline.png"&gt;</content>
  </entry>
</feed>"#;
        let item = &normalize(atom).unwrap().articles[0];
        assert_eq!(item.link, Some("https://example.com/post".into()));
        assert_eq!(item.image_url, Some("https://example.com/banner.png".into()));
    }

    #[test]
    fn test_missing_dates_use_now() {
        let before = Utc::now();
        let feed = normalize(RSS_SAMPLE).unwrap();
        assert!(feed.articles[1].published_at >= before);
    }

    #[test]
    fn test_guids_stable_across_parses() {
        let first = normalize(RSS_SAMPLE).unwrap();
        let second = normalize(RSS_SAMPLE).unwrap();
        let guids = |f: &ParsedFeed| f.articles.iter().map(|a| a.guid.clone()).collect::<Vec<_>>();
        assert_eq!(guids(&first), guids(&second));
    }

    #[test]
    fn test_icon_falls_back_to_favicon() {
        let feed = normalize(RSS_SAMPLE).unwrap();
        assert_eq!(
            feed.image_url,
            Some("https://www.google.com/s2/favicons?domain=example.com&size=128".into())
        );
    }

    #[test]
    fn test_custom_favicon_provider() {
        let feed = Normalizer::with_favicon_provider("icons.example.net")
            .normalize("https://blog.rust-lang.org/feed.xml", RSS_SAMPLE.as_bytes())
            .unwrap();
        assert_eq!(
            feed.image_url,
            Some("https://icons.example.net/favicons?domain=blog.rust-lang.org&size=128".into())
        );
    }

    #[test]
    fn test_title_entities_decoded() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Tom &amp;amp; Jerry</title>
<item><title>Q&amp;amp;A</title><link>https://example.com/qa</link><guid>qa</guid></item>
</channel></rss>"#;
        let feed = normalize(rss).unwrap();
        assert_eq!(feed.title, "Tom & Jerry");
        assert_eq!(feed.articles[0].title, "Q&A");
    }

    #[test]
    fn test_html_page_is_unsupported() {
        let html = "<html><head><title>Not a feed</title></head><body></body></html>";
        assert!(matches!(normalize(html), Err(ReadOneError::UnsupportedFeed)));
    }

    #[test]
    fn test_broken_json_is_parse_error() {
        assert!(matches!(
            normalize(r#"{"version": "https://jsonfeed.org/version/1", "items": [ "#),
            Err(ReadOneError::Parse(_))
        ));
    }
}
