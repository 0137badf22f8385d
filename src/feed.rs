//! Feed ingestion: fetch the show's RSS feed and map entries into
//! [`Episode`] records, classifying each into one of the four Cs.
//!
//! Episodes are rebuilt on every fetch; nothing here is persisted.

use crate::classify::classify;
use crate::error::AppError;
use crate::model::Episode;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;

const TITLE_PLACEHOLDER: &str = "Untitled Episode";
const DESCRIPTION_PLACEHOLDER: &str = "No description available";

pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the feed, propagating network and parse failures.
    /// An empty feed that parses cleanly is `Ok(vec![])`, not an error.
    pub async fn try_fetch(&self) -> Result<Vec<Episode>, AppError> {
        tracing::info!("Fetching RSS from: {}", self.url);

        let body = self.http.get(&self.url).send().await?.text().await?;
        let feed = feed_rs::parser::parse(body.as_bytes())?;

        tracing::info!("Parsed {} entries from RSS feed", feed.entries.len());

        Ok(map_feed(feed))
    }

    /// Fail-soft fetch: any failure is logged and yields an empty list.
    /// Callers must treat empty as "feed unavailable", not "no episodes".
    pub async fn fetch(&self) -> Vec<Episode> {
        match self.try_fetch().await {
            Ok(episodes) => episodes,
            Err(e) => {
                tracing::error!("Error fetching RSS feed: {}", e);
                Vec::new()
            }
        }
    }

    /// Newest episode (feeds list newest first), or None when unavailable.
    pub async fn latest(&self) -> Option<Episode> {
        self.fetch().await.into_iter().next()
    }
}

/// Map parsed feed entries into episodes. Guarantees unique ids within the
/// batch even if the feed repeats a guid.
pub(crate) fn map_feed(feed: feed_rs::model::Feed) -> Vec<Episode> {
    let tag_re = regex::Regex::new(r"<[^>]*>").expect("static regex");
    let mut seen = HashSet::new();

    feed.entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut episode = map_entry(index, entry, &tag_re);
            if !seen.insert(episode.id.clone()) {
                episode.id = format!("{}-{}", episode.id, index);
                seen.insert(episode.id.clone());
            }
            episode
        })
        .collect()
}

fn map_entry(index: usize, entry: feed_rs::model::Entry, tag_re: &regex::Regex) -> Episode {
    // Guid (feed-rs falls back to a link-derived id itself), else the first
    // link, else a positional fallback.
    let id = if !entry.id.is_empty() {
        entry.id.clone()
    } else {
        entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_else(|| format!("episode-{}", index))
    };

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

    let description = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .map(|text| clean_description(&text, tag_re))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());

    // Enclosure: prefer media content, fall back to an audio/mpeg link.
    let audio = entry
        .media
        .first()
        .and_then(|m| m.content.first())
        .and_then(|c| c.url.as_ref())
        .map(|u| u.to_string())
        .or_else(|| {
            entry
                .links
                .iter()
                .find(|l| l.media_type.as_deref() == Some("audio/mpeg"))
                .map(|l| l.href.clone())
        })
        .unwrap_or_default();

    let duration = entry
        .media
        .first()
        .and_then(|m| m.content.first())
        .and_then(|c| c.duration.map(|d| d.as_secs() as f64));

    let pub_date = entry
        .published
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let theme = classify(&title, &description);

    Episode {
        id,
        title,
        description,
        audio,
        pub_date,
        theme,
        duration,
    }
}

/// Strip markup from feed descriptions and collapse runs of whitespace.
fn clean_description(text: &str, tag_re: &regex::Regex) -> String {
    let stripped = tag_re.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;

    fn parse_fixture(xml: &str) -> Vec<Episode> {
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        map_feed(feed)
    }

    const FEED_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Four Cs</title><link>https://example.com</link>
<description>The Four Cs podcast</description>"#;

    #[test]
    fn test_maps_complete_entry() {
        let xml = format!(
            "{FEED_HEADER}
<item>
  <guid>ep-001</guid>
  <title>Growth mindset</title>
  <description>&lt;p&gt;learning and   growth&lt;/p&gt;</description>
  <enclosure url=\"https://cdn.example.com/ep1.mp3\" type=\"audio/mpeg\" length=\"1000\"/>
  <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
</item>
</channel></rss>"
        );

        let episodes = parse_fixture(&xml);
        assert_eq!(episodes.len(), 1);
        let ep = &episodes[0];
        assert_eq!(ep.id, "ep-001");
        assert_eq!(ep.title, "Growth mindset");
        // Tags stripped, whitespace collapsed
        assert_eq!(ep.description, "learning and growth");
        assert_eq!(ep.audio, "https://cdn.example.com/ep1.mp3");
        assert_eq!(ep.pub_date, "2024-01-01T10:00:00+00:00");
        assert_eq!(ep.theme, Theme::Capacity);
    }

    #[test]
    fn test_placeholders_for_sparse_entry() {
        let xml = format!(
            "{FEED_HEADER}
<item><guid>bare</guid></item>
</channel></rss>"
        );

        let episodes = parse_fixture(&xml);
        assert_eq!(episodes.len(), 1);
        let ep = &episodes[0];
        assert_eq!(ep.title, "Untitled Episode");
        assert_eq!(ep.description, "No description available");
        assert_eq!(ep.audio, "");
        assert_eq!(ep.duration, None);
        // No pubDate: falls back to fetch-time timestamp
        assert!(!ep.pub_date.is_empty());
    }

    #[test]
    fn test_duplicate_guids_stay_unique_in_batch() {
        let xml = format!(
            "{FEED_HEADER}
<item><guid>dup</guid><title>one</title></item>
<item><guid>dup</guid><title>two</title></item>
</channel></rss>"
        );

        let episodes = parse_fixture(&xml);
        assert_eq!(episodes.len(), 2);
        assert_ne!(episodes[0].id, episodes[1].id);
        assert_eq!(episodes[0].id, "dup");
        assert_eq!(episodes[1].id, "dup-1");
    }

    #[test]
    fn test_empty_feed_parses_to_no_episodes() {
        let xml = format!("{FEED_HEADER}</channel></rss>");
        assert!(parse_fixture(&xml).is_empty());
    }

    #[test]
    fn test_theme_assigned_from_title_and_description() {
        let xml = format!(
            "{FEED_HEADER}
<item><guid>a</guid><title>On purpose</title>
  <description>a calling and a mission</description></item>
<item><guid>b</guid><title>Plain talk</title>
  <description>nothing thematic here</description></item>
</channel></rss>"
        );

        let episodes = parse_fixture(&xml);
        assert_eq!(episodes[0].theme, Theme::Commission);
        // Zero keyword matches: deterministic default
        assert_eq!(episodes[1].theme, Theme::Capacity);
    }

    #[tokio::test]
    async fn test_fetch_fails_soft_on_network_error() {
        // Unroutable address: connection refused, not a panic or Err
        let client = FeedClient::new("http://127.0.0.1:1/rss").unwrap();
        assert!(client.fetch().await.is_empty());
        assert!(client.latest().await.is_none());
        assert!(client.try_fetch().await.is_err());
    }
}
