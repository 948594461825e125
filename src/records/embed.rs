use once_cell::sync::Lazy;
use regex::Regex;

/// Which player host an embed URL points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmbedHost {
    /// `www.youtube.com`, used for language records.
    Standard,
    /// `www.youtube-nocookie.com` with related videos and branding suppressed.
    PrivacyEnhanced,
}

impl EmbedHost {
    pub fn render(&self, video_id: &str) -> String {
        match self {
            EmbedHost::Standard => format!("https://www.youtube.com/embed/{}", video_id),
            EmbedHost::PrivacyEnhanced => format!(
                "https://www.youtube-nocookie.com/embed/{}?rel=0&modestbranding=1",
                video_id
            ),
        }
    }
}

/// One accepted shape of YouTube link.
pub struct VideoUrlMatcher {
    pub name: &'static str,
    pattern: Regex,
}

impl VideoUrlMatcher {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("video url pattern compiles"),
        }
    }

    /// Returns the video id when `url` has this matcher's shape.
    pub fn extract<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Tried in order; the first match wins.
pub static VIDEO_URL_MATCHERS: Lazy<Vec<VideoUrlMatcher>> = Lazy::new(|| {
    vec![
        VideoUrlMatcher::new(
            "watch",
            r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]+)",
        ),
        VideoUrlMatcher::new("short", r"(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]+)"),
        VideoUrlMatcher::new(
            "embed",
            r"(?:https?://)?(?:www\.)?youtube\.com/embed/([A-Za-z0-9_-]+)",
        ),
    ]
});

pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_URL_MATCHERS.iter().find_map(|m| m.extract(url))
}

pub fn youtube_embed_url(youtube_url: Option<&str>, host: EmbedHost) -> Option<String> {
    let url = non_blank(youtube_url)?;
    extract_video_id(url).map(|id| host.render(id))
}

/// Treats empty and whitespace-only strings as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(name: &str) -> &'static VideoUrlMatcher {
        VIDEO_URL_MATCHERS
            .iter()
            .find(|m| m.name == name)
            .unwrap()
    }

    #[test]
    fn watch_matcher_stops_at_ampersand() {
        let m = matcher("watch");
        assert_eq!(
            m.extract("https://www.youtube.com/watch?v=abc123&t=5"),
            Some("abc123")
        );
        assert_eq!(m.extract("https://youtu.be/abc123"), None);
    }

    #[test]
    fn short_matcher() {
        let m = matcher("short");
        assert_eq!(m.extract("https://youtu.be/xyz789"), Some("xyz789"));
        assert_eq!(m.extract("youtu.be/xyz789?t=3"), Some("xyz789"));
        assert_eq!(m.extract("https://www.youtube.com/embed/xyz789"), None);
    }

    #[test]
    fn embed_matcher() {
        let m = matcher("embed");
        assert_eq!(
            m.extract("https://www.youtube.com/embed/qqq111"),
            Some("qqq111")
        );
        assert_eq!(m.extract("https://www.youtube.com/watch?v=qqq111"), None);
    }

    #[test]
    fn matchers_are_ordered() {
        let names: Vec<_> = VIDEO_URL_MATCHERS.iter().map(|m| m.name).collect();
        assert_eq!(names, ["watch", "short", "embed"]);
    }

    #[test]
    fn unmatched_or_missing_urls_yield_nothing() {
        assert_eq!(youtube_embed_url(None, EmbedHost::Standard), None);
        assert_eq!(youtube_embed_url(Some(""), EmbedHost::Standard), None);
        assert_eq!(
            youtube_embed_url(Some("https://vimeo.com/12345"), EmbedHost::Standard),
            None
        );
    }

    #[test]
    fn hosts_render_differently() {
        assert_eq!(
            youtube_embed_url(Some("https://youtu.be/xyz789"), EmbedHost::Standard).as_deref(),
            Some("https://www.youtube.com/embed/xyz789")
        );
        assert_eq!(
            youtube_embed_url(
                Some("https://www.youtube.com/embed/qqq111"),
                EmbedHost::PrivacyEnhanced
            )
            .as_deref(),
            Some("https://www.youtube-nocookie.com/embed/qqq111?rel=0&modestbranding=1")
        );
    }
}
