use std::env;
use std::path::PathBuf;

/// Runtime settings, read from the environment after `.env` is loaded.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub media_root: PathBuf,
    pub media_base_url: String,
    pub log_dir: PathBuf,
    pub page_size: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: var_or("DATABASE_URL", "sqlite://archive.db?mode=rwc"),
            media_root: PathBuf::from(var_or("MEDIA_ROOT", "media")),
            media_base_url: with_trailing_slash(var_or(
                "MEDIA_BASE_URL",
                "http://localhost:8000/media/",
            )),
            log_dir: PathBuf::from(var_or("LOG_DIR", "logs")),
            page_size: env::var("ARCHIVE_PAGE_SIZE")
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(20),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(
            with_trailing_slash("https://cdn.example.org/m".to_string()),
            "https://cdn.example.org/m/"
        );
        assert_eq!(with_trailing_slash("http://x/".to_string()), "http://x/");
    }
}
