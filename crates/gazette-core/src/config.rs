use crate::config_file::ConfigFile;
use crate::resolve::FallbackLabels;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fallback labels per rendering context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    pub card: FallbackLabels,
    pub featured: FallbackLabels,
    pub detail: FallbackLabels,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            card: FallbackLabels::card(),
            featured: FallbackLabels::featured(),
            detail: FallbackLabels::detail(),
        }
    }
}

/// Runtime configuration, handed to the backend at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the REST API, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    /// `0` disables the client-side timeout.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub labels: LabelSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("gazette/{}", env!("CARGO_PKG_VERSION")),
            labels: LabelSet::default(),
        }
    }
}

impl Config {
    /// Overlay the values present in `file` onto `self`.
    pub fn with_file(mut self, file: &ConfigFile) -> Self {
        if let Some(api) = &file.api {
            if let Some(url) = &api.base_url {
                self.base_url = url.clone();
            }
            if let Some(secs) = api.request_timeout_secs {
                self.request_timeout_secs = secs;
            }
            if let Some(ua) = &api.user_agent {
                self.user_agent = ua.clone();
            }
        }
        if let Some(labels) = &file.labels {
            if let Some(s) = &labels.card_category {
                self.labels.card.category = s.clone();
            }
            if let Some(s) = &labels.featured_category {
                self.labels.featured.category = s.clone();
            }
            if let Some(s) = &labels.detail_category {
                self.labels.detail.category = s.clone();
            }
            if let Some(s) = &labels.author {
                self.labels.card.author = s.clone();
                self.labels.featured.author = s.clone();
                self.labels.detail.author = s.clone();
            }
        }
        self
    }
}
