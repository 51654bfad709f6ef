/// Default header keywords matched as substrings.
pub const DEFAULT_CREDIT_KEYWORDS: &[&str] = &["credit"];
/// Default short header markers ("CR", "Cr.").
pub const DEFAULT_SHORT_MARKERS: &[&str] = &["cr"];
/// Headers containing any of these are never selected.
pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &["balance"];

/// Controls how a list of keywords is overridden from its defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// How short markers such as "cr" are matched against a header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerMatch {
    /// The marker must be a whole alphanumeric token: "cr", "cr.", "amount (cr)".
    /// "description" does not match.
    #[default]
    Token,
    /// Plain substring containment, so "description" matches "cr".
    Substring,
}

impl MarkerMatch {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "token" => Some(MarkerMatch::Token),
            "substring" => Some(MarkerMatch::Substring),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerMatch::Token => "token",
            MarkerMatch::Substring => "substring",
        }
    }
}

/// Configuration for credit-column selection.
///
/// All keywords are stored lowercased. Use [`ExtractorConfigBuilder`] to
/// override the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    pub(crate) credit_keywords: Vec<String>,
    pub(crate) short_markers: Vec<String>,
    pub(crate) exclude_keywords: Vec<String>,
    pub(crate) marker_match: MarkerMatch,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfigBuilder::new().build()
    }
}

impl ExtractorConfig {
    pub fn credit_keywords(&self) -> &[String] {
        &self.credit_keywords
    }

    pub fn short_markers(&self) -> &[String] {
        &self.short_markers
    }

    pub fn exclude_keywords(&self) -> &[String] {
        &self.exclude_keywords
    }

    pub fn marker_match(&self) -> MarkerMatch {
        self.marker_match
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfigBuilder {
    credit_keywords: ListOverride<String>,
    short_markers: ListOverride<String>,
    exclude_keywords: ListOverride<String>,
    marker_match: Option<MarkerMatch>,
}

impl ExtractorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit_keywords(mut self, keywords: ListOverride<String>) -> Self {
        self.credit_keywords = keywords;
        self
    }

    pub fn short_markers(mut self, markers: ListOverride<String>) -> Self {
        self.short_markers = markers;
        self
    }

    pub fn exclude_keywords(mut self, keywords: ListOverride<String>) -> Self {
        self.exclude_keywords = keywords;
        self
    }

    pub fn marker_match(mut self, mode: MarkerMatch) -> Self {
        self.marker_match = Some(mode);
        self
    }

    pub fn build(self) -> ExtractorConfig {
        ExtractorConfig {
            credit_keywords: resolve_lowercase(&self.credit_keywords, DEFAULT_CREDIT_KEYWORDS),
            short_markers: resolve_lowercase(&self.short_markers, DEFAULT_SHORT_MARKERS),
            exclude_keywords: resolve_lowercase(&self.exclude_keywords, DEFAULT_EXCLUDE_KEYWORDS),
            marker_match: self.marker_match.unwrap_or_default(),
        }
    }
}

fn resolve_lowercase(list: &ListOverride<String>, defaults: &[&str]) -> Vec<String> {
    let defaults: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
    list.resolve(&defaults)
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
