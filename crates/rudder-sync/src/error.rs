use thiserror::Error;

/// Result type for calls against a configuration API.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single API call.
///
/// None of these abort a sync run; the driver records them and moves on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, timeout, DNS failure.
    #[error("{method} {url}: transport error: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    /// Non-2xx HTTP status.
    #[error("{method} {url}: HTTP {status}{}", suffix(.details))]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
        details: Option<String>,
    },

    /// 2xx response carrying an `errorDetails` field.
    #[error("{method} {url}: API error: {details}")]
    Api {
        method: String,
        url: String,
        details: String,
    },

    /// Body is not JSON or lacks the expected envelope.
    #[error("{url}: unexpected response: {message}")]
    Decode { url: String, message: String },
}

fn suffix(details: &Option<String>) -> String {
    details.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ApiError {
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Short label used in reports.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::HttpStatus { .. } => "http",
            Self::Api { .. } => "api",
            Self::Decode { .. } => "decode",
        }
    }
}

/// An API record that cannot be synced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectError {
    #[error("object is not a JSON object")]
    NotAnObject,

    #[error("object has no string \"id\" field")]
    MissingId,
}

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Profile \"{profile}\" has no {field} configured")]
    MissingField {
        profile: &'static str,
        field: &'static str,
    },

    #[error("Invalid URL for profile \"{profile}\": {source}")]
    InvalidUrl {
        profile: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid setting {field}: {message}")]
    InvalidSetting {
        field: &'static str,
        message: String,
    },
}
