use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Everything that can go wrong between a screen and the backend.
///
/// Screens only care about two kinds: business refusals (a well-formed
/// response with a non-zero code or an empty payload) and everything else
/// (transport, decoding, client-side validation).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request refused (code {code}): {}", .description.as_deref().unwrap_or("no description"))]
    Business {
        code: i64,
        description: Option<String>,
    },

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn business(code: i64, description: Option<String>) -> Self {
        Self::Business { code, description }
    }

    /// Text shown to the user: a business description when the backend sent
    /// one, otherwise the matching fallback.
    pub fn user_message(&self, business_fallback: &str, transport_fallback: &str) -> String {
        match self {
            Self::Business { description: Some(d), .. } if !d.trim().is_empty() => d.clone(),
            Self::Business { .. } => business_fallback.to_string(),
            _ => transport_fallback.to_string(),
        }
    }
}
