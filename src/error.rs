use thiserror::Error;

/// Failure of a single adapter call. The resolver treats `Upstream` and
/// `EmptyResult` identically for fallback purposes; `NoCoverage` skips the
/// source without a network round trip.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The country has no representable code in this source's dialect.
    #[error("{origin} has no country code for {country}")]
    NoCoverage {
        origin: &'static str,
        country: String,
    },

    /// Non-success HTTP status, network failure, or malformed payload.
    #[error("{origin} request failed: {message}")]
    Upstream {
        origin: &'static str,
        message: String,
    },

    /// Well-formed payload with no usable (finite, non-null) observations.
    #[error("{origin} returned no usable observations")]
    EmptyResult { origin: &'static str },
}

impl FetchError {
    pub fn upstream(origin: &'static str, message: impl Into<String>) -> Self {
        FetchError::Upstream {
            origin,
            message: message.into(),
        }
    }

    /// The source whose call failed.
    pub fn origin(&self) -> &'static str {
        match self {
            FetchError::NoCoverage { origin, .. }
            | FetchError::Upstream { origin, .. }
            | FetchError::EmptyResult { origin } => origin,
        }
    }
}

/// Terminal resolution failure: both sources exhausted. `cause` carries the
/// preferred diagnostic — the primary source's error when one exists, since
/// its message is considered the more informative of the two.
#[derive(Debug, Clone, Error)]
#[error("no data available for {subject}")]
pub struct NoDataAvailable {
    /// Country name for single lookups, indicator label for batches.
    pub subject: String,
    #[source]
    pub cause: Option<FetchError>,
}

impl NoDataAvailable {
    pub fn new(subject: impl Into<String>, cause: Option<FetchError>) -> Self {
        Self {
            subject: subject.into(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn fetch_error_display_names_the_origin() {
        let err = FetchError::NoCoverage {
            origin: "Eurostat",
            country: "Russia".into(),
        };
        assert_eq!(err.to_string(), "Eurostat has no country code for Russia");
        assert_eq!(err.origin(), "Eurostat");

        let err = FetchError::upstream("World Bank", "HTTP 500");
        assert_eq!(err.to_string(), "World Bank request failed: HTTP 500");
    }

    #[test]
    fn no_data_available_chains_the_fetch_cause() {
        let cause = FetchError::upstream("Eurostat", "HTTP 500");
        let err = NoDataAvailable::new("Greece", Some(cause.clone()));
        assert_eq!(err.to_string(), "no data available for Greece");
        let chained = err.source().expect("cause should be chained");
        assert_eq!(chained.to_string(), cause.to_string());
    }

    #[test]
    fn no_data_available_without_cause_has_no_source() {
        let err = NoDataAvailable::new("GDP batch", None);
        assert!(err.source().is_none());
    }
}
