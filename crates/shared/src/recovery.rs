//! Password-recovery link detection.
//!
//! The identity provider redirects a password reset email back to the portal
//! with `type=recovery` in either the query string or the fragment. Tokens
//! for the recovery session travel in the same place.

use url::form_urlencoded;
use url::Url;

/// Marker value of the `type` parameter on a recovery redirect.
const RECOVERY_TYPE: &str = "recovery";

/// Error returned when the start location cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Invalid location: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Tokens carried by a recovery redirect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveryLink {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl RecoveryLink {
    /// Inspects a location for the recovery marker.
    ///
    /// Returns `Ok(None)` when the location is not a recovery redirect.
    pub fn parse(location: &str) -> Result<Option<Self>, LocationError> {
        let url = Url::parse(location)?;

        let query_pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let fragment_pairs: Vec<(String, String)> = url
            .fragment()
            .map(|f| form_urlencoded::parse(f.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let is_recovery = [&fragment_pairs, &query_pairs]
            .iter()
            .any(|pairs| lookup(pairs, "type") == Some(RECOVERY_TYPE));

        if !is_recovery {
            return Ok(None);
        }

        // Fragment wins over query when both carry a token.
        let token = |key: &str| {
            lookup(&fragment_pairs, key)
                .or_else(|| lookup(&query_pairs, key))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Some(Self {
            access_token: token("access_token"),
            refresh_token: token("refresh_token"),
        }))
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_location_is_not_recovery() {
        let link = RecoveryLink::parse("https://portal.example.com/").unwrap();
        assert!(link.is_none());
    }

    #[test]
    fn test_recovery_marker_in_fragment() {
        let link = RecoveryLink::parse(
            "https://portal.example.com/#access_token=abc&refresh_token=def&type=recovery",
        )
        .unwrap()
        .unwrap();
        assert_eq!(link.access_token.as_deref(), Some("abc"));
        assert_eq!(link.refresh_token.as_deref(), Some("def"));
    }

    #[test]
    fn test_recovery_marker_in_query() {
        let link = RecoveryLink::parse("https://portal.example.com/reset-password?type=recovery")
            .unwrap()
            .unwrap();
        assert_eq!(link, RecoveryLink::default());
    }

    #[test]
    fn test_other_type_is_not_recovery() {
        let link =
            RecoveryLink::parse("https://portal.example.com/#access_token=abc&type=signup").unwrap();
        assert!(link.is_none());
    }

    #[test]
    fn test_percent_encoded_token_is_decoded() {
        let link = RecoveryLink::parse("https://portal.example.com/?type=recovery&access_token=a%2Bb")
            .unwrap()
            .unwrap();
        assert_eq!(link.access_token.as_deref(), Some("a+b"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let link = RecoveryLink::parse("https://portal.example.com/#type=recovery&access_token=")
            .unwrap()
            .unwrap();
        assert!(link.access_token.is_none());
    }

    #[test]
    fn test_invalid_location() {
        assert!(RecoveryLink::parse("not a url").is_err());
    }
}
