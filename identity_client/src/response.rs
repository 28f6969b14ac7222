use ban_engine::notice::ResolutionError;
use serde::Deserialize;

/// Body of a successful account query
#[derive(Debug, Deserialize)]
pub struct AccountQueryResponse {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

/// Extract the display name from an account query response body
pub fn parse_display_name(body: &[u8]) -> Result<String, ResolutionError> {
    let response: AccountQueryResponse =
        serde_json::from_slice(body).map_err(|e| ResolutionError::MalformedPayload(e.to_string()))?;

    response.user_name.ok_or(ResolutionError::NoDisplayName)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_user_name() {
        let body = br#"{"userName":"Moderator","userId":"6f1a5b1e-7b37-4c8e-9b6c-0a2f3e4d5c6b"}"#;
        assert_eq!(parse_display_name(body).unwrap(), "Moderator");
    }

    #[test]
    fn null_user_name_has_no_display_name() {
        assert!(matches!(
            parse_display_name(br#"{"userName":null}"#),
            Err(ResolutionError::NoDisplayName)
        ));
        assert!(matches!(
            parse_display_name(br#"{}"#),
            Err(ResolutionError::NoDisplayName)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_display_name(b"<html>oops</html>"),
            Err(ResolutionError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_display_name(br#"{"userName":42}"#),
            Err(ResolutionError::MalformedPayload(_))
        ));
    }
}
