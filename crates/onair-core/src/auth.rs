use serde::Deserialize;

use crate::engine::PeerId;
use crate::errors::CallError;

/// Response from the token server.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Fetches channel access tokens from a token server.
///
/// Deployments that do not bake a token into the config run a small HTTP
/// service that mints one per channel and uid. Token storage and rotation
/// stay with that service; the core only performs the initial fetch.
pub struct TokenService;

impl TokenService {
    /// Request a token for `channel` as `uid` (0 for engine-assigned).
    pub async fn request_token(
        base_url: &str,
        channel: &str,
        uid: PeerId,
    ) -> Result<String, CallError> {
        let url = Self::token_url(base_url, channel, uid);
        tracing::info!("requesting access token: {url}");

        let resp = reqwest::get(&url)
            .await
            .map_err(|e| CallError::TokenRequest(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CallError::TokenRequest(format!(
                "token server returned status {}",
                resp.status()
            )));
        }

        let data: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CallError::TokenRequest(format!("invalid token response: {e}")))?;

        Ok(data.token)
    }

    fn token_url(base_url: &str, channel: &str, uid: PeerId) -> String {
        let base = base_url.trim_end_matches('/');
        let channel = urlencoding::encode(channel);
        format!("{base}/rtc/{channel}/{uid}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_joins_segments() {
        assert_eq!(
            TokenService::token_url("https://tokens.example.com", "DucTien", 0),
            "https://tokens.example.com/rtc/DucTien/0"
        );
    }

    #[test]
    fn token_url_strips_trailing_slash() {
        assert_eq!(
            TokenService::token_url("https://tokens.example.com/", "DucTien", 7),
            "https://tokens.example.com/rtc/DucTien/7"
        );
    }

    #[test]
    fn token_url_encodes_channel() {
        assert_eq!(
            TokenService::token_url("https://t.example.com", "my room", 0),
            "https://t.example.com/rtc/my%20room/0"
        );
    }
}
