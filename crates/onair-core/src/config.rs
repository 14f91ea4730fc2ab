use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CallError;

/// Characters the RTC channel-name namespace accepts, 1..=64 of them.
const CHANNEL_NAME_PATTERN: &str =
    r"^[A-Za-z0-9 !#$%&()+\-:;<=.>?@\[\]^_{}|~,]{1,64}$";

/// Immutable per-session configuration, supplied once at startup.
///
/// Construction validates the fields, so a controller holding a
/// `SessionConfig` can always hand them to the engine as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    application_id: String,
    channel_name: String,
    #[serde(default)]
    access_token: String,
}

impl SessionConfig {
    pub fn new(
        application_id: impl Into<String>,
        channel_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CallError> {
        let config = Self {
            application_id: application_id.into(),
            channel_name: channel_name.into(),
            access_token: access_token.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CallError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CallError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| CallError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// May be empty: app-id-only projects join without a token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    fn validate(&self) -> Result<(), CallError> {
        if self.application_id.trim().is_empty() {
            return Err(CallError::InvalidConfig("application_id is empty".into()));
        }
        if self.channel_name.is_empty() {
            return Err(CallError::InvalidConfig("channel_name is empty".into()));
        }
        let re = regex::Regex::new(CHANNEL_NAME_PATTERN).unwrap();
        if !re.is_match(&self.channel_name) {
            return Err(CallError::InvalidConfig(format!(
                "channel_name '{}' contains unsupported characters or is too long",
                self.channel_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn valid_config() {
        let config = SessionConfig::new("557312f41ee04f8ea273026e69ce61b5", "DucTien", "tok")
            .unwrap();
        assert_eq!(config.channel_name(), "DucTien");
        assert_eq!(config.access_token(), "tok");
    }

    #[test]
    fn empty_application_id_rejected() {
        assert!(SessionConfig::new("", "DucTien", "tok").is_err());
        assert!(SessionConfig::new("   ", "DucTien", "tok").is_err());
    }

    #[test]
    fn empty_channel_name_rejected() {
        assert!(SessionConfig::new("app", "", "tok").is_err());
    }

    #[test]
    fn channel_name_charset_enforced() {
        assert!(SessionConfig::new("app", "room-1_ok!", "").is_ok());
        assert!(SessionConfig::new("app", "bad\nname", "").is_err());
        assert!(SessionConfig::new("app", "a".repeat(65), "").is_err());
    }

    #[test]
    fn empty_token_allowed() {
        let config = SessionConfig::new("app", "DucTien", "").unwrap();
        assert_eq!(config.access_token(), "");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onair.json");
        fs::write(
            &path,
            r#"{"application_id":"app","channel_name":"DucTien","access_token":"tok"}"#,
        )
        .unwrap();
        let config = SessionConfig::from_file(&path).unwrap();
        assert_eq!(config.application_id(), "app");
    }

    #[test]
    fn load_without_token_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onair.json");
        fs::write(&path, r#"{"application_id":"app","channel_name":"DucTien"}"#).unwrap();
        let config = SessionConfig::from_file(&path).unwrap();
        assert_eq!(config.access_token(), "");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onair.json");
        fs::write(&path, "not json!!!").unwrap();
        assert!(SessionConfig::from_file(&path).is_err());
    }

    #[test]
    fn invalid_file_contents_rejected_after_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onair.json");
        fs::write(&path, r#"{"application_id":"","channel_name":"DucTien"}"#).unwrap();
        assert!(SessionConfig::from_file(&path).is_err());
    }
}
