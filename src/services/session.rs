use crate::error::{AppError, Result};
use std::fs;
use std::path::PathBuf;

/// API credentials for the brokerage data source.
///
/// The API key comes from the environment; the access token is produced by
/// the daily login flow and dropped into a file, so it is re-read from disk
/// rather than baked into the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub access_token: String,
}

fn access_token_path() -> PathBuf {
    std::env::var("KITE_ACCESS_TOKEN_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("access_token.txt"))
}

impl Credentials {
    pub fn load() -> Result<Self> {
        let api_key = std::env::var("KITE_API_KEY")
            .map_err(|_| AppError::Config("KITE_API_KEY is not set".to_string()))?;

        let token_path = access_token_path();
        let access_token = fs::read_to_string(&token_path)
            .map_err(|e| {
                AppError::Config(format!(
                    "cannot read access token from {}: {}",
                    token_path.display(),
                    e
                ))
            })?
            .trim()
            .to_string();

        if access_token.is_empty() {
            return Err(AppError::Config(format!(
                "access token file {} is empty",
                token_path.display()
            )));
        }

        Ok(Self {
            api_key,
            access_token,
        })
    }

    /// Value of the Authorization header expected by the API
    pub fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_shape() {
        let creds = Credentials {
            api_key: "abc".to_string(),
            access_token: "xyz".to_string(),
        };
        assert_eq!(creds.authorization(), "token abc:xyz");
    }
}
