//! Access token decoding for `POST /auth/login/accessToken`.

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::error::{ManagementError, ManagementResult};

/// Provider identity carried inside an encoded access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Identity provider that issued the account (e.g. `GitHub`).
    pub provider_name: String,
    /// Account identifier at the provider.
    pub provider_unique_id: String,
    /// Access key presented as the login token.
    pub access_key_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Identity<'a> {
    provider_name: &'a str,
    provider_unique_id: &'a str,
}

impl AccessToken {
    /// Decode a base64-encoded JSON token.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError::InvalidAccessToken`] when the token is not
    /// base64, not JSON, or lacks any provider identity field.
    pub fn decode(token: &str) -> ManagementResult<Self> {
        let bytes = general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|_| ManagementError::InvalidAccessToken)?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(|_| ManagementError::InvalidAccessToken)?;
        if decoded.provider_name.is_empty()
            || decoded.provider_unique_id.is_empty()
            || decoded.access_key_name.is_empty()
        {
            return Err(ManagementError::InvalidAccessToken);
        }
        Ok(decoded)
    }

    /// Encode the token in the form accepted by [`AccessToken::decode`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn encode(&self) -> ManagementResult<String> {
        let json = serde_json::to_vec(self).map_err(|source| ManagementError::Encode { source })?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// JSON identity sent in the `identity` form field.
    pub(crate) fn identity_json(&self) -> ManagementResult<String> {
        serde_json::to_string(&Identity {
            provider_name: &self.provider_name,
            provider_unique_id: &self.provider_unique_id,
        })
        .map_err(|source| ManagementError::Encode { source })
    }
}
