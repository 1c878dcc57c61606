use serde::Deserialize;
use stitch_job_core::error::StitchError;

use super::storage_config::StorageConfig;

pub const IAM_APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
pub const SERVICE_INSTANCE_HEADER: &str = "ibm-service-instance-id";

/// Exchanges an API key for an IAM access token at `auth_endpoint`.
pub trait TokenFetcher {
    fn fetch_token(&self, api_key: &str, auth_endpoint: &str) -> Result<String, String>;
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Default)]
pub struct IamTokenFetcher {
    http: reqwest::Client,
}

impl TokenFetcher for IamTokenFetcher {
    fn fetch_token(&self, api_key: &str, auth_endpoint: &str) -> Result<String, String> {
        let http = self.http.clone();
        let api_key = api_key.to_string();
        let auth_endpoint = auth_endpoint.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = http
                    .post(auth_endpoint)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .form(&[
                        ("grant_type", IAM_APIKEY_GRANT_TYPE),
                        ("apikey", api_key.as_str()),
                    ])
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|error| format!("IAM token request failed: {error}"))?;

                let token: IamTokenResponse = response
                    .json()
                    .await
                    .map_err(|error| format!("IAM token response was malformed: {error}"))?;
                Ok::<_, String>(token.access_token)
            })
        })
    }
}

/// Request headers that authenticate one invocation against the storage
/// endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct IamCredentials {
    authorization: String,
    service_instance_id: String,
}

impl std::fmt::Debug for IamCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamCredentials")
            .field("authorization", &"Bearer <redacted>")
            .field("service_instance_id", &self.service_instance_id)
            .finish()
    }
}

impl IamCredentials {
    pub fn exchange(
        config: &StorageConfig,
        fetcher: &impl TokenFetcher,
    ) -> Result<Self, StitchError> {
        let token = fetcher
            .fetch_token(&config.api_key, &config.auth_endpoint)
            .map_err(|reason| StitchError::MissingCredentials { reason })?;
        if token.trim().is_empty() {
            return Err(StitchError::MissingCredentials {
                reason: "IAM token response carried an empty access token".to_string(),
            });
        }

        Ok(Self {
            authorization: format!("Bearer {token}"),
            service_instance_id: config.service_instance_id.clone(),
        })
    }

    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            ("authorization", self.authorization.as_str()),
            (SERVICE_INSTANCE_HEADER, self.service_instance_id.as_str()),
        ]
    }
}
