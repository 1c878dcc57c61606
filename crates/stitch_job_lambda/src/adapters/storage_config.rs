use std::fmt;

use serde_json::{Map, Value};
use stitch_job_core::error::StitchError;

pub const DEFAULT_ENDPOINT: &str = "https://s3.us.cloud-object-storage.appdomain.cloud";
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_REGION: &str = "us-standard";
pub const NAMESPACE_API_KEY_ENV: &str = "__OW_IAM_NAMESPACE_API_KEY";
pub const REGION_ENV: &str = "AWS_REGION";

const BOUND_CREDENTIALS_FIELD: &str = "__bx_creds";
const STORAGE_SERVICE_FIELD: &str = "cloud-object-storage";

/// Connection settings for the object storage gateway.
///
/// Every value is resolved from the event parameters first, then from the
/// service credentials bound under `__bx_creds`, then from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub endpoint: String,
    pub api_key: String,
    pub service_instance_id: String,
    pub auth_endpoint: String,
    pub region: String,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("service_instance_id", &self.service_instance_id)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageConfig {
    pub fn resolve(
        params: &Map<String, Value>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, StitchError> {
        let bound = params
            .get(BOUND_CREDENTIALS_FIELD)
            .and_then(|creds| creds.get(STORAGE_SERVICE_FIELD))
            .and_then(Value::as_object);
        let bound_field = |field: &str| bound.and_then(|creds| non_empty(creds, field));

        let api_key = non_empty(params, "apikey")
            .or_else(|| non_empty(params, "apiKeyId"))
            .or_else(|| bound_field("apikey"))
            .or_else(|| env(NAMESPACE_API_KEY_ENV).filter(|value| !value.is_empty()))
            .ok_or_else(|| StitchError::MissingCredentials {
                reason: "no object storage API key is bound to this action".to_string(),
            })?;

        let service_instance_id = non_empty(params, "resource_instance_id")
            .or_else(|| non_empty(params, "serviceInstanceId"))
            .or_else(|| bound_field("resource_instance_id"))
            .ok_or_else(|| StitchError::MissingCredentials {
                reason: "no object storage instance id is bound to this action".to_string(),
            })?;

        let endpoint = non_empty(params, "endpoint")
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let auth_endpoint = non_empty(params, "ibmAuthEndpoint")
            .unwrap_or_else(|| DEFAULT_AUTH_ENDPOINT.to_string());
        let region = non_empty(params, "region")
            .or_else(|| env(REGION_ENV).filter(|value| !value.is_empty()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            endpoint,
            api_key,
            service_instance_id,
            auth_endpoint,
            region,
        })
    }
}

/// Prefixes `https://` when the endpoint carries no scheme.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

fn non_empty(map: &Map<String, Value>, field: &str) -> Option<String> {
    map.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
