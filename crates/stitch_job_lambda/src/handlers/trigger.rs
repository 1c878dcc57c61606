use std::time::Instant;

use serde_json::Value;
use stitch_job_core::contract::JobRequest;
use stitch_job_core::discovery::ObjectLister;
use stitch_job_core::error::StitchError;
use stitch_job_core::job::build_job_bundle;
use tracing::{error, info};

use crate::adapters::storage_config::StorageConfig;

/// Handles one object-write notification and returns the stitch job bundle.
///
/// `env` resolves fallback credentials; `connect` authenticates and builds the
/// storage lister from the resolved configuration. Any error ends the
/// invocation without output.
pub fn handle_trigger_event<L>(
    event: Value,
    env: &dyn Fn(&str) -> Option<String>,
    connect: impl FnOnce(&StorageConfig) -> Result<L, StitchError>,
) -> Result<Value, StitchError>
where
    L: ObjectLister,
{
    let started_at = Instant::now();
    let Value::Object(params) = event else {
        return Err(StitchError::InvalidRequest(
            "trigger payload must be a JSON object".to_string(),
        ));
    };

    let storage_config = StorageConfig::resolve(&params, env).inspect_err(log_rejection)?;
    let request = JobRequest::from_params(params).inspect_err(log_rejection)?;
    info!(
        event = "trigger_received",
        trigger_key = %request.trigger_key,
        src_bucket = %request.src_bucket,
        dst_bucket = %request.dst_bucket,
        endpoint = %storage_config.endpoint,
    );

    let lister = connect(&storage_config).inspect_err(log_rejection)?;
    let bundle = build_job_bundle(request, &lister).inspect_err(log_rejection)?;

    info!(
        event = "job_built",
        output_key = %bundle.output_key,
        video_count = bundle.videos.len(),
        job_fingerprint = %bundle.job_fingerprint,
        duration_ms = started_at.elapsed().as_millis() as u64,
    );
    Ok(bundle.to_value())
}

fn log_rejection(rejection: &StitchError) {
    error!(
        event = "job_rejected",
        error_kind = rejection.kind(),
        error = %rejection,
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use stitch_job_core::discovery::ObjectPage;

    use super::*;

    struct CapturingLister {
        keys: Vec<String>,
        failure: Option<String>,
        prefixes: Mutex<Vec<String>>,
    }

    impl CapturingLister {
        fn new(keys: &[&str]) -> Self {
            Self {
                keys: keys.iter().map(|key| key.to_string()).collect(),
                failure: None,
                prefixes: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::new(&[])
            }
        }

        fn prefixes(&self) -> Vec<String> {
            self.prefixes.lock().expect("poisoned mutex").clone()
        }
    }

    impl ObjectLister for &CapturingLister {
        fn list_page(
            &self,
            _bucket: &str,
            prefix: &str,
            _continuation_token: Option<&str>,
        ) -> Result<ObjectPage, String> {
            self.prefixes
                .lock()
                .expect("poisoned mutex")
                .push(prefix.to_string());
            if let Some(message) = &self.failure {
                return Err(message.clone());
            }
            Ok(ObjectPage {
                keys: self.keys.clone(),
                next_continuation_token: None,
            })
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn trigger_event(trigger_key: &str) -> Value {
        json!({
            "notification": {"object_name": trigger_key},
            "src_bucket": "choir-uploads",
            "dst_bucket": "choir-renders",
            "apikey": "key",
            "resource_instance_id": "crn:instance",
            "endpoint": "s3.us-south.cloud-object-storage.appdomain.cloud",
        })
    }

    #[test]
    fn returns_bundle_for_complete_group() {
        let lister = CapturingLister::new(&[
            "choirA+song1+part1.mp4",
            "choirA+song1+part2.mp4",
            "choirA+song1+part3.mp4",
        ]);

        let event = trigger_event("choirA+song1+part2.mp4");
        let bundle = handle_trigger_event(event, &no_env, |config| {
            assert_eq!(
                config.endpoint,
                "https://s3.us-south.cloud-object-storage.appdomain.cloud"
            );
            assert_eq!(config.service_instance_id, "crn:instance");
            Ok(&lister)
        })
        .expect("handler should pass");

        assert_eq!(bundle["outputKey"], "choirA+song1+final.mp4");
        assert_eq!(bundle["videos"].as_array().map(Vec::len), Some(3));
        assert_eq!(bundle["apikey"], "key");
        assert_eq!(lister.prefixes(), vec!["choirA+song1".to_string()]);
    }

    #[test]
    fn missing_credentials_stop_before_listing() {
        let lister = CapturingLister::new(&[]);
        let mut event = trigger_event("choirA+song1+part2.mp4");
        event
            .as_object_mut()
            .expect("event should be an object")
            .remove("apikey");

        let error = handle_trigger_event(event, &no_env, |_| Ok(&lister))
            .expect_err("handler should fail");
        assert!(matches!(error, StitchError::MissingCredentials { .. }));
        assert!(lister.prefixes().is_empty());
    }

    #[test]
    fn failed_client_setup_stops_before_listing() {
        let lister = CapturingLister::new(&["choirA+song1+part1.mp4"]);
        let event = trigger_event("choirA+song1+part1.mp4");

        let error = handle_trigger_event(event, &no_env, |_| {
            Err::<&CapturingLister, _>(StitchError::MissingCredentials {
                reason: "IAM token request failed: 401".to_string(),
            })
        })
        .expect_err("handler should fail");
        assert_eq!(error.kind(), "missing_credentials");
        assert!(lister.prefixes().is_empty());
    }

    #[test]
    fn listing_failure_surfaces_as_discovery_failed() {
        let lister = CapturingLister::failing("failed to list objects: NoSuchBucket");
        let event = trigger_event("choirA+song1+part1.mp4");

        let error =
            handle_trigger_event(event, &no_env, |_| Ok(&lister)).expect_err("handler should fail");
        assert_eq!(
            error,
            StitchError::DiscoveryFailed {
                bucket: "choir-uploads".to_string(),
                prefix: "choirA+song1".to_string(),
                message: "failed to list objects: NoSuchBucket".to_string(),
            }
        );
        assert_eq!(lister.prefixes(), vec!["choirA+song1".to_string()]);
    }

    #[test]
    fn rejects_non_object_payload() {
        let lister = CapturingLister::new(&[]);
        let event = json!(["not", "an", "object"]);
        let error =
            handle_trigger_event(event, &no_env, |_| Ok(&lister)).expect_err("handler should fail");
        assert_eq!(error.kind(), "invalid_request");
    }

    #[test]
    fn sparse_group_is_a_hard_failure() {
        let lister = CapturingLister::new(&["choirA+song1+part1.mp4"]);
        let event = trigger_event("choirA+song1+part1.mp4");
        let error =
            handle_trigger_event(event, &no_env, |_| Ok(&lister)).expect_err("handler should fail");
        assert_eq!(error, StitchError::InsufficientInputs { found: 1 });
    }

    #[test]
    fn malformed_trigger_key_is_rejected() {
        let lister = CapturingLister::new(&[]);
        let event = trigger_event("choirA+song1+part1");
        let error =
            handle_trigger_event(event, &no_env, |_| Ok(&lister)).expect_err("handler should fail");
        assert!(matches!(error, StitchError::InvalidKeyFormat { .. }));
    }
}
