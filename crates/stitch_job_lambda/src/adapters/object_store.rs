use aws_sdk_s3::config::interceptors::BeforeTransmitInterceptorContextMut;
use aws_sdk_s3::config::{ConfigBag, Credentials, Intercept, RuntimeComponents};
use aws_sdk_s3::error::BoxError;
use stitch_job_core::discovery::{ObjectLister, ObjectPage};
use stitch_job_core::error::StitchError;

use super::iam::{IamCredentials, TokenFetcher};
use super::storage_config::StorageConfig;

/// Replaces the SigV4 signature with the IAM bearer headers on every request.
#[derive(Debug)]
struct IamBearerInterceptor {
    credentials: IamCredentials,
}

impl Intercept for IamBearerInterceptor {
    fn name(&self) -> &'static str {
        "IamBearerInterceptor"
    }

    fn modify_before_transmit(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let headers = context.request_mut().headers_mut();
        for (name, value) in self.credentials.headers() {
            headers.insert(name, value.to_string());
        }
        Ok(())
    }
}

/// S3-compatible prefix listing against the configured endpoint.
#[derive(Debug, Clone)]
pub struct S3ObjectLister {
    s3_client: aws_sdk_s3::Client,
}

impl S3ObjectLister {
    pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
        Self { s3_client }
    }

    /// Exchanges the configured API key for an IAM token and builds a
    /// path-style client for `config.endpoint` that authenticates with it.
    pub fn connect(
        config: &StorageConfig,
        token_fetcher: &impl TokenFetcher,
    ) -> Result<Self, StitchError> {
        let credentials = IamCredentials::exchange(config, token_fetcher)?;

        // SigV4 still needs an identity to run; its header is overwritten
        // before transmit.
        let loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(config.endpoint.clone())
            .region(aws_config::Region::new(config.region.clone()))
            .credentials_provider(Credentials::new(
                "ibm-iam",
                "ibm-iam",
                None,
                None,
                "ibm-iam-bearer",
            ));
        let shared_config = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(loader.load())
        });

        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(true)
            .interceptor(IamBearerInterceptor { credentials })
            .build();
        Ok(Self::new(aws_sdk_s3::Client::from_conf(s3_config)))
    }
}

impl ObjectLister for S3ObjectLister {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        let token = continuation_token.map(str::to_string);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .list_objects_v2()
                    .bucket(bucket)
                    .prefix(prefix)
                    .set_continuation_token(token)
                    .send()
                    .await
                    .map_err(|error| format!("failed to list objects: {error}"))?;

                let keys = response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string))
                    .collect();
                let next_continuation_token = if response.is_truncated().unwrap_or(false) {
                    response.next_continuation_token().map(str::to_string)
                } else {
                    None
                };

                Ok::<_, String>(ObjectPage {
                    keys,
                    next_continuation_token,
                })
            })
        })
    }
}
