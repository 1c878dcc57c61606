use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use stitch_job_lambda::adapters::iam::IamTokenFetcher;
use stitch_job_lambda::adapters::object_store::S3ObjectLister;
use stitch_job_lambda::handlers::trigger::handle_trigger_event;
use tracing_subscriber::EnvFilter;

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let token_fetcher = IamTokenFetcher::default();
    handle_trigger_event(event.payload, &env_lookup, |config| {
        S3ObjectLister::connect(config, &token_fetcher)
    })
    .map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    lambda_runtime::run(service_fn(handle_request)).await
}
