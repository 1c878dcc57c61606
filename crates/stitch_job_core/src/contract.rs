use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::StitchError;

pub const MIN_VIDEO_COUNT: usize = 3;

pub const RENDER_WIDTH: u32 = 1080;
pub const RENDER_HEIGHT: u32 = 720;
pub const RENDER_MARGIN: u32 = 10;
pub const REVERB_TYPE: &str = "hall";
pub const REVERB_MIX: f64 = 0.1;

/// Typed view of the inbound trigger parameters.
///
/// `params` keeps the whole original map so the bundle can forward fields the
/// stitcher consumes but this stage does not understand.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub trigger_key: String,
    pub src_bucket: String,
    pub dst_bucket: String,
    pub params: Map<String, Value>,
}

impl JobRequest {
    pub fn from_params(params: Map<String, Value>) -> Result<Self, StitchError> {
        let trigger_key = params
            .get("notification")
            .and_then(|notification| notification.get("object_name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let src_bucket = required_string(&params, "src_bucket")?;
        let dst_bucket = required_string(&params, "dst_bucket")?;

        Ok(Self {
            trigger_key,
            src_bucket,
            dst_bucket,
            params,
        })
    }
}

fn required_string(params: &Map<String, Value>, field: &str) -> Result<String, StitchError> {
    match params.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
        Some(Value::String(_)) | None => Err(StitchError::InvalidRequest(format!(
            "{field} must be a non-empty string"
        ))),
        Some(_) => Err(StitchError::InvalidRequest(format!(
            "{field} must be a string"
        ))),
    }
}

/// Rendering constants handed to the stitcher. Not derived from input.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub center: bool,
    pub pan: bool,
    #[serde(rename = "reverbType")]
    pub reverb_type: String,
    #[serde(rename = "reverbMix")]
    pub reverb_mix: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: RENDER_WIDTH,
            height: RENDER_HEIGHT,
            margin: RENDER_MARGIN,
            center: true,
            pan: true,
            reverb_type: REVERB_TYPE.to_string(),
            reverb_mix: REVERB_MIX,
        }
    }
}

/// Parameter record for the downstream stitching stage.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobBundle {
    #[serde(rename = "COS_SRC_BUCKET")]
    pub source_bucket: String,
    #[serde(rename = "COS_DST_BUCKET")]
    pub destination_bucket: String,
    pub videos: Vec<String>,
    #[serde(flatten)]
    pub render: RenderSettings,
    #[serde(rename = "outputKey")]
    pub output_key: String,
    #[serde(rename = "jobFingerprint")]
    pub job_fingerprint: String,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

/// Field names owned by the bundle; inbound values under these names are
/// replaced rather than forwarded.
pub const BUNDLE_FIELDS: [&str; 12] = [
    "COS_SRC_BUCKET",
    "COS_DST_BUCKET",
    "videos",
    "width",
    "height",
    "margin",
    "center",
    "pan",
    "reverbType",
    "reverbMix",
    "outputKey",
    "jobFingerprint",
];

impl JobBundle {
    pub fn new(request: JobRequest, videos: Vec<String>, output_key: String) -> Self {
        let mut passthrough = request.params;
        for field in BUNDLE_FIELDS {
            passthrough.remove(field);
        }

        let job_fingerprint =
            job_fingerprint(&request.src_bucket, &request.dst_bucket, &videos, &output_key);

        Self {
            source_bucket: request.src_bucket,
            destination_bucket: request.dst_bucket,
            videos,
            render: RenderSettings::default(),
            output_key,
            job_fingerprint,
            passthrough,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("serialization of job bundle should not fail")
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    source_bucket: &'a str,
    destination_bucket: &'a str,
    videos: &'a [String],
    output_key: &'a str,
}

/// SHA-256 over the parts of a job that determine the stitched output.
pub fn job_fingerprint(
    source_bucket: &str,
    destination_bucket: &str,
    videos: &[String],
    output_key: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stable_contract_json(FingerprintInput {
        source_bucket,
        destination_bucket,
        videos,
        output_key,
    }));
    format!("{:x}", hasher.finalize())
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}
