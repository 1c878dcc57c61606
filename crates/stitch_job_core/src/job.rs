use crate::contract::{JobBundle, JobRequest, MIN_VIDEO_COUNT};
use crate::discovery::{discover_siblings, ObjectLister};
use crate::error::StitchError;
use crate::key::parse_trigger_key;
use crate::ordering::order_by_digest;

/// Turns one trigger request into a stitching job.
///
/// Parses the trigger key, lists every sibling under its group prefix in the
/// source bucket, orders them by digest and requires at least
/// [`MIN_VIDEO_COUNT`] videos. No bundle is produced on any failure.
pub fn build_job_bundle(
    request: JobRequest,
    lister: &dyn ObjectLister,
) -> Result<JobBundle, StitchError> {
    let trigger = parse_trigger_key(&request.trigger_key)?;
    let group_prefix = trigger.group_prefix();

    let siblings = discover_siblings(lister, &request.src_bucket, &group_prefix)?;
    let videos = order_by_digest(siblings);

    if videos.len() < MIN_VIDEO_COUNT {
        return Err(StitchError::InsufficientInputs {
            found: videos.len(),
        });
    }

    Ok(JobBundle::new(request, videos, trigger.output_key()))
}
