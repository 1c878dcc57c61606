use crate::error::StitchError;

/// Upper bound on listing round trips for a single group.
pub const MAX_LISTING_PAGES: usize = 1_000;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next_continuation_token: Option<String>,
}

/// Prefix listing capability of the object storage gateway.
pub trait ObjectLister {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String>;
}

/// Collects every key under `prefix`, following continuation tokens until the
/// listing is exhausted. Keys are returned exactly as reported.
pub fn discover_siblings(
    lister: &dyn ObjectLister,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<String>, StitchError> {
    let failed = |message: String| StitchError::DiscoveryFailed {
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
        message,
    };

    let mut keys = Vec::new();
    let mut token: Option<String> = None;
    for _ in 0..MAX_LISTING_PAGES {
        let page = lister
            .list_page(bucket, prefix, token.as_deref())
            .map_err(failed)?;
        keys.extend(page.keys);

        match page.next_continuation_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(keys),
        }
    }

    Err(failed(format!(
        "listing did not finish within {MAX_LISTING_PAGES} pages"
    )))
}
