use crate::error::StitchError;

pub const OUTPUT_SUFFIX: &str = "final.mp4";

const GROUP_SEPARATOR: char = '+';
const EXTENSION_SEPARATOR: char = '.';

/// Components of a `{choir_id}+{song_id}+{part_id}.{ext}` object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerKey {
    pub choir_id: String,
    pub song_id: String,
    pub part_id: String,
    pub ext: String,
}

impl TriggerKey {
    /// `{choir_id}+{song_id}`, shared by every part of one performance.
    pub fn group_prefix(&self) -> String {
        format!("{}{GROUP_SEPARATOR}{}", self.choir_id, self.song_id)
    }

    pub fn output_key(&self) -> String {
        output_key_for_prefix(&self.group_prefix())
    }
}

pub fn output_key_for_prefix(group_prefix: &str) -> String {
    format!("{group_prefix}{GROUP_SEPARATOR}{OUTPUT_SUFFIX}")
}

/// Splits a trigger key into its composite identifier, part id and extension.
///
/// The key must contain exactly two `+` separators. The choir and song ids may
/// not contain `.`; the part id runs up to the final `.` and the extension is
/// everything after it. Every component must be non-empty.
pub fn parse_trigger_key(trigger_key: &str) -> Result<TriggerKey, StitchError> {
    let invalid = || StitchError::InvalidKeyFormat {
        key: trigger_key.to_string(),
    };

    let (choir_id, rest) = trigger_key.split_once(GROUP_SEPARATOR).ok_or_else(invalid)?;
    let (song_id, file_name) = rest.split_once(GROUP_SEPARATOR).ok_or_else(invalid)?;
    if file_name.contains(GROUP_SEPARATOR) {
        return Err(invalid());
    }
    let (part_id, ext) = file_name
        .rsplit_once(EXTENSION_SEPARATOR)
        .ok_or_else(invalid)?;

    let group_tokens_valid = [choir_id, song_id]
        .iter()
        .all(|token| !token.is_empty() && !token.contains(EXTENSION_SEPARATOR));
    if !group_tokens_valid || part_id.is_empty() || ext.is_empty() {
        return Err(invalid());
    }

    Ok(TriggerKey {
        choir_id: choir_id.to_string(),
        song_id: song_id.to_string(),
        part_id: part_id.to_string(),
        ext: ext.to_string(),
    })
}
