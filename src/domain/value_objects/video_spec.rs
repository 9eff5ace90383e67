use serde::{Deserialize, Serialize};

/// Video metadata supplied when queueing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSpec {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    /// Duration in seconds
    pub duration: u32,
}

impl VideoSpec {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.video_id.trim().is_empty() {
            return Err("Video id is required");
        }
        if self.title.trim().is_empty() {
            return Err("Video title is required");
        }
        Ok(())
    }
}
