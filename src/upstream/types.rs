//! Activity API wire types and session classification.

use serde::Deserialize;

use crate::upstream::ScrapeFailure;

/// Decision value meaning the server converts this stream.
pub const TRANSCODE_DECISION: &str = "transcode";

/// Counts derived from one successful activity response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivitySnapshot {
    pub total: u64,
    pub direct: u64,
    pub transcode: u64,
    pub transcode_video: u64,
    pub transcode_audio: u64,
    pub transcode_container: u64,
}

impl ActivitySnapshot {
    /// Classify every session and count them.
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let mut snapshot = Self::default();
        for session in sessions {
            let video = session.transcodes_video();
            let audio = session.transcodes_audio();
            let container = session.transcodes_container();

            snapshot.transcode_video += u64::from(video);
            snapshot.transcode_audio += u64::from(audio);
            snapshot.transcode_container += u64::from(container);

            if video || audio || container {
                snapshot.transcode += 1;
            } else {
                snapshot.direct += 1;
            }
            snapshot.total += 1;
        }
        snapshot
    }
}

/// Top-level body: `{"response": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ActivityEnvelope {
    pub response: ActivityResponse,
}

#[derive(Debug, Deserialize)]
pub struct ActivityResponse {
    pub result: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<ActivityData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityData {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// One playback session. Only the stream decision fields matter here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub transcode_video_decision: Option<String>,
    #[serde(default)]
    pub transcode_audio_decision: Option<String>,
    #[serde(default)]
    pub transcode_container_decision: Option<String>,
}

impl Session {
    pub fn transcodes_video(&self) -> bool {
        is_transcode(&self.transcode_video_decision)
    }

    pub fn transcodes_audio(&self) -> bool {
        is_transcode(&self.transcode_audio_decision)
    }

    pub fn transcodes_container(&self) -> bool {
        is_transcode(&self.transcode_container_decision)
    }
}

// Missing means "direct play"; "copy" is a remux, not a transcode.
fn is_transcode(decision: &Option<String>) -> bool {
    decision.as_deref() == Some(TRANSCODE_DECISION)
}

/// Decode an activity response body into a snapshot.
pub fn parse_activity(body: &[u8]) -> Result<ActivitySnapshot, ScrapeFailure> {
    let envelope: ActivityEnvelope = serde_json::from_slice(body)
        .map_err(|e| ScrapeFailure::MalformedResponse(e.to_string()))?;

    let response = envelope.response;
    if response.result != "success" {
        let message = response
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ScrapeFailure::Upstream(message));
    }

    let data = response.data.ok_or_else(|| {
        ScrapeFailure::MalformedResponse("successful response without data".to_string())
    })?;

    Ok(ActivitySnapshot::from_sessions(&data.sessions))
}
