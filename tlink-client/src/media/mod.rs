use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
}

/// Handle to a captured local track. The media subsystem owns the samples;
/// negotiation only passes handles to the transport and releases them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
}

impl MediaTrack {
    pub fn audio(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TrackKind::Audio,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("permission to capture {0:?} was denied")]
    PermissionDenied(TrackKind),

    #[error("no capture device available: {0}")]
    Unavailable(String),
}

/// Local media acquisition (microphone capture).
#[async_trait]
pub trait LocalMedia: Send + Sync {
    async fn acquire(&self) -> Result<Vec<MediaTrack>, MediaError>;

    /// Stops capture for the given tracks.
    async fn release(&self, tracks: Vec<MediaTrack>);
}
