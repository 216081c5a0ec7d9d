//! Error types for audio session operations.

use std::fmt;

/// Error type for capture and playback operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The user or platform denied recording permission
    PermissionDenied,
    /// Another capture or playback already holds the device
    DeviceBusy(String),
    /// The device could not be configured for capture or playback
    DeviceConfig(String),
    /// The audio resource could not be decoded
    Decode(String),
    /// The audio resource is missing or its locator is invalid
    ResourceUnavailable(String),
    /// An operation was issued in a state that cannot accept it
    InvalidStateTransition(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::PermissionDenied => write!(f, "Recording permission denied"),
            AudioError::DeviceBusy(msg) => write!(f, "Device busy: {}", msg),
            AudioError::DeviceConfig(msg) => write!(f, "Device configuration error: {}", msg),
            AudioError::Decode(msg) => write!(f, "Decode error: {}", msg),
            AudioError::ResourceUnavailable(msg) => write!(f, "Resource unavailable: {}", msg),
            AudioError::InvalidStateTransition(msg) => {
                write!(f, "Invalid state transition: {}", msg)
            }
        }
    }
}

impl std::error::Error for AudioError {}

impl From<AudioError> for String {
    fn from(err: AudioError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AudioError::PermissionDenied.to_string(),
            "Recording permission denied"
        );
        assert_eq!(
            AudioError::DeviceBusy("capture in progress".to_string()).to_string(),
            "Device busy: capture in progress"
        );
        let as_string: String = AudioError::Decode("bad header".to_string()).into();
        assert_eq!(as_string, "Decode error: bad header");
    }
}
