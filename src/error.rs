//! Error type shared by every stage of the PPM decoder.

use std::io;

use crate::decode::TrackKind;
use crate::schema::ConfigError;

/// Errors produced while parsing or decoding a Flipnote PPM container.
#[derive(Debug, thiserror::Error)]
pub enum PpmError {
    /// A read ran past the end of the buffer.
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset:#x}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The buffer is not a PPM container, or a header field disagrees with the buffer bounds.
    #[error("Invalid PPM format: {0}")]
    InvalidFormat(String),

    /// A frame's bitstream ended or broke structure mid-decode.
    #[error("Corrupt frame {frame}: {reason}")]
    CorruptFrame { frame: usize, reason: String },

    /// An audio track's byte range could not be decoded.
    #[error("Corrupt {track} track: {reason}")]
    CorruptTrack { track: TrackKind, reason: String },

    /// A difference frame whose dependency chain already failed.
    #[error("Frame {frame} cannot be decoded: frame {failed} earlier in its chain failed")]
    PoisonedFrame { frame: usize, failed: usize },

    #[error("Frame index {index} out of range ({count} frames)")]
    FrameOutOfRange { index: usize, count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid decode options: {0}")]
    Config(#[from] ConfigError),
}

impl PpmError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PpmError::InvalidFormat(msg.into())
    }

    /// Frame index this error is attached to, if any.
    pub fn frame(&self) -> Option<usize> {
        match self {
            PpmError::CorruptFrame { frame, .. } | PpmError::PoisonedFrame { frame, .. } => {
                Some(*frame)
            }
            _ => None,
        }
    }
}

pub type Result<T, E = PpmError> = std::result::Result<T, E>;
