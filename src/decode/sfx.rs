//! Sound-effect trigger schedule.

use serde::Serialize;

use super::audio::TrackKind;
use crate::format::FrameOffsetEntry;

/// One of the three sound-effect channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SfxChannel {
    Effect1,
    Effect2,
    Effect3,
}

impl SfxChannel {
    pub const ALL: [SfxChannel; 3] = [SfxChannel::Effect1, SfxChannel::Effect2, SfxChannel::Effect3];

    /// Track holding this channel's audio.
    pub fn track(self) -> TrackKind {
        match self {
            SfxChannel::Effect1 => TrackKind::Effect1,
            SfxChannel::Effect2 => TrackKind::Effect2,
            SfxChannel::Effect3 => TrackKind::Effect3,
        }
    }
}

/// "Start this effect when this frame is shown."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SfxEvent {
    pub frame_index: usize,
    pub channel: SfxChannel,
}

impl SfxEvent {
    /// Start time of the event at the given playback rate.
    pub fn start_seconds(&self, fps: f32) -> f64 {
        self.frame_index as f64 / fps as f64
    }
}

/// Effect events ordered by frame, then channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SfxSchedule {
    events: Vec<SfxEvent>,
}

impl SfxSchedule {
    /// Collect one event per set trigger bit.
    pub fn from_entries(entries: &[FrameOffsetEntry]) -> Self {
        let events = entries
            .iter()
            .flat_map(|entry| {
                SfxChannel::ALL
                    .into_iter()
                    .zip(entry.flags.sfx)
                    .filter(|&(_, set)| set)
                    .map(move |(channel, _)| SfxEvent {
                        frame_index: entry.index,
                        channel,
                    })
            })
            .collect();
        Self { events }
    }

    pub fn events(&self) -> &[SfxEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Frames on which `channel` starts, ascending.
    pub fn frames_for(&self, channel: SfxChannel) -> Vec<usize> {
        self.events
            .iter()
            .filter(|e| e.channel == channel)
            .map(|e| e.frame_index)
            .collect()
    }
}
