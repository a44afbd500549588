//! IMA 4-bit ADPCM track decoding.

use std::fmt;

use serde::Serialize;

/// Native sample rate of every PPM track.
pub const BASE_SAMPLE_RATE: u32 = 8192;

const INDEX_TABLE: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

/// Highest valid step index.
pub const MAX_STEP_INDEX: usize = STEP_TABLE.len() - 1;

/// The four audio tracks of a PPM, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrackKind {
    BackgroundMusic,
    Effect1,
    Effect2,
    Effect3,
}

impl TrackKind {
    pub const ALL: [TrackKind; 4] = [
        TrackKind::BackgroundMusic,
        TrackKind::Effect1,
        TrackKind::Effect2,
        TrackKind::Effect3,
    ];

    /// Position in the sound header and track data.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackKind::BackgroundMusic => "BGM",
            TrackKind::Effect1 => "SFX1",
            TrackKind::Effect2 => "SFX2",
            TrackKind::Effect3 => "SFX3",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running ADPCM state. One instance per track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdpcmDecoder {
    predictor: i32,
    step_index: usize,
}

impl AdpcmDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn predictor(&self) -> i32 {
        self.predictor
    }

    #[inline]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Decode one 4-bit code into a sample.
    #[inline]
    pub fn decode_nibble(&mut self, code: u8) -> i16 {
        let code = code & 0x0F;
        let step = STEP_TABLE[self.step_index];

        let mut diff = step >> 3;
        if code & 0x4 != 0 {
            diff += step;
        }
        if code & 0x2 != 0 {
            diff += step >> 1;
        }
        if code & 0x1 != 0 {
            diff += step >> 2;
        }
        if code & 0x8 != 0 {
            self.predictor -= diff;
        } else {
            self.predictor += diff;
        }
        self.predictor = self.predictor.clamp(i16::MIN as i32, i16::MAX as i32);

        self.step_index = (self.step_index as i32 + INDEX_TABLE[code as usize])
            .clamp(0, MAX_STEP_INDEX as i32) as usize;

        self.predictor as i16
    }

    /// Decode a byte, low nibble first.
    #[inline]
    pub fn decode_byte(&mut self, byte: u8) -> [i16; 2] {
        [self.decode_nibble(byte & 0x0F), self.decode_nibble(byte >> 4)]
    }

    /// Decode a whole buffer, two samples per byte.
    pub fn decode(&mut self, data: &[u8]) -> Vec<i16> {
        let mut samples = Vec::with_capacity(data.len() * 2);
        for &byte in data {
            samples.extend_from_slice(&self.decode_byte(byte));
        }
        samples
    }
}

/// A decoded track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub kind: TrackKind,
    /// Playback rate in Hz.
    pub sample_rate: u32,
    /// Mono signed 16-bit PCM.
    pub samples: Vec<i16>,
}

impl AudioTrack {
    /// Decode a compressed track with fresh decoder state.
    pub fn decode(kind: TrackKind, data: &[u8], sample_rate: u32) -> Self {
        Self {
            kind,
            sample_rate,
            samples: AdpcmDecoder::new().decode(data),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length at the track's sample rate.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Little-endian PCM bytes, ready for a WAV writer.
    pub fn pcm_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}
