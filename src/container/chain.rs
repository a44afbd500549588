//! Dependency chains and the sequential frame iterator.
//!
//! A chain starts at frame 0 or at any keyframe and runs up to the next
//! keyframe. Frames within a chain must be decoded in order by a single
//! [`FrameDecoder`]; separate chains share nothing but the input buffer.

use std::ops::Range;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::decode::{FrameDecoder, Raster, compose_raster};
use crate::error::{PpmError, Result};
use crate::format::FrameOffsetEntry;

/// Split the frame sequence into independently decodable chains.
pub fn plan_chains(entries: &[FrameOffsetEntry]) -> Vec<Range<usize>> {
    let mut chains = Vec::new();
    let mut start = 0;
    for (i, entry) in entries.iter().enumerate().skip(1) {
        if !entry.flags.difference {
            chains.push(start..i);
            start = i;
        }
    }
    if !entries.is_empty() {
        chains.push(start..entries.len());
    }
    chains
}

/// Index of the chain start that frame `index` depends on.
pub fn chain_start(entries: &[FrameOffsetEntry], index: usize) -> usize {
    entries[..=index]
        .iter()
        .rposition(|e| !e.flags.difference)
        .unwrap_or(0)
}

/// Decode every frame, chain by chain, keeping results in index order.
///
/// With `parallel` set the chains run on the rayon pool.
pub(crate) fn decode_chains(
    data: &[u8],
    entries: &[FrameOffsetEntry],
    parallel: bool,
) -> Vec<Result<Raster>> {
    let chains = plan_chains(entries);
    log::debug!(
        "Decoding {} frames in {} chains (parallel: {parallel})",
        entries.len(),
        chains.len()
    );

    #[cfg(not(target_arch = "wasm32"))]
    {
        if parallel {
            let per_chain: Vec<Vec<Result<Raster>>> = chains
                .into_par_iter()
                .map(|range| FrameIterator::new(data, entries, range).collect())
                .collect();
            return per_chain.into_iter().flatten().collect();
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = parallel;

    chains
        .into_iter()
        .flat_map(|range| FrameIterator::new(data, entries, range))
        .collect()
}

/// Lazily decodes a run of frames with one reused pair of layers.
///
/// After a frame fails, every following difference frame is reported as
/// [`PpmError::PoisonedFrame`] until the next keyframe restarts decoding.
pub struct FrameIterator<'a> {
    data: &'a [u8],
    entries: &'a [FrameOffsetEntry],
    decoder: FrameDecoder,
    current: usize,
    end: usize,
    failed: Option<usize>,
}

impl<'a> FrameIterator<'a> {
    /// Iterate `range`, which must begin at a chain start for correct output.
    pub(crate) fn new(
        data: &'a [u8],
        entries: &'a [FrameOffsetEntry],
        range: Range<usize>,
    ) -> Self {
        Self {
            data,
            entries,
            decoder: FrameDecoder::new(),
            current: range.start,
            end: range.end.min(entries.len()),
            failed: None,
        }
    }

    fn decode_entry(&mut self, entry: &FrameOffsetEntry) -> Result<Raster> {
        let bitstream = self
            .data
            .get(entry.range())
            .ok_or_else(|| PpmError::CorruptFrame {
                frame: entry.index,
                reason: format!("bitstream {:?} lies outside the buffer", entry.range()),
            })?;
        self.decoder.decode(entry.index, bitstream)?;
        Ok(compose_raster(self.decoder.layers(), &entry.flags))
    }
}

impl Iterator for FrameIterator<'_> {
    type Item = Result<Raster>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            return None;
        }
        let entries = self.entries;
        let entry = &entries[self.current];
        self.current += 1;

        if !entry.flags.difference {
            self.failed = None;
        }
        if let Some(failed) = self.failed {
            return Some(Err(PpmError::PoisonedFrame {
                frame: entry.index,
                failed,
            }));
        }

        let result = self.decode_entry(entry);
        if let Err(e) = &result {
            log::warn!("{e}; skipping the rest of its chain");
            self.failed = Some(entry.index);
        } else {
            log::trace!("Decoded frame {}", entry.index);
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FrameFlags, Header};
    use crate::test_support::{PpmBuilder, TestFrame};

    fn entries(pattern: &[bool]) -> Vec<FrameOffsetEntry> {
        pattern
            .iter()
            .enumerate()
            .map(|(index, &difference)| FrameOffsetEntry {
                index,
                offset: 0,
                size: 0,
                flags: FrameFlags {
                    difference,
                    ..Default::default()
                },
            })
            .collect()
    }

    #[test]
    fn test_plan_chains() {
        let e = entries(&[false, true, true, false, true, false]);
        assert_eq!(plan_chains(&e), vec![0..3, 3..5, 5..6]);

        // Leading difference frame still starts a chain
        let e = entries(&[true, true, false]);
        assert_eq!(plan_chains(&e), vec![0..2, 2..3]);

        assert!(plan_chains(&[]).is_empty());
    }

    #[test]
    fn test_chain_start() {
        let e = entries(&[false, true, true, false, true]);
        assert_eq!(chain_start(&e, 0), 0);
        assert_eq!(chain_start(&e, 2), 0);
        assert_eq!(chain_start(&e, 3), 3);
        assert_eq!(chain_start(&e, 4), 3);
        assert_eq!(chain_start(&entries(&[true, true]), 1), 0);
    }

    #[test]
    fn test_iterator_size_hint() {
        let data = PpmBuilder::new()
            .frames(vec![TestFrame::blank(); 4])
            .build();
        let header = Header::read_from(&data, true).unwrap();
        let table = header.read_frame_table(&data).unwrap();

        let mut iter = FrameIterator::new(&data, &table, 1..4);
        assert_eq!(iter.len(), 3);
        iter.next().unwrap().unwrap();
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.count(), 2);
    }
}
