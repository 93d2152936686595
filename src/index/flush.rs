//! Segment flushing.
//!
//! The builder seals its in-memory postings into a [`SegmentData`] and hands
//! it to a [`Flusher`]. Inline flushers write immediately; background
//! flushers pass the segment over a bounded channel to a writer thread so
//! analysis of the next documents continues while the previous segment is
//! written. The channel holds at most one sealed segment, which caps the
//! extra memory at one buffer's worth.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, bounded};
use log::debug;

use crate::error::{Result, XiphosError};
use crate::index::segment::{SegmentData, SegmentInfo, write_segment};
use crate::storage::Storage;

pub enum Flusher {
    Inline {
        storage: Arc<dyn Storage>,
        written: Vec<SegmentInfo>,
    },
    Background {
        sender: Option<Sender<SegmentData>>,
        handle: Option<JoinHandle<Result<Vec<SegmentInfo>>>>,
    },
}

impl Flusher {
    pub fn inline(storage: Arc<dyn Storage>) -> Self {
        Flusher::Inline {
            storage,
            written: Vec::new(),
        }
    }

    pub fn background(storage: Arc<dyn Storage>) -> Result<Self> {
        let (sender, receiver) = bounded::<SegmentData>(1);
        let handle = thread::Builder::new()
            .name("xiphos-flush".to_string())
            .spawn(move || {
                let mut written = Vec::new();
                for segment in receiver {
                    let name = segment.name.clone();
                    let info = write_segment(storage.as_ref(), segment)?;
                    debug!("Flushed segment {name} ({} bytes)", info.bytes);
                    written.push(info);
                }
                Ok(written)
            })?;

        Ok(Flusher::Background {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Write or enqueue a sealed segment.
    pub fn submit(&mut self, segment: SegmentData) -> Result<()> {
        match self {
            Flusher::Inline { storage, written } => {
                let name = segment.name.clone();
                let info = write_segment(storage.as_ref(), segment)?;
                debug!("Flushed segment {name} ({} bytes)", info.bytes);
                written.push(info);
                Ok(())
            }
            Flusher::Background { sender, handle } => {
                let sent = match sender.as_ref() {
                    Some(sender) => sender.send(segment).is_ok(),
                    None => false,
                };
                if sent {
                    return Ok(());
                }
                // The writer thread is gone; report why.
                sender.take();
                Err(match join(handle.take()) {
                    Err(e) => e,
                    Ok(_) => XiphosError::index("Segment flusher stopped unexpectedly"),
                })
            }
        }
    }

    /// Wait for every submitted segment and return them in submission order.
    pub fn finish(self) -> Result<Vec<SegmentInfo>> {
        match self {
            Flusher::Inline { written, .. } => Ok(written),
            Flusher::Background { sender, handle } => {
                drop(sender);
                join(handle)
            }
        }
    }
}

fn join(handle: Option<JoinHandle<Result<Vec<SegmentInfo>>>>) -> Result<Vec<SegmentInfo>> {
    let handle =
        handle.ok_or_else(|| XiphosError::index("Segment flusher was already stopped"))?;
    handle
        .join()
        .map_err(|_| XiphosError::index("Segment flusher panicked"))?
}

impl std::fmt::Debug for Flusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flusher::Inline { written, .. } => f
                .debug_struct("Flusher::Inline")
                .field("written", &written.len())
                .finish(),
            Flusher::Background { sender, .. } => f
                .debug_struct("Flusher::Background")
                .field("running", &sender.is_some())
                .finish(),
        }
    }
}
