#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "rtrb")]
use super::{ScanContext, ScanFinished, SyncListener};
#[cfg(feature = "rtrb")]
use crate::engine::Passage;

use crate::engine::ScannerId;
use crate::timeline::{EntryClass, EntryId};

/// Owned, allocation-free copy of a router notification
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SyncMessage {
    EntryPassed {
        scanner: ScannerId,
        index: usize,
        id: EntryId,
        class: EntryClass,
        time: f64,
        initial: bool,
    },
    ScanFinished {
        scanner: ScannerId,
        natural: bool,
        last_index: Option<usize>,
    },
    TempoChanged { bpm: f64 },
    TimelineChanged,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SyncMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SyncMessage> {
    fn pop(&mut self) -> Option<SyncMessage> {
        Consumer::pop(self).ok()
    }
}

/// Listener that forwards every notification into a ring buffer
///
/// Lets another thread (or a later point in the frame) consume notifications
/// without holding a reference into the router. When the buffer is full the
/// message is dropped and counted.
#[cfg(feature = "rtrb")]
pub struct ChannelListener {
    producer: Producer<SyncMessage>,
    dropped: usize,
}

#[cfg(feature = "rtrb")]
impl ChannelListener {
    /// Create a listener and the consumer end of its buffer
    pub fn channel(capacity: usize) -> (Self, Consumer<SyncMessage>) {
        let (producer, consumer) = RingBuffer::new(capacity);
        (
            Self {
                producer,
                dropped: 0,
            },
            consumer,
        )
    }

    /// Messages lost to a full buffer
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn send(&mut self, message: SyncMessage) {
        if self.producer.push(message).is_err() {
            self.dropped += 1;
            log::warn!("sync message buffer full, dropped {:?}", message);
        }
    }
}

#[cfg(feature = "rtrb")]
impl SyncListener for ChannelListener {
    fn on_entry_passed(&mut self, scanner: ScannerId, passage: &Passage<'_>, _ctx: &ScanContext<'_>) {
        self.send(SyncMessage::EntryPassed {
            scanner,
            index: passage.index,
            id: passage.entry.id(),
            class: passage.entry.class(),
            time: passage.entry.time,
            initial: passage.initial,
        });
    }

    fn on_scan_finished(&mut self, finished: &ScanFinished, _ctx: &ScanContext<'_>) {
        self.send(SyncMessage::ScanFinished {
            scanner: finished.scanner,
            natural: finished.natural,
            last_index: finished.last_index,
        });
    }

    fn on_effective_tempo_changed(&mut self, bpm: f64) {
        self.send(SyncMessage::TempoChanged { bpm });
    }

    fn on_timeline_changed(&mut self, _ctx: &ScanContext<'_>) {
        self.send(SyncMessage::TimelineChanged);
    }
}
