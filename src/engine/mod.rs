//! Frame driver tying the timeline, tempo map, scanners and router together.
//!
//! Once per rendered frame the engine reads the clock, then drives every
//! scanner forward against that same reading. Seeks, play toggles and
//! timeline edits instead rewind every scanner and silently catch it up, so
//! listeners resynchronize from [`ScanFinished`] rather than from a burst of
//! replayed passages.

pub mod scheduler;
pub mod window;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::playback::{ClockEvent, PlaybackClock};
use crate::router::{CallbackRouter, ScanContext, ScanFinished, Subscription, SubscriptionId, SyncListener};
use crate::timeline::{EntryId, Insertion, SortedTimeline, TimedEntry};
use crate::timing::TempoMap;

pub use self::scheduler::{Passage, ThresholdScanner};
pub use self::window::{VisibilityWindow, WindowScanners};

/// Handle to a scanner registered with a [`SyncEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScannerId(pub(crate) usize);

impl ScannerId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct SyncEngine {
    timeline: SortedTimeline,
    tempo: TempoMap,
    scanners: Vec<ThresholdScanner>,
    router: CallbackRouter,
    /// Window created by `from_config`, if any
    window: Option<WindowScanners>,
    /// Clock reading of the last frame or resync
    beat: f64,
}

impl SyncEngine {
    /// Engine with an empty timeline and no scanners
    pub fn new(base_bpm: f64) -> Result<Self> {
        Ok(Self {
            timeline: SortedTimeline::new(),
            tempo: TempoMap::new(base_bpm)?,
            scanners: Vec::new(),
            router: CallbackRouter::new(),
            window: None,
            beat: 0.0,
        })
    }

    /// Engine with a visibility window and a zero-offset tempo scanner
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let mut engine = Self::new(config.bpm)?;
        let window = VisibilityWindow::new(config.spawn_offset, config.despawn_offset)?;
        engine.add_window(window);
        let tempo_scanner = engine.add_scanner(0.0)?;
        engine.track_tempo(tempo_scanner);
        Ok(engine)
    }

    /// Register a scanner with the given offset in beats
    pub fn add_scanner(&mut self, offset: f64) -> Result<ScannerId> {
        if !offset.is_finite() {
            return Err(SyncError::InvalidOffset(offset));
        }
        self.scanners.push(ThresholdScanner::new(offset));
        Ok(ScannerId(self.scanners.len() - 1))
    }

    /// Register the spawn/despawn scanner pair of a window
    pub fn add_window(&mut self, window: VisibilityWindow) -> WindowScanners {
        self.scanners.push(ThresholdScanner::new(window.spawn_offset()));
        self.scanners.push(ThresholdScanner::new(window.despawn_offset()));
        let scanners = WindowScanners {
            spawn: ScannerId(self.scanners.len() - 2),
            despawn: ScannerId(self.scanners.len() - 1),
            window,
        };
        self.window.get_or_insert(scanners);
        scanners
    }

    /// First window registered
    pub fn window(&self) -> Option<WindowScanners> {
        self.window
    }

    /// Re-broadcast the tempo whenever this scanner passes a tempo change
    pub fn track_tempo(&mut self, scanner: ScannerId) {
        self.router.track_tempo(scanner);
    }

    /// Scanner currently driving tempo re-broadcasts
    pub fn tempo_scanner(&self) -> Option<ScannerId> {
        self.router.tempo_scanner()
    }

    pub fn subscribe(
        &mut self,
        subscription: Subscription,
        listener: Rc<RefCell<dyn SyncListener>>,
    ) -> SubscriptionId {
        self.router.subscribe(subscription, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.router.unsubscribe(id)
    }

    pub fn timeline(&self) -> &SortedTimeline {
        &self.timeline
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo
    }

    pub fn scanner(&self, id: ScannerId) -> Option<&ThresholdScanner> {
        self.scanners.get(id.0)
    }

    /// Clock reading (beats) of the last frame or resync
    pub fn beat(&self) -> f64 {
        self.beat
    }

    /// Tempo in effect at the last clock reading
    pub fn effective_bpm(&self) -> f64 {
        self.tempo.bpm_at_beat(self.beat)
    }

    /// Advance every scanner to the clock's current beat.
    ///
    /// Does nothing while paused. Returns the number of passages routed.
    pub fn frame<C: PlaybackClock + ?Sized>(&mut self, clock: &C) -> usize {
        if !clock.is_playing() {
            return 0;
        }
        let beat = clock.current_beat(&self.tempo);
        self.beat = beat;

        let Self {
            timeline,
            scanners,
            router,
            ..
        } = self;
        let timeline = &*timeline;
        let ctx = ScanContext { timeline, beat };

        let mut routed = 0;
        for (i, scanner) in scanners.iter_mut().enumerate() {
            let id = ScannerId(i);
            scanner.scan(timeline, beat, true, |passage| {
                routed += 1;
                router.entry_passed(id, &passage, &ctx);
            });
        }
        routed
    }

    /// React to a play toggle or a seek reported by the clock owner
    pub fn handle_clock_event<C: PlaybackClock + ?Sized>(&mut self, event: ClockEvent, clock: &C) {
        match event {
            ClockEvent::PlayToggled(playing) => debug!("playback {}", if playing { "started" } else { "paused" }),
            ClockEvent::PositionJumped => debug!("position jumped to {:.3}s", clock.current_seconds()),
        }
        self.resync(clock);
    }

    /// Rewind every scanner and silently catch it up to the clock.
    ///
    /// Listeners then receive one non-natural [`ScanFinished`] per scanner and
    /// the effective tempo at the new position.
    pub fn resync<C: PlaybackClock + ?Sized>(&mut self, clock: &C) {
        let beat = clock.current_beat(&self.tempo);
        self.beat = beat;

        let Self {
            timeline,
            tempo,
            scanners,
            router,
            ..
        } = self;
        let timeline = &*timeline;
        let ctx = ScanContext { timeline, beat };

        // Every cursor is reset before anyone is notified
        let finished: Vec<ScanFinished> = scanners
            .iter_mut()
            .enumerate()
            .map(|(i, scanner)| ScanFinished {
                scanner: ScannerId(i),
                natural: false,
                last_index: scanner.reset(timeline, beat),
            })
            .collect();
        debug!("resynced {} scanners at beat {:.3}", finished.len(), beat);

        for finished in &finished {
            router.scan_finished(finished, &ctx);
        }
        router.tempo_changed(tempo.bpm_at_beat(beat));
    }

    /// Add an entry to the timeline
    pub fn insert<C: PlaybackClock + ?Sized>(&mut self, entry: TimedEntry, clock: &C) -> Result<EntryId> {
        let (_, id) = self.edit(clock, |timeline| timeline.insert(entry))??;
        Ok(id)
    }

    /// Add an entry, replacing whatever occupies the same slot
    pub fn insert_replacing<C: PlaybackClock + ?Sized>(
        &mut self,
        entry: TimedEntry,
        clock: &C,
    ) -> Result<Insertion> {
        Ok(self.edit(clock, |timeline| timeline.insert_replacing(entry))??)
    }

    pub fn remove<C: PlaybackClock + ?Sized>(&mut self, id: EntryId, clock: &C) -> Result<Option<TimedEntry>> {
        self.edit(clock, |timeline| timeline.remove(id))
    }

    /// Apply an arbitrary batch of edits, then resynchronize once.
    ///
    /// When the timeline changed, the tempo map is rebuilt from its tempo
    /// entries, listeners hear `on_timeline_changed`, and every scanner is
    /// reset against the clock. If the tempo map cannot be rebuilt the
    /// timeline is restored and nothing is notified.
    pub fn edit<C, F, R>(&mut self, clock: &C, edit: F) -> Result<R>
    where
        C: PlaybackClock + ?Sized,
        F: FnOnce(&mut SortedTimeline) -> R,
    {
        let snapshot = self.timeline.clone();
        let output = edit(&mut self.timeline);
        if self.timeline.revision() == snapshot.revision() {
            return Ok(output);
        }

        self.tempo = match TempoMap::from_timeline(self.tempo.base_bpm(), &self.timeline) {
            Ok(tempo) => tempo,
            Err(err) => {
                // Nothing reached the scanners yet, so restoring the timeline undoes the edit
                warn!("rolling back timeline edit: {}", err);
                self.timeline = snapshot;
                return Err(err.into());
            }
        };
        let ctx = ScanContext {
            timeline: &self.timeline,
            beat: clock.current_beat(&self.tempo),
        };
        self.router.timeline_changed(&ctx);
        self.resync(clock);
        Ok(output)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("entries", &self.timeline.len())
            .field("scanners", &self.scanners)
            .field("router", &self.router)
            .field("beat", &self.beat)
            .finish()
    }
}
