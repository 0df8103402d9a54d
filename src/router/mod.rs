//! Callback routing between scanners and the objects that react to them.
//!
//! Listeners are handed to the router explicitly and filtered per scanner and
//! per entry class. The router also owns the tempo side effect: when the
//! scanner designated with [`CallbackRouter::track_tempo`] naturally passes a
//! tempo-change entry, every listener hears the new effective tempo.

pub mod message;

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::engine::{Passage, ScannerId};
use crate::timeline::{KindFilter, SortedTimeline};

pub use message::{MessageReceiver, SyncMessage};
#[cfg(feature = "rtrb")]
pub use message::ChannelListener;

/// Read-only view handed to listeners alongside every notification
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    pub timeline: &'a SortedTimeline,
    /// Clock reading (beats) the notification belongs to
    pub beat: f64,
}

/// A scanner finished a full re-scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanFinished {
    pub scanner: ScannerId,
    /// `false` when triggered by a seek, play toggle or timeline edit
    pub natural: bool,
    pub last_index: Option<usize>,
}

/// Receiver of synchronization notifications. Every method defaults to a no-op.
pub trait SyncListener {
    fn on_entry_passed(&mut self, _scanner: ScannerId, _passage: &Passage<'_>, _ctx: &ScanContext<'_>) {}

    fn on_scan_finished(&mut self, _finished: &ScanFinished, _ctx: &ScanContext<'_>) {}

    fn on_effective_tempo_changed(&mut self, _bpm: f64) {}

    /// The timeline was structurally edited; indices from before are stale
    fn on_timeline_changed(&mut self, _ctx: &ScanContext<'_>) {}
}

/// Handle for removing a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Which passages and scan completions a listener receives
#[derive(Debug, Clone, Default)]
pub struct Subscription {
    /// Empty means every scanner
    scanners: Vec<ScannerId>,
    kinds: KindFilter,
}

impl Subscription {
    /// Everything from every scanner
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a scanner (may be called repeatedly)
    pub fn scanner(mut self, scanner: ScannerId) -> Self {
        self.scanners.push(scanner);
        self
    }

    /// Restrict passages to the given entry classes
    pub fn kinds(mut self, kinds: KindFilter) -> Self {
        self.kinds = kinds;
        self
    }

    fn wants_scanner(&self, scanner: ScannerId) -> bool {
        self.scanners.is_empty() || self.scanners.contains(&scanner)
    }

    fn wants(&self, scanner: ScannerId, passage: &Passage<'_>) -> bool {
        self.wants_scanner(scanner) && self.kinds.contains(passage.entry.class())
    }
}

struct Route {
    id: SubscriptionId,
    subscription: Subscription,
    listener: Rc<RefCell<dyn SyncListener>>,
}

/// Fans scanner output out to subscribed listeners
#[derive(Default)]
pub struct CallbackRouter {
    routes: Vec<Route>,
    next_id: u64,
    tempo_scanner: Option<ScannerId>,
}

impl CallbackRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        subscription: Subscription,
        listener: Rc<RefCell<dyn SyncListener>>,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.routes.push(Route {
            id,
            subscription,
            listener,
        });
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.routes.len();
        self.routes.retain(|route| route.id != id);
        self.routes.len() != before
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Scanner whose natural tempo-change passages re-broadcast the tempo
    pub fn track_tempo(&mut self, scanner: ScannerId) {
        self.tempo_scanner = Some(scanner);
    }

    pub fn tempo_scanner(&self) -> Option<ScannerId> {
        self.tempo_scanner
    }

    pub fn entry_passed(&mut self, scanner: ScannerId, passage: &Passage<'_>, ctx: &ScanContext<'_>) {
        for route in &self.routes {
            if route.subscription.wants(scanner, passage) {
                route.listener.borrow_mut().on_entry_passed(scanner, passage, ctx);
            }
        }

        if self.tempo_scanner == Some(scanner) && !passage.initial {
            if let Some(bpm) = passage.entry.tempo_bpm() {
                debug!("tempo change to {} BPM at beat {}", bpm, passage.entry.time);
                self.tempo_changed(bpm);
            }
        }
    }

    pub fn scan_finished(&mut self, finished: &ScanFinished, ctx: &ScanContext<'_>) {
        for route in &self.routes {
            if route.subscription.wants_scanner(finished.scanner) {
                route.listener.borrow_mut().on_scan_finished(finished, ctx);
            }
        }
    }

    pub fn tempo_changed(&mut self, bpm: f64) {
        for route in &self.routes {
            route.listener.borrow_mut().on_effective_tempo_changed(bpm);
        }
    }

    pub fn timeline_changed(&mut self, ctx: &ScanContext<'_>) {
        for route in &self.routes {
            route.listener.borrow_mut().on_timeline_changed(ctx);
        }
    }
}

impl std::fmt::Debug for CallbackRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRouter")
            .field("routes", &self.routes.len())
            .field("tempo_scanner", &self.tempo_scanner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{MapEvent, Note, TimedEntry};

    #[derive(Default)]
    struct Recorder {
        passed: Vec<(ScannerId, usize)>,
        finished: Vec<ScanFinished>,
        tempos: Vec<f64>,
        timeline_changes: usize,
    }

    impl SyncListener for Recorder {
        fn on_entry_passed(&mut self, scanner: ScannerId, passage: &Passage<'_>, _ctx: &ScanContext<'_>) {
            self.passed.push((scanner, passage.index));
        }

        fn on_scan_finished(&mut self, finished: &ScanFinished, _ctx: &ScanContext<'_>) {
            self.finished.push(*finished);
        }

        fn on_effective_tempo_changed(&mut self, bpm: f64) {
            self.tempos.push(bpm);
        }

        fn on_timeline_changed(&mut self, _ctx: &ScanContext<'_>) {
            self.timeline_changes += 1;
        }
    }

    fn fixture() -> SortedTimeline {
        SortedTimeline::from_entries([
            TimedEntry::note(1.0, Note::default()),
            TimedEntry::event(2.0, MapEvent::new(0, 1)),
            TimedEntry::tempo_change(3.0, 150.0),
        ])
        .unwrap()
    }

    fn route_all(router: &mut CallbackRouter, scanner: ScannerId, timeline: &SortedTimeline, initial: bool) {
        let ctx = ScanContext { timeline, beat: 10.0 };
        for (index, entry) in timeline.iter().enumerate() {
            let passage = Passage { index, entry, initial };
            router.entry_passed(scanner, &passage, &ctx);
        }
    }

    #[test]
    fn test_filters_by_kind_and_scanner() {
        let timeline = fixture();
        let mut router = CallbackRouter::new();
        let notes = Rc::new(RefCell::new(Recorder::default()));
        let spawn_events = Rc::new(RefCell::new(Recorder::default()));
        router.subscribe(Subscription::all().kinds(KindFilter::NOTES), notes.clone());
        router.subscribe(
            Subscription::all().scanner(ScannerId(1)).kinds(KindFilter::EVENTS),
            spawn_events.clone(),
        );

        route_all(&mut router, ScannerId(0), &timeline, false);
        route_all(&mut router, ScannerId(1), &timeline, false);

        assert_eq!(notes.borrow().passed, vec![(ScannerId(0), 0), (ScannerId(1), 0)]);
        assert_eq!(spawn_events.borrow().passed, vec![(ScannerId(1), 1)]);
    }

    #[test]
    fn test_tempo_rebroadcast_only_from_tracked_scanner() {
        let timeline = fixture();
        let mut router = CallbackRouter::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        router.subscribe(Subscription::all().kinds(KindFilter::NOTES), recorder.clone());
        router.track_tempo(ScannerId(2));

        route_all(&mut router, ScannerId(0), &timeline, false);
        assert!(recorder.borrow().tempos.is_empty());

        // Initial passages (full re-scans) do not re-broadcast
        route_all(&mut router, ScannerId(2), &timeline, true);
        assert!(recorder.borrow().tempos.is_empty());

        route_all(&mut router, ScannerId(2), &timeline, false);
        assert_eq!(recorder.borrow().tempos, vec![150.0]);
    }

    #[test]
    fn test_scan_finished_and_unsubscribe() {
        let timeline = fixture();
        let ctx = ScanContext { timeline: &timeline, beat: 0.0 };
        let mut router = CallbackRouter::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let id = router.subscribe(Subscription::all().scanner(ScannerId(0)), recorder.clone());

        let finished = ScanFinished {
            scanner: ScannerId(0),
            natural: false,
            last_index: Some(1),
        };
        router.scan_finished(&finished, &ctx);
        router.scan_finished(&ScanFinished { scanner: ScannerId(5), ..finished }, &ctx);
        router.timeline_changed(&ctx);

        assert_eq!(recorder.borrow().finished, vec![finished]);
        assert_eq!(recorder.borrow().timeline_changes, 1);

        assert!(router.unsubscribe(id));
        assert!(!router.unsubscribe(id));
        assert!(router.is_empty());
    }
}
