//! Player - owns the engine, the clock and the visible objects

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::{Consumer, RingBuffer};

use beatsync::engine::{ScannerId, VisibilityWindow};
use beatsync::objects::{GridLayout, ObjectContainer};
use beatsync::playback::ClockEvent;
use beatsync::router::{ChannelListener, Subscription, SyncMessage};
use beatsync::timeline::{EntryClass, KindFilter, Note, TimedEntry};
use beatsync::{SyncConfig, SyncEngine};

use super::audio::{AudioClock, Click};
use super::clock::PlayerClock;
use super::ui;

/// Beats moved by one seek key press
const SEEK_BEATS: f64 = 4.0;
/// Queued clicks before the audio callback catches up
const CLICK_CAPACITY: usize = 64;

/// Counters shown in the status line
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub notes_passed: u64,
    pub tempo_changes: u64,
    pub resyncs: u64,
}

pub struct App {
    pub engine: SyncEngine,
    pub clock: PlayerClock,
    pub objects: Rc<RefCell<ObjectContainer>>,
    pub window: VisibilityWindow,
    pub stats: Stats,
    messages: Consumer<SyncMessage>,
    listener: Rc<RefCell<ChannelListener>>,
    /// Zero-offset tempo scanner; its note passages trigger clicks
    metronome: ScannerId,
    should_quit: bool,
}

impl App {
    pub fn new(config: &SyncConfig, chart: Vec<TimedEntry>, silent: bool) -> EyreResult<Self> {
        let mut engine = SyncEngine::from_config(config)?;
        let window = engine
            .window()
            .ok_or_else(|| eyre!("engine has no visibility window"))?;

        let objects = Rc::new(RefCell::new(ObjectContainer::new(
            window,
            GridLayout::new(config.beat_spacing),
        )));
        engine.subscribe(
            Subscription::all().scanner(window.spawn).scanner(window.despawn),
            objects.clone(),
        );

        let metronome = engine
            .tempo_scanner()
            .ok_or_else(|| eyre!("engine has no tempo scanner"))?;
        let (listener, messages) = ChannelListener::channel(config.message_capacity);
        let listener = Rc::new(RefCell::new(listener));
        engine.subscribe(
            Subscription::all()
                .scanner(metronome)
                .kinds(KindFilter::NOTES | KindFilter::TEMPO_CHANGES),
            listener.clone(),
        );

        // Position 0 until the song length, and with it the real clock, is known
        let loading = PlayerClock::silent(0.0);
        engine.edit(&loading, |timeline| timeline.extend(chart))??;
        let end_beat = engine.timeline().iter().last().map_or(0.0, |entry| entry.time) + 1.0;
        let length = engine.tempo_map().seconds_from_beats(end_beat);

        let clock = if silent {
            PlayerClock::silent(length)
        } else {
            let (producer, consumer) = RingBuffer::new(CLICK_CAPACITY);
            match AudioClock::open(consumer) {
                Ok(audio) => PlayerClock::audio(audio, producer, length),
                Err(err) => {
                    log::warn!("falling back to silent playback: {:#}", err);
                    PlayerClock::silent(length)
                }
            }
        };
        engine.resync(&clock);
        log::info!(
            "loaded {} entries, {:.1}s at {} BPM",
            engine.timeline().len(),
            length,
            config.bpm
        );

        Ok(Self {
            engine,
            clock,
            objects,
            window: window.window,
            stats: Stats::default(),
            messages,
            listener,
            metronome,
            should_quit: false,
        })
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if let Some(event) = self.clock.tick() {
                self.handle_clock_event(event);
            }
            self.engine.frame(&self.clock);
            self.drain_messages();

            terminal.draw(|frame| ui::render(frame, self))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }
        }

        let dropped = self.listener.borrow().dropped();
        if dropped > 0 {
            log::warn!("{} sync messages were dropped", dropped);
        }
        Ok(())
    }

    /// Source of the current clock, for the transport bar
    pub fn clock_source(&self) -> String {
        self.clock.source()
    }

    fn handle_key(&mut self, key: KeyCode) -> EyreResult<()> {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                let event = self.clock.toggle();
                self.handle_clock_event(event);
            }
            KeyCode::Left => self.seek_by(-SEEK_BEATS),
            KeyCode::Right => self.seek_by(SEEK_BEATS),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let event = self.clock.seek(0.0);
                self.handle_clock_event(event);
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                let mut objects = self.objects.borrow_mut();
                let enabled = !objects.propagation_editing();
                objects.set_propagation_editing(enabled, self.engine.timeline());
                log::info!("propagation editing {}", if enabled { "on" } else { "off" });
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.insert_note()?,
            _ => {}
        }
        Ok(())
    }

    fn seek_by(&mut self, beats: f64) {
        let target = (self.engine.beat() + beats).max(0.0);
        let seconds = self.engine.tempo_map().seconds_from_beats(target);
        let event = self.clock.seek(seconds);
        self.handle_clock_event(event);
    }

    /// Drop a note two beats ahead, on the lane of the beat it lands on
    fn insert_note(&mut self) -> EyreResult<()> {
        let time = (self.engine.beat() + 2.0).round();
        let note = Note {
            line_index: (time as i64).rem_euclid(4) as u8,
            line_layer: 2,
            cut_direction: 0,
        };
        let insertion = self
            .engine
            .insert_replacing(TimedEntry::note(time, note), &self.clock)?;
        self.stats.resyncs += 1;
        if let Some(replaced) = insertion.replaced {
            log::debug!("note at beat {} replaced {:?}", time, replaced.kind);
        }
        Ok(())
    }

    fn handle_clock_event(&mut self, event: ClockEvent) {
        self.engine.handle_clock_event(event, &self.clock);
        self.stats.resyncs += 1;
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.messages.pop() {
            match message {
                SyncMessage::EntryPassed {
                    scanner,
                    class: EntryClass::Note,
                    time,
                    initial: false,
                    ..
                } if scanner == self.metronome => {
                    self.stats.notes_passed += 1;
                    self.clock.click(Click {
                        accent: time.rem_euclid(4.0) == 0.0,
                    });
                }
                SyncMessage::TempoChanged { bpm } => {
                    self.stats.tempo_changes += 1;
                    log::debug!("effective tempo {:.1} BPM at beat {:.2}", bpm, self.engine.beat());
                }
                _ => {}
            }
        }
    }
}
