//! Terminal input pump.
//!
//! A background task merges crossterm input with two timers: a slow spinner
//! pace for the loading throbber and a frame pace for redraws. Everything
//! arrives on one unbounded channel in the order it happened.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
    /// Advance the throbber.
    Spin,
    /// Time to redraw.
    Frame,
}

/// Timer periods for the pump.
#[derive(Debug, Clone, Copy)]
pub struct Pace {
    pub spin: Duration,
    pub frame: Duration,
}

impl Default for Pace {
    fn default() -> Self {
        Self {
            spin: Duration::from_millis(250),
            frame: Duration::from_millis(33),
        }
    }
}

/// Keep key presses and resizes; drop releases, repeats, mouse and paste.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize { cols, rows }),
        _ => None,
    }
}

fn timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Handle to the running pump. Dropping it stops the task.
pub struct TerminalEvents {
    rx: mpsc::UnboundedReceiver<Event>,
    stop: CancellationToken,
}

impl TerminalEvents {
    pub fn spawn(pace: Pace) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = CancellationToken::new();
        tokio::spawn(pump(tx, pace, stop.clone()));
        Self { rx, stop }
    }

    /// `None` once the pump has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for TerminalEvents {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn pump(tx: mpsc::UnboundedSender<Event>, pace: Pace, stop: CancellationToken) {
    let mut input = EventStream::new();
    let mut spin = timer(pace.spin);
    let mut frame = timer(pace.frame);

    loop {
        let event = tokio::select! {
            () = stop.cancelled() => return,
            _ = spin.tick() => Event::Spin,
            _ = frame.tick() => Event::Frame,
            Some(Ok(raw)) = input.next() => match translate(raw) {
                Some(event) => event,
                None => continue,
            },
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}
