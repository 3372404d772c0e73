//! Terminal input plus tick and render clocks, merged onto one channel by
//! a background task.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Housekeeping clock (toast expiry).
    Tick,
    /// Frame clock.
    Render,
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, frame_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_loop(tx, cancel.clone(), tick_rate, frame_rate));
        Self { rx, cancel }
    }

    /// `None` once the reader task has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_loop(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    frame_rate: Duration,
) {
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(tick_rate);
    let mut frame = tokio::time::interval(frame_rate);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = frame.tick() => Event::Render,
            Some(Ok(raw)) = input.next() => match raw {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                TermEvent::Resize(w, h) => Event::Resize(w, h),
                _ => continue,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}
