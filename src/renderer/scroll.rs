//! Active heading tracking.
//!
//! [`ActiveHeadingTracker`] is the pure rule; [`spawn_scroll_spy`] runs it
//! on a task fed with viewport events, debouncing bursts and publishing the
//! active heading id on a watch channel.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;

/// Distance below the viewport top at which a heading counts as reached.
pub const DEFAULT_SCROLL_OFFSET: f64 = 100.0;

/// Below this position the first heading is active even if none is reached.
pub const TOP_OF_PAGE_THRESHOLD: f64 = 200.0;

/// Vertical position of a heading in the laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    /// Heading fragment id.
    pub id: String,
    /// Offset of the heading's top edge from the document top.
    pub top: f64,
}

impl HeadingPosition {
    /// Creates a position entry.
    #[must_use]
    pub fn new(id: impl Into<String>, top: f64) -> Self {
        Self { id: id.into(), top }
    }
}

/// Picks the heading to highlight for a scroll position.
#[derive(Debug, Clone)]
pub struct ActiveHeadingTracker {
    headings: Vec<HeadingPosition>,
    offset: f64,
}

impl ActiveHeadingTracker {
    /// Creates a tracker over headings in document order.
    #[must_use]
    pub fn new(headings: Vec<HeadingPosition>) -> Self {
        Self {
            headings,
            offset: DEFAULT_SCROLL_OFFSET,
        }
    }

    /// Overrides the fixed-header offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Replaces heading positions after a relayout.
    pub fn set_headings(&mut self, headings: Vec<HeadingPosition>) {
        self.headings = headings;
    }

    /// Active heading id for `scroll_y`.
    ///
    /// The last heading whose top is at or above `scroll_y + offset` wins.
    /// Near the top of the page with none reached, the first heading is
    /// active.
    #[must_use]
    pub fn active(&self, scroll_y: f64) -> Option<&str> {
        let position = scroll_y + self.offset;
        let mut named = self.headings.iter().filter(|h| !h.id.is_empty());

        if let Some(h) = named.clone().rev().find(|h| h.top <= position) {
            return Some(&h.id);
        }
        if position < TOP_OF_PAGE_THRESHOLD {
            return named.next().map(|h| h.id.as_str());
        }
        None
    }
}

/// Viewport change delivered to the scroll spy.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// The page scrolled to `scroll_y`.
    Scroll(f64),
    /// The viewport resized; headings moved to the given positions.
    Resize(Vec<HeadingPosition>),
}

/// Quiet periods before recomputing after each event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    /// Delay after a scroll event.
    pub scroll: Duration,
    /// Delay after a resize event.
    pub resize: Duration,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            scroll: Duration::from_millis(10),
            resize: Duration::from_millis(100),
        }
    }
}

/// Handle to a running scroll spy.
#[derive(Debug)]
pub struct ScrollSpy {
    /// Sends viewport events to the spy.
    pub events: mpsc::Sender<ViewportEvent>,
    /// Receives the active heading id.
    pub active: watch::Receiver<Option<String>>,
    /// The spy task; finishes once every event sender is dropped.
    pub task: JoinHandle<()>,
}

/// Spawns the scroll spy task.
///
/// The active heading is computed once immediately, then again after each
/// burst of events has been quiet for the debounce delay of its last event.
#[must_use]
pub fn spawn_scroll_spy(mut tracker: ActiveHeadingTracker, debounce: Debounce) -> ScrollSpy {
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let initial = tracker.active(0.0).map(str::to_string);
    let (active_tx, active_rx) = watch::channel(initial);

    let task = tokio::spawn(async move {
        let mut scroll_y = 0.0;

        while let Some(event) = events_rx.recv().await {
            let mut delay = apply(&mut tracker, &mut scroll_y, event, debounce);
            let mut closed = false;

            loop {
                match tokio::time::timeout(delay, events_rx.recv()).await {
                    Ok(Some(event)) => delay = apply(&mut tracker, &mut scroll_y, event, debounce),
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            let next = tracker.active(scroll_y).map(str::to_string);
            trace!(scroll_y, active = ?next, "active heading recomputed");
            active_tx.send_if_modified(|current| {
                if *current == next {
                    false
                } else {
                    *current = next;
                    true
                }
            });

            if closed {
                break;
            }
        }
    });

    ScrollSpy {
        events: events_tx,
        active: active_rx,
        task,
    }
}

fn apply(
    tracker: &mut ActiveHeadingTracker,
    scroll_y: &mut f64,
    event: ViewportEvent,
    debounce: Debounce,
) -> Duration {
    match event {
        ViewportEvent::Scroll(y) => {
            *scroll_y = y;
            debounce.scroll
        }
        ViewportEvent::Resize(headings) => {
            tracker.set_headings(headings);
            debounce.resize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ActiveHeadingTracker {
        ActiveHeadingTracker::new(vec![
            HeadingPosition::new("intro", 150.0),
            HeadingPosition::new("fibonacci", 600.0),
            HeadingPosition::new("big-o", 1200.0),
        ])
    }

    #[test]
    fn test_top_of_page_selects_first() {
        assert_eq!(tracker().active(0.0), Some("intro"));
    }

    #[test]
    fn test_last_reached_heading_wins() {
        let t = tracker();
        assert_eq!(t.active(500.0), Some("fibonacci"));
        assert_eq!(t.active(1100.0), Some("big-o"));
        assert_eq!(t.active(5000.0), Some("big-o"));
    }

    #[test]
    fn test_nothing_reached_below_threshold() {
        let t = ActiveHeadingTracker::new(vec![HeadingPosition::new("late", 2000.0)]);
        assert_eq!(t.active(0.0), Some("late"));
        assert_eq!(t.active(300.0), None);
    }

    #[test]
    fn test_custom_offset() {
        let t = tracker().with_offset(0.0);
        assert_eq!(t.active(590.0), Some("intro"));
    }

    #[test]
    fn test_empty_tracker() {
        assert_eq!(ActiveHeadingTracker::new(vec![]).active(0.0), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_spy_debounces_and_publishes() {
        let mut spy = spawn_scroll_spy(tracker(), Debounce::default());
        assert_eq!(spy.active.borrow().as_deref(), Some("intro"));

        for y in [200.0, 400.0, 550.0] {
            spy.events.send(ViewportEvent::Scroll(y)).await.unwrap();
        }
        spy.active.changed().await.unwrap();
        assert_eq!(spy.active.borrow().as_deref(), Some("fibonacci"));

        spy.events
            .send(ViewportEvent::Resize(vec![HeadingPosition::new("intro", 150.0)]))
            .await
            .unwrap();
        spy.active.changed().await.unwrap();
        assert_eq!(spy.active.borrow().as_deref(), Some("intro"));

        drop(spy.events);
        spy.task.await.unwrap();
    }
}
