//! Pointer events for the paint canvas.
//!
//! The canvas publishes every pointer event through a [`CanvasEvents`]
//! publisher; drawing tools subscribe as observers. [`StrokeRecorder`] is the
//! tool that turns the raw event stream into strokes.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::observer::{Observer, Publisher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }
}

pub type CanvasEvents = Publisher<PointerEvent>;

/// Ordered points of one pointer-down → pointer-up gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Default)]
struct RecorderState {
    finished: Vec<Stroke>,
    active: Option<Stroke>,
}

/// Groups pointer events into strokes.
///
/// `Down` opens a stroke, `Move` extends the open stroke and `Up` closes it.
/// Moves with no open stroke are ignored. A `Down` while a stroke is open
/// closes the previous one first.
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    state: Mutex<RecorderState>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> Vec<Stroke> {
        self.state.lock().finished.clone()
    }

    pub fn is_drawing(&self) -> bool {
        self.state.lock().active.is_some()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.finished.clear();
        state.active = None;
    }
}

impl Observer<PointerEvent> for StrokeRecorder {
    fn update(&self, payload: Option<&PointerEvent>) {
        let Some(event) = payload else {
            return;
        };
        let mut state = self.state.lock();
        let point = (event.x, event.y);
        match event.kind {
            PointerKind::Down => {
                if let Some(open) = state.active.take() {
                    state.finished.push(open);
                }
                state.active = Some(Stroke {
                    points: vec![point],
                });
            }
            PointerKind::Move => {
                if let Some(open) = state.active.as_mut() {
                    open.points.push(point);
                }
            }
            PointerKind::Up => {
                if let Some(mut open) = state.active.take() {
                    open.points.push(point);
                    state.finished.push(open);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::observer::ObserverRef;

    fn emit(canvas: &CanvasEvents, kind: PointerKind, x: f32, y: f32) {
        canvas.notify(Some(&PointerEvent::new(kind, x, y)));
    }

    #[test]
    fn recorder_builds_strokes_from_published_events() {
        let canvas = CanvasEvents::new();
        let recorder = Arc::new(StrokeRecorder::new());
        canvas.subscribe(recorder.clone());

        emit(&canvas, PointerKind::Move, 0.0, 0.0);
        emit(&canvas, PointerKind::Down, 1.0, 1.0);
        emit(&canvas, PointerKind::Move, 2.0, 2.0);
        emit(&canvas, PointerKind::Up, 3.0, 3.0);

        assert_eq!(
            recorder.strokes(),
            vec![Stroke {
                points: vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)],
            }]
        );
        assert!(!recorder.is_drawing());
    }

    #[test]
    fn unsubscribed_recorder_stops_receiving() {
        let canvas = CanvasEvents::new();
        let recorder = Arc::new(StrokeRecorder::new());
        let as_observer: ObserverRef<PointerEvent> = recorder.clone();
        canvas.subscribe(Arc::clone(&as_observer));

        emit(&canvas, PointerKind::Down, 0.0, 0.0);
        canvas.unsubscribe(&as_observer);
        emit(&canvas, PointerKind::Up, 1.0, 1.0);

        assert!(recorder.is_drawing());
        assert!(recorder.strokes().is_empty());
    }

    #[test]
    fn second_down_closes_open_stroke() {
        let recorder = StrokeRecorder::new();
        recorder.update(Some(&PointerEvent::new(PointerKind::Down, 0.0, 0.0)));
        recorder.update(Some(&PointerEvent::new(PointerKind::Down, 5.0, 5.0)));
        recorder.update(None);

        assert_eq!(recorder.strokes().len(), 1);
        assert!(recorder.is_drawing());
    }
}
