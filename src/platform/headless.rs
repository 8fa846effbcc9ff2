//! Headless platform: recording canvases, an in-memory surface registry and
//! a manually advanced timer queue.
//!
//! Used by the native demo and by every engine test.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use glam::Vec2;

use crate::error::SurfaceError;
use crate::services::Timers;
use crate::surface::{Canvas2d, Color, SurfaceProvider, TextStyle};

/// Kinds of draw call, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawOp {
    Clear,
    Rect,
    Circle,
    Ring,
    Text,
    ContainerMessage,
}

impl DrawOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawOp::Clear => "clear",
            DrawOp::Rect => "fill_rect",
            DrawOp::Circle => "fill_circle",
            DrawOp::Ring => "stroke_circle",
            DrawOp::Text => "fill_text",
            DrawOp::ContainerMessage => "show_container_message",
        }
    }
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect { origin: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Ring { center: Vec2, radius: f32, line_width: f32, color: Color },
    Text { text: String, pos: Vec2, size: f32 },
    ContainerMessage(String),
}

#[derive(Default)]
struct LogInner {
    commands: Vec<DrawCommand>,
    failing: HashSet<DrawOp>,
}

/// Shared handle onto a recording canvas's command list
#[derive(Clone, Default)]
pub struct DrawLog {
    inner: Rc<RefCell<LogInner>>,
}

impl DrawLog {
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.inner.borrow().commands.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().commands.clear();
    }

    /// All text drawn so far, including container messages
    pub fn texts(&self) -> Vec<String> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } | DrawCommand::ContainerMessage(text) => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Make every future call of `op` fail
    pub fn fail_on(&self, op: DrawOp) {
        self.inner.borrow_mut().failing.insert(op);
    }

    pub fn heal(&self) {
        self.inner.borrow_mut().failing.clear();
    }

    fn record(&self, op: DrawOp, command: DrawCommand) -> Result<(), SurfaceError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing.contains(&op) {
            return Err(SurfaceError::draw(op.as_str(), "injected failure"));
        }
        inner.commands.push(command);
        Ok(())
    }
}

/// Canvas that records draw calls instead of rasterizing
pub struct RecordingCanvas {
    width: f32,
    height: f32,
    log: DrawLog,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32, log: DrawLog) -> Self {
        Self { width, height, log }
    }
}

impl Canvas2d for RecordingCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) -> Result<(), SurfaceError> {
        self.log.record(DrawOp::Clear, DrawCommand::Clear(color))
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) -> Result<(), SurfaceError> {
        self.log
            .record(DrawOp::Rect, DrawCommand::Rect { origin, size, color })
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<(), SurfaceError> {
        self.log.record(
            DrawOp::Circle,
            DrawCommand::Circle {
                center,
                radius,
                color,
            },
        )
    }

    fn stroke_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        line_width: f32,
        color: Color,
    ) -> Result<(), SurfaceError> {
        self.log.record(
            DrawOp::Ring,
            DrawCommand::Ring {
                center,
                radius,
                line_width,
                color,
            },
        )
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, style: TextStyle) -> Result<(), SurfaceError> {
        self.log.record(
            DrawOp::Text,
            DrawCommand::Text {
                text: text.to_string(),
                pos,
                size: style.size,
            },
        )
    }

    fn show_container_message(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.log.record(
            DrawOp::ContainerMessage,
            DrawCommand::ContainerMessage(text.to_string()),
        )
    }
}

enum SurfaceEntry {
    Ready { width: f32, height: f32, log: DrawLog },
    NoContext,
}

/// In-memory surface registry
#[derive(Default)]
pub struct HeadlessHost {
    surfaces: RefCell<HashMap<String, SurfaceEntry>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface and return the log its canvas records into
    pub fn add_surface(&self, id: &str, width: f32, height: f32) -> DrawLog {
        let log = DrawLog::default();
        self.surfaces.borrow_mut().insert(
            id.to_string(),
            SurfaceEntry::Ready {
                width,
                height,
                log: log.clone(),
            },
        );
        log
    }

    /// Register a surface whose 2D context cannot be obtained
    pub fn add_contextless_surface(&self, id: &str) {
        self.surfaces
            .borrow_mut()
            .insert(id.to_string(), SurfaceEntry::NoContext);
    }
}

impl SurfaceProvider for HeadlessHost {
    fn resolve(&self, id: &str) -> Result<Box<dyn Canvas2d>, SurfaceError> {
        match self.surfaces.borrow().get(id) {
            Some(SurfaceEntry::Ready { width, height, log }) => {
                Ok(Box::new(RecordingCanvas::new(*width, *height, log.clone())))
            }
            Some(SurfaceEntry::NoContext) => Err(SurfaceError::ContextUnavailable(id.to_string())),
            None => Err(SurfaceError::NotFound(id.to_string())),
        }
    }
}

struct PendingTask {
    due_ms: u64,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// Timer queue advanced explicitly by the caller
#[derive(Default)]
pub struct ManualTimers {
    now_ms: Cell<u64>,
    next_seq: Cell<u64>,
    queue: RefCell<Vec<PendingTask>>,
}

impl ManualTimers {
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move the clock forward and run every task that came due, in order
    pub fn advance(&self, ms: u64) {
        let now = self.now_ms.get() + ms;
        self.now_ms.set(now);

        let mut due: Vec<PendingTask> = {
            let mut queue = self.queue.borrow_mut();
            let (ready, waiting): (Vec<_>, Vec<_>) =
                queue.drain(..).partition(|t| t.due_ms <= now);
            *queue = waiting;
            ready
        };
        due.sort_by_key(|t| (t.due_ms, t.seq));
        for pending in due {
            (pending.task)();
        }
    }
}

impl Timers for ManualTimers {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.queue.borrow_mut().push(PendingTask {
            due_ms: self.now_ms.get() + delay_ms as u64,
            seq,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_canvas_records() {
        let log = DrawLog::default();
        let mut canvas = RecordingCanvas::new(100.0, 50.0, log.clone());
        canvas.clear(Color::SPACE).unwrap();
        canvas
            .fill_circle(Vec2::new(1.0, 2.0), 3.0, Color::WHITE)
            .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(canvas.size(), (100.0, 50.0));
    }

    #[test]
    fn test_injected_failure() {
        let log = DrawLog::default();
        let mut canvas = RecordingCanvas::new(100.0, 50.0, log.clone());
        log.fail_on(DrawOp::Circle);
        assert!(canvas.fill_circle(Vec2::ZERO, 1.0, Color::WHITE).is_err());
        assert!(canvas
            .fill_text("ok", Vec2::ZERO, TextStyle::new(10.0, Color::WHITE))
            .is_ok());
        assert_eq!(log.texts(), vec!["ok".to_string()]);
    }

    #[test]
    fn test_host_resolution_errors() {
        let host = HeadlessHost::new();
        host.add_contextless_surface("broken");
        assert!(matches!(
            host.resolve("broken"),
            Err(SurfaceError::ContextUnavailable(_))
        ));
        assert!(matches!(host.resolve("missing"), Err(SurfaceError::NotFound(_))));
    }

    #[test]
    fn test_manual_timers_fire_in_order() {
        let timers = ManualTimers::default();
        let fired = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(300, "b"), (100, "a"), (300, "c")] {
            let fired = fired.clone();
            timers.schedule(delay, Box::new(move || fired.borrow_mut().push(tag)));
        }
        timers.advance(99);
        assert!(fired.borrow().is_empty());
        timers.advance(1);
        assert_eq!(*fired.borrow(), vec!["a"]);
        timers.advance(500);
        assert_eq!(*fired.borrow(), vec!["a", "b", "c"]);
        assert_eq!(timers.pending(), 0);
    }
}
