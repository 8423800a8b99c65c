//! Pointer passthrough control for the host window.
//!
//! The companion window covers the whole screen but should only receive
//! pointer events while the pointer is over a companion. [`CursorPassthrough`]
//! turns passthrough off as soon as the pointer overlaps an opaque companion
//! pixel, and turns it back on [`RELEASE_DELAY`] seconds after the overlap
//! ends. A new overlap before the delay elapses cancels the pending release.
//!
//! Host calls go through the [`CompanionHost`] trait. They are fire-and-forget:
//! a failed call is logged and the recorded passthrough flag keeps its value.

use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use raylib::prelude::Vector2;

/// Seconds between losing the overlap and resuming passthrough.
pub const RELEASE_DELAY: f32 = 0.05;

/// Services the behavior engine consumes from the window host.
pub trait CompanionHost: Send + Sync {
    /// Pointer position in device pixels, or `None` when unavailable.
    fn pointer_position(&self) -> Result<Option<Vector2>, String>;
    /// Make the window ignore (`true`) or receive (`false`) pointer events.
    fn set_pointer_passthrough(&mut self, enabled: bool) -> Result<(), String>;
    /// Device pixels per scene unit.
    fn device_pixel_ratio(&self) -> f32;
}

/// Convert an OS cursor position (screen device pixels) into device pixels
/// relative to the window whose top-left corner is at `window_origin`.
///
/// `window_origin` is in the window system's logical units and is scaled by
/// `dpi` first.
pub fn screen_to_window_pointer(screen: Vector2, window_origin: Vector2, dpi: Vector2) -> Vector2 {
    Vector2 {
        x: screen.x - window_origin.x * dpi.x,
        y: screen.y - window_origin.y * dpi.y,
    }
}

/// The host implementation, boxed so the world does not depend on raylib's
/// window handle.
#[derive(Resource)]
pub struct HostBridge(pub Box<dyn CompanionHost>);

#[derive(Resource, Debug, Clone, Default)]
pub struct CursorPassthrough {
    /// Last pointer position in scene units.
    pub pointer: Option<Vector2>,
    /// Whether the window currently passes pointer events through.
    pub passthrough: bool,
    /// World time of the pending release, if any.
    pub release_due_at: Option<f32>,
}

impl CursorPassthrough {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start click-through.
    pub fn start(&mut self, host: &mut dyn CompanionHost) {
        self.request(host, true);
    }

    /// Update from one pointer sample.
    ///
    /// `device_pointer` is in device pixels and is divided by `dpr`. `hit`
    /// answers whether a scene-space point covers an opaque companion pixel.
    pub fn poll_cursor_overlap(
        &mut self,
        device_pointer: Option<Vector2>,
        dpr: f32,
        hit: impl Fn(Vector2) -> bool,
        host: &mut dyn CompanionHost,
        now: f32,
    ) {
        let ratio = if dpr > 0.0 { dpr } else { 1.0 };
        self.pointer = device_pointer.map(|p| Vector2 {
            x: p.x / ratio,
            y: p.y / ratio,
        });

        let overlapping = self.pointer.is_some_and(&hit);
        if overlapping {
            self.release_due_at = None;
            if self.passthrough {
                self.request(host, false);
            }
        } else if !self.passthrough && self.release_due_at.is_none() {
            self.release_due_at = Some(now + RELEASE_DELAY);
        }
    }

    /// Perform a due release. Runs every frame.
    pub fn apply_pending_release(&mut self, host: &mut dyn CompanionHost, now: f32) {
        match self.release_due_at {
            Some(due) if due <= now => {
                self.release_due_at = None;
                if !self.passthrough {
                    self.request(host, true);
                }
            }
            _ => {}
        }
    }

    fn request(&mut self, host: &mut dyn CompanionHost, enabled: bool) {
        match host.set_pointer_passthrough(enabled) {
            Ok(()) => {
                debug!("Pointer passthrough {}", if enabled { "on" } else { "off" });
                self.passthrough = enabled;
            }
            Err(e) => warn!("Failed to set pointer passthrough to {}: {}", enabled, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockHost {
        calls: Vec<bool>,
        fail: bool,
    }

    impl CompanionHost for MockHost {
        fn pointer_position(&self) -> Result<Option<Vector2>, String> {
            Ok(None)
        }
        fn set_pointer_passthrough(&mut self, enabled: bool) -> Result<(), String> {
            self.calls.push(enabled);
            if self.fail {
                Err("window gone".to_string())
            } else {
                Ok(())
            }
        }
        fn device_pixel_ratio(&self) -> f32 {
            1.0
        }
    }

    fn over_left_half(p: Vector2) -> bool {
        p.x < 100.0
    }

    fn at(x: f32) -> Option<Vector2> {
        Some(Vector2 { x, y: 0.0 })
    }

    #[test]
    fn captures_immediately_and_releases_after_delay() {
        let mut host = MockHost::default();
        let mut svc = CursorPassthrough::new();
        svc.start(&mut host);
        assert!(svc.passthrough);

        svc.poll_cursor_overlap(at(50.0), 1.0, over_left_half, &mut host, 1.0);
        assert!(!svc.passthrough);
        assert_eq!(host.calls, vec![true, false]);

        svc.poll_cursor_overlap(at(150.0), 1.0, over_left_half, &mut host, 2.0);
        assert!(!svc.passthrough);
        assert_eq!(svc.release_due_at, Some(2.0 + RELEASE_DELAY));
        // a second miss does not stack another release
        svc.poll_cursor_overlap(at(150.0), 1.0, over_left_half, &mut host, 2.01);
        assert_eq!(svc.release_due_at, Some(2.0 + RELEASE_DELAY));

        svc.apply_pending_release(&mut host, 2.02);
        assert!(!svc.passthrough);
        svc.apply_pending_release(&mut host, 2.06);
        assert!(svc.passthrough);
        assert_eq!(host.calls, vec![true, false, true]);
    }

    #[test]
    fn overlap_cancels_pending_release() {
        let mut host = MockHost::default();
        let mut svc = CursorPassthrough::new();
        svc.start(&mut host);
        svc.poll_cursor_overlap(at(50.0), 1.0, over_left_half, &mut host, 1.0);
        svc.poll_cursor_overlap(None, 1.0, over_left_half, &mut host, 1.1);
        assert!(svc.release_due_at.is_some());
        svc.poll_cursor_overlap(at(10.0), 1.0, over_left_half, &mut host, 1.12);
        assert!(svc.release_due_at.is_none());
        svc.apply_pending_release(&mut host, 5.0);
        assert!(!svc.passthrough);
        assert_eq!(host.calls, vec![true, false]);
    }

    #[test]
    fn converts_device_pixels() {
        let mut host = MockHost::default();
        let mut svc = CursorPassthrough::new();
        svc.start(&mut host);
        // 180 device px at ratio 2 is 90 scene units: inside
        svc.poll_cursor_overlap(at(180.0), 2.0, over_left_half, &mut host, 0.0);
        assert_eq!(svc.pointer.map(|p| p.x), Some(90.0));
        assert!(!svc.passthrough);
    }

    #[test]
    fn screen_cursor_is_made_window_relative() {
        let one = Vector2 { x: 1.0, y: 1.0 };
        let p = screen_to_window_pointer(Vector2 { x: 2020.0, y: 30.0 }, Vector2 { x: 1920.0, y: 0.0 }, one);
        assert_eq!((p.x, p.y), (100.0, 30.0));

        // a window at logical (100, 50) on a 2x display starts at device (200, 100)
        let two = Vector2 { x: 2.0, y: 2.0 };
        let p = screen_to_window_pointer(Vector2 { x: 380.0, y: 120.0 }, Vector2 { x: 100.0, y: 50.0 }, two);
        assert_eq!((p.x, p.y), (180.0, 20.0));

        // and the capture logic sees it at scene x 90
        let mut host = MockHost::default();
        let mut svc = CursorPassthrough::new();
        svc.start(&mut host);
        svc.poll_cursor_overlap(Some(p), 2.0, over_left_half, &mut host, 0.0);
        assert!(!svc.passthrough);
    }

    #[test]
    fn host_failure_keeps_flag() {
        let mut host = MockHost {
            fail: true,
            ..MockHost::default()
        };
        let mut svc = CursorPassthrough::new();
        svc.start(&mut host);
        assert!(!svc.passthrough);
        svc.passthrough = true;
        svc.poll_cursor_overlap(at(50.0), 1.0, over_left_half, &mut host, 0.0);
        assert!(svc.passthrough);
    }
}
