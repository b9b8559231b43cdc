use serde::{Deserialize, Serialize};

/// Zoom is clamped to keep the transform invertible.
const MIN_ZOOM: f32 = 1e-3;
const MAX_ZOOM: f32 = 1e6;

/// Per-held-key pan distance, in world units scaled by zoom.
const KEY_PAN_STEP: f32 = 2.0;
/// Screen-pixel distance one wheel tick pans.
const WHEEL_PAN_STEP: f32 = 50.0;
/// Multiplier applied per discrete zoom-key tick.
const KEY_ZOOM_FACTOR: f32 = 0.99;

pub const DEFAULT_ZOOM: f32 = 200.0;

/// The current view of the world plane: pan target, zoom and window
/// size. All operations are pure state math; nothing here touches the
/// GPU or the UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    /// World-space pan target X.
    pub position_x: f32,
    /// World-space pan target Y.
    pub position_y: f32,
    /// Pixels per world unit; always positive.
    pub zoom: f32,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
}

impl Viewport {
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            position_x: 0.0,
            position_y: 0.0,
            zoom: DEFAULT_ZOOM,
            window_width,
            window_height,
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Convert a screen point to world coordinates. Screen Y grows
    /// downward, world Y grows upward.
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        let world_x = (screen_x - self.window_width as f32 / 2.0) / self.zoom + self.position_x;
        let world_y = -(screen_y - self.window_height as f32 / 2.0) / self.zoom + self.position_y;
        (world_x, world_y)
    }

    /// Directional pan from held keys: `dx`/`dy` are -1, 0 or +1 per
    /// axis in world direction.
    pub fn pan_step(&mut self, dx: f32, dy: f32) {
        self.position_x += dx * KEY_PAN_STEP / self.zoom;
        self.position_y += dy * KEY_PAN_STEP / self.zoom;
    }

    /// Pan from wheel ticks. The vertical wheel axis moves Y, or X
    /// instead when `horizontal` is set; the horizontal wheel axis
    /// always moves X.
    pub fn wheel_pan(&mut self, offset_x: f32, offset_y: f32, horizontal: bool) {
        if horizontal {
            self.position_x += offset_y / self.zoom * WHEEL_PAN_STEP;
        } else {
            self.position_y += offset_y / self.zoom * WHEEL_PAN_STEP;
        }
        self.position_x += offset_x / self.zoom * WHEEL_PAN_STEP;
    }

    /// Discrete zoom from a held key.
    pub fn zoom_step(&mut self, out: bool) {
        if out {
            self.zoom *= KEY_ZOOM_FACTOR;
        } else {
            self.zoom *= 1.0 / KEY_ZOOM_FACTOR;
        }
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Wheel zoom anchored at the cursor: the world point under
    /// `(cursor_x, cursor_y)` before the zoom is under it afterwards
    /// too.
    pub fn zoom_at(&mut self, cursor_x: f32, cursor_y: f32, offset_y: f32) {
        let (before_x, before_y) = self.screen_to_world(cursor_x, cursor_y);

        self.zoom *= 2.0f32.powf(offset_y / 3.0);
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        let (after_x, after_y) = self.screen_to_world(cursor_x, cursor_y);
        self.position_x += before_x - after_x;
        self.position_y += before_y - after_y;
    }

    /// Absolute jump; no transform involved.
    pub fn teleport(&mut self, x: f32, y: f32) {
        self.position_x = x;
        self.position_y = y;
    }

    pub fn center(&mut self) {
        self.teleport(0.0, 0.0);
    }

    pub fn normalize_zoom(&mut self) {
        self.zoom = DEFAULT_ZOOM;
    }

    /// Major grid spacing in world units. Recomputed from zoom and
    /// window size every call; never cached.
    pub fn subline_period(&self) -> f32 {
        let extent = self.window_width.max(self.window_height) as f32 / self.zoom;
        10.0f32.powf(extent.log10().round())
    }

    /// Minor grid spacing: one tenth of the major spacing.
    pub fn microline_period(&self) -> f32 {
        self.subline_period() / 10.0
    }

    /// Snapshot the uniform values a draw call needs.
    pub fn frame_uniforms(&self, time: f32) -> FrameUniforms {
        FrameUniforms {
            window_size: [self.window_width as f32, self.window_height as f32],
            position: [self.position_x, self.position_y],
            zoom: self.zoom,
            subline_period: self.subline_period(),
            microline_period: self.microline_period(),
            time,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 800)
    }
}

/// The values bound to the composed program's uniforms for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub window_size: [f32; 2],
    pub position: [f32; 2],
    pub zoom: f32,
    pub subline_period: f32,
    pub microline_period: f32,
    pub time: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_world_center() {
        let vp = Viewport::new(800, 800);
        let (x, y) = vp.screen_to_world(400.0, 400.0);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_screen_to_world_inverts_y() {
        let mut vp = Viewport::new(800, 600);
        vp.teleport(3.0, -1.5);
        let (x, y) = vp.screen_to_world(500.0, 100.0);
        assert!((x - (100.0 / vp.zoom + 3.0)).abs() < 1e-5);
        // Screen point above the center maps to a world point above the
        // pan target.
        assert!((y - (200.0 / vp.zoom - 1.5)).abs() < 1e-5);
    }

    #[test]
    fn test_pan_step_scales_with_zoom() {
        let mut vp = Viewport::new(800, 800);
        vp.pan_step(1.0, -1.0);
        assert!((vp.position_x - 2.0 / 200.0).abs() < 1e-6);
        assert!((vp.position_y + 2.0 / 200.0).abs() < 1e-6);

        vp.zoom = 400.0;
        let before = vp.position_x;
        vp.pan_step(1.0, 0.0);
        assert!((vp.position_x - before - 2.0 / 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_pan_axis_selection() {
        let mut vp = Viewport::new(800, 800);
        vp.wheel_pan(0.0, 1.0, false);
        assert_eq!(vp.position_x, 0.0);
        assert!((vp.position_y - 50.0 / 200.0).abs() < 1e-6);

        let mut vp = Viewport::new(800, 800);
        vp.wheel_pan(0.0, 1.0, true);
        assert!((vp.position_x - 50.0 / 200.0).abs() < 1e-6);
        assert_eq!(vp.position_y, 0.0);

        // The horizontal wheel axis always moves X.
        let mut vp = Viewport::new(800, 800);
        vp.wheel_pan(-2.0, 0.0, false);
        assert!((vp.position_x + 100.0 / 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_step_direction() {
        let mut vp = Viewport::new(800, 800);
        vp.zoom_step(true);
        assert!((vp.zoom - 200.0 * 0.99).abs() < 1e-3);
        vp.zoom_step(false);
        assert!((vp.zoom - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_stays_positive() {
        let mut vp = Viewport::new(800, 800);
        for _ in 0..10_000 {
            vp.zoom_step(true);
        }
        assert!(vp.zoom >= MIN_ZOOM);
        vp.zoom_at(0.0, 0.0, -10_000.0);
        assert!(vp.zoom >= MIN_ZOOM);
    }

    #[test]
    fn test_anchor_zoom_fixes_cursor_world_point() {
        let mut vp = Viewport::new(800, 800);
        vp.teleport(3.5, -2.25);

        let cursor = (123.0, 456.0);
        let before = vp.screen_to_world(cursor.0, cursor.1);
        vp.zoom_at(cursor.0, cursor.1, 1.0);
        let after = vp.screen_to_world(cursor.0, cursor.1);

        assert!((before.0 - after.0).abs() < 1e-4, "x drifted: {before:?} vs {after:?}");
        assert!((before.1 - after.1).abs() < 1e-4, "y drifted: {before:?} vs {after:?}");
        assert!(vp.zoom > 200.0);

        // And zooming back out through the same anchor.
        let before = vp.screen_to_world(cursor.0, cursor.1);
        vp.zoom_at(cursor.0, cursor.1, -3.0);
        let after = vp.screen_to_world(cursor.0, cursor.1);
        assert!((before.0 - after.0).abs() < 1e-4);
        assert!((before.1 - after.1).abs() < 1e-4);
    }

    #[test]
    fn test_grid_periods() {
        // 800 px window at zoom 200 spans 4 world units: the major grid
        // lands on 10^round(log10(4)) = 10.
        let vp = Viewport::new(800, 800);
        assert_eq!(vp.subline_period(), 10.0);
        assert_eq!(vp.microline_period(), 1.0);

        let mut vp = Viewport::new(800, 800);
        vp.zoom = 2.0;
        // 400 world units across: major grid at 100.
        assert_eq!(vp.subline_period(), 100.0);
        assert_eq!(vp.microline_period(), 10.0);
    }

    #[test]
    fn test_frame_uniforms_snapshot() {
        let mut vp = Viewport::new(800, 600);
        vp.teleport(1.0, 2.0);
        let u = vp.frame_uniforms(12.5);
        assert_eq!(u.window_size, [800.0, 600.0]);
        assert_eq!(u.position, [1.0, 2.0]);
        assert_eq!(u.zoom, vp.zoom);
        assert_eq!(u.subline_period, vp.subline_period());
        assert_eq!(u.microline_period, vp.microline_period());
        assert_eq!(u.time, 12.5);
    }
}
