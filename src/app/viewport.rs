use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use tracing::{debug, info};

pub(in crate::app) const AUTO_FIT_DELAY_SECS: f64 = 1.2;
const FIT_MARGIN: f32 = 0.9;
const FIT_SCALE_RANGE: (f32, f32) = (0.6, 1.4);
const ZOOM_RANGE: (f32, f32) = (0.4, 3.0);
const ZOOM_STEP: f32 = 1.1;

/// `screen = world * scale + translate`, in canvas-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Transform {
    pub(in crate::app) scale: f32,
    pub(in crate::app) translate: Vec2,
}

impl Transform {
    pub(in crate::app) const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    pub(in crate::app) fn world_to_screen(self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translate).to_pos2()
    }

    pub(in crate::app) fn screen_to_world(self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.scale
    }
}

pub(in crate::app) struct ViewportController {
    transform: Transform,
    size: Vec2,
    user_adjusted: bool,
    fit_due_at: Option<f64>,
}

impl ViewportController {
    pub(in crate::app) fn new(size: Vec2) -> Self {
        Self {
            transform: Transform::IDENTITY,
            size,
            user_adjusted: false,
            fit_due_at: None,
        }
    }

    pub(in crate::app) fn transform(&self) -> Transform {
        self.transform
    }

    /// Midpoint of the viewport at identity transform.
    pub(in crate::app) fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub(in crate::app) fn user_adjusted(&self) -> bool {
        self.user_adjusted
    }

    pub(in crate::app) fn fit_due_at(&self) -> Option<f64> {
        self.fit_due_at
    }

    pub(in crate::app) fn arm_auto_fit(&mut self, now: f64) {
        self.fit_due_at = Some(now + AUTO_FIT_DELAY_SECS);
    }

    pub(in crate::app) fn disarm_auto_fit(&mut self) {
        self.fit_due_at = None;
    }

    /// Runs the pending auto-fit once its settle delay has passed. Returns
    /// whether the transform changed.
    pub(in crate::app) fn poll_auto_fit(&mut self, now: f64, positions: &[Vec2]) -> bool {
        let Some(due_at) = self.fit_due_at else {
            return false;
        };
        if now < due_at {
            return false;
        }

        self.fit_due_at = None;
        if self.user_adjusted {
            debug!("auto-fit skipped after manual pan/zoom");
            return false;
        }

        let fitted = self.fit_to(positions);
        if fitted {
            info!(scale = self.transform.scale, "auto-fit applied");
        }
        fitted
    }

    /// Centers and scales the view onto the bounding box of all finite
    /// positions.
    pub(in crate::app) fn fit_to(&mut self, positions: &[Vec2]) -> bool {
        let Some(bounds) = finite_bounds(positions) else {
            return false;
        };

        let width = bounds.width().max(1.0);
        let height = bounds.height().max(1.0);
        let scale = (FIT_MARGIN * (self.size.x / width).min(self.size.y / height))
            .clamp(FIT_SCALE_RANGE.0, FIT_SCALE_RANGE.1);

        self.transform = Transform {
            scale,
            translate: self.center() - bounds.center().to_vec2() * scale,
        };
        true
    }

    /// One wheel notch, keeping the world point under `anchor` in place.
    pub(in crate::app) fn zoom_at(&mut self, anchor: Pos2, zoom_in: bool) {
        let world_before = self.transform.screen_to_world(anchor);
        let factor = if zoom_in { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        let scale = (self.transform.scale * factor).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);

        self.transform = Transform {
            scale,
            translate: anchor.to_vec2() - world_before * scale,
        };
        self.user_adjusted = true;
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.transform.translate += delta;
        self.user_adjusted = true;
    }

    /// Resets the transform for a new canvas size and re-arms auto-fit.
    pub(in crate::app) fn resize(&mut self, size: Vec2, now: f64) {
        info!(width = size.x, height = size.y, "viewport resized");
        self.size = size;
        self.transform = Transform::IDENTITY;
        self.user_adjusted = false;
        self.arm_auto_fit(now);
    }

    /// World-space rectangle currently visible, shrunk by `padding` pixels on
    /// every side.
    pub(in crate::app) fn padded_world_bounds(&self, padding: f32) -> Rect {
        let min = self.transform.screen_to_world(pos2(padding, padding));
        let max = self
            .transform
            .screen_to_world(pos2(self.size.x - padding, self.size.y - padding));
        Rect::from_min_max(min.to_pos2(), max.to_pos2())
    }
}

fn finite_bounds(positions: &[Vec2]) -> Option<Rect> {
    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
    let mut any = false;

    for position in positions.iter().filter(|position| position.is_finite()) {
        min = min.min(*position);
        max = max.max(*position);
        any = true;
    }

    any.then(|| Rect::from_min_max(min.to_pos2(), max.to_pos2()))
}
