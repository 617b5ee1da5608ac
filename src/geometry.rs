//! Diagram-space geometry: points, the visible view window and the mapping
//! between screen pixels and diagram coordinates.
//!
//! The rendered element behaves like an SVG root with
//! `preserveAspectRatio="xMidYMid meet"`: the view window is scaled
//! uniformly to fit the element and centred on the slack axis.

use serde::Serialize;

use crate::config::ViewConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// On-screen bounding box of the rendered element, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Pointer position as a fraction of the element size, `(0,0)` top-left.
    pub fn fraction(&self, x: f32, y: f32) -> (f32, f32) {
        let fx = if self.width > 0.0 { (x - self.left) / self.width } else { 0.5 };
        let fy = if self.height > 0.0 { (y - self.top) / self.height } else { 0.5 };
        (fx, fy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewWindow {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ViewWindow {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn initial(config: &ViewConfig) -> Self {
        Self::new(0.0, 0.0, config.initial_width, config.initial_height)
    }

    /// Rescales the window by `scale`, keeping the diagram point under the
    /// pointer fraction `(fx, fy)` fixed. Each axis is clamped on its own.
    pub fn zoom_about(&mut self, fx: f32, fy: f32, scale: f32, bounds: &ViewConfig) {
        let new_w = (self.w * scale).clamp(bounds.min_width, bounds.max_width);
        let new_h = (self.h * scale).clamp(bounds.min_height, bounds.max_height);
        self.x += (self.w - new_w) * fx;
        self.y += (self.h - new_h) * fy;
        self.w = new_w;
        self.h = new_h;
    }

    pub fn viewbox_attr(&self) -> String {
        format!("{:.2} {:.2} {:.2} {:.2}", self.x, self.y, self.w, self.h)
    }
}

/// Screen transform of the element for one view window. Rebuilt per event,
/// since pan and zoom keep changing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    view_x: f32,
    view_y: f32,
}

impl ViewTransform {
    pub fn new(view: &ViewWindow, rect: &ScreenRect) -> Self {
        let scale = if view.w > 0.0 && view.h > 0.0 {
            (rect.width / view.w).min(rect.height / view.h)
        } else {
            0.0
        };
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self {
            scale,
            offset_x: rect.left + (rect.width - view.w * scale) / 2.0,
            offset_y: rect.top + (rect.height - view.h * scale) / 2.0,
            view_x: view.x,
            view_y: view.y,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn diagram_to_screen(&self, point: Point) -> Point {
        Point::new(
            self.offset_x + (point.x - self.view_x) * self.scale,
            self.offset_y + (point.y - self.view_y) * self.scale,
        )
    }

    pub fn screen_to_diagram(&self, x: f32, y: f32) -> Point {
        Point::new(
            (x - self.offset_x) / self.scale + self.view_x,
            (y - self.offset_y) / self.scale + self.view_y,
        )
    }
}

/// Convenience wrapper: screen point to diagram point for the given state.
pub fn screen_to_diagram(view: &ViewWindow, rect: &ScreenRect, x: f32, y: f32) -> Point {
    ViewTransform::new(view, rect).screen_to_diagram(x, y)
}
