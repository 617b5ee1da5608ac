//! Pointer-driven interaction state machine.
//!
//! The controller is in exactly one of three modes: idle, dragging a node, or
//! panning the view. Hosts feed it pointer and wheel events in arrival order
//! and act on the returned [`Response`]: rebuild the scene after a drag move,
//! re-apply the view box after pan and zoom, show or hide the tooltip.
//!
//! Zoom works in every mode. Sessions end on pointer-up, or on
//! [`InteractionController::on_cancel`] when the host loses pointer capture
//! or the window loses focus.

use serde::Deserialize;
use tracing::{trace, warn};

use crate::config::ViewConfig;
use crate::geometry::{Point, ScreenRect, ViewTransform, ViewWindow};
use crate::ir::DeviceId;
use crate::layout::PositionTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl PointerButton {
    /// DOM `MouseEvent.button` numbering.
    pub fn from_index(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Node(DeviceId),
    Background,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    pub target: PointerTarget,
}

impl PointerEvent {
    pub fn on_node(x: f32, y: f32, id: impl Into<DeviceId>) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
            target: PointerTarget::Node(id.into()),
        }
    }

    pub fn on_background(x: f32, y: f32, button: PointerButton) -> Self {
        Self {
            x,
            y,
            button,
            target: PointerTarget::Background,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub x: f32,
    pub y: f32,
    pub delta_y: f32,
}

/// Dragged device and the pointer-to-node offset captured at drag start.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub id: DeviceId,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    pub start_screen_x: f32,
    pub start_screen_y: f32,
    pub start_view_x: f32,
    pub start_view_y: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Dragging(DragSession),
    Panning(PanSession),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipUpdate {
    /// Show the tooltip for `id` at `(x, y)` relative to the element.
    Show { id: DeviceId, x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Hide,
}

/// What the host has to do after an event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    pub rebuild_scene: bool,
    pub view_changed: bool,
    pub suppress_context_menu: bool,
    pub capture_pointer: bool,
    pub release_pointer: bool,
    pub tooltip: Option<TooltipUpdate>,
    pub clicked: Option<DeviceId>,
}

impl Response {
    pub fn is_noop(&self) -> bool {
        *self == Response::default()
    }
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    mode: Mode,
    view: ViewWindow,
    element: ScreenRect,
    config: ViewConfig,
    hovered: Option<DeviceId>,
    tooltip_offset: f32,
}

impl InteractionController {
    pub fn new(config: ViewConfig, element: ScreenRect) -> Self {
        Self {
            mode: Mode::Idle,
            view: ViewWindow::initial(&config),
            element,
            config,
            hovered: None,
            tooltip_offset: 12.0,
        }
    }

    pub fn with_tooltip_offset(mut self, offset: f32) -> Self {
        self.tooltip_offset = offset;
        self
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.mode, Mode::Idle)
    }

    pub fn view(&self) -> ViewWindow {
        self.view
    }

    pub fn element(&self) -> ScreenRect {
        self.element
    }

    pub fn hovered(&self) -> Option<&DeviceId> {
        self.hovered.as_ref()
    }

    /// Element moved or resized on screen.
    pub fn set_element(&mut self, element: ScreenRect) {
        self.element = element;
    }

    pub fn reset_view(&mut self) -> Response {
        self.view = ViewWindow::initial(&self.config);
        Response {
            view_changed: true,
            ..Response::default()
        }
    }

    fn to_diagram(&self, x: f32, y: f32) -> Point {
        ViewTransform::new(&self.view, &self.element).screen_to_diagram(x, y)
    }

    pub fn on_pointer_down(&mut self, event: &PointerEvent, positions: &PositionTable) -> Response {
        if !self.is_idle() {
            trace!(button = ?event.button, "pointer down ignored, session active");
            return Response::default();
        }
        match (&event.target, event.button) {
            (_, PointerButton::Secondary) => {
                let session = PanSession {
                    start_screen_x: event.x,
                    start_screen_y: event.y,
                    start_view_x: self.view.x,
                    start_view_y: self.view.y,
                };
                trace!(x = event.x, y = event.y, "idle -> panning");
                self.mode = Mode::Panning(session);
                Response {
                    suppress_context_menu: true,
                    capture_pointer: true,
                    ..Response::default()
                }
            }
            (PointerTarget::Node(id), PointerButton::Primary) => {
                let Some(position) = positions.get(id) else {
                    trace!(%id, "pointer down on unknown node");
                    return Response::default();
                };
                let pointer = self.to_diagram(event.x, event.y);
                trace!(%id, "idle -> dragging");
                self.mode = Mode::Dragging(DragSession {
                    id: id.clone(),
                    dx: position.x - pointer.x,
                    dy: position.y - pointer.y,
                });
                Response {
                    capture_pointer: true,
                    ..Response::default()
                }
            }
            _ => Response::default(),
        }
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32, positions: &mut PositionTable) -> Response {
        let mut response = Response::default();
        if self.hovered.is_some() {
            response.tooltip = Some(self.tooltip_move(x, y));
        }
        match &self.mode {
            Mode::Idle => {}
            Mode::Dragging(session) => {
                let pointer = self.to_diagram(x, y);
                match positions.get_mut(&session.id) {
                    Some(position) => {
                        position.x = pointer.x + session.dx;
                        position.y = pointer.y + session.dy;
                        response.rebuild_scene = true;
                    }
                    None => {
                        warn!(id = %session.id, "dragged device vanished, ending drag");
                        self.mode = Mode::Idle;
                    }
                }
            }
            Mode::Panning(session) => {
                let ratio_x = axis_ratio(self.view.w, self.element.width);
                let ratio_y = axis_ratio(self.view.h, self.element.height);
                let dx = (x - session.start_screen_x) * ratio_x;
                let dy = (y - session.start_screen_y) * ratio_y;
                self.view.x = session.start_view_x - dx;
                self.view.y = session.start_view_y - dy;
                response.view_changed = true;
            }
        }
        response
    }

    /// Ends any session; pointer-up is delivered globally.
    pub fn on_pointer_up(&mut self) -> Response {
        let had_session = !self.is_idle();
        if had_session {
            trace!("session ended by pointer up");
        }
        self.mode = Mode::Idle;
        Response {
            release_pointer: had_session,
            ..Response::default()
        }
    }

    /// Lost pointer capture or window blur: drop the session where it stands.
    pub fn on_cancel(&mut self) -> Response {
        let had_session = !self.is_idle();
        if had_session {
            warn!("interaction session cancelled without pointer up");
        }
        self.mode = Mode::Idle;
        let tooltip = self.hovered.take().map(|_| TooltipUpdate::Hide);
        Response {
            release_pointer: had_session,
            tooltip,
            ..Response::default()
        }
    }

    pub fn on_wheel(&mut self, event: &WheelEvent) -> Response {
        let scale = if event.delta_y > 0.0 {
            self.config.zoom_out_factor
        } else {
            self.config.zoom_in_factor
        };
        let (fx, fy) = self.element.fraction(event.x, event.y);
        self.view.zoom_about(fx, fy, scale, &self.config);
        trace!(w = self.view.w, h = self.view.h, "zoomed");
        Response {
            view_changed: true,
            ..Response::default()
        }
    }

    pub fn on_pointer_enter(&mut self, id: &DeviceId, x: f32, y: f32) -> Response {
        self.hovered = Some(id.clone());
        let (tx, ty) = self.tooltip_anchor(x, y);
        Response {
            tooltip: Some(TooltipUpdate::Show {
                id: id.clone(),
                x: tx,
                y: ty,
            }),
            ..Response::default()
        }
    }

    pub fn on_pointer_leave(&mut self) -> Response {
        self.hovered = None;
        Response {
            tooltip: Some(TooltipUpdate::Hide),
            ..Response::default()
        }
    }

    pub fn on_click(&mut self, id: &DeviceId) -> Response {
        Response {
            clicked: Some(id.clone()),
            ..Response::default()
        }
    }

    fn tooltip_anchor(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x - self.element.left + self.tooltip_offset,
            y - self.element.top + self.tooltip_offset,
        )
    }

    fn tooltip_move(&self, x: f32, y: f32) -> TooltipUpdate {
        let (x, y) = self.tooltip_anchor(x, y);
        TooltipUpdate::Move { x, y }
    }
}

fn axis_ratio(view_extent: f32, element_extent: f32) -> f32 {
    if element_extent > 0.0 {
        view_extent / element_extent
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InteractionController {
        InteractionController::new(ViewConfig::default(), ScreenRect::new(0.0, 0.0, 1600.0, 900.0))
    }

    fn positions() -> PositionTable {
        let mut table = PositionTable::new();
        table.insert(DeviceId::from(1), Point::new(800.0, 120.0));
        table.insert(DeviceId::from(2), Point::new(400.0, 320.0));
        table
    }

    #[test]
    fn drag_keeps_the_grab_offset() {
        let mut ctrl = controller();
        let mut table = positions();
        let down = PointerEvent::on_node(810.0, 125.0, 1);
        assert!(!ctrl.on_pointer_down(&down, &table).rebuild_scene);
        assert_eq!(
            ctrl.mode(),
            &Mode::Dragging(DragSession {
                id: DeviceId::from(1),
                dx: -10.0,
                dy: -5.0
            })
        );
        let response = ctrl.on_pointer_move(910.0, 225.0, &mut table);
        assert!(response.rebuild_scene);
        assert!(!response.view_changed);
        assert_eq!(table[&DeviceId::from(1)], Point::new(900.0, 220.0));
        assert_eq!(table[&DeviceId::from(2)], Point::new(400.0, 320.0));
        ctrl.on_pointer_up();
        assert!(ctrl.is_idle());
        assert!(!ctrl.on_pointer_move(0.0, 0.0, &mut table).rebuild_scene);
        assert_eq!(table[&DeviceId::from(1)], Point::new(900.0, 220.0));
    }

    #[test]
    fn drag_accounts_for_zoomed_view() {
        let mut ctrl = controller();
        let mut table = positions();
        // Zoom in around the top-left corner: view becomes 1472 x 828.
        ctrl.on_wheel(&WheelEvent {
            x: 0.0,
            y: 0.0,
            delta_y: -1.0,
        });
        let scale = 1600.0 / 1472.0;
        let (sx, sy) = (800.0 * scale, 120.0 * scale);
        ctrl.on_pointer_down(&PointerEvent::on_node(sx, sy, 1), &table);
        ctrl.on_pointer_move(sx + 100.0 * scale, sy, &mut table);
        let moved = table[&DeviceId::from(1)];
        assert!((moved.x - 900.0).abs() < 1e-2, "x = {}", moved.x);
        assert!((moved.y - 120.0).abs() < 1e-2, "y = {}", moved.y);
    }

    #[test]
    fn drag_captures_and_releases_the_pointer() {
        let mut ctrl = controller();
        let table = positions();
        let response = ctrl.on_pointer_down(&PointerEvent::on_node(800.0, 120.0, 1), &table);
        assert!(response.capture_pointer);
        assert!(!response.suppress_context_menu);
        assert!(ctrl.on_pointer_up().release_pointer);
        assert!(!ctrl.on_pointer_up().release_pointer);
        ctrl.on_pointer_down(&PointerEvent::on_node(800.0, 120.0, 1), &table);
        assert!(ctrl.on_cancel().release_pointer);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn right_button_pans_without_rebuilding() {
        let mut ctrl =
            InteractionController::new(ViewConfig::default(), ScreenRect::new(0.0, 0.0, 800.0, 450.0));
        let mut table = positions();
        let down = PointerEvent::on_background(100.0, 100.0, PointerButton::Secondary);
        let response = ctrl.on_pointer_down(&down, &table);
        assert!(response.suppress_context_menu);
        assert!(response.capture_pointer);
        let response = ctrl.on_pointer_move(150.0, 80.0, &mut table);
        assert!(response.view_changed);
        assert!(!response.rebuild_scene);
        // Element is half the view size: one screen pixel is two diagram units.
        assert_eq!(ctrl.view(), ViewWindow::new(-100.0, 40.0, 1600.0, 900.0));
        assert_eq!(table, positions());
        let response = ctrl.on_pointer_up();
        assert!(response.release_pointer);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn sessions_do_not_overlap() {
        let mut ctrl = controller();
        let table = positions();
        ctrl.on_pointer_down(&PointerEvent::on_node(800.0, 120.0, 1), &table);
        let pan = PointerEvent::on_background(0.0, 0.0, PointerButton::Secondary);
        assert!(ctrl.on_pointer_down(&pan, &table).is_noop());
        assert!(matches!(ctrl.mode(), Mode::Dragging(_)));
        ctrl.on_pointer_up();
        ctrl.on_pointer_down(&pan, &table);
        assert!(ctrl.on_pointer_down(&PointerEvent::on_node(400.0, 320.0, 2), &table).is_noop());
        assert!(matches!(ctrl.mode(), Mode::Panning(_)));
    }

    #[test]
    fn primary_on_background_and_unknown_nodes_stay_idle() {
        let mut ctrl = controller();
        let table = positions();
        ctrl.on_pointer_down(&PointerEvent::on_background(5.0, 5.0, PointerButton::Primary), &table);
        assert!(ctrl.is_idle());
        ctrl.on_pointer_down(&PointerEvent::on_node(5.0, 5.0, 99), &table);
        assert!(ctrl.is_idle());
        let middle = PointerEvent {
            button: PointerButton::Other,
            ..PointerEvent::on_node(800.0, 120.0, 1)
        };
        ctrl.on_pointer_down(&middle, &table);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn zoom_out_converges_at_the_maximum() {
        let mut ctrl = controller();
        let wheel = WheelEvent {
            x: 800.0,
            y: 450.0,
            delta_y: 120.0,
        };
        let mut last = ctrl.view().w;
        for _ in 0..100 {
            ctrl.on_wheel(&wheel);
            let view = ctrl.view();
            assert!(view.w <= 4000.0 && view.w >= last);
            assert!(view.h <= 2250.0);
            last = view.w;
        }
        assert_eq!(ctrl.view().w, 4000.0);
        assert_eq!(ctrl.view().h, 2250.0);
    }

    #[test]
    fn zoom_in_converges_at_the_minimum() {
        let mut ctrl = controller();
        let wheel = WheelEvent {
            x: 100.0,
            y: 700.0,
            delta_y: -120.0,
        };
        for _ in 0..100 {
            ctrl.on_wheel(&wheel);
            assert!(ctrl.view().w >= 400.0);
            assert!(ctrl.view().h >= 225.0);
        }
        assert_eq!(ctrl.view().w, 400.0);
        assert_eq!(ctrl.view().h, 225.0);
    }

    #[test]
    fn zoom_works_mid_drag() {
        let mut ctrl = controller();
        let table = positions();
        ctrl.on_pointer_down(&PointerEvent::on_node(800.0, 120.0, 1), &table);
        let response = ctrl.on_wheel(&WheelEvent {
            x: 800.0,
            y: 450.0,
            delta_y: 1.0,
        });
        assert!(response.view_changed);
        assert!(matches!(ctrl.mode(), Mode::Dragging(_)));
    }

    #[test]
    fn cancel_ends_sessions_and_hides_tooltip() {
        let mut ctrl = controller();
        let table = positions();
        ctrl.on_pointer_enter(&DeviceId::from(1), 800.0, 120.0);
        ctrl.on_pointer_down(&PointerEvent::on_node(800.0, 120.0, 1), &table);
        let response = ctrl.on_cancel();
        assert!(ctrl.is_idle());
        assert_eq!(response.tooltip, Some(TooltipUpdate::Hide));
        assert!(ctrl.hovered().is_none());
    }

    #[test]
    fn hover_reports_tooltip_relative_to_element() {
        let mut ctrl =
            InteractionController::new(ViewConfig::default(), ScreenRect::new(50.0, 20.0, 800.0, 450.0));
        let response = ctrl.on_pointer_enter(&DeviceId::from(2), 150.0, 120.0);
        assert_eq!(
            response.tooltip,
            Some(TooltipUpdate::Show {
                id: DeviceId::from(2),
                x: 112.0,
                y: 112.0
            })
        );
        let mut table = positions();
        let response = ctrl.on_pointer_move(160.0, 130.0, &mut table);
        assert_eq!(response.tooltip, Some(TooltipUpdate::Move { x: 122.0, y: 122.0 }));
        assert_eq!(ctrl.on_pointer_leave().tooltip, Some(TooltipUpdate::Hide));
    }

    #[test]
    fn click_reports_the_node() {
        let mut ctrl = controller();
        assert_eq!(ctrl.on_click(&DeviceId::from(2)).clicked, Some(DeviceId::from(2)));
    }
}
