use std::fmt;

use tracing::debug;

use crate::config::Config;
use crate::filter::{TopologyFilter, apply_filter};
use crate::geometry::{Point, ScreenRect, ViewWindow};
use crate::interaction::{InteractionController, Mode, PointerEvent, Response, TooltipUpdate, WheelEvent};
use crate::ir::{Device, DeviceId, Link};
use crate::layout::{LayoutResult, PositionTable, compute_layout};
use crate::render::{RenderTarget, TooltipOverlay, render_svg};
use crate::scene::{Scene, Tooltip, build_scene};

pub type ClickCallback = Box<dyn FnMut(&Device)>;

#[derive(Default)]
pub struct RenderOptions {
    pub on_click: Option<ClickCallback>,
    pub config: Config,
    /// On-screen box of the element; defaults to the configured render size.
    pub element: Option<ScreenRect>,
}

impl RenderOptions {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_on_click(mut self, callback: impl FnMut(&Device) + 'static) -> Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    pub fn with_element(mut self, element: ScreenRect) -> Self {
        self.element = Some(element);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTooltip {
    pub id: DeviceId,
    pub x: f32,
    pub y: f32,
}

/// Handle to one rendered topology: the device and link snapshot, the
/// engine-owned positions, the drawn scene and the interaction state.
pub struct TopologyView {
    container_id: String,
    devices: Vec<Device>,
    links: Vec<Link>,
    layout: LayoutResult,
    positions: PositionTable,
    scene: Scene,
    controller: InteractionController,
    filter: TopologyFilter,
    tooltip: Option<ActiveTooltip>,
    on_click: Option<ClickCallback>,
    config: Config,
    rebuilds: usize,
}

/// Lays out `devices`, draws the scene and returns the handle that later
/// interaction and filter calls act on.
pub fn render_topology(
    container_id: &str,
    devices: Vec<Device>,
    links: Vec<Link>,
    options: RenderOptions,
) -> TopologyView {
    let RenderOptions {
        on_click,
        config,
        element,
    } = options;
    let element =
        element.unwrap_or_else(|| ScreenRect::new(0.0, 0.0, config.render.width, config.render.height));
    let controller = InteractionController::new(config.view.clone(), element)
        .with_tooltip_offset(config.scene.tooltip_offset);
    let mut view = TopologyView {
        container_id: container_id.to_string(),
        devices,
        links,
        layout: LayoutResult::default(),
        positions: PositionTable::new(),
        scene: Scene::default(),
        controller,
        filter: TopologyFilter::default(),
        tooltip: None,
        on_click,
        config,
        rebuilds: 0,
    };
    view.relayout();
    view
}

/// Applies the filter to the last rendered view. Nothing rendered yet means
/// there is nothing to dim.
pub fn update_topology_filter(view: Option<&mut TopologyView>, type_filter: &str, query: &str) {
    match view {
        Some(view) => view.update_filter(TopologyFilter::from_selector(type_filter, query)),
        None => debug!("filter requested before any topology was rendered"),
    }
}

impl TopologyView {
    /// Runs the layout again from scratch, discarding dragged positions.
    pub fn relayout(&mut self) {
        self.layout = compute_layout(&self.devices, &self.links, &self.config.layout);
        self.positions = self.layout.positions.clone();
        self.rebuild();
    }

    /// Full scene rebuild from the current positions. The active filter is
    /// re-applied so a rebuild never resets opacity.
    pub fn rebuild(&mut self) {
        self.scene = build_scene(
            &self.devices,
            &self.links,
            &self.positions,
            &self.config.theme,
            &self.config.scene,
        );
        if !self.filter.is_empty() {
            apply_filter(&mut self.scene, &self.devices, &self.filter, &self.config.filter);
        }
        self.rebuilds += 1;
    }

    pub fn update_filter(&mut self, filter: TopologyFilter) {
        apply_filter(&mut self.scene, &self.devices, &filter, &self.config.filter);
        self.filter = filter;
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) -> Response {
        let response = self.controller.on_pointer_down(event, &self.positions);
        self.dispatch(response)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Response {
        let response = self.controller.on_pointer_move(x, y, &mut self.positions);
        self.dispatch(response)
    }

    pub fn pointer_up(&mut self) -> Response {
        let response = self.controller.on_pointer_up();
        self.dispatch(response)
    }

    pub fn wheel(&mut self, event: &WheelEvent) -> Response {
        let response = self.controller.on_wheel(event);
        self.dispatch(response)
    }

    pub fn pointer_enter(&mut self, id: &DeviceId, x: f32, y: f32) -> Response {
        let response = self.controller.on_pointer_enter(id, x, y);
        self.dispatch(response)
    }

    pub fn pointer_leave(&mut self) -> Response {
        let response = self.controller.on_pointer_leave();
        self.dispatch(response)
    }

    pub fn click(&mut self, id: &DeviceId) -> Response {
        let response = self.controller.on_click(id);
        self.dispatch(response)
    }

    /// Pointer capture lost or window blurred.
    pub fn cancel(&mut self) -> Response {
        let response = self.controller.on_cancel();
        self.dispatch(response)
    }

    pub fn set_element(&mut self, element: ScreenRect) {
        self.controller.set_element(element);
    }

    pub fn reset_view(&mut self) -> Response {
        self.controller.reset_view()
    }

    fn dispatch(&mut self, response: Response) -> Response {
        if response.rebuild_scene {
            self.rebuild();
        }
        match &response.tooltip {
            Some(TooltipUpdate::Show { id, x, y }) => {
                self.tooltip = Some(ActiveTooltip {
                    id: id.clone(),
                    x: *x,
                    y: *y,
                });
            }
            Some(TooltipUpdate::Move { x, y }) => {
                if let Some(tooltip) = self.tooltip.as_mut() {
                    tooltip.x = *x;
                    tooltip.y = *y;
                }
            }
            Some(TooltipUpdate::Hide) => self.tooltip = None,
            None => {}
        }
        if let Some(id) = &response.clicked {
            let device = self.devices.iter().rev().find(|d| &d.id == id);
            match (self.on_click.as_mut(), device) {
                (Some(callback), Some(device)) => callback(device),
                (_, None) => debug!(%id, "click on unknown device"),
                (None, Some(_)) => {}
            }
        }
        response
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn positions(&self) -> &PositionTable {
        &self.positions
    }

    pub fn position(&self, id: &DeviceId) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn filter(&self) -> &TopologyFilter {
        &self.filter
    }

    pub fn view_window(&self) -> ViewWindow {
        self.controller.view()
    }

    pub fn mode(&self) -> &Mode {
        self.controller.mode()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Visible tooltip content and its element-relative anchor.
    pub fn tooltip(&self) -> Option<(&Tooltip, f32, f32)> {
        let active = self.tooltip.as_ref()?;
        let node = self.scene.node(&active.id)?;
        Some((&node.tooltip, active.x, active.y))
    }

    pub fn to_svg(&self) -> String {
        let target = RenderTarget {
            container_id: &self.container_id,
            view: self.view_window(),
            element: self.controller.element(),
            tooltip: self
                .tooltip()
                .map(|(tooltip, x, y)| TooltipOverlay { tooltip, x, y }),
        };
        render_svg(&self.scene, &target, &self.config.theme)
    }
}

impl fmt::Debug for TopologyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyView")
            .field("container_id", &self.container_id)
            .field("devices", &self.devices.len())
            .field("links", &self.links.len())
            .field("mode", self.controller.mode())
            .field("view", &self.controller.view())
            .field("filter", &self.filter)
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}
