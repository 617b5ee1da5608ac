use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::config::SceneConfig;
use crate::geometry::Point;
use crate::ir::{Device, DeviceId, DeviceKind, Link};
use crate::layout::PositionTable;
use crate::theme::Theme;

pub const FULL_OPACITY: f32 = 1.0;

const PLACEHOLDER: &str = "-";

/// Quadratic curve `M start Q control end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl QuadCurve {
    /// Curve bowed upwards by `bow` from the midpoint of the two ends.
    pub fn bowed(start: Point, end: Point, bow: f32) -> Self {
        let mid = start.midpoint(end);
        Self {
            start,
            control: Point::new(mid.x, mid.y - bow),
            end,
        }
    }

    pub fn path_data(&self) -> String {
        format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePrimitive {
    /// Index of the link in the input slice.
    pub link_index: usize,
    pub source: DeviceId,
    pub target: DeviceId,
    pub curve: QuadCurve,
    pub stroke: String,
    pub stroke_width: f32,
    pub dasharray: Option<String>,
    pub label: String,
    pub label_position: Point,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Tooltip {
    pub fn for_device(device: &Device) -> Self {
        let title = device
            .hostname
            .clone()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| device.display_name().to_string());
        let row = |label: &str, value: &Option<String>| {
            let value = value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(PLACEHOLDER);
            (label.to_string(), value.to_string())
        };
        Self {
            title,
            rows: vec![
                row("IP", &device.management_ip),
                row("Vendor", &device.vendor),
                row("Model", &device.model),
                row("Uptime", &device.uptime),
            ],
        }
    }
}

/// Interaction handlers attached to a node primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeHandlers {
    /// Pointer enter/leave shows and hides the tooltip.
    pub hover: bool,
    /// Pointer down starts a drag.
    pub press: bool,
    /// Click forwards the device to the click callback.
    pub click: bool,
}

impl NodeHandlers {
    pub const ALL: NodeHandlers = NodeHandlers {
        hover: true,
        press: true,
        click: true,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePrimitive {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub center: Point,
    pub radius: f32,
    pub fill: String,
    pub stroke: String,
    pub label: String,
    pub label_offset: f32,
    pub tooltip: Tooltip,
    pub handlers: NodeHandlers,
    pub opacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub edges: Vec<EdgePrimitive>,
    pub nodes: Vec<NodePrimitive>,
}

impl Scene {
    /// Last primitive drawn for `id` (duplicate ids resolve to the last one).
    pub fn node(&self, id: &DeviceId) -> Option<&NodePrimitive> {
        self.nodes.iter().rev().find(|node| &node.id == id)
    }

    pub fn node_opacity(&self, id: &DeviceId) -> Option<f32> {
        self.node(id).map(|node| node.opacity)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.nodes.is_empty()
    }
}

/// Rebuilds every primitive from scratch. Links whose endpoints do not
/// resolve are left out.
pub fn build_scene(
    devices: &[Device],
    links: &[Link],
    positions: &PositionTable,
    theme: &Theme,
    config: &SceneConfig,
) -> Scene {
    let by_id: HashMap<&DeviceId, &Device> = devices.iter().map(|d| (&d.id, d)).collect();
    let mut scene = Scene::default();

    for (link_index, link) in links.iter().enumerate() {
        if !by_id.contains_key(&link.source) || !by_id.contains_key(&link.target) {
            continue;
        }
        let (Some(start), Some(end)) = (positions.get(&link.source), positions.get(&link.target))
        else {
            continue;
        };
        let curve = QuadCurve::bowed(*start, *end, config.edge_bow);
        let down = link.is_down();
        scene.edges.push(EdgePrimitive {
            link_index,
            source: link.source.clone(),
            target: link.target.clone(),
            curve,
            stroke: if down {
                theme.link_down_color.clone()
            } else {
                theme.link_up_color.clone()
            },
            stroke_width: theme.link_width,
            dasharray: down.then(|| theme.link_down_dasharray.clone()),
            label: link.speed.clone().unwrap_or_default(),
            label_position: Point::new(curve.control.x, curve.control.y - config.edge_label_lift),
            opacity: FULL_OPACITY,
        });
    }

    for device in devices {
        let Some(center) = positions.get(&device.id) else {
            debug!(id = %device.id, "device has no position, not drawn");
            continue;
        };
        scene.nodes.push(NodePrimitive {
            id: device.id.clone(),
            kind: device.kind,
            center: *center,
            radius: config.node_radius,
            fill: theme.node_color(device.kind).to_string(),
            stroke: theme.node_stroke.clone(),
            label: device.display_name().to_string(),
            label_offset: config.node_label_offset,
            tooltip: Tooltip::for_device(device),
            handlers: NodeHandlers::ALL,
            opacity: FULL_OPACITY,
        });
    }

    scene
}
