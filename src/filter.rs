use std::collections::HashMap;

use crate::config::FilterConfig;
use crate::ir::{Device, DeviceId, DeviceKind};
use crate::scene::{FULL_OPACITY, Scene};

/// Which devices a type selector keeps. Routers and switches are matched by
/// kind; any other selector must equal the device's raw `type` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelector {
    Kind(DeviceKind),
    Raw(String),
}

impl TypeSelector {
    pub fn parse(selector: &str) -> Option<Self> {
        if selector.is_empty() {
            return None;
        }
        Some(match DeviceKind::from_type(selector) {
            DeviceKind::Endpoint => Self::Raw(selector.to_string()),
            kind => Self::Kind(kind),
        })
    }

    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::Kind(kind) => *kind == device.kind,
            Self::Raw(raw) => device.type_name.as_deref() == Some(raw.as_str()),
        }
    }
}

/// Type predicate plus free-text query. Absent parts always match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyFilter {
    pub selector: Option<TypeSelector>,
    pub query: Option<String>,
}

impl TopologyFilter {
    pub fn new(kind: Option<DeviceKind>, query: Option<&str>) -> Self {
        Self::with_selector(kind.map(TypeSelector::Kind), query)
    }

    fn with_selector(selector: Option<TypeSelector>, query: Option<&str>) -> Self {
        let query = query.filter(|q| !q.is_empty()).map(str::to_lowercase);
        Self { selector, query }
    }

    /// Parses the type selector used by the page controls (`""` = any type).
    pub fn from_selector(type_filter: &str, query: &str) -> Self {
        Self::with_selector(TypeSelector::parse(type_filter), Some(query))
    }

    pub fn is_empty(&self) -> bool {
        self.selector.is_none() && self.query.is_none()
    }

    pub fn matches(&self, device: &Device) -> bool {
        let type_ok = self.selector.as_ref().is_none_or(|s| s.matches(device));
        let query_ok = self.query.as_deref().is_none_or(|q| {
            device
                .management_ip
                .as_deref()
                .is_some_and(|ip| ip.to_lowercase().contains(q))
                || device.display_name().to_lowercase().contains(q)
        });
        type_ok && query_ok
    }
}

/// Recomputes node and edge opacity on an already built scene. Positions are
/// never touched, so this is safe to call at any point between rebuilds.
pub fn apply_filter(
    scene: &mut Scene,
    devices: &[Device],
    filter: &TopologyFilter,
    config: &FilterConfig,
) {
    let by_id: HashMap<&DeviceId, &Device> = devices.iter().map(|d| (&d.id, d)).collect();

    for node in &mut scene.nodes {
        let visible = by_id.get(&node.id).is_some_and(|device| filter.matches(device));
        node.opacity = if visible {
            FULL_OPACITY
        } else {
            config.node_dimmed_opacity
        };
    }

    let opacities: HashMap<DeviceId, f32> = scene
        .nodes
        .iter()
        .map(|node| (node.id.clone(), node.opacity))
        .collect();
    let fully_visible = |id: &DeviceId| opacities.get(id).is_some_and(|o| *o >= FULL_OPACITY);

    for edge in &mut scene.edges {
        edge.opacity = if fully_visible(&edge.source) && fully_visible(&edge.target) {
            FULL_OPACITY
        } else {
            config.edge_dimmed_opacity
        };
    }
}
