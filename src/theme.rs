use serde::{Deserialize, Serialize};

use crate::ir::DeviceKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub router_color: String,
    pub switch_color: String,
    pub endpoint_color: String,
    pub node_stroke: String,
    pub node_label_color: String,
    pub edge_label_color: String,
    pub link_up_color: String,
    pub link_down_color: String,
    pub link_down_dasharray: String,
    pub link_width: f32,
    pub arrow_color: String,
    pub tooltip_background: String,
    pub tooltip_border: String,
    pub tooltip_text_color: String,
    pub node_glow: bool,
}

impl Theme {
    /// Dark scheme the topology page ships with.
    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#0b0f1f".to_string(),
            router_color: "#6ea8fe".to_string(),
            switch_color: "#8b9cf9".to_string(),
            endpoint_color: "#79e4a3".to_string(),
            node_stroke: "#0b0f1f".to_string(),
            node_label_color: "#dfe6ff".to_string(),
            edge_label_color: "#9aa6c8".to_string(),
            link_up_color: "#2d6a4f".to_string(),
            link_down_color: "#8a3a41".to_string(),
            link_down_dasharray: "6 4".to_string(),
            link_width: 2.0,
            arrow_color: "#33406e".to_string(),
            tooltip_background: "#141a33".to_string(),
            tooltip_border: "#33406e".to_string(),
            tooltip_text_color: "#dfe6ff".to_string(),
            node_glow: true,
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            router_color: "#3D7BE0".to_string(),
            switch_color: "#6C63D9".to_string(),
            endpoint_color: "#2FA36B".to_string(),
            node_stroke: "#1C2430".to_string(),
            node_label_color: "#1C2430".to_string(),
            edge_label_color: "#5B6B86".to_string(),
            link_up_color: "#4E8A6C".to_string(),
            link_down_color: "#C0444F".to_string(),
            link_down_dasharray: "6 4".to_string(),
            link_width: 2.0,
            arrow_color: "#7A8AA6".to_string(),
            tooltip_background: "#F8FAFF".to_string(),
            tooltip_border: "#C7D2E5".to_string(),
            tooltip_text_color: "#1C2430".to_string(),
            node_glow: false,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" | "default" => Some(Self::dark()),
            "light" | "modern" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn node_color(&self, kind: DeviceKind) -> &str {
        match kind {
            DeviceKind::Router => &self.router_color,
            DeviceKind::Switch => &self.switch_color,
            DeviceKind::Endpoint => &self.endpoint_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
