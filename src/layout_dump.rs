use crate::geometry::ViewWindow;
use crate::topology::TopologyView;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub container_id: String,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub view: ViewWindow,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub type_name: Option<String>,
    pub tier: Option<String>,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub link_index: usize,
    pub source: String,
    pub target: String,
    pub path: String,
    pub dashed: bool,
    pub label: String,
    pub opacity: f32,
}

impl LayoutDump {
    pub fn from_view(view: &TopologyView) -> Self {
        let layout = view.layout();
        let nodes = view
            .scene()
            .nodes
            .iter()
            .map(|node| {
                let type_name = view
                    .devices()
                    .iter()
                    .rev()
                    .find(|d| d.id == node.id)
                    .and_then(|d| d.type_name.clone());
                NodeDump {
                    id: node.id.to_string(),
                    kind: node.kind.as_str().to_string(),
                    type_name,
                    tier: layout.tier_of(&node.id).map(|t| t.as_str().to_string()),
                    label: node.label.clone(),
                    x: node.center.x,
                    y: node.center.y,
                    opacity: node.opacity,
                }
            })
            .collect();

        let edges = view
            .scene()
            .edges
            .iter()
            .map(|edge| EdgeDump {
                link_index: edge.link_index,
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                path: edge.curve.path_data(),
                dashed: edge.dasharray.is_some(),
                label: edge.label.clone(),
                opacity: edge.opacity,
            })
            .collect();

        let config = &view.config().layout;
        LayoutDump {
            container_id: view.container_id().to_string(),
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            view: view.view_window(),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, view: &TopologyView) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_view(view);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
