#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod filter;
pub mod geometry;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod replay;
pub mod scene;
pub mod theme;
pub mod topology;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig};
pub use filter::TopologyFilter;
pub use interaction::{InteractionController, PointerEvent, WheelEvent};
pub use ir::{Device, DeviceId, DeviceKind, Link, LinkStatus, Topology};
pub use parser::{TopologyError, parse_topology};
pub use theme::Theme;
pub use topology::{RenderOptions, TopologyView, render_topology, update_topology_filter};

/// Parses a topology document, lays it out and renders the initial scene.
pub fn render_topology_svg(input: &str, config: Config) -> Result<String, TopologyError> {
    let topology = parse_topology(input)?;
    let view = render_topology(
        "topology",
        topology.devices,
        topology.links,
        RenderOptions::new(config),
    );
    Ok(view.to_svg())
}
