use netmap_renderer::config::{Config, JitterSeed};
use netmap_renderer::render_topology_svg as render_with_config;
use netmap_renderer::theme::Theme;
use netmap_renderer::{RenderOptions, parse_topology, render_topology, update_topology_filter};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopologyRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    seed: Option<u64>,
    #[serde(rename = "type")]
    type_filter: Option<String>,
    query: Option<String>,
}

fn build_config(options: &TopologyRenderOptions) -> Config {
    let mut config = Config::default();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::by_name) {
        config.theme = theme;
    }
    if let Some(font_family) = &options.font_family {
        config.theme.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(seed) = options.seed {
        config.layout.jitter_seed = JitterSeed::Fixed(seed);
    }
    config
}

fn render(topology_json: &str, options: TopologyRenderOptions) -> Result<String, String> {
    let config = build_config(&options);
    if options.type_filter.is_none() && options.query.is_none() {
        return render_with_config(topology_json, config).map_err(|error| error.to_string());
    }
    let topology = parse_topology(topology_json).map_err(|error| error.to_string())?;
    let mut view = render_topology(
        "topology",
        topology.devices,
        topology.links,
        RenderOptions::new(config),
    );
    update_topology_filter(
        Some(&mut view),
        options.type_filter.as_deref().unwrap_or_default(),
        options.query.as_deref().unwrap_or_default(),
    );
    Ok(view.to_svg())
}

#[wasm_bindgen]
pub fn render_topology_svg(topology_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TopologyRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TopologyRenderOptions::default()
    };
    render(topology_json, options).map_err(|error| JsValue::from_str(&error))
}
