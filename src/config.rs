use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the de-overlap pass takes its randomness from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JitterSeed {
    /// Seed derived from the device ids: identical input, identical layout.
    #[default]
    Derived,
    Fixed(u64),
    /// Fresh entropy on every call; layouts are not reproducible.
    Entropy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub start_y: f32,
    pub level_height: f32,
    pub jitter_threshold: f32,
    pub jitter_amplitude: f32,
    pub jitter_seed: JitterSeed,
    /// Case-insensitive pattern that marks a switch as a distribution switch.
    pub distribution_pattern: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1600.0,
            canvas_height: 900.0,
            start_y: 120.0,
            level_height: 200.0,
            jitter_threshold: 60.0,
            jitter_amplitude: 30.0,
            jitter_seed: JitterSeed::Derived,
            distribution_pattern: "dist".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub node_radius: f32,
    pub node_label_offset: f32,
    pub edge_bow: f32,
    pub edge_label_lift: f32,
    pub tooltip_offset: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            node_radius: 18.0,
            node_label_offset: 28.0,
            edge_bow: 20.0,
            edge_label_lift: 8.0,
            tooltip_offset: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub initial_width: f32,
    pub initial_height: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Applied when the wheel scrolls towards the user (`delta_y > 0`).
    pub zoom_out_factor: f32,
    pub zoom_in_factor: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_width: 1600.0,
            initial_height: 900.0,
            min_width: 400.0,
            max_width: 4000.0,
            min_height: 225.0,
            max_height: 2250.0,
            zoom_out_factor: 1.08,
            zoom_in_factor: 0.92,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub node_dimmed_opacity: f32,
    pub edge_dimmed_opacity: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            node_dimmed_opacity: 0.25,
            edge_dimmed_opacity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
            background: Theme::dark().background,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub scene: SceneConfig,
    pub view: ViewConfig,
    pub filter: FilterConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    background: Option<String>,
    router_color: Option<String>,
    switch_color: Option<String>,
    endpoint_color: Option<String>,
    node_stroke: Option<String>,
    node_label_color: Option<String>,
    edge_label_color: Option<String>,
    link_up_color: Option<String>,
    link_down_color: Option<String>,
    link_down_dasharray: Option<String>,
    link_width: Option<NumberOrString>,
    arrow_color: Option<String>,
    tooltip_background: Option<String>,
    tooltip_border: Option<String>,
    tooltip_text_color: Option<String>,
    node_glow: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(v) => Some(*v),
            NumberOrString::String(s) => s.trim().trim_end_matches("px").trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedValue {
    Number(u64),
    Mode(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    canvas_width: Option<f32>,
    canvas_height: Option<f32>,
    start_y: Option<f32>,
    level_height: Option<f32>,
    jitter_threshold: Option<f32>,
    jitter_amplitude: Option<f32>,
    jitter_seed: Option<SeedValue>,
    distribution_pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneConfigFile {
    node_radius: Option<f32>,
    node_label_offset: Option<f32>,
    edge_bow: Option<f32>,
    edge_label_lift: Option<f32>,
    tooltip_offset: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewConfigFile {
    initial_width: Option<f32>,
    initial_height: Option<f32>,
    min_width: Option<f32>,
    max_width: Option<f32>,
    min_height: Option<f32>,
    max_height: Option<f32>,
    zoom_out_factor: Option<f32>,
    zoom_in_factor: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterConfigFile {
    node_dimmed_opacity: Option<f32>,
    edge_dimmed_opacity: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    scene: Option<SceneConfigFile>,
    view: Option<ViewConfigFile>,
    filter: Option<FilterConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme '{theme_name}'"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        set(&mut target.canvas_width, layout.canvas_width);
        set(&mut target.canvas_height, layout.canvas_height);
        set(&mut target.start_y, layout.start_y);
        set(&mut target.level_height, layout.level_height);
        set(&mut target.jitter_threshold, layout.jitter_threshold);
        set(&mut target.jitter_amplitude, layout.jitter_amplitude);
        set(&mut target.distribution_pattern, layout.distribution_pattern);
        if let Some(seed) = layout.jitter_seed {
            target.jitter_seed = match seed {
                SeedValue::Number(n) => JitterSeed::Fixed(n),
                SeedValue::Mode(mode) => match mode.as_str() {
                    "derived" => JitterSeed::Derived,
                    "entropy" | "random" => JitterSeed::Entropy,
                    other => return Err(anyhow::anyhow!("Unknown jitterSeed mode '{other}'")),
                },
            };
        }
    }

    if let Some(scene) = parsed.scene {
        let target = &mut config.scene;
        set(&mut target.node_radius, scene.node_radius);
        set(&mut target.node_label_offset, scene.node_label_offset);
        set(&mut target.edge_bow, scene.edge_bow);
        set(&mut target.edge_label_lift, scene.edge_label_lift);
        set(&mut target.tooltip_offset, scene.tooltip_offset);
    }

    if let Some(view) = parsed.view {
        let target = &mut config.view;
        set(&mut target.initial_width, view.initial_width);
        set(&mut target.initial_height, view.initial_height);
        set(&mut target.min_width, view.min_width);
        set(&mut target.max_width, view.max_width);
        set(&mut target.min_height, view.min_height);
        set(&mut target.max_height, view.max_height);
        set(&mut target.zoom_out_factor, view.zoom_out_factor);
        set(&mut target.zoom_in_factor, view.zoom_in_factor);
        if target.min_width > target.max_width || target.min_height > target.max_height {
            return Err(anyhow::anyhow!("View bounds are inverted (min > max)"));
        }
    }

    if let Some(filter) = parsed.filter {
        set(&mut config.filter.node_dimmed_opacity, filter.node_dimmed_opacity);
        set(&mut config.filter.edge_dimmed_opacity, filter.edge_dimmed_opacity);
    }

    if let Some(render) = parsed.render {
        set(&mut config.render.width, render.width);
        set(&mut config.render.height, render.height);
    }

    Ok(config)
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    set(&mut theme.font_family, vars.font_family);
    set(&mut theme.font_size, vars.font_size.as_ref().and_then(NumberOrString::as_f32));
    set(&mut theme.background, vars.background);
    set(&mut theme.router_color, vars.router_color);
    set(&mut theme.switch_color, vars.switch_color);
    set(&mut theme.endpoint_color, vars.endpoint_color);
    set(&mut theme.node_stroke, vars.node_stroke);
    set(&mut theme.node_label_color, vars.node_label_color);
    set(&mut theme.edge_label_color, vars.edge_label_color);
    set(&mut theme.link_up_color, vars.link_up_color);
    set(&mut theme.link_down_color, vars.link_down_color);
    set(&mut theme.link_down_dasharray, vars.link_down_dasharray);
    set(&mut theme.link_width, vars.link_width.as_ref().and_then(NumberOrString::as_f32));
    set(&mut theme.arrow_color, vars.arrow_color);
    set(&mut theme.tooltip_background, vars.tooltip_background);
    set(&mut theme.tooltip_border, vars.tooltip_border);
    set(&mut theme.tooltip_text_color, vars.tooltip_text_color);
    set(&mut theme.node_glow, vars.node_glow);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        let config = parse_config("{}").expect("config");
        assert_eq!(config.layout.canvas_width, 1600.0);
        assert_eq!(config.view.max_width, 4000.0);
        assert_eq!(config.filter.node_dimmed_opacity, 0.25);
        assert_eq!(config.layout.jitter_seed, JitterSeed::Derived);
    }

    #[test]
    fn overrides_theme_and_layout() {
        let config = parse_config(
            r##"{
                "theme": "light",
                "themeVariables": { "routerColor": "#ff0000", "fontSize": "14px" },
                "layout": { "levelHeight": 150, "jitterSeed": 42 },
                "view": { "maxWidth": 3200 }
            }"##,
        )
        .expect("config");
        assert_eq!(config.theme.router_color, "#ff0000");
        assert_eq!(config.theme.font_size, 14.0);
        assert_eq!(config.render.background, Theme::light().background);
        assert_eq!(config.layout.level_height, 150.0);
        assert_eq!(config.layout.jitter_seed, JitterSeed::Fixed(42));
        assert_eq!(config.view.max_width, 3200.0);
    }

    #[test]
    fn entropy_seed_mode() {
        let config = parse_config(r#"{"layout":{"jitterSeed":"entropy"}}"#).expect("config");
        assert_eq!(config.layout.jitter_seed, JitterSeed::Entropy);
        assert!(parse_config(r#"{"layout":{"jitterSeed":"sometimes"}}"#).is_err());
    }

    #[test]
    fn rejects_unknown_theme_and_inverted_bounds() {
        assert!(parse_config(r#"{"theme":"neon"}"#).is_err());
        assert!(parse_config(r#"{"view":{"minWidth":5000}}"#).is_err());
    }
}
