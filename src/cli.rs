use crate::config::{Config, JitterSeed, load_config};
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_topology;
use crate::render::write_output_svg;
use crate::replay::{parse_script, replay};
use crate::topology::{RenderOptions, render_topology, update_topology_filter};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nmr", version, about = "Network topology renderer (tiered layout, SVG output)")]
pub struct Args {
    /// Topology file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, view, filter)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width of the rendered element
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height of the rendered element
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Fixed seed for the row separation jitter
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Only show devices of this type (router, switch, endpoint)
    #[arg(long = "type")]
    pub type_filter: Option<String>,

    /// Only show devices whose IP or name contains this text
    #[arg(short = 'q', long = "query")]
    pub query: Option<String>,

    /// JSON file with interaction events to replay before rendering
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args);

    let input = read_input(args.input.as_deref())?;
    let topology = parse_topology(&input)?;

    let options = RenderOptions::new(config.clone()).with_on_click(|device| {
        info!(id = %device.id, name = device.display_name(), "device clicked");
    });
    let mut view = render_topology("topology", topology.devices, topology.links, options);

    if let Some(path) = args.events.as_deref() {
        let script = parse_script(&std::fs::read_to_string(path)?)?;
        info!(events = script.len(), "replaying interaction script");
        replay(&mut view, &script);
    }

    if args.type_filter.is_some() || args.query.is_some() {
        update_topology_filter(
            Some(&mut view),
            args.type_filter.as_deref().unwrap_or_default(),
            args.query.as_deref().unwrap_or_default(),
        );
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &view)?;
    }

    let svg = view.to_svg();
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(seed) = args.seed {
        config.layout.jitter_seed = JitterSeed::Fixed(seed);
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_override_config() {
        let args = Args::parse_from([
            "nmr", "-i", "topo.json", "-w", "1024", "--seed", "7", "--type", "router",
        ]);
        let mut config = Config::default();
        apply_args(&mut config, &args);
        assert_eq!(config.render.width, 1024.0);
        assert_eq!(config.render.height, 900.0);
        assert_eq!(config.layout.jitter_seed, JitterSeed::Fixed(7));
        assert_eq!(args.type_filter.as_deref(), Some("router"));
        assert_eq!(args.output_format, OutputFormat::Svg);
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        let path = PathBuf::from("out.png");
        assert_eq!(ensure_output(&Some(path.clone()), "png").expect("path"), path);
    }
}
