use crate::geometry::{ScreenRect, ViewTransform, ViewWindow};
use crate::scene::{EdgePrimitive, FULL_OPACITY, NodePrimitive, Scene, Tooltip};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

#[cfg(feature = "png")]
use crate::config::RenderConfig;

pub struct TooltipOverlay<'a> {
    pub tooltip: &'a Tooltip,
    /// Anchor in element pixels, relative to the element's top-left corner.
    pub x: f32,
    pub y: f32,
}

pub struct RenderTarget<'a> {
    pub container_id: &'a str,
    pub view: ViewWindow,
    pub element: ScreenRect,
    pub tooltip: Option<TooltipOverlay<'a>>,
}

pub fn render_svg(scene: &Scene, target: &RenderTarget<'_>, theme: &Theme) -> String {
    let mut svg = String::new();
    let view = &target.view;
    let width = target.element.width.max(1.0);
    let height = target.element.height.max(1.0);

    svg.push_str(&format!(
        "<svg id=\"{}-svg\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{}\" preserveAspectRatio=\"xMidYMid meet\">",
        escape_xml(target.container_id),
        view.viewbox_attr()
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.arrow_color
    ));
    if theme.node_glow {
        svg.push_str(
            "<filter id=\"softGlow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur stdDeviation=\"4\" result=\"coloredBlur\"/><feMerge><feMergeNode in=\"coloredBlur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>",
        );
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        view.x, view.y, view.w, view.h, theme.background
    ));

    svg.push_str("<g id=\"edges\">");
    for edge in &scene.edges {
        svg.push_str(&edge_svg(edge, theme));
    }
    svg.push_str("</g>");

    svg.push_str("<g id=\"nodes\">");
    for node in &scene.nodes {
        svg.push_str(&node_svg(node, theme));
    }
    svg.push_str("</g>");

    if let Some(overlay) = &target.tooltip {
        svg.push_str(&tooltip_svg(overlay, view, &target.element, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn opacity_attr(opacity: f32) -> String {
    if opacity < FULL_OPACITY {
        format!(" opacity=\"{opacity}\"")
    } else {
        String::new()
    }
}

fn edge_svg(edge: &EdgePrimitive, theme: &Theme) -> String {
    let dash = edge
        .dasharray
        .as_deref()
        .map(|d| format!(" stroke-dasharray=\"{d}\""))
        .unwrap_or_default();
    let opacity = opacity_attr(edge.opacity);
    let mut out = format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{dash} marker-end=\"url(#arrow)\" data-source=\"{}\" data-target=\"{}\"{opacity}/>",
        edge.curve.path_data(),
        edge.stroke,
        edge.stroke_width,
        escape_xml(edge.source.as_str()),
        escape_xml(edge.target.as_str()),
    );
    out.push_str(&format!(
        "<text class=\"edge-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{opacity}>{}</text>",
        edge.label_position.x,
        edge.label_position.y,
        theme.font_family,
        theme.font_size,
        theme.edge_label_color,
        escape_xml(&edge.label)
    ));
    out
}

fn node_svg(node: &NodePrimitive, theme: &Theme) -> String {
    let filter = if theme.node_glow {
        " filter=\"url(#softGlow)\""
    } else {
        ""
    };
    format!(
        "<g class=\"node\" data-id=\"{}\" transform=\"translate({:.2}, {:.2})\"{}><circle r=\"{}\" fill=\"{}\" stroke=\"{}\"{filter}/><text y=\"{}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
        escape_xml(node.id.as_str()),
        node.center.x,
        node.center.y,
        opacity_attr(node.opacity),
        node.radius,
        node.fill,
        node.stroke,
        node.label_offset,
        theme.font_family,
        theme.font_size,
        theme.node_label_color,
        escape_xml(&node.label)
    )
}

/// Tooltip box drawn in diagram space at the element-relative anchor, scaled
/// so it keeps its on-screen size at any zoom.
fn tooltip_svg(
    overlay: &TooltipOverlay<'_>,
    view: &ViewWindow,
    element: &ScreenRect,
    theme: &Theme,
) -> String {
    let local = ScreenRect::new(0.0, 0.0, element.width, element.height);
    let transform = ViewTransform::new(view, &local);
    let anchor = transform.screen_to_diagram(overlay.x, overlay.y);
    let unit = 1.0 / transform.scale();
    let line_height = theme.font_size * 1.5;
    let rows = overlay.tooltip.rows.len() as f32 + 1.0;
    let box_w = 200.0;
    let box_h = rows * line_height + 12.0;

    let mut out = format!(
        "<g class=\"tooltip\" transform=\"translate({:.2}, {:.2}) scale({unit:.4})\">",
        anchor.x, anchor.y
    );
    out.push_str(&format!(
        "<rect width=\"{box_w}\" height=\"{box_h:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\"/>",
        theme.tooltip_background, theme.tooltip_border
    ));
    let text_attrs = format!(
        "font-family=\"{}\" font-size=\"{}\" fill=\"{}\"",
        theme.font_family, theme.font_size, theme.tooltip_text_color
    );
    out.push_str(&format!(
        "<text class=\"ttl\" x=\"8\" y=\"{:.2}\" font-weight=\"bold\" {text_attrs}>{}</text>",
        line_height,
        escape_xml(&overlay.tooltip.title)
    ));
    for (idx, (label, value)) in overlay.tooltip.rows.iter().enumerate() {
        let y = line_height * (idx as f32 + 2.0);
        out.push_str(&format!(
            "<text x=\"8\" y=\"{y:.2}\" {text_attrs}>{}</text><text x=\"{:.2}\" y=\"{y:.2}\" text-anchor=\"end\" {text_attrs}>{}</text>",
            escape_xml(label),
            box_w - 8.0,
            escape_xml(value)
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size {}x{}", render_cfg.width, render_cfg.height))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
