use std::path::{Path, PathBuf};

use netmap_renderer::config::LayoutConfig;
use netmap_renderer::interaction::Mode;
use netmap_renderer::layout::{Tier, compute_layout};
use netmap_renderer::replay::{parse_script, replay};
use netmap_renderer::{
    Config, DeviceId, PointerEvent, RenderOptions, Topology, TopologyView, WheelEvent,
    parse_topology, render_topology, render_topology_svg, update_topology_filter,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Topology {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    parse_topology(&input).expect("parse failed")
}

fn render_fixture(name: &str) -> TopologyView {
    let topology = load_fixture(name);
    render_topology(
        "topology",
        topology.devices,
        topology.links,
        RenderOptions::default(),
    )
}

fn id(raw: &str) -> DeviceId {
    DeviceId::from(raw)
}

#[test]
fn scenario_places_one_device_per_row() {
    let view = render_fixture("scenario.json");
    let layout = view.layout();
    assert_eq!(layout.tier(Tier::Core), &[id("1")]);
    assert_eq!(layout.tier(Tier::Distribution), &[id("2")]);
    assert_eq!(layout.tier(Tier::Access), &[id("3")]);
    assert_eq!(layout.tier(Tier::Endpoint), &[id("4")]);
    for (raw, y) in [("1", 120.0), ("2", 320.0), ("3", 520.0), ("4", 720.0)] {
        let position = view.position(&id(raw)).expect("position");
        assert_eq!(position.y, y, "device {raw}");
        assert_eq!(position.x, 800.0, "device {raw}");
    }
    // The link to device 99 is neither drawn nor an error.
    assert_eq!(view.scene().edges.len(), 1);
    assert_eq!(view.scene().nodes.len(), 4);
}

#[test]
fn scenario_router_filter_dims_the_rest() {
    let mut view = render_fixture("scenario.json");
    update_topology_filter(Some(&mut view), "router", "");
    let scene = view.scene();
    assert_eq!(scene.node_opacity(&id("1")), Some(1.0));
    for raw in ["2", "3", "4"] {
        assert_eq!(scene.node_opacity(&id(raw)), Some(0.25), "device {raw}");
    }
    assert_eq!(scene.edges[0].opacity, 0.1);

    let snapshot = scene.clone();
    update_topology_filter(Some(&mut view), "router", "");
    assert_eq!(view.scene(), &snapshot);
}

#[test]
fn campus_tiers_follow_names_case_insensitively() {
    let view = render_fixture("campus.json5");
    let layout = view.layout();
    assert_eq!(layout.tier(Tier::Core), &[id("1")]);
    assert_eq!(layout.tier(Tier::Distribution), &[id("2"), id("3")]);
    assert_eq!(layout.tier(Tier::Access), &[id("4"), id("5")]);
    assert_eq!(layout.tier(Tier::Endpoint), &[id("6"), id("7")]);

    for tier in Tier::ALL {
        let xs: Vec<f32> = layout
            .tier(tier)
            .iter()
            .map(|d| view.position(d).expect("position").x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "{tier:?} not increasing");
        assert!(xs.iter().all(|x| *x > 0.0 && *x < 1600.0));
    }

    // Only the same-row 2 -> 3 link triggers separation.
    let y3 = view.position(&id("3")).expect("position").y;
    assert!((290.0..350.0).contains(&y3), "y3 = {y3}");
    assert_eq!(view.position(&id("2")).expect("position").y, 320.0);
}

#[test]
fn every_device_lands_in_exactly_one_tier() {
    let topology = load_fixture("campus.json5");
    let layout = compute_layout(&topology.devices, &topology.links, &LayoutConfig::default());
    for device in &topology.devices {
        let hits = Tier::ALL
            .iter()
            .filter(|tier| layout.tier(**tier).contains(&device.id))
            .count();
        assert_eq!(hits, 1, "device {}", device.id);
    }
}

#[test]
fn replayed_drag_survives_a_rebuild() {
    let mut view = render_fixture("scenario.json");
    let script = parse_script(
        &std::fs::read_to_string(fixture_path("drag.events.json")).expect("script read failed"),
    )
    .expect("script parse failed");
    replay(&mut view, &script);
    let moved = view.position(&id("4")).expect("position");
    assert_eq!((moved.x, moved.y), (600.0, 650.0));
    assert_eq!(view.mode(), &Mode::Idle);
    assert!(view.tooltip().is_none());
    assert!(view.view_window().w < 1600.0);

    view.rebuild();
    assert_eq!(view.position(&id("4")), Some(moved));
    assert_eq!(view.scene().node(&id("4")).map(|n| n.center), Some(moved));
}

#[test]
fn relayout_discards_dragged_positions() {
    let mut view = render_fixture("scenario.json");
    view.pointer_down(&PointerEvent::on_node(800.0, 320.0, "2"));
    view.pointer_move(100.0, 100.0);
    view.pointer_up();
    assert_ne!(view.position(&id("2")).map(|p| p.y), Some(320.0));
    view.relayout();
    assert_eq!(view.position(&id("2")).map(|p| p.y), Some(320.0));
}

#[test]
fn zoom_is_bounded_in_both_directions() {
    let mut view = render_fixture("campus.json5");
    let out = WheelEvent {
        x: 400.0,
        y: 300.0,
        delta_y: 53.0,
    };
    for _ in 0..60 {
        view.wheel(&out);
        assert!(view.view_window().w <= 4000.0);
    }
    assert_eq!(view.view_window().w, 4000.0);
    let zoom_in = WheelEvent { delta_y: -53.0, ..out };
    for _ in 0..120 {
        view.wheel(&zoom_in);
        assert!(view.view_window().w >= 400.0);
    }
    assert_eq!(view.view_window().w, 400.0);
    assert_eq!(view.view_window().h, 225.0);
}

#[test]
fn svg_output_reflects_filter_and_view() {
    let mut view = render_fixture("campus.json5");
    update_topology_filter(Some(&mut view), "", "10.0.1");
    let svg = view.to_svg();
    assert!(svg.contains("<svg id=\"topology-svg\""));
    assert!(svg.contains("<g id=\"edges\">"));
    assert!(svg.contains("data-id=\"7\""));
    assert!(svg.contains("opacity=\"0.25\""));
    assert!(svg.contains("stroke-dasharray=\"6 4\""));
    assert!(svg.ends_with("</svg>"));

    let direct = render_topology_svg(
        &std::fs::read_to_string(fixture_path("campus.json5")).expect("fixture read failed"),
        Config::default(),
    )
    .expect("render");
    assert!(direct.contains("dist-sw1"));
    assert!(!direct.contains("opacity=\"0.25\""));
}

#[test]
fn type_filter_compares_raw_types_exactly() {
    let topology = parse_topology(
        r#"{ devices: [
            { id: 1, type: "server" },
            { id: 2, type: "printer" },
            { id: 3, type: "endpoint" },
            { id: 4, type: "switch", hostname: "dist-a" },
        ] }"#,
    )
    .expect("parse failed");
    let mut view = render_topology("t", topology.devices, topology.links, RenderOptions::default());
    update_topology_filter(Some(&mut view), "server", "");
    let opacities: Vec<_> = ["1", "2", "3", "4"]
        .iter()
        .map(|raw| view.scene().node_opacity(&id(raw)))
        .collect();
    assert_eq!(opacities, vec![Some(1.0), Some(0.25), Some(0.25), Some(0.25)]);
    update_topology_filter(Some(&mut view), "switch", "");
    assert_eq!(view.scene().node_opacity(&id("4")), Some(1.0));
    assert_eq!(view.scene().node_opacity(&id("1")), Some(0.25));
}

#[test]
fn cancel_on_blur_releases_a_drag() {
    let topology = load_fixture("scenario.json");
    let element = netmap_renderer::geometry::ScreenRect::new(0.0, 0.0, 1600.0, 900.0);
    let mut view = render_topology(
        "topology",
        topology.devices,
        topology.links,
        RenderOptions::default().with_element(element),
    );
    let start = view.position(&id("1")).expect("position");
    assert!(view.pointer_down(&PointerEvent::on_node(start.x, start.y, "1")).capture_pointer);
    view.pointer_move(start.x + 40.0, start.y);
    assert!(view.cancel().release_pointer);
    assert_eq!(view.mode(), &Mode::Idle);
    view.pointer_move(start.x + 300.0, start.y);
    assert_eq!(view.position(&id("1")).map(|p| p.x), Some(start.x + 40.0));
}
