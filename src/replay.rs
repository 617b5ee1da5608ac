//! Recorded interaction scripts, replayed through a [`TopologyView`] without
//! a live event loop.
//!
//! ```json
//! [
//!   { "event": "pointerDown", "x": 800, "y": 120, "node": 1 },
//!   { "event": "pointerMove", "x": 700, "y": 240 },
//!   { "event": "pointerUp" },
//!   { "event": "wheel", "x": 800, "y": 450, "deltaY": -120 },
//!   { "event": "filter", "type": "router", "query": "" }
//! ]
//! ```

use serde::Deserialize;
use tracing::debug;

use crate::geometry::ScreenRect;
use crate::interaction::{PointerButton, PointerEvent, PointerTarget, WheelEvent};
use crate::ir::DeviceId;
use crate::topology::{TopologyView, update_topology_filter};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ScriptedEvent {
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        button: Option<PointerButton>,
        #[serde(default)]
        node: Option<DeviceId>,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp,
    #[serde(rename_all = "camelCase")]
    Wheel {
        x: f32,
        y: f32,
        delta_y: f32,
    },
    PointerEnter {
        node: DeviceId,
        x: f32,
        y: f32,
    },
    PointerLeave,
    Click {
        node: DeviceId,
    },
    /// Lost pointer capture or window blur.
    Cancel,
    Filter {
        #[serde(default, rename = "type")]
        type_filter: String,
        #[serde(default)]
        query: String,
    },
    Resize {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    },
    ResetView,
    Relayout,
}

pub fn parse_script(input: &str) -> anyhow::Result<Vec<ScriptedEvent>> {
    let value = json5::from_str::<serde_json::Value>(input)?;
    Ok(serde_json::from_value(value)?)
}

pub fn replay(view: &mut TopologyView, events: &[ScriptedEvent]) {
    for event in events {
        debug!(?event, "replaying");
        match event {
            ScriptedEvent::PointerDown { x, y, button, node } => {
                let button = button.unwrap_or(PointerButton::Primary);
                let target = match node {
                    Some(id) => PointerTarget::Node(id.clone()),
                    None => PointerTarget::Background,
                };
                view.pointer_down(&PointerEvent {
                    x: *x,
                    y: *y,
                    button,
                    target,
                });
            }
            ScriptedEvent::PointerMove { x, y } => {
                view.pointer_move(*x, *y);
            }
            ScriptedEvent::PointerUp => {
                view.pointer_up();
            }
            ScriptedEvent::Wheel { x, y, delta_y } => {
                view.wheel(&WheelEvent {
                    x: *x,
                    y: *y,
                    delta_y: *delta_y,
                });
            }
            ScriptedEvent::PointerEnter { node, x, y } => {
                view.pointer_enter(node, *x, *y);
            }
            ScriptedEvent::PointerLeave => {
                view.pointer_leave();
            }
            ScriptedEvent::Click { node } => {
                view.click(node);
            }
            ScriptedEvent::Cancel => {
                view.cancel();
            }
            ScriptedEvent::Filter { type_filter, query } => {
                update_topology_filter(Some(&mut *view), type_filter, query);
            }
            ScriptedEvent::Resize {
                left,
                top,
                width,
                height,
            } => view.set_element(ScreenRect::new(*left, *top, *width, *height)),
            ScriptedEvent::ResetView => {
                view.reset_view();
            }
            ScriptedEvent::Relayout => view.relayout(),
        }
    }
}
