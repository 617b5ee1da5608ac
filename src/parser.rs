use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::ir::{Device, DeviceId, DeviceKind, Link, LinkStatus, Topology};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology document: {0}")]
    Syntax(String),
    #[error("topology document must be an object with a `devices` array")]
    MissingDevices,
    #[error("device #{index} has no `id`")]
    MissingId { index: usize },
    #[error("invalid {what} record: {source}")]
    Shape {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Scalar that may arrive as a JSON string or number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
            Scalar::Bool(flag) => flag.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    id: Option<Scalar>,
    #[serde(rename = "type")]
    kind: Option<String>,
    hostname: Option<String>,
    name: Option<String>,
    #[serde(alias = "managementIp")]
    management_ip: Option<String>,
    vendor: Option<String>,
    model: Option<String>,
    uptime: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    source: Option<Scalar>,
    target: Option<Scalar>,
    status: Option<String>,
    speed: Option<Scalar>,
}

/// Parses a `{ "devices": [...], "links": [...] }` document. JSON5 syntax
/// (comments, trailing commas, unquoted keys) is accepted.
pub fn parse_topology(input: &str) -> Result<Topology, TopologyError> {
    let value = json5::from_str::<serde_json::Value>(input)
        .map_err(|err| TopologyError::Syntax(err.to_string()))?;
    let devices = value
        .get("devices")
        .filter(|v| v.is_array())
        .ok_or(TopologyError::MissingDevices)?;
    let devices = parse_devices(devices)?;
    let links = match value.get("links") {
        Some(links) if !links.is_null() => parse_links(links)?,
        _ => Vec::new(),
    };
    debug!(devices = devices.len(), links = links.len(), "parsed topology");
    Ok(Topology::new(devices, links))
}

pub fn parse_devices(value: &serde_json::Value) -> Result<Vec<Device>, TopologyError> {
    let raw: Vec<RawDevice> = serde_json::from_value(value.clone())
        .map_err(|source| TopologyError::Shape { what: "device", source })?;
    raw.into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let id = raw.id.ok_or(TopologyError::MissingId { index })?;
            let kind = raw
                .kind
                .as_deref()
                .map(DeviceKind::from_type)
                .unwrap_or(DeviceKind::Endpoint);
            Ok(Device {
                id: DeviceId(id.into_text()),
                kind,
                type_name: raw.kind,
                hostname: raw.hostname,
                name: raw.name,
                management_ip: raw.management_ip,
                vendor: raw.vendor,
                model: raw.model,
                uptime: raw.uptime.map(Scalar::into_text),
            })
        })
        .collect()
}

/// Links without a `source` or `target` can never resolve and are dropped here.
pub fn parse_links(value: &serde_json::Value) -> Result<Vec<Link>, TopologyError> {
    let raw: Vec<RawLink> = serde_json::from_value(value.clone())
        .map_err(|source| TopologyError::Shape { what: "link", source })?;
    let mut links = Vec::with_capacity(raw.len());
    for (idx, raw) in raw.into_iter().enumerate() {
        let (Some(source), Some(target)) = (raw.source, raw.target) else {
            debug!(index = idx, "dropping link without both endpoints");
            continue;
        };
        links.push(Link {
            source: DeviceId(source.into_text()),
            target: DeviceId(target.into_text()),
            status: raw.status.as_deref().map(LinkStatus::from_token),
            speed: raw.speed.map(Scalar::into_text),
        });
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_string_ids() {
        let input = r#"{
            // numeric ids are normalised to text
            devices: [
                { id: 1, type: "router", hostname: "core-r1", management_ip: "10.0.0.1" },
                { id: "2", type: "switch", name: "dist-sw1", uptime: 3600 },
            ],
            links: [{ source: 1, target: "2", status: "down", speed: "10G" }],
        }"#;
        let topology = parse_topology(input).expect("parse failed");
        assert_eq!(topology.devices.len(), 2);
        assert_eq!(topology.devices[0].id.as_str(), "1");
        assert_eq!(topology.devices[0].kind, DeviceKind::Router);
        assert_eq!(topology.devices[1].uptime.as_deref(), Some("3600"));
        assert_eq!(topology.links[0].source, topology.devices[0].id);
        assert_eq!(topology.links[0].target, topology.devices[1].id);
        assert!(topology.links[0].is_down());
        assert_eq!(topology.links[0].speed.as_deref(), Some("10G"));
    }

    #[test]
    fn missing_type_defaults_to_endpoint() {
        let topology = parse_topology(r#"{"devices":[{"id":"pc"}]}"#).expect("parse failed");
        assert_eq!(topology.devices[0].kind, DeviceKind::Endpoint);
        assert!(topology.links.is_empty());
    }

    #[test]
    fn rejects_documents_without_devices() {
        assert!(matches!(
            parse_topology(r#"{"links":[]}"#),
            Err(TopologyError::MissingDevices)
        ));
        assert!(matches!(parse_topology("{ devices: "), Err(TopologyError::Syntax(_))));
    }

    #[test]
    fn rejects_device_without_id() {
        let err = parse_topology(r#"{"devices":[{"id":1},{"type":"router"}]}"#).unwrap_err();
        assert!(matches!(err, TopologyError::MissingId { index: 1 }));
    }

    #[test]
    fn drops_links_missing_an_endpoint() {
        let topology =
            parse_topology(r#"{"devices":[{"id":1}],"links":[{"source":1},{"source":1,"target":99}]}"#)
                .expect("parse failed");
        assert_eq!(topology.links.len(), 1);
        assert_eq!(topology.links[0].target.as_str(), "99");
    }
}
