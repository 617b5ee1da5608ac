use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable device identity. Numeric ids from the input are kept as their text
/// so that `1` and `"1"` resolve to the same device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i32> for DeviceId {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for DeviceId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Router,
    Switch,
    Endpoint,
}

impl DeviceKind {
    /// Anything that is not a router or a switch is drawn as an endpoint.
    pub fn from_type(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "router" => Self::Router,
            "switch" => Self::Switch,
            _ => Self::Endpoint,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Switch => "switch",
            Self::Endpoint => "endpoint",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    /// Raw `type` string as supplied, kept for tooltips and dumps.
    pub type_name: Option<String>,
    pub hostname: Option<String>,
    pub name: Option<String>,
    pub management_ip: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub uptime: Option<String>,
}

impl Device {
    pub fn new(id: impl Into<DeviceId>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            type_name: Some(kind.as_str().to_string()),
            hostname: None,
            name: None,
            management_ip: None,
            vendor: None,
            model: None,
            uptime: None,
        }
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = Some(hostname.to_string());
        self
    }

    pub fn with_management_ip(mut self, ip: &str) -> Self {
        self.management_ip = Some(ip.to_string());
        self
    }

    pub fn display_name(&self) -> &str {
        non_empty(self.hostname.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or(self.id.as_str())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Up,
    Down,
    Other(String),
}

impl LinkStatus {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Other(token.to_string()),
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: DeviceId,
    pub target: DeviceId,
    pub status: Option<LinkStatus>,
    pub speed: Option<String>,
}

impl Link {
    pub fn new(source: impl Into<DeviceId>, target: impl Into<DeviceId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            status: None,
            speed: None,
        }
    }

    pub fn with_status(mut self, status: LinkStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_speed(mut self, speed: &str) -> Self {
        self.speed = Some(speed.to_string());
        self
    }

    pub fn is_down(&self) -> bool {
        self.status.as_ref().is_some_and(LinkStatus::is_down)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub devices: Vec<Device>,
    pub links: Vec<Link>,
}

impl Topology {
    pub fn new(devices: Vec<Device>, links: Vec<Link>) -> Self {
        Self { devices, links }
    }
}
