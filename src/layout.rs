use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::config::{JitterSeed, LayoutConfig};
use crate::geometry::Point;
use crate::ir::{Device, DeviceId, DeviceKind, Link};

/// Engine-owned positions, keyed by device id. Duplicate ids are last-write-wins.
pub type PositionTable = BTreeMap<DeviceId, Point>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Core,
    #[serde(rename = "dist")]
    Distribution,
    Access,
    Endpoint,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Core, Tier::Distribution, Tier::Access, Tier::Endpoint];

    pub fn index(self) -> usize {
        match self {
            Tier::Core => 0,
            Tier::Distribution => 1,
            Tier::Access => 2,
            Tier::Endpoint => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::Distribution => "dist",
            Tier::Access => "access",
            Tier::Endpoint => "endpoint",
        }
    }
}

static DEFAULT_DISTRIBUTION: Lazy<Regex> = Lazy::new(|| build_pattern("dist"));

fn build_pattern(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            // Not a valid regex: treat it as a literal marker.
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .unwrap_or_else(|_| DEFAULT_DISTRIBUTION.clone())
}

/// Tier classification rule, first match wins.
#[derive(Debug, Clone)]
pub struct TierClassifier {
    distribution: Regex,
}

impl TierClassifier {
    pub fn new(distribution_pattern: &str) -> Self {
        let distribution = if distribution_pattern == "dist" {
            DEFAULT_DISTRIBUTION.clone()
        } else {
            build_pattern(distribution_pattern)
        };
        Self { distribution }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(&config.distribution_pattern)
    }

    /// `label` is the hostname or name; the id never marks a distribution switch.
    pub fn classify(&self, kind: DeviceKind, label: Option<&str>) -> Tier {
        match kind {
            DeviceKind::Router => Tier::Core,
            DeviceKind::Switch if label.is_some_and(|l| self.distribution.is_match(l)) => {
                Tier::Distribution
            }
            DeviceKind::Switch => Tier::Access,
            DeviceKind::Endpoint => Tier::Endpoint,
        }
    }

    pub fn classify_device(&self, device: &Device) -> Tier {
        let label = [&device.hostname, &device.name]
            .into_iter()
            .flatten()
            .find(|l| !l.is_empty());
        self.classify(device.kind, label.map(String::as_str))
    }
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::new("dist")
    }
}

/// Classifies with the default distribution marker.
pub fn classify(device: &Device) -> Tier {
    TierClassifier::default().classify_device(device)
}

#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub positions: PositionTable,
    /// Device ids per tier, in input order, indexed by [`Tier::index`].
    pub tiers: [Vec<DeviceId>; 4],
}

impl LayoutResult {
    pub fn tier(&self, tier: Tier) -> &[DeviceId] {
        &self.tiers[tier.index()]
    }

    pub fn tier_of(&self, id: &DeviceId) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| self.tiers[tier.index()].contains(id))
    }
}

pub fn compute_layout(devices: &[Device], links: &[Link], config: &LayoutConfig) -> LayoutResult {
    let classifier = TierClassifier::from_config(config);
    let mut result = LayoutResult::default();
    for device in devices {
        let tier = classifier.classify_device(device);
        result.tiers[tier.index()].push(device.id.clone());
    }

    for tier in Tier::ALL {
        distribute_horizontally(
            &result.tiers[tier.index()],
            tier.index(),
            config,
            &mut result.positions,
        );
    }

    debug!(
        core = result.tiers[0].len(),
        dist = result.tiers[1].len(),
        access = result.tiers[2].len(),
        endpoint = result.tiers[3].len(),
        "assigned tiers"
    );

    let mut rng = jitter_rng(devices, config.jitter_seed);
    separate_close_rows(links, config, &mut rng, &mut result.positions);
    result
}

fn distribute_horizontally(
    ids: &[DeviceId],
    level: usize,
    config: &LayoutConfig,
    positions: &mut PositionTable,
) {
    let step = config.canvas_width / (ids.len() + 1) as f32;
    let y = config.start_y + config.level_height * level as f32;
    for (idx, id) in ids.iter().enumerate() {
        positions.insert(id.clone(), Point::new(step * (idx + 1) as f32, y));
    }
}

fn jitter_rng(devices: &[Device], seed: JitterSeed) -> StdRng {
    match seed {
        JitterSeed::Derived => StdRng::seed_from_u64(derive_seed(devices)),
        JitterSeed::Fixed(seed) => StdRng::seed_from_u64(seed),
        JitterSeed::Entropy => StdRng::from_entropy(),
    }
}

/// FNV-1a over the device ids, in input order.
fn derive_seed(devices: &[Device]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for device in devices {
        for byte in device.id.as_str().bytes().chain(std::iter::once(0xff)) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

/// Nudges the target of every link whose endpoints sit on nearly the same
/// row. Best effort: a single pass, later links see earlier nudges.
fn separate_close_rows(
    links: &[Link],
    config: &LayoutConfig,
    rng: &mut StdRng,
    positions: &mut PositionTable,
) {
    let amplitude = config.jitter_amplitude;
    if !amplitude.is_finite() || amplitude <= 0.0 {
        return;
    }
    for link in links {
        let (Some(source), Some(target)) = (
            positions.get(&link.source).copied(),
            positions.get(&link.target).copied(),
        ) else {
            debug!(source = %link.source, target = %link.target, "skipping unresolved link");
            continue;
        };
        if (source.y - target.y).abs() < config.jitter_threshold {
            let offset: f32 = rng.gen_range(-amplitude..amplitude);
            if let Some(point) = positions.get_mut(&link.target) {
                point.y += offset;
            }
        }
    }
}
