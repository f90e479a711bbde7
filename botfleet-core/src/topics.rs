//! Topic address scheme and the inbound registry.
//!
//! Every device talks under `{tenant_id}/{device_id}/{suffix}` where
//! `tenant_id` is an opaque 36-character identifier and `device_id` matches
//! the device slug pattern. The registry is a declarative table of the six
//! inbound kinds; matching is first-match-wins in declared order, and the
//! suffixes are mutually exclusive by construction.

use botfleet_models::constants::{DEVICE_SLUG_PATTERN, TENANT_ID_LEN};
use once_cell::sync::Lazy;
use regex::Regex;

static DEVICE_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEVICE_SLUG_PATTERN).expect("device slug pattern is valid"));

/// Delivery quality requested for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    AtMostOnce,
    AtLeastOnce,
}

impl From<Quality> for rumqttc::QoS {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::AtMostOnce => rumqttc::QoS::AtMostOnce,
            Quality::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
        }
    }
}

/// The six message kinds devices publish to the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundKind {
    Presence,
    CommandConfirm,
    ContainerConfirm,
    LogIngest,
    VitalIngest,
    DataIngest,
}

pub struct TopicSpec {
    pub kind: InboundKind,
    pub suffix: &'static str,
    pub quality: Quality,
}

/// Inbound registry, in declared match order.
pub const INBOUND_REGISTRY: &[TopicSpec] = &[
    TopicSpec {
        kind: InboundKind::Presence,
        suffix: "presence",
        quality: Quality::AtMostOnce,
    },
    TopicSpec {
        kind: InboundKind::CommandConfirm,
        suffix: "commands/confirm",
        quality: Quality::AtLeastOnce,
    },
    TopicSpec {
        kind: InboundKind::ContainerConfirm,
        suffix: "containers/confirm",
        quality: Quality::AtLeastOnce,
    },
    TopicSpec {
        kind: InboundKind::LogIngest,
        suffix: "logs/ingest",
        quality: Quality::AtLeastOnce,
    },
    TopicSpec {
        kind: InboundKind::VitalIngest,
        suffix: "vitals/ingest",
        quality: Quality::AtMostOnce,
    },
    TopicSpec {
        kind: InboundKind::DataIngest,
        suffix: "data/ingest",
        quality: Quality::AtLeastOnce,
    },
];

/// Subscription filters covering every registered inbound kind.
pub fn subscription_filters() -> impl Iterator<Item = (String, Quality)> {
    INBOUND_REGISTRY
        .iter()
        .map(|spec| (format!("+/+/{}", spec.suffix), spec.quality))
}

/// The five channels the cloud publishes on, per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundChannel {
    CommandsSend,
    ContainersConfig,
    LogsConfig,
    DataConfig,
    VitalsConfig,
}

impl OutboundChannel {
    pub fn suffix(self) -> &'static str {
        match self {
            OutboundChannel::CommandsSend => "commands/send",
            OutboundChannel::ContainersConfig => "containers/config",
            OutboundChannel::LogsConfig => "logs/config",
            OutboundChannel::DataConfig => "data/config",
            OutboundChannel::VitalsConfig => "vitals/config",
        }
    }
}

pub fn format_topic(tenant_id: &str, device_id: &str, channel: OutboundChannel) -> String {
    format!("{}/{}/{}", tenant_id, device_id, channel.suffix())
}

/// A parsed inbound address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAddress {
    pub tenant_id: String,
    pub device_id: String,
    pub suffix: String,
}

impl TopicAddress {
    /// Parse `{tenant_id}/{device_id}/{suffix}`. Rejects tenant segments of
    /// the wrong length and device segments failing the slug pattern.
    pub fn parse(topic: &str) -> Option<Self> {
        let mut parts = topic.splitn(3, '/');
        let tenant_id = parts.next()?;
        let device_id = parts.next()?;
        let suffix = parts.next()?;

        if tenant_id.len() != TENANT_ID_LEN || suffix.is_empty() {
            return None;
        }
        if !DEVICE_SLUG.is_match(device_id) {
            return None;
        }

        Some(Self {
            tenant_id: tenant_id.to_string(),
            device_id: device_id.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// First registry entry whose suffix matches, in declared order.
    pub fn matched_spec(&self) -> Option<&'static TopicSpec> {
        INBOUND_REGISTRY
            .iter()
            .find(|spec| spec.suffix == self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TENANT: &str = "0a651c10-6a1e-4f0f-9c3d-8b2f4e5a7d01";

    #[test]
    fn parses_registered_suffixes() {
        for spec in INBOUND_REGISTRY {
            let topic = format!("{}/robot-1/{}", TENANT, spec.suffix);
            let address = TopicAddress::parse(&topic).unwrap();
            assert_eq!(address.tenant_id, TENANT);
            assert_eq!(address.device_id, "robot-1");
            assert_eq!(address.matched_spec().unwrap().kind, spec.kind);
        }
    }

    #[test]
    fn rejects_bad_tenant_length() {
        assert!(TopicAddress::parse("short-tenant/robot-1/presence").is_none());
    }

    #[test]
    fn rejects_bad_device_slugs() {
        for slug in ["ab", "1robot", "has space", "way-way-way-too-long-for-a-device-slug"] {
            let topic = format!("{}/{}/presence", TENANT, slug);
            assert!(TopicAddress::parse(&topic).is_none(), "slug {slug:?}");
        }
    }

    #[test]
    fn unregistered_suffix_matches_nothing() {
        let topic = format!("{}/robot-1/firmware/upload", TENANT);
        let address = TopicAddress::parse(&topic).unwrap();
        assert!(address.matched_spec().is_none());
    }

    #[test]
    fn subscription_filters_cover_registry() {
        let filters: Vec<_> = subscription_filters().collect();
        assert_eq!(filters.len(), INBOUND_REGISTRY.len());
        assert!(filters
            .iter()
            .any(|(f, q)| f == "+/+/commands/confirm" && *q == Quality::AtLeastOnce));
        assert!(filters
            .iter()
            .any(|(f, q)| f == "+/+/presence" && *q == Quality::AtMostOnce));
    }

    #[test]
    fn outbound_topic_formatting() {
        assert_eq!(
            format_topic(TENANT, "robot-1", OutboundChannel::DataConfig),
            format!("{}/robot-1/data/config", TENANT)
        );
    }
}
