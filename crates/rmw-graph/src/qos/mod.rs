// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profile model and negotiation services.
//!
//! A [`QosProfile`] bundles the policies that govern delivery of a single
//! endpoint. Each policy enum carries a `BestAvailable` variant: a *request*
//! sentinel asking the negotiation engine to pick the strongest policy that
//! is still compatible with the observed counterparties. Profiles holding
//! sentinels are statically distinguishable from concrete ones and must be
//! resolved (see [`best_available`]) before they reach the wire layer.
//!
//! # Services
//!
//! - [`compatibility`] - pairwise publisher/subscription diagnosis
//! - [`best_available`] - sentinel resolution against peer endpoint sets
//! - [`type_hash`] - `typehash` codec for the USER_DATA QoS byte string

/// Sentinel resolution against observed peer endpoints.
pub mod best_available;
/// Publisher/subscription compatibility diagnosis.
pub mod compatibility;
/// Type-hash codec for the USER_DATA QoS field.
pub mod type_hash;

pub use best_available::{
    qos_profile_get_best_available_for_publisher,
    qos_profile_get_best_available_for_subscription,
    qos_profile_get_best_available_for_topic_publisher,
    qos_profile_get_best_available_for_topic_subscription,
    qos_profile_update_best_available_for_services,
};
pub use compatibility::{qos_profile_check_compatible, QosCompatibility};
pub use type_hash::{
    encode_type_hash_for_user_data_qos, parse_type_hash_from_user_data, TypeHash, TYPE_HASH_SIZE,
};

/// Reliability policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ReliabilityPolicy {
    /// Implementation-specific default.
    #[default]
    SystemDefault,
    /// Guaranteed delivery with retransmission.
    Reliable,
    /// Fire-and-forget, samples may be dropped.
    BestEffort,
    /// Resolve to the strongest policy compatible with the observed peers.
    BestAvailable,
    /// Policy reported by a remote endpoint that this library cannot name.
    Unknown,
}

impl ReliabilityPolicy {
    /// Stable lowercase name, `None` for [`ReliabilityPolicy::Unknown`].
    pub fn to_str(self) -> Option<&'static str> {
        match self {
            Self::SystemDefault => Some("system_default"),
            Self::Reliable => Some("reliable"),
            Self::BestEffort => Some("best_effort"),
            Self::BestAvailable => Some("best_available"),
            Self::Unknown => None,
        }
    }
}

/// Durability policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DurabilityPolicy {
    /// Implementation-specific default.
    #[default]
    SystemDefault,
    /// Late joiners receive the writer's historical samples.
    TransientLocal,
    /// No samples are kept for late joiners.
    Volatile,
    /// Resolve to the strongest policy compatible with the observed peers.
    BestAvailable,
    /// Policy reported by a remote endpoint that this library cannot name.
    Unknown,
}

impl DurabilityPolicy {
    /// Stable lowercase name, `None` for [`DurabilityPolicy::Unknown`].
    pub fn to_str(self) -> Option<&'static str> {
        match self {
            Self::SystemDefault => Some("system_default"),
            Self::TransientLocal => Some("transient_local"),
            Self::Volatile => Some("volatile"),
            Self::BestAvailable => Some("best_available"),
            Self::Unknown => None,
        }
    }
}

/// Liveliness policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LivelinessPolicy {
    /// Implementation-specific default.
    #[default]
    SystemDefault,
    /// The middleware asserts liveliness on the writer's behalf.
    Automatic,
    /// The application must assert liveliness per topic.
    ManualByTopic,
    /// Resolve to the strongest policy compatible with the observed peers.
    BestAvailable,
    /// Policy reported by a remote endpoint that this library cannot name.
    Unknown,
}

impl LivelinessPolicy {
    /// Stable lowercase name, `None` for [`LivelinessPolicy::Unknown`].
    pub fn to_str(self) -> Option<&'static str> {
        match self {
            Self::SystemDefault => Some("system_default"),
            Self::Automatic => Some("automatic"),
            Self::ManualByTopic => Some("manual_by_topic"),
            Self::BestAvailable => Some("best_available"),
            Self::Unknown => None,
        }
    }
}

/// History policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Implementation-specific default.
    #[default]
    SystemDefault,
    /// Keep the most recent `depth` samples.
    KeepLast,
    /// Keep every sample within resource limits.
    KeepAll,
    /// Policy reported by a remote endpoint that this library cannot name.
    Unknown,
}

/// A span of time as `(seconds, nanoseconds)`.
///
/// Normalized values keep `nsec < 10^9`; [`crate::time_utils::clamp_to_dds_time`]
/// normalizes and saturates values headed for vendor 32-bit time fields.
/// Ordering is total and lexicographic over `(sec, nsec)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DdsDuration {
    /// Whole seconds.
    pub sec: u64,
    /// Nanoseconds.
    pub nsec: u64,
}

impl DdsDuration {
    /// Largest duration DDS can represent, used as "infinite".
    pub const INFINITE: DdsDuration = DdsDuration {
        sec: 9_223_372_036,
        nsec: 854_775_807,
    };

    /// Create a duration from seconds and nanoseconds.
    pub const fn new(sec: u64, nsec: u64) -> Self {
        Self { sec, nsec }
    }

    /// Create a duration from whole seconds.
    pub const fn from_secs(sec: u64) -> Self {
        Self { sec, nsec: 0 }
    }
}

/// A duration-valued QoS policy (deadline, lease duration, lifespan).
///
/// `Default` means "policy not set, use the infinite/system behavior";
/// `BestAvailable` is the negotiation sentinel. Only `Finite` values take
/// part in ordering comparisons during negotiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum QosDuration {
    /// Policy left at its default (no enforcement requested).
    #[default]
    Default,
    /// Resolve from the observed peer endpoints.
    BestAvailable,
    /// Concrete duration.
    Finite(DdsDuration),
}

impl QosDuration {
    /// Concrete duration, if this policy holds one.
    pub fn finite(self) -> Option<DdsDuration> {
        match self {
            Self::Finite(d) => Some(d),
            _ => None,
        }
    }
}

/// QoS profile: the policy bundle attached to every endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QosProfile {
    /// History policy (KeepLast or KeepAll).
    pub history: HistoryPolicy,
    /// Queue depth for KeepLast history.
    pub depth: usize,
    /// Reliability policy.
    pub reliability: ReliabilityPolicy,
    /// Durability policy.
    pub durability: DurabilityPolicy,
    /// Expected maximum time between samples.
    pub deadline: QosDuration,
    /// Maximum sample age before expiry.
    pub lifespan: QosDuration,
    /// Liveliness policy.
    pub liveliness: LivelinessPolicy,
    /// How long a writer stays "alive" after its last assertion.
    pub liveliness_lease_duration: QosDuration,
}

impl Default for QosProfile {
    /// The general-purpose topic profile: reliable, volatile, keep-last 10.
    fn default() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 10,
            reliability: ReliabilityPolicy::Reliable,
            durability: DurabilityPolicy::Volatile,
            deadline: QosDuration::Default,
            lifespan: QosDuration::Default,
            liveliness: LivelinessPolicy::SystemDefault,
            liveliness_lease_duration: QosDuration::Default,
        }
    }
}

impl QosProfile {
    /// Profile that defers every policy to the vendor defaults.
    pub fn system_default() -> Self {
        Self {
            history: HistoryPolicy::SystemDefault,
            depth: 0,
            reliability: ReliabilityPolicy::SystemDefault,
            durability: DurabilityPolicy::SystemDefault,
            ..Default::default()
        }
    }

    /// Well-known profile for service servers and clients.
    pub fn services_default() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 10,
            reliability: ReliabilityPolicy::Reliable,
            durability: DurabilityPolicy::Volatile,
            ..Default::default()
        }
    }

    /// Profile requesting negotiation for every negotiable policy.
    pub fn best_available() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 10,
            reliability: ReliabilityPolicy::BestAvailable,
            durability: DurabilityPolicy::BestAvailable,
            deadline: QosDuration::BestAvailable,
            lifespan: QosDuration::Default,
            liveliness: LivelinessPolicy::BestAvailable,
            liveliness_lease_duration: QosDuration::BestAvailable,
        }
    }

    /// Whether any policy still holds the `BestAvailable` sentinel.
    ///
    /// History, depth and lifespan are never negotiated, so only the five
    /// negotiable policies are inspected.
    pub fn has_best_available_policy(&self) -> bool {
        self.reliability == ReliabilityPolicy::BestAvailable
            || self.durability == DurabilityPolicy::BestAvailable
            || self.liveliness == LivelinessPolicy::BestAvailable
            || self.deadline == QosDuration::BestAvailable
            || self.liveliness_lease_duration == QosDuration::BestAvailable
    }
}
