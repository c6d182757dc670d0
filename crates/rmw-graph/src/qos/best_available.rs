// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolution of `BestAvailable` QoS sentinels against observed peers.
//!
//! Subscription resolution is *conservative*: it matches the weakest
//! publisher so the subscription always connects. Publisher resolution is
//! *optimistic* for reliability and durability (offering more than asked is
//! always compatible) and conservative for deadline and lease duration (the
//! tightest request must be met). The asymmetry follows from the
//! compatibility table in [`super::compatibility`] and must be kept.
//!
//! Every function here is total over profiles containing sentinels: after a
//! resolution call, no `BestAvailable` remains in the touched policies.
//! History kind, depth and lifespan are never negotiated.

use super::{
    DdsDuration, DurabilityPolicy, LivelinessPolicy, QosDuration, QosProfile, ReliabilityPolicy,
};
use crate::graph::EndpointInfo;
use crate::Result;

/// Resolve a subscription profile against the publishers currently offering
/// the topic.
///
/// Rules, applied only to policies holding the `BestAvailable` sentinel:
/// - reliability: `Reliable` iff every publisher is reliable, else `BestEffort`
/// - durability: `TransientLocal` iff every publisher is transient local,
///   else `Volatile`
/// - liveliness: `ManualByTopic` iff every publisher is manual by topic,
///   else `Automatic`
/// - deadline / lease duration: `Default` iff every publisher left the
///   policy at its default, else the *largest* observed duration
///
/// An empty publisher set resolves every sentinel to the conservative branch
/// (best effort / volatile / automatic / default durations).
pub fn qos_profile_get_best_available_for_subscription(
    publishers_info: &[EndpointInfo],
    subscription_profile: &mut QosProfile,
) {
    let mut number_of_reliable = 0usize;
    let mut number_of_transient_local = 0usize;
    let mut number_of_manual_by_topic = 0usize;
    let mut use_default_deadline = true;
    let mut largest_deadline = DdsDuration::default();
    let mut use_default_lease = true;
    let mut largest_lease = DdsDuration::default();

    for info in publishers_info {
        let profile = &info.qos;
        if profile.reliability == ReliabilityPolicy::Reliable {
            number_of_reliable += 1;
        }
        if profile.durability == DurabilityPolicy::TransientLocal {
            number_of_transient_local += 1;
        }
        if profile.liveliness == LivelinessPolicy::ManualByTopic {
            number_of_manual_by_topic += 1;
        }
        if let Some(deadline) = profile.deadline.finite() {
            use_default_deadline = false;
            if largest_deadline < deadline {
                largest_deadline = deadline;
            }
        }
        if let Some(lease) = profile.liveliness_lease_duration.finite() {
            use_default_lease = false;
            if largest_lease < lease {
                largest_lease = lease;
            }
        }
    }

    // "All publishers" must not hold vacuously for an empty peer set.
    let all = |count: usize| !publishers_info.is_empty() && count == publishers_info.len();

    if subscription_profile.reliability == ReliabilityPolicy::BestAvailable {
        subscription_profile.reliability = if all(number_of_reliable) {
            ReliabilityPolicy::Reliable
        } else {
            ReliabilityPolicy::BestEffort
        };
    }

    if subscription_profile.durability == DurabilityPolicy::BestAvailable {
        subscription_profile.durability = if all(number_of_transient_local) {
            DurabilityPolicy::TransientLocal
        } else {
            DurabilityPolicy::Volatile
        };
    }

    if subscription_profile.liveliness == LivelinessPolicy::BestAvailable {
        subscription_profile.liveliness = if all(number_of_manual_by_topic) {
            LivelinessPolicy::ManualByTopic
        } else {
            LivelinessPolicy::Automatic
        };
    }

    if subscription_profile.deadline == QosDuration::BestAvailable {
        subscription_profile.deadline = if use_default_deadline {
            QosDuration::Default
        } else {
            QosDuration::Finite(largest_deadline)
        };
    }

    if subscription_profile.liveliness_lease_duration == QosDuration::BestAvailable {
        subscription_profile.liveliness_lease_duration = if use_default_lease {
            QosDuration::Default
        } else {
            QosDuration::Finite(largest_lease)
        };
    }
}

/// Resolve a publisher profile against the subscriptions currently requesting
/// the topic.
///
/// Reliability and durability resolve to `Reliable`/`TransientLocal`
/// unconditionally: both are compatible with every subscription and give the
/// highest service level. Liveliness resolves to `ManualByTopic` if *any*
/// subscription requires it. Deadline and lease duration resolve to the
/// *smallest* observed duration, or `Default` when every subscription left
/// the policy defaulted.
pub fn qos_profile_get_best_available_for_publisher(
    subscriptions_info: &[EndpointInfo],
    publisher_profile: &mut QosProfile,
) {
    if publisher_profile.reliability == ReliabilityPolicy::BestAvailable {
        publisher_profile.reliability = ReliabilityPolicy::Reliable;
    }
    if publisher_profile.durability == DurabilityPolicy::BestAvailable {
        publisher_profile.durability = DurabilityPolicy::TransientLocal;
    }

    let mut use_manual_by_topic = false;
    let mut use_default_deadline = true;
    let mut smallest_deadline = DdsDuration::INFINITE;
    let mut use_default_lease = true;
    let mut smallest_lease = DdsDuration::INFINITE;

    for info in subscriptions_info {
        let profile = &info.qos;
        if profile.liveliness == LivelinessPolicy::ManualByTopic {
            use_manual_by_topic = true;
        }
        if let Some(deadline) = profile.deadline.finite() {
            use_default_deadline = false;
            if deadline < smallest_deadline {
                smallest_deadline = deadline;
            }
        }
        if let Some(lease) = profile.liveliness_lease_duration.finite() {
            use_default_lease = false;
            if lease < smallest_lease {
                smallest_lease = lease;
            }
        }
    }

    if publisher_profile.liveliness == LivelinessPolicy::BestAvailable {
        publisher_profile.liveliness = if use_manual_by_topic {
            LivelinessPolicy::ManualByTopic
        } else {
            LivelinessPolicy::Automatic
        };
    }

    if publisher_profile.deadline == QosDuration::BestAvailable {
        publisher_profile.deadline = if use_default_deadline {
            QosDuration::Default
        } else {
            QosDuration::Finite(smallest_deadline)
        };
    }

    if publisher_profile.liveliness_lease_duration == QosDuration::BestAvailable {
        publisher_profile.liveliness_lease_duration = if use_default_lease {
            QosDuration::Default
        } else {
            QosDuration::Finite(smallest_lease)
        };
    }
}

/// Resolve a subscription profile for `topic_name`, enumerating the peer
/// publishers through `get_endpoint_info`.
///
/// A no-op when the profile holds no sentinel. `get_endpoint_info` receives
/// the node handle, the topic name and a `no_mangle` flag (always `false`
/// here: topic names go through the middleware's usual mangling); any error
/// it returns is propagated.
pub fn qos_profile_get_best_available_for_topic_subscription<N>(
    node: &N,
    topic_name: &str,
    qos_profile: &mut QosProfile,
    get_endpoint_info: impl Fn(&N, &str, bool) -> Result<Vec<EndpointInfo>>,
) -> Result<()> {
    if qos_profile.has_best_available_policy() {
        let publishers_info = get_endpoint_info(node, topic_name, false)?;
        qos_profile_get_best_available_for_subscription(&publishers_info, qos_profile);
    }
    Ok(())
}

/// Resolve a publisher profile for `topic_name`, enumerating the peer
/// subscriptions through `get_endpoint_info`.
///
/// Counterpart of [`qos_profile_get_best_available_for_topic_subscription`].
pub fn qos_profile_get_best_available_for_topic_publisher<N>(
    node: &N,
    topic_name: &str,
    qos_profile: &mut QosProfile,
    get_endpoint_info: impl Fn(&N, &str, bool) -> Result<Vec<EndpointInfo>>,
) -> Result<()> {
    if qos_profile.has_best_available_policy() {
        let subscriptions_info = get_endpoint_info(node, topic_name, false)?;
        qos_profile_get_best_available_for_publisher(&subscriptions_info, qos_profile);
    }
    Ok(())
}

/// Replace `BestAvailable` policies with the services default profile.
///
/// Service and client endpoints never consult peers; the well-known services
/// profile is substituted field by field instead.
pub fn qos_profile_update_best_available_for_services(qos_profile: &QosProfile) -> QosProfile {
    let services = QosProfile::services_default();
    let mut result = *qos_profile;
    if result.reliability == ReliabilityPolicy::BestAvailable {
        result.reliability = services.reliability;
    }
    if result.durability == DurabilityPolicy::BestAvailable {
        result.durability = services.durability;
    }
    if result.liveliness == LivelinessPolicy::BestAvailable {
        result.liveliness = services.liveliness;
    }
    if result.deadline == QosDuration::BestAvailable {
        result.deadline = services.deadline;
    }
    if result.liveliness_lease_duration == QosDuration::BestAvailable {
        result.liveliness_lease_duration = services.liveliness_lease_duration;
    }
    result
}
