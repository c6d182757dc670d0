// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publisher/subscription QoS compatibility diagnosis.
//!
//! Implements the request-vs-offered decision table used to warn users about
//! endpoint pairs that will never match, or that may not match depending on
//! how the vendor resolves `system_default`/`unknown` policies.
//!
//! | Publisher | Subscription | Verdict |
//! |-----------|--------------|---------|
//! | best effort | reliable | Error |
//! | volatile | transient local | Error |
//! | no deadline | deadline | Error |
//! | deadline d1 | deadline d2 < d1 | Error |
//! | automatic liveliness | manual by topic | Error |
//! | no lease | lease | Error |
//! | lease l1 | lease l2 < l1 | Error |
//! | unknown on either side of a demanding policy | | Warning |
//!
//! Warnings are only recorded while the verdict is still [`QosCompatibility::Ok`].

use super::{DurabilityPolicy, LivelinessPolicy, QosDuration, QosProfile, ReliabilityPolicy};

/// Verdict of a pairwise compatibility check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QosCompatibility {
    /// The endpoints will match.
    Ok,
    /// Matching depends on how unknown/system-default policies resolve.
    Warning,
    /// The endpoints will never match.
    Error,
}

fn append_reason(reason: &mut Option<&mut String>, fragment: &str) {
    if let Some(buf) = reason.as_mut() {
        buf.push_str(fragment);
    }
}

fn reliability_unknown(policy: ReliabilityPolicy) -> bool {
    matches!(
        policy,
        ReliabilityPolicy::SystemDefault | ReliabilityPolicy::Unknown
    )
}

fn durability_unknown(policy: DurabilityPolicy) -> bool {
    matches!(
        policy,
        DurabilityPolicy::SystemDefault | DurabilityPolicy::Unknown
    )
}

fn liveliness_unknown(policy: LivelinessPolicy) -> bool {
    matches!(
        policy,
        LivelinessPolicy::SystemDefault | LivelinessPolicy::Unknown
    )
}

/// Check whether a publisher profile and a subscription profile can match.
///
/// Every reason fragment appended to `reason` is `;`-terminated. When
/// `reason` is `None` the diagnosis still runs, only the text is skipped.
///
/// The verdict is [`QosCompatibility::Error`] as soon as one definite
/// incompatibility row fires; warning rows are evaluated only when no error
/// has been recorded.
pub fn qos_profile_check_compatible(
    publisher_qos: &QosProfile,
    subscription_qos: &QosProfile,
    mut reason: Option<&mut String>,
) -> QosCompatibility {
    if let Some(buf) = reason.as_mut() {
        buf.clear();
    }

    // Presume compatible until proven otherwise.
    let mut compatibility = QosCompatibility::Ok;

    // Best effort publisher and reliable subscription
    if publisher_qos.reliability == ReliabilityPolicy::BestEffort
        && subscription_qos.reliability == ReliabilityPolicy::Reliable
    {
        compatibility = QosCompatibility::Error;
        append_reason(
            &mut reason,
            "ERROR: Best effort publisher and reliable subscription;",
        );
    }

    // Volatile publisher and transient local subscription
    if publisher_qos.durability == DurabilityPolicy::Volatile
        && subscription_qos.durability == DurabilityPolicy::TransientLocal
    {
        compatibility = QosCompatibility::Error;
        append_reason(
            &mut reason,
            "ERROR: Volatile publisher and transient local subscription;",
        );
    }

    let pub_deadline = publisher_qos.deadline;
    let sub_deadline = subscription_qos.deadline;

    // No deadline for publisher and deadline for subscription
    if pub_deadline == QosDuration::Default && sub_deadline != QosDuration::Default {
        compatibility = QosCompatibility::Error;
        append_reason(
            &mut reason,
            "ERROR: Subscription has a deadline, but publisher does not;",
        );
    }

    // Subscription deadline is less than publisher deadline
    if let (Some(pub_d), Some(sub_d)) = (pub_deadline.finite(), sub_deadline.finite()) {
        if sub_d < pub_d {
            compatibility = QosCompatibility::Error;
            append_reason(
                &mut reason,
                "ERROR: Subscription deadline is less than publisher deadline;",
            );
        }
    }

    // Automatic liveliness for publisher and manual by topic for subscription
    if publisher_qos.liveliness == LivelinessPolicy::Automatic
        && subscription_qos.liveliness == LivelinessPolicy::ManualByTopic
    {
        compatibility = QosCompatibility::Error;
        append_reason(
            &mut reason,
            "ERROR: Publisher's liveliness is automatic and subscription's is manual by topic;",
        );
    }

    let pub_lease = publisher_qos.liveliness_lease_duration;
    let sub_lease = subscription_qos.liveliness_lease_duration;

    // No lease duration for publisher and lease duration for subscription
    if pub_lease == QosDuration::Default && sub_lease != QosDuration::Default {
        compatibility = QosCompatibility::Error;
        append_reason(
            &mut reason,
            "ERROR: Subscription has a liveliness lease duration, but publisher does not;",
        );
    }

    // Subscription lease duration is less than publisher lease duration
    if let (Some(pub_l), Some(sub_l)) = (pub_lease.finite(), sub_lease.finite()) {
        if sub_l < pub_l {
            compatibility = QosCompatibility::Error;
            append_reason(
                &mut reason,
                "ERROR: Subscription liveliness lease duration is less than publisher;",
            );
        }
    }

    // Only check for warnings if there are no errors
    if compatibility == QosCompatibility::Ok {
        let pub_reliability_unknown = reliability_unknown(publisher_qos.reliability);
        let sub_reliability_unknown = reliability_unknown(subscription_qos.reliability);
        let pub_durability_unknown = durability_unknown(publisher_qos.durability);
        let sub_durability_unknown = durability_unknown(subscription_qos.durability);
        let pub_liveliness_unknown = liveliness_unknown(publisher_qos.liveliness);
        let sub_liveliness_unknown = liveliness_unknown(subscription_qos.liveliness);

        let pub_reliability_str = publisher_qos.reliability.to_str().unwrap_or("unknown");
        let sub_reliability_str = subscription_qos.reliability.to_str().unwrap_or("unknown");
        let pub_durability_str = publisher_qos.durability.to_str().unwrap_or("unknown");
        let sub_durability_str = subscription_qos.durability.to_str().unwrap_or("unknown");
        let pub_liveliness_str = publisher_qos.liveliness.to_str().unwrap_or("unknown");
        let sub_liveliness_str = subscription_qos.liveliness.to_str().unwrap_or("unknown");

        // Reliability warnings
        if pub_reliability_unknown && sub_reliability_unknown {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Publisher reliability is {} and subscription reliability is {};",
                    pub_reliability_str, sub_reliability_str
                ),
            );
        } else if pub_reliability_unknown
            && subscription_qos.reliability == ReliabilityPolicy::Reliable
        {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Reliable subscription, but publisher is {};",
                    pub_reliability_str
                ),
            );
        } else if publisher_qos.reliability == ReliabilityPolicy::BestEffort
            && sub_reliability_unknown
        {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Best effort publisher, but subscription is {};",
                    sub_reliability_str
                ),
            );
        }

        // Durability warnings
        if pub_durability_unknown && sub_durability_unknown {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Publisher durability is {} and subscription durability is {};",
                    pub_durability_str, sub_durability_str
                ),
            );
        } else if pub_durability_unknown
            && subscription_qos.durability == DurabilityPolicy::TransientLocal
        {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Transient local subscription, but publisher is {};",
                    pub_durability_str
                ),
            );
        } else if publisher_qos.durability == DurabilityPolicy::Volatile && sub_durability_unknown {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Volatile publisher, but subscription is {};",
                    sub_durability_str
                ),
            );
        }

        // Liveliness warnings
        if pub_liveliness_unknown && sub_liveliness_unknown {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Publisher liveliness is {} and subscription liveliness is {};",
                    pub_liveliness_str, sub_liveliness_str
                ),
            );
        } else if pub_liveliness_unknown
            && subscription_qos.liveliness == LivelinessPolicy::ManualByTopic
        {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Subscription's liveliness is manual by topic, but publisher's is {};",
                    pub_liveliness_str
                ),
            );
        } else if publisher_qos.liveliness == LivelinessPolicy::Automatic && sub_liveliness_unknown
        {
            compatibility = QosCompatibility::Warning;
            append_reason(
                &mut reason,
                &format!(
                    "WARNING: Publisher's liveliness is automatic, but subscription's is {};",
                    sub_liveliness_str
                ),
            );
        }
    }

    compatibility
}
