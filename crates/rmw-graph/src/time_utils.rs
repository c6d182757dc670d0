// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clamping of durations to what DDS vendors can represent.
//!
//! DDS Duration and Time fields (DDS v1.4 section 2.3.2) carry 32-bit
//! seconds; middleware durations carry 64-bit seconds and may hold
//! unnormalized nanoseconds. Values headed for a vendor API go through
//! [`clamp_to_dds_time`] first.

use crate::qos::DdsDuration;

const SEC_TO_NS: u64 = 1_000_000_000;

/// Normalize and saturate a duration for a vendor 32-bit time field.
///
/// Nanoseconds are normalized below one second. When the total length
/// cannot be represented by DDS, the result saturates at `i32::MAX` seconds
/// plus `10^9 - 1` nanoseconds.
pub fn clamp_to_dds_time(time: DdsDuration) -> DdsDuration {
    let mut t = time;

    let int_max = i32::MAX as u64;
    let mut ns_sec_adjust = t.nsec / SEC_TO_NS;
    let mut overflow_nsec = false;
    let mut overflow_sec = false;

    if ns_sec_adjust > int_max {
        ns_sec_adjust = int_max;
        overflow_nsec = true;
    }

    if t.sec > int_max - ns_sec_adjust {
        t.sec = int_max;
        overflow_sec = true;
    } else {
        t.sec += ns_sec_adjust;
    }

    if overflow_nsec || overflow_sec {
        t.nsec = SEC_TO_NS - 1;
        log::debug!(
            "[time] duration cannot be represented by DDS, truncated at i32::MAX seconds + (10^9 - 1) nanoseconds"
        );
    } else {
        t.nsec -= ns_sec_adjust * SEC_TO_NS;
    }

    t
}
