// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rmw-graph - shared graph machinery for DDS-based ROS 2 middlewares
//!
//! Every DDS-based implementation of the ROS 2 middleware interface has to
//! answer the same questions: which nodes exist on the network, which
//! publishers and subscriptions they own, which types flow on which topics,
//! and which QoS profile a new endpoint should pick to actually match its
//! peers. This crate is the reusable answer, layered on top of whatever
//! discovery primitives the DDS vendor exposes.
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                    Hosting middleware (rmw layer)                  |
//! |  vendor discovery callbacks | discovery-topic reader | user calls  |
//! +--------------------------------------------------------------------+
//! |                             rmw-graph                              |
//! |  GraphCache (writers/readers/participants, change notification)    |
//! |  QoS negotiation (compatibility check, best-available resolution)  |
//! |  Discovery message schema | Gid | Context holder                   |
//! +--------------------------------------------------------------------+
//! |                          DDS vendor SDK                            |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GraphCache`] | Concurrent store of the discovered compute graph |
//! | [`Gid`] | Opaque 24-byte endpoint/participant identifier |
//! | [`msg::ParticipantEntitiesInfo`] | Peer-to-peer node membership message |
//! | [`QosProfile`] | Policy bundle, including `BestAvailable` sentinels |
//! | [`Context`] | Participant gid + cache + discovery listener worker |
//!
//! ## Quick Start
//!
//! ```rust
//! use rmw_graph::{GraphCache, Gid, QosProfile, TypeHash};
//!
//! let cache = GraphCache::new();
//! let participant = Gid::from_bytes([1; 24]);
//! let writer = Gid::from_bytes([2; 24]);
//!
//! cache.add_participant(participant, "enclave");
//! cache.add_writer(
//!     writer,
//!     "/chatter",
//!     "std_msgs::msg::dds_::String_",
//!     TypeHash::zero(),
//!     participant,
//!     QosProfile::default(),
//! );
//! let message = cache.add_node(participant, "talker", "/");
//! // `message` is broadcast to peers by the hosting middleware.
//! assert_eq!(message.node_entities_info_seq.len(), 1);
//! ```

/// Context holder bundling the participant gid, the cache and the
/// discovery listener worker.
pub mod context;
/// Opaque graph identifiers.
pub mod gid;
/// Graph cache: discovered writers, readers, participants and nodes.
pub mod graph;
/// Discovery message schema (structural, serde-carried).
pub mod msg;
/// QoS profile model, compatibility diagnosis and sentinel resolution.
pub mod qos;
/// Security file lookup for participant enclaves.
pub mod security;
/// Clamping helpers for vendor 32-bit DDS time fields.
pub mod time_utils;

pub use context::Context;
pub use gid::{Gid, GID_STORAGE_SIZE};
pub use graph::{
    EndpointInfo, EndpointKind, EntityInfo, GraphCache, NamesAndTypes, NodeName, ParticipantInfo,
};
pub use qos::{
    DdsDuration, DurabilityPolicy, HistoryPolicy, LivelinessPolicy, QosCompatibility, QosDuration,
    QosProfile, ReliabilityPolicy, TypeHash,
};

use std::fmt;

/// Errors returned by graph and QoS operations.
///
/// The C middleware interface reports null arguments and allocation failures
/// as separate statuses; both are unrepresentable here (ownership and
/// `Option` take their place), so the remaining variants are genuine runtime
/// conditions.
#[derive(Debug)]
pub enum Error {
    /// A by-node query named a node no participant reports.
    NodeNameNonExistent,
    /// A `typehash` announcement could not be parsed.
    InvalidTypeHash(String),
    /// A middleware-supplied callable failed (e.g. endpoint enumeration).
    Middleware(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NodeNameNonExistent => write!(f, "node name/namespace not found"),
            Error::InvalidTypeHash(msg) => write!(f, "invalid type hash: {}", msg),
            Error::Middleware(msg) => write!(f, "middleware error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
