// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record types stored in and produced by the graph cache.

use crate::gid::Gid;
use crate::msg;
use crate::qos::{QosProfile, TypeHash};

/// Discovery metadata of a single data writer or data reader.
///
/// Created on a discovery-add event, destroyed on the matching remove event,
/// immutable in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityInfo {
    /// Topic name in the vendor-mangled form seen on the wire.
    pub topic_name: String,
    /// Type name in the vendor-mangled form seen on the wire.
    pub topic_type: String,
    /// Hash of the type definition, zero when the peer did not announce one.
    pub topic_type_hash: TypeHash,
    /// Gid of the participant owning the endpoint. The participant may not
    /// be in the cache yet; discovery events arrive in any order.
    pub participant_gid: Gid,
    /// QoS the endpoint was created with.
    pub qos: QosProfile,
}

/// Per-participant state: security enclave plus the node list reported by
/// the participant's own discovery messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantInfo {
    /// Security/isolation domain label. Empty until the participant is added
    /// locally or the label is learned out of band.
    pub enclave: String,
    /// Nodes owned by the participant, in announcement order.
    pub node_entities_info_seq: Vec<msg::NodeEntitiesInfo>,
}

/// Which side of a topic an endpoint sits on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndpointKind {
    /// Data writer.
    Publisher,
    /// Data reader.
    Subscription,
}

/// Introspection output describing one endpoint on a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointInfo {
    /// Name of the owning node, or a placeholder (see module constants on
    /// [`crate::graph`]) when node membership has not converged.
    pub node_name: String,
    /// Namespace of the owning node, or a placeholder.
    pub node_namespace: String,
    /// Demangled type name.
    pub topic_type: String,
    /// Hash of the type definition, zero when unknown.
    pub topic_type_hash: TypeHash,
    /// Writer or reader.
    pub endpoint_kind: EndpointKind,
    /// Gid of the endpoint itself.
    pub endpoint_gid: Gid,
    /// QoS the endpoint was created with.
    pub qos: QosProfile,
}

/// Entry of [`crate::graph::GraphCache::get_node_names`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeName {
    /// Node name.
    pub name: String,
    /// Node namespace.
    pub namespace: String,
    /// Enclave of the owning participant.
    pub enclave: String,
}
