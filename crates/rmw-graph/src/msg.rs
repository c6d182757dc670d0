// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery message schema.
//!
//! These three types describe the payload exchanged on the dedicated
//! discovery topic owned by the hosting middleware. They are defined
//! structurally; the middleware picks the encoding (CDR, bincode, ...) so
//! the types only carry serde derives, no wire format of their own.

use crate::gid::GID_STORAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Wire form of a graph identifier: a fixed-size byte array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gid {
    /// Raw identifier bytes.
    pub data: [u8; GID_STORAGE_SIZE],
}

impl Default for Gid {
    fn default() -> Self {
        Self {
            data: [0; GID_STORAGE_SIZE],
        }
    }
}

/// One node and the endpoints it owns, as reported by its participant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntitiesInfo {
    /// Namespace the node was created in.
    pub node_namespace: String,
    /// Node name, unique together with the namespace within one participant.
    pub node_name: String,
    /// Gids of the data readers associated with the node.
    pub reader_gid_seq: Vec<Gid>,
    /// Gids of the data writers associated with the node.
    pub writer_gid_seq: Vec<Gid>,
}

/// Full node-entity state of one participant.
///
/// Peers apply this message wholesale: the receiver replaces its copy of the
/// participant's node list with `node_entities_info_seq`, never merges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntitiesInfo {
    /// Gid of the reporting participant.
    pub gid: Gid,
    /// All nodes owned by that participant.
    pub node_entities_info_seq: Vec<NodeEntitiesInfo>,
}
