// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent projection of the distributed discovery graph.
//!
//! The [`GraphCache`] ingests three independent event streams and keeps them
//! consistent under one lock:
//!
//! - vendor discovery events for data writers, data readers and participants
//!   (any callback thread),
//! - peer-reported [`crate::msg::ParticipantEntitiesInfo`] messages that
//!   overlay node-level structure (listener thread),
//! - local node lifecycle and endpoint association calls, which return the
//!   fresh participant state for the hosting middleware to broadcast.
//!
//! Discovery streams converge eventually, not atomically: an endpoint can be
//! observed before its participant, and node membership can lag behind
//! endpoint discovery. The cache accepts every ordering and tags
//! not-yet-reconciled endpoints with the placeholder names below instead of
//! failing introspection queries.

mod endpoint;

pub use endpoint::{EndpointInfo, EndpointKind, EntityInfo, NodeName, ParticipantInfo};

use crate::gid::Gid;
use crate::msg;
use crate::qos::{QosProfile, TypeHash};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Node name reported for an endpoint whose participant is known but whose
/// node membership has not been learned yet.
pub const NODE_NAME_UNKNOWN: &str = "_NODE_NAME_UNKNOWN_";
/// Namespace companion of [`NODE_NAME_UNKNOWN`].
pub const NODE_NAMESPACE_UNKNOWN: &str = "_NODE_NAMESPACE_UNKNOWN_";
/// Name and namespace reported for an endpoint owned by a participant the
/// cache has never heard of: a plain DDS application outside the framework.
pub const CREATED_BY_BARE_DDS_APP: &str = "_CREATED_BY_BARE_DDS_APP_";

/// Topic name to the set of types seen on it, demangled.
pub type NamesAndTypes = BTreeMap<String, BTreeSet<String>>;

type OnChangeCallback = Box<dyn FnMut() + Send>;

#[derive(Default)]
struct GraphCacheState {
    data_writers: BTreeMap<Gid, EntityInfo>,
    data_readers: BTreeMap<Gid, EntityInfo>,
    participants: BTreeMap<Gid, ParticipantInfo>,
    on_change: Option<OnChangeCallback>,
}

/// Outcome of resolving an endpoint to the node that owns it.
enum NodeLookup<'a> {
    /// The endpoint is claimed by a node of a known participant.
    InNode(&'a msg::NodeEntitiesInfo),
    /// The participant is known but no node claims the endpoint yet.
    Undiscovered,
    /// The participant itself is unknown to the cache.
    BareDdsParticipant,
}

impl GraphCacheState {
    fn notify(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback();
        }
    }

    fn entities(&self, kind: EndpointKind) -> &BTreeMap<Gid, EntityInfo> {
        match kind {
            EndpointKind::Publisher => &self.data_writers,
            EndpointKind::Subscription => &self.data_readers,
        }
    }

    /// Locate the node owning `endpoint_gid` within `participant_gid`.
    fn lookup_node(
        &self,
        participant_gid: &Gid,
        endpoint_gid: &Gid,
        kind: EndpointKind,
    ) -> NodeLookup<'_> {
        let Some(participant) = self.participants.get(participant_gid) else {
            return NodeLookup::BareDdsParticipant;
        };
        let wire_gid = endpoint_gid.to_msg();
        for node in &participant.node_entities_info_seq {
            let gid_seq = match kind {
                EndpointKind::Publisher => &node.writer_gid_seq,
                EndpointKind::Subscription => &node.reader_gid_seq,
            };
            if gid_seq.contains(&wire_gid) {
                return NodeLookup::InNode(node);
            }
        }
        NodeLookup::Undiscovered
    }
}

fn participant_info_message(gid: Gid, info: &ParticipantInfo) -> msg::ParticipantEntitiesInfo {
    msg::ParticipantEntitiesInfo {
        gid: gid.to_msg(),
        node_entities_info_seq: info.node_entities_info_seq.clone(),
    }
}

fn collect_names_and_types(
    entities: &BTreeMap<Gid, EntityInfo>,
    demangle_topic: &dyn Fn(&str) -> String,
    demangle_type: &dyn Fn(&str) -> String,
    topics: &mut NamesAndTypes,
) {
    for info in entities.values() {
        let topic_name = demangle_topic(&info.topic_name);
        if topic_name.is_empty() {
            continue;
        }
        topics
            .entry(topic_name)
            .or_default()
            .insert(demangle_type(&info.topic_type));
    }
}

/// Thread-safe store of discovered writers, readers and participants.
///
/// One mutex guards the whole state; every public operation, queries
/// included, holds it for its full duration. Coarse locking keeps the
/// cross-map reverse lookup of the endpoint-info queries atomic without any
/// lock ordering discipline. The change callback fires while the lock is
/// held: callbacks must be short and must not call back into the cache.
pub struct GraphCache {
    state: Mutex<GraphCacheState>,
}

impl GraphCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GraphCacheState::default()),
        }
    }

    /// Register the callback invoked after every observable state change.
    ///
    /// Replaces any previously registered callback. The callback runs
    /// synchronously with the cache lock held; re-entering the cache from it
    /// deadlocks.
    pub fn set_on_change_callback<F>(&self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        let mut state = self.state.lock();
        state.on_change = Some(Box::new(callback));
    }

    /// Drop the change callback, if any.
    pub fn clear_on_change_callback(&self) {
        let mut state = self.state.lock();
        state.on_change = None;
    }

    /// Record a discovered data writer.
    ///
    /// Idempotent: returns `false` (and stays silent) when `gid` is already
    /// present. Legacy callers without type-hash support pass
    /// [`TypeHash::zero`].
    pub fn add_writer(
        &self,
        gid: Gid,
        topic_name: &str,
        type_name: &str,
        type_hash: TypeHash,
        participant_gid: Gid,
        qos: QosProfile,
    ) -> bool {
        let mut state = self.state.lock();
        let inserted = match state.data_writers.entry(gid) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(EntityInfo {
                    topic_name: topic_name.to_string(),
                    topic_type: type_name.to_string(),
                    topic_type_hash: type_hash,
                    participant_gid,
                    qos,
                });
                true
            }
        };
        if inserted {
            log::debug!("[graph] writer {} added on '{}'", gid, topic_name);
            state.notify();
        }
        inserted
    }

    /// Record a discovered data reader. See [`GraphCache::add_writer`].
    pub fn add_reader(
        &self,
        gid: Gid,
        topic_name: &str,
        type_name: &str,
        type_hash: TypeHash,
        participant_gid: Gid,
        qos: QosProfile,
    ) -> bool {
        let mut state = self.state.lock();
        let inserted = match state.data_readers.entry(gid) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(EntityInfo {
                    topic_name: topic_name.to_string(),
                    topic_type: type_name.to_string(),
                    topic_type_hash: type_hash,
                    participant_gid,
                    qos,
                });
                true
            }
        };
        if inserted {
            log::debug!("[graph] reader {} added on '{}'", gid, topic_name);
            state.notify();
        }
        inserted
    }

    /// Dispatch to [`GraphCache::add_reader`] or [`GraphCache::add_writer`].
    #[allow(clippy::too_many_arguments)] // mirrors the middleware discovery callback signature
    pub fn add_entity(
        &self,
        gid: Gid,
        topic_name: &str,
        type_name: &str,
        type_hash: TypeHash,
        participant_gid: Gid,
        qos: QosProfile,
        is_reader: bool,
    ) -> bool {
        if is_reader {
            self.add_reader(gid, topic_name, type_name, type_hash, participant_gid, qos)
        } else {
            self.add_writer(gid, topic_name, type_name, type_hash, participant_gid, qos)
        }
    }

    /// Forget a data writer. Returns whether a record was removed.
    pub fn remove_writer(&self, gid: &Gid) -> bool {
        let mut state = self.state.lock();
        let removed = state.data_writers.remove(gid).is_some();
        if removed {
            log::debug!("[graph] writer {} removed", gid);
            state.notify();
        }
        removed
    }

    /// Forget a data reader. Returns whether a record was removed.
    pub fn remove_reader(&self, gid: &Gid) -> bool {
        let mut state = self.state.lock();
        let removed = state.data_readers.remove(gid).is_some();
        if removed {
            log::debug!("[graph] reader {} removed", gid);
            state.notify();
        }
        removed
    }

    /// Dispatch to [`GraphCache::remove_reader`] or [`GraphCache::remove_writer`].
    pub fn remove_entity(&self, gid: &Gid, is_reader: bool) -> bool {
        if is_reader {
            self.remove_reader(gid)
        } else {
            self.remove_writer(gid)
        }
    }

    /// Record a participant, or update the enclave of a known one.
    ///
    /// An existing node list is preserved: a participant may have been
    /// created lazily by a peer message before the local add arrived.
    pub fn add_participant(&self, participant_gid: Gid, enclave: &str) -> bool {
        let mut state = self.state.lock();
        let changed = match state.participants.entry(participant_gid) {
            Entry::Vacant(slot) => {
                slot.insert(ParticipantInfo {
                    enclave: enclave.to_string(),
                    node_entities_info_seq: Vec::new(),
                });
                true
            }
            Entry::Occupied(mut entry) => {
                if entry.get().enclave == enclave {
                    false
                } else {
                    entry.get_mut().enclave = enclave.to_string();
                    true
                }
            }
        };
        if changed {
            log::debug!(
                "[graph] participant {} added (enclave '{}')",
                participant_gid,
                enclave
            );
            state.notify();
        }
        changed
    }

    /// Forget a participant. Endpoint records owned by it are left alone;
    /// they are torn down by their own discovery-remove events.
    pub fn remove_participant(&self, participant_gid: &Gid) -> bool {
        let mut state = self.state.lock();
        let removed = state.participants.remove(participant_gid).is_some();
        if removed {
            log::debug!("[graph] participant {} removed", participant_gid);
            state.notify();
        }
        removed
    }

    /// Apply a peer-reported participant state.
    ///
    /// Creates the participant lazily (empty enclave, to be filled by a
    /// later [`GraphCache::add_participant`]) and replaces its node list
    /// wholesale; peer messages are authoritative for node membership and
    /// are never merged. Returns whether the cache changed; a repeated
    /// identical message is a no-op and does not fire the change callback.
    pub fn update_participant_entities(&self, info: &msg::ParticipantEntitiesInfo) -> bool {
        let gid = Gid::from_msg(&info.gid);
        let mut state = self.state.lock();
        let changed = match state.participants.entry(gid) {
            Entry::Vacant(slot) => {
                log::debug!("[graph] participant {} learned from peer message", gid);
                slot.insert(ParticipantInfo {
                    enclave: String::new(),
                    node_entities_info_seq: info.node_entities_info_seq.clone(),
                });
                true
            }
            Entry::Occupied(mut entry) => {
                if entry.get().node_entities_info_seq == info.node_entities_info_seq {
                    false
                } else {
                    entry.get_mut().node_entities_info_seq = info.node_entities_info_seq.clone();
                    true
                }
            }
        };
        if changed {
            state.notify();
        }
        changed
    }

    /// Add a node to a local participant and return the participant's full
    /// state for broadcasting.
    ///
    /// The participant entry is created on demand; `(name, namespace)` is
    /// expected to be unique within the participant, which is the caller's
    /// contract to uphold.
    pub fn add_node(
        &self,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
    ) -> msg::ParticipantEntitiesInfo {
        let mut state = self.state.lock();
        let participant = state.participants.entry(participant_gid).or_default();
        participant.node_entities_info_seq.push(msg::NodeEntitiesInfo {
            node_namespace: node_namespace.to_string(),
            node_name: node_name.to_string(),
            ..Default::default()
        });
        let message = participant_info_message(participant_gid, participant);
        state.notify();
        message
    }

    /// Remove a node from a local participant and return the participant's
    /// full state for broadcasting.
    pub fn remove_node(
        &self,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
    ) -> msg::ParticipantEntitiesInfo {
        let mut state = self.state.lock();
        let (message, changed) = match state.participants.get_mut(&participant_gid) {
            Some(participant) => {
                let before = participant.node_entities_info_seq.len();
                participant.node_entities_info_seq.retain(|node| {
                    node.node_name != node_name || node.node_namespace != node_namespace
                });
                let changed = participant.node_entities_info_seq.len() != before;
                (participant_info_message(participant_gid, participant), changed)
            }
            None => {
                log::warn!(
                    "[graph] remove_node for unknown participant {}",
                    participant_gid
                );
                (
                    participant_info_message(participant_gid, &ParticipantInfo::default()),
                    false,
                )
            }
        };
        if changed {
            state.notify();
        }
        message
    }

    /// Shared body of the associate/dissociate operations: find the node and
    /// let `mutate` edit it, reporting whether anything changed.
    fn modify_node_info(
        &self,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
        mutate: impl FnOnce(&mut msg::NodeEntitiesInfo) -> bool,
    ) -> msg::ParticipantEntitiesInfo {
        let mut state = self.state.lock();
        let (message, changed) = match state.participants.get_mut(&participant_gid) {
            Some(participant) => {
                let node = participant.node_entities_info_seq.iter_mut().find(|node| {
                    node.node_name == node_name && node.node_namespace == node_namespace
                });
                let changed = match node {
                    Some(node) => mutate(node),
                    None => {
                        log::warn!(
                            "[graph] node '{}' ns '{}' not found in participant {}",
                            node_name,
                            node_namespace,
                            participant_gid
                        );
                        false
                    }
                };
                (participant_info_message(participant_gid, participant), changed)
            }
            None => {
                log::warn!(
                    "[graph] endpoint association for unknown participant {}",
                    participant_gid
                );
                (
                    participant_info_message(participant_gid, &ParticipantInfo::default()),
                    false,
                )
            }
        };
        if changed {
            state.notify();
        }
        message
    }

    /// Claim a data writer for a node; returns the participant state to
    /// broadcast.
    pub fn associate_writer(
        &self,
        writer_gid: Gid,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
    ) -> msg::ParticipantEntitiesInfo {
        self.modify_node_info(participant_gid, node_name, node_namespace, |node| {
            node.writer_gid_seq.push(writer_gid.to_msg());
            true
        })
    }

    /// Release a data writer from a node; returns the participant state to
    /// broadcast.
    pub fn dissociate_writer(
        &self,
        writer_gid: Gid,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
    ) -> msg::ParticipantEntitiesInfo {
        let wire_gid = writer_gid.to_msg();
        self.modify_node_info(participant_gid, node_name, node_namespace, move |node| {
            match node.writer_gid_seq.iter().position(|gid| *gid == wire_gid) {
                Some(index) => {
                    node.writer_gid_seq.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Claim a data reader for a node; returns the participant state to
    /// broadcast.
    pub fn associate_reader(
        &self,
        reader_gid: Gid,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
    ) -> msg::ParticipantEntitiesInfo {
        self.modify_node_info(participant_gid, node_name, node_namespace, |node| {
            node.reader_gid_seq.push(reader_gid.to_msg());
            true
        })
    }

    /// Release a data reader from a node; returns the participant state to
    /// broadcast.
    pub fn dissociate_reader(
        &self,
        reader_gid: Gid,
        participant_gid: Gid,
        node_name: &str,
        node_namespace: &str,
    ) -> msg::ParticipantEntitiesInfo {
        let wire_gid = reader_gid.to_msg();
        self.modify_node_info(participant_gid, node_name, node_namespace, move |node| {
            match node.reader_gid_seq.iter().position(|gid| *gid == wire_gid) {
                Some(index) => {
                    node.reader_gid_seq.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Number of data writers on `topic_name` (exact, mangled form).
    pub fn get_writer_count(&self, topic_name: &str) -> usize {
        let state = self.state.lock();
        state
            .data_writers
            .values()
            .filter(|info| info.topic_name == topic_name)
            .count()
    }

    /// Number of data readers on `topic_name` (exact, mangled form).
    pub fn get_reader_count(&self, topic_name: &str) -> usize {
        let state = self.state.lock();
        state
            .data_readers
            .values()
            .filter(|info| info.topic_name == topic_name)
            .count()
    }

    fn endpoint_info_by_topic(
        &self,
        topic_name: &str,
        kind: EndpointKind,
        demangle_type: &dyn Fn(&str) -> String,
    ) -> Vec<EndpointInfo> {
        let state = self.state.lock();
        state
            .entities(kind)
            .iter()
            .filter(|(_, info)| info.topic_name == topic_name)
            .map(|(gid, info)| {
                let (node_name, node_namespace) =
                    match state.lookup_node(&info.participant_gid, gid, kind) {
                        NodeLookup::InNode(node) => {
                            (node.node_name.clone(), node.node_namespace.clone())
                        }
                        NodeLookup::Undiscovered => (
                            NODE_NAME_UNKNOWN.to_string(),
                            NODE_NAMESPACE_UNKNOWN.to_string(),
                        ),
                        NodeLookup::BareDdsParticipant => (
                            CREATED_BY_BARE_DDS_APP.to_string(),
                            CREATED_BY_BARE_DDS_APP.to_string(),
                        ),
                    };
                EndpointInfo {
                    node_name,
                    node_namespace,
                    topic_type: demangle_type(&info.topic_type),
                    topic_type_hash: info.topic_type_hash,
                    endpoint_kind: kind,
                    endpoint_gid: *gid,
                    qos: info.qos,
                }
            })
            .collect()
    }

    /// Describe every data writer on `topic_name`, resolving each to its
    /// owning node (or a placeholder while discovery converges).
    pub fn get_writers_info_by_topic(
        &self,
        topic_name: &str,
        demangle_type: impl Fn(&str) -> String,
    ) -> Vec<EndpointInfo> {
        self.endpoint_info_by_topic(topic_name, EndpointKind::Publisher, &demangle_type)
    }

    /// Describe every data reader on `topic_name`. See
    /// [`GraphCache::get_writers_info_by_topic`].
    pub fn get_readers_info_by_topic(
        &self,
        topic_name: &str,
        demangle_type: impl Fn(&str) -> String,
    ) -> Vec<EndpointInfo> {
        self.endpoint_info_by_topic(topic_name, EndpointKind::Subscription, &demangle_type)
    }

    /// Map every known topic to the set of types seen on it, across readers
    /// and writers. Entries whose demangled topic name is empty are filtered
    /// out (the demangler's way of saying "not one of mine").
    pub fn get_names_and_types(
        &self,
        demangle_topic: impl Fn(&str) -> String,
        demangle_type: impl Fn(&str) -> String,
    ) -> NamesAndTypes {
        let state = self.state.lock();
        let mut topics = NamesAndTypes::new();
        collect_names_and_types(&state.data_readers, &demangle_topic, &demangle_type, &mut topics);
        collect_names_and_types(&state.data_writers, &demangle_topic, &demangle_type, &mut topics);
        topics
    }

    fn names_and_types_by_node(
        &self,
        kind: EndpointKind,
        node_name: &str,
        node_namespace: &str,
        demangle_topic: &dyn Fn(&str) -> String,
        demangle_type: &dyn Fn(&str) -> String,
    ) -> Result<NamesAndTypes> {
        let state = self.state.lock();
        let node = state
            .participants
            .values()
            .flat_map(|participant| participant.node_entities_info_seq.iter())
            .find(|node| node.node_name == node_name && node.node_namespace == node_namespace)
            .ok_or(Error::NodeNameNonExistent)?;
        let gid_seq = match kind {
            EndpointKind::Publisher => &node.writer_gid_seq,
            EndpointKind::Subscription => &node.reader_gid_seq,
        };
        let entities = state.entities(kind);
        let mut topics = NamesAndTypes::new();
        for wire_gid in gid_seq {
            let Some(info) = entities.get(&Gid::from_msg(wire_gid)) else {
                // Endpoint discovery has not caught up with the peer message.
                continue;
            };
            let topic_name = demangle_topic(&info.topic_name);
            if topic_name.is_empty() {
                continue;
            }
            topics
                .entry(topic_name)
                .or_default()
                .insert(demangle_type(&info.topic_type));
        }
        Ok(topics)
    }

    /// Topics-and-types written by one node, located across all participants.
    ///
    /// Fails with [`Error::NodeNameNonExistent`] when no participant reports
    /// such a node.
    pub fn get_writer_names_and_types_by_node(
        &self,
        node_name: &str,
        node_namespace: &str,
        demangle_topic: impl Fn(&str) -> String,
        demangle_type: impl Fn(&str) -> String,
    ) -> Result<NamesAndTypes> {
        self.names_and_types_by_node(
            EndpointKind::Publisher,
            node_name,
            node_namespace,
            &demangle_topic,
            &demangle_type,
        )
    }

    /// Topics-and-types read by one node. See
    /// [`GraphCache::get_writer_names_and_types_by_node`].
    pub fn get_reader_names_and_types_by_node(
        &self,
        node_name: &str,
        node_namespace: &str,
        demangle_topic: impl Fn(&str) -> String,
        demangle_type: impl Fn(&str) -> String,
    ) -> Result<NamesAndTypes> {
        self.names_and_types_by_node(
            EndpointKind::Subscription,
            node_name,
            node_namespace,
            &demangle_topic,
            &demangle_type,
        )
    }

    /// Total node count across all participants.
    pub fn get_number_of_nodes(&self) -> usize {
        let state = self.state.lock();
        state
            .participants
            .values()
            .map(|participant| participant.node_entities_info_seq.len())
            .sum()
    }

    /// Every known node with its namespace and its participant's enclave,
    /// ordered by participant gid then announcement order within each
    /// participant.
    pub fn get_node_names(&self) -> Vec<NodeName> {
        let state = self.state.lock();
        let mut names = Vec::with_capacity(
            state
                .participants
                .values()
                .map(|p| p.node_entities_info_seq.len())
                .sum(),
        );
        for participant in state.participants.values() {
            for node in &participant.node_entities_info_seq {
                names.push(NodeName {
                    name: node.node_name.clone(),
                    namespace: node.node_namespace.clone(),
                    enclave: participant.enclave.clone(),
                });
            }
        }
        names
    }
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphCache {
    /// Human-readable dump of the whole cache. Takes the cache lock; do not
    /// format a cache from inside its own change callback.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        writeln!(f, "---------------------------------")?;
        writeln!(f, "Graph cache:")?;
        writeln!(f, "  Discovered data writers:")?;
        for (gid, info) in &state.data_writers {
            writeln!(
                f,
                "    gid: '{}', topic name: '{}', topic_type: '{}'",
                gid, info.topic_name, info.topic_type
            )?;
        }
        writeln!(f, "  Discovered data readers:")?;
        for (gid, info) in &state.data_readers {
            writeln!(
                f,
                "    gid: '{}', topic name: '{}', topic_type: '{}'",
                gid, info.topic_name, info.topic_type
            )?;
        }
        writeln!(f, "  Discovered participants:")?;
        for (gid, participant) in &state.participants {
            writeln!(f, "    gid: '{}'", gid)?;
            writeln!(f, "    enclave: '{}'", participant.enclave)?;
            writeln!(f, "    nodes:")?;
            for node in &participant.node_entities_info_seq {
                writeln!(
                    f,
                    "      namespace: '{}' name: '{}'",
                    node.node_namespace, node.node_name
                )?;
                writeln!(f, "      associated data readers gids:")?;
                for gid in &node.reader_gid_seq {
                    writeln!(f, "        {}", Gid::from_msg(gid))?;
                }
                writeln!(f, "      associated data writers gids:")?;
                for gid in &node.writer_gid_seq {
                    writeln!(f, "        {}", Gid::from_msg(gid))?;
                }
            }
        }
        writeln!(f, "---------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn gid(seed: u8) -> Gid {
        let mut data = [0u8; crate::gid::GID_STORAGE_SIZE];
        data[0] = seed;
        Gid::from_bytes(data)
    }

    fn identity(s: &str) -> String {
        s.to_string()
    }

    fn add_sample_writer(cache: &GraphCache, writer: Gid, participant: Gid) -> bool {
        cache.add_writer(
            writer,
            "/chatter",
            "std/String",
            TypeHash::zero(),
            participant,
            QosProfile::default(),
        )
    }

    #[test]
    fn test_add_writer_is_idempotent() {
        let cache = GraphCache::new();
        assert!(add_sample_writer(&cache, gid(1), gid(100)));
        assert!(!add_sample_writer(&cache, gid(1), gid(100)));
        assert_eq!(cache.get_writer_count("/chatter"), 1);
    }

    #[test]
    fn test_remove_writer_reports_presence() {
        let cache = GraphCache::new();
        add_sample_writer(&cache, gid(1), gid(100));
        assert!(cache.remove_writer(&gid(1)));
        assert!(!cache.remove_writer(&gid(1)));
        assert_eq!(cache.get_writer_count("/chatter"), 0);
    }

    #[test]
    fn test_add_entity_dispatches_on_kind() {
        let cache = GraphCache::new();
        assert!(cache.add_entity(
            gid(1),
            "/t",
            "T",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
            true,
        ));
        assert_eq!(cache.get_reader_count("/t"), 1);
        assert_eq!(cache.get_writer_count("/t"), 0);
        assert!(cache.remove_entity(&gid(1), true));
        assert_eq!(cache.get_reader_count("/t"), 0);
    }

    #[test]
    fn test_writer_and_reader_maps_are_disjoint() {
        let cache = GraphCache::new();
        assert!(cache.add_writer(
            gid(1),
            "/t",
            "T",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        ));
        // Same gid in the reader map is a distinct record.
        assert!(cache.add_reader(
            gid(1),
            "/t",
            "T",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        ));
        assert_eq!(cache.get_writer_count("/t"), 1);
        assert_eq!(cache.get_reader_count("/t"), 1);
    }

    #[test]
    fn test_add_participant_preserves_nodes() {
        let cache = GraphCache::new();
        cache.add_node(gid(100), "talker", "/");
        assert!(cache.add_participant(gid(100), "enclave_a"));
        assert_eq!(cache.get_number_of_nodes(), 1);
        let names = cache.get_node_names();
        assert_eq!(names[0].enclave, "enclave_a");
    }

    #[test]
    fn test_add_participant_same_enclave_is_noop() {
        let cache = GraphCache::new();
        assert!(cache.add_participant(gid(100), "enc"));
        assert!(!cache.add_participant(gid(100), "enc"));
        assert!(cache.add_participant(gid(100), "other"));
    }

    #[test]
    fn test_remove_participant_leaves_endpoints() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        add_sample_writer(&cache, gid(1), gid(100));
        assert!(cache.remove_participant(&gid(100)));
        assert!(!cache.remove_participant(&gid(100)));
        assert_eq!(cache.get_writer_count("/chatter"), 1);
    }

    #[test]
    fn test_update_participant_entities_replaces_wholesale() {
        let cache = GraphCache::new();
        let first = msg::ParticipantEntitiesInfo {
            gid: gid(100).to_msg(),
            node_entities_info_seq: vec![
                msg::NodeEntitiesInfo {
                    node_name: "a".to_string(),
                    ..Default::default()
                },
                msg::NodeEntitiesInfo {
                    node_name: "b".to_string(),
                    ..Default::default()
                },
            ],
        };
        assert!(cache.update_participant_entities(&first));
        assert_eq!(cache.get_number_of_nodes(), 2);

        let second = msg::ParticipantEntitiesInfo {
            gid: gid(100).to_msg(),
            node_entities_info_seq: vec![msg::NodeEntitiesInfo {
                node_name: "c".to_string(),
                ..Default::default()
            }],
        };
        assert!(cache.update_participant_entities(&second));
        let names = cache.get_node_names();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].name, "c");

        // Identical repeat is a no-op.
        assert!(!cache.update_participant_entities(&second));
    }

    #[test]
    fn test_update_participant_entities_preserves_enclave() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "secure");
        let message = msg::ParticipantEntitiesInfo {
            gid: gid(100).to_msg(),
            node_entities_info_seq: vec![msg::NodeEntitiesInfo {
                node_name: "n".to_string(),
                ..Default::default()
            }],
        };
        cache.update_participant_entities(&message);
        assert_eq!(cache.get_node_names()[0].enclave, "secure");
    }

    #[test]
    fn test_local_mutations_return_live_state() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        let after_add = cache.add_node(gid(100), "talker", "/");
        assert_eq!(after_add.node_entities_info_seq.len(), 1);

        let after_assoc = cache.associate_writer(gid(1), gid(100), "talker", "/");
        assert_eq!(
            after_assoc.node_entities_info_seq[0].writer_gid_seq,
            vec![gid(1).to_msg()]
        );

        // Feeding the broadcast message into a fresh cache reproduces state.
        let other = GraphCache::new();
        other.update_participant_entities(&after_assoc);
        let replayed = other.associate_reader(gid(2), gid(100), "talker", "/");
        assert_eq!(replayed.node_entities_info_seq[0].writer_gid_seq.len(), 1);
        assert_eq!(replayed.node_entities_info_seq[0].reader_gid_seq.len(), 1);

        let after_dissoc = cache.dissociate_writer(gid(1), gid(100), "talker", "/");
        assert!(after_dissoc.node_entities_info_seq[0].writer_gid_seq.is_empty());

        let after_remove = cache.remove_node(gid(100), "talker", "/");
        assert!(after_remove.node_entities_info_seq.is_empty());
    }

    #[test]
    fn test_dissociate_unknown_gid_is_noop() {
        let cache = GraphCache::new();
        cache.add_node(gid(100), "talker", "/");
        let message = cache.dissociate_writer(gid(9), gid(100), "talker", "/");
        assert!(message.node_entities_info_seq[0].writer_gid_seq.is_empty());
    }

    #[test]
    fn test_change_callback_counts_state_changes() {
        let cache = GraphCache::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        cache.set_on_change_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(add_sample_writer(&cache, gid(1), gid(100))); // fires
        assert!(!add_sample_writer(&cache, gid(1), gid(100))); // no-op
        assert!(cache.remove_writer(&gid(1))); // fires
        assert!(!cache.remove_writer(&gid(1))); // no-op
        assert!(cache.add_participant(gid(100), "enc")); // fires
        assert!(!cache.add_participant(gid(100), "enc")); // no-op
        cache.add_node(gid(100), "n", "/"); // fires
        assert!(cache.remove_participant(&gid(100))); // fires

        assert_eq!(count.load(Ordering::SeqCst), 5);

        cache.clear_on_change_callback();
        add_sample_writer(&cache, gid(2), gid(100));
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_callback_replacement() {
        let cache = GraphCache::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&first);
        cache.set_on_change_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&second);
        cache.set_on_change_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        add_sample_writer(&cache, gid(1), gid(100));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reverse_lookup_in_node() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        add_sample_writer(&cache, gid(1), gid(100));
        cache.add_node(gid(100), "talker", "/");
        cache.associate_writer(gid(1), gid(100), "talker", "/");

        let infos = cache.get_writers_info_by_topic("/chatter", identity);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].node_name, "talker");
        assert_eq!(infos[0].node_namespace, "/");
        assert_eq!(infos[0].endpoint_kind, EndpointKind::Publisher);
        assert_eq!(infos[0].endpoint_gid, gid(1));
    }

    #[test]
    fn test_reverse_lookup_undiscovered_node() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        add_sample_writer(&cache, gid(1), gid(100));

        let infos = cache.get_writers_info_by_topic("/chatter", identity);
        assert_eq!(infos[0].node_name, NODE_NAME_UNKNOWN);
        assert_eq!(infos[0].node_namespace, NODE_NAMESPACE_UNKNOWN);
    }

    #[test]
    fn test_reverse_lookup_bare_dds_participant() {
        let cache = GraphCache::new();
        add_sample_writer(&cache, gid(1), gid(100));

        let infos = cache.get_writers_info_by_topic("/chatter", identity);
        assert_eq!(infos[0].node_name, CREATED_BY_BARE_DDS_APP);
        assert_eq!(infos[0].node_namespace, CREATED_BY_BARE_DDS_APP);
    }

    #[test]
    fn test_readers_info_checks_reader_gid_seq() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        cache.add_reader(
            gid(2),
            "/chatter",
            "std/String",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );
        cache.add_node(gid(100), "listener", "/");
        cache.associate_reader(gid(2), gid(100), "listener", "/");

        let infos = cache.get_readers_info_by_topic("/chatter", identity);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].node_name, "listener");
        assert_eq!(infos[0].endpoint_kind, EndpointKind::Subscription);
    }

    #[test]
    fn test_names_and_types_unions_readers_and_writers() {
        let cache = GraphCache::new();
        cache.add_writer(
            gid(1),
            "/chatter",
            "std/String",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );
        cache.add_reader(
            gid(2),
            "/chatter",
            "std/WString",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );
        cache.add_reader(
            gid(3),
            "/scan",
            "sensor/LaserScan",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );

        let topics = cache.get_names_and_types(identity, identity);
        assert_eq!(topics.len(), 2);
        assert_eq!(topics["/chatter"].len(), 2);
        assert!(topics["/chatter"].contains("std/String"));
        assert!(topics["/chatter"].contains("std/WString"));
        assert!(topics["/scan"].contains("sensor/LaserScan"));
    }

    #[test]
    fn test_names_and_types_filters_empty_demangled_topic() {
        let cache = GraphCache::new();
        cache.add_writer(
            gid(1),
            "rt/chatter",
            "std/String",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );
        cache.add_writer(
            gid(2),
            "rq/internal",
            "svc/Request",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );

        let only_topics = |name: &str| -> String {
            name.strip_prefix("rt/")
                .map(|rest| format!("/{}", rest))
                .unwrap_or_default()
        };
        let topics = cache.get_names_and_types(only_topics, identity);
        assert_eq!(topics.len(), 1);
        assert!(topics.contains_key("/chatter"));
    }

    #[test]
    fn test_names_and_types_by_node() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        cache.add_writer(
            gid(1),
            "/chatter",
            "std/String",
            TypeHash::zero(),
            gid(100),
            QosProfile::default(),
        );
        cache.add_node(gid(100), "talker", "/");
        cache.associate_writer(gid(1), gid(100), "talker", "/");

        let topics = cache
            .get_writer_names_and_types_by_node("talker", "/", identity, identity)
            .unwrap();
        assert_eq!(topics.len(), 1);
        assert!(topics["/chatter"].contains("std/String"));

        let none = cache
            .get_reader_names_and_types_by_node("talker", "/", identity, identity)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_names_and_types_by_unknown_node_fails() {
        let cache = GraphCache::new();
        let result = cache.get_writer_names_and_types_by_node("ghost", "/", identity, identity);
        assert!(matches!(result, Err(Error::NodeNameNonExistent)));
    }

    #[test]
    fn test_by_node_skips_unconverged_endpoint_gids() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        cache.add_node(gid(100), "talker", "/");
        // Associated but never discovered on the DDS plane.
        cache.associate_writer(gid(9), gid(100), "talker", "/");

        let topics = cache
            .get_writer_names_and_types_by_node("talker", "/", identity, identity)
            .unwrap();
        assert!(topics.is_empty());
    }

    #[test]
    fn test_node_counting_across_participants() {
        let cache = GraphCache::new();
        cache.add_node(gid(100), "a", "/");
        cache.add_node(gid(100), "b", "/ns");
        cache.add_node(gid(101), "c", "/");
        assert_eq!(cache.get_number_of_nodes(), 3);

        let names = cache.get_node_names();
        assert_eq!(names.len(), 3);
        // Participants iterate in gid order.
        assert_eq!(names[0].name, "a");
        assert_eq!(names[1].name, "b");
        assert_eq!(names[1].namespace, "/ns");
        assert_eq!(names[2].name, "c");
    }

    #[test]
    fn test_display_dump_layout() {
        let cache = GraphCache::new();
        cache.add_participant(gid(100), "enc");
        add_sample_writer(&cache, gid(1), gid(100));
        cache.add_node(gid(100), "talker", "/");
        cache.associate_writer(gid(1), gid(100), "talker", "/");

        let dump = cache.to_string();
        assert!(dump.contains("Graph cache:"));
        assert!(dump.contains("Discovered data writers:"));
        assert!(dump.contains("topic name: '/chatter'"));
        assert!(dump.contains("Discovered data readers:"));
        assert!(dump.contains("enclave: 'enc'"));
        assert!(dump.contains("namespace: '/' name: 'talker'"));
        assert!(dump.contains("associated data writers gids:"));
    }

    #[test]
    fn test_queries_under_concurrent_mutation() {
        let cache = Arc::new(GraphCache::new());
        let writer_cache = Arc::clone(&cache);
        let writer = std::thread::spawn(move || {
            for i in 0..100u8 {
                writer_cache.add_writer(
                    gid(i),
                    "/chatter",
                    "std/String",
                    TypeHash::zero(),
                    gid(200),
                    QosProfile::default(),
                );
            }
        });
        let reader_cache = Arc::clone(&cache);
        let reader = std::thread::spawn(move || {
            for _ in 0..100 {
                let _ = reader_cache.get_writer_count("/chatter");
                let _ = reader_cache.get_names_and_types(|s| s.to_string(), |s| s.to_string());
            }
        });
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(cache.get_writer_count("/chatter"), 100);
    }
}
