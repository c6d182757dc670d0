// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-participant context shared by DDS-based middleware implementations.
//!
//! A [`Context`] bundles everything the hosting middleware needs around one
//! DDS participant: its gid, the handles of the discovery-topic publisher
//! and subscription it advertises on, the shared [`GraphCache`], the mutex
//! serializing mutate-then-publish sequences, and the listener worker that
//! drains peer [`msg::ParticipantEntitiesInfo`] samples into the cache.
//!
//! The listener consumes a [`crossbeam_channel::Receiver`]; the middleware's
//! discovery-topic reader callback pushes each received sample into the
//! matching sender. Dropping the sender, or dropping the context, ends the
//! worker.

use crate::gid::Gid;
use crate::graph::GraphCache;
use crate::msg;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::JoinHandle;

struct DiscoveryListener {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Base state a DDS-based middleware keeps per participant.
///
/// `P` and `S` are the vendor handles of the discovery-topic publisher and
/// subscription; this crate never touches them, it only keeps them alive
/// alongside the cache they feed.
pub struct Context<P, S> {
    /// Gid of the local participant.
    pub gid: Gid,
    /// Vendor handle publishing `ParticipantEntitiesInfo` updates to peers.
    pub publisher: P,
    /// Vendor handle receiving `ParticipantEntitiesInfo` updates from peers.
    pub subscription: S,
    graph_cache: Arc<GraphCache>,
    node_update_mutex: Mutex<()>,
    listener: Option<DiscoveryListener>,
}

impl<P, S> Context<P, S> {
    /// Create a context with a fresh, empty graph cache.
    pub fn new(gid: Gid, publisher: P, subscription: S) -> Self {
        Self {
            gid,
            publisher,
            subscription,
            graph_cache: Arc::new(GraphCache::new()),
            node_update_mutex: Mutex::new(()),
            listener: None,
        }
    }

    /// Shared handle to the graph cache.
    #[must_use]
    pub fn graph_cache(&self) -> Arc<GraphCache> {
        Arc::clone(&self.graph_cache)
    }

    /// Serialize a local mutate-then-publish sequence.
    ///
    /// Hold the returned guard from the cache mutation until the resulting
    /// `ParticipantEntitiesInfo` has been handed to the publisher, so peers
    /// never observe two local updates out of order.
    pub fn lock_node_update(&self) -> MutexGuard<'_, ()> {
        self.node_update_mutex.lock()
    }

    /// Start the discovery listener worker.
    ///
    /// The worker applies every message from `updates` to the cache until
    /// the sender side disconnects or the context shuts down. Starting a new
    /// listener stops a previous one first.
    pub fn start_listener(&mut self, updates: Receiver<msg::ParticipantEntitiesInfo>) {
        self.stop_listener();
        let cache = Arc::clone(&self.graph_cache);
        let (shutdown, shutdown_rx) = bounded::<()>(0);
        let handle = std::thread::spawn(move || listener_loop(&cache, &updates, &shutdown_rx));
        self.listener = Some(DiscoveryListener { shutdown, handle });
    }

    /// Stop the discovery listener worker and wait for it to exit.
    ///
    /// A no-op when no listener is running.
    pub fn stop_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            drop(listener.shutdown);
            if listener.handle.join().is_err() {
                log::error!("[context] discovery listener thread panicked");
            }
        }
    }

    /// Whether the listener worker is currently running.
    #[must_use]
    pub fn listener_is_running(&self) -> bool {
        self.listener.is_some()
    }
}

impl<P, S> Drop for Context<P, S> {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

fn listener_loop(
    cache: &GraphCache,
    updates: &Receiver<msg::ParticipantEntitiesInfo>,
    shutdown: &Receiver<()>,
) {
    log::debug!("[context] discovery listener started");
    loop {
        crossbeam_channel::select! {
            recv(updates) -> message => match message {
                Ok(info) => {
                    cache.update_participant_entities(&info);
                }
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
        }
    }
    log::debug!("[context] discovery listener stopped");
}
