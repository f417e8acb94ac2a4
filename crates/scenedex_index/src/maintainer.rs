//! The single writer of the indices.
//!
//! The maintainer subscribes to every [`EventKind`] on a [`ChangeBus`]; the
//! bus handlers only forward events into the maintainer's inbox. Events are
//! applied when the inbox is drained, which every query path does first, so
//! a query always observes every event emitted before it.
//!
//! Events that mention an entity the maintainer has not seen created yet are
//! parked under that entity and replayed when its creation arrives. This
//! makes out-of-order bulk loads converge without an error.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use scenedex_foundation::{ComponentType, EntityId, Error, Result};
use scenedex_storage::{ChangeBus, ChangeEvent, EventKind, SceneSource, Subscription};

use crate::config::{BulkLoadStrategy, MaintainerConfig};
use crate::indices::Indices;
use crate::query::{IndexView, QueryFacade};
use crate::shared::IndexSnapshot;

// =============================================================================
// Reports
// =============================================================================

/// Outcome of draining the inbox.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Events applied (including those parked for later).
    pub applied: usize,
    /// Events rejected; the indices kept their prior state for each.
    pub rejected: usize,
    /// Events dropped unapplied because a terminal-rebuild load is running.
    pub discarded: usize,
    /// Why each rejected event was rejected, in arrival order.
    pub errors: Vec<Error>,
}

impl DrainReport {
    /// Returns the number of events taken out of the inbox.
    #[must_use]
    pub fn total(&self) -> usize {
        self.applied + self.rejected + self.discarded
    }

    /// Returns true if nothing was pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Outcome of a full rebuild.
#[derive(Debug)]
pub struct RebuildReport {
    /// Live entities indexed.
    pub entities: usize,
    /// Parent links indexed.
    pub links: usize,
    /// Component memberships indexed.
    pub memberships: usize,
    /// Pending events dropped because the source already reflects them.
    pub discarded_events: usize,
    /// Inconsistencies found in the source. Each one was skipped.
    pub diagnostics: Vec<Error>,
    /// Wall time spent rebuilding.
    pub elapsed: Duration,
}

/// Why the maintainer suspects its indices no longer match the store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StaleReason {
    /// Nothing is indexed but the store has live entities.
    EmptyIndex,
    /// Indexed and live entity counts disagree.
    CountMismatch,
    /// Parked events were dropped after the parking bound was hit.
    DeferralOverflow,
    /// An event the store already applied was rejected here.
    RejectedEvent,
}

/// Internal signal that a rebuild is warranted. Never an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaleIndexSuspected {
    /// What triggered the suspicion.
    pub reason: StaleReason,
    /// Entities in the index.
    pub indexed: usize,
    /// Entities the store reports live.
    pub live: usize,
}

// =============================================================================
// IndexMaintainer
// =============================================================================

/// An event waiting for an entity, stamped with its arrival sequence.
#[derive(Debug)]
struct Parked {
    seq: u64,
    event: ChangeEvent,
}

/// Owns the indices and keeps them in step with the change bus.
pub struct IndexMaintainer {
    config: MaintainerConfig,
    indices: Indices,

    inbox_tx: Sender<ChangeEvent>,
    inbox: Receiver<ChangeEvent>,
    subscriptions: Vec<Subscription>,

    /// missing entity -> events waiting for its creation, in arrival order.
    deferred: HashMap<EntityId, Vec<Parked>>,
    deferred_len: usize,
    overflowed: bool,
    /// child -> arrival sequence of the link currently indexed for it.
    link_seq: HashMap<EntityId, u64>,
    /// Set when an event was rejected; cleared by a rebuild or clear.
    diverged: bool,
    arrivals: u64,

    loading: bool,
    applied: u64,
    /// Bumped on every state change; tags published snapshots.
    version: u64,
}

impl Default for IndexMaintainer {
    fn default() -> Self {
        Self::new(MaintainerConfig::default())
    }
}

impl IndexMaintainer {
    /// Creates a detached maintainer with empty indices.
    #[must_use]
    pub fn new(config: MaintainerConfig) -> Self {
        let (inbox_tx, inbox) = crossbeam_channel::unbounded();
        Self {
            indices: Indices::new(config.max_hierarchy_depth),
            config,
            inbox_tx,
            inbox,
            subscriptions: Vec::new(),
            deferred: HashMap::new(),
            deferred_len: 0,
            overflowed: false,
            link_seq: HashMap::new(),
            diverged: false,
            arrivals: 0,
            loading: false,
            applied: 0,
            version: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MaintainerConfig {
        &self.config
    }

    /// Returns the current indices without draining.
    #[must_use]
    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    /// Returns the number of events applied since creation.
    #[must_use]
    pub fn applied_events(&self) -> u64 {
        self.applied
    }

    /// Returns the number of parked events.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred_len
    }

    /// Returns the number of events waiting in the inbox.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Returns the state version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to every event kind on `bus`.
    ///
    /// Any previous subscriptions are released first, so attaching twice
    /// never delivers an event twice.
    pub fn attach(&mut self, bus: &ChangeBus) {
        self.detach();
        for kind in EventKind::ALL {
            let tx = self.inbox_tx.clone();
            let subscription = bus.on(kind, move |event| {
                // The receiver lives as long as the maintainer, which owns
                // this subscription.
                tx.send(event.clone()).ok();
            });
            self.subscriptions.push(subscription);
        }
        debug!("attached to change bus ({} kinds)", self.subscriptions.len());
    }

    /// Releases every subscription. Returns how many were released.
    ///
    /// Events already in the inbox are kept and applied on the next drain.
    pub fn detach(&mut self) -> usize {
        let released = self.subscriptions.len();
        self.subscriptions.clear();
        if released > 0 {
            debug!("detached from change bus ({released} subscriptions released)");
        }
        released
    }

    /// Returns true while subscribed to a bus.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    // =========================================================================
    // Applying Events
    // =========================================================================

    /// Applies every event waiting in the inbox, in arrival order.
    ///
    /// A rejected event leaves the indices as they were and does not stop the
    /// drain.
    pub fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        let discard = self.loading && self.config.bulk_load == BulkLoadStrategy::TerminalRebuild;

        while let Ok(event) = self.inbox.try_recv() {
            if discard {
                report.discarded += 1;
                continue;
            }
            match self.apply(&event) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!("rejected {} event: {err}", event.kind());
                    report.rejected += 1;
                    report.errors.push(err);
                }
            }
        }
        report
    }

    /// Applies a single event.
    ///
    /// Events about entities that are not live yet are parked, which counts
    /// as success.
    ///
    /// # Errors
    ///
    /// Returns `CycleDetected` or `HierarchyTooDeep` if a creation or
    /// reparent would break the hierarchy. The indices are unchanged in that
    /// case, and the next staleness check reports
    /// [`StaleReason::RejectedEvent`].
    pub fn apply(&mut self, event: &ChangeEvent) -> Result<()> {
        self.arrivals += 1;
        if let Err(err) = self.apply_event(event, self.arrivals) {
            self.diverged = true;
            return Err(err);
        }
        self.applied += 1;
        self.version += 1;
        Ok(())
    }

    fn apply_event(&mut self, event: &ChangeEvent, seq: u64) -> Result<()> {
        match *event {
            ChangeEvent::EntityCreated { id, parent } => self.on_created(id, parent, seq),
            ChangeEvent::EntityDeleted { id } => {
                self.on_deleted(id);
                Ok(())
            }
            ChangeEvent::EntitiesCleared => {
                self.on_cleared();
                Ok(())
            }
            ChangeEvent::ComponentAdded { entity, component } => {
                self.on_component(event, seq, entity, component, true);
                Ok(())
            }
            ChangeEvent::ComponentRemoved { entity, component } => {
                self.on_component(event, seq, entity, component, false);
                Ok(())
            }
            ChangeEvent::ParentChanged { id, new_parent } => {
                self.on_parent_changed(event, seq, id, new_parent)
            }
            ChangeEvent::ComponentTypeRegistered { component } => {
                self.indices.components.register_type(component);
                Ok(())
            }
        }
    }

    fn on_created(&mut self, id: EntityId, parent: Option<EntityId>, seq: u64) -> Result<()> {
        // Nothing is modified until the link is known to be valid.
        match parent {
            Some(p) if p == id => {
                return Err(Error::cycle_detected(id, p).with_context("applying entity-created"));
            }
            Some(p) if self.indices.entities.contains(p) => self
                .indices
                .hierarchy
                .check_can_parent(id, p)
                .map_err(|err| err.with_context("applying entity-created"))?,
            _ => {}
        }

        self.indices.entities.insert(id);
        self.indices.hierarchy.insert_root(id);
        match parent {
            Some(p) if self.indices.entities.contains(p) => {
                self.indices.hierarchy.set_parent(id, Some(p))?;
            }
            Some(p) => self.defer(
                p,
                seq,
                ChangeEvent::ParentChanged {
                    id,
                    new_parent: Some(p),
                },
            ),
            None => {}
        }
        self.link_seq.insert(id, seq);

        self.replay(id, seq);
        Ok(())
    }

    fn on_deleted(&mut self, id: EntityId) {
        self.discard_parked(id);
        self.link_seq.remove(&id);
        if !self.indices.entities.contains(id) {
            return;
        }

        let mut removed = self
            .indices
            .hierarchy
            .remove_entity(id, self.config.deletion_policy);
        if removed.is_empty() {
            removed.push(id);
        }
        for victim in removed {
            self.indices.components.remove_entity_everywhere(victim);
            self.indices.entities.remove(victim);
            if victim != id {
                self.discard_parked(victim);
                self.link_seq.remove(&victim);
            }
        }
    }

    fn on_cleared(&mut self) {
        self.indices.clear();
        self.deferred.clear();
        self.deferred_len = 0;
        self.overflowed = false;
        self.link_seq.clear();
        self.diverged = false;
    }

    fn on_component(
        &mut self,
        event: &ChangeEvent,
        seq: u64,
        entity: EntityId,
        component: ComponentType,
        added: bool,
    ) {
        if !self.indices.entities.contains(entity) {
            self.defer(entity, seq, event.clone());
        } else if added {
            self.indices.components.on_add(component, entity);
        } else {
            self.indices.components.on_remove(component, entity);
        }
    }

    fn on_parent_changed(
        &mut self,
        event: &ChangeEvent,
        seq: u64,
        id: EntityId,
        new_parent: Option<EntityId>,
    ) -> Result<()> {
        if !self.indices.entities.contains(id) {
            self.defer(id, seq, event.clone());
            return Ok(());
        }
        if self.link_seq.get(&id).is_some_and(|&current| current > seq) {
            debug!("dropping parent-changed for {id}, a newer link is indexed");
            return Ok(());
        }
        if let Some(p) = new_parent {
            if !self.indices.entities.contains(p) {
                self.defer(p, seq, event.clone());
                return Ok(());
            }
        }
        self.indices
            .hierarchy
            .set_parent(id, new_parent)
            .map_err(|err| err.with_context("applying parent-changed"))?;
        self.link_seq.insert(id, seq);
        Ok(())
    }

    // =========================================================================
    // Deferral
    // =========================================================================

    fn defer(&mut self, missing: EntityId, seq: u64, event: ChangeEvent) {
        if self.deferred_len >= self.config.max_deferred_events {
            warn!(
                "more than {} parked events, dropping them all; indices are now stale",
                self.config.max_deferred_events
            );
            self.deferred.clear();
            self.deferred_len = 0;
            self.overflowed = true;
            return;
        }
        self.deferred
            .entry(missing)
            .or_default()
            .push(Parked { seq, event });
        self.deferred_len += 1;
    }

    /// Replays the events parked for `id`, which was just created at `created`.
    ///
    /// Events about `id` itself happened after its creation, so they take the
    /// creation's sequence. Events waiting for `id` as a parent keep their own,
    /// so a newer link applied meanwhile wins.
    fn replay(&mut self, id: EntityId, created: u64) {
        let Some(parked) = self.deferred.remove(&id) else {
            return;
        };
        self.deferred_len -= parked.len();
        debug!("replaying {} parked events for {id}", parked.len());

        for Parked { seq, event } in parked {
            let seq = match event {
                ChangeEvent::ParentChanged { id: child, .. } if child != id => seq,
                _ => seq.max(created),
            };
            if let Err(err) = self.apply_event(&event, seq) {
                warn!("parked {} event for {id} rejected on replay: {err}", event.kind());
                self.diverged = true;
            }
        }
    }

    fn discard_parked(&mut self, id: EntityId) {
        if let Some(parked) = self.deferred.remove(&id) {
            self.deferred_len -= parked.len();
            debug!("dropped {} parked events for deleted {id}", parked.len());
        }
    }

    // =========================================================================
    // Bulk Load
    // =========================================================================

    /// Enters bulk-load mode.
    ///
    /// Pending events are applied first so they are not mistaken for part of
    /// the load.
    pub fn begin_bulk_load(&mut self) {
        if self.loading {
            return;
        }
        self.drain();
        self.loading = true;
        debug!("bulk load started ({:?})", self.config.bulk_load);
    }

    /// Leaves bulk-load mode.
    ///
    /// With [`BulkLoadStrategy::TerminalRebuild`] the events of the load are
    /// dropped and the indices rebuilt once from `source`. With
    /// [`BulkLoadStrategy::Buffer`] the remaining events are applied and no
    /// rebuild happens.
    pub fn end_bulk_load(&mut self, source: &dyn SceneSource) -> Option<RebuildReport> {
        if !self.loading {
            return None;
        }
        let report = self.drain();
        self.loading = false;
        debug!(
            "bulk load ended: {} applied, {} discarded",
            report.applied, report.discarded
        );

        match self.config.bulk_load {
            BulkLoadStrategy::TerminalRebuild => Some(self.rebuild(source)),
            BulkLoadStrategy::Buffer => {
                if self.deferred_len > 0 {
                    warn!(
                        "bulk load ended with {} events still waiting for their entity",
                        self.deferred_len
                    );
                }
                None
            }
        }
    }

    /// Returns true between `begin_bulk_load` and `end_bulk_load`.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // =========================================================================
    // Staleness & Rebuild
    // =========================================================================

    /// Compares the indices with the store's cheap live count.
    ///
    /// Drains first. Returns `None` while a bulk load is running, since the
    /// counts are expected to disagree then.
    pub fn check_staleness(&mut self, source: &dyn SceneSource) -> Option<StaleIndexSuspected> {
        self.drain();
        if self.loading {
            return None;
        }

        let indexed = self.indices.entities.len();
        let live = source.live_entity_count();
        let reason = if self.overflowed {
            StaleReason::DeferralOverflow
        } else if self.diverged {
            StaleReason::RejectedEvent
        } else if indexed == 0 && live > 0 {
            StaleReason::EmptyIndex
        } else if indexed != live {
            StaleReason::CountMismatch
        } else {
            return None;
        };

        warn!("indices look stale ({reason:?}): {indexed} indexed, {live} live");
        Some(StaleIndexSuspected {
            reason,
            indexed,
            live,
        })
    }

    /// Rebuilds exactly once if the indices look stale.
    pub fn recover_if_stale(&mut self, source: &dyn SceneSource) -> Option<RebuildReport> {
        self.check_staleness(source)?;
        Some(self.rebuild(source))
    }

    /// Reconstructs every index from the authoritative store.
    ///
    /// This is the only full scan. Pending and parked events are dropped,
    /// since the store already reflects them. The new indices replace the
    /// old ones in one assignment.
    pub fn rebuild(&mut self, source: &dyn SceneSource) -> RebuildReport {
        let started = Instant::now();

        let discarded_events = self.inbox.try_iter().count();
        self.deferred.clear();
        self.deferred_len = 0;
        self.overflowed = false;
        self.link_seq.clear();
        self.diverged = false;

        let mut fresh = Indices::new(self.config.max_hierarchy_depth);
        let mut diagnostics = Vec::new();

        for component in source.component_types() {
            fresh.components.register_type(component);
        }

        let entities = source.entities();
        for entity in &entities {
            fresh.entities.insert(entity.id);
            fresh.hierarchy.insert_root(entity.id);
        }

        let declared: HashMap<EntityId, Option<EntityId>> =
            entities.iter().map(|e| (e.id, e.parent)).collect();
        let mut rejected = HashSet::new();
        let mut links = 0;

        // Children lists carry sibling order, so link through them first.
        for entity in &entities {
            for child in &entity.children {
                if declared.get(child) != Some(&Some(entity.id)) {
                    continue;
                }
                match fresh.hierarchy.set_parent(*child, Some(entity.id)) {
                    Ok(()) => links += 1,
                    Err(err) => {
                        rejected.insert(*child);
                        diagnostics.push(err);
                    }
                }
            }
        }

        // Parents that no children list mentioned.
        for entity in &entities {
            let Some(parent) = entity.parent else {
                continue;
            };
            if rejected.contains(&entity.id)
                || fresh.hierarchy.parent_of(entity.id) == Some(parent)
            {
                continue;
            }
            if !fresh.entities.contains(parent) {
                diagnostics.push(
                    Error::unknown_entity(parent)
                        .with_context(format!("parent of {} during rebuild", entity.id)),
                );
                continue;
            }
            match fresh.hierarchy.set_parent(entity.id, Some(parent)) {
                Ok(()) => links += 1,
                Err(err) => diagnostics.push(err),
            }
        }

        let mut memberships = 0;
        for entity in &entities {
            for component in &entity.components {
                if fresh.components.on_add(*component, entity.id) {
                    memberships += 1;
                }
            }
        }

        self.indices = fresh;
        self.version += 1;

        let elapsed = started.elapsed();
        info!(
            "rebuilt indices: {} entities, {links} links, {memberships} memberships in {elapsed:?}",
            entities.len()
        );
        for diagnostic in &diagnostics {
            warn!("rebuild skipped: {diagnostic}");
        }

        RebuildReport {
            entities: self.indices.entities.len(),
            links,
            memberships,
            discarded_events,
            diagnostics,
            elapsed,
        }
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Drains, then returns the query facade.
    pub fn facade<'a>(&'a mut self, source: &'a dyn SceneSource) -> QueryFacade<'a> {
        self.drain();
        QueryFacade::new(self, source)
    }

    /// Returns a read view of the current indices without draining.
    #[must_use]
    pub fn view(&self) -> IndexView<'_> {
        IndexView::new(&self.indices)
    }

    /// Drains, then captures an immutable copy of the indices.
    pub fn snapshot(&mut self) -> IndexSnapshot {
        self.drain();
        IndexSnapshot::new(self.indices.clone(), self.version)
    }
}

impl fmt::Debug for IndexMaintainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexMaintainer")
            .field("config", &self.config)
            .field("entities", &self.indices.entities.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("pending", &self.inbox.len())
            .field("deferred", &self.deferred_len)
            .field("diverged", &self.diverged)
            .field("loading", &self.loading)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
