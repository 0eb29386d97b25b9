//! Typed presentation events with pre-allocated ring buffers.
//!
//! The coordinator, fusion engine and transfer protocol emit events while
//! handling a notification. The host calls [`EventBus::deliver`] once the
//! notification has been handled, and each event kind's buffer is flushed to
//! its listeners in batch.
//!
//! Listeners are fire-and-forget: they receive events read-only and cannot
//! feed anything back into the simulation. Audio, particles and mesh
//! rebuilds hang off these.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind.

use crate::fixed::{Fixed64, Millis};
use crate::id::{ActorId, BlockPos, EntityId, ItemCode, RecipeId};
use crate::liquid::LiquidPortion;
use crate::transfer::TransferDirection;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// An alchemy event. All events carry the time at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlchemyEvent {
    /// A vessel crossed the ignition threshold for the first time.
    VesselHeated {
        pos: BlockPos,
        temperature: Fixed64,
        at: Millis,
    },
    /// Presentation-side pulse for bubbling/steam effects.
    Simmering {
        pos: BlockPos,
        temperature: Fixed64,
        fill: Fixed64,
        at: Millis,
    },
    IngredientAbsorbed {
        pos: BlockPos,
        entity: EntityId,
        item: ItemCode,
        count: u32,
        at: Millis,
    },
    MatchStarted {
        pos: BlockPos,
        recipe: RecipeId,
        at: Millis,
    },
    MatchProgressing {
        pos: BlockPos,
        recipe: RecipeId,
        elapsed: Millis,
        hold: Millis,
        at: Millis,
    },
    RecipeCommitted {
        pos: BlockPos,
        recipe: RecipeId,
        output: LiquidPortion,
        at: Millis,
    },
    LiquidTransferred {
        pos: BlockPos,
        actor: ActorId,
        direction: TransferDirection,
        liquid: ItemCode,
        portions: u32,
        at: Millis,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    VesselHeated,
    Simmering,
    IngredientAbsorbed,
    MatchStarted,
    MatchProgressing,
    RecipeCommitted,
    LiquidTransferred,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 7;

impl AlchemyEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            AlchemyEvent::VesselHeated { .. } => EventKind::VesselHeated,
            AlchemyEvent::Simmering { .. } => EventKind::Simmering,
            AlchemyEvent::IngredientAbsorbed { .. } => EventKind::IngredientAbsorbed,
            AlchemyEvent::MatchStarted { .. } => EventKind::MatchStarted,
            AlchemyEvent::MatchProgressing { .. } => EventKind::MatchProgressing,
            AlchemyEvent::RecipeCommitted { .. } => EventKind::RecipeCommitted,
            AlchemyEvent::LiquidTransferred { .. } => EventKind::LiquidTransferred,
        }
    }

    /// Position of the vessel the event concerns.
    pub fn pos(&self) -> BlockPos {
        match self {
            AlchemyEvent::VesselHeated { pos, .. }
            | AlchemyEvent::Simmering { pos, .. }
            | AlchemyEvent::IngredientAbsorbed { pos, .. }
            | AlchemyEvent::MatchStarted { pos, .. }
            | AlchemyEvent::MatchProgressing { pos, .. }
            | AlchemyEvent::RecipeCommitted { pos, .. }
            | AlchemyEvent::LiquidTransferred { pos, .. } => *pos,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<AlchemyEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event into the ring buffer. If full, the oldest event is dropped.
    pub fn push(&mut self, event: AlchemyEvent) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events in order from oldest to newest.
    pub fn iter(&self) -> EventBufferIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head points at the oldest entry once the buffer has wrapped
            self.head
        };
        EventBufferIter {
            buffer: self,
            index: start,
            remaining: self.len,
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over events in an [`EventBuffer`], from oldest to newest.
pub struct EventBufferIter<'a> {
    buffer: &'a EventBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for EventBufferIter<'a> {
    type Item = &'a AlchemyEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.buffer.events[self.index].as_ref();
        self.index = (self.index + 1) % self.buffer.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventBufferIter<'_> {}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A listener receives events read-only.
pub type Listener = Box<dyn FnMut(&AlchemyEvent)>;

/// Optional predicate that filters events for a listener.
pub type EventFilter = Box<dyn Fn(&AlchemyEvent) -> bool>;

/// Priority level for listeners. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct ListenerEntry {
    listener: Listener,
    priority: ListenerPriority,
    filter: Option<EventFilter>,
    insertion_order: u64,
}

impl std::fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("priority", &self.priority)
            .field("filtered", &self.filter.is_some())
            .field("insertion_order", &self.insertion_order)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Holds one ring buffer per event kind, listener lists, and suppression
/// flags.
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: [Vec<ListenerEntry>; EVENT_KIND_COUNT],
    default_capacity: usize,
    /// Monotonically increasing counter for stable sort ordering.
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a new event bus with the given default buffer capacity per kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            default_capacity,
            next_insertion_order: 0,
        }
    }

    /// Suppress an event kind. Suppressed events are never allocated or buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event. No-ops if the event kind is suppressed.
    pub fn emit(&mut self, event: AlchemyEvent) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a listener with Normal priority and no filter.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.on_filtered(kind, ListenerPriority::Normal, None, listener);
    }

    /// Register a listener with explicit priority and optional filter.
    pub fn on_filtered(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.listeners[kind.index()].push(ListenerEntry {
            listener,
            priority,
            filter,
            insertion_order: order,
        });
    }

    /// Deliver all buffered events to listeners, then clear the buffers.
    ///
    /// Listeners of a kind run in `(priority, registration)` order; each sees
    /// that kind's events oldest-to-newest.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            if self.suppressed[idx] {
                continue;
            }
            let Some(buffer) = self.buffers[idx].as_ref() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }

            let events: Vec<AlchemyEvent> = buffer.iter().cloned().collect();

            self.listeners[idx].sort_by_key(|entry| (entry.priority, entry.insertion_order));

            for entry in &mut self.listeners[idx] {
                for event in &events {
                    if let Some(ref filter) = entry.filter
                        && !filter(event)
                    {
                        continue;
                    }
                    (entry.listener)(event);
                }
            }

            if let Some(buffer) = self.buffers[idx].as_mut() {
                buffer.clear();
            }
        }
    }

    /// Get the event buffer for a specific event kind (read-only).
    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Events of `kind` currently buffered, oldest first.
    pub fn buffered(&self, kind: EventKind) -> Vec<&AlchemyEvent> {
        self.buffer(kind).map(|b| b.iter().collect()).unwrap_or_default()
    }

    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.len())
            .unwrap_or(0)
    }

    /// Total events ever emitted for a kind (including dropped).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.total_written())
            .unwrap_or(0)
    }

    /// Clear all buffers. Listeners and suppression settings stay.
    pub fn clear_all(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
