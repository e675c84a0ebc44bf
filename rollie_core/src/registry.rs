//! Lifetime-scoped callback registry.
//!
//! Each handler is stored under a caller-chosen [`HandlerId`] together with a
//! remaining-invocation budget. Registering the same id again replaces both
//! the handler and its budget. Exhausted entries are kept until the next
//! dispatch pass and evicted before anything is invoked.
//!
//! Handlers receive a context value `C` alongside the payload. The observer
//! uses this to let handlers queue new registrations; those are applied only
//! after the current pass, so a pass never visits entries added during it.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Stable identity of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(Cow<'static, str>);

impl HandlerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for HandlerId {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for HandlerId {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remaining-invocation budget of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Fires on every event until removed.
    Unlimited,
    /// Fires this many more times; `Times(0)` is dead and never invoked.
    Times(u32),
}

impl Lifetime {
    pub const ONCE: Lifetime = Lifetime::Times(1);

    #[inline]
    pub fn is_exhausted(self) -> bool {
        matches!(self, Lifetime::Times(0))
    }

    /// Budget left after one invocation.
    #[inline]
    fn consumed(self) -> Self {
        match self {
            Lifetime::Unlimited => Lifetime::Unlimited,
            Lifetime::Times(n) => Lifetime::Times(n.saturating_sub(1)),
        }
    }
}

pub type Handler<P, C> = Box<dyn FnMut(&P, &mut C)>;

struct Entry<P, C> {
    handler: Handler<P, C>,
    remaining: Lifetime,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireReport {
    /// Handlers invoked, including the ones that panicked.
    pub invoked: usize,
    /// Handlers that panicked.
    pub failed: usize,
    /// Exhausted entries removed before dispatch.
    pub evicted: usize,
}

pub struct EventRegistry<P, C> {
    kind: &'static str,
    entries: BTreeMap<HandlerId, Entry<P, C>>,
}

impl<P, C> fmt::Debug for EventRegistry<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("kind", &self.kind)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<P, C> EventRegistry<P, C> {
    /// `kind` names the event in log output.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the handler stored under `id`.
    pub fn register(&mut self, id: HandlerId, lifetime: Lifetime, handler: Handler<P, C>) {
        let replaced = self
            .entries
            .insert(
                id.clone(),
                Entry {
                    handler,
                    remaining: lifetime,
                },
            )
            .is_some();
        tracing::debug!(event = self.kind, handler = %id, ?lifetime, replaced, "handler registered");
    }

    /// Drop the entry stored under `id`; returns whether one existed.
    pub fn remove(&mut self, id: &HandlerId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Remaining budget of `id`, if still registered (exhausted entries included).
    pub fn lifetime(&self, id: &HandlerId) -> Option<Lifetime> {
        self.entries.get(id).map(|e| e.remaining)
    }

    /// Number of stored entries, including exhausted ones awaiting eviction.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke every live handler once with `payload`.
    ///
    /// Exhausted entries are evicted first. A panicking handler is logged and
    /// still consumes one unit of its budget; the pass carries on with the
    /// remaining handlers.
    pub fn fire(&mut self, payload: &P, ctx: &mut C) -> FireReport {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.remaining.is_exhausted());
        let mut report = FireReport {
            evicted: before - self.entries.len(),
            ..FireReport::default()
        };

        let live: Vec<HandlerId> = self.entries.keys().cloned().collect();
        for id in live {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            if entry.remaining.is_exhausted() {
                continue;
            }
            entry.remaining = entry.remaining.consumed();
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| (entry.handler)(payload, &mut *ctx)));
            report.invoked += 1;
            if outcome.is_err() {
                report.failed += 1;
                tracing::error!(event = self.kind, handler = %id, "handler panicked; continuing dispatch");
            }
        }
        tracing::trace!(event = self.kind, ?report, "dispatch pass");
        report
    }
}
