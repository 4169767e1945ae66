//! Visibility watcher.
//!
//! The host owns the real viewport observers (one per [`WatchId`], since
//! threshold and root margin are per-observer settings) and forwards their
//! entries here. The watcher decides which targets fire and which the host
//! should stop observing.

use serde::{Deserialize, Serialize};
use vitrine_api_core::ElementKey;

use crate::ids::{Sequence, WatchId};

/// Whether the host has a viewport intersection primitive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverSupport {
    #[default]
    Available,
    /// Targets are applied in their final state at registration time.
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub threshold: f64,
    pub root_margin: String,
    pub one_shot: bool,
    /// Delay between targets that fire in the same batch (timeline reveals).
    #[serde(default)]
    pub stagger_ms: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            one_shot: true,
            stagger_ms: 0.0,
        }
    }
}

/// One observer callback entry, as reported by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub watch: WatchId,
    pub key: ElementKey,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// A target the host should stop observing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unobserve {
    pub watch: WatchId,
    pub key: ElementKey,
}

/// Passed to `on_enter` for each firing target.
#[derive(Debug)]
pub struct Trigger<'a, A> {
    pub watch: WatchId,
    pub key: &'a ElementKey,
    pub action: &'a A,
    /// Position among the targets of the same watch firing in this batch.
    pub order: usize,
    pub delay_ms: f64,
    /// True when applied without an observer (final state, no animation).
    pub immediate: bool,
}

#[derive(Debug)]
struct ObservedTarget<A> {
    watch: WatchId,
    key: ElementKey,
    action: A,
    inside: bool,
}

#[derive(Debug)]
struct Watch {
    id: WatchId,
    opts: WatchOptions,
}

#[derive(Debug)]
pub struct VisibilityWatcher<A> {
    support: ObserverSupport,
    ids: Sequence<WatchId>,
    watches: Vec<Watch>,
    targets: Vec<ObservedTarget<A>>,
    fallback: Vec<(WatchId, ElementKey, A)>,
}

impl<A> VisibilityWatcher<A> {
    pub fn new(support: ObserverSupport) -> Self {
        Self {
            support,
            ids: Sequence::default(),
            watches: Vec::new(),
            targets: Vec::new(),
            fallback: Vec::new(),
        }
    }

    pub fn support(&self) -> ObserverSupport {
        self.support
    }

    /// Register targets under one set of options. Duplicate keys within the
    /// call are dropped. Without observer support the targets are queued and
    /// fire as `immediate` on the next [`handle`](Self::handle).
    pub fn register(
        &mut self,
        targets: impl IntoIterator<Item = (ElementKey, A)>,
        opts: WatchOptions,
    ) -> WatchId {
        let id = self.ids.next_id();
        let mut seen: Vec<ElementKey> = Vec::new();
        for (key, action) in targets {
            if seen.contains(&key) {
                continue;
            }
            seen.push(key.clone());
            match self.support {
                ObserverSupport::Available => self.targets.push(ObservedTarget {
                    watch: id,
                    key,
                    action,
                    inside: false,
                }),
                ObserverSupport::Unavailable => self.fallback.push((id, key, action)),
            }
        }
        self.watches.push(Watch { id, opts });
        id
    }

    pub fn options(&self, watch: WatchId) -> Option<&WatchOptions> {
        self.watches.iter().find(|w| w.id == watch).map(|w| &w.opts)
    }

    /// Keys currently observed under `watch`.
    pub fn keys(&self, watch: WatchId) -> Vec<ElementKey> {
        self.targets
            .iter()
            .filter(|t| t.watch == watch)
            .map(|t| t.key.clone())
            .collect()
    }

    pub fn is_watching(&self, watch: WatchId, key: &ElementKey) -> bool {
        self.targets
            .iter()
            .any(|t| t.watch == watch && &t.key == key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Process a batch of entries. Returns the targets to unobserve.
    pub fn handle(
        &mut self,
        entries: &[IntersectionEntry],
        mut on_enter: impl FnMut(Trigger<'_, A>),
    ) -> Vec<Unobserve> {
        for (watch, key, action) in std::mem::take(&mut self.fallback) {
            on_enter(Trigger {
                watch,
                key: &key,
                action: &action,
                order: 0,
                delay_ms: 0.0,
                immediate: true,
            });
        }

        let mut unobserve = Vec::new();
        let mut fired_per_watch: Vec<(WatchId, usize)> = Vec::new();
        for entry in entries {
            let Some(opts) = self.options(entry.watch).cloned() else {
                continue;
            };
            let Some(pos) = self
                .targets
                .iter()
                .position(|t| t.watch == entry.watch && t.key == entry.key)
            else {
                // Already unobserved: one-shot targets never fire twice.
                continue;
            };

            // The observer already applies the threshold when it delivers an
            // entry; its reported ratio can land just under it.
            let target = &mut self.targets[pos];
            if !entry.is_intersecting {
                target.inside = false;
                continue;
            }
            if target.inside {
                continue;
            }
            target.inside = true;

            let order = match fired_per_watch.iter_mut().find(|(w, _)| *w == entry.watch) {
                Some((_, n)) => {
                    *n += 1;
                    *n - 1
                }
                None => {
                    fired_per_watch.push((entry.watch, 1));
                    0
                }
            };
            on_enter(Trigger {
                watch: target.watch,
                key: &target.key,
                action: &target.action,
                order,
                delay_ms: order as f64 * opts.stagger_ms,
                immediate: false,
            });

            if opts.one_shot {
                let removed = self.targets.remove(pos);
                unobserve.push(Unobserve {
                    watch: removed.watch,
                    key: removed.key,
                });
            }
        }
        unobserve
    }

    /// Stop watching everything. Returns what the host must unobserve.
    pub fn clear(&mut self) -> Vec<Unobserve> {
        self.fallback.clear();
        self.targets
            .drain(..)
            .map(|t| Unobserve {
                watch: t.watch,
                key: t.key,
            })
            .collect()
    }
}
