//! Topic registry: maps topic names and numeric ids to their metadata.
//!
//! Populated single-threaded at startup from generated registration calls,
//! then sealed. Sealed registries are read-only and shared freely between
//! threads (`&TopicRegistry`, `Arc`, or the process-wide [`global`]).
//! Lookups are O(1) `HashMap` hits.
//!
//! ## Lifecycle
//!
//! ```text
//! Empty ──register──▶ Populating ──seal──▶ Sealed
//!   └──────────────────seal───────────────────▲
//! ```
//!
//! Registration after sealing fails with [`RegistryError::RegistryFrozen`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::descriptor::{DescriptorError, DescriptorMismatch, Layout};
use crate::raw::RawReader;
use crate::topic::{OrbMessage, TypeTag};

// ─── Error Types ────────────────────────────────────────────────────

/// Which key of a duplicate registration collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    Name,
    NumericId,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::NumericId => f.write_str("numeric id"),
        }
    }
}

/// Problem with a topic's descriptor found at registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorIssue {
    /// Grammar error; reflection unavailable for the topic.
    #[error("malformed descriptor: {0}")]
    Malformed(#[from] DescriptorError),

    /// Descriptor and compiled size disagree.
    #[error("descriptor mismatch: {0}")]
    Mismatch(#[from] DescriptorMismatch),
}

/// Registration-time misuse. Fatal to the registration call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Name or numeric id already registered.
    #[error("duplicate topic '{name}' (id {numeric_id}): {key} already registered")]
    DuplicateTopic {
        name: String,
        numeric_id: u16,
        key: DuplicateKey,
    },

    /// Registry already sealed.
    #[error("registry is sealed, cannot register '{name}'")]
    RegistryFrozen { name: String },

    /// Descriptor issue under [`DescriptorPolicy::Strict`].
    #[error("topic '{name}' rejected: {issue}")]
    Rejected { name: String, issue: DescriptorIssue },

    /// A process-wide registry was already installed.
    #[error("global topic registry already installed")]
    GlobalInstalled,
}

// ─── Policy / State ─────────────────────────────────────────────────

/// How registration treats descriptor issues.
///
/// `Lenient` keeps the topic (with a warning) so reflection data stays
/// available; `Strict` rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorPolicy {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    Populating,
    Sealed,
}

// ─── TopicEntry ─────────────────────────────────────────────────────

/// Metadata of one registered topic. Immutable once registered.
#[derive(Debug, Clone)]
pub struct TopicEntry {
    name: Cow<'static, str>,
    numeric_id: u16,
    byte_size: usize,
    descriptor: Cow<'static, str>,
    type_tag: TypeTag,
    layout: Option<Layout>,
    issue: Option<DescriptorIssue>,
}

impl TopicEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn numeric_id(&self) -> u16 {
        self.numeric_id
    }

    /// Compiled record size; every message buffer has exactly this length.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Resolved layout; `None` when the descriptor was malformed.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Descriptor issue accepted at registration, if any.
    pub fn issue(&self) -> Option<&DescriptorIssue> {
        self.issue.as_ref()
    }

    /// Size without trailing padding, falling back to `byte_size`.
    pub fn size_no_padding(&self) -> usize {
        self.layout
            .as_ref()
            .map_or(self.byte_size, Layout::size_no_padding)
    }

    /// Copy `buf` into the topic's record type.
    ///
    /// `None` if `T` is not this topic's type or `buf` has the wrong length.
    pub fn decode<T: OrbMessage>(&self, buf: &[u8]) -> Option<T> {
        if !self.type_tag.is::<T>() || buf.len() != self.byte_size {
            return None;
        }
        T::read_raw(&RawReader::new(buf))
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub numeric_id: u16,
    /// Descriptor issue accepted under the lenient policy.
    pub issue: Option<DescriptorIssue>,
}

impl Registration {
    pub fn is_clean(&self) -> bool {
        self.issue.is_none()
    }
}

// ─── TopicRegistry ──────────────────────────────────────────────────

/// Write-once table of topic metadata.
#[derive(Debug)]
pub struct TopicRegistry {
    entries: Vec<TopicEntry>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<u16, usize>,
    /// Entry indices sorted by numeric id.
    id_order: Vec<usize>,
    state: RegistryState,
    policy: DescriptorPolicy,
}

assert_impl_all!(TopicRegistry: Send, Sync);
assert_impl_all!(TopicEntry: Send, Sync);

impl TopicRegistry {
    /// Empty registry with the lenient descriptor policy.
    pub fn new() -> Self {
        Self::with_policy(DescriptorPolicy::default())
    }

    pub fn with_policy(policy: DescriptorPolicy) -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_id: HashMap::new(),
            id_order: Vec::new(),
            state: RegistryState::Empty,
            policy,
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn policy(&self) -> DescriptorPolicy {
        self.policy
    }

    pub fn is_sealed(&self) -> bool {
        self.state == RegistryState::Sealed
    }

    /// Register one topic.
    ///
    /// # Errors
    ///
    /// - `RegistryFrozen` after [`seal`](Self::seal).
    /// - `DuplicateTopic` if the name or numeric id is taken.
    /// - `Rejected` for descriptor issues under the strict policy.
    ///
    /// Under the lenient policy descriptor issues are logged, reported in the
    /// returned [`Registration`], and the topic is registered anyway.
    pub fn register(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        numeric_id: u16,
        byte_size: usize,
        descriptor: impl Into<Cow<'static, str>>,
        type_tag: TypeTag,
    ) -> Result<Registration, RegistryError> {
        let name = name.into();
        let descriptor = descriptor.into();

        if self.is_sealed() {
            return Err(RegistryError::RegistryFrozen {
                name: name.into_owned(),
            });
        }
        if self.by_name.contains_key(&*name) {
            return Err(RegistryError::DuplicateTopic {
                name: name.into_owned(),
                numeric_id,
                key: DuplicateKey::Name,
            });
        }
        if self.by_id.contains_key(&numeric_id) {
            return Err(RegistryError::DuplicateTopic {
                name: name.into_owned(),
                numeric_id,
                key: DuplicateKey::NumericId,
            });
        }

        let (layout, issue) = match Layout::parse(&descriptor, byte_size) {
            Ok(layout) => {
                let issue = layout.check(byte_size).err().map(DescriptorIssue::from);
                (Some(layout), issue)
            }
            Err(e) => (None, Some(DescriptorIssue::from(e))),
        };

        if let Some(issue) = &issue {
            if self.policy == DescriptorPolicy::Strict {
                return Err(RegistryError::Rejected {
                    name: name.into_owned(),
                    issue: issue.clone(),
                });
            }
            warn!(topic = %name, id = numeric_id, "{issue}; registering anyway");
        }

        debug!(
            topic = %name,
            id = numeric_id,
            size = byte_size,
            fields = layout.as_ref().map_or(0, |l| l.fields().len()),
            "topic registered"
        );

        let index = self.entries.len();
        self.by_name.insert(name.to_string(), index);
        self.by_id.insert(numeric_id, index);
        let pos = self
            .id_order
            .partition_point(|&i| self.entries[i].numeric_id < numeric_id);
        self.id_order.insert(pos, index);
        self.entries.push(TopicEntry {
            name,
            numeric_id,
            byte_size,
            descriptor,
            type_tag,
            layout,
            issue: issue.clone(),
        });
        self.state = RegistryState::Populating;

        Ok(Registration { numeric_id, issue })
    }

    /// Register a generated record type.
    pub fn register_topic<T: OrbMessage>(&mut self) -> Result<Registration, RegistryError> {
        self.register(T::NAME, T::ID, T::byte_size(), T::FIELDS, TypeTag::of::<T>())
    }

    /// Freeze the registry. Idempotent.
    pub fn seal(&mut self) {
        if !self.is_sealed() {
            self.state = RegistryState::Sealed;
            info!(topics = self.entries.len(), "topic registry sealed");
        }
    }

    /// Consuming form of [`seal`](Self::seal).
    pub fn sealed(mut self) -> Self {
        self.seal();
        self
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&TopicEntry> {
        self.by_name.get(name).and_then(|&i| self.entries.get(i))
    }

    pub fn lookup_by_id(&self, numeric_id: u16) -> Option<&TopicEntry> {
        self.by_id.get(&numeric_id).and_then(|&i| self.entries.get(i))
    }

    /// All topics ordered by numeric id. Call again to restart.
    pub fn all_topics(&self) -> Topics<'_> {
        Topics {
            registry: self,
            order: self.id_order.iter(),
        }
    }

    /// Number of registered topics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`TopicRegistry::all_topics`].
#[derive(Debug, Clone)]
pub struct Topics<'a> {
    registry: &'a TopicRegistry,
    order: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for Topics<'a> {
    type Item = &'a TopicEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let &i = self.order.next()?;
        self.registry.entries.get(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for Topics<'_> {}

// ─── Process-wide registry ──────────────────────────────────────────

static GLOBAL: OnceLock<TopicRegistry> = OnceLock::new();

/// Seal `registry` and install it as the process-wide registry.
///
/// Must run before reader threads start.
///
/// # Errors
///
/// `GlobalInstalled` if a registry is already installed.
pub fn install_global(registry: TopicRegistry) -> Result<&'static TopicRegistry, RegistryError> {
    GLOBAL
        .set(registry.sealed())
        .map_err(|_| RegistryError::GlobalInstalled)?;
    GLOBAL.get().ok_or(RegistryError::GlobalInstalled)
}

/// The process-wide registry, once installed.
pub fn global() -> Option<&'static TopicRegistry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAVLINK_LOG: &str = "uint64_t timestamp;char[127] text;uint8_t severity;";

    fn registry_with_log() -> TopicRegistry {
        let mut reg = TopicRegistry::new();
        reg.register(
            "mavlink_log",
            3,
            136,
            MAVLINK_LOG,
            TypeTag::untyped("mavlink_log"),
        )
        .unwrap();
        reg
    }

    #[test]
    fn lifecycle_states() {
        let mut reg = TopicRegistry::new();
        assert_eq!(reg.state(), RegistryState::Empty);
        reg.register("a", 1, 1, "uint8_t x;", TypeTag::untyped("a"))
            .unwrap();
        assert_eq!(reg.state(), RegistryState::Populating);
        reg.seal();
        assert_eq!(reg.state(), RegistryState::Sealed);
        reg.seal();
        assert!(reg.is_sealed());
    }

    #[test]
    fn empty_registry_can_seal() {
        let reg = TopicRegistry::new().sealed();
        assert!(reg.is_sealed());
        assert!(reg.is_empty());
        assert_eq!(reg.all_topics().count(), 0);
    }

    #[test]
    fn lookups_return_same_entry() {
        let reg = registry_with_log();
        let by_name = reg.lookup_by_name("mavlink_log").unwrap();
        let by_id = reg.lookup_by_id(3).unwrap();
        assert!(std::ptr::eq(by_name, by_id));
        assert_eq!(by_name.byte_size(), 136);
        assert_eq!(by_name.descriptor(), MAVLINK_LOG);
        assert!(by_name.issue().is_none());
        assert!(reg.lookup_by_name("missing").is_none());
        assert!(reg.lookup_by_id(99).is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut reg = registry_with_log();
        let err = reg
            .register("mavlink_log", 4, 136, MAVLINK_LOG, TypeTag::untyped("x"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateTopic {
                key: DuplicateKey::Name,
                ..
            }
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut reg = registry_with_log();
        let err = reg
            .register("other", 3, 1, "uint8_t x;", TypeTag::untyped("x"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateTopic {
                numeric_id: 3,
                key: DuplicateKey::NumericId,
                ..
            }
        ));
        assert!(reg.lookup_by_name("other").is_none());
    }

    #[test]
    fn register_after_seal_frozen() {
        let mut reg = registry_with_log();
        reg.seal();
        let err = reg
            .register("late", 9, 1, "uint8_t x;", TypeTag::untyped("late"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::RegistryFrozen {
                name: "late".to_string()
            }
        );
    }

    #[test]
    fn mismatch_accepted_with_warning() {
        let mut reg = TopicRegistry::new();
        let outcome = reg
            .register("short", 1, 8, "uint32_t a;", TypeTag::untyped("short"))
            .unwrap();
        assert!(matches!(
            outcome.issue,
            Some(DescriptorIssue::Mismatch(DescriptorMismatch {
                declared: 8,
                computed: 4
            }))
        ));
        let entry = reg.lookup_by_name("short").unwrap();
        assert!(entry.layout().is_some());
        assert!(entry.issue().is_some());
    }

    #[test]
    fn malformed_accepted_without_layout() {
        let mut reg = TopicRegistry::new();
        let outcome = reg
            .register("bad", 1, 8, "widget w;", TypeTag::untyped("bad"))
            .unwrap();
        assert!(!outcome.is_clean());
        let entry = reg.lookup_by_id(1).unwrap();
        assert!(entry.layout().is_none());
        assert_eq!(entry.size_no_padding(), 8);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_descriptor_loses_reflection_only() {
        let mut reg = TopicRegistry::new();
        let outcome = reg
            .register(
                "huge",
                1,
                16,
                "uint64_t timestamp;uint64_t[2305843009213693952] x;",
                TypeTag::untyped("huge"),
            )
            .unwrap();
        assert!(matches!(outcome.issue, Some(DescriptorIssue::Malformed(_))));
        let entry = reg.lookup_by_name("huge").unwrap();
        assert!(entry.layout().is_none());
        assert!(matches!(
            crate::format::format(entry, &[0u8; 16], crate::clock::MonotonicTime(0)),
            Err(crate::format::FormatError::NoLayout { .. })
        ));

        let mut strict = TopicRegistry::with_policy(DescriptorPolicy::Strict);
        let err = strict
            .register(
                "huge",
                1,
                16,
                "char[18446744073709551615] x;uint8_t y;",
                TypeTag::untyped("huge"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Rejected {
                issue: DescriptorIssue::Malformed(DescriptorError::TooLarge { .. }),
                ..
            }
        ));
    }

    #[test]
    fn strict_policy_rejects_mismatch() {
        let mut reg = TopicRegistry::with_policy(DescriptorPolicy::Strict);
        let err = reg
            .register("short", 1, 8, "uint32_t a;", TypeTag::untyped("short"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Rejected { .. }));
        assert!(reg.is_empty());
        assert_eq!(reg.state(), RegistryState::Empty);
    }

    #[test]
    fn all_topics_sorted_and_restartable() {
        let mut reg = TopicRegistry::new();
        for (name, id) in [("c", 7u16), ("a", 2), ("b", 5)] {
            reg.register(name, id, 1, "uint8_t x;", TypeTag::untyped("t"))
                .unwrap();
        }
        let ids: Vec<_> = reg.all_topics().map(TopicEntry::numeric_id).collect();
        assert_eq!(ids, vec![2, 5, 7]);
        let again: Vec<_> = reg.all_topics().map(TopicEntry::name).collect();
        assert_eq!(again, vec!["a", "b", "c"]);
        assert_eq!(reg.all_topics().len(), 3);
    }

    #[test]
    fn owned_names_and_descriptors() {
        let mut reg = TopicRegistry::new();
        let name = String::from("runtime_topic");
        let fields = String::from("uint16_t a;uint16_t b;");
        reg.register(name, 11, 4, fields, TypeTag::untyped("runtime"))
            .unwrap();
        let entry = reg.lookup_by_name("runtime_topic").unwrap();
        assert_eq!(entry.layout().unwrap().fields().len(), 2);
    }

    #[test]
    fn sealed_registry_shared_across_threads() {
        let reg = std::sync::Arc::new(registry_with_log().sealed());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reg = std::sync::Arc::clone(&reg);
                std::thread::spawn(move || reg.lookup_by_id(3).map(|e| e.byte_size()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Some(136));
        }
    }
}
