//! Project storage and caller identity.
//!
//! These are the collaborators the build/proxy core consumes. Projects live in
//! two partitions told apart by the first character of their id: `s_<hex>`
//! for shared (public) samples and `u_<hex>` for owner-scoped projects. The
//! crate ships in-memory implementations; a persistent backend only has to
//! implement [`ProjectStore`].

pub mod identity;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::core::KitchenError;

pub use identity::{Caller, IdentityProvider, TokenIdentity};

/// Storage partition of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    /// Visible to everyone, writable by administrators.
    Shared,
    /// Visible to and writable by its owner only.
    Private,
}

impl Partition {
    pub const fn prefix(self) -> char {
        match self {
            Self::Shared => 's',
            Self::Private => 'u',
        }
    }
}

/// Project identifier, rendered as `<prefix>_<hex number>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId {
    partition: Partition,
    number: u64,
}

impl ProjectId {
    pub const fn new(partition: Partition, number: u64) -> Self {
        Self {
            partition,
            number,
        }
    }

    pub const fn partition(self) -> Partition {
        self.partition
    }

    pub const fn number(self) -> u64 {
        self.number
    }

    pub const fn is_public(self) -> bool {
        matches!(self.partition, Partition::Shared)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:x}", self.partition.prefix(), self.number)
    }
}

impl FromStr for ProjectId {
    type Err = KitchenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let not_found = || KitchenError::ProjectNotFound {
            id: s.to_string(),
        };

        let (prefix, hex) = s.split_once('_').ok_or_else(not_found)?;
        let partition = match prefix {
            "s" => Partition::Shared,
            "u" => Partition::Private,
            _ => return Err(not_found()),
        };
        let number = u64::from_str_radix(hex, 16).map_err(|_| not_found())?;
        Ok(Self::new(partition, number))
    }
}

impl Serialize for ProjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    /// Owner of a private project; `None` for shared ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Display name. Shared projects without a name are not listed.
    pub name: String,
    pub js_code: String,
    pub html_code: String,
}

/// Key/value persistence for projects.
pub trait ProjectStore: Send + Sync + fmt::Debug {
    /// Project `id` as seen by `caller`.
    ///
    /// Private projects are only returned to their owner.
    fn get(&self, id: ProjectId, caller: Option<&str>) -> Option<ProjectRecord>;

    /// Insert or replace a record.
    fn put(&self, record: ProjectRecord);

    /// Remove project `id` on behalf of `caller`. Returns whether it existed.
    fn delete(&self, id: ProjectId, caller: Option<&str>) -> bool;

    /// Every named shared project, ordered by id.
    fn public_projects(&self) -> Vec<ProjectRecord>;
}

/// [`ProjectStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    projects: DashMap<ProjectId, ProjectRecord>,
    next_number: AtomicU64,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new project under a freshly allocated id.
    pub fn create(
        &self,
        partition: Partition,
        owner: Option<&str>,
        name: &str,
        js_code: &str,
        html_code: &str,
    ) -> ProjectId {
        let id = ProjectId::new(partition, self.next_number.fetch_add(1, Ordering::Relaxed) + 1);
        self.put(ProjectRecord {
            id,
            owner: match partition {
                Partition::Shared => None,
                Partition::Private => owner.map(str::to_string),
            },
            name: name.to_string(),
            js_code: js_code.to_string(),
            html_code: html_code.to_string(),
        });
        id
    }

    fn visible(record: &ProjectRecord, caller: Option<&str>) -> bool {
        match record.id.partition() {
            Partition::Shared => true,
            Partition::Private => caller.is_some() && record.owner.as_deref() == caller,
        }
    }
}

impl ProjectStore for MemoryProjectStore {
    fn get(&self, id: ProjectId, caller: Option<&str>) -> Option<ProjectRecord> {
        self.projects
            .get(&id)
            .filter(|record| Self::visible(record, caller))
            .map(|record| record.value().clone())
    }

    fn put(&self, record: ProjectRecord) {
        self.projects.insert(record.id, record);
    }

    fn delete(&self, id: ProjectId, caller: Option<&str>) -> bool {
        self.projects.remove_if(&id, |_, record| Self::visible(record, caller)).is_some()
    }

    fn public_projects(&self) -> Vec<ProjectRecord> {
        let mut projects: Vec<ProjectRecord> = self
            .projects
            .iter()
            .filter(|entry| entry.id.is_public() && !entry.name.is_empty())
            .map(|entry| entry.value().clone())
            .collect();
        projects.sort_by_key(|record| record.id);
        projects
    }
}
