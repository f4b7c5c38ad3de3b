//! Administrative levels and the child → parent location map.

use crate::error::{ImputeError, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A tier of the administrative hierarchy, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdminLevel {
    /// Level 0, a single country-wide series per product.
    National,
    /// Level 1.
    Region,
    /// Level 2.
    District,
    /// Level 3.
    SubDistrict,
}

impl AdminLevel {
    /// All levels in processing order.
    pub const ALL: [AdminLevel; 4] = [
        AdminLevel::National,
        AdminLevel::Region,
        AdminLevel::District,
        AdminLevel::SubDistrict,
    ];

    /// Numeric depth (0 = national).
    pub fn depth(&self) -> u8 {
        match self {
            AdminLevel::National => 0,
            AdminLevel::Region => 1,
            AdminLevel::District => 2,
            AdminLevel::SubDistrict => 3,
        }
    }

    /// Column tag used by upstream tables, e.g. `admin1_label`.
    pub fn tag(&self) -> &'static str {
        match self {
            AdminLevel::National => "admin0_label",
            AdminLevel::Region => "admin1_label",
            AdminLevel::District => "admin2_label",
            AdminLevel::SubDistrict => "admin3_label",
        }
    }

    /// The immediately coarser level.
    pub fn parent(&self) -> Option<AdminLevel> {
        match self {
            AdminLevel::National => None,
            AdminLevel::Region => Some(AdminLevel::National),
            AdminLevel::District => Some(AdminLevel::Region),
            AdminLevel::SubDistrict => Some(AdminLevel::District),
        }
    }

    /// The immediately finer level.
    pub fn next(&self) -> Option<AdminLevel> {
        match self {
            AdminLevel::National => Some(AdminLevel::Region),
            AdminLevel::Region => Some(AdminLevel::District),
            AdminLevel::District => Some(AdminLevel::SubDistrict),
            AdminLevel::SubDistrict => None,
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdminLevel::National => "National",
            AdminLevel::Region => "Region",
            AdminLevel::District => "District",
            AdminLevel::SubDistrict => "SubDistrict",
        };
        f.write_str(name)
    }
}

impl FromStr for AdminLevel {
    type Err = ImputeError;

    /// Accepts the upstream tags (`admin0_label` …) and bare depths (`0` …).
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        AdminLevel::ALL
            .into_iter()
            .find(|level| level.tag() == tag || level.depth().to_string() == tag)
            .ok_or_else(|| ImputeError::UnknownAdminLevel(tag.to_string()))
    }
}

/// Static child → parent mapping between adjacent levels.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    parents: HashMap<String, String>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit pairs; a repeated child keeps its last parent.
    pub fn from_pairs<I, C, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        let mut hierarchy = Self::new();
        for (child, parent) in pairs {
            hierarchy.insert(child, parent);
        }
        hierarchy
    }

    /// Build from raw observation records where each record names a child and
    /// its parent. The first record seen for a child wins; blank names are
    /// ignored.
    pub fn from_records<I, C, P>(records: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let mut parents = HashMap::new();
        for (child, parent) in records {
            let (child, parent) = (child.as_ref().trim(), parent.as_ref().trim());
            if child.is_empty() || parent.is_empty() {
                continue;
            }
            parents
                .entry(child.to_string())
                .or_insert_with(|| parent.to_string());
        }
        Self { parents }
    }

    pub fn insert(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(child.into(), parent.into());
    }

    pub fn parent_of(&self, child: &str) -> Option<&str> {
        self.parents.get(child).map(String::as_str)
    }

    /// Parent of `child`, or a hierarchy-integrity error.
    pub fn require_parent(&self, child: &str) -> Result<&str> {
        self.parent_of(child)
            .ok_or_else(|| ImputeError::MissingParentMapping(child.to_string()))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
