// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A level of the administrative hierarchy.
///
/// Tiers are ordered from coarsest (`State`) to finest (`Gp`). Villages are
/// leaf data attached to a GP survey and are never a tier of their own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ScopeTier {
    /// The whole state.
    #[default]
    State,
    /// A single district.
    District,
    /// A block within a district.
    Block,
    /// A gram panchayat within a block.
    Gp,
}

impl ScopeTier {
    /// All tiers, coarsest first.
    pub const ALL: [Self; 4] = [Self::State, Self::District, Self::Block, Self::Gp];

    /// Tiers that can be chosen from a dropdown column, coarsest first.
    pub const BROWSABLE: [Self; 3] = [Self::District, Self::Block, Self::Gp];

    /// Converts this tier to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::District => "District",
            Self::Block => "Block",
            Self::Gp => "GP",
        }
    }

    /// Returns the depth of this tier below the state (State = 0).
    #[must_use]
    pub const fn depth(&self) -> u8 {
        match self {
            Self::State => 0,
            Self::District => 1,
            Self::Block => 2,
            Self::Gp => 3,
        }
    }

    /// Returns whether a scope at this tier names a place at `other`.
    ///
    /// A `Block` scope names a district and a block, but not a GP.
    #[must_use]
    pub const fn includes(&self, other: Self) -> bool {
        self.depth() >= other.depth()
    }
}

impl std::fmt::Display for ScopeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a geography node within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoId(pub i64);

impl std::fmt::Display for GeoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A district, block, or GP as returned by the geography provider.
///
/// Nodes are immutable once fetched. Identity is `id` within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeographyNode {
    /// The node identifier.
    pub id: GeoId,
    /// The human-readable name.
    pub name: String,
    /// The parent node (district for blocks, block for GPs).
    #[serde(default)]
    pub parent_id: Option<GeoId>,
}

impl GeographyNode {
    /// Creates a node with no parent (a district).
    #[must_use]
    pub fn root(id: i64, name: &str) -> Self {
        Self {
            id: GeoId(id),
            name: name.to_string(),
            parent_id: None,
        }
    }

    /// Creates a node under `parent_id`.
    #[must_use]
    pub fn child_of(parent_id: i64, id: i64, name: &str) -> Self {
        Self {
            id: GeoId(id),
            name: name.to_string(),
            parent_id: Some(GeoId(parent_id)),
        }
    }

    /// Returns whether this node may sit under `parent`.
    ///
    /// Nodes without a recorded parent are accepted under any parent.
    #[must_use]
    pub fn belongs_to(&self, parent: GeoId) -> bool {
        self.parent_id.is_none_or(|p| p == parent)
    }
}

/// A committed or tentative place: an id plus its display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// The node identifier.
    pub id: GeoId,
    /// The human-readable name kept for display.
    pub name: String,
}

impl ScopeEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id: GeoId(id),
            name: name.to_string(),
        }
    }
}

impl From<&GeographyNode> for ScopeEntry {
    fn from(node: &GeographyNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
        }
    }
}

/// A geography collection together with the parent key that scopes it.
///
/// This is the memoisation key of the geography cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "collection", rename_all = "snake_case")]
pub enum CollectionKey {
    /// All districts of the state.
    Districts,
    /// Blocks of one district.
    Blocks {
        /// The owning district.
        district_id: GeoId,
    },
    /// GPs of one block.
    Gps {
        /// The owning district.
        district_id: GeoId,
        /// The owning block.
        block_id: GeoId,
    },
}

impl CollectionKey {
    /// Returns the id every node in this collection should name as parent.
    #[must_use]
    pub const fn parent(&self) -> Option<GeoId> {
        match self {
            Self::Districts => None,
            Self::Blocks { district_id } => Some(*district_id),
            Self::Gps { block_id, .. } => Some(*block_id),
        }
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Districts => write!(f, "districts"),
            Self::Blocks { district_id } => write!(f, "blocks(district={district_id})"),
            Self::Gps {
                district_id,
                block_id,
            } => write!(f, "gps(district={district_id},block={block_id})"),
        }
    }
}
