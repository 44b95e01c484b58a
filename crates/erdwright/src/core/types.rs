//! Core type definitions shared by the traversal and the DOT projection

use std::fmt;
use std::str::FromStr;

/// How many target models a relationship field holds
///
/// Derived from the wrappers around the field's model type. Ordering goes
/// from narrowest to widest, so merging two candidates is a `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Cardinality {
    /// Plain reference: `leader: Adventurer`
    #[default]
    One,
    /// Nullable reference: `leader: Optional[Adventurer]`
    Optional,
    /// Collection or mapping: `members: List[Adventurer]`
    Many,
}

impl Cardinality {
    /// Returns true if the relationship may hold more than one target
    pub fn is_many(&self) -> bool {
        matches!(self, Cardinality::Many)
    }

    /// Returns true if the relationship may be empty
    pub fn is_nullable(&self) -> bool {
        matches!(self, Cardinality::Optional | Cardinality::Many)
    }

    /// Graphviz arrowhead in crow's foot notation
    ///
    /// The first half encodes cardinality (`crow` for many, `nonetee` for
    /// at most one), the second modality (`odot` when zero is allowed).
    pub fn dot_arrowhead(&self) -> &'static str {
        match self {
            Cardinality::One => "noneteetee",
            Cardinality::Optional => "noneteeodot",
            Cardinality::Many => "crowodot",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Optional => write!(f, "optional"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

/// Direction in which the diagram is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Orientation {
    /// Left to right (LR)
    #[default]
    Horizontal,
    /// Top to bottom (TB)
    Vertical,
}

impl Orientation {
    /// Graphviz `rankdir` value
    pub fn rankdir(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "LR",
            Orientation::Vertical => "TB",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "horizontal" => Ok(Orientation::Horizontal),
            "tb" | "td" | "vertical" => Ok(Orientation::Vertical),
            _ => Err(format!("Unknown orientation: {}", s)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rankdir())
    }
}

/// Depth value meaning "traverse until every reachable model is found"
pub const UNBOUNDED_DEPTH: usize = usize::MAX;

/// Options shared by the library entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramOptions {
    /// How many relationship hops away from a root new models are discovered
    pub depth_limit: usize,
    /// Layout direction
    pub orientation: Orientation,
}

impl DiagramOptions {
    pub fn new(depth_limit: usize, orientation: Orientation) -> Self {
        Self {
            depth_limit,
            orientation,
        }
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            depth_limit: UNBOUNDED_DEPTH,
            orientation: Orientation::default(),
        }
    }
}
