use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, RecordStore};

// ---------------------------------------------------------------------------
// Dimensions: the filterable attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Team,
    League,
    Position,
    Player,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dimension::Team => "Team",
            Dimension::League => "League",
            Dimension::Position => "Position",
            Dimension::Player => "Player",
        };
        f.write_str(label)
    }
}

/// Individual view: each choice narrows the pool for the next one.
pub const PLAYER_ORDER: [Dimension; 4] = [
    Dimension::Team,
    Dimension::Position,
    Dimension::Player,
    Dimension::League,
];

/// Group view.
pub const TEAM_ORDER: [Dimension; 2] = [Dimension::Team, Dimension::League];

/// Which source column backs each dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionColumns {
    pub team: String,
    pub league: String,
    pub position: String,
    pub player: String,
}

impl Default for DimensionColumns {
    fn default() -> Self {
        Self {
            team: "nombre_equipo".into(),
            league: "nombre_liga".into(),
            position: "posicion".into(),
            player: "nombre".into(),
        }
    }
}

impl DimensionColumns {
    pub fn column(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Team => &self.team,
            Dimension::League => &self.league,
            Dimension::Position => &self.position,
            Dimension::Player => &self.player,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter predicate: one chosen value per dimension
// ---------------------------------------------------------------------------

/// Current dropdown choices. A dimension absent from the map is unconstrained.
pub type FilterSelection = BTreeMap<Dimension, CellValue>;

/// Return indices (into `store.records`) of the rows in `base` that match
/// every predicate, keeping `base` order.
///
/// A record passes a predicate when its value for that dimension's column is
/// exactly the chosen value. Predicates on columns the store does not have
/// are ignored; no match is an empty result, not an error.
pub fn filter(
    store: &RecordStore,
    columns: &DimensionColumns,
    base: &[usize],
    selection: &FilterSelection,
) -> Vec<usize> {
    let active: Vec<(&str, &CellValue)> = selection
        .iter()
        .map(|(dim, value)| (columns.column(*dim), value))
        .filter(|(col, _)| store.has_column(col))
        .collect();

    base.iter()
        .copied()
        .filter(|&i| {
            let Some(rec) = store.records.get(i) else {
                return false;
            };
            active
                .iter()
                .all(|(col, wanted)| rec.get(col) == Some(*wanted))
        })
        .collect()
}

/// Every row of the store, in order.
pub fn all_indices(store: &RecordStore) -> Vec<usize> {
    (0..store.len()).collect()
}

/// Distinct non-null values of a dimension's column among `base`, in order of
/// first appearance. Empty when the column is missing.
pub fn choices(
    store: &RecordStore,
    columns: &DimensionColumns,
    base: &[usize],
    dimension: Dimension,
) -> Vec<CellValue> {
    let col = columns.column(dimension);
    if !store.has_column(col) {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    base.iter()
        .filter_map(|&i| store.records.get(i)?.get(col))
        .filter(|v| !v.is_null())
        .filter(|v| seen.insert((*v).clone()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Cascading selection
// ---------------------------------------------------------------------------

/// One dropdown after cascading: what it offers and what it ended up on.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeStep {
    pub dimension: Dimension,
    pub choices: Vec<CellValue>,
    pub chosen: Option<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cascade {
    pub steps: Vec<CascadeStep>,
    /// Rows left after every step.
    pub view: Vec<usize>,
}

impl Cascade {
    /// The effective selection (only dimensions that settled on a value).
    pub fn selection(&self) -> FilterSelection {
        self.steps
            .iter()
            .filter_map(|s| Some((s.dimension, s.chosen.clone()?)))
            .collect()
    }

    pub fn chosen(&self, dimension: Dimension) -> Option<&CellValue> {
        self.steps
            .iter()
            .find(|s| s.dimension == dimension)
            .and_then(|s| s.chosen.as_ref())
    }

    pub fn step(&self, dimension: Dimension) -> Option<&CascadeStep> {
        self.steps.iter().find(|s| s.dimension == dimension)
    }
}

/// Walk `order`, listing each dimension's choices from the pool narrowed by
/// the previous dimensions.
///
/// The wanted value is kept when the narrowed pool still offers it, otherwise
/// the first offered value is chosen (a dropdown always shows something).
/// Dimensions whose column the store lacks do not narrow the pool.
pub fn cascade(
    store: &RecordStore,
    columns: &DimensionColumns,
    order: &[Dimension],
    wanted: &FilterSelection,
) -> Cascade {
    let mut pool = all_indices(store);
    let mut steps = Vec::with_capacity(order.len());

    for &dimension in order {
        let offered = choices(store, columns, &pool, dimension);
        let chosen = match wanted.get(&dimension) {
            Some(v) if offered.contains(v) => Some(v.clone()),
            _ => offered.first().cloned(),
        };
        if let Some(value) = &chosen {
            let mut predicate = FilterSelection::new();
            predicate.insert(dimension, value.clone());
            pool = filter(store, columns, &pool, &predicate);
        }
        steps.push(CascadeStep {
            dimension,
            choices: offered,
            chosen,
        });
    }

    Cascade { steps, view: pool }
}
