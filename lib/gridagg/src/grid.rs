use crate::io::read_bytes;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// One named rectangular cell with half-open bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub id: String,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl GridCell {
    /// Membership rule: exclusive xmin, inclusive xmax; inclusive ymin,
    /// exclusive ymax. The asymmetry is a fixed rule, matched to how the
    /// catalog bounds were drawn, not something to re-derive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.xmin < x && x <= self.xmax && self.ymin <= y && y < self.ymax
    }
}

/// Immutable set of grid cells, loaded once per process and shared
/// read-only with every scan worker. Cells are assumed non-overlapping
/// and are not validated for overlap; a coordinate matching several cells
/// counts toward all of them.
#[derive(Clone, Debug, Default)]
pub struct GridCatalog {
    cells: Vec<GridCell>,
}

// Serde view of the catalog document: a feature collection carrying each
// cell's id and bounds in its properties.
#[derive(Deserialize)]
struct CatalogDoc {
    features: Vec<CatalogFeature>,
}

#[derive(Deserialize)]
struct CatalogFeature {
    properties: CellProperties,
}

#[derive(Deserialize)]
struct CellProperties {
    id: String,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl GridCatalog {
    pub fn from_cells(cells: Vec<GridCell>) -> Self {
        Self { cells }
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_bytes(path)?;
        Self::from_json_slice(&bytes)
            .with_context(|| format!("parse grid catalog {}", path.display()))
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let doc: CatalogDoc = serde_json::from_slice(bytes)?;
        let cells = doc
            .features
            .into_iter()
            .map(|f| GridCell {
                id: f.properties.id,
                xmin: f.properties.xmin,
                xmax: f.properties.xmax,
                ymin: f.properties.ymin,
                ymax: f.properties.ymax,
            })
            .collect();
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
