//! Thermistor sites and trace extraction.
//!
//! Each site maps a physical position to its nearest cell once, when the
//! array is built. Reading a snapshot is then a handful of index loads.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::model::{CellIndex, Discretization};
use crate::params::{PhysicalParameters, PlatePoint};
use crate::snapshot::Snapshot;

/// Readings for one snapshot, one per site in array order.
///
/// Inline for the usual three thermistors.
pub type Readings = SmallVec<[f64; 3]>;

/// A named probe at a fixed cell.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermistorSite {
    /// Log-column name, `t1`, `t2`, ...
    pub name: String,
    /// Configured position in mm.
    pub position: PlatePoint,
    /// Nearest grid cell.
    pub cell: CellIndex,
}

/// One sampled trace point: simulated time plus every site's reading.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceSample {
    /// Simulated time in seconds.
    pub time: f64,
    /// Readings in degrees Celsius, in site order.
    pub celsius: Readings,
}

/// Ordered collection of thermistor sites, keyed by name.
///
/// Iteration order is insertion order, which is the log column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThermistorArray {
    sites: IndexMap<String, ThermistorSite>,
}

impl ThermistorArray {
    /// An empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the array from the configured positions, named `t1`, `t2`, ...
    ///
    /// `disc` must have been derived from `params`.
    pub fn from_params(params: &PhysicalParameters, disc: &Discretization) -> Self {
        let mut array = Self::new();
        for (n, &point) in params.thermistors.iter().enumerate() {
            array.insert(format!("t{}", n + 1), point, disc);
        }
        array
    }

    /// Add (or move) a site. Returns the cell it was mapped to.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        position: PlatePoint,
        disc: &Discretization,
    ) -> CellIndex {
        let name = name.into();
        let cell = disc.cell_index(position);
        self.sites.insert(
            name.clone(),
            ThermistorSite {
                name,
                position,
                cell,
            },
        );
        cell
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether there are no sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Look up a site by name.
    pub fn get(&self, name: &str) -> Option<&ThermistorSite> {
        self.sites.get(name)
    }

    /// Sites in column order.
    pub fn iter(&self) -> impl Iterator<Item = &ThermistorSite> {
        self.sites.values()
    }

    /// Site names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Read every site from `snapshot`, in Celsius.
    pub fn read_celsius(&self, snapshot: &Snapshot) -> Readings {
        self.sites.values().map(|s| snapshot.celsius(s.cell)).collect()
    }

    /// Read every site and pair the readings with the snapshot time.
    pub fn sample(&self, snapshot: &Snapshot) -> TraceSample {
        TraceSample {
            time: snapshot.time(),
            celsius: self.read_celsius(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn default_sites_are_named_in_order() {
        let p = PhysicalParameters {
            mesh_resolution: 12,
            ..Default::default()
        };
        let d = Discretization::derive(&p).unwrap();
        let array = ThermistorArray::from_params(&p, &d);
        assert_eq!(array.names().collect::<Vec<_>>(), ["t1", "t2", "t3"]);
        assert_eq!(array.get("t1").unwrap().cell, CellIndex::new(6, 6));
        assert_eq!(array.get("t3").unwrap().cell, CellIndex::new(11, 6));
    }

    #[test]
    fn reinserting_keeps_column_position() {
        let p = PhysicalParameters {
            mesh_resolution: 12,
            ..Default::default()
        };
        let d = Discretization::derive(&p).unwrap();
        let mut array = ThermistorArray::from_params(&p, &d);
        array.insert("t1", PlatePoint::new(0.0, 0.0), &d);
        assert_eq!(array.len(), 3);
        assert_eq!(array.iter().next().unwrap().cell, CellIndex::new(0, 0));
    }

    #[test]
    fn sample_reads_celsius_at_each_cell() {
        let p = PhysicalParameters {
            mesh_resolution: 12,
            ..Default::default()
        };
        let d = Discretization::derive(&p).unwrap();
        let array = ThermistorArray::from_params(&p, &d);
        let mut g = Grid::new(&p, &d);
        let mut next = g.temperatures().to_vec();
        next[array.get("t2").unwrap().cell.flat(d.ny)] = 273.0 + 31.5;
        g.commit_step(&mut next, 0.0, 0.0);

        let sample = array.sample(&Snapshot::capture(&g));
        assert_eq!(sample.time, d.dt);
        assert_eq!(sample.celsius.as_slice(), &[25.0, 31.5, 25.0]);
        assert!(!sample.celsius.spilled());
    }
}
