//! User-supplied physical parameters and their validation.
//!
//! [`PhysicalParameters`] is the single input to a run. It is checked once
//! by [`validate()`](PhysicalParameters::validate) (called from
//! [`Discretization::derive`](crate::model::Discretization::derive)); after
//! that nothing in the engine re-validates ranges.

use crate::error::ParameterError;
use crate::schedule::ActiveWindow;
use crate::units::{m_to_mm, mm_to_m, ABSOLUTE_ZERO_C};

/// Thermistor positions a run carries, one per `t1..t3` log column.
pub const THERMISTOR_COUNT: usize = 3;

// ── PlatePoint ──────────────────────────────────────────────────

/// A position on the plate surface in millimetres, measured from the
/// origin corner along the length (x) and width (y) axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatePoint {
    /// Distance along the plate length, in mm.
    pub x_mm: f64,
    /// Distance along the plate width, in mm.
    pub y_mm: f64,
}

impl PlatePoint {
    /// Create a point from millimetre coordinates.
    pub const fn new(x_mm: f64, y_mm: f64) -> Self {
        Self { x_mm, y_mm }
    }
}

// ── Geometry ────────────────────────────────────────────────────

/// Plate dimensions in metres.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Length along x, in m. The mesh resolution counts cells along this axis.
    pub length_m: f64,
    /// Width along y, in m.
    pub width_m: f64,
    /// Through-plane thickness, in m. Temperature is uniform through it.
    pub thickness_m: f64,
}

impl Geometry {
    /// Build a geometry from millimetre dimensions.
    pub fn from_mm(length_mm: f64, width_mm: f64, thickness_mm: f64) -> Self {
        Self {
            length_m: mm_to_m(length_mm),
            width_m: mm_to_m(width_mm),
            thickness_m: mm_to_m(thickness_mm),
        }
    }

    /// Whether `point` lies inside `[0, length] x [0, width]` (edges included).
    pub fn contains(&self, point: PlatePoint) -> bool {
        let (x, y) = (mm_to_m(point.x_mm), mm_to_m(point.y_mm));
        (0.0..=self.length_m).contains(&x) && (0.0..=self.width_m).contains(&y)
    }
}

// ── Material ────────────────────────────────────────────────────

/// Bulk material properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Thermal conductivity k, in W/(m·K).
    pub conductivity: f64,
    /// Density ρ, in kg/m³.
    pub density: f64,
    /// Specific heat capacity cp, in J/(kg·K).
    pub specific_heat: f64,
}

impl Material {
    /// Volumetric heat capacity ρ·cp, in J/(m³·K).
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.density * self.specific_heat
    }

    /// Thermal diffusivity α = k / (ρ·cp), in m²/s.
    pub fn diffusivity(&self) -> f64 {
        self.conductivity / self.volumetric_heat_capacity()
    }
}

// ── Convection ──────────────────────────────────────────────────

/// Lumped convective exchange with the surrounding air.
#[derive(Clone, Debug, PartialEq)]
pub struct Convection {
    /// Convection coefficient h, in W/(m²·K). Zero insulates every face.
    pub coefficient: f64,
    /// Ambient air temperature, in °C.
    pub ambient_c: f64,
}

// ── Sources ─────────────────────────────────────────────────────

/// Electrical drive of a resistive heater.
///
/// The delivered power is the drive current multiplied by an empirical
/// transfer coefficient. Both factors may carry a sign (the sign convention
/// of the drive electronics), only their product matters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaterDrive {
    /// Drive current, in A.
    pub current_a: f64,
    /// Power delivered per ampere of drive, in W/A.
    pub transfer_w_per_a: f64,
}

impl HeaterDrive {
    /// Power delivered to the plate, in W.
    pub fn magnitude(&self) -> f64 {
        self.current_a * self.transfer_w_per_a
    }
}

/// A point power source with its activity window.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDescriptor {
    /// Where the power is injected.
    pub position: PlatePoint,
    /// Injected power while active, in W.
    pub magnitude_w: f64,
    /// Simulated-time window during which the source is on.
    pub window: ActiveWindow,
}

impl SourceDescriptor {
    /// A source that is never active.
    pub fn inactive(position: PlatePoint) -> Self {
        Self {
            position,
            magnitude_w: 0.0,
            window: ActiveWindow::never(),
        }
    }

    /// A source whose power comes from a [`HeaterDrive`].
    pub fn driven(position: PlatePoint, drive: HeaterDrive, window: ActiveWindow) -> Self {
        Self {
            position,
            magnitude_w: drive.magnitude(),
            window,
        }
    }
}

// ── PhysicalParameters ──────────────────────────────────────────

/// Complete physical description of one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalParameters {
    /// Plate dimensions.
    pub geometry: Geometry,
    /// Plate material.
    pub material: Material,
    /// Convective exchange on every face.
    pub convection: Convection,
    /// Offset added to ambient for the initial plate temperature, in K.
    pub initial_offset_k: f64,
    /// Number of cells along the plate length.
    pub mesh_resolution: usize,
    /// Simulated duration of the run, in s.
    pub total_time_s: f64,
    /// Primary heat source.
    pub heater: SourceDescriptor,
    /// Independent disturbance source.
    pub perturbation: SourceDescriptor,
    /// Thermistor positions, in log-column order. Exactly
    /// [`THERMISTOR_COUNT`] of them.
    pub thermistors: Vec<PlatePoint>,
}

impl Default for PhysicalParameters {
    /// A 120 x 120 x 1.5 mm aluminium plate, heated at a quarter of its
    /// length for the whole run, with thermistors at the centre, at three
    /// quarters and near the far edge.
    fn default() -> Self {
        let total_time_s = 500.0;
        Self {
            geometry: Geometry::from_mm(120.0, 120.0, 1.5),
            material: Material {
                conductivity: 205.0,
                density: 2800.0,
                specific_heat: 890.0,
            },
            convection: Convection {
                coefficient: 7.0,
                ambient_c: 25.0,
            },
            initial_offset_k: 0.0,
            mesh_resolution: 60,
            total_time_s,
            heater: SourceDescriptor {
                position: PlatePoint::new(30.0, 60.0),
                magnitude_w: 1.17,
                window: ActiveWindow::new(0.0, total_time_s),
            },
            perturbation: SourceDescriptor::inactive(PlatePoint::new(90.0, 60.0)),
            thermistors: vec![
                PlatePoint::new(60.0, 60.0),
                PlatePoint::new(90.0, 90.0),
                PlatePoint::new(110.0, 60.0),
            ],
        }
    }
}

impl PhysicalParameters {
    /// Check every physical invariant.
    ///
    /// Runs in declaration order and reports the first violation.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.mesh_resolution < 1 {
            return Err(ParameterError::MeshTooCoarse {
                resolution: self.mesh_resolution,
            });
        }

        let g = &self.geometry;
        positive("plate length", g.length_m)?;
        positive("plate width", g.width_m)?;
        positive("plate thickness", g.thickness_m)?;

        let m = &self.material;
        positive("thermal conductivity", m.conductivity)?;
        positive("density", m.density)?;
        positive("specific heat", m.specific_heat)?;

        non_negative("convection coefficient", self.convection.coefficient)?;
        non_negative("total time", self.total_time_s)?;

        finite("ambient temperature", self.convection.ambient_c)?;
        finite("initial temperature offset", self.initial_offset_k)?;
        above_absolute_zero("ambient temperature", self.convection.ambient_c)?;
        above_absolute_zero(
            "initial plate temperature",
            self.convection.ambient_c + self.initial_offset_k,
        )?;

        finite("heater magnitude", self.heater.magnitude_w)?;
        finite("perturbation magnitude", self.perturbation.magnitude_w)?;
        non_negative("perturbation magnitude", self.perturbation.magnitude_w)?;

        self.check_window("heater", &self.heater.window)?;
        self.check_window("perturbation", &self.perturbation.window)?;

        self.check_inside("heater".to_string(), self.heater.position)?;
        self.check_inside("perturbation".to_string(), self.perturbation.position)?;
        if self.thermistors.len() != THERMISTOR_COUNT {
            return Err(ParameterError::ThermistorCount {
                configured: self.thermistors.len(),
                required: THERMISTOR_COUNT,
            });
        }
        for (i, &point) in self.thermistors.iter().enumerate() {
            self.check_inside(format!("thermistor t{}", i + 1), point)?;
        }

        Ok(())
    }

    fn check_window(
        &self,
        source: &'static str,
        window: &ActiveWindow,
    ) -> Result<(), ParameterError> {
        let total_time = self.total_time_s;
        let ordered = window.start_s >= 0.0
            && window.start_s <= window.stop_s
            && window.stop_s <= total_time;
        if ordered {
            Ok(())
        } else {
            Err(ParameterError::InvalidWindow {
                source,
                start: window.start_s,
                stop: window.stop_s,
                total_time,
            })
        }
    }

    fn check_inside(&self, item: String, position: PlatePoint) -> Result<(), ParameterError> {
        if self.geometry.contains(position) {
            Ok(())
        } else {
            Err(ParameterError::OutsidePlate {
                item,
                position,
                length_mm: m_to_mm(self.geometry.length_m),
                width_mm: m_to_mm(self.geometry.width_m),
            })
        }
    }
}

fn finite(quantity: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NonFinite { quantity, value })
    }
}

fn positive(quantity: &'static str, value: f64) -> Result<(), ParameterError> {
    finite(quantity, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositive { quantity, value })
    }
}

fn non_negative(quantity: &'static str, value: f64) -> Result<(), ParameterError> {
    finite(quantity, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ParameterError::Negative { quantity, value })
    }
}

fn above_absolute_zero(quantity: &'static str, celsius: f64) -> Result<(), ParameterError> {
    if celsius >= ABSOLUTE_ZERO_C {
        Ok(())
    } else {
        Err(ParameterError::BelowAbsoluteZero { quantity, celsius })
    }
}
