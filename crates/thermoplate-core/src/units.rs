//! Unit conversions shared by the engine and its consumers.
//!
//! The engine carries temperatures in Kelvin. The offset used for the
//! Celsius conversion is the whole-degree `273`, applied identically when
//! the ambient temperature enters the model and when readings leave it.

/// Offset between the Celsius and Kelvin scales as used by the engine.
pub const KELVIN_OFFSET: f64 = 273.0;

/// Lowest physically meaningful Celsius temperature accepted as input.
pub const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Convert a Celsius temperature to the engine's Kelvin scale.
#[inline]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Convert an engine Kelvin temperature back to Celsius.
#[inline]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Millimetres to metres.
#[inline]
pub fn mm_to_m(mm: f64) -> f64 {
    mm / 1000.0
}

/// Metres to millimetres.
#[inline]
pub fn m_to_mm(m: f64) -> f64 {
    m * 1000.0
}
