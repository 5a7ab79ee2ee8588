//! Explicit finite-difference stepper for Thermoplate.
//!
//! [`Stepper`] advances a [`Grid`](thermoplate_core::Grid) one `dt` at a
//! time: 2-D conduction, lumped convection through every face, and the two
//! scheduled point sources. The arithmetic lives in [`kernel`], which offers
//! a whole-field ([`StencilKernel::Sliced`]) and a per-cell
//! ([`StencilKernel::PerCell`]) implementation with bitwise-identical
//! results.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod kernel;
pub mod stepper;

pub use kernel::{StencilInput, StencilKernel, StepCoefficients};
pub use stepper::Stepper;
