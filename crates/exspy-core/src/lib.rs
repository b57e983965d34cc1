//! Analysis library for electron energy-loss spectroscopy (EELS) and
//! energy-dispersive X-ray spectroscopy (EDS) data.
//!
//! The crate bundles the atomic reference database (X-ray line energies,
//! electron binding energies, element properties), the physics formulas
//! built on it (take-off angle, electron/X-ray ranges, inelastic mean free
//! paths, quantification models), spectrum types carrying the domain
//! methods (line/edge identification, background-windowed intensity
//! integration, thickness estimation, Fourier and Richardson-Lucy
//! deconvolution, Kramers-Kronig analysis), and parametrized peak-shape
//! components for an external curve-fitting engine.

pub mod common;
pub mod components;
pub mod database;
pub mod domain;
pub mod eds;
pub mod eels;
pub mod numerics;
