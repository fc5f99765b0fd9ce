//! Provides input/output functionality for molecular structure files.
//!
//! The batch engine deliberately understands only as much chemistry as the
//! XYZ container format requires: an atom count, a free-form comment line,
//! and element/coordinate records. Everything else is the domain of the
//! external programs the engine drives.

pub mod xyz;
