//! # Core Module
//!
//! This module provides the foundational building blocks for quantum-chemistry
//! batch automation in qcbatch, serving as the stateless base layer of the
//! library.
//!
//! ## Overview
//!
//! The core module implements the data structures and collaborators that the
//! execution engine builds upon: reading and writing molecular structure
//! files, and producing 3-D starting structures from line notation via
//! external generators.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **File I/O** ([`io`]) - Reading/writing XYZ structure files and deriving
//!   chemical formulas from their atom records
//! - **Coordinate Generation** ([`generation`]) - SMILES-to-3D structure
//!   generation through external tools, with failure logging
//!
//! ## Key Capabilities
//!
//! - **Strict XYZ parsing** with line-precise diagnostics
//! - **Formula derivation** in conventional C, H, then alphabetical order
//! - **Pluggable coordinate generators** behind a narrow trait seam
//! - **Append-only failure logs** that survive partial batch failures

pub mod generation;
pub mod io;
