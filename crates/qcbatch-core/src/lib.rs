//! # qcbatch Core Library
//!
//! A parallel batch-execution engine for quantum-chemistry calculations that
//! are carried out by external programs such as `xtb`.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless building blocks: XYZ
//!   structure I/O (`XyzDocument`) and coordinate generation collaborators
//!   (`CoordinateGenerator`, `ObabelGenerator`).
//!
//! - **[`engine`]: The Logic Core.** This layer implements batch execution:
//!   staging each structure into an isolated working directory, running its
//!   configured command chain step by step (`sequencer`), and scheduling
//!   units across a bounded worker pool (`scheduler`) with per-unit failure
//!   containment and ordered result collection.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties the `engine` and `core` together to execute complete
//!   procedures: batch calculation, coordinate generation, and result
//!   collection. It provides a simple and powerful entry point for end-users
//!   of the library.

pub mod core;
pub mod engine;
pub mod workflows;
