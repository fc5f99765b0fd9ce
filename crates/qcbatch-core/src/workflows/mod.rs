//! # Workflows Module
//!
//! This module provides the high-level entry points that tie the engine and
//! core layers together into complete automation procedures.
//!
//! ## Overview
//!
//! Workflows are the top-level API for users of qcbatch. Each one handles
//! validation, staging, progress reporting, and result organization around a
//! complete procedure, so callers deal only in inputs, configuration, and
//! aggregate results.
//!
//! ## Architecture
//!
//! The module is organized around the stages of a typical campaign:
//!
//! - **Calculation Workflow** ([`calculate`]) - Parallel batch execution of
//!   the configured command chain over a set of structures, plus the
//!   degenerate single-structure case.
//! - **Generation Workflow** ([`generate`]) - Sequential SMILES-to-XYZ
//!   coordinate generation with failure logging, producing the inputs the
//!   calculation workflow consumes.
//! - **Collection Workflow** ([`collect`]) - Post-run export of optimized
//!   structures with their original metadata and a CSV dataset index.
//!
//! ## Key Capabilities
//!
//! - **Ordered, partial-failure-tolerant batches** that always complete with
//!   a summary
//! - **Progress monitoring** with per-phase and per-unit reporting
//! - **On-disk traceability** keeping every unit's staged input and step
//!   logs after the run

pub mod calculate;
pub mod collect;
pub mod generate;
