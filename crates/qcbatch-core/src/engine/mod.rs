//! # Engine Module
//!
//! This module implements the batch-execution engine of qcbatch: running a
//! configured chain of external quantum-chemistry commands for many input
//! structures in parallel, with per-structure isolation and failure
//! containment.
//!
//! ## Overview
//!
//! A batch run proceeds in three stages. Each input structure is first staged
//! into its own working directory ([`staging`]). The command chain is then
//! executed per unit by the [`sequencer`], which resolves input-filename
//! placeholders, captures each step's output into `step_<n>.log`, and stops
//! the chain on the first failure. The [`scheduler`] drives the sequencer
//! across a bounded worker pool and collects per-unit reports in submission
//! order.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Command templates, expected outputs,
//!   and worker-pool sizing with validation
//! - **Staging** ([`staging`]) - Isolated per-unit working directories
//! - **Sequencing** ([`sequencer`]) - Ordered command execution with
//!   inter-step dependency checks
//! - **Scheduling** ([`scheduler`]) - Bounded parallel execution with
//!   ordered result collection
//! - **Outcomes** ([`outcome`]) - Per-unit classifications and batch
//!   aggregates
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user
//!   feedback mechanisms
//! - **Error Handling** ([`error`]) - Batch-fatal error types
//!
//! ## Failure Model
//!
//! Everything that can go wrong for one unit - staging, a non-zero exit, a
//! missing intermediate artifact, an I/O error mid-chain - is contained at
//! the unit boundary and recorded in its report. Only invalid configuration,
//! an empty input set, or a worker-pool construction failure abort a batch.

pub mod config;
pub mod error;
pub mod outcome;
pub mod progress;
pub mod scheduler;
pub mod sequencer;
pub mod staging;
