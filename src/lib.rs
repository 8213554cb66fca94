//! # Cellsim - Multi-cell 5G scenario synthesis and performance scoring
//!
//! This library synthesizes deterministic multi-cell wireless test
//! scenarios and turns the telemetry and flow statistics of a simulation
//! run into scored per-flow, per-cell and system-wide reports.
//!
//! ## Overview
//!
//! Cellsim does not model radio propagation, scheduling or mobility. Those
//! belong to an external simulation engine. Cellsim lays out the cell
//! sites, places and classifies terminals, plans their offered traffic,
//! receives the engine's telemetry through a [`telemetry::TelemetrySink`]
//! and scores the engine's final flow snapshot once the run has finished.
//!
//! ## Key Features
//!
//! - **Site Layouts**: Dedicated 1, 3, 5, 7 and 9 site patterns, ring fallback otherwise
//! - **Density Classes**: Dense urban hotspots or sparse suburban coverage
//! - **Two Traffic Classes**: eMBB (throughput) and URLLC (latency)
//! - **Bounded Telemetry**: Running SINR statistics plus a 1000-sample window per terminal
//! - **Clamped Scores**: QoE and reliability scores always within [0, 100]
//! - **Reproducible**: One seeded random stream drives the whole scenario
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `config_loader`: Configuration file loading and CLI overrides
//! - `topology`: Site layout, terminal placement, classification and traffic plan
//! - `telemetry`: Telemetry sink interface and the aggregator behind it
//! - `engine`: Simulation engine seam and the trace replay engine
//! - `analysis`: Scoring and report generation
//! - `registry`: Scenario layout and terminal registry files
//! - `utils`: Scenario validation and number formatting
//! - `orchestrator`: End-to-end wiring of a run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use cellsim::{config_loader, engine::ReplayEngine, orchestrator};
//!
//! let config = config_loader::load_config(Path::new("scenario.yaml"))?;
//! let mut engine = ReplayEngine::from_path(Path::new("trace.json"))?;
//!
//! // Writes flow, cell and system reports into ./results
//! orchestrator::run_scenario(&config, &mut engine, Path::new("results"))?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   sim_time: "15s"
//!   app_start_time: "5s"
//!   seed: 1
//!
//! scenario:
//!   num_cells: 3
//!   num_ues: 30
//!   embb_ratio: 0.6
//!   isd: 200
//!   dense: true
//! ```
//!
//! ## Error Handling
//!
//! Library errors are typed with `thiserror`; file and pipeline operations
//! return `color_eyre::eyre::Result` with context on every I/O step.

pub mod config;
pub mod config_loader;
pub mod topology;
pub mod telemetry;
pub mod engine;
pub mod analysis;
pub mod registry;
pub mod utils;
pub mod orchestrator;
