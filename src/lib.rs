//! # Pokédash - interactive Pokémon statistics dashboard
//!
//! Loads a Pokédex CSV once, then answers every UI change by recomputing only
//! the charts that depend on the control that changed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pokedash::dataset::Dataset;
//! use pokedash::engine::{filter_by_types, mean_by_type};
//!
//! let dataset = Dataset::load("data/pokedex.csv".as_ref())?;
//! let fire_and_water = filter_by_types(&dataset, &["Fire", "Water"]);
//! for (type_name, mean) in mean_by_type(&fire_and_water, "HP")? {
//!     println!("{type_name}: {mean:.2}");
//! }
//! # Ok::<(), pokedash::error::DashboardError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`dataset`]: CSV loading and validation, the immutable table of creatures
//! - [`engine`]: pure filters and aggregations over the dataset
//! - [`bindings`]: the reactive graph linking UI inputs to chart outputs
//! - [`figure`]: renderer-independent chart and table descriptions
//! - [`table`]: filtering, sorting and paging for the data table
//! - [`gui`]: the eframe window that draws all of the above

#![warn(clippy::all, rust_2018_idioms)]

pub mod bindings;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod figure;
pub mod gui;
pub mod logging;
pub mod table;
pub mod theme;
pub mod utils;
