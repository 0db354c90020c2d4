//! sass-serve - compile SCSS on demand and serve it over HTTP
//!
//! - [`setup`] returns an axum router that compiles `<name>.scss` whenever
//!   `<name>.css` is requested.
//! - [`compile_and_save`] and [`compile_and_save_multiple`] write compiled
//!   stylesheets to an output directory, which is deleted again when the
//!   process is interrupted (see [`cleanup`]).

pub mod cleanup;
pub mod compile;
pub mod config;
pub mod error;
pub mod handler;
pub mod importer;
pub mod paths;
pub mod run_mode;
pub mod save;
pub mod source_map;

pub use compile::{CompileOptions, Compiler, OutputStyle, SassOptions};
pub use error::{Error, Result};
pub use handler::{SetupOptions, Stylesheets, setup};
pub use importer::{Importer, TildeImporter};
pub use paths::ImportResolution;
pub use run_mode::RunMode;
pub use save::{
    BatchReport, CompileMultipleOptions, ErrorPolicy, compile_and_save, compile_and_save_multiple,
};
