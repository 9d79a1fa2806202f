//! AXI interconnect: registration, consistency checking and parameter derivation for a crossbar
//! built from independently described AXI interfaces.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::private_doc_tests)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::bare_urls)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

mod adapter;
mod builder;
mod config;
mod interface;
mod packer;
mod package;
pub mod region;
mod registry;
mod topology;
pub mod utils;
mod validator;
pub mod vir;
pub mod virgen;

pub use adapter::*;
pub use builder::*;
pub use config::{AdapterOptions, ConfigError, InterconnectConfig};
pub use interface::*;
pub use packer::*;
pub use package::*;
pub use region::{PackedParams, RegionParams, REGION_WIDTH_FIELD_WIDTH};
pub use registry::*;
pub use topology::*;
pub use utils::*;
pub use validator::*;
