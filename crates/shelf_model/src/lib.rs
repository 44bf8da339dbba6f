//! Data model and strict parsers for the extended-Bookshelf FPGA
//! placement interchange format.
//!
//! The format family is plain-text and line-oriented: a cell library
//! (`.lib`), a device layout (`.scl`, with site definitions, a
//! cell-to-resource mapping, and the full device grid), a netlist
//! (`.nodes` + `.nets`), per-instance placements (`.pl`), and the
//! supplemental net weights (`.wts`) and design manifest (`.aux`).
//!
//! Each parser produces a validated, immutable in-memory model or fails
//! with a [`FormatError`]; no partial models are returned. Cross-file
//! consistency (placements against the grid, BEL indexes against site
//! capacities) is checked by [`validate::check_design`] or, for whole
//! bundles, [`Design::load`], with findings reported through a
//! [`DiagnosticSink`].
//!
//! # Example
//!
//! ```
//! use shelf_model::{parse_lib, parse_nodes, Dialect};
//!
//! let dialect = Dialect::default();
//! let library = parse_lib("CELL INV\n PIN A INPUT\n PIN Y OUTPUT\nEND CELL\n", &dialect)?;
//! let netlist = parse_nodes("u0 INV\n", &library, &dialect)?;
//! assert_eq!(netlist.instance_count(), 1);
//! # Ok::<(), shelf_model::FormatError>(())
//! ```

#![warn(missing_docs)]

pub mod design;
pub mod diag;
pub mod dialect;
pub mod error;
pub mod ids;
pub mod layout;
pub mod library;
pub mod manifest;
pub mod netlist;
pub mod placement;
pub mod validate;
pub mod weights;

mod parse;

pub use design::{find_manifest, Design};
pub use diag::{Diagnostic, DiagnosticSink, Severity};
pub use dialect::Dialect;
pub use error::{FormatError, LoadError};
pub use ids::{CellId, InstanceId, NetId, ResourceId, SiteTypeId};
pub use layout::{parse_scl, write_scl, DeviceGrid, Layout, ResourceTable, SiteDef};
pub use library::{parse_lib, write_lib, Library, LibraryCell, Pin, PinDirection};
pub use manifest::{parse_aux, write_aux, AuxManifest};
pub use netlist::{parse_nets, parse_nodes, write_nets, write_nodes, Instance, Net, Netlist, PinRef};
pub use placement::{
    parse_pl, write_pl, FixedViolation, IncompletePlacement, Placement, PlacementCoverage,
    PlacementSet,
};
pub use validate::check_design;
pub use weights::{parse_wts, write_wts, NetWeights};
