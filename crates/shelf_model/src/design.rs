//! Whole-design loading driven by the `.aux` manifest.
//!
//! A design bundle is a directory holding one `.aux` manifest and the
//! member files it names. Loading parses every member in dependency order
//! (library, layout, nodes, nets, then the optional placement and
//! weights) and runs the cross-model checks, so a loaded [`Design`] is
//! either fully consistent or its problems are sitting in the caller's
//! [`DiagnosticSink`].

use crate::diag::DiagnosticSink;
use crate::dialect::Dialect;
use crate::error::LoadError;
use crate::layout::{parse_scl, Layout};
use crate::library::{parse_lib, Library};
use crate::manifest::{parse_aux, AuxManifest};
use crate::netlist::{parse_nets, parse_nodes, Netlist};
use crate::placement::{parse_pl, PlacementSet};
use crate::validate::check_design;
use crate::weights::{parse_wts, NetWeights};
use std::path::Path;

/// A fully parsed design bundle.
#[derive(Debug, Clone)]
pub struct Design {
    /// The design name from the manifest.
    pub name: String,
    /// The cell library.
    pub library: Library,
    /// The device layout.
    pub layout: Layout,
    /// Instances and nets.
    pub netlist: Netlist,
    /// Placements, if the bundle carries a `.pl`.
    pub placement: Option<PlacementSet>,
    /// Net weights, if the bundle carries a `.wts`.
    pub weights: Option<NetWeights>,
}

impl Design {
    /// Loads a design bundle from a directory.
    ///
    /// Locates the `.aux` manifest (lexicographically first if several
    /// exist), parses every member file, and runs the cross-model checks,
    /// emitting findings into `sink`. Parse failures are fatal; validation
    /// findings are not; callers decide how to treat a sink with errors.
    pub fn load(dir: &Path, dialect: &Dialect, sink: &DiagnosticSink) -> Result<Self, LoadError> {
        let manifest = find_manifest(dir, dialect)?;
        Self::load_from_manifest(dir, &manifest, dialect, sink)
    }

    /// Loads the members named by an already-parsed manifest.
    pub fn load_from_manifest(
        dir: &Path,
        manifest: &AuxManifest,
        dialect: &Dialect,
        sink: &DiagnosticSink,
    ) -> Result<Self, LoadError> {
        let library = {
            let (path, text) = read_member(dir, manifest, "lib")?;
            parse_lib(&text, dialect).map_err(|e| e.with_file(path))?
        };
        let layout = {
            let (path, text) = read_member(dir, manifest, "scl")?;
            parse_scl(&text, dialect).map_err(|e| e.with_file(path))?
        };
        let mut netlist = {
            let (path, text) = read_member(dir, manifest, "nodes")?;
            parse_nodes(&text, &library, dialect).map_err(|e| e.with_file(path))?
        };
        {
            let (path, text) = read_member(dir, manifest, "nets")?;
            parse_nets(&text, &library, &mut netlist, dialect)
                .map_err(|e| e.with_file(path))?;
        }
        let placement = match read_optional_member(dir, manifest, "pl")? {
            Some((path, text)) => {
                Some(parse_pl(&text, &netlist, dialect).map_err(|e| e.with_file(path))?)
            }
            None => None,
        };
        let weights = match read_optional_member(dir, manifest, "wts")? {
            Some((path, text)) => {
                Some(parse_wts(&text, dialect).map_err(|e| e.with_file(path))?)
            }
            None => None,
        };

        let design = Self {
            name: manifest.design_name.clone(),
            library,
            layout,
            netlist,
            placement,
            weights,
        };
        design.check(sink);
        Ok(design)
    }

    /// Runs the cross-model checks, emitting findings into `sink`.
    pub fn check(&self, sink: &DiagnosticSink) {
        check_design(
            &self.library,
            &self.layout,
            &self.netlist,
            self.placement.as_ref(),
            sink,
        );
        if let Some(weights) = &self.weights {
            weights.resolve(&self.netlist, sink);
        }
    }
}

/// Locates and parses the `.aux` manifest in a design directory.
pub fn find_manifest(dir: &Path, dialect: &Dialect) -> Result<AuxManifest, LoadError> {
    let mut aux_paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| LoadError::io(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("aux"))
                .unwrap_or(false)
        })
        .collect();
    aux_paths.sort();

    let Some(path) = aux_paths.into_iter().next() else {
        return Err(LoadError::NoManifest(dir.to_path_buf()));
    };
    let text = std::fs::read_to_string(&path).map_err(|e| LoadError::io(&path, e))?;
    parse_aux(&text, dialect)
        .map_err(|e| e.with_file(path))
        .map_err(LoadError::from)
}

fn read_member(
    dir: &Path,
    manifest: &AuxManifest,
    extension: &str,
) -> Result<(std::path::PathBuf, String), LoadError> {
    read_optional_member(dir, manifest, extension)?.ok_or_else(|| LoadError::MissingMember {
        design: manifest.design_name.clone(),
        extension: extension.to_string(),
    })
}

fn read_optional_member(
    dir: &Path,
    manifest: &AuxManifest,
    extension: &str,
) -> Result<Option<(std::path::PathBuf, String)>, LoadError> {
    let Some(name) = manifest.member_with_extension(extension) else {
        return Ok(None);
    };
    let path = dir.join(name);
    let text = std::fs::read_to_string(&path).map_err(|e| LoadError::io(&path, e))?;
    Ok(Some((path, text)))
}
