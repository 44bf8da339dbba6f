//! Cross-model consistency checks.
//!
//! The per-file parsers guarantee each model is internally consistent;
//! the checks here join the models: placement coordinates against the
//! grid, instance resource kinds against site capacities, BEL indexes
//! against per-kind slot counts, and slot occupancy conflicts.
//!
//! Findings go to a [`DiagnosticSink`]; messages carry the instance
//! names, coordinates, and grid bounds needed to locate the offending
//! record without re-parsing.

use crate::diag::{Diagnostic, DiagnosticSink};
use crate::ids::ResourceId;
use crate::layout::Layout;
use crate::library::Library;
use crate::netlist::Netlist;
use crate::placement::PlacementSet;
use std::collections::{HashMap, HashSet};

/// Runs every cross-model check over a joined design.
///
/// `placement` is optional: input bundles may carry no `.pl`, in which
/// case only the library/layout joins are checked.
pub fn check_design(
    library: &Library,
    layout: &Layout,
    netlist: &Netlist,
    placement: Option<&PlacementSet>,
    sink: &DiagnosticSink,
) {
    check_resource_bindings(library, layout, netlist, sink);
    if let Some(placement) = placement {
        check_placements(library, layout, netlist, placement, sink);
    }
}

/// Checks the RESOURCES mapping against the library and the grid.
///
/// A binding naming a cell the library does not define is a warning (the
/// mapping may be shared across designs). A resource kind that instances
/// actually use but no site in the grid can host is an error; an unused
/// unhosted kind is only a warning.
fn check_resource_bindings(
    library: &Library,
    layout: &Layout,
    netlist: &Netlist,
    sink: &DiagnosticSink,
) {
    let resources = layout.resources();

    for (cell, _) in resources.bindings() {
        if library.lookup(cell).is_none() {
            sink.emit(Diagnostic::warning(format!(
                "resource mapping names cell '{cell}' which the library does not define"
            )));
        }
    }

    let mut used_kinds: HashSet<ResourceId> = HashSet::new();
    for inst in netlist.instances() {
        let cell_name = &library.cell(inst.cell).name;
        if let Some(kind) = resources.resource_of_cell(cell_name) {
            used_kinds.insert(kind);
        }
    }

    for (kind, kind_name) in resources.kinds() {
        if layout.sites_hosting(kind) > 0 {
            continue;
        }
        if used_kinds.contains(&kind) {
            sink.emit(Diagnostic::error(format!(
                "resource kind '{kind_name}' is used by instances but no site in the grid hosts it"
            )));
        } else {
            sink.emit(Diagnostic::warning(format!(
                "resource kind '{kind_name}' is not hosted by any site in the grid"
            )));
        }
    }
}

/// Checks every placement against the grid and the site capacities.
fn check_placements(
    library: &Library,
    layout: &Layout,
    netlist: &Netlist,
    placement: &PlacementSet,
    sink: &DiagnosticSink,
) {
    let grid = layout.grid();
    let resources = layout.resources();
    // Occupancy per (x, y, bel, kind). Distinct kinds share a BEL index
    // (the SLICE LUT/FF pairing); same-kind collisions are conflicts.
    let mut occupied: HashMap<(u32, u32, u32, ResourceId), String> = HashMap::new();
    // Cells without a resource mapping are reported once, not per instance.
    let mut unmapped_cells: HashSet<String> = HashSet::new();

    for (id, p) in placement.iter_placed() {
        let inst = netlist.instance(id);

        let Some(site) = grid.site_at(p.x, p.y) else {
            sink.emit(Diagnostic::error(format!(
                "instance '{}' placed at ({}, {}) outside the {}x{} grid",
                inst.name,
                p.x,
                p.y,
                grid.width(),
                grid.height()
            )));
            continue;
        };

        let cell_name = &library.cell(inst.cell).name;
        let Some(kind) = resources.resource_of_cell(cell_name) else {
            if unmapped_cells.insert(cell_name.clone()) {
                sink.emit(Diagnostic::warning(format!(
                    "cell '{cell_name}' has no resource mapping; placement compatibility \
                     of its instances is unchecked"
                )));
            }
            continue;
        };

        let def = layout.site_def(site);
        let capacity = def.capacity(kind);
        let kind_name = resources.kind_name(kind);

        if capacity == 0 {
            sink.emit(Diagnostic::error(format!(
                "instance '{}' ({kind_name}) placed at ({}, {}) on site type '{}' \
                 which hosts no {kind_name} slots",
                inst.name, p.x, p.y, def.name
            )));
            continue;
        }

        if p.bel >= capacity {
            sink.emit(Diagnostic::error(format!(
                "instance '{}' placed at BEL {} but site type '{}' has {capacity} \
                 {kind_name} slots (0..={})",
                inst.name,
                p.bel,
                def.name,
                capacity - 1
            )));
            continue;
        }

        if let Some(other) = occupied.insert((p.x, p.y, p.bel, kind), inst.name.clone()) {
            sink.emit(Diagnostic::error(format!(
                "instances '{other}' and '{}' ({kind_name}) both placed at ({}, {}, BEL {})",
                inst.name, p.x, p.y, p.bel
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::library::parse_lib;
    use crate::layout::parse_scl;
    use crate::netlist::parse_nodes;
    use crate::placement::parse_pl;

    const LIB: &str = "\
CELL LUT4
  PIN I0 INPUT
  PIN O OUTPUT
END CELL
CELL DFF
  PIN D INPUT
  PIN Q OUTPUT
END CELL
CELL IBUF
  PIN O OUTPUT
END CELL
";

    const SCL: &str = "\
SITE SLICE
  LUT 16
  FF 16
END SITE
SITE IOB
  IO 2
END SITE
RESOURCES
  LUT LUT4
  FF DFF
  IO IBUF
END RESOURCES
SITEMAP 2 2
0 0 IOB
1 0 SLICE
0 1 IOB
1 1 SLICE
END SITEMAP
";

    const NODES: &str = "\
lut_a LUT4
lut_b LUT4
ff_a DFF
IBUF0 IBUF
";

    fn fixture(pl: &str) -> (DiagnosticSink, Vec<crate::diag::Diagnostic>) {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        let layout = parse_scl(SCL, &dialect).unwrap();
        let netlist = parse_nodes(NODES, &library, &dialect).unwrap();
        let placement = parse_pl(pl, &netlist, &dialect).unwrap();
        let sink = DiagnosticSink::new();
        check_design(&library, &layout, &netlist, Some(&placement), &sink);
        let diags = sink.diagnostics();
        (sink, diags)
    }

    #[test]
    fn clean_design_has_no_findings() {
        let (sink, diags) = fixture("IBUF0 0 0 0 FIXED\nlut_a 1 0 3\nff_a 1 0 3\n");
        assert!(!sink.has_errors(), "unexpected: {diags:?}");
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn out_of_bounds_is_error() {
        let (sink, diags) = fixture("lut_a 5 1 0\n");
        assert!(sink.has_errors());
        assert!(diags[0].message.contains("'lut_a'"));
        assert!(diags[0].message.contains("(5, 1)"));
        assert!(diags[0].message.contains("2x2 grid"));
    }

    #[test]
    fn incompatible_site_is_error() {
        // IOB hosts no LUT slots.
        let (sink, diags) = fixture("lut_a 0 0 0\n");
        assert!(sink.has_errors());
        assert!(diags[0].message.contains("hosts no LUT slots"));
    }

    #[test]
    fn bel_over_capacity_is_error() {
        let (sink, diags) = fixture("lut_a 1 0 16\n");
        assert!(sink.has_errors());
        assert!(diags[0].message.contains("BEL 16"));
        assert!(diags[0].message.contains("16 LUT slots (0..=15)"));
    }

    #[test]
    fn bel_capacity_is_per_site_type() {
        // IOB declares 2 IO slots, so BEL 1 passes and BEL 2 fails.
        let (sink_ok, _) = fixture("IBUF0 0 0 1 FIXED\n");
        assert!(!sink_ok.has_errors());
        let (sink_bad, diags) = fixture("IBUF0 0 0 2 FIXED\n");
        assert!(sink_bad.has_errors());
        assert!(diags[0].message.contains("2 IO slots"));
    }

    #[test]
    fn same_kind_same_bel_conflicts() {
        let (sink, diags) = fixture("lut_a 1 0 7\nlut_b 1 0 7\n");
        assert!(sink.has_errors());
        assert!(diags[0].message.contains("'lut_a'"));
        assert!(diags[0].message.contains("'lut_b'"));
        assert!(diags[0].message.contains("BEL 7"));
    }

    #[test]
    fn distinct_kinds_share_bel() {
        // A LUT-kind and an FF-kind instance pair on BEL 7 of one SLICE.
        let (sink, diags) = fixture("lut_a 1 0 7\nff_a 1 0 7\n");
        assert!(!sink.has_errors(), "unexpected: {diags:?}");
    }

    #[test]
    fn unmapped_cell_warns_once() {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        // Layout whose RESOURCES omits LUT4.
        let scl = "\
SITE SLICE
  LUT 16
END SITE
RESOURCES
  FF DFF
END RESOURCES
SITEMAP 1 1
0 0 SLICE
END SITEMAP
";
        let layout = parse_scl(scl, &dialect).unwrap();
        let netlist = parse_nodes("lut_a LUT4\nlut_b LUT4\n", &library, &dialect).unwrap();
        let placement = parse_pl("lut_a 0 0 0\nlut_b 0 0 1\n", &netlist, &dialect).unwrap();
        let sink = DiagnosticSink::new();
        check_design(&library, &layout, &netlist, Some(&placement), &sink);
        let unmapped: Vec<_> = sink
            .diagnostics()
            .into_iter()
            .filter(|d| d.message.contains("no resource mapping"))
            .collect();
        assert_eq!(unmapped.len(), 1);
    }

    #[test]
    fn unknown_binding_cell_warns() {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        let scl = "\
SITE SLICE
  LUT 16
END SITE
RESOURCES
  LUT LUT4 LUT9000
END RESOURCES
SITEMAP 1 1
0 0 SLICE
END SITEMAP
";
        let layout = parse_scl(scl, &dialect).unwrap();
        let netlist = parse_nodes("lut_a LUT4\n", &library, &dialect).unwrap();
        let sink = DiagnosticSink::new();
        check_design(&library, &layout, &netlist, None, &sink);
        assert!(!sink.has_errors());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("'LUT9000'")));
    }

    #[test]
    fn used_unhosted_kind_is_error() {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        // DFF maps to FF, but no site hosts FF.
        let scl = "\
SITE SLICE
  LUT 16
END SITE
RESOURCES
  LUT LUT4
  FF DFF
END RESOURCES
SITEMAP 1 1
0 0 SLICE
END SITEMAP
";
        let layout = parse_scl(scl, &dialect).unwrap();
        let netlist = parse_nodes("ff_a DFF\n", &library, &dialect).unwrap();
        let sink = DiagnosticSink::new();
        check_design(&library, &layout, &netlist, None, &sink);
        assert!(sink.has_errors());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("'FF'") && d.message.contains("no site")));
    }

    #[test]
    fn unused_unhosted_kind_warns() {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        let scl = "\
SITE SLICE
  LUT 16
END SITE
RESOURCES
  LUT LUT4
  FF DFF
END RESOURCES
SITEMAP 1 1
0 0 SLICE
END SITEMAP
";
        let layout = parse_scl(scl, &dialect).unwrap();
        let netlist = parse_nodes("lut_a LUT4\n", &library, &dialect).unwrap();
        let sink = DiagnosticSink::new();
        check_design(&library, &layout, &netlist, None, &sink);
        assert!(!sink.has_errors());
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("'FF'") && d.message.contains("not hosted")));
    }
}
