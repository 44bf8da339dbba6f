//! Read-only statistics over a parsed design bundle.
//!
//! [`DesignReport::build`] makes a single pass over the four models and
//! aggregates counts, histograms, and per-resource utilization. It never
//! mutates parsed state; over-capacity utilization is reported as-is and
//! flagged through the caller's [`DiagnosticSink`], never clamped.
//!
//! The report renders as a human-readable text table
//! ([`DesignReport::to_text`]) or serializes to JSON via serde.

#![warn(missing_docs)]

use serde::Serialize;
use shelf_model::{Design, Diagnostic, DiagnosticSink};
use std::collections::HashMap;
use std::fmt::Write as _;

/// A name with an occurrence count, for histogram entries.
#[derive(Debug, Clone, Serialize)]
pub struct CountEntry {
    /// The counted name (cell type, site type, ...).
    pub name: String,
    /// Number of occurrences.
    pub count: u64,
}

/// Library statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CellStats {
    /// Number of cell definitions.
    pub defined: usize,
    /// Pin count per cell, in library order.
    pub pin_counts: Vec<CountEntry>,
}

/// Instance statistics.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
    /// Total instance count.
    pub total: usize,
    /// Total pin slots across instances (each instance contributes its
    /// master cell's pin count).
    pub pin_slots: u64,
    /// Instances per cell type, most common first.
    pub by_cell: Vec<CountEntry>,
}

/// Net statistics.
#[derive(Debug, Clone, Serialize)]
pub struct NetStats {
    /// Total net count.
    pub total: usize,
    /// Total pin references across all nets.
    pub pin_refs: u64,
    /// Smallest net degree, if any nets exist.
    pub min_degree: Option<usize>,
    /// Mean net degree, if any nets exist.
    pub avg_degree: Option<f64>,
    /// Largest net degree, if any nets exist.
    pub max_degree: Option<usize>,
}

/// Placement statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementStats {
    /// Number of placed instances.
    pub placed: usize,
    /// Number of fixed placements.
    pub fixed: usize,
    /// Fixed placements per cell type, most common first.
    pub fixed_by_cell: Vec<CountEntry>,
}

/// Device grid statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GridStats {
    /// Grid width in sites.
    pub width: u32,
    /// Grid height in sites.
    pub height: u32,
    /// Total sites (width × height).
    pub total_sites: u64,
    /// Sites per site type, most common first.
    pub by_type: Vec<CountEntry>,
}

/// Utilization of one resource kind.
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationRow {
    /// The resource kind name.
    pub resource: String,
    /// Instances whose master cell maps to this kind.
    pub used: u64,
    /// Total BEL capacity across the grid.
    pub capacity: u64,
    /// `used / capacity`; zero when the grid has no capacity for the kind.
    pub utilization: f64,
    /// `true` when demand exceeds capacity. Never clamped away.
    pub over_capacity: bool,
}

/// Net weight statistics.
#[derive(Debug, Clone, Serialize)]
pub struct WeightStats {
    /// Number of weighted nets.
    pub count: usize,
    /// Smallest weight.
    pub min: f64,
    /// Mean weight.
    pub avg: f64,
    /// Largest weight.
    pub max: f64,
}

/// The full statistics report for a design bundle.
#[derive(Debug, Clone, Serialize)]
pub struct DesignReport {
    /// The design name.
    pub design: String,
    /// Library statistics.
    pub cells: CellStats,
    /// Instance statistics.
    pub nodes: NodeStats,
    /// Net statistics.
    pub nets: NetStats,
    /// Placement statistics, if the bundle carries placements.
    pub placement: Option<PlacementStats>,
    /// Device grid statistics.
    pub grid: GridStats,
    /// Per-resource-kind utilization.
    pub utilization: Vec<UtilizationRow>,
    /// Net weight statistics, if the bundle carries weights.
    pub weights: Option<WeightStats>,
}

impl DesignReport {
    /// Builds the report in a single read-only pass over the design.
    ///
    /// Over-capacity resource kinds are flagged as warnings in `sink` in
    /// addition to being marked in the report rows.
    pub fn build(design: &Design, sink: &DiagnosticSink) -> Self {
        let cells = CellStats {
            defined: design.library.len(),
            pin_counts: design
                .library
                .iter()
                .map(|cell| CountEntry {
                    name: cell.name.clone(),
                    count: u64::from(cell.pin_count()),
                })
                .collect(),
        };

        let mut by_cell: HashMap<&str, u64> = HashMap::new();
        let mut pin_slots = 0u64;
        for inst in design.netlist.instances() {
            let cell = design.library.cell(inst.cell);
            *by_cell.entry(cell.name.as_str()).or_insert(0) += 1;
            pin_slots += u64::from(cell.pin_count());
        }
        let nodes = NodeStats {
            total: design.netlist.instance_count(),
            pin_slots,
            by_cell: sorted_histogram(by_cell),
        };

        let degrees: Vec<usize> = design.netlist.nets().map(|n| n.pins.len()).collect();
        let nets = NetStats {
            total: degrees.len(),
            pin_refs: degrees.iter().map(|&d| d as u64).sum(),
            min_degree: degrees.iter().min().copied(),
            avg_degree: if degrees.is_empty() {
                None
            } else {
                Some(degrees.iter().sum::<usize>() as f64 / degrees.len() as f64)
            },
            max_degree: degrees.iter().max().copied(),
        };

        let placement = design.placement.as_ref().map(|set| {
            let mut fixed_by_cell: HashMap<&str, u64> = HashMap::new();
            for (id, p) in set.iter_placed() {
                if p.fixed {
                    let cell = design.library.cell(design.netlist.instance(id).cell);
                    *fixed_by_cell.entry(cell.name.as_str()).or_insert(0) += 1;
                }
            }
            PlacementStats {
                placed: set.placed_count(),
                fixed: set.fixed_count(),
                fixed_by_cell: sorted_histogram(fixed_by_cell),
            }
        });

        let grid = design.layout.grid();
        let mut by_type: HashMap<&str, u64> = HashMap::new();
        for (_, _, site) in grid.iter() {
            let name = design.layout.site_def(site).name.as_str();
            *by_type.entry(name).or_insert(0) += 1;
        }
        let grid_stats = GridStats {
            width: grid.width(),
            height: grid.height(),
            total_sites: grid.site_count() as u64,
            by_type: sorted_histogram(by_type),
        };

        let utilization = utilization_rows(design, sink);

        let weights = design.weights.as_ref().filter(|w| !w.is_empty()).map(|w| {
            let values: Vec<f64> = w.iter().map(|(_, v)| v).collect();
            WeightStats {
                count: values.len(),
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                avg: values.iter().sum::<f64>() / values.len() as f64,
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        });

        Self {
            design: design.name.clone(),
            cells,
            nodes,
            nets,
            placement,
            grid: grid_stats,
            utilization,
            weights,
        }
    }

    /// Renders the report as human-readable text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "design: {}", self.design);

        let _ = writeln!(out, "\nlibrary ({} cells)", self.cells.defined);
        for entry in &self.cells.pin_counts {
            let _ = writeln!(out, "  {:<16} {} pins", entry.name, entry.count);
        }

        let _ = writeln!(
            out,
            "\nnodes: {} ({} pin slots)",
            self.nodes.total, self.nodes.pin_slots
        );
        for entry in &self.nodes.by_cell {
            let _ = writeln!(out, "  {:<16} {}", entry.name, entry.count);
        }

        let _ = writeln!(out, "\nnets: {} ({} pin refs)", self.nets.total, self.nets.pin_refs);
        if let (Some(min), Some(avg), Some(max)) =
            (self.nets.min_degree, self.nets.avg_degree, self.nets.max_degree)
        {
            let _ = writeln!(out, "  degree min/avg/max: {min}/{avg:.2}/{max}");
        }

        match &self.placement {
            Some(p) => {
                let _ = writeln!(out, "\nplacement: {} placed, {} fixed", p.placed, p.fixed);
                for entry in &p.fixed_by_cell {
                    let _ = writeln!(out, "  {:<16} {}", entry.name, entry.count);
                }
            }
            None => {
                let _ = writeln!(out, "\nplacement: none");
            }
        }

        let _ = writeln!(
            out,
            "\ngrid: {}x{} ({} sites)",
            self.grid.width, self.grid.height, self.grid.total_sites
        );
        for entry in &self.grid.by_type {
            let _ = writeln!(out, "  {:<16} {}", entry.name, entry.count);
        }

        let _ = writeln!(out, "\nutilization");
        for row in &self.utilization {
            if row.capacity == 0 {
                let _ = writeln!(
                    out,
                    "  {:<16} {} / no capacity{}",
                    row.resource,
                    row.used,
                    if row.over_capacity { "  (over capacity)" } else { "" }
                );
            } else {
                let _ = writeln!(
                    out,
                    "  {:<16} {} / {} ({:.2}%){}",
                    row.resource,
                    row.used,
                    row.capacity,
                    row.utilization * 100.0,
                    if row.over_capacity { "  (over capacity)" } else { "" }
                );
            }
        }

        if let Some(w) = &self.weights {
            let _ = writeln!(
                out,
                "\nweights: {} nets, min/avg/max {:.4}/{:.4}/{:.4}",
                w.count, w.min, w.avg, w.max
            );
        }

        out
    }
}

/// Per-resource utilization: instances mapped to the kind over total BEL
/// capacity in the grid. Emits a warning per over-capacity kind.
fn utilization_rows(design: &Design, sink: &DiagnosticSink) -> Vec<UtilizationRow> {
    let resources = design.layout.resources();
    let mut used: HashMap<shelf_model::ResourceId, u64> = HashMap::new();
    for inst in design.netlist.instances() {
        let cell = design.library.cell(inst.cell);
        if let Some(kind) = resources.resource_of_cell(&cell.name) {
            *used.entry(kind).or_insert(0) += 1;
        }
    }

    resources
        .kinds()
        .map(|(kind, name)| {
            let used = used.get(&kind).copied().unwrap_or(0);
            let capacity = design.layout.capacity_of(kind);
            let over_capacity = used > capacity;
            if over_capacity {
                sink.emit(Diagnostic::warning(format!(
                    "resource '{name}' demand exceeds capacity: {used} instances for \
                     {capacity} slots"
                )));
            }
            UtilizationRow {
                resource: name.to_string(),
                used,
                capacity,
                utilization: if capacity > 0 {
                    used as f64 / capacity as f64
                } else {
                    0.0
                },
                over_capacity,
            }
        })
        .collect()
}

/// Sorts a histogram most-common-first, tying by name for stable output.
fn sorted_histogram(map: HashMap<&str, u64>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = map
        .into_iter()
        .map(|(name, count)| CountEntry {
            name: name.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries
}
