//! Placement model and `.pl` parser.
//!
//! A `.pl` file assigns instances to device locations, one entry per line:
//!
//! ```text
//! IBUF0 3 5 2 FIXED
//! lut_a 10 7 4
//! ```
//!
//! An entry is `(x, y, BEL)` plus an optional fixed marker. Fixedness is a
//! property of the placement record alone, never inferred from the cell
//! type. Input benchmarks typically place only their fixed boundary cells;
//! a complete output placement covers every instance.
//!
//! Grid-bounds and BEL-capacity checking need the layout and therefore
//! live in [`validate`](crate::validate), not here; a `.pl` file remains
//! inspectable on its own.

use crate::dialect::Dialect;
use crate::error::FormatError;
use crate::ids::InstanceId;
use crate::netlist::Netlist;
use crate::parse::{parse_u32, LineReader};
use serde::{Deserialize, Serialize};

/// One instance's location: a site coordinate plus the BEL slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Site x coordinate.
    pub x: u32,
    /// Site y coordinate.
    pub y: u32,
    /// BEL slot index within the site, per the site type's capacity for
    /// the instance's resource kind.
    pub bel: u32,
    /// Whether this placement is locked. Fixed placements may never be
    /// altered by downstream tooling.
    pub fixed: bool,
}

/// Refusal to overwrite a fixed placement.
#[derive(Debug, Clone, thiserror::Error)]
#[error("instance '{instance}' has a fixed placement at ({x}, {y}, BEL {bel}) and cannot be re-placed")]
pub struct FixedViolation {
    /// The instance whose placement was protected.
    pub instance: String,
    /// Fixed x coordinate.
    pub x: u32,
    /// Fixed y coordinate.
    pub y: u32,
    /// Fixed BEL index.
    pub bel: u32,
}

/// How much of the netlist a written `.pl` file must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementCoverage {
    /// Every instance, fixed and movable alike (placer output).
    Complete,
    /// Only fixed instances (input-benchmark style).
    FixedOnly,
}

/// A written `.pl` was requested as complete but instances are unplaced.
#[derive(Debug, Clone, thiserror::Error)]
#[error("complete placement requested but {missing} instances are unplaced (first: '{first}')")]
pub struct IncompletePlacement {
    /// How many instances have no placement.
    pub missing: usize,
    /// The name of the first unplaced instance in netlist order.
    pub first: String,
}

/// Per-instance placements for a netlist.
///
/// Stored densely, indexed by [`InstanceId`]; unplaced instances hold
/// `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementSet {
    slots: Vec<Option<Placement>>,
}

impl PlacementSet {
    /// Creates an empty placement set sized for the given netlist.
    pub fn empty(netlist: &Netlist) -> Self {
        Self {
            slots: vec![None; netlist.instance_count()],
        }
    }

    /// Returns the placement of an instance, if any.
    pub fn get(&self, id: InstanceId) -> Option<&Placement> {
        self.slots[id.as_raw() as usize].as_ref()
    }

    /// Assigns a placement, refusing to alter an existing fixed entry.
    ///
    /// Re-placing a movable instance is allowed (this is what a placer
    /// does); re-placing a fixed one returns [`FixedViolation`].
    pub fn place(
        &mut self,
        netlist: &Netlist,
        id: InstanceId,
        placement: Placement,
    ) -> Result<(), FixedViolation> {
        let slot = &mut self.slots[id.as_raw() as usize];
        if let Some(existing) = slot {
            if existing.fixed {
                return Err(FixedViolation {
                    instance: netlist.instance(id).name.clone(),
                    x: existing.x,
                    y: existing.y,
                    bel: existing.bel,
                });
            }
        }
        *slot = Some(placement);
        Ok(())
    }

    /// Iterates over placed instances as `(id, placement)`.
    pub fn iter_placed(&self) -> impl Iterator<Item = (InstanceId, &Placement)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (InstanceId::from_raw(i as u32), p)))
    }

    /// Returns the number of placed instances.
    pub fn placed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns the number of fixed placements.
    pub fn fixed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.map(|p| p.fixed).unwrap_or(false))
            .count()
    }

    /// Returns `true` if every instance has a placement.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }
}

/// Parses a `.pl` file against a netlist.
///
/// # Errors
///
/// Returns [`FormatError`] on entries for unknown instances, duplicate
/// entries for the same instance, non-integer coordinates or BEL, or
/// trailing tokens other than the fixed marker.
pub fn parse_pl(
    text: &str,
    netlist: &Netlist,
    dialect: &Dialect,
) -> Result<PlacementSet, FormatError> {
    let mut set = PlacementSet::empty(netlist);

    for (line_no, line) in LineReader::new(text, dialect) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 || tokens.len() > 5 {
            return Err(FormatError::at_line(
                line_no,
                format!(
                    "expected '<instance> <x> <y> <bel> [{}]'",
                    dialect.fixed_marker
                ),
            ));
        }
        let name = tokens[0];
        let Some(id) = netlist.lookup_instance(name) else {
            return Err(FormatError::at_line(
                line_no,
                format!("placement references undefined instance '{name}'"),
            ));
        };
        if set.get(id).is_some() {
            return Err(FormatError::at_line(
                line_no,
                format!("duplicate placement entry for instance '{name}'"),
            ));
        }
        let x = parse_u32(tokens[1], line_no, "x coordinate")?;
        let y = parse_u32(tokens[2], line_no, "y coordinate")?;
        let bel = parse_u32(tokens[3], line_no, "BEL index")?;
        let fixed = match tokens.get(4) {
            None => false,
            Some(marker) if *marker == dialect.fixed_marker => true,
            Some(other) => {
                return Err(FormatError::at_line(
                    line_no,
                    format!(
                        "unexpected token '{other}' (only '{}' may follow the BEL index)",
                        dialect.fixed_marker
                    ),
                ));
            }
        };
        set.slots[id.as_raw() as usize] = Some(Placement { x, y, bel, fixed });
    }

    Ok(set)
}

/// Serializes a placement set back to `.pl` text in netlist order.
///
/// # Errors
///
/// With [`PlacementCoverage::Complete`], returns [`IncompletePlacement`]
/// if any instance is unplaced. [`PlacementCoverage::FixedOnly`] always
/// succeeds.
pub fn write_pl(
    set: &PlacementSet,
    netlist: &Netlist,
    dialect: &Dialect,
    coverage: PlacementCoverage,
) -> Result<String, IncompletePlacement> {
    if coverage == PlacementCoverage::Complete {
        let unplaced: Vec<&str> = netlist
            .instances()
            .filter(|inst| set.get(inst.id).is_none())
            .map(|inst| inst.name.as_str())
            .collect();
        if !unplaced.is_empty() {
            return Err(IncompletePlacement {
                missing: unplaced.len(),
                first: unplaced[0].to_string(),
            });
        }
    }

    let mut out = String::new();
    for inst in netlist.instances() {
        let Some(p) = set.get(inst.id) else {
            continue;
        };
        if coverage == PlacementCoverage::FixedOnly && !p.fixed {
            continue;
        }
        out.push_str(&format!("{} {} {} {}", inst.name, p.x, p.y, p.bel));
        if p.fixed {
            out.push_str(&format!(" {}", dialect.fixed_marker));
        }
        out.push('\n');
    }
    Ok(out)
}
