//! Netlist model and the `.nodes` / `.nets` parsers.
//!
//! A `.nodes` file binds instance names to master cells, one per line. A
//! `.nets` file groups instance-pin references into nets:
//!
//! ```text
//! net clk_net 2
//!     clkbuf O
//!     ff0 CK
//! endnet
//! ```
//!
//! Instances never redefine pins: an instance's pin slots are exactly its
//! master cell's pin list, referenced positionally. Net members may name a
//! pin or give its positional index; both resolve to the index.

use crate::dialect::Dialect;
use crate::error::FormatError;
use crate::ids::{CellId, InstanceId, NetId};
use crate::library::Library;
use crate::parse::LineReader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An instantiated library cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The ID of this instance within its netlist.
    pub id: InstanceId,
    /// The instance name, unique within the netlist.
    pub name: String,
    /// The master cell. The pin list is looked up through this binding,
    /// never copied.
    pub cell: CellId,
}

/// A reference to one pin slot of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRef {
    /// The referenced instance.
    pub instance: InstanceId,
    /// The positional pin index within the instance's master cell.
    pub pin: u32,
}

/// A named net: an ordered collection of instance-pin references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// The ID of this net within its netlist.
    pub id: NetId,
    /// The net name, unique within the netlist.
    pub name: String,
    /// The members, in file order. Never empty.
    pub pins: Vec<PinRef>,
}

/// The parsed netlist: instances plus the nets connecting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    instances: Vec<Instance>,
    nets: Vec<Net>,
    #[serde(skip)]
    instance_by_name: HashMap<String, InstanceId>,
    #[serde(skip)]
    net_by_name: HashMap<String, NetId>,
}

impl Netlist {
    fn new() -> Self {
        Self {
            instances: Vec::new(),
            nets: Vec::new(),
            instance_by_name: HashMap::new(),
            net_by_name: HashMap::new(),
        }
    }

    fn add_instance(&mut self, name: String, cell: CellId) -> InstanceId {
        let id = InstanceId::from_raw(self.instances.len() as u32);
        self.instance_by_name.insert(name.clone(), id);
        self.instances.push(Instance { id, name, cell });
        id
    }

    fn add_net(&mut self, name: String, pins: Vec<PinRef>) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Net { id, name, pins });
        id
    }

    /// Returns the instance with the given ID.
    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.as_raw() as usize]
    }

    /// Looks up an instance by name.
    pub fn lookup_instance(&self, name: &str) -> Option<InstanceId> {
        self.instance_by_name.get(name).copied()
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.as_raw() as usize]
    }

    /// Looks up a net by name.
    pub fn lookup_net(&self, name: &str) -> Option<NetId> {
        self.net_by_name.get(name).copied()
    }

    /// Iterates over all instances in file order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    /// Iterates over all nets in file order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter()
    }

    /// Returns the number of instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Returns the number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Rebuilds the name indexes after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.instance_by_name.clear();
        for (i, inst) in self.instances.iter().enumerate() {
            self.instance_by_name
                .insert(inst.name.clone(), InstanceId::from_raw(i as u32));
        }
        self.net_by_name.clear();
        for (i, net) in self.nets.iter().enumerate() {
            self.net_by_name
                .insert(net.name.clone(), NetId::from_raw(i as u32));
        }
    }
}

/// Parses a `.nodes` file into a [`Netlist`] (with no nets yet).
///
/// # Errors
///
/// Returns [`FormatError`] if an instance references a cell the library
/// does not define, or on a duplicate instance name.
pub fn parse_nodes(
    text: &str,
    library: &Library,
    dialect: &Dialect,
) -> Result<Netlist, FormatError> {
    let mut netlist = Netlist::new();

    for (line_no, line) in LineReader::new(text, dialect) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(FormatError::at_line(
                line_no,
                "expected '<instance> <cell>'".to_string(),
            ));
        }
        let (name, cell_name) = (tokens[0], tokens[1]);
        if netlist.lookup_instance(name).is_some() {
            return Err(FormatError::at_line(
                line_no,
                format!("duplicate instance name '{name}'"),
            ));
        }
        let Some(cell) = library.lookup(cell_name) else {
            return Err(FormatError::at_line(
                line_no,
                format!("instance '{name}' references undefined cell '{cell_name}'"),
            ));
        };
        netlist.add_instance(name.to_string(), cell);
    }

    Ok(netlist)
}

/// Parses a `.nets` file, adding the nets to an existing [`Netlist`].
///
/// # Errors
///
/// Returns [`FormatError`] if a member references an unknown instance, an
/// unknown pin name, or an out-of-range pin index; if a net has zero
/// members or a member count that contradicts its declared degree; or on
/// duplicate net names and malformed lines.
pub fn parse_nets(
    text: &str,
    library: &Library,
    netlist: &mut Netlist,
    dialect: &Dialect,
) -> Result<(), FormatError> {
    // (name, declared degree, members, opening line)
    let mut current: Option<(String, usize, Vec<PinRef>, u32)> = None;

    for (line_no, line) in LineReader::new(text, dialect) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let keyword = tokens[0];

        if keyword == dialect.net_keyword {
            if let Some((open, ..)) = &current {
                return Err(FormatError::at_line(
                    line_no,
                    format!("net '{open}' is not terminated before the next {}", dialect.net_keyword),
                ));
            }
            if tokens.len() != 3 {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '{} <name> <degree>'", dialect.net_keyword),
                ));
            }
            let name = tokens[1];
            if netlist.lookup_net(name).is_some() {
                return Err(FormatError::at_line(
                    line_no,
                    format!("duplicate net name '{name}'"),
                ));
            }
            let degree: usize = tokens[2].parse().map_err(|_| {
                FormatError::at_line(
                    line_no,
                    format!("expected a non-negative integer for net degree, got '{}'", tokens[2]),
                )
            })?;
            current = Some((name.to_string(), degree, Vec::new(), line_no));
        } else if keyword == dialect.endnet_keyword {
            let Some((name, degree, pins, _)) = current.take() else {
                return Err(FormatError::at_line(
                    line_no,
                    format!("'{}' without an open net", dialect.endnet_keyword),
                ));
            };
            if pins.is_empty() {
                return Err(FormatError::at_line(
                    line_no,
                    format!("net '{name}' has no members"),
                ));
            }
            if pins.len() != degree {
                return Err(FormatError::at_line(
                    line_no,
                    format!(
                        "net '{name}' declares degree {degree} but lists {} members",
                        pins.len()
                    ),
                ));
            }
            netlist.add_net(name, pins);
        } else {
            let Some((net_name, _, pins, _)) = &mut current else {
                return Err(FormatError::at_line(
                    line_no,
                    format!("unexpected token '{keyword}' outside a net"),
                ));
            };
            if tokens.len() != 2 {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '<instance> <pin>' inside net '{net_name}'"),
                ));
            }
            let (inst_name, pin_token) = (tokens[0], tokens[1]);
            let Some(instance) = netlist.instance_by_name.get(inst_name).copied() else {
                return Err(FormatError::at_line(
                    line_no,
                    format!("net '{net_name}' references undefined instance '{inst_name}'"),
                ));
            };
            let cell = library.cell(netlist.instances[instance.as_raw() as usize].cell);
            let pin = resolve_pin(cell.pin_index(pin_token), pin_token, cell.pin_count())
                .ok_or_else(|| {
                    FormatError::at_line(
                        line_no,
                        format!(
                            "net '{net_name}': instance '{inst_name}' (cell '{}') has no pin '{pin_token}' \
                             ({} pins)",
                            cell.name,
                            cell.pin_count()
                        ),
                    )
                })?;
            pins.push(PinRef { instance, pin });
        }
    }

    if let Some((name, ..)) = current {
        return Err(FormatError::new(format!(
            "net '{name}' is not terminated at end of file"
        )));
    }

    Ok(())
}

/// Resolves a pin token to a positional index: by name first, then as a
/// bare index for files that reference pins positionally.
fn resolve_pin(by_name: Option<u32>, token: &str, pin_count: u32) -> Option<u32> {
    if let Some(index) = by_name {
        return Some(index);
    }
    match token.parse::<u32>() {
        Ok(index) if index < pin_count => Some(index),
        _ => None,
    }
}

/// Serializes the instance bindings back to `.nodes` text.
pub fn write_nodes(netlist: &Netlist, library: &Library) -> String {
    let mut out = String::new();
    for inst in netlist.instances() {
        out.push_str(&format!("{} {}\n", inst.name, library.cell(inst.cell).name));
    }
    out
}

/// Serializes the nets back to `.nets` text, referencing pins by name.
pub fn write_nets(netlist: &Netlist, library: &Library, dialect: &Dialect) -> String {
    let mut out = String::new();
    for net in netlist.nets() {
        out.push_str(&format!(
            "{} {} {}\n",
            dialect.net_keyword,
            net.name,
            net.pins.len()
        ));
        for pin_ref in &net.pins {
            let inst = netlist.instance(pin_ref.instance);
            let cell = library.cell(inst.cell);
            out.push_str(&format!(
                "\t{} {}\n",
                inst.name,
                cell.pins[pin_ref.pin as usize].name
            ));
        }
        out.push_str(&format!("{}\n", dialect.endnet_keyword));
    }
    out
}
