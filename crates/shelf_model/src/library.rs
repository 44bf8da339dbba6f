//! Cell library model and `.lib` parser.
//!
//! A `.lib` file declares the master cells a netlist may instantiate, each
//! with an ordered pin list:
//!
//! ```text
//! CELL LUT6
//!   PIN I0 INPUT
//!   PIN I1 INPUT
//!   PIN O OUTPUT
//! END CELL
//! ```
//!
//! Pin order is load-bearing: instances inherit their master cell's pin
//! list positionally, and net members may reference pins by index.

use crate::dialect::Dialect;
use crate::error::FormatError;
use crate::ids::CellId;
use crate::parse::LineReader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The direction of a library cell pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// An input pin. The default when a pin declares no direction token.
    Input,
    /// An output pin.
    Output,
    /// A bidirectional pin.
    Inout,
}

/// A pin declaration within a library cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// The pin name, unique within its cell.
    pub name: String,
    /// The pin direction.
    pub direction: PinDirection,
    /// Whether this pin is a clock input.
    pub is_clock: bool,
    /// Whether this pin is a control input (set/reset/enable class).
    pub is_control: bool,
}

/// A master cell definition with its ordered pin list.
///
/// Immutable once parsed. Instances reference cells by [`CellId`] and never
/// copy or extend the pin list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryCell {
    /// The ID of this cell within its library.
    pub id: CellId,
    /// The cell name, unique within the library.
    pub name: String,
    /// The pins, in declaration order.
    pub pins: Vec<Pin>,
}

impl LibraryCell {
    /// Returns the positional index of the named pin, if it exists.
    pub fn pin_index(&self, name: &str) -> Option<u32> {
        self.pins.iter().position(|p| p.name == name).map(|i| i as u32)
    }

    /// Returns the number of pin slots this cell (and every instance of
    /// it) exposes.
    pub fn pin_count(&self) -> u32 {
        self.pins.len() as u32
    }
}

/// A parsed cell library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    cells: Vec<LibraryCell>,
    #[serde(skip)]
    by_name: HashMap<String, CellId>,
}

impl Library {
    fn new() -> Self {
        Self {
            cells: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub(crate) fn add_cell(&mut self, name: String, pins: Vec<Pin>) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.cells.push(LibraryCell { id, name, pins });
        id
    }

    /// Returns the cell with the given ID.
    pub fn cell(&self, id: CellId) -> &LibraryCell {
        &self.cells[id.as_raw() as usize]
    }

    /// Looks up a cell by name.
    pub fn lookup(&self, name: &str) -> Option<CellId> {
        self.by_name.get(name).copied()
    }

    /// Iterates over all cells in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &LibraryCell> {
        self.cells.iter()
    }

    /// Returns the number of cell definitions.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the library declares no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rebuilds the name index after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.by_name.clear();
        for (i, cell) in self.cells.iter().enumerate() {
            self.by_name.insert(cell.name.clone(), CellId::from_raw(i as u32));
        }
    }
}

/// Parses a `.lib` file into a [`Library`].
///
/// # Errors
///
/// Returns [`FormatError`] on duplicate cell names, duplicate pin names
/// within a cell, unknown pin-attribute tokens, conflicting direction
/// tokens, pins outside a cell, or unterminated/malformed sections.
pub fn parse_lib(text: &str, dialect: &Dialect) -> Result<Library, FormatError> {
    let mut library = Library::new();
    let mut current: Option<(String, Vec<Pin>)> = None;

    for (line_no, line) in LineReader::new(text, dialect) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let keyword = tokens[0];

        if keyword == dialect.cell_keyword {
            if let Some((open, _)) = &current {
                return Err(FormatError::at_line(
                    line_no,
                    format!("cell '{open}' is not terminated before the next {}", dialect.cell_keyword),
                ));
            }
            if tokens.len() != 2 {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '{} <name>'", dialect.cell_keyword),
                ));
            }
            let name = tokens[1];
            if library.lookup(name).is_some() {
                return Err(FormatError::at_line(
                    line_no,
                    format!("duplicate cell name '{name}'"),
                ));
            }
            current = Some((name.to_string(), Vec::new()));
        } else if keyword == dialect.pin_keyword {
            let Some((cell_name, pins)) = &mut current else {
                return Err(FormatError::at_line(
                    line_no,
                    format!("{} declaration outside a cell", dialect.pin_keyword),
                ));
            };
            if tokens.len() < 2 {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '{} <name> [attributes]'", dialect.pin_keyword),
                ));
            }
            let pin_name = tokens[1];
            if pins.iter().any(|p| p.name == pin_name) {
                return Err(FormatError::at_line(
                    line_no,
                    format!("duplicate pin '{pin_name}' in cell '{cell_name}'"),
                ));
            }
            let pin = parse_pin_attributes(pin_name, &tokens[2..], line_no, dialect)?;
            pins.push(pin);
        } else if keyword == dialect.end_keyword {
            if tokens.len() != 2 || tokens[1] != dialect.cell_keyword {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '{} {}'", dialect.end_keyword, dialect.cell_keyword),
                ));
            }
            let Some((name, pins)) = current.take() else {
                return Err(FormatError::at_line(
                    line_no,
                    format!("'{} {}' without an open cell", dialect.end_keyword, dialect.cell_keyword),
                ));
            };
            library.add_cell(name, pins);
        } else {
            return Err(FormatError::at_line(
                line_no,
                format!("unexpected token '{keyword}'"),
            ));
        }
    }

    if let Some((name, _)) = current {
        return Err(FormatError::new(format!(
            "cell '{name}' is not terminated at end of file"
        )));
    }

    Ok(library)
}

fn parse_pin_attributes(
    name: &str,
    attrs: &[&str],
    line_no: u32,
    dialect: &Dialect,
) -> Result<Pin, FormatError> {
    let mut direction = None;
    let mut is_clock = false;
    let mut is_control = false;

    for attr in attrs {
        let parsed = if *attr == dialect.input_token {
            Some(PinDirection::Input)
        } else if *attr == dialect.output_token {
            Some(PinDirection::Output)
        } else if *attr == dialect.bidir_token {
            Some(PinDirection::Inout)
        } else {
            None
        };
        if let Some(dir) = parsed {
            if direction.is_some() {
                return Err(FormatError::at_line(
                    line_no,
                    format!("pin '{name}' declares more than one direction"),
                ));
            }
            direction = Some(dir);
        } else if *attr == dialect.clock_token {
            is_clock = true;
        } else if *attr == dialect.control_token {
            is_control = true;
        } else {
            return Err(FormatError::at_line(
                line_no,
                format!("unknown pin attribute '{attr}' on pin '{name}'"),
            ));
        }
    }

    Ok(Pin {
        name: name.to_string(),
        // Benchmark files omit the token on plain inputs.
        direction: direction.unwrap_or(PinDirection::Input),
        is_clock,
        is_control,
    })
}

/// Serializes a library back to `.lib` text.
///
/// The direction token is always written, so a written file re-parses to
/// an identical library even for pins that originally relied on the
/// implicit input default.
pub fn write_lib(library: &Library, dialect: &Dialect) -> String {
    let mut out = String::new();
    for cell in library.iter() {
        out.push_str(&format!("{} {}\n", dialect.cell_keyword, cell.name));
        for pin in &cell.pins {
            let direction = match pin.direction {
                PinDirection::Input => &dialect.input_token,
                PinDirection::Output => &dialect.output_token,
                PinDirection::Inout => &dialect.bidir_token,
            };
            out.push_str(&format!("  {} {} {direction}", dialect.pin_keyword, pin.name));
            if pin.is_clock {
                out.push_str(&format!(" {}", dialect.clock_token));
            }
            if pin.is_control {
                out.push_str(&format!(" {}", dialect.control_token));
            }
            out.push('\n');
        }
        out.push_str(&format!("{} {}\n", dialect.end_keyword, dialect.cell_keyword));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
# cell library
CELL LUT4
  PIN I0 INPUT
  PIN I1 INPUT
  PIN I2 INPUT
  PIN I3 INPUT
  PIN O OUTPUT
END CELL

CELL DFF
  PIN D INPUT
  PIN CK INPUT CLOCK
  PIN R INPUT CTRL
  PIN Q OUTPUT
END CELL
";

    #[test]
    fn parse_basic() {
        let lib = parse_lib(BASIC, &Dialect::default()).unwrap();
        assert_eq!(lib.len(), 2);
        let lut = lib.cell(lib.lookup("LUT4").unwrap());
        assert_eq!(lut.pin_count(), 5);
        let dff = lib.cell(lib.lookup("DFF").unwrap());
        assert_eq!(dff.pin_count(), 4);
    }

    #[test]
    fn pin_order_preserved() {
        let lib = parse_lib(BASIC, &Dialect::default()).unwrap();
        let lut = lib.cell(lib.lookup("LUT4").unwrap());
        let names: Vec<&str> = lut.pins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["I0", "I1", "I2", "I3", "O"]);
        assert_eq!(lut.pin_index("I2"), Some(2));
        assert_eq!(lut.pin_index("O"), Some(4));
        assert_eq!(lut.pin_index("Z"), None);
    }

    #[test]
    fn clock_and_control_flags() {
        let lib = parse_lib(BASIC, &Dialect::default()).unwrap();
        let dff = lib.cell(lib.lookup("DFF").unwrap());
        assert!(dff.pins[1].is_clock);
        assert!(!dff.pins[1].is_control);
        assert!(dff.pins[2].is_control);
        assert_eq!(dff.pins[3].direction, PinDirection::Output);
    }

    #[test]
    fn direction_defaults_to_input() {
        let lib = parse_lib("CELL X\n PIN A\nEND CELL\n", &Dialect::default()).unwrap();
        let cell = lib.cell(lib.lookup("X").unwrap());
        assert_eq!(cell.pins[0].direction, PinDirection::Input);
    }

    #[test]
    fn bidir_direction() {
        let lib = parse_lib("CELL PAD\n PIN IO BIDIR\nEND CELL\n", &Dialect::default()).unwrap();
        let cell = lib.cell(lib.lookup("PAD").unwrap());
        assert_eq!(cell.pins[0].direction, PinDirection::Inout);
    }

    #[test]
    fn duplicate_cell_fails() {
        let text = "CELL A\nEND CELL\nCELL A\nEND CELL\n";
        let err = parse_lib(text, &Dialect::default()).unwrap_err();
        assert_eq!(err.line, Some(3));
        assert!(err.message.contains("duplicate cell name 'A'"));
    }

    #[test]
    fn duplicate_pin_fails() {
        let text = "CELL A\n PIN X\n PIN X\nEND CELL\n";
        let err = parse_lib(text, &Dialect::default()).unwrap_err();
        assert!(err.message.contains("duplicate pin 'X'"));
    }

    #[test]
    fn unknown_attribute_fails() {
        let text = "CELL A\n PIN X INOUT\nEND CELL\n";
        let err = parse_lib(text, &Dialect::default()).unwrap_err();
        assert!(err.message.contains("unknown pin attribute 'INOUT'"));
    }

    #[test]
    fn conflicting_directions_fail() {
        let text = "CELL A\n PIN X INPUT OUTPUT\nEND CELL\n";
        let err = parse_lib(text, &Dialect::default()).unwrap_err();
        assert!(err.message.contains("more than one direction"));
    }

    #[test]
    fn pin_outside_cell_fails() {
        let err = parse_lib("PIN X INPUT\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("outside a cell"));
    }

    #[test]
    fn unterminated_cell_fails() {
        let err = parse_lib("CELL A\n PIN X\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("not terminated"));
    }

    #[test]
    fn end_without_cell_fails() {
        let err = parse_lib("END CELL\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("without an open cell"));
    }

    #[test]
    fn write_roundtrip() {
        let dialect = Dialect::default();
        let lib = parse_lib(BASIC, &dialect).unwrap();
        let text = write_lib(&lib, &dialect);
        let reparsed = parse_lib(&text, &dialect).unwrap();
        assert_eq!(reparsed.len(), lib.len());
        for (a, b) in lib.iter().zip(reparsed.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.pins, b.pins);
        }
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let lib = parse_lib(BASIC, &Dialect::default()).unwrap();
        let json = serde_json::to_string(&lib).unwrap();
        let mut restored: Library = serde_json::from_str(&json).unwrap();
        assert!(restored.lookup("DFF").is_none());
        restored.rebuild_indices();
        assert_eq!(restored.lookup("DFF"), lib.lookup("DFF"));
    }
}
