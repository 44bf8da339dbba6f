//! Device layout model and `.scl` parser.
//!
//! A `.scl` file has three sections: `SITE` definitions (what resource
//! kinds a site type hosts, and how many slots of each), a `RESOURCES`
//! mapping (which library cells occupy which resource kind), and a
//! `SITEMAP` (the full device grid, with declared extents and one
//! `x y sitetype` entry per coordinate):
//!
//! ```text
//! SITE SLICE
//!   LUT 16
//!   FF 16
//! END SITE
//! RESOURCES
//!   LUT LUT4 LUT6
//!   FF DFF
//! END RESOURCES
//! SITEMAP 2 1
//! 0 0 SLICE
//! 1 0 SLICE
//! END SITEMAP
//! ```
//!
//! Grid completeness is validated here, not downstream: every coordinate
//! in the declared extents must be assigned exactly one declared site
//! type, so later placement checks can never index out of the grid.

use crate::dialect::Dialect;
use crate::error::FormatError;
use crate::ids::{ResourceId, SiteTypeId};
use crate::parse::{parse_u32, LineReader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A site-type definition: the resource kinds a site hosts and the number
/// of BEL slots of each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDef {
    /// The ID of this site type within its layout.
    pub id: SiteTypeId,
    /// The site-type name, unique within the layout.
    pub name: String,
    /// Resource capacities in declaration order. A SLICE hosting 16
    /// LUT/FF pairs declares `(LUT, 16)` and `(FF, 16)`.
    pub resources: Vec<(ResourceId, u32)>,
}

impl SiteDef {
    /// Returns the number of BEL slots this site type provides for the
    /// given resource kind (zero if it does not host the kind).
    pub fn capacity(&self, kind: ResourceId) -> u32 {
        self.resources
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Returns `true` if this site type hosts the given resource kind.
    pub fn hosts(&self, kind: ResourceId) -> bool {
        self.capacity(kind) > 0
    }
}

/// The resource-kind registry and the cell-to-kind mapping.
///
/// Resource kinds are an open vocabulary discovered from the file (LUT,
/// FF, RAMB, DSP, or anything else the layout declares).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTable {
    kinds: Vec<String>,
    bindings: Vec<(String, ResourceId)>,
    #[serde(skip)]
    by_name: HashMap<String, ResourceId>,
    #[serde(skip)]
    cell_kind: HashMap<String, ResourceId>,
}

impl ResourceTable {
    fn new() -> Self {
        Self {
            kinds: Vec::new(),
            bindings: Vec::new(),
            by_name: HashMap::new(),
            cell_kind: HashMap::new(),
        }
    }

    pub(crate) fn intern(&mut self, name: &str) -> ResourceId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ResourceId::from_raw(self.kinds.len() as u32);
        self.kinds.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub(crate) fn bind(&mut self, cell: &str, kind: ResourceId) {
        self.cell_kind.insert(cell.to_string(), kind);
        self.bindings.push((cell.to_string(), kind));
    }

    /// Looks up a resource kind by name.
    pub fn lookup(&self, name: &str) -> Option<ResourceId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a resource kind.
    pub fn kind_name(&self, id: ResourceId) -> &str {
        &self.kinds[id.as_raw() as usize]
    }

    /// Returns the number of distinct resource kinds.
    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Iterates over all resource kinds.
    pub fn kinds(&self) -> impl Iterator<Item = (ResourceId, &str)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(i, name)| (ResourceId::from_raw(i as u32), name.as_str()))
    }

    /// Returns the resource kind a library cell maps to, if bound.
    pub fn resource_of_cell(&self, cell: &str) -> Option<ResourceId> {
        self.cell_kind.get(cell).copied()
    }

    /// Iterates over the cell-to-kind bindings in file order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, ResourceId)> {
        self.bindings.iter().map(|(cell, kind)| (cell.as_str(), *kind))
    }

    /// Rebuilds the lookup indexes after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.by_name.clear();
        for (i, name) in self.kinds.iter().enumerate() {
            self.by_name.insert(name.clone(), ResourceId::from_raw(i as u32));
        }
        self.cell_kind.clear();
        for (cell, kind) in &self.bindings {
            self.cell_kind.insert(cell.clone(), *kind);
        }
    }
}

/// The full device grid: a rectangular, fully populated matrix of site
/// types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceGrid {
    width: u32,
    height: u32,
    /// Row-major: index = y * width + x.
    sites: Vec<SiteTypeId>,
}

impl DeviceGrid {
    /// Returns the grid width in sites.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the grid height in sites.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if the coordinate lies within the grid.
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Returns the site type at the given coordinate.
    pub fn site_at(&self, x: u32, y: u32) -> Option<SiteTypeId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.sites[(y * self.width + x) as usize])
    }

    /// Iterates over every site in row-major order as `(x, y, site_type)`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, SiteTypeId)> + '_ {
        self.sites.iter().enumerate().map(move |(i, id)| {
            let i = i as u32;
            (i % self.width, i / self.width, *id)
        })
    }

    /// Returns the total number of sites (width × height).
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }
}

/// The parsed device layout: site definitions, resource mapping, and grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    site_defs: Vec<SiteDef>,
    resources: ResourceTable,
    grid: DeviceGrid,
    #[serde(skip)]
    site_by_name: HashMap<String, SiteTypeId>,
}

impl Layout {
    /// Returns the site-type definition with the given ID.
    pub fn site_def(&self, id: SiteTypeId) -> &SiteDef {
        &self.site_defs[id.as_raw() as usize]
    }

    /// Looks up a site type by name.
    pub fn site_type(&self, name: &str) -> Option<SiteTypeId> {
        self.site_by_name.get(name).copied()
    }

    /// Iterates over all site-type definitions in declaration order.
    pub fn site_defs(&self) -> impl Iterator<Item = &SiteDef> {
        self.site_defs.iter()
    }

    /// Returns the resource registry and cell mapping.
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Returns the device grid.
    pub fn grid(&self) -> &DeviceGrid {
        &self.grid
    }

    /// Counts the grid sites whose type hosts the given resource kind.
    pub fn sites_hosting(&self, kind: ResourceId) -> u64 {
        self.grid
            .iter()
            .filter(|(_, _, site)| self.site_def(*site).hosts(kind))
            .count() as u64
    }

    /// Returns the total BEL capacity for a resource kind across the grid
    /// (per-site capacity summed over every site of a hosting type).
    pub fn capacity_of(&self, kind: ResourceId) -> u64 {
        self.grid
            .iter()
            .map(|(_, _, site)| u64::from(self.site_def(site).capacity(kind)))
            .sum()
    }

    /// Rebuilds the lookup indexes after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.site_by_name.clear();
        for (i, def) in self.site_defs.iter().enumerate() {
            self.site_by_name
                .insert(def.name.clone(), SiteTypeId::from_raw(i as u32));
        }
        self.resources.rebuild_indices();
    }
}

/// Parser state: which `.scl` section the current line belongs to.
enum Section {
    Top,
    Site { name: String, resources: Vec<(ResourceId, u32)> },
    Resources,
    Sitemap { width: u32, height: u32 },
}

/// Parses a `.scl` file into a [`Layout`].
///
/// # Errors
///
/// Returns [`FormatError`] on duplicate site names, empty resource sets,
/// duplicate cell-to-resource bindings, missing or duplicated sections,
/// unknown site references, coordinates outside the declared extents,
/// duplicate coordinates, or an entry count that does not match the
/// declared `width × height` (dimension mismatch).
pub fn parse_scl(text: &str, dialect: &Dialect) -> Result<Layout, FormatError> {
    let mut site_defs: Vec<SiteDef> = Vec::new();
    let mut site_by_name: HashMap<String, SiteTypeId> = HashMap::new();
    let mut resources = ResourceTable::new();
    let mut seen_resources_section = false;

    let mut seen_sitemap_section = false;
    let mut cells: Vec<Option<SiteTypeId>> = Vec::new();
    let mut filled: u32 = 0;
    let mut grid: Option<DeviceGrid> = None;

    let mut section = Section::Top;

    for (line_no, line) in LineReader::new(text, dialect) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let keyword = tokens[0];

        if keyword == dialect.end_keyword {
            if tokens.len() != 2 {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '{} <section>'", dialect.end_keyword),
                ));
            }
            section = close_section(
                section,
                tokens[1],
                line_no,
                dialect,
                &mut site_defs,
                &mut site_by_name,
                &mut seen_resources_section,
                &mut cells,
                &mut filled,
                &mut grid,
            )?;
            continue;
        }

        match &mut section {
            Section::Top => {
                if keyword == dialect.site_keyword {
                    if tokens.len() != 2 {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("expected '{} <name>'", dialect.site_keyword),
                        ));
                    }
                    let name = tokens[1];
                    if site_by_name.contains_key(name) {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("duplicate site name '{name}'"),
                        ));
                    }
                    section = Section::Site {
                        name: name.to_string(),
                        resources: Vec::new(),
                    };
                } else if keyword == dialect.resources_keyword {
                    if tokens.len() != 1 {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("expected bare '{}'", dialect.resources_keyword),
                        ));
                    }
                    if seen_resources_section {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("duplicate {} section", dialect.resources_keyword),
                        ));
                    }
                    section = Section::Resources;
                } else if keyword == dialect.sitemap_keyword {
                    if tokens.len() != 3 {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("expected '{} <width> <height>'", dialect.sitemap_keyword),
                        ));
                    }
                    if seen_sitemap_section {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("duplicate {} section", dialect.sitemap_keyword),
                        ));
                    }
                    seen_sitemap_section = true;
                    let width = parse_u32(tokens[1], line_no, "grid width")?;
                    let height = parse_u32(tokens[2], line_no, "grid height")?;
                    if width == 0 || height == 0 {
                        return Err(FormatError::at_line(
                            line_no,
                            format!("{} extents must be positive", dialect.sitemap_keyword),
                        )
                        .in_section(dialect.sitemap_keyword.clone()));
                    }
                    cells = vec![None; (width as u64 * height as u64) as usize];
                    filled = 0;
                    section = Section::Sitemap { width, height };
                } else {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("unexpected token '{keyword}'"),
                    ));
                }
            }
            Section::Site { name, resources: site_resources } => {
                if tokens.len() != 2 {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("expected '<resource> <count>' inside site '{name}'"),
                    )
                    .in_section(dialect.site_keyword.clone()));
                }
                let kind = resources.intern(keyword);
                if site_resources.iter().any(|(k, _)| *k == kind) {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("site '{name}' declares resource '{keyword}' twice"),
                    ));
                }
                let count = parse_u32(tokens[1], line_no, "resource count")?;
                if count == 0 {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("site '{name}' declares zero '{keyword}' slots"),
                    ));
                }
                site_resources.push((kind, count));
            }
            Section::Resources => {
                if tokens.len() < 2 {
                    return Err(FormatError::at_line(
                        line_no,
                        "expected '<resource> <cell> [<cell> ...]'".to_string(),
                    )
                    .in_section(dialect.resources_keyword.clone()));
                }
                let kind = resources.intern(keyword);
                for cell in &tokens[1..] {
                    if let Some(existing) = resources.resource_of_cell(cell) {
                        let existing = resources.kind_name(existing).to_string();
                        return Err(FormatError::at_line(
                            line_no,
                            format!("cell '{cell}' is already mapped to resource '{existing}'"),
                        ));
                    }
                    resources.bind(cell, kind);
                }
            }
            Section::Sitemap { width, height } => {
                let (width, height) = (*width, *height);
                if tokens.len() != 3 {
                    return Err(FormatError::at_line(
                        line_no,
                        "expected '<x> <y> <sitetype>'".to_string(),
                    )
                    .in_section(dialect.sitemap_keyword.clone()));
                }
                let x = parse_u32(tokens[0], line_no, "site x coordinate")?;
                let y = parse_u32(tokens[1], line_no, "site y coordinate")?;
                if x >= width || y >= height {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("coordinate ({x}, {y}) outside declared extents {width}x{height}"),
                    )
                    .in_section(dialect.sitemap_keyword.clone()));
                }
                let Some(site) = site_by_name.get(tokens[2]).copied() else {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("unknown site '{}'", tokens[2]),
                    )
                    .in_section(dialect.sitemap_keyword.clone()));
                };
                let slot = &mut cells[(y * width + x) as usize];
                if slot.is_some() {
                    return Err(FormatError::at_line(
                        line_no,
                        format!("duplicate entry for coordinate ({x}, {y})"),
                    )
                    .in_section(dialect.sitemap_keyword.clone()));
                }
                *slot = Some(site);
                filled += 1;
            }
        }
    }

    match section {
        Section::Top => {}
        Section::Site { name, .. } => {
            return Err(FormatError::new(format!(
                "site '{name}' is not terminated at end of file"
            )));
        }
        Section::Resources => {
            return Err(FormatError::new(format!(
                "{} section is not terminated at end of file",
                dialect.resources_keyword
            )));
        }
        Section::Sitemap { .. } => {
            return Err(FormatError::new(format!(
                "{} section is not terminated at end of file",
                dialect.sitemap_keyword
            )));
        }
    }

    if !seen_resources_section {
        return Err(FormatError::new(format!(
            "missing {} section",
            dialect.resources_keyword
        )));
    }
    let Some(grid) = grid else {
        return Err(FormatError::new(format!(
            "missing {} section",
            dialect.sitemap_keyword
        )));
    };

    Ok(Layout {
        site_defs,
        resources,
        grid,
        site_by_name,
    })
}

#[allow(clippy::too_many_arguments)]
fn close_section(
    section: Section,
    what: &str,
    line_no: u32,
    dialect: &Dialect,
    site_defs: &mut Vec<SiteDef>,
    site_by_name: &mut HashMap<String, SiteTypeId>,
    seen_resources_section: &mut bool,
    cells: &mut Vec<Option<SiteTypeId>>,
    filled: &mut u32,
    grid: &mut Option<DeviceGrid>,
) -> Result<Section, FormatError> {
    match section {
        Section::Site { name, resources } => {
            if what != dialect.site_keyword {
                return Err(FormatError::at_line(
                    line_no,
                    format!("expected '{} {}'", dialect.end_keyword, dialect.site_keyword),
                ));
            }
            if resources.is_empty() {
                return Err(FormatError::at_line(
                    line_no,
                    format!("site '{name}' declares no resources"),
                ));
            }
            let id = SiteTypeId::from_raw(site_defs.len() as u32);
            site_by_name.insert(name.clone(), id);
            site_defs.push(SiteDef { id, name, resources });
            Ok(Section::Top)
        }
        Section::Resources => {
            if what != dialect.resources_keyword {
                return Err(FormatError::at_line(
                    line_no,
                    format!(
                        "expected '{} {}'",
                        dialect.end_keyword, dialect.resources_keyword
                    ),
                ));
            }
            *seen_resources_section = true;
            Ok(Section::Top)
        }
        Section::Sitemap { width, height } => {
            if what != dialect.sitemap_keyword {
                return Err(FormatError::at_line(
                    line_no,
                    format!(
                        "expected '{} {}'",
                        dialect.end_keyword, dialect.sitemap_keyword
                    ),
                ));
            }
            let expected = width as u64 * height as u64;
            if u64::from(*filled) != expected {
                return Err(FormatError::at_line(
                    line_no,
                    format!(
                        "dimension mismatch: {} declares {width}x{height} ({expected} sites) \
                         but {filled} entries were given",
                        dialect.sitemap_keyword
                    ),
                )
                .in_section(dialect.sitemap_keyword.clone()));
            }
            let sites = std::mem::take(cells)
                .into_iter()
                .map(|slot| slot.expect("full entry count implies every slot set"))
                .collect();
            *grid = Some(DeviceGrid { width, height, sites });
            Ok(Section::Top)
        }
        Section::Top => Err(FormatError::at_line(
            line_no,
            format!("'{} {what}' without an open section", dialect.end_keyword),
        )),
    }
}

/// Serializes a layout back to `.scl` text.
///
/// The grid is written in row-major order; re-parsing the output yields an
/// identical site-type matrix.
pub fn write_scl(layout: &Layout, dialect: &Dialect) -> String {
    let mut out = String::new();
    for def in layout.site_defs() {
        out.push_str(&format!("{} {}\n", dialect.site_keyword, def.name));
        for (kind, count) in &def.resources {
            out.push_str(&format!(
                "  {} {count}\n",
                layout.resources().kind_name(*kind)
            ));
        }
        out.push_str(&format!("{} {}\n", dialect.end_keyword, dialect.site_keyword));
    }

    out.push_str(&format!("{}\n", dialect.resources_keyword));
    for (kind, kind_name) in layout.resources().kinds() {
        let cells: Vec<&str> = layout
            .resources()
            .bindings()
            .filter(|(_, k)| *k == kind)
            .map(|(cell, _)| cell)
            .collect();
        if !cells.is_empty() {
            out.push_str(&format!("  {kind_name} {}\n", cells.join(" ")));
        }
    }
    out.push_str(&format!(
        "{} {}\n",
        dialect.end_keyword, dialect.resources_keyword
    ));

    let grid = layout.grid();
    out.push_str(&format!(
        "{} {} {}\n",
        dialect.sitemap_keyword,
        grid.width(),
        grid.height()
    ));
    for (x, y, site) in grid.iter() {
        out.push_str(&format!("{x} {y} {}\n", layout.site_def(site).name));
    }
    out.push_str(&format!(
        "{} {}\n",
        dialect.end_keyword, dialect.sitemap_keyword
    ));
    out
}
