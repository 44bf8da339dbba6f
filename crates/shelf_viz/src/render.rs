//! Floorplan and fixed-instance rasterization.

use crate::palette;
use image::{Rgba, RgbaImage};
use shelf_model::{Layout, Library, Netlist, PlacementSet, SiteTypeId};
use std::collections::HashMap;

/// Above this many sites, per-cell grid lines stop being legible and are
/// suppressed by [`RenderOptions::auto`].
const GRID_LINE_LIMIT: usize = 10_000;

/// Rendering parameters.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Edge length of one site in pixels.
    pub cell_size: u32,
    /// Whether to draw 1-px cell borders.
    pub grid_lines: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cell_size: 8,
            grid_lines: true,
        }
    }
}

impl RenderOptions {
    /// Picks defaults suited to the given layout: grid lines on small
    /// devices only.
    pub fn auto(layout: &Layout) -> Self {
        Self {
            grid_lines: layout.grid().site_count() <= GRID_LINE_LIMIT,
            ..Self::default()
        }
    }

    fn cell(&self) -> u32 {
        self.cell_size.max(1)
    }
}

/// Maps each site type to its fill color, assigned by sorted name.
pub fn site_colors(layout: &Layout) -> HashMap<SiteTypeId, Rgba<u8>> {
    let mut names: Vec<(&str, SiteTypeId)> = layout
        .site_defs()
        .map(|def| (def.name.as_str(), def.id))
        .collect();
    names.sort();
    names
        .into_iter()
        .enumerate()
        .map(|(i, (_, id))| (id, palette::pick(&palette::SITE_PALETTE, i)))
        .collect()
}

/// Renders the device floorplan: one square per site, colored by site
/// type, row 0 at the top.
///
/// A single linear pass over the grid; cost is O(width × height ×
/// cell_size²) regardless of how many site types or instances exist.
pub fn render_sitemap(layout: &Layout, opts: &RenderOptions) -> RgbaImage {
    let colors = site_colors(layout);
    let grid = layout.grid();
    let cell = opts.cell();
    let mut img = blank_canvas(grid.width(), grid.height(), cell);

    for (x, y, site) in grid.iter() {
        fill_site(&mut img, x, y, cell, colors[&site], opts.grid_lines);
    }
    img
}

/// Maps each cell type with fixed instances to a marker color, assigned
/// by sorted name.
pub fn marker_colors(
    library: &Library,
    netlist: &Netlist,
    placement: &PlacementSet,
) -> HashMap<String, Rgba<u8>> {
    let mut names: Vec<&str> = placement
        .iter_placed()
        .filter(|(_, p)| p.fixed)
        .map(|(id, _)| library.cell(netlist.instance(id).cell).name.as_str())
        .collect();
    names.sort();
    names.dedup();
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), palette::pick(&palette::MARKER_PALETTE, i)))
        .collect()
}

/// Renders fixed placements as colored markers (keyed by master cell
/// type) on an empty grid of the layout's extents. Movable placements
/// and out-of-grid entries are not drawn.
pub fn render_fixed(
    library: &Library,
    layout: &Layout,
    netlist: &Netlist,
    placement: &PlacementSet,
    opts: &RenderOptions,
) -> RgbaImage {
    let colors = marker_colors(library, netlist, placement);
    let grid = layout.grid();
    let cell = opts.cell();
    let mut img = blank_canvas(grid.width(), grid.height(), cell);

    if opts.grid_lines {
        for (x, y, _) in grid.iter() {
            outline_site(&mut img, x, y, cell, Rgba([0xd0, 0xd0, 0xd0, 0xff]));
        }
    }

    for (id, p) in placement.iter_placed() {
        if !p.fixed || !grid.in_bounds(p.x, p.y) {
            continue;
        }
        let cell_name = &library.cell(netlist.instance(id).cell).name;
        fill_site(&mut img, p.x, p.y, cell, colors[cell_name], opts.grid_lines);
    }
    img
}

fn blank_canvas(width: u32, height: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_pixel(width * cell, height * cell, palette::BACKGROUND)
}

/// Fills one site square; y counts down from the top row.
fn fill_site(img: &mut RgbaImage, x: u32, y: u32, cell: u32, color: Rgba<u8>, border: bool) {
    let (x0, y0) = (x * cell, y * cell);
    for py in y0..y0 + cell {
        for px in x0..x0 + cell {
            img.put_pixel(px, py, color);
        }
    }
    if border && cell >= 3 {
        outline_site(img, x, y, cell, palette::GRID_LINE);
    }
}

fn outline_site(img: &mut RgbaImage, x: u32, y: u32, cell: u32, color: Rgba<u8>) {
    let (x0, y0) = (x * cell, y * cell);
    for px in x0..x0 + cell {
        img.put_pixel(px, y0, color);
        img.put_pixel(px, y0 + cell - 1, color);
    }
    for py in y0..y0 + cell {
        img.put_pixel(x0, py, color);
        img.put_pixel(x0 + cell - 1, py, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_model::{parse_lib, parse_nodes, parse_pl, parse_scl, Dialect};

    const SCL: &str = "\
SITE SLICE
  LUT 16
END SITE
SITE IOB
  IO 2
END SITE
RESOURCES
  LUT LUT4
  IO IBUF
END RESOURCES
SITEMAP 3 2
0 0 IOB
1 0 SLICE
2 0 SLICE
0 1 IOB
1 1 SLICE
2 1 SLICE
END SITEMAP
";

    const LIB: &str = "\
CELL IBUF
  PIN O OUTPUT
END CELL
CELL OBUF
  PIN I INPUT
END CELL
";

    fn layout() -> Layout {
        parse_scl(SCL, &Dialect::default()).unwrap()
    }

    #[test]
    fn sitemap_dimensions() {
        let opts = RenderOptions {
            cell_size: 4,
            grid_lines: false,
        };
        let img = render_sitemap(&layout(), &opts);
        assert_eq!(img.width(), 12);
        assert_eq!(img.height(), 8);
    }

    #[test]
    fn sitemap_colors_by_type() {
        let layout = layout();
        let opts = RenderOptions {
            cell_size: 4,
            grid_lines: false,
        };
        let img = render_sitemap(&layout, &opts);
        // Center pixels of (0,0) [IOB] and (1,0) [SLICE] differ; both
        // SLICE sites match each other.
        let iob = img.get_pixel(2, 2);
        let slice_a = img.get_pixel(6, 2);
        let slice_b = img.get_pixel(10, 2);
        assert_ne!(iob, slice_a);
        assert_eq!(slice_a, slice_b);
    }

    #[test]
    fn color_assignment_is_stable() {
        let layout = layout();
        let colors = site_colors(&layout);
        // Sorted order: IOB before SLICE.
        let iob = layout.site_type("IOB").unwrap();
        let slice = layout.site_type("SLICE").unwrap();
        assert_eq!(colors[&iob], palette::pick(&palette::SITE_PALETTE, 0));
        assert_eq!(colors[&slice], palette::pick(&palette::SITE_PALETTE, 1));
    }

    #[test]
    fn grid_lines_drawn_when_enabled() {
        let layout = layout();
        let opts = RenderOptions {
            cell_size: 8,
            grid_lines: true,
        };
        let img = render_sitemap(&layout, &opts);
        assert_eq!(*img.get_pixel(0, 0), palette::GRID_LINE);
        assert_ne!(*img.get_pixel(4, 4), palette::GRID_LINE);
    }

    #[test]
    fn auto_options_follow_grid_size() {
        let opts = RenderOptions::auto(&layout());
        assert!(opts.grid_lines);
    }

    #[test]
    fn fixed_overlay_marks_only_fixed() {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        let layout = layout();
        let netlist = parse_nodes("in0 IBUF\nout0 OBUF\n", &library, &dialect).unwrap();
        let placement = parse_pl("in0 0 0 0 FIXED\nout0 2 1 0\n", &netlist, &dialect).unwrap();
        let opts = RenderOptions {
            cell_size: 4,
            grid_lines: false,
        };
        let img = render_fixed(&library, &layout, &netlist, &placement, &opts);
        // Fixed marker at (0,0).
        assert_ne!(*img.get_pixel(2, 2), palette::BACKGROUND);
        // Movable instance at (2,1) leaves the background untouched.
        assert_eq!(*img.get_pixel(10, 6), palette::BACKGROUND);
    }

    #[test]
    fn marker_colors_keyed_by_cell_type() {
        let dialect = Dialect::default();
        let library = parse_lib(LIB, &dialect).unwrap();
        let netlist = parse_nodes("a IBUF\nb IBUF\nc OBUF\n", &library, &dialect).unwrap();
        let placement = parse_pl(
            "a 0 0 0 FIXED\nb 1 0 0 FIXED\nc 2 0 0 FIXED\n",
            &netlist,
            &dialect,
        )
        .unwrap();
        let colors = marker_colors(&library, &netlist, &placement);
        assert_eq!(colors.len(), 2);
        assert_ne!(colors["IBUF"], colors["OBUF"]);
    }
}
