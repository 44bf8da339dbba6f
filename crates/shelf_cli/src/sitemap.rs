//! Implementation of the `shelf sitemap` command.
//!
//! Reads a `.scl` layout file on its own (no bundle needed) and renders
//! the device floorplan to a PNG.

use std::path::{Path, PathBuf};

use shelf_model::parse_scl;
use shelf_viz::{render_sitemap, RenderOptions};

use crate::{GlobalArgs, SitemapArgs};

/// Runs the `shelf sitemap` command.
pub fn run(args: &SitemapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.scl);
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let layout = parse_scl(&text, &global.dialect).map_err(|e| e.with_file(path))?;

    let mut opts = RenderOptions::auto(&layout);
    if let Some(cell_size) = args.cell_size {
        opts.cell_size = cell_size;
    }
    if args.no_grid_lines {
        opts.grid_lines = false;
    }

    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => default_output(path),
    };

    let img = render_sitemap(&layout, &opts);
    img.save(&output)?;
    if !global.quiet {
        eprintln!(
            "wrote {} ({}x{} sites at {} px)",
            output.display(),
            layout.grid().width(),
            layout.grid().height(),
            opts.cell_size
        );
    }
    Ok(0)
}

/// `demo.scl` renders to `demo_sitemap.png` next to the input.
fn default_output(scl: &Path) -> PathBuf {
    let stem = scl
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sitemap".to_string());
    scl.with_file_name(format!("{stem}_sitemap.png"))
}
