//! Implementation of the `shelf fixed` command.
//!
//! Loads a design bundle and renders its fixed instances as colored
//! markers on the device grid.

use std::path::PathBuf;

use shelf_viz::{render_fixed, RenderOptions};

use crate::bundle::{load_design, print_diagnostics, require_consistent};
use crate::{FixedArgs, GlobalArgs};

/// Runs the `shelf fixed` command.
pub fn run(args: &FixedArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (design, sink) = load_design(&args.dir, global)?;
    require_consistent(&sink, global)?;
    print_diagnostics(&sink, global);

    let Some(placement) = &design.placement else {
        return Err(format!("design '{}' has no placement file", design.name).into());
    };
    let fixed_count = placement.fixed_count();
    if fixed_count == 0 && !global.quiet {
        eprintln!("warning: design '{}' has no fixed instances", design.name);
    }

    let mut opts = RenderOptions::auto(&design.layout);
    if let Some(cell_size) = args.cell_size {
        opts.cell_size = cell_size;
    }
    if args.no_grid_lines {
        opts.grid_lines = false;
    }

    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(format!("{}_fixed.png", design.name)),
    };

    let img = render_fixed(
        &design.library,
        &design.layout,
        &design.netlist,
        placement,
        &opts,
    );
    img.save(&output)?;
    if !global.quiet {
        eprintln!("wrote {} ({fixed_count} fixed instances)", output.display());
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn renders_fixed_overlay() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        let out = dir.path().join("fixed.png");
        let args = FixedArgs {
            dir: dir.path().to_str().unwrap().to_string(),
            output: Some(out.to_str().unwrap().to_string()),
            cell_size: Some(4),
            no_grid_lines: false,
        };
        assert_eq!(run(&args, &fixtures::global()).unwrap(), 0);
        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn missing_placement_fails() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        fs::write(
            dir.path().join("demo.aux"),
            "demo : demo.lib demo.scl demo.nodes demo.nets\n",
        )
        .unwrap();
        let args = FixedArgs {
            dir: dir.path().to_str().unwrap().to_string(),
            output: Some(dir.path().join("x.png").to_str().unwrap().to_string()),
            cell_size: None,
            no_grid_lines: false,
        };
        let err = run(&args, &fixtures::global()).unwrap_err();
        assert!(err.to_string().contains("no placement file"));
    }

    #[test]
    fn inconsistent_bundle_fails() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        fs::write(dir.path().join("demo.pl"), "IBUF0 9 9 0 FIXED\n").unwrap();
        let args = FixedArgs {
            dir: dir.path().to_str().unwrap().to_string(),
            output: Some(dir.path().join("x.png").to_str().unwrap().to_string()),
            cell_size: None,
            no_grid_lines: false,
        };
        let err = run(&args, &fixtures::global()).unwrap_err();
        assert!(err.to_string().contains("consistency error"));
    }
}
