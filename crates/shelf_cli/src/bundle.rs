//! Shared design-bundle loading for the subcommands.

use std::path::Path;

use shelf_model::{Design, DiagnosticSink};

use crate::GlobalArgs;

/// Loads a design bundle, returning the design and the sink holding any
/// validation findings.
pub fn load_design(
    dir: &str,
    global: &GlobalArgs,
) -> Result<(Design, DiagnosticSink), Box<dyn std::error::Error>> {
    let path = Path::new(dir);
    if !path.is_dir() {
        return Err(format!("not a directory: {dir}").into());
    }
    let sink = DiagnosticSink::new();
    let design = Design::load(path, &global.dialect, &sink)?;
    if global.verbose && !global.quiet {
        eprintln!(
            "loaded design '{}': {} cells, {} instances, {} nets, {}x{} grid",
            design.name,
            design.library.len(),
            design.netlist.instance_count(),
            design.netlist.net_count(),
            design.layout.grid().width(),
            design.layout.grid().height(),
        );
    }
    Ok((design, sink))
}

/// Prints the sink's findings to stderr.
///
/// Warnings are suppressed under `--quiet`; errors always print.
pub fn print_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) {
    for diag in sink.diagnostics() {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprintln!("{diag}");
    }
}

/// Fails with a pointer to `shelf check` if the sink holds errors.
pub fn require_consistent(
    sink: &DiagnosticSink,
    global: &GlobalArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if sink.has_errors() {
        print_diagnostics(sink, global);
        return Err(format!(
            "design has {} consistency error(s); see `shelf check`",
            sink.error_count()
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::Path;

    pub const AUX: &str = "demo : demo.lib demo.scl demo.nodes demo.nets demo.pl demo.wts\n";

    pub const LIB: &str = "\
CELL LUT4
  PIN I0 INPUT
  PIN O OUTPUT
END CELL
CELL IBUF
  PIN O OUTPUT
END CELL
";

    pub const SCL: &str = "\
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
SITEMAP 2 2
0 0 IOB
1 0 SLICE
0 1 IOB
1 1 SLICE
END SITEMAP
";

    pub const NODES: &str = "IBUF0 IBUF\nlut_a LUT4\n";

    pub const NETS: &str = "net n1 2\n\tIBUF0 O\n\tlut_a I0\nendnet\n";

    pub const PL: &str = "IBUF0 0 0 0 FIXED\n";

    pub const WTS: &str = "n1 1.0\n";

    pub fn write_bundle(dir: &Path) {
        fs::write(dir.join("demo.aux"), AUX).unwrap();
        fs::write(dir.join("demo.lib"), LIB).unwrap();
        fs::write(dir.join("demo.scl"), SCL).unwrap();
        fs::write(dir.join("demo.nodes"), NODES).unwrap();
        fs::write(dir.join("demo.nets"), NETS).unwrap();
        fs::write(dir.join("demo.pl"), PL).unwrap();
        fs::write(dir.join("demo.wts"), WTS).unwrap();
    }

    pub fn global() -> crate::GlobalArgs {
        crate::GlobalArgs {
            quiet: true,
            verbose: false,
            dialect: shelf_model::Dialect::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_bundle() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        let global = fixtures::global();
        let (design, sink) = load_design(dir.path().to_str().unwrap(), &global).unwrap();
        assert_eq!(design.name, "demo");
        assert!(!sink.has_errors());
    }

    #[test]
    fn load_missing_directory() {
        let global = fixtures::global();
        let err = load_design("/nonexistent/path", &global).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn require_consistent_passes_clean_sink() {
        let global = fixtures::global();
        let sink = DiagnosticSink::new();
        assert!(require_consistent(&sink, &global).is_ok());
    }

    #[test]
    fn require_consistent_rejects_errors() {
        let global = fixtures::global();
        let sink = DiagnosticSink::new();
        sink.emit(shelf_model::Diagnostic::error("broken"));
        let err = require_consistent(&sink, &global).unwrap_err();
        assert!(err.to_string().contains("1 consistency error(s)"));
    }
}
