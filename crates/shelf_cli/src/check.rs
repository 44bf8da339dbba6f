//! Implementation of the `shelf check` command.
//!
//! Parses a design bundle and reports every cross-file consistency
//! finding. Exit code: 0 when clean, 1 when only warnings were found,
//! 2 when errors were found.

use crate::bundle::{load_design, print_diagnostics};
use crate::{CheckArgs, GlobalArgs};

/// Runs the `shelf check` command.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (design, sink) = load_design(&args.dir, global)?;
    print_diagnostics(&sink, global);

    let diagnostics = sink.diagnostics();
    let code = if sink.has_errors() {
        2
    } else if !diagnostics.is_empty() {
        1
    } else {
        0
    };

    if !global.quiet {
        let errors = sink.error_count();
        let warnings = diagnostics.len() - errors;
        eprintln!(
            "checked design '{}': {errors} error(s), {warnings} warning(s)",
            design.name
        );
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures;
    use std::fs;
    use tempfile::TempDir;

    fn args_for(dir: &TempDir) -> CheckArgs {
        CheckArgs {
            dir: dir.path().to_str().unwrap().to_string(),
        }
    }

    #[test]
    fn clean_bundle_exits_zero() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        assert_eq!(run(&args_for(&dir), &fixtures::global()).unwrap(), 0);
    }

    #[test]
    fn warnings_exit_one() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        // A weight for a net the netlist does not define is a warning.
        fs::write(dir.path().join("demo.wts"), "phantom 1.0\n").unwrap();
        assert_eq!(run(&args_for(&dir), &fixtures::global()).unwrap(), 1);
    }

    #[test]
    fn errors_exit_two() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        fs::write(dir.path().join("demo.pl"), "IBUF0 9 9 0 FIXED\n").unwrap();
        assert_eq!(run(&args_for(&dir), &fixtures::global()).unwrap(), 2);
    }

    #[test]
    fn parse_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        fixtures::write_bundle(dir.path());
        fs::write(dir.path().join("demo.nodes"), "ghost NOSUCHCELL\n").unwrap();
        let err = run(&args_for(&dir), &fixtures::global()).unwrap_err();
        assert!(err.to_string().contains("NOSUCHCELL"));
        assert!(err.to_string().contains("demo.nodes"));
    }
}
