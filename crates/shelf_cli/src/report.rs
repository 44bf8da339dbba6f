//! Implementation of the `shelf report` command.
//!
//! Loads a design bundle, builds the statistics report, and writes it to
//! stdout or a file as text or JSON. Refuses to report over a model with
//! consistency errors, since utilization math over a broken model would
//! silently misreport.

use std::fs;

use shelf_report::DesignReport;

use crate::bundle::{load_design, print_diagnostics, require_consistent};
use crate::{GlobalArgs, ReportArgs, ReportFormat};

/// Runs the `shelf report` command.
pub fn run(args: &ReportArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (design, sink) = load_design(&args.dir, global)?;
    require_consistent(&sink, global)?;

    let report = DesignReport::build(&design, &sink);
    print_diagnostics(&sink, global);

    let rendered = match args.format {
        ReportFormat::Text => report.to_text(),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            if !global.quiet {
                eprintln!("wrote {path}");
            }
        }
        None => print!("{rendered}"),
    }

    Ok(0)
}
