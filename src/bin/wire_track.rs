use trolley_tracker::config::{load_config, SeedConfig};
use trolley_tracker::image::io::write_json_file;
use trolley_tracker::sequence::{CancelFlag, FileSource, SequenceDriver, TrackReport};
use trolley_tracker::types::Seed;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let frame_count = config.frame_count();
    let mut source = FileSource::new(config.inputs.clone());
    let driver = SequenceDriver::new(config.tracker.clone());
    let seed = match &config.seed {
        SeedConfig::Edges {
            wire_id,
            x,
            y_upper,
            y_lower,
        } => Seed::new(wire_id.clone(), *x, *y_upper, *y_lower),
        SeedConfig::Center {
            wire_id,
            x,
            center_row,
        } => driver
            .locate_seed(&mut source, config.start_frame, wire_id, *x, *center_row)
            .map_err(|e| format!("Seed search failed: {e}"))?,
    };
    let report = match driver.run(
        &mut source,
        seed,
        config.start_frame,
        frame_count,
        &CancelFlag::new(),
    ) {
        Ok(report) => report,
        Err(failure) => {
            // keep whatever was tracked before the fault
            write_json_file(&config.output.report_json, &failure.partial)?;
            return Err(format!(
                "{failure}; partial report written to {}",
                config.output.report_json.display()
            ));
        }
    };

    write_json_file(&config.output.report_json, &report)?;
    print_summary(&report);
    println!(
        "Saved track report to {}",
        config.output.report_json.display()
    );
    Ok(())
}

fn print_summary(report: &TrackReport) {
    println!(
        "method={:?} frames_completed={} termination={} cancelled={}",
        report.method,
        report.frames_completed,
        report.termination.describe(),
        report.cancelled
    );
    for frame in &report.frames {
        for series in &frame.series {
            println!(
                "  frame {:>5} {:<20} columns={:>5} observed={:>5}{}",
                frame.frame_index,
                series.wire_id,
                series.samples.len(),
                series.observed_columns(),
                if frame.completed { "" } else { " (partial)" }
            );
        }
    }
    if let Some(rate) = report.timing.columns_per_second() {
        println!("tracked {rate:.0} columns/s");
    }
    let resume = &report.resume;
    println!(
        "resume at frame {} with seed ({:.2}, {:.2})",
        resume.frame_index, resume.seed.y_upper, resume.seed.y_lower
    );
}

fn usage() -> String {
    "Usage: wire_track <config.json>".to_string()
}
