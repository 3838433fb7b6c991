use trolley_tracker::image::ImageU8;
use trolley_tracker::{track, Seed, TrackerConfig};

fn main() {
    // Demo stub: a bright strip on a dark sky, sagging by up to ten rows in
    // the middle of the frame, tracked over two frames by both trackers.
    let (w, h) = (1000usize, 2048usize);
    let mut gray = vec![30u8; w * h];
    for x in 0..w {
        let shift = 10 - (x / 50).abs_diff(10);
        for y in 975 + shift..=995 + shift {
            gray[y * w + x] = 200;
        }
    }
    let frames = [
        ImageU8 {
            w,
            h,
            stride: w,
            data: &gray,
        },
        ImageU8 {
            w,
            h,
            stride: w,
            data: &gray,
        },
    ];

    for config in [TrackerConfig::kalman(), TrackerConfig::template()] {
        let seed = Seed::new("trolley1", 0, 975.0, 995.0);
        match track(&frames, seed, frames.len(), &config) {
            Ok(report) => {
                let widths: Vec<f64> = report
                    .primary_samples()
                    .filter(|s| s.is_observed())
                    .map(|s| s.width)
                    .collect();
                let mean_width = widths.iter().sum::<f64>() / widths.len().max(1) as f64;
                println!(
                    "method={:?} frames={} termination={:?} columns={} mean_width={:.2} total_ms={:.1}",
                    report.method,
                    report.frames_completed,
                    report.termination,
                    widths.len(),
                    mean_width,
                    report.timing.total_ms
                );
            }
            Err(failure) => println!("method={:?} failed: {failure}", config.method),
        }
    }
}
