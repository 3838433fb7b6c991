mod common;

use common::synthetic_frames::{add_noise, paint, shifted_stripe_u8, stripe_u8, XorShift, STRIP};
use trolley_tracker::config::{Thresholds, TrackerConfig};
use trolley_tracker::image::ImageU8;
use trolley_tracker::kalman::{KalmanParams, KalmanTracker, PartialMissPolicy};
use trolley_tracker::sequence::track;
use trolley_tracker::types::{Seed, Termination};

const W: usize = 1000;
const H: usize = 2048;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run_columns(tracker: &mut KalmanTracker, img: &ImageU8<'_>, from: usize) -> Termination {
    for x in from..img.w {
        let t = tracker.step(img, x).expect("column step");
        if t.is_terminal() {
            return t;
        }
    }
    Termination::None
}

#[test]
fn clean_strip_is_tracked_across_the_frame() {
    init_logging();
    let mut data = stripe_u8(W, H, 970, 1000);
    add_noise(&mut data, 4, 7);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();

    let seed = Seed::new("trolley1", 0, 970.0, 1000.0);
    let report = track(&[img.clone()], seed.clone(), 1, &TrackerConfig::kalman()).unwrap();
    assert_eq!(report.termination, Termination::None);
    assert_eq!(report.frames_completed, 1);

    let samples = &report.frames[0].primary().unwrap().samples;
    assert_eq!(samples.len(), W);
    for s in samples {
        assert!(s.upper_edge < s.lower_edge, "column {}", s.column);
        assert!((967.0..=971.0).contains(&s.upper_edge), "column {}", s.column);
        assert!((999.0..=1003.0).contains(&s.lower_edge), "column {}", s.column);
        assert!(s.width <= 60.0);
        assert_eq!(s.missing, [false, false]);
    }

    let mut tracker = KalmanTracker::new(&seed, KalmanParams::default(), Thresholds::default());
    tracker.begin_frame(&seed);
    assert_eq!(run_columns(&mut tracker, &img, 0), Termination::None);
    assert_eq!(tracker.num_observations(), W);
    assert_eq!(tracker.missing_count(), 0.0);
}

#[test]
fn observations_match_processed_columns_from_a_mid_frame_seed() {
    init_logging();
    let data = stripe_u8(W, H, 970, 1000);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    let seed = Seed::new("trolley1", 250, 970.0, 1000.0);
    let mut tracker = KalmanTracker::new(&seed, KalmanParams::default(), Thresholds::default());
    tracker.begin_frame(&seed);
    assert_eq!(run_columns(&mut tracker, &img, seed.x), Termination::None);
    assert_eq!(tracker.num_observations(), W - 250);
    assert_eq!(tracker.samples().first().map(|s| s.column), Some(250));
}

#[test]
fn insensitive_sharpness_threshold_stops_after_warm_up() {
    init_logging();
    let data = stripe_u8(W, H, 970, 1000);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    let config = TrackerConfig {
        thresholds: Thresholds {
            sharpness_threshold: 300.0,
            missing_count_limit: 0.0,
            ..Default::default()
        },
        ..TrackerConfig::kalman()
    };
    let report = track(&[img], Seed::new("trolley1", 0, 970.0, 1000.0), 1, &config).unwrap();
    assert_eq!(report.termination, Termination::ExceedMissingCount);
    assert_eq!(report.frames_completed, 0);
    let frame = &report.frames[0];
    assert!(!frame.completed);
    // the first three columns are warm-up; column 3 is a double miss
    let samples = &frame.primary().unwrap().samples;
    assert_eq!(samples.len(), 4);
    assert_eq!(samples[3].missing, [true, true]);
}

#[test]
fn zero_tolerance_on_a_jittering_strip_stops_well_before_the_frame_edge() {
    init_logging();
    let mut rng = XorShift::new(42);
    let jitter: Vec<i64> = (0..W).map(|_| rng.symmetric(2)).collect();
    let data = shifted_stripe_u8(W, H, 970, 1000, |x| jitter[x]);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    let config = TrackerConfig {
        thresholds: Thresholds {
            missing_threshold: 0.0,
            missing_count_limit: 0.0,
            ..Default::default()
        },
        ..TrackerConfig::kalman()
    };
    let report = track(&[img], Seed::new("trolley1", 0, 970.0, 1000.0), 1, &config).unwrap();
    assert_eq!(report.termination, Termination::ExceedMissingCount);
    assert!(report.frames[0].primary().unwrap().samples.len() < W);
}

#[test]
fn wide_seed_terminates_on_width_at_the_first_column() {
    init_logging();
    let data = stripe_u8(W, H, 970, 1000);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    let report = track(
        &[img],
        Seed::new("trolley1", 0, 900.0, 1000.0),
        1,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    assert_eq!(report.termination, Termination::ExceedWidth);
    let samples = &report.frames[0].primary().unwrap().samples;
    assert_eq!(samples.len(), 1);
    assert!(samples[0].width > 60.0);
}

#[test]
fn seed_below_the_frame_is_out_of_sight() {
    init_logging();
    let data = stripe_u8(W, H, 970, 1000);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    let report = track(
        &[img],
        Seed::new("trolley1", 0, 2550.0, 2600.0),
        1,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    assert_eq!(report.termination, Termination::OutOfSight);
    assert_eq!(report.frames_completed, 0);
    assert!(report.frames[0].primary().unwrap().samples.is_empty());
}

#[test]
fn repeated_runs_are_identical() {
    init_logging();
    let mut data = stripe_u8(W, H, 970, 1000);
    add_noise(&mut data, 6, 3);
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    let seed = Seed::new("trolley1", 0, 970.0, 1000.0);
    let a = track(&[img.clone()], seed.clone(), 1, &TrackerConfig::kalman()).unwrap();
    let b = track(&[img], seed, 1, &TrackerConfig::kalman()).unwrap();
    assert_eq!(a.frames, b.frames);
    assert_eq!(a.resume, b.resume);
}

fn occluded_lower_edge() -> Vec<u8> {
    let mut data = stripe_u8(W, H, 970, 1000);
    // from column 100 on the strip runs into a bright background below it
    paint(&mut data, W, 100..W, 1001, H - 1, STRIP);
    data
}

#[test]
fn single_edge_misses_accumulate_a_quarter_per_column() {
    init_logging();
    let data = occluded_lower_edge();
    let img = ImageU8::try_new(W, H, W, &data).unwrap();
    for policy in [
        PartialMissPolicy::SubstituteEstimate,
        PartialMissPolicy::ScalarUpdate,
    ] {
        let params = KalmanParams {
            partial_miss: policy,
            ..Default::default()
        };
        let seed = Seed::new("trolley1", 0, 970.0, 1000.0);
        let mut tracker = KalmanTracker::new(&seed, params, Thresholds::default());
        tracker.begin_frame(&seed);

        let mut previous = 0.0;
        let mut termination = Termination::None;
        for x in 0..W {
            termination = tracker.step(&img, x).unwrap();
            assert!(tracker.missing_count() >= previous, "{policy:?} column {x}");
            previous = tracker.missing_count();
            if termination.is_terminal() {
                break;
            }
        }
        assert_eq!(termination, Termination::ExceedMissingCount, "{policy:?}");
        // 401 single misses from column 100 push the count past 100
        assert_eq!(tracker.samples().len(), 501, "{policy:?}");
        assert_eq!(tracker.missing_count(), 100.25, "{policy:?}");
        for s in &tracker.samples()[100..] {
            assert_eq!(s.missing, [false, true]);
            assert!((998.0..=1003.0).contains(&s.lower_edge), "{policy:?} column {}", s.column);
            assert!((967.0..=971.0).contains(&s.upper_edge), "{policy:?} column {}", s.column);
        }
    }
}
