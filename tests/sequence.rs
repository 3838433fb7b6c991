mod common;

use common::synthetic_frames::stripe_u8;
use std::path::PathBuf;
use trolley_tracker::config::TrackerConfig;
use trolley_tracker::error::TrackError;
use trolley_tracker::image::ImageU8;
use trolley_tracker::sequence::{
    run_tracks, track, CancelFlag, FileSource, FrameSource, ParallelOptions, SequenceDriver,
    SliceSource, TrackJob,
};
use trolley_tracker::types::{Seed, Termination};

const W: usize = 300;
const H: usize = 400;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One frame per entry, strip rows shifted by `shift * index`.
fn drifting_frames(count: usize, shift: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|k| stripe_u8(W, H, 170 + shift * k, 200 + shift * k))
        .collect()
}

fn views(buffers: &[Vec<u8>]) -> Vec<ImageU8<'_>> {
    buffers
        .iter()
        .map(|d| ImageU8::try_new(W, H, W, d).unwrap())
        .collect()
}

#[test]
fn seed_carries_over_a_drifting_strip() {
    init_logging();
    let buffers = drifting_frames(4, 3);
    let frames = views(&buffers);
    let report = track(
        &frames,
        Seed::new("trolley1", 40, 170.0, 200.0),
        4,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    assert_eq!(report.termination, Termination::None);
    assert_eq!(report.frames_completed, 4);
    assert_eq!(report.frames[0].primary().unwrap().samples.len(), W - 40);
    for frame in &report.frames[1..] {
        assert!(frame.completed);
        assert_eq!(frame.primary().unwrap().samples[0].column, 0);
    }
    let seed = report.last_seed();
    assert_eq!(seed.x, 0);
    assert!((seed.y_upper - 178.5).abs() < 2.0, "{seed:?}");
    assert!((seed.y_lower - 209.0).abs() < 2.0, "{seed:?}");
    assert_eq!(report.primary_samples().count(), W - 40 + 3 * W);
}

#[test]
fn resuming_reproduces_an_uninterrupted_run() {
    init_logging();
    let buffers = drifting_frames(4, 2);
    let frames = views(&buffers);
    let driver = SequenceDriver::new(TrackerConfig::kalman());
    let seed = Seed::new("trolley1", 0, 170.0, 200.0);
    let cancel = CancelFlag::new();

    let full = driver
        .run(&mut SliceSource::new(&frames), seed.clone(), 0, 4, &cancel)
        .unwrap();
    let head = driver
        .run(&mut SliceSource::new(&frames), seed, 0, 2, &cancel)
        .unwrap();
    assert_eq!(head.resume.frame_index, 2);
    let tail = driver
        .run(
            &mut SliceSource::new(&frames),
            head.resume.seed.clone(),
            head.resume.frame_index,
            2,
            &cancel,
        )
        .unwrap();
    assert_eq!(tail.frames, full.frames[2..]);
    assert_eq!(tail.resume, full.resume);
}

/// Source that raises the cancel flag once a given frame has been served.
struct CancellingSource<'s, 'a> {
    inner: SliceSource<'s, 'a>,
    cancel: CancelFlag,
    after: usize,
}

impl FrameSource for CancellingSource<'_, '_> {
    fn frame_count(&self) -> usize {
        self.inner.frame_count()
    }

    fn frame(&mut self, index: usize) -> Result<ImageU8<'_>, TrackError> {
        if index == self.after {
            self.cancel.cancel();
        }
        self.inner.frame(index)
    }
}

#[test]
fn cancellation_stops_between_frames() {
    init_logging();
    let buffers = drifting_frames(4, 0);
    let frames = views(&buffers);
    let cancel = CancelFlag::new();
    let mut source = CancellingSource {
        inner: SliceSource::new(&frames),
        cancel: cancel.clone(),
        after: 1,
    };
    let report = SequenceDriver::new(TrackerConfig::kalman())
        .run(&mut source, Seed::new("trolley1", 0, 170.0, 200.0), 0, 4, &cancel)
        .unwrap();
    assert!(report.cancelled);
    assert_eq!(report.termination, Termination::None);
    // the frame being processed when the flag went up still completes
    assert_eq!(report.frames_completed, 2);
    assert!(report.frames.iter().all(|f| f.completed));
    assert_eq!(report.resume.frame_index, 2);
}

#[test]
fn frame_count_is_clamped_to_the_source() {
    init_logging();
    let buffers = drifting_frames(2, 0);
    let frames = views(&buffers);
    let report = track(
        &frames,
        Seed::new("trolley1", 0, 170.0, 200.0),
        10,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    assert_eq!(report.frames_completed, 2);
    assert_eq!(report.termination, Termination::None);
    assert_eq!(report.resume.frame_index, 2);
}

#[test]
fn terminated_frame_is_kept_but_not_counted() {
    init_logging();
    let mut buffers = drifting_frames(3, 0);
    // the strip is gone in the second frame
    buffers[1] = vec![30u8; W * H];
    let frames = views(&buffers);
    let report = track(
        &frames,
        Seed::new("trolley1", 0, 170.0, 200.0),
        3,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    assert_eq!(report.frames_completed, 1);
    assert_eq!(report.frames.len(), 2);
    assert!(!report.frames[1].completed);
    assert!(report.termination.is_terminal());
    assert_eq!(report.resume.frame_index, 1);
}

#[test]
fn report_serializes_with_camel_case_keys() {
    init_logging();
    let buffers = drifting_frames(1, 0);
    let frames = views(&buffers);
    let report = track(
        &frames,
        Seed::new("trolley1", 0, 170.0, 200.0),
        1,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["method"], "kalman");
    assert_eq!(v["framesCompleted"], 1);
    assert_eq!(v["termination"], "none");
    assert_eq!(v["resume"]["seed"]["wireId"], "trolley1");
    let first = &v["frames"][0]["series"][0];
    assert_eq!(first["slot"], "primary");
    assert_eq!(first["samples"].as_array().unwrap().len(), W);
}

#[test]
fn independent_tracks_run_side_by_side() {
    init_logging();
    let buffers = vec![stripe_u8(W, H, 100, 120), stripe_u8(W, H, 100, 120)];
    let frames = views(&buffers);
    let jobs: Vec<TrackJob> = ["left", "right"]
        .iter()
        .map(|id| TrackJob {
            seed: Seed::new(*id, 0, 100.0, 120.0),
            start_frame: 0,
            frame_count: 2,
        })
        .collect();
    let results = run_tracks(
        &frames,
        &jobs,
        &TrackerConfig::template(),
        &CancelFlag::new(),
        ParallelOptions::default(),
    );
    let reports: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(reports[0].last_seed().wire_id, "left");
    assert_eq!(reports[1].last_seed().wire_id, "right");
    for (a, b) in reports[0].frames.iter().zip(&reports[1].frames) {
        assert_eq!(a.primary().unwrap().samples, b.primary().unwrap().samples);
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("trolley_tracker_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn file_source_decodes_frames_on_demand() {
    init_logging();
    let dir = temp_dir("file_source");
    let buffers = drifting_frames(2, 1);
    let paths: Vec<PathBuf> = buffers
        .iter()
        .enumerate()
        .map(|(i, data)| {
            let path = dir.join(format!("frame_{i:04}.png"));
            image::GrayImage::from_raw(W as u32, H as u32, data.clone())
                .unwrap()
                .save(&path)
                .unwrap();
            path
        })
        .collect();

    let mut source = FileSource::new(paths);
    let report = SequenceDriver::new(TrackerConfig::kalman())
        .run(
            &mut source,
            Seed::new("trolley1", 0, 170.0, 200.0),
            0,
            2,
            &CancelFlag::new(),
        )
        .unwrap();
    assert_eq!(report.frames_completed, 2);

    let frames = views(&buffers);
    let in_memory = track(
        &frames,
        Seed::new("trolley1", 0, 170.0, 200.0),
        2,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    assert_eq!(report.frames, in_memory.frames);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn infinite_seed_is_rejected_before_tracking() {
    init_logging();
    let buffers = drifting_frames(1, 0);
    let frames = views(&buffers);
    for config in [TrackerConfig::kalman(), TrackerConfig::template()] {
        let failure = track(
            &frames,
            Seed::new("w", 0, f64::NEG_INFINITY, 100.0),
            1,
            &config,
        )
        .unwrap_err();
        assert!(matches!(failure.error, TrackError::NonFiniteSeed { .. }));
        assert!(failure.partial.frames.is_empty());
    }
    let failure = track(
        &frames,
        Seed::new("w", 0, 170.0, f64::NAN),
        1,
        &TrackerConfig::kalman(),
    )
    .unwrap_err();
    assert!(matches!(failure.error, TrackError::NonFiniteSeed { .. }));
}

#[test]
fn seed_far_outside_the_frame_ends_out_of_sight() {
    init_logging();
    let buffers = drifting_frames(1, 0);
    let frames = views(&buffers);
    for config in [TrackerConfig::kalman(), TrackerConfig::template()] {
        let report = track(&frames, Seed::new("w", 0, -1e300, 1e300), 1, &config).unwrap();
        assert_eq!(report.termination, Termination::OutOfSight);
        assert_eq!(report.frames_completed, 0);
    }
}

#[test]
fn seed_is_located_from_a_centre_row() {
    init_logging();
    let buffers = drifting_frames(2, 0);
    let frames = views(&buffers);
    let driver = SequenceDriver::new(TrackerConfig::kalman());
    let mut source = SliceSource::new(&frames);
    let seed = driver
        .locate_seed(&mut source, 1, "trolley1", 40, 190.0)
        .unwrap();
    assert_eq!(seed, Seed::new("trolley1", 40, 169.0, 200.0));
    let report = driver
        .run(&mut source, seed, 1, 1, &CancelFlag::new())
        .unwrap();
    assert_eq!(report.frames_completed, 1);

    // nothing to find in an empty sky
    let sky = vec![30u8; W * H];
    let empty = [ImageU8::try_new(W, H, W, &sky).unwrap()];
    let err = driver
        .locate_seed(&mut SliceSource::new(&empty), 0, "trolley1", 0, 190.0)
        .unwrap_err();
    assert_eq!(
        err,
        TrackError::EdgeSearchFailed {
            column: 0,
            center_row: 190.0
        }
    );
}

#[test]
fn timing_counts_the_columns_of_every_frame() {
    init_logging();
    let buffers = drifting_frames(2, 0);
    let frames = views(&buffers);
    let report = track(
        &frames,
        Seed::new("trolley1", 100, 170.0, 200.0),
        2,
        &TrackerConfig::kalman(),
    )
    .unwrap();
    let columns: Vec<usize> = report.timing.frames.iter().map(|f| f.columns).collect();
    assert_eq!(columns, vec![W - 100, W]);
    let v = serde_json::to_value(&report.timing).unwrap();
    assert!(v["frames"][0].get("elapsedMs").is_some());
}
