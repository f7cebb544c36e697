use std::f64::consts::TAU;

use nalgebra::Point2;
use phased_array_lib::{
    config::EngineConfig,
    engine::{create_app, create_app_with_config, initialise, is_initialised, FrameStatus},
    error::SurfaceError,
    guard::Adjustments,
    mapping::PolarMapping,
    surface::HeadlessSurface,
};

#[test]
fn broadside_frame_is_symmetric() {
    initialise();
    let mut app = create_app(HeadlessSurface::new(), 256, 256).unwrap();

    assert_eq!(app.draw(0., 4, 0.5, 3e9, 0., 1.0), FrameStatus::Presented);

    let amplitudes = app.amplitudes();
    let image = app.image();
    for row in 0..128 {
        let mirror = 255 - row;
        for col in 0..256 {
            assert_eq!(amplitudes[[row, col]], amplitudes[[mirror, col]]);
            for channel in 0..4 {
                assert_eq!(image[[row, col, channel]], image[[mirror, col, channel]]);
            }
        }
    }

    // What reached the surface is exactly the rendered image.
    let presented = app.surface().last_frame().unwrap();
    assert_eq!(Some(presented), image.as_slice());
    assert!(amplitudes.iter().all(|x| (0. ..=1.).contains(x)));
}

#[test]
fn steered_beam_points_at_target() {
    initialise();
    let mut app =
        create_app_with_config(HeadlessSurface::new(), 256, 256, EngineConfig::plain()).unwrap();

    let spacing = 0.5;
    let θ_s: f64 = 0.3;
    let zoom = 1.;
    assert!(app
        .draw(0., 32, spacing, 3e9, TAU * spacing * θ_s.sin(), zoom)
        .is_presented());

    let mapping = PolarMapping::new(256, 256, app.config(), zoom);
    let mut best = (f64::NEG_INFINITY, 0.);
    for ((row, col), &amplitude) in app.amplitudes().indexed_iter() {
        let px = PolarMapping::pixel_centre(col, row);
        let r = mapping.pixel_offset(px).norm();
        if (100. ..110.).contains(&r) && amplitude > best.0 {
            best = (amplitude, mapping.polar(px).0);
        }
    }

    assert!(best.0 > 0.95, "peak amplitude {}", best.0);
    assert!((best.1 - θ_s).abs() < 0.02, "peak at {} rad", best.1);
}

#[test]
fn garbage_parameters_still_render() {
    initialise();
    let mut app = create_app(HeadlessSurface::new(), 64, 48).unwrap();

    let status = app.draw(f64::NAN, 0, -1., 0., f64::INFINITY, -3.);
    assert!(status.is_presented());
    assert!(app.amplitudes().iter().all(|x| x.is_finite() && (0. ..=1.).contains(x)));
    assert!(!app.stats().last_adjustments.is_empty());

    let status = app.draw(1e12, u32::MAX, 1e6, 1e30, -1e9, 1e-12);
    assert!(status.is_presented());
    assert!(app.amplitudes().iter().all(|x| (0. ..=1.).contains(x)));
}

#[test]
fn overflowing_spacing_is_not_drawn_as_peak() {
    initialise();
    let mut app =
        create_app_with_config(HeadlessSurface::new(), 64, 64, EngineConfig::plain()).unwrap();

    assert!(app.draw(0., 8, 1e308, 3e9, 0., 1.).is_presented());
    assert!(app.stats().last_adjustments.contains(Adjustments::SPACING));

    let amplitudes = app.amplitudes();
    assert!(amplitudes.iter().all(|x| (0. ..=1.).contains(x)));
    // An 8 element pattern averages well below its peak over many lobes.
    let mean = amplitudes.sum() / amplitudes.len() as f64;
    assert!(mean < 0.5, "mean amplitude {}", mean);
}

#[test]
fn submission_failures_skip_frames() {
    initialise();
    let mut app = create_app(HeadlessSurface::new(), 32, 32).unwrap();
    app.surface_mut().fail_next_submissions(2);

    for k in 0..2 {
        let status = app.draw(k as f64 / 60., 8, 0.5, 3e9, 0., 1.);
        assert!(matches!(status, FrameStatus::Skipped(SurfaceError::Submission(_))));
    }
    assert!(app.surface().last_frame().is_none());

    assert!(app.draw(3. / 60., 8, 0.5, 3e9, 0., 1.).is_presented());
    let stats = app.stats();
    assert_eq!((stats.presented, stats.skipped), (1, 2));
    assert_eq!(app.surface().frames_presented(), 1);
}

#[test]
fn initialise_is_idempotent() {
    initialise();
    initialise();
    assert!(is_initialised());
    assert!(create_app(HeadlessSurface::new(), 8, 8).is_ok());
}

#[test]
fn dropping_app_releases_resources() {
    initialise();
    let mut surface = HeadlessSurface::new();
    {
        let mut app = create_app(&mut surface, 16, 16).unwrap();
        assert!(app.draw(0., 3, 0.5, 3e9, 0., 1.).is_presented());
    }
    assert_eq!(surface.live_resources(), 0);
    assert_eq!(surface.frames_presented(), 1);
}

#[test]
fn zoom_out_keeps_pattern_shape() {
    initialise();
    let mut app = create_app_with_config(
        HeadlessSurface::new(),
        128,
        128,
        EngineConfig {
            anchor: [0.5, 0.5],
            ..EngineConfig::plain()
        },
    )
    .unwrap();

    // Far field only depends on direction, so every pixel on the same ray from the
    // anchor carries the same amplitude at any zoom.
    app.draw(0., 10, 0.5, 3e9, 0.4, 0.25);
    let near = app.amplitudes().clone();
    app.draw(0., 10, 0.5, 3e9, 0.4, 8.);
    for (a, b) in near.iter().zip(app.amplitudes().iter()) {
        assert!((a - b).abs() < 1e-9);
    }

    let mapping = PolarMapping::new(128, 128, app.config(), 8.);
    let (theta, _) = mapping.polar(Point2::new(100., 64.));
    assert!(theta.abs() < 1e-12);
}
