//! gati-odometry-node daemon
//!
//! Drives the odometry pipeline over a synthetic scan/attitude stream and
//! publishes updates over UDP. Stands in for the sensor transport layer so
//! the full pipeline can be exercised end-to-end on a workstation.
//!
//! # Usage
//!
//! ```bash
//! # With default config
//! cargo run --bin gati-odometry-node
//!
//! # With custom config file
//! cargo run --bin gati-odometry-node -- --config gati-odometry.toml
//!
//! # Publish to a visualization client
//! cargo run --bin gati-odometry-node -- --target 127.0.0.1:5601 --scans 200
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::bounded;
use nalgebra::{UnitQuaternion, Vector3};

use gati_odometry::{
    AttitudeSample, OdometryConfig, OdometryMessage, Point3D, PointCloud3D, PointToPointIcp,
    ScanOdometry, SharedAttitudeBuffer, Transform3D, UdpPublisher,
};

#[derive(Parser, Debug)]
#[command(name = "gati-odometry-node", about = "Point cloud odometry node")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP target for odometry updates
    #[arg(long, default_value = "127.0.0.1:5601")]
    target: SocketAddr,

    /// Number of scans to process before exiting
    #[arg(long, default_value_t = 100)]
    scans: usize,

    /// Scan period in milliseconds
    #[arg(long, default_value_t = 50)]
    scan_period_ms: u64,

    /// Attitude sample period in milliseconds
    #[arg(long, default_value_t = 10)]
    attitude_period_ms: u64,
}

/// Ground-truth platform pose along a gentle arc with a small tilt wobble.
fn trajectory_pose(t_s: f64) -> Transform3D {
    let speed = 0.3; // m/s
    let yaw_rate = 0.1; // rad/s
    let radius = speed / yaw_rate;

    let yaw = yaw_rate * t_s;
    let x = radius * yaw.sin();
    let y = radius * (1.0 - yaw.cos());
    let roll = 0.02 * (2.0 * t_s).sin();
    let pitch = 0.015 * (1.5 * t_s).cos() - 0.015;

    Transform3D::new(
        Vector3::new(x, y, 0.0),
        UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    )
}

/// Static environment: floor patch plus two perpendicular walls.
fn world_cloud() -> PointCloud3D {
    let n = 12;
    let size = 6.0;
    let mut cloud = PointCloud3D::with_capacity(3 * n * n);
    for i in 0..n {
        for j in 0..n {
            let a = (i as f64 / (n - 1) as f64) * size - 1.0;
            let b = (j as f64 / (n - 1) as f64) * size - 1.0;
            cloud.push(Point3D::new(a, b, 0.0));
            cloud.push(Point3D::new(a, 5.0, 0.5 + 0.4 * (b + 1.0)));
            cloud.push(Point3D::new(5.0, a, 0.5 + 0.4 * (b + 1.0)));
        }
    }
    cloud
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match OdometryConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("no config file given, using built-in defaults");
            OdometryConfig::default()
        }
    };

    let attitude = SharedAttitudeBuffer::new();
    let registration = PointToPointIcp::new(config.registration.clone());
    let mut odometry = ScanOdometry::new(config.pipeline_config(), registration, attitude.clone());

    let mut publisher = match UdpPublisher::new(args.target) {
        Ok(publisher) => publisher,
        Err(e) => {
            log::error!("failed to create publisher: {}", e);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let start = Instant::now();

    // Inertial producer: appends attitude samples at sensor rate,
    // independent of the scan cadence.
    let producer = {
        let attitude = attitude.clone();
        let running = running.clone();
        let period = Duration::from_millis(args.attitude_period_ms);
        thread::Builder::new()
            .name("attitude".into())
            .spawn(move || {
                while running.load(Ordering::Relaxed) {
                    let t_s = start.elapsed().as_secs_f64();
                    let timestamp_us = start.elapsed().as_micros() as u64;
                    let rotation = trajectory_pose(t_s).rotation;
                    attitude.push(AttitudeSample::new(rotation, timestamp_us));
                    thread::sleep(period);
                }
            })
            .expect("Failed to spawn attitude thread")
    };

    // Scan source: renders the static world from the moving platform.
    let (scan_tx, scan_rx) = bounded::<(PointCloud3D, u64)>(4);
    let scanner = {
        let running = running.clone();
        let period = Duration::from_millis(args.scan_period_ms);
        let total = args.scans;
        let world = world_cloud();
        thread::Builder::new()
            .name("scanner".into())
            .spawn(move || {
                for _ in 0..total {
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    let t_s = start.elapsed().as_secs_f64();
                    let timestamp_us = start.elapsed().as_micros() as u64;
                    let scan = world.transform(&trajectory_pose(t_s).inverse());
                    if scan_tx.send((scan, timestamp_us)).is_err() {
                        break;
                    }
                    thread::sleep(period);
                }
            })
            .expect("Failed to spawn scanner thread")
    };

    log::info!(
        "processing {} scans, publishing to {}",
        args.scans,
        args.target
    );

    let mut published = 0u64;
    let mut final_timestamp_us = 0u64;
    for (scan, timestamp_us) in scan_rx.iter() {
        final_timestamp_us = timestamp_us;
        match odometry.process(scan, timestamp_us) {
            Ok(Some(update)) => {
                let message = OdometryMessage::from_update(&update, &config.frames.fixed);
                match publisher.publish(&message) {
                    Ok(true) => published += 1,
                    Ok(false) => {}
                    Err(e) => log::error!("publish failed: {}", e),
                }

                if odometry.cycle_count() % 20 == 0 {
                    let p = update.integrated.translation;
                    log::info!(
                        "cycle {}: pose ({:.2}, {:.2}, {:.2}) m, fusion {}",
                        odometry.cycle_count(),
                        p.x,
                        p.y,
                        p.z,
                        if update.diagnostics.fusion_active {
                            "on"
                        } else {
                            "off"
                        }
                    );
                }
            }
            Ok(None) => log::debug!("warming up"),
            Err(e) => log::error!("cycle failed: {}", e),
        }
    }

    running.store(false, Ordering::Relaxed);
    let _ = scanner.join();
    let _ = producer.join();

    let truth = trajectory_pose(final_timestamp_us as f64 / 1_000_000.0);
    let error = (odometry.integrated().translation - truth.translation).norm();
    log::info!(
        "done: {} cycles, {} rejected, {} fused, {} published, final position error {:.3} m",
        odometry.cycle_count(),
        odometry.rejected_count(),
        odometry.fusion().fused_count(),
        published,
        error
    );
}
