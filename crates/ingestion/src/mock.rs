//! Mock sensor sources
//!
//! Used for running and testing without sensor drivers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{GenericCloud, GenericPoint, Pose, PoseSample, Timestamp};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::{IngestionError, Result, SampleWriter};

/// Periodic sample generator publishing into a [`SampleWriter`]
pub struct MockSensorSource {
    name: String,
    frequency_hz: f64,
    running: Arc<AtomicBool>,
}

impl MockSensorSource {
    /// Create a new mock source
    ///
    /// # Errors
    /// Frequency must be positive and finite
    pub fn new(name: impl Into<String>, frequency_hz: f64) -> Result<Self> {
        let name = name.into();
        if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
            return Err(IngestionError::InvalidFrequency {
                source_name: name,
                frequency_hz,
            });
        }
        Ok(Self {
            name,
            frequency_hz,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start publishing on the current runtime.
    ///
    /// `generate` receives the frame number (from 1) and the capture time.
    pub fn start<T, F>(&self, writer: SampleWriter<T>, mut generate: F) -> Result<JoinHandle<()>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut(u64, Timestamp) -> T + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|_| IngestionError::NoRuntime {
            source_name: self.name.clone(),
        })?;
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(IngestionError::AlreadyRunning {
                source_name: self.name.clone(),
            });
        }

        let name = self.name.clone();
        let running = self.running.clone();
        let period = Duration::from_secs_f64(1.0 / self.frequency_hz);
        let frequency_hz = self.frequency_hz;

        Ok(handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut frame: u64 = 0;

            debug!(source = %name, frequency_hz, "mock sensor source started");

            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                frame += 1;

                let time = Timestamp::now();
                writer.publish(generate(frame, time));
                trace!(source = %name, frame, "mock sample published");
            }

            debug!(source = %name, frames = frame, "mock sensor source stopped");
        }))
    }

    /// Stop the mock source after its current tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Generator of a square patch of rolling terrain in the sensor frame.
///
/// Points lie on a `side x side` lattice spanning `extent` metres ahead of
/// the sensor; the surface drifts slowly with the frame number.
pub fn terrain_cloud(
    points: usize,
    extent: f64,
) -> impl FnMut(u64, Timestamp) -> GenericCloud + Send + 'static {
    let side = (points as f64).sqrt().ceil().max(1.0) as usize;
    let step = extent / side as f64;

    move |frame, time| {
        let phase = frame as f64 * 0.05;
        let cloud = (0..points)
            .map(|i| {
                let x = (i / side) as f64 * step;
                let y = (i % side) as f64 * step - extent / 2.0;
                let z = 0.1 * (x + phase).sin() * y.cos();
                GenericPoint::new(x, y, z)
            })
            .collect();
        GenericCloud::new(time, cloud)
    }
}

/// Generator of poses advancing along x at `speed_mps`
pub fn straight_line_pose(
    source_frame: impl Into<String>,
    target_frame: impl Into<String>,
    speed_mps: f64,
    frequency_hz: f64,
) -> impl FnMut(u64, Timestamp) -> PoseSample + Send + 'static {
    let source_frame = source_frame.into();
    let target_frame = target_frame.into();
    let step = speed_mps / frequency_hz;

    move |frame, time| {
        let pose = Pose::from_xyz_rpy(frame as f64 * step, 0.0, 0.0, 0.0, 0.0, 0.0);
        PoseSample::new(time, source_frame.clone(), target_frame.clone(), pose)
    }
}
