//! Mock sensor wiring: one source per task input.

use std::time::Duration;

use contracts::{FrameConfig, GenericCloud, Pose, PoseSample, Timestamp};
use dispatcher::TaskInputs;
use ingestion::{sample_port, straight_line_pose, terrain_cloud, MockSensorSource, SampleWriter};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Rates and sizes of the mock sensors and engine
#[derive(Debug, Clone)]
pub struct MockSettings {
    /// Hazcam and loccam cloud rate; the pan camera runs at half of it
    pub sensor_hz: f64,
    pub pose_hz: f64,
    pub orbiter_hz: f64,
    pub cloud_points: usize,
    /// Latency added to each engine cloud update
    pub engine_delay: Option<Duration>,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            sensor_hz: 10.0,
            pose_hz: 20.0,
            orbiter_hz: 0.2,
            cloud_points: 400,
            engine_delay: None,
        }
    }
}

/// Running mock sources
pub struct MockSensors {
    sources: Vec<MockSensorSource>,
    handles: Vec<JoinHandle<()>>,
}

impl MockSensors {
    /// Start every source and return the task inputs they feed.
    ///
    /// Sources already started are stopped if a later one fails.
    pub fn start(settings: &MockSettings, frames: &FrameConfig) -> Result<(Self, TaskInputs)> {
        let mut sensors = Self {
            sources: Vec::new(),
            handles: Vec::new(),
        };
        match sensors.start_all(settings, frames) {
            Ok(inputs) => {
                info!(sources = sensors.sources.len(), "mock sensors started");
                Ok((sensors, inputs))
            }
            Err(e) => {
                sensors.signal_stop();
                Err(e)
            }
        }
    }

    fn start_all(&mut self, settings: &MockSettings, frames: &FrameConfig) -> Result<TaskInputs> {
        let points = settings.cloud_points;
        let pancam_hz = settings.sensor_hz / 2.0;

        let (hazcam_w, hazcam) = sample_port::<GenericCloud>("hazcam_cloud");
        let (loccam_w, loccam) = sample_port::<GenericCloud>("loccam_cloud");
        let (pancam_w, pancam) = sample_port::<GenericCloud>("pancam_cloud");
        let (pan_tf_w, pan_tf) = sample_port::<PoseSample>("pancam_transform");
        let (orbiter_w, orbiter) = sample_port::<GenericCloud>("orbiter_cloud");
        let (pose_w, pose) = sample_port::<PoseSample>("pose_guess");

        self.spawn("hazcam", settings.sensor_hz, hazcam_w, terrain_cloud(points, 2.0))?;
        self.spawn("loccam", settings.sensor_hz, loccam_w, terrain_cloud(points, 4.0))?;
        self.spawn("pancam", pancam_hz, pancam_w, terrain_cloud(points, 6.0))?;
        self.spawn(
            "pancam_transform",
            pancam_hz,
            pan_tf_w,
            pan_sweep("pancam", frames.body.clone()),
        )?;
        self.spawn(
            "orbiter",
            settings.orbiter_hz,
            orbiter_w,
            terrain_cloud(points * 4, 10.0),
        )?;
        self.spawn(
            "pose_guess",
            settings.pose_hz,
            pose_w,
            straight_line_pose(frames.body.clone(), "map", 0.2, settings.pose_hz),
        )?;

        Ok(TaskInputs {
            hazcam_cloud: Box::new(hazcam),
            loccam_cloud: Box::new(loccam),
            pancam_cloud: Box::new(pancam),
            pancam_transform: Box::new(pan_tf),
            orbiter_cloud: Box::new(orbiter),
            pose_guess: Box::new(pose),
        })
    }

    fn spawn<T, F>(
        &mut self,
        name: &str,
        frequency_hz: f64,
        writer: SampleWriter<T>,
        generate: F,
    ) -> Result<()>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut(u64, Timestamp) -> T + Send + 'static,
    {
        let source = MockSensorSource::new(name, frequency_hz)?;
        let handle = source.start(writer, generate)?;
        self.sources.push(source);
        self.handles.push(handle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    fn signal_stop(&self) {
        for source in &self.sources {
            source.stop();
        }
    }

    /// Stop every source; one still waiting for its next tick is aborted
    pub async fn stop(self) {
        self.signal_stop();
        for (source, mut handle) in self.sources.iter().zip(self.handles) {
            match tokio::time::timeout(Duration::from_millis(200), &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(source = source.name(), error = %e, "mock source task failed"),
                Err(_) => {
                    handle.abort();
                    debug!(source = source.name(), "mock source aborted mid-tick");
                }
            }
        }
    }
}

/// Pan-camera head sweeping its yaw back and forth, tilted down
fn pan_sweep(
    source_frame: &'static str,
    target_frame: String,
) -> impl FnMut(u64, Timestamp) -> PoseSample + Send + 'static {
    move |frame, time| {
        let yaw = (frame as f64 * 0.1).sin() * 0.8;
        let pose = Pose::from_xyz_rpy(0.2, 0.0, 1.3, 0.0, 0.35, yaw);
        PoseSample::new(time, source_frame, target_frame.clone(), pose)
    }
}
