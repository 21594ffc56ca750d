//! DebugExporter - the per-cycle export step

use std::any::Any;
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use contracts::{
    DebugConfig, GenericCloud, GenericImage, GridMap, MappingEngine, OutputPort, SnapshotWriter,
};
use converters::{map_to_cloud, map_to_image};
use tracing::{debug, error, instrument};

use crate::{Export, ExportMetrics, ExportOutcome, ExportReport};

/// Runs the toggled exports against an engine's state.
///
/// Missing backends behave like unconnected ports: the export is skipped.
pub struct DebugExporter {
    config: DebugConfig,
    image_port: Option<Box<dyn OutputPort<GenericImage>>>,
    cloud_port: Option<Box<dyn OutputPort<GenericCloud>>>,
    snapshots: Option<Box<dyn SnapshotWriter>>,
    metrics: Arc<ExportMetrics>,
}

impl DebugExporter {
    pub fn new(config: DebugConfig) -> Self {
        Self {
            config,
            image_port: None,
            cloud_port: None,
            snapshots: None,
            metrics: Arc::new(ExportMetrics::new()),
        }
    }

    /// Exporter with every toggle off
    pub fn disabled() -> Self {
        Self::new(DebugConfig::default())
    }

    pub fn with_image_port(mut self, port: impl OutputPort<GenericImage> + 'static) -> Self {
        self.image_port = Some(Box::new(port));
        self
    }

    pub fn with_cloud_port(mut self, port: impl OutputPort<GenericCloud> + 'static) -> Self {
        self.cloud_port = Some(Box::new(port));
        self
    }

    pub fn with_snapshot_writer(mut self, writer: impl SnapshotWriter + 'static) -> Self {
        self.snapshots = Some(Box::new(writer));
        self
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    /// Master toggle
    pub fn is_enabled(&self) -> bool {
        self.config.debug_info
    }

    pub fn metrics(&self) -> &Arc<ExportMetrics> {
        &self.metrics
    }

    /// Run one export pass. Never fails: each outcome is reported, logged and
    /// counted on its own.
    #[instrument(name = "debug_export", skip_all)]
    pub fn export(&mut self, engine: &dyn MappingEngine) -> ExportReport {
        let mut report = ExportReport::default();
        if !self.config.debug_info {
            return report;
        }
        self.metrics.inc_passes();

        let persist = self.config.serialization && self.snapshots.is_some();
        let needs_raw = self.config.raw_map || self.config.cloud || persist;
        // one copy under the raw-map lock serves every raw-map export
        let raw = needs_raw.then(|| engine.raw_map().snapshot());

        if let Some(raw) = raw.as_ref() {
            if self.config.raw_map {
                report.set(Export::RawMapImage, self.export_image(raw));
            }
            if self.config.cloud {
                report.set(Export::MapCloud, self.export_cloud(raw));
            }
        }

        if self.config.serialization {
            self.persist(engine, raw.as_ref(), &mut report);
        }

        for (export, outcome) in report.iter() {
            self.metrics.record(export, outcome);
            if let ExportOutcome::Failed(message) = outcome {
                error!(export = %export, error = %message, "debug export failed");
            }
        }
        debug!(written = report.written(), "debug export pass complete");
        report
    }

    fn export_image(&mut self, map: &GridMap) -> ExportOutcome {
        let Some(port) = self.image_port.as_mut() else {
            return ExportOutcome::Skipped;
        };
        isolated(|| port.write(map_to_image(map)))
    }

    fn export_cloud(&mut self, map: &GridMap) -> ExportOutcome {
        let Some(port) = self.cloud_port.as_mut() else {
            return ExportOutcome::Skipped;
        };
        isolated(|| port.write(map_to_cloud(map)))
    }

    fn persist(
        &mut self,
        engine: &dyn MappingEngine,
        raw: Option<&GridMap>,
        report: &mut ExportReport,
    ) {
        let Some(writer) = self.snapshots.as_mut() else {
            return;
        };
        let paths = &self.config;

        let pose = engine.pose();
        report.set(
            Export::Pose,
            isolated(|| writer.save_pose(&pose, Path::new(&paths.pose_path))),
        );

        if let Some(raw) = raw {
            report.set(
                Export::LocalMap,
                isolated(|| writer.save_grid_map(raw, Path::new(&paths.local_map_path))),
            );
        }

        let global = engine.global_map().snapshot();
        report.set(
            Export::GlobalMap,
            isolated(|| writer.save_grid_map(&global, Path::new(&paths.global_map_path))),
        );
    }
}

/// Run one export so that neither an error nor a panic in a backend reaches
/// the other exports
fn isolated<E: Display>(write: impl FnOnce() -> Result<(), E>) -> ExportOutcome {
    match catch_unwind(AssertUnwindSafe(write)) {
        Ok(Ok(())) => ExportOutcome::Written,
        Ok(Err(e)) => ExportOutcome::Failed(e.to_string()),
        Err(payload) => {
            ExportOutcome::Failed(format!("backend panicked: {}", panic_message(&*payload)))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load_grid_map, FileSnapshotWriter};
    use contracts::{ContractError, EngineParameters, Pose};
    use engine_mock::MockEngine;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Port keeping every written sample
    #[derive(Clone, Default)]
    struct Collect<T> {
        samples: Arc<Mutex<Vec<T>>>,
    }

    impl<T: Send> OutputPort<T> for Collect<T> {
        fn name(&self) -> &str {
            "collect"
        }

        fn write(&mut self, sample: T) -> Result<(), ContractError> {
            self.samples.lock().unwrap().push(sample);
            Ok(())
        }
    }

    struct Broken;

    impl OutputPort<GenericImage> for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn write(&mut self, _: GenericImage) -> Result<(), ContractError> {
            Err(ContractError::port_write("broken", "device gone"))
        }
    }

    struct Panicking;

    impl OutputPort<GenericCloud> for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn write(&mut self, _: GenericCloud) -> Result<(), ContractError> {
            panic!("cloud backend exploded");
        }
    }

    fn engine() -> MockEngine {
        let engine = MockEngine::new();
        engine
            .set_parameters(&EngineParameters {
                map_length_x: 4.0,
                map_length_y: 4.0,
                map_resolution: 1.0,
                ..Default::default()
            })
            .unwrap();
        engine.raw_map().write(|m| {
            m.set_elevation_at(0.5, 0.5, 1.0);
            m.set_elevation_at(-1.5, 1.5, 2.0);
        });
        engine
    }

    fn all_on(dir: &Path) -> DebugConfig {
        DebugConfig {
            debug_info: true,
            raw_map: true,
            cloud: true,
            serialization: true,
            pose_path: dir.join("pose.json").display().to_string(),
            local_map_path: dir.join("local.bin").display().to_string(),
            global_map_path: dir.join("global.bin").display().to_string(),
        }
    }

    #[test]
    fn test_master_toggle_gates_everything() {
        let images = Collect::<GenericImage>::default();
        let mut exporter = DebugExporter::new(DebugConfig {
            debug_info: false,
            raw_map: true,
            ..Default::default()
        })
        .with_image_port(images.clone());

        let report = exporter.export(&engine());
        assert_eq!(report, ExportReport::default());
        assert!(images.samples.lock().unwrap().is_empty());
        assert_eq!(exporter.metrics().passes(), 0);
    }

    #[test]
    fn test_image_and_cloud_from_same_state() {
        let dir = tempdir().unwrap();
        let images = Collect::<GenericImage>::default();
        let clouds = Collect::<GenericCloud>::default();
        let mut config = all_on(dir.path());
        config.serialization = false;

        let mut exporter = DebugExporter::new(config)
            .with_image_port(images.clone())
            .with_cloud_port(clouds.clone());
        let report = exporter.export(&engine());

        assert!(report.raw_map_image.is_written());
        assert!(report.map_cloud.is_written());
        assert_eq!(report.pose, ExportOutcome::Skipped);

        let image = images.samples.lock().unwrap().pop().unwrap();
        let cloud = clouds.samples.lock().unwrap().pop().unwrap();
        let finite = cloud.points.iter().filter(|p| !p.z.is_nan()).count();
        assert_eq!(image.observed_count(), 2);
        assert_eq!(finite, 2);
        assert_eq!(image.time, cloud.time);
    }

    #[test]
    fn test_failed_image_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let clouds = Collect::<GenericCloud>::default();
        let mut exporter = DebugExporter::new(all_on(dir.path()))
            .with_image_port(Broken)
            .with_cloud_port(clouds.clone())
            .with_snapshot_writer(FileSnapshotWriter::new());

        let report = exporter.export(&engine());

        assert!(report.raw_map_image.is_failed());
        assert!(report.map_cloud.is_written());
        assert!(report.pose.is_written());
        assert!(report.local_map.is_written());
        assert!(report.global_map.is_written());
        assert_eq!(exporter.metrics().failed(), 1);
        assert_eq!(exporter.metrics().written(), 4);
    }

    #[test]
    fn test_panicking_backend_is_reported_as_failed() {
        let dir = tempdir().unwrap();
        let images = Collect::<GenericImage>::default();
        let mut exporter = DebugExporter::new(all_on(dir.path()))
            .with_image_port(images.clone())
            .with_cloud_port(Panicking)
            .with_snapshot_writer(FileSnapshotWriter::new());

        let report = exporter.export(&engine());

        assert!(report.raw_map_image.is_written());
        match &report.map_cloud {
            ExportOutcome::Failed(message) => assert!(message.contains("cloud backend exploded")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(report.pose.is_written());
        assert!(report.local_map.is_written());
        assert!(report.global_map.is_written());
        assert_eq!(images.samples.lock().unwrap().len(), 1);
        assert_eq!(exporter.metrics().failed(), 1);
    }

    #[test]
    fn test_persistence_writes_each_target() {
        let dir = tempdir().unwrap();
        let mut config = all_on(dir.path());
        config.raw_map = false;
        config.cloud = false;
        // global map path is a directory, so only that write fails
        config.global_map_path = dir.path().display().to_string();

        let engine = engine();
        engine.predict(Pose::identity(), Pose::identity()).unwrap();

        let mut exporter =
            DebugExporter::new(config).with_snapshot_writer(FileSnapshotWriter::new());
        let report = exporter.export(&engine);

        assert!(report.pose.is_written());
        assert!(report.local_map.is_written());
        assert!(report.global_map.is_failed());

        let local = load_grid_map(&dir.path().join("local.bin")).unwrap();
        assert_eq!(local.mean_z().observed_count(), 2);
    }

    #[test]
    fn test_missing_backends_are_skipped() {
        let dir = tempdir().unwrap();
        let mut exporter = DebugExporter::new(all_on(dir.path()));
        let report = exporter.export(&engine());

        assert!(report.iter().all(|(_, o)| *o == ExportOutcome::Skipped));
        assert_eq!(exporter.metrics().passes(), 1);
    }
}
