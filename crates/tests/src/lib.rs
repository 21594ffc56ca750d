//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - config file -> transform table -> configured task
//! - mock sensors -> dispatch cycle -> mock engine
//! - debug exports written to disk and read back

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_engine_geometry_matches_map() {
        let config = ConfigLoader::load_from_str(
            "[engine]\nmap_length_x = 6.0\nmap_length_y = 6.0\nmap_resolution = 0.5\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let params = config.engine.map_parameters().unwrap();
        let map = contracts::GridMap::new(params);
        let image = converters::map_to_image(&map);

        assert_eq!(map.size(), 12);
        assert_eq!(image.width, 12);
        assert_eq!(image.height, 12);
        assert_eq!(image.observed_count(), 0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader, TransformTable};
    use contracts::{
        Channel, GenericCloud, GenericPoint, MappingEngine, Pose, PoseSample, TaskConfig,
        Timestamp,
    };
    use debug_export::{
        load_grid_map, load_pose, DebugExporter, FileCloudPort, FileImagePort, FileSnapshotWriter,
    };
    use dispatcher::{ChannelPoll, IngestTask, IngestTaskBuilder, TaskError, TaskInputs};
    use engine_mock::MockEngine;
    use ingestion::{
        sample_port, straight_line_pose, terrain_cloud, MockSensorSource, SampleWriter,
    };
    use tempfile::tempdir;

    const TASK_TOML: &str = r#"
[engine]
map_length_x = 4.0
map_length_y = 4.0
map_resolution = 1.0

[cycle]
period_ms = 5

[[transforms]]
source = "body"
target = "ground"

[[transforms]]
source = "hazcam"
target = "body"

# stored the other way round, served through the inverse
[[transforms]]
source = "body"
target = "loccam"
[transforms.transform.location]
x = -0.25
"#;

    struct Writers {
        hazcam: SampleWriter<GenericCloud>,
        loccam: SampleWriter<GenericCloud>,
        orbiter: SampleWriter<GenericCloud>,
        pose: SampleWriter<PoseSample>,
    }

    fn wire() -> (Writers, TaskInputs) {
        let (hazcam, hazcam_in) = sample_port("hazcam");
        let (loccam, loccam_in) = sample_port("loccam");
        let (_pancam, pancam_in) = sample_port::<GenericCloud>("pancam");
        let (_pan_tf, pan_tf_in) = sample_port::<PoseSample>("pancam_transform");
        let (orbiter, orbiter_in) = sample_port("orbiter");
        let (pose, pose_in) = sample_port("pose_guess");
        (
            Writers {
                hazcam,
                loccam,
                orbiter,
                pose,
            },
            TaskInputs {
                hazcam_cloud: Box::new(hazcam_in),
                loccam_cloud: Box::new(loccam_in),
                pancam_cloud: Box::new(pancam_in),
                pancam_transform: Box::new(pan_tf_in),
                orbiter_cloud: Box::new(orbiter_in),
                pose_guess: Box::new(pose_in),
            },
        )
    }

    fn load() -> TaskConfig {
        ConfigLoader::load_from_str(TASK_TOML, ConfigFormat::Toml).unwrap()
    }

    /// Run cycles until no channel has a worker in flight
    async fn settle(task: &mut IngestTask) {
        for _ in 0..500 {
            let report = task.run_cycle();
            let busy = report
                .channels
                .iter()
                .any(|(_, p)| matches!(p, ChannelPoll::Busy { .. }));
            if !busy && task.metrics().iter().all(|m| !m.in_flight) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("workers never settled");
    }

    fn newest(dir: &Path, ext: &str) -> PathBuf {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|e| e == ext))
            .collect();
        files.sort();
        files.pop().unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_config_to_engine_updates() {
        let config = load();
        let table = TransformTable::from_config(&config.transforms);
        let engine = Arc::new(MockEngine::new());
        let (writers, inputs) = wire();

        let mut task = IngestTaskBuilder::new(config, engine.clone(), inputs)
            .configure(&table)
            .unwrap();
        assert_eq!(engine.parameters().unwrap().map_resolution, 1.0);

        writers.loccam.publish(GenericCloud::new(
            Timestamp::from_micros(10),
            vec![GenericPoint::new(0.5, 0.5, 0.3)],
        ));
        settle(&mut task).await;

        let updates = engine.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].stamp_us, 10);
        // loccam -> body resolved from the inverse of body -> loccam
        let t = updates[0].sensor_to_body.translation();
        assert!((t.x - 0.25).abs() < 1e-12);

        // point lands at x = 0.75, still in the cell centred on (0.5, 0.5)
        let z = engine.raw_map().read(|m| m.elevation_at(0.5, 0.5));
        assert_eq!(z, Some(0.3));

        let metrics = task.shutdown().await;
        let loccam = metrics.iter().find(|m| m.channel == Channel::Loccam).unwrap();
        assert_eq!(loccam.completed, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_missing_transform_is_fatal() {
        let mut config = load();
        config.transforms.retain(|t| t.source != "hazcam");
        let table = TransformTable::from_config(&config.transforms);
        let engine = Arc::new(MockEngine::new());
        let (_writers, inputs) = wire();

        let result = IngestTaskBuilder::new(config, engine.clone(), inputs).configure(&table);
        match result {
            Err(TaskError::TransformNotFound {
                source_frame,
                target_frame,
            }) => {
                assert_eq!(source_frame, "hazcam");
                assert_eq!(target_frame, "body");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("configure should fail"),
        }
        assert_eq!(engine.calls().set_parameters, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_exports_reflect_one_map_state() {
        let dir = tempdir().unwrap();
        let mut config = load();
        config.debug.debug_info = true;
        config.debug.raw_map = true;
        config.debug.cloud = true;
        config.debug.serialization = true;
        config.debug.pose_path = dir.path().join("pose.json").display().to_string();
        config.debug.local_map_path = dir.path().join("local.bin").display().to_string();
        config.debug.global_map_path = dir.path().join("global.bin").display().to_string();

        let exporter = DebugExporter::new(config.debug.clone())
            .with_image_port(FileImagePort::new("raw", dir.path().join("img"), -1.0, 1.0).unwrap())
            .with_cloud_port(FileCloudPort::new("cloud", dir.path().join("ply")).unwrap())
            .with_snapshot_writer(FileSnapshotWriter::new());

        let table = TransformTable::from_config(&config.transforms);
        let engine = Arc::new(MockEngine::new());
        let (writers, inputs) = wire();
        let mut task = IngestTaskBuilder::new(config, engine.clone(), inputs)
            .exporter(exporter)
            .configure(&table)
            .unwrap();

        writers.hazcam.publish(GenericCloud::new(
            Timestamp::from_micros(42),
            vec![
                GenericPoint::new(0.5, 0.5, 0.2),
                GenericPoint::new(-1.5, 1.5, -0.4),
            ],
        ));
        writers.orbiter.publish(GenericCloud::new(
            Timestamp::from_micros(1),
            vec![GenericPoint::new(1.5, -1.5, 0.9)],
        ));
        settle(&mut task).await;

        // one more idle cycle exports the settled state
        let report = task.run_cycle();
        let export = report.export.unwrap();
        assert_eq!(export.written(), 5);

        let raw = engine.raw_map().snapshot();
        assert_eq!(raw.mean_z().observed_count(), 2);

        let png = image::open(newest(&dir.path().join("img"), "png"))
            .unwrap()
            .into_luma16();
        assert_eq!(png.dimensions(), (4, 4));
        assert_eq!(png.pixels().filter(|p| p.0[0] != 0).count(), 2);

        let ply = fs::read_to_string(newest(&dir.path().join("ply"), "ply")).unwrap();
        assert!(ply.contains("element vertex 16"));
        assert!(ply.contains("comment time_us 42"));

        let local = load_grid_map(&dir.path().join("local.bin")).unwrap();
        assert_eq!(local.mean_z().observed_count(), 2);
        assert_eq!(local.timestamp(), raw.timestamp());

        let global = load_grid_map(&dir.path().join("global.bin")).unwrap();
        assert_eq!(global.elevation_at(1.5, -1.5), Some(0.9));

        let pose = load_pose(&dir.path().join("pose.json")).unwrap();
        assert_eq!(pose, Pose::identity());

        task.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_mock_sources_drive_every_update_channel() {
        let config = load();
        let table = TransformTable::from_config(&config.transforms);
        let engine = Arc::new(MockEngine::new());
        let (writers, inputs) = wire();

        let mut task = IngestTaskBuilder::new(config, engine.clone(), inputs)
            .configure(&table)
            .unwrap();

        let hazcam = MockSensorSource::new("hazcam", 100.0).unwrap();
        let pose = MockSensorSource::new("pose_guess", 100.0).unwrap();
        hazcam
            .start(writers.hazcam.clone(), terrain_cloud(9, 1.5))
            .unwrap();
        pose.start(
            writers.pose.clone(),
            straight_line_pose("body", "map", 0.5, 100.0),
        )
        .unwrap();

        for _ in 0..40 {
            task.run_cycle();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        hazcam.stop();
        pose.stop();
        let metrics = task.shutdown().await;

        let calls = engine.calls();
        assert!(calls.update_from_cloud > 0);
        assert!(calls.predict > 0);
        assert!(engine.max_concurrent_updates() <= 1);
        // every launched worker finished and was counted once
        for m in &metrics {
            assert_eq!(m.dispatched, m.completed + m.failed);
        }
        assert!(engine.pose().translation().x > 0.0);
    }
}
