//! FileSnapshotWriter - pose as JSON, grid maps as bincode

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use contracts::{ContractError, GridMap, Pose, SnapshotWriter};
use tracing::{debug, instrument};

use crate::ExportError;

/// Snapshot backend writing to the local filesystem.
///
/// Parent directories are created on demand. Each save replaces the previous
/// file at the same path.
#[derive(Debug, Default)]
pub struct FileSnapshotWriter {
    last_bytes: u64,
}

impl FileSnapshotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the most recent write
    pub fn last_bytes(&self) -> u64 {
        self.last_bytes
    }

    fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        File::create(path)
            .map(BufWriter::new)
            .map_err(|e| ExportError::io(path, e))
    }

    fn finish(&mut self, mut file: BufWriter<File>, path: &Path) -> Result<(), ExportError> {
        file.flush().map_err(|e| ExportError::io(path, e))?;
        self.last_bytes = file
            .get_ref()
            .metadata()
            .map(|m| m.len())
            .map_err(|e| ExportError::io(path, e))?;
        Ok(())
    }
}

impl SnapshotWriter for FileSnapshotWriter {
    #[instrument(name = "snapshot_save_pose", skip(self, pose), fields(path = %path.display()))]
    fn save_pose(&mut self, pose: &Pose, path: &Path) -> Result<(), ContractError> {
        let mut file = Self::create(path)?;
        serde_json::to_writer_pretty(&mut file, pose).map_err(|e| ExportError::encode(path, e))?;
        self.finish(file, path)?;
        debug!(bytes = self.last_bytes, "pose saved");
        Ok(())
    }

    #[instrument(
        name = "snapshot_save_grid_map",
        skip(self, map),
        fields(path = %path.display(), size = map.size())
    )]
    fn save_grid_map(&mut self, map: &GridMap, path: &Path) -> Result<(), ContractError> {
        let mut file = Self::create(path)?;
        bincode::serialize_into(&mut file, map).map_err(|e| ExportError::encode(path, e))?;
        self.finish(file, path)?;
        debug!(bytes = self.last_bytes, "grid map saved");
        Ok(())
    }
}

/// Read a pose written by [`FileSnapshotWriter`]
pub fn load_pose(path: &Path) -> Result<Pose, ExportError> {
    let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ExportError::encode(path, e))
}

/// Read a grid map written by [`FileSnapshotWriter`].
///
/// The decoded map is checked with [`GridMap::validate`], so a stale or
/// truncated file fails here instead of inside a converter.
pub fn load_grid_map(path: &Path) -> Result<GridMap, ExportError> {
    let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
    let map: GridMap = bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| ExportError::encode(path, e))?;
    map.validate().map_err(|source| ExportError::CorruptMap {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(map)
}
