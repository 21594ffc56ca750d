//! Output port backends for exported images and clouds

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{ContractError, GenericCloud, GenericImage, OutputPort};
use image::{ImageBuffer, Luma};
use tracing::{debug, info, instrument};

use crate::ExportError;

/// Port that logs a one-line summary of each sample
pub struct LogPort {
    name: String,
}

impl LogPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl OutputPort<GenericImage> for LogPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, image: GenericImage) -> Result<(), ContractError> {
        info!(
            port = %self.name,
            width = image.width,
            height = image.height,
            observed = image.observed_count(),
            time_us = image.time.as_micros(),
            "image exported"
        );
        Ok(())
    }
}

impl OutputPort<GenericCloud> for LogPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, cloud: GenericCloud) -> Result<(), ContractError> {
        let finite = cloud.points.iter().filter(|p| p.z.is_finite()).count();
        info!(
            port = %self.name,
            points = cloud.len(),
            finite,
            time_us = cloud.time.as_micros(),
            "cloud exported"
        );
        Ok(())
    }
}

/// Writes each image as a numbered 16-bit grayscale PNG.
///
/// Samples are normalised to `[min_elevation, max_elevation]` and mapped to
/// `1..=65535`; `0` marks unobserved cells. Pixel order follows the image
/// buffer as stored.
pub struct FileImagePort {
    name: String,
    dir: PathBuf,
    min_elevation: f32,
    max_elevation: f32,
    sequence: u64,
}

impl FileImagePort {
    /// Create the port, creating `dir` if needed
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        min_elevation: f64,
        max_elevation: f64,
    ) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ExportError::io(&dir, e))?;
        Ok(Self {
            name: name.into(),
            dir,
            min_elevation: min_elevation as f32,
            max_elevation: max_elevation as f32,
            sequence: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next image will be written to
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("{}_{:06}.png", self.name, self.sequence))
    }

    fn encode(&self, value: f32) -> u16 {
        if value.is_nan() {
            return 0;
        }
        let span = self.max_elevation - self.min_elevation;
        let norm = if span > 0.0 {
            ((value - self.min_elevation) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        1 + (norm * f32::from(u16::MAX - 1)).round() as u16
    }

    fn save(&self, image: &GenericImage, path: &Path) -> Result<(), ExportError> {
        let shape_error = || ExportError::ImageShape {
            width: image.width,
            height: image.height,
            len: image.data.len(),
        };
        if image.data.len() != image.width * image.height {
            return Err(shape_error());
        }
        let width = u32::try_from(image.width).map_err(|_| shape_error())?;
        let height = u32::try_from(image.height).map_err(|_| shape_error())?;

        let pixels: Vec<u16> = image.data.iter().map(|&v| self.encode(v)).collect();
        let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(width, height, pixels).ok_or_else(shape_error)?;
        buffer.save(path).map_err(|source| ExportError::Image {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl OutputPort<GenericImage> for FileImagePort {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_image_port_write",
        skip(self, image),
        fields(port = %self.name, sequence = self.sequence)
    )]
    fn write(&mut self, image: GenericImage) -> Result<(), ContractError> {
        let path = self.next_path();
        self.save(&image, &path)?;
        self.sequence += 1;
        debug!(path = %path.display(), "image written");
        Ok(())
    }
}

/// Writes each cloud as a numbered ASCII PLY file. Unobserved cells keep
/// their `NaN` z.
pub struct FileCloudPort {
    name: String,
    dir: PathBuf,
    sequence: u64,
}

impl FileCloudPort {
    /// Create the port, creating `dir` if needed
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ExportError::io(&dir, e))?;
        Ok(Self {
            name: name.into(),
            dir,
            sequence: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next cloud will be written to
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("{}_{:06}.ply", self.name, self.sequence))
    }

    fn save(cloud: &GenericCloud, path: &Path) -> std::io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        // Write PLY header
        writeln!(file, "ply")?;
        writeln!(file, "format ascii 1.0")?;
        writeln!(file, "comment time_us {}", cloud.time.as_micros())?;
        writeln!(file, "element vertex {}", cloud.len())?;
        writeln!(file, "property double x")?;
        writeln!(file, "property double y")?;
        writeln!(file, "property double z")?;
        writeln!(file, "end_header")?;

        for p in &cloud.points {
            writeln!(file, "{} {} {}", p.x, p.y, p.z)?;
        }
        file.flush()
    }
}

impl OutputPort<GenericCloud> for FileCloudPort {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_cloud_port_write",
        skip(self, cloud),
        fields(port = %self.name, points = cloud.len())
    )]
    fn write(&mut self, cloud: GenericCloud) -> Result<(), ContractError> {
        let path = self.next_path();
        Self::save(&cloud, &path).map_err(|e| ExportError::io(&path, e))?;
        self.sequence += 1;
        debug!(path = %path.display(), "cloud written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GenericPoint, Timestamp};
    use tempfile::tempdir;

    #[test]
    fn test_log_port_accepts_both_kinds() {
        let mut port = LogPort::new("log");
        let image = GenericImage::unobserved(2, 2, Timestamp::default());
        assert!(OutputPort::<GenericImage>::write(&mut port, image).is_ok());
        assert!(OutputPort::<GenericCloud>::write(&mut port, GenericCloud::default()).is_ok());
    }

    #[test]
    fn test_png_encoding_marks_unobserved() {
        let dir = tempdir().unwrap();
        let mut port = FileImagePort::new("raw_map", dir.path(), -1.0, 1.0).unwrap();

        let mut image = GenericImage::unobserved(2, 2, Timestamp::default());
        image.data[1] = -1.0;
        image.data[2] = 1.0;
        image.data[3] = 5.0;

        let path = port.next_path();
        port.write(image).unwrap();

        let decoded = image::open(&path).unwrap().into_luma16();
        assert_eq!(decoded.dimensions(), (2, 2));
        let raw = decoded.into_raw();
        assert_eq!(raw, vec![0, 1, u16::MAX, u16::MAX]);
        assert!(port.next_path().ends_with("raw_map_000001.png"));
    }

    #[test]
    fn test_malformed_image_rejected() {
        let dir = tempdir().unwrap();
        let mut port = FileImagePort::new("bad", dir.path(), 0.0, 1.0).unwrap();
        let image = GenericImage {
            width: 3,
            height: 3,
            data: vec![0.0; 4],
            time: Timestamp::default(),
        };
        assert!(port.write(image).is_err());
        assert!(!port.next_path().exists());
    }

    #[test]
    fn test_ply_contains_every_point() {
        let dir = tempdir().unwrap();
        let mut port = FileCloudPort::new("map_cloud", dir.path()).unwrap();
        let cloud = GenericCloud::new(
            Timestamp::from_micros(77),
            vec![
                GenericPoint::new(1.0, 2.0, 3.0),
                GenericPoint::new(0.5, 0.5, f64::NAN),
            ],
        );

        let path = port.next_path();
        port.write(cloud).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 2"));
        assert!(text.contains("comment time_us 77"));
        assert!(text.trim_end().ends_with("0.5 0.5 NaN"));
    }
}
