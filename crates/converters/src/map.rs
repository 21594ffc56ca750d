//! Grid map -> dense image / point cloud

use contracts::{GenericCloud, GenericImage, GenericPoint, GridMap, Timestamp};

/// Render the mean-elevation layer as a square image.
///
/// Each cell reads its sample from the storage slot and lands at offset
/// `unwrapped.col * height + unwrapped.row`, so the image stays aligned with
/// the map centre however the buffer has scrolled.
pub fn map_to_image(map: &GridMap) -> GenericImage {
    let side = map.size();
    let mut image = GenericImage::unobserved(side, side, map_time(map));
    let layer = map.mean_z();

    for cell in map.iter() {
        let offset = cell.unwrapped.col * image.height + cell.unwrapped.row;
        image.data[offset] = layer.get(cell.index);
    }

    image
}

/// Emit one world-frame point per cell, in storage order.
///
/// Unobserved cells produce points with `NaN` z.
pub fn map_to_cloud(map: &GridMap) -> GenericCloud {
    let layer = map.mean_z();
    let mut points = Vec::with_capacity(map.size() * map.size());
    for cell in map.iter() {
        let [x, y, z] = map.point_from_index(cell.index, layer);
        points.push(GenericPoint::new(x, y, z));
    }

    GenericCloud::new(map_time(map), points)
}

fn map_time(map: &GridMap) -> Timestamp {
    Timestamp::from_micros(i64::try_from(map.timestamp()).unwrap_or(i64::MAX))
}
