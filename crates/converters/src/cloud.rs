//! Generic cloud <-> native cloud

use contracts::{GenericCloud, GenericPoint, NativeCloud, NativePoint, Timestamp};

/// Convert a generic cloud to the engine's native form.
///
/// Points keep their order and count. Negative timestamps saturate to 0.
pub fn cloud_to_native(cloud: &GenericCloud) -> NativeCloud {
    let mut points = Vec::with_capacity(cloud.len());
    points.extend(
        cloud
            .points
            .iter()
            .map(|p| NativePoint::new(p.x as f32, p.y as f32, p.z as f32)),
    );

    NativeCloud {
        stamp_us: u64::try_from(cloud.time.as_micros()).unwrap_or(0),
        is_dense: true,
        points,
    }
}

/// Convert a native cloud back to the generic form
pub fn native_to_cloud(cloud: &NativeCloud) -> GenericCloud {
    let mut points = Vec::with_capacity(cloud.len());
    points.extend(cloud.points.iter().map(|p| {
        GenericPoint::new(f64::from(p.x), f64::from(p.y), f64::from(p.z))
    }));

    GenericCloud::new(Timestamp::from_micros(saturating_micros(cloud.stamp_us)), points)
}

fn saturating_micros(stamp_us: u64) -> i64 {
    i64::try_from(stamp_us).unwrap_or(i64::MAX)
}
