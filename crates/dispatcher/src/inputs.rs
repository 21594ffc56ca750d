//! Task inputs and static transforms

use contracts::{
    Channel, FrameConfig, GenericCloud, Pose, PoseSample, SampleInput, Timestamp,
    TransformService,
};
use tracing::{error, info};

use crate::TaskError;

type CloudInput = Box<dyn SampleInput<GenericCloud>>;
type PoseInput = Box<dyn SampleInput<PoseSample>>;

/// The six sample inputs read by the cycle
pub struct TaskInputs {
    pub hazcam_cloud: CloudInput,
    pub loccam_cloud: CloudInput,
    pub pancam_cloud: CloudInput,
    /// Pan-camera base -> body, sampled with each pan-camera cloud
    pub pancam_transform: PoseInput,
    pub orbiter_cloud: CloudInput,
    pub pose_guess: PoseInput,
}

impl TaskInputs {
    /// Mark whatever is pending on `channel` as read.
    ///
    /// Returns `true` if at least one sample was discarded.
    pub(crate) fn discard(&mut self, channel: Channel) -> bool {
        match channel {
            Channel::Hazcam => self.hazcam_cloud.discard(),
            Channel::Loccam => self.loccam_cloud.discard(),
            Channel::Pancam => {
                let cloud = self.pancam_cloud.discard();
                let transform = self.pancam_transform.discard();
                cloud || transform
            }
            Channel::Orbiter => self.orbiter_cloud.discard(),
            Channel::PoseGuess => self.pose_guess.discard(),
        }
    }
}

/// Transforms resolved once at configure time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTransforms {
    pub body_to_ground: Pose,
    pub hazcam_to_body: Pose,
    pub loccam_to_body: Pose,
}

impl StaticTransforms {
    /// Look up every static transform, failing on the first missing one
    pub fn resolve(
        service: &dyn TransformService,
        frames: &FrameConfig,
    ) -> Result<Self, TaskError> {
        let at = Timestamp::now();
        let lookup = |source: &str, target: &str| {
            service.lookup(source, target, at).map_err(|e| {
                error!(source, target, error = %e, "static transform not found");
                TaskError::transform_not_found(source, target)
            })
        };

        let transforms = Self {
            body_to_ground: lookup(&frames.body, &frames.ground)?,
            hazcam_to_body: lookup(&frames.hazcam, &frames.body)?,
            loccam_to_body: lookup(&frames.loccam, &frames.body)?,
        };
        info!(
            body = %frames.body,
            ground = %frames.ground,
            hazcam = %frames.hazcam,
            loccam = %frames.loccam,
            "static transforms resolved"
        );
        Ok(transforms)
    }
}
