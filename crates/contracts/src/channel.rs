//! Channel - identifiers of the independent input streams

use serde::{Deserialize, Serialize};
use std::fmt;

/// One independent input stream with its own readiness and dispatch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Hazard camera cloud, static hazcam -> body transform
    Hazcam,
    /// Localization camera cloud, static loccam -> body transform
    Loccam,
    /// Pan-tilt camera cloud, paired with a live transform sample
    Pancam,
    /// Orbital prior cloud, registered against the global map
    Orbiter,
    /// Pose guess feeding the prediction step
    PoseGuess,
}

impl Channel {
    /// All channels in dispatch order
    pub const ALL: [Channel; 5] = [
        Channel::PoseGuess,
        Channel::Hazcam,
        Channel::Loccam,
        Channel::Pancam,
        Channel::Orbiter,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::Hazcam => "hazcam",
            Channel::Loccam => "loccam",
            Channel::Pancam => "pancam",
            Channel::Orbiter => "orbiter",
            Channel::PoseGuess => "pose_guess",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for channel in Channel::ALL {
            let json = serde_json::to_string(&channel).unwrap();
            assert_eq!(json, format!("\"{}\"", channel.as_str()));
        }
    }
}
