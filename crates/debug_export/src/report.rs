//! Per-cycle export results

use std::fmt;

/// One export behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Export {
    RawMapImage,
    MapCloud,
    Pose,
    LocalMap,
    GlobalMap,
}

impl Export {
    pub const ALL: [Export; 5] = [
        Export::RawMapImage,
        Export::MapCloud,
        Export::Pose,
        Export::LocalMap,
        Export::GlobalMap,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Export::RawMapImage => "raw_map_image",
            Export::MapCloud => "map_cloud",
            Export::Pose => "pose",
            Export::LocalMap => "local_map",
            Export::GlobalMap => "global_map",
        }
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one export behaviour in one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Toggle off, or nothing attached to receive it
    #[default]
    Skipped,
    Written,
    Failed(String),
}

impl ExportOutcome {
    pub const fn status(&self) -> &'static str {
        match self {
            ExportOutcome::Skipped => "skipped",
            ExportOutcome::Written => "written",
            ExportOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, ExportOutcome::Written)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExportOutcome::Failed(_))
    }
}

/// Outcomes of every export behaviour for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub raw_map_image: ExportOutcome,
    pub map_cloud: ExportOutcome,
    pub pose: ExportOutcome,
    pub local_map: ExportOutcome,
    pub global_map: ExportOutcome,
}

impl ExportReport {
    pub fn outcome(&self, export: Export) -> &ExportOutcome {
        match export {
            Export::RawMapImage => &self.raw_map_image,
            Export::MapCloud => &self.map_cloud,
            Export::Pose => &self.pose,
            Export::LocalMap => &self.local_map,
            Export::GlobalMap => &self.global_map,
        }
    }

    pub(crate) fn set(&mut self, export: Export, outcome: ExportOutcome) {
        let slot = match export {
            Export::RawMapImage => &mut self.raw_map_image,
            Export::MapCloud => &mut self.map_cloud,
            Export::Pose => &mut self.pose,
            Export::LocalMap => &mut self.local_map,
            Export::GlobalMap => &mut self.global_map,
        };
        *slot = outcome;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Export, &ExportOutcome)> + '_ {
        Export::ALL.into_iter().map(|e| (e, self.outcome(e)))
    }

    pub fn written(&self) -> usize {
        self.iter().filter(|(_, o)| o.is_written()).count()
    }

    /// Failed exports with their messages
    pub fn failures(&self) -> Vec<(Export, &str)> {
        self.iter()
            .filter_map(|(e, o)| match o {
                ExportOutcome::Failed(message) => Some((e, message.as_str())),
                _ => None,
            })
            .collect()
    }
}
