//! AprilTag family identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// AprilTag families supported by the board generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TagFamily {
    #[serde(rename = "16h5")]
    Tag16h5,
    #[serde(rename = "25h9")]
    Tag25h9,
    #[serde(rename = "36h11")]
    #[default]
    Tag36h11,
}

impl TagFamily {
    pub const ALL: [TagFamily; 3] = [TagFamily::Tag16h5, TagFamily::Tag25h9, TagFamily::Tag36h11];

    /// Short family name as written in config files (`"36h11"`).
    pub fn name(self) -> &'static str {
        match self {
            TagFamily::Tag16h5 => "16h5",
            TagFamily::Tag25h9 => "25h9",
            TagFamily::Tag36h11 => "36h11",
        }
    }

    /// OpenCV `cv::aruco::PredefinedDictionaryType` value.
    ///
    /// Calibration configs downstream identify the family by this number.
    pub fn opencv_id(self) -> u32 {
        match self {
            TagFamily::Tag16h5 => 17,
            TagFamily::Tag25h9 => 18,
            TagFamily::Tag36h11 => 20,
        }
    }

    /// Name of the embedded dictionary in `calib_targets_aruco::builtins`.
    pub fn dictionary_name(self) -> &'static str {
        match self {
            TagFamily::Tag16h5 => "DICT_APRILTAG_16h5",
            TagFamily::Tag25h9 => "DICT_APRILTAG_25h9",
            TagFamily::Tag36h11 => "DICT_APRILTAG_36h11",
        }
    }

    /// Exact lookup by short name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name.trim())
    }

    /// Lookup by short name, falling back to 36h11 with a warning.
    pub fn from_name(name: &str) -> Self {
        match Self::parse(name) {
            Some(family) => family,
            None => {
                log::warn!("unknown AprilTag family '{name}', using 36h11");
                TagFamily::Tag36h11
            }
        }
    }
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_opencv_ids() {
        assert_eq!(TagFamily::from_name("36h11").opencv_id(), 20);
        assert_eq!(TagFamily::from_name("25h9").opencv_id(), 18);
        assert_eq!(TagFamily::from_name("16h5").opencv_id(), 17);
    }

    #[test]
    fn unknown_name_falls_back_to_36h11() {
        assert_eq!(TagFamily::parse("41h12"), None);
        assert_eq!(TagFamily::from_name("41h12"), TagFamily::Tag36h11);
        assert_eq!(TagFamily::from_name(""), TagFamily::Tag36h11);
    }

    #[test]
    fn serde_uses_short_names() {
        let json = serde_json::to_string(&TagFamily::Tag25h9).expect("serialize");
        assert_eq!(json, "\"25h9\"");
        let back: TagFamily = serde_json::from_str("\"16h5\"").expect("deserialize");
        assert_eq!(back, TagFamily::Tag16h5);
    }
}
