//! Stereo calibration snapshot.

use serde::{Deserialize, Serialize};

/// 3×3 camera intrinsic matrix, row-major
pub type Intrinsics = [[f64; 3]; 3];

/// Immutable calibration of the stereo rig
///
/// Serialized field names are the ones the viewer expects from `GET /calibration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Left camera intrinsics
    pub k_left: Intrinsics,

    /// Right camera intrinsics
    pub k_right: Intrinsics,

    /// Distance between the optical centers (meters)
    pub baseline_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_json_shape() {
        let calib = Calibration {
            k_left: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            k_right: [[801.0, 0.0, 635.0], [0.0, 801.0, 361.0], [0.0, 0.0, 1.0]],
            baseline_m: 0.075,
        };
        let json = serde_json::to_value(&calib).unwrap();
        assert_eq!(json["k_left"][0][2], 640.0);
        assert_eq!(json["baseline_m"], 0.075);

        let back: Calibration = serde_json::from_value(json).unwrap();
        assert_eq!(back, calib);
    }
}
