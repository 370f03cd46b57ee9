// SPDX-License-Identifier: MPL-2.0

//! Helper module for visualizations.

use nalgebra::DMatrix;

use super::cfa::CfaColor;

/// Ugrade a value to an RGB value for display.
pub trait ToRgb8 {
    fn to_rgb8(self) -> (u8, u8, u8);
}

impl ToRgb8 for CfaColor {
    fn to_rgb8(self) -> (u8, u8, u8) {
        match self {
            CfaColor::Blank => (0, 0, 0),
            CfaColor::Red => (255, 0, 0),
            CfaColor::Green => (0, 255, 0),
            CfaColor::Blue => (0, 0, 255),
        }
    }
}

/// Full-intensity color of each filter, black outside the sensor.
pub fn cfa_colors(mask: &DMatrix<CfaColor>) -> DMatrix<(u8, u8, u8)> {
    mask.map(|color| color.to_rgb8())
}
