//! Aspect ratio classification

use tubely_core::constants::{LANDSCAPE_RATIO, PORTRAIT_RATIO, RATIO_TOLERANCE};
use tubely_core::models::AspectClass;

/// Classify a video by its pixel geometry.
///
/// `height` must be non-zero; the prober guarantees this for probed geometry.
pub fn classify(width: u32, height: u32) -> AspectClass {
    classify_ratio(f64::from(width) / f64::from(height))
}

/// Classify a width/height ratio. Both bands are inclusive and Portrait is checked first.
pub fn classify_ratio(ratio: f64) -> AspectClass {
    if within_band(ratio, PORTRAIT_RATIO) {
        AspectClass::Portrait
    } else if within_band(ratio, LANDSCAPE_RATIO) {
        AspectClass::Landscape
    } else {
        AspectClass::Other
    }
}

fn within_band(ratio: f64, target: f64) -> bool {
    ratio >= target - RATIO_TOLERANCE && ratio <= target + RATIO_TOLERANCE
}
