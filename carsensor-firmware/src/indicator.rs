//! Status indicator colours

use carsensor_core::status::StatusCategory;
use smart_leds::RGB8;

/// Colour shown for a status category
pub fn colour(status: StatusCategory) -> RGB8 {
    match status {
        StatusCategory::Boot => RGB8::new(255, 165, 0),
        StatusCategory::ConfigError => RGB8::new(96, 0, 96),
        StatusCategory::NoDevices => RGB8::new(245, 0, 0),
        StatusCategory::TooManyDevices => RGB8::new(96, 0, 0),
        StatusCategory::Nominal { active, .. } if active > 0 => {
            RGB8::new(0, 0, 120u8.saturating_add(active.saturating_mul(16)))
        }
        StatusCategory::Nominal { converters: 1, .. } => RGB8::new(0, 245, 0),
        StatusCategory::Nominal { .. } => RGB8::new(0, 96, 0),
        StatusCategory::Error => RGB8::new(255, 0, 0),
    }
}
