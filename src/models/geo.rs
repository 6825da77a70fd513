use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// GeoJSON point, coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

/// Location as sent by clients; only the coordinates are read.
#[derive(Debug, Default, Deserialize)]
pub struct LocationInput {
    pub coordinates: Option<[f64; 2]>,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::ValidationError(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::ValidationError(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }

        Ok(Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        })
    }

    pub fn origin() -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [0.0, 0.0],
        }
    }

    pub fn from_input(input: Option<LocationInput>) -> Result<Self> {
        match input.and_then(|l| l.coordinates) {
            Some([lng, lat]) => Self::new(lng, lat),
            None => Ok(Self::origin()),
        }
    }
}
