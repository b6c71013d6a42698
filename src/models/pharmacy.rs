use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A vendor location. The password column of the pharmacies table is never
/// selected into this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Wire shape of a coordinate (`{ lat, lng }`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<Location> for LatLng {
    fn from(location: Location) -> Self {
        Self {
            lat: location.latitude,
            lng: location.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacySummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub is_open: bool,
}

impl From<&Pharmacy> for PharmacySummary {
    fn from(pharmacy: &Pharmacy) -> Self {
        Self {
            id: pharmacy.id,
            name: pharmacy.name.clone(),
            username: pharmacy.username.clone(),
            is_open: pharmacy.is_open,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyProfile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_open: bool,
    pub location: Option<LatLng>,
    pub created_at: DateTime<Utc>,
}

impl PharmacyProfile {
    pub fn new(pharmacy: Pharmacy, location: Option<Location>) -> Self {
        Self {
            id: pharmacy.id,
            name: pharmacy.name,
            username: pharmacy.username,
            email: pharmacy.email,
            phone: pharmacy.phone,
            address: pharmacy.address,
            is_open: pharmacy.is_open,
            location: location.map(LatLng::from),
            created_at: pharmacy.created_at,
        }
    }
}
