//! Perk Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a perk is handed out at the venue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerkKind {
    /// Guest checks in on site and shows a scannable pass
    #[default]
    Checkin,
    /// Guest receives a code to present
    Code,
}

impl PerkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for PerkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkin" => Ok(Self::Checkin),
            "code" => Ok(Self::Code),
            other => Err(format!("unknown perk kind: {other}")),
        }
    }
}

/// A point on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    /// Finite and within the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Circular area a guest must be inside to check in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub center: Coords,
    pub radius_m: f64,
}

impl Geofence {
    /// Build a geofence from its three nullable columns.
    ///
    /// All three absent means no fence; any partial combination is rejected.
    pub fn from_parts(
        lat: Option<f64>,
        lng: Option<f64>,
        radius_m: Option<f64>,
    ) -> Result<Option<Self>, String> {
        match (lat, lng, radius_m) {
            (None, None, None) => Ok(None),
            (Some(lat), Some(lng), Some(radius_m)) => {
                let center = Coords { lat, lng };
                if !center.is_valid() {
                    return Err("geofence center is out of range".into());
                }
                if !radius_m.is_finite() || radius_m <= 0.0 {
                    return Err("geofence radius must be positive".into());
                }
                Ok(Some(Self { center, radius_m }))
            }
            _ => Err("geofence needs latitude, longitude and radius together".into()),
        }
    }
}

/// Perk entity: a limited-inventory offer tied to a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perk {
    pub id: String,
    pub title: String,
    pub venue_name: Option<String>,
    pub neighborhood: Option<String>,
    pub kind: PerkKind,
    /// Capacity ceiling, always > 0
    pub max_claims: i64,
    pub active: bool,
    /// Live window start (Unix millis), None = always started
    pub start_at: Option<i64>,
    /// Live window end (Unix millis), None = never ends
    pub end_at: Option<i64>,
    pub geofence: Option<Geofence>,
    /// Secret that lets a scanning device mint a staff session
    #[serde(skip_serializing, default)]
    pub staff_unlock_token: String,
    pub sponsor_tag: Option<String>,
    pub fine_print: Option<String>,
    pub created_at: i64,
}

impl Perk {
    /// Whether `now` (Unix millis) falls inside `[start_at, end_at]`
    pub fn in_window(&self, now: i64) -> bool {
        self.start_at.is_none_or(|start| now >= start) && self.end_at.is_none_or(|end| now <= end)
    }

    /// Active and inside the window
    pub fn is_live(&self, now: i64) -> bool {
        self.active && self.in_window(now)
    }
}

/// Create perk payload (admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerkCreate {
    pub title: String,
    pub venue_name: Option<String>,
    pub neighborhood: Option<String>,
    pub kind: Option<PerkKind>,
    pub max_claims: Option<i64>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub geo_lat: Option<f64>,
    pub geo_lng: Option<f64>,
    pub geo_radius_m: Option<f64>,
    pub sponsor_tag: Option<String>,
    pub fine_print: Option<String>,
}

/// Response to a successful perk creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkCreated {
    pub id: String,
    pub staff_unlock_token: String,
}

/// Toggle active payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActive {
    pub active: bool,
}

/// Response to an unlock token rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRegenerated {
    pub id: String,
    pub staff_unlock_token: String,
}

/// Public perk card with progress ("12/25 claimed")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkCard {
    pub id: String,
    pub title: String,
    pub venue_name: Option<String>,
    pub neighborhood: Option<String>,
    pub kind: PerkKind,
    pub sponsor_tag: Option<String>,
    pub fine_print: Option<String>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub active: bool,
    pub live: bool,
    pub has_geofence: bool,
    pub claimed: i64,
    pub redeemed: i64,
    pub total: i64,
}

/// Admin dashboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPerkSummary {
    pub id: String,
    pub title: String,
    pub venue_name: Option<String>,
    pub kind: PerkKind,
    pub active: bool,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub staff_unlock_token: String,
    pub claimed: i64,
    pub redeemed: i64,
    pub total: i64,
    pub created_at: i64,
}
