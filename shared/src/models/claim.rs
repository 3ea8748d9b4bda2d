//! Claim Model and the check-in / redeem wire types

use super::perk::Coords;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Claim lifecycle: `reserved -> redeemed`, never backward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Reserved,
    Redeemed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Redeemed => "redeemed",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reserved" => Ok(Self::Reserved),
            "redeemed" => Ok(Self::Redeemed),
            other => Err(format!("unknown claim status: {other}")),
        }
    }
}

/// One user's reservation against a perk's inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub perk_id: String,
    pub user_id: String,
    pub status: ClaimStatus,
    /// Bearer credential, unique across all claims
    pub redeem_token: String,
    pub created_at: i64,
    pub redeemed_at: Option<i64>,
    /// Actor marker, e.g. "staff"
    pub redeemed_by: Option<String>,
}

// ── Check-in ──

/// `POST /perks/{perkId}/checkin` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinRequest {
    pub coords: Option<Coords>,
}

/// `POST /perks/{perkId}/checkin` response
///
/// `checked_in` acknowledges the request and is always `true`. Every
/// steady-state outcome (too far, sold out, already claimed) is a 200 with
/// a descriptive flag on `perk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinResponse {
    pub checked_in: bool,
    pub perk: CheckinPerk,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinPerk {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClaimStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub too_far: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_claimed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outside_window: Option<bool>,
    /// 1-based position of the caller's claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub total: i64,
}

/// The caller's own pass for a perk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyClaim {
    pub token: String,
    pub status: ClaimStatus,
    pub order: i64,
    pub total: i64,
}

// ── Redeem ──

/// `POST /perks/redeem-by-token` body
///
/// Fields are optional on the wire so a missing one is reported as a
/// validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedeemRequest {
    pub token: Option<String>,
    pub perk_id: Option<String>,
}

/// `POST /perks/redeem-by-token` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_redeemed: Option<bool>,
    pub redeemed: i64,
}

impl RedeemResponse {
    pub fn redeemed(count: i64) -> Self {
        Self {
            ok: true,
            already_redeemed: None,
            redeemed: count,
        }
    }

    pub fn already_redeemed(count: i64) -> Self {
        Self {
            ok: true,
            already_redeemed: Some(true),
            redeemed: count,
        }
    }
}

/// Scanner screen counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProgress {
    pub claimed: i64,
    pub redeemed: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkin_response_omits_unset_flags() {
        let resp = CheckinResponse {
            checked_in: true,
            perk: CheckinPerk {
                title: "Free drink".into(),
                sold_out: Some(true),
                total: 25,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["checkedIn"], true);
        assert_eq!(json["perk"]["soldOut"], true);
        assert_eq!(json["perk"]["total"], 25);
        assert!(json["perk"].get("token").is_none());
        assert!(json["perk"].get("tooFar").is_none());
    }

    #[test]
    fn checkin_request_coords_are_optional() {
        let req: CheckinRequest = serde_json::from_str("{}").unwrap();
        assert!(req.coords.is_none());
        let req: CheckinRequest =
            serde_json::from_str(r#"{"coords":{"lat":40.7,"lng":-73.9}}"#).unwrap();
        assert_eq!(req.coords.unwrap().lat, 40.7);
    }

    #[test]
    fn redeem_response_shapes() {
        let json = serde_json::to_value(RedeemResponse::redeemed(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true, "redeemed": 3 }));

        let json = serde_json::to_value(RedeemResponse::already_redeemed(3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "ok": true, "alreadyRedeemed": true, "redeemed": 3 })
        );
    }

    #[test]
    fn redeem_request_tolerates_missing_fields() {
        let req: RedeemRequest = serde_json::from_str(r#"{"token":"ABC"}"#).unwrap();
        assert_eq!(req.token.as_deref(), Some("ABC"));
        assert!(req.perk_id.is_none());
    }

    #[test]
    fn claim_status_parses() {
        assert_eq!("redeemed".parse::<ClaimStatus>(), Ok(ClaimStatus::Redeemed));
        assert!("void".parse::<ClaimStatus>().is_err());
    }
}
