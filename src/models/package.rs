use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a package bundles; decides which stock checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    FlightOnly,
    LodgingOnly,
    #[default]
    FlightLodging,
}

impl PackageKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "flight_only" => Self::FlightOnly,
            "lodging_only" => Self::LodgingOnly,
            _ => Self::FlightLodging,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::FlightOnly => "flight_only",
            Self::LodgingOnly => "lodging_only",
            Self::FlightLodging => "flight_lodging",
        }
    }

    pub fn includes_flight(&self) -> bool {
        matches!(self, Self::FlightOnly | Self::FlightLodging)
    }

    pub fn includes_lodging(&self) -> bool {
        matches!(self, Self::LodgingOnly | Self::FlightLodging)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub destination: String,
    pub kind: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub seats: i64,
    pub seats_available: i64,
    pub price_adult: f64,
    pub price_child: Option<f64>,
    pub currency: String,
    pub fare: Option<String>,
    pub services: Option<String>,
    pub policies: Option<String>,
    pub image: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Package {
    pub fn kind(&self) -> PackageKind {
        PackageKind::from_str(&self.kind)
    }
}
