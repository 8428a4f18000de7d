use serde::{Deserialize, Serialize};
use std::fmt;

pub type StandId = u32;
pub type HunterId = u32;
pub type ActivityId = u32;

/// Pin given to hunters created or stored without one.
pub const DEFAULT_PIN: &str = "0000";

fn default_pin() -> String {
    DEFAULT_PIN.to_owned()
}

/// A physical hunting location. Occupied by at most one hunter at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stand {
    pub id: StandId,
    pub name: String,
    #[serde(default)]
    pub occupied: bool,
    #[serde(default)]
    pub hunter: Option<String>,
    #[serde(default)]
    pub check_in_time: Option<String>,
}

impl Stand {
    pub fn new(id: StandId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            occupied: false,
            hunter: None,
            check_in_time: None,
        }
    }

    /// Mark the stand as held by `hunter` since `at`.
    pub fn occupy(&mut self, hunter: &str, at: &str) {
        self.occupied = true;
        self.hunter = Some(hunter.to_owned());
        self.check_in_time = Some(at.to_owned());
    }

    /// Clear all occupancy fields.
    pub fn release(&mut self) {
        self.occupied = false;
        self.hunter = None;
        self.check_in_time = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hunter {
    pub id: HunterId,
    pub name: String,
    #[serde(default = "default_pin")]
    pub pin: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub current_stand: Option<StandId>,
}

impl Hunter {
    /// The outward view of this hunter, without the pin.
    pub fn profile(&self) -> HunterProfile {
        HunterProfile {
            id: self.id,
            name: self.name.clone(),
            is_admin: self.is_admin,
            current_stand: self.current_stand,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HunterProfile {
    pub id: HunterId,
    pub name: String,
    pub is_admin: bool,
    pub current_stand: Option<StandId>,
}

/// What an activity entry records.
///
/// Older data files may carry free-form types; those load as [`Other`](Self::Other)
/// and are written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    Checkin,
    Checkout,
    Sighting,
    Harvest,
    Other(String),
}

impl ActivityKind {
    /// Parse one of the four known lowercase wire names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "checkin" => Some(Self::Checkin),
            "checkout" => Some(Self::Checkout),
            "sighting" => Some(Self::Sighting),
            "harvest" => Some(Self::Harvest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::Checkin => "checkin",
            ActivityKind::Checkout => "checkout",
            ActivityKind::Sighting => "sighting",
            ActivityKind::Harvest => "harvest",
            ActivityKind::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for ActivityKind {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or(Self::Other(s))
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable activity log record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntry {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub hunter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: String,
}
