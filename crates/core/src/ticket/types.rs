//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix shared by every generated ticket ID.
pub const TICKET_ID_PREFIX: &str = "Ticket";

// ============================================================================
// Ticket Status
// ============================================================================

/// Lifecycle status of a stored ticket.
///
/// The only transition is `Open -> Stale`, performed by the staleness sweeper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    Stale,
}

impl TicketStatus {
    /// Returns the wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Stale => "STALE",
        }
    }

    /// Returns true if the sweeper may still flag a ticket in this status.
    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Open)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Problem Type
// ============================================================================

/// Closed set of problem categories a submitter can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemType {
    Account,
    Hardware,
    Software,
    NetworkConnectivity,
    Security,
    Mobile,
    Service,
    OtherMiscellaneous,
}

impl ProblemType {
    /// All categories in display order.
    pub const ALL: [ProblemType; 8] = [
        ProblemType::Account,
        ProblemType::Hardware,
        ProblemType::Software,
        ProblemType::NetworkConnectivity,
        ProblemType::Security,
        ProblemType::Mobile,
        ProblemType::Service,
        ProblemType::OtherMiscellaneous,
    ];

    /// Canonical lowercase name, as accepted on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Account => "account",
            ProblemType::Hardware => "hardware",
            ProblemType::Software => "software",
            ProblemType::NetworkConnectivity => "network/connectivity",
            ProblemType::Security => "security",
            ProblemType::Mobile => "mobile",
            ProblemType::Service => "service",
            ProblemType::OtherMiscellaneous => "other/miscellaneous",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known problem type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProblemType(pub String);

impl fmt::Display for UnknownProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown problem type: {}", self.0)
    }
}

impl std::error::Error for UnknownProblemType {}

impl FromStr for ProblemType {
    type Err = UnknownProblemType;

    /// Case-insensitive match against the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        ProblemType::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| UnknownProblemType(s.to_string()))
    }
}

impl Serialize for ProblemType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProblemType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Stored Ticket
// ============================================================================

/// A ticket as persisted inside its requester's ticket list.
///
/// Urgency is deliberately absent: it is recomputed from the submission text
/// whenever it is needed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTicket {
    pub ticket_id: String,
    #[serde(default)]
    pub ticket_title: String,
    #[serde(default)]
    pub ticket_description: String,
    #[serde(default)]
    pub problem_type: String,
    pub status: TicketStatus,
    /// Epoch seconds. Records written by older producers may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl StoredTicket {
    /// Create an open ticket.
    pub fn open(
        ticket_id: impl Into<String>,
        ticket_title: impl Into<String>,
        ticket_description: impl Into<String>,
        problem_type: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            ticket_title: ticket_title.into(),
            ticket_description: ticket_description.into(),
            problem_type: problem_type.into(),
            status: TicketStatus::Open,
            created_at: Some(created_at),
        }
    }

    /// Age in seconds at `now`, if the creation time is known.
    pub fn age_secs(&self, now: i64) -> Option<i64> {
        self.created_at.map(|created| now - created)
    }
}

// ============================================================================
// Ticket IDs
// ============================================================================

/// Generate a ticket ID of the form `Ticket-<DD-MM-YYYY>-<4 hex chars>`.
///
/// The suffix only has 65536 values, so IDs are unique per requester list at
/// best; nothing checks for collisions across requesters.
pub fn generate_ticket_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        TICKET_ID_PREFIX,
        now.format("%d-%m-%Y"),
        &suffix[..4]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::Open).unwrap(),
            "\"OPEN\""
        );
        let parsed: TicketStatus = serde_json::from_str("\"STALE\"").unwrap();
        assert_eq!(parsed, TicketStatus::Stale);
    }

    #[test]
    fn test_problem_type_case_insensitive() {
        assert_eq!("Hardware".parse::<ProblemType>().unwrap(), ProblemType::Hardware);
        assert_eq!("hardware".parse::<ProblemType>().unwrap(), ProblemType::Hardware);
        assert_eq!(
            "Network/Connectivity".parse::<ProblemType>().unwrap(),
            ProblemType::NetworkConnectivity
        );
        assert!("unknown".parse::<ProblemType>().is_err());
        assert!("network".parse::<ProblemType>().is_err());
    }

    #[test]
    fn test_problem_type_serde_uses_canonical_name() {
        let json = serde_json::to_string(&ProblemType::OtherMiscellaneous).unwrap();
        assert_eq!(json, "\"other/miscellaneous\"");
        let parsed: ProblemType = serde_json::from_str("\"SECURITY\"").unwrap();
        assert_eq!(parsed, ProblemType::Security);
    }

    #[test]
    fn test_generate_ticket_id_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let id = generate_ticket_id(now);

        assert!(id.starts_with("Ticket-07-03-2024-"), "got {}", id);
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_stored_ticket_without_created_at_deserializes() {
        let json = r#"{"ticket_id":"Ticket-01-01-2024-abcd","status":"OPEN"}"#;
        let ticket: StoredTicket = serde_json::from_str(json).unwrap();
        assert!(ticket.created_at.is_none());
        assert_eq!(ticket.age_secs(1_000), None);
    }

    #[test]
    fn test_age_secs() {
        let ticket = StoredTicket::open("t", "title", "desc", "hardware", 1_000);
        assert_eq!(ticket.age_secs(4_600), Some(3_600));
        assert!(ticket.status.is_open());
    }
}
