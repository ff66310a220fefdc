//! Serializable value types shared by every component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique, monotonically assigned patient identifier.
pub type PatientId = u64;

/// Triage priority of a patient.
///
/// Variants are declared most urgent first, so the derived `Ord` sorts
/// `High < Medium < Low`, which is the order patients leave the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Critical patients, eligible for a ventilator.
    High,
    /// Urgent but stable patients.
    Medium,
    /// Non-urgent patients.
    Low,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Queue rank: lower is served first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Whether treatment at this priority attempts to attach a ventilator.
    #[must_use]
    pub const fn needs_ventilator(self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

/// The finite resource types a treatment can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Attending doctors.
    Doctor,
    /// Nurses.
    Nurse,
    /// Examination rooms.
    ExamRoom,
    /// Ventilators, attached best-effort to high priority patients.
    Ventilator,
}

impl ResourceKind {
    /// Mandatory resources in global acquisition order.
    pub const MANDATORY: [Self; 3] = [Self::Doctor, Self::Nurse, Self::ExamRoom];

    /// Plural display label used in tables and reports.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Doctor => "Doctors",
            Self::Nurse => "Nurses",
            Self::ExamRoom => "Rooms",
            Self::Ventilator => "Ventilators",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::ExamRoom => "exam room",
            Self::Ventilator => "ventilator",
        })
    }
}
