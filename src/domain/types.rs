// ==========================================
// School Infrastructure Compliance DSS - Domain Types
// ==========================================
// Classification enums shared by the pipeline stages.
// Serialized form: SCREAMING_SNAKE_CASE (matches database storage)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Risk Level
// ==========================================
// Order: Low < Moderate < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Allocation tier used by the budget priority ordering
    /// (CRITICAL first, unknown levels last).
    pub fn allocation_tier(&self) -> i32 {
        match self {
            RiskLevel::Critical => 1,
            RiskLevel::High => 2,
            RiskLevel::Moderate => 3,
            RiskLevel::Low => 4,
        }
    }

    /// HIGH or CRITICAL — the band that feeds chronic/persistent flags
    /// and the district pct_high_critical aggregate.
    pub fn is_elevated(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }

    /// Parse the stored string form. Unknown values fall back to Low.
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CRITICAL" => RiskLevel::Critical,
            "HIGH" => RiskLevel::High,
            "MODERATE" => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Trend Direction
// ==========================================
// BASELINE = first observed year (no prior score to compare against)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Baseline,
    Improving,
    Stable,
    Deteriorating,
}

impl TrendDirection {
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IMPROVING" => TrendDirection::Improving,
            "STABLE" => TrendDirection::Stable,
            "DETERIORATING" => TrendDirection::Deteriorating,
            _ => TrendDirection::Baseline,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TrendDirection::Baseline => "BASELINE",
            TrendDirection::Improving => "IMPROVING",
            TrendDirection::Stable => "STABLE",
            TrendDirection::Deteriorating => "DETERIORATING",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Priority Bucket
// ==========================================
// Percentile tiers over the state-wide ranked set. Mutually exclusive:
// first-match-wins in the order TOP_5 / TOP_10 / TOP_20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityBucket {
    Top5,
    Top10,
    Top20,
    Standard,
}

impl PriorityBucket {
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "TOP_5" => PriorityBucket::Top5,
            "TOP_10" => PriorityBucket::Top10,
            "TOP_20" => PriorityBucket::Top20,
            _ => PriorityBucket::Standard,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PriorityBucket::Top5 => "TOP_5",
            PriorityBucket::Top10 => "TOP_10",
            PriorityBucket::Top20 => "TOP_20",
            PriorityBucket::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for PriorityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Compliance Grade
// ==========================================
// District scorecard grade from mean risk:
// <=0.15 A, <=0.30 B, <=0.50 C, <=0.75 D, else F
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplianceGrade {
    A,
    B,
    C,
    D,
    F,
}

impl ComplianceGrade {
    /// Grade thresholds are applied to the unrounded district mean.
    pub fn from_avg_risk(avg_risk: f64) -> Self {
        if avg_risk <= 0.15 {
            ComplianceGrade::A
        } else if avg_risk <= 0.30 {
            ComplianceGrade::B
        } else if avg_risk <= 0.50 {
            ComplianceGrade::C
        } else if avg_risk <= 0.75 {
            ComplianceGrade::D
        } else {
            ComplianceGrade::F
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "A" => ComplianceGrade::A,
            "B" => ComplianceGrade::B,
            "C" => ComplianceGrade::C,
            "D" => ComplianceGrade::D,
            _ => ComplianceGrade::F,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ComplianceGrade::A => "A",
            ComplianceGrade::B => "B",
            ComplianceGrade::C => "C",
            ComplianceGrade::D => "D",
            ComplianceGrade::F => "F",
        }
    }
}

impl fmt::Display for ComplianceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Proposal Decision Status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Accepted,
    Flagged,
    Rejected,
}

impl DecisionStatus {
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ACCEPTED" => DecisionStatus::Accepted,
            "FLAGGED" => DecisionStatus::Flagged,
            _ => DecisionStatus::Rejected,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            DecisionStatus::Accepted => "ACCEPTED",
            DecisionStatus::Flagged => "FLAGGED",
            DecisionStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Proposal Reason Code
// ==========================================
// One reason per validated proposal; the first matching branch of the
// decision tree wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NoDeficit,
    ClassroomOverRequest,
    TeacherOverRequest,
    ClassroomModerateOver,
    TeacherModerateOver,
    ClassroomUnderRequest,
    TeacherUnderRequest,
    NoRequest,
    WithinTolerance,
    SchoolNotFound,
}

impl ReasonCode {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NO_DEFICIT" => Some(ReasonCode::NoDeficit),
            "CLASSROOM_OVER_REQUEST" => Some(ReasonCode::ClassroomOverRequest),
            "TEACHER_OVER_REQUEST" => Some(ReasonCode::TeacherOverRequest),
            "CLASSROOM_MODERATE_OVER" => Some(ReasonCode::ClassroomModerateOver),
            "TEACHER_MODERATE_OVER" => Some(ReasonCode::TeacherModerateOver),
            "CLASSROOM_UNDER_REQUEST" => Some(ReasonCode::ClassroomUnderRequest),
            "TEACHER_UNDER_REQUEST" => Some(ReasonCode::TeacherUnderRequest),
            "NO_REQUEST" => Some(ReasonCode::NoRequest),
            "WITHIN_TOLERANCE" => Some(ReasonCode::WithinTolerance),
            "SCHOOL_NOT_FOUND" => Some(ReasonCode::SchoolNotFound),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ReasonCode::NoDeficit => "NO_DEFICIT",
            ReasonCode::ClassroomOverRequest => "CLASSROOM_OVER_REQUEST",
            ReasonCode::TeacherOverRequest => "TEACHER_OVER_REQUEST",
            ReasonCode::ClassroomModerateOver => "CLASSROOM_MODERATE_OVER",
            ReasonCode::TeacherModerateOver => "TEACHER_MODERATE_OVER",
            ReasonCode::ClassroomUnderRequest => "CLASSROOM_UNDER_REQUEST",
            ReasonCode::TeacherUnderRequest => "TEACHER_UNDER_REQUEST",
            ReasonCode::NoRequest => "NO_REQUEST",
            ReasonCode::WithinTolerance => "WITHIN_TOLERANCE",
            ReasonCode::SchoolNotFound => "SCHOOL_NOT_FOUND",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_risk_level_roundtrip() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            assert_eq!(RiskLevel::from_db_str(level.to_db_str()), level);
        }
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(ComplianceGrade::from_avg_risk(0.15), ComplianceGrade::A);
        assert_eq!(ComplianceGrade::from_avg_risk(0.1501), ComplianceGrade::B);
        assert_eq!(ComplianceGrade::from_avg_risk(0.30), ComplianceGrade::B);
        assert_eq!(ComplianceGrade::from_avg_risk(0.50), ComplianceGrade::C);
        assert_eq!(ComplianceGrade::from_avg_risk(0.75), ComplianceGrade::D);
        assert_eq!(ComplianceGrade::from_avg_risk(0.76), ComplianceGrade::F);
    }
}
