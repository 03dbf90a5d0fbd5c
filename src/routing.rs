//! Keyword router — maps a student query to the university unit that
//! should handle it.
//!
//! Rule-based classification only: the query is lower-cased and checked
//! against a static keyword table in order; the first hit wins. Queries
//! with no matching keyword fall back to general inquiries.

use serde::{Deserialize, Serialize};

/// A university unit a query can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    AdmissionScholarship,
    AcademicSupport,
    StudentWelfare,
    CareerSkillDevelopment,
    GeneralInquiries,
}

impl Unit {
    /// The stable key used in the database and webhook payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdmissionScholarship => "admission_scholarship",
            Self::AcademicSupport => "academic_support",
            Self::StudentWelfare => "student_welfare",
            Self::CareerSkillDevelopment => "career_skill_development",
            Self::GeneralInquiries => "general_inquiries",
        }
    }

    /// The name shown to students in the confirmation message.
    pub fn friendly_name(&self) -> &'static str {
        match self {
            Self::AdmissionScholarship => "Admission/Scholarship Unit",
            Self::AcademicSupport => "Academic Support Unit",
            Self::StudentWelfare => "Student Welfare Unit",
            Self::CareerSkillDevelopment => "Career/Skill Development Unit",
            Self::GeneralInquiries => "General Inquiries Unit",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyword table, checked in order. First match wins.
static KEYWORD_UNITS: &[(&str, Unit)] = &[
    ("admission", Unit::AdmissionScholarship),
    ("admissions", Unit::AdmissionScholarship),
    ("scholarship", Unit::AdmissionScholarship),
    ("fees", Unit::AdmissionScholarship),
    ("eligibility", Unit::AdmissionScholarship),
    ("exam", Unit::AcademicSupport),
    ("exams", Unit::AcademicSupport),
    ("subject", Unit::AcademicSupport),
    ("attendance", Unit::AcademicSupport),
    ("grading", Unit::AcademicSupport),
    ("books", Unit::AcademicSupport),
    ("hostel", Unit::StudentWelfare),
    ("grievance", Unit::StudentWelfare),
    ("grievances", Unit::StudentWelfare),
    ("wellbeing", Unit::StudentWelfare),
    ("well-being", Unit::StudentWelfare),
    ("stressed", Unit::StudentWelfare),
    ("unwell", Unit::StudentWelfare),
    ("internship", Unit::CareerSkillDevelopment),
    ("placement", Unit::CareerSkillDevelopment),
    ("skills", Unit::CareerSkillDevelopment),
    ("resume", Unit::CareerSkillDevelopment),
];

/// Route a free-text query to a unit by keyword substring match.
pub fn route(query: &str) -> Unit {
    let text = query.to_lowercase();
    for (keyword, unit) in KEYWORD_UNITS {
        if text.contains(keyword) {
            return *unit;
        }
    }
    Unit::GeneralInquiries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_keyword() {
        assert_eq!(route("how do I apply for a scholarship"), Unit::AdmissionScholarship);
        assert_eq!(route("when are the exams held"), Unit::AcademicSupport);
        assert_eq!(route("my hostel room has a leak"), Unit::StudentWelfare);
        assert_eq!(route("need help with my resume"), Unit::CareerSkillDevelopment);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(route("QUESTION ABOUT ADMISSION"), Unit::AdmissionScholarship);
        assert_eq!(route("Internship Opportunities?"), Unit::CareerSkillDevelopment);
    }

    #[test]
    fn falls_back_to_general_inquiries() {
        assert_eq!(route("where is the main gate"), Unit::GeneralInquiries);
        assert_eq!(route(""), Unit::GeneralInquiries);
    }

    #[test]
    fn first_match_wins() {
        // "fees" appears before any welfare keyword in the table
        assert_eq!(route("hostel fees are too high"), Unit::AdmissionScholarship);
    }

    #[test]
    fn deterministic() {
        let query = "I feel stressed about my placement";
        let first = route(query);
        for _ in 0..10 {
            assert_eq!(route(query), first);
        }
    }

    #[test]
    fn display_matches_serde() {
        let units = [
            Unit::AdmissionScholarship,
            Unit::AcademicSupport,
            Unit::StudentWelfare,
            Unit::CareerSkillDevelopment,
            Unit::GeneralInquiries,
        ];
        for unit in units {
            let json = serde_json::to_string(&unit).unwrap();
            assert_eq!(format!("\"{unit}\""), json);
        }
    }

    #[test]
    fn friendly_names() {
        assert_eq!(Unit::StudentWelfare.friendly_name(), "Student Welfare Unit");
        assert_eq!(Unit::GeneralInquiries.friendly_name(), "General Inquiries Unit");
    }
}
