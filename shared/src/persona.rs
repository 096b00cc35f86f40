//! Persona tags and the tone guidance each one adds to the answer prompt.

use serde::{Deserialize, Serialize};

/// Guidance used when the persona tag is not one of the known personas.
pub const FALLBACK_GUIDELINE: &str = "Provide general guidance tailored to the user's role.";

/// Caller-selected role that conditions the answer prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "Executive Sponsor")]
    ExecutiveSponsor,
    #[serde(rename = "Implementation Lead")]
    ImplementationLead,
    #[serde(rename = "Data/IT")]
    DataIt,
    #[serde(rename = "Team Member")]
    TeamMember,
    #[serde(rename = "Coach")]
    Coach,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::ExecutiveSponsor,
        Persona::ImplementationLead,
        Persona::DataIt,
        Persona::TeamMember,
        Persona::Coach,
    ];

    /// The tag callers send for this persona.
    pub fn tag(&self) -> &'static str {
        match self {
            Persona::ExecutiveSponsor => "Executive Sponsor",
            Persona::ImplementationLead => "Implementation Lead",
            Persona::DataIt => "Data/IT",
            Persona::TeamMember => "Team Member",
            Persona::Coach => "Coach",
        }
    }

    /// Exact, case-sensitive match on the tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|persona| persona.tag() == tag)
    }

    pub fn guideline(&self) -> &'static str {
        match self {
            Persona::ExecutiveSponsor => {
                "Focus on providing high-level recommendations and actionable insights for decision-making. Emphasize strategic impact and alignment with goals."
            }
            Persona::ImplementationLead => {
                "Focus on step-by-step project execution guidance. Highlight resource allocation, communication facilitation, and training requirements."
            }
            Persona::DataIt => {
                "Focus on technical details, data security, integration, and troubleshooting. Emphasize tools, systems, and user management."
            }
            Persona::TeamMember => {
                "Provide actionable insights for day-to-day operations. Highlight practical applications of data for decision-making in their role."
            }
            Persona::Coach => {
                "Focus on support programs like MTSS, SEL, STEM, and instructional coaching. Highlight training, program success metrics, and actionable improvements."
            }
        }
    }
}

/// Guidance for a raw persona tag, falling back to [`FALLBACK_GUIDELINE`].
pub fn guideline_for(tag: &str) -> &'static str {
    Persona::from_tag(tag)
        .map(|persona| persona.guideline())
        .unwrap_or(FALLBACK_GUIDELINE)
}
