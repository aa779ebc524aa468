//! Pipeline stage identity and analysis categories.
//!
//! These types live in `core` (outside the agent layer) so that run state,
//! logs and persisted history can name a stage without depending on any
//! provider machinery.

use serde::{Deserialize, Serialize};

/// One of the five pipeline stages, in execution order.
///
/// Serialized in upper case (`"ROUTER"`, `"HUNTER"`, …) to keep persisted
/// history readable by existing dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentRole {
    /// Classifies the query and expands it into search queries.
    Router,
    /// Discovers candidate sources for the target company.
    Hunter,
    /// Extracts and aggregates content from the discovered sources.
    Scraper,
    /// Produces the SWOT analysis and strategic scores.
    Analyst,
    /// Writes the executive report.
    Reporter,
}

impl AgentRole {
    /// All stages in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Router,
        Self::Hunter,
        Self::Scraper,
        Self::Analyst,
        Self::Reporter,
    ];

    /// Returns the upper-case stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Router => "ROUTER",
            Self::Hunter => "HUNTER",
            Self::Scraper => "SCRAPER",
            Self::Analyst => "ANALYST",
            Self::Reporter => "REPORTER",
        }
    }

    /// Zero-based position in the pipeline.
    #[must_use]
    pub const fn position(self) -> usize {
        self as usize
    }

    /// The stage that runs after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Router => Some(Self::Hunter),
            Self::Hunter => Some(Self::Scraper),
            Self::Scraper => Some(Self::Analyst),
            Self::Analyst => Some(Self::Reporter),
            Self::Reporter => None,
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of analysis the Router assigns to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Price changes and plan structures.
    Pricing,
    /// Product updates and capabilities.
    Features,
    /// Press releases and news.
    Announcements,
    /// Anything else.
    General,
}

impl AnalysisType {
    /// Returns the lower-case category name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pricing => "pricing",
            Self::Features => "features",
            Self::Announcements => "announcements",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
