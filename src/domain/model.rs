use crate::domain::catalog;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

/// Placeholder for string fields the model left out.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a contact whose LinkedIn profile could not be verified.
pub const PROFILE_NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachStep {
    pub step: u32,
    pub subject: String,
    pub body: String,
}

impl OutreachStep {
    /// Plain-text email ready to paste into a mail client.
    pub fn as_email_text(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}

impl NewsArticle {
    pub fn placeholder() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            url: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.url != NOT_AVAILABLE
    }
}

impl Default for NewsArticle {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Verifying,
    Verified,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub contact_name: String,
    pub designation: String,
    pub contact_linked_in: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub talking_points: Option<Vec<String>>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_log: Option<String>,
}

impl Contact {
    pub fn matches_name(&self, name: &str) -> bool {
        self.contact_name.trim().eq_ignore_ascii_case(name.trim())
    }

    pub fn has_profile(&self) -> bool {
        self.contact_linked_in != PROFILE_NOT_FOUND && self.contact_linked_in != NOT_AVAILABLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Hot,
    Warm,
    Cold,
}

impl ScoreTier {
    pub fn from_score(score: u32) -> Self {
        if score > 75 {
            ScoreTier::Hot
        } else if score > 50 {
            ScoreTier::Warm
        } else {
            ScoreTier::Cold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Hot => "hot",
            ScoreTier::Warm => "warm",
            ScoreTier::Cold => "cold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub company_name: String,
    pub category: String,
    pub company_linked_in: String,
    pub justification: String,
    pub email: String,
    pub phone: String,
    pub lead_score: u32,
    pub outreach_suggestion: String,
    pub employee_count: String,
    pub latest_funding: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub latest_news: NewsArticle,
    #[serde(default)]
    pub latest_international_news: NewsArticle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outreach_sequence: Option<Vec<OutreachStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swot_analysis: Option<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub platform_presence: Vec<String>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_report: Option<String>,
}

impl Lead {
    pub fn matches_name(&self, name: &str) -> bool {
        self.company_name.trim().eq_ignore_ascii_case(name.trim())
    }

    pub fn score_tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.lead_score)
    }

    /// Outreach emails sorted by step number.
    pub fn ordered_sequence(&self) -> Vec<&OutreachStep> {
        let mut steps: Vec<&OutreachStep> = self
            .outreach_sequence
            .as_deref()
            .unwrap_or_default()
            .iter()
            .collect();
        steps.sort_by_key(|s| s.step);
        steps
    }

    pub fn find_contact_mut(&mut self, name: &str) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.matches_name(name))
    }

    /// Merge a verification result: corrected details replace the old ones.
    pub fn apply_verification(&mut self, verification: LeadVerification) {
        if let Some(email) = verification.email {
            self.email = email;
        }
        if let Some(phone) = verification.phone {
            self.phone = phone;
        }
        if let Some(linked_in) = verification.company_linked_in {
            self.company_linked_in = linked_in;
        }
        self.verification_status = if verification.verified {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Failed
        };
        self.verification_report = Some(verification.report);
    }
}

/// Outcome of re-checking a lead's public contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadVerification {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_linked_in: Option<String>,
    pub verified: bool,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone)]
pub struct MarketReport {
    pub industry: String,
    pub region: String,
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSources {
    pub web: bool,
    pub linkedin: bool,
    pub reddit: bool,
    pub facebook: bool,
    pub x: bool,
    pub instagram: bool,
}

impl SearchSources {
    /// Names of the enabled social networks, excluding Reddit.
    pub fn social_networks(&self) -> Vec<&'static str> {
        let mut networks = Vec::new();
        if self.facebook {
            networks.push("Facebook");
        }
        if self.x {
            networks.push("X");
        }
        if self.instagram {
            networks.push("Instagram");
        }
        networks
    }
}

impl Default for SearchSources {
    fn default() -> Self {
        Self {
            web: true,
            linkedin: true,
            reddit: false,
            facebook: false,
            x: false,
            instagram: false,
        }
    }
}

/// Filters describing which leads to research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub client_name: String,
    pub find_similar: bool,
    pub client_category: String,
    pub target_departments: Vec<String>,
    pub sources: SearchSources,
    pub generate_email: bool,
    /// Home region of the companies being researched.
    pub origin_region: String,
    pub target_regions: Vec<String>,
    pub platforms: Vec<String>,
    pub target_startups: bool,
    pub sales_territories: Vec<String>,
    pub excluded_clients: Vec<String>,
    pub agency_names: Vec<String>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            find_similar: false,
            client_category: catalog::DEFAULT_CATEGORY.to_string(),
            target_departments: catalog::to_owned_list(catalog::DEFAULT_DEPARTMENTS),
            sources: SearchSources::default(),
            generate_email: true,
            origin_region: catalog::DEFAULT_ORIGIN_REGION.to_string(),
            target_regions: catalog::to_owned_list(catalog::INTERNATIONAL_REGIONS),
            platforms: catalog::to_owned_list(catalog::DEFAULT_PLATFORMS),
            target_startups: false,
            sales_territories: catalog::to_owned_list(catalog::SALES_TERRITORIES),
            excluded_clients: Vec::new(),
            agency_names: Vec::new(),
        }
    }
}

impl SearchCriteria {
    /// Criteria for companies resembling `seed`, keeping every other filter.
    pub fn lookalike_of(&self, seed: &Lead) -> Self {
        Self {
            client_name: seed.company_name.clone(),
            client_category: seed.category.clone(),
            find_similar: true,
            ..self.clone()
        }
    }
}

impl Validate for SearchCriteria {
    fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() && self.client_category.trim().is_empty() {
            return Err(LeadError::ConfigValidationError {
                field: "search".to_string(),
                message: "either a client name or a client category is required".to_string(),
            });
        }
        validation::validate_non_empty_string("search.origin_region", &self.origin_region)?;
        validation::validate_catalog_members(
            "search.target_departments",
            &self.target_departments,
            catalog::TARGET_DEPARTMENTS,
        )?;
        validation::validate_catalog_members(
            "search.target_regions",
            &self.target_regions,
            catalog::INTERNATIONAL_REGIONS,
        )?;
        validation::validate_catalog_members("search.platforms", &self.platforms, catalog::PLATFORMS_OF_INTEREST)?;
        validation::validate_catalog_members(
            "search.sales_territories",
            &self.sales_territories,
            catalog::SALES_TERRITORIES,
        )?;
        Ok(())
    }
}

/// Split a newline-separated list of names, dropping blank lines.
pub fn split_name_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_lead(name: &str, score: u32) -> Lead {
    Lead {
        company_name: name.to_string(),
        category: "SaaS".to_string(),
        company_linked_in: NOT_AVAILABLE.to_string(),
        justification: "Opened a UK office".to_string(),
        email: "info@example.com".to_string(),
        phone: NOT_AVAILABLE.to_string(),
        lead_score: score,
        outreach_suggestion: NOT_AVAILABLE.to_string(),
        employee_count: "51-200".to_string(),
        latest_funding: NOT_AVAILABLE.to_string(),
        tech_stack: vec![],
        competitors: vec!["Rival One".to_string(), "Rival Two".to_string()],
        latest_news: NewsArticle::placeholder(),
        latest_international_news: NewsArticle::placeholder(),
        outreach_sequence: None,
        competitor_analysis: None,
        swot_analysis: None,
        contacts: vec![Contact {
            contact_name: "Asha Rao".to_string(),
            designation: "Head of International Marketing".to_string(),
            contact_linked_in: "https://www.linkedin.com/in/asha-rao".to_string(),
            talking_points: None,
            verification_status: VerificationStatus::Unverified,
            verification_log: None,
        }],
        platform_presence: vec![],
        verification_status: VerificationStatus::Unverified,
        verification_report: None,
    }
}
