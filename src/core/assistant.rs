use crate::core::lead_book::{unique_lookalikes, LeadBook, LeadBookStore};
use crate::core::{prompt, sanitize};
use crate::domain::model::{Contact, Lead, LeadVerification, MarketReport, SearchCriteria, VerificationStatus};
use crate::domain::ports::{GenerationRequest, GenerativeModel, Storage};
use crate::utils::error::{LeadError, Result};

/// Model names and thinking budgets used for each kind of request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub lead_model: String,
    pub analysis_model: String,
    pub competitor_thinking_budget: u32,
    pub talking_points_thinking_budget: u32,
    pub market_report_thinking_budget: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            lead_model: "gemini-3-flash-preview".to_string(),
            analysis_model: "gemini-3-pro-preview".to_string(),
            competitor_thinking_budget: 12_000,
            talking_points_thinking_budget: 4_000,
            market_report_thinking_budget: 24_000,
        }
    }
}

/// Summary of a batch verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    pub verified: usize,
    pub unconfirmed: usize,
    pub failed: usize,
}

/// One method per user action; each issues a single model call.
pub struct LeadAssistant<M: GenerativeModel> {
    model: M,
    settings: ModelSettings,
}

impl<M: GenerativeModel> LeadAssistant<M> {
    pub fn new(model: M, settings: ModelSettings) -> Self {
        Self { model, settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub async fn generate_leads(&self, criteria: &SearchCriteria) -> Result<Vec<Lead>> {
        let request = GenerationRequest::new(
            &self.settings.lead_model,
            prompt::build_lead_prompt(criteria),
        )
        .with_system_instruction(prompt::LEAD_SYSTEM_INSTRUCTION);

        tracing::info!(
            "Searching for leads (client: '{}', category: '{}')",
            criteria.client_name,
            criteria.client_category
        );
        let response = self.model.generate(request).await?;
        let leads = sanitize::parse_leads(&response.text)?;
        tracing::info!("Model returned {} leads", leads.len());
        Ok(leads)
    }

    /// Search for leads and prepend them to the stored lead book.
    ///
    /// The book is loaded before the model is called, so an unreadable book
    /// fails without spending a search.
    pub async fn generate_into_store<S: Storage>(
        &self,
        store: &LeadBookStore<S>,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Lead>> {
        let mut book = store.load().await?;
        let leads = self.generate_leads(criteria).await?;
        book.prepend(leads.clone());
        store.save(&book).await?;
        Ok(leads)
    }

    /// Companies similar to `seed`, minus the seed and anything in `existing`.
    pub async fn find_lookalikes(
        &self,
        criteria: &SearchCriteria,
        seed: &Lead,
        existing: &[Lead],
    ) -> Result<Vec<Lead>> {
        let lookalike_criteria = criteria.lookalike_of(seed);
        let candidates = self.generate_leads(&lookalike_criteria).await?;
        let total = candidates.len();
        let unique = unique_lookalikes(candidates, seed, existing);
        tracing::debug!(
            "Kept {} of {} lookalike candidates for {}",
            unique.len(),
            total,
            seed.company_name
        );
        Ok(unique)
    }

    pub async fn competitor_analysis(&self, lead: &Lead) -> Result<String> {
        let request = GenerationRequest::new(
            &self.settings.analysis_model,
            prompt::build_competitor_prompt(lead),
        )
        .with_thinking_budget(self.settings.competitor_thinking_budget);

        tracing::info!("Building battle card for {}", lead.company_name);
        let response = self.model.generate(request).await?;
        non_empty(response.text)
    }

    pub async fn talking_points(&self, contact: &Contact, company_name: &str) -> Result<Vec<String>> {
        let request = GenerationRequest::new(
            &self.settings.lead_model,
            prompt::build_talking_points_prompt(contact, company_name),
        )
        .with_thinking_budget(self.settings.talking_points_thinking_budget);

        tracing::info!(
            "Drafting talking points for {} at {}",
            contact.contact_name,
            company_name
        );
        let response = self.model.generate(request).await?;
        Ok(sanitize::parse_talking_points(&response.text))
    }

    pub async fn market_report(&self, industry: &str, region: &str) -> Result<MarketReport> {
        let request = GenerationRequest::new(
            &self.settings.analysis_model,
            prompt::build_market_report_prompt(industry, region),
        )
        .with_thinking_budget(self.settings.market_report_thinking_budget);

        tracing::info!("Generating market report: {} -> {}", industry, region);
        let response = self.model.generate(request).await?;
        Ok(MarketReport {
            industry: industry.to_string(),
            region: region.to_string(),
            text: non_empty(response.text)?,
            sources: response.sources,
        })
    }

    pub async fn verify_lead(&self, lead: &Lead) -> Result<LeadVerification> {
        let request = GenerationRequest::new(
            &self.settings.lead_model,
            prompt::build_verification_prompt(lead),
        )
        .with_system_instruction(prompt::VERIFICATION_SYSTEM_INSTRUCTION);

        tracing::info!("Verifying contact details for {}", lead.company_name);
        let response = self.model.generate(request).await?;
        sanitize::parse_verification(&response.text)
    }

    /// Verify the named leads one after another, updating the book in place.
    ///
    /// Names resolving to the same lead are verified once. A failed call marks only that lead as failed; the run continues.
    pub async fn verify_in_book(
        &self,
        book: &mut LeadBook,
        company_names: &[String],
    ) -> Result<VerificationSummary> {
        let mut targets = Vec::with_capacity(company_names.len());
        for name in company_names {
            let lead = book.find_mut(name)?;
            if targets.contains(&lead.company_name) {
                continue;
            }
            lead.verification_status = VerificationStatus::Verifying;
            targets.push(lead.company_name.clone());
        }
        book.touch();

        let mut summary = VerificationSummary::default();
        for name in &targets {
            let snapshot = book.find(name)?.clone();
            match self.verify_lead(&snapshot).await {
                Ok(verification) => {
                    if verification.verified {
                        summary.verified += 1;
                    } else {
                        summary.unconfirmed += 1;
                    }
                    book.find_mut(name)?.apply_verification(verification);
                }
                Err(e) => {
                    tracing::error!("Verification failed for {}: {}", name, e);
                    summary.failed += 1;
                    book.set_status(name, VerificationStatus::Failed)?;
                }
            }
        }
        book.touch();
        Ok(summary)
    }

    /// Attach a battle card to the named lead unless it already has one.
    ///
    /// Returns `true` when a new analysis was generated.
    pub async fn analyze_in_book(&self, book: &mut LeadBook, company_name: &str) -> Result<bool> {
        let lead = book.find(company_name)?;
        if lead.competitor_analysis.is_some() {
            tracing::debug!("{} already has a battle card", lead.company_name);
            return Ok(false);
        }
        let analysis = self.competitor_analysis(lead).await?;
        book.find_mut(company_name)?.competitor_analysis = Some(analysis);
        book.touch();
        Ok(true)
    }

    /// Attach talking points to a contact unless it already has them.
    ///
    /// Returns `true` when new points were generated.
    pub async fn talking_points_in_book(
        &self,
        book: &mut LeadBook,
        company_name: &str,
        contact_name: &str,
    ) -> Result<bool> {
        let (lead, contact) = book.find_contact(company_name, contact_name)?;
        if contact.talking_points.as_ref().is_some_and(|points| !points.is_empty()) {
            tracing::debug!("{} already has talking points", contact.contact_name);
            return Ok(false);
        }
        let points = self.talking_points(contact, &lead.company_name).await?;
        if points.is_empty() {
            return Err(LeadError::EmptyResponse);
        }

        let lead = book.find_mut(company_name)?;
        let company = lead.company_name.clone();
        let contact = lead
            .find_contact_mut(contact_name)
            .ok_or_else(|| LeadError::ContactNotFound {
                company,
                contact: contact_name.to_string(),
            })?;
        contact.talking_points = Some(points);
        book.touch();
        Ok(true)
    }
}

fn non_empty(text: String) -> Result<String> {
    if text.trim().is_empty() {
        Err(LeadError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::{sample_lead, GroundingSource};
    use crate::domain::ports::GenerationResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned replies and records every request it receives.
    #[derive(Clone)]
    struct ScriptedModel {
        replies: Arc<Mutex<VecDeque<Result<GenerationResponse>>>>,
        requests: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<GenerationResponse>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn text(replies: &[&str]) -> Self {
            Self::new(
                replies
                    .iter()
                    .map(|t| {
                        Ok(GenerationResponse {
                            text: t.to_string(),
                            sources: vec![],
                        })
                    })
                    .collect(),
            )
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LeadError::EmptyResponse))
        }
    }

    fn assistant(model: ScriptedModel) -> LeadAssistant<ScriptedModel> {
        LeadAssistant::new(model, ModelSettings::default())
    }

    #[tokio::test]
    async fn test_generate_leads_uses_lead_model_and_system_instruction() {
        let model = ScriptedModel::text(&["```json\n[{\"companyName\": \"Acme\", \"leadScore\": 91}]\n```"]);
        let assistant = assistant(model.clone());

        let leads = assistant
            .generate_leads(&SearchCriteria::default())
            .await
            .unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].lead_score, 91);

        let requests = model.requests();
        assert_eq!(requests[0].model, "gemini-3-flash-preview");
        assert!(requests[0].web_search);
        assert_eq!(
            requests[0].system_instruction.as_deref(),
            Some(prompt::LEAD_SYSTEM_INSTRUCTION)
        );
        assert!(requests[0].thinking_budget.is_none());
    }

    #[tokio::test]
    async fn test_generate_leads_surfaces_format_errors() {
        let assistant = assistant(ScriptedModel::text(&["Sorry, I could not help with that."]));
        let err = assistant
            .generate_leads(&SearchCriteria::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LeadError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_lookalikes_filter_seed_and_existing() {
        let model = ScriptedModel::text(&[
            r#"[{"companyName": "Acme"}, {"companyName": "Globex"}, {"companyName": "Initech"}]"#,
        ]);
        let assistant = assistant(model.clone());
        let seed = sample_lead("Acme", 80);
        let existing = vec![seed.clone(), sample_lead("Globex", 60)];

        let leads = assistant
            .find_lookalikes(&SearchCriteria::default(), &seed, &existing)
            .await
            .unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].company_name, "Initech");
        assert!(model.requests()[0]
            .prompt
            .contains("similar to \"Acme\" in business model and category"));
    }

    #[tokio::test]
    async fn test_competitor_analysis_uses_analysis_model() {
        let model = ScriptedModel::text(&["## Battle card"]);
        let assistant = assistant(model.clone());

        let text = assistant
            .competitor_analysis(&sample_lead("Acme", 80))
            .await
            .unwrap();

        assert_eq!(text, "## Battle card");
        let request = &model.requests()[0];
        assert_eq!(request.model, "gemini-3-pro-preview");
        assert_eq!(request.thinking_budget, Some(12_000));
        assert!(request.system_instruction.is_none());
    }

    #[tokio::test]
    async fn test_empty_analysis_is_an_error() {
        let assistant = assistant(ScriptedModel::text(&["   "]));
        let err = assistant
            .competitor_analysis(&sample_lead("Acme", 80))
            .await
            .unwrap_err();
        assert!(matches!(err, LeadError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_market_report_keeps_sources() {
        let model = ScriptedModel::new(vec![Ok(GenerationResponse {
            text: "# Report".to_string(),
            sources: vec![GroundingSource {
                title: "Trade stats".to_string(),
                uri: "https://stats.example".to_string(),
            }],
        })]);
        let assistant = assistant(model.clone());

        let report = assistant.market_report("Fintech", "MENA").await.unwrap();

        assert_eq!(report.text, "# Report");
        assert_eq!(report.sources.len(), 1);
        assert_eq!(model.requests()[0].thinking_budget, Some(24_000));
    }

    #[tokio::test]
    async fn test_verify_in_book_continues_after_failure() {
        let model = ScriptedModel::new(vec![
            Err(LeadError::ProviderError {
                status: 500,
                message: "boom".to_string(),
            }),
            Ok(GenerationResponse {
                text: r#"{"email": "hello@globex.in", "verified": true, "report": "ok"}"#.to_string(),
                sources: vec![],
            }),
        ]);
        let assistant = assistant(model);
        let mut book = LeadBook::new();
        book.prepend(vec![sample_lead("Acme", 80), sample_lead("Globex", 70)]);

        let summary = assistant
            .verify_in_book(&mut book, &["acme".to_string(), "Globex".to_string()])
            .await
            .unwrap();

        assert_eq!(
            summary,
            VerificationSummary {
                verified: 1,
                unconfirmed: 0,
                failed: 1
            }
        );
        assert_eq!(book.find("Acme").unwrap().verification_status, VerificationStatus::Failed);
        let globex = book.find("Globex").unwrap();
        assert_eq!(globex.verification_status, VerificationStatus::Verified);
        assert_eq!(globex.email, "hello@globex.in");
    }

    #[tokio::test]
    async fn test_verify_in_book_rejects_unknown_lead_before_calling() {
        let model = ScriptedModel::text(&[]);
        let assistant = assistant(model.clone());
        let mut book = LeadBook::new();

        let err = assistant
            .verify_in_book(&mut book, &["Nobody".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, LeadError::LeadNotFound { .. }));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_is_generated_once() {
        let model = ScriptedModel::text(&["## Card"]);
        let assistant = assistant(model.clone());
        let mut book = LeadBook::new();
        book.prepend(vec![sample_lead("Acme", 80)]);

        assert!(assistant.analyze_in_book(&mut book, "Acme").await.unwrap());
        assert!(!assistant.analyze_in_book(&mut book, "Acme").await.unwrap());
        assert_eq!(model.requests().len(), 1);
        assert_eq!(book.find("Acme").unwrap().competitor_analysis.as_deref(), Some("## Card"));
    }

    #[tokio::test]
    async fn test_talking_points_are_generated_once() {
        let model = ScriptedModel::text(&["[\"Saw your Dubai launch\"]"]);
        let assistant = assistant(model.clone());
        let mut book = LeadBook::new();
        book.prepend(vec![sample_lead("Acme", 80)]);

        assert!(assistant
            .talking_points_in_book(&mut book, "Acme", "Asha Rao")
            .await
            .unwrap());
        assert!(!assistant
            .talking_points_in_book(&mut book, "Acme", "asha rao")
            .await
            .unwrap());

        let request = &model.requests()[0];
        assert_eq!(request.thinking_budget, Some(4_000));
        let contact = &book.find("Acme").unwrap().contacts[0];
        assert_eq!(
            contact.talking_points.as_deref(),
            Some(&["Saw your Dubai launch".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_verify_in_book_checks_each_lead_once() {
        let model = ScriptedModel::text(&[
            r#"{"verified": true, "report": "ok"}"#,
            r#"{"verified": true, "report": "ok again"}"#,
        ]);
        let assistant = assistant(model.clone());
        let mut book = LeadBook::new();
        book.prepend(vec![sample_lead("Acme", 80)]);

        let summary = assistant
            .verify_in_book(
                &mut book,
                &["Acme".to_string(), "acme".to_string(), " ACME ".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(model.requests().len(), 1);
        assert_eq!(
            summary,
            VerificationSummary {
                verified: 1,
                unconfirmed: 0,
                failed: 0
            }
        );
        assert_eq!(book.find("Acme").unwrap().verification_report.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_empty_talking_points_are_not_cached() {
        let model = ScriptedModel::text(&["[]", r#"[{"point": "Saw your SaaSBoomi talk"}]"#]);
        let assistant = assistant(model.clone());
        let mut book = LeadBook::new();
        book.prepend(vec![sample_lead("Acme", 80)]);

        let err = assistant
            .talking_points_in_book(&mut book, "Acme", "Asha Rao")
            .await
            .unwrap_err();
        assert!(matches!(err, LeadError::EmptyResponse));
        assert!(book.find("Acme").unwrap().contacts[0].talking_points.is_none());

        assert!(assistant
            .talking_points_in_book(&mut book, "Acme", "Asha Rao")
            .await
            .unwrap());
        assert_eq!(model.requests().len(), 2);
        assert_eq!(
            book.find("Acme").unwrap().contacts[0].talking_points.as_deref(),
            Some(&["Saw your SaaSBoomi talk".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_stored_empty_talking_points_are_regenerated() {
        let model = ScriptedModel::text(&[r#"["Dubai office launch"]"#]);
        let assistant = assistant(model.clone());
        let mut lead = sample_lead("Acme", 80);
        lead.contacts[0].talking_points = Some(Vec::new());
        let mut book = LeadBook::new();
        book.prepend(vec![lead]);

        assert!(assistant
            .talking_points_in_book(&mut book, "Acme", "Asha Rao")
            .await
            .unwrap());
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_into_store_prepends_and_saves() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = LeadBookStore::new(LocalStorage::new(temp_dir.path()), "leads.json");
        let mut book = LeadBook::new();
        book.prepend(vec![sample_lead("Acme", 80)]);
        store.save(&book).await.unwrap();

        let assistant = assistant(ScriptedModel::text(&[r#"[{"companyName": "Globex", "leadScore": 70}]"#]));
        let leads = assistant
            .generate_into_store(&store, &SearchCriteria::default())
            .await
            .unwrap();

        assert_eq!(leads.len(), 1);
        let saved = store.load().await.unwrap();
        let names: Vec<&str> = saved.leads.iter().map(|l| l.company_name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Acme"]);
    }

    #[tokio::test]
    async fn test_corrupt_book_fails_before_calling_the_model() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("leads.json"), b"{not json").unwrap();
        let store = LeadBookStore::new(LocalStorage::new(temp_dir.path()), "leads.json");

        let model = ScriptedModel::text(&[r#"[{"companyName": "Globex"}]"#]);
        let assistant = assistant(model.clone());
        let err = assistant
            .generate_into_store(&store, &SearchCriteria::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LeadError::SerializationError(_)));
        assert!(model.requests().is_empty());
    }
}
