use crate::domain::model::{Contact, Lead, VerificationStatus};
use crate::domain::ports::Storage;
use crate::utils::error::{LeadError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered collection of leads, newest search results first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadBook {
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeadBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn contains(&self, company_name: &str) -> bool {
        self.leads.iter().any(|l| l.matches_name(company_name))
    }

    /// Put freshly generated leads ahead of the existing ones.
    pub fn prepend(&mut self, mut new_leads: Vec<Lead>) {
        new_leads.append(&mut self.leads);
        self.leads = new_leads;
        self.touch();
    }

    pub fn clear(&mut self) {
        self.leads.clear();
        self.touch();
    }

    pub fn find(&self, company_name: &str) -> Result<&Lead> {
        self.leads
            .iter()
            .find(|l| l.matches_name(company_name))
            .ok_or_else(|| LeadError::LeadNotFound {
                name: company_name.to_string(),
            })
    }

    pub fn find_mut(&mut self, company_name: &str) -> Result<&mut Lead> {
        self.leads
            .iter_mut()
            .find(|l| l.matches_name(company_name))
            .ok_or_else(|| LeadError::LeadNotFound {
                name: company_name.to_string(),
            })
    }

    pub fn find_contact(&self, company_name: &str, contact_name: &str) -> Result<(&Lead, &Contact)> {
        let lead = self.find(company_name)?;
        let contact = lead
            .contacts
            .iter()
            .find(|c| c.matches_name(contact_name))
            .ok_or_else(|| LeadError::ContactNotFound {
                company: lead.company_name.clone(),
                contact: contact_name.to_string(),
            })?;
        Ok((lead, contact))
    }

    /// Leads by descending score; ties keep book order.
    pub fn ranked(&self) -> Vec<&Lead> {
        let mut ranked: Vec<&Lead> = self.leads.iter().collect();
        ranked.sort_by(|a, b| b.lead_score.cmp(&a.lead_score));
        ranked
    }

    pub fn set_status(&mut self, company_name: &str, status: VerificationStatus) -> Result<()> {
        self.find_mut(company_name)?.verification_status = status;
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Drop candidates that repeat the seed company or a lead already in the book.
pub fn unique_lookalikes(candidates: Vec<Lead>, seed: &Lead, existing: &[Lead]) -> Vec<Lead> {
    candidates
        .into_iter()
        .filter(|candidate| {
            !candidate.matches_name(&seed.company_name)
                && !existing
                    .iter()
                    .any(|lead| lead.matches_name(&candidate.company_name))
        })
        .collect()
}

/// JSON persistence of a [`LeadBook`] through a [`Storage`] backend.
pub struct LeadBookStore<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> LeadBookStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Load the book; a missing file is an empty book.
    pub async fn load(&self) -> Result<LeadBook> {
        match self.storage.read_file(&self.path).await {
            Ok(bytes) => {
                let book: LeadBook = serde_json::from_slice(&bytes)?;
                tracing::debug!("Loaded {} leads from {}", book.len(), self.path);
                Ok(book)
            }
            Err(LeadError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No lead book at {}, starting empty", self.path);
                Ok(LeadBook::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, book: &LeadBook) -> Result<()> {
        let data = serde_json::to_vec_pretty(book)?;
        self.storage.write_file(&self.path, &data).await?;
        tracing::debug!("Saved {} leads to {}", book.len(), self.path);
        Ok(())
    }
}
