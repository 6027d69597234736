//! Best-effort recovery of structured data from model output.
//!
//! Models asked for "JSON only" still wrap answers in markdown fences, prefix
//! them with prose, or drop and mistype fields. Everything that leaves this
//! module has the stable shape of the domain records, with `N/A` standing in
//! for whatever the model left out.

use crate::domain::model::{
    Contact, Lead, LeadVerification, NewsArticle, OutreachStep, VerificationStatus, NOT_AVAILABLE,
    PROFILE_NOT_FOUND,
};
use crate::utils::error::{LeadError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("fence pattern is valid"))
}

fn bullet_regex() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    BULLET.get_or_init(|| Regex::new(r"^(?:[-*•]\s*|\d+[.)]\s+)").expect("bullet pattern is valid"))
}

/// Narrow `text` to the candidate JSON payload delimited by `open`/`close`.
///
/// A fenced code block wins; otherwise the span from the first `open` to the
/// last `close` is taken when the two appear in order.
fn locate_json(text: &str, open: char, close: char) -> &str {
    let trimmed = text.trim();

    if let Some(body) = fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        if !body.as_str().is_empty() {
            return body.as_str().trim();
        }
    }

    match (trimmed.find(open), trimmed.rfind(close)) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].trim(),
        _ => trimmed,
    }
}

fn extract_delimited<'a>(text: &'a str, open: char, close: char, shape: &str) -> Result<&'a str> {
    let candidate = locate_json(text, open, close);
    if candidate.starts_with(open) && candidate.ends_with(close) {
        Ok(candidate)
    } else {
        tracing::debug!("Could not find a JSON {} in model output: {}", shape, text);
        Err(LeadError::MalformedResponse {
            message: format!("Could not find a JSON {}.", shape),
        })
    }
}

pub fn extract_json_array(text: &str) -> Result<&str> {
    extract_delimited(text, '[', ']', "array")
}

pub fn extract_json_object(text: &str) -> Result<&str> {
    extract_delimited(text, '{', '}', "object")
}

fn parse_json(candidate: &str) -> Result<Value> {
    serde_json::from_str(candidate).map_err(|e| LeadError::ResponseParseError {
        message: e.to_string(),
    })
}

/// String value of `key`, or `None` when missing, blank or not scalar.
fn non_empty_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_or(obj: &Map<String, Value>, key: &str, placeholder: &str) -> String {
    non_empty_string(obj, key).unwrap_or_else(|| placeholder.to_string())
}

/// Lead score clamped to 0..=100; unusable values become 0.
fn score(value: Option<&Value>) -> u32 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u32,
        _ => 0,
    }
}

/// Coerce a list-ish value into strings.
///
/// Arrays keep only their string items, a non-empty string is treated as a
/// comma-separated list, anything else is empty.
pub fn ensure_string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn news(value: Option<&Value>) -> NewsArticle {
    let Some(obj) = value.and_then(Value::as_object) else {
        return NewsArticle::placeholder();
    };
    match obj.get("url").and_then(Value::as_str) {
        Some(url) => NewsArticle {
            title: string_or(obj, "title", NOT_AVAILABLE),
            url: url.to_string(),
        },
        None => NewsArticle::placeholder(),
    }
}

fn outreach_sequence(value: Option<&Value>) -> Option<Vec<OutreachStep>> {
    let items = value?.as_array()?;
    let steps = items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let step = obj.get("step")?.as_f64()?;
            let subject = obj.get("subject")?.as_str().filter(|s| !s.is_empty())?;
            let body = obj.get("body")?.as_str().filter(|s| !s.is_empty())?;
            Some(OutreachStep {
                step: step.max(0.0) as u32,
                subject: subject.to_string(),
                body: body.to_string(),
            })
        })
        .collect();
    Some(steps)
}

fn contacts(value: Option<&Value>) -> Vec<Contact> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| Contact {
            contact_name: string_or(obj, "contactName", NOT_AVAILABLE),
            designation: string_or(obj, "designation", NOT_AVAILABLE),
            contact_linked_in: string_or(obj, "contactLinkedIn", PROFILE_NOT_FOUND),
            talking_points: None,
            verification_status: VerificationStatus::Unverified,
            verification_log: None,
        })
        .collect()
}

/// Normalize one lead object into the stable record shape.
pub fn sanitize_lead(obj: &Map<String, Value>) -> Lead {
    Lead {
        company_name: string_or(obj, "companyName", NOT_AVAILABLE),
        category: string_or(obj, "category", NOT_AVAILABLE),
        company_linked_in: string_or(obj, "companyLinkedIn", NOT_AVAILABLE),
        justification: string_or(obj, "justification", NOT_AVAILABLE),
        email: string_or(obj, "email", NOT_AVAILABLE),
        phone: string_or(obj, "phone", NOT_AVAILABLE),
        lead_score: score(obj.get("leadScore")),
        outreach_suggestion: string_or(obj, "outreachSuggestion", NOT_AVAILABLE),
        employee_count: string_or(obj, "employeeCount", NOT_AVAILABLE),
        latest_funding: string_or(obj, "latestFunding", NOT_AVAILABLE),
        tech_stack: ensure_string_array(obj.get("techStack")),
        competitors: ensure_string_array(obj.get("competitors")),
        latest_news: news(obj.get("latestNews")),
        latest_international_news: news(obj.get("latestInternationalNews")),
        outreach_sequence: outreach_sequence(obj.get("outreachSequence")),
        competitor_analysis: None,
        swot_analysis: obj
            .get("swotAnalysis")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        contacts: contacts(obj.get("contacts")),
        platform_presence: ensure_string_array(obj.get("platformPresence")),
        verification_status: VerificationStatus::Unverified,
        verification_report: None,
    }
}

/// Extract and normalize the lead array from a lead-search response.
pub fn parse_leads(text: &str) -> Result<Vec<Lead>> {
    let candidate = extract_json_array(text)?;
    let value = parse_json(candidate)?;

    let Value::Array(items) = value else {
        return Err(LeadError::MalformedResponse {
            message: "Top-level JSON value is not an array.".to_string(),
        });
    };

    let total = items.len();
    let leads: Vec<Lead> = items
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(obj) => Some(sanitize_lead(obj)),
            None => {
                tracing::warn!("Skipping non-object entry in lead array: {}", item);
                None
            }
        })
        .collect();

    tracing::debug!("Sanitized {} of {} lead entries", leads.len(), total);
    Ok(leads)
}

/// Text of one talking-point entry: a string, or the first string inside an object.
fn talking_point_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.values().find_map(|v| v.as_str().filter(|s| !s.trim().is_empty())),
        _ => None,
    }?;
    Some(text.trim().to_string()).filter(|point| !point.is_empty())
}

/// Talking points from a JSON array, falling back to one point per line.
///
/// The line fallback also covers arrays that yield no usable text.
pub fn parse_talking_points(text: &str) -> Vec<String> {
    let from_json: Vec<String> = extract_json_array(text)
        .ok()
        .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .and_then(|value| match value {
            Value::Array(items) => Some(items.iter().filter_map(talking_point_text).collect()),
            _ => None,
        })
        .unwrap_or_default();

    if !from_json.is_empty() {
        return from_json;
    }

    tracing::debug!("No talking points in JSON form, splitting lines instead");
    text.lines()
        .map(|line| bullet_regex().replace(line.trim(), "").trim().to_string())
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with("```")
                && !line.chars().all(|c| "[]{}, ".contains(c))
        })
        .collect()
}

/// Parse the object returned for a verification request.
pub fn parse_verification(text: &str) -> Result<LeadVerification> {
    let candidate = extract_json_object(text)?;
    let value = parse_json(candidate)?;
    let Some(obj) = value.as_object() else {
        return Err(LeadError::MalformedResponse {
            message: "Top-level JSON value is not an object.".to_string(),
        });
    };

    // "N/A" means the detail could not be confirmed, so keep what we have.
    let confirmed = |key: &str| non_empty_string(obj, key).filter(|v| v != NOT_AVAILABLE);

    let verified = match obj.get("verified") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };

    Ok(LeadVerification {
        email: confirmed("email"),
        phone: confirmed("phone"),
        company_linked_in: confirmed("companyLinkedIn"),
        verified,
        report: string_or(obj, "report", "No verification report returned."),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_array_from_fenced_block() {
        let text = "Here you go:\n```json\n[{\"companyName\": \"Acme\"}]\n```\nThanks";
        assert_eq!(extract_json_array(text).unwrap(), "[{\"companyName\": \"Acme\"}]");
    }

    #[test]
    fn test_extract_array_from_plain_fence() {
        let text = "```\n[1, 2]\n```";
        assert_eq!(extract_json_array(text).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_extract_array_from_surrounding_prose() {
        let text = "Based on my research [see below]: [{\"a\": 1}] Let me know!";
        // First '[' to last ']' includes the prose bracket; parsing will reject it.
        assert_eq!(
            extract_json_array(text).unwrap(),
            "[see below]: [{\"a\": 1}]"
        );
        assert!(matches!(
            parse_leads(text),
            Err(LeadError::ResponseParseError { .. })
        ));
    }

    #[test]
    fn test_extract_array_missing() {
        let err = extract_json_array("I could not find any companies.").unwrap_err();
        assert!(matches!(err, LeadError::MalformedResponse { .. }));
        assert!(err.to_string().contains("Could not find a JSON array"));
    }

    #[test]
    fn test_extract_array_with_reversed_brackets() {
        assert!(extract_json_array("] nothing here [").is_err());
    }

    #[test]
    fn test_extract_object() {
        let text = "Result:\n{\"verified\": true}\n";
        assert_eq!(extract_json_object(text).unwrap(), "{\"verified\": true}");
    }

    #[test]
    fn test_parse_leads_fills_placeholders() {
        let text = r#"[{"companyName": "Acme Exports", "leadScore": 87.6, "email": ""}]"#;
        let leads = parse_leads(text).unwrap();

        assert_eq!(leads.len(), 1);
        let lead = &leads[0];
        assert_eq!(lead.company_name, "Acme Exports");
        assert_eq!(lead.lead_score, 88);
        assert_eq!(lead.email, NOT_AVAILABLE);
        assert_eq!(lead.category, NOT_AVAILABLE);
        assert_eq!(lead.latest_news, NewsArticle::placeholder());
        assert!(lead.contacts.is_empty());
        assert!(lead.outreach_sequence.is_none());
        assert!(lead.competitor_analysis.is_none());
    }

    #[test]
    fn test_parse_leads_full_record() {
        let text = json!([{
            "companyName": "Acme Exports",
            "category": "Manufacturing",
            "companyLinkedIn": "https://www.linkedin.com/company/acme",
            "justification": "Opened a Dubai office in 2024",
            "email": "sales@acme.in",
            "phone": "+91 22 5555 0100",
            "leadScore": 82,
            "outreachSuggestion": "Congrats on Dubai!",
            "employeeCount": "201-500",
            "latestFunding": "N/A",
            "techStack": ["SAP", 42, "AWS"],
            "competitors": "Globex, Initech, ",
            "latestNews": {"title": "Acme expands", "url": "https://news.example/acme"},
            "latestInternationalNews": {"title": "No link"},
            "swotAnalysis": "**Strengths:**\n- Export network",
            "platformPresence": ["Digital"],
            "contacts": [
                {"contactName": "Asha Rao", "designation": "CMO", "contactLinkedIn": "https://linkedin.com/in/asha", "talkingPoints": ["stale"]},
                "not a contact",
                {"contactName": "Vikram Shah", "designation": "COO"}
            ],
            "outreachSequence": [
                {"step": 1, "subject": "Hello", "body": "Intro"},
                {"step": "2", "subject": "Bad step", "body": "x"},
                {"step": 3, "subject": "", "body": "Empty subject"},
                {"step": 2, "subject": "Follow up", "body": "Checking in"}
            ]
        }])
        .to_string();

        let leads = parse_leads(&text).unwrap();
        let lead = &leads[0];

        assert_eq!(lead.tech_stack, vec!["SAP", "AWS"]);
        assert_eq!(lead.competitors, vec!["Globex", "Initech"]);
        assert_eq!(lead.latest_news.url, "https://news.example/acme");
        assert_eq!(lead.latest_international_news, NewsArticle::placeholder());
        assert_eq!(lead.platform_presence, vec!["Digital"]);
        assert_eq!(lead.swot_analysis.as_deref(), Some("**Strengths:**\n- Export network"));

        assert_eq!(lead.contacts.len(), 2);
        assert!(lead.contacts[0].talking_points.is_none());
        assert_eq!(lead.contacts[1].contact_linked_in, PROFILE_NOT_FOUND);

        let steps = lead.outreach_sequence.as_ref().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].subject, "Hello");
        assert_eq!(steps[1].step, 2);
    }

    #[test]
    fn test_score_coercion() {
        assert_eq!(score(Some(&json!(150))), 100);
        assert_eq!(score(Some(&json!(-5))), 0);
        assert_eq!(score(Some(&json!("72"))), 72);
        assert_eq!(score(Some(&json!("85%"))), 85);
        assert_eq!(score(Some(&json!("high"))), 0);
        assert_eq!(score(None), 0);
    }

    #[test]
    fn test_numeric_fields_are_stringified() {
        let leads = parse_leads(r#"[{"companyName": "Acme", "employeeCount": 250}]"#).unwrap();
        assert_eq!(leads[0].employee_count, "250");
    }

    #[test]
    fn test_parse_leads_skips_non_objects() {
        let leads = parse_leads(r#"[null, "Acme", {"companyName": "Globex"}]"#).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].company_name, "Globex");
    }

    #[test]
    fn test_parse_leads_invalid_json() {
        let err = parse_leads("[{\"companyName\": \"Acme\",]").unwrap_err();
        assert!(matches!(err, LeadError::ResponseParseError { .. }));
    }

    #[test]
    fn test_parse_leads_empty_array() {
        assert!(parse_leads("```json\n[]\n```").unwrap().is_empty());
    }

    #[test]
    fn test_ensure_string_array_variants() {
        assert_eq!(ensure_string_array(Some(&json!(["a", 1, "b"]))), vec!["a", "b"]);
        assert_eq!(ensure_string_array(Some(&json!(" a , b,,c "))), vec!["a", "b", "c"]);
        assert!(ensure_string_array(Some(&json!(""))).is_empty());
        assert!(ensure_string_array(Some(&json!({"a": 1}))).is_empty());
        assert!(ensure_string_array(None).is_empty());
    }

    #[test]
    fn test_talking_points_from_json() {
        let text = "```json\n[\"Point one\", \"  Point two \", 3]\n```";
        assert_eq!(parse_talking_points(text), vec!["Point one", "Point two"]);
    }

    #[test]
    fn test_talking_points_fall_back_to_lines() {
        let text = "- First point\n\n* Second point\n3. Third point\nFourth point";
        assert_eq!(
            parse_talking_points(text),
            vec!["First point", "Second point", "Third point", "Fourth point"]
        );
    }

    #[test]
    fn test_talking_points_invalid_json_falls_back() {
        let text = "[Not, json]";
        assert_eq!(parse_talking_points(text), vec!["[Not, json]"]);
    }

    #[test]
    fn test_talking_points_keep_leading_numbers() {
        let text = "3.5x growth in UAE exports\n2024 revenue doubled\n1.Launch in Dubai";
        assert_eq!(
            parse_talking_points(text),
            vec!["3.5x growth in UAE exports", "2024 revenue doubled", "1.Launch in Dubai"]
        );
    }

    #[test]
    fn test_talking_points_from_object_items() {
        let text = r#"[{"point": "Saw your talk at SaaSBoomi"}, {"point": "  "}, {"text": "Dubai office launch"}]"#;
        assert_eq!(
            parse_talking_points(text),
            vec!["Saw your talk at SaaSBoomi", "Dubai office launch"]
        );
    }

    #[test]
    fn test_talking_points_empty_array_yields_nothing() {
        assert!(parse_talking_points("```json\n[]\n```").is_empty());
        assert!(parse_talking_points("[\n]").is_empty());
        assert!(parse_talking_points("[ ]").is_empty());
    }

    #[test]
    fn test_parse_verification() {
        let text = r#"```json
{"email": "sales@acme.in", "phone": "N/A", "companyLinkedIn": "", "verified": true, "report": "Email confirmed."}
```"#;
        let verification = parse_verification(text).unwrap();
        assert_eq!(verification.email.as_deref(), Some("sales@acme.in"));
        assert!(verification.phone.is_none());
        assert!(verification.company_linked_in.is_none());
        assert!(verification.verified);
        assert_eq!(verification.report, "Email confirmed.");
    }

    #[test]
    fn test_parse_verification_defaults_to_unverified() {
        let verification = parse_verification("{\"report\": \"Company not found\"}").unwrap();
        assert!(!verification.verified);
    }
}
