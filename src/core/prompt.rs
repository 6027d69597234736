//! Prompt construction.
//!
//! Every builder here is a pure function of its inputs. The lead prompt is
//! assembled from four lettered sections:
//! - A: task description plus optional exclusion instructions
//! - B: which search methods the model should use
//! - C: the fields to gather for each company and the contact verification rules
//! - D: the required output shape (a bare JSON array)

use crate::domain::catalog;
use crate::domain::model::{Contact, Lead, SearchCriteria};

pub const LEAD_SYSTEM_INSTRUCTION: &str = "You are a world-class lead generation expert and sales strategist. Your purpose is to identify Indian companies showing strong potential for expanding into the International market. For each company, you must perform deep analysis to score the lead's quality and provide a personalized outreach suggestion. You must follow all instructions precisely and return data ONLY in the specified JSON array format.";

pub const VERIFICATION_SYSTEM_INSTRUCTION: &str = "You are a meticulous B2B data auditor. You check public company contact details against official sources and report only what you can confirm. Return data ONLY as the single JSON object requested.";

/// Trimmed, non-empty entries joined with `, `.
fn join_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn departments_text(criteria: &SearchCriteria) -> String {
    let departments = catalog::selected_in_order(catalog::TARGET_DEPARTMENTS, &criteria.target_departments);
    if departments.is_empty() {
        "any relevant".to_string()
    } else {
        departments.join(", ")
    }
}

fn territory_instruction(criteria: &SearchCriteria) -> Option<String> {
    let territories = catalog::selected_in_order(catalog::SALES_TERRITORIES, &criteria.sales_territories);
    // Selecting every zone is the same as not restricting at all.
    if territories.is_empty() || territories.len() >= catalog::SALES_TERRITORIES.len() {
        return None;
    }
    Some(format!(
        "The companies must be located in the following zones within India: {}.",
        territories.join(", ")
    ))
}

fn exclusion_instruction(criteria: &SearchCriteria) -> Option<String> {
    let excluded = join_names(&criteria.excluded_clients);
    if excluded.is_empty() {
        return None;
    }
    Some(format!(
        "**CRITICAL EXCLUSION LIST:** You MUST NOT include any of the following companies in your search results under any circumstances: {}.",
        excluded
    ))
}

fn agency_instruction(criteria: &SearchCriteria) -> Option<String> {
    let agencies = join_names(&criteria.agency_names);
    if agencies.is_empty() {
        return None;
    }
    Some(format!(
        "**AGENCY EXCLUSION:** Attempt to verify that the target companies are not current clients of the following agencies: {}. Prioritize leads that do not have a public relationship with these agencies.",
        agencies
    ))
}

fn task_description(criteria: &SearchCriteria) -> String {
    let regions = catalog::selected_in_order(catalog::INTERNATIONAL_REGIONS, &criteria.target_regions);
    let expansion_regions = if regions.is_empty() {
        String::new()
    } else {
        format!("into regions including {}", regions.join(", "))
    };

    let core_task = format!(
        "that either show strong potential for international expansion OR **already have established operations in international markets** {}. Your goal is to find companies that are prime candidates for international advertising campaigns. Therefore, prioritize companies with existing international offices, a significant international customer base, or active export activities.",
        expansion_regions
    );

    let startup = if criteria.target_startups {
        "Prioritize identifying startups that have recently started exporting or are advertising in international markets."
    } else {
        ""
    };
    let territory = territory_instruction(criteria).unwrap_or_default();

    let client = criteria.client_name.trim();
    let category = criteria.client_category.trim();
    let origin = criteria.origin_region.trim();

    let mut task = String::new();
    if !client.is_empty() {
        task.push_str(&format!(
            "Your primary task is a deep-dive investigation into the company \"{}\"",
            client
        ));
        if !category.is_empty() {
            task.push_str(&format!(" in the \"{}\" category", category));
        }
        task.push_str(&format!(", which is based in the \"{}\" region.", origin));
        if criteria.find_similar {
            task.push_str(&format!(
                " In addition to this, identify up to 5 other Indian companies that are similar to \"{}\" in business model and category, from the \"{}\" region, {} {} {}",
                client, origin, core_task, startup, territory
            ));
        }
    } else if !category.is_empty() {
        task.push_str(&format!(
            "Your primary task is to identify up to 5 Indian companies in the \"{}\" category, based in the \"{}\" region, {} {} {}",
            category, origin, core_task, startup, territory
        ));
    }

    task.push_str(&format!(
        " For all companies found, find contacts in the following departments: {}.",
        departments_text(criteria)
    ));
    task
}

fn search_methods(criteria: &SearchCriteria) -> String {
    let regions = catalog::selected_in_order(catalog::INTERNATIONAL_REGIONS, &criteria.target_regions);
    let search_regions = if regions.is_empty() {
        "internationally".to_string()
    } else {
        format!("in the {} regions", regions.join(", "))
    };

    let mut methods = String::from("#### B. Search Methods\n**Search Methods:**\n");
    let sources = &criteria.sources;

    if sources.web {
        methods.push_str("- In-depth Web Search: Conduct a thorough investigation. Look for official websites listing international offices or contact numbers. Search for press releases announcing market entry, partnerships with foreign companies, case studies featuring international clients, or participation in overseas industry events. This is more than a simple news search; it's a deep dive into the company's global footprint.\n");
    }
    if sources.linkedin {
        methods.push_str(&format!(
            "- LinkedIn: Scan for companies posting jobs in International markets, content targeted at an international audience, or having a significant number of employees located {}.\n",
            search_regions
        ));
    }
    let networks = sources.social_networks();
    if !networks.is_empty() {
        methods.push_str(&format!(
            "- Social Media Search: Scan latest posts from {} for recent news, product offers, or marketing campaigns that suggest an interest or readiness for international advertising.\n",
            networks.join(", ")
        ));
    }
    if sources.reddit {
        methods.push_str("- Reddit: Look for discussions in business, export and industry communities that mention the company's overseas customers, distributors or expansion plans.\n");
    }
    methods
}

fn platform_instruction(criteria: &SearchCriteria) -> String {
    let platforms = catalog::selected_in_order(catalog::PLATFORMS_OF_INTEREST, &criteria.platforms);
    if platforms.is_empty() {
        return "- platformPresence: Return an empty array.".to_string();
    }
    format!(
        "- platformPresence: An array of strings indicating which of the following platforms the company has a notable presence on: {}. Check for significant advertising, news coverage, or official channels. If no presence on any of the specified platforms, return an empty array.",
        platforms.join(", ")
    )
}

fn email_instruction(criteria: &SearchCriteria) -> &'static str {
    if criteria.generate_email {
        "- outreachSequence: An array of 3 email objects for an outreach sequence, ready to be stringified. Each object in the array MUST contain these keys: 'step' (a number, 1, 2, or 3), 'subject' (a string), and 'body' (a string). Step 1 is the initial outreach using the 'outreachSuggestion' and 'justification'. Step 2 is a polite, short follow-up assuming no reply after 3 days. Step 3 is a final, value-add follow-up after 7 days, perhaps linking to a relevant article or case study. The emails should be addressed to the primary contact you've identified."
    } else {
        "- outreachSequence: This field must be EXCLUDED from the response. Do not generate it."
    }
}

/// Full lead-research instruction for the given criteria.
pub fn build_lead_prompt(criteria: &SearchCriteria) -> String {
    let departments = departments_text(criteria);
    let exclusion = exclusion_instruction(criteria).unwrap_or_default();
    let agency = agency_instruction(criteria).unwrap_or_default();

    format!(
        r#"
#### A. Task Description
{task}

{exclusion}

{agency}

{methods}
#### C. Data Gathering & Verification Rules
**Data Gathering Rules:**
**For each identified company:**
1.  **Company Info & Deep-Dive Analysis:**
    - companyName: Official name.
    - companyLinkedIn: Full LinkedIn URL.
    - category: Company's industry.
    - email: MANDATORY. Find a public contact email (e.g., contact@, info@, sales@) from the company's official website. If absolutely none can be found after a thorough search, use "N/A".
    - phone: MANDATORY. Find a public phone number from the company's official website. If absolutely none can be found after a thorough search, use "N/A".
    - justification: A brief, detailed reason why this company is a strong lead for international advertising. **Crucially, cite specific evidence of their existing international presence or concrete expansion plans** (e.g., "Opened a UK office in Q4 2023," "Lists major US clients on their website," "Actively hiring for a sales team in Germany").
    - leadScore: A numerical score from 1-100 indicating the strength of the lead for international advertising. **Give a higher score (80+) to companies with established international operations**. Score companies with recent, concrete expansion plans slightly lower (60-80). Score companies with only general interest or potential lower (40-60). Base this on the recency and relevance of their expansion signals.
    - outreachSuggestion: A single, compelling sentence to use as a personalized icebreaker in an outreach email, directly referencing the 'justification'.
    - employeeCount: Estimated number of employees (e.g., "51-200").
    - latestFunding: Details of the most recent funding round (e.g., "$50M Series B - Oct 2023"). Use "N/A" if not found.
    - techStack: An array of key technologies the company uses (e.g., ["Salesforce", "AWS", "Shopify"]).
    - competitors: An array of 2-3 main competitors.
    - latestNews: An object containing the 'title' and 'url' of the most recent, relevant general news article about the company (e.g. funding, product launch). The URL must be a direct link. If none, return an object with "N/A" for both title and url.
    - latestInternationalNews: An object containing the 'title' and 'url' of the most recent news, press release, or significant public statement specifically mentioning the company's interest, plans, or activities related to the International markets. The URL must be a direct link. If no such specific news is found, return an object with "N/A" for both title and url.
    - swotAnalysis: A concise SWOT analysis (Strengths, Weaknesses, Opportunities, Threats) for the company, specifically focused on their potential for international expansion. Format this as a simple string with markdown headings (e.g., "**Strengths:**\n- ...").
    {platforms}
    {emails}
2.  **Contacts (Find up to 5 people in the specified department):**
    - contacts: This MUST be an array of contact objects.
    - **For each contact object, include these fields:**
        - contactName: Full name of the contact.
        - designation: Their job title/designation.
        - contactLinkedIn: The verified, full LinkedIn profile URL.

    **For each potential contact, you MUST perform this verification:**
    1. Find their LinkedIn profile using a targeted search.
    2. **Verify (ALL MUST BE TRUE):**
       a. **Company:** Current company on LinkedIn EXACTLY matches the researched company.
       b. **Region:** LinkedIn location is CONSISTENT with the target region.
       c. **Role:** Job title matches one of the target departments: {departments}.
    3. **Result:**
       - **MANDATORY:** If a contact is VERIFIED, you MUST provide their full, valid LinkedIn profile URL for the 'contactLinkedIn' field. It cannot be empty.
       - If you cannot find or verify a contact's LinkedIn profile after a thorough search, use the exact string "Not found" for the 'contactLinkedIn' value. Do not invent a URL.
       - If a contact fails the verification check at any step, DISCARD them immediately and find a different person who meets all criteria.
#### D. Output Format & Example
**Output Format:**
Your entire response MUST be a single, valid JSON array of lead objects. Do NOT include any text, explanations, or markdown before or after the array. The response must start with '[' and end with ']'. All strings must be properly JSON-escaped.
"#,
        task = task_description(criteria),
        exclusion = exclusion,
        agency = agency,
        methods = search_methods(criteria),
        platforms = platform_instruction(criteria),
        emails = email_instruction(criteria),
        departments = departments,
    )
}

/// Battle card comparing a lead against its known competitors.
pub fn build_competitor_prompt(lead: &Lead) -> String {
    let company = &lead.company_name;
    format!(
        r#"Create a deep, strategic competitive analysis "battle card" for "{company}".
Compare it against its main competitors: {competitors}.

Think step-by-step about the market dynamics, international expansion hurdles, and how each company positions itself.

For each competitor, and for "{company}", provide:
1.  **Unique Selling Proposition (USP):** Core differentiator.
2.  **Weakness & Vulnerability:** Specific gaps in their current international strategy or product offering.
3.  **The "Kill" Shot (Winning Strategy):** Exactly how an outbound campaign should position "{company}" to win over a lead considering these rivals.
4.  **International Readiness:** A score from 1-10 on how prepared they are for global scale.

Structure the output in clear, professional markdown."#,
        company = company,
        competitors = lead.competitors.join(", "),
    )
}

pub fn build_talking_points_prompt(contact: &Contact, company_name: &str) -> String {
    format!(
        r#"Generate 4 highly personalized, non-generic talking points for a sales outreach to {name} at {company}.

Use Google Search to find their recent LinkedIn posts, webinar appearances, or company press releases they were quoted in.
Avoid generic compliments. Focus on "Business Value Signals" (e.g., "I saw your recent talk on X, it aligns with how we solve Y").

Return ONLY a valid JSON array of strings. No markdown formatting."#,
        name = contact.contact_name,
        company = company_name,
    )
}

pub fn build_market_report_prompt(industry: &str, region: &str) -> String {
    format!(
        r#"Perform a deep-dive strategic analysis for Indian "{industry}" companies looking to enter "{region}".

Provide a professional Market Expansion Report including:
1. **Macro Trends:** Current tailwinds and headwinds in {region}.
2. **Competitive Landscape:** Local incumbents and their strongholds.
3. **Regulatory & Cultural Barriers:** Specific nuances for Indian exporters.
4. **Go-To-Market (GTM) Recommendation:** 3 concrete steps for an Indian company to succeed in the first 6 months.

Structure in beautiful Markdown. Use data-backed insights from Google Search."#,
        industry = industry,
        region = region,
    )
}

/// Re-check the contact details a previous search produced for `lead`.
pub fn build_verification_prompt(lead: &Lead) -> String {
    format!(
        r#"Verify the public contact details previously collected for the company "{company}" ({category}).

Current details:
- email: {email}
- phone: {phone}
- companyLinkedIn: {linked_in}

Using Google Search, check each detail against the company's official website and its official LinkedIn page.
- If a detail is wrong or missing and you find the correct public value, return the corrected value.
- If a detail is confirmed, return it unchanged.
- If a detail cannot be confirmed, return "N/A" for it.

Return ONLY a single JSON object with these keys:
- "email": string
- "phone": string
- "companyLinkedIn": string
- "verified": boolean, true only if the company exists and at least one public contact channel was confirmed
- "report": string, two or three sentences describing what was checked and what changed"#,
        company = lead.company_name,
        category = lead.category,
        email = lead.email,
        phone = lead.phone,
        linked_in = lead.company_linked_in,
    )
}
