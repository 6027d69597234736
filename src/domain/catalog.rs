//! Option catalogs offered to the user when building search criteria.

pub const CLIENT_CATEGORIES: &[&str] = &[
    "Technology",
    "Fintech",
    "E-commerce",
    "Healthcare",
    "EdTech",
    "SaaS",
    "Manufacturing",
    "Logistics",
    "Retail",
    "Pharmaceuticals",
    "Food & Beverage",
    "Hospitality",
    "Automotive",
    "Real Estate",
    "Media & Entertainment",
];

pub const TARGET_DEPARTMENTS: &[&str] = &[
    "Marketing",
    "Sales",
    "International Marketing",
    "Business Development",
    "Executive",
    "Operations",
    "CEO",
    "COO",
    "Business Head",
    "Owner",
];

pub const INTERNATIONAL_REGIONS: &[&str] = &["USA", "Canada", "UK/Europe", "Africa", "MENA", "APAC"];

pub const PLATFORMS_OF_INTEREST: &[&str] = &["TV", "ZEE5", "Digital", "News"];

pub const SALES_TERRITORIES: &[&str] = &["North", "East", "West", "South"];

pub const DEFAULT_CATEGORY: &str = "Technology";
pub const DEFAULT_ORIGIN_REGION: &str = "INDIA";
pub const DEFAULT_DEPARTMENTS: &[&str] = &["International Marketing"];
pub const DEFAULT_PLATFORMS: &[&str] = &["Digital", "News"];

/// Items of `catalog` present in `selected`, in catalog order.
///
/// Matching ignores ASCII case and surrounding whitespace; entries that are
/// not part of the catalog are dropped.
pub fn selected_in_order(catalog: &[&'static str], selected: &[String]) -> Vec<&'static str> {
    catalog
        .iter()
        .copied()
        .filter(|item| {
            selected
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(item))
        })
        .collect()
}

pub fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
