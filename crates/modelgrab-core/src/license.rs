//! License filter
//!
//! License labels are free text coming from the hosting platform and vary in
//! casing, punctuation and wording. The filter is permissive about those
//! variations but keeps the share-alike, non-commercial and no-derivatives
//! Creative Commons variants out even though they textually contain "by".

use modelgrab_types::DEFAULT_LICENSES;
use std::fmt;

/// Markers of the more restrictive CC variants
const RESTRICTED_MARKERS: [&str; 6] = [
    "nc",
    "nd",
    "sa",
    "noncommercial",
    "noderivatives",
    "sharealike",
];

/// Ordered set of accepted license tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseFilter {
    tokens: Vec<String>,
}

impl LicenseFilter {
    /// Build a filter, lowercasing and trimming every token
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim().to_lowercase();
            if !token.is_empty() && !normalized.contains(&token) {
                normalized.push(token);
            }
        }
        Self { tokens: normalized }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether `label` is covered by any accepted token
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        let label_normalized = collapse_separators(&label);

        self.tokens
            .iter()
            .any(|token| token_matches(token, &label, &label_normalized))
    }
}

impl Default for LicenseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_LICENSES)
    }
}

impl fmt::Display for LicenseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let upper: Vec<String> = self.tokens.iter().map(|t| t.to_uppercase()).collect();
        write!(f, "{}", upper.join(", "))
    }
}

fn collapse_separators(s: &str) -> String {
    s.replace(['-', '_'], " ")
}

fn token_matches(token: &str, label: &str, label_normalized: &str) -> bool {
    if label == token {
        return true;
    }

    if label_normalized == collapse_separators(token) {
        return true;
    }

    match token {
        "by" => {
            let mentions_attribution = label_normalized.contains("attribution")
                || (label_normalized.contains("cc") && label_normalized.contains("by"));
            mentions_attribution
                && !RESTRICTED_MARKERS
                    .iter()
                    .any(|marker| label_normalized.contains(marker))
        }
        "cc0" => label_normalized.contains("cc0") || label_normalized.contains("cc 0"),
        _ => false,
    }
}
