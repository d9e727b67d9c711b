//! Local pattern-based threat classification.
//!
//! # Data Flow
//! ```text
//! Parameters (merged, ordered)
//!     → scan_parameters (walks every value, nested values included)
//!     → classify (per text leaf, every category evaluated)
//!     → first ThreatFinding, if any
//! ```
//!
//! # Design Decisions
//! - Pure functions over immutable, lazily compiled signature tables
//! - Categories are evaluated independently; a value may be several kinds of threat
//! - Nested list/map values are walked recursively, never skipped

pub mod signatures;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::gate::context::{ParamValue, Parameters};

/// Attack category a value can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    SqlInjection,
    CrossSiteScripting,
}

impl ThreatCategory {
    /// Stable identifier used in metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::SqlInjection => "sql_injection",
            ThreatCategory::CrossSiteScripting => "cross_site_scripting",
        }
    }

    /// Event type reported to the authority for this category.
    pub fn event_type(&self) -> &'static str {
        match self {
            ThreatCategory::SqlInjection => "sql_injection",
            ThreatCategory::CrossSiteScripting => "xss_attack",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreatCategory::SqlInjection => write!(f, "SQL Injection"),
            ThreatCategory::CrossSiteScripting => write!(f, "Cross-Site Scripting"),
        }
    }
}

/// A positive match of one request value against a known signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatFinding {
    pub category: ThreatCategory,
    /// Parameter name; nested values use a path such as `user.name` or `tags[1]`.
    pub parameter: String,
    pub raw_value: String,
}

impl ThreatFinding {
    /// Human-readable details line for the security event.
    pub fn details(&self) -> String {
        format!("Parameter: {}, Input: {}", self.parameter, self.raw_value)
    }
}

/// Returns true if `value` matches any SQL injection signature.
pub fn detect_sql_injection(value: &str) -> bool {
    signatures::first_match(&signatures::SQL_INJECTION, value).is_some()
}

/// Returns true if `value` matches any cross-site scripting signature.
pub fn detect_xss(value: &str) -> bool {
    signatures::first_match(&signatures::CROSS_SITE_SCRIPTING, value).is_some()
}

/// Classify a single string. An empty set means the value is clean.
pub fn classify(value: &str) -> BTreeSet<ThreatCategory> {
    let mut categories = BTreeSet::new();
    if value.is_empty() {
        return categories;
    }
    if detect_sql_injection(value) {
        categories.insert(ThreatCategory::SqlInjection);
    }
    if detect_xss(value) {
        categories.insert(ThreatCategory::CrossSiteScripting);
    }
    categories
}

/// Scan parameters in order and return the first finding.
pub fn scan_parameters(params: &Parameters) -> Option<ThreatFinding> {
    params
        .iter()
        .find_map(|(name, value)| scan_value(name, value))
}

/// Classify one parameter value, walking into lists and maps.
pub fn scan_value(path: &str, value: &ParamValue) -> Option<ThreatFinding> {
    match value {
        ParamValue::Text(text) => classify(text).into_iter().next().map(|category| ThreatFinding {
            category,
            parameter: path.to_string(),
            raw_value: text.clone(),
        }),
        ParamValue::List(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| scan_value(&format!("{path}[{i}]"), item)),
        ParamValue::Map(entries) => entries
            .iter()
            .find_map(|(key, item)| scan_value(&format!("{path}.{key}"), item)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(category: ThreatCategory) -> BTreeSet<ThreatCategory> {
        BTreeSet::from([category])
    }

    #[test]
    fn test_sql_injection_signatures() {
        let samples = [
            "admin'--",
            "1 # comment",
            "1%23",
            "1' OR '1'='1",
            "x=1;",
            "%27or",
            "'union select",
            "exec xp_cmdshell",
            "exec+sp_who",
            "1 UNION SELECT password FROM users",
            "insert   into users values",
            "delete from users",
            "drop table users",
        ];
        for sample in samples {
            assert!(
                classify(sample).contains(&ThreatCategory::SqlInjection),
                "expected sql injection for {sample:?}"
            );
        }
    }

    #[test]
    fn test_sql_injection_case_variations() {
        for sample in ["UnIoN SeLeCt", "DROP table", "Delete From", "EXEC XP_cmd", "'Or"] {
            assert!(detect_sql_injection(sample), "{sample:?}");
            assert!(detect_sql_injection(&sample.to_lowercase()), "{sample:?}");
            assert!(detect_sql_injection(&sample.to_uppercase()), "{sample:?}");
        }
    }

    #[test]
    fn test_xss_signatures() {
        let samples = [
            "<script>alert(1)</script>",
            "<SCRIPT type=\"text/javascript\">\nsteal()\n</SCRIPT>",
            "JavaScript:alert(1)",
            "<img src=x onerror=alert(1)>",
            "<body onload = go()>",
            "<iframe src=//evil>",
            "<object data=x>",
            "<EMBED src=x>",
        ];
        for sample in samples {
            assert!(
                classify(sample).contains(&ThreatCategory::CrossSiteScripting),
                "expected xss for {sample:?}"
            );
        }
    }

    #[test]
    fn test_script_tag_without_closing_is_not_script_block() {
        assert!(!detect_xss("<script>unfinished"));
    }

    #[test]
    fn test_script_payload_is_xss_only() {
        assert_eq!(
            classify("<script>alert(1)</script>"),
            only(ThreatCategory::CrossSiteScripting)
        );
    }

    #[test]
    fn test_clean_values() {
        for sample in ["", "Jane Doe", "hello world", "2024-01-05", "user@example.com", "42", "O'Brien"] {
            assert!(classify(sample).is_empty(), "expected clean for {sample:?}");
        }
    }

    #[test]
    fn test_value_can_be_both_categories() {
        let both = classify("<script>x</script>' OR 1=1 --");
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn test_classify_is_idempotent() {
        for sample in ["1' OR '1'='1", "Jane Doe", "<embed>"] {
            assert_eq!(classify(sample), classify(sample));
        }
    }

    #[test]
    fn test_scan_stops_at_first_finding_in_order() {
        let mut params = Parameters::new();
        params.insert("name", ParamValue::text("Jane Doe"));
        params.insert("q", ParamValue::text("<script>alert(1)</script>"));
        params.insert("comment", ParamValue::text("1' OR '1'='1"));

        let finding = scan_parameters(&params).unwrap();
        assert_eq!(finding.parameter, "q");
        assert_eq!(finding.category, ThreatCategory::CrossSiteScripting);
        assert_eq!(finding.raw_value, "<script>alert(1)</script>");
    }

    #[test]
    fn test_nested_values_are_scanned() {
        let value = ParamValue::Map(vec![
            ("name".to_string(), ParamValue::text("Jane")),
            (
                "tags".to_string(),
                ParamValue::List(vec![ParamValue::text("ok"), ParamValue::text("drop table x")]),
            ),
        ]);
        let finding = scan_value("user", &value).unwrap();
        assert_eq!(finding.parameter, "user.tags[1]");
        assert_eq!(finding.category, ThreatCategory::SqlInjection);
        assert_eq!(finding.details(), "Parameter: user.tags[1], Input: drop table x");
    }

    #[test]
    fn test_event_types() {
        assert_eq!(ThreatCategory::SqlInjection.event_type(), "sql_injection");
        assert_eq!(ThreatCategory::CrossSiteScripting.event_type(), "xss_attack");
    }
}
