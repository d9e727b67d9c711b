//! Attack signature tables.
//!
//! Each table is an ordered list of case-insensitive patterns. A value matches a
//! category as soon as any one pattern in that category's table matches.

use std::sync::LazyLock;

use regex::Regex;

/// A named, compiled signature.
pub struct Signature {
    pub name: &'static str,
    pub regex: Regex,
}

fn compile(table: &[(&'static str, &'static str)]) -> Vec<Signature> {
    table
        .iter()
        .map(|(name, pattern)| Signature {
            name,
            regex: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid built-in signature {name}: {e}")),
        })
        .collect()
}

const SQL_INJECTION_PATTERNS: &[(&str, &str)] = &[
    ("comment_marker", r"(?i)(--)|(%23)|(#)"),
    ("tautology", r"(?i)((%3D)|(=))[^\n]*((%27)|(')|(--)|(%3B)|(;))"),
    ("quote_or", r"(?i)\w*((%27)|('))((%6F)|o|(%4F))((%72)|r|(%52))"),
    ("quote_union", r"(?i)((%27)|('))union"),
    ("stored_procedure", r"(?i)exec(\s|\+)+(s|x)p\w+"),
    ("union_select", r"(?i)UNION\s+SELECT"),
    ("insert_into", r"(?i)INSERT\s+INTO"),
    ("delete_from", r"(?i)DELETE\s+FROM"),
    ("drop_table", r"(?i)DROP\s+TABLE"),
];

const XSS_PATTERNS: &[(&str, &str)] = &[
    ("script_block", r"(?is)<script\b[^>]*>(.*?)</script>"),
    ("javascript_uri", r"(?i)javascript:"),
    ("event_handler", r"(?i)on\w+\s*="),
    ("iframe_tag", r"(?i)<iframe"),
    ("object_tag", r"(?i)<object"),
    ("embed_tag", r"(?i)<embed"),
];

pub static SQL_INJECTION: LazyLock<Vec<Signature>> =
    LazyLock::new(|| compile(SQL_INJECTION_PATTERNS));

pub static CROSS_SITE_SCRIPTING: LazyLock<Vec<Signature>> =
    LazyLock::new(|| compile(XSS_PATTERNS));

/// Name of the first signature in `table` matching `value`, if any.
pub fn first_match(table: &[Signature], value: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|sig| sig.regex.is_match(value))
        .map(|sig| sig.name)
}
