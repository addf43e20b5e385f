use regex::Regex;
use std::sync::LazyLock;

/// One named PII pattern and its default redaction marker. Shared between
/// the PII guard and the anonymizer transform (spec §4.7, §4.8), which
/// rewrite text the same way but for different reasons.
pub struct PiiPattern {
    pub name: &'static str,
    pub regex: &'static LazyLock<Regex>,
    pub marker: &'static str,
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap()
});
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b").unwrap()
});
static SSN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());
static CREDIT_CARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[- ]\d{4}[- ]\d{4}[- ]\d{4}\b").unwrap());
static IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap());

pub static EMAIL_PATTERN: PiiPattern = PiiPattern {
    name: "email",
    regex: &EMAIL,
    marker: "[EMAIL]",
};
pub static PHONE_PATTERN: PiiPattern = PiiPattern {
    name: "phone",
    regex: &PHONE,
    marker: "[PHONE]",
};
pub static SSN_PATTERN: PiiPattern = PiiPattern {
    name: "ssn",
    regex: &SSN,
    marker: "[SSN]",
};
pub static CREDIT_CARD_PATTERN: PiiPattern = PiiPattern {
    name: "credit_card",
    regex: &CREDIT_CARD,
    marker: "[CREDIT_CARD]",
};
pub static IP_PATTERN: PiiPattern = PiiPattern {
    name: "ip",
    regex: &IP,
    marker: "[IP]",
};

/// The fixed default set, extensible by name at construction time (spec
/// §4.7).
pub fn default_patterns() -> Vec<&'static PiiPattern> {
    vec![
        &EMAIL_PATTERN,
        &PHONE_PATTERN,
        &SSN_PATTERN,
        &CREDIT_CARD_PATTERN,
        &IP_PATTERN,
    ]
}
