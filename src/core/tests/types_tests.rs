use crate::core::types::{AnalysisResult, Finding, RiskLevel, Severity};

#[test]
fn test_severity_ordering() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Danger);
    assert!(Severity::Danger < Severity::Blocked);

    let mut sorted = Severity::DESCENDING.to_vec();
    sorted.sort();
    sorted.reverse();
    assert_eq!(sorted, Severity::DESCENDING.to_vec());
}

#[test]
fn test_severity_display() {
    assert_eq!(format!("{}", Severity::Blocked), "BLOCKED");
    assert_eq!(format!("{}", Severity::Warning), "WARNING");
}

#[test]
fn test_risk_level_mapping() {
    assert_eq!(RiskLevel::from_max_severity(Some(Severity::Blocked)), RiskLevel::Critical);
    assert_eq!(RiskLevel::from_max_severity(Some(Severity::Danger)), RiskLevel::High);
    assert_eq!(RiskLevel::from_max_severity(Some(Severity::Warning)), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_max_severity(Some(Severity::Info)), RiskLevel::Low);
    assert_eq!(RiskLevel::from_max_severity(None), RiskLevel::Low);
}

#[test]
fn test_risk_level_ordering_matches_severity() {
    assert!(RiskLevel::Low < RiskLevel::Medium);
    assert!(RiskLevel::Medium < RiskLevel::High);
    assert!(RiskLevel::High < RiskLevel::Critical);
}

#[test]
fn test_finding_display() {
    let line = Finding::at_line(12, "diskpart", Severity::Blocked, "Disk partitioning", "Remove it");
    assert_eq!(format!("{}", line), "[BLOCKED] line 12: Disk partitioning");

    let document = Finding::document("SRV01", Severity::Danger, "Unapproved host", "Add it");
    assert!(document.is_document_level());
    assert_eq!(format!("{}", document), "[DANGER] script: Unapproved host");
}

#[test]
fn test_serialised_names() {
    assert_eq!(serde_json::to_string(&Severity::Danger).unwrap(), "\"DANGER\"");
    assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"CRITICAL\"");

    let finding = Finding::at_line(1, "x", Severity::Warning, "d", "r");
    let json = serde_json::to_value(&finding).unwrap();
    assert_eq!(json["matched_pattern"], "x");
    assert_eq!(json["severity"], "WARNING");
}

#[test]
fn test_result_helpers() {
    let result = AnalysisResult {
        is_safe: true,
        risk_level: RiskLevel::High,
        findings: vec![
            Finding::at_line(1, "a", Severity::Warning, "w", "r"),
            Finding::at_line(2, "b", Severity::Danger, "d", "r"),
        ],
        summary: String::new(),
        blocked_descriptions: Vec::new(),
        scope_violation_descriptions: Vec::new(),
    };

    assert_eq!(result.max_severity(), Some(Severity::Danger));
    assert_eq!(result.count(Severity::Warning), 1);
    assert_eq!(result.count(Severity::Blocked), 0);
    assert!(result.requires_override());
    assert!(!result.has_scope_violations());
}
