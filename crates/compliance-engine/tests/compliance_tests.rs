//! End-to-end analysis of generated PDFs

use compliance_engine::{ComplianceEngine, ComplianceReport};
use pretty_assertions::assert_eq;
use shared_pdf::fixtures::{PageSpec, PdfBuilder, TextItem};
use shared_types::{SectionKind, Verdict};

fn analyze(bytes: &[u8]) -> ComplianceReport {
    ComplianceEngine::new().check_bytes("proposal.pdf", bytes)
}

/// A proposal that satisfies every rule
fn compliant_proposal() -> Vec<u8> {
    PdfBuilder::new()
        .page(
            PageSpec::new()
                .text(TextItem::new("Project Proposal").size(12.0).at(72.0, 700.0))
                .text(TextItem::new("Technical Requirements").at(72.0, 680.0)),
        )
        .text_pages(&["system design", "interfaces"])
        .text_pages(&["Budget", "cost breakdown"])
        .text_pages(&["Qualification", "team"])
        .build()
}

#[test]
fn compliant_proposal_passes_every_rule() {
    let report = analyze(&compliant_proposal());
    assert_eq!(
        serde_json::to_string(&report).unwrap(),
        r#"{"format":{"file_type":"pass","font_family":"pass","font_size":"pass","margin":"pass"},"content":{"technical_requirements_pages":3,"technical_requirements":"pass","budget_pages":2,"budget":"pass","qualification_pages":2,"qualification":"pass"}}"#
    );
    assert!(report.is_compliant());
}

#[test]
fn wrong_extension_reports_only_file_type() {
    let bytes = compliant_proposal();
    let report = ComplianceEngine::new().check_bytes("proposal.docx", &bytes);
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({"format": {"file_type": "fail"}, "content": {}})
    );
}

#[test]
fn corrupt_pdf_reports_only_file_type() {
    let mut bytes = compliant_proposal();
    bytes.truncate(40);
    let report = analyze(&bytes);
    assert!(report.is_rejected());
    assert!(report.content.is_empty());
    assert_eq!(report.format.font_family, None);
}

#[test]
fn uppercase_extension_is_accepted() {
    let report = ComplianceEngine::new().check_bytes("PROPOSAL.PDF", &compliant_proposal());
    assert_eq!(report.format.file_type, Verdict::Pass);
}

#[test]
fn non_times_font_fails_family_only() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new().text(TextItem::new("Budget").font("Helvetica")))
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.format.font_family, Some(Verdict::Fail));
    assert_eq!(report.format.font_size, Some(Verdict::Pass));
}

#[test]
fn wrong_size_fails_size_only() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new().text(TextItem::new("Budget").size(10.0)))
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.format.font_family, Some(Verdict::Pass));
    assert_eq!(report.format.font_size, Some(Verdict::Fail));
}

#[test]
fn only_page_one_typography_counts() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new().text(TextItem::new("Cover").font("Arial").size(20.0)))
        .page(PageSpec::new().text(TextItem::new("Body")))
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.format.font_family, Some(Verdict::Fail));
    assert_eq!(report.format.font_size, Some(Verdict::Fail));
}

#[test]
fn block_crossing_margin_fails() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::new()
                .text(TextItem::new("Inside"))
                .text(TextItem::new("Footer").at(72.0, 40.0)),
        )
        .build();
    assert_eq!(analyze(&bytes).format.margin, Some(Verdict::Fail));
}

#[test]
fn blank_first_page_passes_margin() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new())
        .text_pages(&["budget"])
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.format.margin, Some(Verdict::Pass));
    assert_eq!(report.format.font_family, Some(Verdict::Fail));
}

#[test]
fn four_budget_pages_pass_and_five_fail() {
    let four = analyze(&PdfBuilder::new().text_pages(&["budget"; 4]).build());
    assert_eq!(four.content.budget_pages, Some(4));
    assert_eq!(four.content.budget, Some(Verdict::Pass));

    let five = analyze(&PdfBuilder::new().text_pages(&["budget"; 5]).build());
    assert_eq!(five.content.budget_pages, Some(5));
    assert_eq!(five.content.budget, Some(Verdict::Fail));
}

#[test]
fn missing_section_has_zero_pages_and_fails() {
    let report = analyze(&PdfBuilder::new().text_pages(&["budget"]).build());
    for kind in [SectionKind::TechnicalRequirements, SectionKind::Qualification] {
        let outcome = report.content.section(kind).unwrap();
        assert_eq!(outcome.pages, 0);
        assert_eq!(outcome.verdict, Verdict::Fail);
    }
}

#[test]
fn unlabeled_pages_count_toward_previous_section() {
    let bytes = PdfBuilder::new()
        .text_pages(&["Qualification", "resume", "references", "Budget"])
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.content.qualification_pages, Some(3));
    assert_eq!(report.content.budget_pages, Some(1));
}

#[test]
fn keyword_matching_ignores_case() {
    let bytes = PdfBuilder::new()
        .text_pages(&["TECHNICAL REQUIREMENTS", "BuDgEt", "qualifications"])
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.content.technical_requirements_pages, Some(1));
    assert_eq!(report.content.budget_pages, Some(1));
    assert_eq!(report.content.qualification_pages, Some(1));
}

#[test]
fn heading_split_across_runs_still_matches() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::new()
                .text(TextItem::new("Technical").at(72.0, 700.0))
                .text(TextItem::new("Requirements").at(130.0, 700.0)),
        )
        .build();
    assert_eq!(analyze(&bytes).content.technical_requirements_pages, Some(1));
}

#[test]
fn section_text_inside_form_xobject_is_classified() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new().form_text(TextItem::new("Budget")))
        .build();
    assert_eq!(analyze(&bytes).content.budget_pages, Some(1));
}

#[test]
fn identical_input_gives_identical_output() {
    let bytes = compliant_proposal();
    let a = serde_json::to_string(&analyze(&bytes)).unwrap();
    let b = serde_json::to_string(&analyze(&bytes)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn file_entry_point_matches_bytes_entry_point() {
    let dir = std::env::temp_dir().join(format!("compliance-engine-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("proposal.pdf");
    let bytes = compliant_proposal();
    std::fs::write(&path, &bytes).unwrap();

    let from_file = ComplianceEngine::new().check_file(&path);
    assert_eq!(from_file, analyze(&bytes));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_is_rejected() {
    let report = ComplianceEngine::new().check_file("/nonexistent/proposal.pdf".as_ref());
    assert!(report.is_rejected());
}

#[test]
fn mixed_fractional_sizes_on_one_line_keep_each_size() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::new()
                .text(TextItem::new("Hello").size(11.4).at(100.0, 500.0))
                .text(TextItem::new("World").size(11.8).at(130.0, 500.0)),
        )
        .build();
    assert_eq!(analyze(&bytes).format.font_size, Some(Verdict::Pass));
}

#[test]
fn self_drawing_form_is_analyzed_once() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new().form_chain(TextItem::new("Budget"), 1, 12))
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.format.font_family, Some(Verdict::Pass));
    assert_eq!(report.content.budget_pages, Some(1));
}

#[test]
fn runaway_form_nesting_fails_page_one_rules() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new().form_chain(TextItem::new("fan"), 6, 12))
        .text_pages(&["Budget"])
        .build();
    let report = analyze(&bytes);
    assert_eq!(report.format.file_type, Verdict::Pass);
    assert_eq!(report.format.font_family, Some(Verdict::Fail));
    assert_eq!(report.format.font_size, Some(Verdict::Fail));
    assert_eq!(report.format.margin, Some(Verdict::Fail));
    assert_eq!(report.content.budget_pages, Some(1));
}
