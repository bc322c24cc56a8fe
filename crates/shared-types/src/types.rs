use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single rubric rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required document sections, in rubric enumeration order.
///
/// The order of [`SectionKind::ALL`] is significant: when one page matches
/// the keywords of several sections, the last one in this order becomes the
/// active section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    TechnicalRequirements,
    Budget,
    Qualification,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::TechnicalRequirements,
        SectionKind::Budget,
        SectionKind::Qualification,
    ];

    /// Report key carrying the section verdict
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::TechnicalRequirements => "technical_requirements",
            SectionKind::Budget => "budget",
            SectionKind::Qualification => "qualification",
        }
    }

    /// Report key carrying the section page count
    pub fn pages_key(self) -> &'static str {
        match self {
            SectionKind::TechnicalRequirements => "technical_requirements_pages",
            SectionKind::Budget => "budget_pages",
            SectionKind::Qualification => "qualification_pages",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Page count and verdict for one section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionOutcome {
    pub pages: u32,
    pub verdict: Verdict,
}

/// Visual formatting results.
///
/// Only `file_type` is set when the document could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatReport {
    pub file_type: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Verdict>,
}

/// Content structure results, one count/verdict pair per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_requirements_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_requirements: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<Verdict>,
}

impl ContentReport {
    /// Record the outcome for a section, replacing any previous value
    pub fn with_section(mut self, kind: SectionKind, outcome: SectionOutcome) -> Self {
        let (pages, verdict) = match kind {
            SectionKind::TechnicalRequirements => (
                &mut self.technical_requirements_pages,
                &mut self.technical_requirements,
            ),
            SectionKind::Budget => (&mut self.budget_pages, &mut self.budget),
            SectionKind::Qualification => {
                (&mut self.qualification_pages, &mut self.qualification)
            }
        };
        *pages = Some(outcome.pages);
        *verdict = Some(outcome.verdict);
        self
    }

    pub fn section(&self, kind: SectionKind) -> Option<SectionOutcome> {
        let (pages, verdict) = match kind {
            SectionKind::TechnicalRequirements => {
                (self.technical_requirements_pages, self.technical_requirements)
            }
            SectionKind::Budget => (self.budget_pages, self.budget),
            SectionKind::Qualification => (self.qualification_pages, self.qualification),
        };
        Some(SectionOutcome {
            pages: pages?,
            verdict: verdict?,
        })
    }

    pub fn is_empty(&self) -> bool {
        SectionKind::ALL.iter().all(|&k| self.section(k).is_none())
    }
}

/// The analyzer's sole output.
///
/// Serializes to `{"format": {...}, "content": {...}}` with keys in rubric
/// order. Carries nothing run-dependent, so identical input bytes always
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub format: FormatReport,
    pub content: ContentReport,
}

impl ComplianceReport {
    /// Report for a source that is not a readable document
    pub fn rejected() -> Self {
        Self {
            format: FormatReport {
                file_type: Verdict::Fail,
                font_family: None,
                font_size: None,
                margin: None,
            },
            content: ContentReport::default(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.format.file_type == Verdict::Fail
    }

    /// Keys of every rule that failed, in report order
    pub fn failed_rules(&self) -> Vec<&'static str> {
        let format = [
            ("file_type", Some(self.format.file_type)),
            ("font_family", self.format.font_family),
            ("font_size", self.format.font_size),
            ("margin", self.format.margin),
        ];

        let mut failed: Vec<&'static str> = format
            .iter()
            .filter(|(_, v)| *v == Some(Verdict::Fail))
            .map(|(k, _)| *k)
            .collect();

        for kind in SectionKind::ALL {
            if let Some(outcome) = self.content.section(kind) {
                if !outcome.verdict.is_pass() {
                    failed.push(kind.key());
                }
            }
        }

        failed
    }

    /// True when the document was opened and every rule passed
    pub fn is_compliant(&self) -> bool {
        !self.is_rejected() && self.failed_rules().is_empty()
    }

    /// Render a human-readable summary
    pub fn to_text(&self, source: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Compliance Report: {}\n", source));
        output.push_str(&"=".repeat(60));
        output.push_str("\n\n");

        output.push_str("Format:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        let format = [
            ("file_type", Some(self.format.file_type)),
            ("font_family", self.format.font_family),
            ("font_size", self.format.font_size),
            ("margin", self.format.margin),
        ];
        for (key, verdict) in format {
            if let Some(verdict) = verdict {
                output.push_str(&format!("{} {}\n", status_mark(verdict), key));
            }
        }

        if !self.content.is_empty() {
            output.push_str("\nContent:\n");
            output.push_str(&"-".repeat(40));
            output.push('\n');
            for kind in SectionKind::ALL {
                if let Some(outcome) = self.content.section(kind) {
                    output.push_str(&format!(
                        "{} {} ({} pages)\n",
                        status_mark(outcome.verdict),
                        kind.key(),
                        outcome.pages
                    ));
                }
            }
        }

        output.push('\n');
        if self.is_compliant() {
            output.push_str("Result: compliant\n");
        } else {
            output.push_str(&format!(
                "Result: non-compliant ({})\n",
                self.failed_rules().join(", ")
            ));
        }

        output
    }
}

fn status_mark(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "✓ PASS",
        Verdict::Fail => "✗ FAIL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_report() -> ComplianceReport {
        ComplianceReport {
            format: FormatReport {
                file_type: Verdict::Pass,
                font_family: Some(Verdict::Pass),
                font_size: Some(Verdict::Fail),
                margin: Some(Verdict::Pass),
            },
            content: ContentReport::default()
                .with_section(
                    SectionKind::TechnicalRequirements,
                    SectionOutcome {
                        pages: 3,
                        verdict: Verdict::Pass,
                    },
                )
                .with_section(
                    SectionKind::Budget,
                    SectionOutcome {
                        pages: 5,
                        verdict: Verdict::Fail,
                    },
                )
                .with_section(
                    SectionKind::Qualification,
                    SectionOutcome {
                        pages: 0,
                        verdict: Verdict::Fail,
                    },
                ),
        }
    }

    #[test]
    fn test_rejected_report_serializes_only_file_type() {
        let json = serde_json::to_string(&ComplianceReport::rejected()).unwrap();
        assert_eq!(json, r#"{"format":{"file_type":"fail"},"content":{}}"#);
    }

    #[test]
    fn test_full_report_key_order() {
        let json = serde_json::to_string(&full_report()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"format":{"file_type":"pass","font_family":"pass","font_size":"fail","margin":"pass"},"#,
                r#""content":{"technical_requirements_pages":3,"technical_requirements":"pass","#,
                r#""budget_pages":5,"budget":"fail","#,
                r#""qualification_pages":0,"qualification":"fail"}}"#
            )
        );
    }

    #[test]
    fn test_report_deserializes_from_wire_shape() {
        let json = r#"{"format":{"file_type":"fail"},"content":{}}"#;
        let report: ComplianceReport = serde_json::from_str(json).unwrap();
        assert_eq!(report, ComplianceReport::rejected());
    }

    #[test]
    fn test_failed_rules_in_report_order() {
        assert_eq!(
            full_report().failed_rules(),
            vec!["font_size", "budget", "qualification"]
        );
        assert!(!full_report().is_compliant());
    }

    #[test]
    fn test_rejected_report_is_not_compliant() {
        let report = ComplianceReport::rejected();
        assert!(report.is_rejected());
        assert_eq!(report.failed_rules(), vec!["file_type"]);
        assert!(!report.is_compliant());
    }

    #[test]
    fn test_section_lookup_round_trips() {
        let report = full_report();
        let budget = report.content.section(SectionKind::Budget).unwrap();
        assert_eq!(budget.pages, 5);
        assert_eq!(budget.verdict, Verdict::Fail);
        assert!(ContentReport::default()
            .section(SectionKind::Budget)
            .is_none());
    }

    #[test]
    fn test_text_rendering_lists_sections() {
        let text = full_report().to_text("proposal.pdf");
        assert!(text.contains("Compliance Report: proposal.pdf"));
        assert!(text.contains("✗ FAIL font_size"));
        assert!(text.contains("✓ PASS technical_requirements (3 pages)"));
        assert!(text.contains("non-compliant (font_size, budget, qualification)"));
    }

    #[test]
    fn test_text_rendering_of_rejected_report_omits_content() {
        let text = ComplianceReport::rejected().to_text("notes.txt");
        assert!(text.contains("✗ FAIL file_type"));
        assert!(!text.contains("Content:"));
    }

    #[test]
    fn test_section_keys() {
        assert_eq!(SectionKind::Budget.key(), "budget");
        assert_eq!(
            SectionKind::TechnicalRequirements.pages_key(),
            "technical_requirements_pages"
        );
        assert_eq!(Verdict::from_bool(true).to_string(), "pass");
    }
}
