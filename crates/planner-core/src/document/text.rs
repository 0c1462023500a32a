//! Plain-text export, suitable for pasting into an email.

use std::fmt::Write;

use chrono::NaiveDate;

use planner_db::models::CustomerInfo;

use super::model::{Checklist, ExportKind, PocDocument, SolutionSection};

const RULE: &str = "========================";

fn date_or_tbd(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "TBD".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn heading(out: &mut String, section: &SolutionSection) {
    let title = if section.missing {
        format!("{} (no longer in catalog)", section.name)
    } else {
        section.name.clone()
    };
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn prerequisites_document(out: &mut String, customer: &CustomerInfo, sections: &[SolutionSection]) {
    let _ = writeln!(out, "PRE-REQUISITES DOCUMENT");
    let _ = writeln!(out, "{RULE}\n");

    if !customer.company_name.is_empty() {
        let _ = writeln!(out, "Customer: {}", customer.company_name);
        let _ = writeln!(
            out,
            "Contact: {} ({})",
            customer.contact_name, customer.contact_email
        );
        let _ = writeln!(out, "SE: {}\n", customer.se_name);
    }

    for section in sections {
        heading(out, section);
        for p in &section.prerequisites {
            let _ = writeln!(out, "• {p}");
        }
    }
}

fn success_plan(out: &mut String, customer: &CustomerInfo, sections: &[SolutionSection]) {
    let _ = writeln!(out, "MUTUAL POC SUCCESS PLAN");
    let _ = writeln!(out, "{RULE}\n");

    if !customer.company_name.is_empty() {
        let _ = writeln!(out, "Customer: {}", customer.company_name);
        let _ = writeln!(
            out,
            "POC Period: {} to {}\n",
            date_or_tbd(customer.poc_start_date),
            date_or_tbd(customer.poc_end_date)
        );
    }

    for section in sections {
        heading(out, section);
        let _ = writeln!(out, "\nSuccess Criteria:");
        match &section.checklist {
            Checklist::Placeholder(text) => {
                let _ = writeln!(out, "{text}");
            }
            Checklist::Criteria(rows) => {
                for row in rows {
                    let _ = writeln!(out, "[ ] {}", row.milestone);
                    for p in &row.prerequisites {
                        let _ = writeln!(out, "    - {p}");
                    }
                    let _ = writeln!(
                        out,
                        "    Owner: {}  Target Date: {}  Status: {}",
                        or_blank(&row.owner),
                        or_blank(&row.target_date),
                        row.status
                    );
                }
            }
        }
    }
}

fn or_blank(value: &str) -> &str {
    if value.is_empty() { "________" } else { value }
}

/// Render `doc` as plain text.
pub fn render_text(doc: &PocDocument, kind: ExportKind) -> String {
    let mut out = String::new();

    if kind.includes_prerequisites() {
        prerequisites_document(&mut out, &doc.customer, &doc.sections);
    }
    if kind == ExportKind::Full {
        out.push('\n');
    }
    if kind.includes_success_plan() {
        success_plan(&mut out, &doc.customer, &doc.sections);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{CriterionRow, CriterionStatus, NO_CRITERIA_PLACEHOLDER};
    use uuid::Uuid;

    fn doc(checklist: Checklist) -> PocDocument {
        PocDocument {
            customer: CustomerInfo {
                company_name: "Acme".to_string(),
                contact_name: "Jordan".to_string(),
                contact_email: "jordan@acme.test".to_string(),
                se_name: "Sam".to_string(),
                poc_start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
                poc_end_date: None,
            },
            sections: vec![SolutionSection {
                solution_id: Uuid::nil(),
                name: "Password Safe".to_string(),
                icon: "🔑".to_string(),
                prerequisites: vec!["SSL certificate for web portal".to_string()],
                checklist,
                missing: false,
            }],
        }
    }

    #[test]
    fn prerequisites_export() {
        let text = render_text(
            &doc(Checklist::Placeholder(NO_CRITERIA_PLACEHOLDER.to_string())),
            ExportKind::Prerequisites,
        );
        assert!(text.starts_with("PRE-REQUISITES DOCUMENT\n"));
        assert!(text.contains("Contact: Jordan (jordan@acme.test)\n"));
        assert!(text.contains("\nPassword Safe\n-------------\n"));
        assert!(text.contains("• SSL certificate for web portal\n"));
        assert!(!text.contains("MUTUAL POC SUCCESS PLAN"));
    }

    #[test]
    fn success_plan_export_with_rows() {
        let row = CriterionRow {
            milestone: "SSH key management".to_string(),
            prerequisites: vec!["SSH keys discovered".to_string()],
            owner: String::new(),
            target_date: String::new(),
            status: CriterionStatus::Pending,
            custom: false,
        };
        let text = render_text(&doc(Checklist::Criteria(vec![row])), ExportKind::SuccessPlan);
        assert!(text.starts_with("MUTUAL POC SUCCESS PLAN\n"));
        assert!(text.contains("POC Period: 2025-04-01 to TBD\n"));
        assert!(text.contains("[ ] SSH key management\n    - SSH keys discovered\n"));
        assert!(text.contains("Status: Pending"));
    }

    #[test]
    fn placeholder_is_literal() {
        let text = render_text(
            &doc(Checklist::Placeholder(NO_CRITERIA_PLACEHOLDER.to_string())),
            ExportKind::Full,
        );
        assert!(text.contains("PRE-REQUISITES DOCUMENT"));
        assert!(text.contains("MUTUAL POC SUCCESS PLAN"));
        assert!(text.contains("Success Criteria:\nNo success criteria defined\n"));
    }

    #[test]
    fn missing_solution_is_marked() {
        let mut d = doc(Checklist::Placeholder(NO_CRITERIA_PLACEHOLDER.to_string()));
        d.sections[0].missing = true;
        let text = render_text(&d, ExportKind::SuccessPlan);
        assert!(text.contains("Password Safe (no longer in catalog)\n"));
    }
}
