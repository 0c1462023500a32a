//! Print-formatted HTML export.

use std::fmt::Write;

use planner_db::models::CustomerInfo;

use super::model::{Checklist, ExportKind, PocDocument, SolutionSection};

const STYLE: &str = "body{font-family:sans-serif;max-width:900px;margin:2em auto;color:#222}\
h2{border-bottom:2px solid #333;padding-bottom:.3em}\
h4{margin-bottom:.4em}\
table{border-collapse:collapse;width:100%;margin-bottom:1.5em}\
th,td{border:1px solid #999;padding:.4em;text-align:left;vertical-align:top}\
.meta{color:#555}\
.placeholder{font-style:italic;color:#777}\
.missing{color:#a00}\
.status-pending{background:#fff3cd;padding:.1em .4em;border-radius:3px}\
@media print{body{margin:0}.page-break{page-break-before:always}}";

/// Escape text for use inside HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn section_heading(out: &mut String, section: &SolutionSection) {
    let _ = write!(
        out,
        "<h4><span>{}</span> {}",
        escape(&section.icon),
        escape(&section.name)
    );
    if section.missing {
        out.push_str(" <span class=\"missing\">(no longer in catalog)</span>");
    }
    out.push_str("</h4>\n");
}

fn prerequisites_part(out: &mut String, customer: &CustomerInfo, sections: &[SolutionSection]) {
    out.push_str("<section class=\"prereqs-document\">\n<h2>Technical Pre-requisites</h2>\n");
    if !customer.company_name.is_empty() {
        let _ = writeln!(
            out,
            "<p class=\"meta\">Prepared for: <strong>{}</strong></p>",
            escape(&customer.company_name)
        );
    }

    for section in sections {
        section_heading(out, section);
        out.push_str("<ul>\n");
        for p in &section.prerequisites {
            let _ = writeln!(out, "<li>{}</li>", escape(p));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</section>\n");
}

fn success_plan_part(out: &mut String, customer: &CustomerInfo, sections: &[SolutionSection]) {
    out.push_str("<section class=\"success-plan-document\">\n<h2>Mutual POC Success Plan</h2>\n");
    if !customer.company_name.is_empty() {
        let _ = write!(
            out,
            "<p class=\"meta\"><strong>{}</strong>",
            escape(&customer.company_name)
        );
        if let (Some(start), Some(end)) = (customer.poc_start_date, customer.poc_end_date) {
            let _ = write!(out, " | POC Period: {start} to {end}");
        }
        out.push_str("</p>\n");
    }

    for section in sections {
        section_heading(out, section);
        match &section.checklist {
            Checklist::Placeholder(text) => {
                let _ = writeln!(out, "<p class=\"placeholder\">{}</p>", escape(text));
            }
            Checklist::Criteria(rows) => {
                out.push_str(
                    "<table>\n<thead><tr><th>Milestone</th><th>Owner</th>\
                     <th>Target Date</th><th>Status</th></tr></thead>\n<tbody>\n",
                );
                for row in rows {
                    let milestone = if row.custom {
                        format!("<em>{}</em>", escape(&row.milestone))
                    } else {
                        escape(&row.milestone)
                    };
                    let prereqs = if row.prerequisites.is_empty() {
                        String::new()
                    } else {
                        let items: Vec<String> = row
                            .prerequisites
                            .iter()
                            .map(|p| format!("<li>{}</li>", escape(p)))
                            .collect();
                        format!("<ul>{}</ul>", items.join(""))
                    };
                    let _ = writeln!(
                        out,
                        "<tr><td>{milestone}{prereqs}</td><td>{}</td><td>{}</td>\
                         <td><span class=\"status-pending\">{}</span></td></tr>",
                        escape(&row.owner),
                        escape(&row.target_date),
                        row.status
                    );
                }
                out.push_str("</tbody>\n</table>\n");
            }
        }
    }
    out.push_str("</section>\n");
}

/// Render `doc` as a standalone HTML page laid out for printing.
pub fn render_html(doc: &PocDocument, kind: ExportKind) -> String {
    let title = if doc.customer.company_name.is_empty() {
        "POC Plan".to_string()
    } else {
        format!("POC Plan: {}", doc.customer.company_name)
    };

    let mut out = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{STYLE}</style></head><body>\n",
        escape(&title)
    );

    if kind.includes_prerequisites() {
        prerequisites_part(&mut out, &doc.customer, &doc.sections);
    }
    if kind == ExportKind::Full {
        out.push_str("<div class=\"page-break\"></div>\n");
    }
    if kind.includes_success_plan() {
        success_plan_part(&mut out, &doc.customer, &doc.sections);
    }

    out.push_str("</body></html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{CriterionRow, CriterionStatus, NO_CRITERIA_PLACEHOLDER};
    use uuid::Uuid;

    fn section(checklist: Checklist) -> SolutionSection {
        SolutionSection {
            solution_id: Uuid::nil(),
            name: "Remote <Support>".to_string(),
            icon: "🛠️".to_string(),
            prerequisites: vec!["Jump & point".to_string()],
            checklist,
            missing: false,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn table_has_expected_columns() {
        let doc = PocDocument {
            customer: CustomerInfo::default(),
            sections: vec![section(Checklist::Criteria(vec![CriterionRow {
                milestone: "Vendor access".to_string(),
                prerequisites: vec![],
                owner: String::new(),
                target_date: String::new(),
                status: CriterionStatus::Pending,
                custom: true,
            }]))],
        };
        let html = render_html(&doc, ExportKind::SuccessPlan);
        assert!(html.contains("<th>Milestone</th><th>Owner</th>"));
        assert!(html.contains("<th>Target Date</th><th>Status</th>"));
        assert!(html.contains("<em>Vendor access</em>"));
        assert!(html.contains(">Pending</span>"));
        assert!(html.contains("Remote &lt;Support&gt;"));
        assert!(!html.contains("Technical Pre-requisites"));
    }

    #[test]
    fn placeholder_and_prerequisites_in_full_export() {
        let doc = PocDocument {
            customer: CustomerInfo {
                company_name: "Acme".to_string(),
                ..CustomerInfo::default()
            },
            sections: vec![section(Checklist::Placeholder(
                NO_CRITERIA_PLACEHOLDER.to_string(),
            ))],
        };
        let html = render_html(&doc, ExportKind::Full);
        assert!(html.contains("<title>POC Plan: Acme</title>"));
        assert!(html.contains("<li>Jump &amp; point</li>"));
        assert!(html.contains("No success criteria defined"));
        assert!(html.contains("page-break"));
    }
}
