//! CLI handlers for `poc-planner plan` subcommands.
//!
//! Implements:
//! - `poc-planner plan template`           -- print a plan request for the current catalog
//! - `poc-planner plan create <file>`      -- save a plan from a plan request file
//! - `poc-planner plan show [plan]`        -- show a saved plan or list all plans
//! - `poc-planner plan export <plan>`      -- render the plan document as text or HTML
//! - `poc-planner plan status <plan> <s>`  -- change a plan's status
//! - `poc-planner plan delete <plan>`      -- delete a saved plan

use anyhow::{Context, Result, bail};

use planner_core::aggregate::load_aggregate;
use planner_core::document::{Checklist, ExportKind, PocDocument, render_html, render_text};
use planner_core::planner::{PlannerStep, build_session, parse_plan_request, request_template};
use planner_core::snapshot::{load_saved_plan, save_poc_plan, unresolved_count};
use planner_core::store::Store;
use planner_db::models::PocPlan;

use crate::PlanCommands;
use crate::resolve::{resolve_plan_id, write_plan_id_to_file};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_plan_command(command: PlanCommands, store: &dyn Store) -> Result<()> {
    match command {
        PlanCommands::Template { output } => cmd_template(store, output.as_deref()).await,
        PlanCommands::Create {
            file,
            no_write_back,
        } => cmd_create(store, &file, !no_write_back).await,
        PlanCommands::Show { plan } => match plan {
            Some(plan) => cmd_show_one(store, &plan).await,
            None => cmd_show_all(store).await,
        },
        PlanCommands::Export {
            plan,
            kind,
            html,
            output,
        } => cmd_export(store, &plan, kind, html, output.as_deref()).await,
        PlanCommands::Status { plan, status } => {
            let id = resolve_plan_id(&plan)?;
            store.update_poc_plan_status(id, status).await?;
            println!("Plan {id} is now {status}.");
            Ok(())
        }
        PlanCommands::Delete { plan } => {
            let id = resolve_plan_id(&plan)?;
            store.delete_poc_plan(id).await?;
            println!("Plan {id} deleted.");
            Ok(())
        }
    }
}

fn write_output(content: &str, output: Option<&str>, what: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write to {path}"))?;
            println!("{what} written to {path}");
        }
        None => print!("{content}"),
    }
    Ok(())
}

// -----------------------------------------------------------------------
// poc-planner plan template
// -----------------------------------------------------------------------

async fn cmd_template(store: &dyn Store, output: Option<&str>) -> Result<()> {
    let aggregate = load_aggregate(store).await?;
    write_output(&request_template(&aggregate), output, "Plan request template")
}

// -----------------------------------------------------------------------
// poc-planner plan create <file>
// -----------------------------------------------------------------------

/// Parse a plan request, resolve it against the live catalog, save the
/// snapshot, and record the new ID in the file.
async fn cmd_create(store: &dyn Store, file_path: &str, write_back: bool) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read plan request: {file_path}"))?;
    let request = parse_plan_request(&content)
        .with_context(|| format!("failed to parse plan request: {file_path}"))?;

    let aggregate = load_aggregate(store).await?;
    let resolved = build_session(&request, &aggregate);
    let mut session = resolved.session;

    for w in &resolved.warnings {
        eprintln!("warning: {w}");
    }
    session
        .advance()
        .with_context(|| format!("no solution in {file_path} matches the catalog"))?;
    while session.step() != PlannerStep::Review {
        session.advance()?;
    }

    let plan = save_poc_plan(store, &aggregate, session.selection()).await?;
    if write_back {
        write_plan_id_to_file(file_path, plan.id)?;
    }

    let selected: usize = plan.selected_use_cases.values().map(Vec::len).sum();
    println!("Plan saved.");
    println!();
    println!("  Plan ID:    {}", plan.id);
    println!("  Customer:   {}", display_company(&plan));
    println!("  Status:     {}", plan.status);
    println!("  Solutions:  {}", plan.solutions.len());
    println!("  Use cases:  {selected}");
    println!("  Custom:     {}", plan.custom_use_cases.len());
    if write_back {
        println!();
        println!("ID written to [plan] in {file_path}.");
    }
    if let Some(previous) = request.plan.id {
        println!();
        println!("Note: {file_path} previously pointed at plan {previous}; that plan is unchanged.");
    }

    Ok(())
}

fn display_company(plan: &PocPlan) -> &str {
    if plan.customer_info.company_name.is_empty() {
        "(unnamed)"
    } else {
        &plan.customer_info.company_name
    }
}

// -----------------------------------------------------------------------
// poc-planner plan show
// -----------------------------------------------------------------------

async fn cmd_show_all(store: &dyn Store) -> Result<()> {
    let plans = store.list_poc_plans().await?;

    if plans.is_empty() {
        println!("No plans found. Use `poc-planner plan create <file>` to save one.");
        return Ok(());
    }

    let id_w = 36;
    let company_w = plans
        .iter()
        .map(|p| display_company(p).chars().count())
        .max()
        .unwrap_or(8)
        .max(8);
    let status_w = 9;

    println!(
        "{:<id_w$}  {:<company_w$}  {:<status_w$}  {:>9}  CREATED",
        "ID", "CUSTOMER", "STATUS", "SOLUTIONS",
    );
    for plan in &plans {
        println!(
            "{:<id_w$}  {:<company_w$}  {:<status_w$}  {:>9}  {}",
            plan.id,
            display_company(plan),
            plan.status,
            plan.solutions.len(),
            plan.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}

async fn cmd_show_one(store: &dyn Store, input: &str) -> Result<()> {
    let id = resolve_plan_id(input)?;
    let (plan, doc) = load_saved_plan(store, id).await?;

    println!("Plan: {}", display_company(&plan));
    println!("  ID:        {}", plan.id);
    println!("  Status:    {}", plan.status);
    println!(
        "  Created:   {}",
        plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let customer = &plan.customer_info;
    if !customer.contact_name.is_empty() || !customer.contact_email.is_empty() {
        println!(
            "  Contact:   {} <{}>",
            customer.contact_name, customer.contact_email
        );
    }
    if !customer.se_name.is_empty() {
        println!("  SE:        {}", customer.se_name);
    }
    if let (Some(start), Some(end)) = (customer.poc_start_date, customer.poc_end_date) {
        println!("  Period:    {start} to {end}");
    }

    print_sections(&doc);

    let unresolved = unresolved_count(&doc);
    if unresolved > 0 {
        println!();
        println!("{unresolved} selected use case(s) no longer exist in the catalog.");
    }
    Ok(())
}

fn print_sections(doc: &PocDocument) {
    for section in &doc.sections {
        println!();
        let suffix = if section.missing {
            "  (no longer in catalog)"
        } else {
            ""
        };
        println!("  {} {}{suffix}", section.icon, section.name);
        match &section.checklist {
            Checklist::Placeholder(text) => println!("    {text}"),
            Checklist::Criteria(rows) => {
                for row in rows {
                    let marker = if row.custom { "*" } else { "-" };
                    println!("    {marker} {}", row.milestone);
                }
            }
        }
    }
}

// -----------------------------------------------------------------------
// poc-planner plan export <plan>
// -----------------------------------------------------------------------

async fn cmd_export(
    store: &dyn Store,
    input: &str,
    kind: ExportKind,
    html: bool,
    output: Option<&str>,
) -> Result<()> {
    let id = resolve_plan_id(input)?;
    let (_, doc) = load_saved_plan(store, id).await?;
    if doc.sections.is_empty() {
        bail!("plan {id} has no solutions to export");
    }

    let rendered = if html {
        render_html(&doc, kind)
    } else {
        render_text(&doc, kind)
    };
    write_output(&rendered, output, "Plan document")
}
