//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use planner_core::dashboard::ItemKind;
use planner_db::models::PocPlanStatus;

use super::app::{App, Focus, InputMode, View};

/// Render the current view.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    match app.current_view {
        View::Dashboard => render_dashboard(f, app, chunks[0]),
        View::Plans => render_plan_list(f, app, chunks[0]),
        View::PlanDetail(_) => render_plan_detail(f, app, chunks[0]),
        View::Help => render_help(f, chunks[0]),
    }

    render_status_bar(f, app, chunks[1]);
}

fn highlight(selected: bool) -> Style {
    if selected {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    // Search box.
    let searching = app.input_mode == InputMode::Search;
    let mut search_line = vec![Span::raw(app.search.clone())];
    if searching {
        search_line.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    } else if app.search.is_empty() {
        search_line.push(Span::styled(
            "press / to search use cases and prerequisites",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let search = Paragraph::new(Line::from(search_line))
        .block(pane_block(" Search ".to_string(), searching));
    f.render_widget(search, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(rows[1]);

    render_solution_list(f, app, columns[0]);
    render_items(f, app, columns[1]);
}

fn render_solution_list(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .aggregate
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mark = if app.selection.contains(s.id()) { "[x]" } else { "[ ]" };
            let style = highlight(i == app.selected_solution && app.focus == Focus::Solutions);
            Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(Color::Green)),
                Span::raw(format!("{} {} ", s.solution.icon, s.name())),
                Span::styled(
                    format!("({})", s.use_cases.len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
            .style(style)
        })
        .collect();

    let title = format!(
        " Solutions {}/{} ",
        app.selection.checked_count(),
        app.aggregate.len()
    );
    let list = Paragraph::new(lines).block(pane_block(title, app.focus == Focus::Solutions));
    f.render_widget(list, area);
}

fn render_items(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["Kind", "Solution", "Item"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1);

    let rows = app.items.iter().enumerate().map(|(i, item)| {
        let (kind, color) = match item.kind {
            ItemKind::UseCase => ("use case", Color::Cyan),
            ItemKind::Prerequisite => ("prereq", Color::Magenta),
        };
        let text = if item.prerequisites.is_empty() {
            item.text.clone()
        } else {
            format!("{} [{}]", item.text, item.prerequisites.join("; "))
        };
        Row::new(vec![
            Cell::from(Span::styled(kind, Style::default().fg(color))),
            Cell::from(format!("{} {}", item.solution_icon, item.solution_name)),
            Cell::from(text),
        ])
        .style(highlight(i == app.selected_item && app.focus == Focus::Items))
    });

    let t = &app.totals;
    let title = format!(
        " Items: {} ({} use cases, {} prerequisites) | view: {} ",
        t.total, t.use_cases, t.prerequisites, app.view_mode
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Percentage(28),
            Constraint::Percentage(60),
        ],
    )
    .header(header)
    .block(pane_block(title, app.focus == Focus::Items));

    if app.items.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "No items match the current selection.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(pane_block(
            " Items: 0 ".to_string(),
            app.focus == Focus::Items,
        ));
        f.render_widget(empty, area);
    } else {
        f.render_widget(table, area);
    }
}

fn render_plan_list(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["Customer", "Status", "Solutions", "Created"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1);

    let rows = app.plans.iter().enumerate().map(|(i, plan)| {
        let company = if plan.customer_info.company_name.is_empty() {
            "(unnamed)".to_string()
        } else {
            plan.customer_info.company_name.clone()
        };
        let solutions: Vec<&str> = plan.solutions.iter().map(|s| s.name.as_str()).collect();
        Row::new(vec![
            Cell::from(company),
            Cell::from(status_colored(plan.status)),
            Cell::from(solutions.join(", ")),
            Cell::from(plan.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ])
        .style(highlight(i == app.selected_plan))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Length(11),
            Constraint::Percentage(45),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Saved Plans ({}) ", app.plans.len())),
    );

    f.render_widget(table, area);
}

fn render_plan_detail(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.unresolved > 0 {
        format!(" Plan ({} unresolved use cases) ", app.unresolved)
    } else {
        " Plan ".to_string()
    };
    let lines: Vec<Line> = app
        .document_lines
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();

    let doc = Paragraph::new(lines)
        .scroll((app.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(doc, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )])
    };

    let text = vec![
        Line::from(""),
        section("  Navigation"),
        Line::from("    j/Down    Move down"),
        Line::from("    k/Up      Move up"),
        Line::from("    h/l       Switch between solutions and items"),
        Line::from("    Tab       Toggle Dashboard / Saved Plans"),
        Line::from("    Enter     Open plan (Saved Plans)"),
        Line::from("    Esc/q     Back / Quit"),
        Line::from(""),
        section("  Dashboard"),
        Line::from("    Space     Check or uncheck solution"),
        Line::from("    a         Check all / clear all"),
        Line::from("    /         Search (Enter to finish)"),
        Line::from("    x         Clear search"),
        Line::from("    v         Cycle view: all, use cases, prerequisites"),
        Line::from(""),
        section("  Plans"),
        Line::from("    s         Cycle status: draft, approved, completed"),
        Line::from(""),
        section("  Other"),
        Line::from("    r         Reload from store"),
        Line::from("    ?         Show this help"),
        Line::from(""),
    ];

    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Help "));
    f.render_widget(help, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let view_name = match app.current_view {
        View::Dashboard => "Dashboard",
        View::Plans => "Saved Plans",
        View::PlanDetail(_) => "Plan",
        View::Help => "Help",
    };

    let status_msg = app.status_message.as_deref().unwrap_or("");
    let hint = if app.input_mode == InputMode::Search {
        "  typing search, Enter:done"
    } else {
        "  q:quit  ?:help  Tab:switch view"
    };

    let bar = Line::from(vec![
        Span::styled(
            format!(" {view_name} "),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} solutions checked", app.totals.solutions),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw(hint),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// -- Helpers --

fn status_colored(status: PocPlanStatus) -> Span<'static> {
    let color = match status {
        PocPlanStatus::Draft => Color::DarkGray,
        PocPlanStatus::Approved => Color::Cyan,
        PocPlanStatus::Completed => Color::Green,
    };
    Span::styled(status.to_string(), Style::default().fg(color))
}
