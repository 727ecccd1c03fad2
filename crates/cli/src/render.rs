//! Text and JSON rendering of listing pages

use console::style;
use listing::{ListingPage, ListingRow, NameEntry, NameStatus, Relation};

fn join_names(entries: &[NameEntry]) -> String {
    entries.iter().map(NameEntry::display).collect::<Vec<_>>().join(", ")
}

fn render_row(row: &ListingRow) -> Vec<String> {
    let label = match row.relation {
        Relation::Owner => style(row.label()).green(),
        Relation::Added => style(row.label()).cyan(),
        Relation::Denied => style(row.label()).red(),
        Relation::Unowned => style(row.label()).dim(),
        Relation::Other => style(row.label()),
    };
    let owner = match &row.owner {
        Some(owner) => owner.display(),
        None => "unowned".to_string(),
    };

    let mut lines = vec![format!(
        "{}{}{} {} {} {}",
        style("[").dim(),
        row.number,
        style("]").dim(),
        label,
        style("-").dim(),
        owner
    )];
    if !row.trusted.is_empty() {
        lines.push(format!("    trusted: {}", join_names(&row.trusted)));
    }
    if !row.members.is_empty() {
        lines.push(format!("    members: {}", join_names(&row.members)));
    }
    lines
}

/// Human-readable page
pub fn render_page(page: &ListingPage) -> String {
    let mut lines = vec![format!(
        "{} {}",
        style(&page.title).bold(),
        style(format!("(page {}/{}, {} plots)", page.page_number, page.total_pages, page.total_items)).dim()
    )];

    if page.is_empty() {
        lines.push(style("No plots found").yellow().to_string());
        return lines.join("\n");
    }

    for row in &page.rows {
        lines.extend(render_row(row));
    }

    match page.name_status {
        NameStatus::Complete => {}
        NameStatus::TimedOut { pending } => lines.push(
            style(format!("Still fetching {} player names, showing raw identities", pending))
                .yellow()
                .to_string(),
        ),
        NameStatus::Interrupted => {
            lines.push(style("Player names could not be fetched").yellow().to_string())
        }
    }

    if page.has_next() {
        lines.push(style(format!("More on page {}", page.page_number + 1)).dim().to_string());
    }
    lines.join("\n")
}

/// Pretty-printed JSON page
pub fn render_json(page: &ListingPage) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(page)?)
}
