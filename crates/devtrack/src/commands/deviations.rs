//! Deviation command handlers: list, get, create, update, delete, view.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;

use devtrack_core::{
    CreateDeviation, Deviation, DeviationFacade, DeviationFilters, DeviationForm,
    DeviationPriority, DeviationStatus, FormField, ListParams, UpdateDeviation,
    resolve_deviation,
};

use crate::cli::{CreateArgs, GlobalOpts, ListArgs, OutputFormat, UpdateArgs};
use crate::error::CliError;
use crate::output::{self, priority_badge, should_color, status_badge};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Due")]
    due: String,
}

fn to_row(d: &Deviation, color: bool) -> DeviationRow {
    DeviationRow {
        id: d.id.clone(),
        title: truncate(&d.title, 48),
        status: status_badge(d.status, color),
        priority: priority_badge(d.priority, color),
        category: d.category.clone(),
        assignee: d.assigned_to.clone().unwrap_or_else(|| "-".into()),
        due: d
            .due_date
            .map_or_else(|| "-".into(), |dt| dt.date_naive().to_string()),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

// ── Detail blocks ───────────────────────────────────────────────────

fn detail(d: &Deviation, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", d.id),
        format!("Title:       {}", d.title),
        format!("Status:      {}", status_badge(d.status, color)),
        format!("Priority:    {}", priority_badge(d.priority, color)),
        format!("Category:    {}", d.category),
        format!(
            "Assigned To: {}",
            d.assigned_to.as_deref().unwrap_or("-")
        ),
        format!(
            "Due Date:    {}",
            d.due_date
                .map_or_else(|| "-".into(), |dt| dt.date_naive().to_string())
        ),
    ];
    if let Some(tags) = d.tags.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("Tags:        {}", tags.join(", ")));
    }
    lines.push(format!("Created By:  {}", d.created_by));
    lines.push(format!("Created:     {}", d.created_at.format("%Y-%m-%d %H:%M")));
    lines.push(format!("Updated:     {}", d.updated_at.format("%Y-%m-%d %H:%M")));
    lines.push(String::new());
    lines.push(d.description.clone());
    lines.join("\n")
}

/// Read-only view: no assignment or audit fields.
fn public_detail(d: &Deviation, color: bool) -> String {
    let mut out = format!(
        "{}\n{}  {}  ·  {}\n",
        d.title,
        status_badge(d.status, color),
        priority_badge(d.priority, color),
        d.category,
    );
    if let Some(due) = d.due_date {
        let _ = writeln!(out, "Due {}", due.date_naive());
    }
    let _ = write!(out, "\n{}", d.description);
    out
}

fn summary<K: Copy>(
    title: &str,
    counts: &BTreeMap<K, usize>,
    label: impl Fn(K) -> &'static str,
) -> String {
    let parts: Vec<String> = counts
        .iter()
        .map(|(k, n)| format!("{}: {n}", label(*k)))
        .collect();
    if parts.is_empty() {
        format!("{title}: none")
    } else {
        format!("{title}: {}", parts.join(", "))
    }
}

// ── list ────────────────────────────────────────────────────────────

pub async fn list(
    facade: &DeviationFacade,
    args: ListArgs,
    global: &GlobalOpts,
    page_size: u32,
) -> Result<(), CliError> {
    let search = args.search.filter(|s| !s.trim().is_empty());
    let params = ListParams {
        page: args.page,
        page_size: Some(args.page_size.unwrap_or(page_size)),
        search: search.clone(),
        sort_by: args.sort_by,
        sort_order: args.sort_order.map(Into::into),
        ..ListParams::default()
    };

    let loaded = util::with_spinner(
        global,
        "Loading deviations",
        facade.load_list(Some(&params)),
    )
    .await;
    if !loaded {
        return Err(util::failure(facade, None));
    }

    facade.set_filters(DeviationFilters {
        status: args.status.map(Into::into),
        priority: args.priority.map(Into::into),
        search,
    });

    let color = should_color(&global.color);
    let records = facade.filtered();
    let out = output::render_list(
        &global.output,
        &records,
        |d| to_row(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        let p = facade.pagination();
        println!(
            "Page {} of {} ({} total, {} shown)",
            p.page,
            p.page_count().max(1),
            p.total,
            records.len()
        );
    }

    if args.summary && !global.quiet {
        let status = summary("By status", &facade.counts_by_status(), DeviationStatus::label);
        let priority = summary(
            "By priority",
            &facade.counts_by_priority(),
            DeviationPriority::label,
        );
        println!("{status}\n{priority}");
    }
    Ok(())
}

// ── get / view ──────────────────────────────────────────────────────

async fn fetch(
    facade: &DeviationFacade,
    id: &str,
    global: &GlobalOpts,
) -> Result<Arc<Deviation>, CliError> {
    util::with_spinner(global, "Loading deviation", resolve_deviation(facade, Some(id)))
        .await
        .ok_or_else(|| util::failure(facade, Some(id)))
}

pub async fn get(facade: &DeviationFacade, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let record = fetch(facade, id, global).await?;
    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        record.as_ref(),
        |d| detail(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn view(facade: &DeviationFacade, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let record = fetch(facade, id, global).await?;
    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        record.as_ref(),
        |d| public_detail(d, color),
        |d| d.title.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── create ──────────────────────────────────────────────────────────

fn form_from_args(args: CreateArgs) -> DeviationForm {
    let mut form = DeviationForm::new();
    form.set(FormField::Title, args.title.unwrap_or_default());
    form.set(FormField::Description, args.description.unwrap_or_default());
    form.set(FormField::Category, args.category.unwrap_or_default());
    form.set_priority(args.priority.into());
    if let Some(assignee) = args.assigned_to {
        form.set(FormField::AssignedTo, assignee);
    }
    if let Some(due) = args.due_date {
        form.set(FormField::DueDate, due);
    }
    if !args.tags.is_empty() {
        form.set_tags(&args.tags);
    }
    form
}

fn form_from_payload(payload: &CreateDeviation) -> DeviationForm {
    let mut form = DeviationForm::new();
    form.set(FormField::Title, payload.title.as_str());
    form.set(FormField::Description, payload.description.as_str());
    form.set(FormField::Category, payload.category.as_str());
    form.set_priority(payload.priority);
    if let Some(ref assignee) = payload.assigned_to {
        form.set(FormField::AssignedTo, assignee.as_str());
    }
    if let Some(due) = payload.due_date {
        form.set(FormField::DueDate, due.to_rfc3339());
    }
    if let Some(ref tags) = payload.tags {
        form.set_tags(tags);
    }
    form
}

pub async fn create(
    facade: &DeviationFacade,
    args: CreateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let form = match args.from_file {
        Some(ref path) => form_from_payload(&util::read_json_file(path)?),
        None => form_from_args(args),
    };
    let payload = form.to_create()?;

    let created = util::with_spinner(global, "Creating deviation", facade.create(&payload))
        .await
        .ok_or_else(|| util::failure(facade, None))?;

    if !global.quiet {
        eprintln!("✓ Created deviation {}", created.id);
    }
    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &created,
        |d| detail(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── update ──────────────────────────────────────────────────────────

fn apply_args(form: &mut DeviationForm, args: UpdateArgs) {
    if let Some(title) = args.title {
        form.set(FormField::Title, title);
    }
    if let Some(description) = args.description {
        form.set(FormField::Description, description);
    }
    if let Some(status) = args.status {
        form.set_status(status.into());
    }
    if let Some(priority) = args.priority {
        form.set_priority(priority.into());
    }
    if let Some(category) = args.category {
        form.set(FormField::Category, category);
    }
    if let Some(assignee) = args.assigned_to {
        form.set(FormField::AssignedTo, assignee);
    }
    if let Some(due) = args.due_date {
        form.set(FormField::DueDate, due);
    }
    if let Some(tags) = args.tags {
        form.set_tags(&tags);
    }
}

fn apply_payload(form: &mut DeviationForm, payload: &UpdateDeviation) {
    if let Some(ref title) = payload.title {
        form.set(FormField::Title, title.as_str());
    }
    if let Some(ref description) = payload.description {
        form.set(FormField::Description, description.as_str());
    }
    if let Some(status) = payload.status {
        form.set_status(status);
    }
    if let Some(priority) = payload.priority {
        form.set_priority(priority);
    }
    if let Some(ref category) = payload.category {
        form.set(FormField::Category, category.as_str());
    }
    if let Some(ref assignee) = payload.assigned_to {
        form.set(FormField::AssignedTo, assignee.as_str());
    }
    if let Some(due) = payload.due_date {
        form.set(FormField::DueDate, due.date_naive().to_string());
    }
    if let Some(ref tags) = payload.tags {
        form.set_tags(tags);
    }
}

pub async fn update(
    facade: &DeviationFacade,
    args: UpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let requested: Option<UpdateDeviation> = match args.from_file {
        Some(ref path) => Some(util::read_json_file(path)?),
        None => None,
    };

    let id = args.id.clone();
    let current = fetch(facade, &id, global).await?;
    let mut form = DeviationForm::edit(&current);
    match requested {
        Some(ref payload) => apply_payload(&mut form, payload),
        None => apply_args(&mut form, args),
    }

    let payload = form.to_update()?;
    if payload.is_empty() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "no changes requested".into(),
        });
    }

    let updated = util::with_spinner(global, "Updating deviation", facade.update(&id, &payload))
        .await
        .ok_or_else(|| util::failure(facade, Some(&id)))?;

    if !global.quiet {
        eprintln!("✓ Updated deviation {}", updated.id);
    }
    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &updated,
        |d| detail(d, color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── delete ──────────────────────────────────────────────────────────

pub async fn delete(
    facade: &DeviationFacade,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm(&format!("Delete deviation '{id}'?"), "delete", global.yes)? {
        if !global.quiet {
            eprintln!("Aborted.");
        }
        return Ok(());
    }

    if !util::with_spinner(global, "Deleting deviation", facade.delete(id)).await {
        return Err(util::failure(facade, Some(id)));
    }
    if !global.quiet {
        eprintln!("✓ Deleted deviation {id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeZone, Utc};

    use super::*;

    fn record() -> Deviation {
        Deviation {
            id: "dev-7".into(),
            title: "Pump Leak".into(),
            description: "Oil pooling under pump 3".into(),
            status: DeviationStatus::Open,
            priority: DeviationPriority::High,
            category: "Equipment".into(),
            created_by: "alice".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
            assigned_to: None,
            due_date: Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()),
            tags: Some(vec!["pump".into()]),
        }
    }

    #[test]
    fn row_uses_placeholders_for_missing_fields() {
        let row = to_row(&record(), false);
        assert_eq!(row.assignee, "-");
        assert_eq!(row.due, "2026-04-01");
        assert_eq!(row.status, "Open");
    }

    #[test]
    fn public_detail_hides_audit_fields() {
        let text = public_detail(&record(), false);
        assert!(text.contains("Pump Leak"));
        assert!(text.contains("Due 2026-04-01"));
        assert!(!text.contains("alice"));
    }

    #[test]
    fn truncate_long_titles() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn update_args_produce_only_changed_fields() {
        let mut form = DeviationForm::edit(&record());
        apply_args(
            &mut form,
            UpdateArgs {
                id: "dev-7".into(),
                title: Some("Pump Leak".into()),
                description: None,
                status: Some(crate::cli::StatusArg::Closed),
                priority: None,
                category: None,
                assigned_to: None,
                due_date: None,
                tags: None,
                from_file: None,
            },
        );
        let update = form.to_update().unwrap();
        assert_eq!(update.status, Some(DeviationStatus::Closed));
        assert_eq!(update.title, None);
    }

    #[test]
    fn create_payload_round_trips_through_form() {
        let payload = CreateDeviation {
            title: "Pump Leak".into(),
            description: "Oil pooling under pump 3".into(),
            priority: DeviationPriority::Critical,
            category: "Equipment".into(),
            assigned_to: Some("bob".into()),
            due_date: None,
            tags: Some(vec!["pump".into(), "oil".into()]),
        };
        assert_eq!(form_from_payload(&payload).to_create().unwrap(), payload);
    }

    #[test]
    fn comma_tags_survive_every_input_path() {
        let tag = "ISO 9001, clause 7".to_owned();

        let payload = CreateDeviation {
            title: "Pump Leak".into(),
            description: "Oil pooling under pump 3".into(),
            priority: DeviationPriority::High,
            category: "Equipment".into(),
            assigned_to: None,
            due_date: None,
            tags: Some(vec![tag.clone()]),
        };
        let created = form_from_payload(&payload).to_create().unwrap();
        assert_eq!(created.tags, Some(vec![tag.clone()]));

        let args = CreateArgs {
            title: Some("Pump Leak".into()),
            description: Some("Oil pooling under pump 3".into()),
            priority: crate::cli::PriorityArg::Medium,
            category: Some("Equipment".into()),
            assigned_to: None,
            due_date: None,
            tags: vec![tag.clone(), "pump".into()],
            from_file: None,
        };
        let created = form_from_args(args).to_create().unwrap();
        assert_eq!(created.tags, Some(vec![tag.clone(), "pump".to_owned()]));

        let mut form = DeviationForm::edit(&record());
        apply_payload(
            &mut form,
            &UpdateDeviation {
                tags: Some(vec![tag.clone()]),
                ..UpdateDeviation::default()
            },
        );
        assert_eq!(form.to_update().unwrap().tags, Some(vec![tag]));
    }

    #[test]
    fn status_change_ignores_untouched_short_description() {
        let mut current = record();
        current.description = "oil".into();
        let mut form = DeviationForm::edit(&current);
        apply_args(
            &mut form,
            UpdateArgs {
                id: "dev-7".into(),
                title: None,
                description: None,
                status: Some(crate::cli::StatusArg::Closed),
                priority: None,
                category: None,
                assigned_to: None,
                due_date: None,
                tags: None,
                from_file: None,
            },
        );
        let update = form.to_update().unwrap();
        assert_eq!(update.status, Some(DeviationStatus::Closed));
        assert_eq!(update.description, None);
    }

    #[test]
    fn summary_lists_present_keys_only() {
        let mut counts = BTreeMap::new();
        counts.insert(DeviationStatus::Open, 2);
        assert_eq!(
            summary("By status", &counts, DeviationStatus::label),
            "By status: Open: 2"
        );
        assert_eq!(
            summary("By status", &BTreeMap::<DeviationStatus, usize>::new(), DeviationStatus::label),
            "By status: none"
        );
    }
}
