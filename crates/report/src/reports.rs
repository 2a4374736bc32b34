//! Report builders. Each lays out its content through [`PageWriter`].

use chrono::{NaiveDate, NaiveTime};
use detailhq_core::coupon::CouponRow;
use detailhq_core::customer::Customer;
use detailhq_core::task::{sort_tasks, Task, TaskStatus};
use detailhq_core::types::Timestamp;

use crate::writer::{Document, FontWeight, PageWriter};

fn format_due(date: Option<NaiveDate>, time: Option<NaiveTime>) -> String {
    match (date, time) {
        (Some(d), Some(t)) => format!("{} {}", d.format("%b %-d, %Y"), t.format("%-I:%M %p")),
        (Some(d), None) => d.format("%b %-d, %Y").to_string(),
        (None, _) => "No due date".to_string(),
    }
}

fn format_rating(rating: Option<u8>) -> String {
    rating.map_or_else(|| "Not rated".to_string(), |r| format!("{r}/5"))
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Tasks grouped by status, each group in priority order.
pub fn task_report(tasks: &[Task], generated_at: Timestamp) -> Document {
    let mut w = PageWriter::default();
    w.title("Task Report");
    w.paragraph(&format!(
        "Generated {} - {} task(s)",
        generated_at.format("%b %-d, %Y %H:%M UTC"),
        tasks.len()
    ));
    w.rule();

    for status in TaskStatus::ALL {
        let mut group: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
        if group.is_empty() {
            continue;
        }
        sort_tasks(&mut group, true);
        w.heading(&format!("{} ({})", status.label(), group.len()));

        for task in group {
            w.bullet(&task.title);
            w.field("Priority", task.priority.label());
            w.field("Due", &format_due(task.due_date, task.due_time));
            if !task.checklist.is_empty() {
                let (done, total) = task.checklist_progress();
                w.field("Checklist", &format!("{done}/{total} done"));
            }
            if !task.assignees.is_empty() {
                w.field("Assigned", &task.assignees.join(", "));
            }
            w.spacer(4.0);
        }
    }

    if tasks.is_empty() {
        w.paragraph("No tasks.");
    }
    w.finish()
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// Service sheet for one customer or prospect.
pub fn customer_report(customer: &Customer, generated_at: Timestamp) -> Document {
    let mut w = PageWriter::default();
    w.title(&format!("Service Sheet: {}", customer.name));
    w.paragraph(&format!(
        "Generated {}",
        generated_at.format("%b %-d, %Y %H:%M UTC")
    ));
    w.rule();

    w.heading("Contact");
    w.field("Name", &customer.name);
    w.field("Type", customer.kind.as_str());
    w.field("Email", or_dash(customer.email.as_deref()));
    w.field("Phone", or_dash(customer.phone.as_deref()));
    w.field("Address", or_dash(customer.address.as_deref()));

    w.heading("Vehicle");
    match &customer.vehicle {
        Some(v) if !v.is_empty() => w.paragraph(&v.describe()),
        _ => w.paragraph("No vehicle on file."),
    }

    w.heading("Condition");
    w.field("Inside", &format_rating(customer.condition_inside));
    w.field("Outside", &format_rating(customer.condition_outside));

    w.heading("Notes");
    if customer.notes.trim().is_empty() {
        w.paragraph("No notes.");
    } else {
        w.paragraph(&customer.notes);
    }

    let media = &customer.media;
    if !media.is_empty() {
        w.heading("Media");
        w.field("Before photos", &media.before.len().to_string());
        w.field("After photos", &media.after.len().to_string());
        w.field("Other photos", &media.general.len().to_string());
        w.field("Videos", &media.videos.len().to_string());
    }

    w.finish()
}

// ---------------------------------------------------------------------------
// Coupons
// ---------------------------------------------------------------------------

/// The coupon table.
pub fn coupon_report(rows: &[CouponRow], generated_at: Timestamp) -> Document {
    let mut w = PageWriter::default();
    w.title("Coupon Summary");
    w.paragraph(&format!(
        "Generated {} - {} coupon(s)",
        generated_at.format("%b %-d, %Y %H:%M UTC"),
        rows.len()
    ));
    w.rule();

    w.row(&["Code", "Type", "Value", "Uses Left", "Status"], FontWeight::Bold);
    for row in rows {
        let uses = row.uses_left.to_string();
        let cells: [&str; 5] = [
            row.code.as_str(),
            row.type_label,
            row.value.as_str(),
            uses.as_str(),
            row.status,
        ];
        w.row(&cells, FontWeight::Regular);
    }
    if rows.is_empty() {
        w.paragraph("No coupons.");
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use detailhq_core::coupon::{Coupon, CouponDraft, CouponValue};
    use detailhq_core::customer::{CustomerDraft, CustomerKind, Vehicle};
    use detailhq_core::task::{Priority, TaskDraft};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 4, 2, 15, 30, 0).unwrap()
    }

    fn all_text(doc: &Document) -> String {
        doc.pages
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn tasks_grouped_by_status_in_priority_order() {
        let mut low = Task::from_draft(
            TaskDraft {
                title: "Vacuum".into(),
                priority: Priority::Low,
                ..Default::default()
            },
            0,
            now(),
        )
        .unwrap();
        let urgent = Task::from_draft(
            TaskDraft {
                title: "Polish hood".into(),
                priority: Priority::Urgent,
                checklist: vec!["Compound".into(), "Finish".into()],
                ..Default::default()
            },
            1,
            now(),
        )
        .unwrap();
        low.set_status(TaskStatus::Completed, now());

        let doc = task_report(&[low, urgent], now());
        let text = all_text(&doc);
        let not_started = text.find("Not started (1)").unwrap();
        let completed = text.find("Completed (1)").unwrap();
        assert!(not_started < completed);
        assert!(text.contains("0/2 done"));
        assert!(text.contains("Urgent"));
    }

    #[test]
    fn many_tasks_paginate() {
        let tasks: Vec<Task> = (0..80)
            .map(|i| {
                Task::from_draft(
                    TaskDraft {
                        title: format!("Task {i}"),
                        ..Default::default()
                    },
                    i,
                    now(),
                )
                .unwrap()
            })
            .collect();
        let doc = task_report(&tasks, now());
        assert!(doc.pages.len() > 1);
    }

    #[test]
    fn customer_sheet_shows_ratings_and_vehicle() {
        let customer = Customer::from_draft(
            CustomerDraft {
                name: "Jordan".into(),
                kind: CustomerKind::Customer,
                vehicle: Some(Vehicle {
                    year: Some(2019),
                    make: Some("Ford".into()),
                    model: Some("F-150".into()),
                    color: None,
                }),
                condition_inside: Some(3),
                ..Default::default()
            },
            now(),
        )
        .unwrap();
        let text = all_text(&customer_report(&customer, now()));
        assert!(text.contains("Service Sheet: Jordan"));
        assert!(text.contains("3/5"));
        assert!(text.contains("Not rated"));
        assert!(text.contains("Ford"));
    }

    #[test]
    fn coupon_rows_listed() {
        let coupon = Coupon::from_draft(
            CouponDraft {
                code: "save10".into(),
                value: CouponValue::Percent(10.0),
                uses_left: 100,
                active: true,
            },
            now(),
        )
        .unwrap();
        let doc = coupon_report(&[coupon.row()], now());
        let text = all_text(&doc);
        assert!(text.contains("SAVE10"));
        assert!(text.contains("Percent"));
        assert!(text.contains("Active"));
    }
}
