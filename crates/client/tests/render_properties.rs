use mdl_client::render::{escape_html, format_eta, render, Tier};
use mdl_client::task::{TaskSnapshot, TaskStatus};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(vec![
        TaskStatus::Queued,
        TaskStatus::Downloading,
        TaskStatus::Processing,
        TaskStatus::Completed,
        TaskStatus::Error,
    ])
}

fn snapshot_strategy() -> impl Strategy<Value = TaskSnapshot> {
    (
        status_strategy(),
        0.0_f64..=100.0_f64,
        prop::option::of(0.0_f64..1e9_f64),
        prop::option::of(-10.0_f64..1e6_f64),
        prop::option::of("[a-zA-Z0-9<>&\"' ._-]{0,24}"),
        0_u32..5_u32,
        prop::option::of("[a-zA-Z0-9<>&\"' ._-]{0,24}"),
    )
        .prop_map(|(status, progress, speed, eta, filename, failed_items, error)| {
            TaskSnapshot {
                progress,
                speed,
                eta,
                filename,
                failed_items,
                error,
                ..TaskSnapshot::new(status)
            }
        })
}

/// **Feature: media-download-client, Property 1: Tier selection**
/// *For any* snapshot, the tier is Error for `error`, Success for `completed`,
/// Warning when items failed, and Neutral otherwise
#[test]
fn property_tier_selection() {
    proptest!(|(task in snapshot_strategy())| {
        let expected = match task.status {
            TaskStatus::Error => Tier::Error,
            TaskStatus::Completed => Tier::Success,
            _ if task.failed_items > 0 => Tier::Warning,
            _ => Tier::Neutral,
        };
        prop_assert_eq!(render(&task).tier, expected);
    });
}

/// **Feature: media-download-client, Property 2: Progress bounds**
/// *For any* snapshot, the progress element and row appear exactly when
/// progress is strictly inside (0, 100)
#[test]
fn property_progress_bar_bounds() {
    proptest!(|(task in snapshot_strategy())| {
        let view = render(&task);

        // Both ends are excluded
        let inside = task.progress > 0.0 && task.progress < 100.0;
        prop_assert_eq!(view.has_progress_bar(), inside);
        prop_assert_eq!(view.row("Progress").is_some(), inside);
        if inside {
            // One decimal, ties rounded up
            let expected = format!("{:.1}%", (task.progress * 10.0).round() / 10.0);
            prop_assert_eq!(view.row("Progress"), Some(expected.as_str()));
        }
    });
}

/// **Feature: media-download-client, Property 3: Speed and ETA pairing**
/// *For any* snapshot, the Speed and ETA rows appear together or not at all
#[test]
fn property_speed_eta_paired() {
    proptest!(|(task in snapshot_strategy())| {
        let view = render(&task);
        prop_assert_eq!(view.row("Speed").is_some(), view.row("ETA").is_some());
        // Zero in either value suppresses both
        let present = matches!((task.speed, task.eta), (Some(s), Some(e)) if s != 0.0 && e != 0.0);
        prop_assert_eq!(view.row("Speed").is_some(), present);
    });
}

/// **Feature: media-download-client, Property 4: Status row first**
/// *For any* snapshot, the first row is the capitalized status
#[test]
fn property_status_row_first() {
    proptest!(|(task in snapshot_strategy())| {
        let view = render(&task);
        let first = view.rows().next().expect("status row");
        prop_assert_eq!(first.label, "Status");
        let mut chars = first.value.chars();
        prop_assert!(chars.next().map(|c| c.is_uppercase()).unwrap_or(false));
        prop_assert_eq!(first.value.to_lowercase(), task.status.as_str());
    });
}

/// **Feature: media-download-client, Property 5: Markup escaping**
/// *For any* filename or error text, the markup carries only its escaped form
#[test]
fn property_markup_escapes_task_text() {
    proptest!(|(task in snapshot_strategy())| {
        let html = render(&task).to_html();
        for text in [&task.filename, &task.error].into_iter().flatten() {
            if !text.is_empty() {
                prop_assert!(html.contains(escape_html(text).as_str()));
            }
        }
        // Only our own tags remain
        let tags = html.matches('<').count();
        let closers = html.matches('>').count();
        prop_assert_eq!(tags, closers);
    });
}

/// **Feature: media-download-client, Property 6: ETA units**
/// *For any* remaining time, the text is a whole number with one unit suffix,
/// or "Unknown" when not positive
#[test]
fn property_eta_units() {
    proptest!(|(eta in -1e4_f64..1e6_f64)| {
        let text = format_eta(Some(eta));
        if eta <= 0.0 {
            prop_assert_eq!(text, "Unknown");
        } else {
            let unit = if eta < 60.0 { 's' } else if eta < 3600.0 { 'm' } else { 'h' };
            prop_assert!(text.ends_with(unit), "{} -> {}", eta, text);
            let number = &text[..text.len() - 1];
            prop_assert!(number.parse::<u64>().is_ok(), "{} -> {}", eta, text);
        }
    });
}
