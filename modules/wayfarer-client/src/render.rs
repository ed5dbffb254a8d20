//! Terminal rendering of the listing and the day timeline.

use std::fmt::Write;

use console::style;
use wayfarer_common::TripIndexEntry;

use crate::views::DetailView;

pub fn render_index(entries: &[TripIndexEntry]) -> String {
    if entries.is_empty() {
        return format!(
            "{}\n",
            style("No saved trips yet. Run `wayfarer plan` to create one.").dim()
        );
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            style(&entry.id).dim(),
            style(&entry.name).bold(),
            style(&entry.date).cyan()
        );
    }
    out
}

/// Header, day tabs, and the selected day's timeline. The expanded activity
/// shows its address and coordinates; the map markers close the output.
pub fn render_detail(view: &DetailView) -> String {
    let stored = view.trip();
    let trip = &stored.trip;
    let mut out = String::new();

    let _ = writeln!(out, "{}", style(&trip.trip_name).bold().magenta());
    if !trip.description.is_empty() {
        let _ = writeln!(out, "{}", style(&trip.description).dim());
    }
    let _ = writeln!(out);

    let tabs: Vec<String> = trip
        .days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            if i == view.selected_day_index() {
                style(format!("[{}]", day.label())).cyan().bold().to_string()
            } else {
                format!(" {} ", day.label())
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join(" "));

    let Some(day) = view.selected_day() else {
        let _ = writeln!(out, "\n{}", style("This trip has no days.").dim());
        return out;
    };

    let _ = writeln!(out, "\n{}  {}", style(&day.city).bold(), style(&day.date).dim());
    if let Some(ref stay) = day.accommodation {
        let _ = writeln!(out, "{} {}", style("Stay:").yellow(), stay);
    }
    let _ = writeln!(out);

    for (i, activity) in day.activities.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}  {}",
            style(&activity.time).cyan(),
            style(&activity.place).bold()
        );
        let _ = writeln!(out, "         {}", activity.description);
        if view.expanded_activity() == Some(i) {
            if let Some(ref address) = activity.address {
                let _ = writeln!(out, "         {} {}", style("Address:").dim(), address);
            }
            if let Some(point) = activity.map_point() {
                let _ = writeln!(
                    out,
                    "         {} {:.4}, {:.4}",
                    style("At:").dim(),
                    point.lat,
                    point.lng
                );
            }
        }
    }

    let markers = view.markers();
    if !markers.is_empty() {
        let _ = writeln!(out, "\n{}", style("Map").underlined());
        for (i, activity, point) in markers {
            let _ = writeln!(
                out,
                "  {}. {} ({:.4}, {:.4})",
                i + 1,
                activity.place,
                point.lat,
                point.lng
            );
        }
    }
    out
}
