//! Plain-text views for the terminal.

use recovery_core::catalog::{self, WorkoutDay};
use recovery_core::checklist::Checklist;
use recovery_core::diary;
use recovery_core::{GameState, ProgressEvent, ProgressSummary, Reminder};

pub fn progress(summary: &ProgressSummary) -> String {
    let filled = (summary.percent as usize * 20) / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
    let mut out = format!(
        "Nivel {}  [{}] {:.0}/{:.0} XP ({}%)\nRacha diaria: {} días\n\nLogros:\n",
        summary.level, bar, summary.xp, summary.xp_needed, summary.percent, summary.daily_streak
    );
    for (_, a) in &summary.achievements {
        let mark = if a.unlocked { "🏆" } else { "🔒" };
        out.push_str(&format!("  {} {} - {}\n", mark, a.name, a.description));
    }
    out
}

pub fn plan_overview(completed_today: impl Fn(&str) -> bool) -> String {
    let mut out = String::from("Plan de entrenamiento:\n");
    for day in catalog::CATALOG.iter() {
        let mark = if completed_today(day.id) { "✅" } else { "  " };
        out.push_str(&format!(
            "  {} {:<7} {} ({} ejercicios)\n",
            mark,
            day.id,
            day.title,
            day.exercises.len()
        ));
    }
    out
}

pub fn workout(day: &WorkoutDay, checklist: &Checklist) -> String {
    let mut out = format!("{}\n", day.title);
    for (i, e) in day.exercises.iter().enumerate() {
        let mark = if checklist.get(e.name).copied().unwrap_or(false) {
            "[x]"
        } else {
            "[ ]"
        };
        out.push_str(&format!("  {} {}. {}: {} · {}", mark, i + 1, e.name, e.sets, e.rpe));
        if let Some(link) = e.video_link() {
            out.push_str(&format!("\n         {}", link));
        }
        out.push('\n');
    }
    out
}

pub fn event(event: &ProgressEvent) -> String {
    format!("✨ {} {}", event.title(), event.message())
}

pub fn reminder(reminder: &Reminder) -> String {
    format!("🔔 {}: {}", reminder.title, reminder.message)
}

/// Pain bars oldest first, with that day's stress and sleep alongside.
pub fn pain_history(state: &GameState) -> String {
    let points = diary::pain_history(state);
    if points.is_empty() {
        return "Aún no hay entradas en el diario.".to_string();
    }
    let mut out = String::from("Historial de dolor:\n");
    for (day, pain) in points {
        out.push_str(&format!(
            "  {}  {:>2}/10 {:<10}",
            day.format("%d/%m"),
            pain,
            "▇".repeat(pain as usize)
        ));
        if let Some(log) = state.diary_entry(day) {
            out.push_str(&format!(
                " estrés {:>2}/10 · sueño {}",
                log.stress,
                log.sleep.label()
            ));
        }
        out.push('\n');
    }
    out
}
