//! Observable results of a state transition.

use serde::Serialize;

use crate::catalog::{WorkoutKind, workout};
use crate::state::GameState;

/// Something the user should be told about, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    WorkoutCompleted { day_id: String },
    StreakExtended { streak: u32 },
    XpGained { amount: f64 },
    /// One per level gained, ascending.
    LevelUp { level: u32 },
    AchievementUnlocked { id: String, name: String },
    DiarySaved { date: String },
}

impl ProgressEvent {
    pub fn title(&self) -> &'static str {
        match self {
            Self::WorkoutCompleted { .. } => "¡Entreno Completo!",
            Self::StreakExtended { .. } => "¡Racha!",
            Self::XpGained { .. } => "XP Ganados",
            Self::LevelUp { .. } => "¡Subida de Nivel!",
            Self::AchievementUnlocked { .. } => "¡Logro!",
            Self::DiarySaved { .. } => "Diario Guardado",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::WorkoutCompleted { day_id } => match WorkoutKind::of(day_id) {
                WorkoutKind::Daily => "¡Rutina diaria completada!".to_string(),
                WorkoutKind::Warmup => "Calentamiento completado. ¡A por la fuerza!".to_string(),
                WorkoutKind::Strength => {
                    let label = workout(day_id)
                        .map(|_| day_id.replace("day", "Día "))
                        .unwrap_or_else(|| day_id.clone());
                    format!("¡Entrenamiento del {} completado!", label)
                }
            },
            Self::StreakExtended { streak } => format!("Racha actual: {} días.", streak),
            Self::XpGained { amount } => format!("¡Has ganado {} XP!", amount),
            Self::LevelUp { level } => format!("¡Felicidades! Has subido al Nivel {}", level),
            Self::AchievementUnlocked { name, .. } => format!("Logro Desbloqueado: {}", name),
            Self::DiarySaved { .. } => "¡Tu diario ha sido actualizado!".to_string(),
        }
    }
}

/// A new snapshot plus the events that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<ProgressEvent>,
}

impl Transition {
    /// The no-op transition: same state, nothing to report.
    pub fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_message_uses_day_label() {
        let ev = ProgressEvent::WorkoutCompleted {
            day_id: "day2".into(),
        };
        assert_eq!(ev.message(), "¡Entrenamiento del Día 2 completado!");
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let ev = ProgressEvent::LevelUp { level: 3 };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"kind":"level_up","level":3}"#);
    }
}
