//! Static workout plan.
//!
//! Read-only content keyed by day identifier. The plan is also serialized into
//! the coaching persona so the model can answer questions about it.

use serde::Serialize;
use std::collections::BTreeMap;

pub const DAILY: &str = "daily";
pub const WARMUP: &str = "warmup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub name: &'static str,
    /// Prescribed volume, e.g. `3 x 8-10`.
    pub sets: &'static str,
    /// Target effort, e.g. `RPE 6-7`.
    pub rpe: &'static str,
    /// Reference video; `#` means none.
    pub video: &'static str,
}

impl Exercise {
    pub fn video_link(&self) -> Option<&'static str> {
        (self.video != "#" && !self.video.is_empty()).then_some(self.video)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutDay {
    pub id: &'static str,
    pub title: &'static str,
    pub exercises: &'static [Exercise],
}

impl WorkoutDay {
    pub fn kind(&self) -> WorkoutKind {
        WorkoutKind::of(self.id)
    }

    pub fn exercise(&self, name: &str) -> Option<&'static Exercise> {
        self.exercises.iter().find(|e| e.name == name)
    }
}

/// How a completion is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutKind {
    /// Feeds the daily streak, 25 XP.
    Daily,
    /// Supportive, no XP.
    Warmup,
    /// Any other identifier, 75 XP.
    Strength,
}

impl WorkoutKind {
    pub fn of(day_id: &str) -> Self {
        match day_id {
            DAILY => Self::Daily,
            WARMUP => Self::Warmup,
            _ => Self::Strength,
        }
    }
}

const fn ex(name: &'static str, sets: &'static str, rpe: &'static str, video: &'static str) -> Exercise {
    Exercise {
        name,
        sets,
        rpe,
        video,
    }
}

static DAILY_EXERCISES: [Exercise; 6] = [
    ex("Respiración Supina 90/90", "2 series x 8 respiraciones", "RPE 5", "https://www.youtube.com/watch?v=m2OFz37Jp2Q"),
    ex("Gato-Camello", "1 serie x 12 reps", "RPE 5", "https://www.youtube.com/watch?v=K9bK0BwKFjs"),
    ex("Bird-Dog", "2 series x 8 reps/lado", "RPE 5", "https://www.youtube.com/watch?v=d_2a5uGo9aE"),
    ex("Puente de Glúteos", "2 series x 15 reps", "RPE 5", "https://www.youtube.com/watch?v=wPMcfesA0cM"),
    ex("Monster Walks (banda en rodillas)", "2 series x 15 pasos/lado", "RPE 5", "https://www.youtube.com/watch?v=b6-iuaW5-eM"),
    ex("Masaje de Cicatriz", "2-3 minutos", "N/A", "https://www.youtube.com/watch?v=5-P_y-3s5Jg"),
];

static WARMUP_EXERCISES: [Exercise; 2] = [
    ex("Balanceo en Zancada (Psoas)", "1 serie x 12 balanceos/lado", "Movilidad", "https://www.youtube.com/watch?v=L8_fcfx4_5A"),
    ex("Elevaciones Activas de Pierna", "1 serie x 12 reps/lado", "Activación", "https://www.youtube.com/watch?v=Y_Vp-87QMXE"),
];

static DAY1_EXERCISES: [Exercise; 8] = [
    ex("Sentadilla Goblet", "3 x 8-10", "RPE 6-7", "https://www.youtube.com/watch?v=kUR_A1mKp-g"),
    ex("Curl de Isquiotibiales Sentado", "3 x 8-10", "RPE 6-8", "https://www.youtube.com/watch?v=s_1_v_b_a-M"),
    ex("Remo Sentado en Máquina", "3 x 10-12", "RPE 7-8", "https://www.youtube.com/watch?v=GZbfZ033f74"),
    ex("Press Pectoral en Máquina", "3 x 10-12", "RPE 7-8", "https://www.youtube.com/watch?v=Tp9__pShe_c"),
    ex("Curl Femoral Tumbado", "3 x 12-15", "RPE 7-8", "https://www.youtube.com/watch?v=yjmAAe-1D-E"),
    ex("Plancha Frontal", "3 x 30-45 seg", "Tensión constante", "https://www.youtube.com/watch?v=ASdvN_X_k4A"),
    ex("Press Pallof", "3 x 10-12 por lado", "RPE 7", "https://www.youtube.com/watch?v=g--s-z-3H6Y"),
    ex("Cardio: Caminata en Cinta", "15-20 min", "RPE 5-6 (8-12% incl.)", "https://www.youtube.com/watch?v=VDAk9a7vR-Y"),
];

static DAY2_EXERCISES: [Exercise; 8] = [
    ex("Prensa de Piernas", "3 x 10-12", "RPE 6-7", "https://www.youtube.com/watch?v=s8-89-pChyM"),
    ex("Extensiones de Cuádriceps Unilateral", "2-3 x 8/lado", "RPE 6-8", "https://www.youtube.com/watch?v=Fk7i2g7d_5w"),
    ex("Patada de Glúteo en Máquina", "3 x 8-10/lado", "RPE 6-8", "https://www.youtube.com/watch?v=9_F3V3s-g9I"),
    ex("Jalón al Pecho", "3 x 10-12", "RPE 7-8", "https://www.youtube.com/watch?v=0oeIB6wi_J0"),
    ex("Press de Hombros Sentado", "3 x 10-12", "RPE 7-8", "https://www.youtube.com/watch?v=qEwKCR5-j_Q"),
    ex("Face Pull con Cuerda", "3 x 15-20", "RPE 7", "https://www.youtube.com/watch?v=eIq5CB9wyo4"),
    ex("Paseo del Granjero", "3 x 30-40 m", "Desafiante", "https://www.youtube.com/watch?v=gPSoiR0-OoI"),
    ex("Cardio: Remo Ergómetro", "10-15 min", "RPE 6", "https://www.youtube.com/watch?v=H0r_ZPXJLtg"),
];

static DAY3_EXERCISES: [Exercise; 7] = [
    ex("Peso Muerto Rumano", "3 x 10-12", "RPE 6-7", "https://www.youtube.com/watch?v=2r5a-63B-e8"),
    ex("Remo a una Mano", "3 x 10-12", "RPE 7-8", "https://www.youtube.com/watch?v=PgpQ4-jHiq4"),
    ex("Hip Thrust", "3 x 12-15", "RPE 7-8", "https://www.youtube.com/watch?v=xDmFkJxPzeM"),
    ex("Rotación Externa (Hombro)", "3 x 15", "RPE 6", "https://www.youtube.com/watch?v=3-20n_P_aGw"),
    ex("Jefferson Curl", "2 x 8", "RPE 3-4 (Movilidad)", "https://www.youtube.com/watch?v=Ra-h8S4-QZI"),
    ex("Press Pallof", "3 x 10-12 por lado", "RPE 7", "https://www.youtube.com/watch?v=g--s-z-3H6Y"),
    ex("Cardio Opcional", "15 min", "RPE 5-6", "#"),
];

/// Display order of the plan.
pub static CATALOG: [WorkoutDay; 5] = [
    WorkoutDay {
        id: DAILY,
        title: "Higiene Postural y Activación (RPE 5)",
        exercises: &DAILY_EXERCISES,
    },
    WorkoutDay {
        id: WARMUP,
        title: "Calentamiento Específico (Antes de cada sesión de Fuerza)",
        exercises: &WARMUP_EXERCISES,
    },
    WorkoutDay {
        id: "day1",
        title: "Día 1: Full Body",
        exercises: &DAY1_EXERCISES,
    },
    WorkoutDay {
        id: "day2",
        title: "Día 2: Full Body",
        exercises: &DAY2_EXERCISES,
    },
    WorkoutDay {
        id: "day3",
        title: "Día 3: Full Body",
        exercises: &DAY3_EXERCISES,
    },
];

pub fn workout(day_id: &str) -> Option<&'static WorkoutDay> {
    CATALOG.iter().find(|d| d.id == day_id)
}

pub fn day_ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|d| d.id)
}

/// The plan as pretty JSON (`{day_id: [exercise, ...]}`), for prompts.
pub fn catalog_json() -> serde_json::Result<String> {
    let plan: BTreeMap<&str, &[Exercise]> = CATALOG.iter().map(|d| (d.id, d.exercises)).collect();
    serde_json::to_string_pretty(&plan)
}
