//! Aggregates derived from the payload: compliance percentages, traffic-light
//! levels and the per-dimension summaries the report pages are built from.

use crate::payload::{ChartEntry, Dimension, ReportData};

/// Longer texts are descriptions rather than questions and are left out.
pub const MAX_QUESTION_CHARS: usize = 300;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overall {
    pub total: f64,
    pub attended: f64,
    pub pct_vs_100: f64,
    pub pct_vs_80: f64,
}

pub fn overall(data: &ReportData) -> Overall {
    let (total, attended) = data
        .dimensiones
        .iter()
        .flat_map(|d| &d.subdimensiones)
        .fold((0.0, 0.0), |(t, a), s| {
            (t + s.total_indicadores, a + s.indicadores_atendidos)
        });
    let (pct_vs_100, pct_vs_80) = if total > 0.0 {
        (attended / total * 100.0, attended / (total * 0.8) * 100.0)
    } else {
        (0.0, 0.0)
    };
    Overall {
        total,
        attended,
        pct_vs_100,
        pct_vs_80,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Alto,
    Medio,
    Bajo,
}

impl Level {
    /// Case-insensitive; anything unrecognised counts as `Bajo`.
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_lowercase()).as_deref() {
            Some("alto") => Level::Alto,
            Some("medio") => Level::Medio,
            _ => Level::Bajo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Alto => "Alto",
            Level::Medio => "Medio",
            Level::Bajo => "Bajo",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubdimensionRow {
    pub id: String,
    pub nombre: String,
    pub total: f64,
    pub attended: f64,
    pub pct_vs_100: f64,
    pub pct_vs_80: f64,
    pub level: Level,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionGroup {
    pub subdimension: String,
    /// `(number, text)`, numbered continuously across the dimension.
    pub questions: Vec<(usize, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DimensionSummary {
    pub label: String,
    pub nombre: String,
    pub rows: Vec<SubdimensionRow>,
    pub pct_attended: f64,
    pub unattended: Vec<QuestionGroup>,
}

impl DimensionSummary {
    /// `"{label}. {nombre}"`, as shown in titles.
    pub fn title(&self) -> String {
        format!("{}. {}", self.label, self.nombre)
    }

    /// Number of the unattended-questions table: the leading digits of the
    /// title when followed by a dot.
    pub fn table_number(&self) -> Option<String> {
        let title = self.title();
        let digits: String = title.chars().take_while(char::is_ascii_digit).collect();
        let rest = &title[digits.len()..];
        (!digits.is_empty() && rest.starts_with('.')).then_some(digits)
    }
}

/// `orden`, falling back to `id`, then to the 1-based position.
fn dimension_label(dim: &Dimension, position: usize) -> String {
    dim.orden
        .as_ref()
        .or(dim.id.as_ref())
        .map(ToString::to_string)
        .unwrap_or_else(|| position.to_string())
}

pub fn summarize(dim: &Dimension, position: usize) -> DimensionSummary {
    let label = dimension_label(dim, position);

    let rows = dim
        .subdimensiones
        .iter()
        .enumerate()
        .map(|(k, sub)| {
            let meta = sub.meta_80();
            SubdimensionRow {
                id: format!("{label}.{}", k + 1),
                nombre: sub.nombre.clone(),
                total: sub.total_indicadores,
                attended: sub.indicadores_atendidos,
                pct_vs_100: sub.porcentaje,
                pct_vs_80: if meta > 0.0 {
                    sub.indicadores_atendidos / meta * 100.0
                } else {
                    0.0
                },
                level: Level::parse(sub.semaforo.as_deref()),
            }
        })
        .collect();

    let total: f64 = dim.subdimensiones.iter().map(|s| s.total_indicadores).sum();
    let attended: f64 = dim
        .subdimensiones
        .iter()
        .map(|s| s.indicadores_atendidos)
        .sum();
    let pct_attended = if total > 0.0 {
        attended / total * 100.0
    } else {
        0.0
    };

    // Group by subdimension name, keeping first-seen order
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for sub in &dim.subdimensiones {
        for ind in &sub.indicadores_no_atendidos {
            match groups.iter_mut().find(|(name, _)| *name == sub.nombre) {
                Some((_, texts)) => texts.push(ind.texto.clone()),
                None => groups.push((sub.nombre.clone(), vec![ind.texto.clone()])),
            }
        }
    }
    let mut number = 0usize;
    let unattended = groups
        .into_iter()
        .map(|(subdimension, texts)| QuestionGroup {
            subdimension,
            questions: texts
                .into_iter()
                .filter(|t| t.chars().count() <= MAX_QUESTION_CHARS)
                .map(|t| {
                    number += 1;
                    (number, t)
                })
                .collect(),
        })
        .collect();

    DimensionSummary {
        label,
        nombre: dim.nombre.clone(),
        rows,
        pct_attended,
        unattended,
    }
}

pub fn summarize_all(data: &ReportData) -> Vec<DimensionSummary> {
    data.dimensiones
        .iter()
        .enumerate()
        .map(|(i, d)| summarize(d, i + 1))
        .collect()
}

/// Mean of the chart percentages; 0 without chart data.
pub fn gauge_value(chart: &[ChartEntry]) -> f64 {
    if chart.is_empty() {
        return 0.0;
    }
    chart.iter().map(|c| c.porcentaje).sum::<f64>() / chart.len() as f64
}

/// `$1,234.56`; negatives read `$-950.00`.
pub fn format_currency(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = (v.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${sign}{grouped}.{frac:02}")
}

/// Integral counts without a decimal part, everything else as given.
pub fn format_count(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
