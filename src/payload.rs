//! Request model for `POST /generar-pdf`.
//!
//! Field names follow the JSON wire format sent by the self-assessment
//! front-end, so they stay in Spanish.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Deserialize `null` the same way as a missing field.
fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

/// A value printed exactly as it was sent, number or text.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Number(Number::from(0))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Organization {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub responsable: Option<String>,
    #[serde(default)]
    pub cargo_responsable: Option<String>,
    #[serde(default)]
    pub fecha_aplicacion: Option<String>,
    #[serde(default)]
    pub folio: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UnattendedIndicator {
    #[serde(default, deserialize_with = "nullable")]
    pub texto: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Subdimension {
    #[serde(default, deserialize_with = "nullable")]
    pub nombre: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_indicadores: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub indicadores_atendidos: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub porcentaje: f64,
    #[serde(default)]
    pub meta_80: Option<f64>,
    #[serde(default)]
    pub semaforo: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub indicadores_no_atendidos: Vec<UnattendedIndicator>,
}

impl Subdimension {
    /// Target for the 80 % comparison; absent means 1.
    pub fn meta_80(&self) -> f64 {
        self.meta_80.unwrap_or(1.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Dimension {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub orden: Option<Scalar>,
    #[serde(default, deserialize_with = "nullable")]
    pub nombre: String,
    #[serde(default, deserialize_with = "nullable")]
    pub subdimensiones: Vec<Subdimension>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChartEntry {
    #[serde(rename = "dimensionNombre", default, deserialize_with = "nullable")]
    pub dimension_nombre: String,
    #[serde(default, deserialize_with = "nullable")]
    pub porcentaje: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SexComposition {
    #[serde(default)]
    pub pregunta_texto: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cantidad_mujeres: Scalar,
    #[serde(default, deserialize_with = "nullable")]
    pub cantidad_hombres: Scalar,
    #[serde(default, deserialize_with = "nullable")]
    pub diferencia: Scalar,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SalaryGap {
    #[serde(default)]
    pub categoria_nombre: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cantidad_hombres: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub cantidad_mujeres: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub diferencia: f64,
}

/// Harassment complaint counters, split by population and sex.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Complaints {
    #[serde(default)]
    pub quejas_personal_recibidas_mujeres: Option<Scalar>,
    #[serde(default)]
    pub quejas_personal_recibidas_hombres: Option<Scalar>,
    #[serde(default)]
    pub quejas_personal_resueltas_mujeres: Option<Scalar>,
    #[serde(default)]
    pub quejas_personal_resueltas_hombres: Option<Scalar>,
    #[serde(default)]
    pub quejas_estudiantes_recibidas_mujeres: Option<Scalar>,
    #[serde(default)]
    pub quejas_estudiantes_recibidas_hombres: Option<Scalar>,
    #[serde(default)]
    pub quejas_estudiantes_resueltas_mujeres: Option<Scalar>,
    #[serde(default)]
    pub quejas_estudiantes_resueltas_hombres: Option<Scalar>,
}

impl Complaints {
    /// `(label, mujeres, hombres)` in display order; missing counters read as 0.
    pub fn rows(&self) -> [(&'static str, Scalar, Scalar); 4] {
        let v = |s: &Option<Scalar>| s.clone().unwrap_or_default();
        [
            (
                "Quejas Personal - Recibidas",
                v(&self.quejas_personal_recibidas_mujeres),
                v(&self.quejas_personal_recibidas_hombres),
            ),
            (
                "Quejas Personal - Resueltas",
                v(&self.quejas_personal_resueltas_mujeres),
                v(&self.quejas_personal_resueltas_hombres),
            ),
            (
                "Quejas Estudiantes - Recibidas",
                v(&self.quejas_estudiantes_recibidas_mujeres),
                v(&self.quejas_estudiantes_recibidas_hombres),
            ),
            (
                "Quejas Estudiantes - Resueltas",
                v(&self.quejas_estudiantes_resueltas_mujeres),
                v(&self.quejas_estudiantes_resueltas_hombres),
            ),
        ]
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.quejas_personal_recibidas_mujeres,
            &self.quejas_personal_recibidas_hombres,
            &self.quejas_personal_resueltas_mujeres,
            &self.quejas_personal_resueltas_hombres,
            &self.quejas_estudiantes_recibidas_mujeres,
            &self.quejas_estudiantes_recibidas_hombres,
            &self.quejas_estudiantes_resueltas_mujeres,
            &self.quejas_estudiantes_resueltas_hombres,
        ]
        .iter()
        .all(|v| v.is_none())
    }
}

/// Attention counts for women.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Attentions {
    #[serde(default)]
    pub atencion_reclutamiento: Option<Scalar>,
    #[serde(default)]
    pub atencion_procesos_laborales: Option<Scalar>,
    #[serde(default)]
    pub atencion_estudiantes: Option<Scalar>,
}

impl Attentions {
    pub fn rows(&self) -> [(&'static str, Scalar); 3] {
        let v = |s: &Option<Scalar>| s.clone().unwrap_or_default();
        [
            ("Atención en Reclutamiento", v(&self.atencion_reclutamiento)),
            (
                "Atención en Procesos Laborales",
                v(&self.atencion_procesos_laborales),
            ),
            ("Atención a Estudiantes", v(&self.atencion_estudiantes)),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.atencion_reclutamiento.is_none()
            && self.atencion_procesos_laborales.is_none()
            && self.atencion_estudiantes.is_none()
    }
}

/// Complete report request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ReportData {
    pub organizacion: Organization,
    /// Summary figures computed by the front-end; logged, not rendered.
    pub metadata: Map<String, Value>,
    pub dimensiones: Vec<Dimension>,
    pub grafica_dimensiones: Vec<ChartEntry>,
    #[serde(default)]
    pub composicion_sexo: Option<Vec<SexComposition>>,
    #[serde(default)]
    pub salarios: Option<Vec<SalaryGap>>,
    #[serde(default)]
    pub quejas: Option<Complaints>,
    #[serde(default)]
    pub atenciones: Option<Attentions>,
}

impl ReportData {
    pub fn from_json(bytes: &[u8]) -> Result<Self, crate::Error> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Payload rendered by `GET /pdf`.
    pub fn sample() -> Self {
        let metadata = serde_json::json!({
            "total_indicadores": 100,
            "indicadores_atendidos": 75,
            "porcentaje_cumplimiento_100": 75.0,
            "porcentaje_cumplimiento_80": 93.75,
            "meta_80": 80,
        });
        Self {
            organizacion: Organization {
                nombre: Some("Universidad de Prueba".into()),
                responsable: Some("Nombre Apellido".into()),
                cargo_responsable: Some("Director".into()),
                fecha_aplicacion: Some("2025-10-25".into()),
                folio: Some("DIGEI-TEST001".into()),
            },
            metadata: match metadata {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            ..Self::default()
        }
    }

    /// Folio used for the download file name.
    pub fn file_name(&self) -> String {
        format!(
            "reporte-{}.pdf",
            self.organizacion.folio.as_deref().unwrap_or("DIGEI")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_payload() {
        let data = ReportData::from_json(
            br#"{"organizacion": {}, "metadata": {}, "dimensiones": [], "grafica_dimensiones": []}"#,
        )
        .unwrap();
        assert!(data.organizacion.nombre.is_none());
        assert!(data.quejas.is_none());
        assert_eq!(data.file_name(), "reporte-DIGEI.pdf");
    }

    #[test]
    fn missing_required_section_is_rejected() {
        let err = ReportData::from_json(br#"{"organizacion": {}}"#).unwrap_err();
        assert!(err.to_string().contains("metadata"), "{err}");
    }

    #[test]
    fn subdimension_defaults_and_nulls() {
        let sub: Subdimension = serde_json::from_str(
            r#"{"nombre": "Cultura", "total_indicadores": null, "semaforo": "ALTO"}"#,
        )
        .unwrap();
        assert_eq!(sub.total_indicadores, 0.0);
        assert_eq!(sub.meta_80(), 1.0);
        assert!(sub.indicadores_no_atendidos.is_empty());
    }

    #[test]
    fn scalars_print_as_sent() {
        let row: SexComposition = serde_json::from_str(
            r#"{"cantidad_mujeres": 12, "cantidad_hombres": 3.5, "diferencia": "n/d"}"#,
        )
        .unwrap();
        assert_eq!(row.cantidad_mujeres.to_string(), "12");
        assert_eq!(row.cantidad_hombres.to_string(), "3.5");
        assert_eq!(row.diferencia.to_string(), "n/d");
    }

    #[test]
    fn dimension_ids_accept_numbers_and_text() {
        let dims: Vec<Dimension> =
            serde_json::from_str(r#"[{"id": 4, "nombre": "A"}, {"orden": "2", "nombre": "B"}]"#)
                .unwrap();
        assert_eq!(dims[0].id, Some(Scalar::from(4)));
        assert_eq!(dims[1].orden, Some(Scalar::from("2")));
    }

    #[test]
    fn complaint_rows_default_to_zero() {
        let q = Complaints {
            quejas_personal_recibidas_mujeres: Some(Scalar::from(3)),
            ..Default::default()
        };
        assert!(!q.is_empty());
        let rows = q.rows();
        assert_eq!(rows[0].1.to_string(), "3");
        assert_eq!(rows[0].2.to_string(), "0");
        assert!(Complaints::default().is_empty());
    }

    #[test]
    fn sample_has_folio_and_no_dimensions() {
        let data = ReportData::sample();
        assert_eq!(data.organizacion.folio.as_deref(), Some("DIGEI-TEST001"));
        assert!(data.dimensiones.is_empty());
        assert_eq!(data.metadata["indicadores_atendidos"], 75);
    }
}
