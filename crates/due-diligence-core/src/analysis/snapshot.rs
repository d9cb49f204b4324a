use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// State of the building log book ("libro del edificio").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingLogState {
    Completo,
    Parcial,
    Faltante,
}

/// State of the technical inspection (ITE / IEE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionState {
    Ok,
    Pendiente,
    NoAplica,
}

/// Documentation and market context attached to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    #[serde(rename = "libro_edificio_estado", default)]
    pub building_log: Option<BuildingLogState>,
    #[serde(rename = "ite_iee_estado", default)]
    pub inspection: Option<InspectionState>,
    #[serde(rename = "mantenimientos_criticos_ok", default)]
    pub critical_maintenance_ok: Option<bool>,
    /// Reference asking price per m² in the area
    #[serde(rename = "precio_ref_eur_m2", default)]
    pub reference_price_m2: Option<Money>,
    #[serde(rename = "dias_en_mercado", default)]
    pub days_on_market: Option<Decimal>,
}

/// Financial and operational picture of a building for one period.
///
/// Every numeric field is optional: `None` means "unknown" and only ever
/// withholds a bonus downstream, it never fails the analysis. Wire keys
/// follow the snapshot provider's payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    #[serde(rename = "ingresos_brutos_anuales_eur", default)]
    pub gross_annual_income: Option<Money>,
    #[serde(rename = "otros_ingresos_anuales_eur", default)]
    pub other_income: Option<Money>,
    #[serde(rename = "opex_total_anual_eur", default)]
    pub opex_total: Option<Money>,
    #[serde(rename = "opex_energia_anual_eur", default)]
    pub opex_energy: Option<Money>,
    #[serde(rename = "opex_mantenimiento_anual_eur", default)]
    pub opex_maintenance: Option<Money>,
    /// Weighted average lease term, months
    #[serde(rename = "walt_meses", default)]
    pub walt_months: Option<Decimal>,
    /// Share of income from the largest tenant (0-1)
    #[serde(rename = "concentracion_top1_pct_noi", default)]
    pub top_tenant_concentration: Option<Rate>,
    #[serde(rename = "indexacion_ipc", default)]
    pub indexed_leases: Option<bool>,
    #[serde(rename = "morosidad_12m_pct", default)]
    pub arrears_rate_12m: Option<Rate>,
    #[serde(default)]
    pub dscr: Option<Decimal>,
    #[serde(rename = "penalizacion_prepago", default)]
    pub prepayment_penalty: Option<bool>,
    #[serde(rename = "capex_rehab_estimado_eur", default)]
    pub rehab_capex: Option<Money>,
    #[serde(rename = "ahorro_energia_pct_estimado", default)]
    pub energy_saving_pct: Option<Percent>,
    #[serde(default)]
    pub meta: SnapshotMeta,
}

impl FinancialSnapshot {
    pub fn building_log_complete(&self) -> bool {
        self.meta.building_log == Some(BuildingLogState::Completo)
    }

    pub fn inspection_ok(&self) -> bool {
        self.meta.inspection == Some(InspectionState::Ok)
    }

    pub fn critical_maintenance_ok(&self) -> bool {
        self.meta.critical_maintenance_ok == Some(true)
    }

    /// Rehabilitation capex, only when a positive estimate exists.
    pub fn positive_rehab_capex(&self) -> Option<Money> {
        self.rehab_capex.filter(|c| *c > Decimal::ZERO)
    }
}
