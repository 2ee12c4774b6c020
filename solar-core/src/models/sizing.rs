use std::fmt;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mounting structure for the panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    #[default]
    Madera,
    PerfilMetalico,
    Cercha,
    Plancha,
    Granja,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofType {
    TejaColonial,
    #[default]
    Fibrocemento,
    Trapezoidal,
}

/// Department where the installation is located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[default]
    Quindio,
    Risaralda,
    Caldas,
    Valle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InverterType {
    #[default]
    #[serde(rename = "ongrid")]
    OnGrid,
    #[serde(rename = "hibrido")]
    Hibrido,
}

impl StructureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Madera => "madera",
            Self::PerfilMetalico => "perfil_metalico",
            Self::Cercha => "cercha",
            Self::Plancha => "plancha",
            Self::Granja => "granja",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "madera" => Some(Self::Madera),
            "perfil_metalico" => Some(Self::PerfilMetalico),
            "cercha" => Some(Self::Cercha),
            "plancha" => Some(Self::Plancha),
            "granja" => Some(Self::Granja),
            _ => None,
        }
    }
}

impl RoofType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TejaColonial => "teja_colonial",
            Self::Fibrocemento => "fibrocemento",
            Self::Trapezoidal => "trapezoidal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "teja_colonial" => Some(Self::TejaColonial),
            "fibrocemento" => Some(Self::Fibrocemento),
            "trapezoidal" => Some(Self::Trapezoidal),
            _ => None,
        }
    }
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quindio => "quindio",
            Self::Risaralda => "risaralda",
            Self::Caldas => "caldas",
            Self::Valle => "valle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quindio" => Some(Self::Quindio),
            "risaralda" => Some(Self::Risaralda),
            "caldas" => Some(Self::Caldas),
            "valle" => Some(Self::Valle),
            _ => None,
        }
    }
}

impl InverterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnGrid => "ongrid",
            Self::Hibrido => "hibrido",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ongrid" => Some(Self::OnGrid),
            "hibrido" => Some(Self::Hibrido),
            _ => None,
        }
    }
}

/// Where the consumption figure for sizing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumptionSource {
    /// A utility bill, sent as-is for the backend to read.
    Bill(PathBuf),
    /// Average monthly consumption typed in by the user.
    Manual { monthly_kwh: Decimal },
}

/// Everything the sizing endpoint needs for one quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingRequest {
    pub structure: StructureType,
    pub roof: RoofType,
    pub location: Location,
    pub inverter: InverterType,
    /// Share of consumption the installation should cover, in percent.
    pub coverage_pct: Decimal,
    pub consumption: ConsumptionSource,
}

/// Technical sizing returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingQuote {
    #[serde(rename = "nombre_cliente", default)]
    pub client_name: Option<String>,

    /// Site identifier printed on the bill (NIU / account number).
    #[serde(rename = "codigo_cliente", alias = "niu", default)]
    pub site_id: Option<String>,

    #[serde(rename = "consumo_kwh")]
    pub monthly_consumption_kwh: Decimal,

    #[serde(rename = "potencia_kwp")]
    pub power_kwp: Decimal,

    #[serde(rename = "numero_paneles")]
    pub panel_count: u32,

    #[serde(rename = "inversor", default)]
    pub inverter: Option<String>,

    #[serde(rename = "precio_total")]
    pub total_price: Decimal,

    #[serde(rename = "generacion_min_kwh", default)]
    pub generation_min_kwh: Option<Decimal>,

    #[serde(rename = "generacion_max_kwh", default)]
    pub generation_max_kwh: Option<Decimal>,
}

impl SizingQuote {
    /// Identifier used to name exported files: the site id when the bill
    /// carried one, otherwise the client name.
    pub fn export_id(&self) -> Option<&str> {
        self.site_id
            .as_deref()
            .or(self.client_name.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

impl fmt::Display for SizingQuote {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} kWp, {} paneles, consumo {} kWh/mes",
            self.power_kwp.round_dp(2),
            self.panel_count,
            self.monthly_consumption_kwh.round_dp(0)
        )
    }
}
