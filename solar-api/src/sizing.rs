//! Client of the bill-based sizing endpoint (`POST /procesar-factura`).

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use solar_core::{ConsumptionSource, SizingQuote, SizingRequest};
use tracing::{info, instrument};

use crate::bill::BillDocument;
use crate::client::{self, endpoint};
use crate::error::{ApiError, Service, truncate_body};

pub const DEFAULT_SIZING_BASE_URL: &str = "http://localhost:8000";

pub struct SizingClient {
    client: Client,
    url: String,
    max_bill_bytes: u64,
}

impl SizingClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_bill_bytes: u64,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: client::try_new(timeout)?,
            url: endpoint(base_url, "procesar-factura"),
            max_bill_bytes,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sizes an installation from a bill or a manual consumption figure.
    ///
    /// The bill is validated locally first; nothing is sent when it is
    /// rejected.
    #[instrument(skip_all, fields(location = request.location.as_str()))]
    pub async fn quote(
        &self,
        request: &SizingRequest,
    ) -> Result<SizingQuote, ApiError> {
        let fields = form_fields(request)?;
        let mut form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        if let ConsumptionSource::Bill(path) = &request.consumption {
            let bill = BillDocument::load(path, self.max_bill_bytes).await?;
            let part = Part::bytes(bill.bytes)
                .file_name(bill.file_name)
                .mime_str("application/pdf")?;
            form = form.part("file", part);
        }

        info!(url = %self.url, "requesting sizing…");
        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

/// Text fields of the multipart form, in the order the form sends them.
pub fn form_fields(request: &SizingRequest) -> Result<Vec<(&'static str, String)>, ApiError> {
    if request.coverage_pct <= Decimal::ZERO || request.coverage_pct > Decimal::ONE_HUNDRED {
        return Err(ApiError::InvalidRequest(format!(
            "coverage must be within (0, 100] percent, got {}",
            request.coverage_pct
        )));
    }

    let mut fields = vec![
        ("estructura", request.structure.as_str().to_string()),
        ("cubierta", request.roof.as_str().to_string()),
        ("ubicacion", request.location.as_str().to_string()),
        ("tipoInversor", request.inverter.as_str().to_string()),
        ("cobertura", request.coverage_pct.normalize().to_string()),
    ];

    if let ConsumptionSource::Manual { monthly_kwh } = request.consumption {
        if monthly_kwh <= Decimal::ZERO {
            return Err(ApiError::InvalidRequest(
                "monthly consumption must be positive".to_string(),
            ));
        }
        fields.push(("consumo_mensual_kwh", monthly_kwh.normalize().to_string()));
    }

    Ok(fields)
}

pub fn parse_response(
    status: StatusCode,
    body: &str,
) -> Result<SizingQuote, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Status {
            service: Service::Sizing,
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use solar_core::{InverterType, Location, RoofType, StructureType};
    use tempfile::Builder;

    use super::*;
    use crate::bill::{BillError, DEFAULT_MAX_BILL_BYTES};

    fn request(consumption: ConsumptionSource) -> SizingRequest {
        SizingRequest {
            structure: StructureType::PerfilMetalico,
            roof: RoofType::Trapezoidal,
            location: Location::Caldas,
            inverter: InverterType::Hibrido,
            coverage_pct: dec!(80),
            consumption,
        }
    }

    #[test]
    fn manual_consumption_is_sent_as_field() {
        let fields = form_fields(&request(ConsumptionSource::Manual {
            monthly_kwh: dec!(450.50),
        }))
        .unwrap();

        assert_eq!(
            fields,
            vec![
                ("estructura", "perfil_metalico".to_string()),
                ("cubierta", "trapezoidal".to_string()),
                ("ubicacion", "caldas".to_string()),
                ("tipoInversor", "hibrido".to_string()),
                ("cobertura", "80".to_string()),
                ("consumo_mensual_kwh", "450.5".to_string()),
            ]
        );
    }

    #[test]
    fn bill_request_has_no_consumption_field() {
        let fields = form_fields(&request(ConsumptionSource::Bill(PathBuf::from("f.pdf")))).unwrap();

        assert!(fields.iter().all(|(name, _)| *name != "consumo_mensual_kwh"));
    }

    #[test]
    fn coverage_outside_range_is_rejected() {
        let mut req = request(ConsumptionSource::Manual { monthly_kwh: dec!(300) });
        req.coverage_pct = dec!(0);

        assert!(matches!(form_fields(&req), Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn wrong_bill_is_rejected_before_any_request() {
        // Nothing listens on port 9; reaching the network would fail differently.
        let client = SizingClient::new("http://127.0.0.1:9", client::DEFAULT_TIMEOUT, DEFAULT_MAX_BILL_BYTES).unwrap();
        let file = Builder::new().suffix(".jpg").tempfile().unwrap();

        let err = client
            .quote(&request(ConsumptionSource::Bill(file.path().to_path_buf())))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Bill(BillError::WrongFormat { .. })));
    }

    #[test]
    fn parses_sizing_response() {
        let quote = parse_response(
            StatusCode::OK,
            r#"{ "nombre_cliente": "ANA GOMEZ", "niu": "889900", "consumo_kwh": 512.4,
                 "potencia_kwp": 4.12, "numero_paneles": 8, "inversor": "On-grid 5 kW",
                 "precio_total": 18500000, "generacion_min_kwh": 480, "generacion_max_kwh": 560 }"#,
        )
        .unwrap();

        assert_eq!(quote.export_id(), Some("889900"));
        assert_eq!(quote.generation_max_kwh, Some(dec!(560)));
    }

    #[test]
    fn sizing_failure_message() {
        let err = parse_response(StatusCode::BAD_REQUEST, "PDF sin datos de consumo").unwrap_err();

        assert_eq!(err.to_string(), "Error al procesar la factura (400). PDF sin datos de consumo");
    }
}
