//! Directory API response DTOs.
//!
//! Field names follow the KMB JSON exactly. Fields the app never reads
//! are left out and ignored by serde.

use serde::Deserialize;

use crate::domain::{ArrivalRecord, Stop};

/// Response from `GET /stop`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopListResponse {
    #[serde(default)]
    pub data: Option<Vec<StopDto>>,
}

/// One stop in the stop list.
#[derive(Debug, Clone, Deserialize)]
pub struct StopDto {
    pub stop: String,
    #[serde(default)]
    pub name_tc: String,
    #[serde(default)]
    pub name_en: String,
}

/// Response from `GET /stop-eta/{stop}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EtaResponse {
    #[serde(default)]
    pub data: Option<Vec<EtaDto>>,
}

/// One arrival prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct EtaDto {
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub dest_tc: String,
    #[serde(default)]
    pub dest_en: String,
    /// RFC 3339, or null when no vehicle is scheduled.
    pub eta: Option<String>,
    pub rmk_en: Option<String>,
}

impl From<StopDto> for Stop {
    fn from(dto: StopDto) -> Self {
        Stop {
            id: dto.stop,
            name_primary: dto.name_tc,
            name_secondary: dto.name_en,
        }
    }
}

impl From<EtaDto> for ArrivalRecord {
    fn from(dto: EtaDto) -> Self {
        ArrivalRecord {
            route: dto.route,
            destination_primary: dto.dest_tc,
            destination_secondary: dto.dest_en,
            eta: dto.eta.filter(|s| !s.is_empty()),
            remark: dto.rmk_en.filter(|s| !s.is_empty()),
        }
    }
}
