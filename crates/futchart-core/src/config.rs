//! 설정 관리.
//!
//! 우선순위: 기본값 → 설정 파일(TOML 등, 선택) → `FUTCHART__*` 환경 변수.
//! KIS 인증 정보는 여기서 다루지 않고 `KisConfig::from_env()`가 읽습니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ChartResult;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 차트 조회 기본값
    pub chart: ChartDefaults,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            with_file: false,
        }
    }
}

/// 차트 조회 기본값.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartDefaults {
    /// 거래소 코드 (예: "CME")
    pub exchange: String,
    /// 분봉 간격 (분)
    pub qry_gap: String,
    /// 최대 페이지 수 (0 = 무제한)
    pub max_pages: usize,
    /// CSV 저장 디렉토리
    pub output_dir: String,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            exchange: "CME".to_string(),
            qry_gap: "5".to_string(),
            max_pages: 50,
            output_dir: ".".to_string(),
        }
    }
}

impl ChartDefaults {
    /// 페이지 상한을 Option으로 반환 (0이면 무제한).
    pub fn page_limit(&self) -> Option<usize> {
        if self.max_pages == 0 {
            None
        } else {
            Some(self.max_pages)
        }
    }
}

impl AppConfig {
    /// 설정을 로드합니다.
    ///
    /// `path`가 주어지면 해당 파일이 반드시 존재해야 합니다.
    pub fn load(path: Option<&Path>) -> ChartResult<Self> {
        let mut builder = config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.with_file", false)?
            .set_default("chart.exchange", "CME")?
            .set_default("chart.qry_gap", "5")?
            .set_default("chart.max_pages", 50)?
            .set_default("chart.output_dir", ".")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FUTCHART")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
