//! 한국투자증권 (KIS) 해외선물 시세 연동 모듈.
//!
//! # 기능
//!
//! - 발급된 접근 토큰을 사용한 인증 헤더 구성
//! - 해외선물 분봉 조회 (`HHDFC55020400`)
//! - 연속 조회 키(`INDEX_KEY`) 기반 페이지 이동
//!
//! 토큰 발급/갱신은 다루지 않습니다. 호출자가 유효한 토큰을 전달해야 합니다.
//!
//! # API 문서
//!
//! 공식 API 문서: <https://apiportal.koreainvestment.com/>
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use futchart_exchange::connector::kis::{AccessToken, ChartRequest, KisConfig, KisFuturesClient};
//!
//! let config = KisConfig::new("app_key".to_string(), "app_secret".to_string());
//! let client = KisFuturesClient::new(config, AccessToken::new("Bearer eyJ..."))?;
//!
//! let request = ChartRequest::new("NQZ24", "CME", "20241119").with_qry_gap("10");
//! let page = client.get_minute_chart(&request).await?;
//! println!("{} candles, next key: {}", page.output1.len(), page.output2.index_key);
//! ```

pub mod auth;
pub mod client_futures;
pub mod config;

pub use auth::{AccessToken, KisAuth, KisErrorResponse};
pub use client_futures::{
    has_more_pages, ChartContinuation, ChartRequest, FuturesChartResponse, FuturesMinuteCandle,
    KisFuturesClient, QueryType, CHART_PAGE_SIZE, CONTINUATION_KEY_MIN_LEN,
};
pub use config::{KisConfig, KisEnvironment};

/// KIS 거래 ID (tr_id) 상수 모음.
pub mod tr_id {
    /// 해외선물 분봉 조회 (실전/모의 공통)
    pub const FUTURES_MINUTE_CHART: &str = "HHDFC55020400";
}

/// 고객 유형 (`custtype` 헤더).
pub mod cust_type {
    /// 개인
    pub const PERSONAL: &str = "P";
}
