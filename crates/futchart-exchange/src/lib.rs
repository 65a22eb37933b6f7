//! KIS 해외선물 분봉 조회 커넥터.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - KIS 설정 및 인증 헤더 구성
//! - 해외선물 분봉 단일 페이지 조회 (`KisFuturesClient`)
//! - 연속 조회 키를 따라가는 페이지 수집기 (`ChartCollector`)

pub mod chart;
pub mod connector;
pub mod error;

pub use chart::{ChartCollector, ChartTable, CollectOptions, MinuteChartSource};
pub use connector::kis::{
    has_more_pages, AccessToken, ChartContinuation, ChartRequest, FuturesChartResponse,
    FuturesMinuteCandle, KisAuth, KisConfig, KisEnvironment, KisFuturesClient, QueryType,
};
pub use error::*;
