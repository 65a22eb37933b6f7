//! KIS 해외선물 분봉 REST API 클라이언트.
//!
//! `GET /uapi/overseas-futureoption/v1/quotations/inquire-time-futurechartprice`
//!
//! 한 번의 호출은 최대 120개의 분봉과 다음 페이지를 위한 연속 조회 키
//! (`index_key`)를 돌려줍니다. 키가 충분히 길면 (`CONTINUATION_KEY_MIN_LEN` 초과)
//! `QRY_TP=P`와 함께 키를 넘겨 이전 구간을 이어서 조회합니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::auth::{AccessToken, KisAuth, KisErrorResponse};
use super::config::KisConfig;
use super::tr_id;
use crate::ExchangeError;

/// 분봉 조회 API 경로.
const MINUTE_CHART_PATH: &str =
    "/uapi/overseas-futureoption/v1/quotations/inquire-time-futurechartprice";

/// 한 번에 요청하는 최대 분봉 개수 (`QRY_CNT`).
pub const CHART_PAGE_SIZE: &str = "120";

/// 연속 조회 키가 의미를 가지는 최소 길이.
///
/// 이 길이 이하의 키는 "다음 페이지 없음"으로 취급합니다.
/// 서비스가 문서로 보장하는 값은 아니므로 여기 한 곳에서만 관리합니다.
pub const CONTINUATION_KEY_MIN_LEN: usize = 10;

/// 연속 조회 키로 다음 페이지가 있는지 판단.
pub fn has_more_pages(index_key: &str) -> bool {
    index_key.chars().count() > CONTINUATION_KEY_MIN_LEN
}

/// 조회 유형 (`QRY_TP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    /// 최초 조회
    #[default]
    First,
    /// 다음 조회 (연속 조회 키 사용)
    Next,
}

impl QueryType {
    /// KIS 코드 반환.
    pub fn code(&self) -> &'static str {
        match self {
            QueryType::First => "Q",
            QueryType::Next => "P",
        }
    }
}

/// 분봉 조회 요청 파라미터.
///
/// 모든 값은 문자열 그대로 전달되며 형식 검증은 원격 서비스가 담당합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    /// 종목코드 (예: "NQZ24")
    pub symbol: String,
    /// 거래소코드 (예: "CME")
    pub exchange: String,
    /// 조회 종료일시 (예: "20241119")
    pub close_date_time: String,
    /// 분봉 간격 (분)
    pub qry_gap: String,
    /// 조회 유형
    pub query_type: QueryType,
    /// 연속 조회 키 (최초 조회 시 공백)
    pub index_key: String,
}

impl ChartRequest {
    /// 최초 조회 요청 생성 (5분봉).
    pub fn new(
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        close_date_time: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
            close_date_time: close_date_time.into(),
            qry_gap: "5".to_string(),
            query_type: QueryType::First,
            index_key: String::new(),
        }
    }

    /// 분봉 간격 설정.
    pub fn with_qry_gap(mut self, qry_gap: impl Into<String>) -> Self {
        self.qry_gap = qry_gap.into();
        self
    }

    /// 응답의 연속 조회 키로 다음 페이지 요청을 준비.
    ///
    /// 키가 `CONTINUATION_KEY_MIN_LEN` 이하이면 `None`.
    pub fn next_page(&self, index_key: &str) -> Option<Self> {
        if !has_more_pages(index_key) {
            return None;
        }

        Some(Self {
            query_type: QueryType::Next,
            index_key: index_key.to_string(),
            ..self.clone()
        })
    }

    /// 쿼리 파라미터 목록.
    pub fn query_params(&self) -> [(&'static str, &str); 8] {
        [
            ("SRS_CD", self.symbol.as_str()),
            ("EXCH_CD", self.exchange.as_str()),
            ("START_DATE_TIME", ""),
            ("CLOSE_DATE_TIME", self.close_date_time.as_str()),
            ("QRY_TP", self.query_type.code()),
            ("QRY_CNT", CHART_PAGE_SIZE),
            ("QRY_GAP", self.qry_gap.as_str()),
            ("INDEX_KEY", self.index_key.as_str()),
        ]
    }
}

/// KIS 해외선물 분봉 REST API 클라이언트.
///
/// `KisAuth`를 `Arc`로 공유하므로 같은 인증 정보로 여러 클라이언트를 만들 수 있습니다.
pub struct KisFuturesClient {
    auth: Arc<KisAuth>,
    client: Client,
}

impl KisFuturesClient {
    /// 새로운 해외선물 클라이언트 생성.
    ///
    /// # Errors
    /// 인증 정보가 비어 있거나 HTTP 클라이언트 생성에 실패하면 에러를 반환합니다.
    pub fn new(config: KisConfig, token: AccessToken) -> Result<Self, ExchangeError> {
        Self::with_shared_auth(Arc::new(KisAuth::new(config, token)?))
    }

    /// 공유된 인증 정보로 클라이언트 생성.
    pub fn with_shared_auth(auth: Arc<KisAuth>) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(auth.config().timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self { auth, client })
    }

    /// 인증 정보 반환.
    pub fn auth(&self) -> &Arc<KisAuth> {
        &self.auth
    }

    /// 분봉 조회 URL.
    pub fn minute_chart_url(&self) -> String {
        format!("{}{}", self.auth.config().rest_base_url(), MINUTE_CHART_PATH)
    }

    /// 해외선물 분봉 한 페이지 조회.
    ///
    /// 응답 본문을 변형하지 않고 그대로 돌려줍니다 (`output1` 순서 유지).
    ///
    /// # Errors
    /// - 전송 실패: `NetworkError` / `Timeout`
    /// - HTTP 상태 코드 비정상: `ApiError` (토큰 문제면 `Unauthorized`)
    /// - JSON 파싱 실패: `ParseError`
    /// - `rt_cd != "0"`: `ApiError` (메시지는 `msg1` 원문)
    pub async fn get_minute_chart(
        &self,
        request: &ChartRequest,
    ) -> Result<FuturesChartResponse, ExchangeError> {
        let url = self.minute_chart_url();
        let headers = self
            .auth
            .build_headers(tr_id::FUTURES_MINUTE_CHART, "")?;

        debug!(
            symbol = %request.symbol,
            exchange = %request.exchange,
            qry_tp = request.query_type.code(),
            index_key = %request.index_key,
            "Requesting futures minute chart"
        );

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&request.query_params())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Futures minute chart inquiry failed: {} - {}", status, body);
            return Err(http_error(status, body));
        }

        debug!("Futures minute chart response: {}", body);

        let resp: FuturesChartResponse = serde_json::from_str(&body).map_err(|e| {
            ExchangeError::ParseError(format!("Failed to parse minute chart response: {}", e))
        })?;

        if !resp.is_success() {
            warn!(
                rt_cd = %resp.rt_cd,
                msg_cd = %resp.msg_cd,
                "Futures minute chart rejected: {}",
                resp.msg1
            );
            return Err(ExchangeError::ApiError {
                code: resp.msg_cd.parse().unwrap_or(-1),
                message: resp.msg1,
            });
        }

        Ok(resp)
    }
}

/// 비정상 HTTP 응답을 에러로 변환.
fn http_error(status: reqwest::StatusCode, body: String) -> ExchangeError {
    if let Ok(kis_error) = serde_json::from_str::<KisErrorResponse>(&body) {
        if kis_error.is_token_error() {
            return ExchangeError::Unauthorized(format!(
                "{} ({})",
                kis_error.msg1, kis_error.msg_cd
            ));
        }
    }

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ExchangeError::Unauthorized(format!("{} - {}", status, body));
    }

    ExchangeError::ApiError {
        code: i32::from(status.as_u16()),
        message: body,
    }
}

// ========================================
// 응답 타입
// ========================================

/// 해외선물 분봉 조회 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct FuturesChartResponse {
    /// 응답 코드 ("0" = 성공)
    pub rt_cd: String,
    /// 메시지 코드
    #[serde(default)]
    pub msg_cd: String,
    /// 메시지 내용
    #[serde(default)]
    pub msg1: String,
    /// 분봉 목록
    #[serde(default)]
    pub output1: Vec<FuturesMinuteCandle>,
    /// 연속 조회 정보
    #[serde(default)]
    pub output2: ChartContinuation,
}

impl FuturesChartResponse {
    /// 성공 응답인지 확인.
    pub fn is_success(&self) -> bool {
        self.rt_cd == "0"
    }

    /// 다음 페이지가 있는지 확인.
    pub fn has_more_pages(&self) -> bool {
        has_more_pages(&self.output2.index_key)
    }
}

/// 해외선물 분봉 데이터.
///
/// 가격/수량은 응답 문자열 그대로 보관합니다. 숫자가 필요하면 접근자를 사용하세요.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FuturesMinuteCandle {
    /// 일자 (YYYYMMDD)
    pub data_date: String,
    /// 시각 (HHMMSS)
    pub data_time: String,
    /// 시가
    pub open_price: String,
    /// 고가
    pub high_price: String,
    /// 저가
    pub low_price: String,
    /// 종가 (체결가)
    pub last_price: String,
    /// 체결량
    pub last_qty: String,
    /// 누적 거래량
    pub vol: String,
    /// 전일대비 부호
    pub prev_diff_flag: String,
    /// 전일대비
    pub prev_diff_price: String,
    /// 전일대비율
    pub prev_diff_rate: String,
    /// 그 밖의 응답 필드
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FuturesMinuteCandle {
    /// 정렬 키 (일자, 시각).
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.data_date, &self.data_time)
    }

    /// 시가.
    pub fn open(&self) -> Option<Decimal> {
        parse_decimal(&self.open_price)
    }

    /// 고가.
    pub fn high(&self) -> Option<Decimal> {
        parse_decimal(&self.high_price)
    }

    /// 저가.
    pub fn low(&self) -> Option<Decimal> {
        parse_decimal(&self.low_price)
    }

    /// 종가.
    pub fn close(&self) -> Option<Decimal> {
        parse_decimal(&self.last_price)
    }

    /// 체결량.
    pub fn volume(&self) -> Option<Decimal> {
        parse_decimal(&self.last_qty)
    }
}

/// 분봉 조회 연속 정보.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChartContinuation {
    /// 응답 건수
    pub tret_cnt: String,
    /// 마지막 건수
    pub last_n_cnt: String,
    /// 연속 조회 키
    pub index_key: String,
}

// ========================================
// 유틸리티 함수
// ========================================

/// 문자열을 Decimal로 파싱 (빈 값, "-"는 None).
fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    s.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ChartRequest {
        ChartRequest::new("NQZ24", "CME", "20241119").with_qry_gap("10")
    }

    #[test]
    fn test_query_params_first_page() {
        let request = sample_request();
        let params = request.query_params();

        assert_eq!(
            params,
            [
                ("SRS_CD", "NQZ24"),
                ("EXCH_CD", "CME"),
                ("START_DATE_TIME", ""),
                ("CLOSE_DATE_TIME", "20241119"),
                ("QRY_TP", "Q"),
                ("QRY_CNT", "120"),
                ("QRY_GAP", "10"),
                ("INDEX_KEY", ""),
            ]
        );
    }

    #[test]
    fn test_query_type_codes() {
        assert_eq!(QueryType::First.code(), "Q");
        assert_eq!(QueryType::Next.code(), "P");
    }

    #[test]
    fn test_short_key_has_no_next_page() {
        let request = sample_request();
        assert!(request.next_page("").is_none());
        assert!(request.next_page("1234567890").is_none()); // 정확히 10자
    }

    #[test]
    fn test_long_key_prepares_next_page() {
        let request = sample_request();
        let next = request.next_page("20241118235000").unwrap();

        assert_eq!(next.query_type, QueryType::Next);
        assert_eq!(next.index_key, "20241118235000");
        assert_eq!(next.symbol, request.symbol);
        assert_eq!(next.close_date_time, request.close_date_time);
        assert_eq!(next.qry_gap, request.qry_gap);
        assert_eq!(next.query_params()[4], ("QRY_TP", "P"));
    }

    #[test]
    fn test_key_length_counts_characters() {
        // 멀티바이트 문자도 한 글자로 센다
        assert!(!has_more_pages("가나다라마바사아자차"));
        assert!(has_more_pages("가나다라마바사아자차카"));
    }

    #[test]
    fn test_parse_response_keeps_unknown_fields() {
        let json = r#"{
            "rt_cd": "0",
            "msg_cd": "MCA00000",
            "msg1": "정상처리 되었습니다.",
            "output1": [
                {"data_date": "20241119", "data_time": "093000", "open_price": "20850.25",
                 "high_price": "20861.00", "low_price": "20840.50", "last_price": "20855.75",
                 "last_qty": "1520", "vol": "88210", "prev_diff_flag": "2",
                 "prev_diff_price": "12.25", "prev_diff_rate": "0.06", "tick_cnt": "311"}
            ],
            "output2": {"tret_cnt": "1", "last_n_cnt": "1", "index_key": "  "}
        }"#;

        let resp: FuturesChartResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        assert!(!resp.has_more_pages());

        let candle = &resp.output1[0];
        assert_eq!(candle.sort_key(), ("20241119", "093000"));
        assert_eq!(candle.open(), Some(Decimal::new(2085025, 2)));
        assert_eq!(candle.volume(), Some(Decimal::new(1520, 0)));
        assert_eq!(candle.extra["tick_cnt"], "311");
    }

    #[test]
    fn test_parse_error_envelope_without_outputs() {
        let json = r#"{"rt_cd": "1", "msg_cd": "OPSQ0002", "msg1": "없는 서비스 코드 입니다"}"#;
        let resp: FuturesChartResponse = serde_json::from_str(json).unwrap();

        assert!(!resp.is_success());
        assert!(resp.output1.is_empty());
        assert_eq!(resp.output2, ChartContinuation::default());
    }

    #[test]
    fn test_parse_decimal_blank() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal(" 1.5 "), Some(Decimal::new(15, 1)));
    }

    #[test]
    fn test_http_error_mapping() {
        let token_body =
            r#"{"rt_cd":"1","msg_cd":"EGW00123","msg1":"기간이 만료된 token 입니다."}"#;
        let err = http_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            token_body.to_string(),
        );
        assert!(err.is_auth_error());

        let err = http_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down".to_string());
        match err {
            ExchangeError::ApiError { code, message } => {
                assert_eq!(code, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
