//! KIS 인증 헤더 구성.
//!
//! 토큰 발급(`/oauth2/tokenP`)은 이 크레이트의 범위가 아닙니다.
//! 호출자가 발급받은 접근 토큰을 `AccessToken`으로 감싸 전달하면
//! 매 요청마다 공통 헤더를 만들어 줍니다.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::config::{require_env, KisConfig};
use crate::ExchangeError;

/// 만료되었거나 유효하지 않은 토큰을 나타내는 KIS 메시지 코드.
const TOKEN_ERROR_CODES: [&str; 2] = ["EGW00121", "EGW00123"];

/// KIS API 오류 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct KisErrorResponse {
    /// 응답 코드 (0 = 성공)
    pub rt_cd: String,
    /// 메시지 코드
    #[serde(default)]
    pub msg_cd: String,
    /// 메시지 내용
    pub msg1: String,
}

impl KisErrorResponse {
    /// 토큰 만료/무효 응답인지 확인.
    pub fn is_token_error(&self) -> bool {
        TOKEN_ERROR_CODES.contains(&self.msg_cd.as_str())
    }
}

/// 발급된 접근 토큰.
///
/// 로그나 Debug 출력에 토큰이 노출되지 않도록 `SecretString`으로 보관합니다.
#[derive(Debug)]
pub struct AccessToken {
    secret: SecretString,
}

impl AccessToken {
    /// 토큰 문자열로 생성. `Bearer ` 접두사는 있어도 되고 없어도 됩니다.
    pub fn new(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            secret: SecretString::new(token.trim().to_string().into()),
        }
    }

    /// `KIS_ACCESS_TOKEN` 환경 변수에서 생성.
    pub fn from_env() -> Result<Self, ExchangeError> {
        require_env("KIS_ACCESS_TOKEN").map(Self::new)
    }

    /// 인증 헤더 값 반환.
    ///
    /// 인증 스킴이 빠진 토큰에는 `Bearer `를 붙입니다.
    pub fn auth_header(&self) -> String {
        let raw = self.secret.expose_secret();
        let has_scheme = raw
            .get(..7)
            .map(|prefix| prefix.eq_ignore_ascii_case("bearer "))
            .unwrap_or(false);

        if has_scheme {
            raw.to_string()
        } else {
            format!("Bearer {}", raw)
        }
    }

    /// 토큰이 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }
}

/// KIS 인증 정보 (앱키/시크릿 + 접근 토큰).
#[derive(Debug)]
pub struct KisAuth {
    config: KisConfig,
    token: AccessToken,
}

impl KisAuth {
    /// 새로운 인증 정보 생성.
    pub fn new(config: KisConfig, token: AccessToken) -> Result<Self, ExchangeError> {
        if config.app_key.trim().is_empty() || config.app_secret.trim().is_empty() {
            return Err(ExchangeError::Unauthorized(
                "KIS_APP_KEY / KIS_APP_SECRET이 설정되지 않았습니다.".to_string(),
            ));
        }
        if token.is_empty() {
            return Err(ExchangeError::Unauthorized(
                "KIS_ACCESS_TOKEN이 비어 있습니다. 발급받은 접근 토큰을 설정하세요.".to_string(),
            ));
        }

        Ok(Self { config, token })
    }

    /// 설정 반환.
    pub fn config(&self) -> &KisConfig {
        &self.config
    }

    /// 시세 조회 요청의 공통 헤더 생성.
    ///
    /// # 인자
    /// * `tr_id` - 거래 ID
    /// * `tr_cont` - 연속 거래 여부 (해외선물 분봉 조회는 항상 빈 값)
    ///
    /// # Errors
    /// 헤더 값에 사용할 수 없는 문자가 있으면 `ExchangeError::ParseError`를 반환합니다.
    pub fn build_headers(&self, tr_id: &str, tr_cont: &str) -> Result<HeaderMap, ExchangeError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );

        let mut authorization = header_value("authorization", &self.token.auth_header())?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        headers.insert("appkey", header_value("appkey", &self.config.app_key)?);

        let mut app_secret = header_value("appsecret", &self.config.app_secret)?;
        app_secret.set_sensitive(true);
        headers.insert("appsecret", app_secret);

        headers.insert("tr_id", header_value("tr_id", tr_id)?);
        headers.insert("tr_cont", header_value("tr_cont", tr_cont)?);
        headers.insert("custtype", header_value("custtype", &self.config.custtype)?);

        Ok(headers)
    }
}

/// 문자열을 헤더 값으로 변환.
fn header_value(name: &str, value: &str) -> Result<HeaderValue, ExchangeError> {
    HeaderValue::from_str(value)
        .map_err(|_| ExchangeError::ParseError(format!("{}에 유효하지 않은 문자 포함", name)))
}
