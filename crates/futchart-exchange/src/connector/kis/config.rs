//! 한국투자증권 (KIS) API 설정.
//!
//! 시세 조회에는 app_key, app_secret과 미리 발급받은 접근 토큰이 필요합니다.

use serde::{Deserialize, Serialize};

use super::cust_type;
use crate::ExchangeError;

/// KIS API 환경 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KisEnvironment {
    /// 실전투자
    #[default]
    Real,
    /// 모의투자
    Paper,
}

impl KisEnvironment {
    /// 이 환경의 REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            KisEnvironment::Real => "https://openapi.koreainvestment.com:9443",
            KisEnvironment::Paper => "https://openapivts.koreainvestment.com:29443",
        }
    }

    /// 문자열에서 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "real" | "prod" | "live" => Some(KisEnvironment::Real),
            "paper" | "mock" | "test" => Some(KisEnvironment::Paper),
            _ => None,
        }
    }
}

/// KIS API 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KisConfig {
    /// 앱키
    pub app_key: String,
    /// 앱시크릿
    pub app_secret: String,
    /// 환경 (실전/모의)
    pub environment: KisEnvironment,
    /// 기본 URL 직접 지정 (테스트 서버 등)
    pub base_url: Option<String>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 고객 유형 (P: 개인, B: 법인)
    pub custtype: String,
}

impl KisConfig {
    /// 새로운 KIS 설정 생성 (실전 환경, 개인 고객).
    pub fn new(app_key: String, app_secret: String) -> Self {
        Self {
            app_key,
            app_secret,
            environment: KisEnvironment::Real,
            base_url: None,
            timeout_secs: 30,
            custtype: cust_type::PERSONAL.to_string(),
        }
    }

    /// 환경 설정.
    pub fn with_environment(mut self, env: KisEnvironment) -> Self {
        self.environment = env;
        self
    }

    /// 기본 URL 직접 지정 (환경 기본값 무시).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// 고객 유형 설정.
    pub fn with_custtype(mut self, custtype: impl Into<String>) -> Self {
        self.custtype = custtype.into();
        self
    }

    /// 환경 변수에서 설정 생성.
    ///
    /// # 환경 변수
    /// - 필수: `KIS_APP_KEY`, `KIS_APP_SECRET`
    /// - 선택: `KIS_ENVIRONMENT` (real | paper), `KIS_BASE_URL`,
    ///   `KIS_TIMEOUT_SECS`, `KIS_CUSTTYPE`
    pub fn from_env() -> Result<Self, ExchangeError> {
        let app_key = require_env("KIS_APP_KEY")?;
        let app_secret = require_env("KIS_APP_SECRET")?;

        let mut config = Self::new(app_key, app_secret);

        if let Ok(env) = std::env::var("KIS_ENVIRONMENT") {
            config.environment = KisEnvironment::parse(&env).ok_or_else(|| {
                ExchangeError::Config(format!(
                    "KIS_ENVIRONMENT 값이 올바르지 않습니다: {} (real | paper)",
                    env
                ))
            })?;
        }
        if let Ok(url) = std::env::var("KIS_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = Some(url.trim().to_string());
            }
        }
        if let Some(secs) = std::env::var("KIS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_secs = secs;
        }
        if let Ok(custtype) = std::env::var("KIS_CUSTTYPE") {
            config.custtype = custtype;
        }

        Ok(config)
    }

    /// REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None => self.environment.rest_base_url(),
        }
    }
}

/// 필수 환경 변수 읽기.
pub(crate) fn require_env(key: &str) -> Result<String, ExchangeError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ExchangeError::Config(format!(
            "{} 환경변수가 설정되지 않았습니다",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = KisConfig::new("test_key".to_string(), "test_secret".to_string());

        assert_eq!(config.app_key, "test_key");
        assert_eq!(config.environment, KisEnvironment::Real);
        assert_eq!(config.custtype, "P");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(
            KisEnvironment::Real.rest_base_url(),
            "https://openapi.koreainvestment.com:9443"
        );
        assert_eq!(
            KisEnvironment::Paper.rest_base_url(),
            "https://openapivts.koreainvestment.com:29443"
        );
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(KisEnvironment::parse("real"), Some(KisEnvironment::Real));
        assert_eq!(KisEnvironment::parse("PAPER"), Some(KisEnvironment::Paper));
        assert_eq!(KisEnvironment::parse("mock"), Some(KisEnvironment::Paper));
        assert_eq!(KisEnvironment::parse("staging"), None);
    }

    #[test]
    fn test_base_url_override() {
        let config = KisConfig::new("k".to_string(), "s".to_string())
            .with_environment(KisEnvironment::Paper)
            .with_base_url("http://127.0.0.1:1234/");

        assert_eq!(config.rest_base_url(), "http://127.0.0.1:1234");
    }
}
