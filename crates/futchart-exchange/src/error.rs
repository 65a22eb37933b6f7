//! 거래소 에러 타입.

use thiserror::Error;

/// KIS 연동 에러.
///
/// 모든 변형은 원인 메시지를 그대로 포함합니다.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API 에러 코드 (HTTP 상태 또는 KIS msg_cd)
    #[error("API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 설정 에러
    #[error("Config error: {0}")]
    Config(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    ///
    /// 수집기는 자동 재시도를 하지 않으며, 호출자가 판단할 때 사용합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_) | ExchangeError::Timeout(_)
        )
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ExchangeError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() {
            ExchangeError::NetworkError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ExchangeError::NetworkError("reset".to_string()).is_retryable());
        assert!(ExchangeError::Timeout("30s".to_string()).is_retryable());
        assert!(!ExchangeError::ParseError("eof".to_string()).is_retryable());
        assert!(!ExchangeError::ApiError {
            code: 1,
            message: "x".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_api_error_message_keeps_remote_text() {
        let err = ExchangeError::ApiError {
            code: 7,
            message: "조회할 자료가 없습니다".to_string(),
        };
        assert_eq!(err.to_string(), "API error 7: 조회할 자료가 없습니다");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let expected = json_err.to_string();
        let err: ExchangeError = json_err.into();
        assert!(matches!(err, ExchangeError::ParseError(_)));
        assert!(err.to_string().contains(&expected));
    }
}
