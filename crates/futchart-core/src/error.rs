//! 차트 수집 도구의 공통 에러 타입.

use thiserror::Error;

/// 설정/입력/파일 저장 단계에서 발생하는 에러.
#[derive(Debug, Error)]
pub enum ChartError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 차트 작업을 위한 Result 타입.
pub type ChartResult<T> = Result<T, ChartError>;

impl From<config::ConfigError> for ChartError {
    fn from(err: config::ConfigError) -> Self {
        ChartError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: ChartError = io.into();
        assert!(matches!(err, ChartError::Io(_)));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_config_error_message() {
        let err = ChartError::Config("KIS_APP_KEY".to_string());
        assert_eq!(err.to_string(), "설정 에러: KIS_APP_KEY");
    }
}
