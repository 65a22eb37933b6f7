//! # Futchart Core
//!
//! 해외선물 분봉 조회 도구의 공통 기반을 제공합니다.
//!
//! - 에러 타입
//! - 설정 관리 (파일 + 환경 변수)
//! - 로깅 인프라
//! - KIS 날짜 형식 유틸리티

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use self::config::*;
pub use error::*;
pub use logging::*;
pub use time::*;
