//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 해외선물 분봉 전체 페이지 수집
//! - 텍스트 테이블 출력
//! - CSV 저장

pub mod commands;
