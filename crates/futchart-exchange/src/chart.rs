//! 분봉 페이지 수집.
//!
//! 최초 조회 후 응답의 연속 조회 키가 유효한 동안 다음 페이지를 이어서 요청하고,
//! 모든 페이지를 (일자, 시각) 순으로 정렬된 하나의 테이블로 합칩니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use futchart_exchange::{ChartCollector, ChartRequest, CollectOptions};
//!
//! let collector = ChartCollector::new(client, CollectOptions::default());
//! let table = collector.collect(ChartRequest::new("NQZ24", "CME", "20241119")).await?;
//! println!("{} candles over {} pages", table.len(), table.pages());
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::connector::kis::{ChartRequest, FuturesChartResponse, FuturesMinuteCandle, KisFuturesClient};
use crate::ExchangeError;

/// 분봉 한 페이지를 가져오는 데이터 소스.
#[async_trait]
pub trait MinuteChartSource: Send + Sync {
    /// 요청 하나에 대한 응답 페이지 조회.
    async fn fetch_page(
        &self,
        request: &ChartRequest,
    ) -> Result<FuturesChartResponse, ExchangeError>;
}

#[async_trait]
impl MinuteChartSource for KisFuturesClient {
    async fn fetch_page(
        &self,
        request: &ChartRequest,
    ) -> Result<FuturesChartResponse, ExchangeError> {
        self.get_minute_chart(request).await
    }
}

/// 수집된 분봉 테이블.
#[derive(Debug, Clone, Default)]
pub struct ChartTable {
    rows: Vec<FuturesMinuteCandle>,
    pages: usize,
}

impl ChartTable {
    /// 빈 테이블 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 한 페이지를 (일자, 시각) 순으로 정렬해 뒤에 붙임.
    pub fn push_page(&mut self, mut page: Vec<FuturesMinuteCandle>) {
        sort_candles(&mut page);
        self.rows.extend(page);
        self.pages += 1;
    }

    /// 전체 행을 (일자, 시각) 순으로 정렬.
    ///
    /// 안정 정렬이므로 같은 시각의 행은 들어온 순서를 유지합니다.
    pub fn sort(&mut self) {
        sort_candles(&mut self.rows);
    }

    /// 행 목록.
    pub fn rows(&self) -> &[FuturesMinuteCandle] {
        &self.rows
    }

    /// 행 개수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 합쳐진 페이지 수.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// 첫 행과 마지막 행의 (일자, 시각).
    pub fn time_range(&self) -> Option<((&str, &str), (&str, &str))> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((first.sort_key(), last.sort_key()))
    }

    /// 전체 저가 최솟값과 고가 최댓값.
    pub fn price_range(&self) -> Option<(Decimal, Decimal)> {
        let low = self.rows.iter().filter_map(|c| c.low()).min()?;
        let high = self.rows.iter().filter_map(|c| c.high()).max()?;
        Some((low, high))
    }
}

fn sort_candles(rows: &mut [FuturesMinuteCandle]) {
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// 수집 옵션.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// 최대 페이지 수 (None = 연속 조회 키가 끝날 때까지)
    pub max_pages: Option<usize>,
}

impl CollectOptions {
    /// 최대 페이지 수 설정.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// 첫 페이지만 조회.
    pub fn single_page() -> Self {
        Self { max_pages: Some(1) }
    }
}

/// 연속 조회 키를 따라 모든 페이지를 수집하는 수집기.
///
/// 요청은 순차적으로 하나씩 보냅니다. 자동 재시도는 하지 않으며
/// 첫 실패에서 에러를 반환합니다.
pub struct ChartCollector<S> {
    source: S,
    options: CollectOptions,
}

impl<S: MinuteChartSource> ChartCollector<S> {
    /// 새 수집기 생성.
    pub fn new(source: S, options: CollectOptions) -> Self {
        Self { source, options }
    }

    /// 데이터 소스 반환.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// 분봉 수집.
    ///
    /// 다음 중 하나가 되면 멈춥니다:
    /// - 연속 조회 키가 `CONTINUATION_KEY_MIN_LEN` 이하
    /// - `max_pages`에 도달
    /// - 서비스가 직전과 같은 키를 다시 돌려줌
    pub async fn collect(&self, request: ChartRequest) -> Result<ChartTable, ExchangeError> {
        let mut table = ChartTable::new();
        let mut current = request;

        loop {
            let page = self.source.fetch_page(&current).await?;
            let index_key = page.output2.index_key.clone();

            debug!(
                page = table.pages() + 1,
                rows = page.output1.len(),
                index_key = %index_key,
                "Fetched chart page"
            );
            table.push_page(page.output1);

            if let Some(max) = self.options.max_pages {
                if table.pages() >= max {
                    if current.next_page(&index_key).is_some() {
                        info!(max_pages = max, "Page limit reached, stopping pagination");
                    }
                    break;
                }
            }

            let Some(next) = current.next_page(&index_key) else {
                break;
            };

            if next.index_key == current.index_key {
                warn!(
                    index_key = %index_key,
                    "Continuation key did not advance, stopping pagination"
                );
                break;
            }

            current = next;
        }

        table.sort();

        info!(
            symbol = %current.symbol,
            pages = table.pages(),
            rows = table.len(),
            "Chart collection finished"
        );

        Ok(table)
    }
}
