//! 해외선물 분봉 조회 명령어.
//!
//! 연속 조회 키를 따라 모든 페이지를 받아 (일자, 시각) 순으로 정렬한 뒤
//! 텍스트 테이블로 출력하고, 요청하면 CSV로 저장합니다.

use anyhow::{Context, Result};
use futchart_core::{kis_today, normalize_close_date, ChartResult};
use futchart_exchange::{
    AccessToken, ChartCollector, ChartRequest, ChartTable, CollectOptions, FuturesMinuteCandle,
    KisConfig, KisFuturesClient, MinuteChartSource,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// CSV 헤더 컬럼.
pub const CSV_COLUMNS: [&str; 11] = [
    "data_date",
    "data_time",
    "open_price",
    "high_price",
    "low_price",
    "last_price",
    "last_qty",
    "vol",
    "prev_diff_flag",
    "prev_diff_price",
    "prev_diff_rate",
];

/// 분봉 조회 설정
#[derive(Debug, Clone)]
pub struct ChartCommandConfig {
    /// 종목코드 (예: NQZ24)
    pub symbol: String,
    /// 거래소코드 (예: CME)
    pub exchange: String,
    /// 조회 종료일 (YYYYMMDD)
    pub close_date: String,
    /// 분봉 간격 (분)
    pub qry_gap: String,
    /// 최대 페이지 수 (None = 무제한)
    pub max_pages: Option<usize>,
    /// CSV 저장 경로 (None = 저장 안 함)
    pub output_path: Option<PathBuf>,
}

impl ChartCommandConfig {
    /// 최초 조회 요청 생성.
    pub fn request(&self) -> ChartRequest {
        ChartRequest::new(&self.symbol, &self.exchange, &self.close_date)
            .with_qry_gap(&self.qry_gap)
    }
}

/// 조회 종료일 결정. 입력이 없으면 오늘(KST).
pub fn resolve_close_date(input: Option<&str>) -> String {
    match input {
        Some(date) if !date.trim().is_empty() => normalize_close_date(date),
        _ => kis_today(),
    }
}

/// 기본 CSV 경로 (`{output_dir}/{symbol}.csv`).
pub fn default_output_path(output_dir: &str, symbol: &str) -> PathBuf {
    Path::new(output_dir).join(format!("{}.csv", symbol))
}

/// 환경 변수의 KIS 인증 정보로 분봉을 수집.
pub async fn run_chart(config: &ChartCommandConfig) -> Result<ChartTable> {
    let kis_config = KisConfig::from_env().context("KIS 설정을 읽지 못했습니다")?;
    let token = AccessToken::from_env().context("접근 토큰을 읽지 못했습니다")?;
    let client = KisFuturesClient::new(kis_config, token)?;

    info!(
        symbol = %config.symbol,
        exchange = %config.exchange,
        close_date = %config.close_date,
        qry_gap = %config.qry_gap,
        "Fetching futures minute chart"
    );

    fetch_chart(client, config).await
}

/// 주어진 데이터 소스로 분봉을 수집하고 필요하면 CSV로 저장.
pub async fn fetch_chart<S: MinuteChartSource>(
    source: S,
    config: &ChartCommandConfig,
) -> Result<ChartTable> {
    let options = CollectOptions::default().with_max_pages(config.max_pages);
    let collector = ChartCollector::new(source, options);
    let table = collector.collect(config.request()).await?;

    if let Some(path) = &config.output_path {
        save_to_csv(&table, path)
            .with_context(|| format!("Failed to save CSV: {}", path.display()))?;
    }

    Ok(table)
}

/// CSV 파일로 저장
pub fn save_to_csv(table: &ChartTable, path: &Path) -> ChartResult<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));

    // 원격 값은 그대로 쓰고 구분자/따옴표가 섞이면 csv가 인용 처리
    wtr.write_record(CSV_COLUMNS).map_err(std::io::Error::from)?;

    for candle in table.rows() {
        wtr.write_record(csv_record(candle)).map_err(std::io::Error::from)?;
    }

    wtr.flush()?;

    info!("Saved {} candles to {}", table.len(), path.display());

    Ok(table.len())
}

fn csv_record(candle: &FuturesMinuteCandle) -> [&str; 11] {
    [
        candle.data_date.as_str(),
        candle.data_time.as_str(),
        candle.open_price.as_str(),
        candle.high_price.as_str(),
        candle.low_price.as_str(),
        candle.last_price.as_str(),
        candle.last_qty.as_str(),
        candle.vol.as_str(),
        candle.prev_diff_flag.as_str(),
        candle.prev_diff_price.as_str(),
        candle.prev_diff_rate.as_str(),
    ]
}

/// 분봉 테이블을 고정폭 텍스트로 변환.
pub fn render_table(table: &ChartTable) -> String {
    if table.is_empty() {
        return "조회된 분봉이 없습니다.\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:<6} {:>12} {:>12} {:>12} {:>12} {:>8} {:>10} {:>4} {:>10} {:>8}\n",
        "date", "time", "open", "high", "low", "close", "qty", "vol", "sign", "diff", "rate"
    );
    out.push_str(&"-".repeat(112));
    out.push('\n');

    for c in table.rows() {
        out.push_str(&format!(
            "{:<8} {:<6} {:>12} {:>12} {:>12} {:>12} {:>8} {:>10} {:>4} {:>10} {:>8}\n",
            c.data_date,
            c.data_time,
            c.open_price,
            c.high_price,
            c.low_price,
            c.last_price,
            c.last_qty,
            c.vol,
            c.prev_diff_flag,
            c.prev_diff_price,
            c.prev_diff_rate
        ));
    }

    out.push_str(&summary_line(table));
    out.push('\n');
    out
}

/// 요약 한 줄 (행 수, 페이지 수, 시간 범위, 가격 범위).
fn summary_line(table: &ChartTable) -> String {
    let mut line = format!("{} candles, {} pages", table.len(), table.pages());

    if let Some(((first_date, first_time), (last_date, last_time))) = table.time_range() {
        line.push_str(&format!(
            ", {} {} ~ {} {}",
            first_date, first_time, last_date, last_time
        ));
    }
    if let Some((low, high)) = table.price_range() {
        line.push_str(&format!(", low {} / high {}", low, high));
    }

    line
}
