//! 해외선물 분봉 조회 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 나스닥100 선물 10분봉 전체 조회
//! futchart chart -s NQZ24 -e CME -c 20241119 -g 10
//!
//! # 첫 페이지만 조회
//! futchart chart -s NQZ24 -c 20241119 --single-page
//!
//! # CSV로 저장 (기본: ./NQZ24.csv)
//! futchart chart -s NQZ24 -c 20241119 --save
//! futchart chart -s NQZ24 -c 20241119 -o data/nq.csv
//! ```
//!
//! 인증 정보는 환경 변수(`.env` 포함)에서 읽습니다:
//! `KIS_APP_KEY`, `KIS_APP_SECRET`, `KIS_ACCESS_TOKEN`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use futchart_cli::commands::chart::{
    default_output_path, render_table, resolve_close_date, run_chart, ChartCommandConfig,
};
use futchart_core::{chart_span, init_logging, AppConfig, ChartError, LogConfig, LogFormat};
use tracing::{error, Instrument};

#[derive(Parser)]
#[command(name = "futchart")]
#[command(about = "KIS 해외선물 분봉 조회 CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (예: info, debug, futchart_exchange=debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 해외선물 분봉 조회 (연속 조회 키를 따라 전체 페이지 수집)
    Chart {
        /// 종목코드 (예: NQZ24)
        #[arg(short, long)]
        symbol: String,

        /// 거래소코드 (기본: 설정 파일의 chart.exchange)
        #[arg(short, long)]
        exchange: Option<String>,

        /// 조회 종료일 (YYYYMMDD 또는 YYYY-MM-DD, 기본: 오늘)
        #[arg(short = 'c', long)]
        close_date: Option<String>,

        /// 분봉 간격 (분)
        #[arg(short = 'g', long)]
        qry_gap: Option<String>,

        /// 최대 페이지 수 (0 = 무제한)
        #[arg(long)]
        max_pages: Option<usize>,

        /// 첫 페이지만 조회
        #[arg(long, conflicts_with = "max_pages")]
        single_page: bool,

        /// CSV 저장 (경로 미지정 시 {output_dir}/{symbol}.csv)
        #[arg(long)]
        save: bool,

        /// CSV 출력 파일 경로
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Chart command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app_config = AppConfig::load(cli.config.as_deref()).context("설정 로드 실패")?;

    let level = cli.log_level.unwrap_or(app_config.logging.level);
    let format: LogFormat = cli
        .log_format
        .unwrap_or(app_config.logging.format)
        .parse()
        .map_err(ChartError::InvalidInput)?;
    let log_config = LogConfig::new(level)
        .with_format(format)
        .with_file(app_config.logging.with_file);
    init_logging(log_config)
        .map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Chart {
            symbol,
            exchange,
            close_date,
            qry_gap,
            max_pages,
            single_page,
            save,
            output,
        } => {
            let defaults = app_config.chart;

            let max_pages = if single_page {
                Some(1)
            } else {
                match max_pages {
                    Some(0) => None,
                    Some(n) => Some(n),
                    None => defaults.page_limit(),
                }
            };

            let output_path = match output {
                Some(path) => Some(path),
                None if save => Some(default_output_path(&defaults.output_dir, &symbol)),
                None => None,
            };

            let config = ChartCommandConfig {
                exchange: exchange.unwrap_or_else(|| defaults.exchange.clone()),
                close_date: resolve_close_date(close_date.as_deref()),
                qry_gap: qry_gap.unwrap_or_else(|| defaults.qry_gap.clone()),
                symbol,
                max_pages,
                output_path,
            };

            let table = run_chart(&config)
                .instrument(chart_span!("chart", config.symbol, config.exchange))
                .await?;

            print!("{}", render_table(&table));

            if let Some(path) = &config.output_path {
                println!("저장 위치: {}", path.display());
            }
        }
    }

    Ok(())
}
