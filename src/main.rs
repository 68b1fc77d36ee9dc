// ==========================================
// 供应链洞察 - 命令行入口
// ==========================================
// 用法:
//   supply-chain-insights <inventory.json> [sales.json] [--org ORG] [--days N]
// 输入: 行对象组成的 JSON 数组（上传层已解析好的行）
// 输出: stdout 打印 JSON 报告（导入结果、KPI、告警、补货建议）；日志走 stderr
// ==========================================

use serde_json::json;
use std::error::Error;
use std::sync::{Arc, Mutex};
use supply_chain_insights::api::AnalyticsApi;
use supply_chain_insights::cache::AnalyticsCache;
use supply_chain_insights::config::ConfigManager;
use supply_chain_insights::db::{default_db_path, init_schema, open_sqlite_connection};
use supply_chain_insights::domain::{RawRow, TimeRange};
use supply_chain_insights::engine::{ComputeOutcome, RecomputeRegistry};
use supply_chain_insights::importer::IngestService;
use supply_chain_insights::logging;
use supply_chain_insights::repository::RecordRepositoryImpl;

const DEFAULT_ORG: &str = "default";
const DEFAULT_DAYS: u32 = 90;

struct CliArgs {
    inventory_path: String,
    sales_path: Option<String>,
    org_id: String,
    days: u32,
}

fn usage() -> String {
    "用法: supply-chain-insights <inventory.json> [sales.json] [--org ORG] [--days N]".to_string()
}

fn parse_args() -> Result<CliArgs, Box<dyn Error>> {
    let mut positional = Vec::new();
    let mut org_id = DEFAULT_ORG.to_string();
    let mut days = DEFAULT_DAYS;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--org" => {
                org_id = args.next().filter(|s| !s.trim().is_empty()).ok_or_else(usage)?;
            }
            "--days" => {
                let raw = args.next().ok_or_else(usage)?;
                days = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("--days 需要正整数: {}", raw))?;
            }
            "-h" | "--help" => return Err(usage().into()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let inventory_path = positional.next().ok_or_else(usage)?;
    Ok(CliArgs {
        inventory_path,
        sales_path: positional.next(),
        org_id,
        days,
    })
}

fn read_rows(path: &str) -> Result<Vec<RawRow>, Box<dyn Error>> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("读取文件失败 {}: {}", path, e))?;
    let rows: Vec<RawRow> = serde_json::from_str(&text).map_err(|e| format!("JSON 解析失败 {}: {}", path, e))?;
    Ok(rows)
}

/// 取消的结果输出为 null
fn outcome_json<T: serde::Serialize>(outcome: ComputeOutcome<Arc<T>>) -> Result<serde_json::Value, Box<dyn Error>> {
    match outcome {
        ComputeOutcome::Completed(value) => Ok(serde_json::to_value(value.as_ref())?),
        ComputeOutcome::Cancelled => Ok(serde_json::Value::Null),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args = parse_args()?;
    tracing::info!(version = supply_chain_insights::VERSION, "供应链洞察启动");

    // 获取数据库路径
    let db_path = default_db_path();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db_path = db_path.to_string_lossy().to_string();
    tracing::info!(db_path = %db_path, "使用数据库");

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let repo = Arc::new(RecordRepositoryImpl::from_connection(conn.clone()));
    let config = Arc::new(ConfigManager::from_connection(conn).map_err(|e| e.to_string())?);
    let cache = Arc::new(AnalyticsCache::new());
    let registry = RecomputeRegistry::new();

    let ingest = IngestService::new(repo.clone(), cache.clone(), registry.clone());
    let analytics = AnalyticsApi::new(repo, cache, config, registry);

    // 导入
    let mut batches = Vec::new();
    let inventory_rows = read_rows(&args.inventory_path)?;
    batches.push(ingest.ingest_inventory(&args.org_id, &inventory_rows).await?);
    if let Some(sales_path) = &args.sales_path {
        let sales_rows = read_rows(sales_path)?;
        batches.push(ingest.ingest_sales(&args.org_id, &sales_rows).await?);
    }

    // 分析
    let range = TimeRange::last_days(args.days);
    let resolved = analytics.resolve(range);
    let kpis = analytics.kpis(&args.org_id, range).await?;
    let alerts = analytics.alerts(&args.org_id, range).await?;
    let recommendations = analytics.procurement_recommendations(&args.org_id, range).await?;

    let report = json!({
        "org_id": args.org_id,
        "range": { "start_date": resolved.start, "end_date": resolved.end },
        "batches": batches,
        "kpis": outcome_json(kpis)?,
        "alerts": outcome_json(alerts)?,
        "procurement_recommendations": outcome_json(recommendations)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(cache = ?analytics.cache_stats(), "完成");
    Ok(())
}
