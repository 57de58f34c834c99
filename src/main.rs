// ==========================================
// 生产监控系统 - 命令行入口
// ==========================================
// 执行一次刷新: 输出 JSON 快照，可选导出 CSV
//
// 用法:
//   production-monitor [选项]
//     --db <path>            SQLite 数据库（默认 PRODUCTION_MONITOR_DB_PATH / 用户数据目录）
//     --file <path>          改用离线导出文件（.csv / .xlsx）作为数据源
//     --line <name>          产线筛选（默认全部）
//     --shift <label>        班次筛选（"Turno 1" ...，默认全部）
//     --mode <STRICT|WITH_NOTES>
//     --window <FULL_DAY|TRAILING_24H|NONE>
//     --at <YYYY-MM-DD HH:MM:SS>  参考时间（默认当前本地时间）
//     --export <dir>         导出 CSV 到目录
//     --set-target <line=value>   更新产线目标后退出（仅数据库模式）
//     --locale <es|en>
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDateTime};

use production_monitor::api::alert_text::fetch_failed_notice;
use production_monitor::api::{DashboardApi, RefreshRequest};
use production_monitor::app::{get_default_db_path, AppState};
use production_monitor::config::DashboardConfig;
use production_monitor::engine::normalizer::parse_timestamp;
use production_monitor::i18n::{set_locale, t_with_args};
use production_monitor::importer::FileRowSource;
use production_monitor::{logging, IncidentMode, WindowMode};

#[derive(Debug, Default)]
struct CliArgs {
    db_path: Option<String>,
    file: Option<PathBuf>,
    line: Option<String>,
    shift: Option<String>,
    mode: Option<IncidentMode>,
    window: Option<WindowMode>,
    at: Option<NaiveDateTime>,
    export_dir: Option<PathBuf>,
    set_target: Option<(String, String)>,
    locale: Option<String>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| anyhow!("参数 {} 缺少取值", flag));
        match flag.as_str() {
            "--db" => parsed.db_path = Some(value()?),
            "--file" => parsed.file = Some(PathBuf::from(value()?)),
            "--line" => parsed.line = Some(value()?),
            "--shift" => parsed.shift = Some(value()?),
            "--mode" => parsed.mode = Some(value()?.parse().map_err(|e: String| anyhow!(e))?),
            "--window" => parsed.window = Some(value()?.parse().map_err(|e: String| anyhow!(e))?),
            "--at" => {
                let raw = value()?;
                parsed.at =
                    Some(parse_timestamp(&raw).ok_or_else(|| anyhow!("无法解析参考时间: {}", raw))?);
            }
            "--export" => parsed.export_dir = Some(PathBuf::from(value()?)),
            "--set-target" => {
                let raw = value()?;
                let (line, target) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--set-target 格式应为 <产线>=<目标>: {}", raw))?;
                parsed.set_target = Some((line.trim().to_string(), target.trim().to_string()));
            }
            "--locale" => parsed.locale = Some(value()?),
            other => bail!("未知参数: {}", other),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = parse_args()?;
    if let Some(locale) = &args.locale {
        set_locale(locale);
    }

    tracing::info!("{} v{}", production_monitor::APP_NAME, production_monitor::VERSION);

    let api: Arc<DashboardApi> = match &args.file {
        Some(path) => {
            tracing::info!("使用离线文件: {}", path.display());
            Arc::new(DashboardApi::new(
                Arc::new(DashboardConfig::default()),
                Arc::new(FileRowSource::new(path.clone())),
            ))
        }
        None => {
            let db_path = args.db_path.clone().unwrap_or_else(get_default_db_path);
            tracing::info!("使用数据库: {}", db_path);
            let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

            if let Some((line, raw)) = &args.set_target {
                let target: f64 = raw
                    .parse()
                    .with_context(|| format!("产线目标不是数字: {}", raw))?;
                state.config_manager.set_line_target(line, target)?;
                println!("{}={}", line, target.max(0.0));
                return Ok(());
            }
            state.dashboard_api.clone()
        }
    };

    if args.set_target.is_some() {
        bail!("--set-target 仅适用于数据库模式");
    }

    let request = RefreshRequest {
        line: args.line.clone(),
        shift: args.shift.clone(),
        reference: args.at.unwrap_or_else(|| Local::now().naive_local()),
        incident_mode: args.mode,
        window_mode: args.window,
    };

    let response = match api.refresh(request).await {
        Ok(response) => response,
        Err(err) => {
            if let Some(notice) = fetch_failed_notice(&err) {
                eprintln!("{}", notice);
            }
            return Err(err.into());
        }
    };
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(dir) = &args.export_dir {
        let (path, count) = api.export_csv(&response.snapshot, dir)?;
        let path_text = path.display().to_string();
        let count_text = count.to_string();
        eprintln!(
            "{}",
            t_with_args(
                "export.written",
                &[("path", path_text.as_str()), ("count", count_text.as_str())]
            )
        );
    }

    Ok(())
}
