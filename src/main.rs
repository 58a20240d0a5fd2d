// ==========================================
// 履约中心产能规划系统 - 命令行入口
// ==========================================
// 子命令: generate | preprocess | analyze | bottlenecks | recommend | report | all
// 环境变量: FC_PLANNER_ROOT 指定产物根目录
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use fc_capacity_planner::api::{PipelineApi, StageReport};
use fc_capacity_planner::config::ConfigLoader;
use fc_capacity_planner::{logging, APP_NAME, VERSION};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "config/planner.yaml";
const ROOT_ENV: &str = "FC_PLANNER_ROOT";
const APP_DIR: &str = "fc-capacity-planner";

#[derive(Parser)]
#[command(name = "fc-capacity-planner")]
#[command(about = "履约中心产能规划: 合成需求仿真、瓶颈识别与人力建议", long_about = None)]
struct Cli {
    /// 配置文件 (YAML / JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 产物根目录 (默认当前目录)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成合成小时工序表
    Generate {
        /// 各工序并行仿真
        #[arg(long)]
        parallel: bool,
    },
    /// 校验原始表并派生日历特征
    Preprocess {
        /// 外部小时工序表 (CSV / XLSX), 缺省读取生成产物
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// 重算指标并按小时/日/全场聚合
    Analyze,
    /// 识别瓶颈小时
    Bottlenecks,
    /// 生成人力建议
    Recommend,
    /// 汇总 KPI
    Report,
    /// 依次运行全部阶段
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let config_path = resolve_config_path(cli.config);
    let config = ConfigLoader::load(&config_path)
        .with_context(|| format!("无法加载配置: {}", config_path.display()))?;
    let root = resolve_root(cli.root, &config_path);
    let api = PipelineApi::new(config, root).context("流水线初始化失败")?;

    let result = match cli.command {
        Commands::Generate { parallel: true } => api.generate_parallel().await.map(|s| vec![s]),
        Commands::Generate { parallel: false } => api.generate().map(|s| vec![s]),
        Commands::Preprocess { input: Some(path) } => api.preprocess_from(path).map(|s| vec![s]),
        Commands::Preprocess { input: None } => api.preprocess().map(|s| vec![s]),
        Commands::Analyze => api.analyze().map(|s| vec![s]),
        Commands::Bottlenecks => api.detect_bottlenecks().map(|s| vec![s]),
        Commands::Recommend => api.recommend_staffing().map(|s| vec![s]),
        Commands::Report => api.report().map(|(s, _)| vec![s]),
        Commands::All => api.run_all().await.map(|report| report.stages),
    };

    match result {
        Ok(stages) => {
            for stage in &stages {
                print_stage(stage);
            }
            println!("run_id={}", api.run_id());
            Ok(())
        }
        Err(err) => {
            if let Some(stage) = err.rerun_stage() {
                eprintln!("请先运行: fc-capacity-planner {}", stage.command());
            }
            Err(anyhow::Error::new(err)).context(stage_failure_label(&api))
        }
    }
}

fn print_stage(stage: &StageReport) {
    println!("[{}] rows={} elapsed_ms={}", stage.stage, stage.rows, stage.elapsed_ms);
    for path in &stage.artifacts {
        println!("  -> {}", path.display());
    }
}

fn stage_failure_label(api: &PipelineApi) -> String {
    format!("阶段执行失败 (run_id={})", api.run_id())
}

/// 配置路径: --config → ./config/planner.yaml → 用户配置目录
fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    let local = PathBuf::from(DEFAULT_CONFIG);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("planner.yaml"))
        .unwrap_or(local)
}

/// 产物根目录: --root → FC_PLANNER_ROOT → 用户数据目录 (配置取自用户配置目录时) → 当前目录
fn resolve_root(explicit: Option<PathBuf>, config_path: &Path) -> PathBuf {
    if let Some(root) = explicit {
        return root;
    }

    if let Ok(value) = std::env::var(ROOT_ENV) {
        if !value.trim().is_empty() {
            return PathBuf::from(value.trim());
        }
    }

    let user_config = dirs::config_dir().map(|dir| dir.join(APP_DIR));
    match (user_config, dirs::data_dir()) {
        (Some(config_dir), Some(data_dir)) if config_path.starts_with(&config_dir) => {
            data_dir.join(APP_DIR)
        }
        _ => PathBuf::from("."),
    }
}
