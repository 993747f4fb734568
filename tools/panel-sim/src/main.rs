//! # Panel Sim
//!
//! 无头面板模拟器 - 以固定帧步长驱动 `LayeredUiService`，
//! 输出每帧的 UI 事件和合成器调用，用于调试图层分配与动画时序。
//!
//! ## 用法
//!
//! ```bash
//! # 运行默认场景：空池 → A(Instant) → 更高图层上的 B → 关闭 A
//! cargo run -p panel-sim
//! cargo run -p panel-sim -- scenario --dt 0.05
//!
//! # 自定义步骤
//! cargo run -p panel-sim -- run canvas:menu higher:dialog:slide wait:3 close:1 wait:20
//!
//! # JSON 行输出 / 指定配置文件
//! cargo run -p panel-sim -- --json --config layered_ui.json
//!
//! # 导出默认配置
//! cargo run -p panel-sim -- dump-config layered_ui.json
//! ```
//!
//! ## 步骤语法
//!
//! - `canvas:<名称>[:instant|slide]`：放到最上层图层
//! - `higher:<名称>[:instant|slide]`：放到新的更高图层
//! - `close:<面板 ID>`：关闭面板
//! - `wait:<帧数>`：推进若干帧
//! - `hide-all`：立即销毁全部面板并隐藏全部图层

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use layered_ui::{
    CompositorLog, EntranceType, LayeredUiConfig, LayeredUiService, PanelId, PanelTemplate,
    RecordingCompositor, Size, UiEvent,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "panel-sim")]
#[command(about = "无头面板模拟器 - 以固定帧步长驱动分层 UI 服务")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 每帧时长（秒）
    #[arg(long, default_value = "0.1", global = true)]
    dt: f32,

    /// 配置文件（默认使用内置配置）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 行输出事件和合成器调用
    #[arg(long, global = true)]
    json: bool,

    /// 日志级别
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行默认场景
    Scenario,

    /// 按步骤运行自定义序列
    Run {
        /// 步骤列表，例如 `canvas:menu close:1 wait:10`
        #[arg(required = true)]
        steps: Vec<String>,
    },

    /// 导出默认配置
    DumpConfig {
        /// 输出文件（默认：layered_ui.json）
        #[arg(default_value = "layered_ui.json")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// 模拟步骤
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Canvas { name: String, entrance: EntranceType },
    Higher { name: String, entrance: EntranceType },
    Close(PanelId),
    Wait(usize),
    HideAll,
}

fn parse_entrance(value: Option<&str>) -> Result<EntranceType> {
    match value {
        None | Some("instant") => Ok(EntranceType::Instant),
        Some("slide") => Ok(EntranceType::Slide),
        Some(other) => bail!("未知的入场类型: {other}"),
    }
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let kind = parts.next().unwrap_or_default();
        let arg = parts.next();
        let extra = parts.next();

        let step = match (kind, arg) {
            ("canvas", Some(name)) => Step::Canvas {
                name: name.to_string(),
                entrance: parse_entrance(extra)?,
            },
            ("higher", Some(name)) => Step::Higher {
                name: name.to_string(),
                entrance: parse_entrance(extra)?,
            },
            ("close", Some(id)) => {
                let id = id
                    .parse::<u64>()
                    .with_context(|| format!("无效的面板 ID: {id}"))?;
                Step::Close(PanelId::new(id))
            }
            ("wait", Some(frames)) => Step::Wait(
                frames
                    .parse()
                    .with_context(|| format!("无效的帧数: {frames}"))?,
            ),
            ("hide-all", None) => Step::HideAll,
            _ => bail!("无法解析步骤: {s}"),
        };
        Ok(step)
    }
}

/// 默认场景
fn default_scenario() -> Vec<Step> {
    vec![
        Step::Canvas {
            name: "panel_a".to_string(),
            entrance: EntranceType::Instant,
        },
        Step::Wait(3),
        Step::Higher {
            name: "panel_b".to_string(),
            entrance: EntranceType::Instant,
        },
        Step::Wait(3),
        Step::Close(PanelId::new(1)),
        Step::Wait(15),
    ]
}

struct Simulator {
    service: LayeredUiService,
    log: CompositorLog,
    dt: f32,
    json: bool,
    frame: u64,
}

impl Simulator {
    fn new(config: LayeredUiConfig, dt: f32, json: bool) -> Result<Self> {
        let compositor = RecordingCompositor::new();
        let log = compositor.log();
        let service = LayeredUiService::with_compositor(config, Box::new(compositor))
            .context("创建分层 UI 服务失败")?;
        Ok(Self {
            service,
            log,
            dt,
            json,
            frame: 0,
        })
    }

    fn template(name: &str) -> PanelTemplate {
        PanelTemplate::new(name, Size::new(400.0, 300.0))
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Canvas { name, entrance } => {
                let id = self.service.use_canvas(&Self::template(name), *entrance)?;
                self.print_line(&format!("放置 {name} → {id}（当前图层）"));
            }
            Step::Higher { name, entrance } => {
                let id = self
                    .service
                    .use_higher_canvas_with(&Self::template(name), *entrance)?;
                self.print_line(&format!("放置 {name} → {id}（更高图层）"));
            }
            Step::Close(id) => {
                // 未找到只记录警告，继续后续步骤
                if let Err(e) = self.service.close(*id) {
                    warn!(error = %e, "关闭失败");
                } else {
                    self.print_line(&format!("关闭 {id}"));
                }
            }
            Step::Wait(frames) => {
                for _ in 0..*frames {
                    self.frame += 1;
                    let events = self.service.update(self.dt);
                    self.print_events(&events)?;
                    self.flush_ops()?;
                }
            }
            Step::HideAll => {
                let events = self.service.hide_all();
                self.print_events(&events)?;
            }
        }
        self.flush_ops()
    }

    fn print_line(&self, message: &str) {
        if !self.json {
            println!("[帧 {:>3}] {message}", self.frame);
        }
    }

    fn print_events(&self, events: &[UiEvent]) -> Result<()> {
        for event in events {
            if self.json {
                println!("{}", serde_json::to_string(event)?);
            } else {
                println!("[帧 {:>3}] 事件 {event:?}", self.frame);
            }
        }
        Ok(())
    }

    fn flush_ops(&self) -> Result<()> {
        for op in self.log.drain() {
            if self.json {
                println!("{}", serde_json::to_string(&op)?);
            } else {
                println!("[帧 {:>3}]   后端 {op:?}", self.frame);
            }
        }
        Ok(())
    }

    fn summary(&self) {
        if self.json {
            return;
        }
        println!();
        println!("共 {} 帧，注册面板 {:?}", self.frame, self.service.panel_ids());
        for layer in self.service.layers() {
            println!(
                "  {} active={} sibling={} children={:?}",
                layer.index(),
                layer.is_active(),
                layer.sibling_index(),
                layer.children()
            );
        }
    }
}

fn run(cli: &Cli, steps: &[Step]) -> Result<()> {
    if cli.dt <= 0.0 {
        bail!("--dt 必须大于 0");
    }

    let config = match &cli.config {
        Some(path) => LayeredUiConfig::load(path),
        None => LayeredUiConfig::default(),
    };

    let mut sim = Simulator::new(config, cli.dt, cli.json)?;
    info!(steps = steps.len(), dt = cli.dt, "开始模拟");
    for step in steps {
        sim.apply(step)
            .with_context(|| format!("执行步骤 {step:?} 失败"))?;
    }
    sim.summary();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_target(false)
        .init();

    let result = match &cli.command {
        None | Some(Commands::Scenario) => run(&cli, &default_scenario()),
        Some(Commands::Run { steps }) => steps
            .iter()
            .map(|s| s.parse::<Step>())
            .collect::<Result<Vec<_>>>()
            .and_then(|steps| run(&cli, &steps)),
        Some(Commands::DumpConfig { output }) => LayeredUiConfig::default()
            .save(output)
            .map(|()| println!("已写入 {}", output.display()))
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("❌ 模拟失败: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(
            "canvas:menu".parse::<Step>().unwrap(),
            Step::Canvas {
                name: "menu".to_string(),
                entrance: EntranceType::Instant
            }
        );
        assert_eq!(
            "higher:drawer:slide".parse::<Step>().unwrap(),
            Step::Higher {
                name: "drawer".to_string(),
                entrance: EntranceType::Slide
            }
        );
        assert_eq!(
            "close:3".parse::<Step>().unwrap(),
            Step::Close(PanelId::new(3))
        );
        assert_eq!("wait:10".parse::<Step>().unwrap(), Step::Wait(10));
        assert_eq!("hide-all".parse::<Step>().unwrap(), Step::HideAll);
    }

    #[test]
    fn test_parse_invalid_steps() {
        assert!("close:abc".parse::<Step>().is_err());
        assert!("canvas:menu:fly".parse::<Step>().is_err());
        assert!("jump:1".parse::<Step>().is_err());
        assert!("canvas".parse::<Step>().is_err());
    }

    #[test]
    fn test_default_scenario_runs() {
        let mut sim = Simulator::new(LayeredUiConfig::default(), 0.1, true).unwrap();
        for step in default_scenario() {
            sim.apply(&step).unwrap();
        }

        // A 已关闭，只剩 B
        assert_eq!(sim.service.panel_ids(), vec![PanelId::new(2)]);
        assert_eq!(sim.frame, 21);
    }
}
