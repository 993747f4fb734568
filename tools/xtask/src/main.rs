//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 layered-ui 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `simulate`: 运行 panel-sim 默认场景
//! - `config-check`: 检查分层 UI 配置文件

use std::path::Path;
use std::process::{Command, ExitCode};

use layered_ui::LayeredUiConfig;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-core" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "layered-ui", "--all-features", "--html"]);
            run(
                "cargo llvm-cov -p layered-ui --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除工具 crate（xtask/panel-sim），只看库本身
            let mut cov = Command::new("cargo");
            cov.args([
                "llvm-cov",
                "--workspace",
                "--exclude",
                "xtask",
                "--exclude",
                "panel-sim",
                "--all-features",
                "--html",
            ]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --exclude panel-sim --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "simulate" => {
            let mut sim = Command::new("cargo");
            sim.args(["run", "-p", "panel-sim", "--"]);
            sim.args(args);
            run("cargo run -p panel-sim", &mut sim)?;
        }
        "config-check" => {
            let path = args.next().unwrap_or_else(|| "layered_ui.json".to_string());
            config_check(Path::new(&path))?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-core        运行 layered-ui 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  simulate        运行 panel-sim（其余参数原样传给 panel-sim）
  config-check    检查配置文件

CONFIG-CHECK:
  cargo xtask config-check [path]

  不带参数：检查 ./layered_ui.json
  与运行时加载不同，解析失败不会回退到默认配置，而是直接报错。

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-core      -> cargo xtask cov-core
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo simulate      -> cargo xtask simulate
"#
    );
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 严格检查配置文件：必须存在、能解析、通过校验
fn config_check(path: &Path) -> anyhow::Result<()> {
    eprintln!("\n==> config-check {}", path.display());

    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("读取 {} 失败: {e}", path.display()))?;
    let config: LayeredUiConfig = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("解析 {} 失败: {e}", path.display()))?;
    config.validate()?;

    eprintln!(
        "✅ 配置有效：参考分辨率 {}x{}，最多 {} 个图层，空闲 {} 秒后隐藏",
        config.reference_resolution.width,
        config.reference_resolution.height,
        config.max_layers,
        config.layer_idle_timeout
    );
    Ok(())
}
