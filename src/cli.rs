//! `aosfs` 命令行：在 AlteronOS 内存环境上跑一次性任务。

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::{
    common::{PoolConfig, ResultStatus, Task, TaskResult},
    pool::WorkerPool,
    provider::{Environment, MemoryEnvironment},
};

/// AlteronOS 并发文件查询工具
#[derive(Parser, Debug)]
#[command(name = "aosfs", about = "Concurrent filesystem queries against AlteronOS")]
pub struct Cli {
    /// 要执行的子命令
    #[command(subcommand)]
    pub command: Command,

    /// TOML 配置文件
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆盖并发上限
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// 以 JSON 行输出结果
    #[arg(long, global = true)]
    pub json: bool,
}

/// 子命令
#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出目录内容
    Ls {
        /// 目录路径
        path: String,
    },
    /// 按子串查找路径
    Find {
        /// 匹配子串
        pattern: String,
    },
    /// 模拟连接主机
    Connect {
        /// 主机名
        host: String,
    },
    /// 打印进程表
    Ps,
    /// 每种任务各提交一个，并发执行
    Batch,
}

impl Command {
    /// 子命令对应的任务
    pub fn tasks(&self) -> Vec<Task> {
        match self {
            Command::Ls { path } => vec![Task::list(path.as_str())],
            Command::Find { pattern } => vec![Task::find(pattern.as_str())],
            Command::Connect { host } => vec![Task::connect(host.as_str())],
            Command::Ps => vec![Task::process_list()],
            Command::Batch => vec![
                Task::list("/"),
                Task::find(".txt"),
                Task::connect("example.net"),
                Task::process_list(),
            ],
        }
    }
}

impl Cli {
    /// 加载配置：文件优先，`--concurrency` 覆盖
    pub fn load_config(&self) -> Result<PoolConfig> {
        let mut config = match &self.config {
            Some(path) => PoolConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PoolConfig::default(),
        };
        if let Some(n) = self.concurrency {
            config = config.with_concurrency(n);
        }
        config.validate()?;
        Ok(config)
    }

    /// 执行子命令
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let env = Environment::from_memory(MemoryEnvironment::alteron());
        let pool = WorkerPool::builder()
            .with_config(config)
            .with_environment(env)
            .build()?;

        let tasks = self.command.tasks();
        let expected = tasks.len();
        for task in tasks {
            pool.submit(task)?;
        }

        let results = pool.results().take(expected).await;
        pool.shutdown(true).await;
        info!("{} task(s) finished", results.len());

        for result in &results {
            if self.json {
                println!("{}", serde_json::to_string(result)?);
            } else {
                print!("{}", render(result));
            }
        }
        check_outcome(&results)
    }
}

/// 有任务失败或被取消时返回错误，进程以非零状态退出
pub fn check_outcome(results: &[TaskResult]) -> Result<()> {
    let unsuccessful = results.iter().filter(|r| !r.is_success()).count();
    if unsuccessful > 0 {
        bail!("{} of {} task(s) did not succeed", unsuccessful, results.len());
    }
    Ok(())
}

/// 文本输出：一行标题，随后每个载荷条目一行
pub fn render(result: &TaskResult) -> String {
    let mut out = match &result.status {
        ResultStatus::Success => format!("[{}] ok\n", result.kind),
        ResultStatus::Failure(failure) => format!("[{}] error: {}\n", result.kind, failure),
        ResultStatus::Cancelled => format!("[{}] cancelled\n", result.kind),
    };
    for line in &result.payload {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
