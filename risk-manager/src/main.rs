use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::select;
use tokio::time::interval;
use tracing::{info, error, debug, warn};
use anyhow::{Context, Result};

use risk_manager::command::{self, Reply};
use risk_manager::config::RiskManagerConfig;
use risk_manager::event_engine::{self, EventDispatcher, EventEngine, EventSender};
use risk_manager::order::OrderTracker;
use risk_manager::risk_control::{JsonSettingStore, RiskEngine};

/// 风控服务主进程
pub struct RiskManagerApp {
    config: RiskManagerConfig,

    // 风控引擎
    risk_engine: Arc<RiskEngine>,

    // 活动委托跟踪
    order_tracker: Arc<OrderTracker>,

    // 事件总线
    event_engine: EventEngine,
    event_sender: EventSender,
    dispatcher: EventDispatcher,

    // 统计信息
    processed_events: usize,
    processed_commands: usize,
}

impl RiskManagerApp {
    pub fn new(config: RiskManagerConfig) -> Result<Self> {
        let (event_sender, event_rx) = event_engine::channel();
        let order_tracker = Arc::new(OrderTracker::new());

        let setting_store = JsonSettingStore::new(&config.setting_path);
        info!("Loading risk setting from {:?}", setting_store.path());
        let risk_engine = RiskEngine::from_setting_store(
            Box::new(setting_store),
            order_tracker.clone(),
            event_sender.clone(),
        )
        .with_context(|| format!("Failed to load risk setting from {:?}", config.setting_path))?;
        let risk_engine = Arc::new(risk_engine);

        let dispatcher = EventDispatcher::new(risk_engine.clone(), order_tracker.clone());
        let event_engine = EventEngine::new(event_rx, config.timer_interval());

        Ok(Self {
            config,
            risk_engine,
            order_tracker,
            event_engine,
            event_sender,
            dispatcher,
            processed_events: 0,
            processed_commands: 0,
        })
    }

    /// 启动主循环，直到收到退出信号
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Starting Risk Manager, enabled={}, rules={:?}",
            self.risk_engine.is_enabled(),
            self.risk_engine.get_rules()
        );

        let mut commands = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut stdout = tokio::io::stdout();

        let mut stats_timer = interval(self.config.stats_interval());

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            select! {
                // 处理事件总线（成交、委托、定时器、日志）
                Some(event) = self.event_engine.next() => {
                    self.dispatcher.process_event(&event);
                    self.processed_events += 1;
                }

                // 处理运维指令
                line = Self::next_command(&mut commands), if stdin_open => {
                    match line {
                        Some(line) => {
                            let reply = self.process_command(&line);
                            Self::write_reply(&mut stdout, &reply).await?;
                        }
                        None => {
                            info!("Command input closed");
                            stdin_open = false;
                        }
                    }
                }

                // 定时输出统计
                _ = stats_timer.tick() => {
                    self.print_statistics();
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.risk_engine.stop();
        Ok(())
    }

    async fn next_command(commands: &mut Lines<BufReader<Stdin>>) -> Option<String> {
        match commands.next_line().await {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read command: {:?}", e);
                None
            }
        }
    }

    /// 处理一条运维指令
    fn process_command(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::ok();
        }

        self.processed_commands += 1;
        match command::parse_command(line) {
            Ok(cmd) => {
                debug!("Command: {:?}", cmd);
                command::execute(cmd, &self.risk_engine, &self.event_sender)
            }
            Err(e) => {
                warn!("Invalid command {:?}: {}", line, e);
                Reply::error(e.to_string())
            }
        }
    }

    async fn write_reply(stdout: &mut tokio::io::Stdout, reply: &Reply) -> Result<()> {
        let mut out = serde_json::to_vec(reply)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
        Ok(())
    }

    /// 输出统计信息
    fn print_statistics(&self) {
        let summary = self.risk_engine.get_summary();
        info!("=== Statistics ===");
        info!("Processed events: {}", self.processed_events);
        info!("Processed commands: {}", self.processed_commands);
        info!("Active orders: {}", self.order_tracker.len());
        info!("Order flow: {} (timer {})", summary.order_flow_count, summary.order_flow_timer);
        info!("Trade count: {}", summary.trade_count);

        for order in self.order_tracker.get_all_active_orders() {
            debug!(
                "Active order {} {} {:?} {}/{} {}",
                order.order_id, order.symbol, order.side, order.traded, order.volume, order.status
            );
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RiskManagerConfig::from_file(&path)?,
        None => RiskManagerConfig::default(),
    };

    info!("Risk Manager starting with {:?}", config);

    let app = RiskManagerApp::new(config)?;

    if let Err(e) = app.run().await {
        error!("Risk Manager error: {:?}", e);
        return Err(e);
    }

    Ok(())
}
