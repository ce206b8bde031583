use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xiangqi_protocol::GatewayFrame;
use xiangqi_server::{RoomRegistry, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load(std::env::args_os().nth(1).map(PathBuf::from))?;

    // 初始化日志，标准输出留给网关消息
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!(
        report_rejections = config.report_rejections,
        block_elephant_eye = config.rules.block_elephant_eye,
        block_horse_leg = config.rules.block_horse_leg,
        "中国象棋房间服务启动，等待网关事件..."
    );

    let mut registry = RoomRegistry::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("读取网关事件失败")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let frame = match GatewayFrame::decode(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "无法解析网关事件: {}", line);
                continue;
            }
        };

        let room = frame.room.clone();
        let dispatch = match registry.dispatch(frame).await {
            Ok(dispatch) => dispatch,
            Err(e) => {
                warn!(room = %room, error = %e, "房间处理失败，已移出注册表");
                continue;
            }
        };
        for reply in &dispatch.replies {
            let mut encoded = reply.encode()?;
            encoded.push('\n');
            stdout.write_all(encoded.as_bytes()).await?;
        }
        stdout.flush().await?;
    }

    info!(rooms = registry.count(), "输入结束，服务退出");
    Ok(())
}
