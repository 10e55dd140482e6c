use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use navfsm_core::arbiter::transition_graph;
use navfsm_roslibrust::arbiter::{
    run_output_pump, ArbiterNode, ChannelOutputs, OutboundMsg, PublishLike, StateHeartbeat,
    TransitionTable, WaitPlan,
};
use navfsm_roslibrust::error::log_core_error;
use navfsm_roslibrust::topics::Topics;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use navfsm_console::commands::{parse_line, usage, ConsoleCommand};
use navfsm_console::config::Config;

/// Stands in for the rosbridge publishers: every outbound message is logged
/// under the topic it would be published on.
struct LogPublisher {
    topics: Topics,
}

impl PublishLike<OutboundMsg> for LogPublisher {
    type Error = std::convert::Infallible;

    fn publish<'a>(
        &'a self,
        msg: &'a OutboundMsg,
    ) -> Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>> {
        Box::pin(async move {
            let topic = self.topics.outbound(msg);
            match msg {
                OutboundMsg::CurrentState(state) => {
                    tracing::trace!(topic, state = %state, "publish")
                }
                OutboundMsg::Enable { behavior, enabled } => {
                    info!(topic, %behavior, enabled, "publish")
                }
                OutboundMsg::JoystickOverride(value) => info!(topic, value, "publish"),
                OutboundMsg::WheelsCmd {
                    vel_left,
                    vel_right,
                } => info!(topic, vel_left, vel_right, "publish"),
            }
            Ok(())
        })
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_args().context("parse configuration")?;
    let topics = Topics::for_vehicle(&config.vehicle);

    let (outputs, outbound) = ChannelOutputs::new();
    let publisher = Arc::new(LogPublisher {
        topics: topics.clone(),
    });
    let pump = tokio::spawn(run_output_pump(outbound, publisher));

    let table = Arc::new(TransitionTable::standard());
    let node = ArbiterNode::spawn("state_machine_node", Arc::clone(&table), Arc::new(outputs))
        .context("start arbiter")?;

    let heartbeat = node.spawn_heartbeat(StateHeartbeat::period_for_hz(config.publish_hz));
    let driver = config
        .sequential
        .then(|| node.spawn_wait_driver(WaitPlan::defaults(config.wait_timeout)));

    info!(
        vehicle = %config.vehicle,
        publish_hz = config.publish_hz,
        wait_timeout = ?config.wait_timeout,
        sequential = config.sequential,
        "navfsm console ready; type `help` for commands"
    );

    let source = node.source();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            line = lines.next_line() => line.context("read stdin")?,
        };
        let Some(line) = line else {
            break;
        };

        let cmd = match parse_line(&line) {
            Ok(cmd) => cmd,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        let delivered = match cmd {
            ConsoleCommand::Empty => Ok(()),
            ConsoleCommand::Tag(tag) => source.deliver_tag(&tag),
            ConsoleCommand::Obstacle(raw) => source.obstacle_detection(&raw),
            ConsoleCommand::Apriltag(raw) => source.apriltag_detection(&raw),
            ConsoleCommand::Completion { behavior, done } => {
                source.completion(behavior, done, Some(std::time::SystemTime::now()))
            }
            ConsoleCommand::Status { channel, value } => {
                source.detector_status(channel, value, Some(std::time::SystemTime::now()));
                Ok(())
            }
            ConsoleCommand::ShowState => match node.sync().await {
                Ok(snap) => {
                    println!(
                        "{} (epoch {}, enabled: {})",
                        snap.state,
                        snap.epoch,
                        node.enabled_behavior()
                            .map_or_else(|| "none".to_string(), |b| b.to_string())
                    );
                    Ok(())
                }
                Err(err) => Err(err),
            },
            ConsoleCommand::ShowGraph => {
                for edge in transition_graph(&table).transitions {
                    println!("{} --{}--> {}", edge.start, edge.event, edge.goal);
                }
                Ok(())
            }
            ConsoleCommand::Help => {
                println!("{}", usage());
                Ok(())
            }
            ConsoleCommand::Quit => break,
        };
        if let Err(err) = delivered {
            log_core_error(err);
            break;
        }
    }

    heartbeat.abort();
    if let Some(driver) = driver {
        driver.abort();
    }
    drop(source);
    node.shutdown().await;
    let _ = pump.await;
    Ok(())
}
