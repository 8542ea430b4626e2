use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use homescout_agent::{AgentRuntime, HomeSearchTool, OpenAiChatClient, ToolRegistry};
use homescout_harvest::HarvestClient;

use super::{init_logging, load_config};
use crate::GlobalArgs;

pub async fn run(args: GlobalArgs) -> Result<()> {
    let config = load_config(&args).context("could not load configuration")?;
    init_logging(&config);

    let source = HarvestClient::new(&config.search.source_base_url, config.search.timeout_secs)
        .context("could not build property source client")?;
    let mut tools = ToolRegistry::default();
    tools.register(HomeSearchTool::new(source, config.search.clone(), config.export.clone()));

    let llm = Arc::new(
        OpenAiChatClient::from_config(&config.llm).context("could not build llm client")?,
    );
    let runtime = AgentRuntime::new(llm, tools, &config.agent);

    tracing::info!(
        event_name = "system.chat.started",
        model = config.llm.model.as_str(),
        source = config.search.source_base_url.as_str(),
        "chat session ready"
    );
    println!("homescout chat - ask about listings, or type `exit` to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        match runtime.handle_message(message).await {
            Ok(reply) => println!("homescout> {reply}"),
            Err(err) => println!("homescout> I could not finish that request: {err}"),
        }
    }

    tracing::info!(event_name = "system.chat.stopped", "chat session closed");
    Ok(())
}
