use anyhow::{Context, Result};

use homescout_core::config::{AppConfig, LlmProvider, LogFormat};

use super::load_config;
use crate::GlobalArgs;

pub fn run(args: GlobalArgs) -> Result<()> {
    let config = load_config(&args).context("could not load configuration")?;
    println!("{}", render(&config));
    Ok(())
}

fn render(config: &AppConfig) -> String {
    let api_key = if config.llm.api_key.is_some() { "[set]" } else { "[unset]" };
    let base_url = config.llm.base_url.as_deref().unwrap_or("[provider default]");

    [
        format!("llm.provider          = {}", provider_name(config.llm.provider)),
        format!("llm.model             = {}", config.llm.model),
        format!("llm.base_url          = {base_url}"),
        format!("llm.api_key           = {api_key}"),
        format!("llm.timeout_secs      = {}", config.llm.timeout_secs),
        format!("llm.max_retries       = {}", config.llm.max_retries),
        format!("agent.history_window  = {}", config.agent.history_window),
        format!("agent.max_steps       = {}", config.agent.max_steps),
        format!("search.source_base_url = {}", config.search.source_base_url),
        format!("search.timeout_secs   = {}", config.search.timeout_secs),
        format!("search.default_radius = {}", config.search.default_radius),
        format!("search.max_results    = {}", config.search.max_results),
        format!("export.enabled        = {}", config.export.enabled),
        format!("export.data_dir       = {}", config.export.data_dir.display()),
        format!("export.filename       = {}", config.export.filename),
        format!("logging.level         = {}", config.logging.level),
        format!("logging.format        = {}", format_name(config.logging.format)),
    ]
    .join("\n")
}

fn provider_name(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "openai",
        LlmProvider::Anthropic => "anthropic",
        LlmProvider::Ollama => "ollama",
    }
}

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

#[cfg(test)]
mod tests {
    use homescout_core::config::AppConfig;

    use super::render;

    #[test]
    fn rendered_config_redacts_the_api_key() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-super-secret".to_string().into());

        let rendered = render(&config);
        assert!(rendered.contains("llm.api_key           = [set]"));
        assert!(!rendered.contains("sk-super-secret"));
    }

    #[test]
    fn rendered_config_lists_the_search_defaults() {
        let rendered = render(&AppConfig::default());
        assert!(rendered.contains("search.default_radius = 5"));
        assert!(rendered.contains("search.max_results    = 5"));
        assert!(rendered.contains("export.enabled        = false"));
    }
}
