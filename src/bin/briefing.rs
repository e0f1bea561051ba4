use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use briefing::ai::OpenAiSummarizer;
use briefing::calendar::{CalendarSource, GoogleCalendarClient, token_provider_for};
use briefing::cli::{Cli, describe_topic};
use briefing::core::config::RunConfig;
use briefing::news::NewsApiClient;
use briefing::pipeline::Pipeline;
use briefing::slack::{Dispatcher, DryRunDispatcher, SlackDispatcher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Variables already set in the process win over the file.
    let env_file = match &cli.env_file {
        Some(path) => Some(
            dotenvy::from_path(path)
                .with_context(|| format!("cannot load env file {}", path.display()))
                .map(|()| path.clone())?,
        ),
        None => dotenvy::dotenv().ok(),
    };

    briefing::setup_logging();
    if let Some(path) = env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    let mut config = RunConfig::from_env();
    cli.apply(&mut config);

    let catalog = cli.catalog(&config).context("cannot load topic catalog")?;
    if cli.list_topics {
        for topic in &catalog {
            println!("{}", describe_topic(topic));
        }
        return Ok(());
    }
    let topics = cli.selected_topics(&catalog)?;

    if cli.dry_run {
        warn!("Dry run: messages are printed, not posted");
    }

    let news = NewsApiClient::new(config.news_api_key.configured().cloned().unwrap_or_default());
    let summarizer = OpenAiSummarizer::from_settings(&config.openai);
    let dispatcher: Box<dyn Dispatcher> = if cli.dry_run {
        Box::new(DryRunDispatcher)
    } else {
        Box::new(SlackDispatcher::from_token(&config.slack_bot_token))
    };
    let calendar = cli.calendar.then(|| {
        GoogleCalendarClient::new(
            token_provider_for(&config.calendar.credential),
            config.calendar.calendar_id.clone(),
        )
    });

    let pipeline = Pipeline::new(&config, &news, &summarizer, dispatcher.as_ref());
    pipeline
        .run(&topics, calendar.as_ref().map(|c| c as &dyn CalendarSource))
        .await;

    Ok(())
}
