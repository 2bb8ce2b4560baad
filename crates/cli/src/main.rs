//! `relaymq`: admin CLI for the broker's control plane.

mod client;

use clap::{Parser, Subcommand};
use client::ApiClient;

#[derive(Parser)]
#[command(name = "relaymq")]
#[command(version)]
#[command(about = "Administer a relaymq broker over its control plane")]
struct Cli {
    /// Base URL of the broker's control plane
    #[arg(long, env = "RELAYMQ_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Topic lifecycle
    Topics {
        #[command(subcommand)]
        command: TopicCommands,
    },
    /// Per-topic message and subscriber counters
    Stats,
    /// Broker liveness summary
    Health,
}

#[derive(Subcommand)]
enum TopicCommands {
    /// List topics with their subscriber counts
    List,
    /// Create a topic
    Create { name: String },
    /// Delete a topic, notifying its subscribers
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.server_url);

    match cli.command {
        Commands::Topics { command } => match command {
            TopicCommands::List => {
                let response = client.list_topics().await?;
                if response.topics.is_empty() {
                    println!("no topics");
                }
                for topic in response.topics {
                    println!("{}\t{} subscriber(s)", topic.name, topic.subscribers);
                }
            }
            TopicCommands::Create { name } => {
                let response = client.create_topic(&name).await?;
                println!("{} {}", response.status, response.topic);
            }
            TopicCommands::Delete { name } => {
                let response = client.delete_topic(&name).await?;
                println!("{} {}", response.status, response.topic);
            }
        },
        Commands::Stats => {
            let response = client.stats().await?;
            if response.topics.is_empty() {
                println!("no topics");
            }
            let mut names: Vec<_> = response.topics.keys().cloned().collect();
            names.sort();
            for name in names {
                let stats = &response.topics[&name];
                println!(
                    "{name}\t{} message(s)\t{} subscriber(s)",
                    stats.messages, stats.subscribers
                );
            }
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("uptime: {}s", health.uptime_sec);
            println!("topics: {}", health.topics);
            println!("subscriptions: {}", health.subscribers);
        }
    }

    Ok(())
}
