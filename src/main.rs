use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use researcher_rs::researcher::config::{Layered, LeadConfig, ResearchConfig, ServerConfig};
use researcher_rs::researcher::pipelines::leads::{build_lead_graph, LeadContext, LeadInput};
use researcher_rs::researcher::pipelines::research::{
    build_research_graph, ResearchApproach, ResearchContext, ResearchInput,
};
use researcher_rs::researcher::server::{self, AppState};
use researcher_rs::researcher::tools::{Mailer, SmtpMailer};
use researcher_rs::researcher::workflow::GraphEvent;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Approach {
    /// Web research on the topic alone
    Topic,
    /// Company-focused research with leads and contacts
    Company,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Research a topic and produce a report (and optionally a podcast)
    Research {
        /// The topic to research
        topic: String,

        #[arg(short, long, value_enum, default_value = "topic")]
        approach: Approach,

        /// Target company (company approach)
        #[arg(short, long)]
        company: Option<String>,

        /// Job title area to look for; repeat for several
        #[arg(short, long = "title")]
        titles: Vec<String>,

        /// Video to analyze alongside the web research
        #[arg(short, long)]
        video: Option<String>,

        /// Also produce a two-host podcast
        #[arg(long)]
        podcast: bool,

        /// YAML file overriding pipeline settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print each step's update as it completes
        #[arg(long)]
        stream: bool,
    },
    /// Find leads at a company
    Leads {
        /// Company to search
        company: String,

        /// Area or department of interest
        #[arg(short, long, default_value = "")]
        area: String,

        /// Job title to look for; repeat for several
        #[arg(short, long = "title")]
        titles: Vec<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Serve both pipelines over HTTP
    Serve {
        /// Overrides PORT
        #[arg(short, long)]
        port: Option<u16>,

        /// YAML file overriding research pipeline settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// YAML file overriding lead pipeline settings
        #[arg(long)]
        lead_config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Research {
            topic,
            approach,
            company,
            titles,
            video,
            podcast,
            config,
            stream,
        } => {
            let config = ResearchConfig::load(config.as_deref())?;
            let ctx = ResearchContext::from_env(config)?;
            let graph = build_research_graph()?;

            let input = ResearchInput {
                topic,
                research_approach: match approach {
                    Approach::Topic => ResearchApproach::TopicOnly,
                    Approach::Company => ResearchApproach::TopicCompanyLeads,
                },
                company_name: company,
                title_areas: (!titles.is_empty()).then_some(titles),
                video_url: video,
                create_podcast: podcast,
            };

            if stream {
                let mut events = Box::pin(graph.stream(input, &ctx));
                while let Some(event) = events.next().await {
                    match event? {
                        GraphEvent::Step { node, update } => {
                            println!("[{}] {}", node, serde_json::to_string(&update)?);
                        }
                        GraphEvent::Finished { output } => {
                            println!("{}", serde_json::to_string_pretty(&output)?);
                        }
                    }
                }
            } else {
                let output = graph.invoke(input, &ctx).await?;
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Commands::Leads {
            company,
            area,
            titles,
            config,
        } => {
            let config = LeadConfig::load(config.as_deref())?;
            let ctx = LeadContext::from_env(config)?;
            let graph = build_lead_graph()?;

            let output = graph
                .invoke(
                    LeadInput {
                        company_name: company,
                        lead_generation_area: area,
                        titles,
                    },
                    &ctx,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Serve {
            port,
            config,
            lead_config,
        } => {
            // tower-http traces go through tracing; log macros stay on env_logger
            tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish())
                .context("Failed to install tracing subscriber")?;

            let server_config = ServerConfig::load(None)?;
            let research_config = ResearchConfig::load(config.as_deref())?;
            let research_ctx = ResearchContext::from_env(research_config)?;
            let lead_ctx = LeadContext::from_env(LeadConfig::load(lead_config.as_deref())?)?;

            let mailer: Option<Arc<dyn Mailer>> = match SmtpMailer::from_env() {
                Ok(mailer) => Some(Arc::new(mailer)),
                Err(e) => {
                    log::warn!("Results e-mail disabled: {}", e);
                    None
                }
            };

            let state = AppState {
                research_graph: Arc::new(build_research_graph()?),
                research_ctx: Arc::new(research_ctx),
                lead_graph: Arc::new(build_lead_graph()?),
                lead_ctx: Arc::new(lead_ctx),
                mailer,
                request_timeout: Duration::from_secs(server_config.request_timeout_secs),
            };

            server::serve(state, port.unwrap_or(server_config.port)).await?;
        }
    }

    Ok(())
}
