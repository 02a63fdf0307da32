use anyhow::Context;
use clap::{Parser, Subcommand};
use toolcall::structured::{ask_with_reasoning, request_json_object};
use toolcall::{Agent, AgentOptions, Config, LlmClient, ToolRegistry, Transcript};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "toolcall", about = "Prompting, tool calls and structured output against a chat-completion API")]
struct Cli {
    /// Model identifier, overrides OPENAI_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    /// System prompt placed at the start of the transcript
    #[arg(long, global = true, default_value = "You are a helpful assistant.")]
    system: String,

    /// Print the final transcript as JSON
    #[arg(long, global = true)]
    dump: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Free-text prompt, one request
    Prompt { text: String },
    /// Tool-call round trip with get_current_weather available
    Weather {
        #[arg(default_value = "What's the weather in Boston?")]
        question: String,
    },
    /// json_schema output with reasoning and answer fields
    Structured { question: String },
    /// json_object output, printed pretty
    Json { question: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Before logging setup so RUST_LOG may come from .env; a missing file is fine
    let _ = dotenvy::dotenv();

    let default_filter = if cli.verbose { "toolcall=debug" } else { "toolcall=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    info!(model = %config.model, base_url = %config.base_url, "loaded configuration");

    let llm = LlmClient::new(&config)?;
    let tools = match cli.command {
        Command::Weather { .. } => ToolRegistry::with_builtin_tools(),
        _ => ToolRegistry::new(),
    };
    let agent = Agent::new(Box::new(llm), tools, AgentOptions::default());

    let mut transcript = Transcript::with_system(Some(&config.model), &cli.system);

    match &cli.command {
        Command::Prompt { text } => {
            transcript.push_user(text);
            let reply = agent.prompt(&mut transcript).await?;
            print_agent(reply.as_deref().unwrap_or(""));
        }
        Command::Weather { question } => {
            transcript.push_user(question);
            let round_trip = agent.run_round_trip(&mut transcript).await?;
            for executed in &round_trip.tool_calls {
                println!(
                    "\u{001b}[35m▌🔧 {} ({})\u{001b}[0m",
                    executed.call.function.name, executed.call.function.arguments
                );
                println!("\u{001b}[90m{}\u{001b}[0m", executed.outcome.result);
            }
            print_agent(round_trip.content.as_deref().unwrap_or(""));
        }
        Command::Structured { question } => {
            transcript.push_user(question);
            let parsed = ask_with_reasoning(&agent, &mut transcript).await?;
            println!("\u{001b}[90mReasoning: {}\u{001b}[0m", parsed.reasoning);
            print_agent(&parsed.answer);
        }
        Command::Json { question } => {
            transcript.push_user(question);
            let value = request_json_object(&agent, &mut transcript, None).await?;
            print_agent(&serde_json::to_string_pretty(&value)?);
        }
    }

    if cli.dump {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    }
    Ok(())
}

fn print_agent(text: &str) {
    println!("\u{001b}[96mAgent:\u{001b}[0m {}", text);
}
