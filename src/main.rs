//! Toolforge CLI entry point.

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use toolforge::services::{
    Agent, Executor, ExecutorConfig, GithubSearcher, LifecycleConfig, LlmCodeGenerator,
    LlmTaskDecomposer, TerminalPrompt,
};
use toolforge::utils::paths::ensure_dir;
use toolforge::{AgentConfig, AppError, AppResult, ToolStore};
use toolforge_llm::{build_http_client, ChatCompletionsProvider, LlmProvider};

#[derive(Parser, Debug)]
#[command(name = "toolforge", version, about = "LLM task agent with a self-growing tool library")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single task and print the answer
    Ask {
        /// The task to perform
        task: String,
    },
    /// List stored tools
    List,
}

#[tokio::main]
async fn main() {
    // .env is optional; a missing file is not an error.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolforge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AgentConfig::from_env()?;
    debug!(?config, "loaded configuration");

    let tools_dir = config.tools_dir()?;
    let mut store = ToolStore::load(&tools_dir)?;

    match cli.command {
        Some(Commands::List) => {
            if store.is_empty() {
                println!("No tools are currently available.");
            } else {
                for tool in store.list_all() {
                    println!("{}: {}", tool.id, tool.description);
                }
            }
            Ok(())
        }
        Some(Commands::Ask { task }) => {
            let runtime = AgentRuntime::new(&config)?;
            let answer = runtime.agent(&mut store).handle_task(&task).await?;
            println!("{}", answer);
            Ok(())
        }
        None => repl(&config, &mut store).await,
    }
}

/// Interactive loop: one task per line, `exit` to quit.
async fn repl(config: &AgentConfig, store: &mut ToolStore) -> AppResult<()> {
    let runtime = AgentRuntime::new(config)?;
    println!("toolforge ready. Type a task, 'list tools', or 'exit'.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let task = line.trim();
        if task.is_empty() {
            continue;
        }
        if task.eq_ignore_ascii_case("exit") {
            break;
        }

        match runtime.agent(store).handle_task(task).await {
            Ok(answer) => println!("{}", answer),
            // Fatal conditions end the session; everything else is
            // reported and the loop continues.
            Err(e @ AppError::CorruptStore(_)) => return Err(e),
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(())
}

/// Owns the long-lived collaborators so a REPL session reuses them.
struct AgentRuntime {
    provider: ChatCompletionsProvider,
    decomposer: LlmTaskDecomposer<ChatCompletionsProvider>,
    generator: LlmCodeGenerator<ChatCompletionsProvider>,
    searcher: Option<GithubSearcher>,
    executor: Executor,
    prompt: TerminalPrompt,
    lifecycle_config: LifecycleConfig,
}

impl AgentRuntime {
    fn new(config: &AgentConfig) -> AppResult<Self> {
        let provider = ChatCompletionsProvider::from_env()?;
        debug!(provider = provider.name(), model = provider.model(), "LLM backend selected");

        let workspace = config.workspace_dir()?;
        ensure_dir(&workspace)?;

        let mut executor_config = ExecutorConfig::new(workspace);
        executor_config.timeout = config.execution_timeout();
        executor_config.interpreter = config.interpreter.clone();

        Ok(Self {
            provider,
            decomposer: LlmTaskDecomposer::new(ChatCompletionsProvider::from_env()?),
            generator: LlmCodeGenerator::new(ChatCompletionsProvider::from_env()?),
            searcher: GithubSearcher::from_env(build_http_client(
                toolforge_llm::http_client::DEFAULT_REQUEST_TIMEOUT,
            )),
            executor: Executor::new(executor_config),
            prompt: TerminalPrompt,
            lifecycle_config: LifecycleConfig {
                match_threshold: config.match_threshold,
                max_generation_attempts: config.max_generation_attempts,
            },
        })
    }

    fn agent<'a>(&'a self, store: &'a mut ToolStore) -> Agent<'a, ChatCompletionsProvider> {
        Agent::new(
            store,
            &self.provider,
            &self.decomposer,
            &self.generator,
            self.searcher
                .as_ref()
                .map(|s| s as &dyn toolforge_core::SnippetSearcher),
            &self.executor,
            &self.prompt,
            self.lifecycle_config.clone(),
        )
    }
}
