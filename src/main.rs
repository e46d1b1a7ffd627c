//! toolchat CLI binary entry point.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use toolchat::cli::{exit_code_for_result, get_prompt, Cli, Commands, ExecArgs, ExecError, EXIT_SUCCESS};
use toolchat::config::ToolchatConfig;
use toolchat::context::FileContext;
use toolchat::executor::{ExecuteOptions, Executor};
use toolchat::formatter::{new_formatter, Format};
use toolchat::memory::FileMemory;
use toolchat::provider::create_client;
use toolchat::tools::{builtin, ToolExecutor, ToolRegistry};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Exec(args) => match handle_exec(args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e}");
                e.code
            }
        },
        Commands::Tools => {
            for tool in builtin::all_tools() {
                println!("{}\t{}", tool.name(), tool.description());
            }
            EXIT_SUCCESS
        }
    };

    std::process::exit(code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOOLCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_exec(args: ExecArgs) -> Result<i32, ExecError> {
    let prompt = get_prompt(args.prompt)?;

    let mut config = ToolchatConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.provider, args.model);

    let client = create_client(&config)?;
    let registry = ToolRegistry::from_tools(builtin::all_tools())?;
    let tools = ToolExecutor::new(
        Arc::new(registry),
        Duration::from_secs(config.ai.tool_timeout_secs),
    );
    let cwd = std::env::current_dir().map_err(toolchat::ToolchatError::from)?;

    let executor = Executor::new(client, Arc::new(tools))
        .with_provider(config.provider_name())
        .with_system_prompt(config.ai.system_prompt.clone())
        .with_memory(Arc::new(FileMemory::new(cwd, config.memory.clone())))
        .with_context_gatherer(Arc::new(FileContext::new(
            config.context.files.clone(),
            config.context.max_bytes,
        )));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let options = ExecuteOptions::builder()
        .prompt(prompt)
        .tools_enabled(!args.no_tools)
        .maybe_session_id(args.session)
        .include_context(args.context)
        .build();
    let result = executor.execute(&cancel, options).await;

    let formatter = new_formatter(Format::parse_or_default(&args.format));
    let mut sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::fs::File::create(path).map_err(toolchat::ToolchatError::from)?),
        None => Box::new(std::io::stdout().lock()),
    };
    formatter
        .format(sink.as_mut(), &result)
        .and_then(|()| sink.flush())
        .map_err(toolchat::ToolchatError::from)?;

    Ok(exit_code_for_result(&result))
}
