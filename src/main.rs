use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use message_tags::application::errors::{BotError, ConfigError};
use message_tags::application::messaging::{MessageDispatcher, ReplyFormat};
use message_tags::application::services::{TagCodec, TagStore, TAGS_COMMAND};
use message_tags::domain::entities::{Command, InputType, Reply};
use message_tags::domain::traits::{Bot, CommandHost, Messenger};
use message_tags::infrastructure::adapters::{ConsoleAdapter, ConsoleEditDialog};
use message_tags::infrastructure::clipboard::default_clipboard;
use message_tags::infrastructure::config::Config;
use message_tags::infrastructure::host::LocalCommandHost;
use message_tags::infrastructure::storage::open_settings_store;
use message_tags::plugins::{Collaborators, PluginManager, TagsPlugin};

/// Names the console front-end keeps for itself
const BUILTIN_COMMANDS: &[&str] = &["help", "quit"];

#[derive(Parser)]
#[command(name = "message-tags")]
#[command(about = "Save messages and send them with a simple command", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the console front-end
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Turn the "tag has been sent" notice on or off
    Notify {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Print exported tags as JSON
    Export {
        /// Export a single tag instead of all of them
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Merge tags from an export file
    Import {
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Version => {
            println!("message-tags v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig { force } => init_config(&cli.config, force),
        Commands::Notify { state } => set_notify(&cli.config, matches!(state, Toggle::On)),
        Commands::Export { name } => export_tags(&cli.config, name.as_deref()),
        Commands::Import { file } => import_tags(&cli.config, &file),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_bot(config_path: &Path) -> Result<(), BotError> {
    let config = Config::load_or_default(config_path)?;
    tracing::info!("Starting {} with tags in {}", config.bot.name, config.tags.data_path.display());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_console_bot(config))
}

async fn run_console_bot(config: Config) -> Result<(), BotError> {
    if !config.console_enabled() {
        return Err(BotError::Internal(
            "adapters.console.enabled is false, nothing to run".to_string(),
        ));
    }

    let backend = open_settings_store(&config.tags)?;
    let host = Arc::new(LocalCommandHost::new());
    let adapter = Arc::new(ConsoleAdapter::new(config.bot.name.clone()));
    let dialog = Arc::new(ConsoleEditDialog::new());
    let messenger: Arc<dyn Messenger> = adapter.clone();
    let format = ReplyFormat::new(config.tags.emote.clone());
    let chat_id = config.console_chat_id();

    register_builtin_commands(&host)?;

    let plugin = Arc::new(TagsPlugin::new(
        &config.tags,
        backend,
        Collaborators {
            host: host.clone(),
            messenger: messenger.clone(),
            clipboard: default_clipboard(),
            dialog: dialog.clone(),
        },
    )?);

    let mut plugins = PluginManager::new();
    plugins.register(plugin.clone()).map_err(BotError::Internal)?;
    plugins.start_all()?;
    for info in plugins.list_plugins() {
        tracing::info!("Plugin {}: {} {:?}", info.name, info.description, info.metadata);
    }

    let dispatcher = MessageDispatcher::new(config.bot.prefix.clone(), host.clone(), messenger.clone());
    let quit = format!("{}quit", config.bot.prefix);

    adapter.start().await?;
    let info = adapter.bot_info();
    tracing::info!("Bot started: {} (@{}, {} commands)", info.name, info.username, host.len());

    while let Some(input) = adapter.read_line("> ").await {
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == quit {
            break;
        }

        match dispatcher.process_text(&chat_id, input) {
            Ok(Some(reply)) => {
                adapter.send_message(&chat_id, &reply.render()).await?;
            }
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to process message: {}", e),
        }

        if dialog.has_pending() {
            dialog.prompt_pending(&adapter).await;
        }

        for result in plugin.apply_pending_edits() {
            let reply = match result {
                Ok(tag) => format.reply(format!("Successfully edited the tag **{}**!", tag.name)),
                Err(e) => format.reply(format!("Could not save the edit: {}", e)),
            };
            messenger.send_bot_message(&chat_id, reply);
        }
    }

    plugins.stop_all();
    tracing::info!("Bye");
    Ok(())
}

/// `help` lists the host's commands; `quit` is handled by the loop itself.
fn register_builtin_commands(host: &Arc<LocalCommandHost>) -> Result<(), BotError> {
    let weak = Arc::downgrade(host);
    host.register_command(
        Command::new("help")
            .with_description("Show available commands")
            .with_input_type(InputType::BuiltInText)
            .with_owner("console")
            .with_handler(move |_, _| Ok(weak.upgrade().map(|host| Reply::text(host.help())))),
    )?;
    host.register_command(
        Command::new("quit")
            .with_description("Leave the console")
            .with_input_type(InputType::BuiltInText)
            .with_owner("console")
            .with_handler(|_, _| Ok(None)),
    )?;
    Ok(())
}

fn open_store(config_path: &Path) -> Result<Arc<TagStore>, BotError> {
    let config = Config::load_or_default(config_path)?;
    let backend = open_settings_store(&config.tags)?;
    Ok(Arc::new(TagStore::open(backend)?))
}

fn set_notify(config_path: &Path, enabled: bool) -> Result<(), BotError> {
    let store = open_store(config_path)?;
    store.set_notify_on_send(enabled)?;
    println!("notify-on-send is now {}", if enabled { "on" } else { "off" });
    Ok(())
}

fn export_tags(config_path: &Path, name: Option<&str>) -> Result<(), BotError> {
    let codec = TagCodec::new(open_store(config_path)?);
    let exported = match name {
        Some(name) => codec.export_one(name)?,
        None => codec.export_all()?,
    };
    println!("{}", exported);
    Ok(())
}

fn import_tags(config_path: &Path, file: &Path) -> Result<(), BotError> {
    let text = std::fs::read_to_string(file)?;
    let codec = TagCodec::new(open_store(config_path)?);
    let names = codec.import_text(&text, |name| name == TAGS_COMMAND || BUILTIN_COMMANDS.contains(&name))?;
    println!("Successfully imported {} tag(s)!", names.len());
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<(), BotError> {
    if path.exists() && !force {
        return Err(BotError::Internal(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }

    let yaml = serde_yaml::to_string(&Config::default())
        .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, yaml)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
