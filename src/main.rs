use color_eyre::Result;
use clap::Parser;
use reflect::{Config, Profile, Session, api::HttpClient, cli::{self, Cli, Commands}, logging, utils};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps a separate config and log
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let mut config = match cli.config {
        Some(ref path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }

    if let Some(data_dir) = utils::get_data_dir(profile) {
        if let Err(e) = logging::init(&data_dir, config.log_level_filter()) {
            eprintln!("Logging disabled: {}", e);
        }
    }
    log::info!("starting against {} as user {}", config.api_base_url, config.user_id);

    let api = HttpClient::new(&config.api_base_url, config.request_timeout())?;
    let session = Session::from_config(&config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = reflect::tui::App::new(config, api, session);
            reflect::tui::run_event_loop(app, &runtime)?;
        }
        Commands::Reflect { summary, accomplishments, improvements } => {
            runtime.block_on(cli::handle_reflect(&api, &session, summary, accomplishments, improvements))?;
        }
        Commands::AddGoal { description, deadline } => {
            runtime.block_on(cli::handle_add_goal(&api, &session, description, deadline))?;
        }
        Commands::Goals { completed } => {
            runtime.block_on(cli::handle_goals(&api, &session, completed))?;
        }
        Commands::CompleteGoal { id } => {
            runtime.block_on(cli::handle_complete_goal(&api, &session, id))?;
        }
        Commands::AddJournal { content } => {
            runtime.block_on(cli::handle_add_journal(&api, &session, content))?;
        }
        Commands::AddTask { title, date, start, end, description, repeat } => {
            let draft = cli::build_task_draft(&title, &date, &start, &end, description, repeat.as_deref())?;
            runtime.block_on(cli::handle_add_task(&api, &session, draft))?;
        }
        Commands::Stats => {
            runtime.block_on(cli::handle_stats(&api, &session))?;
        }
    }

    Ok(())
}
