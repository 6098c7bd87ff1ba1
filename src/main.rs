use anyhow::Context;
use chrono::Local;
use clap::Parser;
use swecris_dmp::config::DMP_ID_PREFIX;
use swecris_dmp::core::madmp::Provenance;
use swecris_dmp::core::workflow::{self, ApiVersion};
use swecris_dmp::domain::funder;
use swecris_dmp::utils::{logger, validation::Validate};
use swecris_dmp::{
    Cli, Command, Console, DmpError, DmpOnlineClient, LocalStorage, Settings, SwecrisClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    funder::check_profiles().context("funder table is inconsistent")?;

    let settings = Settings::from_env().context("failed to read environment settings")?;
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    tracing::debug!("Settings: {:?}", settings);

    match run(cli.command, &settings).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_user_abort() => {
            println!("{}", e.user_friendly_message());
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<(), DmpError> {
    let mut console = Console::stdio();
    let storage = LocalStorage::new(&settings.output_dir);

    match command {
        Command::Madmp(grant) => {
            let request = grant.to_request(settings)?;
            let id_prefix = settings.require(DMP_ID_PREFIX)?;
            let registry = SwecrisClient::from_settings(settings)?;
            workflow::create_madmp(
                &registry,
                &mut console,
                &request,
                id_prefix,
                &Provenance::now(),
            )
            .await?;
        }
        Command::Create { grant, template } => {
            let request = grant.to_request(settings)?;
            let registry = SwecrisClient::from_settings(settings)?;
            let platform = DmpOnlineClient::from_settings(settings)?;
            let created = workflow::create_plan(
                &registry,
                &platform,
                &storage,
                &mut console,
                &request,
                &template,
                &Provenance::now(),
            )
            .await?;
            tracing::info!("✅ Plan response stored as {}", created.stored_as);
        }
        Command::Download { plan_id, api } => {
            let platform = match api {
                ApiVersion::V0 => DmpOnlineClient::v0_from_settings(settings)?,
                ApiVersion::V1 => DmpOnlineClient::from_settings(settings)?,
            };
            let stored_as =
                workflow::download_plan(&platform, &storage, &mut console, &plan_id, api).await?;
            tracing::info!("✅ Plan {} stored as {}", plan_id, stored_as);
        }
        Command::Templates => {
            let platform = DmpOnlineClient::from_settings(settings)?;
            let stored_as =
                workflow::harvest_templates(&platform, &storage, &mut console, &Local::now())
                    .await?;
            tracing::info!("✅ Templates stored as {}", stored_as);
        }
    }

    Ok(())
}
