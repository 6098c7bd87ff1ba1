use crate::config::Settings;
use crate::core::workflow::{ApiVersion, GrantRequest};
use crate::domain::funder::Funder;
use crate::domain::model::{ContactInfo, Language, RegistrySchema};
use crate::utils::error::{DmpError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_orcid, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "swecris-dmp")]
#[command(about = "Move DMP metadata between SweCRIS, DMPonline and maDMP JSON files")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a maDMP record from SweCRIS data and print it
    Madmp(GrantArgs),

    /// Build a maDMP record from SweCRIS data and create the plan in DMPonline
    Create {
        #[command(flatten)]
        grant: GrantArgs,

        /// DMPonline template ID
        #[arg(short, long)]
        template: String,
    },

    /// Download a plan from DMPonline and save it as JSON
    Download {
        /// DMPonline plan ID
        #[arg(short = 'i', long = "planid")]
        plan_id: String,

        /// API version to download through (v0 or v1)
        #[arg(long, default_value = "v1", value_parser = parse_api_version)]
        api: ApiVersion,
    },

    /// Harvest the DMPonline template list to look up template IDs
    Templates,
}

#[derive(Debug, Clone, Args)]
pub struct GrantArgs {
    /// Grant ID, i.e. 2023-012345
    #[arg(short = 'i', long = "grantid")]
    pub grant_id: String,

    /// Funder acronym: vr, energimyndigheten, formas, forte, rj, rymdstyrelsen, vinnova
    #[arg(short, long, value_parser = parse_funder)]
    pub funder: Funder,

    /// Language used in the DMP: swe or eng
    #[arg(short, long, default_value = "eng", value_parser = parse_language)]
    pub lang: Language,

    /// Full name of the DMP contact person
    #[arg(short, long)]
    pub name: String,

    /// Contact person e-mail
    #[arg(short, long)]
    pub email: String,

    /// Contact person ORCID iD, if available
    #[arg(short, long)]
    pub orcid: Option<String>,

    /// SweCRIS date fields to read: project (default) or funding
    #[arg(long, value_parser = parse_schema)]
    pub registry_schema: Option<RegistrySchema>,
}

fn parse_funder(value: &str) -> std::result::Result<Funder, String> {
    value
        .parse()
        .map_err(|e: DmpError| e.user_friendly_message())
}

fn parse_language(value: &str) -> std::result::Result<Language, String> {
    value
        .parse()
        .map_err(|e: DmpError| e.user_friendly_message())
}

fn parse_schema(value: &str) -> std::result::Result<RegistrySchema, String> {
    value.parse().map_err(|e: DmpError| e.to_string())
}

fn parse_api_version(value: &str) -> std::result::Result<ApiVersion, String> {
    value.parse().map_err(|e: DmpError| e.to_string())
}

impl Validate for GrantArgs {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("grantid", &self.grant_id)?;
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(DmpError::InvalidConfigValue {
                field: "email".to_string(),
                value: self.email.clone(),
                reason: "not an e-mail address".to_string(),
            });
        }
        if let Some(orcid) = &self.orcid {
            validate_orcid("orcid", orcid)?;
        }
        Ok(())
    }
}

impl GrantArgs {
    /// Validated request; the schema flag wins over `SWECRIS_SCHEMA`.
    pub fn to_request(&self, settings: &Settings) -> Result<GrantRequest> {
        self.validate()?;
        Ok(GrantRequest {
            grant_id: self.grant_id.trim().to_string(),
            funder: self.funder,
            language: self.lang,
            contact: ContactInfo {
                name: self.name.clone(),
                email: self.email.clone(),
                orcid: self.orcid.clone(),
            },
            affiliation: settings.affiliation(),
            schema: self.registry_schema.unwrap_or(settings.registry_schema),
        })
    }
}
