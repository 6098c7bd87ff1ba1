//! The four operator-driven tasks. Each one asks before every side effect
//! and stops at the first decline or error.

use crate::core::madmp::{build_madmp, MappingRequest, MappingTarget, Provenance};
use crate::core::prompt::Console;
use crate::domain::funder::Funder;
use crate::domain::madmp::{MaDmpDocument, PlanEnvelope};
use crate::domain::model::{Affiliation, ContactInfo, GrantRecord, Language, RegistrySchema};
use crate::domain::ports::{DmpPlatform, GrantRegistry, Storage};
use crate::utils::error::{DmpError, Result};
use chrono::{DateTime, Local};
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;
use url::Url;

pub const DOWNLOADED_PLANS_DIR: &str = "Downloaded_plans";
pub const TEMPLATES_DIR: &str = "Templates";
pub const UPLOADED_PLANS_DIR: &str = "Uploaded_plans";

/// Everything needed to look up one grant and describe its DMP.
#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub grant_id: String,
    pub funder: Funder,
    pub language: Language,
    pub contact: ContactInfo,
    pub affiliation: Option<Affiliation>,
    pub schema: RegistrySchema,
}

impl GrantRequest {
    pub fn registry_key(&self) -> String {
        self.funder.profile().registry_key(&self.grant_id)
    }

    fn mapping(&self, target: MappingTarget) -> MappingRequest {
        MappingRequest {
            grant_id: self.grant_id.clone(),
            funder: self.funder,
            language: self.language,
            contact: self.contact.clone(),
            affiliation: self.affiliation.clone(),
            schema: self.schema,
            target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V0,
    V1,
}

impl ApiVersion {
    fn label(self) -> &'static str {
        match self {
            ApiVersion::V0 => "V0",
            ApiVersion::V1 => "V1",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = DmpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v0" | "0" => Ok(ApiVersion::V0),
            "v1" | "1" => Ok(ApiVersion::V1),
            other => Err(DmpError::InvalidConfigValue {
                field: "api".to_string(),
                value: other.to_string(),
                reason: "expected v0 or v1".to_string(),
            }),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlan {
    pub stored_as: String,
    pub api_link: Option<String>,
    pub browser_link: Option<String>,
}

/// Keeps identifier-derived file names inside their output directory.
fn file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

pub fn downloaded_plan_path(plan_id: &str, version: ApiVersion) -> String {
    format!(
        "{}/{}_API_{}_dmp.json",
        DOWNLOADED_PLANS_DIR,
        file_component(plan_id),
        version.label()
    )
}

pub fn templates_path(timestamp: &DateTime<Local>) -> String {
    format!(
        "{}/Templates_from_DMPonline_{}.json",
        TEMPLATES_DIR,
        timestamp.format("%Y%m%d-%H%M%S")
    )
}

pub fn uploaded_plan_path(grant_id: &str, contact_name: &str) -> String {
    format!(
        "{}/{}{}dmp.json",
        UPLOADED_PLANS_DIR,
        file_component(grant_id),
        file_component(contact_name)
    )
}

/// Browser address of a plan, derived from its API identifier
/// (`https://host/api/v1/plans/123` → `https://host/plans/123`).
pub fn browser_link(api_identifier: &str) -> Option<String> {
    let mut url = Url::parse(api_identifier).ok()?;
    let plan_id = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?
        .to_string();
    url.set_path(&format!("plans/{}", plan_id));
    url.set_query(None);
    Some(url.to_string())
}

async fn fetch_and_confirm<G, R, W>(
    registry: &G,
    console: &mut Console<R, W>,
    request: &GrantRequest,
) -> Result<GrantRecord>
where
    G: GrantRegistry,
    R: BufRead,
    W: Write,
{
    let registry_key = request.registry_key();
    tracing::info!("🔍 Looking up {} in SweCRIS", registry_key);
    let record = registry.fetch_grant(&registry_key).await?;
    let title = record.title(request.language)?;

    let question = match request.language {
        Language::Eng => format!(
            "Got data for project \"{}\" from Swecris API! Create DMP? (y/n)",
            title
        ),
        Language::Swe => format!(
            "Hittade information om projektet \"{}\" i Swecris API! Ska vi skapa en DHP? (j/n)",
            title
        ),
    };
    console.confirm(&question)?;
    Ok(record)
}

/// Grant → standalone maDMP document, printed to the console.
pub async fn create_madmp<G, R, W>(
    registry: &G,
    console: &mut Console<R, W>,
    request: &GrantRequest,
    id_prefix: &str,
    provenance: &Provenance,
) -> Result<MaDmpDocument>
where
    G: GrantRegistry,
    R: BufRead,
    W: Write,
{
    let record = fetch_and_confirm(registry, console, request).await?;
    let document = build_madmp(
        &record,
        &request.mapping(MappingTarget::Standalone {
            id_prefix: id_prefix.to_string(),
        }),
        provenance,
    )?;
    console.say(&serde_json::to_string_pretty(&document)?)?;
    Ok(document)
}

/// Grant → maDMP → new plan in DMPonline, with the response kept on disk.
pub async fn create_plan<G, P, S, R, W>(
    registry: &G,
    platform: &P,
    storage: &S,
    console: &mut Console<R, W>,
    request: &GrantRequest,
    template_id: &str,
    provenance: &Provenance,
) -> Result<CreatedPlan>
where
    G: GrantRegistry,
    P: DmpPlatform,
    S: Storage,
    R: BufRead,
    W: Write,
{
    let record = fetch_and_confirm(registry, console, request).await?;
    let document = build_madmp(
        &record,
        &request.mapping(MappingTarget::Platform {
            template_id: template_id.to_string(),
        }),
        provenance,
    )?;
    let envelope = PlanEnvelope::single(document);
    console.say(&serde_json::to_string_pretty(&envelope)?)?;

    console.confirm("Should I create a new DMP using these data in DMP Online? (y/n)")?;

    let token = platform.authenticate().await?;
    console.say("Authorized!")?;

    let created = platform.create_plan(token, &envelope).await?;
    console.say(&created.raw)?;

    let stored_as = storage
        .write_file(
            &uploaded_plan_path(&request.grant_id, &request.contact.name),
            created.raw.as_bytes(),
        )
        .await?;
    console.say(&format!("Stored as: {}", stored_as))?;

    let api_link = created.plan_identifier().map(str::to_string);
    let browser = api_link.as_deref().and_then(browser_link);
    match (&api_link, &browser) {
        (Some(api), Some(gui)) => console.say(&format!(
            "A new plan has been created! You can access it through API: {}\nor a browser: {}",
            api, gui
        ))?,
        (Some(api), None) => console.say(&format!(
            "A new plan has been created! You can access it through API: {}",
            api
        ))?,
        _ => tracing::warn!("Created plan response carries no dmp_id"),
    }

    Ok(CreatedPlan {
        stored_as,
        api_link,
        browser_link: browser,
    })
}

/// Stored plan → `Downloaded_plans/<id>_API_V{0,1}_dmp.json`.
pub async fn download_plan<P, S, R, W>(
    platform: &P,
    storage: &S,
    console: &mut Console<R, W>,
    plan_id: &str,
    version: ApiVersion,
) -> Result<String>
where
    P: DmpPlatform,
    S: Storage,
    R: BufRead,
    W: Write,
{
    console.confirm(&format!(
        "Should I download a plan through the {} API and save it as a JSON? (y/n)",
        version
    ))?;

    let contents = match version {
        ApiVersion::V0 => {
            let record = platform.fetch_plan_v0(plan_id).await?;
            console.say("Success! Retrieved the following:")?;
            console.say(&record.raw)?;
            record.raw
        }
        ApiVersion::V1 => {
            let token = platform.authenticate().await?;
            console.say("Authorized!")?;
            let record = platform.fetch_plan(token, plan_id).await?;
            console.say("Success! Retrieved the following:")?;
            console.say(&record.raw)?;
            let items = record.items().ok_or_else(|| DmpError::Request {
                service: "DMPonline".to_string(),
                message: format!("plan {} response has no items", plan_id),
            })?;
            serde_json::to_string_pretty(items)?
        }
    };

    let stored_as = storage
        .write_file(&downloaded_plan_path(plan_id, version), contents.as_bytes())
        .await?;
    console.say(&format!("Stored as: {}", stored_as))?;
    Ok(stored_as)
}

/// First page of templates → `Templates/Templates_from_DMPonline_<ts>.json`.
pub async fn harvest_templates<P, S, R, W>(
    platform: &P,
    storage: &S,
    console: &mut Console<R, W>,
    timestamp: &DateTime<Local>,
) -> Result<String>
where
    P: DmpPlatform,
    S: Storage,
    R: BufRead,
    W: Write,
{
    console.confirm("Should I fetch all templates from DMPonline? (y/n)")?;

    let token = platform.authenticate().await?;
    console.say("Authorized!")?;

    let templates = platform.list_templates(token).await?;
    console.say(&templates.raw)?;

    let stored_as = storage
        .write_file(&templates_path(timestamp), templates.raw.as_bytes())
        .await?;
    console.say(&format!("Stored as: {}", stored_as))?;
    Ok(stored_as)
}
