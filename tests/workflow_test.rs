use anyhow::Result;
use chrono::{Local, TimeZone, Utc};
use httpmock::prelude::*;
use std::io::Cursor;
use swecris_dmp::core::madmp::Provenance;
use swecris_dmp::core::workflow::{self, ApiVersion, GrantRequest};
use swecris_dmp::domain::funder::Funder;
use swecris_dmp::domain::model::{Affiliation, ContactInfo, Language, RegistrySchema};
use swecris_dmp::{Console, DmpError, DmpOnlineClient, LocalStorage, SwecrisClient};
use tempfile::TempDir;
use uuid::Uuid;

type ScriptedConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

fn console(answers: &str) -> ScriptedConsole {
    Console::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
}

fn output(console: ScriptedConsole) -> String {
    String::from_utf8(console.into_output()).unwrap()
}

fn provenance() -> Provenance {
    Provenance {
        created: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
        dmp_uuid: Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap(),
        dataset_uuid: Uuid::parse_str("66666666-7777-4888-9999-aaaaaaaaaaaa").unwrap(),
    }
}

fn grant_request(language: Language) -> GrantRequest {
    GrantRequest {
        grant_id: "2021-04241".to_string(),
        funder: Funder::Vr,
        language,
        contact: ContactInfo {
            name: "Albert Einstein".to_string(),
            email: "aeinstein@example.com".to_string(),
            orcid: None,
        },
        affiliation: Some(Affiliation {
            name: "Chalmers University of Technology".to_string(),
            abbreviation: Some("CTH".to_string()),
        }),
        schema: RegistrySchema::Project,
    }
}

async fn swecris_project(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/projects/2021-04241_VR")
                .header("authorization", "Bearer swecris-key");
            then.status(200).json_body(serde_json::json!({
                "projectTitleEn": "Quantum Networks",
                "projectTitleSv": "Kvantnätverk",
                "projectAbstractEn": "",
                "projectAbstractSv": "Om kvantnätverk.",
                "projectStartDate": "2022-01-01 00:00:00",
                "projectEndDate": "2025-12-31 00:00:00",
                "fundingOrganisationNameEn": "Swedish Research Council",
                "fundingOrganisationNameSv": "Vetenskapsrådet",
                "peopleList": [
                    {"fullName": "A. Einstein", "roleEn": "PI", "roleSv": "Projektledare", "orcId": "0000-0001-1234-567X"}
                ]
            }));
        })
        .await
}

async fn dmponline_auth(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/authenticate");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "bearer-xyz"}));
        })
        .await
}

fn swecris(server: &MockServer) -> SwecrisClient {
    SwecrisClient::new(server.url("/v1/projects/"), "swecris-key")
}

fn dmponline(server: &MockServer) -> DmpOnlineClient {
    DmpOnlineClient::new(server.url("/api/v1/"), "dmp@example.com", "stored-code")
        .with_v0_url(server.url("/api/v0/"))
}

#[tokio::test]
async fn test_madmp_end_to_end() -> Result<()> {
    let server = MockServer::start_async().await;
    let project = swecris_project(&server).await;

    let mut console = console("y\n");
    let document = workflow::create_madmp(
        &swecris(&server),
        &mut console,
        &grant_request(Language::Eng),
        "chalmers",
        &provenance(),
    )
    .await?;

    project.assert_async().await;
    let dmp = &document.dmp;
    assert_eq!(dmp.title, "Quantum Networks");
    assert_eq!(dmp.project[0].description, "(missing)");
    assert_eq!(dmp.contributor.len(), 1);
    assert_eq!(dmp.contributor[0].name, "A. Einstein");
    assert_eq!(
        dmp.project[0].funding[0].funder_id.identifier,
        "https://ror.org/03zttf063"
    );
    assert_eq!(dmp.dataset.len(), 1);
    assert_eq!(
        dmp.dmp_id.as_deref(),
        Some("chalmers:11111111-2222-4333-8444-555555555555")
    );

    let printed = output(console);
    assert!(printed.contains("Got data for project \"Quantum Networks\" from Swecris API! Create DMP? (y/n)"));
    assert!(printed.contains("\"description\": \"(missing)\""));
    Ok(())
}

#[tokio::test]
async fn test_madmp_swedish_prompt() -> Result<()> {
    let server = MockServer::start_async().await;
    swecris_project(&server).await;

    let mut console = console("ja\n");
    let document = workflow::create_madmp(
        &swecris(&server),
        &mut console,
        &grant_request(Language::Swe),
        "kth",
        &provenance(),
    )
    .await?;

    assert_eq!(document.dmp.title, "Kvantnätverk");
    assert_eq!(document.dmp.project[0].description, "Om kvantnätverk.");
    assert!(output(console).contains("Ska vi skapa en DHP? (j/n)"));
    Ok(())
}

#[tokio::test]
async fn test_create_plan_end_to_end() -> Result<()> {
    let server = MockServer::start_async().await;
    let project = swecris_project(&server).await;
    let auth = dmponline_auth(&server).await;
    let plans = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/plans")
                .header("authorization", "Bearer bearer-xyz")
                .body_contains("\"total_items\":1")
                .body_contains("\"dmproadmap\"")
                .body_contains("\"2021-04241_VR\"");
            then.status(201).json_body(serde_json::json!({
                "items": [{"dmp": {"dmp_id": {
                    "identifier": "https://dmponline.example/api/v1/plans/7654321",
                    "type": "url"
                }}}]
            }));
        })
        .await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("y\n\n");

    let created = workflow::create_plan(
        &swecris(&server),
        &dmponline(&server),
        &storage,
        &mut console,
        &grant_request(Language::Eng),
        "439",
        &provenance(),
    )
    .await?;

    project.assert_async().await;
    auth.assert_async().await;
    plans.assert_async().await;

    let stored = temp_dir
        .path()
        .join("Uploaded_plans/2021-04241Albert Einsteindmp.json");
    assert!(stored.exists());
    let body: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(stored)?)?;
    assert_eq!(
        body["items"][0]["dmp"]["dmp_id"]["identifier"],
        "https://dmponline.example/api/v1/plans/7654321"
    );
    assert_eq!(
        created.browser_link.as_deref(),
        Some("https://dmponline.example/plans/7654321")
    );
    assert!(output(console).contains("A new plan has been created!"));
    Ok(())
}

#[tokio::test]
async fn test_declining_grant_prompt_stops_before_platform() -> Result<()> {
    let server = MockServer::start_async().await;
    swecris_project(&server).await;
    let auth = dmponline_auth(&server).await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("n\n");

    let result = workflow::create_plan(
        &swecris(&server),
        &dmponline(&server),
        &storage,
        &mut console,
        &grant_request(Language::Eng),
        "439",
        &provenance(),
    )
    .await;

    assert!(matches!(result, Err(DmpError::UserAbort)));
    assert_eq!(auth.hits_async().await, 0);
    assert!(!temp_dir.path().join("Uploaded_plans").exists());
    Ok(())
}

#[tokio::test]
async fn test_declining_upload_prompt_skips_authentication() -> Result<()> {
    let server = MockServer::start_async().await;
    swecris_project(&server).await;
    let auth = dmponline_auth(&server).await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("y\nnej\n");

    let result = workflow::create_plan(
        &swecris(&server),
        &dmponline(&server),
        &storage,
        &mut console,
        &grant_request(Language::Eng),
        "439",
        &provenance(),
    )
    .await;

    assert!(matches!(result, Err(DmpError::UserAbort)));
    assert_eq!(auth.hits_async().await, 0);
    assert!(!temp_dir.path().join("Uploaded_plans").exists());
    Ok(())
}

#[tokio::test]
async fn test_unknown_grant_never_prompts() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/projects/2021-04241_VR");
            then.status(500).body("Internal server error");
        })
        .await;
    let auth = dmponline_auth(&server).await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("y\ny\n");

    let result = workflow::create_plan(
        &swecris(&server),
        &dmponline(&server),
        &storage,
        &mut console,
        &grant_request(Language::Eng),
        "439",
        &provenance(),
    )
    .await;

    assert!(matches!(result, Err(DmpError::NotFound { .. })));
    assert_eq!(auth.hits_async().await, 0);
    assert!(output(console).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_authentication_skips_plan_creation() -> Result<()> {
    let server = MockServer::start_async().await;
    swecris_project(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/authenticate");
            then.status(500).body("Internal server error");
        })
        .await;
    let plans = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/plans");
            then.status(201).json_body(serde_json::json!({"items": []}));
        })
        .await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("y\ny\n");

    let result = workflow::create_plan(
        &swecris(&server),
        &dmponline(&server),
        &storage,
        &mut console,
        &grant_request(Language::Eng),
        "439",
        &provenance(),
    )
    .await;

    assert!(matches!(result, Err(DmpError::Auth { .. })));
    assert_eq!(plans.hits_async().await, 0);
    assert!(!temp_dir.path().join("Uploaded_plans").exists());
    Ok(())
}

#[tokio::test]
async fn test_download_v1_stores_items() -> Result<()> {
    let server = MockServer::start_async().await;
    dmponline_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/plans/135516")
                .header("authorization", "Bearer bearer-xyz");
            then.status(200).json_body(serde_json::json!({
                "application": "DMPonline",
                "items": [{"dmp": {"title": "Quantum Networks DMP"}}]
            }));
        })
        .await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("\n");

    workflow::download_plan(
        &dmponline(&server),
        &storage,
        &mut console,
        "135516",
        ApiVersion::V1,
    )
    .await?;

    let stored = std::fs::read_to_string(
        temp_dir
            .path()
            .join("Downloaded_plans/135516_API_V1_dmp.json"),
    )?;
    let items: serde_json::Value = serde_json::from_str(&stored)?;
    assert_eq!(items[0]["dmp"]["title"], "Quantum Networks DMP");
    assert!(items.get("application").is_none());
    Ok(())
}

#[tokio::test]
async fn test_download_v0_stores_raw_body() -> Result<()> {
    let server = MockServer::start_async().await;
    let auth = dmponline_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v0/plans")
                .query_param("plan", "135516")
                .header("authorization", "Token token=stored-code");
            then.status(200).body(r#"[{"id":135516,"title":"Legacy plan"}]"#);
        })
        .await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("yes\n");

    workflow::download_plan(
        &dmponline(&server),
        &storage,
        &mut console,
        "135516",
        ApiVersion::V0,
    )
    .await?;

    assert_eq!(auth.hits_async().await, 0);
    let stored = std::fs::read_to_string(
        temp_dir
            .path()
            .join("Downloaded_plans/135516_API_V0_dmp.json"),
    )?;
    assert_eq!(stored, r#"[{"id":135516,"title":"Legacy plan"}]"#);
    Ok(())
}

#[tokio::test]
async fn test_declined_download_makes_no_calls() -> Result<()> {
    let server = MockServer::start_async().await;
    let auth = dmponline_auth(&server).await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("maybe\nno\n");

    let result = workflow::download_plan(
        &dmponline(&server),
        &storage,
        &mut console,
        "135516",
        ApiVersion::V1,
    )
    .await;

    assert!(matches!(result, Err(DmpError::UserAbort)));
    assert_eq!(auth.hits_async().await, 0);
    assert!(!temp_dir.path().join("Downloaded_plans").exists());
    assert!(output(console).contains("Please respond with 'y'(es) or 'n'(o)"));
    Ok(())
}

#[tokio::test]
async fn test_harvest_templates() -> Result<()> {
    let server = MockServer::start_async().await;
    dmponline_auth(&server).await;
    let templates = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/templates")
                .header("authorization", "Bearer bearer-xyz");
            then.status(200)
                .body(r#"{"items":[{"dmp_template":{"title":"Swedish Research Council","id":439}}]}"#);
        })
        .await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("j\n");
    let timestamp = Local.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap();

    let stored_as =
        workflow::harvest_templates(&dmponline(&server), &storage, &mut console, &timestamp)
            .await?;

    templates.assert_async().await;
    assert!(stored_as.ends_with("Templates_from_DMPonline_20240229-235901.json"));
    let stored = std::fs::read_to_string(
        temp_dir
            .path()
            .join("Templates/Templates_from_DMPonline_20240229-235901.json"),
    )?;
    assert!(stored.contains("\"id\":439"));
    Ok(())
}

#[tokio::test]
async fn test_declined_harvest_makes_no_calls() -> Result<()> {
    let server = MockServer::start_async().await;
    let auth = dmponline_auth(&server).await;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let mut console = console("nej\n");
    let timestamp = Local.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap();

    let result =
        workflow::harvest_templates(&dmponline(&server), &storage, &mut console, &timestamp)
            .await;

    assert!(matches!(result, Err(DmpError::UserAbort)));
    assert_eq!(auth.hits_async().await, 0);
    assert!(!temp_dir.path().join("Templates").exists());
    Ok(())
}

#[tokio::test]
async fn test_declined_madmp_prints_no_document() -> Result<()> {
    let server = MockServer::start_async().await;
    let project = swecris_project(&server).await;

    let mut console = console("n\n");
    let result = workflow::create_madmp(
        &swecris(&server),
        &mut console,
        &grant_request(Language::Eng),
        "chalmers",
        &provenance(),
    )
    .await;

    assert!(matches!(result, Err(DmpError::UserAbort)));
    assert_eq!(project.hits_async().await, 1);
    let printed = output(console);
    assert!(printed.contains("Create DMP? (y/n)"));
    assert!(!printed.contains("\"dmp\""));
    Ok(())
}
