use crate::utils::error::{DmpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Eng,
    Swe,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Eng => "eng",
            Language::Swe => "swe",
        }
    }

    pub fn pick<'a>(self, en: &'a str, sv: &'a str) -> &'a str {
        match self {
            Language::Eng => en,
            Language::Swe => sv,
        }
    }
}

impl FromStr for Language {
    type Err = DmpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eng" => Ok(Language::Eng),
            "swe" => Ok(Language::Swe),
            other => Err(DmpError::UnknownLanguage {
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which pair of date fields carries the project period.
///
/// SweCRIS renamed `fundingStartDate`/`fundingEndDate` to
/// `projectStartDate`/`projectEndDate`; the latter is read by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrySchema {
    #[default]
    Project,
    Funding,
}

impl FromStr for RegistrySchema {
    type Err = DmpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "project" => Ok(RegistrySchema::Project),
            "funding" => Ok(RegistrySchema::Funding),
            other => Err(DmpError::InvalidConfigValue {
                field: "SWECRIS_SCHEMA".to_string(),
                value: other.to_string(),
                reason: "expected 'project' or 'funding'".to_string(),
            }),
        }
    }
}

/// A SweCRIS project as returned by the projects endpoint. Every field is
/// optional on the wire; the mapper decides which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRecord {
    pub project_title_en: Option<String>,
    pub project_title_sv: Option<String>,
    pub project_abstract_en: Option<String>,
    pub project_abstract_sv: Option<String>,
    pub project_start_date: Option<String>,
    pub project_end_date: Option<String>,
    pub funding_start_date: Option<String>,
    pub funding_end_date: Option<String>,
    pub funding_organisation_name_en: Option<String>,
    pub funding_organisation_name_sv: Option<String>,
    pub people_list: Option<Vec<Person>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub full_name: Option<String>,
    pub role_en: Option<String>,
    pub role_sv: Option<String>,
    pub orc_id: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| DmpError::MissingField {
        field: field.to_string(),
    })
}

impl GrantRecord {
    pub fn title(&self, lang: Language) -> Result<&str> {
        match lang {
            Language::Eng => required(&self.project_title_en, "projectTitleEn"),
            Language::Swe => required(&self.project_title_sv, "projectTitleSv"),
        }
    }

    pub fn abstract_text(&self, lang: Language) -> Result<&str> {
        match lang {
            Language::Eng => required(&self.project_abstract_en, "projectAbstractEn"),
            Language::Swe => required(&self.project_abstract_sv, "projectAbstractSv"),
        }
    }

    pub fn funder_name(&self, lang: Language) -> Result<&str> {
        match lang {
            Language::Eng => required(
                &self.funding_organisation_name_en,
                "fundingOrganisationNameEn",
            ),
            Language::Swe => required(
                &self.funding_organisation_name_sv,
                "fundingOrganisationNameSv",
            ),
        }
    }

    pub fn period(&self, schema: RegistrySchema) -> Result<(&str, &str)> {
        match schema {
            RegistrySchema::Project => Ok((
                required(&self.project_start_date, "projectStartDate")?,
                required(&self.project_end_date, "projectEndDate")?,
            )),
            RegistrySchema::Funding => Ok((
                required(&self.funding_start_date, "fundingStartDate")?,
                required(&self.funding_end_date, "fundingEndDate")?,
            )),
        }
    }

    pub fn people(&self) -> Result<&[Person]> {
        self.people_list
            .as_deref()
            .ok_or_else(|| DmpError::MissingField {
                field: "peopleList".to_string(),
            })
    }
}

impl Person {
    pub fn name(&self) -> Result<&str> {
        required(&self.full_name, "peopleList.fullName")
    }

    pub fn role(&self, lang: Language) -> Result<&str> {
        match lang {
            Language::Eng => required(&self.role_en, "peopleList.roleEn"),
            Language::Swe => required(&self.role_sv, "peopleList.roleSv"),
        }
    }

    pub fn orcid(&self) -> Option<&str> {
        self.orc_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The person named as DMP contact on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

/// Bearer credential from DMPonline. Not `Clone`: each request consumes it.
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// A plan or template listing as stored by DMPonline. Kept verbatim; only
/// the identifier of a created plan is ever read out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecord {
    pub raw: String,
    pub body: serde_json::Value,
}

impl PlanRecord {
    pub fn parse(service: &str, raw: String) -> Result<Self> {
        let body = serde_json::from_str(&raw).map_err(|e| DmpError::Request {
            service: service.to_string(),
            message: format!("response is not JSON ({}): {}", e, raw),
        })?;
        Ok(Self { raw, body })
    }

    pub fn items(&self) -> Option<&serde_json::Value> {
        self.body.get("items")
    }

    pub fn plan_identifier(&self) -> Option<&str> {
        self.body
            .pointer("/items/0/dmp/dmp_id/identifier")
            .and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_record_deserializes_swecris_fields() {
        let record: GrantRecord = serde_json::from_value(serde_json::json!({
            "projectTitleEn": "Quantum Networks",
            "projectTitleSv": "Kvantnätverk",
            "projectAbstractEn": "",
            "projectStartDate": "2022-01-01",
            "projectEndDate": "2025-12-31",
            "fundingOrganisationNameEn": "Swedish Research Council",
            "peopleList": [{"fullName": "A. Einstein", "roleEn": "PI", "orcId": "0000-0001-1234-567X"}],
            "scbs": []
        }))
        .unwrap();

        assert_eq!(record.title(Language::Eng).unwrap(), "Quantum Networks");
        assert_eq!(record.title(Language::Swe).unwrap(), "Kvantnätverk");
        assert_eq!(
            record.period(RegistrySchema::Project).unwrap(),
            ("2022-01-01", "2025-12-31")
        );
        assert!(matches!(
            record.period(RegistrySchema::Funding),
            Err(DmpError::MissingField { field }) if field == "fundingStartDate"
        ));
        assert!(matches!(
            record.funder_name(Language::Swe),
            Err(DmpError::MissingField { field }) if field == "fundingOrganisationNameSv"
        ));
        let people = record.people().unwrap();
        assert_eq!(people[0].orcid(), Some("0000-0001-1234-567X"));
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("swe".parse::<Language>().unwrap(), Language::Swe);
        assert_eq!(Language::Eng.to_string(), "eng");
        assert!("sv".parse::<Language>().is_err());
    }

    #[test]
    fn test_plan_record_identifier() {
        let raw = r#"{"items":[{"dmp":{"dmp_id":{"identifier":"https://dmponline.example/api/v1/plans/1234567","type":"url"}}}]}"#;
        let record = PlanRecord::parse("DMPonline", raw.to_string()).unwrap();
        assert_eq!(
            record.plan_identifier(),
            Some("https://dmponline.example/api/v1/plans/1234567")
        );
        assert!(matches!(
            PlanRecord::parse("DMPonline", "<html>oops</html>".to_string()),
            Err(DmpError::Request { .. })
        ));
    }

    #[test]
    fn test_auth_token_debug_is_redacted() {
        let token = AuthToken::new("s3cret");
        assert_eq!(format!("{:?}", token), "AuthToken(***)");
        assert_eq!(token.bearer(), "Bearer s3cret");
    }
}
