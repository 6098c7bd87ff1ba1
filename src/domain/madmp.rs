//! Output shape of the RDA DMP Common Standard (maDMP) documents we emit.
//! Field order follows declaration order, so serialization is stable.

use crate::domain::model::{Affiliation, Language};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaDmpDocument {
    pub dmp: Dmp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dmp {
    pub schema: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmp_id: Option<String>,
    pub description: String,
    pub language: Language,
    pub created: String,
    pub ethical_issues_exist: String,
    pub contact: Contact,
    pub contributor: Vec<Contributor>,
    pub project: Vec<Project>,
    pub dataset: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedIdentifier {
    pub identifier: String,
    #[serde(rename = "type")]
    pub id_type: String,
}

impl TypedIdentifier {
    pub fn new(identifier: impl Into<String>, id_type: &str) -> Self {
        Self {
            identifier: identifier.into(),
            id_type: id_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub mbox: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<Affiliation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<TypedIdentifier>,
}

/// Registry roles are copied as a single string; DMPonline only accepts
/// its own role list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContributorRole {
    Verbatim(String),
    Fixed(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_id: Option<TypedIdentifier>,
    pub role: ContributorRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<Affiliation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub funding: Vec<Funding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub funder_id: TypedIdentifier,
    pub grant_id: TypedIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<TypedIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub dmproadmap: DmpRoadmap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmpRoadmap {
    pub template: TemplateRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: String,
    pub title: String,
}

/// Body of `POST plans`: DMPonline expects a paged list even for one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEnvelope {
    pub total_items: usize,
    pub items: Vec<MaDmpDocument>,
}

impl PlanEnvelope {
    pub fn single(document: MaDmpDocument) -> Self {
        Self {
            total_items: 1,
            items: vec![document],
        }
    }
}
