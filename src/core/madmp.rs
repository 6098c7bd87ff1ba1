//! SweCRIS project record → maDMP document.
//!
//! The mapping is a pure function of its inputs. The creation timestamp and
//! UUIDs are supplied through [`Provenance`] so that repeated runs over the
//! same inputs serialize to identical bytes.

use crate::domain::funder::Funder;
use crate::domain::madmp::{
    Contact, Contributor, ContributorRole, Dataset, Dmp, DmpRoadmap, Extension, Funding,
    MaDmpDocument, Project, TemplateRef, TypedIdentifier,
};
use crate::domain::model::{Affiliation, ContactInfo, GrantRecord, Language, RegistrySchema};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const SCHEMA_BASE: &str =
    "https://github.com/RDA-DMP-Common/RDA-DMP-Common-Standard/tree/master/examples/JSON/JSON-schema";

/// Where the document is going, which decides the handful of fields that
/// differ between a standalone file and a DMPonline upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingTarget {
    /// Printed/stored locally; gets a synthesized `dmp_id`.
    Standalone { id_prefix: String },
    /// Posted to DMPonline, which assigns the id itself.
    Platform { template_id: String },
}

#[derive(Debug, Clone)]
pub struct MappingRequest {
    pub grant_id: String,
    pub funder: Funder,
    pub language: Language,
    pub contact: ContactInfo,
    pub affiliation: Option<Affiliation>,
    pub schema: RegistrySchema,
    pub target: MappingTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub created: DateTime<Utc>,
    pub dmp_uuid: Uuid,
    pub dataset_uuid: Uuid,
}

impl Provenance {
    pub fn now() -> Self {
        Self {
            created: Utc::now(),
            dmp_uuid: Uuid::new_v4(),
            dataset_uuid: Uuid::new_v4(),
        }
    }

    pub fn created_stamp(&self) -> String {
        self.created.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

fn missing_placeholder(lang: Language) -> &'static str {
    lang.pick("(missing)", "(saknas)")
}

fn initiated_notice(lang: Language) -> &'static str {
    lang.pick(
        "This data management plan has been automatically initiated, using metadata from Swecris.",
        "Denna datahanteringsplan har initierats automatiskt med hjälp av metadata från Swecris.",
    )
}

pub fn build_madmp(
    record: &GrantRecord,
    request: &MappingRequest,
    provenance: &Provenance,
) -> Result<MaDmpDocument> {
    let lang = request.language;
    let profile = request.funder.profile();

    let title = record.title(lang)?.to_string();
    let abstract_text = record.abstract_text(lang)?;
    let project_description = if abstract_text.is_empty() {
        missing_placeholder(lang).to_string()
    } else {
        abstract_text.to_string()
    };
    let (start, end) = record.period(request.schema)?;
    let funder_name = record.funder_name(lang)?.to_string();
    let people = record.people()?;

    let standalone = matches!(request.target, MappingTarget::Standalone { .. });

    let mut contributor = Vec::with_capacity(people.len());
    for person in people {
        let role = if standalone {
            ContributorRole::Verbatim(person.role(lang)?.to_string())
        } else {
            ContributorRole::Fixed(vec!["other".to_string()])
        };
        contributor.push(Contributor {
            name: person.name()?.to_string(),
            contributor_id: person
                .orcid()
                .filter(|_| standalone)
                .map(|orcid| TypedIdentifier::new(orcid, "orcid")),
            role,
            affiliation: request.affiliation.clone(),
        });
    }

    let contact = Contact {
        name: request.contact.name.clone(),
        mbox: request.contact.email.clone(),
        affiliation: request.affiliation.clone(),
        contact_id: request
            .contact
            .orcid
            .as_deref()
            .filter(|_| standalone)
            .map(|orcid| TypedIdentifier::new(orcid, "orcid")),
    };

    let funding = match &request.target {
        MappingTarget::Standalone { .. } => Funding {
            funder_name: Some(funder_name),
            name: None,
            funder_id: TypedIdentifier::new(profile.ror, "ror"),
            grant_id: TypedIdentifier::new(request.grant_id.clone(), "other"),
            funding_status: None,
        },
        // DMPonline clears grant ids it has seen before, so the unique
        // SweCRIS key is sent instead of the bare grant id.
        MappingTarget::Platform { .. } => Funding {
            funder_name: None,
            name: Some(funder_name),
            funder_id: TypedIdentifier::new(profile.ror, "ror"),
            grant_id: TypedIdentifier::new(profile.registry_key(&request.grant_id), "other"),
            funding_status: Some("granted".to_string()),
        },
    };

    let project = Project {
        title: title.clone(),
        description: project_description.clone(),
        start: start.to_string(),
        end: end.to_string(),
        funding: vec![funding],
    };

    let (schema, dmp_id, description, dataset, extension) = match &request.target {
        MappingTarget::Standalone { id_prefix } => (
            format!("{}/1.1", SCHEMA_BASE),
            Some(format!("{}:{}", id_prefix, provenance.dmp_uuid)),
            initiated_notice(lang).to_string(),
            placeholder_dataset(Some(provenance.dataset_uuid)),
            None,
        ),
        MappingTarget::Platform { template_id } => (
            format!("{}/1.0", SCHEMA_BASE),
            None,
            project_description,
            placeholder_dataset(None),
            Some(vec![Extension {
                dmproadmap: DmpRoadmap {
                    template: TemplateRef {
                        id: template_id.clone(),
                        title: String::new(),
                    },
                },
            }]),
        ),
    };

    Ok(MaDmpDocument {
        dmp: Dmp {
            schema,
            title,
            dmp_id,
            description,
            language: lang,
            created: provenance.created_stamp(),
            ethical_issues_exist: "unknown".to_string(),
            contact,
            contributor,
            project: vec![project],
            dataset: vec![dataset],
            extension,
        },
    })
}

fn placeholder_dataset(dataset_uuid: Option<Uuid>) -> Dataset {
    let detailed = dataset_uuid.is_some();
    Dataset {
        kind: "dataset".to_string(),
        title: "Generic dataset".to_string(),
        description: "No individual datasets have been defined for this DMP.".to_string(),
        dataset_id: dataset_uuid.map(|id| TypedIdentifier::new(id.to_string(), "other")),
        sensitive_data: detailed.then(|| "unknown".to_string()),
        personal_data: detailed.then(|| "unknown".to_string()),
    }
}
