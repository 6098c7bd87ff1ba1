use crate::utils::error::{DmpError, Result};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Funding agencies whose grants can be looked up in SweCRIS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Funder {
    Vr,
    Energimyndigheten,
    Formas,
    Forte,
    Rj,
    Rymdstyrelsen,
    Vinnova,
}

/// Static per-funder data: the suffix SweCRIS appends to a grant id and the
/// funder's ROR identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunderProfile {
    pub acronym: &'static str,
    pub registry_suffix: &'static str,
    pub ror: &'static str,
}

const PROFILES: [FunderProfile; 7] = [
    FunderProfile {
        acronym: "vr",
        registry_suffix: "VR",
        ror: "https://ror.org/03zttf063",
    },
    FunderProfile {
        acronym: "energimyndigheten",
        registry_suffix: "Energi",
        ror: "https://ror.org/0359z7n90",
    },
    FunderProfile {
        acronym: "formas",
        registry_suffix: "Formas",
        ror: "https://ror.org/03pjs1y45",
    },
    FunderProfile {
        acronym: "forte",
        registry_suffix: "Forte",
        ror: "https://ror.org/02d290r06",
    },
    FunderProfile {
        acronym: "rj",
        registry_suffix: "RJ",
        ror: "https://ror.org/02jkbm893",
    },
    FunderProfile {
        acronym: "rymdstyrelsen",
        registry_suffix: "SNSB",
        ror: "https://ror.org/04t512h04",
    },
    FunderProfile {
        acronym: "vinnova",
        registry_suffix: "Vinnova",
        ror: "https://ror.org/01kd5m353",
    },
];

impl Funder {
    pub const ALL: [Funder; 7] = [
        Funder::Vr,
        Funder::Energimyndigheten,
        Funder::Formas,
        Funder::Forte,
        Funder::Rj,
        Funder::Rymdstyrelsen,
        Funder::Vinnova,
    ];

    pub const ACRONYMS: [&'static str; 7] = [
        "vr",
        "energimyndigheten",
        "formas",
        "forte",
        "rj",
        "rymdstyrelsen",
        "vinnova",
    ];

    pub fn profile(self) -> &'static FunderProfile {
        let index = match self {
            Funder::Vr => 0,
            Funder::Energimyndigheten => 1,
            Funder::Formas => 2,
            Funder::Forte => 3,
            Funder::Rj => 4,
            Funder::Rymdstyrelsen => 5,
            Funder::Vinnova => 6,
        };
        &PROFILES[index]
    }

    pub fn acronym(self) -> &'static str {
        self.profile().acronym
    }
}

impl FunderProfile {
    /// Composite SweCRIS project id, e.g. `2021-04241_VR`.
    pub fn registry_key(&self, grant_id: &str) -> String {
        format!("{}_{}", grant_id, self.registry_suffix)
    }
}

impl FromStr for Funder {
    type Err = DmpError;

    fn from_str(s: &str) -> Result<Self> {
        Funder::ALL
            .into_iter()
            .find(|funder| funder.acronym() == s)
            .ok_or_else(|| DmpError::UnknownFunder {
                acronym: s.to_string(),
            })
    }
}

impl fmt::Display for Funder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())
    }
}

/// Checks the lookup table once at start-up: every acronym resolves to its
/// own profile, and suffixes and ROR ids are unique.
pub fn check_profiles() -> Result<()> {
    let mut suffixes = HashSet::new();
    let mut rors = HashSet::new();

    for (funder, acronym) in Funder::ALL.into_iter().zip(Funder::ACRONYMS) {
        let profile = funder.profile();
        if profile.acronym != acronym || acronym.parse::<Funder>()? != funder {
            return Err(DmpError::InvalidConfigValue {
                field: "funder".to_string(),
                value: acronym.to_string(),
                reason: "acronym does not resolve to its own profile".to_string(),
            });
        }
        if !suffixes.insert(profile.registry_suffix) || !rors.insert(profile.ror) {
            return Err(DmpError::InvalidConfigValue {
                field: "funder".to_string(),
                value: acronym.to_string(),
                reason: "registry suffix or ROR id is shared with another funder".to_string(),
            });
        }
        if !profile.ror.starts_with("https://ror.org/") {
            return Err(DmpError::InvalidConfigValue {
                field: "funder".to_string(),
                value: profile.ror.to_string(),
                reason: "not a ROR identifier".to_string(),
            });
        }
    }

    Ok(())
}
