pub mod madmp;
pub mod prompt;
pub mod workflow;

pub use crate::domain::madmp::{MaDmpDocument, PlanEnvelope};
pub use crate::domain::model::{GrantRecord, PlanRecord};
pub use crate::domain::ports::{DmpPlatform, GrantRegistry, Storage};
pub use crate::utils::error::Result;
