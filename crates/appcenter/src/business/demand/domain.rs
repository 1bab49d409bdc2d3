use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::business::application::ApplicationId;

/// Resource type under which demand workflows run.
pub const DEMAND_WORKFLOW_RESOURCE_TYPE: &str = "APPCENTER_DEMAND";

/// Identifier assigned by the demand store. `0` until the demand is created.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DemandId(pub i64);

impl fmt::Display for DemandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored demand row; `demand_data` holds the JSON form of the typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    pub id: DemandId,
    pub id_application: ApplicationId,
    pub demand_type: String,
    pub demand_data: Option<String>,
    pub creation_date: DateTime<Utc>,
}

impl Demand {
    pub fn new(
        id_application: ApplicationId,
        demand_type: impl Into<String>,
        demand_data: Option<String>,
    ) -> Self {
        Self {
            id: DemandId::default(),
            id_application,
            demand_type: demand_type.into(),
            demand_data,
            creation_date: Utc::now(),
        }
    }
}

/// Demand to submit: its type and the payload to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDemand<P> {
    pub demand_type: String,
    pub payload: P,
}

impl<P> NewDemand<P> {
    pub fn new(demand_type: impl Into<String>, payload: P) -> Self {
        Self {
            demand_type: demand_type.into(),
            payload,
        }
    }
}
