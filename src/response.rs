use serde::Serialize;

use crate::repository::PageInfo;

/// Which user performed or requested the operation, rendered as
/// `requestedBy`, `createdBy`, `updatedBy` or `deletedBy`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Actor {
    RequestedBy(String),
    CreatedBy(String),
    UpdatedBy(String),
    DeletedBy(String),
}

/// `{success: true, message, data, ...}` body for successful requests.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    #[serde(rename = "updatedFields", skip_serializing_if = "Option::is_none")]
    pub updated_fields: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,
    #[serde(flatten)]
    pub actor: Actor,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: &'static str, data: T, actor: Actor) -> Self {
        Self {
            success: true,
            message,
            data,
            pagination: None,
            updated_fields: None,
            permanent: None,
            actor,
        }
    }

    pub fn with_pagination(mut self, pagination: PageInfo) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_updated_fields(mut self, fields: Vec<&'static str>) -> Self {
        self.updated_fields = Some(fields);
        self
    }

    pub fn with_permanent(mut self, permanent: bool) -> Self {
        self.permanent = Some(permanent);
        self
    }
}
