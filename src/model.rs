use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Employment status. Soft deletion moves a record to `Inactive`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct Employee {
    pub id: u32,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub position: String,
    pub salary: u64,
    #[serde(rename = "hireDate")]
    pub hire_date: NaiveDate,
    pub status: Status,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /employees`. Required fields are optional here so that a
/// missing field is reported as a validation failure rather than a parse error.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<u64>,
    /// An empty string counts as absent.
    #[serde(rename = "hireDate", default, deserialize_with = "de_optional_date")]
    pub hire_date: Option<NaiveDate>,
}

fn de_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Body of `PUT` and `PATCH /employees/{id}`. Unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct EmployeeUpdate {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<u64>,
    pub status: Option<Status>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hire_date_parses_or_defaults_when_blank() {
        let new: NewEmployee = serde_json::from_value(json!({ "hireDate": "2024-01-15" })).unwrap();
        assert_eq!(new.hire_date, NaiveDate::from_ymd_opt(2024, 1, 15));

        for body in [json!({ "hireDate": "" }), json!({ "hireDate": null }), json!({})] {
            let new: NewEmployee = serde_json::from_value(body).unwrap();
            assert_eq!(new.hire_date, None);
        }

        assert!(serde_json::from_value::<NewEmployee>(json!({ "hireDate": "yesterday" })).is_err());
    }
}
