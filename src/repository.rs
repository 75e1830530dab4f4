//! In-memory employee collection.
//!
//! Every operation receives the current time from its caller. Compound
//! operations run all of their checks before the first write, so a failed
//! call leaves the collection untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::{Employee, EmployeeUpdate, NewEmployee, Status};

pub const REQUIRED_FIELDS: [&str; 5] = ["firstName", "lastName", "email", "department", "position"];

pub const UPDATABLE_FIELDS: [&str; 8] = [
    "firstName",
    "lastName",
    "email",
    "phone",
    "department",
    "position",
    "salary",
    "status",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("No employee found with ID: {0}")]
    NotFound(String),

    #[error("Missing required fields")]
    MissingRequiredFields,

    #[error("Employee with email {0} already exists")]
    DuplicateEmail(String),

    #[error("No valid fields to update")]
    NoFieldsProvided,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub status: Status,
    pub department: Option<String>,
}

impl Default for EmployeeFilter {
    fn default() -> Self {
        Self {
            status: Status::Active,
            department: None,
        }
    }
}

impl EmployeeFilter {
    fn matches(&self, employee: &Employee) -> bool {
        if employee.status != self.status {
            return false;
        }
        match &self.department {
            Some(department) => employee
                .department
                .to_lowercase()
                .contains(&department.to_lowercase()),
            None => true,
        }
    }
}

/// One-based page request. Both values are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    limit: usize,
}

impl Pagination {
    pub const DEFAULT_LIMIT: usize = 10;

    /// Returns `None` when either value is zero.
    pub fn new(page: usize, limit: usize) -> Option<Self> {
        (page >= 1 && limit >= 1).then_some(Self { page, limit })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    #[serde(rename = "currentPage")]
    pub current_page: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    #[serde(rename = "totalEmployees")]
    pub total_employees: usize,
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub employees: Vec<Employee>,
    pub info: PageInfo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct EmployeeStats {
    #[serde(rename = "totalEmployees")]
    pub total_employees: usize,
    #[serde(rename = "activeEmployees")]
    pub active_employees: usize,
    #[serde(rename = "inactiveEmployees")]
    pub inactive_employees: usize,
    #[serde(rename = "departmentBreakdown")]
    pub department_breakdown: BTreeMap<String, usize>,
    /// Rounded mean salary; 0 for an empty collection.
    #[serde(rename = "averageSalary")]
    pub average_salary: u64,
}

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    employees: Vec<Employee>,
    next_id: u32,
}

impl Default for EmployeeRepository {
    fn default() -> Self {
        Self {
            employees: Vec::new(),
            next_id: 1,
        }
    }
}

impl EmployeeRepository {
    /// Repository holding the three starter records, next id 4.
    pub fn seeded() -> Self {
        let employees = vec![
            seed(
                1,
                ("John", "Doe"),
                "+1-555-0101",
                ("Engineering", "Senior Developer"),
                85_000,
                (2022, 1, 15),
                (9, 0),
            ),
            seed(
                2,
                ("Jane", "Smith"),
                "+1-555-0102",
                ("Marketing", "Marketing Manager"),
                75_000,
                (2021, 8, 20),
                (10, 30),
            ),
            seed(
                3,
                ("Mike", "Johnson"),
                "+1-555-0103",
                ("Sales", "Sales Representative"),
                55_000,
                (2023, 3, 10),
                (14, 15),
            ),
        ];
        let next_id = employees.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self { employees, next_id }
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn list(&self, filter: &EmployeeFilter, pagination: Pagination) -> Page {
        let filtered: Vec<&Employee> = self
            .employees
            .iter()
            .filter(|e| filter.matches(e))
            .collect();
        let total = filtered.len();
        let start = (pagination.page - 1).saturating_mul(pagination.limit);

        let employees = filtered
            .into_iter()
            .skip(start)
            .take(pagination.limit)
            .cloned()
            .collect();

        Page {
            employees,
            info: PageInfo {
                current_page: pagination.page,
                total_pages: total.div_ceil(pagination.limit),
                total_employees: total,
                limit: pagination.limit,
            },
        }
    }

    pub fn get(&self, id: u32) -> Result<&Employee, RepositoryError> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    pub fn create(
        &mut self,
        new: NewEmployee,
        now: DateTime<Utc>,
    ) -> Result<Employee, RepositoryError> {
        let (Some(first_name), Some(last_name), Some(email), Some(department), Some(position)) = (
            non_empty(new.first_name),
            non_empty(new.last_name),
            non_empty(new.email),
            non_empty(new.department),
            non_empty(new.position),
        ) else {
            return Err(RepositoryError::MissingRequiredFields);
        };

        self.ensure_email_free(&email)?;

        let employee = Employee {
            id: self.next_id,
            first_name,
            last_name,
            email,
            phone: new.phone.unwrap_or_default(),
            department,
            position,
            salary: new.salary.unwrap_or(0),
            hire_date: new.hire_date.unwrap_or_else(|| now.date_naive()),
            status: Status::Active,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.employees.push(employee.clone());
        Ok(employee)
    }

    /// Full update. Empty strings keep the previous value for the text fields
    /// that must never be blank; `phone`, `salary` and `status` take whatever
    /// is provided.
    pub fn replace(
        &mut self,
        id: u32,
        update: EmployeeUpdate,
        now: DateTime<Utc>,
    ) -> Result<Employee, RepositoryError> {
        let index = self.index_of(id)?;
        let email = non_empty(update.email);
        if let Some(email) = &email {
            if *email != self.employees[index].email {
                self.ensure_email_free(email)?;
            }
        }

        let employee = &mut self.employees[index];
        if let Some(first_name) = non_empty(update.first_name) {
            employee.first_name = first_name;
        }
        if let Some(last_name) = non_empty(update.last_name) {
            employee.last_name = last_name;
        }
        if let Some(email) = email {
            employee.email = email;
        }
        if let Some(phone) = update.phone {
            employee.phone = phone;
        }
        if let Some(department) = non_empty(update.department) {
            employee.department = department;
        }
        if let Some(position) = non_empty(update.position) {
            employee.position = position;
        }
        if let Some(salary) = update.salary {
            employee.salary = salary;
        }
        if let Some(status) = update.status {
            employee.status = status;
        }
        employee.updated_at = now;
        Ok(employee.clone())
    }

    /// Applies only the provided fields and reports which ones were applied.
    pub fn patch(
        &mut self,
        id: u32,
        update: EmployeeUpdate,
        now: DateTime<Utc>,
    ) -> Result<(Employee, Vec<&'static str>), RepositoryError> {
        let index = self.index_of(id)?;
        if let Some(email) = &update.email {
            if *email != self.employees[index].email {
                self.ensure_email_free(email)?;
            }
        }

        let employee = &mut self.employees[index];
        let mut applied = Vec::new();
        let mut apply = |name: &'static str, value: Option<String>, slot: &mut String| {
            if let Some(value) = value {
                *slot = value;
                applied.push(name);
            }
        };
        apply("firstName", update.first_name, &mut employee.first_name);
        apply("lastName", update.last_name, &mut employee.last_name);
        apply("email", update.email, &mut employee.email);
        apply("phone", update.phone, &mut employee.phone);
        apply("department", update.department, &mut employee.department);
        apply("position", update.position, &mut employee.position);
        if let Some(salary) = update.salary {
            employee.salary = salary;
            applied.push("salary");
        }
        if let Some(status) = update.status {
            employee.status = status;
            applied.push("status");
        }

        if applied.is_empty() {
            return Err(RepositoryError::NoFieldsProvided);
        }
        employee.updated_at = now;
        Ok((employee.clone(), applied))
    }

    /// Soft delete marks the record inactive; permanent delete removes it.
    pub fn delete(
        &mut self,
        id: u32,
        permanent: bool,
        now: DateTime<Utc>,
    ) -> Result<Employee, RepositoryError> {
        let index = self.index_of(id)?;
        if permanent {
            return Ok(self.employees.remove(index));
        }
        let employee = &mut self.employees[index];
        employee.status = Status::Inactive;
        employee.updated_at = now;
        Ok(employee.clone())
    }

    pub fn summary(&self) -> EmployeeStats {
        let mut department_breakdown = BTreeMap::new();
        let mut active_employees = 0;
        let mut inactive_employees = 0;
        let mut salary_total: u128 = 0;

        for employee in &self.employees {
            *department_breakdown.entry(employee.department.clone()).or_insert(0) += 1;
            match employee.status {
                Status::Active => active_employees += 1,
                Status::Inactive => inactive_employees += 1,
            }
            salary_total += u128::from(employee.salary);
        }

        let average_salary = if self.employees.is_empty() {
            0
        } else {
            (salary_total as f64 / self.employees.len() as f64).round() as u64
        };

        EmployeeStats {
            total_employees: self.employees.len(),
            active_employees,
            inactive_employees,
            department_breakdown,
            average_salary,
        }
    }

    fn index_of(&self, id: u32) -> Result<usize, RepositoryError> {
        self.employees
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn ensure_email_free(&self, email: &str) -> Result<(), RepositoryError> {
        if self.employees.iter().any(|e| e.email == email) {
            return Err(RepositoryError::DuplicateEmail(email.to_string()));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn seed(
    id: u32,
    (first, last): (&str, &str),
    phone: &str,
    (department, position): (&str, &str),
    salary: u64,
    (year, month, day): (i32, u32, u32),
    (hour, minute): (u32, u32),
) -> Employee {
    let hire_date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
    let created_at = hire_date
        .and_hms_opt(hour, minute, 0)
        .map(|t| Utc.from_utc_datetime(&t))
        .unwrap_or_default();
    Employee {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@company.com", first.to_lowercase(), last.to_lowercase()),
        phone: phone.to_string(),
        department: department.to_string(),
        position: position.to_string(),
        salary,
        hire_date,
        status: Status::Active,
        created_at,
        updated_at: created_at,
    }
}
