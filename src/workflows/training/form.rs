use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::PaymentMethod;

/// Every control on the training application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Email,
    TargetSessionId,
    FirstName,
    LastName,
    PhoneNumber,
    Civility,
    City,
    Address,
    DateOfBirth,
    PaymentMethod,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Email,
        FormField::TargetSessionId,
        FormField::FirstName,
        FormField::LastName,
        FormField::PhoneNumber,
        FormField::Civility,
        FormField::City,
        FormField::Address,
        FormField::DateOfBirth,
        FormField::PaymentMethod,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FormField::Email => "email",
            FormField::TargetSessionId => "target_session_id",
            FormField::FirstName => "first_name",
            FormField::LastName => "last_name",
            FormField::PhoneNumber => "phone_number",
            FormField::Civility => "civility",
            FormField::City => "city",
            FormField::Address => "address",
            FormField::DateOfBirth => "date_of_birth",
            FormField::PaymentMethod => "payment_method",
        }
    }

    const fn is_required(self) -> bool {
        matches!(
            self,
            FormField::Email
                | FormField::TargetSessionId
                | FormField::FirstName
                | FormField::LastName
                | FormField::PhoneNumber
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw control values, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationFormValues {
    pub email: String,
    pub target_session_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub civility: String,
    pub city: String,
    pub address: String,
    pub date_of_birth: String,
    pub payment_method: String,
}

impl ApplicationFormValues {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Email => &self.email,
            FormField::TargetSessionId => &self.target_session_id,
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::PhoneNumber => &self.phone_number,
            FormField::Civility => &self.civility,
            FormField::City => &self.city,
            FormField::Address => &self.address,
            FormField::DateOfBirth => &self.date_of_birth,
            FormField::PaymentMethod => &self.payment_method,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Email => &mut self.email,
            FormField::TargetSessionId => &mut self.target_session_id,
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::PhoneNumber => &mut self.phone_number,
            FormField::Civility => &mut self.civility,
            FormField::City => &mut self.city,
            FormField::Address => &mut self.address,
            FormField::DateOfBirth => &mut self.date_of_birth,
            FormField::PaymentMethod => &mut self.payment_method,
        }
    }
}

/// Reason a single control fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(FormField),
    #[error("email is not a valid address")]
    InvalidEmail,
    #[error("date_of_birth must use YYYY-MM-DD")]
    InvalidDate,
    #[error("payment_method must be ONLINE or TRANSFER")]
    UnknownPaymentMethod,
}

impl FieldError {
    pub fn field(&self) -> FormField {
        match self {
            FieldError::Required(field) => *field,
            FieldError::InvalidEmail => FormField::Email,
            FieldError::InvalidDate => FormField::DateOfBirth,
            FieldError::UnknownPaymentMethod => FormField::PaymentMethod,
        }
    }
}

/// Form values plus the per-control touched flags the UI uses to reveal errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    values: ApplicationFormValues,
    touched: BTreeSet<FormField>,
}

impl ApplicationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ApplicationFormValues) -> Self {
        Self {
            values,
            touched: BTreeSet::new(),
        }
    }

    pub fn values(&self) -> &ApplicationFormValues {
        &self.values
    }

    pub fn value(&self, field: FormField) -> &str {
        self.values.get(field)
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.values.slot(field) = value.into();
    }

    /// Mark a single control as visited.
    pub fn touch(&mut self, field: FormField) {
        self.touched.insert(field);
    }

    pub fn mark_all_touched(&mut self) {
        self.touched.extend(FormField::ALL);
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    pub fn validate_field(&self, field: FormField) -> Option<FieldError> {
        let raw = self.values.get(field).trim();

        if raw.is_empty() {
            return field.is_required().then_some(FieldError::Required(field));
        }

        match field {
            FormField::Email if !looks_like_email(raw) => Some(FieldError::InvalidEmail),
            FormField::DateOfBirth if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() => {
                Some(FieldError::InvalidDate)
            }
            FormField::PaymentMethod if PaymentMethod::from_code(raw).is_none() => {
                Some(FieldError::UnknownPaymentMethod)
            }
            _ => None,
        }
    }

    pub fn errors(&self) -> Vec<FieldError> {
        FormField::ALL
            .iter()
            .filter_map(|field| self.validate_field(*field))
            .collect()
    }

    /// Errors the UI should currently display: only those on touched controls.
    pub fn visible_errors(&self) -> Vec<FieldError> {
        self.errors()
            .into_iter()
            .filter(|error| self.is_touched(error.field()))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        FormField::ALL
            .iter()
            .all(|field| self.validate_field(*field).is_none())
    }
}

fn looks_like_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
