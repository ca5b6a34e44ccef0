//! Input validation. Every rule reports the field it rejects; a request is
//! checked completely before the first violation is returned.

use chrono::NaiveDate;

use crate::domain::error::{DomainError, FieldViolation};
use crate::domain::models::{
    AgentPatch, BranchPatch, CasePatch, ClientPatch, ContractPatch, InsuranceTypePatch, NewAgent,
    NewBranch, NewCase, NewClient, NewContract, NewInsuranceType, NewUser,
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.0.push(FieldViolation::new(field, message));
        }
    }

    fn required_text(&mut self, value: &str, field: &str, message: &str) {
        self.check(!value.trim().is_empty(), field, message);
    }

    fn optional_text(&mut self, value: Option<&str>, field: &str, message: &str) {
        if let Some(v) = value {
            self.required_text(v, field, message);
        }
    }

    fn email(&mut self, value: Option<&str>, field: &str) {
        if let Some(v) = value {
            self.check(is_email(v), field, "Invalid email format");
        }
    }

    fn phone(&mut self, value: Option<&str>, field: &str) {
        if let Some(v) = value {
            self.check(is_phone(v), field, "Invalid phone format");
        }
    }

    fn id(&mut self, value: Option<i64>, field: &str, message: &str) {
        if let Some(v) = value {
            self.check(v >= 1, field, message);
        }
    }

    fn unit_interval(&mut self, value: Option<f64>, field: &str, message: &str) {
        if let Some(v) = value {
            self.check((0.0..=1.0).contains(&v), field, message);
        }
    }

    fn positive(&mut self, value: Option<f64>, field: &str, message: &str) {
        if let Some(v) = value {
            self.check(v.is_finite() && v > 0.0, field, message);
        }
    }

    fn non_negative(&mut self, value: Option<f64>, field: &str, message: &str) {
        if let Some(v) = value {
            self.check(v.is_finite() && v >= 0.0, field, message);
        }
    }

    fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::invalid(self.0))
        }
    }
}

/// A single `@` with text on both sides and a dot in the domain.
#[must_use]
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Digits, spaces, `-`, `(`, `)`, with an optional leading `+`.
#[must_use]
pub fn is_phone(value: &str) -> bool {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

/// Trims `value`; blank text becomes `None`.
#[must_use]
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parses a path or query id. Must be a positive integer.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] naming `field`.
pub fn parse_id(raw: &str, field: &str) -> Result<i64, DomainError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| DomainError::validation(field, "ID must be a positive integer"))
}

/// Like [`parse_id`]; absent or blank input is `None`.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] naming `field`.
pub fn parse_opt_id(raw: Option<&str>, field: &str) -> Result<Option<i64>, DomainError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => parse_id(r, field).map(Some),
        None => Ok(None),
    }
}

/// Parses an optional `YYYY-MM-DD` date; blank input is `None`.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] naming `field`.
pub fn parse_opt_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, DomainError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => NaiveDate::parse_from_str(r, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DomainError::validation(field, "Date must be in YYYY-MM-DD format")),
        None => Ok(None),
    }
}

/// Parses an optional boolean flag (`true`/`false`/`1`/`0`).
///
/// # Errors
///
/// Returns [`DomainError::Validation`] naming `field`.
pub fn parse_flag(raw: Option<&str>, field: &str) -> Result<bool, DomainError> {
    match raw.map(str::trim) {
        None | Some("" | "false" | "0") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some(_) => Err(DomainError::validation(field, "Must be true or false")),
    }
}

fn no_fields() -> DomainError {
    DomainError::bad_request("No fields to update")
}

impl NewBranch {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.required_text(&self.name, "name", "Name is required");
        v.finish()
    }
}

impl BranchPatch {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty patch or a rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_none() {
            return Err(no_fields());
        }
        let mut v = Violations::default();
        v.optional_text(self.name.as_deref(), "name", "Name must not be empty");
        v.finish()
    }
}

impl NewAgent {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.required_text(&self.full_name, "fullName", "FullName is required");
        v.phone(self.phone.as_deref(), "phone");
        v.email(self.email.as_deref(), "email");
        v.id(self.branch_id, "branchId", "BranchID must be a positive integer");
        v.finish()
    }
}

impl AgentPatch {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty patch or a rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.full_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.hire_date.is_none()
            && self.branch_id.is_none()
        {
            return Err(no_fields());
        }
        let mut v = Violations::default();
        v.optional_text(self.full_name.as_deref(), "fullName", "FullName must not be empty");
        v.phone(self.phone.as_deref(), "phone");
        v.email(self.email.as_deref(), "email");
        v.id(self.branch_id, "branchId", "BranchID must be a positive integer");
        v.finish()
    }
}

impl NewClient {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.required_text(&self.last_name, "lastName", "LastName is required");
        v.required_text(&self.first_name, "firstName", "FirstName is required");
        v.phone(self.phone.as_deref(), "phone");
        v.email(self.email.as_deref(), "email");
        let has_contact = [&self.phone, &self.email]
            .into_iter()
            .any(|c| c.as_deref().is_some_and(|c| !c.trim().is_empty()));
        v.check(has_contact, "phone", "Phone or email is required");
        v.finish()
    }
}

impl ClientPatch {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty patch or a rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.last_name.is_none()
            && self.first_name.is_none()
            && self.middle_name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.email.is_none()
        {
            return Err(no_fields());
        }
        let mut v = Violations::default();
        v.optional_text(self.last_name.as_deref(), "lastName", "LastName must not be empty");
        v.optional_text(self.first_name.as_deref(), "firstName", "FirstName must not be empty");
        v.phone(self.phone.as_deref(), "phone");
        v.email(self.email.as_deref(), "email");
        v.finish()
    }
}

impl NewInsuranceType {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.required_text(&self.name, "name", "Name is required");
        v.unit_interval(Some(self.base_rate), "baseRate", "BaseRate must be between 0 and 1");
        v.non_negative(Some(self.payout_coeff), "payoutCoeff", "PayoutCoeff must not be negative");
        v.unit_interval(
            Some(self.agent_percent_default),
            "agentPercentDefault",
            "AgentPercentDefault must be between 0 and 1",
        );
        v.finish()
    }
}

impl InsuranceTypePatch {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty patch or a rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.base_rate.is_none()
            && self.payout_coeff.is_none()
            && self.agent_percent_default.is_none()
        {
            return Err(no_fields());
        }
        let mut v = Violations::default();
        v.optional_text(self.name.as_deref(), "name", "Name must not be empty");
        v.unit_interval(self.base_rate, "baseRate", "BaseRate must be between 0 and 1");
        v.non_negative(self.payout_coeff, "payoutCoeff", "PayoutCoeff must not be negative");
        v.unit_interval(
            self.agent_percent_default,
            "agentPercentDefault",
            "AgentPercentDefault must be between 0 and 1",
        );
        v.finish()
    }
}

impl NewContract {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.check(self.client_id >= 1, "clientId", "ClientID is required");
        v.check(self.agent_id >= 1, "agentId", "AgentID is required");
        v.check(self.insurance_type_id >= 1, "insuranceTypeId", "InsuranceTypeID is required");
        v.positive(Some(self.insurance_amount), "insuranceAmount", "InsuranceAmount must be positive");
        v.unit_interval(self.agent_percent, "agentPercent", "AgentPercent must be between 0 and 1");
        v.check(
            self.end_date > self.start_date,
            "endDate",
            "EndDate must be later than StartDate",
        );
        v.finish()
    }
}

impl ContractPatch {
    /// Field rules only; the date order is checked against the stored
    /// contract once both dates are known.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty patch or a rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.client_id.is_none()
            && self.agent_id.is_none()
            && self.insurance_type_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.insurance_amount.is_none()
            && self.agent_percent.is_none()
            && self.status.is_none()
        {
            return Err(no_fields());
        }
        let mut v = Violations::default();
        v.id(self.client_id, "clientId", "ClientID must be a positive integer");
        v.id(self.agent_id, "agentId", "AgentID must be a positive integer");
        v.id(
            self.insurance_type_id,
            "insuranceTypeId",
            "InsuranceTypeID must be a positive integer",
        );
        v.positive(self.insurance_amount, "insuranceAmount", "InsuranceAmount must be positive");
        v.unit_interval(self.agent_percent, "agentPercent", "AgentPercent must be between 0 and 1");
        v.finish()
    }
}

/// # Errors
///
/// Returns [`DomainError::Validation`] unless `end` is after `start`.
pub fn check_contract_dates(start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
    if end > start {
        Ok(())
    } else {
        Err(DomainError::validation(
            "endDate",
            "EndDate must be later than StartDate",
        ))
    }
}

impl NewCase {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.check(self.contract_id >= 1, "contractId", "ContractID is required");
        v.required_text(&self.act_number, "actNumber", "ActNumber is required");
        v.unit_interval(Some(self.damage_level), "damageLevel", "DamageLevel must be between 0 and 1");
        v.finish()
    }
}

impl CasePatch {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for an empty patch or a rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.contract_id.is_none()
            && self.case_date.is_none()
            && self.act_number.is_none()
            && self.damage_level.is_none()
            && self.payment_date.is_none()
        {
            return Err(no_fields());
        }
        let mut v = Violations::default();
        v.id(self.contract_id, "contractId", "ContractID must be a positive integer");
        v.optional_text(self.act_number.as_deref(), "actNumber", "ActNumber must not be empty");
        v.unit_interval(self.damage_level, "damageLevel", "DamageLevel must be between 0 and 1");
        v.finish()
    }
}

impl NewUser {
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] listing every rejected field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut v = Violations::default();
        v.check(is_email(&self.email), "email", "Invalid email format");
        v.check(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Password must be at least 6 characters",
        );
        v.id(self.agent_id, "agentId", "AgentID must be a positive integer");
        v.finish()
    }
}
