use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::model::Person;

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

pub(crate) fn require_email(email: &str) -> Result<(), ValidationError> {
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn not_in_future(
    field: &'static str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if date > today {
        return Err(ValidationError::FutureDate { field, date });
    }
    Ok(())
}

pub(crate) fn positive_copies(copies: i64) -> Result<u32, ValidationError> {
    match u32::try_from(copies) {
        Ok(copies) if copies > 0 => Ok(copies),
        _ => Err(ValidationError::NonPositiveCopies { copies }),
    }
}

pub(crate) fn validate_person(person: &Person, today: NaiveDate) -> Result<(), ValidationError> {
    require("first name", &person.first_name)?;
    require("last name", &person.last_name)?;
    require_email(&person.email)?;
    not_in_future("date of birth", person.date_of_birth, today)?;
    require("street", &person.address.street)?;
    require("city", &person.address.city)?;
    require("postal code", &person.address.postal_code)?;
    require("country", &person.address.country)?;
    Ok(())
}
