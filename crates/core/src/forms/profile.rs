//! Profile-completion form.

use chrono::NaiveDate;
use serde::Deserialize;

use super::ValidationErrors;

/// Minimum number of characters in a phone number.
pub const MIN_PHONE_LENGTH: usize = 10;

/// Options offered by the gender select, as `(value, label)`.
pub const GENDER_OPTIONS: [(&str, &str); 4] = [
    ("male", "Male"),
    ("female", "Female"),
    ("non-binary", "Non-binary"),
    ("prefer-not-to-say", "Prefer not to say"),
];

const PHONE_REQUIRED: &str = "Phone number is required";
const GENDER_REQUIRED: &str = "Gender is required";
const ADDRESS_REQUIRED: &str = "Address is required";
const DATE_OF_BIRTH_REQUIRED: &str = "Date of birth is required";
const DATE_OF_BIRTH_OUT_OF_RANGE: &str = "Date of birth must be between 1900-01-01 and today";

/// Raw profile form submission.
///
/// `date_of_birth` arrives as the `YYYY-MM-DD` value of a date input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub date_of_birth: String,
}

/// A profile submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDetails {
    pub phone_number: String,
    pub gender: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
}

impl ProfileDetails {
    /// Earliest accepted date of birth.
    #[must_use]
    pub fn earliest_date_of_birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl ProfileInput {
    /// Validate the submission against `today`'s date.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self, today: NaiveDate) -> Result<ProfileDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.phone_number.chars().count() < MIN_PHONE_LENGTH {
            errors.add("phone_number", PHONE_REQUIRED);
        }
        if self.gender.is_empty() {
            errors.add("gender", GENDER_REQUIRED);
        }
        if self.address.is_empty() {
            errors.add("address", ADDRESS_REQUIRED);
        }

        let date_of_birth = match NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d") {
            Ok(date) if (ProfileDetails::earliest_date_of_birth()..=today).contains(&date) => {
                Some(date)
            }
            Ok(_) => {
                errors.add("date_of_birth", DATE_OF_BIRTH_OUT_OF_RANGE);
                None
            }
            Err(_) => {
                errors.add("date_of_birth", DATE_OF_BIRTH_REQUIRED);
                None
            }
        };

        match date_of_birth {
            Some(date_of_birth) if errors.is_empty() => Ok(ProfileDetails {
                phone_number: self.phone_number.clone(),
                gender: self.gender.clone(),
                address: self.address.clone(),
                date_of_birth,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn valid() -> ProfileInput {
        ProfileInput {
            phone_number: "+1 555 123 4567".to_string(),
            gender: "female".to_string(),
            address: "123 Main St, City, Country".to_string(),
            date_of_birth: "1990-05-17".to_string(),
        }
    }

    #[test]
    fn test_valid_profile() {
        let details = valid().validate(today()).unwrap();
        assert_eq!(
            details.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()
        );
        assert_eq!(details.gender, "female");
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut input = valid();
        input.phone_number = "555-1234".to_string();
        let errors = input.validate(today()).unwrap_err();
        assert_eq!(errors.get("phone_number"), Some("Phone number is required"));
    }

    #[test]
    fn test_required_fields() {
        let errors = ProfileInput::default().validate(today()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("gender"), Some("Gender is required"));
        assert_eq!(errors.get("address"), Some("Address is required"));
        assert_eq!(errors.get("date_of_birth"), Some("Date of birth is required"));
    }

    #[test]
    fn test_date_of_birth_bounds() {
        let out_of_range = "Date of birth must be between 1900-01-01 and today";
        for date in ["1899-12-31", "2026-10-20", "3000-01-01"] {
            let mut input = valid();
            input.date_of_birth = date.to_string();
            let errors = input.validate(today()).unwrap_err();
            assert_eq!(errors.get("date_of_birth"), Some(out_of_range), "{date}");
        }
        for date in ["1900-01-01", "2026-10-19"] {
            let mut input = valid();
            input.date_of_birth = date.to_string();
            assert!(input.validate(today()).is_ok(), "{date}");
        }
    }

    #[test]
    fn test_unparseable_date_is_missing() {
        let mut input = valid();
        input.date_of_birth = "17/05/1990".to_string();
        let errors = input.validate(today()).unwrap_err();
        assert_eq!(errors.get("date_of_birth"), Some("Date of birth is required"));
    }
}
