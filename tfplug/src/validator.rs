use crate::types::{Diagnostics, Dynamic};

/// Validates a known configuration value. Null and unknown values are
/// filtered out by the framework before validators run.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics);
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            let len = s.chars().count();
            if let Some(min) = self.min {
                if len < min {
                    diagnostics.add_error(
                        format!("{} must have minimum length of {}", attribute_path, min),
                        Some(format!("Got length {}", len)),
                    );
                }
            }
            if let Some(max) = self.max {
                if len > max {
                    diagnostics.add_error(
                        format!("{} must have maximum length of {}", attribute_path, max),
                        Some(format!("Got length {}", len)),
                    );
                }
            }
        }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl StringPatternValidator {
    pub fn new(pattern: &str, description: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: regex::Regex::new(pattern)?,
            description: description.into(),
        })
    }
}

impl Validator for StringPatternValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if !self.pattern.is_match(s) {
                diagnostics.add_error(
                    format!("{} must match {}", attribute_path, self.description),
                    Some(format!("Value '{}' does not match pattern", s)),
                );
            }
        }
    }
}

/// Accepts only strings from a fixed set of values
pub struct OneOfValidator {
    pub allowed: Vec<String>,
}

impl OneOfValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for OneOfValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if !self.allowed.iter().any(|allowed| allowed == s) {
                diagnostics.add_error(
                    format!(
                        "{} must be one of: {}",
                        attribute_path,
                        self.allowed.join(", ")
                    ),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRangeValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(n) = value.as_number() {
            if let Some(min) = self.min {
                if n < min {
                    diagnostics.add_error(
                        format!("{} must be at least {}", attribute_path, min),
                        Some(format!("Got {}", n)),
                    );
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    diagnostics.add_error(
                        format!("{} must be at most {}", attribute_path, max),
                        Some(format!("Got {}", n)),
                    );
                }
            }
        }
    }
}

/// Rejects fractional numbers for attributes the remote side stores as integers
pub struct WholeNumberValidator;

impl Validator for WholeNumberValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(n) = value.as_number() {
            if n.fract() != 0.0 || !n.is_finite() {
                diagnostics.add_error(
                    format!("{} must be a whole number", attribute_path),
                    Some(format!("Got {}", n)),
                );
            }
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLengthValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Dynamic::List(items) = value {
            if let Some(min) = self.min {
                if items.len() < min {
                    diagnostics.add_error(
                        format!("{} must have at least {} items", attribute_path, min),
                        Some(format!("Got {} items", items.len())),
                    );
                }
            }
            if let Some(max) = self.max {
                if items.len() > max {
                    diagnostics.add_error(
                        format!("{} must have at most {} items", attribute_path, max),
                        Some(format!("Got {} items", items.len())),
                    );
                }
            }
        }
    }
}

/// Runs a validator against every known element of a list
pub struct ListElementsValidator {
    inner: Box<dyn Validator>,
}

impl ListElementsValidator {
    pub fn new(inner: Box<dyn Validator>) -> Self {
        Self { inner }
    }
}

impl Validator for ListElementsValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Dynamic::List(items) = value {
            for (idx, item) in items.iter().enumerate() {
                if item.is_known() {
                    self.inner
                        .validate(item, &format!("{}[{}]", attribute_path, idx), diagnostics);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Diagnostics, Dynamic};

    #[test]
    fn string_length_validator_accepts_valid_length() {
        let validator = StringLengthValidator {
            min: Some(3),
            max: Some(10),
        };

        let mut diags = Diagnostics::new();
        validator.validate(
            &Dynamic::String("hello".to_string()),
            "test_field",
            &mut diags,
        );

        assert_eq!(diags.errors.len(), 0);
    }

    #[test]
    fn string_length_validator_rejects_too_short() {
        let validator = StringLengthValidator {
            min: Some(5),
            max: None,
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("hi".to_string()), "test_field", &mut diags);

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("minimum length"));
    }

    #[test]
    fn string_pattern_validator_rejects_non_matching() {
        let validator = StringPatternValidator::new(r"^\d{2}:\d{2}$", "HH:mm").unwrap();

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("9am".to_string()), "start", &mut diags);
        validator.validate(&Dynamic::String("09:00".to_string()), "start", &mut diags);

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("HH:mm"));
    }

    #[test]
    fn one_of_validator_lists_allowed_values() {
        let validator = OneOfValidator::new(["Critical", "Warning", "Minor"]);

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("Warning".to_string()), "severity", &mut diags);
        assert!(diags.errors.is_empty());

        validator.validate(&Dynamic::String("Major".to_string()), "severity", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].summary,
            "severity must be one of: Critical, Warning, Minor"
        );
    }

    #[test]
    fn number_range_validator_rejects_too_small() {
        let validator = NumberRangeValidator {
            min: Some(10.0),
            max: None,
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::Number(5.0), "count", &mut diags);

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("at least"));
    }

    #[test]
    fn whole_number_validator_rejects_fractions() {
        let mut diags = Diagnostics::new();
        WholeNumberValidator.validate(&Dynamic::Number(2.5), "delay", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("whole number"));

        let mut diags = Diagnostics::new();
        WholeNumberValidator.validate(&Dynamic::Number(15.0), "delay", &mut diags);
        WholeNumberValidator.validate(&Dynamic::Number(-3.0), "delay", &mut diags);
        assert!(!diags.has_errors());
    }

    #[test]
    fn list_length_validator_rejects_empty_list() {
        let validator = ListLengthValidator {
            min: Some(1),
            max: None,
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::List(vec![]), "rules", &mut diags);

        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn list_elements_validator_reports_element_path() {
        let validator =
            ListElementsValidator::new(Box::new(OneOfValidator::new(["Member", "Administrator"])));

        let mut diags = Diagnostics::new();
        let list = Dynamic::List(vec![
            Dynamic::String("Member".to_string()),
            Dynamic::String("Owner".to_string()),
            Dynamic::Unknown,
        ]);
        validator.validate(&list, "roles", &mut diags);

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.starts_with("roles[1]"));
    }
}
