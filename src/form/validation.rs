use std::collections::{BTreeSet, HashMap};

use super::FormController;
use crate::error::ClientError;

const REQUIRED_MESSAGE: &str = "This field is required";

/// Submit-time checks run locally; failures never reach the backend
#[derive(Debug, Clone, Default)]
pub struct Rules {
    required: BTreeSet<String>,
    messages: HashMap<String, String>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, field: impl Into<String>) -> Self {
        self.required.insert(field.into());
        self
    }

    /// Required field with its own message
    pub fn required_with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        self.messages.insert(field.clone(), message.into());
        self.required.insert(field);
        self
    }

    pub fn check(&self, form: &FormController) -> Result<(), ClientError> {
        let field_errors: HashMap<String, String> = self
            .required
            .iter()
            .filter(|field| form.value(field).is_none())
            .map(|field| {
                let message = self
                    .messages
                    .get(field)
                    .cloned()
                    .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
                (field.clone(), message)
            })
            .collect();

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::validation("Missing required fields", field_errors))
        }
    }
}

impl FormController {
    pub fn validate(&self, rules: &Rules) -> Result<(), ClientError> {
        rules.check(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Chain;

    #[test]
    fn reset_dependent_fails_required_check() {
        let mut form = FormController::new(vec![Chain::new("domainId", "roleId")]).unwrap();
        let rules = Rules::new()
            .required("domainId")
            .required_with("roleId", "Select a role");

        form.set_value("domainId", Some(1.into()));
        form.set_value("roleId", Some(11.into()));
        assert!(form.validate(&rules).is_ok());

        form.set_value("domainId", Some(2.into()));
        match form.validate(&rules) {
            Err(ClientError::Validation { field_errors, .. }) => {
                assert_eq!(field_errors.len(), 1);
                assert_eq!(field_errors["roleId"], "Select a role");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let form = FormController::new(Vec::new()).unwrap();
        let rules = Rules::new().required("clientId").required("projectId");

        let err = form.validate(&rules).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        if let ClientError::Validation { field_errors, .. } = err {
            assert_eq!(field_errors["clientId"], "This field is required");
            assert_eq!(field_errors["projectId"], "This field is required");
        }
    }
}
