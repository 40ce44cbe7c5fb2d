// src/configurations/validators.rs

use super::models::{CreateConfigurationRequest, UpdateConfigurationRequest};
use crate::common::{ValidationResult, Validator};
use crate::generator::registry;

pub struct ConfigurationValidator;

impl Validator<CreateConfigurationRequest> for ConfigurationValidator {
    fn validate(&self, data: &CreateConfigurationRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if registry::lookup(&data.service).is_none() {
            result.add_error("service", "Unknown service");
        }

        if data.config_name.trim().is_empty() {
            result.add_error("config_name", "Configuration name is required");
        } else if data.config_name.len() > 255 {
            result.add_error(
                "config_name",
                "Configuration name must be less than 255 characters",
            );
        }

        if !data.config_data.is_object() {
            result.add_error("config_data", "Configuration data must be a JSON object");
        }

        result
    }
}

impl Validator<UpdateConfigurationRequest> for ConfigurationValidator {
    fn validate(&self, data: &UpdateConfigurationRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.config_name.is_none() && data.config_data.is_none() {
            result.add_error("general", "At least one field must be provided for update");
            return result;
        }

        if let Some(name) = &data.config_name {
            if name.trim().is_empty() {
                result.add_error("config_name", "Configuration name is required");
            } else if name.len() > 255 {
                result.add_error(
                    "config_name",
                    "Configuration name must be less than 255 characters",
                );
            }
        }

        if let Some(data_value) = &data.config_data {
            if !data_value.is_object() {
                result.add_error("config_data", "Configuration data must be a JSON object");
            }
        }

        result
    }
}
