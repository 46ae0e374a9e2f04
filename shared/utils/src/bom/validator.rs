//! Netlist Validator
//!
//! Reports components that are likely to produce a poor BOM. Nothing here is
//! fatal; issues are logged and summarised.

use std::collections::HashSet;

use kicad_bom_models::RawComponent;

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    Warning,
    Info,
}

/// Single validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub reference: String,
    pub field: Option<String>,
    pub message: String,
}

/// Validation result for a netlist
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

/// Summary statistics for validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total_components: usize,
    pub missing_values: usize,
    pub missing_footprints: usize,
    pub missing_part_numbers: usize,
    pub duplicate_references: usize,
}

/// Netlist validator
pub struct NetlistValidator {
    part_number_field: String,
}

impl NetlistValidator {
    pub fn new(part_number_field: impl Into<String>) -> Self {
        Self {
            part_number_field: part_number_field.into(),
        }
    }

    /// Validate raw components
    pub fn validate(&self, components: &[RawComponent]) -> ValidationResult {
        let mut issues = Vec::new();
        let mut summary = ValidationSummary {
            total_components: components.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for component in components {
            let reference = component.reference.as_str();

            if !seen.insert(reference) {
                summary.duplicate_references += 1;
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    reference: reference.to_string(),
                    field: None,
                    message: format!("Designator {} appears more than once", reference),
                });
            }

            if component.value.is_none() {
                summary.missing_values += 1;
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    reference: reference.to_string(),
                    field: Some("value".to_string()),
                    message: "Missing value".to_string(),
                });
            }

            if component.footprint.as_deref().map_or(true, str::is_empty) {
                summary.missing_footprints += 1;
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    reference: reference.to_string(),
                    field: Some("footprint".to_string()),
                    message: "No footprint assigned".to_string(),
                });
            }

            if component.field(&self.part_number_field).is_none() {
                summary.missing_part_numbers += 1;
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Info,
                    reference: reference.to_string(),
                    field: Some(self.part_number_field.clone()),
                    message: format!(
                        "No {} field; grouping falls back to value and footprint, no pricing",
                        self.part_number_field
                    ),
                });
            }
        }

        let warning_count = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count();

        ValidationResult {
            warning_count,
            issues,
            summary,
        }
    }
}

impl ValidationResult {
    /// Writes each issue to the log
    pub fn log(&self) {
        for issue in &self.issues {
            match issue.severity {
                ValidationSeverity::Warning => {
                    tracing::warn!(reference = %issue.reference, "{}", issue.message)
                }
                ValidationSeverity::Info => {
                    tracing::info!(reference = %issue.reference, "{}", issue.message)
                }
            }
        }
        tracing::info!(
            "Netlist check: {} components, {} warnings",
            self.summary.total_components,
            self.warning_count
        );
    }
}
