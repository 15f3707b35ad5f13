//! Rule-based form validation.

use crate::error::PortalError;

pub struct FieldRule {
    pub required: bool,
    pub min_length: usize,
    pub message: &'static str,
}

/// One rule per form field. Selects only need presence; free-text fields
/// also carry a minimum length.
pub const RULES: [(&str, FieldRule); 4] = [
    (
        "titulo",
        FieldRule {
            required: true,
            min_length: 5,
            message: "El título es obligatorio y debe tener al menos 5 caracteres",
        },
    ),
    (
        "descripcion",
        FieldRule {
            required: true,
            min_length: 20,
            message: "La descripción es obligatoria y debe tener al menos 20 caracteres",
        },
    ),
    (
        "prioridad",
        FieldRule {
            required: true,
            min_length: 0,
            message: "Debes seleccionar una prioridad",
        },
    ),
    (
        "etiqueta",
        FieldRule {
            required: true,
            min_length: 0,
            message: "Debes seleccionar un tipo de ticket",
        },
    ),
];

/// Raw form input, exactly as entered.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub titulo: String,
    pub descripcion: String,
    pub prioridad: String,
    pub etiqueta: String,
}

impl FormValues {
    fn get(&self, field: &str) -> &str {
        match field {
            "titulo" => &self.titulo,
            "descripcion" => &self.descripcion,
            "prioridad" => &self.prioridad,
            "etiqueta" => &self.etiqueta,
            _ => "",
        }
    }
}

/// Checks one field against its rule. Fields without a rule pass.
pub fn validate(field: &'static str, value: &str) -> Result<(), PortalError> {
    let Some((_, rule)) = RULES.iter().find(|(name, _)| *name == field) else {
        return Ok(());
    };

    let trimmed = value.trim();

    if rule.required && trimmed.is_empty() {
        return Err(PortalError::Validation {
            field,
            message: rule.message,
        });
    }

    if trimmed.chars().count() < rule.min_length {
        return Err(PortalError::Validation {
            field,
            message: rule.message,
        });
    }

    Ok(())
}

/// Runs every rule with no early exit, so the UI can mark all invalid
/// fields in one pass. Valid iff the returned list is empty.
pub fn validate_all(values: &FormValues) -> Result<(), Vec<PortalError>> {
    let mut errors = Vec::new();

    for (field, _) in RULES {
        if let Err(error) = validate(field, values.get(field)) {
            errors.push(error);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
