use crate::error::RowError;
use crate::validate::required;

use serde::Deserialize;

/// Ingredient master row after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub base_unit: String,
}

#[derive(Debug, Deserialize)]
pub struct CsvIngredient {
    pub ingredient_name: String,
    pub base_unit: String,
}

impl TryFrom<CsvIngredient> for Ingredient {
    type Error = RowError;

    fn try_from(csv: CsvIngredient) -> Result<Self, Self::Error> {
        let name = required("ingredient_name", &csv.ingredient_name)?;
        let base_unit = required("base_unit", &csv.base_unit)?;

        Ok(Ingredient {
            name: name.to_string(),
            base_unit: base_unit.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str) -> CsvIngredient {
        CsvIngredient {
            ingredient_name: name.to_string(),
            base_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_valid_row_is_trimmed() {
        let ingredient = Ingredient::try_from(row("  Flour ", " g")).unwrap();
        assert_eq!(ingredient.name, "Flour");
        assert_eq!(ingredient.base_unit, "g");
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(
            Ingredient::try_from(row(" ", "g")),
            Err(RowError::MissingField {
                field: "ingredient_name"
            })
        );
    }

    #[test]
    fn test_missing_base_unit() {
        let err = Ingredient::try_from(row("Sugar", "")).unwrap_err();
        assert_eq!(err, RowError::MissingField { field: "base_unit" });
        assert_eq!(err.to_string(), "missing field: base_unit");
    }
}
