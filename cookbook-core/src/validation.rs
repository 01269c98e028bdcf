//! Rule-based validation for recipe create/update requests.
//!
//! Every field has an ordered table of independent rules. All tables are
//! evaluated and their failures collected into a single [`FieldErrors`] map,
//! so one pass reports every problem with a request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::{Ingredient, IngredientRequest, RecipeDraft, RecipeRequest};
use crate::unit::Unit;

pub const RECIPE_NAME_MAX_CHARS: usize = 500;
pub const INGREDIENT_NAME_MAX_CHARS: usize = 250;
pub const INSTRUCTION_MAX_CHARS: usize = 1000;
pub const QUANTITY_MIN: i64 = 1;
pub const QUANTITY_MAX: i64 = 99;

/// Which kind of rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Required,
    TooLong,
    OutOfRange,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: Rule,
    pub message: String,
}

/// Serialized as the bare message; the rule is for callers inside the process.
impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

/// Field path (`name`, `ingredients[2].quantity`, `instructions`) to the
/// violations recorded against it, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<Violation>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, rule: Rule, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(Violation {
            rule,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one violation.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&[Violation]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn rules(&self, path: &str) -> Vec<Rule> {
        self.get(path)
            .map(|violations| violations.iter().map(|v| v.rule).collect())
            .unwrap_or_default()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.0.iter().map(|(path, v)| (path.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, violations) in self.iter() {
            for violation in violations {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", path, violation.message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

struct FieldRule<T: ?Sized> {
    rule: Rule,
    passes: fn(&T) -> bool,
    message: &'static str,
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

// Line breaks and tabs are allowed; NUL and other control characters are not.
fn is_printable(value: &str) -> bool {
    !value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
}

fn fits_recipe_name(value: &str) -> bool {
    value.chars().count() <= RECIPE_NAME_MAX_CHARS
}

fn fits_ingredient_name(value: &str) -> bool {
    value.chars().count() <= INGREDIENT_NAME_MAX_CHARS
}

/// The quantity as stored, when it is present and within range.
fn checked_quantity(value: &Option<i64>) -> Option<i32> {
    value
        .filter(|quantity| (QUANTITY_MIN..=QUANTITY_MAX).contains(quantity))
        .and_then(|quantity| i32::try_from(quantity).ok())
}

fn in_quantity_range(value: &Option<i64>) -> bool {
    checked_quantity(value).is_some()
}

// A blank unit is already reported as Required.
fn is_known_unit(value: &str) -> bool {
    !is_present(value) || value.parse::<Unit>().is_ok()
}

fn describes_other_unit(ingredient: &IngredientRequest) -> bool {
    if ingredient.unit.parse::<Unit>() != Ok(Unit::Other) {
        return true;
    }
    ingredient
        .other_unit_description
        .as_deref()
        .is_some_and(is_present)
}

fn description_is_printable(ingredient: &IngredientRequest) -> bool {
    ingredient
        .other_unit_description
        .as_deref()
        .map_or(true, is_printable)
}

fn all_instructions_valid(instructions: &[String]) -> bool {
    instructions
        .iter()
        .all(|step| is_present(step) && step.chars().count() <= INSTRUCTION_MAX_CHARS)
}

fn all_instructions_printable(instructions: &[String]) -> bool {
    instructions.iter().all(|step| is_printable(step))
}

const RECIPE_NAME_RULES: &[FieldRule<str>] = &[
    FieldRule {
        rule: Rule::Required,
        passes: is_present,
        message: "Name is required.",
    },
    FieldRule {
        rule: Rule::TooLong,
        passes: fits_recipe_name,
        message: "Name must be at most 500 characters.",
    },
    FieldRule {
        rule: Rule::Invalid,
        passes: is_printable,
        message: "Name must not contain control characters.",
    },
];

const INGREDIENT_NAME_RULES: &[FieldRule<str>] = &[
    FieldRule {
        rule: Rule::Required,
        passes: is_present,
        message: "Ingredient name is required.",
    },
    FieldRule {
        rule: Rule::TooLong,
        passes: fits_ingredient_name,
        message: "Ingredient name must be at most 250 characters.",
    },
    FieldRule {
        rule: Rule::Invalid,
        passes: is_printable,
        message: "Ingredient name must not contain control characters.",
    },
];

const QUANTITY_RULES: &[FieldRule<Option<i64>>] = &[FieldRule {
    rule: Rule::OutOfRange,
    passes: in_quantity_range,
    message: "Quantity must be between 1 and 99.",
}];

const UNIT_RULES: &[FieldRule<str>] = &[
    FieldRule {
        rule: Rule::Required,
        passes: is_present,
        message: "Unit is required.",
    },
    FieldRule {
        rule: Rule::Invalid,
        passes: is_known_unit,
        message: "Unit is not a recognized unit.",
    },
];

const OTHER_UNIT_DESCRIPTION_RULES: &[FieldRule<IngredientRequest>] = &[
    FieldRule {
        rule: Rule::Required,
        passes: describes_other_unit,
        message: "A unit description is required when the unit is Other.",
    },
    FieldRule {
        rule: Rule::Invalid,
        passes: description_is_printable,
        message: "Unit description must not contain control characters.",
    },
];

const INSTRUCTIONS_RULES: &[FieldRule<[String]>] = &[
    FieldRule {
        rule: Rule::Invalid,
        passes: all_instructions_valid,
        message: "Each instruction must be non-empty and at most 1000 characters.",
    },
    FieldRule {
        rule: Rule::Invalid,
        passes: all_instructions_printable,
        message: "Instructions must not contain control characters.",
    },
];

fn check<T: ?Sized>(errors: &mut FieldErrors, path: &str, value: &T, rules: &[FieldRule<T>]) {
    for rule in rules {
        if !(rule.passes)(value) {
            errors.add(path, rule.rule, rule.message);
        }
    }
}

/// Runs every rule table over the request. Alongside the errors it returns
/// the typed ingredients whose quantity and unit passed; when no errors were
/// recorded that is every ingredient, in request order.
fn inspect(request: &RecipeRequest) -> (FieldErrors, Vec<Ingredient>) {
    let mut errors = FieldErrors::new();
    let mut ingredients = Vec::with_capacity(request.ingredients.len());

    check(&mut errors, "name", request.name.as_str(), RECIPE_NAME_RULES);

    for (index, ingredient) in request.ingredients.iter().enumerate() {
        let prefix = format!("ingredients[{}]", index);
        check(
            &mut errors,
            &format!("{}.name", prefix),
            ingredient.name.as_str(),
            INGREDIENT_NAME_RULES,
        );
        check(
            &mut errors,
            &format!("{}.quantity", prefix),
            &ingredient.quantity,
            QUANTITY_RULES,
        );
        check(
            &mut errors,
            &format!("{}.unit", prefix),
            ingredient.unit.as_str(),
            UNIT_RULES,
        );
        check(
            &mut errors,
            &format!("{}.otherUnitDescription", prefix),
            ingredient,
            OTHER_UNIT_DESCRIPTION_RULES,
        );

        if let (Some(quantity), Ok(unit)) = (
            checked_quantity(&ingredient.quantity),
            ingredient.unit.parse::<Unit>(),
        ) {
            ingredients.push(Ingredient {
                name: ingredient.name.clone(),
                quantity,
                unit,
                other_unit_description: match unit {
                    Unit::Other => ingredient.other_unit_description.clone(),
                    _ => None,
                },
            });
        }
    }

    check(
        &mut errors,
        "instructions",
        request.instructions.as_slice(),
        INSTRUCTIONS_RULES,
    );

    (errors, ingredients)
}

/// Validate a create or update request. Pure: never touches storage.
pub fn validate(request: &RecipeRequest) -> ValidationResult {
    let (errors, _) = inspect(request);
    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

impl TryFrom<RecipeRequest> for RecipeDraft {
    type Error = FieldErrors;

    fn try_from(request: RecipeRequest) -> Result<Self, Self::Error> {
        let (errors, ingredients) = inspect(&request);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RecipeDraft {
            name: request.name,
            ingredients,
            instructions: request.instructions,
        })
    }
}
