//! # Validation
//!
//! Declarative rules per resource kind, each scoped to the create context,
//! the update context, or both. The engine picks the context from the
//! resource's lifecycle *before* running them, so a rule declared
//! `On::Create` never fires against a persisted resource.

use std::fmt;
use std::sync::Arc;

use crate::framework::attribute::{Attributes, Value};

/// Which rules apply: chosen from the lifecycle (`New` → `Create`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationContext {
    Create,
    Update,
}

/// Scope a rule is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum On {
    Create,
    Update,
    Always,
}

impl On {
    fn applies(self, context: ValidationContext) -> bool {
        match self {
            On::Always => true,
            On::Create => context == ValidationContext::Create,
            On::Update => context == ValidationContext::Update,
        }
    }
}

/// Where an error entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Validation,
    Api,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub source: ErrorSource,
}

/// The error collection of one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors {
    entries: Vec<FieldError>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.push(FieldError {
            field: field.into(),
            message: message.into(),
            source: ErrorSource::Validation,
        });
    }

    /// Records a platform-reported failure against `base`.
    pub fn add_api(&mut self, message: impl Into<String>) {
        self.entries.push(FieldError {
            field: "base".into(),
            message: message.into(),
            source: ErrorSource::Api,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.entries.iter()
    }

    pub fn has_validation_errors(&self) -> bool {
        self.entries.iter().any(|e| e.source == ErrorSource::Validation)
    }

    /// Messages recorded against one field.
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                if e.field == "base" {
                    e.message.clone()
                } else {
                    format!("{} {}", e.field, e.message)
                }
            })
            .collect()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join("; "))
    }
}

/// Message used by inclusion rules.
pub fn inclusion_message(value: &Value, allowed: &[&str]) -> String {
    format!("{value} is not included in the list: {}", allowed.join(", "))
}

type CustomRule = Arc<dyn Fn(&Attributes, &mut Errors) + Send + Sync>;

#[derive(Clone)]
enum Check {
    Presence(Vec<&'static str>),
    Inclusion {
        field: &'static str,
        allowed: &'static [&'static str],
        allow_blank: bool,
        ignore_case: bool,
    },
    Numericality {
        fields: Vec<&'static str>,
        greater_than: i64,
    },
    Length {
        field: &'static str,
        maximum: usize,
    },
    TitlesLength {
        field: &'static str,
        maximums: Vec<usize>,
    },
    Custom(CustomRule),
}

#[derive(Clone)]
struct Rule {
    on: On,
    check: Check,
}

impl Rule {
    fn run(&self, attributes: &Attributes, errors: &mut Errors) {
        let value_of = |field: &str| attributes.get(field).cloned().unwrap_or_default();
        match &self.check {
            Check::Presence(fields) => {
                for field in fields {
                    if value_of(field).is_blank() {
                        errors.add(*field, "can't be blank");
                    }
                }
            }
            Check::Inclusion {
                field,
                allowed,
                allow_blank,
                ignore_case,
            } => {
                let value = value_of(field);
                if value.is_blank() {
                    if !allow_blank {
                        errors.add(*field, inclusion_message(&value, allowed));
                    }
                    return;
                }
                let candidate = value.to_string();
                let included = allowed.iter().any(|a| {
                    if *ignore_case {
                        a.eq_ignore_ascii_case(&candidate)
                    } else {
                        *a == candidate
                    }
                });
                if !included {
                    errors.add(*field, inclusion_message(&value, allowed));
                }
            }
            Check::Numericality {
                fields,
                greater_than,
            } => {
                for field in fields {
                    match value_of(field) {
                        Value::Null => {}
                        Value::Integer(i) if i > *greater_than => {}
                        Value::Integer(_) => {
                            errors.add(*field, format!("must be greater than {greater_than}"))
                        }
                        _ => errors.add(*field, "is not a number"),
                    }
                }
            }
            Check::Length { field, maximum } => {
                if let Value::String(s) = value_of(field) {
                    if s.chars().count() > *maximum {
                        errors.add(*field, format!("is too long (maximum is {maximum} characters)"));
                    }
                }
            }
            Check::TitlesLength { field, maximums } => {
                let Value::Array(titles) = value_of(field) else {
                    return;
                };
                for (i, title) in titles.iter().enumerate() {
                    let maximum = maximums.get(i).or(maximums.first()).copied().unwrap_or(usize::MAX);
                    let length = title.as_str().map(|t| t.chars().count()).unwrap_or(0);
                    if length > maximum {
                        errors.add(
                            *field,
                            format!("title at index {i} is too long (maximum is {maximum} characters)"),
                        );
                    }
                }
            }
            Check::Custom(rule) => rule(attributes, errors),
        }
    }
}

/// The rule set of one resource kind.
#[derive(Clone, Default)]
pub struct Validations {
    rules: Vec<Rule>,
}

impl Validations {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, on: On, check: Check) -> Self {
        self.rules.push(Rule { on, check });
        self
    }

    pub fn presence(self, fields: &[&'static str], on: On) -> Self {
        self.push(on, Check::Presence(fields.to_vec()))
    }

    /// Value must be one of `allowed`; blank values pass.
    pub fn inclusion(self, field: &'static str, allowed: &'static [&'static str], on: On) -> Self {
        self.push(
            on,
            Check::Inclusion {
                field,
                allowed,
                allow_blank: true,
                ignore_case: false,
            },
        )
    }

    /// Like [`inclusion`](Self::inclusion) but blank values fail too.
    pub fn inclusion_required(
        self,
        field: &'static str,
        allowed: &'static [&'static str],
        on: On,
    ) -> Self {
        self.push(
            on,
            Check::Inclusion {
                field,
                allowed,
                allow_blank: false,
                ignore_case: false,
            },
        )
    }

    pub fn inclusion_ignore_case(
        self,
        field: &'static str,
        allowed: &'static [&'static str],
        on: On,
    ) -> Self {
        self.push(
            on,
            Check::Inclusion {
                field,
                allowed,
                allow_blank: true,
                ignore_case: true,
            },
        )
    }

    /// Integers strictly greater than `greater_than`; nulls pass.
    pub fn numericality(self, fields: &[&'static str], greater_than: i64, on: On) -> Self {
        self.push(
            on,
            Check::Numericality {
                fields: fields.to_vec(),
                greater_than,
            },
        )
    }

    pub fn length(self, field: &'static str, maximum: usize, on: On) -> Self {
        self.push(on, Check::Length { field, maximum })
    }

    /// Per-index maximum lengths over an array of titles. Indexes past the
    /// end of `maximums` use the first entry.
    pub fn titles_length(self, field: &'static str, maximums: &[usize], on: On) -> Self {
        self.push(
            on,
            Check::TitlesLength {
                field,
                maximums: maximums.to_vec(),
            },
        )
    }

    pub fn custom(
        self,
        on: On,
        rule: impl Fn(&Attributes, &mut Errors) + Send + Sync + 'static,
    ) -> Self {
        self.push(on, Check::Custom(Arc::new(rule)))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule scoped to `context`.
    pub fn validate(&self, attributes: &Attributes, context: ValidationContext) -> Errors {
        let mut errors = Errors::new();
        for rule in self.rules.iter().filter(|r| r.on.applies(context)) {
            rule.run(attributes, &mut errors);
        }
        errors
    }
}
