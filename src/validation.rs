use crate::data_models::{ContactRecord, Field};
use serde::{Deserialize, Serialize};
use validator::ValidateLength;

pub const NAME_MAX_CHARS: u64 = 32;
pub const MAIL_MAX_CHARS: u64 = 256;
pub const TITLE_MAX_CHARS: u64 = 32;
pub const BODY_MAX_CHARS: u64 = 1000;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Check {
    /// Not empty and not whitespace-only.
    Required,
    /// Character count, inclusive.
    MaxChars(u64),
}

impl Check {
    fn passes(&self, value: &str) -> bool {
        match self {
            Check::Required => !value.trim().is_empty(),
            Check::MaxChars(max) => value.validate_length(None, Some(*max), None),
        }
    }
}

struct Rule {
    field: Field,
    check: Check,
    message: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        field: Field::Name,
        check: Check::Required,
        message: "Name is required.",
    },
    Rule {
        field: Field::Name,
        check: Check::MaxChars(NAME_MAX_CHARS),
        message: "Name must be at most 32 characters.",
    },
    Rule {
        field: Field::Mail,
        check: Check::Required,
        message: "Email address is required.",
    },
    Rule {
        field: Field::Mail,
        check: Check::MaxChars(MAIL_MAX_CHARS),
        message: "Email address must be at most 256 characters.",
    },
    Rule {
        field: Field::Title,
        check: Check::Required,
        message: "Title is required.",
    },
    Rule {
        field: Field::Title,
        check: Check::MaxChars(TITLE_MAX_CHARS),
        message: "Title must be at most 32 characters.",
    },
    Rule {
        field: Field::Body,
        check: Check::Required,
        message: "Inquiry is required.",
    },
    Rule {
        field: Field::Body,
        check: Check::MaxChars(BODY_MAX_CHARS),
        message: "Inquiry must be at most 1000 characters.",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: Field,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }

    /// Messages reported for the field with the given wire name, as used by templates.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|violation| violation.field.as_str() == field)
            .map(|violation| violation.message.as_str())
            .collect()
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .0
            .iter()
            .map(|violation| violation.field.as_str())
            .collect::<Vec<_>>();
        write!(f, "[{}]", fields.join(", "))
    }
}

pub fn validate(record: &ContactRecord) -> Violations {
    let violations = RULES
        .iter()
        .filter(|rule| !rule.check.passes(rule.field.value(record)))
        .map(|rule| Violation {
            field: rule.field,
            message: rule.message.to_string(),
        })
        .collect();
    Violations(violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> ContactRecord {
        ContactRecord::new(
            "Taro Yamada",
            "taro@example.com",
            "Inquiry",
            "Please contact me.",
        )
    }

    fn with_field(field: Field, value: String) -> ContactRecord {
        let mut record = valid_record();
        match field {
            Field::Name => record.name = value,
            Field::Mail => record.mail = value,
            Field::Title => record.title = value,
            Field::Body => record.body = value,
        }
        record
    }

    fn limits() -> [(Field, u64); 4] {
        [
            (Field::Name, NAME_MAX_CHARS),
            (Field::Mail, MAIL_MAX_CHARS),
            (Field::Title, TITLE_MAX_CHARS),
            (Field::Body, BODY_MAX_CHARS),
        ]
    }

    #[test]
    fn test_validation_works() {
        assert!(validate(&valid_record()).is_empty());
    }

    #[test]
    fn test_validation_empty_record_fails_every_field() {
        let violations = validate(&ContactRecord::default());
        assert_eq!(violations.len(), 4);
        for (field, _) in limits() {
            assert!(violations.contains(field), "missing violation for {field}");
        }
    }

    #[test]
    fn test_validation_blank_fails() {
        for (field, _) in limits() {
            for blank in ["", " ", "\t\n", "\u{3000}"] {
                let violations = validate(&with_field(field, blank.to_string()));
                assert_eq!(violations.len(), 1, "{field} = {blank:?}");
                assert!(violations.contains(field));
            }
        }
    }

    #[test]
    fn test_validation_max_length_is_inclusive() {
        for (field, max) in limits() {
            let at_limit = "a".repeat(max as usize);
            assert!(validate(&with_field(field, at_limit)).is_empty(), "{field}");

            let over_limit = "a".repeat(max as usize + 1);
            let violations = validate(&with_field(field, over_limit));
            assert_eq!(violations.len(), 1, "{field}");
            assert!(violations.contains(field));
        }
    }

    #[test]
    fn test_validation_counts_characters_not_bytes() {
        let name = "山".repeat(NAME_MAX_CHARS as usize);
        assert!(name.len() > NAME_MAX_CHARS as usize);
        assert!(validate(&with_field(Field::Name, name)).is_empty());
    }

    #[test]
    fn messages_for_returns_field_messages() {
        let record = with_field(Field::Title, "a".repeat(33));
        let violations = validate(&record);
        assert_eq!(
            violations.messages_for("title"),
            vec!["Title must be at most 32 characters."]
        );
        assert!(violations.messages_for("name").is_empty());
    }

    #[test]
    fn violations_display_names_fields() {
        let violations = validate(&ContactRecord::default());
        assert_eq!(violations.to_string(), "[name, mail, title, body]");
    }
}
