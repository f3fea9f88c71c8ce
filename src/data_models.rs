use serde::{Deserialize, Serialize};

/// Values entered on the contact page.
///
/// Fields missing from a submitted form deserialize as empty strings, which
/// the validator then reports as blank.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl ContactRecord {
    pub fn new(name: &str, mail: &str, title: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            mail: mail.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Mail,
    Title,
    Body,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Mail => "mail",
            Field::Title => "title",
            Field::Body => "body",
        }
    }

    pub fn value<'a>(&self, record: &'a ContactRecord) -> &'a str {
        match self {
            Field::Name => &record.name,
            Field::Mail => &record.mail,
            Field::Title => &record.title,
            Field::Body => &record.body,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
