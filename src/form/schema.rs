//! Declarative validation for form values.
//!
//! A [`Schema`] lists the fields it knows; validation reports the first
//! failing rule per field and returns only the fields it knows about.

use serde_json::Value;

use super::{FieldErrors, FormValues};

pub const REQUIRED: &str = "Required";

pub trait Validate: Send + Sync {
    /// Normalized values, or one message per failing field
    fn validate(&self, values: &FormValues) -> std::result::Result<FormValues, FieldErrors>;
}

#[derive(Debug, Clone, PartialEq)]
enum Check {
    MinLength(usize, String),
    Email(String),
    Url(String),
}

impl Check {
    fn failure(&self, text: &str) -> Option<&str> {
        match self {
            Check::MinLength(n, message) => (text.chars().count() < *n).then_some(message.as_str()),
            Check::Email(message) => (!is_email(text)).then_some(message.as_str()),
            Check::Url(message) => url::Url::parse(text).is_err().then_some(message.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Text { optional: bool, checks: Vec<Check> },
    Boolean { default: Option<bool> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    kind: Kind,
}

impl FieldRule {
    pub fn string() -> Self {
        Self {
            kind: Kind::Text {
                optional: false,
                checks: Vec::new(),
            },
        }
    }

    pub fn boolean() -> Self {
        Self {
            kind: Kind::Boolean { default: None },
        }
    }

    /// Absent or null passes and is left out of the output
    pub fn optional(mut self) -> Self {
        if let Kind::Text { optional, .. } = &mut self.kind {
            *optional = true;
        }
        self
    }

    pub fn min(self, length: usize, message: impl Into<String>) -> Self {
        self.check(Check::MinLength(length, message.into()))
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.check(Check::Email(message.into()))
    }

    pub fn url(self, message: impl Into<String>) -> Self {
        self.check(Check::Url(message.into()))
    }

    pub fn default(mut self, value: bool) -> Self {
        if let Kind::Boolean { default } = &mut self.kind {
            *default = Some(value);
        }
        self
    }

    fn check(mut self, check: Check) -> Self {
        if let Kind::Text { checks, .. } = &mut self.kind {
            checks.push(check);
        }
        self
    }

    /// `Ok(None)` means the field is absent and allowed to be
    fn apply(&self, value: Option<&Value>) -> std::result::Result<Option<Value>, String> {
        let value = value.filter(|v| !v.is_null());
        match &self.kind {
            Kind::Text { optional, checks } => {
                let text = match value {
                    None if *optional => return Ok(None),
                    None => return Err(REQUIRED.to_string()),
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(_) => return Err("Expected text".to_string()),
                };
                match checks.iter().find_map(|c| c.failure(&text)) {
                    Some(message) => Err(message.to_string()),
                    None => Ok(Some(Value::String(text))),
                }
            }
            Kind::Boolean { default } => match value {
                Some(Value::Bool(b)) => Ok(Some(Value::Bool(*b))),
                None => default
                    .map(|b| Some(Value::Bool(b)))
                    .ok_or_else(|| REQUIRED.to_string()),
                Some(_) => Err("Expected true or false".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    pub fn knows(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }
}

impl Validate for Schema {
    fn validate(&self, values: &FormValues) -> std::result::Result<FormValues, FieldErrors> {
        let mut output = FormValues::new();
        let mut errors = FieldErrors::new();
        for (name, rule) in &self.fields {
            match rule.apply(values.get(name)) {
                Ok(Some(value)) => {
                    output.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(message) => {
                    errors.insert(name.clone(), message);
                }
            }
        }
        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }
}

/// Loose address check: something@domain.tld, no whitespace
pub fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    labels.clone().count() >= 2 && labels.all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap()
    }

    fn user_schema() -> Schema {
        Schema::new()
            .field("nome", FieldRule::string().min(1, "Name is required"))
            .field("email", FieldRule::string().email("Invalid email"))
            .field("senha", FieldRule::string().min(6, "Password must have at least 6 characters"))
            .field("ativo", FieldRule::boolean().default(true))
    }

    #[test]
    fn reports_first_failure_per_field() {
        let errors = user_schema()
            .validate(&values(json!({"nome": "", "email": "nope", "senha": "123"})))
            .unwrap_err();
        assert_eq!(errors["nome"], "Name is required");
        assert_eq!(errors["email"], "Invalid email");
        assert_eq!(errors["senha"], "Password must have at least 6 characters");
        assert!(!errors.contains_key("ativo"));
    }

    #[test]
    fn missing_text_is_required() {
        let errors = user_schema().validate(&FormValues::new()).unwrap_err();
        assert_eq!(errors["nome"], REQUIRED);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn normalizes_and_strips_unknown_keys() {
        let out = user_schema()
            .validate(&values(json!({
                "nome": "Maria", "email": "maria@empresa.com", "senha": "segredo", "extra": 1
            })))
            .unwrap();
        assert_eq!(out["ativo"], json!(true));
        assert!(!out.contains_key("extra"));
    }

    #[test]
    fn url_and_optional_rules() {
        let schema = Schema::new()
            .field("url", FieldRule::string().url("Invalid URL").min(1, "URL is required"))
            .field("descricao", FieldRule::string().optional())
            .field("ordem", FieldRule::string().min(1, "Order is required"));
        let errors = schema
            .validate(&values(json!({"url": "powerbi", "ordem": 3})))
            .unwrap_err();
        assert_eq!(errors["url"], "Invalid URL");
        assert!(!errors.contains_key("ordem"));

        let ok = schema
            .validate(&values(json!({"url": "https://app.powerbi.com/r", "ordem": "1"})))
            .unwrap();
        assert!(!ok.contains_key("descricao"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("admin@empresa.com"));
        assert!(!is_email("admin@empresa"));
        assert!(!is_email("@empresa.com"));
        assert!(!is_email("a b@empresa.com"));
        assert!(!is_email("a@b@c.com"));
    }
}
