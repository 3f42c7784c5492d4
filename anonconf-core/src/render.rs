//! Anonimatron XML rendering.
//!
//! The template is checked against the variables that will be supplied
//! before anything is rendered: every top-level name it references must be
//! provided, otherwise [`check_template`] fails listing all missing names.
//! Interpolated values are escaped for use inside XML attributes.

use crate::adapters::ConnectionConfig;
use crate::models::TableDescriptor;
use crate::{AnonConfError, Result};
use minijinja::{Environment, ErrorKind, Output, State, UndefinedBehavior, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Template shipped with the tool.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/anonimatron.xml.j2");

const TEMPLATE_NAME: &str = "anonimatron.xml";

/// Named values handed to the template.
pub type TemplateVariables = BTreeMap<String, Value>;

/// The values the default template consumes.
#[derive(Debug, Clone)]
pub struct ConfigVariables {
    /// Host part of the JDBC URL (`host` or `host:port`)
    pub host: String,
    /// Database name
    pub database: String,
    /// Login role
    pub user: String,
    /// Login password, XML-attribute escaped when rendered
    pub password: String,
    /// Tables to anonymize
    pub tables: Vec<TableDescriptor>,
}

impl ConfigVariables {
    /// Variables for the database described by `connection`.
    pub fn new(connection: &ConnectionConfig, tables: Vec<TableDescriptor>) -> Self {
        Self {
            host: connection.jdbc_authority(),
            database: connection.database.clone(),
            user: connection.user.clone(),
            password: connection.password().to_string(),
            tables,
        }
    }

    /// Converts into the name/value map the template is rendered with.
    pub fn into_template_variables(self) -> TemplateVariables {
        BTreeMap::from([
            ("host".to_string(), Value::from(self.host)),
            ("database".to_string(), Value::from(self.database)),
            ("user".to_string(), Value::from(self.user)),
            ("password".to_string(), Value::from(self.password)),
            ("tables".to_string(), Value::from_serialize(&self.tables)),
        ])
    }
}

/// A parsed template known to be satisfiable by a given variable set.
#[derive(Debug)]
pub struct ConfigTemplate {
    env: Environment<'static>,
}

/// Parses `body` and verifies every variable it references is provided.
///
/// # Errors
/// Returns a template error on a syntax error, and a template validation
/// error listing every missing variable otherwise.
pub fn check_template(
    body: &str,
    provided_variables: &TemplateVariables,
) -> Result<ConfigTemplate> {
    let mut env = environment();
    env.add_template_owned(TEMPLATE_NAME, body.to_string())
        .map_err(|e| AnonConfError::template("Failed to parse template", e))?;

    let missing = {
        let template = env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| AnonConfError::template("Failed to load template", e))?;

        let mut missing: Vec<String> = template
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !provided_variables.contains_key(name))
            .collect();
        missing.sort();
        missing
    };

    if !missing.is_empty() {
        tracing::error!("Template references undefined variables: {:?}", missing);
        return Err(AnonConfError::TemplateValidation {
            missing,
            provided: provided_variables.keys().cloned().collect(),
        });
    }

    Ok(ConfigTemplate { env })
}

impl ConfigTemplate {
    /// Renders the configuration.
    ///
    /// `tables` and each table's `columns` are iterated in the order given.
    ///
    /// # Errors
    /// Returns a template error if rendering fails, e.g. on access to an
    /// attribute the data does not have.
    pub fn render(&self, variables: &TemplateVariables) -> Result<String> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| AnonConfError::template("Failed to load template", e))?;
        template
            .render(variables)
            .map_err(|e| AnonConfError::template("Failed to render template", e))
    }
}

/// Reads the template at `path`, or returns the built-in template.
///
/// # Errors
/// Returns a configuration error if the file cannot be read.
pub fn load_template_body(path: Option<&Path>) -> Result<Cow<'static, str>> {
    match path {
        None => Ok(Cow::Borrowed(DEFAULT_TEMPLATE)),
        Some(path) => std::fs::read_to_string(path).map(Cow::Owned).map_err(|e| {
            AnonConfError::configuration(format!(
                "Failed to read template {}: {e}",
                path.display()
            ))
        }),
    }
}

/// Escapes `value` for use inside a double- or single-quoted XML attribute.
pub fn escape_xml_attribute(value: &str) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'' | '\t' | '\n' | '\r'))
    {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len().saturating_add(16));
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' => escaped.push_str("&#x9;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_formatter(xml_attribute_formatter);
    env
}

fn xml_attribute_formatter(
    out: &mut Output<'_>,
    _state: &State<'_, '_>,
    value: &Value,
) -> std::result::Result<(), minijinja::Error> {
    let written = if value.is_safe() {
        write!(out, "{value}")
    } else if let Some(s) = value.as_str() {
        out.write_str(&escape_xml_attribute(s))
    } else {
        out.write_str(&escape_xml_attribute(&value.to_string()))
    };
    written.map_err(|_| {
        minijinja::Error::new(ErrorKind::WriteFailure, "failed to write template output")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnonymizationType, ColumnDescriptor, UNSPECIFIED_SIZE};

    fn column(name: &str, anon_type: AnonymizationType) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            db_data_type: "character varying".to_string(),
            anon_type,
            anon_size: UNSPECIFIED_SIZE,
            primary_key: false,
        }
    }

    fn variables(tables: Vec<TableDescriptor>) -> TemplateVariables {
        let connection = ConnectionConfig::new("localhost", "foreman", "foreman", "foreman");
        ConfigVariables::new(&connection, tables).into_template_variables()
    }

    fn render_default(variables: &TemplateVariables) -> String {
        check_template(DEFAULT_TEMPLATE, variables)
            .unwrap()
            .render(variables)
            .unwrap()
    }

    #[test]
    fn test_missing_tables_fails_before_rendering() {
        let mut provided = variables(Vec::new());
        provided.remove("tables");

        let error = check_template(DEFAULT_TEMPLATE, &provided).unwrap_err();

        match &error {
            AnonConfError::TemplateValidation { missing, provided } => {
                assert_eq!(missing, &["tables"]);
                assert_eq!(provided, &["database", "host", "password", "user"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(error.to_string().contains("missing variables tables"));
    }

    #[test]
    fn test_every_missing_variable_is_named() {
        let error = check_template(DEFAULT_TEMPLATE, &TemplateVariables::new()).unwrap_err();

        assert!(
            error
                .to_string()
                .contains("missing variables database,host,password,tables,user")
        );
    }

    #[test]
    fn test_loop_variables_are_not_required() {
        let body = "{% for t in tables %}{{ t.name }}{% endfor %}";
        let provided = BTreeMap::from([(
            "tables".to_string(),
            Value::from_serialize(Vec::<u8>::new()),
        )]);

        assert!(check_template(body, &provided).is_ok());
    }

    #[test]
    fn test_syntax_error_is_template_error() {
        let error =
            check_template("{% for table in tables %}", &variables(Vec::new())).unwrap_err();
        assert!(matches!(error, AnonConfError::Template { .. }));
    }

    #[test]
    fn test_render_default_template() {
        let tables = vec![
            TableDescriptor {
                name: "auth_sources".to_string(),
                columns: vec![column("attr_mail", AnonymizationType::EmailAddress)],
            },
            TableDescriptor {
                name: "users".to_string(),
                columns: vec![
                    column("login", AnonymizationType::String),
                    column("mail", AnonymizationType::String),
                ],
            },
        ];

        let xml = render_default(&variables(tables));

        let expected = r#"<configuration salt="somethingsalty" jdbcurl="jdbc:postgresql://localhost/foreman" userid="foreman" password="foreman">
    <anonymizerclass>nz.billryder.anonimatron.anonymizer.DomainAnonymizer</anonymizerclass>
    <table name="auth_sources">
        <column name="attr_mail" type="EMAIL_ADDRESS" size="-1"/>
    </table>
    <table name="users">
        <column name="login" type="STRING" size="-1"/>
        <column name="mail" type="STRING" size="-1"/>
    </table>
</configuration>"#;
        assert_eq!(xml.trim_end(), expected);
    }

    #[test]
    fn test_render_without_tables() {
        let xml = render_default(&variables(Vec::new()));

        assert!(xml.contains("<anonymizerclass>"));
        assert!(!xml.contains("<table"));
        assert!(xml.trim_end().ends_with("</configuration>"));
    }

    #[test]
    fn test_render_uses_port_in_jdbc_url() {
        let connection =
            ConnectionConfig::new("db.internal", "foreman", "foreman", "foreman").with_port(6432);
        let variables = ConfigVariables::new(&connection, Vec::new()).into_template_variables();

        let xml = render_default(&variables);
        assert!(xml.contains(r#"jdbcurl="jdbc:postgresql://db.internal:6432/foreman""#));
    }

    #[test]
    fn test_render_escapes_attribute_values() {
        let connection = ConnectionConfig::new("localhost", "foreman", "foreman", r#"p"w<&'d"#);
        let tables = vec![TableDescriptor {
            name: "odd\"table".to_string(),
            columns: vec![column("a<b", AnonymizationType::String)],
        }];
        let variables = ConfigVariables::new(&connection, tables).into_template_variables();

        let xml = render_default(&variables);

        assert!(xml.contains(r#"password="p&quot;w&lt;&amp;&apos;d""#));
        assert!(xml.contains(r#"<table name="odd&quot;table">"#));
        assert!(xml.contains(r#"<column name="a&lt;b""#));
    }

    #[test]
    fn test_undefined_attribute_is_render_error() {
        let body = "{% for table in tables %}{{ table.nmae }}{% endfor %}";
        let variables = variables(vec![TableDescriptor {
            name: "users".to_string(),
            columns: vec![column("login", AnonymizationType::String)],
        }]);

        let template = check_template(body, &variables).unwrap();
        let error = template.render(&variables).unwrap_err();
        assert!(matches!(error, AnonConfError::Template { .. }));
    }

    #[test]
    fn test_escape_xml_attribute() {
        assert_eq!(escape_xml_attribute("plain_name"), "plain_name");
        assert!(matches!(escape_xml_attribute("plain"), Cow::Borrowed(_)));
        assert_eq!(
            escape_xml_attribute("a&b<c>d\"e'f"),
            "a&amp;b&lt;c&gt;d&quot;e&apos;f"
        );
        assert_eq!(escape_xml_attribute("line\nbreak\t"), "line&#xA;break&#x9;");
    }

    #[test]
    fn test_load_template_body() {
        assert_eq!(load_template_body(None).unwrap(), DEFAULT_TEMPLATE);

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "<configuration/>").unwrap();
        assert_eq!(load_template_body(Some(file.path())).unwrap(), "<configuration/>");

        let error = load_template_body(Some(Path::new("/nonexistent/template.xml"))).unwrap_err();
        assert!(error.to_string().contains("template.xml"));
    }
}
