use serde_json::{Map, Value};
use std::{env, fs, io, path::Path};

use crate::arn::{IamArn, IamResourceType};

/// What an unset environment variable turns into during substitution.
pub const UNSET_PLACEHOLDER: &str = "undefined";

/// Account number of the tools account, substituted into the target unit.
pub const TOOLS_ACCOUNT_VARIABLE: &str = "TOOLS_ACCOUNT_NUMBER";
/// Account number of the target account, substituted into the tools unit.
pub const TARGET_ACCOUNT_VARIABLE: &str = "TARGET_ACCOUNT_NUMBER";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Parsing error in {0}: {1}")]
    ParsingError(String, String),

    #[error("Key `{1}` missing from {0}")]
    MissingKey(String, String),

    #[error("Validation errors: {0}")]
    ValidationError(String),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}

/// The two deployable units and the parameter each one consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    TargetAccount,
    ToolsAccount,
}

impl Unit {
    pub fn parameter_key(&self) -> &'static str {
        return match self {
            Unit::TargetAccount => "TOOLS_ACCOUNT_USER_ARN",
            Unit::ToolsAccount => "CROSS_ACCOUNT_ROLE_ARN",
        };
    }

    pub fn account_variable(&self) -> &'static str {
        return match self {
            Unit::TargetAccount => TOOLS_ACCOUNT_VARIABLE,
            Unit::ToolsAccount => TARGET_ACCOUNT_VARIABLE,
        };
    }

    pub fn token(&self) -> String {
        return format!("${{{}}}", self.account_variable());
    }

    pub fn expected_type(&self) -> IamResourceType {
        return match self {
            Unit::TargetAccount => IamResourceType::User,
            Unit::ToolsAccount => IamResourceType::Role,
        };
    }

    pub fn default_parameter_file(&self) -> &'static str {
        return match self {
            Unit::TargetAccount => "target-account/src/cdk-stack-param.json",
            Unit::ToolsAccount => "tools-account/src/cdk-stack-param.json",
        };
    }
}

/// A parameter value after substitution and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter {
    /// The substituted string exactly as it will appear in the template.
    pub value: String,
    pub arn: IamArn,
}

pub fn read(path: &Path) -> Result<Map<String, Value>, Error> {
    let contents = match fs::read_to_string(path) {
        Ok(raw_contents) => Ok(raw_contents),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => Err(Error::FileNotFound(path.display().to_string())),
            _ => Err(Error::Unknown(error.to_string())),
        },
    }?;

    let params: Map<String, Value> = match serde_json::from_str(&contents) {
        Ok(data) => Ok(data),
        Err(error) => Err(Error::ParsingError(
            path.display().to_string(),
            error.to_string(),
        )),
    }?;

    return Ok(params);
}

/// Replaces the first occurrence of `token`. An absent value is spliced in as
/// the literal `undefined`, which [`validate`] later rejects.
pub fn substitute(template: &str, token: &str, value: Option<&str>) -> String {
    return template.replacen(token, value.unwrap_or(UNSET_PLACEHOLDER), 1);
}

pub fn validate(value: &str, expected: IamResourceType) -> Result<IamArn, Error> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError(String::from("value is empty")));
    }
    if value.contains("${") {
        return Err(Error::ValidationError(format!(
            "`{}` still contains a template token",
            value
        )));
    }
    if value.contains(UNSET_PLACEHOLDER) {
        return Err(Error::ValidationError(format!(
            "`{}` contains `{}`, is the account number variable set?",
            value, UNSET_PLACEHOLDER
        )));
    }

    let arn = IamArn::parse(value)
        .and_then(|arn| arn.expect_type(expected))
        .map_err(|error| Error::ValidationError(error.to_string()))?;

    return Ok(arn);
}

/// Reads the unit's parameter file and resolves its parameter against the
/// process environment.
pub fn resolve(unit: Unit, path: &Path) -> Result<ResolvedParameter, Error> {
    let account = env::var(unit.account_variable()).ok();
    return resolve_with(unit, path, account.as_deref());
}

pub fn resolve_with(
    unit: Unit,
    path: &Path,
    account: Option<&str>,
) -> Result<ResolvedParameter, Error> {
    let params = read(path)?;
    let template = match params.get(unit.parameter_key()) {
        Some(Value::String(template)) => template,
        Some(other) => {
            return Err(Error::ValidationError(format!(
                "`{}` must be a string, found {}",
                unit.parameter_key(),
                other
            )))
        }
        None => {
            return Err(Error::MissingKey(
                path.display().to_string(),
                unit.parameter_key().to_string(),
            ))
        }
    };

    let token = unit.token();
    let uses_token = template.contains(&token);
    if uses_token && account.is_none() {
        log::warn!(
            "{} is not set, substituting `{}` into {}",
            unit.account_variable(),
            UNSET_PLACEHOLDER,
            unit.parameter_key()
        );
    }

    let value = substitute(template, &token, account);
    log::debug!("{} resolved to {}", unit.parameter_key(), value);

    let arn = validate(&value, unit.expected_type())?;

    return Ok(ResolvedParameter { value, arn });
}
