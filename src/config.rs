use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};
use validator::{Validate, ValidationError};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Validation errors: {0}")]
    ValidationError(String),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ParameterFile {
    pub location: PathBuf,
}

/// One link: copy `output_key` of a deployed stack into `parameter_key` of a
/// unit's parameter file.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LinkEntry {
    #[validate(required)]
    pub stack_name: Option<String>,

    pub region: Option<String>,

    #[validate(required, length(min = 1))]
    pub output_key: Option<String>,

    #[validate(custom = "validate_json_file")]
    pub parameters: ParameterFile,

    #[validate(required, length(min = 1))]
    pub parameter_key: Option<String>,
}

pub type Config = Vec<LinkEntry>;
pub fn parse(path: &PathBuf) -> Result<Config, Error> {
    let contents = match fs::read_to_string(path) {
        Ok(raw_contents) => Ok(raw_contents),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => Err(Error::FileNotFound(path.display().to_string())),
            _ => Err(Error::Unknown(error.to_string())),
        },
    }?;

    let config: Config = match serde_yaml::from_str(&contents) {
        Ok(data) => Ok(data),
        Err(error) => Err(Error::ParsingError(error.to_string())),
    }?;

    for link_entry in &config {
        match link_entry.validate() {
            Ok(_) => (),
            Err(error) => return Err(Error::ValidationError(error.to_string())),
        }
    }

    return Ok(config);
}

fn validate_json_file(json_file: &ParameterFile) -> Result<(), ValidationError> {
    let file_extension = match json_file.location.extension() {
        Some(extension) => extension,
        None => {
            return Err(ValidationError::new(
                "Unable to parse the extension of the parameter file location",
            ))
        }
    };
    if file_extension != "json" {
        return Err(ValidationError::new(
            "The parameter file location has to end with `.json`",
        ));
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;

    use super::parse;
    use super::Config;
    use super::Error;
    use super::LinkEntry;
    use super::ParameterFile;
    use tempfile::tempdir;

    fn link_entry() -> LinkEntry {
        LinkEntry {
            stack_name: Some(String::from("cf-CrossAccountRolesStack")),
            region: None,
            output_key: Some(String::from("CrossAccountRoleArn")),
            parameters: ParameterFile {
                location: PathBuf::from("tools-account/src/cdk-stack-param.json"),
            },
            parameter_key: Some(String::from("CROSS_ACCOUNT_ROLE_ARN")),
        }
    }

    fn write_config(config: &Config) -> (tempfile::TempDir, PathBuf) {
        let config_contents = serde_yaml::to_string(config).unwrap();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{}", config_contents).unwrap();
        (dir, file_path)
    }

    #[test]
    fn file_does_not_exist() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::FileNotFound(_) => {}
            _ => panic!("Expected `FileNotFound` error"),
        }
    }

    #[test]
    fn file_wrong_format() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "Not yaml").unwrap();

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
        match result.err().unwrap() {
            Error::ParsingError(_) => {}
            _ => panic!("Expected `ParsingError` error"),
        }
    }

    #[test]
    fn file_missing_stack_name() {
        let mut entry = link_entry();
        entry.stack_name = None;
        let (_dir, file_path) = write_config(&vec![entry]);

        let result = parse(&file_path);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn file_parameters_not_json() {
        let mut entry = link_entry();
        entry.parameters.location = PathBuf::from("params.yaml");
        let (_dir, file_path) = write_config(&vec![entry]);

        let result = parse(&file_path);
        match result.err().unwrap() {
            Error::ValidationError(_) => {}
            _ => panic!("Expected `ValidationError` error"),
        }
    }

    #[test]
    fn file_empty_output_key() {
        let mut entry = link_entry();
        entry.output_key = Some(String::new());
        let (_dir, file_path) = write_config(&vec![entry]);

        let result = parse(&file_path);
        assert_eq!(true, result.is_err());
    }

    #[test]
    fn parses_the_config() {
        let (_dir, file_path) = write_config(&vec![link_entry()]);

        let result = parse(&file_path);
        assert_eq!(false, result.is_err());
        let config = result.unwrap();
        assert_eq!(config[0].output_key.as_deref(), Some("CrossAccountRoleArn"));
    }
}
