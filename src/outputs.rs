use aws_config::meta::region::RegionProviderChain;
use aws_sdk_cloudformation::model::Output;
use aws_types::region::Region;

use crate::config::LinkEntry;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Service error ocurred: {0}.")]
    ServiceError(String),

    #[error("Unknown error ocurred: {0}.")]
    UnknownError(String),

    #[error("Stack {0} not found")]
    NotFoundError(String),

    #[error("Stack {0} has no output named {1}")]
    MissingOutput(String, String),

    #[error("No region configured for stack {0}")]
    MissingRegion(String),
}

pub struct Stack {
    pub stack_name: String,

    client: aws_sdk_cloudformation::Client,
}

impl Stack {
    pub async fn new(stack_name: &str, region: Option<&String>) -> Result<Self, Error> {
        let region = match region {
            Some(provided_region) => Region::new(provided_region.clone()),
            None => match RegionProviderChain::default_provider().region().await {
                Some(region) => region,
                None => return Err(Error::MissingRegion(stack_name.to_string())),
            },
        };
        log::debug!("Using region {:?} for stack {}", region, stack_name);

        let sdk_config = aws_config::from_env().region(region).load().await;
        let client = aws_sdk_cloudformation::Client::new(&sdk_config);

        return Ok(Self {
            stack_name: stack_name.to_string(),
            client,
        });
    }

    pub async fn from_link(link_entry: &LinkEntry) -> Result<Self, Error> {
        let stack_name = link_entry.stack_name.as_deref().unwrap_or_default();
        return Self::new(stack_name, link_entry.region.as_ref()).await;
    }

    pub async fn get_outputs(&self) -> Result<Vec<Output>, Error> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(&self.stack_name)
            .send()
            .await;

        let result = match result {
            Ok(data) => data,
            Err(aws_sdk_cloudformation::types::SdkError::ServiceError { err, .. }) => {
                return Err(Error::ServiceError(err.to_string()));
            }
            Err(err) => return Err(Error::UnknownError(err.to_string())),
        };

        let stack = match result.stacks().unwrap_or_default().first() {
            Some(stack) => stack,
            None => return Err(Error::NotFoundError(self.stack_name.clone())),
        };

        let outputs = stack.outputs().unwrap_or_default().to_vec();
        log::info!(
            "Fetched {} outputs from stack {}",
            outputs.len(),
            self.stack_name
        );

        return Ok(outputs);
    }

    pub async fn get_output_value(&self, output_key: &str) -> Result<String, Error> {
        let outputs = self.get_outputs().await?;
        return find_output(&self.stack_name, &outputs, output_key);
    }
}

pub fn find_output(stack_name: &str, outputs: &[Output], output_key: &str) -> Result<String, Error> {
    return outputs
        .iter()
        .find(|output| output.output_key() == Some(output_key))
        .and_then(|output| output.output_value())
        .map(String::from)
        .ok_or_else(|| Error::MissingOutput(stack_name.to_string(), output_key.to_string()));
}

#[cfg(test)]
mod tests {
    use super::{find_output, Error};
    use aws_sdk_cloudformation::model::Output;

    fn outputs() -> Vec<Output> {
        vec![
            Output::builder()
                .output_key("CFExecutionRoleArn")
                .output_value("arn:aws:iam::444455556666:role/git-action-cf-execution-role")
                .build(),
            Output::builder()
                .output_key("CrossAccountRoleArn")
                .output_value("arn:aws:iam::444455556666:role/git-action-cross-account-role")
                .export_name("GIT-ACTIONS-CROSS-ACCOUNT-ROLE-ARN")
                .build(),
        ]
    }

    #[test]
    fn finds_output_by_key() {
        let value = find_output("cf-CrossAccountRolesStack", &outputs(), "CrossAccountRoleArn");
        assert_eq!(
            value,
            Ok(String::from(
                "arn:aws:iam::444455556666:role/git-action-cross-account-role"
            ))
        );
    }

    #[test]
    fn missing_output_is_reported() {
        let value = find_output("cf-CrossAccountRolesStack", &outputs(), "Nope");
        assert_eq!(
            value,
            Err(Error::MissingOutput(
                String::from("cf-CrossAccountRolesStack"),
                String::from("Nope")
            ))
        );
    }
}
