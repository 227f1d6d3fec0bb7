use crate::template::Template;

pub mod target_account;
pub mod tools_account;

pub const CF_EXECUTION_ROLE_NAME: &str = "git-action-cf-execution-role";
pub const CROSS_ACCOUNT_ROLE_NAME: &str = "git-action-cross-account-role";
pub const DEPLOYMENT_USER_NAME: &str = "git-action-deployment-user";
pub const DEPLOYMENT_USER_SECRET_NAME: &str = "git-action-deployment-user-secret";

pub const CF_EXECUTION_ROLE_ARN_EXPORT: &str = "GIT-ACTIONS-CF-EXECUTION-ROLE-ARN";
pub const CROSS_ACCOUNT_ROLE_ARN_EXPORT: &str = "GIT-ACTIONS-CROSS-ACCOUNT-ROLE-ARN";
pub const DEPLOYMENT_USER_ARN_EXPORT: &str = "GIT-ACTIONS-DEPLOYMENT-USER-ARN";
pub const DEPLOYMENT_USER_ACCESS_KEY_EXPORT: &str = "GIT-ACTIONS-DEPLOYMENT-USER-ACCESS-KEY";
pub const DEPLOYMENT_USER_SECRET_ARN_EXPORT: &str = "GIT-ACTIONS-DEPLOYMENT-USER-SECRET-ARN";

/// A template together with the identity it is deployed under.
#[derive(Debug, Clone)]
pub struct Stack {
    /// Identifier used for the synthesized file name.
    pub id: &'static str,
    /// Name of the CloudFormation stack in the account.
    pub stack_name: &'static str,
    pub template: Template,
}

impl Stack {
    pub fn template_file_name(&self) -> String {
        return format!("{}.template.json", self.id);
    }
}
