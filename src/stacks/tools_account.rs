//! The CI identity living in the tools account.

use serde_json::json;

use super::{
    Stack, DEPLOYMENT_USER_ACCESS_KEY_EXPORT, DEPLOYMENT_USER_ARN_EXPORT, DEPLOYMENT_USER_NAME,
    DEPLOYMENT_USER_SECRET_ARN_EXPORT, DEPLOYMENT_USER_SECRET_NAME,
};
use crate::policy::{PolicyDocument, Statement};
use crate::template::{Expr, Template};

pub const STACK_ID: &str = "GitActionDeploymentUserStack";
pub const STACK_NAME: &str = "cf-GitActionDeploymentUserStack";
pub const STACK_DESCRIPTION: &str = "Creates Cross Account Role and Cloudformation Execution Roles";

pub const DEPLOYMENT_USER_ID: &str = "GitActionDeploymentUser";
pub const DEPLOYMENT_USER_POLICY_ID: &str = "GitActionDeploymentUserPolicy";
pub const ACCESS_KEY_ID: &str = "GitActionDeploymentUserAccessKey";
pub const SECRET_ID: &str = "GitActionDeploymentUserSecret";

pub const USER_ARN_OUTPUT: &str = "OutGitActionDeploymentUserArn";
pub const ACCESS_KEY_OUTPUT: &str = "OutGitActionDeploymentUserAccessKey";
pub const SECRET_ARN_OUTPUT: &str = "OutGitActionDeploymentUserSecretArn";

/// The user may only assume the given cross-account role and tag its sessions.
pub fn deployment_user_policy(cross_account_role_arn: &str) -> PolicyDocument {
    return PolicyDocument::new(vec![
        Statement::allow(&["sts:AssumeRole"], vec![cross_account_role_arn])
            .with_sid("CrossAccountAssumeRole"),
        Statement::allow(&["sts:TagSession"], vec!["*"]).with_sid("STSSessionTagging"),
    ]);
}

pub fn synthesize(cross_account_role_arn: &str) -> Stack {
    let mut template = Template::new(STACK_DESCRIPTION);

    let user = template.add_resource(
        DEPLOYMENT_USER_ID,
        "AWS::IAM::User",
        json!({ "UserName": DEPLOYMENT_USER_NAME }),
    );

    template.add_resource(
        DEPLOYMENT_USER_POLICY_ID,
        "AWS::IAM::Policy",
        json!({
            "PolicyName": DEPLOYMENT_USER_POLICY_ID,
            "PolicyDocument": deployment_user_policy(cross_account_role_arn),
            "Users": [Expr::reference(&user)],
        }),
    );

    let access_key = template.add_resource(
        ACCESS_KEY_ID,
        "AWS::IAM::AccessKey",
        json!({ "UserName": Expr::reference(&user) }),
    );

    let secret = template.add_resource(
        SECRET_ID,
        "AWS::SecretsManager::Secret",
        json!({
            "Name": DEPLOYMENT_USER_SECRET_NAME,
            "Description": "Secret for the git action deployment user",
            "SecretString": Expr::get_att(&access_key, "SecretAccessKey"),
        }),
    );

    template.add_output(
        USER_ARN_OUTPUT,
        "Git action deployment user arn",
        DEPLOYMENT_USER_ARN_EXPORT,
        Expr::get_att(&user, "Arn"),
    );
    template.add_output(
        ACCESS_KEY_OUTPUT,
        "Access key for git action deployment user",
        DEPLOYMENT_USER_ACCESS_KEY_EXPORT,
        Expr::reference(&access_key),
    );
    template.add_output(
        SECRET_ARN_OUTPUT,
        "User secret for git action deployment user",
        DEPLOYMENT_USER_SECRET_ARN_EXPORT,
        Expr::reference(&secret),
    );

    return Stack {
        id: STACK_ID,
        stack_name: STACK_NAME,
        template,
    };
}
