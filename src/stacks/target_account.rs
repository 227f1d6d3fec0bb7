//! Roles deployed into the account that CI deploys to.

use serde_json::json;

use super::{
    Stack, CF_EXECUTION_ROLE_ARN_EXPORT, CF_EXECUTION_ROLE_NAME, CROSS_ACCOUNT_ROLE_ARN_EXPORT,
    CROSS_ACCOUNT_ROLE_NAME,
};
use crate::policy::{PolicyDocument, Principal, Statement};
use crate::template::{Expr, Template};

pub const STACK_ID: &str = "CrossAccountRolesStack";
pub const STACK_NAME: &str = "cf-CrossAccountRolesStack";
pub const STACK_DESCRIPTION: &str = "Creates Cross Account Role and Cloudformation Execution Roles";

pub const CF_EXECUTION_ROLE_ID: &str = "GitActionsCFExecutionRole";
pub const CROSS_ACCOUNT_ROLE_ID: &str = "CrossAccountRole";
pub const CF_EXECUTION_ROLE_ARN_OUTPUT: &str = "CFExecutionRoleArn";
pub const CROSS_ACCOUNT_ROLE_ARN_OUTPUT: &str = "CrossAccountRoleArn";

/// Bucket created by the CDK bootstrap stack to stage assets.
pub const CDK_STAGING_BUCKETS: [&str; 2] = [
    "arn:aws:s3:::cdktoolkit-stagingbucket-*",
    "arn:aws:s3:::cdktoolkit-stagingbucket-*/*",
];
/// Roles created by the CDK bootstrap stack in the deploying account.
pub const CDK_BOOTSTRAP_ROLES: &str = "arn:aws:iam::${AWS::AccountId}:role/cdk-hnb659fds-*";

pub fn execution_policy() -> PolicyDocument {
    return PolicyDocument::new(vec![
        Statement::allow(
            &[
                "iam:Get*",
                "iam:List*",
                "iam:*Role*",
                "iam:CreatePolicy",
                "iam:DeletePolicy",
                "iam:*PolicyVersion*",
                "iam:*InstanceProfile*",
            ],
            vec!["*"],
        ),
        Statement::allow(&["s3:*"], vec!["*"]),
        Statement::allow(&["cloudformation:*"], vec!["*"]),
        Statement::allow(&["lambda:*"], vec!["*"]),
        Statement::allow(&["apigateway:*"], vec!["*"]),
        Statement::allow(&["ssm:GetParameter", "ssm:GetParameters"], vec!["*"]),
    ])
    .assign_sids();
}

pub fn cross_account_policy(execution_role_arn: Expr) -> PolicyDocument {
    return PolicyDocument::new(vec![
        Statement::allow(&["iam:PassRole"], vec![execution_role_arn]),
        Statement::allow(&["s3:List*"], vec!["*"]),
        Statement::allow(&["s3:*"], CDK_STAGING_BUCKETS.to_vec()),
        Statement::allow(&["cloudformation:*"], vec!["*"]),
        Statement::allow(&["ssm:GetParameter"], vec!["*"]),
        Statement::allow(&["sts:AssumeRole"], vec![Expr::sub(CDK_BOOTSTRAP_ROLES)]),
    ])
    .assign_sids();
}

/// Trust policy for the cross-account role: the tools account user may
/// assume the role and tag the session.
pub fn cross_account_trust(tools_account_user_arn: &str) -> PolicyDocument {
    let principal = || Principal::Aws(Expr::literal(tools_account_user_arn));
    return PolicyDocument::new(vec![
        Statement::trust(principal(), &["sts:AssumeRole"]),
        Statement::trust(principal(), &["sts:TagSession"]),
    ]);
}

pub fn synthesize(tools_account_user_arn: &str) -> Stack {
    let mut template = Template::new(STACK_DESCRIPTION);

    let execution_role = template.add_resource(
        CF_EXECUTION_ROLE_ID,
        "AWS::IAM::Role",
        json!({
            "AssumeRolePolicyDocument": PolicyDocument::new(vec![Statement::trust(
                Principal::Service(String::from("cloudformation.amazonaws.com")),
                &["sts:AssumeRole"],
            )]),
            "Description": "Role assumed by cloudformation service while creating the required resources",
            "RoleName": CF_EXECUTION_ROLE_NAME,
            "Policies": [{
                "PolicyName": "CFExecutionPolicy",
                "PolicyDocument": execution_policy(),
            }],
        }),
    );
    let execution_role_arn = Expr::get_att(&execution_role, "Arn");

    let cross_account_role = template.add_resource(
        CROSS_ACCOUNT_ROLE_ID,
        "AWS::IAM::Role",
        json!({
            "AssumeRolePolicyDocument": cross_account_trust(tools_account_user_arn),
            "Description": "Cross account role to be assumed by the tools account. Used for CICD deployments only.",
            "RoleName": CROSS_ACCOUNT_ROLE_NAME,
            "Policies": [{
                "PolicyName": "CrossAccountPolicy",
                "PolicyDocument": cross_account_policy(execution_role_arn.clone()),
            }],
        }),
    );

    template.add_output(
        CF_EXECUTION_ROLE_ARN_OUTPUT,
        "Cloudformation Execution Role ARN",
        CF_EXECUTION_ROLE_ARN_EXPORT,
        execution_role_arn,
    );
    template.add_output(
        CROSS_ACCOUNT_ROLE_ARN_OUTPUT,
        "Cross Account Role ARN",
        CROSS_ACCOUNT_ROLE_ARN_EXPORT,
        Expr::get_att(&cross_account_role, "Arn"),
    );

    return Stack {
        id: STACK_ID,
        stack_name: STACK_NAME,
        template,
    };
}
