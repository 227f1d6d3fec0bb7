//! Static check of the mutual reference between the two units' parameters.

use crate::params::{ResolvedParameter, TARGET_ACCOUNT_VARIABLE, TOOLS_ACCOUNT_VARIABLE};
use crate::stacks::{CROSS_ACCOUNT_ROLE_NAME, DEPLOYMENT_USER_NAME};

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// The target unit trusts a user other than the deployment user.
    TrustedUserName(String),
    /// The tools unit may assume a role other than the cross-account role.
    AssumedRoleName(String),
    /// The trusted user's account differs from the tools account number.
    TrustedUserAccount { expected: String, found: String },
    /// The assumed role's account differs from the target account number.
    AssumedRoleAccount { expected: String, found: String },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return match self {
            Mismatch::TrustedUserName(name) => write!(
                f,
                "cross-account role trusts user `{}`, expected `{}`",
                name, DEPLOYMENT_USER_NAME
            ),
            Mismatch::AssumedRoleName(name) => write!(
                f,
                "deployment user may assume role `{}`, expected `{}`",
                name, CROSS_ACCOUNT_ROLE_NAME
            ),
            Mismatch::TrustedUserAccount { expected, found } => write!(
                f,
                "cross-account role trusts a user in account {}, tools account is {}",
                found, expected
            ),
            Mismatch::AssumedRoleAccount { expected, found } => write!(
                f,
                "deployment user may assume a role in account {}, target account is {}",
                found, expected
            ),
        };
    }
}

/// Account numbers taken from the environment, when known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accounts {
    pub tools: Option<String>,
    pub target: Option<String>,
}

impl Accounts {
    pub fn from_env() -> Self {
        return Self::from_lookup(|variable| std::env::var(variable).ok());
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        return Self {
            tools: lookup(TOOLS_ACCOUNT_VARIABLE),
            target: lookup(TARGET_ACCOUNT_VARIABLE),
        };
    }
}

/// `trusted_user` is the target unit's resolved principal, `assumed_role` the
/// tools unit's resolved resource.
pub fn check(
    trusted_user: &ResolvedParameter,
    assumed_role: &ResolvedParameter,
    accounts: &Accounts,
) -> Vec<Mismatch> {
    let mut mismatches = vec![];

    if trusted_user.arn.short_name() != DEPLOYMENT_USER_NAME {
        mismatches.push(Mismatch::TrustedUserName(
            trusted_user.arn.short_name().to_string(),
        ));
    }
    if assumed_role.arn.short_name() != CROSS_ACCOUNT_ROLE_NAME {
        mismatches.push(Mismatch::AssumedRoleName(
            assumed_role.arn.short_name().to_string(),
        ));
    }

    if let Some(tools_account) = &accounts.tools {
        if &trusted_user.arn.account != tools_account {
            mismatches.push(Mismatch::TrustedUserAccount {
                expected: tools_account.clone(),
                found: trusted_user.arn.account.clone(),
            });
        }
    }
    if let Some(target_account) = &accounts.target {
        if &assumed_role.arn.account != target_account {
            mismatches.push(Mismatch::AssumedRoleAccount {
                expected: target_account.clone(),
                found: assumed_role.arn.account.clone(),
            });
        }
    }
    if trusted_user.arn.account == assumed_role.arn.account {
        log::warn!(
            "Both units point at account {}, is this really a cross-account setup?",
            trusted_user.arn.account
        );
    }

    return mismatches;
}
