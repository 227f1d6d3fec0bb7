#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Invalid ARN `{0}`: {1}")]
    Malformed(String, String),

    #[error("Unsupported service `{1}` in ARN `{0}`, expected `iam`")]
    UnsupportedService(String, String),

    #[error("Expected an IAM {1} ARN, found `{0}`")]
    WrongResourceType(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IamResourceType {
    Role,
    User,
}

impl IamResourceType {
    pub fn as_str(&self) -> &'static str {
        return match self {
            IamResourceType::Role => "role",
            IamResourceType::User => "user",
        };
    }
}

/// A parsed IAM principal ARN: `arn:<partition>:iam::<account>:<type>/<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamArn {
    pub partition: String,
    pub account: String,
    pub resource_type: IamResourceType,
    /// Everything after the resource type, including any path.
    pub name: String,
}

impl IamArn {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let malformed = |reason: &str| Error::Malformed(raw.to_string(), reason.to_string());

        // The resource part may itself contain colons.
        let parts: Vec<&str> = raw.splitn(6, ':').collect();
        if parts.len() < 6 {
            return Err(malformed("expected 6 colon-separated parts"));
        }
        if parts[0] != "arn" {
            return Err(malformed("must start with `arn:`"));
        }

        let partition = parts[1];
        if !matches!(partition, "aws" | "aws-cn" | "aws-us-gov") {
            return Err(malformed("unknown partition"));
        }
        if parts[2] != "iam" {
            return Err(Error::UnsupportedService(
                raw.to_string(),
                parts[2].to_string(),
            ));
        }
        if !parts[3].is_empty() {
            return Err(malformed("IAM ARNs carry no region"));
        }

        let account = parts[4];
        if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed("account must be 12 digits"));
        }

        let (resource_type, name) = match parts[5].split_once('/') {
            Some(("role", name)) => (IamResourceType::Role, name),
            Some(("user", name)) => (IamResourceType::User, name),
            Some((other, _)) => {
                return Err(malformed(&format!("unsupported resource type `{}`", other)))
            }
            None => return Err(malformed("expected `<type>/<name>` resource")),
        };
        if name.is_empty() {
            return Err(malformed("empty resource name"));
        }

        return Ok(Self {
            partition: partition.to_string(),
            account: account.to_string(),
            resource_type,
            name: name.to_string(),
        });
    }

    pub fn expect_type(self, expected: IamResourceType) -> Result<Self, Error> {
        if self.resource_type != expected {
            return Err(Error::WrongResourceType(
                self.to_string(),
                expected.as_str().to_string(),
            ));
        }
        return Ok(self);
    }

    /// Last path segment, i.e. the user or role name proper.
    pub fn short_name(&self) -> &str {
        return self.name.rsplit('/').next().unwrap_or(&self.name);
    }
}

impl std::fmt::Display for IamArn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(
            f,
            "arn:{}:iam::{}:{}/{}",
            self.partition,
            self.account,
            self.resource_type.as_str(),
            self.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, IamArn, IamResourceType};

    #[test]
    fn parses_user_arn() {
        let arn = IamArn::parse("arn:aws:iam::111122223333:user/git-action-deployment-user").unwrap();
        assert_eq!(arn.account, "111122223333");
        assert_eq!(arn.resource_type, IamResourceType::User);
        assert_eq!(arn.short_name(), "git-action-deployment-user");
    }

    #[test]
    fn parses_role_arn_with_path() {
        let arn = IamArn::parse("arn:aws:iam::111122223333:role/ci/deployer").unwrap();
        assert_eq!(arn.name, "ci/deployer");
        assert_eq!(arn.short_name(), "deployer");
        assert_eq!(arn.to_string(), "arn:aws:iam::111122223333:role/ci/deployer");
    }

    #[test]
    fn rejects_undefined_account() {
        let result = IamArn::parse("arn:aws:iam::undefined:user/git-action-deployment-user");
        match result.err().unwrap() {
            Error::Malformed(_, reason) => assert!(reason.contains("12 digits")),
            _ => panic!("Expected `Malformed` error"),
        }
    }

    #[test]
    fn rejects_non_iam_service() {
        let result = IamArn::parse("arn:aws:s3:::some-bucket/key");
        match result.err().unwrap() {
            Error::UnsupportedService(_, service) => assert_eq!(service, "s3"),
            _ => panic!("Expected `UnsupportedService` error"),
        }
    }

    #[test]
    fn rejects_wrong_resource_type() {
        let arn = IamArn::parse("arn:aws:iam::111122223333:role/some-role").unwrap();
        let result = arn.expect_type(IamResourceType::User);
        assert_eq!(
            result.err().unwrap(),
            Error::WrongResourceType(
                String::from("arn:aws:iam::111122223333:role/some-role"),
                String::from("user")
            )
        );
    }

    #[test]
    fn rejects_short_input() {
        assert_eq!(true, IamArn::parse("not-an-arn").is_err());
        assert_eq!(true, IamArn::parse("arn:aws:iam::111122223333:root").is_err());
    }
}
