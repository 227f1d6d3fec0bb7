//! IAM policy documents as they appear inside CloudFormation resource properties

use serde::{Deserialize, Serialize};

use crate::template::Expr;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single value or a list; a one-element list is rendered as the bare value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<&T> {
        return match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values.iter().collect(),
        };
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(mut values: Vec<T>) -> Self {
        if values.len() == 1 {
            return OneOrMany::One(values.remove(0));
        }
        return OneOrMany::Many(values);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Principal {
    #[serde(rename = "AWS")]
    Aws(Expr),
    Service(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: OneOrMany<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany<Expr>>,
}

impl Statement {
    /// An Allow statement over `actions` on `resources`.
    pub fn allow<E: Into<Expr>>(actions: &[&str], resources: Vec<E>) -> Self {
        let resources: Vec<Expr> = resources.into_iter().map(Into::into).collect();
        return Self {
            sid: None,
            effect: Effect::Allow,
            principal: None,
            action: actions
                .iter()
                .map(|action| action.to_string())
                .collect::<Vec<_>>()
                .into(),
            resource: if resources.is_empty() {
                None
            } else {
                Some(resources.into())
            },
        };
    }

    /// A trust-policy statement letting `principal` perform `actions`.
    pub fn trust(principal: Principal, actions: &[&str]) -> Self {
        let mut statement = Self::allow::<Expr>(actions, vec![]);
        statement.principal = Some(principal);
        return statement;
    }

    pub fn with_sid(mut self, sid: &str) -> Self {
        self.sid = Some(sid.to_string());
        return self;
    }

    pub fn actions(&self) -> Vec<&str> {
        return self.action.to_vec().into_iter().map(String::as_str).collect();
    }

    pub fn resources(&self) -> Vec<&Expr> {
        return match &self.resource {
            Some(resource) => resource.to_vec(),
            None => vec![],
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        return Self {
            version: POLICY_VERSION.to_string(),
            statement,
        };
    }

    /// Gives every statement without a Sid its zero-based position as Sid.
    pub fn assign_sids(mut self) -> Self {
        for (index, statement) in self.statement.iter_mut().enumerate() {
            if statement.sid.is_none() {
                statement.sid = Some(index.to_string());
            }
        }
        return self;
    }

    pub fn statements_with_action<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a Statement> {
        return self
            .statement
            .iter()
            .filter(move |statement| statement.actions().contains(&action));
    }
}
