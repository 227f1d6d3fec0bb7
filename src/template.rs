//! CloudFormation template model, serialized the way `aws cloudformation deploy`
//! expects to read it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "2010-09-09";

/// A string-valued template expression: a literal or one of the intrinsics
/// the stacks need.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Expr {
    Literal(String),
    Ref {
        #[serde(rename = "Ref")]
        logical_id: String,
    },
    GetAtt {
        #[serde(rename = "Fn::GetAtt")]
        target: (String, String),
    },
    Sub {
        #[serde(rename = "Fn::Sub")]
        template: String,
    },
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        return Expr::Literal(value.into());
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        return Expr::Ref {
            logical_id: logical_id.into(),
        };
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        return Expr::GetAtt {
            target: (logical_id.into(), attribute.into()),
        };
    }

    pub fn sub(template: impl Into<String>) -> Self {
        return Expr::Sub {
            template: template.into(),
        };
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        return Expr::Literal(value.to_string());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub description: String,
    pub value: Expr,
    pub export: Export,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    pub description: String,
    pub resources: BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        return Self {
            format_version: FORMAT_VERSION.to_string(),
            description: description.into(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        };
    }

    /// Adds a resource and returns its logical id for use in `Ref`/`Fn::GetAtt`.
    pub fn add_resource(
        &mut self,
        logical_id: &str,
        resource_type: &str,
        properties: Value,
    ) -> String {
        self.resources.insert(
            logical_id.to_string(),
            Resource {
                resource_type: resource_type.to_string(),
                properties,
            },
        );
        return logical_id.to_string();
    }

    pub fn add_output(&mut self, logical_id: &str, description: &str, export_name: &str, value: Expr) {
        self.outputs.insert(
            logical_id.to_string(),
            Output {
                description: description.to_string(),
                value,
                export: Export {
                    name: export_name.to_string(),
                },
            },
        );
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        return self.resources.get(logical_id);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        return serde_json::to_string_pretty(self);
    }
}

#[cfg(test)]
mod tests {
    use super::{Expr, Template};
    use serde_json::json;

    #[test]
    fn intrinsics_serialize_as_cloudformation_expects() {
        assert_eq!(serde_json::to_value(Expr::literal("x")).unwrap(), json!("x"));
        assert_eq!(
            serde_json::to_value(Expr::reference("User")).unwrap(),
            json!({ "Ref": "User" })
        );
        assert_eq!(
            serde_json::to_value(Expr::get_att("Role", "Arn")).unwrap(),
            json!({ "Fn::GetAtt": ["Role", "Arn"] })
        );
        assert_eq!(
            serde_json::to_value(Expr::sub("arn:${AWS::Partition}")).unwrap(),
            json!({ "Fn::Sub": "arn:${AWS::Partition}" })
        );
    }

    #[test]
    fn template_layout() {
        let mut template = Template::new("demo");
        let id = template.add_resource("Topic", "AWS::SNS::Topic", json!({}));
        template.add_output("TopicArn", "The topic", "DEMO-TOPIC", Expr::reference(id));

        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(value["AWSTemplateFormatVersion"], json!("2010-09-09"));
        assert_eq!(value["Resources"]["Topic"]["Type"], json!("AWS::SNS::Topic"));
        assert_eq!(
            value["Outputs"]["TopicArn"],
            json!({
                "Description": "The topic",
                "Value": { "Ref": "Topic" },
                "Export": { "Name": "DEMO-TOPIC" }
            })
        );
    }

    #[test]
    fn template_parses_back() {
        let mut template = Template::new("demo");
        template.add_output("Out", "d", "E", Expr::get_att("A", "Arn"));
        let parsed: Template = serde_json::from_str(&template.to_json().unwrap()).unwrap();
        assert_eq!(parsed.outputs["Out"].value, Expr::get_att("A", "Arn"));
    }
}
