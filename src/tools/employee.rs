//! Employee lookup tool.

use crate::error::{Error, Result};
use crate::protocol::{ResultContent, Tool};
use crate::server::{parse_arguments, ToolHandler};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GET_EMPLOYEE_INFO: &str = "get_employee_info";

const FIXED_SALARY: u32 = 5400;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeInfo {
    pub employee_name: String,
    pub salary: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmployeeParams {
    /// Employee name
    pub name: String,
}

#[derive(Default)]
pub struct EmployeeTools;

impl EmployeeTools {
    pub fn get_employee_info(&self, name: &str) -> EmployeeInfo {
        EmployeeInfo {
            employee_name: name.to_string(),
            salary: FIXED_SALARY,
        }
    }
}

#[async_trait]
impl ToolHandler for EmployeeTools {
    fn tools(&self) -> Vec<Tool> {
        vec![Tool::new::<EmployeeParams>(
            GET_EMPLOYEE_INFO,
            Some("Get the salary information of an employee"),
        )]
    }

    async fn execute(&self, name: &str, arguments: Value) -> Result<Vec<ResultContent>> {
        match name {
            GET_EMPLOYEE_INFO => {
                let params: EmployeeParams = parse_arguments(arguments)?;
                Ok(vec![ResultContent::json(&self.get_employee_info(&params.name))?])
            }
            _ => Err(Error::ToolNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_employee_info() {
        let content = EmployeeTools
            .execute(GET_EMPLOYEE_INFO, json!({ "name": "Fatima" }))
            .await
            .unwrap();
        let ResultContent::Text { text } = &content[0];
        let value: Value = serde_json::from_str(text).unwrap();
        assert_eq!(value, json!({ "employee_name": "Fatima", "salary": 5400 }));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = EmployeeTools.execute("fire_employee", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }
}
