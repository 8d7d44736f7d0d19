//! `airflow_variable`: a key/value pair.

use airflow_client::Variable;
use serde::{Deserialize, Serialize};

/// Desired attributes of a variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl VariableConfig {
    pub(crate) fn to_wire(&self) -> Variable {
        Variable {
            key: self.key.clone(),
            value: self.value.clone(),
            description: self.description.clone(),
        }
    }
}

/// Observed attributes of a variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableState {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

impl From<Variable> for VariableState {
    fn from(v: Variable) -> Self {
        Self {
            key: v.key,
            value: v.value,
            description: v.description,
        }
    }
}
