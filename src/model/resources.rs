use super::{validate_name, Metadata, Resource, ResourceKind};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// Reference to another resource by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionReference {
    pub name: String,
}

impl FunctionReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    /// Environment the function runs in.
    pub environment: FunctionReference,
    /// Function source, usually base64 encoded by the CLI.
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub metadata: Metadata,
    pub spec: FunctionSpec,
}

impl Function {
    pub fn new(name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::new(name),
            spec: FunctionSpec {
                environment: FunctionReference::new(environment),
                code: String::new(),
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.spec.code = code.into();
        self
    }
}

impl Resource for Function {
    const KIND: ResourceKind = ResourceKind::Function;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn validate_spec(&self) -> Result<(), ApiError> {
        validate_name(ResourceKind::Environment, &self.spec.environment.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpTriggerSpec {
    pub url_pattern: String,
    pub method: String,
    pub function: FunctionReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTrigger {
    pub metadata: Metadata,
    pub spec: HttpTriggerSpec,
}

impl HttpTrigger {
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        url_pattern: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            metadata: Metadata::new(name),
            spec: HttpTriggerSpec {
                url_pattern: url_pattern.into(),
                method: method.into(),
                function: FunctionReference::new(function),
            },
        }
    }
}

const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

impl Resource for HttpTrigger {
    const KIND: ResourceKind = ResourceKind::HttpTrigger;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn validate_spec(&self) -> Result<(), ApiError> {
        if !HTTP_METHODS.contains(&self.spec.method.to_uppercase().as_str()) {
            return Err(ApiError::invalid_argument(format!(
                "invalid HTTP method '{}'",
                self.spec.method
            )));
        }
        if !self.spec.url_pattern.starts_with('/') {
            return Err(ApiError::invalid_argument(format!(
                "URL pattern '{}' must start with '/'",
                self.spec.url_pattern
            )));
        }
        validate_name(ResourceKind::Function, &self.spec.function.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTriggerSpec {
    pub cron: String,
    pub function: FunctionReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTrigger {
    pub metadata: Metadata,
    pub spec: TimeTriggerSpec,
}

impl TimeTrigger {
    pub fn new(
        name: impl Into<String>,
        cron: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            metadata: Metadata::new(name),
            spec: TimeTriggerSpec {
                cron: cron.into(),
                function: FunctionReference::new(function),
            },
        }
    }
}

impl Resource for TimeTrigger {
    const KIND: ResourceKind = ResourceKind::TimeTrigger;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn validate_spec(&self) -> Result<(), ApiError> {
        let cron = self.spec.cron.trim();
        // Descriptors such as "@every 1m" or "@hourly" pass through to the scheduler.
        let fields = cron.split_whitespace().count();
        if !cron.starts_with('@') && !(5..=6).contains(&fields) {
            return Err(ApiError::invalid_argument(format!(
                "invalid cron spec '{}': expected 5 or 6 fields",
                self.spec.cron
            )));
        }
        validate_name(ResourceKind::Function, &self.spec.function.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSpec {
    pub run_container_image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub metadata: Metadata,
    pub spec: EnvironmentSpec,
}

impl Environment {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::new(name),
            spec: EnvironmentSpec {
                run_container_image_url: image.into(),
            },
        }
    }
}

impl Resource for Environment {
    const KIND: ResourceKind = ResourceKind::Environment;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn validate_spec(&self) -> Result<(), ApiError> {
        if self.spec.run_container_image_url.trim().is_empty() {
            return Err(ApiError::invalid_argument(
                "environment image URL must not be empty",
            ));
        }
        Ok(())
    }
}

/// Kubernetes object watch that invokes a function on changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSpec {
    #[serde(default)]
    pub namespace: String,
    pub obj_type: String,
    #[serde(default)]
    pub label_selector: String,
    #[serde(default)]
    pub field_selector: String,
    pub function: FunctionReference,
    #[serde(default)]
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watch {
    pub metadata: Metadata,
    pub spec: WatchSpec,
}

impl Watch {
    pub fn new(
        name: impl Into<String>,
        obj_type: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            metadata: Metadata::new(name),
            spec: WatchSpec {
                obj_type: obj_type.into(),
                function: FunctionReference::new(function),
                ..Default::default()
            },
        }
    }
}

impl Resource for Watch {
    const KIND: ResourceKind = ResourceKind::Watch;

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn validate_spec(&self) -> Result<(), ApiError> {
        if self.spec.obj_type.trim().is_empty() {
            return Err(ApiError::invalid_argument("watch object type must not be empty"));
        }
        validate_name(ResourceKind::Function, &self.spec.function.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_validation() {
        assert!(Function::new("hello", "nodejs").validate().is_ok());
        assert!(Function::new("hello", "").validate().is_err());
        assert!(Function::new("Hello", "nodejs").validate().is_err());
    }

    #[test]
    fn test_http_trigger_validation() {
        assert!(HttpTrigger::new("t1", "get", "/hello", "hello").validate().is_ok());
        assert!(HttpTrigger::new("t1", "FETCH", "/hello", "hello").validate().is_err());
        assert!(HttpTrigger::new("t1", "GET", "hello", "hello").validate().is_err());
    }

    #[test]
    fn test_time_trigger_validation() {
        assert!(TimeTrigger::new("tt", "*/5 * * * *", "hello").validate().is_ok());
        assert!(TimeTrigger::new("tt", "0 */5 * * * *", "hello").validate().is_ok());
        assert!(TimeTrigger::new("tt", "@every 1m", "hello").validate().is_ok());
        assert!(TimeTrigger::new("tt", "* *", "hello").validate().is_err());
    }

    #[test]
    fn test_environment_validation() {
        assert!(Environment::new("nodejs", "fission/node-env").validate().is_ok());
        assert!(Environment::new("nodejs", " ").validate().is_err());
    }

    #[test]
    fn test_watch_wire_format() {
        let json = r#"{
            "metadata": {"name": "pods"},
            "spec": {"objType": "pod", "function": {"name": "hello"}}
        }"#;
        let watch: Watch = serde_json::from_str(json).unwrap();
        assert_eq!(watch.spec.obj_type, "pod");
        assert!(watch.spec.namespace.is_empty());
        assert!(watch.validate().is_ok());
    }
}
