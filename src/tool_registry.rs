use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::schema;
use crate::types::{FunctionDeclaration, ToolCall, ToolDefinition};

/// Result string sent back when the model names a function we never registered.
pub const FUNCTION_NOT_FOUND: &str = "function not found";

pub type ToolHandler = Arc<dyn Fn(&Map<String, Value>) -> Result<String, String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Ok,
    UnknownFunction,
    InvalidArguments,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub kind: OutcomeKind,
    pub result: String,
}

impl ToolOutcome {
    fn new(kind: OutcomeKind, result: String) -> Self {
        Self { kind, result }
    }
}

#[derive(Clone)]
struct RegisteredTool {
    declaration: FunctionDeclaration,
    handler: ToolHandler,
}

/// Allow-list of functions the model may invoke. Names from the model are
/// only ever looked up here.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    order: Vec<String>,
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(
            crate::tools::get_current_weather_declaration(),
            crate::tools::get_current_weather,
        );
        registry
    }

    /// Registers a function, replacing any earlier one with the same name.
    pub fn register<F>(&mut self, declaration: FunctionDeclaration, handler: F)
    where
        F: Fn(&Map<String, Value>) -> Result<String, String> + Send + Sync + 'static,
    {
        let name = declaration.name.clone();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(
            name,
            RegisteredTool {
                declaration,
                handler: Arc::new(handler),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Declarations in registration order, wrapped as "function" tools.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| ToolDefinition::from(t.declaration.clone()))
            .collect()
    }

    /// Decodes and runs one tool call. Never fails: unknown functions, bad
    /// arguments and handler errors all become result strings for the model.
    pub fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let name = call.function.name.as_str();
        let Some(tool) = self.tools.get(name) else {
            warn!(function = name, "model requested an unregistered function");
            return ToolOutcome::new(OutcomeKind::UnknownFunction, FUNCTION_NOT_FOUND.to_string());
        };

        let args = match decode_arguments(&call.function.arguments, &tool.declaration.parameters) {
            Ok(args) => args,
            Err(e) => {
                warn!(function = name, error = %e, "rejected tool arguments");
                return ToolOutcome::new(
                    OutcomeKind::InvalidArguments,
                    format!("Error: invalid arguments for {}: {}", name, e),
                );
            }
        };

        let shown = Value::Object(args.clone());
        debug!(function = name, args = %shown, "invoking tool");
        match (tool.handler)(&args) {
            Ok(result) => ToolOutcome::new(OutcomeKind::Ok, result),
            Err(e) => ToolOutcome::new(OutcomeKind::Failed, format!("Error: {}", e)),
        }
    }
}

fn decode_arguments(raw: &str, parameters: &Value) -> Result<Map<String, Value>, String> {
    // Some models send "" for zero-argument calls
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("not valid JSON ({})", e))?;
    let Value::Object(mut args) = value else {
        return Err("expected a JSON object".to_string());
    };
    schema::apply_defaults(&mut args, parameters);
    schema::validate(&Value::Object(args.clone()), parameters)?;
    Ok(args)
}
