//! Lambda façade
//!
//! The user-facing object owning a self symbol, the canonical source text,
//! and the currently bound compiled unit. Construction happens exactly once
//! through a tagged [`Definition`]; `compile` may rebind the unit any number
//! of times afterwards, and serialization always reflects the most recent
//! binding.

use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::ast::{ExpressionNode, Statement};
use crate::error::{LambdaError, Result};
use crate::evaluator::{EvalError, Scope, evaluate_block, evaluate_expression};
use crate::parser;
use crate::parser::{BodyKind, ParseError, RestParam, parse_signature};
use crate::value::{NativeCallable, Value};

/// Default identifier for the implicit context parameter
///
/// Read at construction time; per-instance overrides never write back here.
pub const DEFAULT_SELF_SYMBOL: &str = "$";

/// Configuration value for constructing a lambda from data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaConfig {
    /// The definition text
    pub expression: String,
    /// Override for the implicit context parameter name
    #[serde(rename = "selfSymbol", default, skip_serializing_if = "Option::is_none")]
    pub self_symbol: Option<String>,
}

/// The construction forms a lambda can be built from
///
/// Dispatched exactly once, at construction; later operations never probe
/// the originating form.
#[derive(Debug, Clone)]
pub enum Definition {
    /// No definition: the identity unit
    Empty,
    /// Expression text, compiled with the default self symbol
    Expression(String),
    /// Configuration value with expression and optional self symbol
    Config(LambdaConfig),
    /// Passthrough native callable, used as-is without recompilation
    Native(NativeCallable),
}

impl From<&str> for Definition {
    fn from(text: &str) -> Self {
        Definition::Expression(text.to_string())
    }
}

impl From<String> for Definition {
    fn from(text: String) -> Self {
        Definition::Expression(text)
    }
}

impl From<LambdaConfig> for Definition {
    fn from(config: LambdaConfig) -> Self {
        Definition::Config(config)
    }
}

impl From<NativeCallable> for Definition {
    fn from(native: NativeCallable) -> Self {
        Definition::Native(native)
    }
}

impl TryFrom<JsonValue> for Definition {
    type Error = LambdaError;

    fn try_from(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(Definition::Empty),
            JsonValue::String(text) => Ok(Definition::Expression(text)),
            JsonValue::Object(_) => serde_json::from_value::<LambdaConfig>(value)
                .map(Definition::Config)
                .map_err(|e| LambdaError::invalid_definition(e.to_string())),
            other => Err(LambdaError::invalid_definition(format!(
                "expected a string or configuration object, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
enum CompiledBody {
    /// Returns its first argument unchanged
    Identity,
    Expression(ExpressionNode),
    Block(Vec<Statement>),
    Native(NativeCallable),
}

/// An invocable unit bound to one signature and body
///
/// Compilation is pure: identical definition text and self symbol always
/// produce an observably identical unit.
#[derive(Debug, Clone)]
pub struct CompiledLambda {
    params: Vec<String>,
    rest: Option<RestParam>,
    body: CompiledBody,
}

impl CompiledLambda {
    fn identity() -> Self {
        Self {
            params: Vec::new(),
            rest: None,
            body: CompiledBody::Identity,
        }
    }

    /// Fixed parameter names, in binding order
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Invoke the unit with positional arguments
    ///
    /// Unmatched fixed parameters bind to [`Value::Undefined`]; surplus
    /// arguments feed the rest parameter when one exists and are ignored
    /// otherwise.
    pub fn invoke(&self, args: &[Value]) -> std::result::Result<Value, EvalError> {
        match &self.body {
            CompiledBody::Identity => Ok(args.first().cloned().unwrap_or_default()),
            CompiledBody::Native(func) => func.call(args),
            CompiledBody::Expression(node) => {
                let scope = self.bind_scope(args);
                evaluate_expression(node, &scope)
            }
            CompiledBody::Block(statements) => {
                let mut scope = self.bind_scope(args);
                evaluate_block(statements, &mut scope)
            }
        }
    }

    fn bind_scope(&self, args: &[Value]) -> Scope {
        let mut scope = Scope::new();
        for (i, name) in self.params.iter().enumerate() {
            scope.bind(name.clone(), args.get(i).cloned().unwrap_or_default());
        }
        if let Some(rest) = &self.rest {
            let surplus = args.get(rest.position..).unwrap_or_default().to_vec();
            scope.bind(rest.name.clone(), Value::Array(surplus));
        }
        scope
    }
}

/// Compile definition text into an invocable unit
fn compile_expression(
    self_symbol: &str,
    expression: &str,
) -> std::result::Result<CompiledLambda, ParseError> {
    if expression.trim().is_empty() {
        return Ok(CompiledLambda::identity());
    }
    let signature = parse_signature(expression, self_symbol)?;
    let body = match signature.body_kind {
        BodyKind::Expression => {
            CompiledBody::Expression(parser::parse_expression(&signature.body)?)
        }
        BodyKind::Block => CompiledBody::Block(parser::parse_block(&signature.body)?),
    };
    debug!(
        "compiled lambda: {} fixed parameter(s), rest: {}",
        signature.params.len(),
        signature.rest.is_some()
    );
    Ok(CompiledLambda {
        params: signature.params,
        rest: signature.rest,
        body,
    })
}

/// A textual expression definition compiled into an invocable object
#[derive(Debug, Clone)]
pub struct Lambda {
    self_symbol: String,
    source_text: String,
    compiled: CompiledLambda,
}

impl Lambda {
    /// Create an identity lambda with the default self symbol
    pub fn new() -> Self {
        Self {
            self_symbol: DEFAULT_SELF_SYMBOL.to_string(),
            source_text: String::new(),
            compiled: CompiledLambda::identity(),
        }
    }

    /// Construct from any definition form
    pub fn from_definition(definition: Definition) -> Result<Self> {
        match definition {
            Definition::Empty => Ok(Self::new()),
            Definition::Expression(text) => {
                let compiled = compile_expression(DEFAULT_SELF_SYMBOL, &text)?;
                Ok(Self {
                    self_symbol: DEFAULT_SELF_SYMBOL.to_string(),
                    source_text: text,
                    compiled,
                })
            }
            Definition::Config(config) => {
                let self_symbol = config
                    .self_symbol
                    .unwrap_or_else(|| DEFAULT_SELF_SYMBOL.to_string());
                let compiled = compile_expression(&self_symbol, &config.expression)?;
                Ok(Self {
                    self_symbol,
                    source_text: config.expression,
                    compiled,
                })
            }
            Definition::Native(native) => Ok(Self::from_native(native)),
        }
    }

    /// Construct from expression text
    pub fn from_expression(text: impl Into<String>) -> Result<Self> {
        Self::from_definition(Definition::Expression(text.into()))
    }

    /// Construct from a configuration value
    pub fn from_config(config: LambdaConfig) -> Result<Self> {
        Self::from_definition(Definition::Config(config))
    }

    /// Wrap a native callable without recompiling it
    ///
    /// The callable itself becomes the compiled unit; the canonical text is
    /// synthesized from its declared signature and body.
    pub fn from_native(native: NativeCallable) -> Self {
        let source_text = native.source_text();
        let params = native.params().to_vec();
        Self {
            self_symbol: DEFAULT_SELF_SYMBOL.to_string(),
            source_text,
            compiled: CompiledLambda {
                params,
                rest: None,
                body: CompiledBody::Native(native),
            },
        }
    }

    /// The instance's self symbol, fixed at construction
    pub fn self_symbol(&self) -> &str {
        &self.self_symbol
    }

    /// Canonical source text of the most recent compilation
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// The currently bound compiled unit
    pub fn compiled(&self) -> &CompiledLambda {
        &self.compiled
    }

    /// Recompile from new definition text, replacing the bound unit
    ///
    /// Uses the instance's self symbol. The previous unit and source text
    /// are fully overwritten; no history is retained.
    pub fn compile(&mut self, expression: impl Into<String>) -> Result<&CompiledLambda> {
        let expression = expression.into();
        let compiled = compile_expression(&self.self_symbol, &expression)?;
        self.compiled = compiled;
        self.source_text = expression;
        Ok(&self.compiled)
    }

    /// Invoke the current compiled unit with positional arguments
    ///
    /// For self-symbol lambdas the invocation scope is the first argument,
    /// exactly as direct invocation forwards it.
    pub fn execute(&self, args: &[Value]) -> Result<Value> {
        Ok(self.compiled.invoke(args)?)
    }

    /// Direct invocation; behaviorally identical to [`Lambda::execute`]
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        self.execute(args)
    }
}

impl Default for Lambda {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for Lambda {
    type Err = LambdaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_expression(s)
    }
}

impl From<NativeCallable> for Lambda {
    fn from(native: NativeCallable) -> Self {
        Self::from_native(native)
    }
}

impl Serialize for Lambda {
    /// Serializes as the canonical source text, whitespace preserved
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source_text)
    }
}

impl<'de> Deserialize<'de> for Lambda {
    /// Reconstructs from expression text or a configuration map
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Config(LambdaConfig),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Lambda::from_expression(text),
            Repr::Config(config) => Lambda::from_config(config),
        }
        .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_no_argument_construction_is_identity() {
        let lambda = Lambda::new();
        assert_eq!(lambda.self_symbol(), "$");
        assert_eq!(lambda.source_text(), "");
        assert_eq!(
            lambda.execute(&[Value::Integer(9)]).unwrap(),
            Value::Integer(9)
        );
        assert_eq!(lambda.execute(&[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_self_symbol_override_leaves_default_untouched() {
        let lambda = Lambda::from_config(LambdaConfig {
            expression: "self.a".to_string(),
            self_symbol: Some("self".to_string()),
        })
        .unwrap();
        assert_eq!(lambda.self_symbol(), "self");
        assert_eq!(DEFAULT_SELF_SYMBOL, "$");
        assert_eq!(Lambda::new().self_symbol(), "$");
    }

    #[test]
    fn test_compile_replaces_unit_and_source() {
        let mut lambda = Lambda::from_config(LambdaConfig {
            expression: "self.a+self.b".to_string(),
            self_symbol: Some("self".to_string()),
        })
        .unwrap();
        let scope = Value::from(json!({"a": 5, "b": 2}));
        assert_eq!(lambda.execute(&[scope.clone()]).unwrap(), Value::Integer(7));

        lambda.compile("self.a-self.b").unwrap();
        assert_eq!(lambda.execute(&[scope]).unwrap(), Value::Integer(3));
        assert_eq!(lambda.source_text(), "self.a-self.b");
    }

    #[test]
    fn test_compile_keeps_instance_self_symbol() {
        let mut lambda = Lambda::from_config(LambdaConfig {
            expression: "self.a".to_string(),
            self_symbol: Some("self".to_string()),
        })
        .unwrap();
        lambda.compile("self.b").unwrap();
        assert_eq!(
            lambda
                .execute(&[Value::from(json!({"a": 1, "b": 2}))])
                .unwrap(),
            Value::Integer(2)
        );
    }

    #[test]
    fn test_compile_error_is_surfaced() {
        let mut lambda = Lambda::new();
        assert!(matches!(
            lambda.compile("(...args, a) => a"),
            Err(LambdaError::Parse(_))
        ));
    }

    #[test]
    fn test_passthrough_uses_the_callable_itself() {
        let native = NativeCallable::new(["$"], "return $.a+$.b;", |args| {
            let scope = args.first().cloned().unwrap_or_default();
            let a = scope.get("a").cloned().unwrap_or_default();
            let b = scope.get("b").cloned().unwrap_or_default();
            crate::evaluator::evaluate_binary_operation(crate::ast::BinaryOperator::Add, &a, &b)
        });
        let lambda = Lambda::from_native(native);
        assert_eq!(
            lambda.execute(&[Value::from(json!({"a": 5, "b": 2}))]).unwrap(),
            Value::Integer(7)
        );
        assert_eq!(lambda.source_text(), "($)=>{return $.a+$.b;}");
    }

    #[test]
    fn test_execute_and_call_are_identical() {
        let lambda = Lambda::from_expression("a, b => a + b").unwrap();
        let args = [Value::Integer(5), Value::Integer(2)];
        assert_eq!(lambda.execute(&args).unwrap(), lambda.call(&args).unwrap());
        assert_eq!(
            lambda.call(&args).unwrap(),
            lambda.compiled().invoke(&args).unwrap()
        );
    }

    #[test]
    fn test_serialize_is_verbatim_source() {
        let lambda = Lambda::from_expression("(a, b)=>{return a+b}").unwrap();
        assert_eq!(
            serde_json::to_string(&lambda).unwrap(),
            "\"(a, b)=>{return a+b}\""
        );
    }

    #[test]
    fn test_deserialize_from_text_and_config() {
        let from_text: Lambda = serde_json::from_str("\"a, b => a + b\"").unwrap();
        assert_eq!(
            from_text
                .execute(&[Value::Integer(5), Value::Integer(2)])
                .unwrap(),
            Value::Integer(7)
        );

        let from_config: Lambda =
            serde_json::from_value(json!({"selfSymbol": "self", "expression": "self.a+self.b"}))
                .unwrap();
        assert_eq!(
            from_config
                .execute(&[Value::from(json!({"a": 3, "b": 5}))])
                .unwrap(),
            Value::Integer(8)
        );
    }

    #[test]
    fn test_definition_from_json_value() {
        assert!(matches!(
            Definition::try_from(json!(null)),
            Ok(Definition::Empty)
        ));
        assert!(matches!(
            Definition::try_from(json!("$.a")),
            Ok(Definition::Expression(_))
        ));
        assert!(matches!(
            Definition::try_from(json!({"expression": "$.a"})),
            Ok(Definition::Config(_))
        ));
        assert!(Definition::try_from(json!(42)).is_err());
        assert!(Definition::try_from(json!({"selfSymbol": "self"})).is_err());
    }

    #[test]
    fn test_loose_arity_binds_undefined() {
        let lambda = Lambda::from_expression("a, b => b").unwrap();
        assert_eq!(
            lambda.execute(&[Value::Integer(1)]).unwrap(),
            Value::Undefined
        );
    }
}
