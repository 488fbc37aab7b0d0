//! Variables, functions and the current model visible to slot expressions

use std::collections::HashMap;

use crate::error::BoxError;
use crate::generator::Generator;
use crate::mapper::Mapper;
use crate::model::{Bindings, ModelNode};
use crate::parser::{self, Expr, Literal};

use super::compile::Slot;
use super::error::EvalError;
use super::value::Value;

/// Function callable from slot expressions
pub type Function<'a> = Box<dyn Fn(&[Value]) -> Result<Value, BoxError> + 'a>;

/// Functions that take a path and run against the model in scope
const MODEL_FUNCTIONS: [&str; 4] = ["select", "has", "is_reference", "is_enabled"];

/// Evaluation environment for [`Template::render_scope`](super::Template::render_scope)
///
/// Scalar variables double as `<name>` path bindings, so
/// `select('/components/<comp>')` sees the `comp` variable.
#[derive(Default)]
pub struct Scope<'a> {
    model: Option<ModelNode>,
    variables: HashMap<String, Value>,
    bindings: Bindings,
    functions: HashMap<String, Function<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node the built-in model functions run against
    pub fn with_model(mut self, model: impl Into<ModelNode>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn model(&self) -> Option<&ModelNode> {
        self.model.as_ref()
    }

    /// Bind a variable
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match binding_text(&value) {
            Some(text) => self.bindings.insert(name.clone(), text),
            None => self.bindings.remove(&name),
        }
        self.variables.insert(name, value);
    }

    /// Bind a variable (builder form)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Expose a function to slot expressions
    pub fn define<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + 'a,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    /// Expose a function to slot expressions (builder form)
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + 'a,
    {
        self.define(name, function);
        self
    }

    /// Expose a generator under its own name
    pub fn generator<I>(self, generator: &Generator<I>) -> Self
    where
        I: FromArgs + 'a,
    {
        let generator = generator.clone();
        let name = generator.name().to_string();
        self.function(name.clone(), move |args| {
            let input = I::from_args(&name, args)?;
            Ok(Value::from(generator.call(&input)?))
        })
    }

    /// Expose a mapper under its own name: `types('int')`
    pub fn mapper(self, mapper: &Mapper) -> Self {
        let mapper = mapper.clone();
        let name = mapper.name().to_string();
        self.function(name.clone(), move |args| {
            let [key] = args else {
                return Err(EvalError::arity(&name, "1", args.len()).into());
            };
            Ok(Value::Text(mapper.get(&key.to_text()).into_owned()))
        })
    }

    /// Evaluate expression source
    pub fn eval_str(&self, source: &str) -> Result<Value, EvalError> {
        let expr = parser::parse(source)?;
        self.eval(&expr)
    }

    /// Evaluate the expression of a template slot
    pub fn eval_slot(&self, slot: &Slot) -> Result<Value, EvalError> {
        match slot.expression() {
            Ok(expr) => self.eval(expr),
            Err(err) => Err(EvalError::Syntax(err.clone())),
        }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::String(s) => Value::Text(s.clone()),
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(x) => Value::Float(*x),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::None => Value::Absent,
            }),
            Expr::Variable(name) => {
                self.variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() })
            }
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Call { function, args } => {
                let args = self.eval_args(args)?;
                self.call(function, &args)
            }
            Expr::Attribute { target, name } => {
                let target = self.eval(target)?;
                let node = expect_node(&target)?;
                match name.as_str() {
                    "name" => Ok(Value::Text(node.name().to_string())),
                    "kind" => Ok(Value::Text(node.kind().to_string())),
                    _ => Err(EvalError::UnknownAttribute { name: name.clone() }),
                }
            }
            Expr::Method { target, name, args } => {
                let target = self.eval(target)?;
                let node = expect_node(&target)?;
                let args = self.eval_args(args)?;
                self.node_method(node, name, &args)
            }
        }
    }

    fn eval_args(&self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn call(&self, function: &str, args: &[Value]) -> Result<Value, EvalError> {
        if let Some(f) = self.functions.get(function) {
            return f(args).map_err(|err| EvalError::from_function(function, err));
        }

        if MODEL_FUNCTIONS.contains(&function) {
            let model = self.model.as_ref().ok_or_else(|| EvalError::NoModel {
                function: function.to_string(),
            })?;
            return self.node_method(model, function, args);
        }

        Err(EvalError::UnknownFunction {
            name: function.to_string(),
        })
    }

    fn node_method(&self, node: &ModelNode, method: &str, args: &[Value]) -> Result<Value, EvalError> {
        match method {
            "select" => {
                if args.is_empty() || args.len() > 2 {
                    return Err(EvalError::arity(method, "1 or 2", args.len()));
                }
                let path = path_arg(method, &args[0])?;
                let default = args.get(1).map(Value::to_raw);
                Ok(Value::Node(node.select_with(path, &self.bindings, default)?))
            }
            "has" => match args {
                [] => Ok(Value::Bool(true)),
                [path] => {
                    let path = path_arg(method, path)?;
                    Ok(Value::Bool(node.has_with(path, &self.bindings)))
                }
                _ => Err(EvalError::arity(method, "0 or 1", args.len())),
            },
            "is_reference" => match args {
                [] => Ok(Value::Bool(node.holds_reference())),
                [path] => {
                    let path = path_arg(method, path)?;
                    Ok(Value::Bool(node.is_reference_with(path, &self.bindings)?))
                }
                _ => Err(EvalError::arity(method, "0 or 1", args.len())),
            },
            "is_enabled" => match args {
                [] => Ok(Value::Bool(node.enabled())),
                [path] => {
                    let path = path_arg(method, path)?;
                    Ok(Value::Bool(node.is_enabled_with(path, &self.bindings)))
                }
                _ => Err(EvalError::arity(method, "0 or 1", args.len())),
            },
            _ => Err(EvalError::UnknownMethod {
                name: method.to_string(),
            }),
        }
    }
}

/// Text a variable contributes to `<name>` path segments
fn binding_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Int(n) => Some(n.to_string()),
        Value::Node(node) => node
            .as_str()
            .map(str::to_string)
            .or_else(|| node.as_i64().map(|n| n.to_string())),
        _ => None,
    }
}

fn expect_node(value: &Value) -> Result<&ModelNode, EvalError> {
    value.as_node().ok_or_else(|| EvalError::NotANode {
        found: value.describe(),
    })
}

fn path_arg<'v>(function: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    value.as_str().ok_or_else(|| EvalError::ArgumentType {
        function: function.to_string(),
        expected: "a path string",
        found: value.describe(),
    })
}

/// Conversion of slot call arguments into a generator's input
pub trait FromArgs: Sized {
    fn from_args(function: &str, args: &[Value]) -> Result<Self, EvalError>;
}

impl FromArgs for () {
    fn from_args(function: &str, args: &[Value]) -> Result<Self, EvalError> {
        match args {
            [] => Ok(()),
            _ => Err(EvalError::arity(function, "0", args.len())),
        }
    }
}

impl FromArgs for ModelNode {
    fn from_args(function: &str, args: &[Value]) -> Result<Self, EvalError> {
        match args {
            [Value::Node(node)] => Ok(node.clone()),
            [other] => Err(EvalError::ArgumentType {
                function: function.to_string(),
                expected: "a model node",
                found: other.describe(),
            }),
            _ => Err(EvalError::arity(function, "1", args.len())),
        }
    }
}

impl FromArgs for Value {
    fn from_args(function: &str, args: &[Value]) -> Result<Self, EvalError> {
        match args {
            [value] => Ok(value.clone()),
            _ => Err(EvalError::arity(function, "1", args.len())),
        }
    }
}

impl FromArgs for Vec<Value> {
    fn from_args(_function: &str, args: &[Value]) -> Result<Self, EvalError> {
        Ok(args.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mapping, ModelError, RawValue};

    fn model() -> ModelNode {
        let a: Mapping = [("x", 1), ("y", 2)].into_iter().collect();
        let doc: Mapping = [
            ("a", RawValue::from(a)),
            ("flag", RawValue::from(true)),
            ("ref", RawValue::from("#/a")),
        ]
        .into_iter()
        .collect();
        ModelNode::new("doc", doc)
    }

    #[test]
    fn test_literals_and_variables() {
        let scope = Scope::new().with("name", "gen");
        assert_eq!(scope.eval_str("name").expect("ok"), Value::from("gen"));
        assert_eq!(scope.eval_str("'lit'").expect("ok"), Value::from("lit"));
        assert_eq!(scope.eval_str("none").expect("ok"), Value::Absent);
        assert_eq!(
            scope.eval_str("[1, true]").expect("ok"),
            Value::List(vec![Value::Int(1), Value::Bool(true)])
        );
    }

    #[test]
    fn test_builtin_select_needs_model() {
        let err = Scope::new().eval_str("select('/a')").expect_err("Should fail");
        assert!(matches!(err, EvalError::NoModel { .. }));
    }

    #[test]
    fn test_builtin_model_functions() {
        let scope = Scope::new().with_model(model());
        assert_eq!(scope.eval_str("select('/a/x')").expect("ok").to_text(), "1");
        assert_eq!(scope.eval_str("select('/a/z', 9)").expect("ok").to_text(), "9");
        assert_eq!(scope.eval_str("has('/a/z')").expect("ok"), Value::Bool(false));
        assert_eq!(scope.eval_str("has('/a/x/1')").expect("ok"), Value::Bool(false));
        assert_eq!(scope.eval_str("is_reference('ref')").expect("ok"), Value::Bool(true));
        assert_eq!(scope.eval_str("is_enabled('flag')").expect("ok"), Value::Bool(true));
    }

    #[test]
    fn test_node_attributes_and_methods() {
        let scope = Scope::new().with("m", model());
        assert_eq!(scope.eval_str("m.select('ref->').name").expect("ok"), Value::from("a"));
        assert_eq!(scope.eval_str("m.select('a').kind").expect("ok"), Value::from("mapping"));
        assert_eq!(scope.eval_str("m.select('ref').is_reference()").expect("ok"), Value::Bool(true));
        assert!(matches!(
            scope.eval_str("m.color").expect_err("Should fail"),
            EvalError::UnknownAttribute { .. }
        ));
    }

    #[test]
    fn test_variables_feed_path_bindings() {
        let scope = Scope::new().with_model(model()).with("key", "y");
        assert_eq!(scope.eval_str("select('/a/<key>')").expect("ok").to_text(), "2");
    }

    #[test]
    fn test_model_errors_propagate() {
        let scope = Scope::new().with_model(model());
        let err = scope.eval_str("select('/nope')").expect_err("Should fail");
        assert!(matches!(err, EvalError::Model(ModelError::PathNotFound { .. })));
    }

    #[test]
    fn test_user_function_error_keeps_name() {
        let scope = Scope::new().function("explode", |_| Err("kaboom".into()));
        match scope.eval_str("explode()").expect_err("Should fail") {
            EvalError::Function { name, source } => {
                assert_eq!(name, "explode");
                assert_eq!(source.to_string(), "kaboom");
            }
            other => panic!("Expected function error, got {:?}", other),
        }
    }

    #[test]
    fn test_functions_shadow_builtins() {
        let scope = Scope::new().function("select", |_| Ok(Value::from("mine")));
        assert_eq!(scope.eval_str("select('/a')").expect("ok"), Value::from("mine"));
    }

    #[test]
    fn test_mapper_function() {
        let types = Mapper::new("types", [("int", "i64")]);
        let scope = Scope::new().mapper(&types);
        assert_eq!(scope.eval_str("types('int')").expect("ok"), Value::from("i64"));
        assert_eq!(
            scope.eval_str("types('bool')").expect("ok"),
            Value::from("<! MAPPING NOT FOUND IN 'types': bool !>")
        );
    }

    #[test]
    fn test_arity_errors() {
        let scope = Scope::new().with_model(model());
        assert!(matches!(
            scope.eval_str("select()").expect_err("Should fail"),
            EvalError::Arity { .. }
        ));
        assert!(matches!(
            scope.eval_str("select(1)").expect_err("Should fail"),
            EvalError::ArgumentType { .. }
        ));
    }
}
