use crate::runtime::{
    context::CallContext,
    dictionary::Dictionary,
    dispatch::TraitMethodRef,
    error::{RuntimeError, RuntimeResult},
    interpreter::Interpreter,
};
use std::fmt;
use std::rc::Rc;

pub const OPTION: &str = "Option";
pub const RESULT: &str = "Result";
pub const IDENTITY: &str = "Identity";
pub const READER: &str = "Reader";
pub const STATE: &str = "State";
pub const WRITER: &str = "Writer";
pub const OPTION_T: &str = "OptionT";
pub const RESULT_T: &str = "ResultT";

#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Int(i128),
    Float(f64),
    Bool(bool),
    Char(char),
    String(String),
    List(Rc<Vec<Value>>),
    Tuple(Vec<Value>),
    Data(DataInstance),
    Function(FunctionValue),
    Dictionary(Rc<Dictionary>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn pair(first: Value, second: Value) -> Self {
        Value::Tuple(vec![first, second])
    }

    pub fn data(type_name: &str, name: &str, fields: Vec<Value>) -> Self {
        Value::Data(DataInstance {
            name: name.to_string(),
            type_name: type_name.to_string(),
            fields,
        })
    }

    pub fn some(value: Value) -> Self {
        Value::data(OPTION, "Some", vec![value])
    }

    pub fn zero() -> Self {
        Value::data(OPTION, "Zero", Vec::new())
    }

    pub fn ok(value: Value) -> Self {
        Value::data(RESULT, "Ok", vec![value])
    }

    pub fn fail(error: Value) -> Self {
        Value::data(RESULT, "Fail", vec![error])
    }

    pub fn identity(value: Value) -> Self {
        Value::data(IDENTITY, IDENTITY, vec![value])
    }

    pub fn option_t(inner: Value) -> Self {
        Value::data(OPTION_T, OPTION_T, vec![inner])
    }

    pub fn result_t(inner: Value) -> Self {
        Value::data(RESULT_T, RESULT_T, vec![inner])
    }

    pub fn native(
        name: &str,
        arity: usize,
        func: impl Fn(&Interpreter, &CallContext, Vec<Value>) -> RuntimeResult<Value> + 'static,
    ) -> Self {
        Value::Function(FunctionValue::Native(NativeFunction::new(name, arity, func)))
    }

    pub fn as_data(&self) -> Option<&DataInstance> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_of(&self, type_name: &str) -> Option<&DataInstance> {
        self.as_data().filter(|data| data.type_name == type_name)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_function(b),
            (Value::Dictionary(a), Value::Dictionary(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "'{v}'"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                write_separated(f, items.iter())?;
                write!(f, "]")
            }
            Value::Tuple(values) => {
                write!(f, "(")?;
                write_separated(f, values.iter())?;
                write!(f, ")")
            }
            Value::Data(data) => write!(f, "{data}"),
            Value::Function(FunctionValue::Native(native)) => {
                write!(f, "<function {}>", native.name)
            }
            Value::Function(FunctionValue::TraitMethod(method)) => {
                write!(f, "<method {}.{}>", method.trait_name, method.name)
            }
            Value::Dictionary(dict) => write!(f, "<dictionary {}>", dict.name),
        }
    }
}

fn write_separated<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (idx, value) in values.enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataInstance {
    pub name: String,
    pub type_name: String,
    pub fields: Vec<Value>,
}

impl DataInstance {
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for DataInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}(", self.name)?;
            write_separated(f, self.fields.iter())?;
            write!(f, ")")
        }
    }
}

pub type NativeFn = Rc<dyn Fn(&Interpreter, &CallContext, Vec<Value>) -> RuntimeResult<Value>>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: Rc<str>,
    pub arity: usize,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new(
        name: &str,
        arity: usize,
        func: impl Fn(&Interpreter, &CallContext, Vec<Value>) -> RuntimeResult<Value> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            arity,
            func: Rc::new(func),
        }
    }

    pub fn call(
        &self,
        interp: &Interpreter,
        ctx: &CallContext,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        if args.len() != self.arity {
            return Err(RuntimeError::ArityMismatch {
                name: self.name.to_string(),
                expected: self.arity,
                received: args.len(),
            });
        }
        (self.func)(interp, ctx, args)
    }

    pub fn to_value(&self) -> Value {
        Value::Function(FunctionValue::Native(self.clone()))
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum FunctionValue {
    Native(NativeFunction),
    TraitMethod(TraitMethodRef),
}

impl FunctionValue {
    fn same_function(&self, other: &FunctionValue) -> bool {
        match (self, other) {
            (FunctionValue::Native(a), FunctionValue::Native(b)) => Rc::ptr_eq(&a.func, &b.func),
            (FunctionValue::TraitMethod(a), FunctionValue::TraitMethod(b)) => a == b,
            _ => false,
        }
    }
}
