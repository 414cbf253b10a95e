use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named(String, Vec<TypeExpr>),
    Var(String),
    Function(Box<TypeExpr>, Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Unit,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into(), Vec::new())
    }

    pub fn apply(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named(name.into(), args)
    }

    pub fn list_of(elem: TypeExpr) -> Self {
        TypeExpr::Named("List".into(), vec![elem])
    }

    pub fn head(&self) -> Option<&str> {
        match self {
            TypeExpr::Named(name, _) => Some(name),
            TypeExpr::Tuple(_) => Some("Tuple"),
            TypeExpr::Unit => Some("Unit"),
            TypeExpr::Function(_, _) => Some("Function"),
            TypeExpr::Var(_) => None,
        }
    }

    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Named(_, args) => args,
            _ => &[],
        }
    }

    pub fn result_type(&self) -> &TypeExpr {
        match self {
            TypeExpr::Function(_, ret) => ret.result_type(),
            other => other,
        }
    }

    pub fn substitute(&self, map: &HashMap<String, TypeExpr>) -> TypeExpr {
        match self {
            TypeExpr::Var(name) => map
                .get(name)
                .cloned()
                .unwrap_or_else(|| TypeExpr::Var(name.clone())),
            TypeExpr::Named(name, args) => {
                if args.is_empty() {
                    map.get(name)
                        .cloned()
                        .unwrap_or_else(|| TypeExpr::Named(name.clone(), Vec::new()))
                } else {
                    TypeExpr::Named(
                        name.clone(),
                        args.iter().map(|ty| ty.substitute(map)).collect(),
                    )
                }
            }
            TypeExpr::Function(param, ret) => TypeExpr::Function(
                Box::new(param.substitute(map)),
                Box::new(ret.substitute(map)),
            ),
            TypeExpr::Tuple(types) => {
                TypeExpr::Tuple(types.iter().map(|ty| ty.substitute(map)).collect())
            }
            TypeExpr::Unit => TypeExpr::Unit,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name, args) => {
                write!(f, "{name}")?;
                for arg in args {
                    match arg {
                        TypeExpr::Named(_, inner) if !inner.is_empty() => write!(f, " ({arg})")?,
                        TypeExpr::Function(_, _) => write!(f, " ({arg})")?,
                        _ => write!(f, " {arg}")?,
                    }
                }
                Ok(())
            }
            TypeExpr::Var(name) => write!(f, "{name}"),
            TypeExpr::Function(param, ret) => match param.as_ref() {
                TypeExpr::Function(_, _) => write!(f, "({param}) -> {ret}"),
                _ => write!(f, "{param} -> {ret}"),
            },
            TypeExpr::Tuple(types) => {
                write!(f, "(")?;
                for (idx, ty) in types.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            TypeExpr::Unit => write!(f, "()"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAlias {
    pub params: Vec<String>,
    pub body: TypeExpr,
}

#[derive(Clone, Debug, Default)]
pub struct TypeAliases {
    aliases: HashMap<String, TypeAlias>,
}

impl TypeAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, params: Vec<String>, body: TypeExpr) {
        self.aliases
            .insert(name.into(), TypeAlias { params, body });
    }

    /// Unwraps aliases at the head of `ty` until a non-alias constructor is
    /// reached. Arguments beyond an alias's parameters are appended to the
    /// expansion, so `type Log = Writer (List String)` turns `Log Int` into
    /// `Writer (List String) Int`. Gives up after `limit` expansions.
    pub fn expand(&self, ty: &TypeExpr, limit: usize) -> TypeExpr {
        let mut current = ty.clone();
        for _ in 0..limit {
            let TypeExpr::Named(name, args) = &current else {
                return current;
            };
            let Some(alias) = self.aliases.get(name) else {
                return current;
            };
            if args.len() < alias.params.len() {
                return current;
            }
            let map: HashMap<String, TypeExpr> = alias
                .params
                .iter()
                .cloned()
                .zip(args.iter().cloned())
                .collect();
            let extra = args[alias.params.len()..].to_vec();
            let mut expanded = alias.body.substitute(&map);
            if !extra.is_empty() {
                expanded = match expanded {
                    TypeExpr::Named(name, mut inner) => {
                        inner.extend(extra);
                        TypeExpr::Named(name, inner)
                    }
                    other => return other,
                };
            }
            current = expanded;
        }
        current
    }
}
