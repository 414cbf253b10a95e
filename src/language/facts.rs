//! Facts the type checker hands to the runtime: inferred call-site types,
//! witness annotations and the alias table.

use crate::language::parser::{parse_type, TypeParseError};
use crate::language::types::{TypeAliases, TypeExpr};
use crate::runtime::traits::TraitName;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSiteId(pub u32);

impl fmt::Display for CallSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WitnessEntry {
    pub trait_name: TraitName,
    pub candidates: Vec<TypeExpr>,
}

impl WitnessEntry {
    pub fn new(trait_name: TraitName, candidates: Vec<TypeExpr>) -> Self {
        Self {
            trait_name,
            candidates,
        }
    }

    pub fn single(trait_name: TraitName, ty: TypeExpr) -> Self {
        Self::new(trait_name, vec![ty])
    }

    pub fn parse(trait_name: TraitName, source: &str) -> Result<Self, TypeParseError> {
        Ok(Self::single(trait_name, parse_type(source)?))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TypeFacts {
    inferred: HashMap<CallSiteId, TypeExpr>,
    pub aliases: TypeAliases,
}

impl TypeFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_inferred(&mut self, site: CallSiteId, ty: TypeExpr) {
        self.inferred.insert(site, ty);
    }

    pub fn resolved_inferred(&self, site: CallSiteId, alias_limit: usize) -> Option<TypeExpr> {
        let ty = self.inferred.get(&site)?;
        Some(self.aliases.expand(ty.result_type(), alias_limit))
    }
}
