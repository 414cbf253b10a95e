//! Per-call dispatch context.

use crate::language::facts::{CallSiteId, WitnessEntry};
use crate::language::types::TypeExpr;
use crate::runtime::{dictionary::Dictionary, traits::TraitName};
use std::rc::Rc;

/// Call-node metadata attached by the type checker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallSite {
    pub id: Option<CallSiteId>,
    pub witnesses: Vec<WitnessEntry>,
    pub passes_dictionary: bool,
}

impl CallSite {
    pub fn new(id: CallSiteId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_witness(mut self, entry: WitnessEntry) -> Self {
        self.witnesses.push(entry);
        self
    }

    pub fn passing_dictionary(mut self) -> Self {
        self.passes_dictionary = true;
        self
    }

    pub fn witness(&self, trait_name: TraitName) -> Option<&WitnessEntry> {
        self.witnesses
            .iter()
            .find(|entry| entry.trait_name == trait_name)
    }
}

#[derive(Debug)]
struct WitnessFrame {
    entry: WitnessEntry,
    parent: Option<Rc<WitnessFrame>>,
}

/// Persistent stack of witness entries; pushing shares the tail.
#[derive(Clone, Debug, Default)]
pub struct WitnessStack {
    top: Option<Rc<WitnessFrame>>,
}

impl WitnessStack {
    pub fn push(&self, entry: WitnessEntry) -> WitnessStack {
        WitnessStack {
            top: Some(Rc::new(WitnessFrame {
                entry,
                parent: self.top.clone(),
            })),
        }
    }

    pub fn top(&self, trait_name: TraitName) -> Option<&WitnessEntry> {
        self.iter().find(|entry| entry.trait_name == trait_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WitnessEntry> {
        let mut cursor = self.top.as_deref();
        std::iter::from_fn(move || {
            let frame = cursor?;
            cursor = frame.parent.as_deref();
            Some(&frame.entry)
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CallContext {
    witnesses: WitnessStack,
    call_site: Option<Rc<CallSite>>,
    container: Option<TypeExpr>,
    dictionary: Option<Rc<Dictionary>>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(call_site: CallSite) -> Self {
        Self::default().with_call_site(call_site)
    }

    pub fn with_call_site(&self, call_site: CallSite) -> Self {
        Self {
            call_site: Some(Rc::new(call_site)),
            ..self.clone()
        }
    }

    pub fn with_witness(&self, entry: WitnessEntry) -> Self {
        Self {
            witnesses: self.witnesses.push(entry),
            ..self.clone()
        }
    }

    pub fn with_type_witness(&self, trait_name: TraitName, ty: TypeExpr) -> Self {
        self.with_witness(WitnessEntry::single(trait_name, ty))
    }

    pub fn with_dictionary(&self, dictionary: Rc<Dictionary>) -> Self {
        Self {
            dictionary: Some(dictionary),
            ..self.clone()
        }
    }

    /// Context for a user continuation invoked by a bind whose left operand
    /// has type `container`. The call node and dictionary of the bind itself
    /// do not describe calls made inside the continuation.
    pub fn for_continuation(&self, container: TypeExpr) -> Self {
        Self {
            witnesses: self.witnesses.clone(),
            call_site: None,
            container: Some(container),
            dictionary: None,
        }
    }

    /// Context for a transformer re-entering the dispatcher for its inner
    /// monad: only the witness stack survives.
    pub fn nested(&self) -> Self {
        Self {
            witnesses: self.witnesses.clone(),
            call_site: None,
            container: None,
            dictionary: None,
        }
    }

    pub fn without_dictionary(&self) -> Self {
        Self {
            dictionary: None,
            ..self.clone()
        }
    }

    pub fn witnesses(&self) -> &WitnessStack {
        &self.witnesses
    }

    pub fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_deref()
    }

    pub fn container(&self) -> Option<&TypeExpr> {
        self.container.as_ref()
    }

    pub fn dictionary(&self) -> Option<&Rc<Dictionary>> {
        self.dictionary.as_ref()
    }

    pub fn annotated(&self, trait_name: TraitName) -> Option<&WitnessEntry> {
        self.call_site()
            .and_then(|site| site.witness(trait_name))
    }
}
