use serde_derive::{Deserialize, Serialize};

use crate::symbols::{CaseMode, Symbol, SymbolTable, SymbolTableConfig};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateContextConfig {
    pub symbols: SymbolTableConfig,
}

/// ## StateContext
///
/// Session-wide state shared by every transfer pass and configuration load: the symbol table
/// that names in transferred state are interned into.
///
/// One context lives for one session. `reset` starts a new session in place (all previously
/// issued symbols become invalid); dropping the context is shutdown.
#[derive(Debug)]
pub struct StateContext {
    symbols: SymbolTable,
}

impl Default for StateContext {
    fn default() -> Self {
        StateContext::new(StateContextConfig::default())
    }
}

impl StateContext {
    pub fn new(config: StateContextConfig) -> Self {
        log::debug!(
            "state context created with {} symbol buckets",
            config.symbols.bucket_count
        );
        StateContext {
            symbols: SymbolTable::new(config.symbols),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name, CaseMode::Sensitive)
    }

    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.symbols.resolve(symbol)
    }

    pub fn reset(&mut self) {
        self.symbols.reset();
    }
}
