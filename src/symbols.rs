mod pool;

use std::cell::Cell;
use std::fmt;

use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};

use self::pool::BucketPool;

/// # symbol - Interned names
///
/// A `Symbol` is a small integer handle standing in for a name string. Within one generation of
/// a `SymbolTable` a name maps to exactly one `Symbol`, keys are handed out monotonically starting
/// at 1, and key 0 is reserved as `Symbol::INVALID`.
///
/// Symbols are only meaningful against the generation of the table that issued them. Resetting
/// the table invalidates all of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    pub const INVALID: Symbol = Symbol(0);
    /// Reserved upper bound of the key space. Never allocated.
    pub const MAX: Symbol = Symbol(1 << 23);

    pub const fn from_key(key: u32) -> Self {
        Symbol(key)
    }

    pub const fn key(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Symbol::INVALID && self < Symbol::MAX
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol::INVALID
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a name is compared while interning.
///
/// The two modes are separate namespaces: a name interned case-sensitively should always be
/// looked up case-sensitively. Mixing modes for the same logical name can alias or split it,
/// depending on which spelling was interned first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseMode {
    Sensitive,
    Insensitive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTableConfig {
    /// Number of hash chains. Sized to the expected population of distinct names.
    pub bucket_count: usize,
    /// Chains longer than this count against the table in `diagnose`.
    pub chain_threshold: usize,
}

impl Default for SymbolTableConfig {
    fn default() -> Self {
        SymbolTableConfig {
            bucket_count: 45007,
            chain_threshold: 3,
        }
    }
}

/// Result of `SymbolTable::diagnose`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOccupancy {
    pub symbols: usize,
    pub overfull_buckets: usize,
    pub longest_chain: usize,
    /// Chain nodes allocated so far, live or awaiting reuse.
    pub pooled_buckets: usize,
    pub undersized: bool,
}

/// ## SymbolTable
///
/// Interns names into `Symbol`s and recovers names for diagnostics.
///
/// Names hash into a fixed number of chains. Chain nodes live in a pool and are linked by index,
/// so inserting at the front of a chain is O(1) and `reset` simply hands every node back.
#[derive(Debug)]
pub struct SymbolTable {
    heads: Vec<Option<usize>>,
    pool: BucketPool,
    next_id: u32,
    generation: u32,
    config: SymbolTableConfig,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new(SymbolTableConfig::default())
    }
}

impl SymbolTable {
    pub fn new(config: SymbolTableConfig) -> SymbolTable {
        let bucket_count = config.bucket_count.max(1);
        SymbolTable {
            heads: vec![None; bucket_count],
            pool: BucketPool::new(),
            next_id: 1,
            generation: 0,
            config,
        }
    }

    pub fn config(&self) -> &SymbolTableConfig {
        &self.config
    }

    /// Incremented by every `reset`.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pool.live()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the symbol for `name`, allocating the next key if the name is new.
    ///
    /// # Panics
    ///
    /// If the table runs out of keys below `Symbol::MAX`.
    pub fn intern(&mut self, name: &str, case_mode: CaseMode) -> Symbol {
        let socket = self.socket_for(name, case_mode);

        if let Some(existing) = self.find_in_chain(socket, name, case_mode) {
            return existing;
        }

        assert!(
            self.next_id < Symbol::MAX.key(),
            "symbol table exhausted at {} names",
            self.next_id - 1
        );
        let symbol = Symbol(self.next_id);
        self.next_id += 1;

        let head = self.heads[socket];
        self.heads[socket] = Some(self.pool.acquire(symbol, name, head));
        symbol
    }

    /// Looks up `name` without interning it.
    pub fn lookup(&self, name: &str, case_mode: CaseMode) -> Option<Symbol> {
        self.find_in_chain(self.socket_for(name, case_mode), name, case_mode)
    }

    /// Recovers the name behind `symbol`.
    ///
    /// This walks every chain. It is meant for tooling and error messages, not hot paths.
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        if symbol == Symbol::INVALID {
            return None;
        }
        self.heads
            .iter()
            .flat_map(|head| self.chain(*head))
            .find(|&index| self.pool.get(index).key == symbol)
            .map(|index| self.pool.get(index).name.as_str())
    }

    /// Returns every node to the pool and restarts key assignment at 1.
    pub fn reset(&mut self) {
        let released = self.len();
        for socket in 0..self.heads.len() {
            let mut cursor = self.heads[socket].take();
            while let Some(index) = cursor {
                cursor = self.pool.get(index).next;
                self.pool.release(index);
            }
        }
        self.next_id = 1;
        self.generation = self.generation.wrapping_add(1);
        log::info!(
            "symbol table reset to generation {} ({} names released)",
            self.generation,
            released
        );
    }

    /// All interned names, ordered by key.
    pub fn entries(&self) -> Vec<(Symbol, &str)> {
        self.heads
            .iter()
            .flat_map(|head| self.chain(*head))
            .map(|index| {
                let node = self.pool.get(index);
                (node.key, node.name.as_str())
            })
            .sorted_by_key(|(symbol, _)| *symbol)
            .collect()
    }

    /// Measures chain lengths and flags the table as undersized when too many chains run long.
    pub fn diagnose(&self) -> TableOccupancy {
        let mut overfull_buckets = 0;
        let mut longest_chain = 0;
        for head in &self.heads {
            let length = self.chain(*head).count();
            if length > self.config.chain_threshold {
                overfull_buckets += 1;
            }
            longest_chain = longest_chain.max(length);
        }

        let undersized = overfull_buckets > self.heads.len() / 20;
        if undersized {
            log::warn!(
                "symbol table undersized: {} of {} buckets exceed {} names",
                overfull_buckets,
                self.heads.len(),
                self.config.chain_threshold
            );
        }

        TableOccupancy {
            symbols: self.len(),
            overfull_buckets,
            longest_chain,
            pooled_buckets: self.pool.capacity(),
            undersized,
        }
    }

    fn socket_for(&self, name: &str, case_mode: CaseMode) -> usize {
        let hash = match case_mode {
            CaseMode::Sensitive => hash_name(name.bytes()),
            CaseMode::Insensitive => hash_name(name.bytes().map(|b| b.to_ascii_lowercase())),
        };
        hash as usize % self.heads.len()
    }

    fn find_in_chain(&self, socket: usize, name: &str, case_mode: CaseMode) -> Option<Symbol> {
        self.chain(self.heads[socket])
            .map(|index| self.pool.get(index))
            .find(|node| match case_mode {
                CaseMode::Sensitive => node.name == name,
                CaseMode::Insensitive => node.name.eq_ignore_ascii_case(name),
            })
            .map(|node| node.key)
    }

    fn chain(&self, head: Option<usize>) -> Chain<'_> {
        Chain {
            pool: &self.pool,
            cursor: head,
        }
    }
}

// Multiply-by-33 string hash. Stable across platforms, since keys for the same name must land in
// the same chain regardless of host.
fn hash_name<I: Iterator<Item = u8>>(bytes: I) -> u32 {
    bytes.fold(0u32, |hash, byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(byte))
    })
}

struct Chain<'a> {
    pool: &'a BucketPool,
    cursor: Option<usize>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.cursor?;
        self.cursor = self.pool.get(index).next;
        Some(index)
    }
}

/// ## StaticSymbol
///
/// A well-known name whose symbol is interned on first use and cached for the generation of the
/// table that issued it. After the table is reset, the next call interns the name again.
#[derive(Debug)]
pub struct StaticSymbol {
    name: &'static str,
    case_mode: CaseMode,
    cached: Cell<Option<(u32, Symbol)>>,
}

impl StaticSymbol {
    pub const fn new(name: &'static str) -> Self {
        StaticSymbol {
            name,
            case_mode: CaseMode::Sensitive,
            cached: Cell::new(None),
        }
    }

    pub const fn new_insensitive(name: &'static str) -> Self {
        StaticSymbol {
            name,
            case_mode: CaseMode::Insensitive,
            cached: Cell::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self, table: &mut SymbolTable) -> Symbol {
        match self.cached.get() {
            Some((generation, symbol)) if generation == table.generation() => symbol,
            _ => {
                let symbol = table.intern(self.name, self.case_mode);
                self.cached.set(Some((table.generation(), symbol)));
                symbol
            }
        }
    }
}
