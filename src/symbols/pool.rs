use super::Symbol;

/// A chain node in the symbol table. Chains are linked by index into the owning pool.
#[derive(Clone, Debug)]
pub(crate) struct Bucket {
    pub(crate) key: Symbol,
    pub(crate) name: String,
    pub(crate) next: Option<usize>,
}

/// Free-list arena for chain nodes.
///
/// Released nodes keep their `String` allocation so a busy table settles into reusing the same
/// backing memory instead of churning the allocator. Acquiring a node always overwrites every
/// field, so nothing from a previous occupant survives reuse.
#[derive(Debug, Default)]
pub(crate) struct BucketPool {
    nodes: Vec<Bucket>,
    free: Vec<usize>,
}

impl BucketPool {
    pub(crate) fn new() -> Self {
        BucketPool {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn acquire(&mut self, key: Symbol, name: &str, next: Option<usize>) -> usize {
        match self.free.pop() {
            Some(index) => {
                let node = &mut self.nodes[index];
                node.key = key;
                node.name.clear();
                node.name.push_str(name);
                node.next = next;
                index
            }
            None => {
                self.nodes.push(Bucket {
                    key,
                    name: name.to_owned(),
                    next,
                });
                self.nodes.len() - 1
            }
        }
    }

    pub(crate) fn release(&mut self, index: usize) {
        let node = &mut self.nodes[index];
        node.key = Symbol::INVALID;
        node.name.clear();
        node.next = None;
        self.free.push(index);
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &Bucket {
        &self.nodes[index]
    }

    /// Number of nodes currently handed out.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of nodes ever allocated, live or free.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }
}
