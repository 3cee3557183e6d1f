//! Data constructors.
//!
//! Every structured value records which constructor built it. The
//! constructors the runtime itself produces (lists, pairs, results, errors,
//! orderings) are pre-registered at fixed ids so primitives can build and
//! match them without a lookup.

use std::fmt;

/// Index of a constructor in the [`ConstructorTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructorId(u32);

impl ConstructorId {
    /// `List.Nil`
    pub const NIL: ConstructorId = ConstructorId(0);
    /// `List.Cons head tail`
    pub const CONS: ConstructorId = ConstructorId(1);
    /// `Pair first second`
    pub const PAIR: ConstructorId = ConstructorId(2);
    /// `Result.Pass value`
    pub const PASS: ConstructorId = ConstructorId(3);
    /// `Result.Fail error`
    pub const FAIL: ConstructorId = ConstructorId(4);
    /// `Error cause stack`
    pub const ERROR: ConstructorId = ConstructorId(5);
    /// `Order.LT`
    pub const LT: ConstructorId = ConstructorId(6);
    /// `Order.EQ`
    pub const EQ: ConstructorId = ConstructorId(7);
    /// `Order.GT`
    pub const GT: ConstructorId = ConstructorId(8);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConstructorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctor#{}", self.0)
    }
}

/// A data constructor: one alternative of a sum type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constructor {
    /// Name of the sum type (`List`, `Result`, ...).
    pub sum: String,
    /// Name of this alternative (`Cons`, `Pass`, ...).
    pub name: String,
    /// Number of fields.
    pub arity: usize,
    /// Position of this alternative within its sum type.
    pub index: usize,
}

/// Table of known constructors.
#[derive(Clone, Debug)]
pub struct ConstructorTable {
    entries: Vec<Constructor>,
}

impl ConstructorTable {
    /// Create a table holding the built-in constructors.
    pub fn new() -> Self {
        let builtin = [
            ("List", "Nil", 0, 0),
            ("List", "Cons", 2, 1),
            ("Pair", "Pair", 2, 0),
            ("Result", "Pass", 1, 0),
            ("Result", "Fail", 1, 1),
            ("Error", "Error", 2, 0),
            ("Order", "LT", 0, 0),
            ("Order", "EQ", 0, 1),
            ("Order", "GT", 0, 2),
        ];
        let entries = builtin
            .into_iter()
            .map(|(sum, name, arity, index)| Constructor {
                sum: sum.to_string(),
                name: name.to_string(),
                arity,
                index,
            })
            .collect();
        ConstructorTable { entries }
    }

    /// Register a user constructor, returning its id.
    ///
    /// Registering the same `sum.name` twice returns the existing id.
    pub fn register(
        &mut self,
        sum: impl Into<String>,
        name: impl Into<String>,
        arity: usize,
        index: usize,
    ) -> ConstructorId {
        let sum = sum.into();
        let name = name.into();
        if let Some(id) = self.lookup(&sum, &name) {
            return id;
        }
        let id = ConstructorId(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(Constructor {
            sum,
            name,
            arity,
            index,
        });
        id
    }

    /// Find a constructor by sum and alternative name.
    pub fn lookup(&self, sum: &str, name: &str) -> Option<ConstructorId> {
        self.entries
            .iter()
            .position(|c| c.sum == sum && c.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(ConstructorId)
    }

    /// Get a constructor by id.
    ///
    /// Ids are only minted by this table, so the lookup cannot miss.
    pub fn get(&self, id: ConstructorId) -> &Constructor {
        &self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ConstructorTable {
    fn default() -> Self {
        Self::new()
    }
}
