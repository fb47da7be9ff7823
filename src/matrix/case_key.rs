use serde::{Deserialize, Serialize};

use super::TypeMatrix;

/// Number of sampled arguments passed to the function under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    One,
    Two,
}

impl Arity {
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    pub fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// The ordered type names of one case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CaseKey {
    types: Vec<&'static str>,
}

impl CaseKey {
    pub fn new(types: Vec<&'static str>) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &[&'static str] {
        &self.types
    }

    /// `int`, or `int_str` for two-argument cases.
    pub fn label(&self) -> String {
        self.types.join("_")
    }

    pub fn test_name(&self) -> String {
        format!("test_{}", self.label())
    }
}

impl TypeMatrix {
    /// Every case key for `arity`, in matrix order. For two arguments the
    /// first operand is the outer loop.
    pub fn case_keys(&self, arity: Arity) -> Vec<CaseKey> {
        let names: Vec<&'static str> = self.type_names().collect();
        match arity {
            Arity::One => names.iter().map(|n| CaseKey::new(vec![*n])).collect(),
            Arity::Two => names
                .iter()
                .flat_map(|a| names.iter().map(move |b| CaseKey::new(vec![*a, *b])))
                .collect(),
        }
    }
}
