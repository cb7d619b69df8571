use std::{collections::HashSet, sync::Arc};

/// Restricts which stored procedures the RPC endpoint will call.
///
/// An empty allowlist permits every name.
#[derive(Clone, Debug, Default)]
pub struct ProcedureAllowlist {
    names: Arc<HashSet<String>>,
}

impl ProcedureAllowlist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Arc::new(
                names
                    .into_iter()
                    .map(Into::into)
                    .filter(|name: &String| !name.trim().is_empty())
                    .collect(),
            ),
        }
    }

    pub fn is_open(&self) -> bool {
        self.names.is_empty()
    }

    pub fn permits(&self, spname: &str) -> bool {
        self.is_open() || self.names.contains(spname)
    }
}
