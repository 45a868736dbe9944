use promptbank_core::{BackendType, Response};

/// The responses produced by one backend type, borrowed in input order.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    backend_type: BackendType,
    members: Vec<&'a Response>,
}

impl<'a> Partition<'a> {
    /// Select every response whose backend type equals `backend_type`.
    #[must_use]
    pub fn of(responses: &'a [Response], backend_type: BackendType) -> Self {
        let members = responses
            .iter()
            .filter(|r| r.backend_type == backend_type)
            .collect();
        Self {
            backend_type,
            members,
        }
    }

    #[must_use]
    pub fn backend_type(&self) -> BackendType {
        self.backend_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Response> + '_ {
        self.members.iter().copied()
    }
}
