use crate::ports::DnsResolver;
use async_trait::async_trait;
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::sync::Arc;
use tracing::debug;

/// Tries resolvers in construction order and returns the first response that
/// carries answer records.
///
/// Each resolver runs to completion before the next one starts. A failure is
/// returned as-is and stops the chain; only an empty answer moves on. When
/// every resolver answers empty, the last response is returned unchanged.
pub struct FallbackResolver {
    resolvers: Vec<Arc<dyn DnsResolver>>,
}

impl FallbackResolver {
    pub fn new(first: Arc<dyn DnsResolver>) -> Self {
        Self {
            resolvers: vec![first],
        }
    }

    /// Appends a resolver consulted when every earlier one answered empty.
    pub fn then(mut self, next: Arc<dyn DnsResolver>) -> Self {
        self.resolvers.push(next);
        self
    }

    /// `None` for an empty list.
    pub fn from_resolvers(resolvers: Vec<Arc<dyn DnsResolver>>) -> Option<Self> {
        if resolvers.is_empty() {
            None
        } else {
            Some(Self { resolvers })
        }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[async_trait]
impl DnsResolver for FallbackResolver {
    async fn resolve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        let mut last = None;

        for (index, resolver) in self.resolvers.iter().enumerate() {
            let response = resolver.resolve(request).await?;

            if response.has_answers() {
                debug!(
                    resolver = resolver.name(),
                    position = index,
                    answers = response.answer_count(),
                    "Resolver answered"
                );
                return Ok(response);
            }

            debug!(resolver = resolver.name(), position = index, "Empty answer, falling through");
            last = Some(response);
        }

        last.ok_or_else(|| DomainError::resolution_failure("no resolvers configured"))
    }

    fn name(&self) -> &str {
        "fallback"
    }
}
