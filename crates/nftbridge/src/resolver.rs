//! Token address resolution
//!
//! The order is fixed: the token's own deployment on the source chain first, then the
//! cross-chain registry, then failure. A wrong address here means a misdirected approval.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::instrument;

use crate::services::AddressRegistry;
use crate::types::{ChainId, Token};
use crate::Error;

/// Resolves the contract address to operate on for a chain pair
#[derive(Clone)]
pub struct TokenResolver {
    registry: Arc<dyn AddressRegistry>,
}

impl TokenResolver {
    /// Create resolver backed by `registry`
    pub fn new(registry: Arc<dyn AddressRegistry>) -> Self {
        Self { registry }
    }

    /// Address of `token` on `src_chain_id`
    #[instrument(skip(self, token), fields(symbol = %token.symbol))]
    pub async fn resolve_token_address(
        &self,
        token: &Token,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
    ) -> Result<Address, Error> {
        if let Some(address) = token.address_on(src_chain_id) {
            return Ok(address);
        }

        tracing::debug!(
            "{} has no deployment on {}, asking registry",
            token.symbol,
            src_chain_id
        );

        self.registry
            .resolve_cross_chain_address(token, src_chain_id, dest_chain_id)
            .await?
            .ok_or_else(|| Error::TokenAddressNotFound {
                symbol: token.symbol.clone(),
                src_chain_id,
                dest_chain_id,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alloy_primitives::address;
    use async_trait::async_trait;

    use super::*;
    use crate::types::TokenStandard;

    const HOME: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const MAPPED: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

    #[derive(Default)]
    struct CountingRegistry {
        answer: Option<Address>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AddressRegistry for CountingRegistry {
        async fn resolve_cross_chain_address(
            &self,
            _token: &Token,
            _src_chain_id: ChainId,
            _dest_chain_id: ChainId,
        ) -> Result<Option<Address>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    #[tokio::test]
    async fn test_same_chain_address_wins() {
        let registry = Arc::new(CountingRegistry {
            answer: Some(MAPPED),
            ..Default::default()
        });
        let resolver = TokenResolver::new(registry.clone());
        let token = Token::new("PUNK", TokenStandard::Erc721, 1, HOME);

        let address = resolver.resolve_token_address(&token, 1, 10).await.unwrap();

        assert_eq!(address, HOME);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_registry() {
        let registry = Arc::new(CountingRegistry {
            answer: Some(MAPPED),
            ..Default::default()
        });
        let resolver = TokenResolver::new(registry.clone());
        let token = Token::new("PUNK", TokenStandard::Erc721, 10, HOME);

        let address = resolver.resolve_token_address(&token, 1, 10).await.unwrap();

        assert_eq!(address, MAPPED);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fails_when_nothing_resolves() {
        let resolver = TokenResolver::new(Arc::new(CountingRegistry::default()));
        let token = Token::new("PUNK", TokenStandard::Erc721, 10, HOME);

        let err = resolver
            .resolve_token_address(&token, 1, 10)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::TokenAddressNotFound {
                src_chain_id: 1,
                dest_chain_id: 10,
                ..
            }
        ));
    }
}
