//! The VeriTag node: wires the configured collaborators into a
//! [`VerificationService`].

use std::sync::Arc;
use tracing::{info, warn};

use veritag_gateway::{HttpContentStore, HttpLedgerClient};
use veritag_store::{ContentStore, LedgerClient, MemoryRegistry, SystemClock, Unconfigured};
use veritag_verification::{Collaborators, VerificationOrchestrator};

use crate::config::NodeConfig;
use crate::metrics::NodeMetrics;
use crate::service::VerificationService;
use crate::NodeError;

pub struct VeritagNode {
    pub config: NodeConfig,
    pub registry: Arc<MemoryRegistry>,
    pub metrics: Arc<NodeMetrics>,
    pub service: Arc<VerificationService>,
}

impl VeritagNode {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;

        let registry = Arc::new(match &config.registry_seed {
            Some(path) => {
                let registry = MemoryRegistry::from_seed_file(path)?;
                info!(seed = %path.display(), "product registry loaded");
                registry
            }
            None => {
                warn!("no registry seed configured, every product will be unknown");
                MemoryRegistry::new()
            }
        });

        let ledger: Arc<dyn LedgerClient> = match &config.ledger_url {
            Some(url) => Arc::new(HttpLedgerClient::with_timeout(url, config.check_timeout())?),
            None => {
                warn!("no ledger configured, ledger evidence will be indeterminate");
                Arc::new(Unconfigured::new("ledger"))
            }
        };

        let content: Arc<dyn ContentStore> = match &config.content_store_url {
            Some(url) => Arc::new(HttpContentStore::with_timeout(url, config.check_timeout())?),
            None => {
                warn!("no content store configured, content evidence will be indeterminate");
                Arc::new(Unconfigured::new("content store"))
            }
        };

        let metrics = Arc::new(NodeMetrics::new());
        let orchestrator = VerificationOrchestrator::new(
            Collaborators {
                registry: registry.clone(),
                ledger: ledger.clone(),
                content,
            },
            Arc::new(SystemClock),
        )
        .with_policy(config.policy.clone())
        .with_limits(config.collection_limits());

        let service = VerificationService::new(orchestrator, ledger, registry.clone(), metrics.clone())
            .with_ledger_anchoring(config.anchor_on_ledger);

        Ok(Self {
            config,
            registry,
            metrics,
            service: Arc::new(service),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use veritag_types::{ProductId, VerificationRequest};

    use crate::service::VerifyCommand;
    use crate::NodeError;

    #[tokio::test]
    async fn unconfigured_sources_yield_indeterminate_evidence() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        write!(
            seed,
            r#"{{
                "manufacturers": [{{"id": 1, "name": "Acme", "is_active": true, "is_verified": true}}],
                "products": [{{
                    "id": 5, "name": "Widget", "description": "A widget",
                    "manufacturing_date": 1700000000, "batch_number": "W-100",
                    "category": "electronics", "manufacturer_id": 1,
                    "qr_hash": "{qr}", "ledger_id": 77
                }}]
            }}"#,
            qr = "ab".repeat(32)
        )
        .unwrap();

        let config = NodeConfig {
            registry_seed: Some(seed.path().to_path_buf()),
            ..NodeConfig::default()
        };
        let node = VeritagNode::new(config).unwrap();
        let response = node
            .service
            .verify(VerifyCommand {
                request: VerificationRequest {
                    product_id: Some(5),
                    claimed_qr_hash: "ab".repeat(32),
                    ..Default::default()
                },
                verifier_id: None,
            })
            .await
            .unwrap();

        assert!(response.is_authentic);
        assert!(!response.ledger_anchored);
        let ledger = response
            .evidence
            .iter()
            .find(|r| r.check_name() == "ledger_registration")
            .unwrap();
        assert!(ledger.reason().contains("ledger unavailable"));
        assert_eq!(node.service.history(ProductId::new(5)).await.unwrap().len(), 1);
    }

    #[test]
    fn bad_gateway_url_is_rejected() {
        let config = NodeConfig {
            ledger_url: Some("ledger.local".into()),
            ..NodeConfig::default()
        };
        assert!(matches!(VeritagNode::new(config), Err(NodeError::Gateway(_))));
    }
}
