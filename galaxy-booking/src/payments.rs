use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use galaxy_core::payment::{PaymentAdapter, PaymentDetails, PaymentError, PaymentReceipt};
use tracing::info;
use uuid::Uuid;

/// Stand-in gateway: waits, then approves (or declines, for tests).
#[derive(Debug, Clone, Default)]
pub struct SimulatedPaymentAdapter {
    delay: Duration,
    decline: bool,
}

impl SimulatedPaymentAdapter {
    pub fn new(delay: Duration) -> Self {
        Self { delay, decline: false }
    }

    pub fn declining() -> Self {
        Self { delay: Duration::ZERO, decline: true }
    }
}

#[async_trait]
impl PaymentAdapter for SimulatedPaymentAdapter {
    async fn charge(
        &self,
        amount: u64,
        details: &PaymentDetails,
    ) -> Result<PaymentReceipt, PaymentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.decline {
            return Err(PaymentError::Declined("Simulated decline".to_string()));
        }

        let reference = format!("PAY-{}", Uuid::new_v4().simple());
        match &details.card {
            Some(card) => info!(
                "Charged {} to card ending {}, reference {}",
                amount,
                card.number.last_four(),
                reference
            ),
            None => info!("Charged {} via {:?}, reference {}", amount, details.method, reference),
        }
        Ok(PaymentReceipt {
            reference,
            amount,
            method: details.method,
            processed_at: Utc::now(),
        })
    }

    async fn refund(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError> {
        info!("Refunded {} on {}", receipt.amount, receipt.reference);
        Ok(())
    }
}
