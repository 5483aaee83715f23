use std::sync::Arc;

use galaxy_core::booking::BookingRecord;
use galaxy_core::payment::{PaymentAdapter, PaymentDetails};
use galaxy_core::repository::{BookingStore, FlightCatalog, StoreError};
use galaxy_core::search::SearchCriteria;
use tracing::{error, info, warn};

use crate::builder::BuildContext;
use crate::flow::{BookingFlow, FlowError};
use crate::models::{FlowStep, SearchResults};
use crate::retry::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("Flight catalog unavailable: {0}")]
    Catalog(StoreError),
    #[error("Could not save booking: {0}")]
    Store(StoreError),
}

/// Drives the transitions that need I/O: catalog search and checkout.
///
/// Like the flow itself, every call takes the current flow by reference and
/// hands back a new one. On error the caller keeps the flow it had.
pub struct BookingOrchestrator {
    catalog: Arc<dyn FlightCatalog>,
    bookings: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentAdapter>,
    retry: RetryPolicy,
}

impl BookingOrchestrator {
    pub fn new(
        catalog: Arc<dyn FlightCatalog>,
        bookings: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentAdapter>,
    ) -> Self {
        Self { catalog, bookings, payments, retry: RetryPolicy::default() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Queries the catalog for the outbound leg and, on round trips, the
    /// reversed route on the return date.
    pub async fn search(
        &self,
        flow: &BookingFlow,
        criteria: SearchCriteria,
    ) -> Result<BookingFlow, SessionError> {
        if flow.step() != FlowStep::Searching {
            return Err(FlowError::InvalidTransition { step: flow.step(), action: "submit a search" }.into());
        }
        let results = self.find_offers(&criteria).await?;
        Ok(flow.submit_search(criteria, results)?)
    }

    /// Catalog lookup for both legs without touching any flow.
    pub async fn find_offers(&self, criteria: &SearchCriteria) -> Result<SearchResults, SessionError> {
        criteria.validate().map_err(FlowError::from)?;

        let outbound_query = criteria.outbound_query();
        let outbound = self
            .retry
            .run("Outbound search", || self.catalog.search_flights(&outbound_query))
            .await
            .map_err(SessionError::Catalog)?;

        let inbound = match criteria.return_query() {
            Some(query) => self
                .retry
                .run("Return search", || self.catalog.search_flights(&query))
                .await
                .map_err(SessionError::Catalog)?,
            None => Vec::new(),
        };

        Ok(SearchResults { outbound, inbound })
    }

    /// Validate, reserve seats, charge, persist, confirm.
    ///
    /// Seats are held before the card is touched, so a sold-out leg never
    /// costs the traveller anything. A declined charge is not an error: the
    /// seats go back, and the returned flow stays in `Paying` with the reason
    /// attached so the traveller can retry. If the record cannot be stored
    /// after the charge, the seats are released and the charge refunded.
    pub async fn pay(
        &self,
        flow: &BookingFlow,
        user_id: &str,
        details: &PaymentDetails,
    ) -> Result<BookingFlow, SessionError> {
        if flow.step() != FlowStep::Paying {
            return Err(FlowError::InvalidTransition { step: flow.step(), action: "pay" }.into());
        }
        details.validate().map_err(FlowError::from)?;

        let mut record = flow.build_booking(BuildContext::new(user_id, details.method))?;
        self.bookings.reserve_seats(&record).await.map_err(SessionError::Store)?;

        let receipt = match self.payments.charge(record.total_price, details).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.release(&record).await;
                return Ok(flow.record_payment_failure(e.to_string())?);
            }
        };
        record.payment_reference = Some(receipt.reference.clone());

        if let Err(e) = self.bookings.create_booking(&record).await {
            error!("Booking {} not stored after payment {}: {}", record.booking_id, receipt.reference, e);
            self.release(&record).await;
            match self.payments.refund(&receipt).await {
                Ok(()) => warn!("Payment {} refunded", receipt.reference),
                Err(refund) => error!("Refund of payment {} failed: {}", receipt.reference, refund),
            }
            return Err(SessionError::Store(e));
        }

        info!("Booking {} stored for user {}", record.booking_id, user_id);
        Ok(flow.confirm(record)?)
    }

    async fn release(&self, record: &BookingRecord) {
        if let Err(e) = self.bookings.release_seats(record).await {
            error!("Seats held for booking {} could not be released: {}", record.booking_id, e);
        }
    }
}
