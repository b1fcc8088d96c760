use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::models::Booking;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Downstream booking-system notification. Best effort: a failure never
/// blocks or unwinds a confirmed booking.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify(&self, booking: &Booking) -> anyhow::Result<()>;
}

pub struct HttpBookingNotifier {
    url: String,
    client: reqwest::Client,
}

impl HttpBookingNotifier {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build notifier HTTP client")?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl BookingNotifier for HttpBookingNotifier {
    async fn notify(&self, booking: &Booking) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(booking)
            .send()
            .await
            .context("failed to call booking API")?
            .error_for_status()
            .context("booking API returned error")?;

        Ok(())
    }
}
