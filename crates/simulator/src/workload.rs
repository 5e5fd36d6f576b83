//! Seeded order-request generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sagasim_saga::RoundGateway;
use sagasim_types::{Request, Round, ServiceId};
use tracing::debug;

const CUSTOMERS: [&str; 4] = [
    "customer-123",
    "customer-456",
    "customer-789",
    "customer-901",
];

/// Generates order payment requests deterministically from a seed.
///
/// Order ids are sequential; customers and arrival rounds are drawn from
/// the seeded rng, so the same seed always yields the same workload.
pub struct OrderWorkload {
    rng: ChaCha8Rng,
    next_order: u64,
}

impl OrderWorkload {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_order: 0,
        }
    }

    /// The next order request.
    pub fn next_request(&mut self) -> Request {
        self.next_order += 1;
        let customer = CUSTOMERS[self.rng.gen_range(0..CUSTOMERS.len())];
        Request::new(ServiceId::Payment, "payment")
            .with_field("order_id", format!("order-{}", self.next_order))
            .with_field("customer_id", customer)
    }

    /// Submit `count` requests to the gateway, each arriving at a random
    /// round in `[0, arrival_span)`.
    pub fn submit(&mut self, gateway: &RoundGateway, count: usize, arrival_span: u64) {
        for _ in 0..count {
            let round = Round(self.rng.gen_range(0..arrival_span.max(1)));
            let request = self.next_request();
            debug!(
                order = request.body.get_str("order_id").unwrap_or(""),
                %round,
                "request scheduled",
            );
            gateway.submit(request, round);
        }
    }
}
