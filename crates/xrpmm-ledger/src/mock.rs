//! In-memory ledger for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use xrpmm_core::{
    BookSide, IssuedAsset, OfferAmount, OfferRequest, OpenOffer, OrderSide, TopOfBook,
    DROPS_PER_NATIVE,
};

use crate::client::{BoxFuture, LedgerClient, SubmitOutcome};
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug)]
struct MockState {
    ask: Option<TopOfBook>,
    bid: Option<TopOfBook>,
    native_balance: Decimal,
    asset_balance: Decimal,
    offers: Vec<OpenOffer>,
    next_sequence: u32,
    fail_books: bool,
    fail_balances: bool,
    fail_offers: bool,
    cancel_result: Option<SubmitOutcome>,
    create_result: Option<SubmitOutcome>,
    rest_created: bool,
    latency: Option<Duration>,
    cancels: Vec<u32>,
    creates: Vec<OfferRequest>,
    offer_reads: usize,
}

/// Mock ledger client.
///
/// Accepted cancels remove the resting offer; accepted creates are only
/// added to the resting list when [`MockLedger::set_rest_created`] is on.
#[derive(Debug)]
pub struct MockLedger {
    state: Mutex<MockState>,
    connected: AtomicBool,
    refuse_connect: AtomicBool,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                ask: None,
                bid: None,
                native_balance: Decimal::ZERO,
                asset_balance: Decimal::ZERO,
                offers: Vec::new(),
                next_sequence: 1,
                fail_books: false,
                fail_balances: false,
                fail_offers: false,
                cancel_result: None,
                create_result: None,
                rest_created: false,
                latency: None,
                cancels: Vec::new(),
                creates: Vec::new(),
                offer_reads: 0,
            }),
            connected: AtomicBool::new(false),
            refuse_connect: AtomicBool::new(false),
        }
    }

    /// Make `connect()` fail as an unreachable node would.
    pub fn set_refuse_connect(&self, refuse: bool) {
        self.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    /// Best ask in traded-asset units per native unit; `None` empties the book.
    pub fn set_ask_price(&self, price: Option<Decimal>) {
        self.state.lock().ask = price.map(|p| TopOfBook {
            side: BookSide::Ask,
            quality: p / DROPS_PER_NATIVE,
        });
    }

    /// Best bid in traded-asset units per native unit; `None` empties the book.
    pub fn set_bid_price(&self, price: Option<Decimal>) {
        self.state.lock().bid = price.map(|p| TopOfBook {
            side: BookSide::Bid,
            quality: DROPS_PER_NATIVE / p,
        });
    }

    /// Spendable native balance, reserve already excluded.
    pub fn set_native_balance(&self, balance: Decimal) {
        self.state.lock().native_balance = balance;
    }

    pub fn set_asset_balance(&self, balance: Decimal) {
        self.state.lock().asset_balance = balance;
    }

    pub fn add_offer(&self, offer: OpenOffer) {
        let mut state = self.state.lock();
        state.next_sequence = state.next_sequence.max(offer.sequence + 1);
        state.offers.push(offer);
    }

    pub fn set_fail_books(&self, fail: bool) {
        self.state.lock().fail_books = fail;
    }

    pub fn set_fail_balances(&self, fail: bool) {
        self.state.lock().fail_balances = fail;
    }

    pub fn set_fail_offers(&self, fail: bool) {
        self.state.lock().fail_offers = fail;
    }

    /// Force every cancel to answer `result`; `None` restores acceptance.
    pub fn set_cancel_result(&self, result: Option<SubmitOutcome>) {
        self.state.lock().cancel_result = result;
    }

    /// Force every create to answer `result`; `None` restores acceptance.
    pub fn set_create_result(&self, result: Option<SubmitOutcome>) {
        self.state.lock().create_result = result;
    }

    pub fn set_rest_created(&self, rest: bool) {
        self.state.lock().rest_created = rest;
    }

    /// Delay every ledger call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().latency = latency;
    }

    pub fn offers(&self) -> Vec<OpenOffer> {
        self.state.lock().offers.clone()
    }

    pub fn cancels(&self) -> Vec<u32> {
        self.state.lock().cancels.clone()
    }

    pub fn creates(&self) -> Vec<OfferRequest> {
        self.state.lock().creates.clone()
    }

    /// Number of `list_open_offers` calls served.
    pub fn offer_reads(&self) -> usize {
        self.state.lock().offer_reads
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn injected() -> LedgerError {
        LedgerError::HttpClient("injected failure".to_string())
    }
}

fn resting_offer(sequence: u32, request: &OfferRequest) -> LedgerResult<OpenOffer> {
    let native = OfferAmount::Native(request.size.to_drops()?);
    let issued = OfferAmount::Issued {
        asset: request.asset.clone(),
        value: request.notional,
    };
    let (taker_gets, taker_pays) = match request.side {
        OrderSide::Sell => (native, issued),
        OrderSide::Buy => (issued, native),
    };
    Ok(OpenOffer {
        sequence,
        taker_gets,
        taker_pays,
    })
}

impl LedgerClient for MockLedger {
    fn connect(&self) -> BoxFuture<'_, LedgerResult<()>> {
        Box::pin(async move {
            if self.refuse_connect.load(Ordering::SeqCst) {
                return Err(LedgerError::HttpClient("connection refused".to_string()));
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, LedgerResult<()>> {
        Box::pin(async move {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        })
    }

    fn list_open_offers(&self) -> BoxFuture<'_, LedgerResult<Vec<OpenOffer>>> {
        Box::pin(async move {
            self.delay().await;
            let mut state = self.state.lock();
            state.offer_reads += 1;
            if state.fail_offers {
                return Err(Self::injected());
            }
            Ok(state.offers.clone())
        })
    }

    fn top_of_book<'a>(
        &'a self,
        side: BookSide,
        _asset: &'a IssuedAsset,
    ) -> BoxFuture<'a, LedgerResult<Option<TopOfBook>>> {
        Box::pin(async move {
            self.delay().await;
            let state = self.state.lock();
            if state.fail_books {
                return Err(Self::injected());
            }
            Ok(match side {
                BookSide::Ask => state.ask,
                BookSide::Bid => state.bid,
            })
        })
    }

    fn native_balance(&self) -> BoxFuture<'_, LedgerResult<Decimal>> {
        Box::pin(async move {
            self.delay().await;
            let state = self.state.lock();
            if state.fail_balances {
                return Err(Self::injected());
            }
            Ok(state.native_balance)
        })
    }

    fn asset_balance<'a>(&'a self, _asset: &'a IssuedAsset) -> BoxFuture<'a, LedgerResult<Decimal>> {
        Box::pin(async move {
            self.delay().await;
            let state = self.state.lock();
            if state.fail_balances {
                return Err(Self::injected());
            }
            Ok(state.asset_balance)
        })
    }

    fn cancel_offer(&self, sequence: u32) -> BoxFuture<'_, SubmitOutcome> {
        Box::pin(async move {
            self.delay().await;
            let mut state = self.state.lock();
            state.cancels.push(sequence);
            let outcome = state.cancel_result.clone().unwrap_or(SubmitOutcome::Accepted {
                engine_result: "tesSUCCESS".to_string(),
            });
            if outcome.is_success() {
                state.offers.retain(|o| o.sequence != sequence);
            }
            outcome
        })
    }

    fn create_offer(&self, request: OfferRequest) -> BoxFuture<'_, SubmitOutcome> {
        Box::pin(async move {
            self.delay().await;
            let mut state = self.state.lock();
            let outcome = state.create_result.clone().unwrap_or(SubmitOutcome::Accepted {
                engine_result: "tesSUCCESS".to_string(),
            });
            if outcome.is_success() && state.rest_created {
                let sequence = state.next_sequence;
                match resting_offer(sequence, &request) {
                    Ok(offer) => {
                        state.next_sequence += 1;
                        state.offers.push(offer);
                    }
                    Err(e) => {
                        state.creates.push(request);
                        return SubmitOutcome::Failed(e.to_string());
                    }
                }
            }
            state.creates.push(request);
            outcome
        })
    }
}
