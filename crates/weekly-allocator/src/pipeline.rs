//! Weekly Run
//!
//! Fetch inputs, decide the allocation, place orders, journal the week and
//! text a summary.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::broker::{BrokerClient, OrderAck, plan_orders};
use crate::error::{AllocatorError, Result};
use crate::journal::{JournalRecord, WeeklyJournal};
use crate::market::series::{change_between, days_before, latest_change, period_change};
use crate::market::{
    BITCOIN_PROXY_SYMBOL, DOLLAR_INDEX_SYMBOL, M2_SERIES_ID, MacroSeries, PriceHistory,
    SentimentSource, TEN_YEAR_SERIES_ID, WeekWindow,
};
use crate::model::{MacroDeltas, WeeklyInputs};
use crate::notify::{Notifier, WeeklySummary};
use crate::strategy::{AllocationEngine, IndexStrengthCalculator};

/// Extra week of DXY history so last Monday always has an as-of value
const DOLLAR_INDEX_LOOKBACK_DAYS: u64 = 7;

/// 10Y yield history requested per run
const YIELD_LOOKBACK_DAYS: u64 = 30;

fn m2_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Outcome of one weekly run
#[derive(Clone, Debug)]
pub struct WeeklyReport {
    pub summary: WeeklySummary,
    pub orders: Vec<OrderAck>,
    pub sms_sid: Option<String>,
}

pub struct WeeklyRun {
    sentiment: Arc<dyn SentimentSource>,
    prices: Arc<dyn PriceHistory>,
    macro_series: Arc<dyn MacroSeries>,
    broker: Arc<dyn BrokerClient>,
    notifier: Option<Arc<dyn Notifier>>,
    journal: Option<WeeklyJournal>,
    calculator: IndexStrengthCalculator,
    engine: AllocationEngine,
    contribution: f64,
}

impl WeeklyRun {
    pub fn new(
        sentiment: Arc<dyn SentimentSource>,
        prices: Arc<dyn PriceHistory>,
        macro_series: Arc<dyn MacroSeries>,
        broker: Arc<dyn BrokerClient>,
    ) -> Self {
        Self {
            sentiment,
            prices,
            macro_series,
            broker,
            notifier: None,
            journal: None,
            calculator: IndexStrengthCalculator::default(),
            engine: AllocationEngine::default(),
            contribution: crate::config::DEFAULT_CONTRIBUTION,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_journal(mut self, journal: WeeklyJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_calculator(mut self, calculator: IndexStrengthCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_contribution(mut self, contribution: f64) -> Self {
        self.contribution = contribution;
        self
    }

    /// Pull the week's sentiment and macro readings
    pub async fn gather_inputs(&self, window: &WeekWindow) -> Result<WeeklyInputs> {
        let fng_value = self.sentiment.fear_greed().await?;
        info!(fng_value, source = self.sentiment.name(), "Fear & Greed Index");

        let bitcoin_weekly_change = match self.bitcoin_weekly_change(window).await {
            Ok(change) => {
                info!(symbol = BITCOIN_PROXY_SYMBOL, change, "bitcoin proxy weekly % change");
                Some(change)
            }
            Err(e) => {
                warn!(symbol = BITCOIN_PROXY_SYMBOL, error = %e, "bitcoin proxy performance unavailable");
                None
            }
        };

        let dxy = self
            .prices
            .daily_closes(
                DOLLAR_INDEX_SYMBOL,
                days_before(window.last_monday, DOLLAR_INDEX_LOOKBACK_DAYS),
                window.today,
            )
            .await?;
        let usd_pct_change = change_between(&dxy, window.last_monday, window.last_friday)?;
        info!(usd_pct_change, "USD index % change");

        let m2 = self
            .macro_series
            .observations(M2_SERIES_ID, m2_history_start())
            .await?;
        let m2_pct_change = latest_change(&m2)?;
        info!(m2_pct_change, "M2 % change");

        let ten_year = self
            .macro_series
            .observations(
                TEN_YEAR_SERIES_ID,
                days_before(window.today, YIELD_LOOKBACK_DAYS),
            )
            .await?;
        let yield_pct_change = change_between(&ten_year, window.last_monday, window.last_friday)?;
        info!(yield_pct_change, "10Y yield % change");

        Ok(WeeklyInputs {
            fng_value,
            deltas: MacroDeltas::new(usd_pct_change, m2_pct_change, yield_pct_change),
            bitcoin_weekly_change,
        })
    }

    async fn bitcoin_weekly_change(&self, window: &WeekWindow) -> Result<f64> {
        let closes = self
            .prices
            .daily_closes(BITCOIN_PROXY_SYMBOL, window.last_monday, window.last_friday)
            .await?;
        period_change(&closes)
    }

    /// Score the macro backdrop and allocate the contribution
    pub fn decide(&self, date: NaiveDate, inputs: WeeklyInputs) -> Result<WeeklySummary> {
        let signal = self.calculator.signal(&inputs.deltas);
        let index_strength = self.calculator.score(&inputs.deltas);
        info!(
            index_strength,
            usd_weaker = signal.raw.usd_weaker,
            m2_growing = signal.raw.m2_growing,
            yield_rising = signal.raw.yield_rising,
            yield_counts = signal.yield_counts,
            "index strength"
        );

        let allocation = self
            .engine
            .allocate(inputs.fng_value, index_strength, self.contribution)?;
        info!(
            zone = allocation.zone_label(),
            btc_factor = allocation.btc_factor,
            btc = %format_args!("${:.2}", allocation.dollars.bitcoin),
            voo = %format_args!("${:.2}", allocation.dollars.equity),
            bil = %format_args!("${:.2}", allocation.dollars.cash),
            "allocation"
        );

        Ok(WeeklySummary {
            date,
            inputs,
            index_strength,
            contribution: self.contribution,
            allocation,
        })
    }

    /// Submit one market buy per funded asset class.
    ///
    /// Stops at the first failed submission and returns
    /// [`AllocatorError::OrdersIncomplete`] carrying the legs already accepted.
    pub async fn place_orders(&self, summary: &WeeklySummary) -> Result<Vec<OrderAck>> {
        let orders = plan_orders(&summary.allocation.dollars);
        let mut acks = Vec::with_capacity(orders.len());
        for order in &orders {
            let ack = match self.broker.submit_order(order).await {
                Ok(ack) => ack,
                Err(e) => {
                    error!(
                        broker = self.broker.name(),
                        symbol = %order.symbol,
                        placed = acks.len(),
                        error = %e,
                        "order rejected"
                    );
                    return Err(AllocatorError::OrdersIncomplete {
                        placed: acks,
                        planned: orders.len(),
                        reason: e.to_string(),
                    });
                }
            };
            info!(
                broker = self.broker.name(),
                symbol = %ack.symbol,
                notional = %ack.notional,
                status = %ack.status,
                "order submitted"
            );
            acks.push(ack);
        }
        Ok(acks)
    }

    /// Run the whole week. Journal and SMS failures are logged, not returned.
    ///
    /// A week whose orders only partly went through is still journaled with
    /// the accepted count before the error is returned.
    pub async fn run(&self, today: NaiveDate) -> Result<WeeklyReport> {
        let window = WeekWindow::ending(today);
        info!(%today, last_monday = %window.last_monday, last_friday = %window.last_friday, "weekly run");

        let inputs = self.gather_inputs(&window).await?;
        let summary = self.decide(today, inputs)?;
        let orders = match self.place_orders(&summary).await {
            Ok(orders) => orders,
            Err(e) => {
                if !e.placed_orders().is_empty() {
                    self.journal_week(&summary, e.placed_orders().len());
                }
                return Err(e);
            }
        };

        self.journal_week(&summary, orders.len());

        let text = summary.to_text();
        info!("\n{text}");

        let sms_sid = match &self.notifier {
            Some(notifier) => match notifier.send(&text).await {
                Ok(sid) => {
                    info!(%sid, via = notifier.name(), "summary sent");
                    Some(sid)
                }
                Err(e) => {
                    warn!(error = %e, "error sending summary");
                    None
                }
            },
            None => {
                warn!("no notifier configured, summary not sent");
                None
            }
        };

        Ok(WeeklyReport {
            summary,
            orders,
            sms_sid,
        })
    }

    fn journal_week(&self, summary: &WeeklySummary, orders_placed: usize) {
        if let Some(journal) = &self.journal {
            let record = JournalRecord::from_summary(summary, orders_placed);
            match journal.append(&record) {
                Ok(()) => info!(path = %journal.path().display(), orders_placed, "week journaled"),
                Err(e) => error!(error = %e, "failed to journal week"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{OrderRequest, PaperBroker};
    use crate::market::{Observation, StaticMarketData};
    use crate::notify::RecordingNotifier;
    use crate::strategy::RiskZone;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(points: &[(&str, f64)]) -> Vec<Observation> {
        points.iter().map(|(date, v)| Observation::new(d(date), *v)).collect()
    }

    /// Week ending Monday 2024-06-17: weaker dollar, growing M2, falling yields
    fn market(fng_value: i64) -> Arc<StaticMarketData> {
        Arc::new(
            StaticMarketData::new()
                .with_fear_greed(fng_value)
                .with_prices(
                    BITCOIN_PROXY_SYMBOL,
                    obs(&[("2024-06-10", 60.0), ("2024-06-12", 61.5), ("2024-06-13", 62.0)]),
                )
                .with_prices(
                    DOLLAR_INDEX_SYMBOL,
                    obs(&[("2024-06-07", 104.9), ("2024-06-10", 105.0), ("2024-06-14", 104.5)]),
                )
                .with_series(
                    M2_SERIES_ID,
                    obs(&[("2024-03-01", 20_800.0), ("2024-04-01", 20_900.0), ("2024-05-01", 21_000.0)]),
                )
                .with_series(
                    TEN_YEAR_SERIES_ID,
                    obs(&[("2024-06-07", 4.43), ("2024-06-10", 4.47), ("2024-06-14", 4.22)]),
                ),
        )
    }

    fn run_with(data: Arc<StaticMarketData>, broker: Arc<dyn BrokerClient>) -> WeeklyRun {
        WeeklyRun::new(data.clone(), data.clone(), data, broker)
    }

    #[tokio::test]
    async fn test_gather_inputs() {
        let run = run_with(market(40), Arc::new(PaperBroker::new()));
        let inputs = run.gather_inputs(&WeekWindow::ending(d("2024-06-17"))).await.unwrap();

        assert_eq!(inputs.fng_value, 40);
        assert!(inputs.deltas.usd_pct_change < 0.0);
        assert!(inputs.deltas.m2_pct_change > 0.0);
        assert!(inputs.deltas.yield_pct_change < 0.0);
        assert_eq!(inputs.bitcoin_weekly_change, Some(3.33));
    }

    #[tokio::test]
    async fn test_full_run() {
        let broker = Arc::new(PaperBroker::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let dir = tempfile::tempdir().unwrap();
        let journal = WeeklyJournal::new(dir.path().join("history.csv"));

        let run = run_with(market(40), broker.clone())
            .with_notifier(notifier.clone())
            .with_journal(journal.clone());
        let report = run.run(d("2024-06-17")).await.unwrap();

        // Two risk-on signals -> 0.75; Fear zone -> btc 0.5625
        assert_eq!(report.summary.index_strength, 0.75);
        assert_eq!(report.summary.allocation.zone, RiskZone::Fear);

        let orders: Vec<OrderRequest> = broker.orders().await;
        let placed: Vec<_> = orders.iter().map(|o| (o.symbol.as_str(), o.notional)).collect();
        assert_eq!(placed, vec![("FBTC", dec!(84.37)), ("VOO", dec!(65.62))]);
        assert_eq!(report.orders.len(), 2);

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Weekly Allocation Summary (2024-06-17):"));
        assert_eq!(report.sms_sid.as_deref(), Some("local-1"));

        let rows = journal.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].orders_placed, 2);
        assert_eq!(rows[0].zone, "Fear");
    }

    #[tokio::test]
    async fn test_missing_bitcoin_prices_do_not_block_run() {
        let data = Arc::new(
            StaticMarketData::new()
                .with_fear_greed(90)
                .with_prices(DOLLAR_INDEX_SYMBOL, obs(&[("2024-06-10", 105.0), ("2024-06-14", 105.5)]))
                .with_series(M2_SERIES_ID, obs(&[("2024-04-01", 21_000.0), ("2024-05-01", 20_900.0)]))
                .with_series(TEN_YEAR_SERIES_ID, obs(&[("2024-06-10", 4.2), ("2024-06-14", 4.3)])),
        );
        let broker = Arc::new(PaperBroker::new());
        let report = run_with(data, broker.clone()).run(d("2024-06-17")).await.unwrap();

        assert_eq!(report.summary.inputs.bitcoin_weekly_change, None);
        assert_eq!(report.summary.index_strength, 0.5);
        assert_eq!(report.summary.allocation.zone, RiskZone::ExtremeGreed);
        assert_eq!(report.sms_sid, None);

        let symbols: Vec<_> = broker.orders().await.into_iter().map(|o| o.symbol).collect();
        assert_eq!(symbols, vec!["VOO", "VBIL"]);
    }

    struct RejectingBroker;

    #[async_trait]
    impl BrokerClient for RejectingBroker {
        async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
            Err(AllocatorError::Broker(format!("{} not tradable", order.symbol)))
        }

        fn name(&self) -> &str {
            "Rejecting"
        }
    }

    #[tokio::test]
    async fn test_broker_failure_aborts_before_sms() {
        let notifier = Arc::new(RecordingNotifier::new());
        let run = run_with(market(20), Arc::new(RejectingBroker)).with_notifier(notifier.clone());

        let err = run.run(d("2024-06-17")).await.unwrap_err();
        assert!(matches!(
            err,
            AllocatorError::OrdersIncomplete { ref placed, planned: 2, .. } if placed.is_empty()
        ));
        assert!(!err.is_retryable());
        assert!(notifier.sent().await.is_empty());
    }

    /// Accepts every order except those for one symbol
    struct RejectSymbolBroker {
        inner: PaperBroker,
        rejected: &'static str,
    }

    #[async_trait]
    impl BrokerClient for RejectSymbolBroker {
        async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
            if order.symbol == self.rejected {
                return Err(AllocatorError::Broker("insufficient buying power".into()));
            }
            self.inner.submit_order(order).await
        }

        fn name(&self) -> &str {
            "RejectSymbol"
        }
    }

    #[tokio::test]
    async fn test_second_leg_failure_keeps_first_leg() {
        let broker = Arc::new(RejectSymbolBroker {
            inner: PaperBroker::new(),
            rejected: "VOO",
        });
        let notifier = Arc::new(RecordingNotifier::new());
        let dir = tempfile::tempdir().unwrap();
        let journal = WeeklyJournal::new(dir.path().join("history.csv"));

        let run = run_with(market(40), broker.clone())
            .with_notifier(notifier.clone())
            .with_journal(journal.clone());
        let err = run.run(d("2024-06-17")).await.unwrap_err();

        // FBTC went through, VOO did not; the week must not be rerun
        assert!(!err.is_retryable());
        let placed: Vec<_> = err.placed_orders().iter().map(|a| (a.symbol.as_str(), a.notional)).collect();
        assert_eq!(placed, vec![("FBTC", dec!(84.37))]);
        assert!(matches!(err, AllocatorError::OrdersIncomplete { planned: 2, .. }));

        let submitted: Vec<_> = broker.inner.orders().await.into_iter().map(|o| o.symbol).collect();
        assert_eq!(submitted, vec!["FBTC"]);

        let rows = journal.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].orders_placed, 1);
        assert!(notifier.sent().await.is_empty());
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _body: &str) -> Result<String> {
            Err(AllocatorError::Notify("HTTP 401".into()))
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    #[tokio::test]
    async fn test_sms_failure_is_not_fatal() {
        let broker = Arc::new(PaperBroker::new());
        let run = run_with(market(65), broker.clone()).with_notifier(Arc::new(FailingNotifier));

        let report = run.run(d("2024-06-17")).await.unwrap();
        assert_eq!(report.sms_sid, None);
        assert!(!broker.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_macro_series_fails() {
        let data = Arc::new(StaticMarketData::new().with_fear_greed(50));
        let run = run_with(data, Arc::new(PaperBroker::new()));
        let err = run.run(d("2024-06-17")).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_decide_respects_contribution_and_calculator() {
        let run = run_with(market(30), Arc::new(PaperBroker::new()))
            .with_contribution(0.0)
            .with_calculator(IndexStrengthCalculator::new(false));
        let inputs = WeeklyInputs {
            fng_value: 30,
            deltas: MacroDeltas::new(0.5, -0.1, -0.3),
            bitcoin_weekly_change: None,
        };

        let summary = run.decide(d("2024-06-17"), inputs).unwrap();
        assert_eq!(summary.index_strength, 0.5);
        assert_eq!(summary.allocation.dollars.total(), 0.0);
        assert!(plan_orders(&summary.allocation.dollars).is_empty());
    }
}
