//! CLI definition and dispatch

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use weekly_allocator::broker::{AlpacaClient, BrokerClient, PaperBroker};
use weekly_allocator::config::{self, AllocatorConfig, DEFAULT_CONTRIBUTION};
use weekly_allocator::journal::WeeklyJournal;
use weekly_allocator::market::{CoinMarketCapClient, FredClient, YahooChartClient};
use weekly_allocator::notify::{Notifier, TwilioClient, WeeklySummary};
use weekly_allocator::{IndexStrengthCalculator, MacroDeltas, WeeklyInputs, WeeklyRun};

#[derive(Parser, Debug)]
#[command(name = "weekly-runner", about = "Weekly sentiment and macro driven allocation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch this week's inputs, place orders, journal and text the summary
    Run {
        /// Use the in-memory paper broker and skip the journal and SMS
        #[arg(long)]
        dry_run: bool,
        /// Override CONTRIBUTION
        #[arg(long)]
        contribution: Option<f64>,
        /// Override JOURNAL_PATH
        #[arg(long)]
        journal: Option<PathBuf>,
        /// Run as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Compute an allocation from given readings without touching any API
    Allocate {
        /// Fear & Greed Index value
        #[arg(long)]
        fng: i64,
        /// US Dollar Index % change
        #[arg(long, allow_hyphen_values = true)]
        usd: f64,
        /// M2 money supply % change
        #[arg(long, allow_hyphen_values = true)]
        m2: f64,
        /// 10-Year Treasury yield % change
        #[arg(long = "yield", allow_hyphen_values = true)]
        yield_change: f64,
        #[arg(long, default_value_t = DEFAULT_CONTRIBUTION)]
        contribution: f64,
        /// Count falling rather than rising yields as risk-on
        #[arg(long)]
        yields_falling_risk_on: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run {
            dry_run,
            contribution,
            journal,
            date,
        } => weekly(dry_run, contribution, journal, date).await,
        Command::Allocate {
            fng,
            usd,
            m2,
            yield_change,
            contribution,
            yields_falling_risk_on,
        } => {
            let inputs = WeeklyInputs {
                fng_value: fng,
                deltas: MacroDeltas::new(usd, m2, yield_change),
                bitcoin_weekly_change: None,
            };
            let summary = offline_summary(inputs, contribution, !yields_falling_risk_on)?;
            println!("{}", summary.to_text());
            println!();
            for (asset, weight) in summary.allocation.weights.iter() {
                println!("  {:<8} {:>6.2}%", asset.symbol(), weight * 100.0);
            }
            Ok(())
        }
    }
}

fn offline_summary(
    inputs: WeeklyInputs,
    contribution: f64,
    yields_risk_on: bool,
) -> anyhow::Result<WeeklySummary> {
    let calculator = IndexStrengthCalculator::new(yields_risk_on);
    let index_strength = calculator.score(&inputs.deltas);
    let allocation = weekly_allocator::strategy::AllocationEngine::default().allocate(
        inputs.fng_value,
        index_strength,
        contribution,
    )?;
    Ok(WeeklySummary {
        date: Local::now().date_naive(),
        inputs,
        index_strength,
        contribution,
        allocation,
    })
}

async fn weekly(
    dry_run: bool,
    contribution: Option<f64>,
    journal: Option<PathBuf>,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let cfg = AllocatorConfig::from_env()?;
    let http = config::http_client()?;

    let contribution = contribution.unwrap_or(cfg.contribution);
    if !contribution.is_finite() || contribution < 0.0 {
        anyhow::bail!("contribution must be a non-negative amount, got {contribution}");
    }

    let broker: Arc<dyn BrokerClient> = if dry_run {
        tracing::info!("dry run: orders go to the in-memory paper broker");
        Arc::new(PaperBroker::new())
    } else {
        let creds = cfg.broker.as_ref().ok_or_else(|| {
            anyhow::anyhow!("ALPACA_KEY_ID and ALPACA_SECRET_KEY are required (or pass --dry-run)")
        })?;
        tracing::info!("✓ Alpaca configured at {}", creds.base_url);
        Arc::new(
            AlpacaClient::new(http.clone(), &creds.key_id, &creds.secret_key)
                .with_base_url(&creds.base_url),
        )
    };

    let mut pipeline = WeeklyRun::new(
        Arc::new(CoinMarketCapClient::new(http.clone(), &cfg.cmc_key)),
        Arc::new(YahooChartClient::new(http.clone())),
        Arc::new(FredClient::new(http.clone(), &cfg.fred_key)),
        broker,
    )
    .with_calculator(IndexStrengthCalculator::new(cfg.yields_risk_on))
    .with_contribution(contribution);

    if !dry_run {
        let path = journal.unwrap_or_else(|| cfg.journal_path.clone());
        pipeline = pipeline.with_journal(WeeklyJournal::new(path));

        match &cfg.twilio {
            Some(twilio) => {
                let notifier: Arc<dyn Notifier> =
                    Arc::new(TwilioClient::new(http.clone(), twilio.clone()));
                pipeline = pipeline.with_notifier(notifier);
                tracing::info!("✓ Twilio configured");
            }
            None => {
                tracing::warn!("⚠ Twilio not configured - summary will only be logged");
                tracing::warn!("  Set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_PHONE_NUMBER and MY_PHONE_NUMBER in .env");
            }
        }
    }

    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let report = pipeline.run(today).await.map_err(|e| {
        if e.is_retryable() {
            tracing::error!("weekly run failed before any order, safe to retry: {e}");
        } else {
            for ack in e.placed_orders() {
                tracing::error!(
                    "already placed {} ${} ({}), do not rerun this week",
                    ack.symbol,
                    ack.notional,
                    ack.order_id
                );
            }
        }
        e
    })?;

    tracing::info!(
        "Placed {} order(s) for {} ({})",
        report.orders.len(),
        report.summary.date,
        report.summary.allocation.zone_label()
    );
    Ok(())
}
