use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use fhir::{Communication, CommunicationSynthesizer};
use hl7::Hl7Synthesizer;
use hub_core::config::clamp_capacity;
use hub_core::constants::{DEFAULT_INGEST_INTERVAL_MAX_MS, DEFAULT_INGEST_INTERVAL_MIN_MS};
use hub_core::{AggregationStore, ConnectorStatusSimulator, RequestFeed, DEFAULT_REQUEST_CAPACITY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Requests printed after a simulation run.
const NEWEST_SHOWN: usize = 10;

#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "Nurse-call integration hub CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print synthesized HL7 v2 messages, one segment per line
    Hl7 {
        /// Number of messages
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print synthesized FHIR Communication resources as pretty JSON
    Fhir {
        /// Number of resources
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Feed synthetic requests into an in-memory store and print the result
    Simulate {
        /// Number of requests to ingest
        #[arg(long, default_value_t = 25)]
        events: usize,
        /// Store capacity (values below 1 are clamped)
        #[arg(long, default_value_t = DEFAULT_REQUEST_CAPACITY as i64, allow_negative_numbers = true)]
        capacity: i64,
        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hub_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Hl7 { count }) => {
            for (i, message) in Hl7Synthesizer::synthesize_batch(count).iter().enumerate() {
                if i > 0 {
                    println!();
                }
                for line in message.raw_message.split('\r') {
                    println!("{line}");
                }
            }
        }
        Some(Commands::Fhir { count }) => {
            for data in CommunicationSynthesizer::synthesize_batch(count) {
                let json = Communication::render_pretty(&data)
                    .context("failed to render Communication resource")?;
                println!("{json}");
            }
        }
        Some(Commands::Simulate {
            events,
            capacity,
            seed,
        }) => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            simulate(&mut rng, events, clamp_capacity(i128::from(capacity)));
        }
        None => {
            println!("Use 'hub --help' for commands");
        }
    }

    Ok(())
}

/// Runs `events` ingestions against a fresh store on a simulated clock, probing connectors
/// after each one.
fn simulate<R: Rng>(rng: &mut R, events: usize, capacity: usize) {
    let store = AggregationStore::new(capacity);
    let mut clock = Utc::now();
    ConnectorStatusSimulator::seed_store(&store, rng, clock);

    for _ in 0..events {
        let step = rng.gen_range(DEFAULT_INGEST_INTERVAL_MIN_MS..=DEFAULT_INGEST_INTERVAL_MAX_MS);
        clock += Duration::milliseconds(step as i64);
        store.ingest_request(RequestFeed::next_event(rng, clock));
        ConnectorStatusSimulator::tick_at(&store, rng, clock);
    }

    let snapshot = store.snapshot();
    let m = &snapshot.metrics;
    println!("Total requests:        {}", m.total_requests);
    println!("Retained requests:     {} (capacity {})", snapshot.requests.len(), store.capacity());
    println!("Active requests:       {}", m.active_requests);
    match m.avg_response_time_minutes {
        Some(avg) => println!("Avg response time:     {avg:.1} min"),
        None => println!("Avg response time:     n/a"),
    }
    println!(
        "Connected connectors:  {}/{}",
        m.connected_connectors,
        snapshot.connectors.len()
    );
    if let Some(latency) = m.avg_connector_latency_ms {
        println!("Avg connector latency: {latency:.0} ms");
    }

    println!();
    println!("Newest requests:");
    for r in snapshot.requests.iter().take(NEWEST_SHOWN) {
        println!(
            "  [{:<7}] {:<12} {:<18} room {:<6} {:<8} {:<11} {}",
            r.source_protocol.as_str(),
            r.vendor.name(),
            r.patient_name,
            r.room_number,
            r.priority.as_str(),
            r.status.as_str(),
            r.request_type
        );
    }
}
