use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use tr_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use tr_common::matching::{select_top_matches, MatchResult};
use tr_common::pipeline::{run_match_for_job, MatchPipelineConfig, MatchPipelineError};
use tr_common::store::{create_pool_from_url, PgProfileStore, PgRecommendationStore, ProfileStore};

#[derive(Debug, Parser)]
#[command(
    name = "tr-match-worker",
    about = "Run the keyword match pipeline for one or more jobs"
)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    /// Job ids to match; repeat the flag for multiple jobs
    #[arg(long = "job-id", required = true)]
    job_ids: Vec<i64>,

    /// Shortlist size per job (overrides TR_MATCH_LIMIT)
    #[arg(long)]
    limit: Option<usize>,

    /// Compute and log shortlists without writing recommendations
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

/// Scoring without the write-back, for `--dry-run`.
async fn shortlist_for(
    profiles: &dyn ProfileStore,
    job_id: i64,
    config: &MatchPipelineConfig,
) -> Result<Vec<MatchResult>, MatchPipelineError> {
    let job = profiles
        .fetch_job(job_id)
        .await?
        .ok_or(MatchPipelineError::JobNotFound(job_id))?;

    let candidates = profiles.fetch_active_candidates().await?;
    if candidates.is_empty() {
        return Err(MatchPipelineError::NoActiveCandidates);
    }

    Ok(select_top_matches(
        &candidates,
        &job,
        config.shortlist_limit,
        &config.weights,
    ))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let args = Cli::parse();

    let mut config = MatchPipelineConfig::from_env();
    if let Some(limit) = args.limit.filter(|limit| *limit > 0) {
        config.shortlist_limit = limit;
    }

    let pool = create_pool_from_url(&args.db_url)?;
    let profiles = PgProfileStore::new(pool.clone());
    let recommendations = PgRecommendationStore::new(pool);

    for job_id in &args.job_ids {
        if args.dry_run {
            let shortlist = shortlist_for(&profiles, *job_id, &config).await?;
            for result in &shortlist {
                info!(
                    job_id,
                    candidate = %result.candidate_external_id,
                    score = result.score,
                    "dry-run match"
                );
            }
            info!(job_id, matched = shortlist.len(), "dry-run complete");
        } else {
            let shortlist =
                run_match_for_job(&profiles, &recommendations, *job_id, &config).await?;
            info!(job_id, matched = shortlist.len(), "match run complete");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("tr-match-worker failed: {err}");
        std::process::exit(1);
    }
}
