//! Writes a synthetic tweet-emotions CSV (`tweet_id,sentiment,content`) for
//! offline runs:
//!
//! ```text
//! generate_sample --rows 500 --output tweets.csv
//! sentiment-ingest --source tweets.csv --id-column tweet_id --text-column content
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output CSV path.
    #[arg(long, default_value = "sample_tweets.csv")]
    output: PathBuf,

    /// Number of tweets to generate.
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// Seed for the generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Label mix loosely following the public dataset: lots of neutral/worry,
/// happiness and sadness in the middle, a long tail of rare emotions.
const LABELS: [(&str, u32); 8] = [
    ("neutral", 22),
    ("worry", 21),
    ("happiness", 13),
    ("sadness", 13),
    ("love", 10),
    ("surprise", 6),
    ("fun", 5),
    ("hate", 4),
];

const OPENERS: [&str; 6] = ["just", "honestly", "today", "ugh", "wow", "so"];

fn phrase_for(label: &str) -> &'static [&'static str] {
    match label {
        "happiness" => &["what a great day", "finally got the job", "sunshine and coffee"],
        "sadness" => &["missing you already", "rainy and lonely", "lost my keys again"],
        "worry" => &["exam tomorrow", "hope the flight is ok", "can't sleep"],
        "love" => &["love my friends", "best weekend ever with you"],
        "hate" => &["hate mondays", "traffic is the worst"],
        _ => &["on the bus", "watching tv", "lunch time", "reading a book"],
    }
}

fn tweet(rng: &mut StdRng, label: &str) -> String {
    let opener = OPENERS.choose(rng).copied().unwrap_or("just");
    let body = phrase_for(label).choose(rng).copied().unwrap_or("...");
    let user = rng.gen_range(1..500);
    format!("@user{user} {opener} {body}")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let weights = WeightedIndex::new(LABELS.iter().map(|(_, w)| *w))
        .context("building label weights")?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(["tweet_id", "sentiment", "content"])?;

    let mut tweet_id: u64 = 1_956_967_341;
    for _ in 0..args.rows {
        let (label, _) = LABELS[weights.sample(&mut rng)];
        let content = tweet(&mut rng, label);
        writer.write_record([tweet_id.to_string(), label.to_string(), content])?;
        tweet_id += rng.gen_range(1..1000);
    }
    writer.flush()?;

    println!("Wrote {} tweets to {}", args.rows, args.output.display());
    Ok(())
}
