//! Vocab CLI
//!
//! Command-line front end for the vocabulary-trainer scheduling core. Drives
//! `vocab-core` against a small fixed demo lexicon so the update engine,
//! pool builder, and session assembler can be exercised end-to-end without
//! a real lexicon store or presentation layer.

mod demo_lexicon;

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vocab_core::card::{ExerciseType, Grade};
use vocab_core::config::SchedulerConfig;
use vocab_core::context::SessionContext;
use vocab_core::lexicon::{LexiconSource, PartOfSpeech, WordFilters};
use vocab_core::pool::{eligible_new_word_ids, CardSnapshot, PoolSnapshot};
use vocab_core::session::{combine_verb_grades, Activity};
use vocab_core::storage::{CardStore, SqliteStore};

/// Vocab - spaced-repetition scheduling core CLI
#[derive(Parser)]
#[command(name = "vocab")]
#[command(author = "samvallad33")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drive the vocabulary-trainer scheduling core from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Activity to operate on
    #[arg(long, global = true, default_value = "word_translation")]
    activity: ActivityArg,
}

#[derive(Clone, Copy, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
enum ActivityArg {
    WordTranslation,
    Verb,
    WordPreposition,
}

impl From<ActivityArg> for Activity {
    fn from(value: ActivityArg) -> Self {
        match value {
            ActivityArg::WordTranslation => Activity::WordTranslation,
            ActivityArg::Verb => Activity::Verb,
            ActivityArg::WordPreposition => Activity::WordPreposition,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble and run an interactive practice session
    Study {
        /// Seed for reproducible session shuffling
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print pool composition (LTM/STM/NEW/KNOWN counts) for the default user
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let user_id = std::env::var("VOCAB_DEFAULT_USER_ID").unwrap_or_else(|_| "demo-user".to_string());
    let test_mode = std::env::var("VOCAB_TEST_MODE").map(|v| v == "1").unwrap_or(false);

    let db_path = if test_mode {
        None
    } else {
        Some(match std::env::var("VOCAB_DATABASE_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_db_path()?,
        })
    };

    let store = SqliteStore::new(db_path)?;
    let lexicon = demo_lexicon::demo_lexicon();
    let config = SchedulerConfig::default();
    let activity: Activity = cli.activity.into();

    match cli.command {
        Commands::Study { seed } => run_study(&store, &lexicon, &config, &user_id, activity, seed),
        Commands::Stats => run_stats(&store, &lexicon, &config, &user_id, activity),
    }
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "vocab", "trainer")
        .ok_or_else(|| anyhow::anyhow!("could not determine project directories"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("vocab.db"))
}

/// The exercise type(s) a single word maps to for `activity`.
fn exercise_types_for(activity: Activity) -> Vec<ExerciseType> {
    match activity {
        Activity::WordTranslation => vec![ExerciseType::WordTranslation],
        Activity::WordPreposition => vec![ExerciseType::WordPreposition],
        Activity::Verb => vec![ExerciseType::VerbPerfectum, ExerciseType::VerbPastTense],
    }
}

/// Build a pool snapshot for `activity` from stored cards, recent AGAINs,
/// and lexicon eligibility. For verbs, joins the two tenses' retrievability
/// as `min(R_perfectum, R_past)` per the spec's joint classification rule.
fn build_pool(
    store: &SqliteStore,
    lexicon: &impl LexiconSource,
    config: &SchedulerConfig,
    user_id: &str,
    activity: Activity,
) -> anyhow::Result<PoolSnapshot> {
    let now = Utc::now();
    let exercise_types = exercise_types_for(activity);

    let mut joint_r: HashMap<String, f64> = HashMap::new();
    let mut recent_again = Vec::new();
    for exercise_type in &exercise_types {
        for snapshot in store.snapshot_cards(user_id, *exercise_type, now)? {
            joint_r
                .entry(snapshot.word_id.clone())
                .and_modify(|r| *r = r.min(snapshot.retrievability))
                .or_insert(snapshot.retrievability);
        }
        recent_again
            .extend(store.recent_again_events(user_id, *exercise_type, vocab_core::engine::stm_window_start(now))?);
    }
    let cards: Vec<CardSnapshot> =
        joint_r.iter().map(|(word_id, r)| CardSnapshot { word_id: word_id.clone(), retrievability: *r }).collect();

    let filters = WordFilters {
        enriched_only: true,
        pos: match activity {
            Activity::WordTranslation => None,
            Activity::Verb => Some([PartOfSpeech::Verb].into_iter().collect()),
            Activity::WordPreposition => {
                Some([PartOfSpeech::Verb, PartOfSpeech::Noun, PartOfSpeech::Adjective].into_iter().collect())
            }
        },
        user_tags: None,
    };
    let candidates = lexicon.list_words(&filters);
    let has_state = |word_id: &str| joint_r.contains_key(word_id);
    let base_meaning_r = |word_id: &str| -> Option<f64> {
        store.load_card(&vocab_core::card::CardKey::new(user_id, word_id, ExerciseType::WordTranslation))
            .ok()
            .flatten()
            .map(|c| c.retrievability_at(now))
    };
    let eligible_new = eligible_new_word_ids(
        activity,
        &candidates,
        has_state,
        base_meaning_r,
        false,
        config.verb_filter_threshold,
        config.preposition_filter_threshold,
    );

    Ok(PoolSnapshot::build(&cards, &recent_again, eligible_new, config.r_target))
}

fn run_stats(
    store: &SqliteStore,
    lexicon: &impl LexiconSource,
    config: &SchedulerConfig,
    user_id: &str,
    activity: Activity,
) -> anyhow::Result<()> {
    let pool = build_pool(store, lexicon, config, user_id, activity)?;
    println!("{}", format!("=== Pool stats ({}) ===", activity.config_key()).cyan().bold());
    println!("LTM:   {}", pool.ids_in(vocab_core::pool::PoolStatus::Ltm).len());
    println!("STM:   {}", pool.ids_in(vocab_core::pool::PoolStatus::Stm).len());
    println!("NEW:   {}", pool.ids_in(vocab_core::pool::PoolStatus::New).len());
    println!("KNOWN: {}", pool.ids_in(vocab_core::pool::PoolStatus::Known).len());
    Ok(())
}

fn run_study(
    store: &SqliteStore,
    lexicon: &impl LexiconSource,
    config: &SchedulerConfig,
    user_id: &str,
    activity: Activity,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let pool = build_pool(store, lexicon, config, user_id, activity)?;
    let session_id = uuid_like_id();
    let mut context = SessionContext::new(user_id, activity, store, config.clone(), pool, session_id);

    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let assembled = context.start_session(&mut rng);

    if let Some(reason) = &assembled.shortfall_reason {
        warn!(reason, "session could not reach the requested size");
    }
    if assembled.items.is_empty() {
        println!("{}", "No items available.".yellow());
        return Ok(());
    }

    println!("{}", format!("=== Study session: {} items ===", assembled.items.len()).cyan().bold());

    let mut pending_verb_grade: Option<Grade> = None;
    let mut position = 0u32;
    for item in &assembled.items {
        let word = lexicon.get_word(&item.word_id);
        let prompt = word.as_ref().map(|w| w.lemma.clone()).unwrap_or_else(|| item.word_id.clone());
        let is_filler = item.source_pool == vocab_core::pool::PoolStatus::Known;

        println!(
            "[{}] {} ({}){}",
            position + 1,
            prompt.bold(),
            item.exercise_type,
            if is_filler { " — filler, not scored".dimmed().to_string() } else { String::new() }
        );

        let grade = prompt_grade()?;
        context.submit(
            &item.word_id,
            item.exercise_type,
            grade,
            None,
            is_filler,
            position,
            Some(activity.config_key().to_string()),
        )?;

        if !is_filler {
            match activity {
                Activity::Verb => {
                    if let Some(first) = pending_verb_grade.take() {
                        let currently_stm = item.source_pool == vocab_core::pool::PoolStatus::Stm;
                        let combined = combine_verb_grades(first, grade, currently_stm);
                        context.apply_pool_grade(&item.word_id, combined);
                    } else {
                        pending_verb_grade = Some(grade);
                    }
                }
                _ => context.apply_pool_grade(&item.word_id, grade),
            }
        }

        position += 1;
    }

    context.flush()?;
    info!("session flushed");
    println!("{}", "Session complete.".green().bold());
    Ok(())
}

fn prompt_grade() -> anyhow::Result<Grade> {
    loop {
        print!("  grade [1=again 2=hard 3=medium 4=easy]: ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        match line.trim().parse::<i32>().ok().and_then(|n| Grade::try_from(n).ok()) {
            Some(grade) => return Ok(grade),
            None => println!("  invalid grade, try again"),
        }
    }
}

fn uuid_like_id() -> String {
    format!("session-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}
