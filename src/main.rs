mod api_types;
mod config;
mod corpus;
mod eda;
mod export;
mod features;
mod lexicon;
mod models;
mod normalize;
mod orchestrator;
mod pipeline;
mod regions;
mod render;
mod sequence;
mod serving;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use config::{env_lookup, resolve_model_url, resolve_output_dir, resolve_resources};
use corpus::ColumnMap;
use eda::EdaColumn;
use orchestrator::{run_eda, run_load, run_predict, PredictParams};
use serving::ModelClient;

/// News Regions - region tagging, EDA and model prediction over news corpora
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output directory for generated files (env NEWS_OUTPUT_DIR, default "out")
    #[arg(short, long, global = true)]
    output_dir: Option<String>,

    /// Stop-word list, one word per line (env NEWS_STOPWORDS, default: built-in English list)
    #[arg(long, global = true)]
    stopwords: Option<String>,

    /// Noun lexicon for the lemmatizer (env NEWS_LEXICON, default: built-in)
    #[arg(long, global = true)]
    lexicon: Option<String>,

    /// Irregular noun forms for the lemmatizer (env NEWS_LEMMA_EXCEPTIONS)
    #[arg(long, global = true)]
    lemma_exceptions: Option<String>,

    /// CSV column holding the country name
    #[arg(long, global = true, default_value = "category")]
    country_column: String,

    /// CSV column holding the article body
    #[arg(long, global = true, default_value = "article")]
    article_column: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exploratory analysis of one column
    Eda {
        /// Input CSV corpus
        corpus: PathBuf,

        /// source_name, category, title_sentiment or region
        #[arg(short, long, default_value = "region")]
        column: EdaColumn,
    },

    /// Clean article text and run it through the classifier
    Predict {
        /// Input CSV corpus
        corpus: PathBuf,

        /// Model :predict endpoint (env NEWS_MODEL_URL)
        #[arg(long)]
        model_url: Option<String>,

        /// Vocabulary size cap (0 = keep every word)
        #[arg(long, default_value_t = sequence::DEFAULT_NUM_WORDS)]
        num_words: usize,

        /// Sequence width after padding/truncation
        #[arg(long, default_value_t = sequence::DEFAULT_MAX_LEN)]
        max_len: usize,

        /// Out-of-vocabulary placeholder token
        #[arg(long, default_value = sequence::DEFAULT_OOV_TOKEN)]
        oov_token: String,

        /// Disable the out-of-vocabulary placeholder (unknown words are dropped)
        #[arg(long)]
        no_oov: bool,

        /// Rows per model request
        #[arg(long, default_value_t = serving::DEFAULT_CHUNK_ROWS)]
        chunk_rows: usize,
    },

    /// Write ml_features rows (document_id, article, title_sentiment) for bulk loading
    Load {
        /// Input CSV corpus
        corpus: PathBuf,

        /// Destination CSV (default: <output_dir>/ml_features.csv)
        #[arg(long)]
        sink: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    info!("Starting news_regions");

    let output_dir = resolve_output_dir(args.output_dir.clone(), &env_lookup);
    let resources = resolve_resources(
        args.stopwords.clone(),
        args.lexicon.clone(),
        args.lemma_exceptions.clone(),
        &env_lookup,
    );
    debug!("Resource overrides: {:?}", resources);
    let columns = ColumnMap {
        country: args.country_column.clone(),
        article: args.article_column.clone(),
    };

    match args.command {
        Command::Eda { corpus, column } => {
            let md = run_eda(&corpus, &columns, &resources, column, &output_dir)?;
            println!("{}", md);
        }
        Command::Predict {
            corpus,
            model_url,
            num_words,
            max_len,
            oov_token,
            no_oov,
            chunk_rows,
        } => {
            let url = resolve_model_url(model_url, &env_lookup);
            let client = ModelClient::new(&url, chunk_rows)?;
            let params = PredictParams {
                num_words,
                oov_token: (!no_oov).then_some(oov_token),
                max_len,
            };
            let md = run_predict(&corpus, &columns, &resources, &params, &client, &output_dir).await?;
            println!("{}", md);
        }
        Command::Load { corpus, sink } => {
            let sink = sink.unwrap_or_else(|| output_dir.join("ml_features.csv"));
            run_load(&corpus, &sink)?;
        }
    }

    Ok(())
}
